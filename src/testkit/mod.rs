//! Test fixtures: canned method models and scripted oracles.
//!
//! The search core has two external inputs, the annotated method tree and
//! the legality oracle, and both are expensive to produce for real. This
//! module provides cheap in-memory stand-ins so tests run fast and stay
//! deterministic: factory functions for flat annotated methods and a
//! [`ScriptedOracle`] driven by a span table that also counts invocations,
//! letting tests assert strict memoization.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

use crate::core::{ComplexityAnnotation, MethodModel, NodeId, Span, StatementKind};
use crate::oracle::{ExtractionOracle, OracleVerdict};

/// Width given to each statement slot in fixture models.
pub const SLOT_WIDTH: usize = 10;

/// Span of the contiguous slot run `[from, to]` (1-based, inclusive) in a
/// fixture model built by [`flat_method`].
pub fn slot_span(from: usize, to: usize) -> Span {
    Span::new(SLOT_WIDTH * from, SLOT_WIDTH * to + SLOT_WIDTH)
}

/// Annotation for a leaf statement: its own contribution equals its
/// accumulated complexity.
pub fn leaf(complexity: u32, nesting_depth: u32) -> ComplexityAnnotation {
    ComplexityAnnotation {
        accumulated: complexity,
        inherent_component: complexity,
        nesting_component: 0,
        nesting_contributors: 0,
        contribution: complexity,
        nesting_depth,
    }
}

/// A method body holding one `Other` statement per annotation, laid out in
/// [`SLOT_WIDTH`]-wide slots starting at offset [`SLOT_WIDTH`].
pub fn flat_method(annotations: &[ComplexityAnnotation]) -> MethodModel {
    let kinds = vec![StatementKind::Other; annotations.len()];
    flat_method_with_kinds(annotations, &kinds)
}

/// Like [`flat_method`], with an explicit kind per slot (for empty-statement
/// fixtures).
pub fn flat_method_with_kinds(
    annotations: &[ComplexityAnnotation],
    kinds: &[StatementKind],
) -> MethodModel {
    assert_eq!(annotations.len(), kinds.len());
    let total: u32 = annotations.iter().map(|a| a.accumulated).sum();
    let body_span = Span::new(0, SLOT_WIDTH * (annotations.len() + 1));
    let mut builder = MethodModel::builder(
        body_span,
        ComplexityAnnotation {
            accumulated: total,
            ..Default::default()
        },
    );
    let root = builder.root();
    for (index, (annotation, &kind)) in annotations.iter().zip(kinds).enumerate() {
        builder
            .add_node(root, kind, slot_span(index + 1, index + 1), *annotation)
            .expect("fixture slots are laid out in order");
    }
    builder.build()
}

/// Oracle driven by a span table.
///
/// In the default mode every interval is feasible unless listed otherwise;
/// with [`ScriptedOracle::new`] only explicitly allowed intervals are
/// feasible. Invocations are counted per span.
pub struct ScriptedOracle {
    verdicts: HashMap<Span, OracleVerdict>,
    failures: HashSet<Span>,
    feasible_by_default: bool,
    calls: RefCell<HashMap<Span, u32>>,
}

impl ScriptedOracle {
    /// Only intervals registered through [`allow`](Self::allow) are feasible.
    pub fn new() -> Self {
        Self {
            verdicts: HashMap::new(),
            failures: HashSet::new(),
            feasible_by_default: false,
            calls: RefCell::new(HashMap::new()),
        }
    }

    /// Every interval is feasible with neutral metrics.
    pub fn allowing_all() -> Self {
        Self {
            feasible_by_default: true,
            ..Self::new()
        }
    }

    /// Script a verdict for one interval.
    pub fn allow(&mut self, span: Span, verdict: OracleVerdict) {
        self.verdicts.insert(span, verdict);
    }

    /// Make evaluation of one interval return an error, exercising the
    /// oracle-failure path.
    pub fn fail_on(&mut self, span: Span) {
        self.failures.insert(span);
    }

    /// How many times the oracle was asked about `span`.
    pub fn invocations(&self, span: Span) -> u32 {
        self.calls.borrow().get(&span).copied().unwrap_or(0)
    }

    /// Total number of oracle invocations across all spans.
    pub fn total_invocations(&self) -> u32 {
        self.calls.borrow().values().sum()
    }
}

impl Default for ScriptedOracle {
    fn default() -> Self {
        Self::new()
    }
}

impl ExtractionOracle for ScriptedOracle {
    fn evaluate(
        &self,
        model: &MethodModel,
        first: NodeId,
        last: NodeId,
    ) -> anyhow::Result<OracleVerdict> {
        let span = Span::new(model.node(first).span.start, model.node(last).span.end);
        *self.calls.borrow_mut().entry(span).or_insert(0) += 1;

        if self.failures.contains(&span) {
            anyhow::bail!("scripted failure for [{}, {})", span.start, span.end);
        }
        if let Some(verdict) = self.verdicts.get(&span) {
            return Ok(verdict.clone());
        }
        if self.feasible_by_default {
            Ok(OracleVerdict::feasible(0, 1, 0))
        } else {
            Ok(OracleVerdict::infeasible("span not in the script"))
        }
    }
}
