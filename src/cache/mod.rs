//! Memoization of the extraction oracle.
//!
//! Evaluating the legality of one code extraction is the expensive step of
//! the whole search: the oracle may perform a real transformation and measure
//! the result. The [`RefactoringCache`] guarantees that each distinct source
//! interval is evaluated at most once per search session; every later query
//! for the same interval is a lookup. The cache only grows; entries are
//! never evicted or retried. Its final contents feed the CSV export and
//! the conflict-graph builder.

pub mod csv;

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

use crate::core::{residual_complexity, MethodModel, Sequence, Span};
use crate::oracle::{ExtractionOracle, OracleVerdict};

/// Everything the search knows about one candidate interval: the oracle's
/// verdict plus metric sums derived from the annotated statements.
///
/// Immutable once cached; the oracle is deterministic and the method is not
/// mutated during a search session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionMetrics {
    pub feasible: bool,
    /// Why the extraction is illegal; empty when feasible.
    pub reason: String,
    pub parameter_count: u32,
    pub extracted_line_count: u32,
    pub complexity_of_new_method: u32,
    /// Net complexity reduction: the interval's accumulated complexity minus
    /// what would survive inside the extracted method.
    pub reduction_of_complexity: u32,
    pub inherent_component: u32,
    pub nesting_component: u32,
    pub nesting_contributors: u32,
    pub nesting_depth: u32,
}

/// One exported cache entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheRow {
    pub span: Span,
    pub metrics: ExtractionMetrics,
}

/// Entry counts by feasibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheSummary {
    pub total: usize,
    pub feasible: usize,
    pub unfeasible: usize,
}

/// Cache of extraction evaluations for one method's search session.
///
/// Interior mutability lets the lazy partition iterators and the evaluator
/// share one cache without threading `&mut` through every pull; the whole
/// search is single-threaded.
pub struct RefactoringCache<'a> {
    model: &'a MethodModel,
    oracle: &'a dyn ExtractionOracle,
    entries: RefCell<HashMap<Span, ExtractionMetrics>>,
}

impl<'a> RefactoringCache<'a> {
    pub fn new(model: &'a MethodModel, oracle: &'a dyn ExtractionOracle) -> Self {
        Self {
            model,
            oracle,
            entries: RefCell::new(HashMap::new()),
        }
    }

    /// Metrics for extracting `sequence`, consulting the oracle only on the
    /// first query for its interval.
    pub fn get_or_evaluate(&self, sequence: &Sequence) -> ExtractionMetrics {
        let span = sequence.span();
        if let Some(hit) = self.entries.borrow().get(&span) {
            log::trace!("cache hit for [{}, {})", span.start, span.end);
            return hit.clone();
        }
        log::trace!(
            "cache miss for [{}, {}), consulting the oracle",
            span.start,
            span.end
        );
        let metrics = self.evaluate_uncached(sequence);
        self.entries.borrow_mut().insert(span, metrics.clone());
        metrics
    }

    fn evaluate_uncached(&self, sequence: &Sequence) -> ExtractionMetrics {
        let verdict = match self.oracle.evaluate(self.model, sequence.first(), sequence.last()) {
            Ok(verdict) => verdict,
            // A failing oracle marks the interval unfeasible for the rest of
            // the session; the search moves on to other candidates.
            Err(error) => OracleVerdict::infeasible(format!("oracle failure: {error:#}")),
        };

        let accumulated = sequence.accumulated_complexity(self.model);
        let nothing_excised = HashSet::new();
        let retained: u32 = sequence
            .nodes()
            .iter()
            .map(|&node| residual_complexity(self.model, node, &nothing_excised))
            .sum();

        ExtractionMetrics {
            feasible: verdict.feasible,
            reason: verdict.reason.unwrap_or_default(),
            parameter_count: verdict.parameter_count,
            extracted_line_count: verdict.extracted_line_count,
            complexity_of_new_method: verdict.complexity_of_new_method,
            reduction_of_complexity: accumulated.saturating_sub(retained),
            inherent_component: sequence.inherent_component(self.model),
            nesting_component: sequence.nesting_component(self.model),
            nesting_contributors: sequence.nesting_contributors(self.model),
            nesting_depth: sequence.nesting_depth(self.model),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// Entry counts by feasibility.
    pub fn summary(&self) -> CacheSummary {
        let entries = self.entries.borrow();
        let feasible = entries.values().filter(|m| m.feasible).count();
        CacheSummary {
            total: entries.len(),
            feasible,
            unfeasible: entries.len() - feasible,
        }
    }

    /// Snapshot of the cache contents, sorted by interval.
    pub fn rows(&self) -> Vec<CacheRow> {
        let entries = self.entries.borrow();
        let mut rows: Vec<CacheRow> = entries
            .iter()
            .map(|(&span, metrics)| CacheRow {
                span,
                metrics: metrics.clone(),
            })
            .collect();
        rows.sort_by_key(|row| row.span);
        rows
    }
}
