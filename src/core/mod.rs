//! Core data model for the extraction search.
//!
//! A method arrives here already parsed and annotated by external passes: an
//! arena of statement nodes ([`MethodModel`]), each carrying an immutable
//! [`ComplexityAnnotation`] with its cognitive-complexity fields. The search
//! itself never touches source text; it reasons about source-offset intervals
//! ([`Span`]), sibling runs ([`SentenceGroup`], [`Sequence`]) and the
//! annotation records.

pub mod errors;

pub use errors::{Error, Result};

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Half-open `[start, end)` source-offset interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

/// How two spans relate to each other.
///
/// For any two spans exactly one variant holds, computed from the four
/// endpoint comparisons alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanRelation {
    Identical,
    Contains,
    ContainedBy,
    Overlaps,
    Disjoint,
}

impl Span {
    /// Create a span.
    ///
    /// # Panics
    /// Panics when `start >= end`; empty spans identify nothing.
    pub fn new(start: usize, end: usize) -> Self {
        assert!(start < end, "span must be non-empty: [{start}, {end})");
        Self { start, end }
    }

    /// True when `self` contains `other`. Shared endpoints still count as
    /// containment; only an identical span is excluded.
    pub fn contains(&self, other: &Span) -> bool {
        self != other && self.start <= other.start && other.end <= self.end
    }

    /// True when the spans partially overlap: they share territory but
    /// neither contains the other.
    pub fn overlaps(&self, other: &Span) -> bool {
        self.relation_to(other) == SpanRelation::Overlaps
    }

    /// Classify the relation between two spans.
    pub fn relation_to(&self, other: &Span) -> SpanRelation {
        if self == other {
            SpanRelation::Identical
        } else if self.contains(other) {
            SpanRelation::Contains
        } else if other.contains(self) {
            SpanRelation::ContainedBy
        } else if self.start < other.end && other.start < self.end {
            SpanRelation::Overlaps
        } else {
            SpanRelation::Disjoint
        }
    }
}

/// Index of a statement node inside its [`MethodModel`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Syntactic role of a statement node, as far as the search cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatementKind {
    /// A braced body whose children are sibling statements.
    Block,
    /// A conditional; children are its branch bodies.
    If,
    /// Any loop form (for, for-each, while, do-while); children are the body.
    Loop,
    /// A switch; children are `Case` segments.
    Switch,
    /// One case segment of a switch; children are the segment statements.
    Case,
    /// An empty statement (a bare `;`). Never a valid span endpoint.
    Empty,
    /// Anything else.
    Other,
}

/// Immutable per-statement complexity record produced by the external
/// annotation pass.
///
/// `accumulated`, the component fields and `nesting_contributors` are sums
/// over the node's subtree; `contribution` is the node's own share of the
/// method complexity; `nesting_depth` is the node's depth in the original
/// method.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplexityAnnotation {
    pub accumulated: u32,
    pub inherent_component: u32,
    pub nesting_component: u32,
    pub nesting_contributors: u32,
    pub contribution: u32,
    pub nesting_depth: u32,
}

/// One statement of the annotated method.
#[derive(Debug, Clone)]
pub struct StatementNode {
    pub span: Span,
    pub kind: StatementKind,
    pub annotation: ComplexityAnnotation,
    children: Vec<NodeId>,
}

impl StatementNode {
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn is_empty_statement(&self) -> bool {
        self.kind == StatementKind::Empty
    }
}

/// Arena of annotated statement nodes rooted at the method body.
///
/// The model is immutable once built and belongs to exactly one search
/// session. Node ids are arena indices; the root is always id 0.
#[derive(Debug, Clone)]
pub struct MethodModel {
    nodes: Vec<StatementNode>,
}

impl MethodModel {
    /// Start building a model from the method body's span and annotation.
    pub fn builder(span: Span, annotation: ComplexityAnnotation) -> MethodModelBuilder {
        MethodModelBuilder::new(span, annotation)
    }

    /// The method body node.
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Span of the whole method body.
    pub fn span(&self) -> Span {
        self.nodes[0].span
    }

    pub fn node(&self, id: NodeId) -> &StatementNode {
        &self.nodes[id.0]
    }

    pub fn annotation(&self, id: NodeId) -> &ComplexityAnnotation {
        &self.nodes[id.0].annotation
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Pre-order walk of `root`'s subtree. `visit` decides whether the walk
    /// descends into the visited node's children.
    pub fn walk(&self, root: NodeId, visit: &mut dyn FnMut(NodeId) -> bool) {
        if visit(root) {
            for &child in self.node(root).children() {
                self.walk(child, visit);
            }
        }
    }
}

/// Builder for [`MethodModel`], validating structure as nodes are added.
pub struct MethodModelBuilder {
    nodes: Vec<StatementNode>,
}

impl MethodModelBuilder {
    /// Id of the method body node, usable as a parent before `build`.
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    fn new(span: Span, annotation: ComplexityAnnotation) -> Self {
        Self {
            nodes: vec![StatementNode {
                span,
                kind: StatementKind::Block,
                annotation,
                children: Vec::new(),
            }],
        }
    }

    /// Append a child statement under `parent`. Children must be added in
    /// source order; each child span must lie inside its parent's span and
    /// start at or after the previous sibling's end.
    pub fn add_node(
        &mut self,
        parent: NodeId,
        kind: StatementKind,
        span: Span,
        annotation: ComplexityAnnotation,
    ) -> Result<NodeId> {
        let Some(parent_node) = self.nodes.get(parent.0) else {
            return Err(Error::invalid_model(format!(
                "parent node {} does not exist",
                parent.0
            )));
        };
        if !(parent_node.span.start <= span.start && span.end <= parent_node.span.end) {
            return Err(Error::invalid_model(format!(
                "child span [{}, {}) escapes parent span [{}, {})",
                span.start, span.end, parent_node.span.start, parent_node.span.end
            )));
        }
        if let Some(&last) = parent_node.children.last() {
            let previous_end = self.nodes[last.0].span.end;
            if span.start < previous_end {
                return Err(Error::invalid_model(format!(
                    "child span [{}, {}) starts before previous sibling ends at {}",
                    span.start, span.end, previous_end
                )));
            }
        }
        let id = NodeId(self.nodes.len());
        self.nodes.push(StatementNode {
            span,
            kind,
            annotation,
            children: Vec::new(),
        });
        self.nodes[parent.0].children.push(id);
        Ok(id)
    }

    pub fn build(self) -> MethodModel {
        MethodModel { nodes: self.nodes }
    }
}

/// Ordered sibling statements eligible for joint extraction: one block body,
/// one complexity-contributing branch body, or one switch-case segment.
///
/// Slot positions are 1-based throughout the search.
#[derive(Debug, Clone)]
pub struct SentenceGroup {
    members: Vec<NodeId>,
}

impl SentenceGroup {
    pub(crate) fn new(members: Vec<NodeId>) -> Self {
        Self { members }
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn members(&self) -> &[NodeId] {
        &self.members
    }

    /// The statement at the 1-based `position`.
    pub fn member(&self, position: usize) -> NodeId {
        self.members[position - 1]
    }

    /// Accumulated cognitive complexity of the slot at `position`.
    pub fn slot_complexity(&self, model: &MethodModel, position: usize) -> u32 {
        model.annotation(self.member(position)).accumulated
    }

    /// True when the slot at `position` is an empty statement.
    pub fn is_empty_slot(&self, model: &MethodModel, position: usize) -> bool {
        model.node(self.member(position)).is_empty_statement()
    }

    /// The contiguous sub-run `[from, to]` (1-based, inclusive) as a
    /// [`Sequence`].
    ///
    /// # Panics
    /// Panics when the range selects no statements.
    pub fn sequence(&self, model: &MethodModel, from: usize, to: usize) -> Sequence {
        Sequence::new(model, self.members[from - 1..to].to_vec())
    }
}

/// A non-empty contiguous run of sibling statements from one group: one
/// candidate extraction, identified by its source span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sequence {
    nodes: Vec<NodeId>,
    span: Span,
}

impl Sequence {
    pub(crate) fn new(model: &MethodModel, nodes: Vec<NodeId>) -> Self {
        assert!(
            !nodes.is_empty(),
            "a sequence needs at least one statement; no extraction interval \
             is defined for zero statements"
        );
        let first = model.node(nodes[0]).span;
        let last = model.node(nodes[nodes.len() - 1]).span;
        Self {
            span: Span::new(first.start, last.end),
            nodes,
        }
    }

    /// The extraction interval identifying this sequence.
    pub fn span(&self) -> Span {
        self.span
    }

    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    pub fn first(&self) -> NodeId {
        self.nodes[0]
    }

    pub fn last(&self) -> NodeId {
        self.nodes[self.nodes.len() - 1]
    }

    /// Accumulated cognitive complexity over the run.
    pub fn accumulated_complexity(&self, model: &MethodModel) -> u32 {
        self.sum(model, |a| a.accumulated)
    }

    /// Accumulated inherent component over the run.
    pub fn inherent_component(&self, model: &MethodModel) -> u32 {
        self.sum(model, |a| a.inherent_component)
    }

    /// Accumulated nesting component over the run.
    pub fn nesting_component(&self, model: &MethodModel) -> u32 {
        self.sum(model, |a| a.nesting_component)
    }

    /// Number of nesting contributors over the run.
    pub fn nesting_contributors(&self, model: &MethodModel) -> u32 {
        self.sum(model, |a| a.nesting_contributors)
    }

    /// Nesting depth of the run, i.e. of its first statement.
    pub fn nesting_depth(&self, model: &MethodModel) -> u32 {
        model.annotation(self.first()).nesting_depth
    }

    fn sum(&self, model: &MethodModel, field: impl Fn(&ComplexityAnnotation) -> u32) -> u32 {
        self.nodes.iter().map(|&id| field(model.annotation(id))).sum()
    }
}

/// Cognitive complexity left in `root`'s subtree if the statements in
/// `excised` were extracted away.
///
/// Every counted contribution is discounted by the subtree root's *original*
/// nesting depth when it exceeds that depth, and counted in full otherwise.
/// The root itself is always counted even when listed in `excised`.
pub fn residual_complexity(model: &MethodModel, root: NodeId, excised: &HashSet<NodeId>) -> u32 {
    let depth_discount = model.annotation(root).nesting_depth;
    let mut total = 0u32;
    model.walk(root, &mut |id| {
        if id != root && excised.contains(&id) {
            return false;
        }
        let contribution = model.annotation(id).contribution;
        if contribution != 0 {
            total += if contribution > depth_discount {
                contribution - depth_discount
            } else {
                contribution
            };
        }
        true
    });
    total
}
