//! Containment and conflict graphs over the feasible cached intervals.
//!
//! After a search session the cache knows every span that was checked for
//! legality. The feasible ones form two structures: a containment DAG (edge
//! from each span to its nearest strictly-containing span, rooted at a
//! synthetic vertex for the whole method) and a conflict graph (pairs that
//! partially overlap and are therefore mutually exclusive choices). The
//! combined graph (containment plus zero-weight conflict edges) feeds
//! reporting and graph-based selection policies.

pub mod dot;

use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};

use petgraph::algo::has_path_connecting;
use petgraph::graph::{DiGraph, NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;

use crate::cache::{CacheRow, RefactoringCache};
use crate::core::{MethodModel, Span, SpanRelation};

/// A feasible extraction interval with its cached metric payload.
///
/// Equality and hashing are defined purely by the interval endpoints; the
/// metrics ride along as payload.
#[derive(Debug, Clone)]
pub struct ExtractionVertex {
    pub span: Span,
    pub reduction_of_complexity: u32,
    pub inherent_component: u32,
    pub nesting_component: u32,
    pub nesting_contributors: u32,
    pub nesting_depth: u32,
}

impl ExtractionVertex {
    fn from_row(row: &CacheRow) -> Self {
        let m = &row.metrics;
        Self {
            span: row.span,
            reduction_of_complexity: m.reduction_of_complexity,
            inherent_component: m.inherent_component,
            nesting_component: m.nesting_component,
            nesting_contributors: m.nesting_contributors,
            nesting_depth: m.nesting_depth,
        }
    }

    /// The synthetic vertex standing for the whole method body.
    fn method_root(model: &MethodModel) -> Self {
        let annotation = model.annotation(model.root());
        Self {
            span: model.span(),
            reduction_of_complexity: annotation.accumulated,
            inherent_component: annotation.inherent_component,
            nesting_component: annotation.nesting_component,
            nesting_contributors: annotation.nesting_contributors,
            nesting_depth: annotation.nesting_depth,
        }
    }

    /// Cognitive complexity the span would have as its own method.
    pub fn complexity_when_extracted(&self) -> u32 {
        self.inherent_component + self.nesting_component
    }
}

impl PartialEq for ExtractionVertex {
    fn eq(&self, other: &Self) -> bool {
        self.span == other.span
    }
}

impl Eq for ExtractionVertex {}

impl Hash for ExtractionVertex {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.span.hash(state);
    }
}

impl fmt::Display for ExtractionVertex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}, {}) ({}, {}, {}, {}, {})",
            self.span.start,
            self.span.end,
            self.reduction_of_complexity,
            self.inherent_component,
            self.nesting_component,
            self.nesting_contributors,
            self.nesting_depth
        )
    }
}

/// The graphs built from one search session's cache.
pub struct RefactoringGraphs {
    /// Containment plus zero-weight conflict edges, for reporting.
    pub combined: DiGraph<ExtractionVertex, u32>,
    /// Containment only, after transitive reduction.
    pub containment: DiGraph<ExtractionVertex, u32>,
    /// Pairs of partially overlapping intervals.
    pub conflicts: UnGraph<ExtractionVertex, ()>,
    /// Index of the synthetic method-root vertex in `combined` and
    /// `containment`.
    pub root: NodeIndex,
}

/// Build the containment DAG and conflict graph from the feasible entries of
/// a finished search session.
pub fn build_refactoring_graphs(
    model: &MethodModel,
    cache: &RefactoringCache<'_>,
) -> RefactoringGraphs {
    let rows: Vec<CacheRow> = cache
        .rows()
        .into_iter()
        .filter(|row| row.metrics.feasible)
        .collect();

    let mut working: DiGraph<ExtractionVertex, u32> = DiGraph::new();
    let mut conflicts: UnGraph<ExtractionVertex, ()> = UnGraph::new_undirected();
    let mut indices: HashMap<Span, NodeIndex> = HashMap::new();
    let mut conflict_indices: HashMap<Span, NodeIndex> = HashMap::new();
    let mut conflict_pairs: Vec<(NodeIndex, NodeIndex)> = Vec::new();

    for row in &rows {
        let vertex = ExtractionVertex::from_row(row);
        let index = working.add_node(vertex);
        indices.insert(row.span, index);
    }

    // Classify every unordered pair: containment becomes a weight-1 edge
    // from the contained span to its container, partial overlap goes to the
    // conflict graph.
    for (i, p) in rows.iter().enumerate() {
        for q in rows.iter().skip(i + 1) {
            let (vp, vq) = (indices[&p.span], indices[&q.span]);
            match p.span.relation_to(&q.span) {
                SpanRelation::Contains => {
                    working.add_edge(vq, vp, 1);
                }
                SpanRelation::ContainedBy => {
                    working.add_edge(vp, vq, 1);
                }
                SpanRelation::Overlaps => {
                    let cp = *conflict_indices
                        .entry(p.span)
                        .or_insert_with(|| conflicts.add_node(ExtractionVertex::from_row(p)));
                    let cq = *conflict_indices
                        .entry(q.span)
                        .or_insert_with(|| conflicts.add_node(ExtractionVertex::from_row(q)));
                    conflicts.add_edge(cq, cp, ());
                    conflict_pairs.push((vq, vp));
                }
                SpanRelation::Identical | SpanRelation::Disjoint => {}
            }
        }
    }

    // Synthetic root for the whole method; every vertex not contained in
    // anything yet hangs off it, making the working graph a DAG rooted at
    // the method.
    let root_vertex = ExtractionVertex::method_root(model);
    let root = *indices
        .entry(root_vertex.span)
        .or_insert_with(|| working.add_node(root_vertex));
    let vertices: Vec<NodeIndex> = working.node_indices().collect();
    for vertex in vertices {
        if vertex != root && working.edges(vertex).next().is_none() {
            working.add_edge(vertex, root, 1);
        }
    }

    transitive_reduction(&mut working);

    // Snapshot the containment-only DAG, then merge the conflict pairs into
    // the working graph as zero-weight edges in both directions.
    let containment = working.clone();
    for (a, b) in conflict_pairs {
        working.add_edge(a, b, 0);
        working.add_edge(b, a, 0);
    }

    log::debug!(
        "refactoring graphs: {} vertices, {} containment edges, {} conflict pairs",
        containment.node_count(),
        containment.edge_count(),
        conflicts.edge_count()
    );

    RefactoringGraphs {
        combined: working,
        containment,
        conflicts,
        root,
    }
}

/// Drop every edge that is implied by a longer path, leaving each vertex
/// only its nearest-container edges.
fn transitive_reduction(graph: &mut DiGraph<ExtractionVertex, u32>) {
    let snapshot = graph.clone();
    let mut redundant = Vec::new();
    for edge in snapshot.edge_references() {
        let (source, target) = (edge.source(), edge.target());
        let implied = snapshot.edges(source).any(|other| {
            other.target() != target && has_path_connecting(&snapshot, other.target(), target, None)
        });
        if implied {
            redundant.push((source, target));
        }
    }
    for (source, target) in redundant {
        if let Some(edge) = graph.find_edge(source, target) {
            graph.remove_edge(edge);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use petgraph::algo::is_cyclic_directed;
    use petgraph::Direction;

    use crate::core::{ComplexityAnnotation, StatementKind};
    use crate::search::{collect_sentence_groups, EnumerationStrategy, ExhaustiveSearch};
    use crate::testkit::{flat_method, leaf, slot_span, ScriptedOracle};

    /// Populate a cache by running an unbounded search over the model.
    fn populated_cache<'a>(
        model: &'a MethodModel,
        oracle: &'a ScriptedOracle,
    ) -> RefactoringCache<'a> {
        let cache = RefactoringCache::new(model, oracle);
        {
            let engine = ExhaustiveSearch::new(
                model,
                &cache,
                EnumerationStrategy::LongSequenceFirst,
                15,
            );
            engine.run(u64::MAX, &mut crate::search::NoopObserver);
        }
        cache
    }

    fn nested_model() -> MethodModel {
        // Body: [conditional, trailing statement]; the conditional's body
        // block holds two statements. Gives strictly nested feasible spans.
        let annotated = |accumulated: u32, depth: u32| ComplexityAnnotation {
            accumulated,
            contribution: 0,
            nesting_depth: depth,
            ..Default::default()
        };
        let mut builder = MethodModel::builder(
            Span::new(0, 70),
            ComplexityAnnotation {
                accumulated: 4,
                ..Default::default()
            },
        );
        let root = builder.root();
        let conditional = builder
            .add_node(root, StatementKind::If, Span::new(10, 50), annotated(4, 0))
            .unwrap();
        let body = builder
            .add_node(conditional, StatementKind::Block, Span::new(15, 45), annotated(4, 1))
            .unwrap();
        builder
            .add_node(body, StatementKind::Other, Span::new(20, 30), annotated(2, 1))
            .unwrap();
        builder
            .add_node(body, StatementKind::Other, Span::new(30, 40), annotated(2, 1))
            .unwrap();
        builder
            .add_node(root, StatementKind::Other, Span::new(50, 60), annotated(0, 0))
            .unwrap();
        let model = builder.build();
        assert_eq!(collect_sentence_groups(&model).len(), 3);
        model
    }

    #[test]
    fn containment_dag_is_acyclic_with_single_container_edges() {
        let model = nested_model();
        let oracle = ScriptedOracle::allowing_all();
        let cache = populated_cache(&model, &oracle);
        let graphs = build_refactoring_graphs(&model, &cache);

        assert!(!is_cyclic_directed(&graphs.containment));
        for vertex in graphs.containment.node_indices() {
            if vertex == graphs.root {
                assert_eq!(
                    graphs
                        .containment
                        .edges_directed(vertex, Direction::Outgoing)
                        .count(),
                    0
                );
            } else {
                assert_eq!(
                    graphs
                        .containment
                        .edges_directed(vertex, Direction::Outgoing)
                        .count(),
                    1,
                    "every non-root vertex keeps exactly its nearest container"
                );
            }
        }
        // Strict nesting means no conflicts at all.
        assert_eq!(graphs.conflicts.edge_count(), 0);
    }

    #[test]
    fn transitive_reduction_keeps_the_nearest_container() {
        let model = nested_model();
        let oracle = ScriptedOracle::allowing_all();
        let cache = populated_cache(&model, &oracle);
        let graphs = build_refactoring_graphs(&model, &cache);

        // The inner statement [20, 30) is contained in [20, 40), [15, 45)
        // and [10, 50); only the nearest must remain.
        let inner = graphs
            .containment
            .node_indices()
            .find(|&v| graphs.containment[v].span == Span::new(20, 30))
            .unwrap();
        let containers: Vec<Span> = graphs
            .containment
            .edges_directed(inner, Direction::Outgoing)
            .map(|e| graphs.containment[e.target()].span)
            .collect();
        assert_eq!(containers, vec![Span::new(20, 40)]);
    }

    #[test]
    fn partial_overlaps_become_conflicts_not_containment() {
        let model = flat_method(&[leaf(1, 0), leaf(1, 0), leaf(1, 0)]);
        let oracle = ScriptedOracle::allowing_all();
        let cache = populated_cache(&model, &oracle);
        let graphs = build_refactoring_graphs(&model, &cache);

        // [10, 30) and [20, 40) overlap without containment.
        assert_eq!(graphs.conflicts.edge_count(), 1);
        let conflict_spans: Vec<Span> = graphs
            .conflicts
            .node_indices()
            .map(|v| graphs.conflicts[v].span)
            .collect();
        assert!(conflict_spans.contains(&slot_span(1, 2)));
        assert!(conflict_spans.contains(&slot_span(2, 3)));

        // The conflict pair appears in the combined graph as zero-weight
        // edges in both directions, and not in the containment snapshot.
        let zero_weight_edges = graphs
            .combined
            .edge_references()
            .filter(|e| *e.weight() == 0)
            .count();
        assert_eq!(zero_weight_edges, 2);
        assert!(graphs
            .containment
            .edge_references()
            .all(|e| *e.weight() == 1));
    }

    #[test]
    fn infeasible_intervals_stay_out_of_the_graphs() {
        let model = flat_method(&[leaf(1, 0), leaf(1, 0)]);
        let mut oracle = ScriptedOracle::new();
        oracle.allow(
            slot_span(1, 1),
            crate::oracle::OracleVerdict::feasible(0, 1, 0),
        );
        let cache = populated_cache(&model, &oracle);
        let graphs = build_refactoring_graphs(&model, &cache);

        // Feasible [10, 20) plus the synthetic root.
        assert_eq!(graphs.containment.node_count(), 2);
        assert!(graphs
            .containment
            .node_indices()
            .any(|v| graphs.containment[v].span == slot_span(1, 1)));
    }

    #[test]
    fn root_vertex_carries_the_method_metrics() {
        let model = flat_method(&[leaf(3, 0)]);
        let oracle = ScriptedOracle::allowing_all();
        let cache = populated_cache(&model, &oracle);
        let graphs = build_refactoring_graphs(&model, &cache);

        let root = &graphs.containment[graphs.root];
        assert_eq!(root.span, model.span());
        assert_eq!(root.reduction_of_complexity, 3);
        // Inherent 3, no nesting component in this fixture.
        let vertex = graphs
            .containment
            .node_indices()
            .find(|&v| graphs.containment[v].span == slot_span(1, 1))
            .unwrap();
        assert_eq!(graphs.containment[vertex].complexity_when_extracted(), 3);
    }
}
