//! DOT rendering of the refactoring graphs.
//!
//! Produces Graphviz text for the combined and containment-only graphs:
//! nodes are labeled with their interval and metric payload, edges with
//! their weight (1 = containment, 0 = conflict).

use petgraph::dot::Dot;
use petgraph::graph::DiGraph;

use super::{ExtractionVertex, RefactoringGraphs};

/// Render one directed refactoring graph as DOT text.
pub fn render(graph: &DiGraph<ExtractionVertex, u32>) -> String {
    format!("{}", Dot::new(graph))
}

impl RefactoringGraphs {
    /// DOT text of the combined containment + conflict graph.
    pub fn combined_dot(&self) -> String {
        render(&self.combined)
    }

    /// DOT text of the containment-only DAG.
    pub fn containment_dot(&self) -> String {
        render(&self.containment)
    }
}
