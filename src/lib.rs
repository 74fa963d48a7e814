//! cogsplit searches for sets of "extract statements into a new method"
//! refactorings that bring a method's cognitive complexity under a
//! configured threshold.
//!
//! The crate is the combinatorial core only: it consumes an annotated
//! statement tree and a legality oracle (both produced elsewhere), memoizes
//! the oracle per source interval, lazily enumerates candidate extraction
//! plans under a hard budget, scores them, and keeps the best. The
//! accumulated cache additionally yields containment/conflict graphs for
//! reporting and alternative selection policies.

// Export modules for library usage
pub mod cache;
pub mod config;
pub mod core;
pub mod graph;
pub mod oracle;
pub mod search;
pub mod testkit;

// Re-export commonly used types
pub use crate::cache::{
    csv::read_csv, CacheRow, CacheSummary, ExtractionMetrics, RefactoringCache,
};
pub use crate::config::SearchConfig;
pub use crate::core::{
    residual_complexity, ComplexityAnnotation, Error, MethodModel, MethodModelBuilder, NodeId,
    Result, SentenceGroup, Sequence, Span, SpanRelation, StatementKind, StatementNode,
};
pub use crate::graph::{build_refactoring_graphs, ExtractionVertex, RefactoringGraphs};
pub use crate::oracle::{ExtractionOracle, OracleVerdict};
pub use crate::search::{
    collect_sentence_groups, search, CandidateEnumerator, EnumerationStrategy, ExhaustiveSearch,
    GroupPartitions, NoopObserver, SearchObserver, SearchOutcome, Solution, SolutionStats,
};
