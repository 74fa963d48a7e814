//! The legality/metrics oracle seam.
//!
//! Checking whether a statement range can legally be extracted (variable
//! scope, control-flow escapes, exception handling) requires attempting a
//! real source-to-source transformation, which lives outside this crate. The
//! search only sees the [`ExtractionOracle`] trait.

use crate::core::{MethodModel, NodeId};

/// Outcome of one oracle evaluation for a statement range.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OracleVerdict {
    pub feasible: bool,
    /// Why the extraction is illegal; set when `feasible` is false.
    pub reason: Option<String>,
    pub parameter_count: u32,
    pub extracted_line_count: u32,
    pub complexity_of_new_method: u32,
}

impl OracleVerdict {
    /// A legal extraction with the given resulting metrics.
    pub fn feasible(
        parameter_count: u32,
        extracted_line_count: u32,
        complexity_of_new_method: u32,
    ) -> Self {
        Self {
            feasible: true,
            reason: None,
            parameter_count,
            extracted_line_count,
            complexity_of_new_method,
        }
    }

    /// An illegal extraction, with the reason it was rejected.
    pub fn infeasible(reason: impl Into<String>) -> Self {
        Self {
            feasible: false,
            reason: Some(reason.into()),
            ..Default::default()
        }
    }
}

/// Attempts an extraction of the statements `first..=last` (siblings in the
/// annotated method) and reports whether it is legal plus the resulting
/// metrics.
///
/// Implementations must be deterministic for a fixed, unchanged method. An
/// `Err` is treated by the cache as an infeasible interval with the error as
/// the diagnostic reason; it is never retried within a session.
pub trait ExtractionOracle {
    fn evaluate(
        &self,
        model: &MethodModel,
        first: NodeId,
        last: NodeId,
    ) -> anyhow::Result<OracleVerdict>;
}
