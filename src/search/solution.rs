//! Scoring of candidate solutions.
//!
//! A solution is an ordered list of code extractions for one method. Fitness
//! is lower-is-better: one unit per extraction performed, plus a steep
//! penalty for every complexity pocket left above the configured threshold,
//! whether inside an extracted method or in what remains of the original
//! body.

use std::collections::HashSet;

use crate::cache::RefactoringCache;
use crate::core::{residual_complexity, MethodModel, NodeId, Sequence};

/// Fitness assigned to candidates containing an unfeasible extraction.
pub const WORST_FITNESS: f64 = f64::MAX;

const THRESHOLD_PENALTY_WEIGHT: f64 = 10.0;

/// Aggregate totals over the extractions of a feasible solution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SolutionStats {
    /// Lines of code moved into new methods, summed over extractions.
    pub extracted_lines: u32,
    /// Largest parameter list among the new methods.
    pub max_parameter_count: u32,
}

/// An ordered, pairwise-disjoint-per-group list of code extractions, scored.
///
/// The sequence list is sorted by the source offset of each extraction's
/// first statement; insertion keeps it that way.
#[derive(Debug, Clone)]
pub struct Solution {
    sequences: Vec<Sequence>,
    feasible: bool,
    fitness: f64,
    reduced_complexity: u32,
    stats: SolutionStats,
}

impl Solution {
    /// Placeholder for a search that visited no candidate at all (budget 0).
    pub(crate) fn unexplored() -> Self {
        Self {
            sequences: Vec::new(),
            feasible: false,
            fitness: WORST_FITNESS,
            reduced_complexity: 0,
            stats: SolutionStats::default(),
        }
    }

    /// Score one candidate against the method and threshold.
    pub fn evaluate(
        model: &MethodModel,
        cache: &RefactoringCache<'_>,
        candidate: Vec<Sequence>,
        max_complexity: u32,
    ) -> Self {
        let mut solution = Self {
            sequences: Vec::new(),
            feasible: false,
            fitness: 0.0,
            reduced_complexity: 0,
            stats: SolutionStats::default(),
        };
        for sequence in candidate {
            solution.insert_sequence(sequence);
        }
        solution.score(model, cache, max_complexity);
        solution
    }

    /// Insert keeping the list sorted by first-statement offset.
    fn insert_sequence(&mut self, sequence: Sequence) {
        let offset = sequence.span().start;
        let at = self
            .sequences
            .iter()
            .position(|s| offset < s.span().start)
            .unwrap_or(self.sequences.len());
        self.sequences.insert(at, sequence);
    }

    fn score(&mut self, model: &MethodModel, cache: &RefactoringCache<'_>, max_complexity: u32) {
        let mut fitness = self.sequences.len() as f64;
        let excised: HashSet<NodeId> = self
            .sequences
            .iter()
            .flat_map(|s| s.nodes().iter().copied())
            .collect();
        let mut stats = SolutionStats::default();
        let mut retained_total = 0u32;

        // Right to left: the extraction latest in source order is checked
        // first, and the first unfeasible one stops the evaluation.
        for sequence in self.sequences.iter().rev() {
            let metrics = cache.get_or_evaluate(sequence);
            if !metrics.feasible {
                self.feasible = false;
                self.fitness = WORST_FITNESS;
                self.reduced_complexity = 0;
                self.stats = SolutionStats::default();
                return;
            }

            // Complexity the new method would keep: nested chosen
            // extractions leave, contributions are discounted by the
            // subtree's original nesting depth.
            let retained = sequence_residual(model, sequence, &excised);
            if retained > max_complexity {
                fitness += f64::from(retained - max_complexity) * THRESHOLD_PENALTY_WEIGHT;
            }
            retained_total += retained;

            stats.extracted_lines += metrics.extracted_line_count;
            stats.max_parameter_count = stats.max_parameter_count.max(metrics.parameter_count);
        }

        // The dominant term: what the method body keeps after all chosen
        // extractions are gone.
        let method_residual = residual_complexity(model, model.root(), &excised);
        if method_residual > max_complexity {
            fitness += f64::from(method_residual - max_complexity) * THRESHOLD_PENALTY_WEIGHT;
        }

        let original = model.annotation(model.root()).accumulated;
        self.reduced_complexity = original.saturating_sub(method_residual + retained_total);
        self.fitness = fitness;
        self.feasible = true;
        self.stats = stats;
    }

    pub fn sequences(&self) -> &[Sequence] {
        &self.sequences
    }

    pub fn sequence_count(&self) -> usize {
        self.sequences.len()
    }

    /// True when every contained extraction is legal.
    pub fn is_feasible(&self) -> bool {
        self.feasible
    }

    /// Quality of the solution; lower is better.
    pub fn fitness(&self) -> f64 {
        self.fitness
    }

    /// Cognitive complexity shed by the method if the solution is applied.
    pub fn reduced_complexity(&self) -> u32 {
        self.reduced_complexity
    }

    pub fn stats(&self) -> SolutionStats {
        self.stats
    }
}

/// Residual complexity of a sequence's subtrees viewed as the body of the
/// would-be extracted method.
fn sequence_residual(model: &MethodModel, sequence: &Sequence, excised: &HashSet<NodeId>) -> u32 {
    sequence
        .nodes()
        .iter()
        .map(|&node| residual_complexity(model, node, excised))
        .sum()
}
