//! Exhaustive, budget-capped search over candidate extraction plans.
//!
//! The search walks every admissible way of carving the method's sentence
//! groups into extractable spans, composes them into whole-method candidates,
//! scores each against the complexity threshold and keeps the best one seen.
//! The candidate space is combinatorially explosive and the legality oracle
//! is expensive, so everything is pull-based: candidates are generated on
//! demand, each span is checked at most once (through the cache), and a hard
//! budget caps how many candidates are scored.

mod enumerator;
mod groups;
mod partitions;
mod solution;

pub use enumerator::CandidateEnumerator;
pub use groups::collect_sentence_groups;
pub use partitions::{GroupPartitions, PartitionIter};
pub use solution::{Solution, SolutionStats, WORST_FITNESS};

use serde::{Deserialize, Serialize};

use crate::cache::RefactoringCache;
use crate::config::SearchConfig;
use crate::core::{MethodModel, SentenceGroup};
use crate::oracle::ExtractionOracle;

/// Traversal order of the per-group partition iterators.
///
/// The strategy never changes which selections are reachable, only the order
/// they are visited in, which matters under a budget cap: long-first finds
/// few large extractions early, short-first finds many small ones early.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnumerationStrategy {
    /// Explore maximal-length blocks at each starting position first.
    LongSequenceFirst,
    /// Explore single-statement blocks first.
    ShortSequenceFirst,
}

/// Progress callbacks for one search session, passed in explicitly by the
/// caller.
pub trait SearchObserver {
    /// Called after each candidate is scored. `index` counts candidates from
    /// zero in visit order.
    fn candidate_evaluated(&mut self, index: u64, solution: &Solution) {
        let _ = (index, solution);
    }

    /// Called when a candidate becomes the new best.
    fn best_improved(&mut self, index: u64, solution: &Solution) {
        let _ = (index, solution);
    }
}

/// Observer that ignores every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl SearchObserver for NoopObserver {}

/// The exhaustive enumeration engine for one method's search session.
pub struct ExhaustiveSearch<'a> {
    model: &'a MethodModel,
    cache: &'a RefactoringCache<'a>,
    groups: Vec<SentenceGroup>,
    strategy: EnumerationStrategy,
    max_complexity: u32,
}

impl<'a> ExhaustiveSearch<'a> {
    /// Set up a search session; sentence groups are collected here, once.
    pub fn new(
        model: &'a MethodModel,
        cache: &'a RefactoringCache<'a>,
        strategy: EnumerationStrategy,
        max_complexity: u32,
    ) -> Self {
        Self {
            model,
            cache,
            groups: collect_sentence_groups(model),
            strategy,
            max_complexity,
        }
    }

    pub fn groups(&self) -> &[SentenceGroup] {
        &self.groups
    }

    fn enumerator(&self) -> CandidateEnumerator<'_> {
        CandidateEnumerator::new(
            self.groups
                .iter()
                .map(|group| GroupPartitions::new(self.model, self.cache, group, self.strategy))
                .collect(),
        )
    }

    /// Visit up to `max_candidates` candidates and return the best-scoring
    /// solution seen.
    ///
    /// Exhausting the budget is not an error: the result is the best of what
    /// was visited, which may be suboptimal. Ties on fitness keep the
    /// earlier-visited candidate.
    pub fn run(&self, max_candidates: u64, observer: &mut dyn SearchObserver) -> Solution {
        let mut best: Option<Solution> = None;
        let mut index = 0u64;
        self.enumerator().for_each(max_candidates, |candidate| {
            let scored =
                Solution::evaluate(self.model, self.cache, candidate, self.max_complexity);
            observer.candidate_evaluated(index, &scored);
            let improved = best
                .as_ref()
                .map_or(true, |current| scored.fitness() < current.fitness());
            if improved {
                log::debug!(
                    "new best at candidate {index}: fitness {}, reduction {}",
                    scored.fitness(),
                    scored.reduced_complexity()
                );
                observer.best_improved(index, &scored);
                best = Some(scored);
            }
            index += 1;
        });
        log::debug!("visited {index} candidates; cache holds {} spans", self.cache.len());
        best.unwrap_or_else(Solution::unexplored)
    }

    /// Total number of whole-method candidates reachable, ignoring any
    /// budget. Diagnostics only: this evaluates the legality of every span
    /// of every group (memoized for any following `run`).
    pub fn count(&self) -> u128 {
        self.enumerator().count()
    }
}

/// Result of a full search session.
pub struct SearchOutcome<'a> {
    pub solution: Solution,
    /// The populated cache, ready for CSV export and graph building.
    pub cache: RefactoringCache<'a>,
    pub candidates_visited: u64,
}

/// Search for the best set of extractions for one annotated method.
///
/// Convenience wrapper creating the cache and engine for one session;
/// sessions must not be reused across methods.
pub fn search<'a>(
    model: &'a MethodModel,
    oracle: &'a dyn ExtractionOracle,
    config: &SearchConfig,
) -> SearchOutcome<'a> {
    struct Visits(u64);
    impl SearchObserver for Visits {
        fn candidate_evaluated(&mut self, _index: u64, _solution: &Solution) {
            self.0 += 1;
        }
    }

    let cache = RefactoringCache::new(model, oracle);
    let mut visits = Visits(0);
    let solution = {
        let engine = ExhaustiveSearch::new(model, &cache, config.strategy, config.max_complexity);
        engine.run(config.max_candidates, &mut visits)
    };
    SearchOutcome {
        solution,
        cache,
        candidates_visited: visits.0,
    }
}
