//! Budget-capped cartesian composition of the per-group partition iterators.
//!
//! A whole-method candidate is one selection from every sentence group,
//! concatenated. The composition is an odometer over the restartable group
//! iterators: the rightmost group advances fastest, and a group that runs
//! out restarts while its left neighbor advances. Order is deterministic for
//! fixed inputs, which the tests rely on.

use crate::core::Sequence;

use super::partitions::{GroupPartitions, PartitionIter};

/// Streams the cartesian product of the per-group selections.
pub struct CandidateEnumerator<'a> {
    parts: Vec<GroupPartitions<'a>>,
}

impl<'a> CandidateEnumerator<'a> {
    pub fn new(parts: Vec<GroupPartitions<'a>>) -> Self {
        Self { parts }
    }

    /// Visit candidates in enumeration order, stopping after `budget` of
    /// them. Each candidate is delivered to `consumer` before the cap is
    /// checked, so `budget` is an exact upper bound on deliveries, not a
    /// soft target.
    pub fn for_each(&self, budget: u64, mut consumer: impl FnMut(Vec<Sequence>)) {
        if budget == 0 {
            return;
        }
        let mut iters: Vec<PartitionIter<'a>> = self.parts.iter().map(|p| p.iter()).collect();
        let mut current: Vec<Vec<Sequence>> = Vec::with_capacity(iters.len());
        for iter in &mut iters {
            match iter.next() {
                Some(selection) => current.push(selection),
                // A group without selections admits no candidates at all.
                None => return,
            }
        }

        let mut visited = 0u64;
        loop {
            consumer(current.iter().flatten().cloned().collect());
            visited += 1;
            if visited >= budget {
                return;
            }

            // Advance the odometer, rightmost group first.
            let mut level = self.parts.len();
            loop {
                if level == 0 {
                    return;
                }
                let index = level - 1;
                if let Some(selection) = iters[index].next() {
                    current[index] = selection;
                    break;
                }
                iters[index] = self.parts[index].iter();
                current[index] = iters[index]
                    .next()
                    .expect("a restarted partition iterator yields at least the empty selection");
                level -= 1;
            }
        }
    }

    /// Total number of candidates reachable, ignoring any budget: the
    /// product of the per-group cardinalities. Saturates at `u128::MAX`.
    pub fn count(&self) -> u128 {
        self.parts
            .iter()
            .map(|p| p.cardinality())
            .fold(1u128, |product, cardinality| {
                product.saturating_mul(cardinality)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::RefactoringCache;
    use crate::core::{MethodModel, SentenceGroup};
    use crate::search::EnumerationStrategy;
    use crate::testkit::{flat_method, leaf, ScriptedOracle};

    fn split_groups(model: &MethodModel, at: usize) -> (SentenceGroup, SentenceGroup) {
        let children = model.node(model.root()).children();
        (
            SentenceGroup::new(children[..at].to_vec()),
            SentenceGroup::new(children[at..].to_vec()),
        )
    }

    #[test]
    fn count_multiplies_group_cardinalities() {
        let model = flat_method(&[leaf(1, 0), leaf(1, 0), leaf(1, 0), leaf(1, 0)]);
        let oracle = ScriptedOracle::allowing_all();
        let cache = RefactoringCache::new(&model, &oracle);
        let (left, right) = split_groups(&model, 2);

        let enumerator = CandidateEnumerator::new(vec![
            GroupPartitions::new(&model, &cache, &left, EnumerationStrategy::LongSequenceFirst),
            GroupPartitions::new(&model, &cache, &right, EnumerationStrategy::LongSequenceFirst),
        ]);
        // Each two-slot group admits 5 selections.
        assert_eq!(enumerator.count(), 25);
    }

    #[test]
    fn unbounded_enumeration_produces_count_candidates() {
        let model = flat_method(&[leaf(1, 0), leaf(1, 0), leaf(1, 0), leaf(1, 0)]);
        let oracle = ScriptedOracle::allowing_all();
        let cache = RefactoringCache::new(&model, &oracle);
        let (left, right) = split_groups(&model, 2);

        let enumerator = CandidateEnumerator::new(vec![
            GroupPartitions::new(&model, &cache, &left, EnumerationStrategy::LongSequenceFirst),
            GroupPartitions::new(&model, &cache, &right, EnumerationStrategy::LongSequenceFirst),
        ]);
        let mut produced = Vec::new();
        enumerator.for_each(u64::MAX, |candidate| produced.push(candidate));
        assert_eq!(produced.len() as u128, enumerator.count());

        // Composition order is stable: the same enumeration again yields the
        // same stream.
        let mut again = Vec::new();
        enumerator.for_each(u64::MAX, |candidate| again.push(candidate));
        assert_eq!(produced, again);
    }

    #[test]
    fn budget_is_an_exact_upper_bound() {
        let model = flat_method(&[leaf(1, 0), leaf(1, 0), leaf(1, 0)]);
        let oracle = ScriptedOracle::allowing_all();
        let cache = RefactoringCache::new(&model, &oracle);
        let group = SentenceGroup::new(model.node(model.root()).children().to_vec());

        let enumerator = CandidateEnumerator::new(vec![GroupPartitions::new(
            &model,
            &cache,
            &group,
            EnumerationStrategy::LongSequenceFirst,
        )]);
        for budget in [0u64, 1, 5, 13, 100] {
            let mut seen = 0u64;
            enumerator.for_each(budget, |_| seen += 1);
            assert_eq!(seen, budget.min(13));
        }
    }

    #[test]
    fn no_groups_means_the_single_empty_candidate() {
        let enumerator = CandidateEnumerator::new(Vec::new());
        let mut produced = Vec::new();
        enumerator.for_each(u64::MAX, |candidate| produced.push(candidate));
        assert_eq!(produced.len(), 1);
        assert!(produced[0].is_empty());
        assert_eq!(enumerator.count(), 1);
    }
}
