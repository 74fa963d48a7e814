//! Lazy enumeration of the admissible partitions of one sentence group.
//!
//! For a group of N slots this walks, depth first, every way of selecting
//! zero or more disjoint contiguous blocks: gaps are allowed (statements left
//! unextracted), no block may start or end on an empty statement, and every
//! block must be a feasible extraction according to the cache. Feasibility is
//! not monotonic in block length (a longer span may be legal where a shorter
//! one is not), so no span is ever pruned from another span's verdict; each
//! candidate block is checked on its own when the traversal first reaches it.

use crate::cache::RefactoringCache;
use crate::core::{MethodModel, SentenceGroup, Sequence};

use super::EnumerationStrategy;

/// Restartable producer of every admissible block selection over one group.
///
/// The cartesian composer consumes one pass per outer candidate; [`iter`]
/// starts a fresh traversal each time.
///
/// [`iter`]: GroupPartitions::iter
#[derive(Clone)]
pub struct GroupPartitions<'a> {
    model: &'a MethodModel,
    cache: &'a RefactoringCache<'a>,
    group: &'a SentenceGroup,
    strategy: EnumerationStrategy,
}

impl<'a> GroupPartitions<'a> {
    pub fn new(
        model: &'a MethodModel,
        cache: &'a RefactoringCache<'a>,
        group: &'a SentenceGroup,
        strategy: EnumerationStrategy,
    ) -> Self {
        Self {
            model,
            cache,
            group,
            strategy,
        }
    }

    /// Start a fresh traversal.
    pub fn iter(&self) -> PartitionIter<'a> {
        PartitionIter {
            model: self.model,
            cache: self.cache,
            group: self.group,
            strategy: self.strategy,
            frames: Vec::new(),
            chosen: Vec::new(),
            started: false,
            done: false,
        }
    }

    /// Number of selections a full traversal produces, computed by dynamic
    /// programming over slot positions without materializing them.
    ///
    /// Consults the cache for every span of the group, so the first call
    /// pays the full oracle cost for this group.
    pub fn cardinality(&self) -> u128 {
        let n = self.group.len();
        // ways[p] = selections over slots p..=n; ways[n + 1] = 1 (nothing
        // left to decide).
        let mut ways = vec![0u128; n + 2];
        ways[n + 1] = 1;
        for position in (1..=n).rev() {
            let mut total = ways[position + 1];
            for end in position..=n {
                if self.admissible(position, end) {
                    total = total.saturating_add(ways[end + 1]);
                }
            }
            ways[position] = total;
        }
        ways[1]
    }

    fn admissible(&self, from: usize, to: usize) -> bool {
        if self.group.is_empty_slot(self.model, from) || self.group.is_empty_slot(self.model, to) {
            return false;
        }
        self.cache
            .get_or_evaluate(&self.group.sequence(self.model, from, to))
            .feasible
    }
}

/// One decision point of the traversal: the block choices available at a
/// slot position, in strategy order, followed by the choice to leave the
/// slot unextracted.
struct Frame {
    position: usize,
    /// Block end positions not yet tried, in strategy order.
    ends: Vec<usize>,
    cursor: usize,
    skip_tried: bool,
    /// Whether this frame's current choice pushed a block.
    contributed: bool,
}

enum Choice {
    Block(usize, usize),
    Skip,
}

/// Depth-first traversal state. Yields each admissible selection as a list
/// of [`Sequence`]s in left-to-right order.
pub struct PartitionIter<'a> {
    model: &'a MethodModel,
    cache: &'a RefactoringCache<'a>,
    group: &'a SentenceGroup,
    strategy: EnumerationStrategy,
    frames: Vec<Frame>,
    chosen: Vec<(usize, usize)>,
    started: bool,
    done: bool,
}

impl<'a> PartitionIter<'a> {
    fn new_frame(&self, position: usize) -> Frame {
        let n = self.group.len();
        let ends: Vec<usize> = match self.strategy {
            EnumerationStrategy::LongSequenceFirst => (position..=n).rev().collect(),
            EnumerationStrategy::ShortSequenceFirst => (position..=n).collect(),
        };
        Frame {
            position,
            ends,
            cursor: 0,
            skip_tried: false,
            contributed: false,
        }
    }

    fn admissible(&self, from: usize, to: usize) -> bool {
        if self.group.is_empty_slot(self.model, from) || self.group.is_empty_slot(self.model, to) {
            return false;
        }
        self.cache
            .get_or_evaluate(&self.group.sequence(self.model, from, to))
            .feasible
    }

    /// Advance a frame to its next untried admissible choice.
    fn next_choice(&self, frame: &mut Frame) -> Option<Choice> {
        while frame.cursor < frame.ends.len() {
            let end = frame.ends[frame.cursor];
            frame.cursor += 1;
            if self.admissible(frame.position, end) {
                return Some(Choice::Block(frame.position, end));
            }
        }
        if !frame.skip_tried {
            frame.skip_tried = true;
            return Some(Choice::Skip);
        }
        None
    }

    /// Push frames from `position` to the end of the group, taking the first
    /// available choice at each step. Always reaches a leaf, since leaving a
    /// slot unextracted is always available.
    fn descend(&mut self, mut position: usize) {
        let n = self.group.len();
        while position <= n {
            let mut frame = self.new_frame(position);
            match self.next_choice(&mut frame) {
                Some(Choice::Block(from, to)) => {
                    frame.contributed = true;
                    self.chosen.push((from, to));
                    position = to + 1;
                }
                Some(Choice::Skip) => {
                    position += 1;
                }
                None => unreachable!("a fresh frame always offers the skip choice"),
            }
            self.frames.push(frame);
        }
    }

    fn emit(&self) -> Vec<Sequence> {
        self.chosen
            .iter()
            .map(|&(from, to)| self.group.sequence(self.model, from, to))
            .collect()
    }
}

impl<'a> Iterator for PartitionIter<'a> {
    type Item = Vec<Sequence>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        if !self.started {
            self.started = true;
            self.descend(1);
            return Some(self.emit());
        }
        // Backtrack to the deepest frame with an untried choice, undoing the
        // current choice on the way, then descend again.
        loop {
            let Some(mut frame) = self.frames.pop() else {
                self.done = true;
                return None;
            };
            if frame.contributed {
                self.chosen.pop();
                frame.contributed = false;
            }
            match self.next_choice(&mut frame) {
                Some(Choice::Block(from, to)) => {
                    frame.contributed = true;
                    self.chosen.push((from, to));
                    self.frames.push(frame);
                    self.descend(to + 1);
                    return Some(self.emit());
                }
                Some(Choice::Skip) => {
                    let next_position = frame.position + 1;
                    self.frames.push(frame);
                    self.descend(next_position);
                    return Some(self.emit());
                }
                None => continue,
            }
        }
    }
}
