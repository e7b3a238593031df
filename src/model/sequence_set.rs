//! Temporal sequence sets: disjoint sequences with temporal gaps.

use serde::{Deserialize, Serialize};

use crate::error::{Result, TemporalError};
use crate::model::instant::Instant;
use crate::model::sequence::{Interp, Sequence};
use crate::time::{Period, Timestamp};
use crate::value::BaseValue;

/// An ordered array of sequences with pairwise-disjoint periods, sharing
/// one continuous interpolation mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequenceSet<V> {
    sequences: Vec<Sequence<V>>,
}

impl<V: BaseValue> SequenceSet<V> {
    /// Build a set, taking ownership of the sequence array.
    pub fn new(sequences: Vec<Sequence<V>>) -> Result<Self> {
        if sequences.is_empty() {
            return Err(TemporalError::InvalidArgument(
                "a sequence set requires at least one sequence".to_string(),
            ));
        }
        let interp = sequences[0].interp();
        if interp == Interp::Discrete {
            return Err(TemporalError::InvalidArgument(
                "discrete values are a single sequence, not a sequence set".to_string(),
            ));
        }
        for seq in &sequences[1..] {
            if seq.interp() != interp {
                return Err(TemporalError::InvalidArgument(
                    "all sequences of a set must share one interpolation mode".to_string(),
                ));
            }
        }
        for pair in sequences.windows(2) {
            if !pair[0].period().is_before(pair[1].period()) {
                return Err(TemporalError::InvalidArgument(format!(
                    "sequence periods must be ordered and disjoint: {} then {}",
                    pair[0].period(),
                    pair[1].period()
                )));
            }
        }
        Ok(Self { sequences })
    }

    /// Build a set by copying the sequence slice.
    pub fn from_slice(sequences: &[Sequence<V>]) -> Result<Self> {
        Self::new(sequences.to_vec())
    }

    /// Build a set from pieces that may touch, merging adjacent
    /// sequences whose bound inclusivities are complementary and whose
    /// boundary values agree.
    pub fn from_pieces(pieces: Vec<Sequence<V>>) -> Result<Self> {
        Self::new(merge_adjacent(pieces))
    }

    pub fn sequences(&self) -> &[Sequence<V>] {
        &self.sequences
    }

    pub fn num_sequences(&self) -> usize {
        self.sequences.len()
    }

    pub fn num_instants(&self) -> usize {
        self.sequences.iter().map(Sequence::num_instants).sum()
    }

    pub fn interp(&self) -> Interp {
        self.sequences[0].interp()
    }

    /// The bounding period, spanning all gaps.
    pub fn period(&self) -> Period {
        let first = self.sequences[0].period();
        let last = self.sequences[self.sequences.len() - 1].period();
        first.hull(last)
    }

    /// All instants in time order, duplicates at shared boundary
    /// timestamps removed.
    pub fn instants(&self) -> Vec<Instant<V>> {
        let mut result: Vec<Instant<V>> = Vec::with_capacity(self.num_instants());
        for seq in &self.sequences {
            for inst in seq.instants() {
                if result
                    .last()
                    .is_some_and(|prev| prev.timestamp() == inst.timestamp())
                {
                    continue;
                }
                result.push(inst.clone());
            }
        }
        result
    }

    /// Value at `t`; `OutOfRange` inside a gap or beyond the span.
    pub fn value_at(&self, t: Timestamp) -> Result<V> {
        for seq in &self.sequences {
            if seq.period().contains(t) {
                return seq.value_at(t);
            }
        }
        Err(TemporalError::OutOfRange {
            t,
            period: self.period(),
        })
    }

    pub fn min_value(&self) -> &V
    where
        V: PartialOrd,
    {
        self.best_value(|a, b| a < b)
    }

    pub fn max_value(&self) -> &V
    where
        V: PartialOrd,
    {
        self.best_value(|a, b| a > b)
    }

    fn best_value(&self, better: impl Fn(&V, &V) -> bool + Copy) -> &V {
        let mut best = self.sequences[0].start().value();
        for seq in &self.sequences {
            for inst in seq.instants() {
                if better(inst.value(), best) {
                    best = inst.value();
                }
            }
        }
        best
    }

    /// Restrict to `period`, or `None` when no sequence overlaps it.
    pub fn at_period(&self, period: &Period) -> Option<SequenceSet<V>> {
        let kept: Vec<Sequence<V>> = self
            .sequences
            .iter()
            .filter_map(|seq| seq.at_period(period))
            .collect();
        if kept.is_empty() {
            return None;
        }
        Some(Self { sequences: kept })
    }
}

/// Merge consecutive pieces that touch with complementary inclusivity and
/// agree on the boundary value; renormalize the joined instant runs.
pub(crate) fn merge_adjacent<V: BaseValue>(pieces: Vec<Sequence<V>>) -> Vec<Sequence<V>> {
    let mut result: Vec<Sequence<V>> = Vec::with_capacity(pieces.len());
    for piece in pieces {
        let joins = result.last().is_some_and(|prev| joinable(prev, &piece));
        if !joins {
            result.push(piece);
            continue;
        }
        let Some(prev) = result.pop() else {
            result.push(piece);
            continue;
        };
        let lower_inc = prev.period().lower_inc();
        let upper_inc = piece.period().upper_inc();
        let interp = prev.interp();
        let mut instants = prev.instants().to_vec();
        // Drop the duplicated boundary instant.
        instants.pop();
        instants.extend_from_slice(piece.instants());
        match Sequence::new(instants, interp, lower_inc, upper_inc) {
            Ok(joined) => result.push(joined),
            Err(err) => {
                // Unreachable for joinable pieces; keep both rather than
                // lose data.
                log::warn!("failed to join adjacent sequences: {err}");
                result.push(prev);
            }
        }
    }
    result
}

fn joinable<V: BaseValue>(prev: &Sequence<V>, next: &Sequence<V>) -> bool {
    prev.interp() == next.interp()
        && prev.period().upper() == next.period().lower()
        && (prev.period().upper_inc() ^ next.period().lower_inc())
        && prev.end().value() == next.start().value()
}
