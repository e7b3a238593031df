//! The closed supertype over temporal shapes.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::instant::Instant;
use crate::model::sequence::{Interp, Sequence};
use crate::model::sequence_set::SequenceSet;
use crate::time::{Period, Timestamp};
use crate::value::BaseValue;

/// A value evolving over time: a single instant, one sequence, or a set
/// of disjoint sequences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Temporal<V> {
    Instant(Instant<V>),
    Sequence(Sequence<V>),
    SequenceSet(SequenceSet<V>),
}

impl<V: BaseValue> Temporal<V> {
    /// Assemble a temporal value from restriction or lifting output:
    /// `None` for no pieces, a plain sequence for one, a set otherwise.
    pub fn from_sequences(mut sequences: Vec<Sequence<V>>) -> Option<Temporal<V>> {
        match sequences.len() {
            0 => None,
            1 => {
                let seq = sequences.remove(0);
                if seq.num_instants() == 1 && seq.period().is_instant() {
                    Some(Temporal::Instant(seq.instants()[0].clone()))
                } else {
                    Some(Temporal::Sequence(seq))
                }
            }
            _ => SequenceSet::new(sequences).ok().map(Temporal::SequenceSet),
        }
    }

    /// The bounding period (spanning gaps for sequence sets).
    pub fn period(&self) -> Period {
        match self {
            Temporal::Instant(inst) => Period::instant(inst.timestamp()),
            Temporal::Sequence(seq) => *seq.period(),
            Temporal::SequenceSet(set) => set.period(),
        }
    }

    /// The interpolation mode; a bare instant behaves as discrete.
    pub fn interp(&self) -> Interp {
        match self {
            Temporal::Instant(_) => Interp::Discrete,
            Temporal::Sequence(seq) => seq.interp(),
            Temporal::SequenceSet(set) => set.interp(),
        }
    }

    /// Value at `t`; errors follow the shape's lookup rules.
    pub fn value_at(&self, t: Timestamp) -> Result<V> {
        match self {
            Temporal::Instant(inst) => {
                if inst.timestamp() == t {
                    Ok(inst.value().clone())
                } else {
                    Err(crate::error::TemporalError::OutOfRange {
                        t,
                        period: self.period(),
                    })
                }
            }
            Temporal::Sequence(seq) => seq.value_at(t),
            Temporal::SequenceSet(set) => set.value_at(t),
        }
    }

    /// All instants in time order, duplicate timestamps removed. Feeds
    /// the similarity engine and generic iteration.
    pub fn instants(&self) -> Vec<Instant<V>> {
        match self {
            Temporal::Instant(inst) => vec![inst.clone()],
            Temporal::Sequence(seq) => seq.instants().to_vec(),
            Temporal::SequenceSet(set) => set.instants(),
        }
    }

    pub fn num_instants(&self) -> usize {
        match self {
            Temporal::Instant(_) => 1,
            Temporal::Sequence(seq) => seq.num_instants(),
            Temporal::SequenceSet(set) => set.num_instants(),
        }
    }

    /// The sequences composing this value; a bare instant contributes a
    /// degenerate discrete-free singleton.
    pub(crate) fn as_sequences(&self) -> Vec<Sequence<V>> {
        match self {
            Temporal::Instant(inst) => {
                let interp = if V::CONTINUOUS {
                    Interp::Linear
                } else {
                    Interp::Step
                };
                vec![Sequence::from_instant(inst.clone(), interp)]
            }
            Temporal::Sequence(seq) => vec![seq.clone()],
            Temporal::SequenceSet(set) => set.sequences().to_vec(),
        }
    }

    pub fn min_value(&self) -> &V
    where
        V: PartialOrd,
    {
        match self {
            Temporal::Instant(inst) => inst.value(),
            Temporal::Sequence(seq) => seq.min_value(),
            Temporal::SequenceSet(set) => set.min_value(),
        }
    }

    pub fn max_value(&self) -> &V
    where
        V: PartialOrd,
    {
        match self {
            Temporal::Instant(inst) => inst.value(),
            Temporal::Sequence(seq) => seq.max_value(),
            Temporal::SequenceSet(set) => set.max_value(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inst(v: f64, secs: i64) -> Instant<f64> {
        Instant::new(v, Timestamp::from_secs(secs))
    }

    #[test]
    fn test_from_sequences_collapse() {
        assert!(Temporal::<f64>::from_sequences(vec![]).is_none());

        let seq = Sequence::new(vec![inst(1.0, 0), inst(2.0, 10)], Interp::Linear, true, true)
            .unwrap();
        assert!(matches!(
            Temporal::from_sequences(vec![seq.clone()]),
            Some(Temporal::Sequence(_))
        ));

        let lone = Sequence::from_instant(inst(1.0, 0), Interp::Linear);
        assert!(matches!(
            Temporal::from_sequences(vec![lone]),
            Some(Temporal::Instant(_))
        ));

        let far = Sequence::new(vec![inst(3.0, 20), inst(4.0, 30)], Interp::Linear, true, true)
            .unwrap();
        assert!(matches!(
            Temporal::from_sequences(vec![seq, far]),
            Some(Temporal::SequenceSet(_))
        ));
    }

    #[test]
    fn test_instant_lookup() {
        let temp = Temporal::Instant(inst(7.0, 3));
        assert_eq!(temp.value_at(Timestamp::from_secs(3)).unwrap(), 7.0);
        assert!(temp.value_at(Timestamp::from_secs(4)).is_err());
        assert_eq!(temp.num_instants(), 1);
    }
}
