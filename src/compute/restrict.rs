//! Restriction of temporal values to (or away from) a base value or a
//! period.
//!
//! Restriction returns `None` for an empty result rather than an error:
//! asking where a trajectory equals a value it never takes is a valid
//! question with an empty answer.

use crate::model::{sequence_set, Instant, Interp, Sequence, SequenceSet, Temporal};
use crate::time::{Period, Timestamp};
use crate::value::BaseValue;

/// The portion of `temp` where its value equals `target`.
pub fn at_value<V: BaseValue>(temp: &Temporal<V>, target: &V) -> Option<Temporal<V>> {
    match temp {
        Temporal::Instant(inst) => {
            (inst.value() == target).then(|| Temporal::Instant(inst.clone()))
        }
        Temporal::Sequence(seq) if seq.interp() == Interp::Discrete => {
            let kept: Vec<Instant<V>> = seq
                .instants()
                .iter()
                .filter(|inst| inst.value() == target)
                .cloned()
                .collect();
            discrete_result(kept)
        }
        _ => {
            let mut pieces = Vec::new();
            for seq in temp.as_sequences() {
                pieces.extend(sequence_at_value(&seq, target));
            }
            Temporal::from_sequences(sequence_set::merge_adjacent(pieces))
        }
    }
}

/// The portion of `temp` where its value differs from `target`.
pub fn minus_value<V: BaseValue>(temp: &Temporal<V>, target: &V) -> Option<Temporal<V>> {
    match temp {
        Temporal::Instant(inst) => {
            (inst.value() != target).then(|| Temporal::Instant(inst.clone()))
        }
        Temporal::Sequence(seq) if seq.interp() == Interp::Discrete => {
            let kept: Vec<Instant<V>> = seq
                .instants()
                .iter()
                .filter(|inst| inst.value() != target)
                .cloned()
                .collect();
            discrete_result(kept)
        }
        _ => {
            let mut pieces = Vec::new();
            for seq in temp.as_sequences() {
                let removed: Vec<Period> = sequence_at_value(&seq, target)
                    .iter()
                    .map(|piece| *piece.period())
                    .collect();
                for window in seq.period().minus(&removed) {
                    if let Some(piece) = seq.at_period(&window) {
                        pieces.push(piece);
                    }
                }
            }
            Temporal::from_sequences(sequence_set::merge_adjacent(pieces))
        }
    }
}

/// The portion of `temp` inside `period`.
pub fn at_period<V: BaseValue>(temp: &Temporal<V>, period: &Period) -> Option<Temporal<V>> {
    match temp {
        Temporal::Instant(inst) => {
            period.contains(inst.timestamp()).then(|| Temporal::Instant(inst.clone()))
        }
        Temporal::Sequence(seq) => {
            seq.at_period(period).and_then(|cut| Temporal::from_sequences(vec![cut]))
        }
        Temporal::SequenceSet(set) => set
            .at_period(period)
            .and_then(|cut| Temporal::from_sequences(cut.sequences().to_vec())),
    }
}

/// The portion of `temp` outside `period`.
pub fn minus_period<V: BaseValue>(temp: &Temporal<V>, period: &Period) -> Option<Temporal<V>> {
    match temp {
        Temporal::Instant(inst) => {
            (!period.contains(inst.timestamp())).then(|| Temporal::Instant(inst.clone()))
        }
        Temporal::Sequence(seq) if seq.interp() == Interp::Discrete => {
            let kept: Vec<Instant<V>> = seq
                .instants()
                .iter()
                .filter(|inst| !period.contains(inst.timestamp()))
                .cloned()
                .collect();
            discrete_result(kept)
        }
        _ => {
            let mut pieces = Vec::new();
            for seq in temp.as_sequences() {
                for window in seq.period().minus(std::slice::from_ref(period)) {
                    if let Some(piece) = seq.at_period(&window) {
                        pieces.push(piece);
                    }
                }
            }
            Temporal::from_sequences(pieces)
        }
    }
}

fn discrete_result<V: BaseValue>(kept: Vec<Instant<V>>) -> Option<Temporal<V>> {
    if kept.is_empty() {
        return None;
    }
    if kept.len() == 1 {
        let mut kept = kept;
        return Some(Temporal::Instant(kept.remove(0)));
    }
    Sequence::new_raw(kept, Interp::Discrete, true, true)
        .ok()
        .map(Temporal::Sequence)
}

/// Pieces of one continuous sequence where the value equals `target`.
fn sequence_at_value<V: BaseValue>(seq: &Sequence<V>, target: &V) -> Vec<Sequence<V>> {
    match seq.interp() {
        Interp::Discrete => Vec::new(),
        Interp::Step => step_at_value(seq, target),
        Interp::Linear => linear_at_value(seq, target),
    }
}

/// Maximal runs of step instants holding `target`, each extended to the
/// timestamp where the value changes.
fn step_at_value<V: BaseValue>(seq: &Sequence<V>, target: &V) -> Vec<Sequence<V>> {
    let instants = seq.instants();
    let n = instants.len();
    let mut pieces = Vec::new();
    let mut i = 0;
    while i < n {
        if instants[i].value() != target {
            i += 1;
            continue;
        }
        let mut j = i;
        while j + 1 < n && instants[j + 1].value() == target {
            j += 1;
        }
        let lower_inc = i > 0 || seq.period().lower_inc();
        let mut run: Vec<Instant<V>> = instants[i..=j].to_vec();
        let upper_inc = if j + 1 < n {
            // Held until the next instant changes the value.
            run.push(Instant::new(target.clone(), instants[j + 1].timestamp()));
            false
        } else {
            seq.period().upper_inc()
        };
        if run.len() == 1 {
            pieces.push(Sequence::from_instant(run.remove(0), Interp::Step));
        } else if let Ok(piece) = Sequence::new(run, Interp::Step, lower_inc, upper_inc) {
            pieces.push(piece);
        }
        i = j + 1;
    }
    pieces
}

/// Where a linear sequence equals `target`: constant segments holding it,
/// grid instants equal to it, and interior crossings reported by the base
/// type's segment solver.
fn linear_at_value<V: BaseValue>(seq: &Sequence<V>, target: &V) -> Vec<Sequence<V>> {
    let instants = seq.instants();
    let n = instants.len();
    let mut pieces = Vec::new();
    if n == 1 {
        if instants[0].value() == target {
            pieces.push(Sequence::from_instant(instants[0].clone(), Interp::Linear));
        }
        return pieces;
    }
    for i in 0..n - 1 {
        let (v1, v2) = (instants[i].value(), instants[i + 1].value());
        let (t1, t2) = (instants[i].timestamp(), instants[i + 1].timestamp());
        let lower_inc = i > 0 || seq.period().lower_inc();
        if v1 == target && v2 == target {
            let upper_inc = i + 2 == n && seq.period().upper_inc();
            if let Ok(piece) = Sequence::new(
                vec![instants[i].clone(), instants[i + 1].clone()],
                Interp::Linear,
                lower_inc,
                upper_inc,
            ) {
                pieces.push(piece);
            }
        } else if v1 == target {
            if lower_inc {
                pieces.push(Sequence::from_instant(instants[i].clone(), Interp::Linear));
            }
        } else if v2 == target {
            if i + 2 == n && seq.period().upper_inc() {
                pieces.push(Sequence::from_instant(
                    instants[i + 1].clone(),
                    Interp::Linear,
                ));
            }
        } else if let Some(frac) = V::segment_at_value(v1, v2, target) {
            let t = Timestamp::at_fraction(t1, t2, frac);
            if t > t1 && t < t2 {
                pieces.push(Sequence::from_instant(
                    Instant::new(target.clone(), t),
                    Interp::Linear,
                ));
            }
        }
    }
    pieces
}

/// Timestamps (and runs) where a temporal boolean is true. The everyday
/// consumer of comparison results.
pub fn when_true(temp: &Temporal<bool>) -> Option<SequenceSet<bool>> {
    let restricted = at_value(temp, &true)?;
    match restricted {
        Temporal::Instant(inst) => {
            SequenceSet::new(vec![Sequence::from_instant(inst, Interp::Step)]).ok()
        }
        Temporal::Sequence(seq) if seq.interp() == Interp::Discrete => {
            // Discrete instants become singleton step pieces.
            let pieces = seq
                .instants()
                .iter()
                .map(|inst| Sequence::from_instant(inst.clone(), Interp::Step))
                .collect();
            SequenceSet::new(pieces).ok()
        }
        Temporal::Sequence(seq) => SequenceSet::new(vec![seq]).ok(),
        Temporal::SequenceSet(set) => Some(set),
    }
}
