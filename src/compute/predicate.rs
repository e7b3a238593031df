//! Ever/always predicates: does a temporal value satisfy a comparison at
//! some instant of its domain, or at every one.
//!
//! The two families are duals: `always cmp` is `not (ever !cmp)`, and the
//! negated form is what gets evaluated, so attainedness at exclusive
//! bounds is decided in exactly one place. A value carried by an
//! excluded bound instant is a limit, not an attained value.

use crate::model::{Interp, Sequence, Temporal};
use crate::value::BaseValue;

/// A comparison against a constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cmp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl Cmp {
    pub fn test<V: PartialOrd>(self, a: &V, b: &V) -> bool {
        match self {
            Cmp::Eq => a == b,
            Cmp::Ne => a != b,
            Cmp::Lt => a < b,
            Cmp::Le => a <= b,
            Cmp::Gt => a > b,
            Cmp::Ge => a >= b,
        }
    }

    /// The comparison holding exactly when `self` does not.
    fn negated(self) -> Cmp {
        match self {
            Cmp::Eq => Cmp::Ne,
            Cmp::Ne => Cmp::Eq,
            Cmp::Lt => Cmp::Ge,
            Cmp::Le => Cmp::Gt,
            Cmp::Gt => Cmp::Le,
            Cmp::Ge => Cmp::Lt,
        }
    }
}

/// Whether `cmp` holds against `value` at some attained instant of
/// `temp`'s domain.
pub fn ever_cmp<V>(temp: &Temporal<V>, cmp: Cmp, value: &V) -> bool
where
    V: BaseValue + PartialOrd,
{
    // Envelope pre-test on the instant extremes; exact attainedness only
    // matters once the envelope allows a match.
    match cmp {
        Cmp::Gt | Cmp::Ge => {
            if !cmp.test(temp.max_value(), value) {
                return false;
            }
        }
        Cmp::Lt | Cmp::Le => {
            if !cmp.test(temp.min_value(), value) {
                return false;
            }
        }
        Cmp::Eq => {
            if temp.min_value() > value || temp.max_value() < value {
                return false;
            }
        }
        Cmp::Ne => {}
    }
    temp.as_sequences()
        .iter()
        .any(|seq| ever_seq(seq, cmp, value))
}

/// Whether `cmp` holds against `value` over the whole domain of `temp`.
pub fn always_cmp<V>(temp: &Temporal<V>, cmp: Cmp, value: &V) -> bool
where
    V: BaseValue + PartialOrd,
{
    !ever_cmp(temp, cmp.negated(), value)
}

fn ever_seq<V>(seq: &Sequence<V>, cmp: Cmp, value: &V) -> bool
where
    V: BaseValue + PartialOrd,
{
    let instants = seq.instants();
    let n = instants.len();
    match seq.interp() {
        Interp::Discrete => instants.iter().any(|inst| cmp.test(inst.value(), value)),
        Interp::Step => {
            // Every instant's value is held on its own run; the final
            // instant is attained only under an inclusive upper bound.
            instants[..n - 1]
                .iter()
                .any(|inst| cmp.test(inst.value(), value))
                || (seq.period().upper_inc() && cmp.test(instants[n - 1].value(), value))
        }
        Interp::Linear => {
            if n == 1 {
                return cmp.test(instants[0].value(), value);
            }
            for i in 0..n - 1 {
                let v1 = instants[i].value();
                let v2 = instants[i + 1].value();
                let start_attained = i > 0 || seq.period().lower_inc();
                // A non-final segment end is the next segment's start.
                let end_attained = i + 2 == n && seq.period().upper_inc();
                if start_attained && cmp.test(v1, value) {
                    return true;
                }
                if end_attained && cmp.test(v2, value) {
                    return true;
                }
                if interior_matches(cmp, v1, v2, value) {
                    return true;
                }
            }
            false
        }
    }
}

/// Whether `cmp` holds somewhere on the open interior of a linear
/// segment from `v1` to `v2`.
fn interior_matches<V>(cmp: Cmp, v1: &V, v2: &V, value: &V) -> bool
where
    V: BaseValue + PartialOrd,
{
    if v1 == v2 {
        return cmp.test(v1, value);
    }
    let (lo, hi) = if v1 < v2 { (v1, v2) } else { (v2, v1) };
    match cmp {
        Cmp::Eq => lo < value && value < hi,
        // A nondegenerate segment takes more than one value.
        Cmp::Ne => true,
        Cmp::Lt | Cmp::Le => lo < value,
        Cmp::Gt | Cmp::Ge => hi > value,
    }
}

/// Equality-only ever, for base types without an order (points, text,
/// booleans). Uses the type's segment solver for linear interiors.
pub fn ever_eq<V: BaseValue>(temp: &Temporal<V>, value: &V) -> bool {
    temp.as_sequences().iter().any(|seq| {
        let instants = seq.instants();
        let n = instants.len();
        match seq.interp() {
            Interp::Discrete => instants.iter().any(|inst| inst.value() == value),
            Interp::Step => {
                instants[..n - 1].iter().any(|inst| inst.value() == value)
                    || (seq.period().upper_inc() && instants[n - 1].value() == value)
            }
            Interp::Linear => {
                if n == 1 {
                    return instants[0].value() == value;
                }
                for i in 0..n - 1 {
                    let v1 = instants[i].value();
                    let v2 = instants[i + 1].value();
                    if v1 == v2 && v1 == value {
                        return true;
                    }
                    if (i > 0 || seq.period().lower_inc()) && v1 == value {
                        return true;
                    }
                    if i + 2 == n && seq.period().upper_inc() && v2 == value {
                        return true;
                    }
                    if V::segment_at_value(v1, v2, value).is_some() {
                        return true;
                    }
                }
                false
            }
        }
    })
}

/// Equality-only always. A single differing instant disqualifies, except
/// an unattained carrier at an excluded bound.
pub fn always_eq<V: BaseValue>(temp: &Temporal<V>, value: &V) -> bool {
    temp.as_sequences().iter().all(|seq| {
        let instants = seq.instants();
        let n = instants.len();
        match seq.interp() {
            Interp::Discrete | Interp::Linear => {
                instants.iter().all(|inst| inst.value() == value)
            }
            Interp::Step => {
                instants[..n - 1].iter().all(|inst| inst.value() == value)
                    && (!seq.period().upper_inc() || instants[n - 1].value() == value)
            }
        }
    })
}
