//! Temporal sequences: ordered instants under one interpolation mode.

use serde::{Deserialize, Serialize};

use crate::error::{Result, TemporalError};
use crate::model::instant::Instant;
use crate::time::{Period, Timestamp};
use crate::value::BaseValue;

/// How a sequence's value behaves between instants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Interp {
    /// Defined only at the instants themselves.
    Discrete,
    /// Holds the last instant's value until the next instant.
    Step,
    /// Interpolated between bracketing instants by the base type's rule.
    Linear,
}

impl Interp {
    /// The interpolation a result of combining two operands may carry:
    /// the weaker of the two. Any discrete operand forces pointwise-only
    /// evaluation.
    pub fn dominant(self, other: Interp) -> Interp {
        self.min(other)
    }

    /// Wire code for the mode.
    pub(crate) fn code(self) -> u8 {
        match self {
            Interp::Discrete => 0,
            Interp::Step => 1,
            Interp::Linear => 2,
        }
    }

    pub(crate) fn from_code(code: u8) -> Result<Self> {
        match code {
            0 => Ok(Interp::Discrete),
            1 => Ok(Interp::Step),
            2 => Ok(Interp::Linear),
            other => Err(TemporalError::Serialization(format!(
                "invalid interpolation code {other}"
            ))),
        }
    }
}

/// An ordered run of instants with strictly increasing timestamps, one
/// interpolation mode, and a period whose bound inclusivity is
/// independent of instant presence.
///
/// Sequences are immutable: every transformation yields a new sequence,
/// and the backing array is exclusively owned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sequence<V> {
    instants: Vec<Instant<V>>,
    interp: Interp,
    period: Period,
}

impl<V: BaseValue> Sequence<V> {
    /// Build a sequence, taking ownership of the instant array, and
    /// normalize it.
    pub fn new(
        instants: Vec<Instant<V>>,
        interp: Interp,
        lower_inc: bool,
        upper_inc: bool,
    ) -> Result<Self> {
        let mut seq = Self::new_raw(instants, interp, lower_inc, upper_inc)?;
        seq.instants = normalized(std::mem::take(&mut seq.instants), interp);
        Ok(seq)
    }

    /// Build a sequence by copying the instant slice, and normalize it.
    pub fn from_slice(
        instants: &[Instant<V>],
        interp: Interp,
        lower_inc: bool,
        upper_inc: bool,
    ) -> Result<Self> {
        Self::new(instants.to_vec(), interp, lower_inc, upper_inc)
    }

    /// Build a sequence without renormalizing. Used by deserialization,
    /// which must accept any validly-ordered stream as-is, and by
    /// internal call sites that require the instant grid to stay intact.
    pub(crate) fn new_raw(
        instants: Vec<Instant<V>>,
        interp: Interp,
        lower_inc: bool,
        upper_inc: bool,
    ) -> Result<Self> {
        if instants.is_empty() {
            return Err(TemporalError::InvalidArgument(
                "a sequence requires at least one instant".to_string(),
            ));
        }
        for pair in instants.windows(2) {
            if pair[0].timestamp() >= pair[1].timestamp() {
                return Err(TemporalError::InvalidArgument(format!(
                    "instant timestamps must be strictly increasing: {} then {}",
                    pair[0].timestamp(),
                    pair[1].timestamp()
                )));
            }
        }
        if interp == Interp::Linear && !V::CONTINUOUS {
            return Err(TemporalError::TypeMismatch(format!(
                "base type {} has no linear interpolation rule",
                V::NAME
            )));
        }
        if instants.len() == 1 && interp != Interp::Discrete && !(lower_inc && upper_inc) {
            return Err(TemporalError::InvalidArgument(
                "a single-instant sequence must have both bounds inclusive".to_string(),
            ));
        }
        if interp == Interp::Discrete && !(lower_inc && upper_inc) {
            return Err(TemporalError::InvalidArgument(
                "a discrete sequence must have both bounds inclusive".to_string(),
            ));
        }
        let first = instants[0].timestamp();
        let last = instants[instants.len() - 1].timestamp();
        let (lower_inc, upper_inc) = if instants.len() == 1 {
            (true, true)
        } else {
            (lower_inc, upper_inc)
        };
        let period = Period::new(first, last, lower_inc, upper_inc)?;
        Ok(Self {
            instants,
            interp,
            period,
        })
    }

    /// The single-instant sequence `[t, t]`.
    pub fn from_instant(instant: Instant<V>, interp: Interp) -> Self {
        let period = Period::instant(instant.timestamp());
        Self {
            instants: vec![instant],
            interp,
            period,
        }
    }

    pub fn instants(&self) -> &[Instant<V>] {
        &self.instants
    }

    pub fn interp(&self) -> Interp {
        self.interp
    }

    pub fn period(&self) -> &Period {
        &self.period
    }

    pub fn num_instants(&self) -> usize {
        self.instants.len()
    }

    pub fn start(&self) -> &Instant<V> {
        &self.instants[0]
    }

    pub fn end(&self) -> &Instant<V> {
        &self.instants[self.instants.len() - 1]
    }

    pub fn duration_micros(&self) -> i64 {
        self.period.duration_micros()
    }

    /// Smallest instant value; meaningful for ordered base types.
    pub fn min_value(&self) -> &V
    where
        V: PartialOrd,
    {
        self.fold_value(|a, b| a < b)
    }

    /// Largest instant value; meaningful for ordered base types.
    pub fn max_value(&self) -> &V
    where
        V: PartialOrd,
    {
        self.fold_value(|a, b| a > b)
    }

    fn fold_value(&self, better: impl Fn(&V, &V) -> bool) -> &V {
        let mut best = self.instants[0].value();
        for inst in &self.instants[1..] {
            if better(inst.value(), best) {
                best = inst.value();
            }
        }
        best
    }

    /// Index of the last instant at or before `t`, by binary search.
    pub(crate) fn find_timestamp(&self, t: Timestamp) -> Option<usize> {
        if t < self.instants[0].timestamp() {
            return None;
        }
        let idx = self
            .instants
            .partition_point(|inst| inst.timestamp() <= t);
        Some(idx - 1)
    }

    /// Value at `t`.
    ///
    /// A timestamp equal to an instant's returns that value exactly under
    /// every interpolation mode. Otherwise linear interpolates, step holds
    /// the left value, and discrete is undefined.
    pub fn value_at(&self, t: Timestamp) -> Result<V> {
        if !self.period.contains(t) {
            return Err(TemporalError::OutOfRange {
                t,
                period: self.period,
            });
        }
        let idx = self.find_timestamp(t).unwrap_or(0);
        let inst = &self.instants[idx];
        if inst.timestamp() == t {
            return Ok(inst.value().clone());
        }
        match self.interp {
            Interp::Discrete => Err(TemporalError::Undefined(t)),
            Interp::Step => Ok(inst.value().clone()),
            Interp::Linear => {
                let next = &self.instants[idx + 1];
                Ok(inst.segment_value_at(next, true, t))
            }
        }
    }

    /// Restrict the sequence to `period`, or `None` when the domains do
    /// not overlap.
    pub fn at_period(&self, period: &Period) -> Option<Sequence<V>> {
        let inter = self.period.intersection(period)?;
        if self.interp == Interp::Discrete {
            let kept: Vec<Instant<V>> = self
                .instants
                .iter()
                .filter(|inst| inter.contains(inst.timestamp()))
                .cloned()
                .collect();
            if kept.is_empty() {
                return None;
            }
            return Sequence::new_raw(kept, Interp::Discrete, true, true).ok();
        }
        if inter == self.period {
            return Some(self.clone());
        }
        if inter.is_instant() {
            let value = self.value_at(inter.lower()).ok()?;
            return Some(Sequence::from_instant(
                Instant::new(value, inter.lower()),
                self.interp,
            ));
        }
        let linear = self.interp == Interp::Linear;
        let mut kept: Vec<Instant<V>> = Vec::with_capacity(self.instants.len());
        let start_idx = self.find_timestamp(inter.lower()).unwrap_or(0);
        if self.instants[start_idx].timestamp() == inter.lower() {
            kept.push(self.instants[start_idx].clone());
        } else {
            let value = self.instants[start_idx].segment_value_at(
                &self.instants[start_idx + 1],
                linear,
                inter.lower(),
            );
            kept.push(Instant::new(value, inter.lower()));
        }
        for inst in &self.instants {
            if inst.timestamp() > inter.lower() && inst.timestamp() < inter.upper() {
                kept.push(inst.clone());
            }
        }
        let end_idx = self
            .find_timestamp(inter.upper())
            .unwrap_or(self.instants.len() - 1);
        if self.instants[end_idx].timestamp() == inter.upper() {
            kept.push(self.instants[end_idx].clone());
        } else {
            let value = self.instants[end_idx].segment_value_at(
                &self.instants[end_idx + 1],
                linear,
                inter.upper(),
            );
            kept.push(Instant::new(value, inter.upper()));
        }
        match Sequence::new_raw(kept, self.interp, inter.lower_inc(), inter.upper_inc()) {
            Ok(seq) => Some(seq),
            Err(err) => {
                log::warn!("dropping malformed restriction result: {err}");
                None
            }
        }
    }
}

/// Remove redundant middle instants.
///
/// Linear: a middle instant exactly on the interpolation between its
/// neighbors is dropped. Step: a middle instant repeating the previous
/// value is dropped; first and last instants always survive, so a value
/// held up to an exclusive bound keeps its carrier.
fn normalized<V: BaseValue>(instants: Vec<Instant<V>>, interp: Interp) -> Vec<Instant<V>> {
    if interp == Interp::Discrete || instants.len() < 3 {
        return instants;
    }
    let mut iter = instants.into_iter();
    let mut result = Vec::new();
    // First kept instant, candidate middle, and the instant after it.
    let mut kept = match iter.next() {
        Some(inst) => inst,
        None => return result,
    };
    let mut candidate = match iter.next() {
        Some(inst) => inst,
        None => {
            result.push(kept);
            return result;
        }
    };
    for next in iter {
        if removable(&kept, &candidate, &next, interp) {
            candidate = next;
        } else {
            result.push(kept);
            kept = candidate;
            candidate = next;
        }
    }
    result.push(kept);
    result.push(candidate);
    result
}

fn removable<V: BaseValue>(
    first: &Instant<V>,
    mid: &Instant<V>,
    last: &Instant<V>,
    interp: Interp,
) -> bool {
    match interp {
        Interp::Discrete => false,
        Interp::Step => first.value() == mid.value(),
        Interp::Linear => {
            let frac = mid
                .timestamp()
                .fraction_between(first.timestamp(), last.timestamp());
            V::collinear(first.value(), mid.value(), last.value(), frac)
        }
    }
}
