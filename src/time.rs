//! Timestamps and time periods with explicit bound inclusivity.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TemporalError};

/// A point in time with microsecond resolution.
///
/// Stored as microseconds since the Unix epoch, matching the wire format
/// and giving exact integer arithmetic for grid alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(i64);

impl Timestamp {
    pub const fn from_micros(micros: i64) -> Self {
        Self(micros)
    }

    pub const fn from_millis(millis: i64) -> Self {
        Self(millis * 1_000)
    }

    pub const fn from_secs(secs: i64) -> Self {
        Self(secs * 1_000_000)
    }

    pub const fn micros(self) -> i64 {
        self.0
    }

    /// Microseconds elapsed from `self` to `other` (negative if `other`
    /// is earlier).
    pub const fn micros_until(self, other: Timestamp) -> i64 {
        other.0 - self.0
    }

    /// Position of `self` inside `[start, end]` as a fraction in `[0, 1]`.
    ///
    /// Returns 0.0 for a degenerate interval.
    pub fn fraction_between(self, start: Timestamp, end: Timestamp) -> f64 {
        let span = end.0 - start.0;
        if span == 0 {
            return 0.0;
        }
        (self.0 - start.0) as f64 / span as f64
    }

    /// The timestamp at `frac` of the way from `start` to `end`.
    pub fn at_fraction(start: Timestamp, end: Timestamp, frac: f64) -> Timestamp {
        let span = (end.0 - start.0) as f64;
        Timestamp(start.0 + (span * frac) as i64)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}us", self.0)
    }
}

/// A time interval with independently inclusive or exclusive bounds.
///
/// Invariant: `lower <= upper`, and a degenerate period (`lower == upper`)
/// has both bounds inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    lower: Timestamp,
    upper: Timestamp,
    lower_inc: bool,
    upper_inc: bool,
}

impl Period {
    /// Create a period, validating the bound invariant.
    pub fn new(
        lower: Timestamp,
        upper: Timestamp,
        lower_inc: bool,
        upper_inc: bool,
    ) -> Result<Self> {
        if lower > upper {
            return Err(TemporalError::InvalidArgument(format!(
                "period lower bound {lower} is after upper bound {upper}"
            )));
        }
        if lower == upper && !(lower_inc && upper_inc) {
            return Err(TemporalError::InvalidArgument(
                "a degenerate period must have both bounds inclusive".to_string(),
            ));
        }
        Ok(Self {
            lower,
            upper,
            lower_inc,
            upper_inc,
        })
    }

    /// The degenerate period `[t, t]`.
    pub fn instant(t: Timestamp) -> Self {
        Self {
            lower: t,
            upper: t,
            lower_inc: true,
            upper_inc: true,
        }
    }

    pub fn lower(&self) -> Timestamp {
        self.lower
    }

    pub fn upper(&self) -> Timestamp {
        self.upper
    }

    pub fn lower_inc(&self) -> bool {
        self.lower_inc
    }

    pub fn upper_inc(&self) -> bool {
        self.upper_inc
    }

    pub fn is_instant(&self) -> bool {
        self.lower == self.upper
    }

    /// Duration of the period in microseconds.
    pub fn duration_micros(&self) -> i64 {
        self.upper.0 - self.lower.0
    }

    /// Whether `t` lies inside the period, honoring bound inclusivity.
    pub fn contains(&self, t: Timestamp) -> bool {
        if t < self.lower || t > self.upper {
            return false;
        }
        if t == self.lower && !self.lower_inc {
            return false;
        }
        if t == self.upper && !self.upper_inc {
            return false;
        }
        true
    }

    /// Whether the two periods share at least one timestamp.
    pub fn overlaps(&self, other: &Period) -> bool {
        self.intersection(other).is_some()
    }

    /// The intersection of two periods, or `None` when they are disjoint
    /// or touch only at a mutually excluded endpoint.
    pub fn intersection(&self, other: &Period) -> Option<Period> {
        let (lower, lower_inc) = tighter_lower(
            (self.lower, self.lower_inc),
            (other.lower, other.lower_inc),
        );
        let (upper, upper_inc) = tighter_upper(
            (self.upper, self.upper_inc),
            (other.upper, other.upper_inc),
        );
        if lower > upper || (lower == upper && !(lower_inc && upper_inc)) {
            return None;
        }
        Some(Period {
            lower,
            upper,
            lower_inc,
            upper_inc,
        })
    }

    /// Subtract an ordered list of pairwise-disjoint periods from this
    /// one, returning the remaining pieces in time order.
    pub fn minus(&self, others: &[Period]) -> Vec<Period> {
        let mut result = Vec::new();
        let mut lower = self.lower;
        let mut lower_inc = self.lower_inc;
        for other in others {
            let Some(inter) = self.intersection(other) else {
                continue;
            };
            // Piece before the subtracted period, possibly degenerate.
            let piece_upper = inter.lower;
            let piece_upper_inc = !inter.lower_inc;
            if lower < piece_upper || (lower == piece_upper && lower_inc && piece_upper_inc) {
                result.push(Period {
                    lower,
                    upper: piece_upper,
                    lower_inc,
                    upper_inc: piece_upper_inc,
                });
            }
            lower = inter.upper;
            lower_inc = !inter.upper_inc;
        }
        if lower < self.upper || (lower == self.upper && lower_inc && self.upper_inc) {
            result.push(Period {
                lower,
                upper: self.upper,
                lower_inc,
                upper_inc: self.upper_inc,
            });
        }
        result
    }

    /// The smallest period covering both inputs.
    pub fn hull(&self, other: &Period) -> Period {
        let (lower, lower_inc) = if self.lower < other.lower
            || (self.lower == other.lower && self.lower_inc)
        {
            (self.lower, self.lower_inc)
        } else {
            (other.lower, other.lower_inc)
        };
        let (upper, upper_inc) = if self.upper > other.upper
            || (self.upper == other.upper && self.upper_inc)
        {
            (self.upper, self.upper_inc)
        } else {
            (other.upper, other.upper_inc)
        };
        Period {
            lower,
            upper,
            lower_inc,
            upper_inc,
        }
    }

    /// Whether `self` ends strictly before `other` starts, i.e. the
    /// periods are disjoint with `self` first.
    pub fn is_before(&self, other: &Period) -> bool {
        self.upper < other.lower
            || (self.upper == other.lower && !(self.upper_inc && other.lower_inc))
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}, {}{}",
            if self.lower_inc { '[' } else { '(' },
            self.lower,
            self.upper,
            if self.upper_inc { ']' } else { ')' },
        )
    }
}

/// The tighter (later, or equally placed but exclusive) of two lower bounds.
fn tighter_lower(a: (Timestamp, bool), b: (Timestamp, bool)) -> (Timestamp, bool) {
    if a.0 > b.0 || (a.0 == b.0 && !a.1) {
        a
    } else {
        b
    }
}

/// The tighter (earlier, or equally placed but exclusive) of two upper bounds.
fn tighter_upper(a: (Timestamp, bool), b: (Timestamp, bool)) -> (Timestamp, bool) {
    if a.0 < b.0 || (a.0 == b.0 && !a.1) {
        a
    } else {
        b
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(lo: i64, hi: i64, li: bool, ui: bool) -> Period {
        Period::new(
            Timestamp::from_secs(lo),
            Timestamp::from_secs(hi),
            li,
            ui,
        )
        .unwrap()
    }

    #[test]
    fn test_period_invariants() {
        assert!(Period::new(
            Timestamp::from_secs(2),
            Timestamp::from_secs(1),
            true,
            true
        )
        .is_err());
        assert!(Period::new(
            Timestamp::from_secs(1),
            Timestamp::from_secs(1),
            true,
            false
        )
        .is_err());
        assert!(p(1, 1, true, true).is_instant());
    }

    #[test]
    fn test_contains_bounds() {
        let period = p(0, 10, true, false);
        assert!(period.contains(Timestamp::from_secs(0)));
        assert!(period.contains(Timestamp::from_secs(5)));
        assert!(!period.contains(Timestamp::from_secs(10)));
        assert!(!period.contains(Timestamp::from_secs(11)));
    }

    #[test]
    fn test_intersection() {
        let a = p(0, 10, true, true);
        let b = p(5, 15, true, true);
        let inter = a.intersection(&b).unwrap();
        assert_eq!(inter, p(5, 10, true, true));

        // Touching with compatible inclusivity yields a degenerate period.
        let c = p(10, 20, true, true);
        assert_eq!(a.intersection(&c).unwrap(), p(10, 10, true, true));

        // Touching at a mutually excluded endpoint does not intersect.
        let d = p(0, 10, true, false);
        assert!(d.intersection(&c).is_none());

        assert!(p(0, 1, true, true).intersection(&p(2, 3, true, true)).is_none());
    }

    #[test]
    fn test_minus() {
        let whole = p(0, 10, true, true);
        let pieces = whole.minus(&[p(2, 4, true, false), p(6, 8, false, true)]);
        assert_eq!(
            pieces,
            vec![p(0, 2, true, false), p(4, 6, true, true), p(8, 10, false, true)]
        );

        // Subtracting a covering period leaves nothing.
        assert!(whole.minus(&[p(0, 10, true, true)]).is_empty());
    }

    #[test]
    fn test_fraction_roundtrip() {
        let start = Timestamp::from_secs(0);
        let end = Timestamp::from_secs(10);
        let mid = Timestamp::at_fraction(start, end, 0.25);
        assert_eq!(mid, Timestamp::from_micros(2_500_000));
        assert!((mid.fraction_between(start, end) - 0.25).abs() < 1e-12);
    }
}
