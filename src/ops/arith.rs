//! Temporal arithmetic over number types.
//!
//! Sums and differences of linear segments are linear, so they lift with
//! grid sampling alone. Products and quotients bend between grid
//! instants and get an extremum instant from the turning-point resolver.
//! A divisor that takes zero anywhere on the evaluated overlap is
//! rejected up front; zeroes outside the overlap never get evaluated and
//! do not count.

use crate::compute::lift::{lift_binary, lift_with_value, LiftOptions, LiftValueOptions};
use crate::compute::predicate::ever_eq;
use crate::compute::restrict::at_period;
use crate::compute::turning::{self, SegmentResolver};
use crate::error::{Result, TemporalError};
use crate::model::Temporal;
use crate::value::BaseValue;

/// Number types usable in temporal arithmetic. Integer operations check
/// for overflow; float products carry the extremum resolver.
pub trait TemporalNumber: BaseValue {
    fn zero() -> Self;
    fn add(&self, other: &Self) -> Result<Self>;
    fn sub(&self, other: &Self) -> Result<Self>;
    fn mul(&self, other: &Self) -> Result<Self>;
    fn div(&self, other: &Self) -> Result<Self>;

    fn product_resolver() -> Option<SegmentResolver<Self, Self>> {
        None
    }
}

impl TemporalNumber for f64 {
    fn zero() -> Self {
        0.0
    }

    fn add(&self, other: &Self) -> Result<Self> {
        Ok(self + other)
    }

    fn sub(&self, other: &Self) -> Result<Self> {
        Ok(self - other)
    }

    fn mul(&self, other: &Self) -> Result<Self> {
        Ok(self * other)
    }

    fn div(&self, other: &Self) -> Result<Self> {
        Ok(self / other)
    }

    fn product_resolver() -> Option<SegmentResolver<Self, Self>> {
        Some(turning::number_arith_extremum)
    }
}

impl TemporalNumber for i64 {
    fn zero() -> Self {
        0
    }

    fn add(&self, other: &Self) -> Result<Self> {
        self.checked_add(*other)
            .ok_or_else(|| overflow("add", *self, *other))
    }

    fn sub(&self, other: &Self) -> Result<Self> {
        self.checked_sub(*other)
            .ok_or_else(|| overflow("subtract", *self, *other))
    }

    fn mul(&self, other: &Self) -> Result<Self> {
        self.checked_mul(*other)
            .ok_or_else(|| overflow("multiply", *self, *other))
    }

    fn div(&self, other: &Self) -> Result<Self> {
        self.checked_div(*other)
            .ok_or_else(|| overflow("divide", *self, *other))
    }
}

fn overflow(op: &str, a: i64, b: i64) -> TemporalError {
    TemporalError::NumericOverflow(format!("cannot {op} {a} and {b}"))
}

pub fn tadd<N: TemporalNumber>(
    lhs: &Temporal<N>,
    rhs: &Temporal<N>,
) -> Result<Option<Temporal<N>>> {
    lift_binary(lhs, rhs, &|a: &N, b: &N| a.add(b), &LiftOptions::default())
}

pub fn tsub<N: TemporalNumber>(
    lhs: &Temporal<N>,
    rhs: &Temporal<N>,
) -> Result<Option<Temporal<N>>> {
    lift_binary(lhs, rhs, &|a: &N, b: &N| a.sub(b), &LiftOptions::default())
}

pub fn tmul<N: TemporalNumber>(
    lhs: &Temporal<N>,
    rhs: &Temporal<N>,
) -> Result<Option<Temporal<N>>> {
    let opts = LiftOptions {
        resolver: N::product_resolver(),
        ..Default::default()
    };
    lift_binary(lhs, rhs, &|a: &N, b: &N| a.mul(b), &opts)
}

pub fn tdiv<N: TemporalNumber>(
    lhs: &Temporal<N>,
    rhs: &Temporal<N>,
) -> Result<Option<Temporal<N>>> {
    let Some(overlap) = lhs.period().intersection(&rhs.period()) else {
        return Ok(None);
    };
    // Only the divisor's restriction to the overlap gets evaluated.
    if at_period(rhs, &overlap).is_some_and(|divisor| ever_eq(&divisor, &N::zero())) {
        return Err(TemporalError::InvalidArgument(
            "temporal division by a divisor that takes zero".to_string(),
        ));
    }
    let opts = LiftOptions {
        resolver: N::product_resolver(),
        ..Default::default()
    };
    lift_binary(lhs, rhs, &|a: &N, b: &N| a.div(b), &opts)
}

pub fn tadd_value<N: TemporalNumber>(temp: &Temporal<N>, value: &N) -> Result<Temporal<N>> {
    lift_with_value(temp, value, &|a: &N, b: &N| a.add(b), &LiftValueOptions::default())
}

/// `invert` computes `value - temp` instead of `temp - value`.
pub fn tsub_value<N: TemporalNumber>(
    temp: &Temporal<N>,
    value: &N,
    invert: bool,
) -> Result<Temporal<N>> {
    let f = move |a: &N, b: &N| if invert { b.sub(a) } else { a.sub(b) };
    lift_with_value(temp, value, &f, &LiftValueOptions::default())
}

pub fn tmul_value<N: TemporalNumber>(temp: &Temporal<N>, value: &N) -> Result<Temporal<N>> {
    // Scaling a linear segment stays linear; no resolver needed.
    lift_with_value(temp, value, &|a: &N, b: &N| a.mul(b), &LiftValueOptions::default())
}

/// `invert` computes `value / temp` instead of `temp / value`.
pub fn tdiv_value<N: TemporalNumber>(
    temp: &Temporal<N>,
    value: &N,
    invert: bool,
) -> Result<Temporal<N>> {
    if invert {
        if ever_eq(temp, &N::zero()) {
            return Err(TemporalError::InvalidArgument(
                "temporal division by a divisor that takes zero".to_string(),
            ));
        }
    } else if *value == N::zero() {
        return Err(TemporalError::InvalidArgument(
            "temporal division by zero".to_string(),
        ));
    }
    let f = move |a: &N, b: &N| if invert { b.div(a) } else { a.div(b) };
    lift_with_value(temp, value, &f, &LiftValueOptions::default())
}

/// Pointwise negation.
pub fn tneg<N: TemporalNumber>(temp: &Temporal<N>) -> Result<Temporal<N>> {
    crate::compute::lift::lift_unary(temp, &|v: &N| N::zero().sub(v))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Instant, Interp, Sequence};
    use crate::time::Timestamp;

    fn floats(points: &[(f64, i64)]) -> Temporal<f64> {
        let instants: Vec<_> = points
            .iter()
            .map(|&(v, s)| Instant::new(v, Timestamp::from_secs(s)))
            .collect();
        Temporal::Sequence(Sequence::new(instants, Interp::Linear, true, true).unwrap())
    }

    fn ints(points: &[(i64, i64)]) -> Temporal<i64> {
        let instants: Vec<_> = points
            .iter()
            .map(|&(v, s)| Instant::new(v, Timestamp::from_secs(s)))
            .collect();
        Temporal::Sequence(Sequence::new(instants, Interp::Step, true, true).unwrap())
    }

    #[test]
    fn test_add_sub() {
        let a = floats(&[(1.0, 0), (3.0, 10)]);
        let b = floats(&[(2.0, 0), (2.0, 10)]);
        let sum = tadd(&a, &b).unwrap().unwrap();
        assert_eq!(sum.value_at(Timestamp::from_secs(5)).unwrap(), 4.0);
        let diff = tsub(&a, &b).unwrap().unwrap();
        assert_eq!(diff.value_at(Timestamp::from_secs(10)).unwrap(), 1.0);
    }

    #[test]
    fn test_mul_inserts_extremum() {
        let a = floats(&[(0.0, 0), (10.0, 10)]);
        let b = floats(&[(10.0, 0), (0.0, 10)]);
        let product = tmul(&a, &b).unwrap().unwrap();
        // t(10 - t) peaks at 25 at 5s; endpoints are zero.
        assert_eq!(product.num_instants(), 3);
        assert_eq!(product.value_at(Timestamp::from_secs(5)).unwrap(), 25.0);
    }

    #[test]
    fn test_div_by_zero_crossing_rejected() {
        let a = floats(&[(1.0, 0), (1.0, 10)]);
        let b = floats(&[(-1.0, 0), (1.0, 10)]); // crosses zero at 5s
        assert!(matches!(
            tdiv(&a, &b),
            Err(TemporalError::InvalidArgument(_))
        ));

        let safe = floats(&[(1.0, 0), (2.0, 10)]);
        assert!(tdiv(&a, &safe).unwrap().is_some());
    }

    #[test]
    fn test_div_zero_outside_overlap_allowed() {
        let a = floats(&[(1.0, 0), (2.0, 10)]);
        // Crosses zero at 15s, past the evaluated overlap [0s, 10s].
        let b = floats(&[(10.0, 0), (-10.0, 30)]);
        let quotient = tdiv(&a, &b).unwrap().unwrap();
        assert_eq!(quotient.value_at(Timestamp::from_secs(0)).unwrap(), 0.1);
    }

    #[test]
    fn test_div_disjoint_domains_absent() {
        let a = floats(&[(1.0, 0), (2.0, 10)]);
        let b = floats(&[(-1.0, 20), (1.0, 30)]);
        assert!(tdiv(&a, &b).unwrap().is_none());
    }

    #[test]
    fn test_div_inserts_turning_point() {
        let a = floats(&[(2.0, 0), (4.0, 10)]);
        let b = floats(&[(4.0, 0), (2.0, 10)]);
        let quotient = tdiv(&a, &b).unwrap().unwrap();
        // a/b dips to 1.0 at 5s; the endpoint chord would read 1.25 there.
        assert_eq!(quotient.num_instants(), 3);
        assert!((quotient.value_at(Timestamp::from_secs(5)).unwrap() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_int_overflow() {
        let a = ints(&[(i64::MAX, 0), (1, 10)]);
        let b = ints(&[(1, 0), (1, 10)]);
        assert!(matches!(
            tadd(&a, &b),
            Err(TemporalError::NumericOverflow(_))
        ));
    }

    #[test]
    fn test_value_variants() {
        let a = floats(&[(2.0, 0), (4.0, 10)]);
        let shifted = tadd_value(&a, &1.0).unwrap();
        assert_eq!(shifted.value_at(Timestamp::from_secs(0)).unwrap(), 3.0);

        let inverted = tsub_value(&a, &10.0, true).unwrap();
        assert_eq!(inverted.value_at(Timestamp::from_secs(0)).unwrap(), 8.0);

        assert!(tdiv_value(&a, &0.0, false).is_err());
        let halved = tdiv_value(&a, &2.0, false).unwrap();
        assert_eq!(halved.value_at(Timestamp::from_secs(10)).unwrap(), 2.0);
    }

    #[test]
    fn test_negation() {
        let a = floats(&[(2.0, 0), (-4.0, 10)]);
        let neg = tneg(&a).unwrap();
        assert_eq!(neg.value_at(Timestamp::from_secs(0)).unwrap(), -2.0);
        assert_eq!(neg.value_at(Timestamp::from_secs(10)).unwrap(), 4.0);
    }
}
