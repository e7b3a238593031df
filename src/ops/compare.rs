//! Temporal comparisons, producing a temporal boolean.
//!
//! Comparison results are stepwise and discontinuous: over linear
//! operands they flip where the operands cross, so every comparison
//! lifts with forced step output and the base type's crossing resolver.

use crate::compute::lift::{lift_binary, lift_with_value, LiftOptions, LiftValueOptions};
use crate::compute::predicate::Cmp;
use crate::compute::turning::{self, SegmentResolver, ValueResolver};
use crate::error::Result;
use crate::model::Temporal;
use crate::value::{BaseValue, GeogPoint, GeomPoint};

/// Base types whose temporal equality needs a crossing split: continuous
/// types where two moving values can meet inside a segment.
pub trait Crossable: BaseValue {
    fn crossing() -> Option<SegmentResolver<Self, Self>>
    where
        Self: Sized,
    {
        None
    }

    fn value_crossing() -> Option<ValueResolver<Self, Self>>
    where
        Self: Sized,
    {
        None
    }
}

impl Crossable for bool {}
impl Crossable for i64 {}
impl Crossable for String {}

impl Crossable for f64 {
    fn crossing() -> Option<SegmentResolver<Self, Self>> {
        Some(turning::number_crossing)
    }

    fn value_crossing() -> Option<ValueResolver<Self, Self>> {
        Some(turning::number_value_crossing)
    }
}

impl Crossable for GeomPoint {
    fn crossing() -> Option<SegmentResolver<Self, Self>> {
        Some(turning::planar_crossing)
    }
}

impl Crossable for GeogPoint {
    fn crossing() -> Option<SegmentResolver<Self, Self>> {
        Some(turning::geodetic_crossing)
    }
}

fn compare<V: Crossable + PartialOrd>(
    lhs: &Temporal<V>,
    rhs: &Temporal<V>,
    cmp: Cmp,
) -> Result<Option<Temporal<bool>>> {
    let opts = LiftOptions {
        resolver: V::crossing(),
        forced_step: true,
        discontinuous: true,
    };
    lift_binary(lhs, rhs, &move |a: &V, b: &V| Ok(cmp.test(a, b)), &opts)
}

fn compare_value<V: Crossable + PartialOrd>(
    temp: &Temporal<V>,
    value: &V,
    cmp: Cmp,
) -> Result<Temporal<bool>> {
    let opts = LiftValueOptions {
        resolver: V::value_crossing(),
        forced_step: true,
        discontinuous: true,
    };
    lift_with_value(temp, value, &move |a: &V, b: &V| Ok(cmp.test(a, b)), &opts)
}

pub fn teq<V: Crossable + PartialOrd>(
    lhs: &Temporal<V>,
    rhs: &Temporal<V>,
) -> Result<Option<Temporal<bool>>> {
    compare(lhs, rhs, Cmp::Eq)
}

pub fn tne<V: Crossable + PartialOrd>(
    lhs: &Temporal<V>,
    rhs: &Temporal<V>,
) -> Result<Option<Temporal<bool>>> {
    compare(lhs, rhs, Cmp::Ne)
}

pub fn tlt<V: Crossable + PartialOrd>(
    lhs: &Temporal<V>,
    rhs: &Temporal<V>,
) -> Result<Option<Temporal<bool>>> {
    compare(lhs, rhs, Cmp::Lt)
}

pub fn tle<V: Crossable + PartialOrd>(
    lhs: &Temporal<V>,
    rhs: &Temporal<V>,
) -> Result<Option<Temporal<bool>>> {
    compare(lhs, rhs, Cmp::Le)
}

pub fn tgt<V: Crossable + PartialOrd>(
    lhs: &Temporal<V>,
    rhs: &Temporal<V>,
) -> Result<Option<Temporal<bool>>> {
    compare(lhs, rhs, Cmp::Gt)
}

pub fn tge<V: Crossable + PartialOrd>(
    lhs: &Temporal<V>,
    rhs: &Temporal<V>,
) -> Result<Option<Temporal<bool>>> {
    compare(lhs, rhs, Cmp::Ge)
}

pub fn teq_value<V: Crossable + PartialOrd>(
    temp: &Temporal<V>,
    value: &V,
) -> Result<Temporal<bool>> {
    compare_value(temp, value, Cmp::Eq)
}

pub fn tne_value<V: Crossable + PartialOrd>(
    temp: &Temporal<V>,
    value: &V,
) -> Result<Temporal<bool>> {
    compare_value(temp, value, Cmp::Ne)
}

pub fn tlt_value<V: Crossable + PartialOrd>(
    temp: &Temporal<V>,
    value: &V,
) -> Result<Temporal<bool>> {
    compare_value(temp, value, Cmp::Lt)
}

pub fn tle_value<V: Crossable + PartialOrd>(
    temp: &Temporal<V>,
    value: &V,
) -> Result<Temporal<bool>> {
    compare_value(temp, value, Cmp::Le)
}

pub fn tgt_value<V: Crossable + PartialOrd>(
    temp: &Temporal<V>,
    value: &V,
) -> Result<Temporal<bool>> {
    compare_value(temp, value, Cmp::Gt)
}

pub fn tge_value<V: Crossable + PartialOrd>(
    temp: &Temporal<V>,
    value: &V,
) -> Result<Temporal<bool>> {
    compare_value(temp, value, Cmp::Ge)
}

/// Temporal equality for types without an order (points): splits at the
/// instant the trajectories meet.
pub fn teq_point<V: Crossable>(
    lhs: &Temporal<V>,
    rhs: &Temporal<V>,
) -> Result<Option<Temporal<bool>>> {
    let opts = LiftOptions {
        resolver: V::crossing(),
        forced_step: true,
        discontinuous: true,
    };
    lift_binary(lhs, rhs, &|a: &V, b: &V| Ok(a == b), &opts)
}
