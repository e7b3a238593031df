//! Spatial operations on temporal points: distance, intersection, and
//! bearing.
//!
//! Planar distance between two moving points reaches its minimum where
//! the relative position is perpendicular to the relative velocity, so
//! the closest-approach resolver splits segments there. Geodetic
//! distance is sampled at the grid instants only. Bearing towards a
//! fixed reference splits where the trajectory crosses the reference's
//! meridian, the instant the azimuth sweeps through north or south.

use crate::compute::lift::{lift_binary, lift_with_value, LiftOptions, LiftValueOptions};
use crate::compute::predicate::ever_eq;
use crate::compute::turning;
use crate::error::{Result, TemporalError};
use crate::model::Temporal;
use crate::ops::compare::teq_point;
use crate::time::Timestamp;
use crate::value::{BaseValue, GeogPoint, GeomPoint};

fn point_distance<V: BaseValue>(a: &V, b: &V) -> Result<f64> {
    a.distance(b).ok_or_else(|| {
        TemporalError::TypeMismatch(format!("base type {} has no distance metric", V::NAME))
    })
}

/// Temporal distance in plane units between two moving planar points.
pub fn tdistance(
    lhs: &Temporal<GeomPoint>,
    rhs: &Temporal<GeomPoint>,
) -> Result<Option<Temporal<f64>>> {
    let opts = LiftOptions {
        resolver: Some(turning::planar_closest_approach),
        ..Default::default()
    };
    lift_binary(lhs, rhs, &point_distance::<GeomPoint>, &opts)
}

fn closest_approach_to_point(
    p1: &GeomPoint,
    p2: &GeomPoint,
    q: &GeomPoint,
    lower: Timestamp,
    upper: Timestamp,
) -> Option<Timestamp> {
    turning::planar_closest_approach(p1, p2, q, q, lower, upper)
}

/// Temporal distance between a moving planar point and a fixed one.
pub fn tdistance_value(
    temp: &Temporal<GeomPoint>,
    point: &GeomPoint,
) -> Result<Temporal<f64>> {
    let opts = LiftValueOptions {
        resolver: Some(closest_approach_to_point),
        ..Default::default()
    };
    lift_with_value(temp, point, &point_distance::<GeomPoint>, &opts)
}

/// Temporal great-circle distance in meters between two moving geodetic
/// points, sampled at the synchronized grid instants.
pub fn tdistance_geog(
    lhs: &Temporal<GeogPoint>,
    rhs: &Temporal<GeogPoint>,
) -> Result<Option<Temporal<f64>>> {
    lift_binary(lhs, rhs, &point_distance::<GeogPoint>, &LiftOptions::default())
}

/// Temporal great-circle distance between a moving geodetic point and a
/// fixed one.
pub fn tdistance_geog_value(
    temp: &Temporal<GeogPoint>,
    point: &GeogPoint,
) -> Result<Temporal<f64>> {
    lift_with_value(
        temp,
        point,
        &point_distance::<GeogPoint>,
        &LiftValueOptions::default(),
    )
}

/// Temporal boolean: whether the two moving points coincide. Splits at
/// the meeting instant.
pub fn tintersects<V: crate::ops::compare::Crossable>(
    lhs: &Temporal<V>,
    rhs: &Temporal<V>,
) -> Result<Option<Temporal<bool>>> {
    teq_point(lhs, rhs)
}

/// Whether the two moving points ever coincide.
pub fn ever_intersects<V: crate::ops::compare::Crossable>(
    lhs: &Temporal<V>,
    rhs: &Temporal<V>,
) -> Result<bool> {
    Ok(tintersects(lhs, rhs)?
        .map_or(false, |meets| ever_eq(&meets, &true)))
}

/// Temporal azimuth in degrees from a moving planar point towards a
/// fixed reference, clockwise from north.
pub fn tbearing_value(
    temp: &Temporal<GeomPoint>,
    reference: &GeomPoint,
) -> Result<Temporal<f64>> {
    let opts = LiftValueOptions {
        resolver: Some(turning::planar_meridian_passage),
        ..Default::default()
    };
    lift_with_value(
        temp,
        reference,
        &|p: &GeomPoint, q: &GeomPoint| Ok(p.bearing_to(q)),
        &opts,
    )
}

/// Temporal initial great-circle bearing from a moving geodetic point
/// towards a fixed reference.
pub fn tbearing_geog_value(
    temp: &Temporal<GeogPoint>,
    reference: &GeogPoint,
) -> Result<Temporal<f64>> {
    let opts = LiftValueOptions {
        resolver: Some(turning::geodetic_meridian_passage),
        ..Default::default()
    };
    lift_with_value(
        temp,
        reference,
        &|p: &GeogPoint, q: &GeogPoint| Ok(p.bearing_to(q)),
        &opts,
    )
}
