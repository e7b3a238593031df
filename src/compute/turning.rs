//! Turning-point resolvers.
//!
//! A lifted operation over linear segments is only piecewise-linear when
//! the underlying function is. Where it is not (a product of two linear
//! segments, a distance between two moving points, a comparison whose
//! operands cross), the result needs an extra instant strictly inside the
//! segment so that linear interpolation of the output stays exact. Each
//! resolver here answers one question: at which interior timestamp, if
//! any, must the segment be split?
//!
//! Resolvers return a timestamp only; the lifting engine samples both
//! operands there and applies the lifted function itself. A resolver never
//! returns a bound timestamp: fractions within [`EPSILON`] of either bound
//! are rejected, and the microsecond rounding of the result is checked
//! against the bounds again.

use crate::time::Timestamp;
use crate::value::{interior_fraction, EPSILON, GeogPoint, GeomPoint};

/// Resolver for a lifted binary operation over two synchronized segments.
/// Arguments are the start and end values of each operand's segment and
/// the segment bounds.
pub type SegmentResolver<A, B> = fn(&A, &A, &B, &B, Timestamp, Timestamp) -> Option<Timestamp>;

/// Resolver for a lifted operation between a segment and a constant.
pub type ValueResolver<A, B> = fn(&A, &A, &B, Timestamp, Timestamp) -> Option<Timestamp>;

/// Fraction agreement tolerance for resolvers that derive the same
/// crossing fraction from two independent computations.
const FRAC_AGREE: f64 = 1e-9;

/// Map an interior fraction to a timestamp, re-checking the bounds after
/// microsecond rounding. Every resolver funnels through here.
fn at_interior(lower: Timestamp, upper: Timestamp, frac: f64) -> Option<Timestamp> {
    let frac = interior_fraction(frac)?;
    let t = Timestamp::at_fraction(lower, upper, frac);
    if t <= lower || t >= upper {
        return None;
    }
    Some(t)
}

/// Extremum of the product or quotient of two linear number segments.
///
/// The product is a parabola in the segment fraction; its vertex lies at
/// the midpoint of the two single-segment roots, and the quotient bends
/// fastest at the same instant. Returns `None` when either segment is
/// constant, in which case the product is linear in the other operand
/// and needs no split.
pub fn number_arith_extremum(
    x1: &f64,
    x2: &f64,
    x3: &f64,
    x4: &f64,
    lower: Timestamp,
    upper: Timestamp,
) -> Option<Timestamp> {
    let d1 = x2 - x1;
    let d2 = x4 - x3;
    if d1 == 0.0 || d2 == 0.0 {
        return None;
    }
    let frac = (-x1 / d1 + -x3 / d2) / 2.0;
    at_interior(lower, upper, frac)
}

/// Crossing of two linear number segments: the interior fraction where
/// they take the same value. Splits comparison results so the order of
/// the operands is constant on each output segment.
pub fn number_crossing(
    x1: &f64,
    x2: &f64,
    x3: &f64,
    x4: &f64,
    lower: Timestamp,
    upper: Timestamp,
) -> Option<Timestamp> {
    let denom = x2 - x1 - x4 + x3;
    if denom == 0.0 {
        // Parallel segments never cross in the interior.
        return None;
    }
    let frac = (x3 - x1) / denom;
    at_interior(lower, upper, frac)
}

/// Crossing of a linear number segment with a constant.
pub fn number_value_crossing(
    x1: &f64,
    x2: &f64,
    target: &f64,
    lower: Timestamp,
    upper: Timestamp,
) -> Option<Timestamp> {
    let denom = x2 - x1;
    if denom == 0.0 {
        return None;
    }
    at_interior(lower, upper, (target - x1) / denom)
}

/// Instant at which two linearly moving planar points coincide.
///
/// Solves the relative motion per coordinate; the per-coordinate
/// fractions must agree, otherwise the trajectories pass without meeting.
pub fn planar_crossing(
    p1: &GeomPoint,
    p2: &GeomPoint,
    q1: &GeomPoint,
    q2: &GeomPoint,
    lower: Timestamp,
    upper: Timestamp,
) -> Option<Timestamp> {
    let rel_x = q1.x() - p1.x();
    let rel_y = q1.y() - p1.y();
    let vel_x = (p2.x() - p1.x()) - (q2.x() - q1.x());
    let vel_y = (p2.y() - p1.y()) - (q2.y() - q1.y());

    let frac_x = if vel_x != 0.0 {
        Some(rel_x / vel_x)
    } else if rel_x.abs() <= EPSILON {
        None // x already coincides for the whole segment
    } else {
        return None;
    };
    let frac_y = if vel_y != 0.0 {
        Some(rel_y / vel_y)
    } else if rel_y.abs() <= EPSILON {
        None
    } else {
        return None;
    };
    let frac = match (frac_x, frac_y) {
        (Some(fx), Some(fy)) => {
            if (fx - fy).abs() > FRAC_AGREE {
                return None;
            }
            fx
        }
        (Some(fx), None) => fx,
        (None, Some(fy)) => fy,
        // Both coordinates coincide throughout.
        (None, None) => return None,
    };
    at_interior(lower, upper, frac)
}

/// Instant of closest approach of two linearly moving planar points.
///
/// The squared distance is a parabola in the fraction; its vertex is
/// where the relative position is perpendicular to the relative velocity.
pub fn planar_closest_approach(
    p1: &GeomPoint,
    p2: &GeomPoint,
    q1: &GeomPoint,
    q2: &GeomPoint,
    lower: Timestamp,
    upper: Timestamp,
) -> Option<Timestamp> {
    let dp_x = p1.x() - q1.x();
    let dp_y = p1.y() - q1.y();
    let dv_x = (p2.x() - p1.x()) - (q2.x() - q1.x());
    let dv_y = (p2.y() - p1.y()) - (q2.y() - q1.y());
    let speed2 = dv_x * dv_x + dv_y * dv_y;
    if speed2 == 0.0 {
        return None;
    }
    let frac = -(dp_x * dv_x + dp_y * dv_y) / speed2;
    at_interior(lower, upper, frac)
}

/// Instant at which two great-circle segments meet.
///
/// Both arcs must reach the geometric intersection at the same fraction
/// of their respective segments, since each point moves at a constant
/// angular rate along its arc.
pub fn geodetic_crossing(
    p1: &GeogPoint,
    p2: &GeogPoint,
    q1: &GeogPoint,
    q2: &GeogPoint,
    lower: Timestamp,
    upper: Timestamp,
) -> Option<Timestamp> {
    let meet = crate::sphere::edge_intersection(p1, p2, q1, q2)?;
    let f1 = crate::sphere::locate_fraction(p1, p2, &meet)?;
    let f2 = crate::sphere::locate_fraction(q1, q2, &meet)?;
    if (f1 - f2).abs() > FRAC_AGREE {
        return None;
    }
    at_interior(lower, upper, f1)
}

/// Instant at which a moving planar point crosses the vertical line
/// through a reference point. The bearing towards the reference flips
/// through north or south there, so bearing results split on it.
pub fn planar_meridian_passage(
    p1: &GeomPoint,
    p2: &GeomPoint,
    reference: &GeomPoint,
    lower: Timestamp,
    upper: Timestamp,
) -> Option<Timestamp> {
    let dx = p2.x() - p1.x();
    if dx == 0.0 {
        return None;
    }
    at_interior(lower, upper, (reference.x() - p1.x()) / dx)
}

/// Instant at which a moving geodetic point crosses the meridian of a
/// reference point, where the great-circle bearing towards it reaches an
/// extremum.
pub fn geodetic_meridian_passage(
    p1: &GeogPoint,
    p2: &GeogPoint,
    reference: &GeogPoint,
    lower: Timestamp,
    upper: Timestamp,
) -> Option<Timestamp> {
    let frac = crate::sphere::meridian_crossing_fraction(p1, p2, reference)?;
    at_interior(lower, upper, frac)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(s: i64) -> Timestamp {
        Timestamp::from_secs(s)
    }

    #[test]
    fn test_number_crossing() {
        // 2 -> 4 and 3 -> 1 cross at fraction 0.25.
        let t = number_crossing(&2.0, &4.0, &3.0, &1.0, secs(0), secs(40)).unwrap();
        assert_eq!(t, secs(10));

        // Parallel segments.
        assert!(number_crossing(&2.0, &4.0, &3.0, &5.0, secs(0), secs(40)).is_none());
        // Crossing exactly at a bound is not interior.
        assert!(number_crossing(&2.0, &4.0, &2.0, &1.0, secs(0), secs(40)).is_none());
    }

    #[test]
    fn test_arith_extremum() {
        // (2 + 2f) * (3 - 2f): roots at f = -1 and f = 1.5, vertex at 0.25.
        let t = number_arith_extremum(&2.0, &4.0, &3.0, &1.0, secs(0), secs(40)).unwrap();
        assert_eq!(t, secs(10));

        // One constant operand keeps the product linear.
        assert!(number_arith_extremum(&2.0, &2.0, &3.0, &1.0, secs(0), secs(40)).is_none());
    }

    #[test]
    fn test_value_crossing() {
        let t = number_value_crossing(&0.0, &10.0, &2.5, secs(0), secs(40)).unwrap();
        assert_eq!(t, secs(10));
        assert!(number_value_crossing(&0.0, &10.0, &0.0, secs(0), secs(40)).is_none());
        assert!(number_value_crossing(&5.0, &5.0, &5.0, secs(0), secs(40)).is_none());
    }

    #[test]
    fn test_planar_crossing() {
        // Head-on along the x axis, meeting at fraction 0.5.
        let t = planar_crossing(
            &GeomPoint::new(0.0, 0.0),
            &GeomPoint::new(10.0, 0.0),
            &GeomPoint::new(10.0, 0.0),
            &GeomPoint::new(0.0, 0.0),
            secs(0),
            secs(10),
        )
        .unwrap();
        assert_eq!(t, secs(5));

        // Trajectories whose x and y fractions disagree never meet.
        assert!(planar_crossing(
            &GeomPoint::new(0.0, 0.0),
            &GeomPoint::new(10.0, 0.0),
            &GeomPoint::new(10.0, 1.0),
            &GeomPoint::new(0.0, 1.0),
            secs(0),
            secs(10),
        )
        .is_none());
    }

    #[test]
    fn test_closest_approach() {
        // One point fixed at the origin, the other passing overhead.
        let t = planar_closest_approach(
            &GeomPoint::new(-5.0, 1.0),
            &GeomPoint::new(5.0, 1.0),
            &GeomPoint::new(0.0, 0.0),
            &GeomPoint::new(0.0, 0.0),
            secs(0),
            secs(10),
        )
        .unwrap();
        assert_eq!(t, secs(5));

        // No relative motion.
        assert!(planar_closest_approach(
            &GeomPoint::new(0.0, 0.0),
            &GeomPoint::new(5.0, 0.0),
            &GeomPoint::new(1.0, 1.0),
            &GeomPoint::new(6.0, 1.0),
            secs(0),
            secs(10),
        )
        .is_none());
    }

    #[test]
    fn test_geodetic_crossing() {
        // Symmetric equator/meridian arcs meeting at the midpoint.
        let t = geodetic_crossing(
            &GeogPoint::new(-10.0, 0.0),
            &GeogPoint::new(10.0, 0.0),
            &GeogPoint::new(0.0, -10.0),
            &GeogPoint::new(0.0, 10.0),
            secs(0),
            secs(10),
        )
        .unwrap();
        assert_eq!(t, secs(5));
    }

    #[test]
    fn test_meridian_passage() {
        let t = planar_meridian_passage(
            &GeomPoint::new(-5.0, 10.0),
            &GeomPoint::new(5.0, 10.0),
            &GeomPoint::new(0.0, 0.0),
            secs(0),
            secs(10),
        )
        .unwrap();
        assert_eq!(t, secs(5));

        let t = geodetic_meridian_passage(
            &GeogPoint::new(-5.0, 10.0),
            &GeogPoint::new(5.0, 10.0),
            &GeogPoint::new(0.0, 50.0),
            secs(0),
            secs(10),
        )
        .unwrap();
        assert_eq!(t, secs(5));
    }
}
