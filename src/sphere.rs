//! Great-circle helpers for geodetic turning-point resolvers.
//!
//! Geodetic segments are minor arcs of great circles on the unit sphere.
//! Intersections are computed with 3D unit vectors: the plane of an arc is
//! the cross product of its endpoints, and two great circles meet where
//! their planes intersect the sphere.

use crate::value::GeogPoint;

/// Angular tolerance in radians for arc containment tests. Looser than
/// the fraction tolerance because it absorbs the round-off of chained
/// trigonometric conversions.
const ARC_TOL: f64 = 1e-9;

#[derive(Debug, Clone, Copy)]
struct Vec3 {
    x: f64,
    y: f64,
    z: f64,
}

impl Vec3 {
    fn cross(self, other: Vec3) -> Vec3 {
        Vec3 {
            x: self.y * other.z - self.z * other.y,
            y: self.z * other.x - self.x * other.z,
            z: self.x * other.y - self.y * other.x,
        }
    }

    fn dot(self, other: Vec3) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    fn norm(self) -> f64 {
        self.dot(self).sqrt()
    }

    fn normalized(self) -> Option<Vec3> {
        let n = self.norm();
        if n == 0.0 {
            return None;
        }
        Some(Vec3 {
            x: self.x / n,
            y: self.y / n,
            z: self.z / n,
        })
    }

    fn negated(self) -> Vec3 {
        Vec3 {
            x: -self.x,
            y: -self.y,
            z: -self.z,
        }
    }

    /// Angle between two unit vectors in radians.
    fn angle_to(self, other: Vec3) -> f64 {
        self.dot(other).clamp(-1.0, 1.0).acos()
    }
}

fn unit(p: &GeogPoint) -> Vec3 {
    let lon = p.lon().to_radians();
    let lat = p.lat().to_radians();
    Vec3 {
        x: lat.cos() * lon.cos(),
        y: lat.cos() * lon.sin(),
        z: lat.sin(),
    }
}

fn to_point(v: Vec3) -> GeogPoint {
    let lat = v.z.clamp(-1.0, 1.0).asin().to_degrees();
    let lon = v.y.atan2(v.x).to_degrees();
    GeogPoint::new(lon, lat)
}

/// Whether `p` lies on the minor arc from `a` to `b`, within tolerance.
fn on_arc(a: Vec3, b: Vec3, p: Vec3) -> bool {
    let total = a.angle_to(b);
    a.angle_to(p) + p.angle_to(b) <= total + ARC_TOL
}

/// Intersection of the minor arcs `a1 -> a2` and `b1 -> b2`, if any.
///
/// Returns `None` for coplanar (parallel) arcs and for great-circle
/// intersections falling outside either arc.
pub(crate) fn edge_intersection(
    a1: &GeogPoint,
    a2: &GeogPoint,
    b1: &GeogPoint,
    b2: &GeogPoint,
) -> Option<GeogPoint> {
    let (ua1, ua2) = (unit(a1), unit(a2));
    let (ub1, ub2) = (unit(b1), unit(b2));
    let plane_a = ua1.cross(ua2).normalized()?;
    let plane_b = ub1.cross(ub2).normalized()?;
    let candidate = plane_a.cross(plane_b).normalized()?;
    for cand in [candidate, candidate.negated()] {
        if on_arc(ua1, ua2, cand) && on_arc(ub1, ub2, cand) {
            return Some(to_point(cand));
        }
    }
    None
}

/// Fraction in `[0, 1]` of the angular distance from `start` at which
/// `target` lies along the arc, or `None` when the target is off the arc.
pub(crate) fn locate_fraction(
    start: &GeogPoint,
    end: &GeogPoint,
    target: &GeogPoint,
) -> Option<f64> {
    let us = unit(start);
    let ue = unit(end);
    let ut = unit(target);
    if !on_arc(us, ue, ut) {
        return None;
    }
    let total = us.angle_to(ue);
    if total == 0.0 {
        return None;
    }
    Some(us.angle_to(ut) / total)
}

/// Intersection of the arc `start -> end` with the meridian through
/// `reference`, expressed as a fraction along the arc.
///
/// The meridian is modeled as a near-pole-to-pole arc at the reference
/// longitude, mirroring the passage test used for minimum-bearing
/// detection.
pub(crate) fn meridian_crossing_fraction(
    start: &GeogPoint,
    end: &GeogPoint,
    reference: &GeogPoint,
) -> Option<f64> {
    let north = GeogPoint::new(reference.lon(), 89.999999);
    let south = GeogPoint::new(reference.lon(), -89.999999);
    let crossing = edge_intersection(start, end, &north, &south)?;
    locate_fraction(start, end, &crossing)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equator_meridian_intersection() {
        // Equatorial arc crossing the prime meridian.
        let a1 = GeogPoint::new(-10.0, 0.0);
        let a2 = GeogPoint::new(10.0, 0.0);
        let b1 = GeogPoint::new(0.0, -10.0);
        let b2 = GeogPoint::new(0.0, 10.0);
        let p = edge_intersection(&a1, &a2, &b1, &b2).unwrap();
        assert!(p.lon().abs() < 1e-6);
        assert!(p.lat().abs() < 1e-6);
    }

    #[test]
    fn test_disjoint_arcs() {
        let a1 = GeogPoint::new(-10.0, 0.0);
        let a2 = GeogPoint::new(-5.0, 0.0);
        let b1 = GeogPoint::new(0.0, 5.0);
        let b2 = GeogPoint::new(0.0, 10.0);
        assert!(edge_intersection(&a1, &a2, &b1, &b2).is_none());
    }

    #[test]
    fn test_locate_fraction_midpoint() {
        let start = GeogPoint::new(0.0, 0.0);
        let end = GeogPoint::new(10.0, 0.0);
        let mid = GeogPoint::new(5.0, 0.0);
        let frac = locate_fraction(&start, &end, &mid).unwrap();
        assert!((frac - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_meridian_crossing() {
        let start = GeogPoint::new(-5.0, 10.0);
        let end = GeogPoint::new(5.0, 10.0);
        let reference = GeogPoint::new(0.0, 50.0);
        let frac = meridian_crossing_fraction(&start, &end, &reference).unwrap();
        assert!((frac - 0.5).abs() < 1e-6);
    }
}
