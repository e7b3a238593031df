//! Base-value capability seam.
//!
//! Every base type a temporal value can range over implements [`BaseValue`]:
//! equality (via `PartialEq`), an interpolation rule, an optional distance
//! metric for the similarity engine, an optional exact segment-at-value
//! solver for restriction and predicates, and the wire encoding of a single
//! value. The closed set of implementations (boolean, integer, float, text,
//! planar point, geodetic point) replaces a runtime type catalog: dispatch
//! is resolved when a temporal value is constructed.

use bytes::{Buf, BufMut, BytesMut};
use geo::{Bearing, Distance, Euclidean, Haversine, InterpolatePoint, Point};
use serde::{Deserialize, Serialize};

use crate::error::{Result, TemporalError};

/// Tolerance applied uniformly by every turning-point resolver, segment
/// solver, and floating-point comparison in the crate. Resolvers reject
/// fractions in `[0, EPSILON]` or `[1 - EPSILON, 1]` since the segment
/// bounds are already represented by grid instants.
pub const EPSILON: f64 = 1e-12;

/// Capabilities a base type must provide to participate in temporal values.
pub trait BaseValue: Clone + PartialEq + std::fmt::Debug {
    /// Type name used in error messages.
    const NAME: &'static str;

    /// Whether the type carries a linear interpolation rule. Sequences
    /// with linear interpolation are rejected for types where this is
    /// false.
    const CONTINUOUS: bool;

    /// Value at `frac` of the way from `self` to `other`.
    ///
    /// Only called for continuous types; step types return `self`.
    fn lerp(&self, other: &Self, frac: f64) -> Self;

    /// Whether `mid` is exactly the interpolation of `first` and `last`
    /// at `frac`, by this type's interpolation rule. Drives linear
    /// normalization; step types never report collinearity.
    fn collinear(first: &Self, mid: &Self, last: &Self, frac: f64) -> bool {
        let _ = (first, mid, last, frac);
        false
    }

    /// Distance between two values for the similarity engine, or `None`
    /// when the type has no metric.
    fn distance(&self, other: &Self) -> Option<f64> {
        let _ = other;
        None
    }

    /// Fraction strictly inside `(0, 1)` at which the linear segment
    /// `start -> end` takes `target`, or `None` when it does not (or only
    /// at a bound). Powers value restriction and ever/always.
    fn segment_at_value(start: &Self, end: &Self, target: &Self) -> Option<f64> {
        let _ = (start, end, target);
        None
    }

    /// Append the wire encoding of the value.
    fn encode(&self, buf: &mut BytesMut);

    /// Decode one value from the front of `buf`, advancing it.
    fn decode(buf: &mut &[u8]) -> Result<Self>;
}

fn need(buf: &&[u8], n: usize, what: &str) -> Result<()> {
    if buf.remaining() < n {
        return Err(TemporalError::Serialization(format!(
            "truncated input: expected {n} more bytes for {what}"
        )));
    }
    Ok(())
}

impl BaseValue for bool {
    const NAME: &'static str = "bool";
    const CONTINUOUS: bool = false;

    fn lerp(&self, _other: &Self, _frac: f64) -> Self {
        *self
    }

    fn encode(&self, buf: &mut BytesMut) {
        buf.put_u8(u8::from(*self));
    }

    fn decode(buf: &mut &[u8]) -> Result<Self> {
        need(buf, 1, "bool")?;
        match buf.get_u8() {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(TemporalError::Serialization(format!(
                "invalid bool byte {other}"
            ))),
        }
    }
}

impl BaseValue for i64 {
    const NAME: &'static str = "int";
    const CONTINUOUS: bool = false;

    fn lerp(&self, _other: &Self, _frac: f64) -> Self {
        *self
    }

    fn distance(&self, other: &Self) -> Option<f64> {
        Some((*self as f64 - *other as f64).abs())
    }

    fn encode(&self, buf: &mut BytesMut) {
        buf.put_i64_le(*self);
    }

    fn decode(buf: &mut &[u8]) -> Result<Self> {
        need(buf, 8, "int")?;
        Ok(buf.get_i64_le())
    }
}

impl BaseValue for f64 {
    const NAME: &'static str = "float";
    const CONTINUOUS: bool = true;

    fn lerp(&self, other: &Self, frac: f64) -> Self {
        self + (other - self) * frac
    }

    fn collinear(first: &Self, mid: &Self, last: &Self, frac: f64) -> bool {
        (first.lerp(last, frac) - mid).abs() <= EPSILON
    }

    fn distance(&self, other: &Self) -> Option<f64> {
        Some((self - other).abs())
    }

    fn segment_at_value(start: &Self, end: &Self, target: &Self) -> Option<f64> {
        // A value equal to either endpoint belongs to the grid, not to
        // the segment interior.
        if target == start || target == end {
            return None;
        }
        let min = start.min(*end);
        let max = start.max(*end);
        if *target < min || *target > max {
            return None;
        }
        let span = max - min;
        if span == 0.0 {
            return None;
        }
        let partial = target - min;
        let fraction = if start < end {
            partial / span
        } else {
            1.0 - partial / span
        };
        interior_fraction(fraction)
    }

    fn encode(&self, buf: &mut BytesMut) {
        buf.put_f64_le(*self);
    }

    fn decode(buf: &mut &[u8]) -> Result<Self> {
        need(buf, 8, "float")?;
        Ok(buf.get_f64_le())
    }
}

impl BaseValue for String {
    const NAME: &'static str = "text";
    const CONTINUOUS: bool = false;

    fn lerp(&self, _other: &Self, _frac: f64) -> Self {
        self.clone()
    }

    fn encode(&self, buf: &mut BytesMut) {
        buf.put_u32_le(self.len() as u32);
        buf.put_slice(self.as_bytes());
    }

    fn decode(buf: &mut &[u8]) -> Result<Self> {
        need(buf, 4, "text length")?;
        let len = buf.get_u32_le() as usize;
        need(buf, len, "text body")?;
        let bytes = buf[..len].to_vec();
        buf.advance(len);
        String::from_utf8(bytes)
            .map_err(|e| TemporalError::Serialization(format!("invalid utf-8 in text value: {e}")))
    }
}

/// A point in a planar (projected) coordinate system.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeomPoint {
    x: f64,
    y: f64,
}

impl GeomPoint {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub const fn x(&self) -> f64 {
        self.x
    }

    pub const fn y(&self) -> f64 {
        self.y
    }

    pub fn to_geo(self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Clockwise-from-north azimuth towards `other`, in degrees `[0, 360)`.
    pub fn bearing_to(&self, other: &GeomPoint) -> f64 {
        let degrees = (other.x - self.x).atan2(other.y - self.y).to_degrees();
        degrees.rem_euclid(360.0)
    }
}

impl BaseValue for GeomPoint {
    const NAME: &'static str = "geom_point";
    const CONTINUOUS: bool = true;

    fn lerp(&self, other: &Self, frac: f64) -> Self {
        let p = Euclidean.point_at_ratio_between(self.to_geo(), other.to_geo(), frac);
        Self::new(p.x(), p.y())
    }

    fn collinear(first: &Self, mid: &Self, last: &Self, frac: f64) -> bool {
        let interp = first.lerp(last, frac);
        (interp.x - mid.x).abs() <= EPSILON && (interp.y - mid.y).abs() <= EPSILON
    }

    fn distance(&self, other: &Self) -> Option<f64> {
        Some(Euclidean.distance(self.to_geo(), other.to_geo()))
    }

    fn segment_at_value(start: &Self, end: &Self, target: &Self) -> Option<f64> {
        if target == start || target == end {
            return None;
        }
        let dx = end.x - start.x;
        let dy = end.y - start.y;
        let len2 = dx * dx + dy * dy;
        if len2 == 0.0 {
            return None;
        }
        // Closest point on the segment; accept only if the target lies on
        // the segment within tolerance.
        let fraction = ((target.x - start.x) * dx + (target.y - start.y) * dy) / len2;
        let fraction = interior_fraction(fraction)?;
        let proj = start.lerp(end, fraction);
        let dist = Euclidean.distance(proj.to_geo(), target.to_geo());
        if dist > EPSILON {
            return None;
        }
        Some(fraction)
    }

    fn encode(&self, buf: &mut BytesMut) {
        buf.put_f64_le(self.x);
        buf.put_f64_le(self.y);
    }

    fn decode(buf: &mut &[u8]) -> Result<Self> {
        need(buf, 16, "geom_point")?;
        let x = buf.get_f64_le();
        let y = buf.get_f64_le();
        Ok(Self::new(x, y))
    }
}

/// A geodetic point as longitude/latitude degrees on the WGS84 sphere.
///
/// Interpolation follows the great circle and distances are meters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeogPoint {
    lon: f64,
    lat: f64,
}

impl GeogPoint {
    pub const fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    pub const fn lon(&self) -> f64 {
        self.lon
    }

    pub const fn lat(&self) -> f64 {
        self.lat
    }

    pub fn to_geo(self) -> Point {
        Point::new(self.lon, self.lat)
    }

    /// Initial great-circle bearing towards `other`, clockwise from
    /// north, in degrees `[0, 360)`.
    pub fn bearing_to(&self, other: &GeogPoint) -> f64 {
        Haversine
            .bearing(self.to_geo(), other.to_geo())
            .rem_euclid(360.0)
    }
}

impl BaseValue for GeogPoint {
    const NAME: &'static str = "geog_point";
    const CONTINUOUS: bool = true;

    fn lerp(&self, other: &Self, frac: f64) -> Self {
        let p = Haversine.point_at_ratio_between(self.to_geo(), other.to_geo(), frac);
        Self::new(p.x(), p.y())
    }

    fn collinear(first: &Self, mid: &Self, last: &Self, frac: f64) -> bool {
        let interp = first.lerp(last, frac);
        (interp.lon - mid.lon).abs() <= EPSILON && (interp.lat - mid.lat).abs() <= EPSILON
    }

    fn distance(&self, other: &Self) -> Option<f64> {
        Some(Haversine.distance(self.to_geo(), other.to_geo()))
    }

    fn segment_at_value(start: &Self, end: &Self, target: &Self) -> Option<f64> {
        if target == start || target == end {
            return None;
        }
        let fraction = crate::sphere::locate_fraction(start, end, target)?;
        interior_fraction(fraction)
    }

    fn encode(&self, buf: &mut BytesMut) {
        buf.put_f64_le(self.lon);
        buf.put_f64_le(self.lat);
    }

    fn decode(buf: &mut &[u8]) -> Result<Self> {
        need(buf, 16, "geog_point")?;
        let lon = buf.get_f64_le();
        let lat = buf.get_f64_le();
        Ok(Self::new(lon, lat))
    }
}

/// Accept a fraction only when it lies strictly inside `(0, 1)` by the
/// crate-wide tolerance. Every resolver funnels through this single
/// policy.
pub(crate) fn interior_fraction(frac: f64) -> Option<f64> {
    if frac <= EPSILON || frac >= 1.0 - EPSILON {
        return None;
    }
    Some(frac)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_float_lerp_and_collinear() {
        assert_eq!(BaseValue::lerp(&2.0, &4.0, 0.5), 3.0);
        assert!(f64::collinear(&2.0, &3.0, &4.0, 0.5));
        assert!(!f64::collinear(&2.0, &3.5, &4.0, 0.5));
    }

    #[test]
    fn test_float_segment_at_value() {
        // 2 -> 6 passes through 3 at fraction 0.25.
        let frac = f64::segment_at_value(&2.0, &6.0, &3.0).unwrap();
        assert!((frac - 0.25).abs() < EPSILON);

        // Decreasing segment.
        let frac = f64::segment_at_value(&6.0, &2.0, &3.0).unwrap();
        assert!((frac - 0.75).abs() < EPSILON);

        // Endpoint values belong to the grid.
        assert!(f64::segment_at_value(&2.0, &6.0, &2.0).is_none());
        assert!(f64::segment_at_value(&2.0, &6.0, &6.0).is_none());
        // Values outside the segment range.
        assert!(f64::segment_at_value(&2.0, &6.0, &7.0).is_none());
    }

    #[test]
    fn test_geom_point_projection() {
        let start = GeomPoint::new(0.0, 0.0);
        let end = GeomPoint::new(10.0, 0.0);
        let on = GeomPoint::new(4.0, 0.0);
        let off = GeomPoint::new(4.0, 1.0);
        let frac = GeomPoint::segment_at_value(&start, &end, &on).unwrap();
        assert!((frac - 0.4).abs() < EPSILON);
        assert!(GeomPoint::segment_at_value(&start, &end, &off).is_none());
    }

    #[test]
    fn test_planar_bearing() {
        let origin = GeomPoint::new(0.0, 0.0);
        assert_eq!(origin.bearing_to(&GeomPoint::new(0.0, 1.0)), 0.0);
        assert_eq!(origin.bearing_to(&GeomPoint::new(1.0, 0.0)), 90.0);
        assert_eq!(origin.bearing_to(&GeomPoint::new(0.0, -1.0)), 180.0);
        assert_eq!(origin.bearing_to(&GeomPoint::new(-1.0, 0.0)), 270.0);
    }

    #[test]
    fn test_geog_distance_meters() {
        let nyc = GeogPoint::new(-74.0060, 40.7128);
        let la = GeogPoint::new(-118.2437, 34.0522);
        let d = nyc.distance(&la).unwrap();
        assert!(d > 3_900_000.0 && d < 4_000_000.0);
    }

    #[test]
    fn test_interior_fraction_policy() {
        assert!(interior_fraction(0.0).is_none());
        assert!(interior_fraction(1.0).is_none());
        assert!(interior_fraction(EPSILON / 2.0).is_none());
        assert!(interior_fraction(1.0 - EPSILON / 2.0).is_none());
        assert_eq!(interior_fraction(0.5), Some(0.5));
    }
}
