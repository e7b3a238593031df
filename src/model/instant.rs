//! A single value-timestamp pair.

use serde::{Deserialize, Serialize};

use crate::time::Timestamp;
use crate::value::BaseValue;

/// An immutable `(value, timestamp)` pair, the atom of every temporal
/// value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instant<V> {
    value: V,
    t: Timestamp,
}

impl<V: BaseValue> Instant<V> {
    pub fn new(value: V, t: Timestamp) -> Self {
        Self { value, t }
    }

    pub fn value(&self) -> &V {
        &self.value
    }

    pub fn timestamp(&self) -> Timestamp {
        self.t
    }

    pub fn into_value(self) -> V {
        self.value
    }

    /// A new instant holding `value` at the same timestamp.
    pub fn with_value<R: BaseValue>(&self, value: R) -> Instant<R> {
        Instant { value, t: self.t }
    }

    /// Value the segment from `self` to `next` takes at `t`, honoring
    /// linearity.
    pub(crate) fn segment_value_at(&self, next: &Instant<V>, linear: bool, t: Timestamp) -> V {
        if t == self.t || !linear {
            return self.value.clone();
        }
        if t == next.t {
            return next.value.clone();
        }
        let frac = t.fraction_between(self.t, next.t);
        self.value.lerp(&next.value, frac)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_value_at() {
        let a = Instant::new(2.0, Timestamp::from_secs(0));
        let b = Instant::new(4.0, Timestamp::from_secs(10));

        let mid = Timestamp::from_secs(5);
        assert_eq!(a.segment_value_at(&b, true, mid), 3.0);
        assert_eq!(a.segment_value_at(&b, false, mid), 2.0);
        // Exact endpoints are returned without interpolation.
        assert_eq!(a.segment_value_at(&b, true, b.timestamp()), 4.0);
    }
}
