//! Temporal value engine: values evolving over time, with synchronized
//! function lifting, restriction, and trajectory similarity.
//!
//! ```rust
//! use tempo::{Instant, Interp, Sequence, Temporal, Timestamp};
//! use tempo::ops::tadd;
//!
//! let a = Temporal::Sequence(Sequence::new(
//!     vec![
//!         Instant::new(1.0, Timestamp::from_secs(0)),
//!         Instant::new(3.0, Timestamp::from_secs(10)),
//!     ],
//!     Interp::Linear,
//!     true,
//!     true,
//! )?);
//! let b = Temporal::Sequence(Sequence::new(
//!     vec![
//!         Instant::new(2.0, Timestamp::from_secs(5)),
//!         Instant::new(4.0, Timestamp::from_secs(15)),
//!     ],
//!     Interp::Linear,
//!     true,
//!     true,
//! )?);
//!
//! // Sum over the overlap [5s, 10s], synchronized automatically.
//! let sum = tadd(&a, &b)?.expect("domains overlap");
//! assert_eq!(sum.value_at(Timestamp::from_secs(5))?, 4.0);
//! # Ok::<(), tempo::TemporalError>(())
//! ```

pub mod compute;
pub mod error;
pub mod model;
pub mod ops;
pub mod similarity;
mod sphere;
pub mod time;
pub mod value;
pub mod wire;

pub use error::{Result, TemporalError};
pub use model::{Instant, Interp, Sequence, SequenceSet, Temporal};
pub use time::{Period, Timestamp};
pub use value::{BaseValue, GeogPoint, GeomPoint, EPSILON};

pub use compute::{
    always_cmp, always_eq, at_period, at_value, ever_cmp, ever_eq, minus_period, minus_value,
    synchronize, when_true, Cmp,
};

pub use similarity::{
    dyntimewarp_distance, dyntimewarp_path, frechet_distance, frechet_path, similarity_distance,
    similarity_path, PathCell, SimilarityMetric,
};

pub use wire::{deserialize_sequence, serialize_sequence};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
