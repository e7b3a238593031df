//! The temporal value model: instants, sequences, sequence sets, and the
//! closed supertype over them. All entities are immutable value objects;
//! every transformation produces a new entity with an exclusively owned
//! backing array.

pub mod instant;
pub mod sequence;
pub mod sequence_set;
pub mod temporal;

pub use instant::Instant;
pub use sequence::{Interp, Sequence};
pub use sequence_set::SequenceSet;
pub use temporal::Temporal;
