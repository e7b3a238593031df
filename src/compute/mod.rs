//! The computation layer: operand synchronization, lifting, turning-point
//! resolution, restriction, and ever/always predicates. The typed
//! operation wrappers in [`crate::ops`] are thin shells over these.

pub mod lift;
pub mod predicate;
pub mod restrict;
pub mod sync;
pub mod turning;

pub use lift::{lift_binary, lift_unary, lift_with_value, LiftOptions, LiftValueOptions};
pub use predicate::{always_cmp, always_eq, ever_cmp, ever_eq, Cmp};
pub use restrict::{at_period, at_value, minus_period, minus_value, when_true};
pub use sync::synchronize;
