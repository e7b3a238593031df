//! Typed temporal operations: arithmetic, boolean algebra, comparisons,
//! and spatial functions, each a thin wrapper binding a base-value
//! function and its turning-point resolver to the lifting engine.

pub mod arith;
pub mod boolean;
pub mod compare;
pub mod spatial;

pub use arith::{
    tadd, tadd_value, tdiv, tdiv_value, tmul, tmul_value, tneg, tsub, tsub_value, TemporalNumber,
};
pub use boolean::{tand, tand_value, tnot, tor, tor_value};
pub use compare::{
    teq, teq_point, teq_value, tge, tge_value, tgt, tgt_value, tle, tle_value, tlt, tlt_value,
    tne, tne_value, Crossable,
};
pub use spatial::{
    ever_intersects, tbearing_geog_value, tbearing_value, tdistance, tdistance_geog,
    tdistance_geog_value, tdistance_value, tintersects,
};
