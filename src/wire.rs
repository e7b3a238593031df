//! Binary serialization of sequences.
//!
//! The envelope is little-endian throughout: an instant count (`u32`),
//! one byte per bound inclusivity flag, one byte for the interpolation
//! mode, then each instant as the base value's own encoding followed by
//! its timestamp in microseconds (`i64`). Decoding validates through the
//! raw constructor, so ordering and mode constraints hold for any byte
//! stream, but an already-normalized payload is reproduced instant for
//! instant.

use bytes::{Buf, Bytes, BytesMut};

use crate::error::{Result, TemporalError};
use crate::model::{Instant, Interp, Sequence};
use crate::time::Timestamp;
use crate::value::BaseValue;

pub fn serialize_sequence<V: BaseValue>(seq: &Sequence<V>) -> Bytes {
    let mut buf = BytesMut::with_capacity(16 + seq.num_instants() * 16);
    buf.extend_from_slice(&(seq.num_instants() as u32).to_le_bytes());
    buf.extend_from_slice(&[
        u8::from(seq.period().lower_inc()),
        u8::from(seq.period().upper_inc()),
        seq.interp().code(),
    ]);
    for inst in seq.instants() {
        inst.value().encode(&mut buf);
        buf.extend_from_slice(&inst.timestamp().micros().to_le_bytes());
    }
    buf.freeze()
}

pub fn deserialize_sequence<V: BaseValue>(data: &[u8]) -> Result<Sequence<V>> {
    let mut buf = data;
    if buf.remaining() < 7 {
        return Err(TemporalError::Serialization(format!(
            "truncated header: {} bytes",
            buf.remaining()
        )));
    }
    let count = buf.get_u32_le() as usize;
    let lower_inc = decode_flag(buf.get_u8(), "lower bound flag")?;
    let upper_inc = decode_flag(buf.get_u8(), "upper bound flag")?;
    let interp = Interp::from_code(buf.get_u8())?;

    let mut instants = Vec::with_capacity(count.min(1024));
    for _ in 0..count {
        let value = V::decode(&mut buf)?;
        if buf.remaining() < 8 {
            return Err(TemporalError::Serialization(
                "truncated input: expected 8 more bytes for timestamp".to_string(),
            ));
        }
        let t = Timestamp::from_micros(buf.get_i64_le());
        instants.push(Instant::new(value, t));
    }
    if buf.has_remaining() {
        return Err(TemporalError::Serialization(format!(
            "{} trailing bytes after {count} instants",
            buf.remaining()
        )));
    }
    Sequence::new_raw(instants, interp, lower_inc, upper_inc)
}

fn decode_flag(byte: u8, what: &str) -> Result<bool> {
    match byte {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(TemporalError::Serialization(format!(
            "invalid {what} byte {other}"
        ))),
    }
}
