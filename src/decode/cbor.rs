//! Structural accessors over a generic `ciborium::Value` tree.
//!
//! Every accessor names the field it is reading so a malformed transaction
//! reports where decoding stopped.

use crate::error::{Error, Result};
use crate::hash::Hash;
use ciborium::Value;

/// CBOR tag for sets (Conway era).
const TAG_SET: u64 = 258;
/// CBOR tags for unsigned/negative bignums.
const TAG_BIGNUM_POS: u64 = 2;
const TAG_BIGNUM_NEG: u64 = 3;

pub(crate) fn malformed(msg: impl Into<String>) -> Error {
    Error::MalformedTransaction(msg.into())
}

/// Parse exactly one CBOR item; trailing bytes are an error.
pub(crate) fn parse(bytes: &[u8]) -> Result<Value> {
    let mut reader = bytes;
    let value: Value = ciborium::from_reader(&mut reader).map_err(|e| malformed(e.to_string()))?;
    if !reader.is_empty() {
        return Err(malformed(format!(
            "{} trailing bytes after transaction",
            reader.len()
        )));
    }
    Ok(value)
}

pub(crate) fn array<'a>(value: &'a Value, what: &str) -> Result<&'a [Value]> {
    match value {
        Value::Array(items) => Ok(items),
        _ => Err(malformed(format!("{what}: expected array"))),
    }
}

/// An array with exactly `len` items.
pub(crate) fn array_of<'a>(value: &'a Value, len: usize, what: &str) -> Result<&'a [Value]> {
    let items = array(value, what)?;
    if items.len() != len {
        return Err(malformed(format!(
            "{what}: expected {len} items, got {}",
            items.len()
        )));
    }
    Ok(items)
}

/// A set: a plain array or an array wrapped in tag 258.
pub(crate) fn set<'a>(value: &'a Value, what: &str) -> Result<&'a [Value]> {
    match value {
        Value::Tag(TAG_SET, inner) => array(inner, what),
        other => array(other, what),
    }
}

pub(crate) fn map<'a>(value: &'a Value, what: &str) -> Result<&'a [(Value, Value)]> {
    match value {
        Value::Map(entries) => Ok(entries),
        _ => Err(malformed(format!("{what}: expected map"))),
    }
}

pub(crate) fn int(value: &Value, what: &str) -> Result<i128> {
    match value {
        Value::Integer(i) => Ok(i128::from(*i)),
        Value::Tag(tag @ (TAG_BIGNUM_POS | TAG_BIGNUM_NEG), inner) => {
            let digits = bytes(inner, what)?;
            if digits.len() > 15 {
                return Err(malformed(format!("{what}: bignum too large")));
            }
            let magnitude = digits
                .iter()
                .fold(0i128, |acc, byte| (acc << 8) | i128::from(*byte));
            Ok(if *tag == TAG_BIGNUM_POS {
                magnitude
            } else {
                -1 - magnitude
            })
        }
        _ => Err(malformed(format!("{what}: expected integer"))),
    }
}

pub(crate) fn uint(value: &Value, what: &str) -> Result<u64> {
    let n = int(value, what)?;
    u64::try_from(n).map_err(|_| malformed(format!("{what}: {n} is not an unsigned 64-bit value")))
}

pub(crate) fn bytes<'a>(value: &'a Value, what: &str) -> Result<&'a [u8]> {
    match value {
        Value::Bytes(b) => Ok(b),
        _ => Err(malformed(format!("{what}: expected bytes"))),
    }
}

pub(crate) fn hash<const N: usize>(value: &Value, what: &str) -> Result<Hash<N>> {
    let raw = bytes(value, what)?;
    Hash::try_from(raw)
        .map_err(|_| malformed(format!("{what}: expected {N} bytes, got {}", raw.len())))
}

pub(crate) fn is_null(value: &Value) -> bool {
    matches!(value, Value::Null)
}

/// Variant tag of a `[tag, fields...]` array, with the whole array.
pub(crate) fn tagged<'a>(value: &'a Value, what: &str) -> Result<(u64, &'a [Value])> {
    let items = array(value, what)?;
    let tag = items
        .first()
        .ok_or_else(|| malformed(format!("{what}: empty variant")))?;
    Ok((uint(tag, what)?, items))
}

/// Check a variant array has the expected length.
pub(crate) fn expect_len(items: &[Value], len: usize, what: &str) -> Result<()> {
    if items.len() != len {
        return Err(malformed(format!(
            "{what}: expected {len} items, got {}",
            items.len()
        )));
    }
    Ok(())
}

/// Map keyed by unsigned integers, e.g. transaction body or witness set.
pub(crate) fn uint_keyed<'a>(value: &'a Value, what: &str) -> Result<Vec<(u64, &'a Value)>> {
    map(value, what)?
        .iter()
        .map(|(k, v)| Ok((uint(k, what)?, v)))
        .collect()
}
