//! CBOR snapshots of record state.
//!
//! A snapshot is a CBOR map of the instance's stored attributes. Restoring
//! writes them straight into a fresh instance without running the
//! constructor, so frozen and compact types restore the same way.
//!
//! Tuples and sets are tagged so they come back as themselves; nested
//! records are written as maps and restore as dicts.

use crate::error::RecordError;
use crate::record::{Instance, RecordTypeRef};
use crate::repr::RecursionGuard;
use crate::value::{Value, ValueMap};
use cbor4ii::core::Value as Cbor;
use smol_str::SmolStr;

/// IANA "finite set" tag.
const CBOR_TAG_SET: u64 = 258;
/// First-come-first-served range, used here for immutable sequences.
const CBOR_TAG_TUPLE: u64 = 6_000;

// ─── Encode ─────────────────────────────────────────────────────────────────

pub fn encode(inst: &Instance) -> Result<Vec<u8>, RecordError> {
    let mut guard = RecursionGuard::new();
    let snapshot = record_to_cbor(inst, &mut guard)?;
    let mut buf: Vec<u8> = Vec::new();
    cbor4ii::serde::to_writer(&mut buf, &snapshot).map_err(|e| RecordError::CborError(e.to_string()))?;
    tracing::trace!(record = %inst.record_type().name(), bytes = buf.len(), "encoded snapshot");
    Ok(buf)
}

fn record_to_cbor(inst: &Instance, guard: &mut RecursionGuard) -> Result<Cbor, RecordError> {
    if !guard.enter(inst.identity()) {
        return Err(RecordError::CyclicValue);
    }
    let entries = inst
        .stored_pairs()
        .iter()
        .map(|(name, value)| Ok((Cbor::Text(name.to_string()), to_cbor(value, guard)?)))
        .collect::<Result<Vec<_>, RecordError>>()?;
    guard.leave(inst.identity());
    Ok(Cbor::Map(entries))
}

fn to_cbor(value: &Value, guard: &mut RecursionGuard) -> Result<Cbor, RecordError> {
    let items_to_cbor = |items: &[Value], guard: &mut RecursionGuard| {
        items
            .iter()
            .map(|item| to_cbor(item, guard))
            .collect::<Result<Vec<_>, RecordError>>()
            .map(Cbor::Array)
    };
    let encoded = match value {
        Value::None => Cbor::Null,
        Value::Bool(b) => Cbor::Bool(*b),
        Value::Int(i) => Cbor::Integer(i128::from(*i)),
        Value::Float(f) => Cbor::Float(*f),
        Value::Str(s) => Cbor::Text(s.to_string()),
        Value::Tuple(items) => Cbor::Tag(CBOR_TAG_TUPLE, Box::new(items_to_cbor(&items[..], &mut *guard)?)),
        Value::Record(inst) => record_to_cbor(inst, guard)?,
        Value::List(_) | Value::Set(_) | Value::Dict(_) => {
            let id = value.identity().unwrap_or_default();
            if !guard.enter(id) {
                return Err(RecordError::CyclicValue);
            }
            let encoded = match value {
                Value::Dict(map) => {
                    let entries = map.read().clone();
                    entries
                        .iter()
                        .map(|(key, item)| Ok((Cbor::Text(key.to_string()), to_cbor(item, guard)?)))
                        .collect::<Result<Vec<_>, RecordError>>()
                        .map(Cbor::Map)?
                }
                Value::Set(_) => {
                    let items = value.items().unwrap_or_default();
                    Cbor::Tag(CBOR_TAG_SET, Box::new(items_to_cbor(&items, &mut *guard)?))
                }
                _ => items_to_cbor(&value.items().unwrap_or_default(), &mut *guard)?,
            };
            guard.leave(id);
            encoded
        }
    };
    Ok(encoded)
}

// ─── Restore ────────────────────────────────────────────────────────────────

/// Rebuild an instance of `ty` from `bytes` produced by [`encode`].
pub fn restore(ty: &RecordTypeRef, bytes: &[u8]) -> Result<Instance, RecordError> {
    let decoded: Cbor = cbor4ii::serde::from_slice(bytes).map_err(|e| RecordError::CborError(e.to_string()))?;
    let Cbor::Map(entries) = decoded else {
        return Err(RecordError::InvalidSnapshot);
    };
    let inst = Instance::allocate(ty);
    for (key, value) in entries {
        let Cbor::Text(name) = key else {
            return Err(RecordError::InvalidSnapshot);
        };
        inst.init_attr(&name, from_cbor(value))?;
    }
    tracing::trace!(record = %ty.name(), bytes = bytes.len(), "restored snapshot");
    Ok(inst)
}

fn from_cbor(value: Cbor) -> Value {
    match value {
        Cbor::Tag(CBOR_TAG_TUPLE, inner) => match *inner {
            Cbor::Array(items) => Value::tuple(items.into_iter().map(from_cbor).collect()),
            other => from_cbor(other),
        },
        Cbor::Tag(CBOR_TAG_SET, inner) => match *inner {
            Cbor::Array(items) => Value::set(items.into_iter().map(from_cbor).collect()),
            other => from_cbor(other),
        },
        Cbor::Array(items) => Value::list(items.into_iter().map(from_cbor).collect()),
        Cbor::Map(entries) => Value::dict(
            entries
                .into_iter()
                .map(|(key, item)| {
                    let key = match key {
                        Cbor::Text(s) => SmolStr::from(s),
                        other => Value::from(other).repr().into(),
                    };
                    (key, from_cbor(item))
                })
                .collect::<ValueMap>(),
        ),
        other => Value::from(other),
    }
}
