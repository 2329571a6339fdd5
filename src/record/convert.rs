//! Recursive conversion of record instances into plain containers.

use super::instance::Instance;
use crate::error::RecordError;
use crate::field::Field;
use crate::repr::RecursionGuard;
use crate::value::{Value, ValueMap};
use smol_str::SmolStr;

pub fn is_record(value: &Value) -> bool {
    matches!(value, Value::Record(_))
}

fn expect_record<'a>(value: &'a Value, function: &'static str) -> Result<&'a Instance, RecordError> {
    value.as_instance().ok_or_else(|| RecordError::NotARecord {
        function,
        type_name: value.type_name(),
    })
}

/// Stored fields of a record instance, in declaration order.
pub fn fields(value: &Value) -> Result<Vec<Field>, RecordError> {
    let inst = expect_record(value, "fields")?;
    Ok(inst.record_type().fields().cloned().collect())
}

/// `{name: value}` for every stored field, converting nested records too.
pub fn asdict(value: &Value) -> Result<Value, RecordError> {
    asdict_with(value, |pairs| Value::dict(pairs.into_iter().collect::<ValueMap>()))
}

/// Like [`asdict`], with `factory` building each record's result from its
/// `(name, value)` pairs in field order.
pub fn asdict_with<F>(value: &Value, factory: F) -> Result<Value, RecordError>
where
    F: Fn(Vec<(SmolStr, Value)>) -> Value,
{
    expect_record(value, "asdict")?;
    let mut guard = RecursionGuard::new();
    convert_dict(value, &mut guard, &factory)
}

/// The stored field values as a tuple, converting nested records too.
pub fn astuple(value: &Value) -> Result<Value, RecordError> {
    expect_record(value, "astuple")?;
    let mut guard = RecursionGuard::new();
    convert_tuple(value, &mut guard)
}

// ─── Traversal ──────────────────────────────────────────────────────────────

type RecordConverter<'f> = dyn Fn(&Instance, &mut RecursionGuard) -> Result<Value, RecordError> + 'f;

fn convert_dict<F>(value: &Value, guard: &mut RecursionGuard, factory: &F) -> Result<Value, RecordError>
where
    F: Fn(Vec<(SmolStr, Value)>) -> Value,
{
    convert(value, guard, &|inst, guard| {
        let pairs = named_values(inst, guard, &|v, g| convert_dict(v, g, factory))?;
        Ok(factory(pairs))
    })
}

fn convert_tuple(value: &Value, guard: &mut RecursionGuard) -> Result<Value, RecordError> {
    convert(value, guard, &|inst, guard| {
        let values = named_values(inst, guard, &convert_tuple)?
            .into_iter()
            .map(|(_, v)| v)
            .collect();
        Ok(Value::tuple(values))
    })
}

fn named_values(
    inst: &Instance,
    guard: &mut RecursionGuard,
    inner: &dyn Fn(&Value, &mut RecursionGuard) -> Result<Value, RecordError>,
) -> Result<Vec<(SmolStr, Value)>, RecordError> {
    let ty = inst.record_type();
    ty.fields()
        .map(|f| -> Result<(SmolStr, Value), RecordError> {
            let value = inst.get(&f.name)?;
            Ok((f.name.clone(), inner(&value, guard)?))
        })
        .collect()
}

/// Rebuild containers with fresh copies, handing records to `on_record`.
fn convert(value: &Value, guard: &mut RecursionGuard, on_record: &RecordConverter<'_>) -> Result<Value, RecordError> {
    let id = value.identity();
    if let Some(id) = id {
        if !guard.enter(id) {
            return Err(RecordError::CyclicValue);
        }
    }
    let converted = match value {
        Value::Record(inst) => on_record(inst, guard),
        Value::Tuple(items) => items
            .iter()
            .map(|item| convert(item, guard, on_record))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::tuple),
        Value::List(_) | Value::Set(_) => {
            let items = value
                .items()
                .unwrap_or_default()
                .iter()
                .map(|item| convert(item, guard, on_record))
                .collect::<Result<Vec<_>, _>>();
            items.map(|items| match value {
                Value::Set(_) => Value::set(items),
                _ => Value::list(items),
            })
        }
        Value::Dict(map) => {
            let entries = map.read().clone();
            entries
                .into_iter()
                .map(|(key, item)| Ok((key, convert(&item, guard, on_record)?)))
                .collect::<Result<ValueMap, RecordError>>()
                .map(Value::dict)
        }
        scalar => Ok(scalar.clone()),
    };
    if let Some(id) = id {
        guard.leave(id);
    }
    converted
}
