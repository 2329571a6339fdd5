use crate::error::ConfigError;
use crate::value::Value;
use smol_str::SmolStr;

/// Reject a plain default that would be shared by every instance.
///
/// Anything unhashable counts as mutable: the built-in containers, and
/// instances of record types whose hash is disabled.
pub(crate) fn check_default(field: &SmolStr, default: &Value) -> Result<(), ConfigError> {
    let unhashable = match default {
        Value::List(_) | Value::Dict(_) | Value::Set(_) => true,
        Value::Record(inst) => !inst.record_type().is_hashable(),
        _ => false,
    };
    if unhashable {
        return Err(ConfigError::MutableDefault {
            field: field.clone(),
            kind: default.type_name(),
        });
    }
    Ok(())
}
