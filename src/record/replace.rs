use super::instance::Instance;
use crate::error::RecordError;
use crate::field::FieldDefault;
use crate::types::Args;
use crate::value::Value;
use smol_str::SmolStr;

/// A new instance of the same type, built by the constructor from `changes`
/// plus the current value of every other init field.
///
/// ```ignore
/// let moved = replace(&point, [("x", Value::Int(3))])?;
/// ```
pub fn replace<I, K, V>(inst: &Instance, changes: I) -> Result<Instance, RecordError>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: Into<Value>,
{
    let mut keywords: Vec<(SmolStr, Value)> = changes
        .into_iter()
        .map(|(name, value)| (SmolStr::new(name.as_ref()), value.into()))
        .collect();
    let ty = inst.record_type();

    for field in ty.all_fields() {
        let given = keywords.iter().any(|(name, _)| *name == field.name);
        if !field.init {
            if given {
                return Err(RecordError::ReplaceInitFalse {
                    field: field.name.clone(),
                });
            }
            continue;
        }
        if given {
            continue;
        }
        if field.is_pseudo_field {
            if matches!(field.default, FieldDefault::Missing) {
                return Err(RecordError::MissingPseudoField {
                    field: field.name.clone(),
                });
            }
            continue;
        }
        keywords.push((field.name.clone(), inst.get(&field.name)?));
    }

    Instance::new(ty, Args {
        positional: Vec::new(),
        keywords,
    })
}
