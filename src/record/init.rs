use super::instance::Instance;
use super::record_type::RecordType;
use crate::error::RecordError;
use crate::types::*;
use crate::value::Value;

/// The generated constructor of `owner`, applied to `inst`.
///
/// Binds positional arguments to the positional init fields, then keywords,
/// then fills the rest from defaults. Factories run once per call. Stored
/// fields are written before the post-init hook sees the pseudo-field values.
pub(crate) fn run_generated(inst: &Instance, owner: &RecordType, args: &Args) -> Result<(), RecordError> {
    let record = || inst.record_type().name.clone();
    let fields = &owner.fields;

    let positional: Vec<usize> = (0..fields.len()).filter(|&i| fields[i].is_positional()).collect();
    if args.positional.len() > positional.len() {
        return Err(RecordError::TooManyPositional {
            record: record(),
            expected: positional.len(),
            given: args.positional.len(),
        });
    }

    let mut bound: Vec<Option<Value>> = vec![None; fields.len()];
    for (&i, value) in positional.iter().zip(&args.positional) {
        bound[i] = Some(value.clone());
    }
    for (name, value) in &args.keywords {
        let Some(i) = fields.iter().position(|f| f.init && f.name == *name) else {
            return Err(RecordError::UnexpectedKeyword {
                record: record(),
                name: name.clone(),
            });
        };
        if bound[i].is_some() {
            return Err(RecordError::MultipleValues {
                record: record(),
                name: name.clone(),
            });
        }
        bound[i] = Some(value.clone());
    }

    let mut missing = Vec::new();
    for (field, slot) in fields.iter().zip(bound.iter_mut()) {
        if slot.is_none() {
            *slot = field.default.produce();
            if slot.is_none() && field.init {
                missing.push(field.name.clone());
            }
        }
    }
    if !missing.is_empty() {
        return Err(RecordError::MissingArguments {
            record: record(),
            names: missing,
        });
    }

    let mut pseudo_values = Vec::new();
    for (field, value) in fields.iter().zip(bound) {
        match value {
            Some(value) if field.is_pseudo_field => pseudo_values.push(value),
            Some(value) => inst.init_attr(&field.name, value)?,
            // init=false without a default: left for the post-init hook.
            None => {}
        }
    }

    tracing::trace!(
        record = %inst.record_type().name,
        positional = args.positional.len(),
        keywords = args.keywords.len(),
        "constructed instance"
    );

    if let Some((_, hook)) = inst.record_type().resolve(|ty| ty.methods.post_init.clone()) {
        hook(inst, &pseudo_values)?;
    }
    Ok(())
}
