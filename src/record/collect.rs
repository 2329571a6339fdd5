use super::guard;
use super::record_type::{ClassAttribute, RecordTypeRef};
use crate::declaration::{ClassAttr, Declaration};
use crate::error::ConfigError;
use crate::field::{Annotation, Field, FieldSpec};
use crate::options::RecordOptions;
use crate::types::*;
use crate::value::Value;
use smol_str::SmolStr;

/// Output of field collection for one declaration.
pub(crate) struct Collected {
    pub(crate) fields: Vec<Field>,
    pub(crate) class_attrs: FastMap<SmolStr, ClassAttribute>,
}

// ─── Base Chain ─────────────────────────────────────────────────────────────

/// Depth-first, left-to-right walk of the bases without duplicates.
///
/// A type reachable along several paths keeps its last position, so shared
/// ancestors sort after every type that derives from them.
pub(crate) fn linearize(bases: &[RecordTypeRef]) -> Vec<RecordTypeRef> {
    let walk: Vec<&RecordTypeRef> = bases
        .iter()
        .flat_map(|base| std::iter::once(base).chain(base.ancestors.iter()))
        .collect();
    let mut seen = FastHashSet::default();
    let mut chain: Vec<RecordTypeRef> = walk
        .into_iter()
        .rev()
        .filter(|ty| seen.insert(ty.id))
        .cloned()
        .collect();
    chain.reverse();
    chain
}

fn declared_by(ancestors: &[RecordTypeRef], origin: u64) -> Option<&RecordTypeRef> {
    ancestors.iter().find(|ty| ty.id == origin)
}

fn origin_name(ancestors: &[RecordTypeRef], origin: u64) -> SmolStr {
    declared_by(ancestors, origin).map_or_else(|| SmolStr::new_static("?"), |ty| ty.name.clone())
}

/// The nearest ancestor's plain class-level value for `name`. A slot
/// descriptor hides anything further up.
fn inherited_default(ancestors: &[RecordTypeRef], name: &str) -> Option<Value> {
    match ancestors.iter().find_map(|ty| ty.class_attrs.get(name))? {
        ClassAttribute::Value(value) => Some(value.clone()),
        ClassAttribute::Slot { .. } => None,
    }
}

/// Merge one inherited field into the running list.
fn inherit(fields: &mut Vec<Field>, field: &Field, ancestors: &[RecordTypeRef]) -> Result<(), ConfigError> {
    let Some(existing) = fields.iter_mut().find(|f| f.name == field.name) else {
        fields.push(field.clone());
        return Ok(());
    };
    let overrides = existing.origin == field.origin
        || declared_by(ancestors, field.origin).is_some_and(|ty| ty.is_subclass_of_id(existing.origin));
    if overrides {
        *existing = field.clone();
        return Ok(());
    }
    // A later base still carrying the declaration its sibling overrode.
    if declared_by(ancestors, existing.origin).is_some_and(|ty| ty.is_subclass_of_id(field.origin)) {
        return Ok(());
    }
    Err(ConfigError::ConflictingBaseField {
        field: field.name.clone(),
        first: origin_name(ancestors, existing.origin),
        second: origin_name(ancestors, field.origin),
    })
}

// ─── Collection ─────────────────────────────────────────────────────────────

/// Build the ordered field list: inherited fields first, farthest ancestor
/// first, then the declaration's own annotations. Re-declaring a name keeps
/// its original position.
pub(crate) fn collect_fields(
    decl: &Declaration,
    id: u64,
    ancestors: &[RecordTypeRef],
    options: &RecordOptions,
) -> Result<Collected, ConfigError> {
    let mut fields: Vec<Field> = Vec::new();
    for base in ancestors.iter().rev() {
        for field in base.fields.iter() {
            inherit(&mut fields, field, ancestors)?;
        }
    }

    let mut class_attrs: FastMap<SmolStr, ClassAttribute> = FastMap::default();
    let mut after_marker = false;

    for (name, annotation) in &decl.annotations {
        let attr = decl.get_attr(name);
        match annotation {
            Annotation::KwOnly => {
                if after_marker {
                    return Err(ConfigError::DuplicateKwOnly { field: name.clone() });
                }
                after_marker = true;
                continue;
            }
            Annotation::ClassVar(_) => {
                let value = match attr {
                    Some(ClassAttr::Field(spec)) => {
                        if spec.default_factory.is_some() {
                            return Err(ConfigError::FactoryNotAllowed { field: name.clone() });
                        }
                        spec.default.clone()
                    }
                    Some(ClassAttr::Value(value)) => Some(value.clone()),
                    None => None,
                };
                if let Some(value) = value {
                    class_attrs.insert(name.clone(), ClassAttribute::Value(value));
                }
                fields.retain(|f| f.name != *name);
                continue;
            }
            Annotation::Type(_) | Annotation::InitVar(_) => {}
        }

        let is_pseudo = matches!(annotation, Annotation::InitVar(_));
        let spec = match attr {
            None => match inherited_default(ancestors, name) {
                Some(value) => FieldSpec::new().default(value),
                None => FieldSpec::new(),
            },
            Some(ClassAttr::Value(value)) => FieldSpec::new().default(value.clone()),
            Some(ClassAttr::Field(spec)) => spec.clone(),
        };
        if spec.default.is_some() && spec.default_factory.is_some() {
            return Err(ConfigError::DefaultAndFactory { field: name.clone() });
        }
        if is_pseudo && spec.default_factory.is_some() {
            return Err(ConfigError::FactoryNotAllowed { field: name.clone() });
        }
        if let Some(default) = &spec.default {
            guard::check_default(name, default)?;
            class_attrs.insert(name.clone(), ClassAttribute::Value(default.clone()));
        }

        let kw_only = spec.kw_only.unwrap_or(after_marker || options.kw_only);
        let field = Field::from_spec(
            name.clone(),
            SmolStr::new(annotation.token()),
            spec,
            kw_only,
            is_pseudo,
            id,
        );
        match fields.iter_mut().find(|f| f.name == *name) {
            Some(existing) => *existing = field,
            None => fields.push(field),
        }
    }

    for (name, attr) in &decl.attrs {
        if decl.annotations.iter().any(|(n, _)| n == name) {
            continue;
        }
        match attr {
            ClassAttr::Field(_) => return Err(ConfigError::FieldWithoutAnnotation { field: name.clone() }),
            ClassAttr::Value(value) => {
                class_attrs.insert(name.clone(), ClassAttribute::Value(value.clone()));
            }
        }
    }

    if options.init {
        let mut seen_default = false;
        for field in fields.iter().filter(|f| f.is_positional()) {
            if field.has_default() {
                seen_default = true;
            } else if seen_default {
                return Err(ConfigError::NonDefaultAfterDefault {
                    field: field.name.clone(),
                });
            }
        }
    }

    tracing::debug!(
        record = %decl.name,
        fields = fields.len(),
        class_attrs = class_attrs.len(),
        "collected fields"
    );
    Ok(Collected { fields, class_attrs })
}
