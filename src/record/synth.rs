use super::methods::{HashMethod, Method, MethodTable};
use super::record_type::{MatchArgs, RecordTypeRef};
use crate::declaration::Declaration;
use crate::error::ConfigError;
use crate::field::{Field, FieldDefault};
use crate::options::RecordOptions;
use smol_str::SmolStr;

pub(crate) struct Synthesized {
    pub(crate) methods: MethodTable,
    pub(crate) match_args: Option<MatchArgs>,
    pub(crate) doc: Option<String>,
}

/// Every record type in the chain must agree on frozenness.
pub(crate) fn check_frozen_inheritance(
    name: &SmolStr,
    ancestors: &[RecordTypeRef],
    options: &RecordOptions,
) -> Result<(), ConfigError> {
    if ancestors.is_empty() {
        return Ok(());
    }
    if !options.frozen && ancestors.iter().any(|a| a.is_frozen()) {
        return Err(ConfigError::NonFrozenFromFrozen { record: name.clone() });
    }
    if options.frozen && !ancestors.iter().all(|a| a.is_frozen()) {
        return Err(ConfigError::FrozenFromNonFrozen { record: name.clone() });
    }
    Ok(())
}

/// Build the type's own method table. Hand-written methods in the
/// declaration are kept; empty entries inherit.
pub(crate) fn synthesize(
    decl: &Declaration,
    fields: &[Field],
    ancestors: &[RecordTypeRef],
    options: &RecordOptions,
) -> Result<Synthesized, ConfigError> {
    let own = &decl.methods;
    let name = &decl.name;
    let has_post_init = own.post_init.is_some() || ancestors.iter().any(|a| a.methods.post_init.is_some());

    if let Some(pseudo) = fields.iter().find(|f| f.is_pseudo_field) {
        if !has_post_init {
            return Err(ConfigError::MissingPostInit {
                record: name.clone(),
                field: pseudo.name.clone(),
            });
        }
    }

    let init = match &own.init {
        Some(user @ Method::User(_)) => Some(user.clone()),
        _ if options.init => Some(Method::Generated),
        _ => None,
    };
    if matches!(init, Some(Method::Generated)) && !has_post_init {
        if let Some(field) = fields
            .iter()
            .find(|f| !f.is_pseudo_field && !f.init && !f.has_default())
        {
            return Err(ConfigError::UninitializedField {
                record: name.clone(),
                field: field.name.clone(),
            });
        }
    }

    let repr = match &own.repr {
        Some(user @ Method::User(_)) => Some(user.clone()),
        _ if options.repr => Some(Method::Generated),
        _ => None,
    };

    let user_eq = matches!(own.eq, Some(Method::User(_)));
    let eq = match &own.eq {
        Some(user @ Method::User(_)) => Some(user.clone()),
        _ if options.eq => Some(Method::Generated),
        _ => None,
    };

    let order = match &own.order {
        Some(Method::User(_)) if options.order => {
            return Err(ConfigError::OrderOverride { record: name.clone() });
        }
        _ if options.order => Some(Method::Generated),
        other => other.clone(),
    };

    // Keyed on (unsafe_hash, eq, frozen, hand-written hash).
    let hash = match (options.unsafe_hash, options.eq, options.frozen, own.hash.clone()) {
        (true, _, _, Some(_)) => {
            return Err(ConfigError::ConflictingHash { record: name.clone() });
        }
        (true, _, _, None) => Some(HashMethod::Generated),
        (false, true, false, None) => Some(HashMethod::Disabled),
        (false, true, true, None) => Some(HashMethod::Generated),
        // A hand-written equality alone leaves instances unhashable.
        (false, false, _, None) if user_eq => Some(HashMethod::Disabled),
        (false, _, _, explicit) => explicit,
    };

    let match_args = match &decl.match_args {
        Some(names) => Some(MatchArgs::Explicit(names.iter().cloned().collect())),
        None if options.match_args && !ancestors.iter().any(|a| a.has_explicit_match_args()) => Some(
            MatchArgs::Generated(fields.iter().filter(|f| f.is_positional()).map(|f| f.name.clone()).collect()),
        ),
        None => None,
    };

    let methods = MethodTable {
        init,
        post_init: own.post_init.clone(),
        repr,
        eq,
        order,
        hash,
    };
    tracing::debug!(record = %name, methods = ?methods, "synthesized methods");

    Ok(Synthesized {
        methods,
        match_args,
        doc: decl.doc.clone().or_else(|| Some(signature(name, fields))),
    })
}

/// `Name(x: int, y: int = 0, *, z: list = <factory>)`
fn signature(name: &str, fields: &[Field]) -> String {
    let mut params: Vec<String> = fields.iter().filter(|f| f.is_positional()).map(parameter).collect();
    let keyword: Vec<String> = fields
        .iter()
        .filter(|f| f.init && f.kw_only)
        .map(parameter)
        .collect();
    if !keyword.is_empty() {
        params.push("*".to_string());
        params.extend(keyword);
    }
    format!("{name}({})", params.join(", "))
}

fn parameter(field: &Field) -> String {
    let mut out = field.name.to_string();
    if !field.declared_type.is_empty() {
        out.push_str(": ");
        out.push_str(&field.declared_type);
    }
    match &field.default {
        FieldDefault::Missing => {}
        FieldDefault::Value(value) => {
            out.push_str(" = ");
            out.push_str(&value.repr());
        }
        FieldDefault::Factory(_) => out.push_str(" = <factory>"),
    }
    out
}
