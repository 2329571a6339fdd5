mod collect;
mod convert;
mod guard;
mod init;
mod instance;
mod layout;
mod make;
mod methods;
mod ops;
mod record_type;
mod replace;
mod synth;

pub use convert::{asdict, asdict_with, astuple, fields, is_record};
pub use instance::{Instance, WeakInstance};
pub use make::{FieldDecl, RecordBuilder};
pub use methods::{HashMethod, Method, MethodTable};
pub use record_type::{ClassAttribute, Layout, RecordType, RecordTypeRef};
pub use replace::replace;

use crate::declaration::Declaration;
use crate::error::ConfigError;
use crate::options::RecordOptions;
use collect::Collected;
use std::sync::Arc;
use synth::Synthesized;

/// Turn a declaration into a record type.
///
/// Runs field collection, the mutable-default guard, method synthesis and
/// layout synthesis in that order. Nothing is registered anywhere: on error
/// no type exists.
pub fn define(decl: Declaration, options: RecordOptions) -> Result<RecordTypeRef, ConfigError> {
    options.validate()?;
    let ancestors = collect::linearize(&decl.bases);
    synth::check_frozen_inheritance(&decl.name, &ancestors, &options)?;

    let id = record_type::next_type_id();
    let Collected { fields, class_attrs } = collect::collect_fields(&decl, id, &ancestors, &options)?;
    let Synthesized {
        methods,
        match_args,
        doc,
    } = synth::synthesize(&decl, &fields, &ancestors, &options)?;

    let draft = RecordType {
        id,
        name: decl.name.clone(),
        bases: decl.bases.clone(),
        ancestors,
        fields: fields.into(),
        class_attrs,
        methods,
        options,
        match_args,
        layout: Layout::default(),
        doc,
    };
    let ty = layout::apply(draft, &decl)?;
    tracing::debug!(record = %ty.name, id, fields = ty.fields.len(), "defined record type");
    Ok(Arc::new(ty))
}
