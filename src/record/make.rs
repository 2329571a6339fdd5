use super::define;
use super::record_type::RecordTypeRef;
use crate::declaration::{ClassAttr, Declaration};
use crate::error::ConfigError;
use crate::field::FieldSpec;
use crate::options::RecordOptions;
use crate::types::*;
use smol_str::SmolStr;

/// One field given to [`RecordBuilder::field`].
#[derive(Debug, Clone)]
pub enum FieldDecl {
    /// Bare name, typed as `typing.Any`.
    Name(SmolStr),
    Typed(SmolStr, SmolStr),
    Spec(SmolStr, SmolStr, FieldSpec),
}

impl From<&str> for FieldDecl {
    fn from(name: &str) -> Self {
        FieldDecl::Name(SmolStr::new(name))
    }
}

impl From<(&str, &str)> for FieldDecl {
    fn from((name, token): (&str, &str)) -> Self {
        FieldDecl::Typed(SmolStr::new(name), SmolStr::new(token))
    }
}

impl From<(&str, &str, FieldSpec)> for FieldDecl {
    fn from((name, token, spec): (&str, &str, FieldSpec)) -> Self {
        FieldDecl::Spec(SmolStr::new(name), SmolStr::new(token), spec)
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c == '_' || c.is_alphabetic())
        && chars.all(|c| c == '_' || c.is_alphanumeric())
}

// ─── RecordBuilder ──────────────────────────────────────────────────────────

/// Define a record type at runtime from a name and a field list.
///
/// ```ignore
/// let point = RecordBuilder::new("Point")
///     .field("x")
///     .field(("y", "int"))
///     .field(("z", "int", FieldSpec::new().default(0)))
///     .options(RecordOptions::frozen())
///     .build()?;
/// ```
pub struct RecordBuilder {
    name: SmolStr,
    fields: Vec<FieldDecl>,
    bases: Vec<RecordTypeRef>,
    attrs: Vec<(SmolStr, ClassAttr)>,
    configure: Vec<Box<dyn FnOnce(Declaration) -> Declaration>>,
    options: RecordOptions,
    decorator: Option<Decorator>,
}

impl RecordBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            name: SmolStr::new(name),
            fields: Vec::new(),
            bases: Vec::new(),
            attrs: Vec::new(),
            configure: Vec::new(),
            options: RecordOptions::default(),
            decorator: None,
        }
    }

    pub fn field(mut self, field: impl Into<FieldDecl>) -> Self {
        self.fields.push(field.into());
        self
    }

    pub fn fields<I, F>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = F>,
        F: Into<FieldDecl>,
    {
        self.fields.extend(fields.into_iter().map(Into::into));
        self
    }

    pub fn base(mut self, base: &RecordTypeRef) -> Self {
        self.bases.push(RecordTypeRef::clone(base));
        self
    }

    /// Extra class-body attribute.
    pub fn attr(mut self, name: &str, attr: impl Into<ClassAttr>) -> Self {
        self.attrs.push((SmolStr::new(name), attr.into()));
        self
    }

    /// Adjust the generated declaration before it is defined, e.g. to attach
    /// hand-written methods.
    pub fn configure<F>(mut self, f: F) -> Self
    where
        F: FnOnce(Declaration) -> Declaration + 'static,
    {
        self.configure.push(Box::new(f));
        self
    }

    pub fn options(mut self, options: RecordOptions) -> Self {
        self.options = options;
        self
    }

    /// Transformation applied to the defined type; its result is final.
    pub fn decorator<F>(mut self, f: F) -> Self
    where
        F: FnOnce(RecordTypeRef) -> Result<RecordTypeRef, ConfigError> + 'static,
    {
        self.decorator = Some(Box::new(f));
        self
    }

    pub fn build(self) -> Result<RecordTypeRef, ConfigError> {
        let mut seen: FastHashSet<SmolStr> = FastHashSet::default();
        let mut decl = Declaration::new(&self.name);
        for base in &self.bases {
            decl = decl.base(base);
        }
        for field in self.fields {
            let (name, token, spec) = match field {
                FieldDecl::Name(name) => (name, SmolStr::new_static(ANY_TYPE), None),
                FieldDecl::Typed(name, token) => (name, token, None),
                FieldDecl::Spec(name, token, spec) => (name, token, Some(spec)),
            };
            if !is_identifier(&name) {
                return Err(ConfigError::InvalidFieldName { field: name });
            }
            if !seen.insert(name.clone()) {
                return Err(ConfigError::DuplicateField { field: name });
            }
            decl = decl.annotate(&name, &token);
            if let Some(spec) = spec {
                decl = decl.set_attr(&name, spec);
            }
        }
        for (name, attr) in self.attrs {
            decl = decl.set_attr(&name, attr);
        }
        for configure in self.configure {
            decl = configure(decl);
        }
        tracing::debug!(record = %self.name, fields = seen.len(), "building record type");

        let ty = define(decl, self.options)?;
        match self.decorator {
            Some(decorator) => decorator(ty),
            None => Ok(ty),
        }
    }
}
