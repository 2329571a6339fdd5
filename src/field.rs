use crate::types::DefaultFactory;
use crate::value::{Value, ValueMap};
use smol_str::SmolStr;
use std::sync::Arc;

// ─── Annotation ─────────────────────────────────────────────────────────────

/// A declared annotation token, classified by its reserved wrapper form.
///
/// Anything that is not one of the wrappers is kept verbatim and never
/// interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Annotation {
    /// An ordinary field type.
    Type(SmolStr),
    /// `ClassVar[T]`: a class-level attribute, not a field.
    ClassVar(SmolStr),
    /// `InitVar[T]`: a pseudo-field passed to the post-init hook.
    InitVar(SmolStr),
    /// `KW_ONLY`: later fields default to keyword-only.
    KwOnly,
}

impl Annotation {
    pub fn parse(token: &str) -> Self {
        let token = token.trim();
        if matches!(token, "KW_ONLY" | "dataclasses.KW_ONLY") {
            return Annotation::KwOnly;
        }
        if let Some(inner) = unwrap_form(token, &["ClassVar", "typing.ClassVar"]) {
            return Annotation::ClassVar(SmolStr::new(inner));
        }
        if let Some(inner) = unwrap_form(token, &["InitVar", "dataclasses.InitVar"]) {
            return Annotation::InitVar(SmolStr::new(inner));
        }
        Annotation::Type(SmolStr::new(token))
    }

    /// The token to report as the field's declared type.
    pub fn token(&self) -> &str {
        match self {
            Annotation::Type(t) | Annotation::ClassVar(t) | Annotation::InitVar(t) => t,
            Annotation::KwOnly => "KW_ONLY",
        }
    }
}

/// `Wrapper[inner]` -> `inner`, bare `Wrapper` -> `""`.
fn unwrap_form<'a>(token: &'a str, wrappers: &[&str]) -> Option<&'a str> {
    for wrapper in wrappers {
        let Some(rest) = token.strip_prefix(wrapper) else {
            continue;
        };
        if rest.is_empty() {
            return Some("");
        }
        if let Some(inner) = rest.strip_prefix('[').and_then(|r| r.strip_suffix(']')) {
            return Some(inner.trim());
        }
    }
    None
}

// ─── Metadata ───────────────────────────────────────────────────────────────

/// Read-only mapping attached to a field for external consumers.
#[derive(Clone, Default)]
pub struct Metadata(Arc<ValueMap>);

impl Metadata {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&SmolStr, &Value)> {
        self.0.iter()
    }
}

impl std::fmt::Debug for Metadata {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map().entries(self.0.iter()).finish()
    }
}

// ─── FieldSpec ──────────────────────────────────────────────────────────────

/// Per-field options given at declaration time.
///
/// ```ignore
/// FieldSpec::new().default(20).repr(false)
/// FieldSpec::new().default_factory(|| Value::list(vec![]))
/// ```
#[derive(Clone)]
pub struct FieldSpec {
    pub(crate) default: Option<Value>,
    pub(crate) default_factory: Option<DefaultFactory>,
    pub(crate) init: bool,
    pub(crate) repr: bool,
    pub(crate) compare: bool,
    pub(crate) hash: Option<bool>,
    pub(crate) kw_only: Option<bool>,
    pub(crate) metadata: ValueMap,
}

impl Default for FieldSpec {
    fn default() -> Self {
        Self {
            default: None,
            default_factory: None,
            init: true,
            repr: true,
            compare: true,
            hash: None,
            kw_only: None,
            metadata: ValueMap::new(),
        }
    }
}

impl FieldSpec {
    pub fn new() -> Self {
        <Self as Default>::default()
    }

    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn default_factory<F>(mut self, factory: F) -> Self
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        self.default_factory = Some(Arc::new(factory));
        self
    }

    pub fn init(mut self, init: bool) -> Self {
        self.init = init;
        self
    }

    pub fn repr(mut self, repr: bool) -> Self {
        self.repr = repr;
        self
    }

    pub fn compare(mut self, compare: bool) -> Self {
        self.compare = compare;
        self
    }

    /// Force the field in or out of the generated hash.
    pub fn hash(mut self, hash: bool) -> Self {
        self.hash = Some(hash);
        self
    }

    pub fn kw_only(mut self, kw_only: bool) -> Self {
        self.kw_only = Some(kw_only);
        self
    }

    pub fn metadata(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.metadata.insert(SmolStr::new(key), value.into());
        self
    }
}

impl std::fmt::Debug for FieldSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldSpec")
            .field("default", &self.default)
            .field("default_factory", &self.default_factory.is_some())
            .field("init", &self.init)
            .field("repr", &self.repr)
            .field("compare", &self.compare)
            .field("hash", &self.hash)
            .field("kw_only", &self.kw_only)
            .finish()
    }
}

// ─── Field ──────────────────────────────────────────────────────────────────

/// How a field gets its value when the caller does not supply one.
#[derive(Clone, Default)]
pub enum FieldDefault {
    #[default]
    Missing,
    Value(Value),
    Factory(DefaultFactory),
}

impl FieldDefault {
    /// A fresh default: factories run once per call.
    pub fn produce(&self) -> Option<Value> {
        match self {
            FieldDefault::Missing => None,
            FieldDefault::Value(v) => Some(v.clone()),
            FieldDefault::Factory(factory) => Some(factory()),
        }
    }
}

/// Resolved metadata of one record field.
///
/// Built once when the owning record type is defined and never changed.
#[derive(Clone)]
pub struct Field {
    pub(crate) name: SmolStr,
    pub(crate) declared_type: SmolStr,
    pub(crate) default: FieldDefault,
    pub(crate) init: bool,
    pub(crate) repr: bool,
    pub(crate) compare: bool,
    pub(crate) hash: Option<bool>,
    pub(crate) kw_only: bool,
    pub(crate) is_pseudo_field: bool,
    pub(crate) metadata: Metadata,
    /// Id of the record type whose declaration produced this field.
    pub(crate) origin: u64,
}

impl Field {
    pub(crate) fn from_spec(
        name: SmolStr,
        declared_type: SmolStr,
        spec: FieldSpec,
        kw_only: bool,
        is_pseudo_field: bool,
        origin: u64,
    ) -> Self {
        let default = match (spec.default, spec.default_factory) {
            (Some(value), _) => FieldDefault::Value(value),
            (None, Some(factory)) => FieldDefault::Factory(factory),
            (None, None) => FieldDefault::Missing,
        };
        Self {
            name,
            declared_type,
            default,
            init: spec.init,
            repr: spec.repr,
            compare: spec.compare,
            hash: spec.hash,
            kw_only,
            is_pseudo_field,
            metadata: Metadata(Arc::new(spec.metadata)),
            origin,
        }
    }

    #[inline]
    pub fn name(&self) -> &SmolStr {
        &self.name
    }

    #[inline]
    pub fn declared_type(&self) -> &str {
        &self.declared_type
    }

    pub fn default(&self) -> Option<&Value> {
        match &self.default {
            FieldDefault::Value(v) => Some(v),
            _ => None,
        }
    }

    pub fn default_factory(&self) -> Option<&DefaultFactory> {
        match &self.default {
            FieldDefault::Factory(factory) => Some(factory),
            _ => None,
        }
    }

    #[inline]
    pub fn has_default(&self) -> bool {
        !matches!(self.default, FieldDefault::Missing)
    }

    #[inline]
    pub fn init(&self) -> bool {
        self.init
    }

    #[inline]
    pub fn repr(&self) -> bool {
        self.repr
    }

    #[inline]
    pub fn compare(&self) -> bool {
        self.compare
    }

    /// The explicit hash flag, `None` meaning "follow compare".
    #[inline]
    pub fn hash(&self) -> Option<bool> {
        self.hash
    }

    /// Whether the generated hash covers this field.
    #[inline]
    pub fn hash_included(&self) -> bool {
        self.hash.unwrap_or(self.compare)
    }

    #[inline]
    pub fn kw_only(&self) -> bool {
        self.kw_only
    }

    #[inline]
    pub fn is_pseudo_field(&self) -> bool {
        self.is_pseudo_field
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Takes part in positional binding of the generated constructor.
    #[inline]
    pub(crate) fn is_positional(&self) -> bool {
        self.init && !self.kw_only
    }
}

impl std::fmt::Debug for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.name)
            .field("type", &self.declared_type)
            .field("default", &self.default())
            .field("default_factory", &self.default_factory().is_some())
            .field("init", &self.init)
            .field("repr", &self.repr)
            .field("hash", &self.hash)
            .field("compare", &self.compare)
            .field("kw_only", &self.kw_only)
            .field("pseudo", &self.is_pseudo_field)
            .field("metadata", &self.metadata)
            .finish()
    }
}

/// Same declaration, regardless of which record type carries the copy.
impl PartialEq for Field {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.declared_type == other.declared_type
            && self.origin == other.origin
            && self.init == other.init
            && self.repr == other.repr
            && self.compare == other.compare
            && self.hash == other.hash
            && self.kw_only == other.kw_only
            && self.is_pseudo_field == other.is_pseudo_field
            && match (&self.default, &other.default) {
                (FieldDefault::Missing, FieldDefault::Missing) => true,
                (FieldDefault::Value(a), FieldDefault::Value(b)) => a.equals(b),
                (FieldDefault::Factory(a), FieldDefault::Factory(b)) => Arc::ptr_eq(a, b),
                _ => false,
            }
    }
}
