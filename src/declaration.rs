use crate::field::{Annotation, FieldSpec};
use crate::record::{HashMethod, Method, MethodTable, RecordTypeRef};
use crate::types::*;
use crate::value::Value;
use smol_str::SmolStr;
use std::sync::Arc;

/// A class-body attribute: a plain value or a field declaration.
#[derive(Debug, Clone)]
pub enum ClassAttr {
    Value(Value),
    Field(FieldSpec),
}

impl From<FieldSpec> for ClassAttr {
    fn from(spec: FieldSpec) -> Self {
        ClassAttr::Field(spec)
    }
}

macro_rules! class_attr_from_value {
    ($($ty:ty),*) => {
        $(impl From<$ty> for ClassAttr {
            fn from(value: $ty) -> Self {
                ClassAttr::Value(value.into())
            }
        })*
    };
}

class_attr_from_value!(Value, bool, i64, i32, f64, &str, String, SmolStr, crate::record::Instance);

// ─── Declaration ────────────────────────────────────────────────────────────

/// The raw body of a record declaration, before any synthesis.
///
/// Annotations and attributes keep their declaration order; declaring a
/// name again replaces it in place.
///
/// ```ignore
/// let decl = Declaration::new("Point")
///     .field("x", "int")
///     .field_with("y", "int", 0);
/// ```
pub struct Declaration {
    pub(crate) name: SmolStr,
    pub(crate) bases: Vec<RecordTypeRef>,
    pub(crate) annotations: Vec<(SmolStr, Annotation)>,
    pub(crate) attrs: Vec<(SmolStr, ClassAttr)>,
    pub(crate) methods: MethodTable,
    pub(crate) slots: Option<Vec<SmolStr>>,
    pub(crate) match_args: Option<Vec<SmolStr>>,
    pub(crate) doc: Option<String>,
}

impl Declaration {
    pub fn new(name: &str) -> Self {
        Self {
            name: SmolStr::new(name),
            bases: Vec::new(),
            annotations: Vec::new(),
            attrs: Vec::new(),
            methods: MethodTable::default(),
            slots: None,
            match_args: None,
            doc: None,
        }
    }

    pub fn name(&self) -> &SmolStr {
        &self.name
    }

    pub fn base(mut self, base: &RecordTypeRef) -> Self {
        self.bases.push(Arc::clone(base));
        self
    }

    /// Annotate `name` with an opaque type token.
    pub fn annotate(mut self, name: &str, token: &str) -> Self {
        let annotation = Annotation::parse(token);
        match self.annotations.iter_mut().find(|(n, _)| n == name) {
            Some(entry) => entry.1 = annotation,
            None => self.annotations.push((SmolStr::new(name), annotation)),
        }
        self
    }

    /// Set a class-body attribute.
    pub fn set_attr(mut self, name: &str, attr: impl Into<ClassAttr>) -> Self {
        let attr = attr.into();
        match self.attrs.iter_mut().find(|(n, _)| n == name) {
            Some(entry) => entry.1 = attr,
            None => self.attrs.push((SmolStr::new(name), attr)),
        }
        self
    }

    pub fn get_attr(&self, name: &str) -> Option<&ClassAttr> {
        self.attrs.iter().find(|(n, _)| n == name).map(|(_, attr)| attr)
    }

    /// Declared annotations in declaration order.
    pub fn annotations(&self) -> impl Iterator<Item = (&SmolStr, &Annotation)> {
        self.annotations.iter().map(|(n, a)| (n, a))
    }

    /// `name: token` with no default.
    pub fn field(self, name: &str, token: &str) -> Self {
        self.annotate(name, token)
    }

    /// `name: token = attr`, where `attr` is a plain default or a [`FieldSpec`].
    pub fn field_with(self, name: &str, token: &str, attr: impl Into<ClassAttr>) -> Self {
        self.annotate(name, token).set_attr(name, attr)
    }

    /// The keyword-only sentinel, conventionally named `_`.
    pub fn kw_only_marker(self, name: &str) -> Self {
        self.annotate(name, "KW_ONLY")
    }

    // ── Hand-written methods ────────────────────────────────────────────────

    pub fn init<F>(mut self, hook: F) -> Self
    where
        F: Fn(&crate::record::Instance, &Args) -> Result<(), crate::error::RecordError> + Send + Sync + 'static,
    {
        self.methods.init = Some(Method::User(Arc::new(hook)));
        self
    }

    pub fn post_init<F>(mut self, hook: F) -> Self
    where
        F: Fn(&crate::record::Instance, &[Value]) -> Result<(), crate::error::RecordError>
            + Send
            + Sync
            + 'static,
    {
        self.methods.post_init = Some(Arc::new(hook));
        self
    }

    pub fn repr<F>(mut self, hook: F) -> Self
    where
        F: Fn(&crate::record::Instance) -> String + Send + Sync + 'static,
    {
        self.methods.repr = Some(Method::User(Arc::new(hook)));
        self
    }

    pub fn eq<F>(mut self, hook: F) -> Self
    where
        F: Fn(&crate::record::Instance, &Value) -> Option<bool> + Send + Sync + 'static,
    {
        self.methods.eq = Some(Method::User(Arc::new(hook)));
        self
    }

    pub fn cmp<F>(mut self, hook: F) -> Self
    where
        F: Fn(&crate::record::Instance, &Value) -> Comparison + Send + Sync + 'static,
    {
        self.methods.order = Some(Method::User(Arc::new(hook)));
        self
    }

    pub fn hash<F>(mut self, hook: F) -> Self
    where
        F: Fn(&crate::record::Instance) -> Result<u64, crate::error::RecordError> + Send + Sync + 'static,
    {
        self.methods.hash = Some(HashMethod::User(Arc::new(hook)));
        self
    }

    /// Hand-written compact layout.
    pub fn slots<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.slots = Some(names.into_iter().map(|s| SmolStr::new(s.as_ref())).collect());
        self
    }

    /// Hand-written positional name tuple.
    pub fn match_args<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.match_args = Some(names.into_iter().map(|s| SmolStr::new(s.as_ref())).collect());
        self
    }

    pub fn doc(mut self, doc: &str) -> Self {
        self.doc = Some(doc.to_string());
        self
    }
}

impl std::fmt::Debug for Declaration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Declaration")
            .field("name", &self.name)
            .field("bases", &self.bases.iter().map(|b| b.name()).collect::<Vec<_>>())
            .field("annotations", &self.annotations)
            .field("attrs", &self.attrs)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_redeclaring_keeps_position() {
        let decl = Declaration::new("P")
            .field("x", "int")
            .field("y", "int")
            .field("x", "float");
        let names: Vec<_> = decl.annotations().map(|(n, a)| (n.as_str(), a.token())).collect();
        assert_eq!(names, vec![("x", "float"), ("y", "int")]);
    }

    #[test]
    fn test_attrs_round_trip() {
        let decl = Declaration::new("P")
            .field_with("x", "int", 3)
            .field_with("y", "int", FieldSpec::new().repr(false));
        assert!(matches!(decl.get_attr("x"), Some(ClassAttr::Value(Value::Int(3)))));
        assert!(matches!(decl.get_attr("y"), Some(ClassAttr::Field(_))));
        assert!(decl.get_attr("z").is_none());
    }
}
