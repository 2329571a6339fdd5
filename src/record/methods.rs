use crate::types::*;

/// A synthesized behavior slot: generated from the owner's fields, or
/// supplied by hand.
#[derive(Clone)]
pub enum Method<F> {
    Generated,
    User(F),
}

impl<F> Method<F> {
    #[inline]
    pub fn is_generated(&self) -> bool {
        matches!(self, Method::Generated)
    }
}

/// Hashing needs a third state: explicitly switched off.
#[derive(Clone)]
pub enum HashMethod {
    Generated,
    User(HashHook),
    Disabled,
}

impl HashMethod {
    fn label(&self) -> &'static str {
        match self {
            HashMethod::Generated => "generated",
            HashMethod::User(_) => "user",
            HashMethod::Disabled => "disabled",
        }
    }
}

/// Behaviors attached directly to one record type.
///
/// An empty slot means "inherit": lookups continue along the ancestors.
#[derive(Clone, Default)]
pub struct MethodTable {
    pub(crate) init: Option<Method<InitHook>>,
    pub(crate) post_init: Option<PostInitHook>,
    pub(crate) repr: Option<Method<ReprHook>>,
    pub(crate) eq: Option<Method<EqHook>>,
    pub(crate) order: Option<Method<CmpHook>>,
    pub(crate) hash: Option<HashMethod>,
}

fn label<F>(method: &Option<Method<F>>) -> &'static str {
    match method {
        None => "-",
        Some(Method::Generated) => "generated",
        Some(Method::User(_)) => "user",
    }
}

impl std::fmt::Debug for MethodTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MethodTable")
            .field("init", &label(&self.init))
            .field("post_init", &self.post_init.is_some())
            .field("repr", &label(&self.repr))
            .field("eq", &label(&self.eq))
            .field("order", &label(&self.order))
            .field("hash", &self.hash.as_ref().map_or("-", HashMethod::label))
            .finish()
    }
}
