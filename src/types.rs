use crate::error::{ConfigError, RecordError};
use crate::record::{Instance, RecordTypeRef};
use crate::value::Value;
use parking_lot::RwLock;
use rustc_hash::FxHasher;
use smol_str::SmolStr;
use std::collections::{HashMap, HashSet};
use std::hash::BuildHasherDefault;
use std::sync::Arc;

pub type FastMap<K, V> = HashMap<K, V, BuildHasherDefault<FxHasher>>;
pub type FastHashSet<T> = HashSet<T, BuildHasherDefault<FxHasher>>;

/// Interior-mutable container shared between every value that aliases it.
pub type Shared<T> = Arc<RwLock<T>>;

// ─── Hash Tags ──────────────────────────────────────────────────────────────
// Fed to xxh64 ahead of each value so that e.g. "1" and 1 never collide.
pub const TAG_NONE: u8 = 0;
pub const TAG_BOOL_OR_INT: u8 = 1;
pub const TAG_FLOAT: u8 = 2;
pub const TAG_STR: u8 = 3;
pub const TAG_TUPLE: u8 = 4;
pub const TAG_RECORD: u8 = 5;
pub const TAG_IDENTITY: u8 = 6;

// ─── Layout Limits ──────────────────────────────────────────────────────────

/// Compact records keep their slots in a fixed `ArrayVec`.
pub const MAX_SLOTS: usize = 32;

/// Name of the weak-reference slot in a compact slot list.
pub const WEAKREF_SLOT: &str = "__weakref__";

/// Annotation token given to fields declared by bare name.
pub const ANY_TYPE: &str = "typing.Any";

// ─── Comparison ─────────────────────────────────────────────────────────────

/// Outcome of an ordering comparison.
///
/// `Incomparable` is a result, not an error: the boolean operators on
/// [`Instance`] turn it into [`RecordError::Unorderable`], equality turns it
/// into "not equal". `Unordered` is for values of comparable kinds where no
/// order holds (NaN): every boolean operator is false.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Less,
    Equal,
    Greater,
    Unordered,
    Incomparable,
}

impl Comparison {
    pub fn reverse(self) -> Self {
        match self {
            Comparison::Less => Comparison::Greater,
            Comparison::Greater => Comparison::Less,
            other => other,
        }
    }
}

impl From<std::cmp::Ordering> for Comparison {
    fn from(ordering: std::cmp::Ordering) -> Self {
        match ordering {
            std::cmp::Ordering::Less => Comparison::Less,
            std::cmp::Ordering::Equal => Comparison::Equal,
            std::cmp::Ordering::Greater => Comparison::Greater,
        }
    }
}

// ─── Hook Signatures ────────────────────────────────────────────────────────

pub type DefaultFactory = Arc<dyn Fn() -> Value + Send + Sync>;
pub type InitHook = Arc<dyn Fn(&Instance, &Args) -> Result<(), RecordError> + Send + Sync>;
/// Receives the pseudo-field values in declaration order.
pub type PostInitHook = Arc<dyn Fn(&Instance, &[Value]) -> Result<(), RecordError> + Send + Sync>;
pub type ReprHook = Arc<dyn Fn(&Instance) -> String + Send + Sync>;
/// `None` is the not-comparable result.
pub type EqHook = Arc<dyn Fn(&Instance, &Value) -> Option<bool> + Send + Sync>;
pub type CmpHook = Arc<dyn Fn(&Instance, &Value) -> Comparison + Send + Sync>;
pub type HashHook = Arc<dyn Fn(&Instance) -> Result<u64, RecordError> + Send + Sync>;
pub type Decorator = Box<dyn FnOnce(RecordTypeRef) -> Result<RecordTypeRef, ConfigError>>;

// ─── Call Arguments ─────────────────────────────────────────────────────────

/// Positional and keyword arguments for a record constructor.
#[derive(Clone, Default)]
pub struct Args {
    pub positional: Vec<Value>,
    pub keywords: Vec<(SmolStr, Value)>,
}

impl Args {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn positional<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self {
            positional: values.into_iter().map(Into::into).collect(),
            keywords: Vec::new(),
        }
    }

    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.positional.push(value.into());
        self
    }

    pub fn kwarg(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.keywords.push((SmolStr::new(name), value.into()));
        self
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.keywords.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.positional.len() + self.keywords.len()
    }
}

impl std::fmt::Debug for Args {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Args")
            .field("positional", &self.positional)
            .field("keywords", &self.keywords)
            .finish()
    }
}
