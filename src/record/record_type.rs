use super::instance::Instance;
use super::methods::{HashMethod, MethodTable};
use crate::error::RecordError;
use crate::field::Field;
use crate::options::RecordOptions;
use crate::types::*;
use crate::value::Value;
use arrayvec::ArrayVec;
use smol_str::SmolStr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_TYPE_ID: AtomicU64 = AtomicU64::new(1);

#[inline]
pub(crate) fn next_type_id() -> u64 {
    NEXT_TYPE_ID.fetch_add(1, Ordering::Relaxed)
}

pub type RecordTypeRef = Arc<RecordType>;

// ─── Class Attributes ───────────────────────────────────────────────────────

/// What the type itself answers for an attribute name.
#[derive(Debug, Clone)]
pub enum ClassAttribute {
    Value(Value),
    /// A compact-storage slot. The field default, if any, is kept here
    /// instead of as a class-level value.
    Slot { default: Option<Value> },
}

#[derive(Debug, Clone)]
pub(crate) enum MatchArgs {
    Explicit(Arc<[SmolStr]>),
    Generated(Arc<[SmolStr]>),
}

impl MatchArgs {
    fn names(&self) -> &[SmolStr] {
        match self {
            MatchArgs::Explicit(names) | MatchArgs::Generated(names) => names,
        }
    }
}

// ─── Layout ─────────────────────────────────────────────────────────────────

/// Instance storage shape.
#[derive(Debug, Clone, Default)]
pub struct Layout {
    /// Every slot an instance carries, inherited ones first. Never contains
    /// the weak-reference slot.
    pub(crate) slots: ArrayVec<SmolStr, MAX_SLOTS>,
    /// Slots introduced by this type, as declared.
    pub(crate) own_slots: Vec<SmolStr>,
    pub(crate) compact: bool,
    pub(crate) has_dict: bool,
    pub(crate) weakref: bool,
}

impl Layout {
    /// Linear scan; a compact record never has more than `MAX_SLOTS` slots.
    #[inline]
    pub(crate) fn slot_index(&self, name: &str) -> Option<usize> {
        self.slots.iter().position(|slot| slot == name)
    }

    pub fn is_compact(&self) -> bool {
        self.compact
    }

    pub fn has_dict(&self) -> bool {
        self.has_dict
    }

    pub fn supports_weakref(&self) -> bool {
        self.weakref
    }

    pub fn slots(&self) -> &[SmolStr] {
        &self.slots
    }
}

// ─── RecordType ─────────────────────────────────────────────────────────────

/// A defined record type: its resolved fields, synthesized methods and
/// storage layout. Immutable once built and shared as [`RecordTypeRef`].
pub struct RecordType {
    pub(crate) id: u64,
    pub(crate) name: SmolStr,
    pub(crate) bases: Vec<RecordTypeRef>,
    /// Linearized base chain, nearest first.
    pub(crate) ancestors: Vec<RecordTypeRef>,
    pub(crate) fields: Arc<[Field]>,
    pub(crate) class_attrs: FastMap<SmolStr, ClassAttribute>,
    pub(crate) methods: MethodTable,
    pub(crate) options: RecordOptions,
    pub(crate) match_args: Option<MatchArgs>,
    pub(crate) layout: Layout,
    pub(crate) doc: Option<String>,
}

impl RecordType {
    /// Construct an instance by running the resolved constructor.
    pub fn instantiate(ty: &RecordTypeRef, args: Args) -> Result<Instance, RecordError> {
        Instance::new(ty, args)
    }

    #[inline]
    pub fn name(&self) -> &SmolStr {
        &self.name
    }

    #[inline]
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn bases(&self) -> &[RecordTypeRef] {
        &self.bases
    }

    pub fn ancestors(&self) -> &[RecordTypeRef] {
        &self.ancestors
    }

    /// Stored fields in declaration order. Pseudo-fields are excluded.
    pub fn fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter().filter(|f| !f.is_pseudo_field)
    }

    /// Every collected field, pseudo-fields included.
    pub fn all_fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn options(&self) -> &RecordOptions {
        &self.options
    }

    #[inline]
    pub fn is_frozen(&self) -> bool {
        self.options.frozen
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Slot names this type introduced, in declaration order.
    pub fn slots(&self) -> &[SmolStr] {
        &self.layout.own_slots
    }

    pub fn doc(&self) -> Option<&str> {
        self.doc.as_deref()
    }

    pub fn is_subclass_of(&self, other: &RecordType) -> bool {
        self.is_subclass_of_id(other.id)
    }

    pub(crate) fn is_subclass_of_id(&self, id: u64) -> bool {
        self.id == id || self.ancestors.iter().any(|a| a.id == id)
    }

    /// Class-level attribute lookup along the type chain.
    pub fn class_attribute(&self, name: &str) -> Option<ClassAttribute> {
        self.resolve(|ty| ty.class_attrs.get(name).cloned())
            .map(|(_, attr)| attr)
    }

    /// Positional field names published for destructuring callers.
    pub fn match_args(&self) -> Option<&[SmolStr]> {
        std::iter::once(self)
            .chain(self.ancestors.iter().map(|a| &**a))
            .find_map(|ty| ty.match_args.as_ref())
            .map(MatchArgs::names)
    }

    /// Whether some type in the chain wrote its own name tuple.
    pub(crate) fn has_explicit_match_args(&self) -> bool {
        std::iter::once(self)
            .chain(self.ancestors.iter().map(|a| &**a))
            .any(|ty| matches!(ty.match_args, Some(MatchArgs::Explicit(_))))
    }

    pub fn is_hashable(&self) -> bool {
        !matches!(
            self.resolve(|ty| ty.methods.hash.clone()),
            Some((_, HashMethod::Disabled))
        )
    }

    pub fn has_post_init(&self) -> bool {
        self.resolve(|ty| ty.methods.post_init.clone()).is_some()
    }

    /// First type in the chain, starting with `self`, for which `pick`
    /// yields something.
    pub(crate) fn resolve<T>(&self, pick: impl Fn(&RecordType) -> Option<T>) -> Option<(&RecordType, T)> {
        if let Some(found) = pick(self) {
            return Some((self, found));
        }
        self.ancestors
            .iter()
            .find_map(|ancestor| pick(&**ancestor).map(|found| (&**ancestor, found)))
    }
}

impl std::fmt::Debug for RecordType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordType")
            .field("name", &self.name)
            .field("bases", &self.bases.iter().map(|b| b.name()).collect::<Vec<_>>())
            .field("fields", &self.fields.iter().map(Field::name).collect::<Vec<_>>())
            .field("methods", &self.methods)
            .field("layout", &self.layout)
            .finish()
    }
}
