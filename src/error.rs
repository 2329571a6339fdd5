// ─── Error ──────────────────────────────────────────────────────────────────
use smol_str::SmolStr;
use thiserror::Error;

/// A record declaration that cannot be turned into a type.
///
/// Raised while the type is being defined, never while it is used.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("mutable default {kind} for field {field} is not allowed: use default_factory")]
    MutableDefault { field: SmolStr, kind: SmolStr },
    #[error("non-default argument '{field}' follows default argument")]
    NonDefaultAfterDefault { field: SmolStr },
    #[error("cannot specify both default and default_factory for field '{field}'")]
    DefaultAndFactory { field: SmolStr },
    #[error("'{field}' is a field but has no type annotation")]
    FieldWithoutAnnotation { field: SmolStr },
    #[error("field '{field}' cannot have a default factory")]
    FactoryNotAllowed { field: SmolStr },
    #[error("field '{field}' is declared independently by {first} and {second}")]
    ConflictingBaseField {
        field: SmolStr,
        first: SmolStr,
        second: SmolStr,
    },
    #[error("duplicate field name '{field}'")]
    DuplicateField { field: SmolStr },
    #[error("field names must be identifiers: '{field}'")]
    InvalidFieldName { field: SmolStr },
    #[error("'{field}' is KW_ONLY, but KW_ONLY has already been specified")]
    DuplicateKwOnly { field: SmolStr },
    #[error("eq must be true if order is true")]
    OrderWithoutEq,
    #[error("cannot overwrite the hand-written ordering of {record} with order=true")]
    OrderOverride { record: SmolStr },
    #[error("cannot overwrite the hand-written hash of {record} with unsafe_hash=true")]
    ConflictingHash { record: SmolStr },
    #[error("cannot inherit non-frozen record {record} from a frozen one")]
    NonFrozenFromFrozen { record: SmolStr },
    #[error("cannot inherit frozen record {record} from a non-frozen one")]
    FrozenFromNonFrozen { record: SmolStr },
    #[error("{record} already specifies slots")]
    SlotsAlreadyDeclared { record: SmolStr },
    #[error("slot '{slot}' of {record} is already provided by a base record")]
    DuplicateSlot { record: SmolStr, slot: SmolStr },
    #[error("{record} redeclares the weak-reference slot of a base record")]
    DuplicateWeakrefSlot { record: SmolStr },
    #[error("weakref_slot is true, but slots is false")]
    WeakrefWithoutSlots,
    #[error("{record} needs {count} slots, compact layout holds at most 32")]
    TooManySlots { record: SmolStr, count: usize },
    #[error("pseudo-field '{field}' of {record} is never consumed: {record} has no post-init hook")]
    MissingPostInit { record: SmolStr, field: SmolStr },
    #[error("field '{field}' of {record} has init=false, no default and no post-init hook")]
    UninitializedField { record: SmolStr, field: SmolStr },
    #[error("decorator rejected {record}: {reason}")]
    Decorator { record: SmolStr, reason: String },
}

/// Failures while constructing, reading or operating on record instances.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("{record}() takes {expected} positional arguments but {given} were given")]
    TooManyPositional {
        record: SmolStr,
        expected: usize,
        given: usize,
    },
    #[error("{record}() got an unexpected keyword argument '{name}'")]
    UnexpectedKeyword { record: SmolStr, name: SmolStr },
    #[error("{record}() got multiple values for argument '{name}'")]
    MultipleValues { record: SmolStr, name: SmolStr },
    #[error("{record}() missing required arguments: {}", .names.join(", "))]
    MissingArguments { record: SmolStr, names: Vec<SmolStr> },
    #[error("'{record}' object has no attribute '{name}'")]
    NoAttribute { record: SmolStr, name: SmolStr },
    #[error("cannot assign to field '{name}' of a frozen record")]
    FrozenAssign { name: SmolStr },
    #[error("cannot delete field '{name}' of a frozen record")]
    FrozenDelete { name: SmolStr },
    #[error("unhashable type: '{type_name}'")]
    Unhashable { type_name: SmolStr },
    #[error("'{op}' not supported between instances of '{left}' and '{right}'")]
    Unorderable {
        op: &'static str,
        left: SmolStr,
        right: SmolStr,
    },
    #[error("{function}() should be called on record instances, not '{type_name}'")]
    NotARecord {
        function: &'static str,
        type_name: SmolStr,
    },
    #[error("field {field} is declared with init=false, it cannot be specified with replace()")]
    ReplaceInitFalse { field: SmolStr },
    #[error("pseudo-field '{field}' must be specified with replace()")]
    MissingPseudoField { field: SmolStr },
    #[error("cannot create weak reference to '{record}' object")]
    NotWeakReferenceable { record: SmolStr },
    #[error("value refers to itself and cannot be converted")]
    CyclicValue,
    #[error("CBOR error: {0}")]
    CborError(String),
    #[error("Invalid snapshot structure")]
    InvalidSnapshot,
    #[error("{0}")]
    Hook(String),
}

impl RecordError {
    /// Error raised from a hand-written hook.
    pub fn hook(message: impl Into<String>) -> Self {
        RecordError::Hook(message.into())
    }
}
