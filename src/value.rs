use crate::error::RecordError;
use crate::record::Instance;
use crate::repr::RecursionGuard;
use crate::types::*;
use parking_lot::RwLock;
use smol_str::SmolStr;
use std::collections::BTreeMap;
use std::sync::Arc;
use xxhash_rust::xxh64::Xxh64;

pub type ValueMap = BTreeMap<SmolStr, Value>;

// ─── Value ──────────────────────────────────────────────────────────────────

/// A dynamically typed value stored in record fields.
///
/// Scalars and tuples are immutable. Lists, dicts and sets are shared
/// containers: cloning the `Value` aliases the same container, which is why
/// they are rejected as plain field defaults.
#[derive(Clone)]
pub enum Value {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(SmolStr),
    Tuple(Arc<[Value]>),
    List(Shared<Vec<Value>>),
    Dict(Shared<ValueMap>),
    Set(Shared<Vec<Value>>),
    Record(Instance),
}

impl Default for Value {
    fn default() -> Self {
        Value::None
    }
}

impl std::fmt::Debug for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.repr())
    }
}

#[derive(Clone, Copy)]
enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    fn compare(self, other: Number) -> Comparison {
        match (self, other) {
            (Number::Int(a), Number::Int(b)) => a.cmp(&b).into(),
            (Number::Int(a), Number::Float(b)) => compare_int_float(a, b),
            (Number::Float(a), Number::Int(b)) => compare_int_float(b, a).reverse(),
            (Number::Float(a), Number::Float(b)) => a.partial_cmp(&b).map_or(Comparison::Unordered, Comparison::from),
        }
    }
}

/// Exact int/float ordering: the int is never rounded to a nearby float.
fn compare_int_float(i: i64, f: f64) -> Comparison {
    const TWO_POW_63: f64 = 9_223_372_036_854_775_808.0;
    if f.is_nan() {
        return Comparison::Unordered;
    }
    let whole = f.trunc();
    if whole >= TWO_POW_63 {
        return Comparison::Less;
    }
    if whole < -TWO_POW_63 {
        return Comparison::Greater;
    }
    match i.cmp(&(whole as i64)) {
        std::cmp::Ordering::Equal => match f.fract() {
            frac if frac > 0.0 => Comparison::Less,
            frac if frac < 0.0 => Comparison::Greater,
            _ => Comparison::Equal,
        },
        decided => decided.into(),
    }
}

impl Value {
    // ── Constructors ────────────────────────────────────────────────────────

    pub fn list(items: Vec<Value>) -> Self {
        Value::List(Arc::new(RwLock::new(items)))
    }

    pub fn dict(map: ValueMap) -> Self {
        Value::Dict(Arc::new(RwLock::new(map)))
    }

    /// Build a set, dropping items equal to an earlier one.
    pub fn set(items: Vec<Value>) -> Self {
        let mut unique: Vec<Value> = Vec::with_capacity(items.len());
        for item in items {
            if !unique.iter().any(|seen| seen.equals(&item)) {
                unique.push(item);
            }
        }
        Value::Set(Arc::new(RwLock::new(unique)))
    }

    pub fn tuple(items: Vec<Value>) -> Self {
        Value::Tuple(items.into())
    }

    // ── Accessors ───────────────────────────────────────────────────────────

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_tuple(&self) -> Option<&[Value]> {
        match self {
            Value::Tuple(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_instance(&self) -> Option<&Instance> {
        match self {
            Value::Record(inst) => Some(inst),
            _ => None,
        }
    }

    /// Snapshot of a list or set's items.
    pub fn items(&self) -> Option<Vec<Value>> {
        match self {
            Value::List(items) | Value::Set(items) => Some(items.read().clone()),
            Value::Tuple(items) => Some(items.to_vec()),
            _ => None,
        }
    }

    /// Look up a key in a dict.
    pub fn get(&self, key: &str) -> Option<Value> {
        match self {
            Value::Dict(map) => map.read().get(key).cloned(),
            _ => None,
        }
    }

    /// Append to a list in place. Returns false for anything but a list.
    pub fn push(&self, item: Value) -> bool {
        match self {
            Value::List(items) => {
                items.write().push(item);
                true
            }
            _ => false,
        }
    }

    /// Insert into a dict in place. Returns false for anything but a dict.
    pub fn insert(&self, key: &str, item: Value) -> bool {
        match self {
            Value::Dict(map) => {
                map.write().insert(SmolStr::new(key), item);
                true
            }
            _ => false,
        }
    }

    pub fn len(&self) -> Option<usize> {
        match self {
            Value::Str(s) => Some(s.chars().count()),
            Value::Tuple(items) => Some(items.len()),
            Value::List(items) | Value::Set(items) => Some(items.read().len()),
            Value::Dict(map) => Some(map.read().len()),
            _ => None,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }

    pub fn type_name(&self) -> SmolStr {
        match self {
            Value::None => SmolStr::new_static("NoneType"),
            Value::Bool(_) => SmolStr::new_static("bool"),
            Value::Int(_) => SmolStr::new_static("int"),
            Value::Float(_) => SmolStr::new_static("float"),
            Value::Str(_) => SmolStr::new_static("str"),
            Value::Tuple(_) => SmolStr::new_static("tuple"),
            Value::List(_) => SmolStr::new_static("list"),
            Value::Dict(_) => SmolStr::new_static("dict"),
            Value::Set(_) => SmolStr::new_static("set"),
            Value::Record(inst) => inst.record_type().name().clone(),
        }
    }

    /// Identity token of a shared container or record instance.
    pub fn identity(&self) -> Option<usize> {
        match self {
            Value::List(items) | Value::Set(items) => Some(Arc::as_ptr(items) as *const () as usize),
            Value::Dict(map) => Some(Arc::as_ptr(map) as *const () as usize),
            Value::Record(inst) => Some(inst.identity()),
            _ => None,
        }
    }

    /// Whether both values are the very same object.
    pub fn is(&self, other: &Value) -> bool {
        match (self.identity(), other.identity()) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }

    fn number(&self) -> Option<Number> {
        match self {
            Value::Bool(b) => Some(Number::Int(i64::from(*b))),
            Value::Int(i) => Some(Number::Int(*i)),
            Value::Float(f) => Some(Number::Float(*f)),
            _ => None,
        }
    }

    // ── Equality / Ordering ─────────────────────────────────────────────────

    pub fn equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Record(inst), _) => inst.equals(other),
            (_, Value::Record(inst)) => inst.equals(self),
            (Value::None, Value::None) => true,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Tuple(a), Value::Tuple(b)) => seq_equals(a, b),
            (Value::List(a), Value::List(b)) => {
                if Arc::ptr_eq(a, b) {
                    return true;
                }
                let (a, b) = (a.read().clone(), b.read().clone());
                seq_equals(&a, &b)
            }
            (Value::Set(a), Value::Set(b)) => {
                if Arc::ptr_eq(a, b) {
                    return true;
                }
                let (a, b) = (a.read().clone(), b.read().clone());
                a.len() == b.len() && a.iter().all(|x| b.iter().any(|y| x.equals(y)))
            }
            (Value::Dict(a), Value::Dict(b)) => {
                if Arc::ptr_eq(a, b) {
                    return true;
                }
                let (a, b) = (a.read().clone(), b.read().clone());
                a.len() == b.len()
                    && a.iter()
                        .all(|(key, x)| b.get(key).is_some_and(|y| x.equals(y)))
            }
            _ => match (self.number(), other.number()) {
                (Some(a), Some(b)) => a.compare(b) == Comparison::Equal,
                _ => false,
            },
        }
    }

    pub fn compare(&self, other: &Value) -> Comparison {
        match (self, other) {
            (Value::Record(inst), _) => inst.compare(other),
            (_, Value::Record(inst)) => inst.compare(self).reverse(),
            (Value::Str(a), Value::Str(b)) => a.as_str().cmp(b.as_str()).into(),
            (Value::Tuple(a), Value::Tuple(b)) => compare_seq(a, b),
            (Value::List(a), Value::List(b)) => {
                let (a, b) = (a.read().clone(), b.read().clone());
                compare_seq(&a, &b)
            }
            _ => match (self.number(), other.number()) {
                (Some(a), Some(b)) => a.compare(b),
                _ => Comparison::Incomparable,
            },
        }
    }

    // ── Hashing ─────────────────────────────────────────────────────────────

    /// Hash consistent with [`Value::equals`]: equal values hash alike.
    pub fn hash_value(&self) -> Result<u64, RecordError> {
        match self {
            Value::None => Ok(hash_bytes(TAG_NONE, &[])),
            Value::Bool(b) => Ok(hash_int(i64::from(*b))),
            Value::Int(i) => Ok(hash_int(*i)),
            Value::Float(f) => {
                if f.is_finite() && f.fract() == 0.0 && *f >= -9_223_372_036_854_775_808.0 && *f < 9_223_372_036_854_775_808.0 {
                    Ok(hash_int(*f as i64))
                } else {
                    Ok(hash_bytes(TAG_FLOAT, &f.to_bits().to_le_bytes()))
                }
            }
            Value::Str(s) => Ok(hash_bytes(TAG_STR, s.as_bytes())),
            Value::Tuple(items) => hash_sequence(items),
            Value::Record(inst) => inst.hash(),
            Value::List(_) | Value::Dict(_) | Value::Set(_) => Err(RecordError::Unhashable {
                type_name: self.type_name(),
            }),
        }
    }

    // ── JSON ────────────────────────────────────────────────────────────────

    /// Convert into JSON. Records become objects of their stored fields.
    pub fn to_json(&self) -> Result<serde_json::Value, RecordError> {
        let mut guard = RecursionGuard::new();
        self.to_json_guarded(&mut guard)
    }

    fn to_json_guarded(&self, guard: &mut RecursionGuard) -> Result<serde_json::Value, RecordError> {
        let id = self.identity();
        if let Some(id) = id {
            if !guard.enter(id) {
                return Err(RecordError::CyclicValue);
            }
        }
        let converted = match self {
            Value::None => Ok(serde_json::Value::Null),
            Value::Bool(b) => Ok(serde_json::Value::Bool(*b)),
            Value::Int(i) => Ok(serde_json::json!(i)),
            Value::Float(f) => Ok(serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null)),
            Value::Str(s) => Ok(serde_json::Value::String(s.to_string())),
            Value::Tuple(_) | Value::List(_) | Value::Set(_) => self
                .items()
                .unwrap_or_default()
                .iter()
                .map(|item| item.to_json_guarded(guard))
                .collect::<Result<Vec<_>, _>>()
                .map(serde_json::Value::Array),
            Value::Dict(map) => {
                let entries = map.read().clone();
                entries
                    .iter()
                    .map(|(k, v)| Ok((k.to_string(), v.to_json_guarded(guard)?)))
                    .collect::<Result<serde_json::Map<_, _>, RecordError>>()
                    .map(serde_json::Value::Object)
            }
            Value::Record(inst) => inst
                .stored_pairs()
                .iter()
                .map(|(k, v)| Ok((k.to_string(), v.to_json_guarded(guard)?)))
                .collect::<Result<serde_json::Map<_, _>, RecordError>>()
                .map(serde_json::Value::Object),
        };
        if let Some(id) = id {
            guard.leave(id);
        }
        converted
    }
}

pub(crate) fn seq_equals(a: &[Value], b: &[Value]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.equals(y))
}

/// Lexicographic comparison: the first unequal pair decides, then length.
pub(crate) fn compare_seq(a: &[Value], b: &[Value]) -> Comparison {
    for (x, y) in a.iter().zip(b) {
        if !x.equals(y) {
            return x.compare(y);
        }
    }
    a.len().cmp(&b.len()).into()
}

pub(crate) fn hash_sequence(items: &[Value]) -> Result<u64, RecordError> {
    let mut hasher = Xxh64::new(0);
    hasher.update(&[TAG_TUPLE]);
    hasher.update(&(items.len() as u64).to_le_bytes());
    for item in items {
        hasher.update(&item.hash_value()?.to_le_bytes());
    }
    Ok(hasher.digest())
}

#[inline]
fn hash_int(i: i64) -> u64 {
    hash_bytes(TAG_BOOL_OR_INT, &i.to_le_bytes())
}

#[inline]
pub(crate) fn hash_bytes(tag: u8, bytes: &[u8]) -> u64 {
    let mut hasher = Xxh64::new(0);
    hasher.update(&[tag]);
    hasher.update(bytes);
    hasher.digest()
}

// ─── From impls ─────────────────────────────────────────────────────────────

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(i64::from(n))
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(SmolStr::from(s))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(SmolStr::from(s))
    }
}

impl From<SmolStr> for Value {
    fn from(s: SmolStr) -> Self {
        Value::Str(s)
    }
}

impl From<Instance> for Value {
    fn from(inst: Instance) -> Self {
        Value::Record(inst)
    }
}

// ─── From<cbor4ii::core::Value> ─────────────────────────────────────────────

impl From<cbor4ii::core::Value> for Value {
    fn from(v: cbor4ii::core::Value) -> Self {
        match v {
            cbor4ii::core::Value::Null => Value::None,
            cbor4ii::core::Value::Bool(b) => Value::Bool(b),
            cbor4ii::core::Value::Integer(i) => match i64::try_from(i) {
                Ok(val) => Value::Int(val),
                Err(_) => Value::Float(i as f64),
            },
            cbor4ii::core::Value::Float(f) => Value::Float(f),
            cbor4ii::core::Value::Text(s) => Value::Str(SmolStr::from(s)),
            cbor4ii::core::Value::Bytes(b) => Value::Str(SmolStr::from(String::from_utf8_lossy(&b))),
            cbor4ii::core::Value::Array(arr) => Value::list(arr.into_iter().map(Value::from).collect()),
            cbor4ii::core::Value::Map(map) => Value::dict(
                map.into_iter()
                    .map(|(k, v)| {
                        let key = match k {
                            cbor4ii::core::Value::Text(s) => SmolStr::from(s),
                            cbor4ii::core::Value::Integer(i) => SmolStr::from(i.to_string()),
                            other => SmolStr::from(format!("{:?}", other)),
                        };
                        (key, Value::from(v))
                    })
                    .collect(),
            ),
            cbor4ii::core::Value::Tag(_, inner) => Value::from(*inner),
            // `cbor4ii::core::Value` is `#[non_exhaustive]`; every variant is handled above.
            _ => unreachable!("unknown cbor4ii::core::Value variant"),
        }
    }
}

// ─── From<serde_json::Value> ────────────────────────────────────────────────

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::None,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int(i)
                } else {
                    Value::Float(n.as_f64().unwrap_or(0.0))
                }
            }
            serde_json::Value::String(s) => Value::Str(SmolStr::from(s)),
            serde_json::Value::Array(arr) => Value::list(arr.into_iter().map(Value::from).collect()),
            serde_json::Value::Object(obj) => Value::dict(
                obj.into_iter()
                    .map(|(k, v)| (SmolStr::from(k), Value::from(v)))
                    .collect(),
            ),
        }
    }
}
