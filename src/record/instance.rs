use super::init;
use super::methods::Method;
use super::record_type::{ClassAttribute, RecordTypeRef};
use crate::error::RecordError;
use crate::types::*;
use crate::value::Value;
use arrayvec::ArrayVec;
use parking_lot::RwLock;
use smol_str::SmolStr;
use std::sync::{Arc, Weak};

// ─── Storage ────────────────────────────────────────────────────────────────

/// Per-instance attribute storage.
///
/// Slots are positional, indexed by the type's layout. The dict, present
/// unless every type in the chain is compact, holds everything else in
/// insertion order.
struct Storage {
    slots: ArrayVec<Option<Value>, MAX_SLOTS>,
    dict: Option<Vec<(SmolStr, Value)>>,
}

pub(crate) struct InstanceInner {
    ty: RecordTypeRef,
    state: RwLock<Storage>,
}

/// Shared handle to one record value. Cloning aliases the same instance.
///
/// Handles are strong references. Records that reach each other through
/// their fields form a reference cycle and are never freed. Clear one of
/// the linking fields before dropping the last outside handle, or keep
/// back-links outside the graph as [`WeakInstance`]s.
#[derive(Clone)]
pub struct Instance(Arc<InstanceInner>);

/// Non-owning handle, available when the layout supports weak references.
#[derive(Clone)]
pub struct WeakInstance(Weak<InstanceInner>);

impl WeakInstance {
    pub fn upgrade(&self) -> Option<Instance> {
        self.0.upgrade().map(Instance)
    }
}

impl Instance {
    /// Allocate an instance of `ty` and run its resolved constructor.
    pub fn new(ty: &RecordTypeRef, args: Args) -> Result<Self, RecordError> {
        let inst = Self::allocate(ty);
        match ty.resolve(|t| t.methods.init.clone()) {
            Some((owner, Method::Generated)) => init::run_generated(&inst, owner, &args)?,
            Some((_, Method::User(hook))) => hook(&inst, &args)?,
            None if !args.is_empty() => {
                return Err(RecordError::TooManyPositional {
                    record: ty.name.clone(),
                    expected: 0,
                    given: args.len(),
                });
            }
            None => {}
        }
        Ok(inst)
    }

    /// An instance with every slot empty and no constructor run.
    pub(crate) fn allocate(ty: &RecordTypeRef) -> Self {
        let slots = (0..ty.layout.slots.len()).map(|_| None).collect();
        let dict = ty.layout.has_dict.then(Vec::new);
        Instance(Arc::new(InstanceInner {
            ty: Arc::clone(ty),
            state: RwLock::new(Storage { slots, dict }),
        }))
    }

    #[inline]
    pub fn record_type(&self) -> &RecordTypeRef {
        &self.0.ty
    }

    /// Address-based identity, stable for the instance's lifetime.
    #[inline]
    pub fn identity(&self) -> usize {
        Arc::as_ptr(&self.0) as *const () as usize
    }

    #[inline]
    pub fn ptr_eq(&self, other: &Instance) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    fn no_attribute(&self, name: &str) -> RecordError {
        RecordError::NoAttribute {
            record: self.0.ty.name.clone(),
            name: SmolStr::new(name),
        }
    }

    // ── Attribute access ────────────────────────────────────────────────────

    /// Instance storage first, then class-level attributes.
    pub fn get(&self, name: &str) -> Result<Value, RecordError> {
        let ty = &self.0.ty;
        {
            let state = self.0.state.read();
            if let Some(i) = ty.layout.slot_index(name) {
                return state.slots[i].clone().ok_or_else(|| self.no_attribute(name));
            }
            if let Some((_, value)) = state.dict.iter().flatten().find(|(n, _)| n == name) {
                return Ok(value.clone());
            }
        }
        match ty.class_attribute(name) {
            Some(ClassAttribute::Value(value)) => Ok(value),
            _ => Err(self.no_attribute(name)),
        }
    }

    pub fn set(&self, name: &str, value: impl Into<Value>) -> Result<(), RecordError> {
        if self.0.ty.is_frozen() {
            return Err(RecordError::FrozenAssign { name: SmolStr::new(name) });
        }
        self.init_attr(name, value.into())
    }

    pub fn delete(&self, name: &str) -> Result<(), RecordError> {
        if self.0.ty.is_frozen() {
            return Err(RecordError::FrozenDelete { name: SmolStr::new(name) });
        }
        let removed = {
            let mut state = self.0.state.write();
            match self.0.ty.layout.slot_index(name) {
                Some(i) => state.slots[i].take(),
                None => state.dict.as_mut().and_then(|dict| {
                    let pos = dict.iter().position(|(n, _)| n == name)?;
                    Some(dict.remove(pos).1)
                }),
            }
        };
        removed.map(|_| ()).ok_or_else(|| self.no_attribute(name))
    }

    /// Store an attribute without the frozen check. Used by constructors,
    /// which run before the instance is observable.
    pub fn init_attr(&self, name: &str, value: Value) -> Result<(), RecordError> {
        let mut state = self.0.state.write();
        if let Some(i) = self.0.ty.layout.slot_index(name) {
            state.slots[i] = Some(value);
            return Ok(());
        }
        match state.dict.as_mut() {
            Some(dict) => {
                match dict.iter_mut().find(|(n, _)| n == name) {
                    Some(entry) => entry.1 = value,
                    None => dict.push((SmolStr::new(name), value)),
                }
                Ok(())
            }
            None => Err(self.no_attribute(name)),
        }
    }

    /// Every attribute held by the instance itself, fields first in
    /// declaration order.
    pub fn stored_pairs(&self) -> Vec<(SmolStr, Value)> {
        let ty = &self.0.ty;
        let mut pairs: Vec<(SmolStr, Value)> = {
            let state = self.0.state.read();
            ty.layout
                .slots
                .iter()
                .zip(&state.slots)
                .filter_map(|(name, value)| Some((name.clone(), value.clone()?)))
                .chain(state.dict.iter().flatten().cloned())
                .collect()
        };
        pairs.sort_by_key(|(name, _)| ty.fields.iter().position(|f| f.name == *name).unwrap_or(usize::MAX));
        pairs
    }

    pub fn downgrade(&self) -> Result<WeakInstance, RecordError> {
        if !self.0.ty.layout.weakref {
            return Err(RecordError::NotWeakReferenceable {
                record: self.0.ty.name.clone(),
            });
        }
        Ok(WeakInstance(Arc::downgrade(&self.0)))
    }
}

impl std::fmt::Debug for Instance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.repr())
    }
}
