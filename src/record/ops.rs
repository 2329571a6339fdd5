use super::instance::Instance;
use super::methods::{HashMethod, Method};
use super::record_type::RecordType;
use crate::error::RecordError;
use crate::field::Field;
use crate::repr::RecursionGuard;
use crate::types::*;
use crate::value::{Value, compare_seq, hash_bytes, hash_sequence, seq_equals};
use std::fmt::Write;
use std::sync::Arc;

// ─── Synthesized Behaviors ──────────────────────────────────────────────────
// Generated methods read the field list of the type that generated them,
// not the runtime type's. A subclass that inherits `eq` from its base
// compares by the base's fields.

impl Instance {
    fn values_where(&self, owner: &RecordType, include: impl Fn(&Field) -> bool) -> Result<Vec<Value>, RecordError> {
        owner
            .fields()
            .filter(|f| include(*f))
            .map(|f| self.get(&f.name))
            .collect()
    }

    /// Same runtime type: the precondition of every generated comparison.
    #[inline]
    fn same_type(&self, other: &Instance) -> bool {
        Arc::ptr_eq(self.record_type(), other.record_type())
    }

    // ── Representation ──────────────────────────────────────────────────────

    pub fn repr(&self) -> String {
        let mut guard = RecursionGuard::new();
        let mut out = String::new();
        self.render(&mut guard, &mut out);
        out
    }

    /// Render into `out`. An instance already being rendered further up the
    /// same path prints as `...`.
    pub fn render(&self, guard: &mut RecursionGuard, out: &mut String) {
        let ty = self.record_type();
        match ty.resolve(|t| t.methods.repr.clone()) {
            Some((_, Method::User(hook))) => out.push_str(&hook(self)),
            Some((owner, Method::Generated)) => {
                let id = self.identity();
                if !guard.enter(id) {
                    out.push_str("...");
                    return;
                }
                out.push_str(&ty.name);
                out.push('(');
                let mut first = true;
                for field in owner.fields().filter(|f| f.repr) {
                    // Deleted attributes are skipped.
                    let Ok(value) = self.get(&field.name) else {
                        continue;
                    };
                    if !first {
                        out.push_str(", ");
                    }
                    first = false;
                    out.push_str(&field.name);
                    out.push('=');
                    value.render(guard, out);
                }
                out.push(')');
                guard.leave(id);
            }
            None => {
                let _ = write!(out, "<{} object at {:#x}>", ty.name, self.identity());
            }
        }
    }

    // ── Equality ────────────────────────────────────────────────────────────

    /// This side's verdict on `self == other`; `None` if it cannot decide.
    pub fn eq_value(&self, other: &Value) -> Option<bool> {
        match self.record_type().resolve(|t| t.methods.eq.clone())? {
            (_, Method::User(hook)) => hook(self, other),
            (owner, Method::Generated) => {
                let other = other.as_instance()?;
                if !self.same_type(other) {
                    return None;
                }
                if self.ptr_eq(other) {
                    return Some(true);
                }
                let mine = self.values_where(owner, Field::compare).ok()?;
                let theirs = other.values_where(owner, Field::compare).ok()?;
                Some(seq_equals(&mine, &theirs))
            }
        }
    }

    /// Equality with the reflected fallback, then identity.
    pub fn equals(&self, other: &Value) -> bool {
        if let Some(verdict) = self.eq_value(other) {
            return verdict;
        }
        match other {
            Value::Record(inst) if inst.ptr_eq(self) => true,
            Value::Record(inst) => inst.eq_value(&Value::Record(self.clone())).unwrap_or(false),
            _ => false,
        }
    }

    // ── Ordering ────────────────────────────────────────────────────────────

    fn compare_direct(&self, other: &Value) -> Comparison {
        match self.record_type().resolve(|t| t.methods.order.clone()) {
            Some((_, Method::User(hook))) => hook(self, other),
            Some((owner, Method::Generated)) => {
                let Some(other) = other.as_instance() else {
                    return Comparison::Incomparable;
                };
                if !self.same_type(other) {
                    return Comparison::Incomparable;
                }
                match (
                    self.values_where(owner, Field::compare),
                    other.values_where(owner, Field::compare),
                ) {
                    (Ok(mine), Ok(theirs)) => compare_seq(&mine, &theirs),
                    _ => Comparison::Incomparable,
                }
            }
            None => Comparison::Incomparable,
        }
    }

    /// Ordering with the reflected fallback.
    pub fn compare(&self, other: &Value) -> Comparison {
        match self.compare_direct(other) {
            Comparison::Incomparable => match other {
                Value::Record(inst) if !inst.ptr_eq(self) => {
                    inst.compare_direct(&Value::Record(self.clone())).reverse()
                }
                _ => Comparison::Incomparable,
            },
            decided => decided,
        }
    }

    fn ordered(
        &self,
        other: &Value,
        op: &'static str,
        accept: impl Fn(Comparison) -> bool,
    ) -> Result<bool, RecordError> {
        match self.compare(other) {
            Comparison::Incomparable => Err(RecordError::Unorderable {
                op,
                left: self.record_type().name.clone(),
                right: other.type_name(),
            }),
            decided => Ok(accept(decided)),
        }
    }

    pub fn lt(&self, other: &Value) -> Result<bool, RecordError> {
        self.ordered(other, "<", |c| c == Comparison::Less)
    }

    pub fn le(&self, other: &Value) -> Result<bool, RecordError> {
        self.ordered(other, "<=", |c| matches!(c, Comparison::Less | Comparison::Equal))
    }

    pub fn gt(&self, other: &Value) -> Result<bool, RecordError> {
        self.ordered(other, ">", |c| c == Comparison::Greater)
    }

    pub fn ge(&self, other: &Value) -> Result<bool, RecordError> {
        self.ordered(other, ">=", |c| matches!(c, Comparison::Greater | Comparison::Equal))
    }

    // ── Hashing ─────────────────────────────────────────────────────────────

    pub fn hash(&self) -> Result<u64, RecordError> {
        match self.record_type().resolve(|t| t.methods.hash.clone()) {
            Some((_, HashMethod::User(hook))) => hook(self),
            Some((owner, HashMethod::Generated)) => {
                let values = self.values_where(owner, Field::hash_included)?;
                Ok(hash_bytes(TAG_RECORD, &hash_sequence(&values)?.to_le_bytes()))
            }
            Some((_, HashMethod::Disabled)) => Err(RecordError::Unhashable {
                type_name: self.record_type().name.clone(),
            }),
            None => Ok(hash_bytes(TAG_IDENTITY, &(self.identity() as u64).to_le_bytes())),
        }
    }
}
