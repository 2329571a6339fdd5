use super::record_type::{ClassAttribute, Layout, RecordType};
use crate::declaration::Declaration;
use crate::error::ConfigError;
use crate::types::*;
use arrayvec::ArrayVec;
use smol_str::SmolStr;

// ─── Layout Synthesis ───────────────────────────────────────────────────────

/// Decide the storage shape of `draft` and rebuild it accordingly.
///
/// Compact storage keeps the type id, swaps class-level defaults of slot
/// fields for slot descriptors, and drops the per-instance dict unless some
/// ancestor still uses one.
pub(crate) fn apply(draft: RecordType, decl: &Declaration) -> Result<RecordType, ConfigError> {
    let options = draft.options;
    let name = draft.name.clone();

    let mut inherited: Vec<SmolStr> = Vec::new();
    for ancestor in draft.ancestors.iter().rev() {
        for slot in &ancestor.layout.slots {
            if !inherited.contains(slot) {
                inherited.push(slot.clone());
            }
        }
    }
    let inherited_weakref = draft.ancestors.iter().any(|a| a.layout.weakref);
    let dynamic_ancestor = draft.ancestors.iter().any(|a| !a.layout.compact);

    let own: Option<Vec<SmolStr>> = match (&decl.slots, options.slots) {
        (Some(_), true) => return Err(ConfigError::SlotsAlreadyDeclared { record: name }),
        (Some(declared), false) => {
            for slot in declared {
                if slot == WEAKREF_SLOT && inherited_weakref {
                    return Err(ConfigError::DuplicateWeakrefSlot { record: name });
                }
                if inherited.contains(slot) {
                    return Err(ConfigError::DuplicateSlot {
                        record: name,
                        slot: slot.clone(),
                    });
                }
            }
            Some(declared.clone())
        }
        (None, true) => {
            let mut generated: Vec<SmolStr> = draft
                .fields()
                .map(|f| f.name.clone())
                .filter(|n| !inherited.contains(n))
                .collect();
            if options.weakref_slot && !inherited_weakref {
                generated.push(SmolStr::new_static(WEAKREF_SLOT));
            }
            Some(generated)
        }
        (None, false) => None,
    };

    let own_data_slots: Vec<&SmolStr> = own.iter().flatten().filter(|s| *s != WEAKREF_SLOT).collect();
    let count = inherited.len() + own_data_slots.len();
    let mut slots: ArrayVec<SmolStr, MAX_SLOTS> = ArrayVec::new();
    for slot in inherited.iter().chain(own_data_slots.iter().copied()) {
        slots
            .try_push(slot.clone())
            .map_err(|_| ConfigError::TooManySlots {
                record: name.clone(),
                count,
            })?;
    }

    let mut class_attrs = draft.class_attrs.clone();
    for slot in &own_data_slots {
        let default = draft.field(slot).and_then(|f| f.default().cloned());
        class_attrs.insert((*slot).clone(), ClassAttribute::Slot { default });
    }

    let layout = match own {
        Some(own_slots) => Layout {
            weakref: inherited_weakref || own_slots.iter().any(|s| s == WEAKREF_SLOT),
            slots,
            own_slots,
            compact: true,
            has_dict: dynamic_ancestor,
        },
        None => Layout {
            slots,
            own_slots: Vec::new(),
            compact: false,
            has_dict: true,
            weakref: true,
        },
    };
    tracing::debug!(
        record = %name,
        compact = layout.compact,
        slots = layout.slots.len(),
        has_dict = layout.has_dict,
        weakref = layout.weakref,
        "resolved layout"
    );

    Ok(RecordType {
        layout,
        class_attrs,
        ..draft
    })
}
