use crate::error::ConfigError;
use serde::Deserialize;

/// Which behaviors to synthesize for a record type.
///
/// Every option is independently defaultable, so an option set can also be
/// read from configuration:
///
/// ```ignore
/// let options: RecordOptions = serde_json::from_str(r#"{"frozen": true}"#)?;
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RecordOptions {
    /// Generate the constructor.
    pub init: bool,
    /// Generate the textual representation.
    pub repr: bool,
    /// Generate field-wise equality.
    pub eq: bool,
    /// Generate lt/le/gt/ge. Requires `eq`.
    pub order: bool,
    /// Generate a hash even though instances are mutable.
    pub unsafe_hash: bool,
    /// Reject attribute assignment and deletion after construction.
    pub frozen: bool,
    /// Publish the positional field names for destructuring callers.
    pub match_args: bool,
    /// Make every field keyword-only.
    pub kw_only: bool,
    /// Use compact fixed-slot storage.
    pub slots: bool,
    /// Add a weak-reference slot to the compact layout.
    pub weakref_slot: bool,
}

impl Default for RecordOptions {
    fn default() -> Self {
        Self {
            init: true,
            repr: true,
            eq: true,
            order: false,
            unsafe_hash: false,
            frozen: false,
            match_args: true,
            kw_only: false,
            slots: false,
            weakref_slot: false,
        }
    }
}

impl RecordOptions {
    /// Reject option combinations that contradict each other.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.order && !self.eq {
            return Err(ConfigError::OrderWithoutEq);
        }
        if self.weakref_slot && !self.slots {
            return Err(ConfigError::WeakrefWithoutSlots);
        }
        Ok(())
    }

    pub fn frozen() -> Self {
        Self {
            frozen: true,
            ..Self::default()
        }
    }

    pub fn ordered() -> Self {
        Self {
            order: true,
            ..Self::default()
        }
    }

    pub fn slotted() -> Self {
        Self {
            slots: true,
            ..Self::default()
        }
    }
}
