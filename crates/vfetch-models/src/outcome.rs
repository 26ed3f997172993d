//! Per-entry acquisition outcomes.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Message recorded when an output already existed.
pub const MESSAGE_IGNORED: &str = "ignored";

/// Message recorded when an entry completed.
pub const MESSAGE_OK: &str = "OK";

/// Result of processing one video entry.
///
/// Serialized as a 3-element array `[id, success, message]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcquisitionOutcome {
    pub id: String,
    pub success: bool,
    pub message: String,
}

impl AcquisitionOutcome {
    /// Output already present on disk; nothing was fetched.
    pub fn ignored(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            success: true,
            message: MESSAGE_IGNORED.to_string(),
        }
    }

    /// All outputs of the entry are in place.
    pub fn ok(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            success: true,
            message: MESSAGE_OK.to_string(),
        }
    }

    /// The entry failed; `message` carries the phase prefix.
    pub fn failed(id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            success: false,
            message: message.into(),
        }
    }

    pub fn is_ignored(&self) -> bool {
        self.success && self.message == MESSAGE_IGNORED
    }
}

impl Serialize for AcquisitionOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        (&self.id, self.success, &self.message).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for AcquisitionOutcome {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let (id, success, message) = <(String, bool, String)>::deserialize(deserializer)?;
        Ok(Self {
            id,
            success,
            message,
        })
    }
}
