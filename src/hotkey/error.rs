//! Hotkey error types
//!
//! - **`ValidationError`**: the user typed something that is not a hotkey or
//!   left the folder empty. Nothing is registered or saved.
//! - **`BindError`**: the hotkey system refused the combo, or the combo is
//!   active but the mapping file could not be written.

use crate::storage::StoreError;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("hotkey is empty")]
    EmptyKey,

    #[error("folder path is empty")]
    EmptyPath,

    #[error("hotkey '{0}' has an empty part")]
    EmptyToken(String),

    #[error("hotkey '{0}' names more than one key")]
    MultipleKeys(String),

    #[error("hotkey '{0}' has no key besides modifiers")]
    MissingKey(String),
}

#[derive(Debug, Error)]
pub enum BindError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error("'{0}' is not a key the hotkey system understands")]
    UnsupportedKey(String),

    #[error("hotkey '{key}' was rejected: {reason}")]
    Rejected { key: String, reason: String },

    /// The hotkey is live but the mapping file was not updated
    #[error("hotkey is active but could not be saved: {0}")]
    NotSaved(#[source] StoreError),
}

impl BindError {
    /// True when the hotkey ended up registered despite the error
    pub fn is_bound(&self) -> bool {
        matches!(self, Self::NotSaved(_))
    }
}
