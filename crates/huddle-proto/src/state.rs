//! The opaque session state blob.

use serde::{Deserialize, Serialize};

/// The authoritative session state published by a room's host.
///
/// The relay treats this as one indivisible unit: it is stored, replaced
/// whole on each publish, and fanned out verbatim. Nothing in the server
/// ever reads its fields, so any JSON shape the application chooses works.
///
/// `StateBlob::default()` is JSON `null`, the pre-first-publish value a
/// joiner receives when the host has not published yet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateBlob(serde_json::Value);

impl StateBlob {
    /// Wrap an application payload.
    pub fn new(value: serde_json::Value) -> Self {
        Self(value)
    }

    /// Unwrap back into the raw payload.
    pub fn into_inner(self) -> serde_json::Value {
        self.0
    }
}

impl From<serde_json::Value> for StateBlob {
    fn from(value: serde_json::Value) -> Self {
        Self(value)
    }
}
