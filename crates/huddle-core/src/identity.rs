//! Transport-assigned connection handles.

use std::fmt;

/// Handle for one live transport connection.
///
/// Assigned by the runtime when a connection is accepted and never reused
/// for the lifetime of the process. The core only ever compares and maps
/// these; it attaches no meaning to the value.
///
/// Distinct from [`huddle_proto::ParticipantId`]: a connection exists
/// before it registers into a room, and its handle never crosses the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnId(u64);

impl ConnId {
    /// Wrap a raw runtime-assigned handle.
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }
}

impl From<u64> for ConnId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for ConnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}
