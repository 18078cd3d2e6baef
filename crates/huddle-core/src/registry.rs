//! Binding table for connection, identity, and room association.
//!
//! The table maintains bidirectional mappings between a live connection
//! and its logical participant identity, and from that identity to the
//! room it currently belongs to:
//! - `connection → (identity, room)`: inbound message routing
//! - `identity → connection`: host unicast lookup for forwarded actions
//!
//! # Design
//!
//! - The room code lives inside the forward entry, so the three logical
//!   mappings are stored as two coupled maps and cannot drift apart.
//! - Re-binding a connection is an idempotent overwrite, never an error:
//!   duplicate registration messages must not wedge the relay.
//! - Unbinding an unknown connection is a no-op; double-disconnect is
//!   expected under network churn.

use std::collections::HashMap;

use huddle_proto::{ParticipantId, RoomCode};

use crate::identity::ConnId;

/// What a connection is currently bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Binding {
    /// The participant identity minted for this connection.
    pub identity: ParticipantId,
    /// The room the identity belongs to.
    pub room_code: RoomCode,
}

/// Registry of live connection bindings.
///
/// Purely in-memory bookkeeping; all mutation goes through [`bind`] and
/// [`unbind`] so the forward and reverse maps stay consistent.
///
/// [`bind`]: BindingTable::bind
/// [`unbind`]: BindingTable::unbind
#[derive(Debug, Default)]
pub struct BindingTable {
    /// Connection → its binding.
    by_conn: HashMap<ConnId, Binding>,
    /// Identity → the connection it lives on.
    by_identity: HashMap<ParticipantId, ConnId>,
}

impl BindingTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a connection to an identity and room.
    ///
    /// Overwrites any prior binding for the connection; the displaced
    /// identity's reverse entry is dropped so it cannot be looked up
    /// again. Duplicate registration is a protocol violation on the
    /// client's side, but the table absorbs it rather than rejecting.
    pub fn bind(&mut self, conn: ConnId, identity: ParticipantId, room_code: RoomCode) {
        if let Some(previous) = self.by_conn.insert(conn, Binding { identity, room_code }) {
            tracing::debug!(%conn, displaced = %previous.identity, "re-bound connection");
            self.by_identity.remove(&previous.identity);
        }
        self.by_identity.insert(identity, conn);
    }

    /// Remove a connection's binding, returning what was removed.
    ///
    /// `None` for a connection with no binding; safe to call repeatedly.
    pub fn unbind(&mut self, conn: ConnId) -> Option<Binding> {
        let binding = self.by_conn.remove(&conn)?;
        self.by_identity.remove(&binding.identity);
        Some(binding)
    }

    /// The binding for a connection, if any.
    pub fn binding(&self, conn: ConnId) -> Option<Binding> {
        self.by_conn.get(&conn).copied()
    }

    /// The identity bound to a connection, if any.
    pub fn identity_of(&self, conn: ConnId) -> Option<ParticipantId> {
        self.by_conn.get(&conn).map(|b| b.identity)
    }

    /// The room an identity currently belongs to, if any.
    pub fn room_of(&self, identity: ParticipantId) -> Option<RoomCode> {
        let conn = self.by_identity.get(&identity)?;
        self.by_conn.get(conn).map(|b| b.room_code)
    }

    /// The connection an identity lives on, if any.
    pub fn conn_of(&self, identity: ParticipantId) -> Option<ConnId> {
        self.by_identity.get(&identity).copied()
    }

    /// Number of live bindings.
    pub fn len(&self) -> usize {
        self.by_conn.len()
    }

    /// Whether no connections are bound.
    pub fn is_empty(&self) -> bool {
        self.by_conn.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code(s: &str) -> RoomCode {
        s.parse().unwrap()
    }

    #[test]
    fn bind_and_lookup_both_directions() {
        let mut table = BindingTable::new();
        let identity = ParticipantId::from(0xa1);

        table.bind(ConnId::new(1), identity, code("AB23KQ"));

        assert_eq!(table.identity_of(ConnId::new(1)), Some(identity));
        assert_eq!(table.room_of(identity), Some(code("AB23KQ")));
        assert_eq!(table.conn_of(identity), Some(ConnId::new(1)));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn rebind_overwrites_and_drops_displaced_identity() {
        let mut table = BindingTable::new();
        let first = ParticipantId::from(0xa1);
        let second = ParticipantId::from(0xb2);

        table.bind(ConnId::new(1), first, code("AB23KQ"));
        table.bind(ConnId::new(1), second, code("XYZ234"));

        assert_eq!(table.identity_of(ConnId::new(1)), Some(second));
        assert_eq!(table.room_of(second), Some(code("XYZ234")));
        assert_eq!(table.conn_of(first), None);
        assert_eq!(table.room_of(first), None);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn unbind_returns_the_removed_binding() {
        let mut table = BindingTable::new();
        let identity = ParticipantId::from(0xa1);
        table.bind(ConnId::new(1), identity, code("AB23KQ"));

        let removed = table.unbind(ConnId::new(1)).unwrap();
        assert_eq!(removed.identity, identity);
        assert_eq!(removed.room_code, code("AB23KQ"));

        assert_eq!(table.identity_of(ConnId::new(1)), None);
        assert_eq!(table.conn_of(identity), None);
        assert!(table.is_empty());
    }

    #[test]
    fn unbind_unknown_connection_is_a_noop() {
        let mut table = BindingTable::new();
        assert_eq!(table.unbind(ConnId::new(99)), None);

        table.bind(ConnId::new(1), ParticipantId::from(0xa1), code("AB23KQ"));
        assert!(table.unbind(ConnId::new(1)).is_some());
        assert_eq!(table.unbind(ConnId::new(1)), None);
    }

    #[test]
    fn independent_connections_do_not_interfere() {
        let mut table = BindingTable::new();
        let alice = ParticipantId::from(0xa1);
        let bob = ParticipantId::from(0xb2);

        table.bind(ConnId::new(1), alice, code("AB23KQ"));
        table.bind(ConnId::new(2), bob, code("AB23KQ"));

        table.unbind(ConnId::new(1));

        assert_eq!(table.room_of(bob), Some(code("AB23KQ")));
        assert_eq!(table.conn_of(bob), Some(ConnId::new(2)));
        assert_eq!(table.len(), 1);
    }
}
