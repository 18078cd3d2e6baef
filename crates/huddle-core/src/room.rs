//! One session's room: host, members, and the authoritative state blob.
//!
//! Authority is enforced here rather than trusted to callers: a publish
//! from anyone but the host cannot mutate the stored state no matter what
//! the dispatcher does. [`PublishOutcome`] makes the rejection observable
//! to callers and tests even though nothing is surfaced on the wire.

use huddle_proto::{ParticipantId, StateBlob};

/// One member of a room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    /// The member's identity token.
    pub identity: ParticipantId,
    /// The member's display name, fixed at registration.
    pub display_name: String,
}

/// Result of a state publish attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishOutcome {
    /// The requester is the host; the stored state was replaced.
    Accepted,
    /// The requester is not the host; the stored state is untouched.
    RejectedNotHost,
}

impl PublishOutcome {
    /// Whether the publish replaced the stored state.
    pub fn is_accepted(self) -> bool {
        matches!(self, Self::Accepted)
    }
}

/// A live session room.
///
/// # Invariants
///
/// - Exactly one host, fixed at creation, always present in the member
///   list as its first entry. When the host departs the room must be
///   destroyed by its owner (the directory/driver); a `Room` never
///   re-designates a host.
/// - Members are kept in join order.
/// - The state blob only changes through [`publish_state`], and only for
///   the host.
///
/// [`publish_state`]: Room::publish_state
#[derive(Debug, Clone)]
pub struct Room {
    host: ParticipantId,
    members: Vec<Member>,
    state: StateBlob,
}

impl Room {
    /// Create a room with its host as the sole member.
    ///
    /// The initial state blob is application-supplied; the relay never
    /// looks inside it.
    pub fn new(
        host: ParticipantId,
        host_name: impl Into<String>,
        initial_state: StateBlob,
    ) -> Self {
        Self {
            host,
            members: vec![Member { identity: host, display_name: host_name.into() }],
            state: initial_state,
        }
    }

    /// The host's identity.
    pub fn host(&self) -> ParticipantId {
        self.host
    }

    /// Whether an identity is this room's host.
    pub fn is_host(&self, identity: ParticipantId) -> bool {
        self.host == identity
    }

    /// Members in join order, host first.
    pub fn members(&self) -> &[Member] {
        &self.members
    }

    /// Whether an identity is currently a member.
    pub fn contains(&self, identity: ParticipantId) -> bool {
        self.members.iter().any(|m| m.identity == identity)
    }

    /// Number of current members.
    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    /// Whether the room has no members left and is ready for reclamation.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Append a member in join order.
    ///
    /// Idempotent: adding an identity that is already a member changes
    /// nothing, including its recorded display name.
    pub fn add_member(&mut self, identity: ParticipantId, display_name: impl Into<String>) {
        if self.contains(identity) {
            return;
        }
        self.members.push(Member { identity, display_name: display_name.into() });
    }

    /// Remove a member; no-op if absent.
    ///
    /// Removing the host is allowed at this level; the caller is expected
    /// to destroy the room afterwards (see the type invariants).
    pub fn remove_member(&mut self, identity: ParticipantId) {
        self.members.retain(|m| m.identity != identity);
    }

    /// Replace the stored state blob, host only.
    ///
    /// On acceptance the previous value is discarded whole; publishes are
    /// last-writer-wins at full-state granularity. On rejection the
    /// request has no effect of any kind.
    pub fn publish_state(
        &mut self,
        requester: ParticipantId,
        new_state: StateBlob,
    ) -> PublishOutcome {
        if requester != self.host {
            return PublishOutcome::RejectedNotHost;
        }
        self.state = new_state;
        PublishOutcome::Accepted
    }

    /// The last state the host published (or the initial blob).
    pub fn state(&self) -> &StateBlob {
        &self.state
    }
}
