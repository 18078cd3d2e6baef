//! The logical message catalogue.
//!
//! Each message is a JSON object with a `type` tag in kebab-case. Replies
//! and pushes share one server-side enum: a requester cannot tell a direct
//! reply from a broadcast, and does not need to.
//!
//! Inbound room codes are plain strings, not [`RoomCode`], so that a
//! mistyped code parses as a message and fails room lookup rather than
//! failing deserialization.

use serde::{Deserialize, Serialize};

use crate::{ParticipantId, RoomCode, StateBlob};

/// Messages a client sends to the relay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ClientMessage {
    /// Open a new room, becoming its host.
    CreateRoom {
        /// Name shown to other members.
        display_name: String,
    },

    /// Join an existing room by code.
    JoinRoom {
        /// The code to look up. Unvalidated on purpose; see module docs.
        room_code: String,
        /// Name shown to other members.
        display_name: String,
    },

    /// Publish a replacement state blob. Host only; silently dropped for
    /// anyone else.
    PublishState {
        /// The new authoritative state.
        state: StateBlob,
    },

    /// Relay an action to the room's current host.
    HostAction {
        /// Application-defined action kind.
        kind: String,
        /// Application-defined arguments, forwarded verbatim.
        #[serde(default)]
        args: serde_json::Value,
    },

    /// Leave the current room.
    LeaveRoom,
}

/// Messages the relay sends to a client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ServerMessage {
    /// Reply to `create-room`: the room exists and the requester hosts it.
    RoomCreated {
        /// The freshly allocated code.
        room_code: RoomCode,
    },

    /// Reply to `join-room`: the requester is now a member.
    RoomJoined {
        /// The code of the joined room.
        room_code: RoomCode,
    },

    /// The host published a new state blob.
    StateUpdate {
        /// The full replacement state.
        state: StateBlob,
    },

    /// Another participant joined the room.
    MemberJoined {
        /// The joiner's identity token.
        identity: ParticipantId,
        /// The joiner's display name.
        display_name: String,
    },

    /// A participant left the room or disconnected.
    MemberLeft {
        /// The departed identity token.
        identity: ParticipantId,
    },

    /// An action relayed from a member; delivered to the host only.
    HostAction {
        /// Application-defined action kind.
        kind: String,
        /// Application-defined arguments, forwarded verbatim.
        args: serde_json::Value,
        /// The member who sent the action.
        from: ParticipantId,
    },

    /// The host departed and the room was destroyed.
    RoomClosed,

    /// A request could not be satisfied.
    RequestFailed {
        /// Human-readable reason.
        reason: String,
    },
}
