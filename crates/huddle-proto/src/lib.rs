//! Wire message catalogue for the huddle relay protocol.
//!
//! Messages are JSON objects tagged by a `type` field, one object per
//! WebSocket text frame. The relay core never inspects the session payload
//! it carries; [`StateBlob`] exists to make that opacity structural.
//!
//! This crate is transport-agnostic and has no I/O: it defines the shapes
//! that `huddle-core` routes and `huddle-server` puts on the wire.

mod ident;
mod messages;
mod state;

pub use ident::{CodeParseError, IdentityParseError, ParticipantId, RoomCode};
pub use messages::{ClientMessage, ServerMessage};
pub use state::StateBlob;
