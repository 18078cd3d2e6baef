//! Sans-IO relay core for huddle.
//!
//! The relay lets any number of clients share a session ("room") behind a
//! short human-shareable code, with exactly one member per room authorized
//! to publish the session's state. The core is a transport- and
//! identity-layer coordinator: it assigns connections to rooms, enforces
//! who may publish, fans published state out to everyone else, relays
//! point-to-point actions to the current host, and reclaims rooms when
//! they empty. The session payload itself is opaque end to end.
//!
//! # Architecture
//!
//! ```text
//! RelayDriver (events in, actions out)
//!   ├─ BindingTable   (connection ↔ identity ↔ room)
//!   ├─ RoomDirectory  (room code → Room, uniqueness, reclamation)
//!   │   └─ Room       (host, members, state blob)
//!   └─ Environment    (randomness seam)
//! ```
//!
//! # Event/Action Pattern
//!
//! The core performs no I/O. The runtime feeds it [`RelayEvent`]s and
//! executes the [`RelayAction`]s it returns; broadcast recipients are
//! resolved inside the driver so the action stream reflects the membership
//! at the moment each operation was accepted.

pub mod code;
pub mod directory;
pub mod env;
pub mod identity;
pub mod registry;
pub mod relay;
pub mod room;

pub use directory::{DirectoryError, MAX_CODE_ATTEMPTS, RoomDirectory};
pub use env::Environment;
pub use identity::ConnId;
pub use registry::{Binding, BindingTable};
pub use relay::{RelayAction, RelayConfig, RelayDriver, RelayEvent};
pub use room::{Member, PublishOutcome, Room};
