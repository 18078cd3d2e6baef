//! Room directory: code-keyed room storage with uniqueness and
//! reclamation.
//!
//! The directory is the only component allowed to create or destroy
//! [`Room`]s. It guarantees that no two live rooms share a code and that a
//! destroyed room's code immediately returns to the usable pool.

use std::collections::HashMap;

use huddle_proto::{ParticipantId, RoomCode, StateBlob};

use crate::{code, env::Environment, room::Room};

/// Defensive upper bound on code-generation retries.
///
/// With a 32^6 code space the retry loop terminates on the first or second
/// draw for any realistic room count; hitting the bound means the entropy
/// source is misbehaving, which is an operational fault rather than a
/// normal failure.
pub const MAX_CODE_ATTEMPTS: usize = 256;

/// Errors from directory operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DirectoryError {
    /// The code-generation retry loop exceeded its defensive bound.
    #[error("room code generation exhausted after {attempts} attempts")]
    CodesExhausted {
        /// How many draws were made before giving up.
        attempts: usize,
    },
}

/// Mapping from room code to live room.
///
/// # Invariants
///
/// - Every key refers to a live, non-destroyed room.
/// - No two live rooms share a code.
/// - Empty rooms are garbage; [`sweep_empty`] reclaims them after every
///   membership-decreasing event (there is no background scheduler).
///
/// [`sweep_empty`]: RoomDirectory::sweep_empty
#[derive(Debug, Default)]
pub struct RoomDirectory {
    rooms: HashMap<RoomCode, Room>,
}

impl RoomDirectory {
    /// Create an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a room under a freshly generated unique code.
    ///
    /// Draws codes until one is absent from the directory, up to
    /// [`MAX_CODE_ATTEMPTS`].
    ///
    /// # Errors
    ///
    /// `DirectoryError::CodesExhausted` if no unused code was found within
    /// the bound. Callers should treat this as an operational fault, not a
    /// per-request condition.
    pub fn create_room<E: Environment>(
        &mut self,
        env: &E,
        host: ParticipantId,
        host_name: impl Into<String>,
        initial_state: StateBlob,
    ) -> Result<RoomCode, DirectoryError> {
        for _ in 0..MAX_CODE_ATTEMPTS {
            let code = code::generate(env);
            if self.rooms.contains_key(&code) {
                continue;
            }
            self.rooms.insert(code, Room::new(host, host_name, initial_state));
            tracing::info!(%code, %host, "room created");
            return Ok(code);
        }
        Err(DirectoryError::CodesExhausted { attempts: MAX_CODE_ATTEMPTS })
    }

    /// Look up a room by code.
    pub fn get(&self, code: RoomCode) -> Option<&Room> {
        self.rooms.get(&code)
    }

    /// Look up a room by code, mutably.
    pub fn get_mut(&mut self, code: RoomCode) -> Option<&mut Room> {
        self.rooms.get_mut(&code)
    }

    /// Whether a room exists under this code.
    pub fn contains(&self, code: RoomCode) -> bool {
        self.rooms.contains_key(&code)
    }

    /// Destroy a room, releasing its code.
    ///
    /// Returns whether a room was actually removed.
    pub fn remove(&mut self, code: RoomCode) -> bool {
        let removed = self.rooms.remove(&code).is_some();
        if removed {
            tracing::info!(%code, "room destroyed");
        }
        removed
    }

    /// Reclaim every empty room, returning the released codes.
    pub fn sweep_empty(&mut self) -> Vec<RoomCode> {
        let swept: Vec<RoomCode> =
            self.rooms.iter().filter(|(_, room)| room.is_empty()).map(|(code, _)| *code).collect();
        for code in &swept {
            self.rooms.remove(code);
            tracing::debug!(code = %code, "swept empty room");
        }
        swept
    }

    /// Number of live rooms.
    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    /// Whether no rooms are live.
    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }
}
