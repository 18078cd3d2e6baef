//! Relay driver: the sans-IO dispatcher binding connection events to
//! rooms, bindings, and fan-out.
//!
//! # Event Flow
//!
//! 1. The runtime produces [`RelayEvent`]s (message received, connection
//!    closed)
//! 2. [`RelayDriver::process_event`] mutates core state and returns
//!    [`RelayAction`]s
//! 3. The runtime executes the actions (unicast/broadcast sends)
//!
//! # Failure discipline
//!
//! `process_event` never fails. Every lookup miss degrades to a silent
//! no-op or a single `request-failed` reply to the requester; nothing a
//! client sends can mutate shared state through a failed precondition or
//! escape the dispatcher as an error.

use huddle_proto::{ClientMessage, ParticipantId, RoomCode, ServerMessage, StateBlob};

use crate::{
    directory::RoomDirectory, env::Environment, identity::ConnId, registry::BindingTable,
    room::Room,
};

/// Driver configuration.
#[derive(Debug, Clone, Default)]
pub struct RelayConfig {
    /// State blob given to every new room before its host first
    /// publishes. Supplied by the application; opaque to the relay.
    pub initial_state: StateBlob,
}

/// Events the relay driver processes.
///
/// Produced by the transport runtime.
#[derive(Debug, Clone, PartialEq)]
pub enum RelayEvent {
    /// A message arrived from a connection.
    MessageReceived {
        /// The sending connection.
        conn: ConnId,
        /// The decoded message.
        message: ClientMessage,
    },

    /// A connection dropped (transport-level disconnect).
    ConnectionClosed {
        /// The closed connection.
        conn: ConnId,
    },
}

/// Actions the relay driver produces.
///
/// Executed by the transport runtime. Broadcast recipients are resolved
/// inside the driver at the moment the operation is accepted, so the
/// action stream is a faithful, ordered record of what each member should
/// receive; the executor needs no further lookups.
#[derive(Debug, Clone, PartialEq)]
pub enum RelayAction {
    /// Send a message to one connection.
    Send {
        /// Target connection.
        conn: ConnId,
        /// Message to deliver.
        message: ServerMessage,
    },

    /// Send the same message to several connections, best-effort.
    ///
    /// A failed delivery to one recipient must not stop delivery to the
    /// rest.
    Broadcast {
        /// Target connections.
        recipients: Vec<ConnId>,
        /// Message to deliver.
        message: ServerMessage,
    },
}

/// Sans-IO relay driver.
///
/// Owns the room directory and binding table outright; all mutation is
/// linearized through [`process_event`], which is what makes per-room
/// operations safe when the runtime serializes events through a single
/// owner.
///
/// [`process_event`]: RelayDriver::process_event
pub struct RelayDriver<E: Environment> {
    env: E,
    config: RelayConfig,
    directory: RoomDirectory,
    bindings: BindingTable,
}

impl<E: Environment> RelayDriver<E> {
    /// Create a driver with no rooms or bindings.
    pub fn new(env: E, config: RelayConfig) -> Self {
        Self { env, config, directory: RoomDirectory::new(), bindings: BindingTable::new() }
    }

    /// Process one event and return the sends it produced.
    pub fn process_event(&mut self, event: RelayEvent) -> Vec<RelayAction> {
        match event {
            RelayEvent::MessageReceived { conn, message } => self.handle_message(conn, message),
            RelayEvent::ConnectionClosed { conn } => self.detach(conn),
        }
    }

    fn handle_message(&mut self, conn: ConnId, message: ClientMessage) -> Vec<RelayAction> {
        match message {
            ClientMessage::CreateRoom { display_name } => self.handle_create(conn, display_name),
            ClientMessage::JoinRoom { room_code, display_name } => {
                self.handle_join(conn, &room_code, display_name)
            },
            ClientMessage::PublishState { state } => self.handle_publish(conn, state),
            ClientMessage::HostAction { kind, args } => self.handle_host_action(conn, kind, args),
            ClientMessage::LeaveRoom => self.detach(conn),
        }
    }

    /// `create-room`: mint an identity, allocate a room, bind, reply with
    /// the code.
    fn handle_create(&mut self, conn: ConnId, display_name: String) -> Vec<RelayAction> {
        // A bound connection that creates again implicitly leaves first;
        // duplicate registrations overwrite rather than error.
        let mut actions = self.detach(conn);

        let identity = self.mint_identity();
        match self.directory.create_room(
            &self.env,
            identity,
            display_name,
            self.config.initial_state.clone(),
        ) {
            Ok(room_code) => {
                self.bindings.bind(conn, identity, room_code);
                actions.push(RelayAction::Send {
                    conn,
                    message: ServerMessage::RoomCreated { room_code },
                });
            },
            Err(error) => {
                // The one hard operational fault in the core; alert loudly
                // but keep the dispatcher alive.
                tracing::error!(%error, "room code allocation failed");
                actions.push(RelayAction::Send {
                    conn,
                    message: ServerMessage::RequestFailed {
                        reason: "could not allocate a room code".to_string(),
                    },
                });
            },
        }
        actions
    }

    /// `join-room`: add a member, bind, reply, announce, and sync state.
    fn handle_join(
        &mut self,
        conn: ConnId,
        room_code: &str,
        display_name: String,
    ) -> Vec<RelayAction> {
        let not_found = |conn| RelayAction::Send {
            conn,
            message: ServerMessage::RequestFailed { reason: "room not found".to_string() },
        };

        // Unparseable codes fail the same way as absent ones.
        let Ok(code) = room_code.parse::<RoomCode>() else {
            tracing::debug!(%conn, room_code, "join with malformed code");
            return vec![not_found(conn)];
        };
        // Precondition check before any mutation: a failed join must not
        // detach the sender from its current room.
        if !self.directory.contains(code) {
            return vec![not_found(conn)];
        }

        let mut actions = self.detach(conn);

        let identity = self.mint_identity();
        // Re-fetch: if the sender was this room's host or last member,
        // the detach above just destroyed it.
        let Some(room) = self.directory.get_mut(code) else {
            actions.push(not_found(conn));
            return actions;
        };
        room.add_member(identity, display_name.clone());
        self.bindings.bind(conn, identity, code);

        tracing::info!(%code, %identity, "member joined");

        let others = Self::member_conns(&self.bindings, room, Some(identity));
        let state = room.state().clone();

        actions.push(RelayAction::Send {
            conn,
            message: ServerMessage::RoomJoined { room_code: code },
        });
        if !others.is_empty() {
            actions.push(RelayAction::Broadcast {
                recipients: others,
                message: ServerMessage::MemberJoined { identity, display_name },
            });
        }
        actions.push(RelayAction::Send { conn, message: ServerMessage::StateUpdate { state } });
        actions
    }

    /// `publish-state`: host-only replacement of the room state, fanned
    /// out to everyone else.
    fn handle_publish(&mut self, conn: ConnId, state: StateBlob) -> Vec<RelayAction> {
        let Some(binding) = self.bindings.binding(conn) else {
            tracing::debug!(%conn, "publish from unbound connection dropped");
            return Vec::new();
        };
        let Some(room) = self.directory.get_mut(binding.room_code) else {
            tracing::warn!(%conn, code = %binding.room_code, "publish against vanished room");
            return Vec::new();
        };

        if !room.publish_state(binding.identity, state.clone()).is_accepted() {
            // Authority violation: silently dropped on the wire.
            tracing::debug!(%conn, identity = %binding.identity, "non-host publish rejected");
            return Vec::new();
        }

        let others = Self::member_conns(&self.bindings, room, Some(binding.identity));
        if others.is_empty() {
            return Vec::new();
        }
        vec![RelayAction::Broadcast {
            recipients: others,
            message: ServerMessage::StateUpdate { state },
        }]
    }

    /// `host-action`: unicast to the current host's connection, verbatim.
    fn handle_host_action(
        &mut self,
        conn: ConnId,
        kind: String,
        args: serde_json::Value,
    ) -> Vec<RelayAction> {
        let Some(binding) = self.bindings.binding(conn) else {
            tracing::debug!(%conn, "host action from unbound connection dropped");
            return Vec::new();
        };
        let Some(room) = self.directory.get(binding.room_code) else {
            tracing::warn!(%conn, code = %binding.room_code, "host action against vanished room");
            return Vec::new();
        };
        let Some(host_conn) = self.bindings.conn_of(room.host()) else {
            tracing::debug!(code = %binding.room_code, "host connection gone, action dropped");
            return Vec::new();
        };

        vec![RelayAction::Send {
            conn: host_conn,
            message: ServerMessage::HostAction { kind, args, from: binding.identity },
        }]
    }

    /// Shared departure path for `leave-room`, disconnects, and implicit
    /// re-registration.
    ///
    /// Idempotent: a connection with no binding produces no actions.
    fn detach(&mut self, conn: ConnId) -> Vec<RelayAction> {
        let Some(binding) = self.bindings.unbind(conn) else {
            return Vec::new();
        };
        let code = binding.room_code;
        let Some(room) = self.directory.get_mut(code) else {
            tracing::warn!(%conn, %code, "binding referenced a vanished room");
            return Vec::new();
        };

        if room.is_host(binding.identity) {
            // Host departure destroys the room rather than leaving it
            // headless; remaining members are evicted and notified.
            let remaining = Self::member_conns(&self.bindings, room, Some(binding.identity));
            for member_conn in &remaining {
                self.bindings.unbind(*member_conn);
            }
            self.directory.remove(code);
            tracing::info!(%code, host = %binding.identity, "host departed, room closed");

            if remaining.is_empty() {
                return Vec::new();
            }
            return vec![RelayAction::Broadcast {
                recipients: remaining,
                message: ServerMessage::RoomClosed,
            }];
        }

        room.remove_member(binding.identity);
        let remaining = Self::member_conns(&self.bindings, room, None);
        self.directory.sweep_empty();
        tracing::info!(%code, identity = %binding.identity, "member left");

        if remaining.is_empty() {
            return Vec::new();
        }
        vec![RelayAction::Broadcast {
            recipients: remaining,
            message: ServerMessage::MemberLeft { identity: binding.identity },
        }]
    }

    /// Mint an identity token that is not currently bound.
    fn mint_identity(&self) -> ParticipantId {
        loop {
            let identity = ParticipantId::from(self.env.random_u64());
            if self.bindings.conn_of(identity).is_none() {
                return identity;
            }
        }
    }

    /// Connections of a room's current members, optionally excluding one
    /// identity. Members whose binding is gone are skipped.
    fn member_conns(
        bindings: &BindingTable,
        room: &Room,
        exclude: Option<ParticipantId>,
    ) -> Vec<ConnId> {
        room.members()
            .iter()
            .filter(|m| Some(m.identity) != exclude)
            .filter_map(|m| bindings.conn_of(m.identity))
            .collect()
    }

    /// Whether a room exists under this code.
    pub fn has_room(&self, code: RoomCode) -> bool {
        self.directory.contains(code)
    }

    /// Number of live rooms.
    pub fn room_count(&self) -> usize {
        self.directory.len()
    }

    /// Number of bound connections.
    pub fn binding_count(&self) -> usize {
        self.bindings.len()
    }

    /// The room a connection is currently bound to.
    pub fn room_of_conn(&self, conn: ConnId) -> Option<RoomCode> {
        self.bindings.binding(conn).map(|b| b.room_code)
    }

    /// The identity a connection is currently bound to.
    pub fn identity_of_conn(&self, conn: ConnId) -> Option<ParticipantId> {
        self.bindings.identity_of(conn)
    }

    /// A room's host identity.
    pub fn host_of(&self, code: RoomCode) -> Option<ParticipantId> {
        self.directory.get(code).map(Room::host)
    }

    /// A room's member identities in join order.
    pub fn members_of(&self, code: RoomCode) -> Option<Vec<ParticipantId>> {
        self.directory.get(code).map(|room| room.members().iter().map(|m| m.identity).collect())
    }

    /// A room's current state blob.
    pub fn state_of(&self, code: RoomCode) -> Option<&StateBlob> {
        self.directory.get(code).map(Room::state)
    }
}

impl<E: Environment> std::fmt::Debug for RelayDriver<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelayDriver")
            .field("room_count", &self.directory.len())
            .field("binding_count", &self.bindings.len())
            .finish()
    }
}
