//! Property-based tests for the relay driver's structural invariants.

use std::sync::{Arc, Mutex};

use huddle_core::{ConnId, RelayAction, RelayConfig, RelayDriver, RelayEvent};
use huddle_proto::{ClientMessage, RoomCode, ServerMessage, StateBlob};
use proptest::prelude::*;
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

#[derive(Clone)]
struct SeededEnv(Arc<Mutex<ChaCha8Rng>>);

impl SeededEnv {
    fn new(seed: u64) -> Self {
        Self(Arc::new(Mutex::new(ChaCha8Rng::seed_from_u64(seed))))
    }
}

impl huddle_core::Environment for SeededEnv {
    fn random_bytes(&self, buffer: &mut [u8]) {
        self.0.lock().unwrap().fill_bytes(buffer);
    }
}

/// A randomized client operation over a small pool of connections.
#[derive(Debug, Clone)]
enum Op {
    Create { conn: u64 },
    /// Join the `nth` room created so far (if any still exists).
    Join { conn: u64, nth: usize },
    JoinGarbage { conn: u64 },
    Publish { conn: u64 },
    Leave { conn: u64 },
    Disconnect { conn: u64 },
}

fn op_strategy() -> impl Strategy<Value = Op> {
    let conn = 0u64..6;
    prop_oneof![
        conn.clone().prop_map(|conn| Op::Create { conn }),
        (conn.clone(), 0usize..8).prop_map(|(conn, nth)| Op::Join { conn, nth }),
        conn.clone().prop_map(|conn| Op::JoinGarbage { conn }),
        conn.clone().prop_map(|conn| Op::Publish { conn }),
        conn.clone().prop_map(|conn| Op::Leave { conn }),
        conn.prop_map(|conn| Op::Disconnect { conn }),
    ]
}

fn apply(driver: &mut RelayDriver<SeededEnv>, codes: &mut Vec<RoomCode>, op: &Op) {
    let event = |conn: u64, message: ClientMessage| RelayEvent::MessageReceived {
        conn: ConnId::new(conn),
        message,
    };
    match op {
        Op::Create { conn } => {
            let actions =
                driver.process_event(event(*conn, ClientMessage::CreateRoom {
                    display_name: format!("user-{conn}"),
                }));
            for action in actions {
                if let RelayAction::Send {
                    message: ServerMessage::RoomCreated { room_code }, ..
                } = action
                {
                    codes.push(room_code);
                }
            }
        },
        Op::Join { conn, nth } => {
            if codes.is_empty() {
                return;
            }
            let code = codes[nth % codes.len()];
            driver.process_event(event(*conn, ClientMessage::JoinRoom {
                room_code: code.to_string(),
                display_name: format!("user-{conn}"),
            }));
        },
        Op::JoinGarbage { conn } => {
            driver.process_event(event(*conn, ClientMessage::JoinRoom {
                room_code: "not a code".to_string(),
                display_name: format!("user-{conn}"),
            }));
        },
        Op::Publish { conn } => {
            driver.process_event(event(*conn, ClientMessage::PublishState {
                state: StateBlob::new(serde_json::json!({"from": conn})),
            }));
        },
        Op::Leave { conn } => {
            driver.process_event(event(*conn, ClientMessage::LeaveRoom));
        },
        Op::Disconnect { conn } => {
            driver.process_event(RelayEvent::ConnectionClosed { conn: ConnId::new(*conn) });
        },
    }
}

/// Bidirectional consistency between room member sets and the binding
/// table, plus host-membership, after an arbitrary operation sequence.
#[test]
fn prop_membership_and_bindings_stay_consistent() {
    proptest!(|(seed in any::<u64>(), ops in prop::collection::vec(op_strategy(), 1..60))| {
        let mut driver = RelayDriver::new(SeededEnv::new(seed), RelayConfig::default());
        let mut codes: Vec<RoomCode> = Vec::new();

        for op in &ops {
            apply(&mut driver, &mut codes, op);

            // Every bound connection's identity is in its room's member set.
            for conn in 0..6 {
                if let Some(code) = driver.room_of_conn(ConnId::new(conn)) {
                    let identity = driver.identity_of_conn(ConnId::new(conn));
                    let members = driver.members_of(code);
                    prop_assert!(members.is_some(), "binding references destroyed room");
                    prop_assert!(
                        members.unwrap().contains(&identity.unwrap()),
                        "bound identity not a member"
                    );
                }
            }

            // Every member of every live room is bound, and the host is a
            // member. Counting both ways proves the mappings are equal.
            // A destroyed room's code can be re-minted later, so count
            // each code once.
            let unique: std::collections::HashSet<RoomCode> = codes.iter().copied().collect();
            let mut member_total = 0;
            for &code in &unique {
                let Some(members) = driver.members_of(code) else { continue };
                prop_assert!(!members.is_empty(), "empty room escaped the sweep");
                let host = driver.host_of(code).unwrap();
                prop_assert!(members.contains(&host), "host must always be a member");
                member_total += members.len();
            }
            prop_assert_eq!(member_total, driver.binding_count());
        }
    });
}

/// No two concurrently live rooms ever share a code.
#[test]
fn prop_live_room_codes_are_unique() {
    proptest!(|(seed in any::<u64>(), count in 1usize..40)| {
        let mut driver = RelayDriver::new(SeededEnv::new(seed), RelayConfig::default());
        let mut live = std::collections::HashSet::new();

        for conn in 0..count as u64 {
            let actions = driver.process_event(RelayEvent::MessageReceived {
                conn: ConnId::new(conn),
                message: ClientMessage::CreateRoom { display_name: "host".to_string() },
            });
            for action in actions {
                if let RelayAction::Send {
                    message: ServerMessage::RoomCreated { room_code }, ..
                } = action
                {
                    prop_assert!(live.insert(room_code), "duplicate live code");
                }
            }
        }
        prop_assert_eq!(live.len(), driver.room_count());
    });
}

/// The stored state only ever changes through a host publish.
#[test]
fn prop_only_the_host_mutates_state() {
    proptest!(|(seed in any::<u64>(), publishers in prop::collection::vec(0u64..3, 1..20))| {
        let mut driver = RelayDriver::new(SeededEnv::new(seed), RelayConfig::default());

        let actions = driver.process_event(RelayEvent::MessageReceived {
            conn: ConnId::new(0),
            message: ClientMessage::CreateRoom { display_name: "host".to_string() },
        });
        let code = match actions.as_slice() {
            [RelayAction::Send { message: ServerMessage::RoomCreated { room_code }, .. }] => {
                *room_code
            },
            _ => unreachable!(),
        };
        for conn in 1..3 {
            driver.process_event(RelayEvent::MessageReceived {
                conn: ConnId::new(conn),
                message: ClientMessage::JoinRoom {
                    room_code: code.to_string(),
                    display_name: "member".to_string(),
                },
            });
        }

        let mut expected = StateBlob::default();
        for (i, &publisher) in publishers.iter().enumerate() {
            let state = StateBlob::new(serde_json::json!({"seq": i}));
            driver.process_event(RelayEvent::MessageReceived {
                conn: ConnId::new(publisher),
                message: ClientMessage::PublishState { state: state.clone() },
            });
            if publisher == 0 {
                expected = state;
            }
            prop_assert_eq!(driver.state_of(code), Some(&expected));
        }
    });
}
