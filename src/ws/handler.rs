//! WebSocket handling: translates client messages into room operations
//! and outbound broadcasts.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{
        ws::{Message, WebSocket},
        Query, State, WebSocketUpgrade,
    },
    response::IntoResponse,
};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc::{self, UnboundedSender};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::REVEAL_DELAY_MS;
use crate::error::GameError;
use crate::game::{ChoiceAccepted, Move, RoomRegistry, Slot};
use crate::protocol::{ClientMessage, ServerMessage};
use crate::{stats, AppState};

/// Identity offered on the upgrade request; absent means guest
#[derive(Debug, Default, Deserialize)]
pub struct WsQuery {
    pub player: Option<String>,
}

/// One connection's view of the world
struct Connection {
    conn_id: Uuid,
    tx: UnboundedSender<Message>,
    /// Resolved identity, used only for stats attribution
    player: Option<String>,
    /// Code of the room this connection currently occupies
    room: Option<String>,
}

impl Connection {
    fn send(&self, msg: &ServerMessage) {
        let _ = self.tx.send(Message::Text(msg.to_json()));
    }

    fn slot(&self) -> Slot {
        Slot::new(self.conn_id, self.tx.clone(), self.player.clone())
    }
}

/// WebSocket upgrade handler
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(query): Query<WsQuery>,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state, query.player))
}

/// Handle a WebSocket connection for its entire lifetime
async fn handle_socket(socket: WebSocket, state: Arc<AppState>, player: Option<String>) {
    let (mut sender, mut receiver) = socket.split();

    // Channel for outgoing messages; room broadcasts go through it too
    let (tx, mut rx) = mpsc::unbounded_channel::<Message>();

    let mut conn = Connection {
        conn_id: Uuid::new_v4(),
        tx,
        player: player.filter(|p| !p.is_empty()),
        room: None,
    };

    info!(
        "Connection {} opened (player: {})",
        conn.conn_id,
        conn.player.as_deref().unwrap_or("guest")
    );

    // Forward queued messages to the socket
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(msg).await.is_err() {
                break;
            }
        }
    });

    while let Some(result) = receiver.next().await {
        match result {
            Ok(Message::Text(text)) => {
                handle_text_message(&state, &mut conn, &text).await;
            }
            Ok(Message::Close(_)) => {
                info!("Connection {} sent close frame", conn.conn_id);
                break;
            }
            Ok(_) => {
                // Ignore binary, ping, pong frames
            }
            Err(e) => {
                warn!("WebSocket error for {}: {}", conn.conn_id, e);
                break;
            }
        }
    }

    // Transport-level disconnect tears the room down like an explicit leave
    teardown_room(&state, &mut conn).await;
    send_task.abort();
    info!("Connection {} closed", conn.conn_id);
}

/// Dispatch one inbound message
async fn handle_text_message(state: &Arc<AppState>, conn: &mut Connection, text: &str) {
    match ClientMessage::parse(text) {
        Some(ClientMessage::CreateGame) => handle_create(state, conn).await,
        Some(ClientMessage::JoinGame { room_code }) => handle_join(state, conn, &room_code).await,
        Some(ClientMessage::PlayerChoice { room_code, choice }) => {
            handle_choice(state, conn, &room_code, &choice).await
        }
        Some(ClientMessage::PlayAgain { room_code }) => {
            handle_play_again(state, conn, &room_code).await
        }
        Some(ClientMessage::LeaveGame { room_code }) => {
            handle_leave(state, conn, &room_code).await
        }
        None => debug!("Unparseable message from {}: {}", conn.conn_id, text),
    }
}

/// Create a room and reply with its code.
async fn handle_create(state: &Arc<AppState>, conn: &mut Connection) {
    let mut registry = state.registry.write().await;

    // One seat per connection: creating while seated leaves the old room
    teardown_locked(&mut registry, conn);

    let code = registry.create(conn.slot()).code().to_string();
    drop(registry);

    info!("Connection {} created room {}", conn.conn_id, code);
    conn.room = Some(code.clone());
    conn.send(&ServerMessage::NewGame { room_code: code });
}

/// Fill the second seat and notify both players.
async fn handle_join(state: &Arc<AppState>, conn: &mut Connection, code: &str) {
    if conn.room.as_deref() == Some(code) {
        debug!("Connection {} already seated in {}", conn.conn_id, code);
        return;
    }

    let mut registry = state.registry.write().await;

    // Validate the target before giving up any current seat, so a rejected
    // join changes nothing.
    let rejection = match registry.get(code) {
        None => Some(GameError::RoomNotFound),
        Some(room) if room.is_full() => Some(GameError::RoomFull),
        Some(_) => None,
    };
    if let Some(e) = rejection {
        drop(registry);
        debug!("Join {} rejected for {}: {}", code, conn.conn_id, e);
        conn.send(&ServerMessage::Error {
            message: e.to_string(),
        });
        return;
    }

    // One seat per connection: joining elsewhere leaves the old room
    teardown_locked(&mut registry, conn);

    match registry.join(code, conn.slot()) {
        Ok(room) => {
            conn.room = Some(code.to_string());
            room.broadcast(&ServerMessage::PlayersConnected);
            // First-choice affordance goes to the creator's seat
            room.send_to_slot(room.first_chooser(), &ServerMessage::EnableChoice);
            info!("Connection {} joined room {}", conn.conn_id, code);
        }
        Err(e) => conn.send(&ServerMessage::Error {
            message: e.to_string(),
        }),
    }
}

/// Record a choice; reveal and schedule resolution once both seats chose.
async fn handle_choice(state: &Arc<AppState>, conn: &Connection, code: &str, raw: &str) {
    // Unknown spellings are rejected at the boundary and never resolved
    let choice = match raw.parse::<Move>() {
        Ok(m) => m,
        Err(e) => {
            debug!("Rejected move {:?} from {}", raw, conn.conn_id);
            conn.send(&ServerMessage::Error {
                message: e.to_string(),
            });
            return;
        }
    };

    let mut registry = state.registry.write().await;

    // A choice for a room that was torn down is silently ignored
    let Some(room) = registry.get_mut(code) else {
        debug!("Choice for unknown room {} from {}", code, conn.conn_id);
        return;
    };

    match room.submit_choice(conn.conn_id, choice) {
        Some(ChoiceAccepted::Recorded { unlock_opponent }) => {
            if unlock_opponent {
                room.send_to_other(conn.conn_id, &ServerMessage::EnableChoice);
            }
        }
        Some(ChoiceAccepted::BothReady { player1, player2 }) => {
            // Both moves leave the server in one atomic broadcast; neither
            // side can observe the other's move before submitting its own.
            room.broadcast(&ServerMessage::RevealChoices {
                player1_choice: player1,
                player2_choice: player2,
            });
            schedule_resolve(state.clone(), code.to_string(), room.room_id());
        }
        None => debug!("Choice ignored in room {} (not accepting)", code),
    }
}

/// After the presentation delay, resolve the round if the same room still
/// exists and is still mid-resolve. Leave or disconnect during the delay
/// makes this a no-op, as does the code having been reused by a younger
/// room.
fn schedule_resolve(state: Arc<AppState>, code: String, room_id: Uuid) {
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(REVEAL_DELAY_MS)).await;

        let (outcome, (player1, player2)) = {
            let mut registry = state.registry.write().await;
            let Some(room) = registry.get_mut(&code) else {
                debug!("Room {} gone before resolve", code);
                return;
            };
            if room.room_id() != room_id {
                return;
            }
            let Some(outcome) = room.resolve() else {
                return;
            };
            room.broadcast(&ServerMessage::GameResult { winner: outcome });
            info!("Room {} resolved: {:?}", code, outcome);
            (outcome, room.identities())
        };

        // Best-effort: the broadcast result stands whether or not this lands
        stats::report_round(
            state.stats.as_ref(),
            player1.as_deref(),
            player2.as_deref(),
            outcome,
        )
        .await;
    });
}

/// Reset the room for another round.
async fn handle_play_again(state: &Arc<AppState>, conn: &Connection, code: &str) {
    let mut registry = state.registry.write().await;
    let Some(room) = registry.get_mut(code) else {
        debug!("playAgain for unknown room {} from {}", code, conn.conn_id);
        return;
    };
    if !room.contains(conn.conn_id) {
        return;
    }
    if room.reset(state.policy) {
        room.broadcast(&ServerMessage::ResetForNewRound);
        room.send_to_slot(room.first_chooser(), &ServerMessage::EnableChoice);
        info!("Room {} reset for round {}", code, room.round());
    }
}

/// Explicit leave; same teardown as a transport disconnect.
async fn handle_leave(state: &Arc<AppState>, conn: &mut Connection, code: &str) {
    if conn.room.as_deref() != Some(code) {
        debug!("Leave for room {} ignored for {}", code, conn.conn_id);
        return;
    }
    teardown_room(state, conn).await;
}

/// Remove the connection's room, if any, and notify the other seat.
async fn teardown_room(state: &Arc<AppState>, conn: &mut Connection) {
    if conn.room.is_none() {
        return;
    }
    let mut registry = state.registry.write().await;
    teardown_locked(&mut registry, conn);
}

fn teardown_locked(registry: &mut RoomRegistry, conn: &mut Connection) {
    let Some(code) = conn.room.take() else { return };
    // The code may have been re-issued to a younger room after the opponent
    // tore this seat's room down; only remove a room this connection
    // actually occupies.
    if !registry
        .get(&code)
        .is_some_and(|room| room.contains(conn.conn_id))
    {
        debug!("Room {} no longer holds {}", code, conn.conn_id);
        return;
    }
    if let Some(room) = registry.remove(&code) {
        if let Some(other) = room.other_slot(conn.conn_id) {
            let _ = other.send(&ServerMessage::OpponentDisconnected);
        }
        info!("Room {} closed by {}", code, conn.conn_id);
    }
}
