//! WebSocket protocol messages
//!
//! Both directions use internally tagged JSON, e.g.
//! `{"type":"joinGame","roomCode":"AB12K9"}`.

use serde::{Deserialize, Serialize};

use crate::game::{Move, Outcome};

/// Messages sent from client to server
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientMessage {
    CreateGame,
    #[serde(rename_all = "camelCase")]
    JoinGame { room_code: String },
    /// The move arrives as a raw string and is validated at the boundary;
    /// non-canonical spellings never reach resolution.
    #[serde(rename_all = "camelCase")]
    PlayerChoice {
        room_code: String,
        #[serde(rename = "move")]
        choice: String,
    },
    #[serde(rename_all = "camelCase")]
    PlayAgain { room_code: String },
    #[serde(rename_all = "camelCase")]
    LeaveGame { room_code: String },
}

impl ClientMessage {
    /// Parse a client message from a JSON string
    pub fn parse(text: &str) -> Option<Self> {
        serde_json::from_str(text).ok()
    }
}

/// Messages sent from server to client
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerMessage {
    /// Room created; sent to the creator only
    #[serde(rename_all = "camelCase")]
    NewGame { room_code: String },
    /// Both seats occupied (room broadcast)
    PlayersConnected,
    /// UI pacing hint for one seat; carries no correctness meaning
    EnableChoice,
    /// Both moves, disclosed atomically in a single broadcast
    #[serde(rename_all = "camelCase")]
    RevealChoices {
        player1_choice: Move,
        player2_choice: Move,
    },
    /// Round outcome (room broadcast)
    GameResult { winner: Outcome },
    /// Room reset after playAgain (room broadcast)
    ResetForNewRound,
    /// The other seat left or dropped; sent to the remaining seat only
    OpponentDisconnected,
    /// Protocol error, reported to the offending connection only
    Error { message: String },
}

impl ServerMessage {
    /// Serialize message to JSON string
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}
