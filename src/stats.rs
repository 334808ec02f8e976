//! Best-effort win/loss/draw stats reporting
//!
//! The store is behind a trait so an in-memory map can be swapped for a
//! database-backed implementation without touching the session handlers.
//! Reporting happens after the result broadcast and never affects it.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::Serialize;
use tracing::warn;

use crate::error::GameError;
use crate::game::Outcome;

/// Which counter a completed round increments for a player
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatField {
    Wins,
    Losses,
    Draws,
}

/// Store of per-player results
#[async_trait]
pub trait StatsStore: Send + Sync {
    /// Increment one counter and stamp the player's last-played time.
    async fn increment(
        &self,
        player: &str,
        field: StatField,
        at: DateTime<Utc>,
    ) -> Result<(), GameError>;

    /// Current totals for every known player, best first.
    async fn snapshot(&self) -> Vec<PlayerStats>;
}

/// Per-player totals
#[derive(Debug, Clone, Serialize)]
pub struct PlayerStats {
    pub player: String,
    pub wins: u64,
    pub losses: u64,
    pub draws: u64,
    pub last_played: DateTime<Utc>,
}

/// In-memory store
#[derive(Default)]
pub struct InMemoryStats {
    players: DashMap<String, PlayerStats>,
}

impl InMemoryStats {
    pub fn new() -> Self {
        Self {
            players: DashMap::new(),
        }
    }
}

#[async_trait]
impl StatsStore for InMemoryStats {
    async fn increment(
        &self,
        player: &str,
        field: StatField,
        at: DateTime<Utc>,
    ) -> Result<(), GameError> {
        let mut entry = self
            .players
            .entry(player.to_string())
            .or_insert_with(|| PlayerStats {
                player: player.to_string(),
                wins: 0,
                losses: 0,
                draws: 0,
                last_played: at,
            });
        match field {
            StatField::Wins => entry.wins += 1,
            StatField::Losses => entry.losses += 1,
            StatField::Draws => entry.draws += 1,
        }
        entry.last_played = at;
        Ok(())
    }

    async fn snapshot(&self) -> Vec<PlayerStats> {
        let mut all: Vec<PlayerStats> = self.players.iter().map(|e| e.value().clone()).collect();
        all.sort_by(|a, b| b.wins.cmp(&a.wins).then_with(|| a.player.cmp(&b.player)));
        all
    }
}

/// Record one completed round for both seats.
///
/// Seats without a resolved identity (guests) are skipped. Store failures
/// are logged and swallowed: the already-broadcast result is authoritative.
pub async fn report_round(
    store: &dyn StatsStore,
    player1: Option<&str>,
    player2: Option<&str>,
    outcome: Outcome,
) {
    let at = Utc::now();
    let (field1, field2) = match outcome {
        Outcome::Draw => (StatField::Draws, StatField::Draws),
        Outcome::P1 => (StatField::Wins, StatField::Losses),
        Outcome::P2 => (StatField::Losses, StatField::Wins),
    };

    for (player, field) in [(player1, field1), (player2, field2)] {
        if let Some(name) = player {
            if let Err(e) = store.increment(name, field, at).await {
                warn!("Failed to record stats for {}: {}", name, e);
            }
        }
    }
}
