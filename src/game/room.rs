//! Two-seat match session entity and its state machine

use axum::extract::ws::Message;
use rand::Rng;
use tokio::sync::mpsc::UnboundedSender;
use uuid::Uuid;

use crate::config::FirstChoicePolicy;
use crate::error::GameError;
use crate::game::moves::{self, Move, Outcome};
use crate::protocol::ServerMessage;

/// One player seat within a room
#[derive(Debug)]
pub struct Slot {
    pub conn_id: Uuid,
    pub sender: UnboundedSender<Message>,
    /// Resolved identity for stats attribution; None for guests
    pub player: Option<String>,
    pub choice: Option<Move>,
}

impl Slot {
    pub fn new(conn_id: Uuid, sender: UnboundedSender<Message>, player: Option<String>) -> Self {
        Self {
            conn_id,
            sender,
            player,
            choice: None,
        }
    }

    /// A seat is ready once it has a recorded move for the current round.
    pub fn is_ready(&self) -> bool {
        self.choice.is_some()
    }

    /// Send a message to this seat's connection.
    /// Returns true if successful, false if the channel is closed.
    pub fn send(&self, msg: &ServerMessage) -> bool {
        self.sender.send(Message::Text(msg.to_json())).is_ok()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomStatus {
    /// Only the creator is seated
    Waiting,
    /// Both seats occupied, accepting choices
    Ready,
    /// Both moves revealed, presentation delay running
    Resolving,
    /// Result broadcast, waiting for playAgain or teardown
    Completed,
}

/// What a choice submission led to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChoiceAccepted {
    /// Recorded; the opponent has not chosen yet
    Recorded {
        /// True when this was the round's first submission, which unlocks
        /// the opponent's UI
        unlock_opponent: bool,
    },
    /// Both seats are ready; the room moved to Resolving
    BothReady { player1: Move, player2: Move },
}

/// A two-party match session keyed by a short room code.
pub struct Room {
    code: String,
    /// Generation tag so a stale resolve timer cannot touch a room that
    /// reused this code after deletion
    room_id: Uuid,
    status: RoomStatus,
    slots: [Option<Slot>; 2],
    /// Seat index holding the first-choice UI affordance this round
    first_chooser: usize,
    round: u64,
}

impl Room {
    /// Create a room in Waiting with the creator in seat 0.
    pub fn new(code: String, creator: Slot) -> Self {
        Self {
            code,
            room_id: Uuid::new_v4(),
            status: RoomStatus::Waiting,
            slots: [Some(creator), None],
            first_chooser: 0,
            round: 0,
        }
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn room_id(&self) -> Uuid {
        self.room_id
    }

    pub fn status(&self) -> RoomStatus {
        self.status
    }

    pub fn round(&self) -> u64 {
        self.round
    }

    pub fn first_chooser(&self) -> usize {
        self.first_chooser
    }

    pub fn is_full(&self) -> bool {
        self.slots[1].is_some()
    }

    pub fn contains(&self, conn_id: Uuid) -> bool {
        self.slot_index(conn_id).is_some()
    }

    fn slot_index(&self, conn_id: Uuid) -> Option<usize> {
        self.slots
            .iter()
            .position(|s| s.as_ref().is_some_and(|s| s.conn_id == conn_id))
    }

    /// Seat the second player. Waiting -> Ready.
    pub fn join(&mut self, joiner: Slot) -> Result<(), GameError> {
        if self.is_full() {
            return Err(GameError::RoomFull);
        }
        self.slots[1] = Some(joiner);
        self.status = RoomStatus::Ready;
        Ok(())
    }

    /// Record a move for the seat owned by `conn_id`.
    ///
    /// Only accepted while the room is Ready; in every other state
    /// (including the Resolving delay window) the submission is ignored.
    /// A seat may overwrite its own earlier move until the opponent has
    /// chosen: last write wins.
    pub fn submit_choice(&mut self, conn_id: Uuid, choice: Move) -> Option<ChoiceAccepted> {
        if self.status != RoomStatus::Ready {
            return None;
        }
        let idx = self.slot_index(conn_id)?;
        let was_ready = self.slots[idx].as_ref().is_some_and(Slot::is_ready);
        let other_ready = self.slots[1 - idx].as_ref().is_some_and(Slot::is_ready);

        if let Some(slot) = self.slots[idx].as_mut() {
            slot.choice = Some(choice);
        }

        if other_ready {
            self.status = RoomStatus::Resolving;
            match (self.choice_of(0), self.choice_of(1)) {
                (Some(player1), Some(player2)) => {
                    Some(ChoiceAccepted::BothReady { player1, player2 })
                }
                // Both seats just checked ready
                _ => None,
            }
        } else {
            Some(ChoiceAccepted::Recorded {
                unlock_opponent: !was_ready,
            })
        }
    }

    fn choice_of(&self, idx: usize) -> Option<Move> {
        self.slots[idx].as_ref().and_then(|s| s.choice)
    }

    /// Resolving -> Completed. Returns the outcome, or None if the room is
    /// not mid-resolve.
    pub fn resolve(&mut self) -> Option<Outcome> {
        if self.status != RoomStatus::Resolving {
            return None;
        }
        let player1 = self.choice_of(0)?;
        let player2 = self.choice_of(1)?;
        self.status = RoomStatus::Completed;
        Some(moves::resolve(player1, player2))
    }

    /// Identities of (seat 0, seat 1) for stats attribution.
    pub fn identities(&self) -> (Option<String>, Option<String>) {
        (
            self.slots[0].as_ref().and_then(|s| s.player.clone()),
            self.slots[1].as_ref().and_then(|s| s.player.clone()),
        )
    }

    /// Completed -> Ready: clear both choices together and re-pick the
    /// first chooser according to `policy`.
    pub fn reset(&mut self, policy: FirstChoicePolicy) -> bool {
        if self.status != RoomStatus::Completed {
            return false;
        }
        for slot in self.slots.iter_mut().flatten() {
            slot.choice = None;
        }
        self.first_chooser = match policy {
            FirstChoicePolicy::CreatorAlways => 0,
            FirstChoicePolicy::Alternate => 1 - self.first_chooser,
            FirstChoicePolicy::Random => rand::thread_rng().gen_range(0..2),
        };
        self.round += 1;
        self.status = RoomStatus::Ready;
        true
    }

    /// The seat opposite `conn_id`, if occupied.
    pub fn other_slot(&self, conn_id: Uuid) -> Option<&Slot> {
        let idx = self.slot_index(conn_id)?;
        self.slots[1 - idx].as_ref()
    }

    /// Broadcast a message to both seats.
    pub fn broadcast(&self, msg: &ServerMessage) {
        for slot in self.slots.iter().flatten() {
            let _ = slot.send(msg);
        }
    }

    /// Send a message to one seat by index.
    pub fn send_to_slot(&self, idx: usize, msg: &ServerMessage) {
        if let Some(slot) = self.slots.get(idx).and_then(Option::as_ref) {
            let _ = slot.send(msg);
        }
    }

    /// Send a message to the seat opposite `conn_id`.
    pub fn send_to_other(&self, conn_id: Uuid, msg: &ServerMessage) {
        if let Some(other) = self.other_slot(conn_id) {
            let _ = other.send(msg);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn slot() -> (Slot, mpsc::UnboundedReceiver<Message>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Slot::new(Uuid::new_v4(), tx, None), rx)
    }

    fn full_room() -> (Room, Uuid, Uuid) {
        let (creator, _rx1) = slot();
        let (joiner, _rx2) = slot();
        let (c1, c2) = (creator.conn_id, joiner.conn_id);
        let mut room = Room::new("AB12K9".to_string(), creator);
        room.join(joiner).unwrap();
        (room, c1, c2)
    }

    #[test]
    fn test_new_room_is_waiting() {
        let (creator, _rx) = slot();
        let id = creator.conn_id;
        let room = Room::new("AB12K9".to_string(), creator);
        assert_eq!(room.status(), RoomStatus::Waiting);
        assert!(!room.is_full());
        assert!(room.contains(id));
        assert_eq!(room.first_chooser(), 0);
    }

    #[test]
    fn test_join_transitions_to_ready() {
        let (room, _, c2) = full_room();
        assert_eq!(room.status(), RoomStatus::Ready);
        assert!(room.is_full());
        assert!(room.contains(c2));
    }

    #[test]
    fn test_join_full_room_fails() {
        let (mut room, _, _) = full_room();
        let (third, _rx) = slot();
        assert!(matches!(room.join(third), Err(GameError::RoomFull)));
        // Rejected join leaves the room untouched
        assert_eq!(room.status(), RoomStatus::Ready);
    }

    #[test]
    fn test_choice_ignored_while_waiting() {
        let (creator, _rx) = slot();
        let id = creator.conn_id;
        let mut room = Room::new("AB12K9".to_string(), creator);
        assert!(room.submit_choice(id, Move::Rock).is_none());
    }

    #[test]
    fn test_first_choice_unlocks_opponent() {
        let (mut room, c1, _) = full_room();
        assert_eq!(
            room.submit_choice(c1, Move::Rock),
            Some(ChoiceAccepted::Recorded {
                unlock_opponent: true
            })
        );
    }

    #[test]
    fn test_overwrite_is_last_write_wins() {
        let (mut room, c1, c2) = full_room();
        room.submit_choice(c1, Move::Rock);
        // Overwriting before the opponent is ready does not re-unlock
        assert_eq!(
            room.submit_choice(c1, Move::Paper),
            Some(ChoiceAccepted::Recorded {
                unlock_opponent: false
            })
        );
        let accepted = room.submit_choice(c2, Move::Rock).unwrap();
        assert_eq!(
            accepted,
            ChoiceAccepted::BothReady {
                player1: Move::Paper,
                player2: Move::Rock,
            }
        );
    }

    #[test]
    fn test_both_ready_moves_to_resolving() {
        let (mut room, c1, c2) = full_room();
        room.submit_choice(c1, Move::Rock);
        room.submit_choice(c2, Move::Scissors);
        assert_eq!(room.status(), RoomStatus::Resolving);
        // Further choices during the delay window are ignored
        assert!(room.submit_choice(c1, Move::Paper).is_none());
    }

    #[test]
    fn test_resolve_completes_round() {
        let (mut room, c1, c2) = full_room();
        room.submit_choice(c1, Move::Rock);
        room.submit_choice(c2, Move::Scissors);
        assert_eq!(room.resolve(), Some(Outcome::P1));
        assert_eq!(room.status(), RoomStatus::Completed);
        // Only one Resolving -> Completed transition per round
        assert!(room.resolve().is_none());
    }

    #[test]
    fn test_resolve_requires_resolving_state() {
        let (mut room, _, _) = full_room();
        assert!(room.resolve().is_none());
    }

    #[test]
    fn test_reset_clears_choices_and_restarts() {
        let (mut room, c1, c2) = full_room();
        room.submit_choice(c1, Move::Rock);
        room.submit_choice(c2, Move::Scissors);
        room.resolve();

        assert!(room.reset(FirstChoicePolicy::CreatorAlways));
        assert_eq!(room.status(), RoomStatus::Ready);
        assert_eq!(room.round(), 1);
        assert_eq!(room.first_chooser(), 0);

        // Second round behaves like the first
        room.submit_choice(c1, Move::Paper);
        let accepted = room.submit_choice(c2, Move::Paper).unwrap();
        assert_eq!(
            accepted,
            ChoiceAccepted::BothReady {
                player1: Move::Paper,
                player2: Move::Paper,
            }
        );
        assert_eq!(room.resolve(), Some(Outcome::Draw));
    }

    #[test]
    fn test_reset_only_from_completed() {
        let (mut room, c1, _) = full_room();
        assert!(!room.reset(FirstChoicePolicy::CreatorAlways));
        room.submit_choice(c1, Move::Rock);
        assert!(!room.reset(FirstChoicePolicy::CreatorAlways));
    }

    #[test]
    fn test_alternate_policy_flips_chooser() {
        let (mut room, c1, c2) = full_room();
        for expected in [1, 0, 1] {
            room.submit_choice(c1, Move::Rock);
            room.submit_choice(c2, Move::Rock);
            room.resolve();
            assert!(room.reset(FirstChoicePolicy::Alternate));
            assert_eq!(room.first_chooser(), expected);
        }
    }

    #[test]
    fn test_broadcast_reaches_both_seats() {
        let (tx1, mut rx1) = mpsc::unbounded_channel();
        let (tx2, mut rx2) = mpsc::unbounded_channel();
        let creator = Slot::new(Uuid::new_v4(), tx1, None);
        let joiner = Slot::new(Uuid::new_v4(), tx2, None);
        let mut room = Room::new("AB12K9".to_string(), creator);
        room.join(joiner).unwrap();

        room.broadcast(&ServerMessage::PlayersConnected);
        assert!(rx1.try_recv().is_ok());
        assert!(rx2.try_recv().is_ok());
    }

    #[test]
    fn test_other_slot() {
        let (room, c1, c2) = full_room();
        assert_eq!(room.other_slot(c1).unwrap().conn_id, c2);
        assert_eq!(room.other_slot(c2).unwrap().conn_id, c1);
        assert!(room.other_slot(Uuid::new_v4()).is_none());
    }

    #[test]
    fn test_identities() {
        let (tx1, _rx1) = mpsc::unbounded_channel();
        let (tx2, _rx2) = mpsc::unbounded_channel();
        let creator = Slot::new(Uuid::new_v4(), tx1, Some("alice".to_string()));
        let joiner = Slot::new(Uuid::new_v4(), tx2, None);
        let mut room = Room::new("AB12K9".to_string(), creator);
        room.join(joiner).unwrap();

        assert_eq!(room.identities(), (Some("alice".to_string()), None));
    }
}
