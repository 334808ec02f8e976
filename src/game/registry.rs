//! Process-wide collection of live rooms, keyed by room code

use std::collections::HashMap;

use rand::Rng;

use crate::config::{ROOM_CODE_ALPHABET, ROOM_CODE_LENGTH};
use crate::error::GameError;
use crate::game::room::{Room, Slot};

/// Owns every live room. No other component holds a room after it has been
/// removed here.
#[derive(Default)]
pub struct RoomRegistry {
    rooms: HashMap<String, Room>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self {
            rooms: HashMap::new(),
        }
    }

    /// Create a room in Waiting with the creator in seat 0 and a freshly
    /// drawn, collision-free code.
    pub fn create(&mut self, creator: Slot) -> &Room {
        let code = fresh_code(&self.rooms);
        let room = Room::new(code.clone(), creator);
        self.rooms.entry(code).or_insert(room)
    }

    /// Seat `joiner` in the room for `code`. Fails with `RoomNotFound` or
    /// `RoomFull`; a failed join leaves the room untouched.
    pub fn join(&mut self, code: &str, joiner: Slot) -> Result<&mut Room, GameError> {
        let room = self.rooms.get_mut(code).ok_or(GameError::RoomNotFound)?;
        room.join(joiner)?;
        Ok(room)
    }

    pub fn get(&self, code: &str) -> Option<&Room> {
        self.rooms.get(code)
    }

    pub fn get_mut(&mut self, code: &str) -> Option<&mut Room> {
        self.rooms.get_mut(code)
    }

    /// Remove the room for `code`. Idempotent: removing an absent code is
    /// a no-op.
    pub fn remove(&mut self, code: &str) -> Option<Room> {
        self.rooms.remove(code)
    }

    /// Insert a pre-built room under its own code, replacing any holder.
    #[cfg(test)]
    pub fn insert(&mut self, room: Room) {
        self.rooms.insert(room.code().to_string(), room);
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }
}

/// Draw a random code, retrying until it does not collide with a live room.
fn fresh_code(rooms: &HashMap<String, Room>) -> String {
    let mut rng = rand::thread_rng();
    loop {
        let code: String = (0..ROOM_CODE_LENGTH)
            .map(|_| ROOM_CODE_ALPHABET[rng.gen_range(0..ROOM_CODE_ALPHABET.len())] as char)
            .collect();
        if !rooms.contains_key(&code) {
            return code;
        }
    }
}
