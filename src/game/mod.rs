//! Match session core: moves, rooms, and the room registry

pub mod moves;
pub mod registry;
pub mod room;

pub use moves::{resolve, Move, Outcome};
pub use registry::RoomRegistry;
pub use room::{ChoiceAccepted, Room, RoomStatus, Slot};
