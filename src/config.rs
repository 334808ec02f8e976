//! Server configuration constants

/// WebSocket server port
pub const SERVER_PORT: u16 = 8080;

/// Presentation delay between revealing both choices and announcing the
/// result, in milliseconds
pub const REVEAL_DELAY_MS: u64 = 1000;

/// Room code length
pub const ROOM_CODE_LENGTH: usize = 6;

/// Alphabet room codes are drawn from
pub const ROOM_CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Which seat gets the first-choice affordance after each round reset.
///
/// This only paces the UI; the server accepts choices from either seat in
/// any order and both moves stay hidden until the atomic reveal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FirstChoicePolicy {
    /// The room creator (seat 0) always chooses first
    CreatorAlways,
    /// The affordance flips between seats every round
    Alternate,
    /// A coin flip each round
    Random,
}

/// Policy used unless the caller picks another one
pub const DEFAULT_FIRST_CHOICE_POLICY: FirstChoicePolicy = FirstChoicePolicy::CreatorAlways;
