use thiserror::Error;

#[derive(Error, Debug)]
pub enum GameError {
    #[error("Room not found")]
    RoomNotFound,

    #[error("Room is full")]
    RoomFull,

    #[error("Invalid move: {0}")]
    InvalidMove(String),

    #[error("Stats error: {0}")]
    Stats(String),
}
