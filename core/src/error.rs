use thiserror::Error;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Invalid coordinates")]
    InvalidCoords,
    #[error("Too many mines")]
    TooManyMines,
    #[error("Board size must be within 1x1 and 16x30")]
    InvalidBoardSize,
    #[error("Ticks per second and repeat delay must be non-zero")]
    InvalidTiming,
}

pub type Result<T> = core::result::Result<T, GameError>;
