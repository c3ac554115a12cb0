use serde::{Deserialize, Serialize};

/// Non-numeric cell graphics the engine asks the surface to draw.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tile {
    Hidden,
    Flag,
    /// The mine that ended the round.
    Exploded,
    /// A mine disclosed after the round ended.
    Mine,
    /// A flag placed on a cell without a mine.
    IncorrectFlag,
}

/// Reset button face.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Face {
    Happy,
    /// Shown while the action button is held, "about to reveal".
    Caution,
    Dead,
    Win,
}
