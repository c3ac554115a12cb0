//! Frame-budgeted Minesweeper rule engine.
//!
//! Everything advances one step per vertical-sync tick through [`Machine::on_vsync`]. The crate
//! never allocates: the board is three fixed bit matrices, and the auto-reveal flood fill works
//! through a fixed-capacity queue, exposing at most one cell per tick.
#![no_std]

#[cfg(test)]
extern crate std;

use core::ops::BitOr;
use serde::{Deserialize, Serialize};

pub use bits::*;
pub use board::*;
pub use clock::*;
pub use error::*;
pub use flood::*;
pub use input::*;
pub use mode::*;
pub use queue::*;
pub use surface::*;
pub use tile::*;
pub use types::*;

mod bits;
mod board;
mod clock;
mod error;
mod flood;
mod input;
mod mode;
mod queue;
mod surface;
mod tile;
mod types;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    /// `(rows, columns)`
    pub size: Coord2,
    pub mines: CellCount,
}

impl GameConfig {
    pub const fn new_unchecked(size: Coord2, mines: CellCount) -> Self {
        Self { size, mines }
    }

    /// Builds a config, clamping the size into the supported range and the mines onto the board.
    pub fn new(size: Coord2, mines: CellCount) -> Self {
        let (rows, cols) = size;
        let clamped_size = (rows.clamp(1, ROWS_MAX), cols.clamp(1, COLUMNS_MAX));
        let clamped_mines = mines.clamp(1, mult(clamped_size.0, clamped_size.1));
        if (clamped_size, clamped_mines) != (size, mines) {
            log::warn!(
                "board config {:?} with {} mines clamped to {:?} with {}",
                size,
                mines,
                clamped_size,
                clamped_mines
            );
        }
        Self::new_unchecked(clamped_size, clamped_mines)
    }

    /// Builds a config, rejecting anything [`GameConfig::new`] would have to clamp.
    pub fn validated(size: Coord2, mines: CellCount) -> Result<Self> {
        let config = Self::new_unchecked(size, mines);
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let (rows, cols) = self.size;
        if !(1..=ROWS_MAX).contains(&rows) || !(1..=COLUMNS_MAX).contains(&cols) {
            return Err(GameError::InvalidBoardSize);
        }
        if self.mines > self.total_cells() {
            return Err(GameError::TooManyMines);
        }
        Ok(())
    }

    pub const fn total_cells(&self) -> CellCount {
        mult(self.size.0, self.size.1)
    }

    pub const fn safe_cells(&self) -> CellCount {
        self.total_cells().saturating_sub(self.mines)
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Difficulty::Beginner.config()
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Expert,
}

impl Difficulty {
    pub const fn config(self) -> GameConfig {
        use Difficulty::*;
        match self {
            Beginner => GameConfig::new_unchecked((9, 9), 10),
            Intermediate => GameConfig::new_unchecked((16, 16), 40),
            Expert => GameConfig::new_unchecked((16, 30), 99),
        }
    }

    /// Next entry towards the top of the menu, staying put at the first one.
    pub const fn previous(self) -> Self {
        use Difficulty::*;
        match self {
            Beginner => Beginner,
            Intermediate => Beginner,
            Expert => Intermediate,
        }
    }

    /// Next entry towards the bottom of the menu, staying put at the last one.
    pub const fn next(self) -> Self {
        use Difficulty::*;
        match self {
            Beginner => Intermediate,
            Intermediate => Expert,
            Expert => Expert,
        }
    }
}

impl Default for Difficulty {
    fn default() -> Self {
        Self::Beginner
    }
}

/// Frame-rate dependent thresholds.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Vertical-sync ticks per second of the target platform.
    pub ticks_per_second: u8,
    /// Ticks a direction must be held before its auto-repeat pulse.
    pub repeat_delay: u8,
}

impl TimingConfig {
    pub const NTSC: Self = Self::new_unchecked(60, 9);
    pub const PAL: Self = Self::new_unchecked(50, 9);

    pub const fn new_unchecked(ticks_per_second: u8, repeat_delay: u8) -> Self {
        Self {
            ticks_per_second,
            repeat_delay,
        }
    }

    pub fn validated(ticks_per_second: u8, repeat_delay: u8) -> Result<Self> {
        let timing = Self::new_unchecked(ticks_per_second, repeat_delay);
        timing.validate()?;
        Ok(timing)
    }

    pub fn validate(&self) -> Result<()> {
        if self.ticks_per_second == 0 || self.repeat_delay == 0 {
            Err(GameError::InvalidTiming)
        } else {
            Ok(())
        }
    }

    /// Ticks of continuous hold that make a long press: half a second.
    pub const fn long_press_ticks(&self) -> u8 {
        let half = self.ticks_per_second >> 1;
        if half == 0 { 1 } else { half }
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self::NTSC
    }
}

/// Result of exposing cells, either directly or through one flood-fill step.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ExposeOutcome {
    NoChange,
    Exposed,
    /// A wrong flag or an over-flagged neighborhood was found and marked on the board.
    Inconsistent,
    /// An unflagged mine was exposed; the round is lost.
    Detonated,
}

impl ExposeOutcome {
    pub const fn is_detonated(self) -> bool {
        matches!(self, Self::Detonated)
    }
}

/// Used to merge outcomes when a single step touches several cells
impl BitOr for ExposeOutcome {
    type Output = ExposeOutcome;

    fn bitor(self, rhs: Self) -> Self::Output {
        use ExposeOutcome::*;
        match (self, rhs) {
            // detonation has priority
            (Detonated, _) => Detonated,
            (_, Detonated) => Detonated,
            (Inconsistent, _) => Inconsistent,
            (_, Inconsistent) => Inconsistent,
            (Exposed, _) => Exposed,
            (_, Exposed) => Exposed,
            (NoChange, NoChange) => NoChange,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_new_clamps_into_supported_range() {
        let config = GameConfig::new((40, 0), 500);
        assert_eq!(config.size, (ROWS_MAX, 1));
        assert_eq!(config.mines, 16);
    }

    #[test]
    fn config_new_raises_empty_minefield_to_one_mine() {
        assert_eq!(GameConfig::new((9, 9), 0), GameConfig::new_unchecked((9, 9), 1));
        assert_eq!(GameConfig::new((9, 9), 10), Difficulty::Beginner.config());
    }

    #[test]
    fn config_validated_rejects_oversized_boards() {
        assert_eq!(
            GameConfig::validated((17, 9), 10),
            Err(GameError::InvalidBoardSize)
        );
        assert_eq!(
            GameConfig::validated((9, 31), 10),
            Err(GameError::InvalidBoardSize)
        );
        assert_eq!(
            GameConfig::validated((2, 2), 5),
            Err(GameError::TooManyMines)
        );
        assert!(GameConfig::validated((16, 30), 99).is_ok());
    }

    #[test]
    fn presets_are_valid() {
        for difficulty in [
            Difficulty::Beginner,
            Difficulty::Intermediate,
            Difficulty::Expert,
        ] {
            assert!(difficulty.config().validate().is_ok());
        }
        assert_eq!(Difficulty::Expert.config().safe_cells(), 480 - 99);
    }

    #[test]
    fn difficulty_menu_stops_at_ends() {
        assert_eq!(Difficulty::Beginner.previous(), Difficulty::Beginner);
        assert_eq!(Difficulty::Beginner.next(), Difficulty::Intermediate);
        assert_eq!(Difficulty::Expert.next(), Difficulty::Expert);
        assert_eq!(Difficulty::Expert.previous(), Difficulty::Intermediate);
    }

    #[test]
    fn timing_parses_from_json_with_defaults() {
        let timing: TimingConfig = serde_json::from_str(r#"{"ticks_per_second": 50}"#).unwrap();
        assert_eq!(timing, TimingConfig::new_unchecked(50, 9));
        assert_eq!(timing.long_press_ticks(), 25);
        assert_eq!(
            TimingConfig::validated(0, 9),
            Err(GameError::InvalidTiming)
        );
    }

    #[test]
    fn game_config_parses_from_json() {
        let config: GameConfig = serde_json::from_str(r#"{"size": [16, 30], "mines": 99}"#).unwrap();
        assert_eq!(config, Difficulty::Expert.config());
    }

    #[test]
    fn detonation_dominates_merged_outcomes() {
        use ExposeOutcome::*;
        assert_eq!(Exposed | Detonated, Detonated);
        assert_eq!(Inconsistent | Exposed, Inconsistent);
        assert_eq!(NoChange | Exposed, Exposed);
        assert_eq!(NoChange | NoChange, NoChange);
    }
}
