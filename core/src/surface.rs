use serde::{Deserialize, Serialize};

use crate::*;

/// Where the selection cursor sits.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cursor {
    Cell(Coord2),
    ResetButton,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SoundEffect {
    /// Action button went down on the board.
    Expose,
    /// A flag was planted.
    Flag,
    /// The cursor moved.
    Move,
}

/// Passive drawing and audio collaborator.
///
/// Every call is fire-and-forget: the engine never reads anything back, and implementations are
/// free to queue the work until the next vertical blank.
pub trait Surface {
    /// Clears the play area and draws a fully hidden board of `size`.
    fn draw_board(&mut self, size: Coord2);

    fn render_cell(&mut self, tile: Tile, coords: Coord2);

    /// Draws an exposed cell showing `count` adjacent mines.
    fn render_count(&mut self, count: u8, coords: Coord2);

    fn render_face(&mut self, face: Face);

    /// Mines left to flag, already clamped for a three-digit display.
    fn render_score(&mut self, mines_left: u16);

    fn render_time(&mut self, seconds: u16);

    fn place_cursor(&mut self, cursor: Cursor);

    /// Draws the difficulty menu with `selected` highlighted.
    fn render_menu(&mut self, selected: Difficulty);

    fn play(&mut self, _effect: SoundEffect) {}
}

/// Headless surface that drops every call.
impl Surface for () {
    fn draw_board(&mut self, _size: Coord2) {}
    fn render_cell(&mut self, _tile: Tile, _coords: Coord2) {}
    fn render_count(&mut self, _count: u8, _coords: Coord2) {}
    fn render_face(&mut self, _face: Face) {}
    fn render_score(&mut self, _mines_left: u16) {}
    fn render_time(&mut self, _seconds: u16) {}
    fn place_cursor(&mut self, _cursor: Cursor) {}
    fn render_menu(&mut self, _selected: Difficulty) {}
}
