use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::*;

/// Largest value the three-digit counters can show.
pub const DISPLAY_MAX: u16 = 999;

/// Selects one of the three board bit matrices.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BitKind {
    Mine,
    Exposed,
    Flag,
}

/// Mines, exposed cells and flags for one round, plus the counters derived from them.
///
/// Invariants kept by the mutators:
/// - `hidden_clear` is the number of safe cells whose exposed bit is clear.
/// - `mines_left` is the number of mines minus the number of flagged cells.
#[derive(Clone, Debug, PartialEq)]
pub struct Board {
    config: GameConfig,
    mine_bits: BitMatrix,
    exposed_bits: BitMatrix,
    flag_bits: BitMatrix,
    mines_left: i16,
    hidden_clear: CellCount,
    timer: u16,
    time_running: bool,
    triggered_mine: Option<Coord2>,
}

impl Board {
    /// Empty board for `config`, no mines placed yet. Out-of-range configs are clamped.
    pub fn new(config: GameConfig) -> Self {
        let config = match config.validate() {
            Ok(()) => config,
            Err(_) => GameConfig::new(config.size, config.mines),
        };
        let mut board = Self {
            config,
            mine_bits: BitMatrix::new(),
            exposed_bits: BitMatrix::new(),
            flag_bits: BitMatrix::new(),
            mines_left: 0,
            hidden_clear: 0,
            timer: 0,
            time_running: false,
            triggered_mine: None,
        };
        board.recount();
        board
    }

    /// Board with mines at exactly `mine_coords`, for fixed layouts.
    pub fn from_mine_coords(size: Coord2, mine_coords: &[Coord2]) -> Result<Self> {
        let mut config = GameConfig::validated(size, 0)?;
        let mut mine_bits = BitMatrix::new();

        for &coords in mine_coords {
            if !in_bounds(coords, size) {
                return Err(GameError::InvalidCoords);
            }
            mine_bits.set(coords, true);
        }
        config.mines = mine_bits.count_ones();

        let mut board = Self::new(config);
        board.config = config;
        board.mine_bits = mine_bits;
        board.recount();
        Ok(board)
    }

    /// Clears everything and lays out a fresh random minefield for `config`.
    pub fn reset<R: Rng + ?Sized>(&mut self, config: GameConfig, rng: &mut R) {
        let config = GameConfig::new(config.size, config.mines);
        *self = Self::new(config);
        self.place_mines(config.mines, rng);
        log::debug!(
            "board reset to {:?} with {} mines, {} safe cells",
            self.config.size,
            self.mine_count(),
            self.hidden_clear
        );
    }

    /// Adds `count` mines on distinct free cells by rejection sampling.
    pub fn place_mines<R: Rng + ?Sized>(&mut self, count: CellCount, rng: &mut R) {
        let (rows, cols) = self.config.size;
        let free_cells = self.config.total_cells() - self.mine_bits.count_ones();

        // optimize for full boards
        if count >= free_cells {
            if count > free_cells {
                log::warn!(
                    "Minefield already full, requested {} but only fits {}",
                    count,
                    free_cells
                );
            }
            for row in 0..rows {
                for col in 0..cols {
                    self.mine_bits.set((row, col), true);
                }
            }
            self.recount();
            return;
        }

        let mut remaining = count;
        while remaining > 0 {
            let coords = (rng.random_range(0..rows), rng.random_range(0..cols));
            if !self.mine_bits.test(coords) {
                self.mine_bits.set(coords, true);
                remaining -= 1;
            }
        }
        self.recount();
    }

    pub fn config(&self) -> GameConfig {
        self.config
    }

    pub fn size(&self) -> Coord2 {
        self.config.size
    }

    pub fn mine_count(&self) -> CellCount {
        self.config.mines
    }

    pub fn bits(&self, kind: BitKind) -> &BitMatrix {
        match kind {
            BitKind::Mine => &self.mine_bits,
            BitKind::Exposed => &self.exposed_bits,
            BitKind::Flag => &self.flag_bits,
        }
    }

    pub fn test(&self, kind: BitKind, coords: Coord2) -> bool {
        self.bits(kind).test(coords)
    }

    /// Raw bit write. Counters are not adjusted; gameplay goes through [`Board::toggle_flag`]
    /// and [`Board::mark_exposed_if_new`].
    pub fn set(&mut self, kind: BitKind, coords: Coord2, value: bool) -> bool {
        let bits = match kind {
            BitKind::Mine => &mut self.mine_bits,
            BitKind::Exposed => &mut self.exposed_bits,
            BitKind::Flag => &mut self.flag_bits,
        };
        bits.set(coords, value)
    }

    pub fn has_mine(&self, coords: Coord2) -> bool {
        self.mine_bits.test(coords)
    }

    pub fn is_exposed(&self, coords: Coord2) -> bool {
        self.exposed_bits.test(coords)
    }

    pub fn is_flagged(&self, coords: Coord2) -> bool {
        self.flag_bits.test(coords)
    }

    pub fn mines_around(&self, coords: Coord2) -> u8 {
        count_around(&self.mine_bits, coords, self.config.size)
    }

    pub fn flags_around(&self, coords: Coord2) -> u8 {
        count_around(&self.flag_bits, coords, self.config.size)
    }

    /// Flips the flag on `coords`, returning `true` when a flag was planted.
    pub fn toggle_flag(&mut self, coords: Coord2) -> bool {
        let planting = !self.flag_bits.test(coords);
        self.mines_left += if planting { -1 } else { 1 };
        self.flag_bits.set(coords, planting)
    }

    /// Sets the exposed bit, returning whether it was already set.
    pub fn mark_exposed_if_new(&mut self, coords: Coord2) -> bool {
        if self.exposed_bits.test(coords) {
            return true;
        }

        self.exposed_bits.set(coords, true);
        if !self.mine_bits.test(coords) {
            self.hidden_clear -= 1;
        }
        false
    }

    /// Records the mine that ended the round and stops the clock.
    pub fn detonate(&mut self, coords: Coord2) {
        self.triggered_mine = Some(coords);
        self.time_running = false;
    }

    pub fn triggered_mine(&self) -> Option<Coord2> {
        self.triggered_mine
    }

    /// Mines minus flags; negative when the player over-flags.
    pub fn mines_left(&self) -> i16 {
        self.mines_left
    }

    /// Score as the three-digit display shows it.
    pub fn score(&self) -> u16 {
        self.mines_left.clamp(0, DISPLAY_MAX as i16) as u16
    }

    /// Safe cells still hidden. Zero means the round is won.
    pub fn hidden_clear(&self) -> CellCount {
        self.hidden_clear
    }

    pub fn is_cleared(&self) -> bool {
        self.hidden_clear == 0
    }

    pub fn timer(&self) -> u16 {
        self.timer
    }

    pub fn time_running(&self) -> bool {
        self.time_running
    }

    pub fn set_time_running(&mut self, running: bool) {
        self.time_running = running;
    }

    /// Advances the timer by one second, saturating at the display limit.
    pub fn tick_second(&mut self) -> u16 {
        self.timer = (self.timer + 1).min(DISPLAY_MAX);
        self.timer
    }

    /// Draws the end-of-round state of one row.
    ///
    /// On a loss unflagged mines appear and flags on safe cells are marked wrong. On a win the
    /// remaining mines get flagged.
    pub fn disclose_row(&self, row: Coord, won: bool, surface: &mut impl Surface) {
        for col in 0..self.config.size.1 {
            let coords = (row, col);
            let mine = self.has_mine(coords);
            let flagged = self.is_flagged(coords);
            match (mine, flagged, won) {
                (true, false, true) => surface.render_cell(Tile::Flag, coords),
                (true, false, false) if self.triggered_mine != Some(coords) => {
                    surface.render_cell(Tile::Mine, coords)
                }
                (false, true, false) => surface.render_cell(Tile::IncorrectFlag, coords),
                _ => {}
            }
        }
    }

    fn recount(&mut self) {
        let mines = self.mine_bits.count_ones();
        let flags = self.flag_bits.count_ones();
        let mut exposed_safe = 0;
        let (rows, cols) = self.config.size;
        for row in 0..rows {
            for col in 0..cols {
                let coords = (row, col);
                if self.exposed_bits.test(coords) && !self.mine_bits.test(coords) {
                    exposed_safe += 1;
                }
            }
        }

        self.config.mines = mines;
        self.mines_left = mines as i16 - flags as i16;
        self.hidden_clear = self.config.total_cells() - mines - exposed_safe;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::testing::*;
    use rand::{SeedableRng, rngs::SmallRng};

    fn board(size: Coord2, mines: &[Coord2]) -> Board {
        Board::from_mine_coords(size, mines).unwrap()
    }

    #[test]
    fn reset_places_exact_mine_count() {
        let mut rng = SmallRng::seed_from_u64(7);
        let mut board = Board::new(Difficulty::Expert.config());
        board.reset(Difficulty::Expert.config(), &mut rng);

        assert_eq!(board.bits(BitKind::Mine).count_ones(), 99);
        assert_eq!(board.mine_count(), 99);
        assert_eq!(board.hidden_clear(), 16 * 30 - 99);
        assert_eq!(board.mines_left(), 99);
        assert_eq!(board.timer(), 0);
        assert!(!board.time_running());
    }

    #[test]
    fn mines_stay_inside_active_grid() {
        let mut rng = SmallRng::seed_from_u64(1);
        let mut board = Board::new(Difficulty::Beginner.config());
        board.reset(Difficulty::Beginner.config(), &mut rng);

        for row in 0..ROWS_MAX {
            for col in 0..COLUMNS_MAX {
                if board.has_mine((row, col)) {
                    assert!(in_bounds((row, col), (9, 9)));
                }
            }
        }
    }

    #[test]
    fn full_board_places_every_mine() {
        let mut rng = SmallRng::seed_from_u64(3);
        let mut board = Board::new(GameConfig::new((3, 3), 9));
        board.reset(GameConfig::new((3, 3), 9), &mut rng);

        assert_eq!(board.mine_count(), 9);
        assert_eq!(board.hidden_clear(), 0);
    }

    #[test]
    fn reset_clears_previous_round() {
        let mut rng = SmallRng::seed_from_u64(11);
        let mut board = board((9, 9), &[(0, 0)]);
        board.toggle_flag((0, 0));
        board.mark_exposed_if_new((5, 5));
        board.set_time_running(true);
        board.tick_second();

        board.reset(Difficulty::Beginner.config(), &mut rng);

        assert_eq!(board.bits(BitKind::Flag).count_ones(), 0);
        assert_eq!(board.bits(BitKind::Exposed).count_ones(), 0);
        assert_eq!(board.hidden_clear(), 71);
        assert_eq!(board.timer(), 0);
        assert!(!board.time_running());
    }

    #[test]
    fn from_mine_coords_rejects_outside_cells() {
        assert_eq!(
            Board::from_mine_coords((3, 3), &[(3, 0)]),
            Err(GameError::InvalidCoords)
        );
        assert_eq!(
            Board::from_mine_coords((0, 3), &[]),
            Err(GameError::InvalidBoardSize)
        );
    }

    #[test]
    fn raw_set_and_test_leave_counters_alone() {
        let mut board = board((3, 3), &[(1, 1)]);

        assert!(!board.test(BitKind::Exposed, (0, 0)));
        assert!(board.set(BitKind::Exposed, (0, 0), true));
        assert!(board.test(BitKind::Exposed, (0, 0)));
        assert!(board.is_exposed((0, 0)));
        assert_eq!(board.hidden_clear(), 8);

        board.set(BitKind::Flag, (2, 2), true);
        assert!(board.test(BitKind::Flag, (2, 2)));
        assert_eq!(board.mines_left(), 1);

        assert!(board.test(BitKind::Mine, (1, 1)));
        assert!(!board.set(BitKind::Exposed, (0, 0), false));
        assert!(!board.test(BitKind::Exposed, (0, 0)));
    }

    #[test]
    fn empty_fixture_keeps_zero_mines() {
        let board = board((2, 2), &[]);
        assert_eq!(board.mine_count(), 0);
        assert_eq!(board.config(), GameConfig::new_unchecked((2, 2), 0));
        assert_eq!(board.hidden_clear(), 4);
    }

    #[test]
    fn toggle_flag_twice_restores_state() {
        let mut board = board((3, 3), &[(1, 1)]);
        let before_bits = *board.bits(BitKind::Flag);

        assert!(board.toggle_flag((0, 2)));
        assert_eq!(board.mines_left(), 0);
        assert!(board.is_flagged((0, 2)));

        assert!(!board.toggle_flag((0, 2)));
        assert_eq!(board.mines_left(), 1);
        assert_eq!(*board.bits(BitKind::Flag), before_bits);
    }

    #[test]
    fn over_flagging_goes_negative_but_score_clamps() {
        let mut board = board((3, 3), &[(1, 1)]);
        board.toggle_flag((0, 0));
        board.toggle_flag((0, 1));

        assert_eq!(board.mines_left(), -1);
        assert_eq!(board.score(), 0);
    }

    #[test]
    fn mark_exposed_is_idempotent() {
        let mut board = board((3, 3), &[(1, 1)]);
        assert_eq!(board.hidden_clear(), 8);

        assert!(!board.mark_exposed_if_new((0, 0)));
        assert_eq!(board.hidden_clear(), 7);

        assert!(board.mark_exposed_if_new((0, 0)));
        assert_eq!(board.hidden_clear(), 7);
    }

    #[test]
    fn adjacency_counts_mines_and_flags() {
        let mut board = board((3, 3), &[(0, 0), (2, 2)]);
        board.toggle_flag((0, 0));

        assert_eq!(board.mines_around((1, 1)), 2);
        assert_eq!(board.flags_around((1, 1)), 1);
        assert_eq!(board.mines_around((0, 2)), 0);
    }

    #[test]
    fn timer_saturates_at_display_limit() {
        let mut board = board((3, 3), &[(0, 0)]);
        for _ in 0..1200 {
            board.tick_second();
        }
        assert_eq!(board.timer(), DISPLAY_MAX);
    }

    #[test]
    fn disclose_row_marks_mines_and_wrong_flags_on_loss() {
        let mut board = board((2, 4), &[(0, 0), (0, 2), (0, 3)]);
        board.toggle_flag((0, 1));
        board.toggle_flag((0, 2));
        board.detonate((0, 3));
        let mut surface = Recorder::default();

        board.disclose_row(0, false, &mut surface);

        assert_eq!(
            surface.ops,
            [
                Op::Cell(Tile::Mine, (0, 0)),
                Op::Cell(Tile::IncorrectFlag, (0, 1)),
            ]
        );
        assert_eq!(board.triggered_mine(), Some((0, 3)));
    }

    #[test]
    fn disclose_row_flags_remaining_mines_on_win() {
        let board = board((1, 3), &[(0, 1)]);
        let mut surface = Recorder::default();

        board.disclose_row(0, true, &mut surface);

        assert_eq!(surface.ops, [Op::Cell(Tile::Flag, (0, 1))]);
    }
}
