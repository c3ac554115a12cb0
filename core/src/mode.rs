use core::mem;

use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

use crate::*;

/// Top-level screen the player is on.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AppMode {
    SelectDifficulty { selected: Difficulty },
    Game,
    ResetButtonFocused,
    /// Round lost; rows below `disclosed_rows` have had their mines drawn.
    Dead { disclosed_rows: Coord },
    /// Round won; rows below `disclosed_rows` have had their mines flagged.
    Win { disclosed_rows: Coord },
}

impl Default for AppMode {
    fn default() -> Self {
        Self::SelectDifficulty {
            selected: Difficulty::default(),
        }
    }
}

/// Everything a round needs besides the current mode.
#[derive(Clone, Debug)]
pub struct GameContext<R> {
    difficulty: Difficulty,
    board: Board,
    fill: FloodFill,
    selection: Coord2,
    suppress_expose: bool,
    clock: Clock,
    rng: R,
}

impl<R: Rng> GameContext<R> {
    pub fn new(timing: TimingConfig, rng: R) -> Self {
        Self::with_board(Board::new(Difficulty::default().config()), timing, rng)
    }

    /// Context that plays on an already laid out `board`.
    pub fn with_board(board: Board, timing: TimingConfig, rng: R) -> Self {
        Self {
            difficulty: Difficulty::default(),
            board,
            fill: FloodFill::new(),
            selection: (0, 0),
            suppress_expose: false,
            clock: Clock::new(timing),
            rng,
        }
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn fill(&self) -> &FloodFill {
        &self.fill
    }

    pub fn selection(&self) -> Coord2 {
        self.selection
    }

    /// Starts a new round at the last chosen difficulty.
    pub fn start(&mut self, difficulty: Difficulty, surface: &mut impl Surface) {
        self.difficulty = difficulty;
        self.new_round(difficulty.config(), surface);
        self.selection = (0, 0);
        surface.place_cursor(Cursor::Cell(self.selection));
    }

    /// New random layout with the current board's dimensions and mine count.
    pub fn reset(&mut self, surface: &mut impl Surface) {
        self.new_round(self.board.config(), surface);
    }

    fn new_round(&mut self, config: GameConfig, surface: &mut impl Surface) {
        self.board.reset(config, &mut self.rng);
        self.fill.abandon();
        self.clock.restart();
        self.suppress_expose = false;

        surface.draw_board(self.board.size());
        surface.render_face(Face::Happy);
        surface.render_score(self.board.score());
        surface.render_time(self.board.timer());
    }

    fn tick_clock(&mut self, surface: &mut impl Surface) {
        if self.board.time_running() && self.clock.tick() {
            let seconds = self.board.tick_second();
            surface.render_time(seconds);
        }
    }

    fn lose(&mut self, surface: &mut impl Surface) -> AppMode {
        log::debug!(
            "round lost with {} safe cells hidden after {}s",
            self.board.hidden_clear(),
            self.board.timer()
        );
        self.board.set_time_running(false);
        surface.render_face(Face::Dead);
        AppMode::Dead { disclosed_rows: 0 }
    }

    fn win(&mut self, surface: &mut impl Surface) -> AppMode {
        log::debug!("round won after {}s", self.board.timer());
        self.board.set_time_running(false);
        self.fill.abandon();
        surface.render_face(Face::Win);
        AppMode::Win { disclosed_rows: 0 }
    }
}

impl AppMode {
    /// Runs one tick of the current mode and returns the mode for the next one.
    pub fn on_vsync<R: Rng>(
        self,
        fire: FireEvent,
        moves: Buttons,
        ctx: &mut GameContext<R>,
        surface: &mut impl Surface,
    ) -> AppMode {
        use AppMode::*;
        match self {
            SelectDifficulty { selected } => select_difficulty(selected, fire, moves, ctx, surface),
            Game => play(fire, moves, ctx, surface),
            ResetButtonFocused => reset_button_focused(fire, moves, ctx, surface),
            Dead { disclosed_rows } => round_over(false, disclosed_rows, fire, ctx, surface),
            Win { disclosed_rows } => round_over(true, disclosed_rows, fire, ctx, surface),
        }
    }

    pub fn is_round_over(self) -> bool {
        matches!(self, Self::Dead { .. } | Self::Win { .. })
    }
}

fn select_difficulty<R: Rng>(
    selected: Difficulty,
    fire: FireEvent,
    moves: Buttons,
    ctx: &mut GameContext<R>,
    surface: &mut impl Surface,
) -> AppMode {
    if fire == FireEvent::Release {
        log::debug!("starting {:?} round", selected);
        ctx.start(selected, surface);
        return AppMode::Game;
    }

    let selected = if moves.contains(Buttons::UP) {
        selected.previous()
    } else if moves.contains(Buttons::DOWN) {
        selected.next()
    } else {
        selected
    };
    surface.render_menu(selected);
    AppMode::SelectDifficulty { selected }
}

fn play<R: Rng>(
    fire: FireEvent,
    moves: Buttons,
    ctx: &mut GameContext<R>,
    surface: &mut impl Surface,
) -> AppMode {
    if ctx.fill.is_filling() && ctx.fill.step(&mut ctx.board, surface).is_detonated() {
        return ctx.lose(surface);
    }

    let selection = ctx.selection;
    match fire {
        FireEvent::Release => {
            if ctx.suppress_expose || ctx.fill.is_filling() {
                ctx.suppress_expose = false;
            } else if ctx
                .fill
                .expose_recurse(&mut ctx.board, selection, surface)
                .is_detonated()
            {
                return ctx.lose(surface);
            }
            surface.render_face(Face::Happy);
            ctx.board.set_time_running(true);
        }
        FireEvent::LongPress if !ctx.board.is_exposed(selection) => {
            if ctx.board.toggle_flag(selection) {
                surface.play(SoundEffect::Flag);
                surface.render_cell(Tile::Flag, selection);
            } else {
                // the release that ends this press must not expose the cell
                ctx.suppress_expose = true;
                surface.render_cell(Tile::Hidden, selection);
            }
        }
        FireEvent::Press => {
            surface.play(SoundEffect::Expose);
            surface.render_face(Face::Caution);
        }
        _ => {}
    }

    if !moves.is_empty() {
        surface.play(SoundEffect::Move);
    }

    let (rows, cols) = ctx.board.size();
    let (mut row, mut col) = selection;
    let to_reset_button = (moves.contains(Buttons::UP) && row == 0)
        || (moves.contains(Buttons::DOWN) && row + 1 == rows);

    if !to_reset_button {
        if moves.contains(Buttons::UP) {
            row -= 1;
        }
        if moves.contains(Buttons::DOWN) {
            row += 1;
        }
        if moves.contains(Buttons::LEFT) {
            col = if col == 0 { cols - 1 } else { col - 1 };
        }
        if moves.contains(Buttons::RIGHT) {
            col = if col + 1 == cols { 0 } else { col + 1 };
        }
        ctx.selection = (row, col);
    }

    surface.render_score(ctx.board.score());

    if ctx.board.is_cleared() {
        return ctx.win(surface);
    }

    if to_reset_button {
        surface.place_cursor(Cursor::ResetButton);
        AppMode::ResetButtonFocused
    } else {
        surface.place_cursor(Cursor::Cell(ctx.selection));
        AppMode::Game
    }
}

fn reset_button_focused<R: Rng>(
    fire: FireEvent,
    moves: Buttons,
    ctx: &mut GameContext<R>,
    surface: &mut impl Surface,
) -> AppMode {
    let (rows, _) = ctx.board.size();
    let col = ctx.selection.1;

    match fire {
        FireEvent::Release => {
            ctx.reset(surface);
            return back_to_board(ctx, (0, col), surface);
        }
        FireEvent::Press => surface.render_face(Face::Caution),
        _ => {}
    }

    if moves.contains(Buttons::DOWN) {
        surface.play(SoundEffect::Move);
        return back_to_board(ctx, (0, col), surface);
    }
    if moves.contains(Buttons::UP) {
        surface.play(SoundEffect::Move);
        return back_to_board(ctx, (rows - 1, col), surface);
    }

    surface.place_cursor(Cursor::ResetButton);
    AppMode::ResetButtonFocused
}

fn back_to_board<R: Rng>(
    ctx: &mut GameContext<R>,
    selection: Coord2,
    surface: &mut impl Surface,
) -> AppMode {
    ctx.selection = selection;
    surface.place_cursor(Cursor::Cell(selection));
    AppMode::Game
}

fn round_over<R: Rng>(
    won: bool,
    disclosed_rows: Coord,
    fire: FireEvent,
    ctx: &mut GameContext<R>,
    surface: &mut impl Surface,
) -> AppMode {
    if fire == FireEvent::Release {
        let selected = ctx.difficulty;
        surface.render_menu(selected);
        return AppMode::SelectDifficulty { selected };
    }

    surface.render_face(if won { Face::Win } else { Face::Dead });
    surface.place_cursor(Cursor::ResetButton);

    // one row per tick keeps the frame budget
    let mut disclosed_rows = disclosed_rows;
    if disclosed_rows < ctx.board.size().0 {
        ctx.board.disclose_row(disclosed_rows, won, surface);
        disclosed_rows += 1;
    }

    if won {
        AppMode::Win { disclosed_rows }
    } else {
        AppMode::Dead { disclosed_rows }
    }
}

/// The whole game driven one vertical-sync tick at a time.
#[derive(Clone, Debug)]
pub struct Machine<R> {
    mode: AppMode,
    context: GameContext<R>,
    fire_filter: FireButtonFilter,
    direction_filter: DirectionFilter,
}

impl<R: Rng> Machine<R> {
    /// Machine showing the difficulty menu.
    pub fn new(timing: TimingConfig, rng: R) -> Self {
        Self::with_context(AppMode::default(), GameContext::new(timing, rng), timing)
    }

    /// Machine resuming `mode` over an existing context.
    pub fn with_context(mode: AppMode, context: GameContext<R>, timing: TimingConfig) -> Self {
        Self {
            mode,
            context,
            fire_filter: FireButtonFilter::new(timing),
            direction_filter: DirectionFilter::new(timing),
        }
    }

    pub fn mode(&self) -> AppMode {
        self.mode
    }

    pub fn context(&self) -> &GameContext<R> {
        &self.context
    }

    /// Draws the screen of the current mode from scratch.
    pub fn power_on(&mut self, surface: &mut impl Surface) {
        let board = &self.context.board;
        match self.mode {
            AppMode::SelectDifficulty { selected } => surface.render_menu(selected),
            _ => {
                surface.draw_board(board.size());
                surface.render_face(Face::Happy);
                surface.render_score(board.score());
                surface.render_time(board.timer());
                surface.place_cursor(Cursor::Cell(self.context.selection));
            }
        }
    }

    /// Feeds one raw input sample and advances everything by one tick.
    pub fn on_vsync(&mut self, input: Buttons, surface: &mut impl Surface) -> AppMode {
        // extra entropy from how long the player takes
        self.context.rng.next_u32();

        let fire = self.fire_filter.filter(input);
        let moves = self.direction_filter.filter(input);

        let next = self.mode.on_vsync(fire, moves, &mut self.context, surface);
        if mem::discriminant(&next) != mem::discriminant(&self.mode) {
            log::debug!("mode {:?} -> {:?}", self.mode, next);
        }
        self.mode = next;

        self.context.tick_clock(surface);
        next
    }
}
