use crate::*;

/// Continuation of the auto-reveal.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FillState {
    /// Nothing left to reveal.
    Idle,
    /// Queued cells remain; `last_revealed` is the cell that fanned out most recently.
    Filling { last_revealed: Coord2 },
}

/// Incremental flood fill that exposes at most one new cell per [`FloodFill::step`].
///
/// Seeds go to the back of the queue and are popped last-in first-out; neighbors found while
/// filling are pushed to the front, so they wait behind everything already queued. A cell is
/// never queued twice at the same time, which bounds the queue by the number of cells.
#[derive(Clone, Debug)]
pub struct FloodFill {
    state: FillState,
    queue: ExposeQueue,
    pending: BitMatrix,
}

impl FloodFill {
    pub const fn new() -> Self {
        Self {
            state: FillState::Idle,
            queue: ExposeQueue::new(),
            pending: BitMatrix::new(),
        }
    }

    pub fn state(&self) -> FillState {
        self.state
    }

    pub fn is_filling(&self) -> bool {
        matches!(self.state, FillState::Filling { .. })
    }

    /// Cells still waiting, from the one popped last to the one popped next.
    pub fn pending_cells(&self) -> impl Iterator<Item = Coord2> + '_ {
        self.queue.iter()
    }

    /// Drops any work in flight. Cells already exposed stay exposed.
    pub fn abandon(&mut self) {
        self.state = FillState::Idle;
        self.queue.clear();
        self.pending.clear();
    }

    /// Exposes `coords` right away, as the player's expose action does.
    ///
    /// A zero cell, or an exposed cell whose flags match its mines (a chord), seeds the queue and
    /// leaves the engine filling; the remaining work happens in later [`FloodFill::step`] calls.
    pub fn expose_recurse(
        &mut self,
        board: &mut Board,
        coords: Coord2,
        surface: &mut impl Surface,
    ) -> ExposeOutcome {
        use ExposeOutcome::*;

        let flagged = board.is_flagged(coords);
        if board.has_mine(coords) && !flagged {
            self.detonate(board, coords, surface);
            return Detonated;
        }

        if flagged {
            return NoChange;
        }

        let already_exposed = board.mark_exposed_if_new(coords);
        let mine_count = board.mines_around(coords);
        let flag_count = board.flags_around(coords);
        surface.render_count(mine_count, coords);
        log::debug!(
            "expose {:?}: {} mines, {} flags around (already exposed: {})",
            coords,
            mine_count,
            flag_count,
            already_exposed
        );

        if flag_count > mine_count {
            return Self::disclose_wrong_flags_around(board, coords, surface);
        }

        if mine_count == 0 || (already_exposed && flag_count == mine_count) {
            self.seed(board, coords);
        }

        if already_exposed && !self.is_filling() {
            NoChange
        } else {
            Exposed
        }
    }

    /// Advances the fill until one more cell is exposed or the queue runs dry.
    pub fn step(&mut self, board: &mut Board, surface: &mut impl Surface) -> ExposeOutcome {
        use ExposeOutcome::*;

        let FillState::Filling { mut last_revealed } = self.state else {
            return NoChange;
        };

        let mut outcome = NoChange;
        while let Some(coords) = self.queue.pop_back() {
            self.pending.set(coords, false);

            if board.is_exposed(coords) {
                continue;
            }

            let flagged = board.is_flagged(coords);
            if board.has_mine(coords) && !flagged {
                self.detonate(board, coords, surface);
                return Detonated;
            }

            if flagged {
                if !board.has_mine(coords) {
                    log::warn!("flood fill reached wrong flag at {:?}", coords);
                    surface.render_cell(Tile::IncorrectFlag, coords);
                    outcome = outcome | Inconsistent;
                }
                continue;
            }

            board.mark_exposed_if_new(coords);
            let mine_count = board.mines_around(coords);
            surface.render_count(mine_count, coords);
            outcome = outcome | Exposed;
            log::trace!(
                "flood exposed {:?}, mine count: {}, {} queued",
                coords,
                mine_count,
                self.queue.len()
            );

            if board.flags_around(coords) > mine_count {
                outcome = outcome | Self::disclose_wrong_flags_around(board, coords, surface);
            } else if mine_count == 0 {
                for neighbor in NeighborIter::new(coords, board.size()) {
                    if neighbor != last_revealed && !board.is_exposed(neighbor) {
                        self.enqueue(neighbor, true);
                    }
                }
                last_revealed = coords;
            }

            // one newly exposed cell per tick
            break;
        }

        self.state = if self.queue.is_empty() {
            log::debug!("flood fill finished");
            FillState::Idle
        } else {
            FillState::Filling { last_revealed }
        };
        outcome
    }

    fn seed(&mut self, board: &Board, coords: Coord2) {
        self.abandon();
        for neighbor in NeighborIter::new(coords, board.size()) {
            if !board.is_exposed(neighbor) {
                self.enqueue(neighbor, false);
            }
        }

        if !self.queue.is_empty() {
            log::debug!(
                "flood fill seeded from {:?} with {} cells",
                coords,
                self.queue.len()
            );
            self.state = FillState::Filling {
                last_revealed: coords,
            };
        }
    }

    fn enqueue(&mut self, coords: Coord2, front: bool) {
        if self.pending.test(coords) {
            return;
        }

        let pushed = if front {
            self.queue.push_front(coords)
        } else {
            self.queue.push_back(coords)
        };
        if pushed {
            self.pending.set(coords, true);
        } else {
            log::error!("expose queue overflow, dropped {:?}", coords);
            debug_assert!(pushed, "expose queue sized below the number of cells");
        }
    }

    fn detonate(&mut self, board: &mut Board, coords: Coord2, surface: &mut impl Surface) {
        log::debug!("mine detonated at {:?}", coords);
        surface.render_cell(Tile::Exploded, coords);
        board.detonate(coords);
        self.abandon();
    }

    /// Marks flags on safe neighbors of an over-flagged cell. A hint only, the round goes on.
    fn disclose_wrong_flags_around(
        board: &Board,
        coords: Coord2,
        surface: &mut impl Surface,
    ) -> ExposeOutcome {
        log::warn!("more flags than mines around {:?}", coords);
        for neighbor in NeighborIter::new(coords, board.size()) {
            if board.is_flagged(neighbor) && !board.has_mine(neighbor) {
                surface.render_cell(Tile::IncorrectFlag, neighbor);
            }
        }
        ExposeOutcome::Inconsistent
    }
}

impl Default for FloodFill {
    fn default() -> Self {
        Self::new()
    }
}
