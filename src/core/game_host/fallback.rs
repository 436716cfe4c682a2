//=========================================================================
// Falling Blocks
//=========================================================================
//
// Self-contained placeholder game mounted when a bundle loads but never
// exposes its entry point.
//
// Rules: 20x10 well, seven tetrominoes, gravity every 500 ms, arrows move
// and rotate, space hard-drops, 100 points per cleared line, game over
// when a new piece collides on spawn.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::time::Duration;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

//=== Internal Dependencies ===============================================

use super::handle::{EmbeddedGame, GameHandle, Readiness};
use crate::core::input::{GameInput, KeyCode, ListenerKind};
use crate::core::scheduler::TimerId;

//=== Board ===============================================================

pub const ROWS: usize = 20;
pub const COLS: usize = 10;
pub const POINTS_PER_LINE: u64 = 100;
pub const GRAVITY: Duration = Duration::from_millis(500);

const GRAVITY_TAG: u32 = 1;

type Cells = [(i32, i32); 4];

const PIECES: [Cells; 7] = [
    [(0, 0), (1, 0), (2, 0), (3, 0)], // I
    [(0, 0), (1, 0), (0, 1), (1, 1)], // O
    [(0, 0), (1, 0), (2, 0), (1, 1)], // T
    [(1, 0), (2, 0), (0, 1), (1, 1)], // S
    [(0, 0), (1, 0), (1, 1), (2, 1)], // Z
    [(0, 0), (0, 1), (1, 1), (2, 1)], // J
    [(2, 0), (0, 1), (1, 1), (2, 1)], // L
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Piece {
    cells: Cells,
    row: i32,
    col: i32,
}

impl Piece {
    fn absolute(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.cells.iter().map(move |(x, y)| (self.row + y, self.col + x))
    }

    fn shifted(&self, rows: i32, cols: i32) -> Self {
        Self {
            row: self.row + rows,
            col: self.col + cols,
            ..*self
        }
    }

    /// Quarter turn clockwise, normalised back to non-negative offsets.
    fn rotated(&self) -> Self {
        let mut cells = self.cells.map(|(x, y)| (-y, x));
        let min_x = cells.iter().map(|c| c.0).min().unwrap_or(0);
        let min_y = cells.iter().map(|c| c.1).min().unwrap_or(0);
        for cell in cells.iter_mut() {
            cell.0 -= min_x;
            cell.1 -= min_y;
        }
        Self { cells, ..*self }
    }
}

//=== FallingBlocks =======================================================

/// Placeholder puzzle game.
#[derive(Debug)]
pub struct FallingBlocks {
    grid: [[bool; COLS]; ROWS],
    active: Option<Piece>,
    rng: StdRng,
    score: u64,
    lines: u64,
    over: bool,
    gravity: Option<TimerId>,
}

impl FallingBlocks {
    pub fn new(seed: u64) -> Self {
        Self {
            grid: [[false; COLS]; ROWS],
            active: None,
            rng: StdRng::seed_from_u64(seed),
            score: 0,
            lines: 0,
            over: false,
            gravity: None,
        }
    }

    pub fn lines_cleared(&self) -> u64 {
        self.lines
    }

    pub fn filled_cells(&self) -> usize {
        self.grid.iter().flatten().filter(|cell| **cell).count()
    }

    //--- Rules ------------------------------------------------------------

    fn spawn(&mut self) -> bool {
        let cells = PIECES.choose(&mut self.rng).copied().unwrap_or(PIECES[0]);
        let piece = Piece {
            cells,
            row: 0,
            col: (COLS as i32 - 4) / 2,
        };
        if self.fits(&piece) {
            self.active = Some(piece);
            true
        } else {
            self.active = None;
            self.over = true;
            false
        }
    }

    fn fits(&self, piece: &Piece) -> bool {
        piece.absolute().all(|(row, col)| {
            row >= 0
                && col >= 0
                && (row as usize) < ROWS
                && (col as usize) < COLS
                && !self.grid[row as usize][col as usize]
        })
    }

    fn try_move(&mut self, rows: i32, cols: i32) -> bool {
        let Some(piece) = self.active else {
            return false;
        };
        let moved = piece.shifted(rows, cols);
        if self.fits(&moved) {
            self.active = Some(moved);
            true
        } else {
            false
        }
    }

    fn try_rotate(&mut self) {
        if let Some(piece) = self.active {
            let rotated = piece.rotated();
            if self.fits(&rotated) {
                self.active = Some(rotated);
            }
        }
    }

    /// Moves the piece down one row, locking it when blocked.
    fn step(&mut self) {
        if !self.try_move(1, 0) {
            self.lock();
        }
    }

    fn hard_drop(&mut self) {
        while self.try_move(1, 0) {}
        self.lock();
    }

    fn lock(&mut self) {
        let Some(piece) = self.active.take() else {
            return;
        };
        for (row, col) in piece.absolute() {
            self.grid[row as usize][col as usize] = true;
        }
        self.clear_lines();
        self.spawn();
    }

    fn clear_lines(&mut self) {
        let remaining: Vec<[bool; COLS]> = self
            .grid
            .iter()
            .filter(|row| !row.iter().all(|cell| *cell))
            .copied()
            .collect();
        let cleared = ROWS - remaining.len();
        if cleared == 0 {
            return;
        }

        let mut grid = [[false; COLS]; ROWS];
        grid[cleared..].copy_from_slice(&remaining);
        self.grid = grid;
        self.lines += cleared as u64;
        self.score += cleared as u64 * POINTS_PER_LINE;
    }

    fn draw(&self) -> String {
        let mut out = format!("SCORE {}\n", self.score);
        for (r, row) in self.grid.iter().enumerate() {
            for (c, filled) in row.iter().enumerate() {
                let active = self
                    .active
                    .map(|piece| piece.absolute().any(|cell| cell == (r as i32, c as i32)))
                    .unwrap_or(false);
                out.push(if *filled || active { '#' } else { '.' });
            }
            out.push('\n');
        }
        if self.over {
            out.push_str("GAME OVER\n");
        }
        out
    }

    fn finish(&mut self, handle: &mut GameHandle<'_>) {
        if let Some(gravity) = self.gravity.take() {
            handle.clear_timer(gravity);
        }
    }
}

impl EmbeddedGame for FallingBlocks {
    fn name(&self) -> &str {
        "Falling Blocks"
    }

    fn mount(&mut self, handle: &mut GameHandle<'_>) -> Readiness {
        self.spawn();
        self.gravity = Some(handle.set_interval(GRAVITY, GRAVITY_TAG));
        handle.listen(ListenerKind::KeyDown);
        handle.render(self.draw());
        Readiness::Ready
    }

    fn on_timer(&mut self, tag: u32, handle: &mut GameHandle<'_>) {
        if tag != GRAVITY_TAG || self.over {
            return;
        }
        self.step();
        if self.over {
            self.finish(handle);
        }
        handle.render(self.draw());
    }

    fn on_input(&mut self, input: GameInput, handle: &mut GameHandle<'_>) {
        let GameInput::KeyDown(key) = input else {
            return;
        };
        if self.over {
            return;
        }
        match key {
            KeyCode::ArrowLeft => {
                self.try_move(0, -1);
            }
            KeyCode::ArrowRight => {
                self.try_move(0, 1);
            }
            KeyCode::ArrowDown => self.step(),
            KeyCode::ArrowUp => self.try_rotate(),
            KeyCode::Space => self.hard_drop(),
            _ => return,
        }
        if self.over {
            self.finish(handle);
        }
        handle.render(self.draw());
    }

    fn shutdown(&mut self) {
        self.active = None;
        self.gravity = None;
    }

    fn score(&self) -> u64 {
        self.score
    }

    fn is_over(&self) -> bool {
        self.over
    }
}

//=========================================================================
// Tests
//=========================================================================
