//=========================================================================
// Arcade Titles
//=========================================================================
//
// Games the stock bundles and builtin tiles resolve to.
//
// - `PacmanDemo`: bound to the `PACMAN` entry symbol. Initialises
//   asynchronously, then renders at 30 fps and waits for `N`.
// - `ShooterStub`: builtin tile for titles that only show a lobby.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::time::Duration;

//=== Internal Dependencies ===============================================

use super::handle::{EmbeddedGame, GameHandle, Readiness};
use crate::core::input::{GameInput, KeyCode, ListenerKind};

//=== PacmanDemo ==========================================================

const INIT_TAG: u32 = 1;
const FRAME_TAG: u32 = 2;

/// Delay before the maze finishes initialising.
pub const PACMAN_INIT: Duration = Duration::from_millis(100);

/// 30 frames per second.
pub const PACMAN_FRAME: Duration = Duration::from_millis(33);

const CORRIDOR: usize = 20;
const DOT_POINTS: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PacmanState {
    Booting,
    Attract,
    Playing,
}

/// Single-corridor maze chase.
#[derive(Debug)]
pub struct PacmanDemo {
    state: PacmanState,
    position: usize,
    heading: i32,
    dots: [bool; CORRIDOR],
    score: u64,
    frames: u64,
}

impl PacmanDemo {
    pub fn new() -> Self {
        Self {
            state: PacmanState::Booting,
            position: 0,
            heading: 1,
            dots: [true; CORRIDOR],
            score: 0,
            frames: 0,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.state == PacmanState::Playing
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    fn new_game(&mut self) {
        self.state = PacmanState::Playing;
        self.position = 0;
        self.heading = 1;
        self.dots = [true; CORRIDOR];
        self.dots[0] = false;
        self.score = 0;
    }

    fn advance(&mut self) {
        let next = self.position as i32 + self.heading;
        if !(0..CORRIDOR as i32).contains(&next) {
            self.heading = -self.heading;
            return;
        }
        self.position = next as usize;
        if std::mem::replace(&mut self.dots[self.position], false) {
            self.score += DOT_POINTS;
        }
        if self.dots.iter().all(|dot| !dot) {
            self.dots = [true; CORRIDOR];
        }
    }

    fn draw(&self) -> String {
        match self.state {
            PacmanState::Booting => "LOADING".to_string(),
            PacmanState::Attract => "PRESS N TO START".to_string(),
            PacmanState::Playing => {
                let row: String = (0..CORRIDOR)
                    .map(|cell| match (cell == self.position, self.dots[cell]) {
                        (true, _) => 'C',
                        (false, true) => '.',
                        (false, false) => ' ',
                    })
                    .collect();
                format!("SCORE {}\n{}", self.score, row)
            }
        }
    }
}

impl Default for PacmanDemo {
    fn default() -> Self {
        Self::new()
    }
}

impl EmbeddedGame for PacmanDemo {
    fn name(&self) -> &str {
        "Pac-Man"
    }

    fn mount(&mut self, handle: &mut GameHandle<'_>) -> Readiness {
        handle.listen(ListenerKind::KeyDown);
        handle.set_timeout(PACMAN_INIT, INIT_TAG);
        handle.render(self.draw());
        Readiness::Pending
    }

    fn on_timer(&mut self, tag: u32, handle: &mut GameHandle<'_>) {
        match tag {
            INIT_TAG => {
                self.state = PacmanState::Attract;
                handle.set_interval(PACMAN_FRAME, FRAME_TAG);
                handle.signal_ready();
            }
            FRAME_TAG => {
                self.frames += 1;
                if self.is_playing() {
                    self.advance();
                }
            }
            _ => return,
        }
        handle.render(self.draw());
    }

    fn on_input(&mut self, input: GameInput, handle: &mut GameHandle<'_>) {
        match input {
            GameInput::KeyDown(KeyCode::KeyN) if self.state != PacmanState::Booting => {
                self.new_game()
            }
            GameInput::KeyDown(KeyCode::ArrowLeft) => self.heading = -1,
            GameInput::KeyDown(KeyCode::ArrowRight) => self.heading = 1,
            _ => return,
        }
        handle.render(self.draw());
    }

    fn shutdown(&mut self) {
        self.state = PacmanState::Booting;
    }

    fn score(&self) -> u64 {
        self.score
    }
}

//=== ShooterStub =========================================================

const MATCH_CLOCK_TAG: u32 = 1;

/// Lobby screen for titles streamed from elsewhere.
#[derive(Debug)]
pub struct ShooterStub {
    title: String,
    seconds_in_lobby: u64,
}

impl ShooterStub {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            seconds_in_lobby: 0,
        }
    }

    pub fn seconds_in_lobby(&self) -> u64 {
        self.seconds_in_lobby
    }

    fn draw(&self) -> String {
        format!("{}\nFinding match... {}s", self.title, self.seconds_in_lobby)
    }
}

impl EmbeddedGame for ShooterStub {
    fn name(&self) -> &str {
        &self.title
    }

    fn mount(&mut self, handle: &mut GameHandle<'_>) -> Readiness {
        handle.set_interval(Duration::from_secs(1), MATCH_CLOCK_TAG);
        handle.render(self.draw());
        Readiness::Ready
    }

    fn on_timer(&mut self, tag: u32, handle: &mut GameHandle<'_>) {
        if tag == MATCH_CLOCK_TAG {
            self.seconds_in_lobby += 1;
            handle.render(self.draw());
        }
    }

    fn on_input(&mut self, _input: GameInput, _handle: &mut GameHandle<'_>) {}
}

//=========================================================================
// Tests
//=========================================================================
