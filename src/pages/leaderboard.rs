//=========================================================================
// Leaderboard Page
//=========================================================================
//
// High-score kiosk with a per-game filter. Scores are the kiosk's own
// table; live rankings come from the game session API.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::any::Any;
use std::time::Duration;

use log::debug;

//=== Internal Dependencies ===============================================

use super::Route;
use crate::core::event_bridge::CafeEvent;
use crate::core::globals::GlobalContext;
use crate::core::page::Page;

//=== LeaderboardEntry ====================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaderboardEntry {
    pub rank: u32,
    pub username: &'static str,
    pub score: u64,
    pub game: &'static str,
    pub date: &'static str,
}

const fn entry(
    rank: u32,
    username: &'static str,
    score: u64,
    game: &'static str,
    date: &'static str,
) -> LeaderboardEntry {
    LeaderboardEntry {
        rank,
        username,
        score,
        game,
        date,
    }
}

static KIOSK_SCORES: [LeaderboardEntry; 20] = [
    entry(1, "CyberNinja_99", 158_420, "Tetris", "2024-01-15"),
    entry(2, "RetroGamer_X", 145_680, "Tetris", "2024-01-14"),
    entry(3, "PixelMaster", 142_350, "Tetris", "2024-01-13"),
    entry(4, "GameLord_2000", 138_920, "Tetris", "2024-01-12"),
    entry(5, "ArcadeKing", 135_640, "Tetris", "2024-01-11"),
    entry(1, "PacMan_Pro", 98_750, "Pac-Man", "2024-01-15"),
    entry(2, "GhostHunter", 92_340, "Pac-Man", "2024-01-14"),
    entry(3, "MazeRunner", 89_760, "Pac-Man", "2024-01-13"),
    entry(4, "DotCollector", 86_540, "Pac-Man", "2024-01-12"),
    entry(5, "PowerPellet", 82_340, "Pac-Man", "2024-01-11"),
    entry(1, "Valorant_Elite", 45_680, "Valorant", "2024-01-15"),
    entry(2, "ShooterPro", 42_350, "Valorant", "2024-01-14"),
    entry(3, "FPS_Master", 40_120, "Valorant", "2024-01-13"),
    entry(4, "HeadshotKing", 38_790, "Valorant", "2024-01-12"),
    entry(5, "SniperElite", 36_540, "Valorant", "2024-01-11"),
    entry(1, "CS2_Champion", 78_920, "CS2", "2024-01-15"),
    entry(2, "CounterStrike", 74_560, "CS2", "2024-01-14"),
    entry(3, "TerroristHunter", 71_230, "CS2", "2024-01-13"),
    entry(4, "BombDefuser", 68_940, "CS2", "2024-01-12"),
    entry(5, "CT_Elite", 65_670, "CS2", "2024-01-11"),
];

//=== LeaderboardPage =====================================================

#[derive(Debug, Default)]
pub struct LeaderboardPage {
    /// `None` shows every game.
    filter: Option<String>,
}

impl LeaderboardPage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(&self) -> Option<&str> {
        self.filter.as_deref()
    }

    /// Games offered by the filter buttons, in table order.
    pub fn games(&self) -> Vec<&'static str> {
        let mut games: Vec<&'static str> = Vec::new();
        for row in &KIOSK_SCORES {
            if !games.contains(&row.game) {
                games.push(row.game);
            }
        }
        games
    }

    /// Rows matching the current filter.
    pub fn entries(&self) -> impl Iterator<Item = &LeaderboardEntry> {
        KIOSK_SCORES
            .iter()
            .filter(move |row| self.filter.as_deref().map_or(true, |game| row.game == game))
    }
}

impl Page<Route> for LeaderboardPage {
    fn on_enter(&mut self, _context: &mut GlobalContext) {
        self.filter = None;
    }

    fn handle(&mut self, event: &CafeEvent, context: &mut GlobalContext) -> bool {
        match event {
            CafeEvent::FilterLeaderboard(filter) => {
                debug!(target: "leaderboard", "Filter set to {:?}", filter);
                self.filter = filter.clone().filter(|game| game != "all");
            }
            CafeEvent::Back => context.navigate(Route::Cafe),
            _ => return false,
        }
        true
    }

    fn update(&mut self, _dt: Duration, _context: &mut GlobalContext) {}

    fn as_any(&self) -> &dyn Any {
        self
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
