//=========================================================================
// Game Manifests
//=========================================================================
//
// Catalog entries describing how each arcade title is loaded and what a
// launch costs.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::time::Duration;

//=== Internal Dependencies ===============================================

use super::environment::{Capability, GameFactory, ScriptRef, StyleSheet};
use super::games::ShooterStub;
use super::handle::EmbeddedGame;
use crate::core::input::KeyCode;

//=== GameSource ==========================================================

/// Key press the host sends once a bundle is ready.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutoStart {
    pub key: KeyCode,
    pub delay: Duration,
}

/// Third-party script bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleSpec {
    /// Loaded strictly in this order.
    pub scripts: Vec<ScriptRef>,
    pub stylesheet: Option<StyleSheet>,
    pub entry_symbol: String,
    pub capabilities: Vec<Capability>,
    pub auto_start: Option<AutoStart>,
}

/// Where a game comes from.
#[derive(Debug, Clone)]
pub enum GameSource {
    Bundle(BundleSpec),
    Builtin(GameFactory),
}

//=== GameManifest ========================================================

/// One tile on the desktop.
#[derive(Debug, Clone)]
pub struct GameManifest {
    pub id: String,
    pub title: String,
    pub description: String,
    /// Loaded credits deducted per launch.
    pub cost: u64,
    pub source: GameSource,
}

//=== GameCatalog =========================================================

/// Ordered set of launchable games.
#[derive(Debug, Clone)]
pub struct GameCatalog {
    games: Vec<GameManifest>,
}

impl GameCatalog {
    pub fn new(games: Vec<GameManifest>) -> Self {
        Self { games }
    }

    /// The four titles installed on every station.
    pub fn stock() -> Self {
        Self::new(vec![pacman(), falling_blocks(), valorant(), counter_strike()])
    }

    pub fn get(&self, id: &str) -> Option<&GameManifest> {
        self.games.iter().find(|game| game.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &GameManifest> {
        self.games.iter()
    }

    pub fn len(&self) -> usize {
        self.games.len()
    }

    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }
}

impl Default for GameCatalog {
    fn default() -> Self {
        Self::stock()
    }
}

//=== Stock Titles ========================================================

fn pacman() -> GameManifest {
    GameManifest {
        id: "pacman".into(),
        title: "Pac-Man".into(),
        description: "Classic arcade maze chase".into(),
        cost: 50,
        source: GameSource::Bundle(BundleSpec {
            scripts: vec![
                ScriptRef::classic("/pacman/modernizr-1.5.min.js"),
                ScriptRef::classic("/pacman/pacman.js"),
            ],
            stylesheet: Some(StyleSheet {
                scope: "#pacman canvas".into(),
                css: "#pacman canvas { display: block; margin: 0 auto; }".into(),
            }),
            entry_symbol: "PACMAN".into(),
            capabilities: vec![Capability::Canvas, Capability::LocalStorage, Capability::Audio],
            auto_start: Some(AutoStart {
                key: KeyCode::KeyN,
                delay: Duration::from_millis(3_000),
            }),
        }),
    }
}

fn falling_blocks() -> GameManifest {
    GameManifest {
        id: "tetris".into(),
        title: "Tetris".into(),
        description: "Stack the falling blocks".into(),
        cost: 30,
        source: GameSource::Bundle(BundleSpec {
            scripts: vec![
                ScriptRef::module("/tetris/js/blockset.js"),
                ScriptRef::module("/tetris/js/game.js"),
                ScriptRef::module("/tetris/js/audio.js"),
            ],
            stylesheet: None,
            entry_symbol: "spawn".into(),
            capabilities: vec![Capability::Canvas],
            auto_start: None,
        }),
    }
}

fn valorant() -> GameManifest {
    GameManifest {
        id: "valorant".into(),
        title: "Valorant".into(),
        description: "Tactical 5v5 shooter".into(),
        cost: 100,
        source: GameSource::Builtin(valorant_entry),
    }
}

fn counter_strike() -> GameManifest {
    GameManifest {
        id: "cs2".into(),
        title: "Counter-Strike 2".into(),
        description: "Competitive team shooter".into(),
        cost: 100,
        source: GameSource::Builtin(counter_strike_entry),
    }
}

fn valorant_entry() -> Box<dyn EmbeddedGame> {
    Box::new(ShooterStub::new("Valorant"))
}

fn counter_strike_entry() -> Box<dyn EmbeddedGame> {
    Box::new(ShooterStub::new("Counter-Strike 2"))
}

//=========================================================================
// Tests
//=========================================================================
