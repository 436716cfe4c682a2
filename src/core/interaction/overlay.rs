//=========================================================================
// Station Overlays
//=========================================================================
//
// Text bubbles shown above occupied stations, drawn from a fixed pool of
// lines with a seeded RNG so runs are reproducible.
//
//=========================================================================

//=== External Dependencies ===============================================

use glam::Vec3;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

//=== Internal Dependencies ===============================================

use super::layout::StationId;
use crate::core::scheduler::TimerId;

//=== MessagePool =========================================================

/// Fixed set of overlay lines.
#[derive(Debug)]
pub struct MessagePool {
    lines: Vec<String>,
    rng: StdRng,
}

impl MessagePool {
    /// # Panics
    ///
    /// Panics if `lines` is empty.
    pub fn new(lines: Vec<String>, seed: u64) -> Self {
        assert!(!lines.is_empty(), "Message pool must contain at least one line");
        Self {
            lines,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Picks a random line.
    pub fn pick(&mut self) -> String {
        self.lines
            .choose(&mut self.rng)
            .cloned()
            .unwrap_or_default()
    }

    pub fn contains(&self, line: &str) -> bool {
        self.lines.iter().any(|candidate| candidate == line)
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }
}

//=== Overlay =============================================================

/// Height above a station at which its bubble is anchored.
pub const OVERLAY_LIFT: Vec3 = Vec3::new(0.0, 1.5, 0.0);

/// A visible text bubble and the timer that will dismiss it.
#[derive(Debug, Clone, PartialEq)]
pub struct Overlay {
    pub station: StationId,
    pub text: String,
    pub anchor: Vec3,
    pub(super) dismissal: TimerId,
}

//=========================================================================
// Tests
//=========================================================================
