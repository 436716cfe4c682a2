//=========================================================================
// Interaction Router
//=========================================================================
//
// Maps clicks on the café floor to camera moves, delayed page
// navigation and transient station overlays.
//
// Flow:
//   occupied station  → Overlay (one per station) → dismissal timer
//   free station      → CameraTarget + navigation timer → Desktop(id)
//   leaderboard kiosk → CameraTarget + navigation timer → Leaderboard
//   cashier           → CameraTarget (idempotent focus)
//
// Navigation fires a fixed delay after the click, independent of when
// the camera tween completes. A newer navigation replaces a pending one.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use glam::Vec3;
use log::{debug, info};

//=== Module Declarations =================================================

mod layout;
mod overlay;

//=== Public API ==========================================================

pub use layout::{CafeLayout, StationId, StationState};
pub use overlay::{MessagePool, Overlay, OVERLAY_LIFT};

//=== Internal Dependencies ===============================================

use crate::core::config::CafeConfig;
use crate::core::navigator::CameraTarget;
use crate::core::scheduler::{Scheduler, TimerId};

//=== Router Types ========================================================

/// Page the router asks to open once its delay elapses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    Desktop(StationId),
    Leaderboard,
}

/// Deferred work produced by [`InteractionRouter::update`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouterRequest {
    Navigate(Destination),
}

/// Immediate result of a click.
#[derive(Debug, Clone, PartialEq)]
pub enum ClickOutcome {
    /// Bubble shown above an occupied station.
    Overlay { station: StationId, text: String },

    /// Camera move followed by a delayed navigation.
    Travel { camera: CameraTarget, destination: Destination },

    /// Camera move with no navigation.
    Focus { camera: CameraTarget },
}

impl ClickOutcome {
    pub fn camera(&self) -> Option<CameraTarget> {
        match self {
            Self::Overlay { .. } => None,
            Self::Travel { camera, .. } | Self::Focus { camera } => Some(*camera),
        }
    }
}

/// Router errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouterError {
    /// Click referenced a station not in the layout.
    UnknownStation(StationId),
}

impl fmt::Display for RouterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownStation(id) => write!(f, "Unknown station {}", id),
        }
    }
}

impl std::error::Error for RouterError {}

//=== RouterSettings ======================================================

/// Timing knobs for the router.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouterSettings {
    pub overlay_display: Duration,
    pub navigation_delay: Duration,
    pub transition_seconds: f32,
}

impl Default for RouterSettings {
    fn default() -> Self {
        Self {
            overlay_display: Duration::from_millis(3_000),
            navigation_delay: Duration::from_millis(1_600),
            transition_seconds: 1.5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RouterTimer {
    Dismiss(StationId),
    Navigate(Destination),
}

//=== InteractionRouter ===================================================

/// Click router for the café floor.
#[derive(Debug)]
pub struct InteractionRouter {
    layout: CafeLayout,
    pool: MessagePool,
    settings: RouterSettings,
    scheduler: Scheduler<RouterTimer>,
    overlays: BTreeMap<StationId, Overlay>,
    pending_navigation: Option<(TimerId, Destination)>,
    cashier_active: bool,
}

impl InteractionRouter {
    const STATION_OFFSET: Vec3 = Vec3::new(0.0, 1.5, 2.5);
    const STATION_FOCUS: Vec3 = Vec3::new(0.0, 0.5, 0.0);
    const CASHIER_OFFSET: Vec3 = Vec3::new(0.0, 2.0, 3.5);
    const CASHIER_FOCUS: Vec3 = Vec3::new(0.0, 1.0, 0.0);
    const KIOSK_OFFSET: Vec3 = Vec3::new(3.0, 2.0, 3.0);
    const KIOSK_FOCUS: Vec3 = Vec3::new(0.0, 1.5, 0.0);

    //--- Construction -----------------------------------------------------

    pub fn new(layout: CafeLayout, pool: MessagePool, settings: RouterSettings) -> Self {
        Self {
            layout,
            pool,
            settings,
            scheduler: Scheduler::new(),
            overlays: BTreeMap::new(),
            pending_navigation: None,
            cashier_active: false,
        }
    }

    /// Standard layout with timing and lines taken from `config`.
    pub fn from_config(config: &CafeConfig) -> Self {
        let settings = RouterSettings {
            overlay_display: config.interaction.overlay_display(),
            navigation_delay: config.interaction.navigation_delay(),
            transition_seconds: config.camera.transition_seconds,
        };
        let pool = MessagePool::new(config.interaction.message_pool.clone(), config.rng_seed);
        Self::new(CafeLayout::standard(), pool, settings)
    }

    //--- Clicks -----------------------------------------------------------

    /// Handles a click on a computer station.
    pub fn on_station_click(&mut self, id: StationId) -> Result<ClickOutcome, RouterError> {
        let station = self
            .layout
            .station(id)
            .ok_or(RouterError::UnknownStation(id))?;
        let position = station.position;

        if station.occupied {
            let text = self.show_overlay(id, position);
            return Ok(ClickOutcome::Overlay { station: id, text });
        }

        let camera = CameraTarget::framing(
            position,
            Self::STATION_OFFSET,
            Self::STATION_FOCUS,
            self.settings.transition_seconds,
        );
        let destination = Destination::Desktop(id);
        self.schedule_navigation(destination);
        info!(target: "router", "Station {} selected, heading to desktop", id);
        Ok(ClickOutcome::Travel { camera, destination })
    }

    /// Focuses the cashier desk. Repeated clicks issue the same move.
    pub fn on_cashier_click(&mut self) -> ClickOutcome {
        if !self.cashier_active {
            debug!(target: "router", "Cashier {} now serving", self.layout.cashier_name);
        }
        self.cashier_active = true;
        let camera = CameraTarget::framing(
            self.layout.cashier,
            Self::CASHIER_OFFSET,
            Self::CASHIER_FOCUS,
            self.settings.transition_seconds,
        );
        ClickOutcome::Focus { camera }
    }

    /// Moves to the leaderboard kiosk, then opens the leaderboard page.
    pub fn on_leaderboard_click(&mut self) -> ClickOutcome {
        let camera = CameraTarget::framing(
            self.layout.leaderboard_kiosk,
            Self::KIOSK_OFFSET,
            Self::KIOSK_FOCUS,
            self.settings.transition_seconds,
        );
        let destination = Destination::Leaderboard;
        self.schedule_navigation(destination);
        ClickOutcome::Travel { camera, destination }
    }

    //--- Update Loop ------------------------------------------------------

    /// Fires due dismissal and navigation timers.
    pub fn update(&mut self, dt: Duration) -> Vec<RouterRequest> {
        let mut requests = Vec::new();
        self.scheduler.advance(dt);

        while let Some((id, timer)) = self.scheduler.next_due() {
            match timer {
                RouterTimer::Dismiss(station) => {
                    if self.overlays.get(&station).map(|o| o.dismissal) == Some(id) {
                        self.overlays.remove(&station);
                        debug!(target: "router", "Overlay on station {} dismissed", station);
                    }
                }
                RouterTimer::Navigate(destination) => {
                    if self.pending_navigation.map(|(pending, _)| pending) == Some(id) {
                        self.pending_navigation = None;
                        requests.push(RouterRequest::Navigate(destination));
                    }
                }
            }
        }

        requests
    }

    /// Cancels every pending timer and drops all overlays.
    ///
    /// Returns the number of timers cancelled.
    pub fn unmount(&mut self) -> usize {
        let cancelled = self.scheduler.clear();
        self.overlays.clear();
        self.pending_navigation = None;
        self.cashier_active = false;
        debug!(target: "router", "Router unmounted, {} timers cancelled", cancelled);
        cancelled
    }

    //--- Query API --------------------------------------------------------

    pub fn overlays(&self) -> impl Iterator<Item = &Overlay> {
        self.overlays.values()
    }

    pub fn overlay(&self, station: StationId) -> Option<&Overlay> {
        self.overlays.get(&station)
    }

    pub fn pending_navigation(&self) -> Option<Destination> {
        self.pending_navigation.map(|(_, destination)| destination)
    }

    pub fn pending_timers(&self) -> usize {
        self.scheduler.len()
    }

    pub fn cashier_active(&self) -> bool {
        self.cashier_active
    }

    pub fn layout(&self) -> &CafeLayout {
        &self.layout
    }

    pub fn pool(&self) -> &MessagePool {
        &self.pool
    }

    //--- Internal Helpers -------------------------------------------------

    fn show_overlay(&mut self, station: StationId, position: Vec3) -> String {
        if let Some(previous) = self.overlays.remove(&station) {
            self.scheduler.cancel(previous.dismissal);
        }

        let text = self.pool.pick();
        let dismissal = self
            .scheduler
            .set_timeout(self.settings.overlay_display, RouterTimer::Dismiss(station));
        self.overlays.insert(
            station,
            Overlay {
                station,
                text: text.clone(),
                anchor: position + OVERLAY_LIFT,
                dismissal,
            },
        );
        debug!(target: "router", "Station {} busy: {:?}", station, text);
        text
    }

    fn schedule_navigation(&mut self, destination: Destination) {
        if let Some((previous, superseded)) = self.pending_navigation.take() {
            self.scheduler.cancel(previous);
            debug!(target: "router", "Navigation to {:?} superseded", superseded);
        }
        let timer = self
            .scheduler
            .set_timeout(self.settings.navigation_delay, RouterTimer::Navigate(destination));
        self.pending_navigation = Some((timer, destination));
    }
}

//=========================================================================
// Tests
//=========================================================================
