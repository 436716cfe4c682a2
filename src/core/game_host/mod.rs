//=========================================================================
// External Game Host
//=========================================================================
//
// Lifecycle of one embedded-game slot inside a modal container.
//
// State machine:
//   Idle ──open()──► Loading ──ready──► Ready ──teardown()──► TornDown
//                       │                                      │
//                       └──asset / capability failure──► Failed(..)
//   TornDown ──open()──► Loading (fresh session)
//
// Loading injects the scoped stylesheet, then loads scripts strictly in
// manifest order, then resolves the entry symbol. A missing symbol or a
// game that never signals ready within the timeout is replaced by the
// falling-blocks placeholder, which gets its own registry.
//
// Teardown order:
//   1. cancel timers   2. remove listeners   3. clear container
//   4. remove stylesheet and scripts   5. game shutdown hooks
//   6. drop session bookkeeping
//
//=========================================================================

//=== External Dependencies ===============================================

use std::fmt;
use std::time::Duration;

use log::{debug, info, warn};
use uuid::Uuid;

//=== Module Declarations =================================================

mod environment;
mod fallback;
mod games;
mod handle;
mod manifest;
mod registry;

//=== Public API ==========================================================

pub use environment::{
    AssetError, BundleScript, Capability, GameFactory, HeadlessEnvironment, HostEnvironment,
    Removal, ScriptRef, ScriptStatus, StyleSheet,
};
pub use fallback::FallingBlocks;
pub use games::{PacmanDemo, ShooterStub, PACMAN_FRAME, PACMAN_INIT};
pub use handle::{EmbeddedGame, GameHandle, GameSlot, Readiness};
pub use manifest::{AutoStart, BundleSpec, GameCatalog, GameManifest, GameSource};
pub use registry::{ListenerId, SessionRegistry};

//=== Internal Dependencies ===============================================

use crate::core::config::CafeConfig;
use crate::core::input::GameInput;
use crate::core::scheduler::{Scheduler, TimerId};
use handle::HostTimer;

//=== Host Types ==========================================================

/// Why a session ended in `Failed`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostFailure {
    Asset(AssetError),
    MissingCapability(Capability),
}

impl fmt::Display for HostFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Asset(e) => write!(f, "{}", e),
            Self::MissingCapability(c) => write!(f, "{} is not supported", c),
        }
    }
}

/// Lifecycle state of the slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotState {
    Idle,
    Loading,
    Ready,
    Failed(HostFailure),
    TornDown,
}

/// Host errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostError {
    /// A session is already open in this slot.
    SlotBusy(SlotState),
}

impl fmt::Display for HostError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SlotBusy(state) => write!(f, "Game slot is busy ({:?})", state),
        }
    }
}

impl std::error::Error for HostError {}

/// Notable transitions reported by [`GameHost::update`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    Ready { session: Uuid, fallback: bool },
    Failed { session: Uuid, failure: HostFailure },
}

/// What a teardown removed. A repeated teardown reports all zeros.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TeardownReport {
    pub timers_cancelled: usize,
    pub listeners_removed: usize,
    pub container_cleared: bool,
    pub stylesheets_removed: usize,
    pub scripts_removed: usize,
    /// Resources that were already gone when teardown reached them.
    pub already_removed: usize,
    pub games_shut_down: usize,
    pub final_score: Option<u64>,
}

impl TeardownReport {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Host timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostSettings {
    pub ready_timeout: Duration,
    pub fallback_seed: u64,
}

impl Default for HostSettings {
    fn default() -> Self {
        Self {
            ready_timeout: Duration::from_millis(1_500),
            fallback_seed: 0,
        }
    }
}

//=== Session Bookkeeping =================================================

struct MountedGame {
    game: Box<dyn EmbeddedGame>,
    registry: SessionRegistry,
    ready: bool,
}

impl MountedGame {
    fn new(game: Box<dyn EmbeddedGame>) -> Self {
        Self {
            game,
            registry: SessionRegistry::new(),
            ready: false,
        }
    }
}

#[derive(Default)]
struct LoadProgress {
    next: usize,
    in_flight: Option<String>,
}

enum LoadStep {
    Pending,
    Done,
    Failed(AssetError),
}

struct ActiveSession {
    id: Uuid,
    manifest: GameManifest,
    progress: Option<LoadProgress>,
    scripts: Vec<String>,
    stylesheet: Option<String>,
    primary: Option<MountedGame>,
    fallback: Option<MountedGame>,
    host_timers: Vec<TimerId>,
    probe: Option<TimerId>,
}

impl ActiveSession {
    fn new(manifest: GameManifest) -> Self {
        Self {
            id: Uuid::new_v4(),
            manifest,
            progress: Some(LoadProgress::default()),
            scripts: Vec::new(),
            stylesheet: None,
            primary: None,
            fallback: None,
            host_timers: Vec::new(),
            probe: None,
        }
    }

    fn slot_mut(&mut self, owner: GameSlot) -> Option<&mut MountedGame> {
        match owner {
            GameSlot::Primary => self.primary.as_mut(),
            GameSlot::Fallback => self.fallback.as_mut(),
        }
    }

    fn mounted(&self) -> impl Iterator<Item = &MountedGame> {
        self.primary.iter().chain(self.fallback.iter())
    }
}

//=== GameHost ============================================================

/// One embedded-game slot bound to a container in the environment.
pub struct GameHost<E: HostEnvironment> {
    env: E,
    container: String,
    settings: HostSettings,
    state: SlotState,
    scheduler: Scheduler<HostTimer>,
    session: Option<ActiveSession>,
    events: Vec<HostEvent>,
}

impl<E: HostEnvironment> GameHost<E> {
    //--- Construction -----------------------------------------------------

    pub fn new(env: E, container: &str, settings: HostSettings) -> Self {
        Self {
            env,
            container: container.to_string(),
            settings,
            state: SlotState::Idle,
            scheduler: Scheduler::new(),
            session: None,
            events: Vec::new(),
        }
    }

    pub fn from_config(env: E, container: &str, config: &CafeConfig) -> Self {
        let settings = HostSettings {
            ready_timeout: config.host.ready_timeout(),
            fallback_seed: config.rng_seed,
        };
        Self::new(env, container, settings)
    }

    //--- Lifecycle --------------------------------------------------------

    /// Starts a session for `manifest`.
    ///
    /// Capability and stylesheet failures are reported through the slot
    /// state; scripts start loading on the next [`Self::update`].
    pub fn open(&mut self, manifest: &GameManifest) -> Result<Uuid, HostError> {
        if self.session.is_some() {
            return Err(HostError::SlotBusy(self.state.clone()));
        }

        let session = ActiveSession::new(manifest.clone());
        let id = session.id;
        self.session = Some(session);
        self.state = SlotState::Loading;
        info!(target: "game_host", "Opening {} in session {}", manifest.title, id);

        if let GameSource::Bundle(bundle) = &manifest.source {
            if let Some(missing) = bundle.capabilities.iter().find(|c| !self.env.supports(**c)) {
                self.fail(HostFailure::MissingCapability(*missing));
                return Ok(id);
            }
            if let Some(sheet) = &bundle.stylesheet {
                match self.env.inject_stylesheet(sheet) {
                    Ok(()) => {
                        if let Some(session) = self.session.as_mut() {
                            session.stylesheet = Some(sheet.scope.clone());
                        }
                    }
                    Err(e) => {
                        self.fail(HostFailure::Asset(e));
                        return Ok(id);
                    }
                }
            }
        }

        Ok(id)
    }

    /// Advances loading and fires due timers.
    pub fn update(&mut self, dt: Duration) -> Vec<HostEvent> {
        if self.state == SlotState::Loading {
            match self.pump_scripts() {
                LoadStep::Pending => {}
                LoadStep::Done => {
                    if let Some(session) = self.session.as_mut() {
                        session.progress = None;
                    }
                    self.resolve_entry();
                }
                LoadStep::Failed(e) => self.fail(HostFailure::Asset(e)),
            }
        }

        self.scheduler.advance(dt);
        while let Some((id, timer)) = self.scheduler.next_due() {
            match timer {
                HostTimer::Game { owner, tag } => self.fire_game_timer(id, owner, tag),
                HostTimer::ReadyProbe => {
                    self.forget_host_timer(id);
                    if self.state == SlotState::Loading {
                        warn!(target: "game_host", "Game did not signal ready in time");
                        self.fall_back();
                    }
                }
                HostTimer::AutoStart(key) => {
                    self.forget_host_timer(id);
                    debug!(target: "game_host", "Auto-starting with {:?}", key);
                    self.deliver(GameInput::KeyDown(key));
                }
            }
        }

        std::mem::take(&mut self.events)
    }

    /// Delivers input to mounted games listening for it.
    ///
    /// Returns how many games received it. Ignored unless `Ready`.
    pub fn dispatch_input(&mut self, input: GameInput) -> usize {
        if self.state != SlotState::Ready {
            return 0;
        }
        self.deliver(input)
    }

    /// Reverses every registration of the current session.
    ///
    /// Safe to call repeatedly and when resources were already removed.
    pub fn teardown(&mut self) -> TeardownReport {
        let mut report = TeardownReport::default();
        let Some(mut session) = self.session.take() else {
            if self.state != SlotState::Idle {
                self.state = SlotState::TornDown;
            }
            return report;
        };

        //--- 1. Timers ----------------------------------------------------
        let mut timers = std::mem::take(&mut session.host_timers);
        for mounted in [&mut session.primary, &mut session.fallback].into_iter().flatten() {
            timers.extend(mounted.registry.drain_timers());
        }
        report.timers_cancelled = timers.into_iter().filter(|id| self.scheduler.cancel(*id)).count();
        let stray = self.scheduler.clear();
        if stray > 0 {
            debug!(target: "game_host", "Cancelled {} unrecorded timers", stray);
            report.timers_cancelled += stray;
        }

        //--- 2. Listeners -------------------------------------------------
        for mounted in [&mut session.primary, &mut session.fallback].into_iter().flatten() {
            report.listeners_removed += mounted.registry.drain_listeners();
        }

        //--- 3. Container -------------------------------------------------
        report.container_cleared = self.env.clear_container(&self.container);

        //--- 4. Stylesheet and scripts ------------------------------------
        if let Some(scope) = session.stylesheet.take() {
            if self.env.remove_stylesheet(&scope) {
                report.stylesheets_removed += 1;
            } else {
                debug!(target: "game_host", "Stylesheet {} already removed", scope);
                report.already_removed += 1;
            }
        }
        for src in session.scripts.drain(..) {
            if self.env.remove_script(&src) {
                report.scripts_removed += 1;
            } else {
                debug!(target: "game_host", "Script {} already removed", src);
                report.already_removed += 1;
            }
        }

        //--- 5. Shutdown hooks --------------------------------------------
        for mounted in [&mut session.primary, &mut session.fallback].into_iter().flatten() {
            report.final_score = Some(mounted.game.score());
            mounted.game.shutdown();
            report.games_shut_down += 1;
        }

        //--- 6. Bookkeeping -----------------------------------------------
        self.state = SlotState::TornDown;
        info!(
            target: "game_host",
            "Session {} torn down ({} timers, {} listeners)",
            session.id, report.timers_cancelled, report.listeners_removed
        );
        report
    }

    //--- Query API --------------------------------------------------------

    pub fn state(&self) -> &SlotState {
        &self.state
    }

    pub fn is_open(&self) -> bool {
        self.session.is_some()
    }

    pub fn session_id(&self) -> Option<Uuid> {
        self.session.as_ref().map(|s| s.id)
    }

    pub fn current_game(&self) -> Option<&GameManifest> {
        self.session.as_ref().map(|s| &s.manifest)
    }

    /// Name of the game currently drawing into the container.
    pub fn active_game_name(&self) -> Option<&str> {
        let session = self.session.as_ref()?;
        session
            .fallback
            .as_ref()
            .or(session.primary.as_ref())
            .map(|m| m.game.name())
    }

    pub fn fallback_active(&self) -> bool {
        self.session.as_ref().is_some_and(|s| s.fallback.is_some())
    }

    /// Timers recorded in game registries.
    pub fn registered_timers(&self) -> usize {
        self.session
            .as_ref()
            .map(|s| s.mounted().map(|m| m.registry.timer_count()).sum())
            .unwrap_or(0)
    }

    /// Listeners recorded in game registries.
    pub fn registered_listeners(&self) -> usize {
        self.session
            .as_ref()
            .map(|s| s.mounted().map(|m| m.registry.listener_count()).sum())
            .unwrap_or(0)
    }

    /// All timers still scheduled, including host-internal ones.
    pub fn pending_timers(&self) -> usize {
        self.scheduler.len()
    }

    pub fn score(&self) -> Option<u64> {
        let session = self.session.as_ref()?;
        session
            .fallback
            .as_ref()
            .or(session.primary.as_ref())
            .map(|m| m.game.score())
    }

    pub fn container(&self) -> &str {
        &self.container
    }

    pub fn environment(&self) -> &E {
        &self.env
    }

    pub fn environment_mut(&mut self) -> &mut E {
        &mut self.env
    }

    //--- Loading ----------------------------------------------------------

    fn pump_scripts(&mut self) -> LoadStep {
        let Some(session) = self.session.as_mut() else {
            return LoadStep::Pending;
        };
        let Some(progress) = session.progress.as_mut() else {
            return LoadStep::Pending;
        };
        let scripts: &[ScriptRef] = match &session.manifest.source {
            GameSource::Bundle(bundle) => &bundle.scripts,
            GameSource::Builtin(_) => &[],
        };

        loop {
            if let Some(src) = progress.in_flight.clone() {
                match self.env.poll_script(&src) {
                    ScriptStatus::Pending => return LoadStep::Pending,
                    ScriptStatus::Failed(e) => {
                        progress.in_flight = None;
                        return LoadStep::Failed(e);
                    }
                    ScriptStatus::Loaded => {
                        debug!(target: "game_host", "Loaded {}", src);
                        progress.in_flight = None;
                    }
                }
            }

            let Some(script) = scripts.get(progress.next) else {
                return LoadStep::Done;
            };
            progress.next += 1;
            self.env.begin_script(script);
            session.scripts.push(script.src.clone());
            progress.in_flight = Some(script.src.clone());
        }
    }

    fn resolve_entry(&mut self) {
        let Some(session) = self.session.as_ref() else {
            return;
        };
        let factory = match &session.manifest.source {
            GameSource::Builtin(factory) => Some(*factory),
            GameSource::Bundle(bundle) => {
                let factory = self.env.resolve_entry(&bundle.entry_symbol);
                if factory.is_none() {
                    warn!(
                        target: "game_host",
                        "Entry symbol {} missing after load, mounting placeholder",
                        bundle.entry_symbol
                    );
                }
                factory
            }
        };

        match factory {
            Some(factory) => self.mount(GameSlot::Primary, factory()),
            None => self.fall_back(),
        }
    }

    //--- Mounting ---------------------------------------------------------

    fn mount(&mut self, owner: GameSlot, game: Box<dyn EmbeddedGame>) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let mut mounted = MountedGame::new(game);
        let mut frame = None;
        let readiness = {
            let MountedGame {
                game,
                registry,
                ready,
            } = &mut mounted;
            let mut handle = GameHandle::new(owner, &mut self.scheduler, registry, &mut frame, ready);
            game.mount(&mut handle)
        };
        if readiness == Readiness::Ready {
            mounted.ready = true;
        }
        let ready = mounted.ready;
        debug!(target: "game_host", "Mounted {} as {:?}", mounted.game.name(), owner);

        match owner {
            GameSlot::Primary => session.primary = Some(mounted),
            GameSlot::Fallback => session.fallback = Some(mounted),
        }
        self.flush(frame);

        if ready {
            self.mark_ready(owner);
        } else if owner == GameSlot::Primary {
            let probe = self
                .scheduler
                .set_timeout(self.settings.ready_timeout, HostTimer::ReadyProbe);
            if let Some(session) = self.session.as_mut() {
                session.probe = Some(probe);
                session.host_timers.push(probe);
            }
        }
    }

    fn fall_back(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if let Some(mut primary) = session.primary.take() {
            for id in primary.registry.drain_timers() {
                self.scheduler.cancel(id);
            }
            primary.registry.drain_listeners();
            primary.game.shutdown();
        }
        if let Some(probe) = session.probe.take() {
            self.scheduler.cancel(probe);
            session.host_timers.retain(|id| *id != probe);
        }
        self.env.clear_container(&self.container);

        let placeholder = FallingBlocks::new(self.settings.fallback_seed);
        self.mount(GameSlot::Fallback, Box::new(placeholder));
    }

    fn mark_ready(&mut self, owner: GameSlot) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if self.state != SlotState::Loading {
            return;
        }
        self.state = SlotState::Ready;

        if let Some(probe) = session.probe.take() {
            self.scheduler.cancel(probe);
            session.host_timers.retain(|id| *id != probe);
        }
        if owner == GameSlot::Primary {
            if let GameSource::Bundle(BundleSpec {
                auto_start: Some(auto),
                ..
            }) = &session.manifest.source
            {
                let timer = self
                    .scheduler
                    .set_timeout(auto.delay, HostTimer::AutoStart(auto.key));
                session.host_timers.push(timer);
            }
        }

        info!(target: "game_host", "{} ready ({:?})", session.manifest.title, owner);
        self.events.push(HostEvent::Ready {
            session: session.id,
            fallback: owner == GameSlot::Fallback,
        });
    }

    fn fail(&mut self, failure: HostFailure) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        session.progress = None;
        let message = match &failure {
            HostFailure::Asset(_) => {
                format!("Failed to load {}. Please try again later.", session.manifest.title)
            }
            HostFailure::MissingCapability(capability) => format!(
                "{} cannot run on this terminal: {} is not supported.",
                session.manifest.title, capability
            ),
        };
        warn!(target: "game_host", "Session {} failed: {}", session.id, failure);
        self.events.push(HostEvent::Failed {
            session: session.id,
            failure: failure.clone(),
        });
        self.env.render(&self.container, &message);
        self.state = SlotState::Failed(failure);
    }

    //--- Dispatch ---------------------------------------------------------

    fn fire_game_timer(&mut self, id: TimerId, owner: GameSlot, tag: u32) {
        let Some(mounted) = self.session.as_mut().and_then(|s| s.slot_mut(owner)) else {
            return;
        };
        let mut frame = None;
        let MountedGame {
            game,
            registry,
            ready,
        } = mounted;
        let was_ready = *ready;
        {
            let mut handle = GameHandle::new(owner, &mut self.scheduler, registry, &mut frame, ready);
            game.on_timer(tag, &mut handle);
        }
        if !self.scheduler.is_pending(id) {
            registry.forget_timer(id);
        }
        let became_ready = !was_ready && *ready;

        self.flush(frame);
        if became_ready {
            self.mark_ready(owner);
        }
    }

    fn deliver(&mut self, input: GameInput) -> usize {
        let mut delivered = 0;
        for owner in [GameSlot::Primary, GameSlot::Fallback] {
            let Some(mounted) = self.session.as_mut().and_then(|s| s.slot_mut(owner)) else {
                continue;
            };
            if !mounted.registry.listens_to(input.kind()) {
                continue;
            }
            let mut frame = None;
            let MountedGame {
                game,
                registry,
                ready,
            } = mounted;
            let mut handle = GameHandle::new(owner, &mut self.scheduler, registry, &mut frame, ready);
            game.on_input(input, &mut handle);
            delivered += 1;
            self.flush(frame);
        }
        delivered
    }

    fn flush(&mut self, frame: Option<String>) {
        if let Some(content) = frame {
            self.env.render(&self.container, &content);
        }
    }

    fn forget_host_timer(&mut self, id: TimerId) {
        if let Some(session) = self.session.as_mut() {
            session.host_timers.retain(|timer| *timer != id);
            if session.probe == Some(id) {
                session.probe = None;
            }
        }
    }
}

//=========================================================================
// Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::input::KeyCode;

    fn host() -> GameHost<HeadlessEnvironment> {
        GameHost::new(
            HeadlessEnvironment::with_stock_bundles(),
            "game-container",
            HostSettings::default(),
        )
    }

    fn catalog() -> GameCatalog {
        GameCatalog::stock()
    }

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    fn run(host: &mut GameHost<HeadlessEnvironment>, total_ms: u64) -> Vec<HostEvent> {
        let mut events = Vec::new();
        for _ in 0..(total_ms / 10) {
            events.extend(host.update(ms(10)));
        }
        events
    }

    //--- Loading ----------------------------------------------------------

    #[test]
    fn pacman_goes_idle_loading_ready() {
        let mut host = host();
        assert_eq!(host.state(), &SlotState::Idle);

        let session = host.open(catalog().get("pacman").unwrap()).unwrap();
        assert_eq!(host.state(), &SlotState::Loading);

        let events = run(&mut host, 200);
        assert_eq!(host.state(), &SlotState::Ready);
        assert_eq!(events, vec![HostEvent::Ready { session, fallback: false }]);
        assert_eq!(host.active_game_name(), Some("Pac-Man"));
        assert_eq!(
            host.environment().load_log(),
            &["/pacman/modernizr-1.5.min.js", "/pacman/pacman.js"]
        );
        assert_eq!(host.environment().stylesheets(), &["#pacman canvas"]);
    }

    #[test]
    fn scripts_load_strictly_in_order() {
        let env = HeadlessEnvironment::with_stock_bundles()
            .with_latency("/pacman/modernizr-1.5.min.js", 3);
        let mut host = GameHost::new(env, "game", HostSettings::default());
        host.open(catalog().get("pacman").unwrap()).unwrap();

        host.update(ms(10));
        assert_eq!(host.environment().load_log(), &["/pacman/modernizr-1.5.min.js"]);
        host.update(ms(10));
        host.update(ms(10));
        assert_eq!(host.environment().load_log().len(), 1);

        host.update(ms(10));
        assert_eq!(host.environment().load_log().len(), 2);
    }

    #[test]
    fn pacman_auto_starts_after_delay() {
        let mut host = host();
        host.open(catalog().get("pacman").unwrap()).unwrap();
        run(&mut host, 200);
        assert!(!host.environment().container_content("game-container").unwrap().starts_with("SCORE"));

        run(&mut host, 3_000);
        let content = host.environment().container_content("game-container").unwrap();
        assert!(content.starts_with("SCORE"));
    }

    #[test]
    fn missing_entry_mounts_placeholder() {
        let mut host = host();
        let session = host.open(catalog().get("tetris").unwrap()).unwrap();

        let events = host.update(ms(10));
        assert_eq!(events, vec![HostEvent::Ready { session, fallback: true }]);
        assert!(host.fallback_active());
        assert_eq!(host.active_game_name(), Some("Falling Blocks"));
        assert_eq!(host.environment().load_log().len(), 3);
    }

    #[test]
    fn ready_timeout_swaps_in_placeholder() {
        fn never_ready() -> Box<dyn EmbeddedGame> {
            struct Silent;
            impl EmbeddedGame for Silent {
                fn name(&self) -> &str {
                    "Silent"
                }
                fn mount(&mut self, handle: &mut GameHandle<'_>) -> Readiness {
                    handle.set_interval(Duration::from_millis(50), 1);
                    handle.listen(crate::core::input::ListenerKind::KeyDown);
                    Readiness::Pending
                }
                fn on_timer(&mut self, _tag: u32, _handle: &mut GameHandle<'_>) {}
                fn on_input(&mut self, _input: GameInput, _handle: &mut GameHandle<'_>) {}
            }
            Box::new(Silent)
        }

        let mut manifest = catalog().get("valorant").unwrap().clone();
        manifest.source = GameSource::Builtin(never_ready);
        let mut host = host();
        host.open(&manifest).unwrap();

        run(&mut host, 1_000);
        assert_eq!(host.state(), &SlotState::Loading);
        assert_eq!(host.registered_timers(), 1);

        let events = run(&mut host, 600);
        assert!(matches!(events.as_slice(), [HostEvent::Ready { fallback: true, .. }]));
        assert_eq!(host.state(), &SlotState::Ready);
        // Only the placeholder's gravity timer and key listener remain
        assert_eq!(host.registered_timers(), 1);
        assert_eq!(host.registered_listeners(), 1);
    }

    #[test]
    fn zero_delay_rearm_fires_once_per_frame() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        static FIRED: AtomicUsize = AtomicUsize::new(0);

        fn busy_loop() -> Box<dyn EmbeddedGame> {
            struct BusyLoop;
            impl EmbeddedGame for BusyLoop {
                fn name(&self) -> &str {
                    "Busy Loop"
                }
                fn mount(&mut self, handle: &mut GameHandle<'_>) -> Readiness {
                    handle.set_timeout(Duration::ZERO, 0);
                    Readiness::Ready
                }
                fn on_timer(&mut self, _tag: u32, handle: &mut GameHandle<'_>) {
                    FIRED.fetch_add(1, Ordering::SeqCst);
                    handle.set_timeout(Duration::ZERO, 0);
                }
                fn on_input(&mut self, _input: GameInput, _handle: &mut GameHandle<'_>) {}
            }
            Box::new(BusyLoop)
        }

        let mut manifest = catalog().get("valorant").unwrap().clone();
        manifest.source = GameSource::Builtin(busy_loop);
        let mut host = host();
        host.open(&manifest).unwrap();

        host.update(ms(16));
        host.update(ms(16));
        assert_eq!(FIRED.load(Ordering::SeqCst), 2);
        assert_eq!(host.registered_timers(), 1);

        host.teardown();
        host.update(ms(16));
        assert_eq!(FIRED.load(Ordering::SeqCst), 2);
    }

    //--- Failures ---------------------------------------------------------

    #[test]
    fn missing_capability_fails_without_loading() {
        let env = HeadlessEnvironment::with_stock_bundles().without_capability(Capability::Audio);
        let mut host = GameHost::new(env, "game", HostSettings::default());
        host.open(catalog().get("pacman").unwrap()).unwrap();

        assert_eq!(
            host.state(),
            &SlotState::Failed(HostFailure::MissingCapability(Capability::Audio))
        );
        run(&mut host, 100);
        assert!(host.environment().load_log().is_empty());
        assert!(host
            .environment()
            .container_content("game")
            .unwrap()
            .contains("not supported"));
    }

    #[test]
    fn script_failure_is_terminal_and_stops_later_loads() {
        let env = HeadlessEnvironment::with_stock_bundles().failing("/tetris/js/blockset.js");
        let mut host = GameHost::new(env, "game", HostSettings::default());
        let session = host.open(catalog().get("tetris").unwrap()).unwrap();

        let events = run(&mut host, 100);
        assert!(matches!(
            events.as_slice(),
            [HostEvent::Failed { session: s, failure: HostFailure::Asset(_) }] if *s == session
        ));
        assert_eq!(host.environment().load_log(), &["/tetris/js/blockset.js"]);
        assert!(matches!(host.state(), SlotState::Failed(_)));

        // Not retried
        run(&mut host, 1_000);
        assert_eq!(host.environment().load_log().len(), 1);
    }

    #[test]
    fn open_while_busy_is_rejected() {
        let mut host = host();
        host.open(catalog().get("cs2").unwrap()).unwrap();
        assert!(matches!(
            host.open(catalog().get("pacman").unwrap()),
            Err(HostError::SlotBusy(_))
        ));
    }

    //--- Teardown ---------------------------------------------------------

    #[test]
    fn teardown_removes_everything_in_order() {
        let mut host = host();
        host.open(catalog().get("pacman").unwrap()).unwrap();
        run(&mut host, 200);
        assert!(host.registered_timers() > 0);
        assert!(host.registered_listeners() > 0);

        let report = host.teardown();
        assert!(report.timers_cancelled >= 2);
        assert_eq!(report.listeners_removed, 1);
        assert!(report.container_cleared);
        assert_eq!(report.stylesheets_removed, 1);
        assert_eq!(report.scripts_removed, 2);
        assert_eq!(report.games_shut_down, 1);
        assert_eq!(host.state(), &SlotState::TornDown);
        assert_eq!(host.pending_timers(), 0);

        assert_eq!(
            host.environment().removals(),
            &[
                Removal::Container("game-container".into()),
                Removal::Stylesheet("#pacman canvas".into()),
                Removal::Script("/pacman/modernizr-1.5.min.js".into()),
                Removal::Script("/pacman/pacman.js".into()),
            ]
        );
    }

    #[test]
    fn teardown_twice_is_harmless() {
        let mut host = host();
        host.open(catalog().get("tetris").unwrap()).unwrap();
        run(&mut host, 100);

        assert!(!host.teardown().is_empty());
        let removals = host.environment().removals().len();

        assert!(host.teardown().is_empty());
        assert_eq!(host.environment().removals().len(), removals);
        assert_eq!(host.state(), &SlotState::TornDown);
    }

    #[test]
    fn nothing_fires_after_teardown() {
        let mut host = host();
        host.open(catalog().get("tetris").unwrap()).unwrap();
        run(&mut host, 100);
        host.teardown();

        run(&mut host, 5_000);
        assert_eq!(host.environment().container_content("game-container"), None);
        assert_eq!(host.dispatch_input(GameInput::KeyDown(KeyCode::Space)), 0);
    }

    #[test]
    fn externally_removed_resources_do_not_fail_teardown() {
        let mut host = host();
        host.open(catalog().get("pacman").unwrap()).unwrap();
        run(&mut host, 200);
        host.environment_mut().remove_script_externally("/pacman/pacman.js");
        host.environment_mut().remove_stylesheet_externally("#pacman canvas");

        let report = host.teardown();
        assert_eq!(report.already_removed, 2);
        assert_eq!(report.scripts_removed, 1);
    }

    #[test]
    fn reopen_after_teardown_starts_clean() {
        let mut host = host();
        let first = host.open(catalog().get("tetris").unwrap()).unwrap();
        run(&mut host, 100);
        host.teardown();

        let second = host.open(catalog().get("pacman").unwrap()).unwrap();
        assert_ne!(first, second);
        assert_eq!(host.state(), &SlotState::Loading);
        assert_eq!(host.registered_timers(), 0);
        run(&mut host, 200);
        assert_eq!(host.state(), &SlotState::Ready);
    }

    #[test]
    fn failed_session_still_tears_down() {
        let env = HeadlessEnvironment::with_stock_bundles().failing("/pacman/pacman.js");
        let mut host = GameHost::new(env, "game", HostSettings::default());
        host.open(catalog().get("pacman").unwrap()).unwrap();
        run(&mut host, 100);

        let report = host.teardown();
        assert!(report.container_cleared);
        assert_eq!(report.stylesheets_removed, 1);
        assert_eq!(report.scripts_removed, 1);
        assert_eq!(report.already_removed, 1);
        assert_eq!(report.games_shut_down, 0);
    }

    //--- Input ------------------------------------------------------------

    #[test]
    fn input_reaches_listening_game_only_when_ready() {
        let mut host = host();
        host.open(catalog().get("tetris").unwrap()).unwrap();
        assert_eq!(host.dispatch_input(GameInput::KeyDown(KeyCode::Space)), 0);

        run(&mut host, 20);
        assert_eq!(host.dispatch_input(GameInput::KeyDown(KeyCode::Space)), 1);
        assert_eq!(host.dispatch_input(GameInput::KeyUp(KeyCode::Space)), 0);
    }
}
