//=========================================================================
// Café Runtime
//
// Main entry point and coordinator for the café simulation.
//
// Architecture:
// ```text
//     CafeBuilder  ──build()──>  Cafe  ──run()──>  [fixed-rate loop]
//         │                        │
//         ├─ with_tps()            ├─ sender()   hands out event senders
//         ├─ config()              ├─ tick(dt)   one deterministic frame
//         ├─ identity()            └─ run()      ticks at TPS until Shutdown
//         ├─ credits_api()
//         └─ environment()
// ```
//
//=========================================================================

//=== External Dependencies ===============================================

use std::marker::PhantomData;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, Sender};
use log::{debug, info};

//=== Internal Dependencies ===============================================

use crate::core::config::CafeConfig;
use crate::core::credits::{CreditsApi, CreditsSession, InMemoryCredits};
use crate::core::event_bridge::{CafeEvent, EventCollector, TickControl};
use crate::core::game_host::{GameCatalog, HeadlessEnvironment, HostEnvironment};
use crate::core::globals::{GlobalContext, GlobalSystems};
use crate::core::identity::{IdentityProvider, StaticIdentity};
use crate::core::notice::Notice;
use crate::pages::{
    CafeFloorPage, DesktopPage, DoorPage, InfoKind, InfoPage, LeaderboardPage, PaymentPage, Route,
};

//=== CafeBuilder =========================================================

/// Builder for configuring and constructing a [`Cafe`].
///
/// # Default Values
///
/// - **Config**: [`CafeConfig::default`] (60 TPS, 128 events)
/// - **Identity**: signed out
/// - **Credits API**: empty [`InMemoryCredits`]
/// - **Host environment**: [`HeadlessEnvironment`] with the stock bundles
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use cybercafe_sim::CafeBuilder;
/// use cybercafe_sim::core::identity::StaticIdentity;
///
/// let cafe = CafeBuilder::new()
///     .with_tps(30.0)
///     .identity(Arc::new(StaticIdentity::signed_in("token")))
///     .build();
/// cafe.run();
/// ```
pub struct CafeBuilder<E: HostEnvironment = HeadlessEnvironment> {
    config: CafeConfig,
    identity: Arc<dyn IdentityProvider>,
    credits_api: Option<Arc<dyn CreditsApi>>,
    catalog: GameCatalog,
    environment: E,
}

impl CafeBuilder<HeadlessEnvironment> {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            config: CafeConfig::default(),
            identity: Arc::new(StaticIdentity::signed_out()),
            credits_api: None,
            catalog: GameCatalog::stock(),
            environment: HeadlessEnvironment::with_stock_bundles(),
        }
    }
}

impl Default for CafeBuilder<HeadlessEnvironment> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: HostEnvironment + 'static> CafeBuilder<E> {
    /// Sets the target ticks per second, overriding the config.
    ///
    /// # Panics
    ///
    /// Panics if `tps <= 0.0`.
    pub fn with_tps(mut self, tps: f64) -> Self {
        assert!(tps > 0.0, "TPS must be positive, got {}", tps);
        self.config.tps = tps;
        self
    }

    /// Sets the user event channel capacity, overriding the config.
    ///
    /// # Panics
    ///
    /// Panics if `capacity == 0`.
    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        assert!(capacity > 0, "Channel capacity must be positive");
        self.config.channel_capacity = capacity;
        self
    }

    /// Replaces the whole configuration. Call before the `with_*` overrides.
    ///
    /// # Panics
    ///
    /// Panics if `config` fails [`CafeConfig::validate`].
    pub fn config(mut self, config: CafeConfig) -> Self {
        if let Err(e) = config.validate() {
            panic!("{}", e);
        }
        self.config = config;
        self
    }

    pub fn identity(mut self, identity: Arc<dyn IdentityProvider>) -> Self {
        self.identity = identity;
        self
    }

    pub fn credits_api(mut self, api: Arc<dyn CreditsApi>) -> Self {
        self.credits_api = Some(api);
        self
    }

    pub fn catalog(mut self, catalog: GameCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Swaps the document the game host loads bundles into.
    pub fn environment<F: HostEnvironment + 'static>(self, environment: F) -> CafeBuilder<F> {
        CafeBuilder {
            config: self.config,
            identity: self.identity,
            credits_api: self.credits_api,
            catalog: self.catalog,
            environment,
        }
    }

    /// Builds the café, registers every page and enters the door page.
    pub fn build(self) -> Cafe<E> {
        info!(
            target: "cafe",
            "Building café (TPS: {}, channel: {})",
            self.config.tps, self.config.channel_capacity
        );

        let api = self
            .credits_api
            .unwrap_or_else(|| Arc::new(InMemoryCredits::new()));
        let mut context = GlobalContext::new(self.config, CreditsSession::new(api), self.identity);

        let mut systems = GlobalSystems::new();
        let pages = &mut systems.pages;
        pages.register_default(Route::Door, DoorPage::new());
        pages.register_page(Route::Cafe, CafeFloorPage::new());
        pages.register_page(
            Route::Desktop,
            DesktopPage::new(self.catalog, self.environment, &context.config),
        );
        pages.register_page(Route::Payment, PaymentPage::new());
        pages.register_page(Route::Leaderboard, LeaderboardPage::new());
        pages.register_page(Route::Login, InfoPage::new(InfoKind::Login));
        pages.register_page(Route::Register, InfoPage::new(InfoKind::Register));
        pages.register_page(Route::Dashboard, InfoPage::new(InfoKind::Dashboard));
        pages.start(&mut context);

        let (sender, receiver) = bounded(context.config.channel_capacity);

        Cafe {
            sender,
            runtime: Runtime {
                systems,
                context,
                collector: EventCollector::new(receiver),
                notices: Vec::new(),
                running: true,
                _environment: PhantomData,
            },
        }
    }
}

//=== Cafe ================================================================

/// Café runtime.
///
/// Owns every page and the shared context on a single logical thread.
/// User input arrives over a bounded channel; see [`Cafe::sender`].
///
/// # Architecture
///
/// ```text
/// Cafe
///   ├─► EventCollector (bounded channel, CafeEvent)
///   ├─► GlobalSystems  (PageManager<Route>)
///   └─► GlobalContext  (MessageBus, CreditsSession, identity, config)
/// ```
pub struct Cafe<E: HostEnvironment = HeadlessEnvironment> {
    sender: Sender<CafeEvent>,
    runtime: Runtime<E>,
}

struct Runtime<E: HostEnvironment> {
    systems: GlobalSystems<Route>,
    context: GlobalContext,
    collector: EventCollector,
    notices: Vec<Notice>,
    running: bool,
    _environment: PhantomData<E>,
}

impl<E: HostEnvironment + 'static> Cafe<E> {
    //--- Input ------------------------------------------------------------

    /// Hands out a sender for user events.
    pub fn sender(&self) -> Sender<CafeEvent> {
        self.sender.clone()
    }

    //--- Execution --------------------------------------------------------

    /// Runs one frame of `dt` simulated time.
    ///
    /// # Processing Pipeline
    ///
    /// 1. **Events**: collect queued events and dispatch them
    /// 2. **Systems**: poll credits, update pages, apply transitions
    /// 3. **Notices**: move this tick's notices into the log
    /// 4. **Bus**: clear every remaining message
    pub fn tick(&mut self, dt: Duration) -> TickControl {
        self.runtime.tick(dt)
    }

    /// Ticks at the configured rate until `Shutdown` arrives or every
    /// handed-out sender has been dropped.
    pub fn run(self) {
        let Cafe { sender, mut runtime } = self;
        drop(sender);

        let frame = Duration::from_secs_f64(1.0 / runtime.context.config.tps);
        info!(target: "cafe", "Café running (TPS: {})", runtime.context.config.tps);

        loop {
            let frame_start = Instant::now();

            if runtime.tick(frame) == TickControl::Exit {
                break;
            }

            let elapsed = frame_start.elapsed();
            if elapsed < frame {
                thread::sleep(frame - elapsed);
            }
        }

        info!(target: "cafe", "Café shut down");
    }

    /// Exits every page. Later ticks only drain the channel.
    pub fn shutdown(&mut self) {
        self.runtime.shutdown();
    }

    //--- Query API --------------------------------------------------------

    pub fn is_running(&self) -> bool {
        self.runtime.running
    }

    /// Route of the page receiving events.
    pub fn current_route(&self) -> Option<Route> {
        self.runtime.systems.pages.top()
    }

    /// Typed access to a registered page.
    pub fn page<T: 'static>(&self, route: Route) -> Option<&T> {
        self.runtime.systems.pages.page::<T>(route)
    }

    pub fn desktop(&self) -> Option<&DesktopPage<E>> {
        self.page::<DesktopPage<E>>(Route::Desktop)
    }

    pub fn context(&self) -> &GlobalContext {
        &self.runtime.context
    }

    pub fn context_mut(&mut self) -> &mut GlobalContext {
        &mut self.runtime.context
    }

    /// Every notice raised so far, oldest first.
    pub fn notices(&self) -> &[Notice] {
        &self.runtime.notices
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.runtime.notices)
    }

    /// Waits up to `timeout` for outstanding credits calls.
    pub fn settle_credits(&mut self, timeout: Duration) -> bool {
        self.runtime.context.credits.settle(timeout)
    }
}

impl<E: HostEnvironment> Runtime<E> {
    fn tick(&mut self, dt: Duration) -> TickControl {
        let control = self.collector.collect_frame();

        if self.running {
            for event in self.collector.take_events() {
                match event {
                    CafeEvent::Navigate(route) => self.context.navigate(route),
                    other => self.systems.handle(&other, &mut self.context),
                }
            }

            self.systems.update(dt, &mut self.context);

            let raised = self.context.message_bus.drain::<Notice>();
            for notice in &raised {
                info!(target: "cafe", "Notice: {}", notice);
            }
            self.notices.extend(raised);
            self.context.message_bus.clear_all();
        }

        if control == TickControl::Exit {
            self.shutdown();
        }
        control
    }

    fn shutdown(&mut self) {
        if !self.running {
            return;
        }
        debug!(target: "cafe", "Exiting pages {:?}", self.systems.pages.stack());
        self.systems.pages.shutdown(&mut self.context);
        self.context.message_bus.clear_all();
        self.running = false;
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
