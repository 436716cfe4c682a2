//=========================================================================
// Café Scenarios
//=========================================================================
//
// End-to-end behaviour of the café components through the public API:
// camera sequencing, overlays, the game slot lifecycle and credits.
//
//=========================================================================

use std::sync::Arc;
use std::time::Duration;

use glam::Vec3;

use cybercafe_sim::core::config::CafeConfig;
use cybercafe_sim::core::credits::{CreditsSession, InMemoryCredits, TransferError};
use cybercafe_sim::core::game_host::{
    GameCatalog, GameHost, HeadlessEnvironment, HostEvent, HostSettings, SlotState,
};
use cybercafe_sim::core::identity::StaticIdentity;
use cybercafe_sim::core::interaction::{ClickOutcome, InteractionRouter};
use cybercafe_sim::core::navigator::{CameraPose, CameraTarget, RoomBounds, SceneNavigator};
use cybercafe_sim::prelude::*;

const TOKEN: &str = "scenario-visitor";
const FRAME: Duration = Duration::from_millis(16);

fn room() -> RoomBounds {
    RoomBounds::new(Vec3::new(-10.0, 0.5, -10.0), Vec3::new(10.0, 8.0, 10.0))
}

fn start_pose() -> CameraPose {
    CameraPose::new(Vec3::new(0.0, 4.0, 8.0), Vec3::ZERO)
}

fn signed_in_cafe(account: u64, environment: HeadlessEnvironment) -> Cafe {
    let mut cafe = CafeBuilder::new()
        .identity(Arc::new(StaticIdentity::signed_in(TOKEN)))
        .credits_api(Arc::new(InMemoryCredits::new().with_account(TOKEN, account)))
        .environment(environment)
        .build();
    cafe.sender().send(CafeEvent::Navigate(Route::Desktop)).unwrap();
    cafe.tick(FRAME);
    assert!(cafe.settle_credits(Duration::from_secs(2)));
    cafe
}

fn host_with(env: HeadlessEnvironment) -> GameHost<HeadlessEnvironment> {
    GameHost::new(env, "game-modal", HostSettings::default())
}

fn pump(host: &mut GameHost<HeadlessEnvironment>, total: Duration) -> Vec<HostEvent> {
    let mut events = Vec::new();
    let mut elapsed = Duration::ZERO;
    while elapsed < total {
        events.extend(host.update(Duration::from_millis(10)));
        elapsed += Duration::from_millis(10);
    }
    events
}

//=========================================================================
// Scene Navigator
//=========================================================================

#[test]
fn newer_camera_target_replaces_the_old_one() {
    let mut navigator = SceneNavigator::new(start_pose(), room());
    let first = CameraTarget::new(Vec3::new(6.0, 2.0, -6.0), Vec3::new(6.0, 0.5, -6.0), 1.0);
    let second = CameraTarget::new(Vec3::new(-6.0, 2.0, 4.0), Vec3::new(-6.0, 1.0, 4.0), 1.0);

    let first_id = navigator.set_target(Some(first));
    for _ in 0..10 {
        navigator.update(0.03);
    }
    let second_id = navigator.set_target(Some(second));
    assert_ne!(first_id, second_id);

    let mut arrivals = Vec::new();
    for _ in 0..120 {
        if let Some(arrived) = navigator.update(0.016) {
            arrivals.push(arrived.transition);
        }
        assert_ne!(navigator.pose(), first.pose());
    }

    assert_eq!(arrivals, vec![second_id.unwrap()]);
    assert_eq!(navigator.pose(), second.pose());
    assert!(!navigator.is_animating());
}

#[test]
fn camera_never_leaves_the_room() {
    let bounds = room();
    let mut navigator = SceneNavigator::new(start_pose(), bounds);
    let outside = CameraTarget::new(Vec3::new(40.0, 20.0, -40.0), Vec3::ZERO, 0.5);

    navigator.set_target(Some(outside));
    for _ in 0..60 {
        navigator.update(0.016);
        assert!(bounds.contains(navigator.pose().position));
    }

    for _ in 0..20 {
        navigator.free_look(Vec3::new(-5.0, -5.0, 5.0), Vec3::ZERO);
        assert!(bounds.contains(navigator.pose().position));
    }
}

//=========================================================================
// Interaction Router
//=========================================================================

#[test]
fn occupied_station_overlay_expires_without_residue() {
    let config = CafeConfig::default();
    let mut router = InteractionRouter::from_config(&config);

    let first = router.on_station_click(2).unwrap();
    let again = router.on_station_click(2).unwrap();

    let ClickOutcome::Overlay { text, .. } = first else {
        panic!("expected overlay, got {:?}", first);
    };
    assert!(router.pool().contains(&text));
    assert!(matches!(again, ClickOutcome::Overlay { station: 2, .. }));
    assert_eq!(router.overlays().count(), 1);

    let requests = router.update(config.interaction.overlay_display());

    assert!(requests.is_empty());
    assert_eq!(router.overlays().count(), 0);
    assert_eq!(router.pending_timers(), 0);
}

//=========================================================================
// External Game Host
//=========================================================================

#[test]
fn bundle_scripts_load_in_declared_order() {
    let env = HeadlessEnvironment::with_stock_bundles()
        .with_latency("/tetris/js/blockset.js", 2)
        .with_latency("/tetris/js/game.js", 1);
    let mut host = host_with(env);
    host.open(GameCatalog::stock().get("tetris").unwrap()).unwrap();

    pump(&mut host, Duration::from_millis(100));

    assert_eq!(
        host.environment().load_log(),
        &["/tetris/js/blockset.js", "/tetris/js/game.js", "/tetris/js/audio.js"]
    );
}

#[test]
fn script_failure_stops_remaining_loads() {
    let env = HeadlessEnvironment::with_stock_bundles().failing("/pacman/modernizr-1.5.min.js");
    let mut host = host_with(env);
    host.open(GameCatalog::stock().get("pacman").unwrap()).unwrap();

    let events = pump(&mut host, Duration::from_millis(500));

    assert!(matches!(events.as_slice(), [HostEvent::Failed { .. }]));
    assert_eq!(host.environment().load_log(), &["/pacman/modernizr-1.5.min.js"]);
    assert!(matches!(host.state(), SlotState::Failed(_)));
}

#[test]
fn missing_entry_mounts_fallback_and_tears_it_down() {
    let mut host = host_with(HeadlessEnvironment::with_stock_bundles());
    let session = host.open(GameCatalog::stock().get("tetris").unwrap()).unwrap();

    let events = pump(&mut host, Duration::from_millis(200));
    assert_eq!(events, vec![HostEvent::Ready { session, fallback: true }]);
    assert!(host.fallback_active());

    let report = host.teardown();
    assert_eq!(report.games_shut_down, 1);
    assert!(report.container_cleared);
    assert_eq!(host.state(), &SlotState::TornDown);
    assert_eq!(host.registered_timers(), 0);
}

#[test]
fn teardown_twice_removes_nothing_the_second_time() {
    let mut host = host_with(HeadlessEnvironment::with_stock_bundles());
    host.open(GameCatalog::stock().get("pacman").unwrap()).unwrap();
    pump(&mut host, Duration::from_millis(300));

    let first = host.teardown();
    let second = host.teardown();

    assert!(!first.is_empty());
    assert!(second.is_empty());
    let removals = host.environment().removals().len();
    host.teardown();
    assert_eq!(host.environment().removals().len(), removals);
}

#[test]
fn nothing_fires_after_teardown() {
    let mut host = host_with(HeadlessEnvironment::with_stock_bundles());
    host.open(GameCatalog::stock().get("pacman").unwrap()).unwrap();
    pump(&mut host, Duration::from_millis(300));
    host.dispatch_input(GameInput::KeyDown(KeyCode::ArrowLeft));
    assert!(host.pending_timers() > 0);

    host.teardown();

    assert_eq!(host.pending_timers(), 0);
    assert_eq!(host.registered_timers(), 0);
    assert_eq!(host.registered_listeners(), 0);
    assert!(pump(&mut host, Duration::from_secs(10)).is_empty());
    assert_eq!(host.dispatch_input(GameInput::KeyDown(KeyCode::ArrowUp)), 0);
}

//=========================================================================
// Credits Session
//=========================================================================

#[test]
fn oversized_transfer_changes_nothing() {
    let identity = StaticIdentity::signed_in(TOKEN);
    let mut credits = CreditsSession::new(Arc::new(InMemoryCredits::new().with_account(TOKEN, 80)));
    credits.refresh(&identity);
    assert!(credits.settle(Duration::from_secs(2)));

    let result = credits.transfer_to_terminal(100);

    assert_eq!(
        result,
        Err(TransferError::Insufficient {
            requested: 100,
            available: 80
        })
    );
    assert_eq!(credits.account_credits(), 80);
    assert_eq!(credits.loaded_credits(), 0);
}

#[test]
fn sign_out_discards_replies_in_flight() {
    let identity = StaticIdentity::signed_in(TOKEN);
    let api = InMemoryCredits::new()
        .with_account(TOKEN, 500)
        .with_latency(Duration::from_millis(50));
    let mut credits = CreditsSession::new(Arc::new(api));

    credits.refresh(&identity);
    assert!(credits.is_loading());
    credits.sign_out();

    assert!(credits.settle(Duration::from_secs(2)));
    assert!(credits.poll().is_empty());
    assert_eq!(credits.balance(), CreditsBalance::default());
    assert!(!credits.is_loading());
}

#[test]
fn launch_without_funds_prompts_purchase() {
    let mut cafe = signed_in_cafe(40, HeadlessEnvironment::with_stock_bundles());

    cafe.sender()
        .send(CafeEvent::GameTileClicked("pacman".into()))
        .unwrap();
    cafe.tick(FRAME);

    let desktop = cafe.desktop().unwrap();
    assert_eq!(desktop.purchase_prompt(), Some("pacman"));
    assert_eq!(desktop.slot_state(), &SlotState::Idle);
    assert_eq!(cafe.context().credits.loaded_credits(), 0);
    assert_eq!(
        cafe.notices(),
        &[Notice::PurchaseRequired {
            game: "Pac-Man".into(),
            cost: 50
        }]
    );

    cafe.sender().send(CafeEvent::ConfirmPurchaseFlow).unwrap();
    cafe.tick(FRAME);
    assert_eq!(cafe.current_route(), Some(Route::Payment));
}

#[test]
fn loaded_credits_pay_for_a_launch() {
    let env = HeadlessEnvironment::with_stock_bundles().with_latency("/pacman/pacman.js", 3);
    let mut cafe = signed_in_cafe(200, env);
    assert_eq!(cafe.desktop().unwrap().slot_state(), &SlotState::Idle);

    cafe.sender().send(CafeEvent::LoadCredits(100)).unwrap();
    cafe.tick(FRAME);
    assert_eq!(
        cafe.context().credits.balance(),
        CreditsBalance {
            account_credits: 100,
            loaded_credits: 100
        }
    );

    cafe.sender()
        .send(CafeEvent::GameTileClicked("pacman".into()))
        .unwrap();
    cafe.tick(FRAME);
    assert_eq!(cafe.context().credits.loaded_credits(), 50);
    assert_eq!(cafe.desktop().unwrap().slot_state(), &SlotState::Loading);

    for _ in 0..30 {
        cafe.tick(FRAME);
    }
    let desktop = cafe.desktop().unwrap();
    assert_eq!(desktop.slot_state(), &SlotState::Ready);
    assert_eq!(desktop.host().active_game_name(), Some("Pac-Man"));
}

#[test]
fn leaving_the_desktop_tears_the_game_down() {
    let mut cafe = signed_in_cafe(200, HeadlessEnvironment::with_stock_bundles());
    let sender = cafe.sender();

    sender.send(CafeEvent::LoadCredits(100)).unwrap();
    sender.send(CafeEvent::GameTileClicked("pacman".into())).unwrap();
    for _ in 0..5 {
        cafe.tick(FRAME);
    }
    assert!(cafe.desktop().unwrap().modal_open());

    sender.send(CafeEvent::Navigate(Route::Cafe)).unwrap();
    cafe.tick(FRAME);

    let desktop = cafe.desktop().unwrap();
    assert!(!desktop.modal_open());
    assert_eq!(desktop.host().pending_timers(), 0);
    assert_eq!(cafe.current_route(), Some(Route::Cafe));
}
