//=========================================================================
// Cyber Café Demo
//
// Walks one visitor through the café on simulated time: door, floor,
// station, credit loading, a game of Pac-Man, and back out.
//
// Environment:
//   RUST_LOG        log filter (default: info)
//   CAFE_CONFIG     path to a JSON config file
//   CAFE_REMOTE     when set, use the HTTP credits and game services
//   CAFE_TOKEN      bearer token for the remote services
//
//=========================================================================

use std::env;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use log::{error, info, warn};

use cybercafe_sim::core::credits::{CreditsApi, HttpCreditsClient, InMemoryCredits};
use cybercafe_sim::core::game_api::GameSessionClient;
use cybercafe_sim::core::input::{GameInput, KeyCode};
use cybercafe_sim::pages::LOAD_OPTIONS;
use cybercafe_sim::prelude::*;

const FRAME: Duration = Duration::from_millis(16);
const DEMO_TOKEN: &str = "demo-visitor";

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match env::var("CAFE_CONFIG") {
        Ok(path) => match CafeConfig::from_json_file(&path) {
            Ok(config) => config,
            Err(e) => {
                error!(target: "demo", "Could not load {}: {}", path, e);
                return ExitCode::FAILURE;
            }
        },
        Err(_) => CafeConfig::default(),
    };

    let token = env::var("CAFE_TOKEN").unwrap_or_else(|_| DEMO_TOKEN.to_string());
    let credits: Arc<dyn CreditsApi> = if env::var_os("CAFE_REMOTE").is_some() {
        check_game_service(&config, &token);
        match HttpCreditsClient::new(&config.credits) {
            Ok(client) => Arc::new(client),
            Err(e) => {
                error!(target: "demo", "Credits client unavailable: {}", e);
                return ExitCode::FAILURE;
            }
        }
    } else {
        Arc::new(InMemoryCredits::new().with_account(&token, 200))
    };

    let mut cafe = CafeBuilder::new()
        .config(config)
        .identity(Arc::new(StaticIdentity::signed_in(&token)))
        .credits_api(credits)
        .build();

    walkthrough(&mut cafe);

    for notice in cafe.take_notices() {
        info!(target: "demo", "{}", notice);
    }
    ExitCode::SUCCESS
}

//--- Walkthrough ---------------------------------------------------------

fn walkthrough(cafe: &mut Cafe) {
    let sender = cafe.sender();
    let send = |event: CafeEvent| {
        if let Err(e) = sender.send(event) {
            warn!(target: "demo", "Event dropped: {}", e);
        }
    };

    send(CafeEvent::DoorClicked);
    run_for(cafe, Duration::from_millis(1_300));

    send(CafeEvent::StationClicked(1));
    run_for(cafe, Duration::from_secs(2));
    cafe.settle_credits(Duration::from_secs(5));
    info!(
        target: "demo",
        "At {:?} with {} account credits",
        cafe.current_route(),
        cafe.context().credits.account_credits()
    );

    send(CafeEvent::GameTileClicked("pacman".into()));
    send(CafeEvent::LoadCredits(LOAD_OPTIONS[0]));
    send(CafeEvent::GameTileClicked("pacman".into()));
    run_for(cafe, Duration::from_millis(500));

    if let Some(desktop) = cafe.desktop() {
        info!(
            target: "demo",
            "Slot {:?}, playing {:?}",
            desktop.slot_state(),
            desktop.host().active_game_name()
        );
    }

    for key in [KeyCode::ArrowLeft, KeyCode::ArrowUp, KeyCode::ArrowRight] {
        send(CafeEvent::Key(GameInput::KeyDown(key)));
        run_for(cafe, Duration::from_millis(250));
    }

    send(CafeEvent::CloseGameModal);
    send(CafeEvent::Back);
    run_for(cafe, FRAME);
    if let Some(report) = cafe.desktop().and_then(|d| d.last_report()) {
        info!(target: "demo", "Teardown: {:?}", report);
    }

    send(CafeEvent::Shutdown);
    run_for(cafe, FRAME);
}

fn run_for(cafe: &mut Cafe, total: Duration) {
    let mut elapsed = Duration::ZERO;
    while elapsed < total {
        if cafe.tick(FRAME) == TickControl::Exit {
            return;
        }
        elapsed += FRAME;
    }
}

//--- Remote Services -----------------------------------------------------

fn check_game_service(config: &CafeConfig, token: &str) {
    let mut client = match GameSessionClient::new(&config.game_api) {
        Ok(client) => client,
        Err(e) => {
            warn!(target: "demo", "Game service client unavailable: {}", e);
            return;
        }
    };
    client.set_token(token);

    match client.health() {
        Ok(health) => info!(target: "demo", "Game service: {}", health.status),
        Err(e) => warn!(target: "demo", "Game service unreachable: {}", e),
    }
    match client.leaderboard("pacman", 5) {
        Ok(board) => info!(
            target: "demo",
            "Pac-Man leaderboard: {} entries of {} players",
            board.leaderboard.len(),
            board.total_players
        ),
        Err(e) => warn!(target: "demo", "Leaderboard unavailable: {}", e),
    }
}
