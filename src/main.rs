//! Assassin Game Server
//!
//! Demo driver for the mission-assignment engine: builds a game, walks an
//! elimination chain, and verifies deterministic regeneration.

use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use assassin::{
    current_assignment_for, time_until_rotation, BuildOptions, GameService, MemoryStore,
    POLL_INTERVAL_MS, VERSION,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Assassin Server v{}", VERSION);
    info!("Client poll interval: {} ms", POLL_INTERVAL_MS);

    demo_game().await
}

/// Demo function to exercise the engine end to end.
async fn demo_game() -> Result<()> {
    info!("=== Starting Demo Game ===");

    let service = GameService::new(Arc::new(MemoryStore::new()));

    let players: Vec<String> = ["Ava", "Ben", "Cleo", "Dmitri"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    let rooms: Vec<String> = ["kitchen", "attic", "garden"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    let objects: Vec<String> = ["spoon", "candlestick", "rope"]
        .iter()
        .map(|s| s.to_string())
        .collect();

    let state = service
        .create_game(
            &players,
            &rooms,
            &objects,
            BuildOptions {
                room_code: Some("4217".into()),
                host_pin: Some("0042".into()),
                rotation_interval_secs: Some(600),
                ..BuildOptions::default()
            },
        )
        .await?;

    info!("Room code: {}", state.room_number);
    info!("Game ID: {}", state.game_id);

    let now = Utc::now();
    for player in &state.players {
        let mission = current_assignment_for(&state, &player.name, now)
            .expect("every player has a mission");
        info!(
            "{} hunts {} in the {} with the {}",
            player.name, mission.target_name, mission.room, mission.object
        );
    }
    if let Some(remaining) = time_until_rotation(&state, now) {
        info!("Rooms rotate in {}s", remaining.num_seconds());
    }

    // Everyone views their mission
    for player in &players {
        service.claim("4217", player).await?;
    }
    info!("All missions claimed");

    // A chain of kills: the first player works through two inherited hunts
    let hunter = state.players[0].name.clone();
    for _ in 0..2 {
        let current = service.load_game("4217").await?;
        let target = current
            .assignment(&hunter)
            .expect("hunter has a mission")
            .target_name
            .clone();
        let after = service.eliminate("4217", &hunter, &target).await?;
        let inherited = after.assignment(&hunter).expect("inherited mission");
        info!(
            "{} eliminated {} and now hunts {}",
            hunter, target, inherited.target_name
        );
    }

    // The last other survivor gives up
    let current = service.load_game("4217").await?;
    let quitter = current
        .living_players()
        .map(|p| p.name.clone())
        .find(|name| name != &hunter)
        .expect("someone else is still alive");
    service.self_report("4217", &quitter).await?;
    info!("{} self-reported their elimination", quitter);

    // Print the audit trail
    let ended = service.load_game("4217").await?;
    info!("=== Elimination Record ===");
    for record in &ended.eliminations {
        info!("{:?}", record);
    }
    info!(
        "Survivors: {:?}",
        ended.living_players().map(|p| &p.name).collect::<Vec<_>>()
    );

    // Verify determinism by regenerating from the stored config
    info!("=== Verifying Determinism ===");
    let regenerated = service.regenerate("4217").await?;
    if regenerated.assignments_by_name == state.assignments_by_name {
        info!("REGENERATION VERIFIED: assignments identical");
    } else {
        info!("REGENERATION FAILURE: assignments differ!");
    }

    Ok(())
}
