//
// Copyright 2025-2026 Hans W. Uhlig. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

use clap::Parser;
use fauna_common::{Position, SkillId};
use fauna_server::ai::AiManager;
use fauna_server::config::{Arguments, Configuration};
use fauna_server::ecs::components::{
    Combatant, CreatureFlags, EntityUuid, Name, Player, Race, SkillRank, Skills, SpawnPoint,
    Speed, StatusEffects, Transform,
};
use fauna_server::ecs::context::WorldContext;
use fauna_server::ecs::events::GameEvent;
use fauna_server::ecs::systems::{ConditionSystem, MovementSystem, WorldRegion};
use fauna_server::ecs::{EcsEntity, GameWorld};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing_subscriber::EnvFilter;

/// Simulation step of the demo world
const TICK_MS: u64 = 50;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load arguments from the command line
    let arguments: Arguments = Parser::parse();

    // Load environment variables from .env file if specified
    if let Some(ref env_file) = arguments.env_file {
        if std::path::Path::new(env_file).exists() {
            dotenv::from_filename(env_file).ok();
        }
    } else {
        dotenv::dotenv().ok();
    }

    // Load configuration from a file with environment variable substitution
    let config = Configuration::load(&arguments.config_file)?;

    // Initialize tracing/logging, RUST_LOG wins over the configured filter
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.logging.filter.as_str()))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(true)
        .with_level(true)
        .with_ansi(true)
        .init();

    tracing::debug!("Configuration loaded: {:?}", config);
    tracing::info!("Starting Fauna demo world...");

    let context = Arc::new(WorldContext::new());
    let region = WorldRegion::new(config.region.player_range)
        .with_walls(config.region.walls.iter().copied());
    let manager = AiManager::new(Arc::clone(&context), Arc::new(region), config.ai.clone())
        .with_activation_range(config.region.activation_range);

    // Populate the world
    let mut pending = Vec::new();
    let player = {
        let mut world = context.entities().write().await;
        for i in 0..config.demo.ratmen {
            let position = Position::new(i as i32 * 300 - 300, 800);
            let rat = spawn_ratman(&mut world, position);
            pending.push((rat, "ratman"));
        }
        for i in 0..config.demo.magicians {
            let position = Position::new(i as i32 * 300, -900);
            let cat = spawn_catsith_magician(&mut world, position);
            pending.push((cat, "catsith_magician"));
        }
        spawn_player(&mut world, Position::new(0, 0))
    };
    for (entity, archetype) in pending.drain(..) {
        if let Err(e) = manager.attach(entity, archetype).await {
            tracing::error!("Failed to attach {} AI to {:?}: {}", archetype, entity, e);
        }
    }
    tracing::info!(
        "World populated with {} creatures: {:?}",
        manager.len(),
        manager.registry().names().collect::<Vec<_>>()
    );

    let mut movement = MovementSystem::new(context.events().clone());
    let mut conditions = ConditionSystem::new(context.events().clone());

    let mut ticker = tokio::time::interval(Duration::from_millis(TICK_MS));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let duration = config.demo.duration_secs;
    let deadline = async move {
        if duration == 0 {
            std::future::pending::<()>().await
        } else {
            tokio::time::sleep(Duration::from_secs(duration)).await
        }
    };
    tokio::pin!(deadline);

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted, shutting down");
                break;
            }
            _ = &mut deadline => {
                tracing::info!("Demo finished after {}s", duration);
                break;
            }
            _ = ticker.tick() => {
                {
                    let mut world = context.entities().write().await;
                    movement.update(&mut world, TICK_MS as f64);
                    conditions.update(&mut world, TICK_MS as f64);
                }

                manager.activate_around(player).await;
                for event in manager.pump().await {
                    report(&event);
                }
                manager.reap().await;
            }
        }
    }

    manager.shutdown();
    Ok(())
}

fn spawn_ratman(world: &mut GameWorld, position: Position) -> EcsEntity {
    let skills = Skills::new()
        .with(SkillId::COMBAT_MASTERY, SkillRank::default())
        .with(SkillId::SMASH, SkillRank::new(1200, 1))
        .with(SkillId::DEFENSE, SkillRank::new(1000, 1))
        .with(SkillId::COUNTERATTACK, SkillRank::new(1000, 1));

    world.spawn((
        EntityUuid::new(),
        Name::new("Rat Man"),
        Transform::new(position, 0),
        SpawnPoint::new(position),
        Speed::default(),
        Combatant::new(),
        CreatureFlags::new(),
        StatusEffects::new(),
        skills,
        Race::new(50002, "/ratman/"),
    ))
}

fn spawn_catsith_magician(world: &mut GameWorld, position: Position) -> EcsEntity {
    let skills = Skills::new()
        .with(SkillId::COMBAT_MASTERY, SkillRank::default())
        .with(SkillId::SMASH, SkillRank::new(1200, 1))
        .with(SkillId::DEFENSE, SkillRank::new(1000, 1))
        .with(SkillId::COUNTERATTACK, SkillRank::new(1000, 1))
        .with(SkillId::WINDMILL, SkillRank::new(1500, 1))
        .with(SkillId::ICEBOLT, SkillRank::new(800, 2).with_range(1500));

    world.spawn((
        EntityUuid::new(),
        Name::new("Cat Sith Magician"),
        Transform::new(position, 64),
        SpawnPoint::new(position),
        Speed::default(),
        Combatant::new(),
        CreatureFlags::new(),
        StatusEffects::new(),
        skills,
        Race::new(50401, "/catsith/"),
    ))
}

fn spawn_player(world: &mut GameWorld, position: Position) -> EcsEntity {
    world.spawn((
        EntityUuid::new(),
        Name::new("Wanderer"),
        Transform::new(position, 0),
        Player::new(),
        Race::new(10001, "/pc/human/"),
        CreatureFlags::new(),
        StatusEffects::new(),
        Combatant::new(),
    ))
}

/// Log what a client near the action would be told
fn report(event: &GameEvent) {
    match event {
        GameEvent::Chat { entity, message } => {
            tracing::info!(entity = ?entity, "says \"{}\"", message)
        }
        GameEvent::CombatTarget {
            entity,
            target,
            mode,
        } => tracing::info!(entity = ?entity, "targets {:?} ({:?})", target, mode),
        GameEvent::CreatureHit { action } => tracing::info!(
            "{:?} hit {:?} with {}",
            action.attacker,
            action.target,
            action.attacker_skill
        ),
        GameEvent::CreatureDied { creature, killer } => {
            tracing::info!("{:?} was killed by {:?}", creature, killer)
        }
        other => tracing::trace!("{:?}", other),
    }
}
