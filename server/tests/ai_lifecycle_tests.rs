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

//! Integration tests for AI activation, heartbeats and event routing

use fauna_common::{Position, SkillId, TargetMode};
use fauna_server::ai::{AiError, AiManager, AiSetup, AiState, ArchetypeRegistry};
use fauna_server::config::AiConfig;
use fauna_server::ecs::components::{
    Combatant, CreatureFlags, Name, Player, Race, Skills, SpawnPoint, Speed, StatusEffects,
    Transform,
};
use fauna_server::ecs::context::WorldContext;
use fauna_server::ecs::events::{GameEvent, TargetAction};
use fauna_server::ecs::systems::WorldRegion;
use fauna_server::ecs::EcsEntity;
use std::sync::Arc;
use std::time::Duration;

/// Stands still and notices players from far away
fn sentry(ai: &mut AiSetup) {
    ai.hates(["/pc/"]).set_aggro_radius(1000).idle(|s| {
        s.wait(1000, 2000);
    });
}

fn manager() -> AiManager {
    let mut registry = ArchetypeRegistry::with_builtin();
    registry.register("sentry", sentry);

    let config = AiConfig {
        seed: Some(5),
        ..AiConfig::default()
    };
    AiManager::new(
        Arc::new(WorldContext::new()),
        Arc::new(WorldRegion::new(3000)),
        config,
    )
    .with_registry(registry)
}

async fn spawn_creature(context: &WorldContext, position: Position) -> EcsEntity {
    context
        .spawn((
            Name::new("Sentry"),
            Transform::new(position, 0),
            SpawnPoint::new(position),
            Speed::default(),
            Combatant::new(),
            CreatureFlags::new(),
            StatusEffects::new(),
            Skills::new(),
            Race::new(50001, "/rat/"),
        ))
        .await
}

async fn spawn_player(context: &WorldContext, position: Position) -> EcsEntity {
    context
        .spawn((
            Name::new("Player"),
            Transform::new(position, 0),
            Player::new(),
            Race::new(10001, "/pc/human/"),
            CreatureFlags::new(),
            StatusEffects::new(),
            Combatant::new(),
        ))
        .await
}

async fn set_connected(context: &WorldContext, player: EcsEntity, connected: bool) {
    let world = context.entities().read().await;
    world.get::<&mut Player>(player).unwrap().connected = connected;
}

#[tokio::test]
async fn test_attach_unknown_archetype() {
    let manager = manager();
    let creature = spawn_creature(manager.context(), Position::new(0, 0)).await;

    let result = manager.attach(creature, "gargoyle").await;
    assert!(matches!(result, Err(AiError::UnknownArchetype(name)) if name == "gargoyle"));
    assert!(manager.get(creature).is_none());
}

#[tokio::test(start_paused = true)]
async fn test_activated_creature_escalates_to_aggro() {
    let manager = manager();
    let context = Arc::clone(manager.context());
    let creature = spawn_creature(&context, Position::new(0, 0)).await;
    let player = spawn_player(&context, Position::new(300, 0)).await;
    let instance = manager.attach(creature, "sentry").await.unwrap();

    assert_eq!(manager.activate_around(player).await, 1);

    let mut modes = Vec::new();
    for _ in 0..80 {
        tokio::time::sleep(Duration::from_millis(100)).await;
        for event in manager.pump().await {
            if let GameEvent::CombatTarget {
                entity,
                target: Some(target),
                mode,
            } = event
                && entity == creature
                && target == player
            {
                modes.push(mode);
            }
        }
    }

    assert_eq!(modes, vec![TargetMode::Alert, TargetMode::Aggro]);
    assert_eq!(instance.state().await, AiState::Aggro);
    assert!(instance.is_active());
}

#[tokio::test(start_paused = true)]
async fn test_deactivates_without_observers_after_min_run_time() {
    let manager = manager();
    let context = Arc::clone(manager.context());
    let creature = spawn_creature(&context, Position::new(0, 0)).await;
    let player = spawn_player(&context, Position::new(300, 0)).await;
    let instance = manager.attach(creature, "sentry").await.unwrap();

    manager.activate_around(player).await;
    tokio::time::sleep(Duration::from_millis(500)).await;
    assert_eq!(instance.state().await, AiState::Aware);

    set_connected(&context, player, false).await;
    tokio::time::sleep(Duration::from_millis(1000)).await;
    // Still inside the minimum run time
    assert!(instance.is_active());

    tokio::time::sleep(Duration::from_millis(1000)).await;
    assert!(!instance.is_active());
    assert_eq!(instance.state().await, AiState::Idle);
    let world = context.entities().read().await;
    assert_eq!(world.get::<&Combatant>(creature).unwrap().target, None);
    drop(world);

    set_connected(&context, player, true).await;
    assert_eq!(manager.activate_around(player).await, 1);
}

#[tokio::test(start_paused = true)]
async fn test_heartbeat_change_takes_effect() {
    let manager = manager();
    let context = Arc::clone(manager.context());
    let slow = spawn_creature(&context, Position::new(0, 0)).await;
    let fast = spawn_creature(&context, Position::new(0, 100)).await;
    let player = spawn_player(&context, Position::new(300, 0)).await;
    let slow = manager.attach(slow, "sentry").await.unwrap();
    let fast = manager.attach(fast, "sentry").await.unwrap();

    slow.set_heartbeat(1000);
    assert_eq!(fast.heartbeat_ms(), 250);
    assert_eq!(manager.activate_around(player).await, 2);

    tokio::time::sleep(Duration::from_millis(2500)).await;

    let slow_time = slow.brain().lock().await.mind().timestamp();
    let fast_time = fast.brain().lock().await.mind().timestamp();
    assert!(slow_time <= 2000.0, "slow creature at {slow_time}");
    assert!(fast_time >= 2250.0, "fast creature at {fast_time}");
}

#[tokio::test(start_paused = true)]
async fn test_detach_stops_the_driver() {
    let manager = manager();
    let context = Arc::clone(manager.context());
    let creature = spawn_creature(&context, Position::new(0, 0)).await;
    let player = spawn_player(&context, Position::new(300, 0)).await;
    let instance = manager.attach(creature, "sentry").await.unwrap();

    manager.activate_around(player).await;
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert!(manager.detach(creature).await);
    assert!(!instance.is_active());

    let before = instance.brain().lock().await.mind().timestamp();
    tokio::time::sleep(Duration::from_millis(1000)).await;
    assert_eq!(instance.brain().lock().await.mind().timestamp(), before);
}

#[tokio::test]
async fn test_pump_routes_hits_to_reactions() {
    let manager = manager();
    let context = Arc::clone(manager.context());
    let creature = spawn_creature(&context, Position::new(0, 0)).await;
    let player = spawn_player(&context, Position::new(300, 0)).await;
    let instance = manager.attach(creature, "ratman").await.unwrap();

    instance.aggro_creature(&context, player).await;
    assert_eq!(instance.state().await, AiState::Aggro);

    let action = TargetAction::new(player, creature, SkillId::COMBAT_MASTERY)
        .with_target_skill(SkillId::DEFENSE);
    context.events().publish(GameEvent::CreatureHit { action });

    let drained = manager.pump().await;
    assert!(
        drained
            .iter()
            .any(|event| matches!(event, GameEvent::CreatureHit { .. }))
    );
    assert_eq!(
        instance.brain().lock().await.cursor_label(),
        Some("reaction:DefenseHit:*")
    );
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_disposes_everything() {
    let manager = manager();
    let context = Arc::clone(manager.context());
    let player = spawn_player(&context, Position::new(0, 0)).await;
    let mut instances = Vec::new();
    for i in 0..3 {
        let creature = spawn_creature(&context, Position::new(i * 200, 0)).await;
        instances.push(manager.attach(creature, "ratman").await.unwrap());
    }

    assert_eq!(manager.activate_around(player).await, 3);
    assert_eq!(manager.active_count(), 3);

    manager.shutdown();
    assert!(manager.is_empty());
    assert!(instances.iter().all(|instance| instance.is_disposed()));
    assert!(instances.iter().all(|instance| !instance.is_active()));
}
