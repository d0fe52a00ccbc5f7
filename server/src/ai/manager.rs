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

//! AI manager
//!
//! Owns every AI instance in the world. The simulation attaches creatures as
//! they spawn, wakes them up around players and feeds them combat events.

use crate::ai::brain::Brain;
use crate::ai::branch::Dice;
use crate::ai::error::{AiError, AiResult};
use crate::ai::events::AiEvent;
use crate::ai::instance::AiInstance;
use crate::ai::registry::ArchetypeRegistry;
use crate::ai::services::AiServices;
use crate::config::AiConfig;
use crate::ecs::EcsEntity;
use crate::ecs::components::{Disposition, Transform};
use crate::ecs::context::WorldContext;
use crate::ecs::events::GameEvent;
use crate::ecs::systems::{Region, SkillManager};
use dashmap::DashMap;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::{Arc, Mutex};

pub struct AiManager {
    context: Arc<WorldContext>,
    services: AiServices,
    registry: ArchetypeRegistry,
    config: AiConfig,
    activation_range: i32,
    instances: DashMap<EcsEntity, Arc<AiInstance>>,
    seeds: Mutex<StdRng>,
}

impl AiManager {
    /// Create a manager with the built-in archetypes and skill handlers
    pub fn new(context: Arc<WorldContext>, region: Arc<dyn Region>, config: AiConfig) -> Self {
        let services = AiServices::new(
            region,
            Arc::new(SkillManager::with_builtin_handlers()),
            context.events().clone(),
        );
        let seeds = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_rng(&mut rand::rng()),
        };

        Self {
            context,
            services,
            registry: ArchetypeRegistry::with_builtin(),
            config,
            activation_range: 3000,
            instances: DashMap::new(),
            seeds: Mutex::new(seeds),
        }
    }

    /// Replace the archetype registry
    pub fn with_registry(mut self, registry: ArchetypeRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Distance around a player within which instances are woken up
    pub fn with_activation_range(mut self, range: i32) -> Self {
        self.activation_range = range;
        self
    }

    pub fn context(&self) -> &Arc<WorldContext> {
        &self.context
    }

    pub fn services(&self) -> &AiServices {
        &self.services
    }

    pub fn registry(&self) -> &ArchetypeRegistry {
        &self.registry
    }

    /// Give `entity` the AI of `archetype`
    ///
    /// An AI the creature already had is disposed and replaced.
    pub async fn attach(&self, entity: EcsEntity, archetype: &str) -> AiResult<Arc<AiInstance>> {
        let setup = self.registry.build(archetype, &self.config)?;
        if !self.context.contains(entity).await {
            return Err(AiError::MissingCreature(entity));
        }
        self.context
            .insert_one(entity, Disposition::default())
            .await?;

        let brain = Brain::new(entity, archetype, setup, self.next_dice());
        let instance = Arc::new(AiInstance::new(
            brain,
            self.services.clone(),
            &self.config,
        ));

        if let Some(previous) = self.instances.insert(entity, Arc::clone(&instance)) {
            previous.dispose();
        }
        tracing::debug!(archetype = %archetype, entity = ?entity, "AI attached");
        Ok(instance)
    }

    /// Dispose of the AI of `entity`, returning whether it had one
    ///
    /// A creature still in the world is returned to Idle so it no longer
    /// holds a target or counts against an aggro limit.
    pub async fn detach(&self, entity: EcsEntity) -> bool {
        match self.instances.remove(&entity) {
            Some((_, instance)) => {
                instance.deactivate(&self.context).await;
                instance.dispose();
                tracing::debug!(entity = ?entity, "AI detached");
                true
            }
            None => false,
        }
    }

    pub fn get(&self, entity: EcsEntity) -> Option<Arc<AiInstance>> {
        self.instances.get(&entity).map(|entry| Arc::clone(entry.value()))
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Number of instances whose driver is running
    pub fn active_count(&self) -> usize {
        self.instances
            .iter()
            .filter(|entry| entry.value().is_active())
            .count()
    }

    /// Wake up every idle instance within the activation range of `player`
    ///
    /// Returns how many instances were started.
    pub async fn activate_around(&self, player: EcsEntity) -> usize {
        let nearby = {
            let world = self.context.entities().read().await;
            let Ok(center) = world.get::<&Transform>(player).map(|t| t.position) else {
                return 0;
            };

            self.instances
                .iter()
                .filter(|entry| !entry.value().is_active())
                .filter(|entry| {
                    world
                        .get::<&Transform>(*entry.key())
                        .is_ok_and(|t| t.position.in_range(center, self.activation_range))
                })
                .map(|entry| Arc::clone(entry.value()))
                .collect::<Vec<_>>()
        };

        let mut activated = 0;
        for instance in nearby {
            if instance
                .activate(Arc::clone(&self.context), self.config.min_run_time_ms)
                .await
            {
                activated += 1;
            }
        }
        activated
    }

    /// Hand a world event to the AI it concerns
    ///
    /// Returns `false` when the event concerns no AI.
    pub async fn dispatch(&self, event: &GameEvent) -> bool {
        let Some((entity, event)) = AiEvent::route(event) else {
            return false;
        };
        let Some(instance) = self.get(entity) else {
            return false;
        };

        instance.dispatch(&self.context, &event).await;
        true
    }

    /// Drain the event bus, dispatching everything an AI should react to
    ///
    /// Every drained event is returned, routed or not, so the caller can pass
    /// notifications on. Events raised while dispatching stay queued for the
    /// next pump.
    pub async fn pump(&self) -> Vec<GameEvent> {
        let events = self.context.events().drain();
        for event in &events {
            self.dispatch(event).await;
        }
        events
    }

    /// Detach every instance whose creature has left the world
    pub async fn reap(&self) -> usize {
        let gone = {
            let world = self.context.entities().read().await;
            self.instances
                .iter()
                .filter(|entry| !world.contains(*entry.key()))
                .map(|entry| *entry.key())
                .collect::<Vec<_>>()
        };

        let mut count = 0;
        for entity in gone {
            if self.detach(entity).await {
                count += 1;
            }
        }
        count
    }

    /// Dispose of every instance
    pub fn shutdown(&self) {
        let count = self.instances.len();
        for entry in self.instances.iter() {
            entry.value().dispose();
        }
        self.instances.clear();
        tracing::info!("AI manager shut down {} instances", count);
    }

    fn next_dice(&self) -> Dice {
        let mut seeds = self.seeds.lock().unwrap_or_else(|e| e.into_inner());
        Dice::seeded(seeds.random())
    }
}

impl Drop for AiManager {
    fn drop(&mut self) {
        for entry in self.instances.iter() {
            entry.value().dispose();
        }
    }
}

impl std::fmt::Debug for AiManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AiManager")
            .field("instances", &self.instances.len())
            .field("archetypes", &self.registry.len())
            .field("activation_range", &self.activation_range)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::state::AiState;
    use crate::ecs::systems::WorldRegion;
    use crate::ecs::components::Combatant;
    use crate::ecs::test_utils::{TEST_CREATURE_RACE, spawn_test_creature, spawn_test_player};
    use fauna_common::{Position, SkillId};
    use std::time::Duration;

    fn manager() -> AiManager {
        let context = Arc::new(WorldContext::new());
        let config = AiConfig {
            seed: Some(11),
            ..AiConfig::default()
        };
        AiManager::new(context, Arc::new(WorldRegion::new(3000)), config)
            .with_activation_range(2000)
    }

    async fn spawn_creature(manager: &AiManager, position: Position) -> EcsEntity {
        let mut world = manager.context().entities().write().await;
        spawn_test_creature(&mut world, position)
    }

    async fn spawn_player(manager: &AiManager, position: Position) -> EcsEntity {
        let mut world = manager.context().entities().write().await;
        spawn_test_player(&mut world, position)
    }

    #[tokio::test]
    async fn test_attach_and_detach() {
        let manager = manager();
        let rat = spawn_creature(&manager, Position::new(0, 0)).await;

        let instance = manager.attach(rat, "ratman").await.unwrap();
        assert_eq!(instance.archetype(), "ratman");
        assert_eq!(instance.state().await, AiState::Idle);
        assert_eq!(manager.len(), 1);
        assert!(manager.get(rat).is_some());

        assert!(manager.detach(rat).await);
        assert!(instance.is_disposed());
        assert!(manager.is_empty());
        assert!(!manager.detach(rat).await);
    }

    #[tokio::test]
    async fn test_detach_releases_the_aggro_slot() {
        let manager = manager();
        let rat = spawn_creature(&manager, Position::new(0, 0)).await;
        let player = spawn_player(&manager, Position::new(500, 0)).await;
        let region = WorldRegion::new(3000);

        let instance = manager.attach(rat, "ratman").await.unwrap();
        instance.aggro_creature(manager.context(), player).await;
        {
            let world = manager.context().entities().read().await;
            assert_eq!(region.count_aggro(&world, player, TEST_CREATURE_RACE), 1);
        }

        assert!(manager.detach(rat).await);

        let world = manager.context().entities().read().await;
        assert_eq!(region.count_aggro(&world, player, TEST_CREATURE_RACE), 0);
        assert_eq!(world.get::<&Disposition>(rat).unwrap().state, AiState::Idle);
        assert_eq!(world.get::<&Combatant>(rat).unwrap().target, None);
    }

    #[tokio::test]
    async fn test_attach_rejects_unknown_archetype() {
        let manager = manager();
        let rat = spawn_creature(&manager, Position::new(0, 0)).await;

        let result = manager.attach(rat, "dragon").await;
        assert!(matches!(result, Err(AiError::UnknownArchetype(_))));
        assert!(manager.is_empty());
    }

    #[tokio::test]
    async fn test_attach_rejects_missing_creature() {
        let manager = manager();
        let rat = spawn_creature(&manager, Position::new(0, 0)).await;
        manager.context().despawn(rat).await.unwrap();

        let result = manager.attach(rat, "ratman").await;
        assert!(matches!(result, Err(AiError::MissingCreature(e)) if e == rat));
    }

    #[tokio::test]
    async fn test_reattach_disposes_previous() {
        let manager = manager();
        let rat = spawn_creature(&manager, Position::new(0, 0)).await;

        let first = manager.attach(rat, "ratman").await.unwrap();
        let second = manager.attach(rat, "catsith_magician").await.unwrap();
        assert!(first.is_disposed());
        assert!(!second.is_disposed());
        assert_eq!(manager.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_activate_around_player() {
        let manager = manager();
        let near = spawn_creature(&manager, Position::new(500, 0)).await;
        let far = spawn_creature(&manager, Position::new(9000, 0)).await;
        manager.attach(near, "ratman").await.unwrap();
        manager.attach(far, "ratman").await.unwrap();
        let player = spawn_player(&manager, Position::new(0, 0)).await;

        assert_eq!(manager.activate_around(player).await, 1);
        assert!(manager.get(near).unwrap().is_active());
        assert!(!manager.get(far).unwrap().is_active());

        // Already running
        assert_eq!(manager.activate_around(player).await, 0);
        assert_eq!(manager.active_count(), 1);

        manager.shutdown();
        assert!(manager.is_empty());
    }

    #[tokio::test]
    async fn test_activate_around_unknown_player() {
        let manager = manager();
        let rat = spawn_creature(&manager, Position::new(0, 0)).await;
        manager.attach(rat, "ratman").await.unwrap();
        manager.context().despawn(rat).await.unwrap();

        assert_eq!(manager.activate_around(rat).await, 0);
    }

    #[tokio::test]
    async fn test_pump_routes_and_returns_everything() {
        let manager = manager();
        let rat = spawn_creature(&manager, Position::new(0, 0)).await;
        let stranger = spawn_creature(&manager, Position::new(10, 0)).await;
        manager.attach(rat, "ratman").await.unwrap();

        let events = manager.context().events();
        events.publish(GameEvent::SkillUsed {
            creature: rat,
            skill: SkillId::SMASH,
        });
        events.publish(GameEvent::CreatureDied {
            creature: stranger,
            killer: None,
        });
        events.publish(GameEvent::Chat {
            entity: rat,
            message: "squeak".into(),
        });

        let drained = manager.pump().await;
        assert_eq!(drained.len(), 3);
        assert!(matches!(drained[2], GameEvent::Chat { .. }));

        assert!(
            manager
                .dispatch(&GameEvent::SkillUsed {
                    creature: rat,
                    skill: SkillId::SMASH,
                })
                .await
        );
        assert!(
            !manager
                .dispatch(&GameEvent::CreatureDied {
                    creature: stranger,
                    killer: None,
                })
                .await
        );
    }

    #[tokio::test]
    async fn test_reap_detaches_despawned() {
        let manager = manager();
        let rat = spawn_creature(&manager, Position::new(0, 0)).await;
        let other = spawn_creature(&manager, Position::new(10, 0)).await;
        let instance = manager.attach(rat, "ratman").await.unwrap();
        manager.attach(other, "ratman").await.unwrap();

        manager.context().despawn(rat).await.unwrap();
        assert_eq!(manager.reap().await, 1);
        assert!(instance.is_disposed());
        assert_eq!(manager.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_driver_runs_after_activation() {
        let manager = manager();
        let rat = spawn_creature(&manager, Position::new(0, 0)).await;
        let instance = manager.attach(rat, "ratman").await.unwrap();
        let player = spawn_player(&manager, Position::new(300, 0)).await;

        manager.activate_around(player).await;
        tokio::time::sleep(Duration::from_millis(1000)).await;

        assert!(instance.is_active());
        assert_ne!(instance.state().await, AiState::Idle);
    }
}
