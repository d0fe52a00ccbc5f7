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

//! Fixture for stepping routines against a small world

use crate::ai::actor::{Actor, Mind};
use crate::ai::branch::Dice;
use crate::ai::cursor::{Routine, Step};
use crate::ai::services::AiServices;
use crate::ecs::components::{Skills, SkillRank};
use crate::ecs::events::EventBus;
use crate::ecs::systems::{SkillManager, WorldRegion};
use crate::ecs::test_utils::{create_test_world, spawn_test_creature, spawn_test_player};
use crate::ecs::{EcsEntity, GameWorld};
use fauna_common::{Position, SkillId};
use std::sync::Arc;

/// A rat at the origin with a mind, a world and builtin skill handlers
pub(crate) struct Harness {
    pub world: GameWorld,
    pub services: AiServices,
    pub mind: Mind,
    pub creature: EcsEntity,
}

impl Harness {
    pub fn new() -> Self {
        Self::build(WorldRegion::default(), 7)
    }

    pub fn seeded(seed: u64) -> Self {
        Self::build(WorldRegion::default(), seed)
    }

    pub fn with_region(region: WorldRegion) -> Self {
        Self::build(region, 7)
    }

    fn build(region: WorldRegion, seed: u64) -> Self {
        let mut world = create_test_world();
        let creature = spawn_test_creature(&mut world, Position::new(0, 0));
        let services = AiServices::new(
            Arc::new(region),
            Arc::new(SkillManager::with_builtin_handlers()),
            EventBus::new(),
        );
        let mind = Mind::new(creature, "test", Dice::seeded(seed));

        Self {
            world,
            services,
            mind,
            creature,
        }
    }

    pub fn with_actor<R>(&mut self, f: impl FnOnce(&mut Actor<'_>) -> R) -> R {
        let mut actor = Actor::new(&mut self.mind, &mut self.world, &self.services);
        f(&mut actor)
    }

    pub fn spawn_player(&mut self, position: Position) -> EcsEntity {
        spawn_test_player(&mut self.world, position)
    }

    pub fn learn(&mut self, skill: SkillId, rank: SkillRank) {
        self.world
            .get::<&mut Skills>(self.creature)
            .expect("creature has skills")
            .learn(skill, rank);
    }

    /// Step `routine` every `delta_ms` until it is done, moving the world along
    ///
    /// Returns how often it suspended. Panics past `limit` suspensions or on
    /// an error.
    pub fn run<R: Routine>(&mut self, routine: &mut R, delta_ms: f64, limit: usize) -> usize {
        let mut suspended = 0;
        loop {
            let step = self
                .with_actor(|actor| routine.step(actor))
                .expect("routine failed");
            if step == Step::Done {
                return suspended;
            }

            suspended += 1;
            assert!(suspended <= limit, "routine still running after {limit} steps");

            self.mind.advance(delta_ms);
            let mut movement = self.services.movement.clone();
            movement.update(&mut self.world, delta_ms);
        }
    }
}
