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

//! Condition system for timed creature conditions

use crate::ecs::components::{
    Combatant, CreatureFlag, CreatureFlags, Motion, StatusEffectType, StatusEffects,
};
use crate::ecs::events::{EventBus, GameEvent};
use crate::ecs::{EcsEntity, GameWorld};
use hecs::Entity;

pub struct ConditionSystem {
    event_bus: EventBus,
}

impl ConditionSystem {
    /// Create a new condition system
    pub fn new(event_bus: EventBus) -> Self {
        Self { event_bus }
    }

    /// Count down status effects and battle stance timers
    pub fn update(&mut self, world: &mut GameWorld, delta_ms: f64) {
        for (_, effects) in world.query_mut::<(Entity, &mut StatusEffects)>() {
            effects.update(delta_ms);
        }
        for (_, combatant) in world.query_mut::<(Entity, &mut Combatant)>() {
            if combatant.battle_stance {
                combatant.battle_stance_ms += delta_ms;
            }
        }
    }

    /// Stun a creature for `duration_ms`
    pub fn stun(
        &self,
        world: &mut GameWorld,
        creature: EcsEntity,
        duration_ms: f64,
    ) -> Result<(), hecs::NoSuchEntity> {
        if let Ok(mut effects) = world.get::<&mut StatusEffects>(creature) {
            effects.apply(StatusEffectType::Stunned, duration_ms);
            return Ok(());
        }
        let mut effects = StatusEffects::new();
        effects.apply(StatusEffectType::Stunned, duration_ms);
        world.insert_one(creature, effects)
    }

    /// Mark a creature dead and announce it
    pub fn kill(
        &self,
        world: &mut GameWorld,
        creature: EcsEntity,
        killer: Option<EcsEntity>,
    ) -> Result<(), hecs::NoSuchEntity> {
        let flags = world
            .get::<&CreatureFlags>(creature)
            .map(|flags| *flags)
            .unwrap_or_default();
        world.insert_one(creature, flags.with(CreatureFlag::Dead))?;
        let _ = world.remove_one::<Motion>(creature);

        tracing::debug!("Creature {:?} died, killer {:?}", creature, killer);
        self.event_bus
            .publish(GameEvent::CreatureDied { creature, killer });
        Ok(())
    }
}
