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

//! Per-instance AI state and the view routines act through

use crate::ai::branch::Dice;
use crate::ai::cursor::{Routine, Step};
use crate::ai::error::{AiError, AiResult};
use crate::ai::perception::Perception;
use crate::ai::services::AiServices;
use crate::ai::state::AiState;
use crate::ecs::components::{
    Combatant, CreatureFlag, CreatureFlags, Skill, Skills, StatusEffectType, StatusEffects,
    Transform,
};
use crate::ecs::events::{EventBus, GameEvent};
use crate::ecs::systems::{SkillHandler, SkillUse};
use crate::ecs::{EcsEntity, GameWorld};
use fauna_common::{Position, SharpMindStatus, SkillId};
use std::sync::Arc;

/// Distance kept in front of an obstruction when a move is shortened
const COLLISION_BUFFER: i32 = 100;

/// Everything an AI instance owns besides its behavior cursor
#[derive(Debug)]
pub struct Mind {
    pub(crate) entity: EcsEntity,
    pub(crate) archetype: String,
    pub(crate) state: AiState,
    /// Simulated clock in milliseconds
    pub(crate) timestamp: f64,
    pub(crate) perception: Perception,
    pub(crate) aware_time: f64,
    pub(crate) alert_time: f64,
    /// Deactivation is refused before the clock reaches this point
    pub(crate) min_run_until: f64,
    /// Players in range during the current pass
    pub(crate) observers: Vec<EcsEntity>,
    pub(crate) dice: Dice,
    pub(crate) reset_requested: bool,
    pub(crate) phrases: Vec<String>,
    pub(crate) sharp_mind: bool,
}

impl Mind {
    pub fn new(entity: EcsEntity, archetype: impl Into<String>, dice: Dice) -> Self {
        Self {
            entity,
            archetype: archetype.into(),
            state: AiState::Idle,
            timestamp: 0.0,
            perception: Perception::default(),
            aware_time: 0.0,
            alert_time: 0.0,
            min_run_until: 0.0,
            observers: Vec::new(),
            dice,
            reset_requested: false,
            phrases: Vec::new(),
            sharp_mind: true,
        }
    }

    pub fn entity(&self) -> EcsEntity {
        self.entity
    }

    pub fn archetype(&self) -> &str {
        &self.archetype
    }

    pub fn state(&self) -> AiState {
        self.state
    }

    pub fn timestamp(&self) -> f64 {
        self.timestamp
    }

    pub fn perception(&self) -> &Perception {
        &self.perception
    }

    pub fn observers(&self) -> &[EcsEntity] {
        &self.observers
    }

    /// Advance the simulated clock; negative steps are ignored
    pub(crate) fn advance(&mut self, elapsed_ms: f64) {
        if elapsed_ms > 0.0 {
            self.timestamp += elapsed_ms;
        }
    }
}

/// A creature's mind paired with the world it acts in
pub struct Actor<'a> {
    pub(crate) mind: &'a mut Mind,
    pub(crate) world: &'a mut GameWorld,
    pub(crate) services: &'a AiServices,
}

impl<'a> Actor<'a> {
    pub fn new(mind: &'a mut Mind, world: &'a mut GameWorld, services: &'a AiServices) -> Self {
        Self {
            mind,
            world,
            services,
        }
    }

    pub fn entity(&self) -> EcsEntity {
        self.mind.entity
    }

    pub fn timestamp(&self) -> f64 {
        self.mind.timestamp
    }

    pub fn mind(&self) -> &Mind {
        self.mind
    }

    pub fn dice(&mut self) -> &mut Dice {
        &mut self.mind.dice
    }

    pub fn world(&self) -> &GameWorld {
        self.world
    }

    pub fn world_mut(&mut self) -> &mut GameWorld {
        self.world
    }

    pub fn services(&self) -> &AiServices {
        self.services
    }

    pub fn events(&self) -> &EventBus {
        &self.services.events
    }

    pub fn notify(&self, event: GameEvent) {
        self.services.events.publish(event);
    }

    pub fn position(&self) -> AiResult<Position> {
        position_of(self.world, self.mind.entity)
    }

    pub fn facing(&self) -> AiResult<f64> {
        Ok(self.world.get::<&Transform>(self.mind.entity)?.facing())
    }

    /// Current target, provided it still exists
    pub fn target(&self) -> Option<EcsEntity> {
        let target = self
            .world
            .get::<&Combatant>(self.mind.entity)
            .ok()?
            .target?;
        self.world.contains(target).then_some(target)
    }

    pub fn target_position(&self) -> Option<Position> {
        self.target()
            .and_then(|target| position_of(self.world, target).ok())
    }

    pub fn set_target(&mut self, target: Option<EcsEntity>) -> AiResult<()> {
        self.combatant_mut(|combatant| combatant.target = target)
    }

    pub fn set_battle_stance(&mut self, battle_stance: bool) -> AiResult<()> {
        self.combatant_mut(|combatant| combatant.set_battle_stance(battle_stance))
    }

    fn combatant_mut(&mut self, f: impl FnOnce(&mut Combatant)) -> AiResult<()> {
        let entity = self.mind.entity;
        if let Ok(mut combatant) = self.world.get::<&mut Combatant>(entity) {
            f(&mut combatant);
            return Ok(());
        }

        let mut combatant = Combatant::new();
        f(&mut combatant);
        self.world
            .insert_one(entity, combatant)
            .map_err(|_| AiError::MissingCreature(entity))
    }

    pub fn is_stunned(&self) -> bool {
        has_effect(self.world, self.mind.entity, StatusEffectType::Stunned)
    }

    pub fn is_dead(&self) -> bool {
        has_flag(self.world, self.mind.entity, CreatureFlag::Dead)
    }

    pub fn is_sitting(&self) -> bool {
        has_flag(self.world, self.mind.entity, CreatureFlag::SitDown)
    }

    /// Start moving toward `destination`, returning the move's duration in ms
    ///
    /// A move crossing an obstruction ends short of it. If even the shortened
    /// path is blocked the creature stays where it is.
    pub fn move_to(&mut self, destination: Position, walking: bool) -> AiResult<f64> {
        let position = self.position()?;
        let region = &self.services.region;

        let destination = match region.find_collision(position, destination) {
            Some(hit) => {
                let shortened = position.get_relative(hit, -COLLISION_BUFFER);
                if region.any_collision(position, shortened) {
                    position
                } else {
                    shortened
                }
            }
            None => destination,
        };

        Ok(self
            .services
            .movement
            .start(self.world, self.mind.entity, destination, walking)?)
    }

    pub fn active_skill(&self) -> Option<SkillId> {
        self.world
            .get::<&Skills>(self.mind.entity)
            .ok()
            .and_then(|skills| skills.active_id())
    }

    pub fn knows(&self, skill: SkillId) -> bool {
        self.world
            .get::<&Skills>(self.mind.entity)
            .is_ok_and(|skills| skills.knows(skill))
    }

    /// Snapshot of a known skill
    pub fn skill(&self, skill: SkillId) -> Option<Skill> {
        self.world
            .get::<&Skills>(self.mind.entity)
            .ok()
            .and_then(|skills| skills.get(skill).cloned())
    }

    pub fn with_skills<R>(&mut self, f: impl FnOnce(&mut Skills) -> R) -> AiResult<R> {
        let mut skills = self.world.get::<&mut Skills>(self.mind.entity)?;
        Ok(f(&mut skills))
    }

    pub fn handler(&self, skill: SkillId) -> Option<Arc<dyn SkillHandler>> {
        self.services.skills.get(skill)
    }

    /// Invocation context for a skill handler
    pub fn skill_use(&mut self, skill: SkillId) -> SkillUse<'_> {
        SkillUse::new(self.world, &self.services.events, self.mind.entity, skill)
    }

    /// Announce a skill transition to every observer
    ///
    /// A cancel is always followed by a clear.
    pub fn sharp_mind(&self, skill: SkillId, status: SharpMindStatus) {
        if !self.mind.sharp_mind {
            return;
        }

        for &viewer in &self.mind.observers {
            self.notify(GameEvent::SharpMind {
                entity: self.mind.entity,
                viewer,
                skill,
                status,
            });
            if status == SharpMindStatus::Cancelling {
                self.notify(GameEvent::SharpMind {
                    entity: self.mind.entity,
                    viewer,
                    skill,
                    status: SharpMindStatus::None,
                });
            }
        }
    }

    /// Unload the active skill, dropping its stacks
    pub fn cancel_active_skill(&mut self) -> AiResult<Option<SkillId>> {
        let Some(active) = self.active_skill() else {
            return Ok(None);
        };

        self.sharp_mind(active, SharpMindStatus::Cancelling);
        self.with_skills(|skills| skills.cancel_active())?;
        self.notify(GameEvent::SkillCanceled {
            entity: self.mind.entity,
            skill: active,
        });
        Ok(Some(active))
    }

    /// Step a fresh routine once and drop it
    pub fn execute_once(&mut self, routine: impl Routine) -> AiResult<Step> {
        let mut routine = routine;
        routine.step(self)
    }

    /// Ask for a reset at the next state selection
    pub fn request_reset(&mut self) {
        self.mind.reset_requested = true;
    }
}

pub(crate) fn position_of(world: &GameWorld, entity: EcsEntity) -> AiResult<Position> {
    Ok(world.get::<&Transform>(entity)?.position)
}

pub(crate) fn has_flag(world: &GameWorld, entity: EcsEntity, flag: CreatureFlag) -> bool {
    world
        .get::<&CreatureFlags>(entity)
        .is_ok_and(|flags| flags.has(flag))
}

pub(crate) fn has_effect(world: &GameWorld, entity: EcsEntity, effect: StatusEffectType) -> bool {
    world
        .get::<&StatusEffects>(entity)
        .is_ok_and(|effects| effects.has(effect))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::test_support::Harness;
    use crate::ecs::components::{Player, SkillRank};
    use crate::ecs::systems::{Wall, WorldRegion};
    use crate::ecs::components::Motion;

    #[test]
    fn test_move_to_stops_short_of_walls() {
        let region = WorldRegion::default().with_walls([Wall::new(
            Position::new(500, -100),
            Position::new(500, 100),
        )]);
        let mut harness = Harness::with_region(region);

        harness
            .with_actor(|actor| actor.move_to(Position::new(1000, 0), false))
            .unwrap();

        let motion = *harness.world.get::<&Motion>(harness.creature).unwrap();
        assert_eq!(motion.destination, Position::new(400, 0));
    }

    #[test]
    fn test_move_to_stays_put_when_boxed_in() {
        let region = WorldRegion::default().with_walls([
            Wall::new(Position::new(50, -100), Position::new(50, 100)),
            Wall::new(Position::new(-30, -100), Position::new(-30, 100)),
        ]);
        let mut harness = Harness::with_region(region);

        let duration = harness
            .with_actor(|actor| actor.move_to(Position::new(1000, 0), false))
            .unwrap();

        assert_eq!(duration, 0.0);
        let motion = *harness.world.get::<&Motion>(harness.creature).unwrap();
        assert_eq!(motion.destination, Position::new(0, 0));
    }

    #[test]
    fn test_target_must_exist() {
        let mut harness = Harness::new();
        let target = harness.spawn_player(Position::new(100, 0));
        harness.with_actor(|actor| actor.set_target(Some(target))).unwrap();
        assert_eq!(harness.with_actor(|actor| actor.target()), Some(target));

        harness.world.despawn(target).unwrap();
        assert_eq!(harness.with_actor(|actor| actor.target()), None);
    }

    #[test]
    fn test_sharp_mind_cancel_is_followed_by_clear() {
        let mut harness = Harness::new();
        let viewer = harness.world.spawn((Player::new(),));
        harness.mind.observers = vec![viewer];

        harness.with_actor(|actor| actor.sharp_mind(SkillId::SMASH, SharpMindStatus::Cancelling));

        let statuses: Vec<_> = harness
            .services
            .events
            .drain()
            .into_iter()
            .filter_map(|event| match event {
                GameEvent::SharpMind { status, .. } => Some(status),
                _ => None,
            })
            .collect();
        assert_eq!(
            statuses,
            vec![SharpMindStatus::Cancelling, SharpMindStatus::None]
        );
    }

    #[test]
    fn test_sharp_mind_can_be_disabled() {
        let mut harness = Harness::new();
        let viewer = harness.world.spawn((Player::new(),));
        harness.mind.observers = vec![viewer];
        harness.mind.sharp_mind = false;

        harness.with_actor(|actor| actor.sharp_mind(SkillId::SMASH, SharpMindStatus::Loaded));
        assert_eq!(harness.services.events.queue_len(), 0);
    }

    #[test]
    fn test_cancel_active_skill() {
        let mut harness = Harness::new();
        harness.learn(SkillId::SMASH, SkillRank::new(1000, 1));
        harness
            .with_actor(|actor| actor.with_skills(|skills| skills.set_active(SkillId::SMASH)))
            .unwrap();

        let canceled = harness
            .with_actor(|actor| actor.cancel_active_skill())
            .unwrap();
        assert_eq!(canceled, Some(SkillId::SMASH));
        assert_eq!(harness.with_actor(|actor| actor.active_skill()), None);
        assert!(harness.services.events.drain().iter().any(|event| matches!(
            event,
            GameEvent::SkillCanceled { skill, .. } if *skill == SkillId::SMASH
        )));
    }
}
