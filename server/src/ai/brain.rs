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

//! Disposition state machine and cursor management of one AI instance
//!
//! [`Brain`] is everything an instance does inside a single scheduling pass.
//! It is synchronous and owns no timers, so the async driver in
//! [`instance`](crate::ai::instance) only decides when a pass runs.

use crate::ai::actor::{Actor, Mind, has_effect, has_flag, position_of};
use crate::ai::branch::Dice;
use crate::ai::cursor::{Cursor, Sequence};
use crate::ai::error::{AiError, AiResult};
use crate::ai::events::{AiEvent, HitClass};
use crate::ai::reactions::Behavior;
use crate::ai::routines::{CancelSkill, CompleteSkill, tolerate};
use crate::ai::script::{AiSetup, compose};
use crate::ai::services::AiServices;
use crate::ai::state::AiState;
use crate::ecs::components::{
    Combatant, CreatureFlag, Disposition, Player, Race, StatusEffectType, Transform,
};
use crate::ecs::events::GameEvent;
use crate::ecs::{EcsEntity, GameWorld};
use fauna_common::{Position, SharpMindStatus, SkillId, TargetMode};

/// What the driver should do after a pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pulse {
    Continue,
    /// Nobody is watching anymore; stop ticking
    Deactivate,
}

pub struct Brain {
    mind: Mind,
    cursor: Option<Cursor>,
    setup: AiSetup,
}

impl Brain {
    pub fn new(entity: EcsEntity, archetype: impl Into<String>, setup: AiSetup, dice: Dice) -> Self {
        let mut mind = Mind::new(entity, archetype, dice);
        mind.perception = setup.perception.clone();
        mind.phrases = setup.phrases.clone();

        Self {
            mind,
            cursor: None,
            setup,
        }
    }

    pub fn mind(&self) -> &Mind {
        &self.mind
    }

    pub fn setup(&self) -> &AiSetup {
        &self.setup
    }

    pub fn state(&self) -> AiState {
        self.mind.state
    }

    pub fn entity(&self) -> EcsEntity {
        self.mind.entity
    }

    /// Label of the running behavior, if one is still running
    pub fn cursor_label(&self) -> Option<&str> {
        self.cursor
            .as_ref()
            .filter(|cursor| !cursor.is_finished())
            .map(Cursor::label)
    }

    pub fn has_cursor(&self) -> bool {
        self.cursor_label().is_some()
    }

    pub fn clear_cursor(&mut self) {
        self.cursor = None;
    }

    pub fn set_sharp_mind(&mut self, enabled: bool) {
        self.mind.sharp_mind = enabled;
    }

    /// Advance the simulated clock by real elapsed time
    pub fn advance(&mut self, elapsed_ms: f64) {
        self.mind.advance(elapsed_ms);
    }

    /// Refuse deactivation for the next `duration_ms` of simulated time
    pub fn set_min_run_time(&mut self, duration_ms: f64) {
        self.mind.min_run_until = self.mind.timestamp + duration_ms;
    }

    /// One scheduling pass
    pub fn pulse(&mut self, world: &mut GameWorld, services: &AiServices) -> AiResult<Pulse> {
        let entity = self.mind.entity;
        let position =
            position_of(world, entity).map_err(|_| AiError::MissingCreature(entity))?;

        self.mind.observers = services.region.players_in_range(world, position);
        if self.mind.observers.is_empty() && self.mind.timestamp > self.mind.min_run_until {
            self.cursor = None;
            self.reset(world, services)?;
            return Ok(Pulse::Deactivate);
        }

        if has_flag(world, entity, CreatureFlag::Dead) {
            return Ok(Pulse::Continue);
        }

        self.select_state(world, services)?;

        if let Some(cursor) = self.cursor.as_mut() {
            let mut actor = Actor::new(&mut self.mind, world, services);
            if cursor.resume(&mut actor)? {
                return Ok(Pulse::Continue);
            }
        }

        let state = self.mind.state;
        let behavior = self.setup.behavior(state).cloned();
        self.switch_action(world, services, state.label(), behavior.as_ref())?;

        if let Some(cursor) = self.cursor.as_mut() {
            cursor.resume(&mut Actor::new(&mut self.mind, world, services))?;
        }
        Ok(Pulse::Continue)
    }

    /// Pick, keep or drop a target and move between states accordingly
    pub fn select_state(&mut self, world: &mut GameWorld, services: &AiServices) -> AiResult<()> {
        if std::mem::take(&mut self.mind.reset_requested) {
            self.reset(world, services)?;
        }

        let entity = self.mind.entity;
        let (position, facing) = {
            let transform = world.get::<&Transform>(entity)?;
            (transform.position, transform.facing())
        };
        let now = self.mind.timestamp;
        let perception = &self.mind.perception;

        let candidates: Vec<EcsEntity> = services
            .region
            .visible_creatures_in_range(world, entity, perception.max_radius())
            .into_iter()
            .filter(|&candidate| !has_flag(world, candidate, CreatureFlag::Warping))
            .filter(|&candidate| {
                position_of(world, candidate)
                    .is_ok_and(|other| perception.can_perceive(position, facing, other))
            })
            .collect();

        let held = world
            .get::<&Combatant>(entity)
            .ok()
            .and_then(|combatant| combatant.target);

        let Some(target) = held else {
            if candidates.is_empty() {
                if self.mind.state != AiState::Idle {
                    self.reset(world, services)?;
                }
                return Ok(());
            }
            return self.pick_target(world, services, &candidates);
        };

        if !self.target_is_valid(world, position, target) {
            return self.reset(world, services);
        }

        if self.mind.state == AiState::Aware && now >= self.mind.aware_time + perception.alert_delay_ms {
            let perceivable = position_of(world, target)
                .is_ok_and(|other| perception.can_perceive(position, facing, other));
            if !perceivable {
                return self.reset(world, services);
            }

            self.cursor = None;
            self.mind.alert_time = now;
            self.enter(world, AiState::Alert)?;
            let mut actor = Actor::new(&mut self.mind, world, services);
            actor.set_battle_stance(true)?;
            actor.notify(GameEvent::CombatTarget {
                entity,
                target: Some(target),
                mode: TargetMode::Alert,
            });
        }

        if self.mind.state == AiState::Alert && self.wants_aggro(world, target) {
            let race = world.get::<&Race>(entity).map(|race| race.id).ok();
            if let Some(race) = race {
                let aggroing = services.region.count_aggro(world, target, race);
                if aggroing >= self.mind.perception.aggro_limit.count() {
                    tracing::trace!(
                        "{:?} holds back, {} others already aggro {:?}",
                        entity,
                        aggroing,
                        target
                    );
                    return Ok(());
                }
            }

            self.cursor = None;
            self.enter(world, AiState::Aggro)?;
            services.events.publish(GameEvent::CombatTarget {
                entity,
                target: Some(target),
                mode: TargetMode::Aggro,
            });
        }

        Ok(())
    }

    fn pick_target(
        &mut self,
        world: &mut GameWorld,
        services: &AiServices,
        candidates: &[EcsEntity],
    ) -> AiResult<()> {
        let perception = &self.mind.perception;
        let mut hated = Vec::new();
        let mut doubted = Vec::new();
        let mut loved = Vec::new();

        for &candidate in candidates {
            if has_flag(world, candidate, CreatureFlag::Dead) {
                continue;
            }
            let Ok(race) = world.get::<&Race>(candidate) else {
                continue;
            };
            let named = has_flag(world, candidate, CreatureFlag::NamedNpc);

            if !named && perception.hated.matches(&race) {
                hated.push(candidate);
            }
            if !named && perception.doubted.matches(&race) {
                doubted.push(candidate);
            }
            if perception.loved.matches(&race) {
                loved.push(candidate);
            }
        }

        let (target, state) = if !hated.is_empty() {
            (self.mind.dice.pick(&hated).copied(), AiState::Aware)
        } else if !doubted.is_empty() {
            (self.mind.dice.pick(&doubted).copied(), AiState::Aware)
        } else {
            (self.mind.dice.pick(&loved).copied(), AiState::Love)
        };
        let Some(target) = target else {
            return Ok(());
        };

        tracing::debug!(
            "AI '{}' of {:?} noticed {:?}",
            self.mind.archetype,
            self.mind.entity,
            target
        );
        Actor::new(&mut self.mind, world, services).set_target(Some(target))?;
        if state == AiState::Aware {
            self.mind.aware_time = self.mind.timestamp;
        }
        self.enter(world, state)
    }

    fn target_is_valid(&self, world: &GameWorld, position: Position, target: EcsEntity) -> bool {
        let Ok(target_position) = position_of(world, target) else {
            return false;
        };
        let disconnected = world
            .get::<&Player>(target)
            .is_ok_and(|player| !player.connected);
        let hidden = self.mind.state != AiState::Aggro
            && has_effect(world, target, StatusEffectType::Invisible);

        !(has_flag(world, target, CreatureFlag::Dead)
            || !position.in_range(target_position, self.mind.perception.aggro_max_radius)
            || has_flag(world, target, CreatureFlag::Warping)
            || disconnected
            || hidden)
    }

    fn wants_aggro(&self, world: &GameWorld, target: EcsEntity) -> bool {
        let perception = &self.mind.perception;
        let now = self.mind.timestamp;

        let hated = world
            .get::<&Race>(target)
            .is_ok_and(|race| perception.hated.matches(&race));
        let stance_held = world.get::<&Combatant>(target).is_ok_and(|combatant| {
            combatant.battle_stance
                && combatant.battle_stance_ms >= perception.hate_battle_stance_delay_ms
        });

        (hated && now >= self.mind.alert_time + perception.aggro_delay_ms)
            || (perception.hates_battle_stance && stance_held)
            || now >= self.mind.aware_time + perception.hate_over_time_ms
    }

    /// Drop the behavior and target and go back to idle
    pub fn reset(&mut self, world: &mut GameWorld, services: &AiServices) -> AiResult<()> {
        let entity = self.mind.entity;
        self.cursor = None;
        self.mind.reset_requested = false;

        let (held, battle_stance) = world
            .get::<&Combatant>(entity)
            .map(|combatant| (combatant.target, combatant.battle_stance))
            .unwrap_or((None, false));

        let mut actor = Actor::new(&mut self.mind, world, services);
        if battle_stance {
            actor.set_battle_stance(false)?;
        }
        if held.is_some() {
            actor.set_target(None)?;
            actor.notify(GameEvent::CombatTarget {
                entity,
                target: None,
                mode: TargetMode::None,
            });
        }

        if self.mind.state != AiState::Idle {
            tracing::debug!("AI '{}' of {:?} reset", self.mind.archetype, entity);
        }
        self.enter(world, AiState::Idle)
    }

    /// Attack `target` right away, skipping noticing and alertness
    pub fn aggro_creature(
        &mut self,
        world: &mut GameWorld,
        services: &AiServices,
        target: EcsEntity,
    ) -> AiResult<()> {
        let entity = self.mind.entity;
        self.cursor = None;

        let mut actor = Actor::new(&mut self.mind, world, services);
        actor.set_battle_stance(true)?;
        actor.set_target(Some(target))?;
        actor.notify(GameEvent::CombatTarget {
            entity,
            target: Some(target),
            mode: TargetMode::Aggro,
        });

        self.enter(world, AiState::Aggro)
    }

    /// Replace the running behavior
    ///
    /// Any loaded skill is canceled and a resting creature gets up first.
    /// Without a behavior the new cursor is empty and finishes on its first
    /// resume.
    pub fn switch_action(
        &mut self,
        world: &mut GameWorld,
        services: &AiServices,
        label: impl Into<String>,
        behavior: Option<&Behavior>,
    ) -> AiResult<()> {
        let mut actor = Actor::new(&mut self.mind, world, services);
        actor.execute_once(CancelSkill::new())?;

        if actor.is_sitting()
            && let Some(handler) = actor.handler(SkillId::REST)
            && let Some(stoppable) = handler.as_stoppable()
        {
            tolerate(
                stoppable.stop(&mut actor.skill_use(SkillId::REST)),
                SkillId::REST,
                "stop",
            )?;
        }

        let sequence = match behavior {
            Some(behavior) => compose(behavior, &mut self.mind.dice),
            None => Sequence::new(),
        };
        self.cursor = Some(Cursor::new(label, sequence));
        Ok(())
    }

    /// React to something that happened to the creature
    pub fn on_event(
        &mut self,
        world: &mut GameWorld,
        services: &AiServices,
        event: &AiEvent,
    ) -> AiResult<()> {
        let mut actor = Actor::new(&mut self.mind, world, services);
        match event {
            AiEvent::Death { .. } => {
                if let Some(active) = actor.active_skill() {
                    actor.sharp_mind(active, SharpMindStatus::Cancelling);
                }
                Ok(())
            }
            AiEvent::UsedSkill { .. } => {
                if actor.active_skill().is_some() {
                    actor.execute_once(CompleteSkill::new())?;
                }
                Ok(())
            }
            AiEvent::Hit(action) => {
                if let Some(active) = actor.active_skill() {
                    actor.sharp_mind(active, SharpMindStatus::Cancelling);
                }

                let class = HitClass::classify(action);
                match self
                    .setup
                    .reactions
                    .lookup(self.mind.state, class, action.attacker_skill)
                {
                    Some((key, behavior)) => {
                        tracing::debug!(
                            "AI '{}' of {:?} reacts with {}",
                            self.mind.archetype,
                            self.mind.entity,
                            key.label()
                        );
                        self.switch_action(world, services, key.label(), Some(&behavior))
                    }
                    None => {
                        self.cursor = None;
                        Ok(())
                    }
                }
            }
        }
    }

    /// Commit a state and mirror it onto the creature
    fn enter(&mut self, world: &mut GameWorld, state: AiState) -> AiResult<()> {
        if self.mind.state != state {
            tracing::debug!(
                "AI '{}' of {:?}: {} -> {}",
                self.mind.archetype,
                self.mind.entity,
                self.mind.state,
                state
            );
        }
        self.mind.state = state;

        let entity = self.mind.entity;
        if let Ok(mut disposition) = world.get::<&mut Disposition>(entity) {
            disposition.state = state;
            return Ok(());
        }
        world.insert_one(entity, Disposition::new(state))?;
        Ok(())
    }
}

impl std::fmt::Debug for Brain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Brain")
            .field("mind", &self.mind)
            .field("cursor", &self.cursor)
            .field("setup", &self.setup)
            .finish()
    }
}
