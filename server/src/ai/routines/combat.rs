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

//! Attack primitives

use crate::ai::actor::Actor;
use crate::ai::cursor::{Routine, Step};
use crate::ai::error::AiResult;
use crate::ai::routines::flow::Wait;
use crate::ai::routines::movement::MoveTo;
use crate::ai::routines::skills::{CancelSkill, set_skill_state, stacks_of};
use crate::ai::routines::{StunGate, tolerate};
use crate::ecs::EcsEntity;
use crate::ecs::components::{AimMeter, Combatant};
use crate::ecs::systems::SkillHandler;
use fauna_common::{CombatSkillResult, SharpMindStatus, SkillId, SkillState};
use std::sync::Arc;

/// Longest an attack routine may keep swinging
const MAX_ATTACK_TIMEOUT: u32 = 300_000;

/// Aim percentage a ranged attacker waits for before shooting
const AIM_THRESHOLD: f64 = 90.0;

/// Hit the target with the loaded skill, or plain melee, `count` times
#[derive(Debug)]
pub struct Attack {
    count: Option<u32>,
    timeout: u32,
    gate: StunGate,
    started: bool,
    until: Option<f64>,
    hits: u32,
}

impl Attack {
    pub fn new(count: u32, timeout: u32) -> Self {
        Self {
            count: Some(count),
            timeout: timeout.min(MAX_ATTACK_TIMEOUT),
            gate: StunGate::default(),
            started: false,
            until: None,
            hits: 0,
        }
    }

    /// Attack once plus as many follow ups as the creature's knock count allows
    pub fn chained() -> Self {
        Self {
            count: None,
            ..Self::new(1, MAX_ATTACK_TIMEOUT)
        }
    }

    pub fn times(count: u32) -> Self {
        Self::new(count, MAX_ATTACK_TIMEOUT)
    }
}

impl Routine for Attack {
    fn step(&mut self, actor: &mut Actor<'_>) -> AiResult<Step> {
        if !self.started {
            if actor.target().is_none() {
                actor.request_reset();
                return Ok(Step::Done);
            }
            self.started = true;
        }

        if self.gate.holds(actor) {
            return Ok(Step::Suspend);
        }

        let until = *self
            .until
            .get_or_insert(actor.timestamp() + self.timeout as f64);
        let count = match self.count {
            Some(count) => count,
            None => {
                let knock_count = actor
                    .world()
                    .get::<&Combatant>(actor.entity())
                    .map_or(0, |combatant| combatant.knock_count);
                let count = 1 + knock_count;
                self.count = Some(count);
                count
            }
        };

        let skill = match actor.active_skill() {
            Some(skill) => skill,
            None if actor.knows(SkillId::COMBAT_MASTERY) => SkillId::COMBAT_MASTERY,
            None => {
                tracing::warn!(
                    "AI '{}' can't attack without {}",
                    actor.mind().archetype(),
                    SkillId::COMBAT_MASTERY
                );
                return Ok(Step::Done);
            }
        };

        let Some(handler) = actor
            .handler(skill)
            .filter(|handler| handler.as_combat().is_some())
        else {
            tracing::error!("No combat handler for skill {}", skill);
            return Ok(Step::Done);
        };
        let Some(combat) = handler.as_combat() else {
            return Ok(Step::Done);
        };

        if actor.timestamp() >= until {
            return Ok(Step::Done);
        }

        let Some(target) = actor.target() else {
            return Ok(Step::Done);
        };

        match combat.use_on(&mut actor.skill_use(skill), target)? {
            CombatSkillResult::Okay => {
                self.hits += 1;
                if self.hits >= count {
                    Ok(Step::Done)
                } else {
                    Ok(Step::Suspend)
                }
            }
            CombatSkillResult::OutOfRange => {
                if let Some(position) = actor.target_position() {
                    actor.execute_once(MoveTo::run(position))?;
                }
                Ok(Step::Suspend)
            }
            result => {
                tracing::error!("Unhandled combat skill result {:?} for {}", result, skill);
                Ok(Step::Done)
            }
        }
    }
}

#[derive(Debug)]
enum RangedPhase {
    Start,
    Loading(Wait),
    Aiming { until: f64 },
}

/// Load a ranged skill if needed, aim, then shoot
pub struct RangedAttack {
    timeout: u32,
    gate: StunGate,
    phase: RangedPhase,
    skill: SkillId,
    target: Option<EcsEntity>,
    handler: Option<Arc<dyn SkillHandler>>,
}

impl RangedAttack {
    pub fn new(timeout: u32) -> Self {
        Self {
            timeout,
            gate: StunGate::default(),
            phase: RangedPhase::Start,
            skill: SkillId::RANGED_ATTACK,
            target: None,
            handler: None,
        }
    }

    fn start_aiming(&mut self, actor: &mut Actor<'_>, target: EcsEntity) -> AiResult<()> {
        let now = actor.timestamp();
        let entity = actor.entity();
        let world = actor.world_mut();
        if let Ok(mut meter) = world.get::<&mut AimMeter>(entity) {
            meter.start(target, now);
        } else {
            let mut meter = AimMeter::default();
            meter.start(target, now);
            world.insert_one(entity, meter)?;
        }

        self.phase = RangedPhase::Aiming {
            until: now + self.timeout as f64,
        };
        Ok(())
    }

    fn aim(&self, actor: &Actor<'_>) -> f64 {
        actor
            .world()
            .get::<&AimMeter>(actor.entity())
            .map_or(0.0, |meter| meter.chance(actor.timestamp()))
    }

    fn stop_aiming(&self, actor: &mut Actor<'_>) {
        let entity = actor.entity();
        if let Ok(mut meter) = actor.world_mut().get::<&mut AimMeter>(entity) {
            meter.stop();
        }
    }
}

impl Default for RangedAttack {
    fn default() -> Self {
        Self::new(5000)
    }
}

impl Routine for RangedAttack {
    fn step(&mut self, actor: &mut Actor<'_>) -> AiResult<Step> {
        if self.gate.holds(actor) {
            return Ok(Step::Suspend);
        }

        loop {
            match &mut self.phase {
                RangedPhase::Start => {
                    let Some(target) = actor.target() else {
                        return Ok(Step::Done);
                    };
                    self.target = Some(target);

                    if let Some(active) = actor.active_skill() {
                        if !active.is_ranged() {
                            tracing::warn!("Active skill {} is no ranged skill", active);
                            return Ok(Step::Done);
                        }
                        self.skill = active;
                        self.handler = actor.handler(active);
                        self.start_aiming(actor, target)?;
                        continue;
                    }

                    if !actor.knows(SkillId::RANGED_ATTACK) {
                        tracing::warn!(
                            "AI '{}' doesn't have {}",
                            actor.mind().archetype(),
                            SkillId::RANGED_ATTACK
                        );
                        return Ok(Step::Done);
                    }

                    let handler = actor.handler(SkillId::RANGED_ATTACK);
                    actor.sharp_mind(self.skill, SharpMindStatus::Loading);
                    if let Some(preparable) = handler.as_deref().and_then(|h| h.as_preparable()) {
                        tolerate(
                            preparable.prepare(&mut actor.skill_use(self.skill)),
                            self.skill,
                            "prepare",
                        )?;
                    }
                    actor.with_skills(|skills| skills.set_active(SkillId::RANGED_ATTACK))?;
                    set_skill_state(actor, self.skill, SkillState::Prepared)?;

                    let load_time = actor.skill(self.skill).map_or(0, |skill| skill.rank.load_time_ms);
                    self.handler = handler;
                    self.phase = RangedPhase::Loading(Wait::exactly(load_time));
                }
                RangedPhase::Loading(wait) => {
                    if wait.step(actor)? == Step::Suspend {
                        return Ok(Step::Suspend);
                    }

                    if let Some(readyable) = self.handler.as_deref().and_then(|h| h.as_readyable()) {
                        readyable.ready(&mut actor.skill_use(self.skill))?;
                    }
                    set_skill_state(actor, self.skill, SkillState::Ready)?;
                    actor.sharp_mind(self.skill, SharpMindStatus::Loaded);

                    let Some(target) = self.target else {
                        return Ok(Step::Done);
                    };
                    self.start_aiming(actor, target)?;
                }
                RangedPhase::Aiming { until } => {
                    let until = *until;
                    let aim = self.aim(actor);
                    if actor.timestamp() < until && aim < AIM_THRESHOLD {
                        return Ok(Step::Suspend);
                    }

                    if aim < AIM_THRESHOLD {
                        actor.cancel_active_skill()?;
                        self.stop_aiming(actor);
                        return Ok(Step::Done);
                    }

                    let combat = self.handler.as_deref().and_then(|h| h.as_combat());
                    match (combat, self.target) {
                        (Some(combat), Some(target)) => {
                            combat.use_on(&mut actor.skill_use(self.skill), target)?;
                            set_skill_state(actor, self.skill, SkillState::Completed)?;
                        }
                        _ => tracing::warn!("Unimplemented: ranged use of skill {}", self.skill),
                    }
                    self.stop_aiming(actor);
                    return Ok(Step::Done);
                }
            }
        }
    }
}

enum StackPhase {
    Start,
    Charging { wanted: u32, loading: Option<Wait> },
    Pause(Wait),
    Striking,
}

/// Charge a skill to a number of stacks and spend them all on the target
pub struct StackAttack {
    skill: SkillId,
    stacks: u32,
    timeout: u32,
    gate: StunGate,
    phase: StackPhase,
    until: f64,
    target: Option<EcsEntity>,
    handler: Option<Arc<dyn SkillHandler>>,
}

impl StackAttack {
    pub fn new(skill: SkillId, stacks: u32, timeout: u32) -> Self {
        Self {
            skill,
            stacks,
            timeout,
            gate: StunGate::default(),
            phase: StackPhase::Start,
            until: 0.0,
            target: None,
            handler: None,
        }
    }

    /// Drop whatever stacks remain unspent
    fn finish(&self, actor: &mut Actor<'_>) -> AiResult<Step> {
        if stacks_of(actor, self.skill) != 0 {
            actor.execute_once(CancelSkill::new())?;
        }
        Ok(Step::Done)
    }
}

impl Routine for StackAttack {
    fn step(&mut self, actor: &mut Actor<'_>) -> AiResult<Step> {
        if self.gate.holds(actor) {
            return Ok(Step::Suspend);
        }

        loop {
            match &mut self.phase {
                StackPhase::Start => {
                    let Some(target) = actor.target() else {
                        return Ok(Step::Done);
                    };
                    self.target = Some(target);
                    self.until = actor.timestamp() + self.timeout as f64;

                    let handler = actor.handler(self.skill).filter(|handler| {
                        handler.as_preparable().is_some()
                            && handler.as_readyable().is_some()
                            && handler.as_combat().is_some()
                    });
                    let Some(handler) = handler else {
                        tracing::warn!(
                            "Skill {} has no handler able to prepare, ready and attack",
                            self.skill
                        );
                        return Ok(Step::Done);
                    };
                    self.handler = Some(handler);

                    if actor.active_skill().is_some_and(|active| active != self.skill) {
                        actor.execute_once(CancelSkill::new())?;
                    }

                    let Some(skill) = actor.skill(self.skill) else {
                        tracing::warn!(
                            "AI '{}' doesn't have {}",
                            actor.mind().archetype(),
                            self.skill
                        );
                        return Ok(Step::Done);
                    };

                    self.phase = StackPhase::Charging {
                        wanted: self.stacks.clamp(1, skill.rank.stack_max.max(1)),
                        loading: None,
                    };
                }
                StackPhase::Charging { wanted, loading } => {
                    let wanted = *wanted;
                    let skill = self.skill;
                    let handler = self.handler.clone();

                    if let Some(wait) = loading.as_mut() {
                        if wait.step(actor)? == Step::Suspend {
                            return Ok(Step::Suspend);
                        }
                        *loading = None;

                        let before = stacks_of(actor, skill);
                        if let Some(readyable) = handler.as_deref().and_then(|h| h.as_readyable()) {
                            readyable.ready(&mut actor.skill_use(skill))?;
                        }
                        set_skill_state(actor, skill, SkillState::Ready)?;
                        actor.sharp_mind(skill, SharpMindStatus::Loaded);

                        // a ready that adds no stack would charge forever
                        if stacks_of(actor, skill) <= before && stacks_of(actor, skill) < wanted {
                            self.phase = StackPhase::Pause(Wait::new(1000, 2000));
                            continue;
                        }
                    }

                    if stacks_of(actor, skill) >= wanted {
                        self.phase = StackPhase::Pause(Wait::new(1000, 2000));
                        continue;
                    }

                    actor.sharp_mind(skill, SharpMindStatus::Loading);
                    if let Some(preparable) = handler.as_deref().and_then(|h| h.as_preparable()) {
                        tolerate(preparable.prepare(&mut actor.skill_use(skill)), skill, "prepare")?;
                    }
                    actor.with_skills(|skills| skills.set_active(skill))?;
                    set_skill_state(actor, skill, SkillState::Prepared)?;

                    let load_time = actor.skill(skill).map_or(0, |skill| skill.rank.load_time_ms);
                    *loading = Some(Wait::exactly(load_time));
                }
                StackPhase::Pause(wait) => {
                    if wait.step(actor)? == Step::Suspend {
                        return Ok(Step::Suspend);
                    }
                    self.phase = StackPhase::Striking;
                }
                StackPhase::Striking => {
                    let target = self.target.filter(|target| actor.world().contains(*target));
                    let combat = self.handler.as_deref().and_then(|h| h.as_combat());

                    match (target, combat) {
                        (Some(target), Some(combat))
                            if stacks_of(actor, self.skill) > 0
                                && actor.timestamp() < self.until =>
                        {
                            combat.use_on(&mut actor.skill_use(self.skill), target)?;
                            return Ok(Step::Suspend);
                        }
                        _ => return self.finish(actor),
                    }
                }
            }
        }
    }
}
