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

//! Thin wrappers around the skill subsystem

use crate::ai::actor::Actor;
use crate::ai::cursor::{Routine, Step};
use crate::ai::error::AiResult;
use crate::ai::routines::flow::Wait;
use crate::ai::routines::{StunGate, tolerate};
use crate::ecs::systems::SkillHandler;
use fauna_common::{SharpMindStatus, SkillId, SkillState};
use std::sync::Arc;

pub(crate) fn set_skill_state(actor: &mut Actor<'_>, skill: SkillId, state: SkillState) -> AiResult<()> {
    actor.with_skills(|skills| {
        if let Some(skill) = skills.get_mut(skill) {
            skill.state = state;
        }
    })
}

pub(crate) fn stacks_of(actor: &Actor<'_>, skill: SkillId) -> u32 {
    actor.skill(skill).map_or(0, |skill| skill.stacks)
}

/// Load a skill until it holds the requested number of additional stacks
pub struct PrepareSkill {
    skill: SkillId,
    stacks: u32,
    gate: StunGate,
    target: Option<u32>,
    handler: Option<Arc<dyn SkillHandler>>,
    loading: Option<Wait>,
}

impl PrepareSkill {
    pub fn new(skill: SkillId, stacks: u32) -> Self {
        Self {
            skill,
            stacks,
            gate: StunGate::default(),
            target: None,
            handler: None,
            loading: None,
        }
    }

    pub fn once(skill: SkillId) -> Self {
        Self::new(skill, 1)
    }

    /// Finish a load: ready the skill and announce it
    fn ready(&self, actor: &mut Actor<'_>) -> AiResult<()> {
        if let Some(readyable) = self.handler.as_ref().and_then(|h| h.as_readyable()) {
            readyable.ready(&mut actor.skill_use(self.skill))?;
        }
        set_skill_state(actor, self.skill, SkillState::Ready)?;
        actor.sharp_mind(self.skill, SharpMindStatus::Loaded);
        Ok(())
    }
}

impl Routine for PrepareSkill {
    fn step(&mut self, actor: &mut Actor<'_>) -> AiResult<Step> {
        if self.gate.holds(actor) {
            return Ok(Step::Suspend);
        }

        loop {
            if let Some(loading) = self.loading.as_mut() {
                if loading.step(actor)? == Step::Suspend {
                    return Ok(Step::Suspend);
                }
                self.loading = None;
                self.ready(actor)?;

                // a skill that never gains stacks would load forever
                if stacks_of(actor, self.skill) == 0 {
                    return Ok(Step::Done);
                }
            }

            let target = match self.target {
                Some(target) => target,
                None => {
                    // creatures lacking the skill simply skip it
                    let Some(skill) = actor.skill(self.skill) else {
                        return Ok(Step::Done);
                    };

                    if actor.active_skill().is_some_and(|active| active != self.skill) {
                        actor.execute_once(CancelSkill::new())?;
                    }

                    let target = (skill.stacks + self.stacks).clamp(1, skill.rank.stack_max.max(1));
                    self.target = Some(target);
                    target
                }
            };

            if stacks_of(actor, self.skill) >= target {
                return Ok(Step::Done);
            }

            let Some(handler) = actor.handler(self.skill) else {
                tracing::warn!("Unimplemented: no handler to prepare skill {}", self.skill);
                return Ok(Step::Done);
            };

            let (Some(preparable), readyable, completable) = (
                handler.as_preparable(),
                handler.as_readyable(),
                handler.as_completable(),
            ) else {
                tracing::warn!("Unimplemented: skill {} is not preparable", self.skill);
                return Ok(Step::Done);
            };

            // instant skills go straight from prepare to complete
            if readyable.is_none() {
                let Some(completable) = completable else {
                    tracing::warn!("Unimplemented: skill {} is not readyable", self.skill);
                    return Ok(Step::Done);
                };

                preparable.prepare(&mut actor.skill_use(self.skill))?;
                actor.with_skills(|skills| skills.set_active(self.skill))?;
                completable.complete(&mut actor.skill_use(self.skill))?;

                if stacks_of(actor, self.skill) == 0 {
                    return Ok(Step::Done);
                }
                continue;
            }

            actor.sharp_mind(self.skill, SharpMindStatus::Loading);

            let prepared = tolerate(
                preparable.prepare(&mut actor.skill_use(self.skill)),
                self.skill,
                "prepare",
            )?;
            match prepared {
                Some(false) => return Ok(Step::Done),
                Some(true) => {
                    actor.with_skills(|skills| skills.set_active(self.skill))?;
                    set_skill_state(actor, self.skill, SkillState::Prepared)?;
                }
                None => {}
            }

            let load_time = actor.skill(self.skill).map_or(0, |skill| skill.rank.load_time_ms);
            self.loading = Some(Wait::exactly(load_time));
            self.handler = Some(handler);
        }
    }
}

/// Drop the loaded skill
#[derive(Debug, Default)]
pub struct CancelSkill {
    gate: StunGate,
}

impl CancelSkill {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Routine for CancelSkill {
    fn step(&mut self, actor: &mut Actor<'_>) -> AiResult<Step> {
        if self.gate.holds(actor) {
            return Ok(Step::Suspend);
        }

        actor.cancel_active_skill()?;
        Ok(Step::Done)
    }
}

/// Use the loaded skill around the creature
#[derive(Debug, Default)]
pub struct UseSkill {
    gate: StunGate,
    active: Option<SkillId>,
}

impl UseSkill {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Routine for UseSkill {
    fn step(&mut self, actor: &mut Actor<'_>) -> AiResult<Step> {
        let skill = match self.active {
            Some(skill) => skill,
            None => {
                let Some(skill) = actor.active_skill() else {
                    return Ok(Step::Done);
                };
                self.active = Some(skill);
                skill
            }
        };

        if self.gate.holds(actor) {
            return Ok(Step::Suspend);
        }

        let handler = actor.handler(skill);
        match handler.as_deref().and_then(|handler| handler.as_area()) {
            Some(area) => {
                tolerate(area.use_area(&mut actor.skill_use(skill)), skill, "use")?;
                actor.sharp_mind(skill, SharpMindStatus::Cancelling);
            }
            None => tracing::warn!("Unimplemented: use of skill {}", skill),
        }

        Ok(Step::Done)
    }
}

/// Finish the loaded skill
///
/// A skill with stacks left stays loaded and ready; otherwise it is unloaded.
#[derive(Default)]
pub struct CompleteSkill {
    gate: StunGate,
    loaded: Option<(SkillId, Arc<dyn SkillHandler>)>,
}

impl CompleteSkill {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Routine for CompleteSkill {
    fn step(&mut self, actor: &mut Actor<'_>) -> AiResult<Step> {
        if self.loaded.is_none() {
            let Some(skill) = actor.active_skill() else {
                return Ok(Step::Done);
            };
            let Some(handler) = actor
                .handler(skill)
                .filter(|handler| handler.as_completable().is_some())
            else {
                tracing::warn!("Unimplemented: skill {} is not completable", skill);
                return Ok(Step::Done);
            };
            self.loaded = Some((skill, handler));
        }

        if self.gate.holds(actor) {
            return Ok(Step::Suspend);
        }

        let Some((skill, handler)) = self.loaded.clone() else {
            return Ok(Step::Done);
        };

        if let Some(completable) = handler.as_completable() {
            tolerate(completable.complete(&mut actor.skill_use(skill)), skill, "complete")?;
        }

        let Some(state) = actor.skill(skill) else {
            return Ok(Step::Done);
        };
        if state.stacks == 0 {
            actor.with_skills(|skills| skills.clear_active())?;
            set_skill_state(actor, skill, SkillState::Completed)?;
            actor.sharp_mind(skill, SharpMindStatus::Cancelling);
        } else if state.state != SkillState::Canceled {
            set_skill_state(actor, skill, SkillState::Ready)?;
        }

        Ok(Step::Done)
    }
}

/// Start a toggled skill such as resting
#[derive(Debug)]
pub struct StartSkill {
    skill: SkillId,
    gate: StunGate,
    checked: bool,
}

impl StartSkill {
    pub fn new(skill: SkillId) -> Self {
        Self {
            skill,
            gate: StunGate::default(),
            checked: false,
        }
    }
}

impl Routine for StartSkill {
    fn step(&mut self, actor: &mut Actor<'_>) -> AiResult<Step> {
        let handler = actor.handler(self.skill);
        if !self.checked {
            if !actor.knows(self.skill) {
                tracing::warn!(
                    "AI '{}' tried to start skill {} its creature doesn't have",
                    actor.mind().archetype(),
                    self.skill
                );
                return Ok(Step::Done);
            }
            if handler.as_deref().and_then(|h| h.as_startable()).is_none() {
                tracing::warn!("Unimplemented: skill {} is not startable", self.skill);
                return Ok(Step::Done);
            }
            self.checked = true;
        }

        if self.gate.holds(actor) {
            return Ok(Step::Suspend);
        }

        if let Some(startable) = handler.as_deref().and_then(|h| h.as_startable()) {
            tolerate(startable.start(&mut actor.skill_use(self.skill)), self.skill, "start")?;
        }
        Ok(Step::Done)
    }
}

/// Stop a toggled skill
#[derive(Debug)]
pub struct StopSkill {
    skill: SkillId,
    gate: StunGate,
    checked: bool,
}

impl StopSkill {
    pub fn new(skill: SkillId) -> Self {
        Self {
            skill,
            gate: StunGate::default(),
            checked: false,
        }
    }
}

impl Routine for StopSkill {
    fn step(&mut self, actor: &mut Actor<'_>) -> AiResult<Step> {
        let handler = actor.handler(self.skill);
        if !self.checked {
            if !actor.knows(self.skill) {
                tracing::warn!(
                    "AI '{}' tried to stop skill {} its creature doesn't have",
                    actor.mind().archetype(),
                    self.skill
                );
                return Ok(Step::Done);
            }
            if handler.as_deref().and_then(|h| h.as_stoppable()).is_none() {
                tracing::warn!("Unimplemented: skill {} is not stoppable", self.skill);
                return Ok(Step::Done);
            }
            self.checked = true;
        }

        if self.gate.holds(actor) {
            return Ok(Step::Suspend);
        }

        if let Some(stoppable) = handler.as_deref().and_then(|h| h.as_stoppable()) {
            tolerate(stoppable.stop(&mut actor.skill_use(self.skill)), self.skill, "stop")?;
        }
        Ok(Step::Done)
    }
}
