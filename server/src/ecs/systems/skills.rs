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

//! Combat skill subsystem
//!
//! Every skill is served by a [`SkillHandler`] that exposes the subset of
//! capabilities it supports. Callers ask for a capability and treat a missing
//! one as "not implemented" rather than a fault.

mod handlers;

pub use handlers::{Bolt, InstantSkill, MeleeAttack, RangedShot, Rest, Smash, Stance, Sweep};

use crate::ecs::components::{Skill, Skills, Transform};
use crate::ecs::events::EventBus;
use crate::ecs::{EcsEntity, GameWorld};
use fauna_common::{CombatSkillResult, Position, SkillId};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// Skill subsystem errors
#[derive(Debug, Error)]
pub enum SkillError {
    #[error("no handler registered for skill {0}")]
    MissingHandler(SkillId),

    #[error("skill {skill} is not {capability}")]
    MissingCapability {
        skill: SkillId,
        capability: &'static str,
    },

    #[error("skill {0} is not implemented")]
    NotImplemented(SkillId),

    #[error("skill {0} requires parameters")]
    MissingParameters(SkillId),

    #[error("creature does not know skill {0}")]
    UnknownSkill(SkillId),

    #[error(transparent)]
    Component(#[from] hecs::ComponentError),
}

/// One invocation of a skill by a creature
pub struct SkillUse<'a> {
    pub world: &'a mut GameWorld,
    pub events: &'a EventBus,
    pub creature: EcsEntity,
    pub skill: SkillId,
}

impl<'a> SkillUse<'a> {
    pub fn new(
        world: &'a mut GameWorld,
        events: &'a EventBus,
        creature: EcsEntity,
        skill: SkillId,
    ) -> Self {
        Self {
            world,
            events,
            creature,
            skill,
        }
    }

    /// Run `f` against the creature's copy of the skill being used
    pub fn with_skill<R>(&mut self, f: impl FnOnce(&mut Skill) -> R) -> Result<R, SkillError> {
        let mut skills = self.world.get::<&mut Skills>(self.creature)?;
        let skill = skills
            .get_mut(self.skill)
            .ok_or(SkillError::UnknownSkill(self.skill))?;
        Ok(f(skill))
    }

    /// Reach of the skill, falling back to `default` when the rank leaves it open
    pub fn range_or(&mut self, default: i32) -> i32 {
        match self.with_skill(|skill| skill.rank.range) {
            Ok(range) if range > 0 => range,
            _ => default,
        }
    }

    pub fn position_of(&self, entity: EcsEntity) -> Result<Position, SkillError> {
        Ok(self.world.get::<&Transform>(entity)?.position)
    }
}

pub trait Preparable {
    /// Begin loading; `false` means the skill refused to load
    fn prepare(&self, ctx: &mut SkillUse<'_>) -> Result<bool, SkillError>;
}

pub trait Readyable {
    fn ready(&self, ctx: &mut SkillUse<'_>) -> Result<(), SkillError>;
}

pub trait Startable {
    fn start(&self, ctx: &mut SkillUse<'_>) -> Result<(), SkillError>;
}

pub trait Stoppable {
    fn stop(&self, ctx: &mut SkillUse<'_>) -> Result<(), SkillError>;
}

pub trait Completable {
    fn complete(&self, ctx: &mut SkillUse<'_>) -> Result<(), SkillError>;
}

pub trait CombatSkill {
    fn use_on(
        &self,
        ctx: &mut SkillUse<'_>,
        target: EcsEntity,
    ) -> Result<CombatSkillResult, SkillError>;
}

/// Skill used around the creature rather than on a single target
pub trait AreaSkill {
    fn use_area(&self, ctx: &mut SkillUse<'_>) -> Result<(), SkillError>;
}

/// Capability surface of a skill
pub trait SkillHandler: Send + Sync {
    fn as_preparable(&self) -> Option<&dyn Preparable> {
        None
    }

    fn as_readyable(&self) -> Option<&dyn Readyable> {
        None
    }

    fn as_startable(&self) -> Option<&dyn Startable> {
        None
    }

    fn as_stoppable(&self) -> Option<&dyn Stoppable> {
        None
    }

    fn as_completable(&self) -> Option<&dyn Completable> {
        None
    }

    fn as_combat(&self) -> Option<&dyn CombatSkill> {
        None
    }

    fn as_area(&self) -> Option<&dyn AreaSkill> {
        None
    }
}

/// Registry of skill handlers
#[derive(Clone, Default)]
pub struct SkillManager {
    handlers: HashMap<SkillId, Arc<dyn SkillHandler>>,
}

impl SkillManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a manager with handlers for every well known skill
    pub fn with_builtin_handlers() -> Self {
        let mut manager = Self::new();
        manager.register(SkillId::COMBAT_MASTERY, MeleeAttack);
        manager.register(SkillId::SMASH, Smash);
        manager.register(SkillId::DEFENSE, Stance);
        manager.register(SkillId::COUNTERATTACK, Stance);
        manager.register(SkillId::WINDMILL, Sweep::new(300));
        manager.register(SkillId::STOMP, Sweep::new(500));
        manager.register(SkillId::RANGED_ATTACK, RangedShot);
        manager.register(SkillId::LIGHTNINGBOLT, Bolt);
        manager.register(SkillId::FIREBOLT, Bolt);
        manager.register(SkillId::ICEBOLT, Bolt);
        manager.register(SkillId::REST, Rest);
        manager.register(SkillId::WEB_SPINNING, InstantSkill);
        manager
    }

    pub fn register(&mut self, skill: SkillId, handler: impl SkillHandler + 'static) {
        self.handlers.insert(skill, Arc::new(handler));
    }

    pub fn get(&self, skill: SkillId) -> Option<Arc<dyn SkillHandler>> {
        self.handlers.get(&skill).cloned()
    }

    /// Like [`SkillManager::get`] but reports a missing handler as an error
    pub fn handler(&self, skill: SkillId) -> Result<Arc<dyn SkillHandler>, SkillError> {
        self.get(skill).ok_or(SkillError::MissingHandler(skill))
    }
}
