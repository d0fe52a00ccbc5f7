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

//! Built-in skill handlers
//!
//! These resolve only what the behavior engine observes: range checks, stack
//! bookkeeping and the hit/used events. Damage is left to whoever consumes
//! `CreatureHit`.

use super::{
    AreaSkill, CombatSkill, Completable, Preparable, Readyable, SkillError, SkillHandler,
    SkillUse, Startable, Stoppable,
};
use crate::ecs::components::{CreatureFlag, CreatureFlags, Skills, Transform};
use crate::ecs::events::{GameEvent, TargetAction};
use crate::ecs::{EcsEntity, GameWorld};
use fauna_common::{CombatSkillResult, SkillId, SkillState, TargetOptions};
use flagset::FlagSet;
use hecs::Entity;

const MELEE_RANGE: i32 = 250;
const MISSILE_RANGE: i32 = 1500;

fn is_dead(world: &GameWorld, entity: EcsEntity) -> bool {
    world
        .get::<&CreatureFlags>(entity)
        .is_ok_and(|flags| flags.has(CreatureFlag::Dead))
}

fn active_skill_of(world: &GameWorld, entity: EcsEntity) -> SkillId {
    world
        .get::<&Skills>(entity)
        .ok()
        .and_then(|skills| skills.active_id())
        .unwrap_or(SkillId::NONE)
}

/// Land a hit on `target` and announce it
fn strike(
    ctx: &mut SkillUse<'_>,
    target: EcsEntity,
    default_range: i32,
    options: FlagSet<TargetOptions>,
) -> Result<CombatSkillResult, SkillError> {
    let Ok(target_position) = ctx.position_of(target) else {
        return Ok(CombatSkillResult::InvalidTarget);
    };
    if target == ctx.creature || is_dead(ctx.world, target) {
        return Ok(CombatSkillResult::InvalidTarget);
    }

    let range = ctx.range_or(default_range);
    if !ctx.position_of(ctx.creature)?.in_range(target_position, range) {
        return Ok(CombatSkillResult::OutOfRange);
    }

    let action = TargetAction::new(ctx.creature, target, ctx.skill)
        .with_target_skill(active_skill_of(ctx.world, target))
        .with_options(options);
    ctx.events.publish(GameEvent::CreatureHit { action });
    ctx.events.publish(GameEvent::SkillUsed {
        creature: ctx.creature,
        skill: ctx.skill,
    });

    Ok(CombatSkillResult::Okay)
}

fn load_single_stack(ctx: &mut SkillUse<'_>) -> Result<(), SkillError> {
    ctx.with_skill(|skill| skill.stacks = 1)
}

fn drop_stacks(ctx: &mut SkillUse<'_>) -> Result<(), SkillError> {
    ctx.with_skill(|skill| skill.stacks = 0)
}

/// Basic attack available to every fighter
pub struct MeleeAttack;

impl SkillHandler for MeleeAttack {
    fn as_combat(&self) -> Option<&dyn CombatSkill> {
        Some(self)
    }
}

impl CombatSkill for MeleeAttack {
    fn use_on(
        &self,
        ctx: &mut SkillUse<'_>,
        target: EcsEntity,
    ) -> Result<CombatSkillResult, SkillError> {
        strike(ctx, target, MELEE_RANGE, TargetOptions::Result.into())
    }
}

/// Heavy single blow that knocks the target down
pub struct Smash;

impl SkillHandler for Smash {
    fn as_preparable(&self) -> Option<&dyn Preparable> {
        Some(self)
    }

    fn as_readyable(&self) -> Option<&dyn Readyable> {
        Some(self)
    }

    fn as_completable(&self) -> Option<&dyn Completable> {
        Some(self)
    }

    fn as_combat(&self) -> Option<&dyn CombatSkill> {
        Some(self)
    }
}

impl Preparable for Smash {
    fn prepare(&self, _ctx: &mut SkillUse<'_>) -> Result<bool, SkillError> {
        Ok(true)
    }
}

impl Readyable for Smash {
    fn ready(&self, ctx: &mut SkillUse<'_>) -> Result<(), SkillError> {
        load_single_stack(ctx)
    }
}

impl Completable for Smash {
    fn complete(&self, ctx: &mut SkillUse<'_>) -> Result<(), SkillError> {
        drop_stacks(ctx)
    }
}

impl CombatSkill for Smash {
    fn use_on(
        &self,
        ctx: &mut SkillUse<'_>,
        target: EcsEntity,
    ) -> Result<CombatSkillResult, SkillError> {
        let result = strike(
            ctx,
            target,
            MELEE_RANGE,
            TargetOptions::Result | TargetOptions::Smash | TargetOptions::KnockDown,
        )?;
        if result == CombatSkillResult::Okay {
            ctx.with_skill(|skill| skill.state = SkillState::Used)?;
        }
        Ok(result)
    }
}

/// Passive stance such as Defense or Counterattack, held until triggered
pub struct Stance;

impl SkillHandler for Stance {
    fn as_preparable(&self) -> Option<&dyn Preparable> {
        Some(self)
    }

    fn as_readyable(&self) -> Option<&dyn Readyable> {
        Some(self)
    }

    fn as_completable(&self) -> Option<&dyn Completable> {
        Some(self)
    }
}

impl Preparable for Stance {
    fn prepare(&self, _ctx: &mut SkillUse<'_>) -> Result<bool, SkillError> {
        Ok(true)
    }
}

impl Readyable for Stance {
    fn ready(&self, ctx: &mut SkillUse<'_>) -> Result<(), SkillError> {
        load_single_stack(ctx)
    }
}

impl Completable for Stance {
    fn complete(&self, ctx: &mut SkillUse<'_>) -> Result<(), SkillError> {
        drop_stacks(ctx)
    }
}

/// Spell that charges stacks and spends one per cast
pub struct Bolt;

impl SkillHandler for Bolt {
    fn as_preparable(&self) -> Option<&dyn Preparable> {
        Some(self)
    }

    fn as_readyable(&self) -> Option<&dyn Readyable> {
        Some(self)
    }

    fn as_completable(&self) -> Option<&dyn Completable> {
        Some(self)
    }

    fn as_combat(&self) -> Option<&dyn CombatSkill> {
        Some(self)
    }
}

impl Preparable for Bolt {
    fn prepare(&self, _ctx: &mut SkillUse<'_>) -> Result<bool, SkillError> {
        Ok(true)
    }
}

impl Readyable for Bolt {
    fn ready(&self, ctx: &mut SkillUse<'_>) -> Result<(), SkillError> {
        ctx.with_skill(|skill| skill.stacks = (skill.stacks + 1).min(skill.rank.stack_max))
    }
}

impl Completable for Bolt {
    fn complete(&self, _ctx: &mut SkillUse<'_>) -> Result<(), SkillError> {
        // Stacks are spent on use.
        Ok(())
    }
}

impl CombatSkill for Bolt {
    fn use_on(
        &self,
        ctx: &mut SkillUse<'_>,
        target: EcsEntity,
    ) -> Result<CombatSkillResult, SkillError> {
        if ctx.with_skill(|skill| skill.stacks)? == 0 {
            return Ok(CombatSkillResult::Failed);
        }
        let result = strike(ctx, target, MISSILE_RANGE, TargetOptions::Result.into())?;
        if result == CombatSkillResult::Okay {
            ctx.with_skill(|skill| skill.stacks = skill.stacks.saturating_sub(1))?;
        }
        Ok(result)
    }
}

/// Bow or crossbow shot
pub struct RangedShot;

impl SkillHandler for RangedShot {
    fn as_preparable(&self) -> Option<&dyn Preparable> {
        Some(self)
    }

    fn as_readyable(&self) -> Option<&dyn Readyable> {
        Some(self)
    }

    fn as_completable(&self) -> Option<&dyn Completable> {
        Some(self)
    }

    fn as_combat(&self) -> Option<&dyn CombatSkill> {
        Some(self)
    }
}

impl Preparable for RangedShot {
    fn prepare(&self, _ctx: &mut SkillUse<'_>) -> Result<bool, SkillError> {
        Ok(true)
    }
}

impl Readyable for RangedShot {
    fn ready(&self, ctx: &mut SkillUse<'_>) -> Result<(), SkillError> {
        load_single_stack(ctx)
    }
}

impl Completable for RangedShot {
    fn complete(&self, ctx: &mut SkillUse<'_>) -> Result<(), SkillError> {
        drop_stacks(ctx)
    }
}

impl CombatSkill for RangedShot {
    fn use_on(
        &self,
        ctx: &mut SkillUse<'_>,
        target: EcsEntity,
    ) -> Result<CombatSkillResult, SkillError> {
        strike(ctx, target, MISSILE_RANGE, TargetOptions::Result.into())
    }
}

/// Area attack around the user, knocking down everyone in reach
pub struct Sweep {
    radius: i32,
}

impl Sweep {
    pub fn new(radius: i32) -> Self {
        Self { radius }
    }
}

impl SkillHandler for Sweep {
    fn as_preparable(&self) -> Option<&dyn Preparable> {
        Some(self)
    }

    fn as_readyable(&self) -> Option<&dyn Readyable> {
        Some(self)
    }

    fn as_completable(&self) -> Option<&dyn Completable> {
        Some(self)
    }

    fn as_area(&self) -> Option<&dyn AreaSkill> {
        Some(self)
    }
}

impl Preparable for Sweep {
    fn prepare(&self, _ctx: &mut SkillUse<'_>) -> Result<bool, SkillError> {
        Ok(true)
    }
}

impl Readyable for Sweep {
    fn ready(&self, ctx: &mut SkillUse<'_>) -> Result<(), SkillError> {
        load_single_stack(ctx)
    }
}

impl Completable for Sweep {
    fn complete(&self, ctx: &mut SkillUse<'_>) -> Result<(), SkillError> {
        drop_stacks(ctx)
    }
}

impl AreaSkill for Sweep {
    fn use_area(&self, ctx: &mut SkillUse<'_>) -> Result<(), SkillError> {
        let origin = ctx.position_of(ctx.creature)?;
        let radius = ctx.range_or(self.radius);

        let victims: Vec<EcsEntity> = ctx
            .world
            .query::<(Entity, &Transform, Option<&CreatureFlags>)>()
            .iter()
            .filter(|(entity, transform, flags)| {
                *entity != ctx.creature
                    && origin.in_range(transform.position, radius)
                    && !flags.is_some_and(|f| f.has(CreatureFlag::Dead))
            })
            .map(|(entity, _, _)| entity)
            .collect();

        for target in victims {
            let action = TargetAction::new(ctx.creature, target, ctx.skill)
                .with_target_skill(active_skill_of(ctx.world, target))
                .with_options(TargetOptions::KnockDown);
            ctx.events.publish(GameEvent::CreatureHit { action });
        }
        ctx.events.publish(GameEvent::SkillUsed {
            creature: ctx.creature,
            skill: ctx.skill,
        });
        drop_stacks(ctx)
    }
}

/// Sitting down to recover
pub struct Rest;

impl SkillHandler for Rest {
    fn as_startable(&self) -> Option<&dyn Startable> {
        Some(self)
    }

    fn as_stoppable(&self) -> Option<&dyn Stoppable> {
        Some(self)
    }
}

impl Startable for Rest {
    fn start(&self, ctx: &mut SkillUse<'_>) -> Result<(), SkillError> {
        let flags = ctx
            .world
            .get::<&CreatureFlags>(ctx.creature)
            .map(|flags| *flags)
            .unwrap_or_default();
        ctx.world
            .insert_one(ctx.creature, flags.with(CreatureFlag::SitDown))
            .map_err(|_| hecs::ComponentError::NoSuchEntity)?;
        Ok(())
    }
}

impl Stoppable for Rest {
    fn stop(&self, ctx: &mut SkillUse<'_>) -> Result<(), SkillError> {
        if let Ok(mut flags) = ctx.world.get::<&mut CreatureFlags>(ctx.creature) {
            flags.clear(CreatureFlag::SitDown);
        }
        Ok(())
    }
}

/// Skill that takes effect as soon as it is prepared, with no ready step
pub struct InstantSkill;

impl SkillHandler for InstantSkill {
    fn as_preparable(&self) -> Option<&dyn Preparable> {
        Some(self)
    }

    fn as_completable(&self) -> Option<&dyn Completable> {
        Some(self)
    }
}

impl Preparable for InstantSkill {
    fn prepare(&self, _ctx: &mut SkillUse<'_>) -> Result<bool, SkillError> {
        Ok(true)
    }
}

impl Completable for InstantSkill {
    fn complete(&self, ctx: &mut SkillUse<'_>) -> Result<(), SkillError> {
        ctx.events.publish(GameEvent::SkillUsed {
            creature: ctx.creature,
            skill: ctx.skill,
        });
        drop_stacks(ctx)
    }
}
