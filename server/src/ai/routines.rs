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

//! Action primitives behaviors are composed from
//!
//! Every primitive is a [`Routine`](crate::ai::cursor::Routine) holding its
//! own progress, so a behavior spanning many ticks is just a queue of these.

mod combat;
mod flow;
mod gestures;
mod movement;
mod skills;

pub use combat::{Attack, RangedAttack, StackAttack};
pub use flow::{Timeout, Wait};
pub use gestures::{PlaySound, Say, SayRandomPhrase, SetHeight, SwitchArmor, SwitchTo};
pub use movement::{Circle, Follow, KeepDistance, MoveTo, Wander};
pub use skills::{CancelSkill, CompleteSkill, PrepareSkill, StartSkill, StopSkill, UseSkill};

use crate::ai::actor::Actor;
use crate::ai::error::AiResult;
use crate::ecs::systems::SkillError;
use fauna_common::SkillId;

/// Suspends a routine once when it starts while the creature is stunned
#[derive(Debug, Default)]
pub(crate) struct StunGate {
    checked: bool,
}

impl StunGate {
    /// `true` on the first check if the creature is stunned, `false` afterwards
    pub(crate) fn holds(&mut self, actor: &Actor<'_>) -> bool {
        if self.checked {
            return false;
        }
        self.checked = true;
        actor.is_stunned()
    }
}

/// Log skill failures a creature can shrug off, pass the rest on
///
/// `Ok(None)` means the call failed harmlessly.
pub(crate) fn tolerate<T>(
    result: Result<T, SkillError>,
    skill: SkillId,
    action: &str,
) -> AiResult<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(SkillError::MissingParameters(_)) => {
            tracing::warn!("Skill {} failed to {}, it might need parameters", skill, action);
            Ok(None)
        }
        Err(SkillError::NotImplemented(_)) => {
            tracing::warn!("Unimplemented: {} of skill {}", action, skill);
            Ok(None)
        }
        Err(error) => Err(error.into()),
    }
}
