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

//! Event type definitions

use crate::ecs::EcsEntity;
use fauna_common::{Position, SharpMindStatus, SkillId, TargetMode, TargetOptions, WeaponSet};
use flagset::FlagSet;
use serde::{Deserialize, Serialize};

/// A resolved combat action as seen from the creature that was hit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetAction {
    pub attacker: EcsEntity,
    pub target: EcsEntity,
    /// Skill the attacker used
    pub attacker_skill: SkillId,
    /// Skill the target had active when the hit landed
    pub target_skill: SkillId,
    pub options: FlagSet<TargetOptions>,
}

impl TargetAction {
    /// Create a plain hit with no options
    pub fn new(attacker: EcsEntity, target: EcsEntity, attacker_skill: SkillId) -> Self {
        Self {
            attacker,
            target,
            attacker_skill,
            target_skill: SkillId::NONE,
            options: TargetOptions::Result.into(),
        }
    }

    /// Set the skill the target was using
    pub fn with_target_skill(mut self, skill: SkillId) -> Self {
        self.target_skill = skill;
        self
    }

    /// Add target options
    pub fn with_options(mut self, options: impl Into<FlagSet<TargetOptions>>) -> Self {
        self.options |= options.into();
        self
    }
}

/// All simulation events
///
/// Events use EcsEntity (hecs::Entity) handles because they never outlive the
/// world they were raised in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum GameEvent {
    // Combat
    CreatureHit {
        action: TargetAction,
    },
    SkillUsed {
        creature: EcsEntity,
        skill: SkillId,
    },
    CreatureDied {
        creature: EcsEntity,
        killer: Option<EcsEntity>,
    },

    // Outbound notifications
    Chat {
        entity: EcsEntity,
        message: String,
    },
    CombatTarget {
        entity: EcsEntity,
        target: Option<EcsEntity>,
        mode: TargetMode,
    },
    SharpMind {
        entity: EcsEntity,
        viewer: EcsEntity,
        skill: SkillId,
        status: SharpMindStatus,
    },
    BodyUpdate {
        entity: EcsEntity,
        height: f32,
    },
    Sound {
        entity: EcsEntity,
        file: String,
    },
    MoveStarted {
        entity: EcsEntity,
        from: Position,
        to: Position,
        walking: bool,
    },
    SkillCanceled {
        entity: EcsEntity,
        skill: SkillId,
    },
    WeaponSetChanged {
        entity: EcsEntity,
        set: WeaponSet,
    },
    ArmorChanged {
        entity: EcsEntity,
        item: Option<u32>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use hecs::World;

    #[test]
    fn test_target_action_builder() {
        let mut world = World::new();
        let attacker = world.spawn(());
        let target = world.spawn(());

        let action = TargetAction::new(attacker, target, SkillId::SMASH)
            .with_target_skill(SkillId::DEFENSE)
            .with_options(TargetOptions::KnockDown);

        assert!(action.options.contains(TargetOptions::Result));
        assert!(action.options.contains(TargetOptions::KnockDown));
        assert_eq!(action.target_skill, SkillId::DEFENSE);
    }

    #[test]
    fn test_event_serialization() {
        let mut world = World::new();
        let entity = world.spawn(());
        let event = GameEvent::CombatTarget {
            entity,
            target: None,
            mode: TargetMode::Alert,
        };

        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("CombatTarget"));
        assert!(json.contains("Alert"));
    }
}
