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

//! Inbound events and hit classification

use crate::ai::reactions::AiEventKind;
use crate::ecs::EcsEntity;
use crate::ecs::events::{GameEvent, TargetAction};
use fauna_common::{SkillId, TargetOptions};

/// Event kinds a hit maps to, the second tried when the first has no reactions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HitClass {
    pub kind: Option<AiEventKind>,
    pub fallback: Option<AiEventKind>,
}

impl HitClass {
    /// Classify a hit taken by the creature
    ///
    /// Knock downs win over everything except the windmill sweep, which never
    /// counts as one. A hit landing on a raised defense comes next, then magic
    /// by attacker skill id, which falls back to the plain hit kinds.
    pub fn classify(action: &TargetAction) -> Self {
        let critical = action.options.contains(TargetOptions::Critical);
        let plain = if critical {
            AiEventKind::CriticalHit
        } else {
            AiEventKind::Hit
        };

        if action.options.contains(TargetOptions::KnockDown)
            || action.options.contains(TargetOptions::Smash)
        {
            let kind = (action.attacker_skill != SkillId::WINDMILL).then_some(if critical {
                AiEventKind::CriticalKnockDown
            } else {
                AiEventKind::KnockDown
            });
            Self {
                kind,
                fallback: None,
            }
        } else if action.target_skill == SkillId::DEFENSE {
            Self {
                kind: Some(AiEventKind::DefenseHit),
                fallback: None,
            }
        } else if action.attacker_skill.is_magic() {
            Self {
                kind: Some(AiEventKind::MagicHit),
                fallback: Some(plain),
            }
        } else {
            Self {
                kind: Some(plain),
                fallback: None,
            }
        }
    }
}

/// Something that happened to a creature its AI reacts to
#[derive(Debug, Clone, PartialEq)]
pub enum AiEvent {
    /// The creature was hit
    Hit(TargetAction),
    /// The creature died
    Death { killer: Option<EcsEntity> },
    /// The creature used a skill on someone
    UsedSkill { skill: SkillId },
}

impl AiEvent {
    /// Pick out the creature an event concerns and what its AI should see
    pub fn route(event: &GameEvent) -> Option<(EcsEntity, AiEvent)> {
        match event {
            GameEvent::CreatureHit { action } => Some((action.target, AiEvent::Hit(action.clone()))),
            GameEvent::SkillUsed { creature, skill } => {
                Some((*creature, AiEvent::UsedSkill { skill: *skill }))
            }
            GameEvent::CreatureDied { creature, killer } => {
                Some((*creature, AiEvent::Death { killer: *killer }))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hecs::World;
    use proptest::prelude::*;

    fn action(attacker_skill: SkillId) -> TargetAction {
        let mut world = World::new();
        let attacker = world.spawn(());
        let target = world.spawn(());
        TargetAction::new(attacker, target, attacker_skill)
    }

    #[test]
    fn test_plain_and_critical_hits() {
        let hit = HitClass::classify(&action(SkillId::COMBAT_MASTERY));
        assert_eq!(hit.kind, Some(AiEventKind::Hit));
        assert_eq!(hit.fallback, None);

        let critical = HitClass::classify(
            &action(SkillId::COMBAT_MASTERY).with_options(TargetOptions::Critical),
        );
        assert_eq!(critical.kind, Some(AiEventKind::CriticalHit));
    }

    #[test]
    fn test_knock_down_wins() {
        let smash = HitClass::classify(
            &action(SkillId::SMASH)
                .with_options(TargetOptions::Smash)
                .with_target_skill(SkillId::DEFENSE),
        );
        assert_eq!(smash.kind, Some(AiEventKind::KnockDown));

        let critical = HitClass::classify(
            &action(SkillId::FIREBOLT)
                .with_options(TargetOptions::KnockDown | TargetOptions::Critical),
        );
        assert_eq!(critical.kind, Some(AiEventKind::CriticalKnockDown));
    }

    #[test]
    fn test_windmill_never_knocks_down() {
        let windmill = HitClass::classify(
            &action(SkillId::WINDMILL).with_options(TargetOptions::KnockDown),
        );
        assert_eq!(windmill, HitClass { kind: None, fallback: None });
    }

    #[test]
    fn test_defense_hit() {
        let defended = HitClass::classify(
            &action(SkillId::FIREBOLT).with_target_skill(SkillId::DEFENSE),
        );
        assert_eq!(defended.kind, Some(AiEventKind::DefenseHit));
    }

    #[test]
    fn test_magic_hit_falls_back() {
        let magic = HitClass::classify(
            &action(SkillId::ICEBOLT).with_options(TargetOptions::Critical),
        );
        assert_eq!(magic.kind, Some(AiEventKind::MagicHit));
        assert_eq!(magic.fallback, Some(AiEventKind::CriticalHit));
    }

    #[test]
    fn test_route_game_events() {
        let hit = action(SkillId::SMASH);
        let target = hit.target;
        let routed = AiEvent::route(&GameEvent::CreatureHit { action: hit.clone() });
        assert_eq!(routed, Some((target, AiEvent::Hit(hit))));

        let chat = GameEvent::Chat {
            entity: target,
            message: "hi".into(),
        };
        assert_eq!(AiEvent::route(&chat), None);
    }

    proptest! {
        #[test]
        fn test_classification_is_deterministic(
            attacker in 0u16..60000,
            defender in prop_oneof![Just(0u16), Just(20001u16), 0u16..60000],
            options in 0u32..64,
        ) {
            let mut hit = action(SkillId(attacker)).with_target_skill(SkillId(defender));
            hit.options = flagset::FlagSet::new_truncated(options);

            let first = HitClass::classify(&hit);
            let second = HitClass::classify(&hit.clone());
            prop_assert_eq!(first, second);

            if first.fallback.is_some() {
                prop_assert_eq!(first.kind, Some(AiEventKind::MagicHit));
            }
            if first.kind.is_none() {
                prop_assert_eq!(SkillId(attacker), SkillId::WINDMILL);
            }
        }
    }
}
