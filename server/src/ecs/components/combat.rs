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

//! Combat components for creature condition, allegiance and equipment

use crate::ecs::EcsEntity;
use fauna_common::WeaponSet;
use flagset::{FlagSet, flags};
use serde::{Deserialize, Serialize};

flags! {
    /// Persistent creature conditions
    pub enum CreatureFlag: u16 {
        Dead = 0x0001,
        Warping = 0x0002,
        NamedNpc = 0x0004,
        SitDown = 0x0008,
    }
}

/// Condition flags of a creature
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CreatureFlags {
    pub flags: FlagSet<CreatureFlag>,
}

impl CreatureFlags {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, flag: CreatureFlag) -> Self {
        self.flags |= flag;
        self
    }

    pub fn has(&self, flag: CreatureFlag) -> bool {
        self.flags.contains(flag)
    }

    pub fn set(&mut self, flag: CreatureFlag) {
        self.flags |= flag;
    }

    pub fn clear(&mut self, flag: CreatureFlag) {
        self.flags -= flag;
    }
}

/// Status effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusEffectType {
    Stunned,
    Invisible,
}

/// Individual timed status effect
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusEffect {
    pub effect_type: StatusEffectType,
    /// Remaining time in milliseconds
    pub remaining_ms: f64,
}

/// Status effects component
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatusEffects {
    pub effects: Vec<StatusEffect>,
}

impl StatusEffects {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply an effect, replacing any running effect of the same type
    pub fn apply(&mut self, effect_type: StatusEffectType, duration_ms: f64) {
        self.remove(effect_type);
        self.effects.push(StatusEffect {
            effect_type,
            remaining_ms: duration_ms,
        });
    }

    pub fn remove(&mut self, effect_type: StatusEffectType) {
        self.effects.retain(|e| e.effect_type != effect_type);
    }

    pub fn has(&self, effect_type: StatusEffectType) -> bool {
        self.effects.iter().any(|e| e.effect_type == effect_type)
    }

    /// Count down every effect and drop the expired ones
    pub fn update(&mut self, delta_ms: f64) {
        for effect in &mut self.effects {
            effect.remaining_ms -= delta_ms;
        }
        self.effects.retain(|e| e.remaining_ms > 0.0);
    }
}

/// Combat state of a creature
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Combatant {
    pub target: Option<EcsEntity>,
    pub battle_stance: bool,
    /// Time spent in the current battle stance
    pub battle_stance_ms: f64,
    /// Extra hits a basic attack chains before stopping
    pub knock_count: u32,
}

impl Combatant {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_battle_stance(&mut self, battle_stance: bool) {
        if battle_stance != self.battle_stance {
            self.battle_stance_ms = 0.0;
        }
        self.battle_stance = battle_stance;
    }
}

/// Race of a creature with its classification tags
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Race {
    pub id: u32,
    /// Slash separated tag path, e.g. `/pc/human/`
    pub tags: String,
}

impl Race {
    pub fn new(id: u32, tags: impl Into<String>) -> Self {
        Self {
            id,
            tags: tags.into(),
        }
    }

    /// Check whether every segment of `pattern` appears in this race's tags.
    ///
    /// `*` matches any segment.
    pub fn has_tag(&self, pattern: &str) -> bool {
        let mut segments = pattern.split('/').filter(|s| !s.is_empty()).peekable();
        if segments.peek().is_none() {
            return false;
        }
        segments.all(|segment| segment == "*" || self.tags.split('/').any(|t| t == segment))
    }
}

/// Marks a player controlled creature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub connected: bool,
}

impl Player {
    pub fn new() -> Self {
        Self { connected: true }
    }
}

impl Default for Player {
    fn default() -> Self {
        Self::new()
    }
}

/// Body shape of a creature
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Body {
    pub height: f32,
}

impl Default for Body {
    fn default() -> Self {
        Self { height: 1.0 }
    }
}

/// Equipped weapon set and armor
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Equipment {
    pub weapon_set: WeaponSet,
    pub armor: Option<u32>,
}

/// Aim progress of a ranged attacker
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AimMeter {
    pub target: Option<EcsEntity>,
    pub started_at: f64,
    /// Time needed to reach a sure shot
    pub full_aim_ms: f64,
}

impl AimMeter {
    pub fn new(full_aim_ms: f64) -> Self {
        Self {
            target: None,
            started_at: 0.0,
            full_aim_ms,
        }
    }

    pub fn start(&mut self, target: EcsEntity, now: f64) {
        self.target = Some(target);
        self.started_at = now;
    }

    pub fn stop(&mut self) {
        self.target = None;
    }

    /// Current hit chance in percent
    pub fn chance(&self, now: f64) -> f64 {
        if self.target.is_none() || self.full_aim_ms <= 0.0 {
            return 0.0;
        }
        ((now - self.started_at) / self.full_aim_ms * 100.0).clamp(0.0, 99.0)
    }
}

impl Default for AimMeter {
    fn default() -> Self {
        Self::new(2000.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_creature_flags() {
        let mut flags = CreatureFlags::new().with(CreatureFlag::NamedNpc);
        assert!(flags.has(CreatureFlag::NamedNpc));
        assert!(!flags.has(CreatureFlag::Dead));

        flags.set(CreatureFlag::Dead);
        flags.clear(CreatureFlag::NamedNpc);
        assert!(flags.has(CreatureFlag::Dead));
        assert!(!flags.has(CreatureFlag::NamedNpc));
    }

    #[test]
    fn test_status_effects_expire() {
        let mut effects = StatusEffects::new();
        effects.apply(StatusEffectType::Stunned, 100.0);
        assert!(effects.has(StatusEffectType::Stunned));

        effects.update(50.0);
        assert!(effects.has(StatusEffectType::Stunned));

        effects.update(50.0);
        assert!(!effects.has(StatusEffectType::Stunned));
    }

    #[test]
    fn test_race_tags() {
        let human = Race::new(10001, "/pc/human/");

        assert!(human.has_tag("/pc/"));
        assert!(human.has_tag("pc"));
        assert!(human.has_tag("/pc/*/"));
        assert!(!human.has_tag("/rat/"));
        assert!(!human.has_tag("/"));
    }

    #[test]
    fn test_battle_stance_resets_timer() {
        let mut combatant = Combatant::new();
        combatant.battle_stance_ms = 500.0;
        combatant.set_battle_stance(true);
        assert_eq!(combatant.battle_stance_ms, 0.0);
        assert!(combatant.battle_stance);
    }

    #[test]
    fn test_aim_meter() {
        let mut aim = AimMeter::new(1000.0);
        assert_eq!(aim.chance(500.0), 0.0);

        aim.start(hecs::World::new().spawn(()), 100.0);
        assert_eq!(aim.chance(600.0), 50.0);
        assert_eq!(aim.chance(5000.0), 99.0);
    }
}
