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

//! Skill identifiers, skill states and combat results

use flagset::flags;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;

/// Identifier of a skill
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct SkillId(pub u16);

impl SkillId {
    pub const NONE: SkillId = SkillId(0);
    pub const REST: SkillId = SkillId(10004);
    pub const DEFENSE: SkillId = SkillId(20001);
    pub const SMASH: SkillId = SkillId(20002);
    pub const COUNTERATTACK: SkillId = SkillId(20003);
    pub const WINDMILL: SkillId = SkillId(20004);
    pub const STOMP: SkillId = SkillId(20006);
    pub const RANGED_ATTACK: SkillId = SkillId(21001);
    pub const COMBAT_MASTERY: SkillId = SkillId(23001);
    pub const LIGHTNINGBOLT: SkillId = SkillId(30101);
    pub const FIREBOLT: SkillId = SkillId(30102);
    pub const ICEBOLT: SkillId = SkillId(30103);
    pub const THUNDER: SkillId = SkillId(30201);
    pub const FIREBALL: SkillId = SkillId(30202);
    pub const ICE_SPEAR: SkillId = SkillId(30203);
    pub const INSPIRATION: SkillId = SkillId(30301);
    pub const WEB_SPINNING: SkillId = SkillId(50049);

    /// Skills whose hits count as magic
    pub const MAGIC: RangeInclusive<SkillId> = SkillId::LIGHTNINGBOLT..=SkillId::INSPIRATION;

    /// Check whether this skill lies in the magic range
    pub fn is_magic(&self) -> bool {
        Self::MAGIC.contains(self)
    }

    /// Check whether this skill is a ranged combat skill
    pub fn is_ranged(&self) -> bool {
        *self == SkillId::RANGED_ATTACK
    }

    /// Well known name of the skill, if any
    pub fn name(&self) -> Option<&'static str> {
        let name = match *self {
            SkillId::NONE => "None",
            SkillId::REST => "Rest",
            SkillId::DEFENSE => "Defense",
            SkillId::SMASH => "Smash",
            SkillId::COUNTERATTACK => "Counterattack",
            SkillId::WINDMILL => "Windmill",
            SkillId::STOMP => "Stomp",
            SkillId::RANGED_ATTACK => "RangedAttack",
            SkillId::COMBAT_MASTERY => "CombatMastery",
            SkillId::LIGHTNINGBOLT => "Lightningbolt",
            SkillId::FIREBOLT => "Firebolt",
            SkillId::ICEBOLT => "Icebolt",
            SkillId::THUNDER => "Thunder",
            SkillId::FIREBALL => "Fireball",
            SkillId::ICE_SPEAR => "IceSpear",
            SkillId::INSPIRATION => "Inspiration",
            SkillId::WEB_SPINNING => "WebSpinning",
            _ => return None,
        };
        Some(name)
    }
}

impl fmt::Display for SkillId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{}({})", name, self.0),
            None => write!(f, "{}", self.0),
        }
    }
}

/// Lifecycle of a creature's active skill
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SkillState {
    #[default]
    None,
    Prepared,
    Ready,
    Used,
    Completed,
    Canceled,
}

/// Outcome of using a combat skill on a target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CombatSkillResult {
    Okay,
    OutOfRange,
    InvalidTarget,
    Failed,
}

flags! {
    /// Options attached to the target side of a combat action
    pub enum TargetOptions: u32 {
        Result = 0x0001,
        Critical = 0x0002,
        KnockDown = 0x0004,
        Smash = 0x0008,
        KnockBack = 0x0010,
        Finished = 0x0020,
    }
}
