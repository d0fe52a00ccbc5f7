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

//! Skill components

use fauna_common::{SkillId, SkillState};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Rank dependent data of a skill
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SkillRank {
    pub load_time_ms: u32,
    pub stack_max: u32,
    /// Reach of the skill; 0 lets the handler pick its default
    pub range: i32,
}

impl SkillRank {
    pub fn new(load_time_ms: u32, stack_max: u32) -> Self {
        Self {
            load_time_ms,
            stack_max: stack_max.max(1),
            range: 0,
        }
    }

    pub fn with_range(mut self, range: i32) -> Self {
        self.range = range;
        self
    }
}

impl Default for SkillRank {
    fn default() -> Self {
        Self::new(1000, 1)
    }
}

/// A skill known by a creature
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Skill {
    pub id: SkillId,
    pub rank: SkillRank,
    pub stacks: u32,
    pub state: SkillState,
}

impl Skill {
    pub fn new(id: SkillId, rank: SkillRank) -> Self {
        Self {
            id,
            rank,
            stacks: 0,
            state: SkillState::None,
        }
    }
}

/// Known skills of a creature and the one currently loaded
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Skills {
    known: HashMap<SkillId, Skill>,
    active: Option<SkillId>,
}

impl Skills {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder style variant of [`Skills::learn`]
    pub fn with(mut self, id: SkillId, rank: SkillRank) -> Self {
        self.learn(id, rank);
        self
    }

    pub fn learn(&mut self, id: SkillId, rank: SkillRank) {
        self.known.insert(id, Skill::new(id, rank));
    }

    pub fn knows(&self, id: SkillId) -> bool {
        self.known.contains_key(&id)
    }

    pub fn get(&self, id: SkillId) -> Option<&Skill> {
        self.known.get(&id)
    }

    pub fn get_mut(&mut self, id: SkillId) -> Option<&mut Skill> {
        self.known.get_mut(&id)
    }

    pub fn active_id(&self) -> Option<SkillId> {
        self.active
    }

    pub fn active(&self) -> Option<&Skill> {
        self.active.and_then(|id| self.known.get(&id))
    }

    pub fn active_mut(&mut self) -> Option<&mut Skill> {
        self.active.and_then(|id| self.known.get_mut(&id))
    }

    /// Load a known skill as the active one
    pub fn set_active(&mut self, id: SkillId) -> bool {
        if self.knows(id) {
            self.active = Some(id);
            true
        } else {
            false
        }
    }

    /// Unload the active skill without touching its state
    pub fn clear_active(&mut self) -> Option<SkillId> {
        self.active.take()
    }

    /// Unload the active skill, dropping its stacks
    pub fn cancel_active(&mut self) -> Option<SkillId> {
        let id = self.active.take()?;
        if let Some(skill) = self.known.get_mut(&id) {
            skill.state = SkillState::Canceled;
            skill.stacks = 0;
        }
        Some(id)
    }
}
