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

//! Reactions to hits, keyed by state, event kind and attacker skill

use crate::ai::events::HitClass;
use crate::ai::script::Script;
use crate::ai::state::AiState;
use fauna_common::SkillId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Kinds of hits a creature may react to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AiEventKind {
    Hit,
    CriticalHit,
    DefenseHit,
    MagicHit,
    KnockDown,
    CriticalKnockDown,
}

impl fmt::Display for AiEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Authored behavior: fills a script with the routines to run
pub type Behavior = Arc<dyn Fn(&mut Script<'_>) + Send + Sync>;

/// Which registration a lookup matched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReactionKey {
    pub kind: AiEventKind,
    /// `None` for reactions to any skill
    pub skill: Option<SkillId>,
}

impl ReactionKey {
    /// Cursor label for behaviors started by this reaction
    pub fn label(&self) -> String {
        match self.skill {
            Some(skill) => format!("reaction:{}:{}", self.kind, skill.0),
            None => format!("reaction:{}:*", self.kind),
        }
    }
}

#[derive(Clone, Default)]
pub struct ReactionRegistry {
    table: HashMap<(AiState, AiEventKind), HashMap<Option<SkillId>, Behavior>>,
}

impl ReactionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a reaction; `skill` of `None` reacts to any attacker skill
    pub fn register(
        &mut self,
        state: AiState,
        kind: AiEventKind,
        skill: Option<SkillId>,
        behavior: Behavior,
    ) {
        self.table
            .entry((state, kind))
            .or_default()
            .insert(skill, behavior);
    }

    /// Find the reaction for a hit
    ///
    /// Only when nothing at all is registered for the hit's kind is the
    /// fallback kind consulted. Within a kind a reaction to the attacker's
    /// exact skill beats a reaction to any skill.
    pub fn lookup(
        &self,
        state: AiState,
        class: HitClass,
        attacker_skill: SkillId,
    ) -> Option<(ReactionKey, Behavior)> {
        let (kind, reactions) = [class.kind, class.fallback]
            .into_iter()
            .flatten()
            .find_map(|kind| self.table.get(&(state, kind)).map(|r| (kind, r)))?;

        [Some(attacker_skill), None].into_iter().find_map(|skill| {
            reactions
                .get(&skill)
                .map(|behavior| (ReactionKey { kind, skill }, behavior.clone()))
        })
    }

    pub fn len(&self) -> usize {
        self.table.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for ReactionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReactionRegistry")
            .field("reactions", &self.len())
            .finish()
    }
}
