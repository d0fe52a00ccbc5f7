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

//! Disposition states and aggro limits

use serde::{Deserialize, Serialize};
use std::fmt;

/// Engagement of a creature toward its current target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AiState {
    /// No target
    #[default]
    Idle,
    /// A target was noticed, escalation timer running
    Aware,
    /// Battle ready, waiting for an aggro trigger
    Alert,
    /// Actively hostile
    Aggro,
    /// Non-hostile interest in the target
    Love,
}

impl AiState {
    pub fn label(&self) -> &'static str {
        match self {
            AiState::Idle => "idle",
            AiState::Aware => "aware",
            AiState::Alert => "alert",
            AiState::Aggro => "aggro",
            AiState::Love => "love",
        }
    }

    /// Whether a target is held in this state
    pub fn has_target(&self) -> bool {
        !matches!(self, AiState::Idle)
    }
}

impl fmt::Display for AiState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// How many creatures of one race may aggro the same target at once
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AggroLimit {
    #[default]
    One,
    Two,
    Three,
    Unlimited,
}

impl AggroLimit {
    pub fn count(&self) -> usize {
        match self {
            AggroLimit::One => 1,
            AggroLimit::Two => 2,
            AggroLimit::Three => 3,
            AggroLimit::Unlimited => usize::MAX,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aggro_limit_counts() {
        assert_eq!(AggroLimit::default().count(), 1);
        assert_eq!(AggroLimit::Three.count(), 3);
        assert_eq!(AggroLimit::Unlimited.count(), usize::MAX);
    }

    #[test]
    fn test_state_labels() {
        assert_eq!(AiState::Aggro.to_string(), "aggro");
        assert!(!AiState::Idle.has_target());
        assert!(AiState::Love.has_target());
    }
}
