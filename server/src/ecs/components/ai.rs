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

//! AI components

use crate::ai::AiState;
use serde::{Deserialize, Serialize};

/// Disposition of a creature's AI toward its current target
///
/// Mirrors the AI instance's state so world queries, such as counting how many
/// creatures are aggroing a target, never need to lock an AI instance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Disposition {
    pub state: AiState,
}

impl Disposition {
    pub fn new(state: AiState) -> Self {
        Self { state }
    }
}
