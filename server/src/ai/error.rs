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

//! AI error types

use crate::ecs::EcsEntity;
use crate::ecs::systems::SkillError;
use thiserror::Error;

/// Faults raised while running a creature's behavior
///
/// None of these stop an AI instance. They abandon the current scheduling
/// pass and are logged with the archetype that raised them.
#[derive(Debug, Error)]
pub enum AiError {
    #[error("creature {0:?} is no longer in the world")]
    MissingCreature(EcsEntity),

    #[error("creature has no target")]
    NoTarget,

    #[error("unknown archetype '{0}'")]
    UnknownArchetype(String),

    #[error(transparent)]
    Component(#[from] hecs::ComponentError),

    #[error(transparent)]
    Skill(#[from] SkillError),
}

impl From<hecs::NoSuchEntity> for AiError {
    fn from(_: hecs::NoSuchEntity) -> Self {
        AiError::Component(hecs::ComponentError::NoSuchEntity)
    }
}

/// Result type for AI operations
pub type AiResult<T> = Result<T, AiError>;
