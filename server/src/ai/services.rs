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

//! Collaborators handed to every AI instance

use crate::ecs::events::EventBus;
use crate::ecs::systems::{MovementSystem, Region, SkillManager};
use std::sync::Arc;

/// Capability bundle threaded through the engine instead of global lookups
#[derive(Clone)]
pub struct AiServices {
    pub region: Arc<dyn Region>,
    pub skills: Arc<SkillManager>,
    pub events: EventBus,
    pub movement: MovementSystem,
}

impl AiServices {
    pub fn new(region: Arc<dyn Region>, skills: Arc<SkillManager>, events: EventBus) -> Self {
        Self {
            region,
            skills,
            movement: MovementSystem::new(events.clone()),
            events,
        }
    }
}
