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

//! ECS Systems
//!
//! This module contains the world collaborators the behavior engine drives:
//! movement, timed conditions, the region index and the combat skill subsystem.

mod conditions;
mod movement;
pub mod region;
pub mod skills;

// Re-export all systems
pub use conditions::*;
pub use movement::*;
pub use region::{Region, Wall, WorldRegion};
pub use skills::{SkillError, SkillHandler, SkillManager, SkillUse};
