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

//! Fauna Common Types
//!
//! Plain data shared between the behavior engine and its world collaborators:
//! - Planar geometry (positions, facing, cones)
//! - Skill identifiers, skill states and combat results
//! - Outbound notification vocabulary

pub mod geometry;
pub mod notify;
pub mod skill;

pub use geometry::Position;
pub use notify::{SharpMindStatus, TargetMode, WeaponSet};
pub use skill::{CombatSkillResult, SkillId, SkillState, TargetOptions};
