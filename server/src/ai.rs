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

//! Creature behavior engine
//!
//! Each autonomous creature gets an [`AiInstance`]: a [`Brain`] that perceives
//! its surroundings and moves through the [`AiState`] machine, plus a driver
//! task calling it at a fixed heartbeat. Behaviors are authored per archetype
//! with a [`Script`] and run one [`Routine`] step at a time, so a routine that
//! waits or walks simply suspends until the next heartbeat.
//!
//! Combat events reach the brain through the [`AiManager`], which can swap
//! the running behavior for a registered reaction.

pub mod actor;
pub mod brain;
pub mod branch;
pub mod cursor;
pub mod error;
pub mod events;
pub mod instance;
pub mod manager;
pub mod perception;
pub mod reactions;
pub mod registry;
pub mod routines;
pub mod script;
pub mod scripts;
pub mod services;
pub mod state;

#[cfg(test)]
pub(crate) mod test_support;

pub use actor::{Actor, Mind};
pub use brain::{Brain, Pulse};
pub use branch::Dice;
pub use cursor::{Routine, Step};
pub use error::{AiError, AiResult};
pub use events::{AiEvent, HitClass};
pub use instance::{AiInstance, Beat};
pub use manager::AiManager;
pub use perception::Perception;
pub use reactions::{AiEventKind, Behavior, ReactionKey, ReactionRegistry};
pub use registry::{Archetype, ArchetypeRegistry};
pub use script::{AiSetup, Script};
pub use services::AiServices;
pub use state::{AggroLimit, AiState};
