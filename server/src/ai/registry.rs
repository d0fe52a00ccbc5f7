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

//! Archetype registry
//!
//! Maps archetype names to the functions that author them. Archetypes are
//! registered explicitly at startup; nothing is discovered at runtime.

use crate::ai::error::{AiError, AiResult};
use crate::ai::script::AiSetup;
use crate::ai::scripts;
use crate::config::AiConfig;
use std::collections::BTreeMap;

/// Fills in an [`AiSetup`] for one kind of creature
pub type Archetype = fn(&mut AiSetup);

#[derive(Debug, Clone, Default)]
pub struct ArchetypeRegistry {
    archetypes: BTreeMap<String, Archetype>,
}

impl ArchetypeRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding every archetype shipped with the engine
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry.register("ratman", scripts::ratman);
        registry.register("catsith_magician", scripts::catsith_magician);
        registry
    }

    /// Register an archetype, replacing any previous one of the same name
    pub fn register(&mut self, name: impl Into<String>, archetype: Archetype) {
        let name = name.into();
        if self.archetypes.insert(name.clone(), archetype).is_some() {
            tracing::warn!("Archetype '{}' registered twice, keeping the latest", name);
        }
    }

    pub fn get(&self, name: &str) -> Option<Archetype> {
        self.archetypes.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.archetypes.contains_key(name)
    }

    /// Registered names in sorted order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.archetypes.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.archetypes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.archetypes.is_empty()
    }

    /// Author a fresh setup for `name`
    ///
    /// The setup starts from the configured idle heartbeat so archetypes only
    /// need to set one when they want to differ.
    pub fn build(&self, name: &str, config: &AiConfig) -> AiResult<AiSetup> {
        let archetype = self
            .get(name)
            .ok_or_else(|| AiError::UnknownArchetype(name.to_string()))?;

        let mut setup = AiSetup::new();
        setup.set_heartbeat(config.idle_heartbeat_ms);
        archetype(&mut setup);
        Ok(setup)
    }
}
