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

use crate::ecs::EcsEntity;
use crate::ecs::events::EventBus;
use std::sync::Arc;
use tokio::sync::RwLock;

/// World context shared by the simulation loop and every AI driver
///
/// The context wraps two core components:
/// - **ECS World**: hecs::World for entity-component storage
/// - **Event Bus**: queue for combat events and outbound notifications
///
/// Simple entity operations lock internally. For anything touching several
/// entities take the lock once through [`WorldContext::entities`]:
///
/// ```ignore
/// let world = context.entities().read().await;
/// for (entity, transform) in world.query::<(Entity, &Transform)>().iter() {
///     // Process entities...
/// }
/// ```
pub struct WorldContext {
    entities: Arc<RwLock<hecs::World>>,
    events: EventBus,
}

impl WorldContext {
    /// Create an empty world context
    pub fn new() -> Self {
        Self::with_world(hecs::World::new())
    }

    /// Create a context around an existing world
    pub fn with_world(world: hecs::World) -> Self {
        Self {
            entities: Arc::new(RwLock::new(world)),
            events: EventBus::new(),
        }
    }

    /// Get the ECS world - use only when you need manual lock management
    pub fn entities(&self) -> &Arc<RwLock<hecs::World>> {
        &self.entities
    }

    /// Get the event bus
    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Spawn a new entity with the given components
    pub async fn spawn(&self, bundle: impl hecs::DynamicBundle) -> EcsEntity {
        let mut world = self.entities.write().await;
        world.spawn(bundle)
    }

    /// Despawn an entity, removing it and all its components
    pub async fn despawn(&self, entity: EcsEntity) -> Result<(), hecs::NoSuchEntity> {
        let mut world = self.entities.write().await;
        world.despawn(entity)
    }

    /// Add a single component to an entity
    pub async fn insert_one(
        &self,
        entity: EcsEntity,
        component: impl hecs::Component,
    ) -> Result<(), hecs::NoSuchEntity> {
        let mut world = self.entities.write().await;
        world.insert_one(entity, component)
    }

    /// Check if an entity exists
    pub async fn contains(&self, entity: EcsEntity) -> bool {
        let world = self.entities.read().await;
        world.contains(entity)
    }

    /// Number of entities in the world
    pub async fn len(&self) -> u32 {
        let world = self.entities.read().await;
        world.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Default for WorldContext {
    fn default() -> Self {
        Self::new()
    }
}
