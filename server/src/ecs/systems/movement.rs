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

//! Movement system for creature movement
//!
//! Movement is a duration gated transition between two positions. Starting a
//! move computes its duration from the creature's speed and attaches a
//! [`Motion`]; each update interpolates the position until it arrives.

use crate::ecs::components::{Motion, Speed, Transform};
use crate::ecs::events::{EventBus, GameEvent};
use crate::ecs::{EcsEntity, GameWorld};
use fauna_common::Position;
use fauna_common::geometry::radian_to_byte;
use hecs::Entity;

#[derive(Clone)]
pub struct MovementSystem {
    event_bus: EventBus,
}

impl MovementSystem {
    /// Create a new movement system
    pub fn new(event_bus: EventBus) -> Self {
        Self { event_bus }
    }

    /// Send a creature toward `destination`, returning how long the move takes in milliseconds
    pub fn start(
        &self,
        world: &mut GameWorld,
        entity: EcsEntity,
        destination: Position,
        walking: bool,
    ) -> Result<f64, hecs::ComponentError> {
        let speed = world
            .get::<&Speed>(entity)
            .map(|speed| *speed)
            .unwrap_or_default()
            .get(walking);

        let from = {
            let mut transform = world.get::<&mut Transform>(entity)?;
            let from = transform.position;
            if from != destination {
                transform.direction = radian_to_byte(from.angle_to(destination));
            }
            from
        };

        let duration = if speed > 0.0 {
            from.distance(destination) as f64 / speed * 1000.0
        } else {
            0.0
        };

        world
            .insert_one(entity, Motion::new(from, destination, walking, duration))
            .map_err(|_| hecs::ComponentError::NoSuchEntity)?;

        self.event_bus.publish(GameEvent::MoveStarted {
            entity,
            from,
            to: destination,
            walking,
        });

        Ok(duration)
    }

    /// Stop a creature where it currently stands
    pub fn stop(&self, world: &mut GameWorld, entity: EcsEntity) {
        if world.remove_one::<Motion>(entity).is_ok() {
            tracing::trace!("Stopped motion of {:?}", entity);
        }
    }

    /// Advance every motion in flight by `delta_ms`
    pub fn update(&mut self, world: &mut GameWorld, delta_ms: f64) {
        let mut arrived = Vec::new();

        for (entity, transform, motion) in
            world.query_mut::<(Entity, &mut Transform, &mut Motion)>()
        {
            motion.elapsed_ms += delta_ms;
            transform.position = motion.current();
            if motion.is_finished() {
                arrived.push(entity);
            }
        }

        for entity in arrived {
            let _ = world.remove_one::<Motion>(entity);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_sets_duration_and_facing() {
        let mut world = GameWorld::new();
        let bus = EventBus::new();
        let movement = MovementSystem::new(bus.clone());
        let entity = world.spawn((Transform::new(Position::new(0, 0), 0), Speed::new(100.0, 500.0)));

        let duration = movement
            .start(&mut world, entity, Position::new(0, 1000), true)
            .unwrap();

        assert_eq!(duration, 10_000.0);
        assert_eq!(world.get::<&Transform>(entity).unwrap().direction, 64);
        assert!(world.get::<&Motion>(entity).is_ok());
        assert_eq!(bus.queue_len(), 1);
    }

    #[test]
    fn test_update_moves_and_arrives() {
        let mut world = GameWorld::new();
        let mut movement = MovementSystem::new(EventBus::new());
        let entity = world.spawn((Transform::new(Position::new(0, 0), 0),));

        let duration = movement
            .start(&mut world, entity, Position::new(400, 0), false)
            .unwrap();
        assert_eq!(duration, 1000.0);

        movement.update(&mut world, 500.0);
        assert_eq!(world.get::<&Transform>(entity).unwrap().position, Position::new(200, 0));

        movement.update(&mut world, 500.0);
        assert_eq!(world.get::<&Transform>(entity).unwrap().position, Position::new(400, 0));
        assert!(world.get::<&Motion>(entity).is_err());
    }

    #[test]
    fn test_zero_distance_move() {
        let mut world = GameWorld::new();
        let movement = MovementSystem::new(EventBus::new());
        let entity = world.spawn((Transform::new(Position::new(5, 5), 12),));

        let duration = movement
            .start(&mut world, entity, Position::new(5, 5), true)
            .unwrap();

        assert_eq!(duration, 0.0);
        assert_eq!(world.get::<&Transform>(entity).unwrap().direction, 12);
    }

    #[test]
    fn test_start_without_transform_fails() {
        let mut world = GameWorld::new();
        let movement = MovementSystem::new(EventBus::new());
        let entity = world.spawn(());

        assert!(movement.start(&mut world, entity, Position::new(1, 1), true).is_err());
    }
}
