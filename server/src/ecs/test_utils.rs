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

//! Test utilities for ECS testing

use crate::ai::AiState;
use crate::ecs::components::{
    Combatant, CreatureFlags, Disposition, Name, Player, Race, Skills, SpawnPoint, Speed,
    StatusEffects, Transform,
};
use crate::ecs::{EcsEntity, GameWorld};
use fauna_common::Position;

/// Race of creatures spawned by [`spawn_test_creature`]
pub const TEST_CREATURE_RACE: u32 = 50001;

/// Race of players spawned by [`spawn_test_player`]
pub const TEST_PLAYER_RACE: u32 = 10001;

/// Create a test world
pub fn create_test_world() -> GameWorld {
    GameWorld::new()
}

/// Spawn a rat facing east with everything an AI drives
pub fn spawn_test_creature(world: &mut GameWorld, position: Position) -> EcsEntity {
    world.spawn((
        Name::new("Test Rat"),
        Transform::new(position, 0),
        SpawnPoint::new(position),
        Speed::default(),
        Combatant::new(),
        CreatureFlags::new(),
        StatusEffects::new(),
        Skills::new(),
        Race::new(TEST_CREATURE_RACE, "/rat/"),
        Disposition::new(AiState::Idle),
    ))
}

/// Spawn a connected human player
pub fn spawn_test_player(world: &mut GameWorld, position: Position) -> EcsEntity {
    world.spawn((
        Name::new("Test Player"),
        Transform::new(position, 0),
        Player::new(),
        Race::new(TEST_PLAYER_RACE, "/pc/human/"),
        CreatureFlags::new(),
        StatusEffects::new(),
        Combatant::new(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_world() {
        let world = create_test_world();
        assert_eq!(world.len(), 0);
    }

    #[test]
    fn test_spawn_creature() {
        let mut world = create_test_world();
        let entity = spawn_test_creature(&mut world, Position::new(10, 20));

        assert_eq!(
            world.get::<&Transform>(entity).unwrap().position,
            Position::new(10, 20)
        );
        assert!(world.get::<&Race>(entity).unwrap().has_tag("/rat/"));
        assert!(world.get::<&Player>(entity).is_err());
    }

    #[test]
    fn test_spawn_player() {
        let mut world = create_test_world();
        let entity = spawn_test_player(&mut world, Position::new(0, 0));

        assert!(world.get::<&Player>(entity).unwrap().connected);
        assert!(world.get::<&Race>(entity).unwrap().has_tag("/pc/"));
    }
}
