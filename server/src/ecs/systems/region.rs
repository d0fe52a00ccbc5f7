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

//! Region index: spatial queries and obstruction checks
//!
//! The behavior engine only talks to the [`Region`] trait. [`WorldRegion`] is
//! the in-process implementation that scans the ECS world and tests movement
//! lines against static wall segments.

use crate::ai::AiState;
use crate::ecs::components::{
    Combatant, CreatureFlag, CreatureFlags, Disposition, Player, Race, StatusEffectType,
    StatusEffects, Transform,
};
use crate::ecs::{EcsEntity, GameWorld};
use fauna_common::Position;
use hecs::Entity;
use serde::{Deserialize, Serialize};

/// Spatial queries the behavior engine relies on
///
/// Implementations are shared by every AI instance and must tolerate
/// concurrent callers.
pub trait Region: Send + Sync {
    /// Creatures other than `viewer` that are visible within `radius` of it
    fn visible_creatures_in_range(
        &self,
        world: &GameWorld,
        viewer: EcsEntity,
        radius: i32,
    ) -> Vec<EcsEntity>;

    /// Connected players close enough to observe `position`
    fn players_in_range(&self, world: &GameWorld, position: Position) -> Vec<EcsEntity>;

    /// Number of creatures of race `race_id` currently aggroing `target`
    fn count_aggro(&self, world: &GameWorld, target: EcsEntity, race_id: u32) -> usize;

    /// First obstruction on the line from `from` to `to`
    fn find_collision(&self, from: Position, to: Position) -> Option<Position>;

    /// Whether anything obstructs the line from `from` to `to`
    fn any_collision(&self, from: Position, to: Position) -> bool {
        self.find_collision(from, to).is_some()
    }
}

/// Static obstruction between two points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wall {
    pub from: Position,
    pub to: Position,
}

impl Wall {
    pub fn new(from: Position, to: Position) -> Self {
        Self { from, to }
    }

    /// Fraction along `a -> b` where the line crosses this wall
    fn crossing(&self, a: Position, b: Position) -> Option<f64> {
        let (px, py) = (a.x as f64, a.y as f64);
        let (rx, ry) = ((b.x - a.x) as f64, (b.y - a.y) as f64);
        let (qx, qy) = (self.from.x as f64, self.from.y as f64);
        let (sx, sy) = ((self.to.x - self.from.x) as f64, (self.to.y - self.from.y) as f64);

        let denominator = rx * sy - ry * sx;
        if denominator.abs() < f64::EPSILON {
            return None;
        }

        let t = ((qx - px) * sy - (qy - py) * sx) / denominator;
        let u = ((qx - px) * ry - (qy - py) * rx) / denominator;

        ((0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u)).then_some(t)
    }
}

/// Region index backed by a scan of the ECS world
#[derive(Debug, Clone)]
pub struct WorldRegion {
    walls: Vec<Wall>,
    player_range: i32,
}

impl WorldRegion {
    /// Create a region where players observe creatures within `player_range`
    pub fn new(player_range: i32) -> Self {
        Self {
            walls: Vec::new(),
            player_range,
        }
    }

    pub fn with_walls(mut self, walls: impl IntoIterator<Item = Wall>) -> Self {
        self.walls.extend(walls);
        self
    }

    pub fn add_wall(&mut self, wall: Wall) {
        self.walls.push(wall);
    }

    pub fn walls(&self) -> &[Wall] {
        &self.walls
    }
}

impl Default for WorldRegion {
    fn default() -> Self {
        Self::new(3000)
    }
}

impl Region for WorldRegion {
    fn visible_creatures_in_range(
        &self,
        world: &GameWorld,
        viewer: EcsEntity,
        radius: i32,
    ) -> Vec<EcsEntity> {
        let Ok(origin) = world.get::<&Transform>(viewer).map(|t| t.position) else {
            return Vec::new();
        };

        world
            .query::<(Entity, &Transform, Option<&StatusEffects>)>()
            .iter()
            .filter(|(entity, transform, effects)| {
                *entity != viewer
                    && origin.in_range(transform.position, radius)
                    && !effects.is_some_and(|e| e.has(StatusEffectType::Invisible))
            })
            .map(|(entity, _, _)| entity)
            .collect()
    }

    fn players_in_range(&self, world: &GameWorld, position: Position) -> Vec<EcsEntity> {
        world
            .query::<(Entity, &Transform, &Player)>()
            .iter()
            .filter(|(_, transform, player)| {
                player.connected && position.in_range(transform.position, self.player_range)
            })
            .map(|(entity, _, _)| entity)
            .collect()
    }

    fn count_aggro(&self, world: &GameWorld, target: EcsEntity, race_id: u32) -> usize {
        world
            .query::<(&Race, &Combatant, &Disposition, Option<&CreatureFlags>)>()
            .iter()
            .filter(|(race, combatant, disposition, flags)| {
                race.id == race_id
                    && combatant.target == Some(target)
                    && disposition.state == AiState::Aggro
                    && !flags.is_some_and(|f| f.has(CreatureFlag::Dead))
            })
            .count()
    }

    fn find_collision(&self, from: Position, to: Position) -> Option<Position> {
        if from == to {
            return None;
        }

        self.walls
            .iter()
            .filter_map(|wall| wall.crossing(from, to))
            .min_by(|a, b| a.total_cmp(b))
            .map(|t| {
                Position::new(
                    (from.x as f64 + (to.x - from.x) as f64 * t).round() as i32,
                    (from.y as f64 + (to.y - from.y) as f64 * t).round() as i32,
                )
            })
    }
}
