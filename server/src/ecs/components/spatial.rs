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

//! Spatial components for positioning and movement

use fauna_common::Position;
use fauna_common::geometry::byte_to_radian;
use serde::{Deserialize, Serialize};

/// Position and facing of a creature
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Position,
    /// Facing as a byte, a full turn in 256 steps
    pub direction: u8,
}

impl Transform {
    pub fn new(position: Position, direction: u8) -> Self {
        Self {
            position,
            direction,
        }
    }

    /// Facing in radians
    pub fn facing(&self) -> f64 {
        byte_to_radian(self.direction)
    }
}

/// Where an NPC was spawned; wandering is kept close to it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpawnPoint {
    pub position: Position,
}

impl SpawnPoint {
    pub fn new(position: Position) -> Self {
        Self { position }
    }
}

/// Movement speeds in units per second
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Speed {
    pub walk: f64,
    pub run: f64,
}

impl Speed {
    pub fn new(walk: f64, run: f64) -> Self {
        Self { walk, run }
    }

    pub fn get(&self, walking: bool) -> f64 {
        if walking { self.walk } else { self.run }
    }
}

impl Default for Speed {
    fn default() -> Self {
        Self::new(200.0, 400.0)
    }
}

/// A move in flight, interpolated by the movement system
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Motion {
    pub source: Position,
    pub destination: Position,
    pub walking: bool,
    pub duration_ms: f64,
    pub elapsed_ms: f64,
}

impl Motion {
    pub fn new(source: Position, destination: Position, walking: bool, duration_ms: f64) -> Self {
        Self {
            source,
            destination,
            walking,
            duration_ms,
            elapsed_ms: 0.0,
        }
    }

    /// Whether the destination has been reached
    pub fn is_finished(&self) -> bool {
        self.elapsed_ms >= self.duration_ms
    }

    /// Interpolated position at the current elapsed time
    pub fn current(&self) -> Position {
        if self.is_finished() || self.duration_ms <= 0.0 {
            return self.destination;
        }
        let t = self.elapsed_ms / self.duration_ms;
        let x = self.source.x as f64 + (self.destination.x - self.source.x) as f64 * t;
        let y = self.source.y as f64 + (self.destination.y - self.source.y) as f64 * t;
        Position::new(x.round() as i32, y.round() as i32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_motion_interpolation() {
        let mut motion = Motion::new(Position::new(0, 0), Position::new(1000, 0), true, 5000.0);
        assert_eq!(motion.current(), Position::new(0, 0));

        motion.elapsed_ms = 2500.0;
        assert_eq!(motion.current(), Position::new(500, 0));

        motion.elapsed_ms = 6000.0;
        assert!(motion.is_finished());
        assert_eq!(motion.current(), Position::new(1000, 0));
    }

    #[test]
    fn test_zero_length_motion() {
        let motion = Motion::new(Position::new(10, 10), Position::new(10, 10), false, 0.0);
        assert!(motion.is_finished());
        assert_eq!(motion.current(), Position::new(10, 10));
    }

    #[test]
    fn test_speed() {
        let speed = Speed::default();
        assert_eq!(speed.get(true), 200.0);
        assert_eq!(speed.get(false), 400.0);
    }
}
