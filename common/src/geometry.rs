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

//! Planar geometry for creature positions and facing

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f64::consts::{PI, TAU};
use std::fmt;

/// A point on a region's ground plane
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    /// Create a new position
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Straight line distance to another position
    pub fn distance(&self, other: Position) -> i32 {
        let dx = (other.x - self.x) as f64;
        let dy = (other.y - self.y) as f64;
        (dx * dx + dy * dy).sqrt() as i32
    }

    /// Check whether another position lies within `range` of this one
    pub fn in_range(&self, other: Position, range: i32) -> bool {
        let dx = (other.x - self.x) as i64;
        let dy = (other.y - self.y) as i64;
        let range = range as i64;
        dx * dx + dy * dy <= range * range
    }

    /// Angle in radians of the line from this position to another
    pub fn angle_to(&self, other: Position) -> f64 {
        ((other.y - self.y) as f64).atan2((other.x - self.x) as f64)
    }

    /// Position on the line from this position through `other`.
    ///
    /// The result lies `distance` units past `other`, away from this position.
    /// A negative distance yields a point between the two, measured from `other`.
    pub fn get_relative(&self, other: Position, distance: i32) -> Position {
        if *self == other {
            return *self;
        }

        let dx = (other.x - self.x) as f64;
        let dy = (other.y - self.y) as f64;
        let length = (dx * dx + dy * dy).sqrt();
        let scale = distance as f64 / length;

        Position::new(
            (other.x as f64 + scale * dx).round() as i32,
            (other.y as f64 + scale * dy).round() as i32,
        )
    }

    /// Random position in the ring between `min` and `max` units around this one
    pub fn random_in_range<R: Rng + ?Sized>(&self, min: i32, max: i32, rng: &mut R) -> Position {
        let max = max.max(min);
        let distance = if min == max {
            min
        } else {
            rng.random_range(min..=max)
        };
        let angle = rng.random_range(0.0..TAU);

        self.offset(angle, distance as f64)
    }

    /// Position `distance` units away along `angle`
    pub fn offset(&self, angle: f64, distance: f64) -> Position {
        Position::new(
            self.x + (angle.cos() * distance).round() as i32,
            self.y + (angle.sin() * distance).round() as i32,
        )
    }

    /// Check whether this position lies inside a cone.
    ///
    /// The cone starts at `tip`, points along `direction` (radians), reaches
    /// `radius` units and opens `angle` radians in total.
    pub fn in_cone(&self, tip: Position, direction: f64, radius: i32, angle: f64) -> bool {
        if !tip.in_range(*self, radius) {
            return false;
        }
        if *self == tip {
            return true;
        }

        normalize_radian(tip.angle_to(*self) - direction).abs() <= angle / 2.0
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Wrap an angle into `(-PI, PI]`
pub fn normalize_radian(angle: f64) -> f64 {
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    if wrapped <= -PI { wrapped + TAU } else { wrapped }
}

/// Convert a facing byte (a full turn in 256 steps) to radians
pub fn byte_to_radian(direction: u8) -> f64 {
    direction as f64 * TAU / 256.0
}

/// Convert radians to a facing byte
pub fn radian_to_byte(angle: f64) -> u8 {
    let turns = angle.rem_euclid(TAU) / TAU;
    ((turns * 256.0).round() as u32 % 256) as u8
}

/// Convert degrees to radians
pub fn degree_to_radian(degrees: f64) -> f64 {
    degrees * PI / 180.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_distance_and_range() {
        let a = Position::new(0, 0);
        let b = Position::new(300, 400);

        assert_eq!(a.distance(b), 500);
        assert!(a.in_range(b, 500));
        assert!(!a.in_range(b, 499));
    }

    #[test]
    fn test_get_relative_negative_is_between() {
        let from = Position::new(0, 0);
        let wall = Position::new(1000, 0);

        assert_eq!(from.get_relative(wall, -100), Position::new(900, 0));
        assert_eq!(from.get_relative(wall, 100), Position::new(1100, 0));
        assert_eq!(from.get_relative(from, 100), from);
    }

    #[test]
    fn test_random_in_range_stays_in_ring() {
        let mut rng = StdRng::seed_from_u64(7);
        let center = Position::new(5000, 5000);

        for _ in 0..200 {
            let point = center.random_in_range(300, 600, &mut rng);
            let distance = center.distance(point);
            assert!((299..=601).contains(&distance), "distance {distance}");
        }
    }

    #[test]
    fn test_random_in_range_swapped_bounds() {
        let mut rng = StdRng::seed_from_u64(3);
        let center = Position::new(0, 0);
        let point = center.random_in_range(400, 100, &mut rng);

        assert!((399..=401).contains(&center.distance(point)));
    }

    #[test]
    fn test_in_cone() {
        let tip = Position::new(0, 0);
        let ahead = Position::new(500, 100);
        let behind = Position::new(-500, 0);
        let quarter = degree_to_radian(90.0);

        assert!(ahead.in_cone(tip, 0.0, 900, quarter));
        assert!(!behind.in_cone(tip, 0.0, 900, quarter));
        assert!(!ahead.in_cone(tip, 0.0, 400, quarter));
        assert!(behind.in_cone(tip, PI, 900, quarter));
    }

    #[test]
    fn test_facing_conversion() {
        assert_eq!(radian_to_byte(0.0), 0);
        assert_eq!(radian_to_byte(PI), 128);
        assert_eq!(radian_to_byte(-PI / 2.0), 192);
        assert!((byte_to_radian(64) - PI / 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_normalize_radian() {
        assert!((normalize_radian(3.0 * PI) - PI).abs() < 1e-9);
        assert!((normalize_radian(-PI / 2.0) + PI / 2.0).abs() < 1e-9);
    }
}
