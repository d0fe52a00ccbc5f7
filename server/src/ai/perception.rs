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

//! Perception parameters and race tag sets

use crate::ai::state::AggroLimit;
use crate::ecs::components::Race;
use fauna_common::Position;
use fauna_common::geometry::degree_to_radian;
use std::collections::BTreeSet;

/// Simulated milliseconds in a day
const DAY_MS: f64 = 24.0 * 60.0 * 60.0 * 1000.0;

/// Race tags a creature reacts to
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagSet {
    tags: BTreeSet<String>,
}

impl TagSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tag; surrounding spaces and slashes are ignored
    pub fn insert(&mut self, tag: &str) -> bool {
        let key = tag.trim_matches(|c| c == ' ' || c == '/');
        if key.is_empty() {
            return false;
        }
        self.tags.insert(key.to_string())
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.tags
            .contains(tag.trim_matches(|c| c == ' ' || c == '/'))
    }

    /// Check whether any registered tag matches the race
    pub fn matches(&self, race: &Race) -> bool {
        self.tags.iter().any(|tag| race.has_tag(tag))
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }
}

/// What a creature notices and how fast it escalates
#[derive(Debug, Clone)]
pub struct Perception {
    /// Radius in which creatures are heard regardless of facing
    pub aggro_radius: i32,
    /// Distance at which a held target is given up
    pub aggro_max_radius: i32,
    pub visual_radius: i32,
    /// Total opening of the visual cone in radians
    pub visual_angle: f64,
    pub alert_delay_ms: f64,
    pub aggro_delay_ms: f64,
    pub hates_battle_stance: bool,
    pub hate_battle_stance_delay_ms: f64,
    pub hate_over_time_ms: f64,
    /// How far a wandering creature may stray from its spawn point
    pub max_distance_from_spawn: i32,
    pub aggro_limit: AggroLimit,
    pub hated: TagSet,
    pub loved: TagSet,
    pub doubted: TagSet,
}

impl Default for Perception {
    fn default() -> Self {
        Self {
            aggro_radius: 500,
            aggro_max_radius: 3000,
            visual_radius: 900,
            visual_angle: degree_to_radian(90.0),
            alert_delay_ms: 6000.0,
            aggro_delay_ms: 500.0,
            hates_battle_stance: false,
            hate_battle_stance_delay_ms: 3000.0,
            hate_over_time_ms: 365.0 * DAY_MS,
            max_distance_from_spawn: 3000,
            aggro_limit: AggroLimit::One,
            hated: TagSet::new(),
            loved: TagSet::new(),
            doubted: TagSet::new(),
        }
    }
}

impl Perception {
    /// Set the visual cone; the angle is given in degrees and clamped to 0..=160
    pub fn set_visual_field(&mut self, radius: i32, angle_degrees: f64) {
        self.visual_radius = radius;
        self.visual_angle = degree_to_radian(angle_degrees.clamp(0.0, 160.0));
    }

    /// Radius of everything this creature can notice
    pub fn max_radius(&self) -> i32 {
        self.aggro_radius.max(self.visual_radius)
    }

    pub fn can_hear(&self, origin: Position, other: Position) -> bool {
        origin.in_range(other, self.aggro_radius)
    }

    pub fn can_see(&self, origin: Position, facing: f64, other: Position) -> bool {
        other.in_cone(origin, facing, self.visual_radius, self.visual_angle)
    }

    pub fn can_perceive(&self, origin: Position, facing: f64, other: Position) -> bool {
        self.can_hear(origin, other) || self.can_see(origin, facing, other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_keys_are_trimmed() {
        let mut tags = TagSet::new();
        assert!(tags.insert(" /rat/ "));
        assert!(!tags.insert("rat"));
        assert!(!tags.insert(" / "));
        assert!(tags.contains("/rat/"));
        assert_eq!(tags.len(), 1);
    }

    #[test]
    fn test_tags_match_races() {
        let mut tags = TagSet::new();
        tags.insert("/pc/");
        tags.insert("/pet/");

        assert!(tags.matches(&Race::new(10001, "/pc/human/")));
        assert!(tags.matches(&Race::new(1, "/animal/pet/dog/")));
        assert!(!tags.matches(&Race::new(2, "/rat/")));
        assert!(!TagSet::new().matches(&Race::new(10001, "/pc/")));
    }

    #[test]
    fn test_visual_field_is_clamped() {
        let mut perception = Perception::default();
        perception.set_visual_field(1200, 300.0);
        assert_eq!(perception.visual_radius, 1200);
        assert!((perception.visual_angle - degree_to_radian(160.0)).abs() < 1e-9);

        perception.set_visual_field(800, -10.0);
        assert_eq!(perception.visual_angle, 0.0);
        assert_eq!(perception.max_radius(), 800);
    }

    #[test]
    fn test_hearing_ignores_facing() {
        let perception = Perception::default();
        let origin = Position::new(0, 0);
        let behind = Position::new(-400, 0);
        let ahead_far = Position::new(800, 0);

        assert!(perception.can_perceive(origin, 0.0, behind));
        assert!(!perception.can_see(origin, 0.0, Position::new(-800, 0)));
        assert!(perception.can_see(origin, 0.0, ahead_far));
        assert!(!perception.can_perceive(origin, std::f64::consts::PI, ahead_far));
    }
}
