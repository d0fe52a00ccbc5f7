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

//! Movement primitives

use crate::ai::actor::Actor;
use crate::ai::cursor::{Routine, Step};
use crate::ai::error::{AiError, AiResult};
use crate::ai::routines::StunGate;
use crate::ecs::components::SpawnPoint;
use fauna_common::Position;
use std::f64::consts::FRAC_PI_4;

/// Slack kept when closing in on or backing off from a target
const DISTANCE_BUFFER: i32 = 50;

/// Move to a position and wait until the move is over
///
/// Always suspends at least once, even when there is nowhere to go.
#[derive(Debug)]
pub struct MoveTo {
    destination: Position,
    walking: bool,
    gate: StunGate,
    until: Option<f64>,
}

impl MoveTo {
    pub fn new(destination: Position, walking: bool) -> Self {
        Self {
            destination,
            walking,
            gate: StunGate::default(),
            until: None,
        }
    }

    pub fn walk(destination: Position) -> Self {
        Self::new(destination, true)
    }

    pub fn run(destination: Position) -> Self {
        Self::new(destination, false)
    }
}

impl Routine for MoveTo {
    fn step(&mut self, actor: &mut Actor<'_>) -> AiResult<Step> {
        if self.gate.holds(actor) {
            return Ok(Step::Suspend);
        }

        match self.until {
            None => {
                let duration = actor.move_to(self.destination, self.walking)?;
                self.until = Some(actor.timestamp() + duration);
                Ok(Step::Suspend)
            }
            Some(until) if actor.timestamp() < until => Ok(Step::Suspend),
            Some(_) => Ok(Step::Done),
        }
    }
}

/// Stroll to a random point around the creature
pub struct Wander {
    min_distance: i32,
    max_distance: i32,
    walking: bool,
    gate: StunGate,
    moving: Option<MoveTo>,
}

impl Wander {
    pub fn new(min_distance: i32, max_distance: i32, walking: bool) -> Self {
        Self {
            min_distance,
            max_distance,
            walking,
            gate: StunGate::default(),
            moving: None,
        }
    }

    fn destination(&self, actor: &mut Actor<'_>) -> AiResult<Position> {
        let position = actor.position()?;
        let destination =
            position.random_in_range(self.min_distance, self.max_distance, actor.dice().rng());

        let spawn = actor
            .world()
            .get::<&SpawnPoint>(actor.entity())
            .map(|spawn| spawn.position);
        let max_from_spawn = actor.mind().perception.max_distance_from_spawn;

        match spawn {
            Ok(spawn) if destination.distance(spawn) > max_from_spawn => Ok(position
                .get_relative(spawn, (self.min_distance + self.max_distance) / 2)),
            _ => Ok(destination),
        }
    }
}

impl Default for Wander {
    fn default() -> Self {
        Self::new(100, 600, true)
    }
}

impl Routine for Wander {
    fn step(&mut self, actor: &mut Actor<'_>) -> AiResult<Step> {
        if self.moving.is_none() {
            if self.gate.holds(actor) {
                return Ok(Step::Suspend);
            }
            let destination = self.destination(actor)?;
            self.moving = Some(MoveTo::new(destination, self.walking));
        }

        match self.moving.as_mut() {
            Some(moving) => moving.step(actor),
            None => Ok(Step::Done),
        }
    }
}

/// Run circles around the target for a while
pub struct Circle {
    radius: i32,
    time_min: u32,
    time_max: u32,
    clockwise: bool,
    walking: bool,
    gate: StunGate,
    until: Option<f64>,
    laps: u32,
    moving: Option<MoveTo>,
}

impl Circle {
    pub fn new(radius: i32, time_min: u32, time_max: u32, clockwise: bool, walking: bool) -> Self {
        let time_min = time_min.max(500);
        Self {
            radius,
            time_min,
            time_max: time_max.max(time_min),
            clockwise,
            walking,
            gate: StunGate::default(),
            until: None,
            laps: 0,
            moving: None,
        }
    }
}

impl Routine for Circle {
    fn step(&mut self, actor: &mut Actor<'_>) -> AiResult<Step> {
        if self.gate.holds(actor) {
            return Ok(Step::Suspend);
        }

        let until = match self.until {
            Some(until) => until,
            None => {
                let duration = actor.dice().between(self.time_min, self.time_max);
                let until = actor.timestamp() + duration as f64;
                self.until = Some(until);
                until
            }
        };

        loop {
            if let Some(moving) = self.moving.as_mut() {
                match moving.step(actor)? {
                    Step::Suspend => return Ok(Step::Suspend),
                    Step::Done => {
                        self.moving = None;
                        self.laps += 1;
                    }
                }
            }

            if actor.timestamp() >= until && self.laps > 0 {
                return Ok(Step::Done);
            }

            let Some(center) = actor.target_position() else {
                return Ok(Step::Done);
            };
            let position = actor.position()?;

            let turn = if self.clockwise { -FRAC_PI_4 } else { FRAC_PI_4 };
            let angle = ((position.y - center.y) as f64).atan2((position.x - center.x) as f64);
            let angle = angle + turn;
            let point = Position::new(
                (center.x as f64 + angle.cos() * self.radius as f64) as i32,
                (center.y as f64 + angle.sin() * self.radius as f64) as i32,
            );

            self.moving = Some(MoveTo::new(point, self.walking));
        }
    }
}

/// Stay within `max_distance` of the target until the timeout runs out
#[derive(Debug)]
pub struct Follow {
    max_distance: i32,
    walking: bool,
    timeout: u32,
    gate: StunGate,
    until: Option<f64>,
}

impl Follow {
    pub fn new(max_distance: i32, walking: bool, timeout: u32) -> Self {
        Self {
            max_distance,
            walking,
            timeout,
            gate: StunGate::default(),
            until: None,
        }
    }
}

impl Routine for Follow {
    fn step(&mut self, actor: &mut Actor<'_>) -> AiResult<Step> {
        if self.gate.holds(actor) {
            return Ok(Step::Suspend);
        }

        let until = *self
            .until
            .get_or_insert(actor.timestamp() + self.timeout as f64);
        if actor.timestamp() >= until {
            return Ok(Step::Done);
        }

        let Some(target) = actor.target_position() else {
            return Ok(Step::Done);
        };

        let position = actor.position()?;
        if !position.in_range(target, self.max_distance) {
            let closer = position.get_relative(target, -self.max_distance + DISTANCE_BUFFER);
            actor.execute_once(MoveTo::new(closer, self.walking))?;
        }

        Ok(Step::Suspend)
    }
}

/// Stay at least `min_distance` away from the target until the timeout runs out
#[derive(Debug)]
pub struct KeepDistance {
    min_distance: i32,
    walking: bool,
    timeout: u32,
    gate: StunGate,
    until: Option<f64>,
}

impl KeepDistance {
    pub fn new(min_distance: i32, walking: bool, timeout: u32) -> Self {
        Self {
            min_distance,
            walking,
            timeout,
            gate: StunGate::default(),
            until: None,
        }
    }
}

impl Routine for KeepDistance {
    fn step(&mut self, actor: &mut Actor<'_>) -> AiResult<Step> {
        if self.gate.holds(actor) {
            return Ok(Step::Suspend);
        }

        let until = *self
            .until
            .get_or_insert(actor.timestamp() + self.timeout as f64);
        if actor.timestamp() >= until {
            return Ok(Step::Done);
        }

        let target = actor.target_position().ok_or(AiError::NoTarget)?;
        let position = actor.position()?;
        if position.in_range(target, self.min_distance) {
            let away = position.get_relative(target, -(self.min_distance + DISTANCE_BUFFER));
            actor.execute_once(MoveTo::new(away, self.walking))?;
        }

        Ok(Step::Suspend)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::test_support::Harness;
    use crate::ecs::components::{Motion, Transform};

    fn motion(harness: &Harness) -> Option<Motion> {
        harness
            .world
            .get::<&Motion>(harness.creature)
            .ok()
            .map(|motion| *motion)
    }

    #[test]
    fn test_move_to_zero_duration_suspends_once() {
        let mut harness = Harness::new();
        let mut move_to = MoveTo::walk(Position::new(0, 0));
        assert_eq!(harness.run(&mut move_to, 50.0, 10), 1);
    }

    #[test]
    fn test_move_to_waits_for_arrival() {
        let mut harness = Harness::new();
        // default walking speed covers 200 units per second
        let mut move_to = MoveTo::walk(Position::new(200, 0));
        assert_eq!(harness.run(&mut move_to, 100.0, 100), 10);

        let position = harness.world.get::<&Transform>(harness.creature).unwrap().position;
        assert_eq!(position, Position::new(200, 0));
    }

    #[test]
    fn test_wander_stays_near_spawn() {
        let mut harness = Harness::new();
        harness.mind.perception.max_distance_from_spawn = 500;
        harness
            .world
            .get::<&mut Transform>(harness.creature)
            .unwrap()
            .position = Position::new(1000, 0);

        let mut wander = Wander::new(100, 300, true);
        harness.with_actor(|actor| wander.step(actor)).unwrap();

        // strayed too far, so the walk heads back past the spawn point
        assert_eq!(motion(&harness).unwrap().destination, Position::new(-200, 0));
    }

    #[test]
    fn test_wander_picks_point_in_ring() {
        let mut harness = Harness::new();
        let mut wander = Wander::new(100, 300, true);
        harness.with_actor(|actor| wander.step(actor)).unwrap();

        let distance = motion(&harness).unwrap().destination.distance(Position::new(0, 0));
        assert!((99..=301).contains(&distance), "{distance}");
    }

    #[test]
    fn test_circle_without_target_is_done() {
        let mut harness = Harness::new();
        let mut circle = Circle::new(300, 1000, 2000, true, true);
        assert_eq!(harness.run(&mut circle, 50.0, 10), 0);
    }

    #[test]
    fn test_circle_moves_around_target() {
        let mut harness = Harness::new();
        let target = harness.spawn_player(Position::new(500, 0));
        harness.with_actor(|actor| actor.set_target(Some(target))).unwrap();

        let mut circle = Circle::new(500, 500, 500, false, true);
        let suspensions = harness.run(&mut circle, 100.0, 1000);
        assert!(suspensions >= 5);

        let position = harness.world.get::<&Transform>(harness.creature).unwrap().position;
        let distance = position.distance(Position::new(500, 0));
        assert!((480..=520).contains(&distance), "{distance}");
    }

    #[test]
    fn test_follow_closes_in() {
        let mut harness = Harness::new();
        let target = harness.spawn_player(Position::new(1000, 0));
        harness.with_actor(|actor| actor.set_target(Some(target))).unwrap();

        let mut follow = Follow::new(300, false, 1000);
        assert_eq!(
            harness.with_actor(|actor| follow.step(actor)).unwrap(),
            Step::Suspend
        );
        assert_eq!(motion(&harness).unwrap().destination, Position::new(750, 0));
    }

    #[test]
    fn test_follow_ends_when_target_leaves() {
        let mut harness = Harness::new();
        let mut follow = Follow::new(300, false, 1000);
        assert_eq!(harness.run(&mut follow, 50.0, 10), 0);
    }

    #[test]
    fn test_follow_times_out() {
        let mut harness = Harness::new();
        let target = harness.spawn_player(Position::new(100, 0));
        harness.with_actor(|actor| actor.set_target(Some(target))).unwrap();

        let mut follow = Follow::new(300, false, 500);
        assert_eq!(harness.run(&mut follow, 100.0, 100), 5);
    }

    #[test]
    fn test_keep_distance_backs_off() {
        let mut harness = Harness::new();
        let target = harness.spawn_player(Position::new(100, 0));
        harness.with_actor(|actor| actor.set_target(Some(target))).unwrap();

        let mut keep = KeepDistance::new(400, false, 1000);
        harness.with_actor(|actor| keep.step(actor)).unwrap();
        assert_eq!(motion(&harness).unwrap().destination, Position::new(-350, 0));
    }

    #[test]
    fn test_keep_distance_without_target_is_a_fault() {
        let mut harness = Harness::new();
        let mut keep = KeepDistance::new(400, false, 1000);
        let result = harness.with_actor(|actor| keep.step(actor));
        assert!(matches!(result, Err(AiError::NoTarget)));
    }
}
