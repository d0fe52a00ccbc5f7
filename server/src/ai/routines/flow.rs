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

//! Waiting and time limits

use crate::ai::actor::Actor;
use crate::ai::cursor::{BoxedRoutine, Routine, Step};
use crate::ai::error::AiResult;
use crate::ai::routines::StunGate;

/// Idle for a random number of simulated milliseconds in `min..=max`
#[derive(Debug)]
pub struct Wait {
    min: u32,
    max: u32,
    gate: StunGate,
    until: Option<f64>,
}

impl Wait {
    pub fn new(min: u32, max: u32) -> Self {
        Self {
            min,
            max: max.max(min),
            gate: StunGate::default(),
            until: None,
        }
    }

    pub fn exactly(duration: u32) -> Self {
        Self::new(duration, duration)
    }
}

impl Routine for Wait {
    fn step(&mut self, actor: &mut Actor<'_>) -> AiResult<Step> {
        if self.gate.holds(actor) {
            return Ok(Step::Suspend);
        }

        let until = match self.until {
            Some(until) => until,
            None => {
                let duration = actor.dice().between(self.min, self.max);
                let until = actor.timestamp() + duration as f64;
                self.until = Some(until);
                until
            }
        };

        if actor.timestamp() < until {
            Ok(Step::Suspend)
        } else {
            Ok(Step::Done)
        }
    }
}

/// Run a routine for at most `duration` simulated milliseconds
pub struct Timeout {
    duration: f64,
    inner: BoxedRoutine,
    gate: StunGate,
    until: Option<f64>,
}

impl Timeout {
    pub fn new(duration: u32, inner: impl Routine + 'static) -> Self {
        Self {
            duration: duration as f64,
            inner: Box::new(inner),
            gate: StunGate::default(),
            until: None,
        }
    }
}

impl Routine for Timeout {
    fn step(&mut self, actor: &mut Actor<'_>) -> AiResult<Step> {
        if self.gate.holds(actor) {
            return Ok(Step::Suspend);
        }

        let until = *self
            .until
            .get_or_insert(actor.timestamp() + self.duration);

        match self.inner.step(actor)? {
            Step::Done => Ok(Step::Done),
            Step::Suspend if actor.timestamp() >= until => Ok(Step::Done),
            Step::Suspend => Ok(Step::Suspend),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::test_support::Harness;
    use crate::ecs::components::{StatusEffectType, StatusEffects};

    #[test]
    fn test_wait_suspends_for_whole_duration() {
        let mut harness = Harness::new();
        let mut wait = Wait::exactly(1000);
        assert_eq!(harness.run(&mut wait, 50.0, 1000), 20);
    }

    #[test]
    fn test_wait_range_stays_in_bounds() {
        for seed in 0..20 {
            let mut harness = Harness::seeded(seed);
            let mut wait = Wait::new(100, 300);
            let suspensions = harness.run(&mut wait, 10.0, 1000);
            assert!((10..=30).contains(&suspensions), "{suspensions}");
        }
    }

    #[test]
    fn test_wait_with_inverted_bounds_uses_min() {
        let mut harness = Harness::new();
        let mut wait = Wait::new(500, 100);
        assert_eq!(harness.run(&mut wait, 100.0, 1000), 5);
    }

    #[test]
    fn test_zero_wait_is_immediate() {
        let mut harness = Harness::new();
        let mut wait = Wait::exactly(0);
        assert_eq!(harness.run(&mut wait, 50.0, 10), 0);
    }

    #[test]
    fn test_stunned_wait_suspends_once_more() {
        let mut harness = Harness::new();
        harness
            .world
            .get::<&mut StatusEffects>(harness.creature)
            .unwrap()
            .apply(StatusEffectType::Stunned, 10_000.0);

        let mut wait = Wait::exactly(100);
        assert_eq!(harness.run(&mut wait, 50.0, 100), 3);
    }

    #[test]
    fn test_timeout_cuts_inner_routine() {
        let mut harness = Harness::new();
        let mut timeout = Timeout::new(200, Wait::exactly(5000));
        assert_eq!(harness.run(&mut timeout, 50.0, 1000), 4);
    }

    #[test]
    fn test_timeout_ends_with_inner_routine() {
        let mut harness = Harness::new();
        let mut timeout = Timeout::new(5000, Wait::exactly(100));
        assert_eq!(harness.run(&mut timeout, 50.0, 1000), 2);
    }
}
