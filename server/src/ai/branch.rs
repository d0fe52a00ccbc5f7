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

//! Randomized branching for authored behaviors

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Per-instance random source
#[derive(Debug)]
pub struct Dice {
    rng: StdRng,
}

impl Dice {
    /// Dice seeded from the thread's entropy source
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_rng(&mut rand::rng()),
        }
    }

    /// Reproducible dice
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Percentile roll in `0..100`
    pub fn percent(&mut self) -> u32 {
        self.rng.random_range(0..100)
    }

    /// Uniform value in `min..=max`
    pub fn between(&mut self, min: u32, max: u32) -> u32 {
        if max <= min {
            min
        } else {
            self.rng.random_range(min..=max)
        }
    }

    /// Uniform index below `len`, `None` when `len` is zero
    pub fn index(&mut self, len: usize) -> Option<usize> {
        (len > 0).then(|| self.rng.random_range(0..len))
    }

    /// Uniform pick from `items`
    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        self.index(items.len()).map(|i| &items[i])
    }

    pub fn rng(&mut self) -> &mut StdRng {
        &mut self.rng
    }
}

impl Default for Dice {
    fn default() -> Self {
        Self::new()
    }
}

/// Cumulative weighted switch
///
/// One percentile roll is taken up front; each `case` adds its weight to a
/// running total and matches while the roll is below that total. Chained as
/// `if case(40) {..} else if case(30) {..} else {..}` this picks the first
/// branch 40% of the time, the second 30% and the rest otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RandomSwitch {
    roll: u32,
    total: u32,
}

impl RandomSwitch {
    pub fn new(roll: u32) -> Self {
        Self { roll, total: 0 }
    }

    pub fn roll(dice: &mut Dice) -> Self {
        Self::new(dice.percent())
    }

    pub fn case(&mut self, weight: u32) -> bool {
        self.total += weight;
        self.roll < self.total
    }
}
