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

//! Authoring surface for archetype behaviors
//!
//! An archetype is a setup function run once per instance against an
//! [`AiSetup`]. It tunes perception and registers the behaviors the instance
//! falls back to in each state along with its reactions to hits. Behaviors
//! are closures filling a [`Script`], which queues routines into the
//! sequence the instance's cursor will run.

use crate::ai::branch::{Dice, RandomSwitch};
use crate::ai::cursor::{BoxedRoutine, Routine, Sequence};
use crate::ai::perception::Perception;
use crate::ai::reactions::{AiEventKind, Behavior, ReactionRegistry};
use crate::ai::routines::{Say, Wait};
use crate::ai::state::{AggroLimit, AiState};
use fauna_common::SkillId;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Heartbeat of an instance nobody tuned
pub const DEFAULT_HEARTBEAT_MS: u64 = 250;

/// A behavior under construction
pub struct Script<'a> {
    dice: &'a mut Dice,
    sequence: Sequence,
    switch: Option<RandomSwitch>,
}

impl<'a> Script<'a> {
    pub(crate) fn new(dice: &'a mut Dice) -> Self {
        Self {
            dice,
            sequence: Sequence::new(),
            switch: None,
        }
    }

    /// Queue a routine after everything queued so far
    pub fn then(&mut self, routine: impl Routine + 'static) -> &mut Self {
        self.sequence.push(routine);
        self
    }

    pub fn then_boxed(&mut self, routine: BoxedRoutine) -> &mut Self {
        self.sequence.push_boxed(routine);
        self
    }

    pub fn wait(&mut self, min: u32, max: u32) -> &mut Self {
        self.then(Wait::new(min, max))
    }

    pub fn say(&mut self, line: impl Into<String>) -> &mut Self {
        self.then(Say::line(line))
    }

    /// Uniform roll in `0..bound`
    pub fn random(&mut self, bound: u32) -> u32 {
        if bound == 0 {
            return 0;
        }
        self.dice.between(0, bound - 1)
    }

    /// `true` with `percent` percent probability
    pub fn chance(&mut self, percent: u32) -> bool {
        self.dice.percent() < percent
    }

    pub fn pick<T: Clone>(&mut self, items: &[T]) -> Option<T> {
        self.dice.pick(items).cloned()
    }

    /// Roll a fresh weighted switch for the following [`case`](Self::case)s
    pub fn switch_random(&mut self) -> &mut Self {
        self.switch = Some(RandomSwitch::roll(self.dice));
        self
    }

    /// Whether the current switch lands in a case of `weight`
    ///
    /// Cases are tried in order, each claiming the next `weight` percent.
    pub fn case(&mut self, weight: u32) -> bool {
        let dice = &mut *self.dice;
        self.switch
            .get_or_insert_with(|| RandomSwitch::roll(dice))
            .case(weight)
    }

    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    pub(crate) fn finish(self) -> Sequence {
        self.sequence
    }
}

/// Build the routine sequence a behavior describes
pub(crate) fn compose(behavior: &Behavior, dice: &mut Dice) -> Sequence {
    let mut script = Script::new(dice);
    behavior(&mut script);
    script.finish()
}

/// Everything an archetype sets up for one instance
#[derive(Clone)]
pub struct AiSetup {
    pub(crate) heartbeat_ms: u64,
    pub(crate) perception: Perception,
    pub(crate) reactions: ReactionRegistry,
    pub(crate) behaviors: HashMap<AiState, Behavior>,
    pub(crate) phrases: Vec<String>,
}

impl Default for AiSetup {
    fn default() -> Self {
        Self {
            heartbeat_ms: DEFAULT_HEARTBEAT_MS,
            perception: Perception::default(),
            reactions: ReactionRegistry::new(),
            behaviors: HashMap::new(),
            phrases: Vec::new(),
        }
    }
}

impl AiSetup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Heartbeat interval; the instance clamps it to its minimum
    pub fn set_heartbeat(&mut self, interval_ms: u64) -> &mut Self {
        self.heartbeat_ms = interval_ms;
        self
    }

    /// Delay between noticing a target and becoming alert
    pub fn set_alert_delay(&mut self, delay_ms: u32) -> &mut Self {
        self.perception.alert_delay_ms = f64::from(delay_ms);
        self
    }

    /// Delay between becoming alert and attacking a hated target
    pub fn set_aggro_delay(&mut self, delay_ms: u32) -> &mut Self {
        self.perception.aggro_delay_ms = f64::from(delay_ms);
        self
    }

    /// Hearing radius
    pub fn set_aggro_radius(&mut self, radius: i32) -> &mut Self {
        self.perception.aggro_radius = radius;
        self
    }

    pub fn set_visual_field(&mut self, radius: i32, angle_degrees: f64) -> &mut Self {
        self.perception.set_visual_field(radius, angle_degrees);
        self
    }

    pub fn set_aggro_limit(&mut self, limit: AggroLimit) -> &mut Self {
        self.perception.aggro_limit = limit;
        self
    }

    pub fn hates<'t>(&mut self, tags: impl IntoIterator<Item = &'t str>) -> &mut Self {
        for tag in tags {
            self.perception.hated.insert(tag);
        }
        self
    }

    pub fn loves<'t>(&mut self, tags: impl IntoIterator<Item = &'t str>) -> &mut Self {
        for tag in tags {
            self.perception.loved.insert(tag);
        }
        self
    }

    pub fn doubts<'t>(&mut self, tags: impl IntoIterator<Item = &'t str>) -> &mut Self {
        for tag in tags {
            self.perception.doubted.insert(tag);
        }
        self
    }

    /// Go from alert to aggro once the target held its battle stance this long
    pub fn hates_battle_stance(&mut self, delay_ms: u32) -> &mut Self {
        self.perception.hates_battle_stance = true;
        self.perception.hate_battle_stance_delay_ms = f64::from(delay_ms);
        self
    }

    /// Go from alert to aggro once the target stayed around this long
    pub fn hates_nearby(&mut self, delay_ms: u32) -> &mut Self {
        self.perception.hate_over_time_ms = f64::from(delay_ms);
        self
    }

    pub fn set_max_distance_from_spawn(&mut self, distance: i32) -> &mut Self {
        self.perception.max_distance_from_spawn = distance;
        self
    }

    /// Lines [`SayRandomPhrase`](crate::ai::routines::SayRandomPhrase) draws from
    pub fn phrases<I, S>(&mut self, phrases: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.phrases.extend(phrases.into_iter().map(Into::into));
        self
    }

    /// React to hits of `kind` from any skill while in `state`
    pub fn on<F>(&mut self, state: AiState, kind: AiEventKind, behavior: F) -> &mut Self
    where
        F: Fn(&mut Script<'_>) + Send + Sync + 'static,
    {
        self.reactions.register(state, kind, None, Arc::new(behavior));
        self
    }

    /// React to hits of `kind` from `skill` while in `state`
    pub fn on_skill<F>(
        &mut self,
        state: AiState,
        kind: AiEventKind,
        skill: SkillId,
        behavior: F,
    ) -> &mut Self
    where
        F: Fn(&mut Script<'_>) + Send + Sync + 'static,
    {
        self.reactions
            .register(state, kind, Some(skill), Arc::new(behavior));
        self
    }

    /// Default behavior while idle, also used while aware
    pub fn idle<F>(&mut self, behavior: F) -> &mut Self
    where
        F: Fn(&mut Script<'_>) + Send + Sync + 'static,
    {
        self.behaviors.insert(AiState::Idle, Arc::new(behavior));
        self
    }

    pub fn alert<F>(&mut self, behavior: F) -> &mut Self
    where
        F: Fn(&mut Script<'_>) + Send + Sync + 'static,
    {
        self.behaviors.insert(AiState::Alert, Arc::new(behavior));
        self
    }

    pub fn aggro<F>(&mut self, behavior: F) -> &mut Self
    where
        F: Fn(&mut Script<'_>) + Send + Sync + 'static,
    {
        self.behaviors.insert(AiState::Aggro, Arc::new(behavior));
        self
    }

    pub fn love<F>(&mut self, behavior: F) -> &mut Self
    where
        F: Fn(&mut Script<'_>) + Send + Sync + 'static,
    {
        self.behaviors.insert(AiState::Love, Arc::new(behavior));
        self
    }

    pub fn heartbeat_ms(&self) -> u64 {
        self.heartbeat_ms
    }

    pub fn perception(&self) -> &Perception {
        &self.perception
    }

    pub fn reactions(&self) -> &ReactionRegistry {
        &self.reactions
    }

    /// Default behavior for a state; aware creatures keep idling
    pub fn behavior(&self, state: AiState) -> Option<&Behavior> {
        let state = match state {
            AiState::Aware => AiState::Idle,
            other => other,
        };
        self.behaviors.get(&state)
    }
}

impl fmt::Debug for AiSetup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AiSetup")
            .field("heartbeat_ms", &self.heartbeat_ms)
            .field("perception", &self.perception)
            .field("reactions", &self.reactions)
            .field("behaviors", &self.behaviors.keys().collect::<Vec<_>>())
            .field("phrases", &self.phrases)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_queues_in_order() {
        let mut dice = Dice::seeded(1);
        let mut script = Script::new(&mut dice);
        script.wait(100, 200).say("squeak").then(Wait::exactly(50));
        assert_eq!(script.len(), 3);
        assert_eq!(script.finish().len(), 3);
    }

    #[test]
    fn test_switch_case_chain() {
        let mut dice = Dice::seeded(3);
        let mut taken = [0u32; 3];
        for _ in 0..300 {
            let mut script = Script::new(&mut dice);
            script.switch_random();
            if script.case(30) {
                taken[0] += 1;
            } else if script.case(30) {
                taken[1] += 1;
            } else if script.case(40) {
                taken[2] += 1;
            }
        }
        assert_eq!(taken.iter().sum::<u32>(), 300);
        assert!(taken.iter().all(|count| *count > 0));
    }

    #[test]
    fn test_random_stays_in_bounds() {
        let mut dice = Dice::seeded(5);
        let mut script = Script::new(&mut dice);
        for _ in 0..500 {
            assert!(script.random(10) < 10);
        }
        assert_eq!(script.random(0), 0);
        assert!(!script.chance(0));
        assert!(script.chance(100));
    }

    #[test]
    fn test_setup_registers_every_tag() {
        let mut setup = AiSetup::new();
        setup
            .hates(["/pc/", "/pet/"])
            .doubts([" /cat/ "])
            .loves(["/fox/"]);

        let perception = setup.perception();
        assert!(perception.hated.contains("pc"));
        assert!(perception.hated.contains("pet"));
        assert!(perception.doubted.contains("cat"));
        assert!(!perception.hated.contains("cat"));
        assert!(perception.loved.contains("fox"));
    }

    #[test]
    fn test_setup_tuning() {
        let mut setup = AiSetup::new();
        setup
            .set_heartbeat(10)
            .set_alert_delay(2000)
            .set_aggro_delay(100)
            .set_aggro_radius(400)
            .set_visual_field(950, 200.0)
            .set_aggro_limit(AggroLimit::Three)
            .hates_battle_stance(1500)
            .hates_nearby(4000)
            .set_max_distance_from_spawn(800);

        let perception = setup.perception();
        assert_eq!(setup.heartbeat_ms(), 10);
        assert_eq!(perception.alert_delay_ms, 2000.0);
        assert_eq!(perception.aggro_delay_ms, 100.0);
        assert_eq!(perception.aggro_radius, 400);
        assert_eq!(perception.visual_radius, 950);
        assert!((perception.visual_angle - 160f64.to_radians()).abs() < 1e-9);
        assert_eq!(perception.aggro_limit, AggroLimit::Three);
        assert!(perception.hates_battle_stance);
        assert_eq!(perception.hate_battle_stance_delay_ms, 1500.0);
        assert_eq!(perception.hate_over_time_ms, 4000.0);
        assert_eq!(perception.max_distance_from_spawn, 800);
    }

    #[test]
    fn test_aware_uses_idle_behavior() {
        let mut setup = AiSetup::new();
        setup.idle(|script| {
            script.wait(100, 100);
        });

        assert!(setup.behavior(AiState::Aware).is_some());
        assert!(setup.behavior(AiState::Alert).is_none());

        let mut dice = Dice::seeded(1);
        let sequence = compose(
            setup.behavior(AiState::Idle).expect("idle behavior"),
            &mut dice,
        );
        assert_eq!(sequence.len(), 1);
    }
}
