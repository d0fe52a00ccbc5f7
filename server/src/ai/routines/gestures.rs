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

//! Speech, sounds and appearance changes

use crate::ai::actor::Actor;
use crate::ai::cursor::{Routine, Step};
use crate::ai::error::AiResult;
use crate::ai::routines::StunGate;
use crate::ai::routines::flow::Wait;
use crate::ecs::components::{Body, Equipment};
use crate::ecs::events::GameEvent;
use fauna_common::WeaponSet;

/// Pause before and after a weapon swap, letting the animation play
const SWAP_DELAY_MS: u32 = 500;

fn equipment(actor: &Actor<'_>) -> Equipment {
    actor
        .world()
        .get::<&Equipment>(actor.entity())
        .map(|equipment| *equipment)
        .unwrap_or_default()
}

fn set_equipment(actor: &mut Actor<'_>, equipment: Equipment) -> AiResult<()> {
    let entity = actor.entity();
    actor.world_mut().insert_one(entity, equipment)?;
    Ok(())
}

/// Say one of the given lines, picked at random
#[derive(Debug, Clone)]
pub struct Say {
    lines: Vec<String>,
}

impl Say {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }

    pub fn line(line: impl Into<String>) -> Self {
        Self {
            lines: vec![line.into()],
        }
    }
}

impl Routine for Say {
    fn step(&mut self, actor: &mut Actor<'_>) -> AiResult<Step> {
        let Some(index) = actor.dice().index(self.lines.len()) else {
            return Ok(Step::Done);
        };

        let message = &self.lines[index];
        if !message.trim().is_empty() {
            actor.notify(GameEvent::Chat {
                entity: actor.entity(),
                message: message.clone(),
            });
        }
        Ok(Step::Done)
    }
}

/// Say one of the phrases registered for the archetype
#[derive(Debug, Default)]
pub struct SayRandomPhrase;

impl Routine for SayRandomPhrase {
    fn step(&mut self, actor: &mut Actor<'_>) -> AiResult<Step> {
        let phrases = actor.mind().phrases.clone();
        actor.execute_once(Say::new(phrases))?;
        Ok(Step::Done)
    }
}

/// Play a sound effect around the creature
#[derive(Debug, Clone)]
pub struct PlaySound {
    file: String,
}

impl PlaySound {
    pub fn new(file: impl Into<String>) -> Self {
        Self { file: file.into() }
    }
}

impl Routine for PlaySound {
    fn step(&mut self, actor: &mut Actor<'_>) -> AiResult<Step> {
        actor.notify(GameEvent::Sound {
            entity: actor.entity(),
            file: self.file.clone(),
        });
        Ok(Step::Done)
    }
}

/// Resize the creature
#[derive(Debug, Clone, Copy)]
pub struct SetHeight {
    height: f32,
}

impl SetHeight {
    pub fn new(height: f32) -> Self {
        Self { height }
    }
}

impl Routine for SetHeight {
    fn step(&mut self, actor: &mut Actor<'_>) -> AiResult<Step> {
        let entity = actor.entity();
        actor.world_mut().insert_one(entity, Body { height: self.height })?;
        actor.notify(GameEvent::BodyUpdate {
            entity,
            height: self.height,
        });
        Ok(Step::Done)
    }
}

#[derive(Debug)]
enum SwapPhase {
    Start,
    Before(Wait),
    After(Wait),
}

/// Swap to the given weapon set
#[derive(Debug)]
pub struct SwitchTo {
    set: WeaponSet,
    gate: StunGate,
    phase: SwapPhase,
}

impl SwitchTo {
    pub fn new(set: WeaponSet) -> Self {
        Self {
            set,
            gate: StunGate::default(),
            phase: SwapPhase::Start,
        }
    }
}

impl Routine for SwitchTo {
    fn step(&mut self, actor: &mut Actor<'_>) -> AiResult<Step> {
        loop {
            match &mut self.phase {
                SwapPhase::Start => {
                    if equipment(actor).weapon_set == self.set {
                        return Ok(Step::Done);
                    }
                    if self.gate.holds(actor) {
                        return Ok(Step::Suspend);
                    }
                    self.phase = SwapPhase::Before(Wait::exactly(SWAP_DELAY_MS));
                }
                SwapPhase::Before(wait) => {
                    if wait.step(actor)? == Step::Suspend {
                        return Ok(Step::Suspend);
                    }

                    let mut equipment = equipment(actor);
                    equipment.weapon_set = self.set;
                    set_equipment(actor, equipment)?;
                    actor.notify(GameEvent::WeaponSetChanged {
                        entity: actor.entity(),
                        set: self.set,
                    });
                    self.phase = SwapPhase::After(Wait::exactly(SWAP_DELAY_MS));
                }
                SwapPhase::After(wait) => return wait.step(actor),
            }
        }
    }
}

/// Put on the armor following the current one in a list
///
/// The first id is the starting armor; 0 stands for no armor at all. Nothing
/// changes when the current armor is not in the list or is the last entry.
#[derive(Debug, Clone)]
pub struct SwitchArmor {
    items: Vec<u32>,
}

impl SwitchArmor {
    pub fn new(items: impl IntoIterator<Item = u32>) -> Self {
        Self {
            items: items.into_iter().collect(),
        }
    }
}

impl Routine for SwitchArmor {
    fn step(&mut self, actor: &mut Actor<'_>) -> AiResult<Step> {
        if self.items.is_empty() {
            tracing::warn!("SwitchArmor needs at least one item id");
            return Ok(Step::Done);
        }

        let mut equipment = equipment(actor);
        let current = equipment.armor.unwrap_or(0);
        let next = self
            .items
            .windows(2)
            .find(|pair| pair[0] == current)
            .map(|pair| pair[1]);

        let Some(next) = next else {
            return Ok(Step::Done);
        };

        equipment.armor = (next != 0).then_some(next);
        set_equipment(actor, equipment)?;
        actor.notify(GameEvent::ArmorChanged {
            entity: actor.entity(),
            item: equipment.armor,
        });
        Ok(Step::Done)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::test_support::Harness;

    fn chats(harness: &Harness) -> Vec<String> {
        harness
            .services
            .events
            .drain()
            .into_iter()
            .filter_map(|event| match event {
                GameEvent::Chat { message, .. } => Some(message),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_say_picks_one_line() {
        let mut harness = Harness::new();
        harness.run(&mut Say::new(["squeak", "hiss"]), 50.0, 1);
        let said = chats(&harness);
        assert_eq!(said.len(), 1);
        assert!(said[0] == "squeak" || said[0] == "hiss");
    }

    #[test]
    fn test_say_skips_blank_lines() {
        let mut harness = Harness::new();
        harness.run(&mut Say::line("   "), 50.0, 1);
        assert!(chats(&harness).is_empty());
    }

    #[test]
    fn test_say_random_phrase_without_phrases() {
        let mut harness = Harness::new();
        assert_eq!(harness.run(&mut SayRandomPhrase, 50.0, 1), 0);
        assert!(chats(&harness).is_empty());

        harness.mind.phrases = vec!["Hungry...".to_string()];
        harness.run(&mut SayRandomPhrase, 50.0, 1);
        assert_eq!(chats(&harness), vec!["Hungry...".to_string()]);
    }

    #[test]
    fn test_set_height_updates_body() {
        let mut harness = Harness::new();
        harness.run(&mut SetHeight::new(1.5), 50.0, 1);
        assert_eq!(harness.world.get::<&Body>(harness.creature).unwrap().height, 1.5);
    }

    #[test]
    fn test_switch_to_waits_around_swap() {
        let mut harness = Harness::new();
        let mut switch = SwitchTo::new(WeaponSet::Second);
        assert_eq!(harness.run(&mut switch, 100.0, 100), 10);
        assert_eq!(equipment_of(&harness).weapon_set, WeaponSet::Second);

        let mut again = SwitchTo::new(WeaponSet::Second);
        assert_eq!(harness.run(&mut again, 100.0, 100), 0);
    }

    fn equipment_of(harness: &Harness) -> Equipment {
        *harness.world.get::<&Equipment>(harness.creature).unwrap()
    }

    #[test]
    fn test_switch_armor_cycles() {
        let mut harness = Harness::new();
        let items = [0, 15046, 15047];

        harness.run(&mut SwitchArmor::new(items), 50.0, 1);
        assert_eq!(equipment_of(&harness).armor, Some(15046));
        harness.run(&mut SwitchArmor::new(items), 50.0, 1);
        assert_eq!(equipment_of(&harness).armor, Some(15047));
        harness.run(&mut SwitchArmor::new(items), 50.0, 1);
        assert_eq!(equipment_of(&harness).armor, Some(15047));
    }

    #[test]
    fn test_switch_armor_can_undress() {
        let mut harness = Harness::new();
        harness
            .world
            .insert_one(
                harness.creature,
                Equipment {
                    armor: Some(15046),
                    ..Equipment::default()
                },
            )
            .unwrap();

        harness.run(&mut SwitchArmor::new([15046, 0]), 50.0, 1);
        assert_eq!(equipment_of(&harness).armor, None);
    }
}
