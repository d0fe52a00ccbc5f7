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

//! Rat man: hates players and pets, brawls with smash and defense

use crate::ai::routines::{
    Attack, CancelSkill, Circle, Follow, KeepDistance, PrepareSkill, Wait, Wander,
};
use crate::ai::reactions::AiEventKind;
use crate::ai::script::{AiSetup, Script};
use crate::ai::state::AiState;
use fauna_common::SkillId;

pub fn ratman(ai: &mut AiSetup) {
    ai.set_visual_field(950, 120.0)
        .set_aggro_radius(400)
        .hates(["/pc/", "/pet/"])
        .on(AiState::Aggro, AiEventKind::DefenseHit, strike_back)
        .on(AiState::Aggro, AiEventKind::KnockDown, strike_back)
        .idle(idle)
        .aggro(aggro);
}

fn idle(s: &mut Script<'_>) {
    s.then(Wander::default()).wait(2000, 5000);
}

fn aggro(s: &mut Script<'_>) {
    s.switch_random();
    if s.case(30) {
        let clockwise = s.chance(50);
        s.then(KeepDistance::new(1000, false, 2000))
            .then(Circle::new(600, 1000, 2000, clockwise, true));
    } else if s.case(20) {
        s.then(CancelSkill::new()).then(Attack::times(3));
    } else if s.case(20) {
        s.then(PrepareSkill::once(SkillId::SMASH))
            .then(CancelSkill::new())
            .then(Attack::times(3));
    } else if s.case(20) {
        s.then(PrepareSkill::once(SkillId::SMASH))
            .then(Attack::new(1, 4000));
    } else if s.case(5) {
        s.then(PrepareSkill::once(SkillId::DEFENSE))
            .then(Follow::new(600, true, 5000))
            .then(CancelSkill::new());
    } else if s.case(5) {
        s.then(PrepareSkill::once(SkillId::COUNTERATTACK))
            .then(CancelSkill::new());
    }
}

fn strike_back(s: &mut Script<'_>) {
    s.then(Attack::times(3)).then(Wait::exactly(3000));
}
