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

//! Cat sith magician: wary of players, turns hostile when they linger

use crate::ai::reactions::AiEventKind;
use crate::ai::routines::{
    Attack, CancelSkill, Circle, Follow, KeepDistance, PrepareSkill, Say, StackAttack, UseSkill,
    Wait, Wander,
};
use crate::ai::script::{AiSetup, Script};
use crate::ai::state::{AggroLimit, AiState};
use fauna_common::SkillId;

const MUTTER: [&str; 3] = ["Mrrow...", "Hmph.", "*flicks its tail*"];
const TAUNT: [&str; 3] = ["Meow!", "Hisss!", "You'll regret that!"];

pub fn catsith_magician(ai: &mut AiSetup) {
    ai.set_visual_field(950, 120.0)
        .set_aggro_radius(400)
        .set_aggro_limit(AggroLimit::Unlimited)
        .doubts(["/pc/", "/pet/"])
        .hates_nearby(3000)
        .on(AiState::Aggro, AiEventKind::Hit, on_hit)
        .on(AiState::Aggro, AiEventKind::KnockDown, on_knock_down)
        .on(AiState::Aggro, AiEventKind::DefenseHit, on_defense_hit)
        .idle(idle)
        .alert(alert)
        .aggro(aggro);
}

fn mutter<'s, 'a>(s: &'s mut Script<'a>) -> &'s mut Script<'a> {
    s.then(Say::new(MUTTER))
}

fn taunt<'s, 'a>(s: &'s mut Script<'a>) -> &'s mut Script<'a> {
    s.then(Say::new(TAUNT))
}

/// Circle the target with random handedness
fn circle(s: &mut Script<'_>, radius: i32, time_min: u32) {
    let clockwise = s.chance(50);
    s.then(Circle::new(radius, time_min, 5000, clockwise, true));
}

fn icebolts(s: &mut Script<'_>) {
    if s.random(100) < 30 {
        s.then(KeepDistance::new(1000, false, 3000));
    }
    let stacks = s.pick(&[1, 1, 2]).unwrap_or(1);
    s.then(StackAttack::new(SkillId::ICEBOLT, stacks, 30_000));
}

fn idle(s: &mut Script<'_>) {
    mutter(s);

    s.switch_random();
    if s.case(40) {
        let walk = s.random(100) < 20;
        s.then(Wander::new(300, 500, walk));
    } else if s.case(20) {
        s.wait(4000, 6000);
    }

    s.wait(2000, 5000);
}

fn alert(s: &mut Script<'_>) {
    mutter(s);
    let clockwise = s.chance(50);
    s.then(Circle::new(400, 2000, 3000, clockwise, true));
}

fn aggro(s: &mut Script<'_>) {
    s.switch_random();
    if s.case(30) {
        if s.chance(50) {
            taunt(s).then(Wander::new(200, 200, false));
        }

        s.then(Attack::new(3, 4000));

        s.switch_random();
        if s.case(40) {
            s.then(Attack::new(3, 4000));
        } else if s.case(30) {
            s.then(PrepareSkill::once(SkillId::COUNTERATTACK))
                .wait(1000, 1000);
        } else if s.case(10) {
            s.then(PrepareSkill::once(SkillId::COUNTERATTACK));
            taunt(s).wait(500, 2000);
            taunt(s).then(CancelSkill::new());
        } else if s.case(20) {
            icebolts(s);
        }

        if s.chance(50) {
            s.wait(500, 2000);
        }
    } else if s.case(10) {
        s.switch_random();
        if s.case(40) {
            taunt(s)
                .then(PrepareSkill::once(SkillId::SMASH))
                .wait(1000, 1500)
                .then(Attack::new(1, 4000));
        } else if s.case(30) {
            s.then(PrepareSkill::once(SkillId::SMASH))
                .then(CancelSkill::new())
                .then(Attack::new(3, 4000));
        } else if s.case(30) {
            s.then(PrepareSkill::once(SkillId::DEFENSE))
                .wait(2000, 6000)
                .then(CancelSkill::new());
        }

        s.wait(1000, 2000);
    } else if s.case(10) {
        s.then(PrepareSkill::once(SkillId::DEFENSE));
        if s.random(100) < 60 {
            circle(s, 400, 2000);
        } else {
            s.then(Follow::new(400, true, 5000));
        }
        s.then(CancelSkill::new());
    } else if s.case(10) {
        taunt(s);

        s.switch_random();
        if s.case(60) {
            circle(s, 400, 2000);
        } else if s.case(20) {
            s.then(Follow::new(400, true, 5000));
        } else if s.case(20) {
            s.then(KeepDistance::new(1000, false, 5000));
        }
    } else if s.case(5) {
        s.then(PrepareSkill::once(SkillId::COUNTERATTACK))
            .wait(1000, 10_000)
            .then(CancelSkill::new());
    } else if s.case(10) {
        if s.random(100) < 50 {
            s.then(PrepareSkill::once(SkillId::DEFENSE))
                .then(KeepDistance::new(1000, false, 3000));
            if s.random(100) < 70 {
                s.wait(1000, 2000).then(CancelSkill::new());
            } else {
                s.then(CancelSkill::new()).wait(1000, 2000);
            }
        } else {
            s.then(PrepareSkill::once(SkillId::COUNTERATTACK))
                .wait(3000, 7000)
                .then(CancelSkill::new())
                .wait(1000, 2000);
        }
    } else if s.case(25) {
        icebolts(s);
    }
}

fn on_hit(s: &mut Script<'_>) {
    taunt(s);
    if s.random(100) < 80 {
        s.then(Attack::new(3, 4000));
    } else {
        s.then(KeepDistance::new(10_000, false, 2000));
    }
}

fn on_knock_down(s: &mut Script<'_>) {
    taunt(s);

    s.switch_random();
    if s.case(40) {
        s.then(PrepareSkill::once(SkillId::WINDMILL)).wait(3000, 4000);
        taunt(s).then(UseSkill::new());
    } else if s.case(30) {
        s.then(PrepareSkill::once(SkillId::DEFENSE));
        if s.random(100) < 60 {
            circle(s, 400, 2000);
        } else {
            s.then(Follow::new(400, true, 5000));
        }
        s.then(CancelSkill::new());
    } else if s.case(5) {
        s.then(PrepareSkill::once(SkillId::SMASH));
        taunt(s).then(Attack::new(1, 4000));
    }
}

fn on_defense_hit(s: &mut Script<'_>) {
    if s.random(100) < 40 {
        s.then(Attack::new(3, 4000));
        if s.random(100) < 50 {
            s.wait(1000, 2000);
        }
    } else {
        s.then(Attack::new(1, 4000))
            .wait(2000, 2000)
            .then(Attack::new(1, 4000))
            .wait(2000, 2000)
            .then(Attack::new(1, 4000))
            .wait(2000, 2000)
            .then(Attack::new(1, 4000));
    }
}
