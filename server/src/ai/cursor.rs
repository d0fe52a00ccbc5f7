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

//! Cooperative behavior cursor
//!
//! A behavior is a chain of [`Routine`]s. Each call to [`Routine::step`] runs
//! until the routine either needs another tick ([`Step::Suspend`]) or has
//! nothing left to do ([`Step::Done`]). A [`Cursor`] wraps the chain the
//! scheduler is currently advancing, one step per heartbeat.

use crate::ai::actor::Actor;
use crate::ai::error::AiResult;
use std::collections::VecDeque;

/// Outcome of a single routine step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// More ticks are needed
    Suspend,
    /// The routine finished
    Done,
}

/// A resumable unit of behavior
///
/// Routines are not restartable: once `Done` has been returned, further
/// steps have no defined effect and callers drop the routine.
pub trait Routine: Send {
    fn step(&mut self, actor: &mut Actor<'_>) -> AiResult<Step>;
}

impl<R: Routine + ?Sized> Routine for Box<R> {
    fn step(&mut self, actor: &mut Actor<'_>) -> AiResult<Step> {
        (**self).step(actor)
    }
}

pub type BoxedRoutine = Box<dyn Routine>;

/// Runs child routines one after another
///
/// When a child finishes, the next one starts within the same step, so the
/// chain suspends exactly as often as its children do.
#[derive(Default)]
pub struct Sequence {
    children: VecDeque<BoxedRoutine>,
}

impl Sequence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, routine: impl Routine + 'static) {
        self.children.push_back(Box::new(routine));
    }

    pub fn push_boxed(&mut self, routine: BoxedRoutine) {
        self.children.push_back(routine);
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

impl Routine for Sequence {
    fn step(&mut self, actor: &mut Actor<'_>) -> AiResult<Step> {
        while let Some(child) = self.children.front_mut() {
            match child.step(actor)? {
                Step::Suspend => return Ok(Step::Suspend),
                Step::Done => {
                    self.children.pop_front();
                }
            }
        }
        Ok(Step::Done)
    }
}

/// The behavior an AI instance is currently running
pub struct Cursor {
    routine: BoxedRoutine,
    label: String,
    finished: bool,
}

impl Cursor {
    pub fn new(label: impl Into<String>, routine: impl Routine + 'static) -> Self {
        Self {
            routine: Box::new(routine),
            label: label.into(),
            finished: false,
        }
    }

    /// Name of the behavior that produced this cursor
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Advance one step; `true` while the behavior still has work left
    ///
    /// A failing step finishes the cursor before the error is returned.
    pub fn resume(&mut self, actor: &mut Actor<'_>) -> AiResult<bool> {
        if self.finished {
            return Ok(false);
        }

        match self.routine.step(actor) {
            Ok(Step::Suspend) => Ok(true),
            Ok(Step::Done) => {
                self.finished = true;
                Ok(false)
            }
            Err(error) => {
                self.finished = true;
                Err(error)
            }
        }
    }
}

impl std::fmt::Debug for Cursor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cursor")
            .field("label", &self.label)
            .field("finished", &self.finished)
            .finish()
    }
}

/// Step a nested routine held in `slot`, clearing the slot once it is done
///
/// An empty slot counts as done.
pub(crate) fn drive<R: Routine>(slot: &mut Option<R>, actor: &mut Actor<'_>) -> AiResult<Step> {
    let Some(routine) = slot.as_mut() else {
        return Ok(Step::Done);
    };

    let step = routine.step(actor)?;
    if step == Step::Done {
        *slot = None;
    }
    Ok(step)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::test_support::Harness;

    /// Suspends `n` times then finishes, recording every step
    struct Ticks {
        left: u32,
        name: &'static str,
        log: std::sync::Arc<std::sync::Mutex<Vec<&'static str>>>,
    }

    impl Routine for Ticks {
        fn step(&mut self, _actor: &mut Actor<'_>) -> AiResult<Step> {
            self.log.lock().unwrap().push(self.name);
            if self.left == 0 {
                return Ok(Step::Done);
            }
            self.left -= 1;
            Ok(Step::Suspend)
        }
    }

    #[test]
    fn test_sequence_preserves_order_and_suspensions() {
        let mut harness = Harness::new();
        let log = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));

        let mut sequence = Sequence::new();
        sequence.push(Ticks {
            left: 2,
            name: "a",
            log: log.clone(),
        });
        sequence.push(Ticks {
            left: 1,
            name: "b",
            log: log.clone(),
        });

        let mut cursor = Cursor::new("test", sequence);
        let mut suspensions = 0;
        while harness.with_actor(|actor| cursor.resume(actor)).unwrap() {
            suspensions += 1;
        }

        assert_eq!(suspensions, 3);
        assert!(cursor.is_finished());
        assert_eq!(*log.lock().unwrap(), vec!["a", "a", "a", "b", "b"]);
    }

    #[test]
    fn test_finished_cursor_stays_finished() {
        let mut harness = Harness::new();
        let mut cursor = Cursor::new("empty", Sequence::new());

        assert!(!harness.with_actor(|actor| cursor.resume(actor)).unwrap());
        assert!(!harness.with_actor(|actor| cursor.resume(actor)).unwrap());
        assert_eq!(cursor.label(), "empty");
    }

    #[test]
    fn test_drive_clears_slot() {
        let mut harness = Harness::new();
        let log = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
        let mut slot = Some(Ticks {
            left: 1,
            name: "x",
            log,
        });

        let first = harness.with_actor(|actor| drive(&mut slot, actor)).unwrap();
        assert_eq!(first, Step::Suspend);
        assert!(slot.is_some());

        let second = harness.with_actor(|actor| drive(&mut slot, actor)).unwrap();
        assert_eq!(second, Step::Done);
        assert!(slot.is_none());
    }
}
