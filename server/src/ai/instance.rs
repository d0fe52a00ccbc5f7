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

//! Periodic driver of one AI instance
//!
//! Every active instance owns a tokio task ticking at its heartbeat. A tick
//! takes the instance's brain with a non-blocking `try_lock`, so a tick that
//! arrives while the previous pass is still running is dropped, never queued.

use crate::ai::brain::{Brain, Pulse};
use crate::ai::events::AiEvent;
use crate::ai::services::AiServices;
use crate::ai::state::AiState;
use crate::config::AiConfig;
use crate::ecs::EcsEntity;
use crate::ecs::context::WorldContext;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::Mutex as AsyncMutex;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tokio_util::sync::CancellationToken;

/// Outcome of a heartbeat
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Beat {
    /// The previous pass was still running
    Skipped,
    Ran,
    /// The pass found nobody watching and stopped the driver
    Deactivated,
}

struct Driver {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

pub struct AiInstance {
    entity: EcsEntity,
    archetype: String,
    brain: AsyncMutex<Brain>,
    services: AiServices,
    heartbeat_ms: AtomicU64,
    min_heartbeat_ms: u64,
    active: AtomicBool,
    disposed: AtomicBool,
    skipped: AtomicU32,
    stuck_threshold: u32,
    last_beat: Mutex<Instant>,
    driver: Mutex<Option<Driver>>,
}

impl AiInstance {
    pub fn new(mut brain: Brain, services: AiServices, config: &AiConfig) -> Self {
        brain.set_sharp_mind(config.sharp_mind);
        let heartbeat_ms = brain.setup().heartbeat_ms().max(config.min_heartbeat_ms);

        Self {
            entity: brain.entity(),
            archetype: brain.mind().archetype().to_string(),
            brain: AsyncMutex::new(brain),
            services,
            heartbeat_ms: AtomicU64::new(heartbeat_ms),
            min_heartbeat_ms: config.min_heartbeat_ms,
            active: AtomicBool::new(false),
            disposed: AtomicBool::new(false),
            skipped: AtomicU32::new(0),
            stuck_threshold: config.stuck_warning_threshold,
            last_beat: Mutex::new(Instant::now()),
            driver: Mutex::new(None),
        }
    }

    pub fn entity(&self) -> EcsEntity {
        self.entity
    }

    pub fn archetype(&self) -> &str {
        &self.archetype
    }

    /// The brain, for inspection or to run passes by hand
    pub fn brain(&self) -> &AsyncMutex<Brain> {
        &self.brain
    }

    pub async fn state(&self) -> AiState {
        self.brain.lock().await.state()
    }

    pub fn heartbeat_ms(&self) -> u64 {
        self.heartbeat_ms.load(Ordering::Acquire)
    }

    /// Change the heartbeat; a running driver picks it up after its next tick
    pub fn set_heartbeat(&self, interval_ms: u64) {
        self.heartbeat_ms
            .store(interval_ms.max(self.min_heartbeat_ms), Ordering::Release);
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }

    /// Heartbeats skipped in a row
    pub fn skipped(&self) -> u32 {
        self.skipped.load(Ordering::Acquire)
    }

    /// Run one scheduling pass unless the previous one is still running
    ///
    /// Faults inside the pass are logged and swallowed; the instance keeps
    /// ticking.
    pub async fn heartbeat(&self, context: &WorldContext) -> Beat {
        let Ok(mut brain) = self.brain.try_lock() else {
            let skipped = self.skipped.fetch_add(1, Ordering::AcqRel) + 1;
            if skipped == self.stuck_threshold {
                tracing::warn!(
                    archetype = %self.archetype,
                    entity = ?self.entity,
                    "AI heartbeat skipped {} times in a row, stuck?",
                    skipped
                );
            }
            return Beat::Skipped;
        };
        self.skipped.store(0, Ordering::Release);

        let elapsed = {
            let now = Instant::now();
            let mut last = self.lock_last_beat();
            let elapsed = now.saturating_duration_since(*last);
            *last = now;
            elapsed
        };
        brain.advance(elapsed.as_secs_f64() * 1000.0);

        let mut world = context.entities().write().await;
        match brain.pulse(&mut world, &self.services) {
            Ok(Pulse::Continue) => Beat::Ran,
            Ok(Pulse::Deactivate) => {
                tracing::debug!(
                    archetype = %self.archetype,
                    entity = ?self.entity,
                    "No observers left, deactivating"
                );
                self.stop_driver();
                Beat::Deactivated
            }
            Err(error) => {
                tracing::error!(
                    archetype = %self.archetype,
                    entity = ?self.entity,
                    "AI pass failed: {}",
                    error
                );
                Beat::Ran
            }
        }
    }

    /// Start ticking, refusing deactivation for `min_run_ms` of simulated time
    ///
    /// Returns `false` if the instance was already active or is disposed.
    pub async fn activate(self: &Arc<Self>, context: Arc<WorldContext>, min_run_ms: u64) -> bool {
        if self.is_disposed() || self.active.swap(true, Ordering::AcqRel) {
            return false;
        }

        self.brain
            .lock()
            .await
            .set_min_run_time(min_run_ms as f64);
        *self.lock_last_beat() = Instant::now();

        let cancel = CancellationToken::new();
        let handle = tokio::spawn(Self::drive(Arc::clone(self), context, cancel.clone()));
        if let Some(previous) = self.lock_driver().replace(Driver { cancel, handle }) {
            previous.cancel.cancel();
        }

        tracing::trace!(archetype = %self.archetype, entity = ?self.entity, "AI activated");
        true
    }

    async fn drive(instance: Arc<Self>, context: Arc<WorldContext>, cancel: CancellationToken) {
        let mut period = instance.heartbeat_ms();
        let mut ticker = heartbeat_interval(period);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    if instance.heartbeat(&context).await == Beat::Deactivated {
                        break;
                    }

                    let current = instance.heartbeat_ms();
                    if current != period {
                        period = current;
                        ticker = heartbeat_interval(period);
                    }
                }
            }
        }
    }

    /// Stop ticking and return the creature to Idle
    ///
    /// A pass already in flight is allowed to finish. The running behavior is
    /// dropped and any held target and battle stance are released.
    pub async fn deactivate(&self, context: &WorldContext) {
        self.stop_driver();
        let mut brain = self.brain.lock().await;
        let mut world = context.entities().write().await;
        if !world.contains(self.entity) {
            brain.clear_cursor();
            return;
        }
        if let Err(error) = brain.reset(&mut world, &self.services) {
            tracing::error!(
                archetype = %self.archetype,
                entity = ?self.entity,
                "AI failed to reset on deactivation: {}",
                error
            );
        }
    }

    /// Stop for good and release the driver task
    pub fn dispose(&self) {
        self.disposed.store(true, Ordering::Release);
        self.active.store(false, Ordering::Release);
        if let Some(driver) = self.lock_driver().take() {
            driver.cancel.cancel();
            driver.handle.abort();
        }
    }

    /// Hand an event to the brain, waiting for a running pass to finish
    pub async fn dispatch(&self, context: &WorldContext, event: &AiEvent) {
        let mut brain = self.brain.lock().await;
        let mut world = context.entities().write().await;
        if let Err(error) = brain.on_event(&mut world, &self.services, event) {
            tracing::error!(
                archetype = %self.archetype,
                entity = ?self.entity,
                "AI failed to handle {:?}: {}",
                event,
                error
            );
        }
    }

    /// Make the creature attack `target` immediately
    pub async fn aggro_creature(&self, context: &WorldContext, target: EcsEntity) {
        let mut brain = self.brain.lock().await;
        let mut world = context.entities().write().await;
        if let Err(error) = brain.aggro_creature(&mut world, &self.services, target) {
            tracing::error!(
                archetype = %self.archetype,
                entity = ?self.entity,
                "AI failed to aggro {:?}: {}",
                target,
                error
            );
        }
    }

    fn stop_driver(&self) {
        self.active.store(false, Ordering::Release);
        if let Some(driver) = self.lock_driver().take() {
            driver.cancel.cancel();
        }
    }

    fn lock_driver(&self) -> MutexGuard<'_, Option<Driver>> {
        self.driver.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn lock_last_beat(&self) -> MutexGuard<'_, Instant> {
        self.last_beat.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Drop for AiInstance {
    fn drop(&mut self) {
        if let Some(driver) = self.lock_driver().take() {
            driver.cancel.cancel();
        }
    }
}

impl std::fmt::Debug for AiInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AiInstance")
            .field("entity", &self.entity)
            .field("archetype", &self.archetype)
            .field("heartbeat_ms", &self.heartbeat_ms())
            .field("active", &self.is_active())
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

fn heartbeat_interval(period_ms: u64) -> tokio::time::Interval {
    let period = Duration::from_millis(period_ms);
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    ticker
}
