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

//! Event bus implementation

use super::types::GameEvent;
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

pub type EventHandler = Box<dyn Fn(&GameEvent) + Send + Sync>;

/// Fire-and-forget event bus shared by the simulation and every AI driver
///
/// Publishing only appends to a queue and never runs handlers inline, so a
/// publisher holding the world lock cannot re-enter itself through a handler.
pub struct EventBus {
    handlers: Arc<RwLock<Vec<EventHandler>>>,
    event_queue: Arc<Mutex<Vec<GameEvent>>>,
}

impl EventBus {
    /// Create a new event bus
    pub fn new() -> Self {
        Self {
            handlers: Arc::new(RwLock::new(Vec::new())),
            event_queue: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Subscribe to events with a handler function
    pub fn subscribe<F>(&self, handler: F)
    where
        F: Fn(&GameEvent) + Send + Sync + 'static,
    {
        let mut handlers = self.handlers.write().unwrap_or_else(|e| e.into_inner());
        handlers.push(Box::new(handler));
    }

    /// Publish an event to the queue
    pub fn publish(&self, event: GameEvent) {
        self.queue().push(event);
    }

    /// Take every queued event, oldest first
    pub fn drain(&self) -> Vec<GameEvent> {
        std::mem::take(&mut *self.queue())
    }

    /// Hand all queued events to the subscribed handlers, returning how many were processed
    pub fn process_events(&self) -> usize {
        let events = self.drain();

        let handlers = self.handlers.read().unwrap_or_else(|e| e.into_inner());
        for event in &events {
            for handler in handlers.iter() {
                handler(event);
            }
        }
        events.len()
    }

    /// Clear all queued events without processing
    pub fn clear(&self) {
        self.queue().clear();
    }

    /// Get the number of queued events
    pub fn queue_len(&self) -> usize {
        self.queue().len()
    }

    fn queue(&self) -> MutexGuard<'_, Vec<GameEvent>> {
        self.event_queue.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for EventBus {
    fn clone(&self) -> Self {
        Self {
            handlers: Arc::clone(&self.handlers),
            event_queue: Arc::clone(&self.event_queue),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hecs::World;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn chat(world: &mut World, message: &str) -> GameEvent {
        GameEvent::Chat {
            entity: world.spawn(()),
            message: message.into(),
        }
    }

    #[test]
    fn test_event_bus() {
        let mut world = World::new();
        let bus = EventBus::new();
        let counter = Arc::new(AtomicUsize::new(0));
        let counter_clone = Arc::clone(&counter);

        bus.subscribe(move |_event| {
            counter_clone.fetch_add(1, Ordering::SeqCst);
        });

        bus.publish(chat(&mut world, "squeak"));
        assert_eq!(bus.queue_len(), 1);

        assert_eq!(bus.process_events(), 1);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert_eq!(bus.queue_len(), 0);
    }

    #[test]
    fn test_drain_preserves_order() {
        let mut world = World::new();
        let bus = EventBus::new();
        let clone = bus.clone();

        bus.publish(chat(&mut world, "first"));
        clone.publish(chat(&mut world, "second"));

        let drained = bus.drain();
        assert_eq!(drained.len(), 2);
        assert!(matches!(&drained[0], GameEvent::Chat { message, .. } if message == "first"));
        assert!(matches!(&drained[1], GameEvent::Chat { message, .. } if message == "second"));
        assert_eq!(clone.queue_len(), 0);
    }

    #[test]
    fn test_clear() {
        let mut world = World::new();
        let bus = EventBus::new();

        bus.publish(chat(&mut world, "squeak"));
        assert_eq!(bus.queue_len(), 1);
        bus.clear();
        assert_eq!(bus.queue_len(), 0);
    }
}
