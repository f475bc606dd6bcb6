//! EventQueue: the hand-off point between the UI context and the core context.
//!
//! The UI context pushes normalized [`SkinEvent`]s; the core context drains
//! them from its periodic poll.  The queue is unbounded, so high-frequency
//! event kinds coalesce instead: a newly pushed `ScrollChanged` or
//! `ZoomedWindowResized` replaces the queued one of the same kind in place,
//! keeping the older event's position.
//!
//! # Notification
//!
//! An optional observer is told when the queue goes from empty to non-empty.
//! It fires once per transition, not once per push, so the core loop can be
//! woken without being flooded.
//!
//! # Unicode translation flag
//!
//! The queue also carries the flag that tells the host input translator
//! whether to emit text-input events.  The keyboard flips it when switching
//! between raw and unicode mode.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use skin_core::SkinEvent;
use tracing::trace;

/// Callback invoked on the empty → non-empty transition.
pub type NewEventObserver = Arc<dyn Fn() + Send + Sync>;

/// Thread-safe coalescing event queue.
pub struct EventQueue {
    events: Mutex<VecDeque<SkinEvent>>,
    observer: Mutex<Option<NewEventObserver>>,
    unicode_enabled: AtomicBool,
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl EventQueue {
    /// Creates an empty queue with unicode translation enabled.
    pub fn new() -> Self {
        Self {
            events: Mutex::new(VecDeque::new()),
            observer: Mutex::new(None),
            unicode_enabled: AtomicBool::new(true),
        }
    }

    /// Installs the empty → non-empty observer, replacing any previous one.
    pub fn set_observer(&self, observer: NewEventObserver) {
        *self.observer.lock().unwrap_or_else(PoisonError::into_inner) = Some(observer);
    }

    /// Appends `event`, or replaces the queued event of the same kind if it coalesces.
    pub fn push(&self, event: SkinEvent) {
        let was_empty = {
            let mut events = self.lock_events();
            let was_empty = events.is_empty();
            let kind = event.kind();
            if kind.is_coalescing() {
                if let Some(slot) = events.iter_mut().find(|e| e.kind() == kind) {
                    trace!(?kind, "coalescing queued event");
                    *slot = event;
                    return;
                }
            }
            events.push_back(event);
            was_empty
        };

        if was_empty {
            let observer = self
                .observer
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone();
            if let Some(observer) = observer {
                observer();
            }
        }
    }

    /// Removes and returns the oldest event, or `None` if the queue is empty.
    pub fn poll(&self) -> Option<SkinEvent> {
        self.lock_events().pop_front()
    }

    pub fn len(&self) -> usize {
        self.lock_events().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock_events().is_empty()
    }

    /// Turns host text-input translation on or off.
    pub fn enable_unicode(&self, enabled: bool) {
        self.unicode_enabled.store(enabled, Ordering::Release);
    }

    pub fn unicode_enabled(&self) -> bool {
        self.unicode_enabled.load(Ordering::Acquire)
    }

    fn lock_events(&self) -> MutexGuard<'_, VecDeque<SkinEvent>> {
        // A panicking producer cannot leave the deque half-updated.
        self.events.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
