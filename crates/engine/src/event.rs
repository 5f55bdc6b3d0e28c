//! Pooled events and the blocking event queue.
//!
//! Producers (input pump, lifecycle callbacks, [`Application::stop`]) allocate
//! an event from the shared [`EventPool`] and push it. The logic thread pops
//! it and disposes it, which returns the slot to the pool. Disposal consumes
//! the [`PooledEvent`], and dropping one disposes it, so a disposed event can
//! never be touched again.
//!
//! [`Application::stop`]: crate::Application::stop

use std::collections::VecDeque;
use std::ops::Deref;
use std::sync::Arc;
use std::time::{Duration, Instant};

use arrayvec::ArrayVec;
use parking_lot::{Condvar, Mutex};

use crate::types::{Event, EVENT_POOL_SIZE};

/// Fixed-capacity free list of event slots.
///
/// When every slot is in use, allocation falls back to the heap; surplus
/// events are simply freed on disposal.
pub struct EventPool {
    free: Mutex<ArrayVec<Box<Event>, EVENT_POOL_SIZE>>,
}

impl EventPool {
    pub fn new() -> Arc<Self> {
        let mut free = ArrayVec::new();
        while !free.is_full() {
            free.push(Box::new(Event::Tick));
        }
        Arc::new(Self {
            free: Mutex::new(free),
        })
    }

    pub fn alloc(self: &Arc<Self>, event: Event) -> PooledEvent {
        let slot = match self.free.lock().pop() {
            Some(mut slot) => {
                *slot = event;
                slot
            }
            None => Box::new(event),
        };
        PooledEvent {
            slot: Some(slot),
            pool: Arc::clone(self),
        }
    }

    /// Free slots remaining
    pub fn available(&self) -> usize {
        self.free.lock().len()
    }

    fn release(&self, slot: Box<Event>) {
        // A full free list means this one came from the heap.
        let _ = self.free.lock().try_push(slot);
    }
}

/// An event on loan from an [`EventPool`].
pub struct PooledEvent {
    slot: Option<Box<Event>>,
    pool: Arc<EventPool>,
}

impl PooledEvent {
    pub fn event(&self) -> Event {
        **self
    }

    /// Return the slot to the pool.
    pub fn dispose(self) {}
}

impl Deref for PooledEvent {
    type Target = Event;

    fn deref(&self) -> &Event {
        match &self.slot {
            Some(slot) => slot,
            None => &Event::Tick,
        }
    }
}

impl Drop for PooledEvent {
    fn drop(&mut self) {
        if let Some(slot) = self.slot.take() {
            self.pool.release(slot);
        }
    }
}

impl std::fmt::Debug for PooledEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("PooledEvent").field(&**self).finish()
    }
}

struct QueueInner {
    events: VecDeque<PooledEvent>,
    waiting: usize,
}

/// Thread-safe FIFO of pooled events.
pub struct EventQueue {
    inner: Mutex<QueueInner>,
    cond: Condvar,
}

impl EventQueue {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(QueueInner {
                events: VecDeque::with_capacity(EVENT_POOL_SIZE),
                waiting: 0,
            }),
            cond: Condvar::new(),
        }
    }

    /// Append an event and wake any blocked consumers.
    pub fn push(&self, event: PooledEvent) {
        let mut q = self.inner.lock();
        q.events.push_back(event);
        if q.waiting > 0 {
            self.cond.notify_all();
        }
    }

    /// Take the oldest event.
    ///
    /// - `None`: wait as long as it takes.
    /// - `Some(Duration::ZERO)`: poll without waiting.
    /// - `Some(d)`: wait at most `d`, then give up.
    pub fn pop(&self, timeout: Option<Duration>) -> Option<PooledEvent> {
        let mut q = self.inner.lock();
        if let Some(event) = q.events.pop_front() {
            return Some(event);
        }

        match timeout {
            Some(d) if d.is_zero() => return None,
            None => {
                q.waiting += 1;
                while q.events.is_empty() {
                    self.cond.wait(&mut q);
                }
                q.waiting -= 1;
            }
            Some(d) => {
                let deadline = Instant::now() + d;
                q.waiting += 1;
                while q.events.is_empty() {
                    if self.cond.wait_until(&mut q, deadline).timed_out() {
                        break;
                    }
                }
                q.waiting -= 1;
            }
        }
        q.events.pop_front()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every queued event, returning their slots to the pool.
    pub fn clear(&self) {
        self.inner.lock().events.clear();
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}
