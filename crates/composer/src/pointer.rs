//! Process-wide pointer event stream
//!
//! The host publishes every pointer-down to one [`PointerHub`]. Each
//! subscriber gets its own queue and decides whether an event falls inside
//! its region; dropping a [`PointerSubscription`] unsubscribes it.

use doc_model::NodeId;
use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::rc::{Rc, Weak};
use uuid::Uuid;

/// Identity of one on-screen composer region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RegionId(Uuid);

impl RegionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RegionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What the renderer found under the pointer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerTarget {
    /// Inside a rendered table
    Table(NodeId),
    /// On text; the document position under the pointer
    Position(usize),
    /// Anywhere else in the region (padding, toolbar)
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointerEvent {
    pub region: RegionId,
    pub target: PointerTarget,
}

impl PointerEvent {
    pub fn new(region: RegionId, target: PointerTarget) -> Self {
        Self { region, target }
    }

    /// An event outside every composer region
    pub fn outside() -> Self {
        Self::new(RegionId::new(), PointerTarget::Other)
    }
}

/// Events kept per subscriber between drains; older ones are dropped first
pub const MAX_QUEUED_EVENTS: usize = 64;

#[derive(Debug, Default)]
struct HubInner {
    next_id: u64,
    queues: HashMap<u64, VecDeque<PointerEvent>>,
}

/// Single-threaded fan-out of pointer events
#[derive(Debug, Clone, Default)]
pub struct PointerHub {
    inner: Rc<RefCell<HubInner>>,
}

impl PointerHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish(&self, event: PointerEvent) {
        let mut inner = self.inner.borrow_mut();
        for (id, queue) in inner.queues.iter_mut() {
            if queue.len() == MAX_QUEUED_EVENTS {
                queue.pop_front();
                tracing::trace!(subscriber = id, "Pointer queue full, dropping oldest event");
            }
            queue.push_back(event);
        }
    }

    pub fn subscribe(&self) -> PointerSubscription {
        let mut inner = self.inner.borrow_mut();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.queues.insert(id, VecDeque::new());
        PointerSubscription {
            id,
            hub: Rc::downgrade(&self.inner),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.borrow().queues.len()
    }
}

/// A live subscription; events queue up until drained
#[derive(Debug)]
pub struct PointerSubscription {
    id: u64,
    hub: Weak<RefCell<HubInner>>,
}

impl PointerSubscription {
    /// Take every event published since the last drain
    pub fn drain(&self) -> Vec<PointerEvent> {
        let Some(hub) = self.hub.upgrade() else {
            return Vec::new();
        };
        let mut inner = hub.borrow_mut();
        inner
            .queues
            .get_mut(&self.id)
            .map(|queue| queue.drain(..).collect())
            .unwrap_or_default()
    }
}

impl Drop for PointerSubscription {
    fn drop(&mut self) {
        if let Some(hub) = self.hub.upgrade() {
            hub.borrow_mut().queues.remove(&self.id);
        }
    }
}
