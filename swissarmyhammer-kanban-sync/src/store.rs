//! Snapshot store - the single holder of board state
//!
//! The store has no business logic. It hands out the current state, merges
//! whole-field patches and tells subscribers when the slice they watch was
//! replaced. Subscribers run synchronously in the caller's context, after the
//! new state is committed and with no lock held, so a callback may read the
//! store or even replace it again.

use crate::types::{BoardState, StatePatch};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use tracing::trace;

/// Change detection for watched slices.
///
/// Shared slices compare by pointer, so a field counts as changed whenever it
/// was replaced, even with an equal value. Plain values compare by value.
pub trait Identity: Clone + Send + 'static {
    fn same(&self, other: &Self) -> bool;
}

impl<T: ?Sized + Send + Sync + 'static> Identity for Arc<T> {
    fn same(&self, other: &Self) -> bool {
        Arc::ptr_eq(self, other)
    }
}

impl Identity for bool {
    fn same(&self, other: &Self) -> bool {
        self == other
    }
}

impl Identity for String {
    fn same(&self, other: &Self) -> bool {
        self == other
    }
}

/// Handle returned by [`SnapshotStore::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Notification = Box<dyn FnOnce() + Send>;

trait Watcher: Send {
    /// Record the new state, returning the callback to run if the watched
    /// slice changed.
    fn poll(&mut self, state: &BoardState) -> Option<Notification>;
}

struct Watch<T, S, F> {
    selector: S,
    last: T,
    callback: Arc<F>,
}

impl<T, S, F> Watcher for Watch<T, S, F>
where
    T: Identity,
    S: Fn(&BoardState) -> T + Send + 'static,
    F: Fn(&T) + Send + Sync + 'static,
{
    fn poll(&mut self, state: &BoardState) -> Option<Notification> {
        let next = (self.selector)(state);
        if next.same(&self.last) {
            return None;
        }
        self.last = next.clone();
        let callback = Arc::clone(&self.callback);
        Some(Box::new(move || callback(&next)))
    }
}

/// Holder of the board state
pub struct SnapshotStore {
    state: RwLock<Arc<BoardState>>,
    watchers: Mutex<Vec<(SubscriptionId, Box<dyn Watcher>)>>,
    next_id: AtomicU64,
}

impl SnapshotStore {
    pub fn new(state: BoardState) -> Self {
        Self {
            state: RwLock::new(Arc::new(state)),
            watchers: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Current state
    pub fn read(&self) -> Arc<BoardState> {
        Arc::clone(&self.state.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Merge a patch into the state and notify subscribers whose slice changed
    pub fn replace(&self, patch: StatePatch) {
        if patch.is_empty() {
            return;
        }

        let next = {
            let mut guard = self.state.write().unwrap_or_else(PoisonError::into_inner);
            let mut state = BoardState::clone(&guard);
            patch.apply_to(&mut state);
            let next = Arc::new(state);
            *guard = Arc::clone(&next);
            next
        };

        let notifications: Vec<Notification> = {
            let mut watchers = self.watchers.lock().unwrap_or_else(PoisonError::into_inner);
            watchers
                .iter_mut()
                .filter_map(|(_, watcher)| watcher.poll(&next))
                .collect()
        };

        trace!(notified = notifications.len(), "store state replaced");
        for notify in notifications {
            notify();
        }
    }

    /// Watch the slice returned by `selector`; `callback` runs each time the
    /// slice is replaced.
    pub fn subscribe<T, S, F>(&self, selector: S, callback: F) -> SubscriptionId
    where
        T: Identity,
        S: Fn(&BoardState) -> T + Send + 'static,
        F: Fn(&T) + Send + Sync + 'static,
    {
        let last = selector(&self.read());
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let watch = Watch {
            selector,
            last,
            callback: Arc::new(callback),
        };
        self.watchers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, Box::new(watch)));
        id
    }

    /// Stop a subscription. Returns false when the id was unknown.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut watchers = self.watchers.lock().unwrap_or_else(PoisonError::into_inner);
        let before = watchers.len();
        watchers.retain(|(watch_id, _)| *watch_id != id);
        watchers.len() != before
    }

    /// Drop every subscription
    pub fn clear_subscriptions(&self) {
        self.watchers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    pub fn subscription_count(&self) -> usize {
        self.watchers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl Default for SnapshotStore {
    fn default() -> Self {
        Self::new(BoardState::default())
    }
}
