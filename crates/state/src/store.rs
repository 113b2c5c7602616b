//! The auth state container.
//!
//! One `Store` owns one `AuthState` snapshot and two ways of hearing about
//! replacements:
//!
//! - **listeners** (`subscribe`) run synchronously inside `dispatch`, before it
//!   returns. Derived state (the permission engine) hooks in here so it is
//!   rebuilt before anyone can read it again.
//! - **the change channel** (`changes`) receives a [`StateChanged`] after the
//!   listeners ran. Views drain it to know when to re-render.
//!
//! Writers are serialised by a dispatch lock; readers never wait on it and
//! always get a complete snapshot (`Arc<AuthState>` swapped as a whole).

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::thread::{self, ThreadId};

use chrono::Utc;
use thiserror::Error;

use permgate_events::{EventBus, InMemoryEventBus, Subscription};

use crate::{AuthState, Reduced, StateChanged, Transition, reduce};

/// Callback invoked with the new snapshot after each state replacement.
pub type Listener = Arc<dyn Fn(&AuthState) + Send + Sync>;

/// Handle returned by [`Store::subscribe`], used to unsubscribe.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("store has been disposed")]
    Disposed,

    #[error("dispatch called from inside a store listener")]
    Reentrant,

    #[error("store lock poisoned by a panicking listener")]
    Poisoned,
}

/// What a dispatch did.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Dispatched {
    /// State was replaced; listeners ran and a change was published.
    Changed { revision: u64 },
    /// The transition was not recognised; nothing happened.
    Unchanged,
}

pub struct Store {
    state: RwLock<Arc<AuthState>>,
    revision: AtomicU64,
    listeners: Mutex<Vec<(ListenerId, Listener)>>,
    next_listener: AtomicU64,
    dispatch_lock: Mutex<()>,
    dispatching: Mutex<Option<ThreadId>>,
    bus: InMemoryEventBus<StateChanged>,
    disposed: AtomicBool,
}

impl core::fmt::Debug for Store {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Store")
            .field("state", &self.get_state())
            .field("revision", &self.revision())
            .field("listeners", &self.listener_count())
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

impl Store {
    /// Create a logged-out store.
    pub fn create() -> Arc<Self> {
        Arc::new(Self {
            state: RwLock::new(Arc::new(AuthState::empty())),
            revision: AtomicU64::new(0),
            listeners: Mutex::new(Vec::new()),
            next_listener: AtomicU64::new(0),
            dispatch_lock: Mutex::new(()),
            dispatching: Mutex::new(None),
            bus: InMemoryEventBus::new(),
            disposed: AtomicBool::new(false),
        })
    }

    /// Tear the store down: drop all listeners, disconnect change channels
    /// and refuse further dispatches. Calling it again is a no-op.
    ///
    /// A dispatch already past its disposed check still completes.
    pub fn dispose(&self) {
        if self.disposed.swap(true, Ordering::SeqCst) {
            return;
        }

        let dropped = {
            let mut listeners = self.listeners.lock().unwrap_or_else(PoisonError::into_inner);
            let n = listeners.len();
            listeners.clear();
            n
        };
        self.bus.close();

        tracing::debug!(listeners = dropped, "auth store disposed");
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::SeqCst)
    }

    /// Current snapshot. Cheap: clones an `Arc`.
    pub fn get_state(&self) -> Arc<AuthState> {
        let guard = self.state.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    /// Number of state replacements so far.
    pub fn revision(&self) -> u64 {
        self.revision.load(Ordering::SeqCst)
    }

    /// Register a listener. It runs on the dispatching thread, in
    /// registration order, after every state replacement.
    ///
    /// Listeners must not dispatch; such calls fail with
    /// [`StoreError::Reentrant`]. A disposed store refuses new listeners.
    pub fn subscribe<F>(&self, listener: F) -> Result<ListenerId, StoreError>
    where
        F: Fn(&AuthState) + Send + Sync + 'static,
    {
        // Checked under the listener lock so a concurrent `dispose` cannot
        // clear the list between the check and the push.
        let mut listeners = self.listeners.lock().unwrap_or_else(PoisonError::into_inner);
        if self.is_disposed() {
            return Err(StoreError::Disposed);
        }

        let id = ListenerId(self.next_listener.fetch_add(1, Ordering::SeqCst));
        listeners.push((id, Arc::new(listener)));
        Ok(id)
    }

    /// Like [`Store::subscribe`], but first calls `listener` with the current
    /// state. Both steps happen under the dispatch lock, so no replacement can
    /// slip in between the replay and the registration.
    pub fn observe<F>(&self, listener: F) -> Result<ListenerId, StoreError>
    where
        F: Fn(&AuthState) + Send + Sync + 'static,
    {
        if self.is_disposed() {
            return Err(StoreError::Disposed);
        }

        let me = thread::current().id();
        if *self.dispatching.lock().map_err(|_| StoreError::Poisoned)? == Some(me) {
            return Err(StoreError::Reentrant);
        }

        let _serial = self.dispatch_lock.lock().map_err(|_| StoreError::Poisoned)?;
        let _owner = DispatchOwner::enter(&self.dispatching, me)?;
        listener(&*self.get_state());
        self.subscribe(listener)
    }

    /// Remove a listener. Returns `false` if it was not registered.
    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.lock().unwrap_or_else(PoisonError::into_inner);
        let before = listeners.len();
        listeners.retain(|(lid, _)| *lid != id);
        listeners.len() != before
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Open a change channel. Only changes dispatched after this call are
    /// delivered; the channel disconnects when the store is disposed.
    pub fn changes(&self) -> Subscription<StateChanged> {
        self.bus.subscribe()
    }

    /// Apply a transition.
    pub fn dispatch(&self, transition: Transition) -> Result<Dispatched, StoreError> {
        if self.is_disposed() {
            return Err(StoreError::Disposed);
        }

        let me = thread::current().id();
        if *self.dispatching.lock().map_err(|_| StoreError::Poisoned)? == Some(me) {
            return Err(StoreError::Reentrant);
        }

        let _serial = self.dispatch_lock.lock().map_err(|_| StoreError::Poisoned)?;
        let _owner = DispatchOwner::enter(&self.dispatching, me)?;

        let kind = transition.kind();
        let current = self.get_state();

        let next = match reduce(&current, &transition) {
            Reduced::Unchanged => {
                tracing::debug!(transition = %kind, "transition ignored");
                return Ok(Dispatched::Unchanged);
            }
            Reduced::Replaced(next) => Arc::new(next),
        };

        {
            let mut slot = self.state.write().map_err(|_| StoreError::Poisoned)?;
            *slot = Arc::clone(&next);
        }
        let revision = self.revision.fetch_add(1, Ordering::SeqCst) + 1;

        let listeners: Vec<Listener> = self
            .listeners
            .lock()
            .map_err(|_| StoreError::Poisoned)?
            .iter()
            .map(|(_, l)| Arc::clone(l))
            .collect();

        tracing::debug!(
            transition = %kind,
            revision,
            authenticated = next.is_authenticated(),
            listeners = listeners.len(),
            "auth state replaced"
        );

        for listener in &listeners {
            listener(&*next);
        }

        let change = StateChanged {
            revision,
            transition: kind,
            state: next,
            occurred_at: Utc::now(),
        };
        if let Err(err) = self.bus.publish(change) {
            tracing::warn!(?err, revision, "state change not published");
        }

        Ok(Dispatched::Changed { revision })
    }
}

/// Marks the current thread as the dispatcher for the guard's lifetime.
struct DispatchOwner<'a> {
    slot: &'a Mutex<Option<ThreadId>>,
}

impl<'a> DispatchOwner<'a> {
    fn enter(slot: &'a Mutex<Option<ThreadId>>, me: ThreadId) -> Result<Self, StoreError> {
        *slot.lock().map_err(|_| StoreError::Poisoned)? = Some(me);
        Ok(Self { slot })
    }
}

impl Drop for DispatchOwner<'_> {
    fn drop(&mut self) {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}
