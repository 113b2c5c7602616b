//! `permgate-state` — the auth state store.
//!
//! Holds the current principal, applies login/logout transitions through a
//! pure reducer and tells observers about every replacement.

pub mod actions;
pub mod auth_state;
pub mod change;
pub mod store;
pub mod transition;

pub use auth_state::AuthState;
pub use change::StateChanged;
pub use store::{Dispatched, Listener, ListenerId, Store, StoreError};
pub use transition::{Reduced, Transition, TransitionKind, reduce};
