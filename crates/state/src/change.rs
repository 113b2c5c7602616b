use std::sync::Arc;

use chrono::{DateTime, Utc};

use permgate_events::Event;

use crate::{AuthState, TransitionKind};

/// Published on the store's channel after every state replacement.
///
/// Carries the new snapshot so channel consumers never need to race a
/// `get_state()` call against the next dispatch.
#[derive(Debug, Clone)]
pub struct StateChanged {
    pub revision: u64,
    pub transition: TransitionKind,
    pub state: Arc<AuthState>,
    pub occurred_at: DateTime<Utc>,
}

impl Event for StateChanged {
    fn event_type(&self) -> &'static str {
        match self.transition {
            TransitionKind::Login => "auth.state.logged_in",
            TransitionKind::Logout => "auth.state.logged_out",
            TransitionKind::Unknown => "auth.state.changed",
        }
    }

    fn revision(&self) -> u64 {
        self.revision
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Store, actions};

    #[test]
    fn events_are_named_after_the_transition() {
        let store = Store::create();
        let changes = store.changes();

        store.dispatch(actions::login()).unwrap();
        store.dispatch(actions::logout()).unwrap();

        let types: Vec<&str> = changes.drain().iter().map(|c| c.event_type()).collect();
        assert_eq!(types, vec!["auth.state.logged_in", "auth.state.logged_out"]);
    }

    #[test]
    fn revision_and_time_come_from_the_dispatch() {
        let before = Utc::now();
        let store = Store::create();
        let changes = store.changes();

        store.dispatch(actions::login()).unwrap();

        let change = changes.recv().unwrap();
        assert_eq!(Event::revision(&change), store.revision());
        assert!(change.occurred_at() >= before);
    }
}
