//! The permission engine.
//!
//! An `Ability` owns the current [`RuleSet`] and answers `can(action, subject)`.
//! When attached to a [`Store`] it rebuilds the set from scratch on every
//! state replacement, inside the store's dispatch, so the new rules are in
//! place before `dispatch` returns.
//!
//! Publication is swap-the-reference: readers either hold the old
//! `Arc<RuleSet>` or the new one, never a half-built set.

use std::sync::{Arc, Mutex, PoisonError, RwLock, Weak};

use permgate_state::{AuthState, ListenerId, Store, StoreError};

use crate::authorize::{AuthorizationExplanation, AuthzError, authorize, explain_authorization};
use crate::{RebuildReport, RuleMapping, RuleSet};

pub struct Ability {
    current: RwLock<Rebuilt>,
    mapping: Box<dyn RuleMapping>,
    attachment: Mutex<Option<(Weak<Store>, ListenerId)>>,
}

/// A rule set and the report of the rebuild that produced it, published
/// together.
struct Rebuilt {
    rules: Arc<RuleSet>,
    report: RebuildReport,
}

impl core::fmt::Debug for Ability {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Ability")
            .field("mapping", &self.mapping.name())
            .field("rules", &self.snapshot().len())
            .field("attached", &self.is_attached())
            .finish()
    }
}

impl Ability {
    /// A detached ability with no rules (denies everything).
    pub fn new(mapping: impl RuleMapping + 'static) -> Self {
        Self {
            current: RwLock::new(Rebuilt {
                rules: Arc::new(RuleSet::empty()),
                report: RebuildReport::default(),
            }),
            mapping: Box::new(mapping),
            attachment: Mutex::new(None),
        }
    }

    /// Create an ability that tracks `store`.
    ///
    /// The rule set is built from the store's current state and rebuilt after
    /// every dispatch that replaces it. The store only keeps a weak reference:
    /// dropping the last `Arc<Ability>` detaches it.
    pub fn attach(
        store: &Arc<Store>,
        mapping: impl RuleMapping + 'static,
    ) -> Result<Arc<Self>, StoreError> {
        let ability = Arc::new(Self::new(mapping));

        let weak = Arc::downgrade(&ability);
        let id = store.observe(move |state| {
            if let Some(ability) = weak.upgrade() {
                ability.update(state);
            }
        })?;

        *ability.attachment.lock().unwrap_or_else(PoisonError::into_inner) =
            Some((Arc::downgrade(store), id));

        tracing::debug!(mapping = ability.mapping.name(), "ability attached to auth store");
        Ok(ability)
    }

    /// Stop following the store. The current rules stay in force.
    ///
    /// Returns `false` if the ability was not attached (or the store is gone).
    pub fn detach(&self) -> bool {
        let attachment = self
            .attachment
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        match attachment.and_then(|(store, id)| store.upgrade().map(|s| (s, id))) {
            Some((store, id)) => store.unsubscribe(id),
            None => false,
        }
    }

    pub fn is_attached(&self) -> bool {
        self.attachment
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|(store, _)| store.strong_count() > 0)
    }

    /// Rebuild the rule set from `state` and swap it in.
    ///
    /// Absent or empty permissions give an empty set.
    pub fn update(&self, state: &AuthState) -> RebuildReport {
        let codes = state.permission_codes().iter().map(String::as_str);
        let (rules, report) = RuleSet::build(codes, &*self.mapping);

        let next = Rebuilt {
            rules: Arc::new(rules),
            report: report.clone(),
        };

        // The old set is released outside the write lock.
        let previous = {
            let mut slot = self.current.write().unwrap_or_else(PoisonError::into_inner);
            std::mem::replace(&mut *slot, next)
        };
        drop(previous);

        tracing::debug!(
            mapping = self.mapping.name(),
            codes = report.codes,
            rules = report.rules,
            rejected = report.rejected.len(),
            "rule set rebuilt"
        );

        report
    }

    /// Is `action` allowed on `subject`? Exact match only.
    pub fn can(&self, action: &str, subject: &str) -> bool {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .rules
            .contains(action, subject)
    }

    pub fn cannot(&self, action: &str, subject: &str) -> bool {
        !self.can(action, subject)
    }

    /// The rule set currently in force. Use it when several checks must agree
    /// with each other even if a rebuild happens in between.
    pub fn snapshot(&self) -> Arc<RuleSet> {
        Arc::clone(&self.current.read().unwrap_or_else(PoisonError::into_inner).rules)
    }

    /// The rule set in force together with the report of the rebuild that
    /// produced it.
    pub fn rebuilt(&self) -> (Arc<RuleSet>, RebuildReport) {
        let current = self.current.read().unwrap_or_else(PoisonError::into_inner);
        (Arc::clone(&current.rules), current.report.clone())
    }

    pub fn authorize(&self, action: &str, subject: &str) -> Result<(), AuthzError> {
        authorize(&self.snapshot(), action, subject)
    }

    pub fn explain(&self, action: &str, subject: &str) -> AuthorizationExplanation {
        explain_authorization(&self.snapshot(), action, subject)
    }

    /// Report of the most recent rebuild.
    pub fn last_rebuild(&self) -> RebuildReport {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .report
            .clone()
    }

    pub fn mapping_name(&self) -> &'static str {
        self.mapping.name()
    }
}

impl Drop for Ability {
    fn drop(&mut self) {
        self.detach();
    }
}

#[cfg(test)]
mod tests {
    use permgate_state::actions;

    use super::*;
    use crate::SplitCodes;

    #[test]
    fn detached_ability_denies_everything() {
        let ability = Ability::new(SplitCodes::strict());
        assert!(ability.cannot("add", "users"));
        assert!(ability.snapshot().is_empty());
        assert!(!ability.is_attached());
    }

    #[test]
    fn update_replaces_rules_wholesale() {
        let ability = Ability::new(SplitCodes::strict());
        let before = ability.snapshot();

        ability.update(&AuthState {
            permissions: Some(vec!["add_users".to_string()]),
            ..AuthState::default()
        });
        assert!(ability.can("add", "users"));
        assert!(before.is_empty());

        ability.update(&AuthState {
            permissions: Some(vec!["delete_users".to_string()]),
            ..AuthState::default()
        });
        assert!(ability.cannot("add", "users"));
        assert!(ability.can("delete", "users"));
    }

    #[test]
    fn attach_builds_from_current_state() {
        let store = Store::create();
        store.dispatch(actions::login()).unwrap();

        let ability = Ability::attach(&store, SplitCodes::strict()).unwrap();
        assert!(ability.can("add", "users"));
        assert!(ability.is_attached());
    }

    #[test]
    fn detach_freezes_rules() {
        let store = Store::create();
        let ability = Ability::attach(&store, SplitCodes::strict()).unwrap();
        store.dispatch(actions::login()).unwrap();

        assert!(ability.detach());
        assert!(!ability.detach());
        store.dispatch(actions::logout()).unwrap();

        assert!(ability.can("add", "users"));
        assert_eq!(store.listener_count(), 0);
    }

    #[test]
    fn dropping_the_ability_unsubscribes() {
        let store = Store::create();
        let ability = Ability::attach(&store, SplitCodes::strict()).unwrap();
        assert_eq!(store.listener_count(), 1);

        drop(ability);
        assert_eq!(store.listener_count(), 0);
        store.dispatch(actions::login()).unwrap();
    }

    #[test]
    fn attach_to_disposed_store_fails() {
        let store = Store::create();
        store.dispose();
        let err = Ability::attach(&store, SplitCodes::strict()).unwrap_err();
        assert_eq!(err, StoreError::Disposed);
    }

    #[test]
    fn last_rebuild_reports_rejections() {
        let store = Store::create();
        let ability = Ability::attach(&store, SplitCodes::strict()).unwrap();

        store
            .dispatch(actions::login_as(AuthState {
                permissions: Some(vec!["add_users".to_string(), "admin".to_string()]),
                ..AuthState::default()
            }))
            .unwrap();

        let report = ability.last_rebuild();
        assert_eq!(report.rules, 1);
        assert_eq!(report.rejected.len(), 1);
    }

    #[test]
    fn rules_and_report_are_published_together() {
        let ability = Arc::new(Ability::new(SplitCodes::strict()));
        let one = AuthState {
            permissions: Some(vec!["add_users".to_string()]),
            ..AuthState::default()
        };
        let three = AuthState {
            permissions: Some(vec![
                "add_users".to_string(),
                "delete_users".to_string(),
                "edit_users".to_string(),
            ]),
            ..AuthState::default()
        };

        let reader = {
            let ability = Arc::clone(&ability);
            std::thread::spawn(move || {
                for _ in 0..2_000 {
                    let (rules, report) = ability.rebuilt();
                    assert_eq!(report.rules, rules.len());
                }
            })
        };

        for i in 0..500 {
            ability.update(if i % 2 == 0 { &one } else { &three });
        }
        reader.join().unwrap();
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 200,
                ..ProptestConfig::default()
            })]

            /// Property: after a logout nothing is allowed, whatever was granted before.
            #[test]
            fn logout_denies_everything(
                codes in prop::collection::vec("[a-z_]{0,10}", 0..12),
                action in "[a-z]{0,6}",
                subject in "[a-z]{0,6}"
            ) {
                let store = Store::create();
                let ability = Ability::attach(&store, SplitCodes::lenient()).unwrap();

                store
                    .dispatch(actions::login_as(AuthState {
                        permissions: Some(codes),
                        ..AuthState::default()
                    }))
                    .unwrap();
                store.dispatch(actions::logout()).unwrap();

                prop_assert!(ability.snapshot().is_empty());
                prop_assert!(ability.cannot(&action, &subject));
                prop_assert!(ability.cannot("", ""));
                prop_assert!(ability.cannot(&action, ""));
            }
        }
    }
}
