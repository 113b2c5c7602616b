//! `permgate-auth` — the permission engine.
//!
//! Derives `(action, subject)` rules from a principal's permission codes and
//! answers `can(action, subject)`. Decoupled from any UI: views call
//! [`Ability::can`] at render time and re-render on store notifications.

pub mod ability;
pub mod authorize;
pub mod mapping;
pub mod permissions;
pub mod roles;
pub mod rule_set;

pub use ability::Ability;
pub use authorize::{
    AuthorizationExplanation, AuthzError, DenialKind, DenialReason, authorize, explain_authorization,
};
pub use mapping::{CodeError, NumericCodes, RoleNames, RuleMapping, SplitCodes};
pub use permissions::{Action, Rule, Subject};
pub use roles::Role;
pub use rule_set::{RebuildReport, RuleSet};
