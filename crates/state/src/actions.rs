//! Transition constructors.
//!
//! `login()` stands in for the identity round-trip: it resolves immediately
//! to a fixed demo principal. Callers with a real identity provider build the
//! payload themselves and use [`login_as`] or [`login_from_json`].

use permgate_core::{DomainError, DomainResult, PrincipalId};

use crate::{AuthState, Transition};

/// Permission codes granted to the demo principal.
pub const DEMO_PERMISSIONS: [&str; 2] = ["add_users", "delete_users"];

pub fn login() -> Transition {
    login_as(AuthState {
        id: Some(PrincipalId::new(1)),
        name: Some("Youssef".to_string()),
        permissions: Some(DEMO_PERMISSIONS.iter().map(|p| p.to_string()).collect()),
    })
}

pub fn login_as(payload: AuthState) -> Transition {
    Transition::Login(payload)
}

/// Parse a login payload as received from an identity endpoint.
pub fn login_from_json(payload: &str) -> DomainResult<Transition> {
    let state: AuthState = serde_json::from_str(payload)
        .map_err(|e| DomainError::validation(format!("login payload: {}", e)))?;
    Ok(login_as(state))
}

pub fn logout() -> Transition {
    Transition::Logout
}
