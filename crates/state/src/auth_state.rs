use serde::{Deserialize, Serialize};

use permgate_core::PrincipalId;

/// The currently authenticated principal, or the absence of one.
///
/// Logged out is the empty record: every field is `None`. A state is only
/// ever replaced as a whole by the reducer, never edited in place, which is
/// why the store hands it out behind an `Arc`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<PrincipalId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Permission codes as issued by the identity provider (e.g. "add_users").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permissions: Option<Vec<String>>,
}

impl AuthState {
    /// The logged-out state.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_authenticated(&self) -> bool {
        self.id.is_some() || self.name.is_some() || self.permissions.is_some()
    }

    /// Permission codes, or an empty slice when none were granted.
    pub fn permission_codes(&self) -> &[String] {
        self.permissions.as_deref().unwrap_or(&[])
    }

    /// Overlay `payload` on top of `self`: fields present in the payload win,
    /// absent ones keep their previous value.
    pub fn merged_with(&self, payload: &AuthState) -> AuthState {
        AuthState {
            id: payload.id.or(self.id),
            name: payload.name.clone().or_else(|| self.name.clone()),
            permissions: payload
                .permissions
                .clone()
                .or_else(|| self.permissions.clone()),
        }
    }
}
