use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

use crate::AuthState;

/// A request to change the auth state.
///
/// Wire form mirrors what an identity endpoint or a UI hands over:
/// `{"type": "LOGIN", "payload": {...}}` and `{"type": "LOGOUT"}`. Any other
/// `type` deserializes to [`Transition::Unknown`], which the reducer ignores,
/// whatever payload it carries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Transition {
    Login(AuthState),
    Logout,
    Unknown,
}

#[derive(Deserialize)]
struct WireTransition {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    payload: Option<serde_json::Value>,
}

impl<'de> Deserialize<'de> for Transition {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let wire = WireTransition::deserialize(deserializer)?;
        match wire.kind.as_str() {
            "LOGIN" => {
                let payload = wire.payload.ok_or_else(|| de::Error::missing_field("payload"))?;
                AuthState::deserialize(payload)
                    .map(Transition::Login)
                    .map_err(de::Error::custom)
            }
            "LOGOUT" => Ok(Transition::Logout),
            _ => Ok(Transition::Unknown),
        }
    }
}

impl Transition {
    pub fn kind(&self) -> TransitionKind {
        match self {
            Transition::Login(_) => TransitionKind::Login,
            Transition::Logout => TransitionKind::Logout,
            Transition::Unknown => TransitionKind::Unknown,
        }
    }
}

/// Payload-free tag of a [`Transition`], carried by change notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransitionKind {
    Login,
    Logout,
    Unknown,
}

impl core::fmt::Display for TransitionKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            TransitionKind::Login => write!(f, "LOGIN"),
            TransitionKind::Logout => write!(f, "LOGOUT"),
            TransitionKind::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// Outcome of running the reducer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reduced {
    /// A new state replaces the old one (even when the contents are equal).
    Replaced(AuthState),
    /// Identity: the previous state stays current.
    Unchanged,
}

/// The pure auth reducer.
///
/// - `Login` overlays the payload on the previous state.
/// - `Logout` resets to the empty record.
/// - anything else leaves the state alone.
pub fn reduce(state: &AuthState, transition: &Transition) -> Reduced {
    match transition {
        Transition::Login(payload) => Reduced::Replaced(state.merged_with(payload)),
        Transition::Logout => Reduced::Replaced(AuthState::empty()),
        Transition::Unknown => Reduced::Unchanged,
    }
}
