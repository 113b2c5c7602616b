//! Startup configuration, read once from the environment.

use permgate_auth::{RuleMapping, SplitCodes};
use permgate_state::{Transition, actions};

pub const MAPPING_ENV: &str = "PERMGATE_MAPPING";
pub const LOGIN_JSON_ENV: &str = "PERMGATE_LOGIN_JSON";

/// Which permission-code interpretation to run with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MappingChoice {
    #[default]
    Split,
    SplitLenient,
}

impl MappingChoice {
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim() {
            "split" => Some(MappingChoice::Split),
            "split-lenient" => Some(MappingChoice::SplitLenient),
            _ => None,
        }
    }

    pub fn build(&self) -> Box<dyn RuleMapping> {
        match self {
            MappingChoice::Split => Box::new(SplitCodes::strict()),
            MappingChoice::SplitLenient => Box::new(SplitCodes::lenient()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DemoConfig {
    pub mapping: MappingChoice,
    /// Transition fired by the "Login" button.
    pub login: Transition,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            mapping: MappingChoice::default(),
            login: actions::login(),
        }
    }
}

impl DemoConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Bad values are logged and replaced
    /// by the defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(raw) = lookup(MAPPING_ENV) {
            match MappingChoice::parse(&raw) {
                Some(choice) => config.mapping = choice,
                None => tracing::warn!(value = %raw, "unknown {}; using split", MAPPING_ENV),
            }
        }

        if let Some(raw) = lookup(LOGIN_JSON_ENV) {
            match actions::login_from_json(&raw) {
                Ok(login) => config.login = login,
                Err(err) => tracing::warn!(%err, "bad {}; using the demo principal", LOGIN_JSON_ENV),
            }
        }

        config
    }
}
