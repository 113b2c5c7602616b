//! Permission code → rule strategies.
//!
//! How an identity provider encodes grants is its own business: some send
//! `"<action>_<subject>"` strings, some numeric codes, some role names. The
//! engine never assumes one; it is handed a [`RuleMapping`] at construction.
//!
//! A code that a mapping cannot interpret is reported as a [`CodeError`] and
//! grants nothing.

use std::collections::HashMap;

use thiserror::Error;

use crate::{Role, Rule};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodeError {
    #[error("permission code '{0}' has no '_' separator")]
    MissingSeparator(String),

    #[error("permission code '{0}' has an empty action or subject")]
    EmptySegment(String),

    #[error("permission code '{0}' has more than two segments")]
    ExtraSegments(String),

    #[error("permission code '{0}' is not numeric")]
    NotNumeric(String),

    #[error("permission code '{0}' is not mapped to any rule")]
    Unknown(String),
}

impl CodeError {
    /// The offending code.
    pub fn code(&self) -> &str {
        match self {
            CodeError::MissingSeparator(c)
            | CodeError::EmptySegment(c)
            | CodeError::ExtraSegments(c)
            | CodeError::NotNumeric(c)
            | CodeError::Unknown(c) => c,
        }
    }
}

/// Turns one permission code into the rules it grants.
pub trait RuleMapping: Send + Sync {
    /// Short name for logs (e.g. "split").
    fn name(&self) -> &'static str;

    fn rules_for(&self, code: &str) -> Result<Vec<Rule>, CodeError>;
}

impl<M> RuleMapping for Box<M>
where
    M: RuleMapping + ?Sized,
{
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn rules_for(&self, code: &str) -> Result<Vec<Rule>, CodeError> {
        (**self).rules_for(code)
    }
}

/// `"<action>_<subject>"` codes.
///
/// Strict mode (the default) accepts exactly two non-empty segments. Lenient
/// mode takes the first segment as the action and the second as the subject
/// no matter what: `"admin"` grants `(admin, "")` and `"a_b_c"` grants `(a, b)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitCodes {
    strict: bool,
}

impl SplitCodes {
    pub const SEPARATOR: char = '_';

    pub fn strict() -> Self {
        Self { strict: true }
    }

    pub fn lenient() -> Self {
        Self { strict: false }
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }
}

impl Default for SplitCodes {
    fn default() -> Self {
        Self::strict()
    }
}

impl RuleMapping for SplitCodes {
    fn name(&self) -> &'static str {
        if self.strict { "split" } else { "split-lenient" }
    }

    fn rules_for(&self, code: &str) -> Result<Vec<Rule>, CodeError> {
        let mut parts = code.split(Self::SEPARATOR);
        let action = parts.next().unwrap_or_default();
        let subject = parts.next();

        if !self.strict {
            let rule = Rule::new(action.to_string(), subject.unwrap_or_default().to_string());
            return Ok(vec![rule]);
        }

        let Some(subject) = subject else {
            return Err(CodeError::MissingSeparator(code.to_string()));
        };
        if action.is_empty() || subject.is_empty() {
            return Err(CodeError::EmptySegment(code.to_string()));
        }
        if parts.next().is_some() {
            return Err(CodeError::ExtraSegments(code.to_string()));
        }

        Ok(vec![Rule::new(action.to_string(), subject.to_string())])
    }
}

/// Numeric codes looked up in a fixed table (e.g. `"17"` → `(add, users)`).
#[derive(Debug, Clone, Default)]
pub struct NumericCodes {
    table: HashMap<u32, Rule>,
}

impl NumericCodes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, code: u32, rule: Rule) -> Self {
        self.table.insert(code, rule);
        self
    }
}

impl RuleMapping for NumericCodes {
    fn name(&self) -> &'static str {
        "numeric"
    }

    fn rules_for(&self, code: &str) -> Result<Vec<Rule>, CodeError> {
        let n: u32 = code
            .trim()
            .parse()
            .map_err(|_| CodeError::NotNumeric(code.to_string()))?;

        self.table
            .get(&n)
            .map(|rule| vec![rule.clone()])
            .ok_or_else(|| CodeError::Unknown(code.to_string()))
    }
}

/// Role names expanded to the rules each role carries.
#[derive(Debug, Clone, Default)]
pub struct RoleNames {
    roles: HashMap<Role, Vec<Rule>>,
}

impl RoleNames {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn grant(mut self, role: Role, rules: impl IntoIterator<Item = Rule>) -> Self {
        self.roles.entry(role).or_default().extend(rules);
        self
    }
}

impl RuleMapping for RoleNames {
    fn name(&self) -> &'static str {
        "role"
    }

    fn rules_for(&self, code: &str) -> Result<Vec<Rule>, CodeError> {
        self.roles
            .get(code)
            .cloned()
            .ok_or_else(|| CodeError::Unknown(code.to_string()))
    }
}
