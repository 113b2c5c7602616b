use serde::Serialize;
use thiserror::Error;

use crate::RuleSet;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("forbidden: cannot '{action}' on '{subject}'")]
    Forbidden { action: String, subject: String },
}

/// Check a single `(action, subject)` pair against a rule set.
///
/// - No IO
/// - No panics
/// - Fail-closed: an empty rule set denies everything
pub fn authorize(rules: &RuleSet, action: &str, subject: &str) -> Result<(), AuthzError> {
    if rules.contains(action, subject) {
        Ok(())
    } else {
        Err(AuthzError::Forbidden {
            action: action.to_string(),
            subject: subject.to_string(),
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Authorization Explanation (Audit Trail)
// ─────────────────────────────────────────────────────────────────────────────

/// Detailed explanation of an authorization decision.
#[derive(Debug, Clone, Serialize)]
pub struct AuthorizationExplanation {
    pub action: String,
    pub subject: String,

    /// Whether the pair is allowed.
    pub granted: bool,

    /// Human-readable reason for the decision.
    pub reason: String,

    /// Every rule in force when the decision was made, as "action:subject".
    pub effective_rules: Vec<String>,

    /// If denied, this explains what was missing.
    pub denial_reason: Option<DenialReason>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DenialReason {
    pub kind: DenialKind,
    pub message: String,
    pub suggestions: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DenialKind {
    /// Nothing is granted at all (logged out, or no usable permission codes).
    NoRules,
    MissingRule,
}

/// Explain why `(action, subject)` is allowed or denied by `rules`.
pub fn explain_authorization(rules: &RuleSet, action: &str, subject: &str) -> AuthorizationExplanation {
    let effective_rules: Vec<String> = rules.rules().iter().map(|r| r.to_string()).collect();

    if rules.contains(action, subject) {
        return AuthorizationExplanation {
            action: action.to_string(),
            subject: subject.to_string(),
            granted: true,
            reason: format!("Rule '{}:{}' is present", action, subject),
            effective_rules,
            denial_reason: None,
        };
    }

    if rules.is_empty() {
        return AuthorizationExplanation {
            action: action.to_string(),
            subject: subject.to_string(),
            granted: false,
            reason: "No rules are in force".to_string(),
            effective_rules,
            denial_reason: Some(DenialReason {
                kind: DenialKind::NoRules,
                message: "The principal is logged out or none of its permission codes could be mapped"
                    .to_string(),
                suggestions: vec![
                    "Log in before checking permissions".to_string(),
                    "Check the rebuild report for rejected permission codes".to_string(),
                ],
            }),
        };
    }

    let mut suggestions = Vec::new();

    let subjects = rules.subjects_for(action);
    if !subjects.is_empty() {
        let names: Vec<&str> = subjects.iter().map(|s| s.as_str()).collect();
        suggestions.push(format!("'{}' is granted on other subjects: {:?}", action, names));
    }

    let actions = rules.actions_for(subject);
    if !actions.is_empty() {
        let names: Vec<&str> = actions.iter().map(|a| a.as_str()).collect();
        suggestions.push(format!("'{}' allows other actions: {:?}", subject, names));
    }

    suggestions.push(format!(
        "Grant a permission code that maps to '{}:{}'",
        action, subject
    ));

    AuthorizationExplanation {
        action: action.to_string(),
        subject: subject.to_string(),
        granted: false,
        reason: format!(
            "No rule '{}:{}'. Current rules: {:?}",
            action, subject, effective_rules
        ),
        effective_rules,
        denial_reason: Some(DenialReason {
            kind: DenialKind::MissingRule,
            message: format!("Missing rule: '{}:{}'", action, subject),
            suggestions,
        }),
    }
}
