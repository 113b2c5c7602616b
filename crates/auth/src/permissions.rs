use std::borrow::{Borrow, Cow};

use serde::{Deserialize, Serialize};

/// The verb half of a rule (e.g. "add").
///
/// Opaque string: no hierarchy, no wildcard. `"manage"` is just another verb.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Action(Cow<'static, str>);

/// The object half of a rule (e.g. "users").
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Subject(Cow<'static, str>);

macro_rules! impl_name_newtype {
    ($t:ty) => {
        impl $t {
            pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
                Self(name.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        // Lets rule sets be probed with `&str` without allocating.
        impl Borrow<str> for $t {
            fn borrow(&self) -> &str {
                &self.0
            }
        }
    };
}

impl_name_newtype!(Action);
impl_name_newtype!(Subject);

/// One allowed `(action, subject)` pair.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Rule {
    pub action: Action,
    pub subject: Subject,
}

impl Rule {
    pub fn new(
        action: impl Into<Cow<'static, str>>,
        subject: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self {
            action: Action::new(action),
            subject: Subject::new(subject),
        }
    }
}

impl core::fmt::Display for Rule {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}:{}", self.action, self.subject)
    }
}
