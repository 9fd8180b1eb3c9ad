//! Keys and object identifiers.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// A project, plan or job key, e.g. `PLAYG` or `JOB1`.
///
/// The inner field is private so a `Key` is always syntactically valid:
/// an uppercase ASCII letter followed by uppercase letters or digits.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Key(String);

impl Key {
    /// Longest key accepted.
    pub const MAX_LEN: usize = 32;

    pub fn new(key: &str) -> Result<Self, ValidationError> {
        Self::try_from(key.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Key {
    type Error = ValidationError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        let invalid = |reason: &str| ValidationError::InvalidKey {
            key: s.clone(),
            reason: reason.to_string(),
        };

        let mut chars = s.chars();
        match chars.next() {
            None => return Err(invalid("must not be empty")),
            Some(c) if !c.is_ascii_uppercase() => {
                return Err(invalid("must start with an uppercase letter"))
            }
            Some(_) => {}
        }
        if s.len() > Self::MAX_LEN {
            return Err(invalid(&format!("longer than {} characters", Self::MAX_LEN)));
        }
        if !chars.all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()) {
            return Err(invalid("only uppercase letters and digits are allowed"));
        }
        Ok(Key(s))
    }
}

impl From<Key> for String {
    fn from(key: Key) -> Self {
        key.0
    }
}

impl std::fmt::Display for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Stable object identifier assigned to a plan or project (lowercase base-36).
///
/// Republishing with the same oid updates the existing record in place.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Oid(String);

impl Oid {
    /// A 64-bit identifier never needs more than 13 base-36 digits.
    pub const MAX_LEN: usize = 13;

    pub fn new(oid: &str) -> Result<Self, ValidationError> {
        Self::try_from(oid.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Oid {
    type Error = ValidationError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        let reason = if s.is_empty() {
            Some("must not be empty".to_string())
        } else if s.len() > Self::MAX_LEN {
            Some(format!("longer than {} characters", Self::MAX_LEN))
        } else if !s
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        {
            Some("only lowercase letters and digits are allowed".to_string())
        } else {
            None
        };

        match reason {
            Some(reason) => Err(ValidationError::InvalidOid { oid: s, reason }),
            None => Ok(Oid(s)),
        }
    }
}

impl From<Oid> for String {
    fn from(oid: Oid) -> Self {
        oid.0
    }
}

impl std::fmt::Display for Oid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
