use std::{
    borrow::Borrow,
    fmt,
    hash::{Hash, Hasher},
    ops::Deref,
    str::FromStr,
};

use non_empty_string::NonEmptyString;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Error returned when an identifier is empty or blank.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("requirement id must not be empty")]
pub struct EmptyIdError;

/// The stable, unique identifier of a requirement.
///
/// Identifiers are opaque strings (`REQ-001`, `0042`, `STK_login`). The only
/// rule enforced here is that they are non-empty once surrounding whitespace
/// is removed.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct RequirementId(NonEmptyString);

impl RequirementId {
    /// Creates a new identifier, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`EmptyIdError`] if the trimmed string is empty.
    pub fn new(id: impl Into<String>) -> Result<Self, EmptyIdError> {
        let id = id.into();
        let trimmed = id.trim();
        let id = if trimmed.len() == id.len() {
            id
        } else {
            trimmed.to_string()
        };
        NonEmptyString::new(id).map(Self).map_err(|_| EmptyIdError)
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

// Hashing must agree with `str` so that lookups through `Borrow<str>` work.
impl Hash for RequirementId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_str().hash(state);
    }
}

impl Borrow<str> for RequirementId {
    fn borrow(&self) -> &str {
        self.as_str()
    }
}

impl AsRef<str> for RequirementId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl Deref for RequirementId {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        self.as_str()
    }
}

impl fmt::Display for RequirementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequirementId {
    type Err = EmptyIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<&str> for RequirementId {
    type Error = EmptyIdError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<String> for RequirementId {
    type Error = EmptyIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl PartialEq<str> for RequirementId {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for RequirementId {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

impl Serialize for RequirementId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for RequirementId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::new(s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use test_case::test_case;

    use super::*;

    #[test_case("REQ-001", "REQ-001"; "plain")]
    #[test_case("  0042 ", "0042"; "surrounding whitespace")]
    #[test_case("STK_login", "STK_login"; "underscore")]
    fn accepts_non_empty(input: &str, expected: &str) {
        let id = RequirementId::new(input).unwrap();
        assert_eq!(id.as_str(), expected);
    }

    #[test_case(""; "empty")]
    #[test_case("   "; "blank")]
    fn rejects_empty(input: &str) {
        assert_eq!(RequirementId::new(input), Err(EmptyIdError));
    }

    #[test]
    fn map_lookup_by_str() {
        let mut map = HashMap::new();
        map.insert(RequirementId::new("A").unwrap(), 1);
        assert_eq!(map.get("A"), Some(&1));
        assert_eq!(map.get("B"), None);
    }

    #[test]
    fn deserialize_rejects_blank() {
        let result: Result<RequirementId, _> = serde_yaml::from_str("' '");
        assert!(result.is_err());
    }
}
