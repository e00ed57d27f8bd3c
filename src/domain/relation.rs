use std::{borrow::Borrow, fmt};

use serde::{Deserialize, Serialize};

/// The name of a category of directed link, such as `satisfies` or
/// `implements`.
///
/// Relation types are open-ended. Which names are meaningful, and how they are
/// displayed, is owned by the configuration rather than by the index.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RelationType(String);

impl RelationType {
    /// Creates a relation type from its name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the relation type name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for RelationType {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for RelationType {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RelationType {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for RelationType {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for RelationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The direction of a relation relative to the requirement being inspected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Declared by the requirement's own `links`.
    Outgoing,
    /// Derived by finding requirements whose links target this one.
    Incoming,
}

impl Direction {
    /// The heading used for the direction group in a relationship view.
    #[must_use]
    pub const fn heading(self) -> &'static str {
        match self {
            Self::Outgoing => "Outgoing",
            Self::Incoming => "Incoming",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.heading())
    }
}
