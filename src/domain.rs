//! Domain models for requirement traceability.
//!
//! This module contains the requirement records, the immutable store they are
//! collected into, the link index answering forward and reverse queries, and
//! the project configuration.

mod id;
pub use id::{EmptyIdError, RequirementId};

mod relation;
pub use relation::{Direction, RelationType};

/// Requirement records and their outgoing links.
pub mod requirement;
pub use requirement::{Links, Location, Requirement};

mod store;
pub use store::{DuplicatePolicy, RequirementStore, StoreError};

/// Lookup and reverse-link derivation.
pub mod index;
pub use index::{DanglingLink, LinkIndex};

mod query;
pub use query::Relationships;

/// Project configuration.
pub mod config;
pub use config::{Config, ConfigError};
