//! The snapshot of requirements produced by a single rebuild.

use std::collections::{HashMap, hash_map::Entry};

use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::domain::{Location, Requirement, RequirementId};

/// How a rebuild treats two records with the same identifier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DuplicatePolicy {
    /// Fail the rebuild, naming both definitions.
    #[default]
    Reject,
    /// Keep the later record, in the position of the first one.
    LastWriteWins,
}

/// Errors that can occur when building a [`RequirementStore`].
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum StoreError {
    /// Two records share an identifier and the policy is
    /// [`DuplicatePolicy::Reject`].
    #[error("duplicate requirement id '{id}' (first defined at {first}, redefined at {second})")]
    DuplicateId {
        /// The repeated identifier.
        id: RequirementId,
        /// Where the first record came from.
        first: String,
        /// Where the repeated record came from.
        second: String,
    },
}

/// An immutable mapping from identifier to requirement.
///
/// The store has a canonical order: the order records were supplied in. It
/// is built once and then only read; updates happen by building a new store
/// and swapping it in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequirementStore {
    records: Vec<Requirement>,
    positions: HashMap<RequirementId, usize>,
}

impl RequirementStore {
    /// Builds a store from records, applying `policy` to repeated ids.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DuplicateId`] if an identifier repeats and the
    /// policy is [`DuplicatePolicy::Reject`].
    #[instrument(level = "debug", skip(records))]
    pub fn new(
        records: impl IntoIterator<Item = Requirement>,
        policy: DuplicatePolicy,
    ) -> Result<Self, StoreError> {
        let records = records.into_iter();
        let mut store = Self {
            records: Vec::with_capacity(records.size_hint().0),
            positions: HashMap::with_capacity(records.size_hint().0),
        };

        for record in records {
            match store.positions.entry(record.id().clone()) {
                Entry::Vacant(entry) => {
                    entry.insert(store.records.len());
                    store.records.push(record);
                }
                Entry::Occupied(entry) => {
                    let existing = &mut store.records[*entry.get()];
                    match policy {
                        DuplicatePolicy::Reject => {
                            return Err(StoreError::DuplicateId {
                                id: record.id().clone(),
                                first: describe(existing.location()),
                                second: describe(record.location()),
                            });
                        }
                        DuplicatePolicy::LastWriteWins => {
                            tracing::warn!(
                                "requirement {} redefined at {}, replacing definition at {}",
                                record.id(),
                                describe(record.location()),
                                describe(existing.location()),
                            );
                            *existing = record;
                        }
                    }
                }
            }
        }

        tracing::debug!("built requirement store with {} records", store.len());
        Ok(store)
    }

    /// Looks up a requirement by identifier.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Requirement> {
        self.positions.get(id).map(|&index| &self.records[index])
    }

    /// Whether a requirement with this identifier exists.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.positions.contains_key(id)
    }

    /// Iterates over all requirements in canonical order.
    pub fn iter(&self) -> std::slice::Iter<'_, Requirement> {
        self.records.iter()
    }

    /// The number of requirements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the store has no requirements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<'a> IntoIterator for &'a RequirementStore {
    type Item = &'a Requirement;
    type IntoIter = std::slice::Iter<'a, Requirement>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

fn describe(location: Option<&Location>) -> String {
    location.map_or_else(|| "<unknown>".to_string(), ToString::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn req(id: &str, title: &str) -> Requirement {
        Requirement::new(RequirementId::new(id).unwrap(), title)
    }

    #[test]
    fn get_returns_inserted_record() {
        let a = req("A", "Root").with_status("draft");
        let b = req("B", "Child");
        let store = RequirementStore::new([a.clone(), b.clone()], DuplicatePolicy::Reject).unwrap();

        assert_eq!(store.get("A"), Some(&a));
        assert_eq!(store.get("B"), Some(&b));
        assert_eq!(store.get("C"), None);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn enumeration_follows_supply_order() {
        let store = RequirementStore::new(
            [req("Z", "z"), req("A", "a"), req("M", "m")],
            DuplicatePolicy::Reject,
        )
        .unwrap();

        let ids: Vec<_> = store.iter().map(|r| r.id().as_str()).collect();
        assert_eq!(ids, ["Z", "A", "M"]);
    }

    #[test]
    fn duplicate_is_rejected_by_default() {
        let first = req("A", "first").with_location(Location::new("a.rst", 3));
        let second = req("A", "second").with_location(Location::new("b.rst", 9));

        let err = RequirementStore::new([first, second], DuplicatePolicy::default()).unwrap_err();

        assert_eq!(
            err,
            StoreError::DuplicateId {
                id: RequirementId::new("A").unwrap(),
                first: "a.rst:3".to_string(),
                second: "b.rst:9".to_string(),
            }
        );
    }

    #[test]
    fn last_write_wins_keeps_first_position() {
        let store = RequirementStore::new(
            [req("A", "first"), req("B", "b"), req("A", "second")],
            DuplicatePolicy::LastWriteWins,
        )
        .unwrap();

        assert_eq!(store.len(), 2);
        assert_eq!(store.get("A").unwrap().title(), "second");
        let ids: Vec<_> = store.iter().map(|r| r.id().as_str()).collect();
        assert_eq!(ids, ["A", "B"]);
    }
}
