//! Identifier lookup and reverse-link derivation over a store snapshot.
//!
//! Reverse links are never stored. Every call to
//! [`LinkIndex::incoming_links`] scans the forward links of the whole
//! snapshot, so the result can never disagree with the forward graph.

use std::sync::Arc;

use tracing::instrument;

use crate::domain::{Links, RelationType, Requirement, RequirementId, RequirementStore};

/// Read-only access to the live [`RequirementStore`] snapshot.
///
/// Cloning a `LinkIndex` is cheap and yields a handle to the same snapshot.
/// [`LinkIndex::rebuild`] swaps the snapshot as a whole; handles obtained
/// through [`LinkIndex::snapshot`] beforehand keep seeing the old one.
#[derive(Debug, Clone, Default)]
pub struct LinkIndex {
    store: Arc<RequirementStore>,
}

impl LinkIndex {
    /// Creates an index over `store`.
    #[must_use]
    pub fn new(store: RequirementStore) -> Self {
        Self {
            store: Arc::new(store),
        }
    }

    /// Replaces the snapshot.
    #[instrument(level = "debug", skip_all, fields(requirements = store.len()))]
    pub fn rebuild(&mut self, store: RequirementStore) {
        self.store = Arc::new(store);
        tracing::debug!("link index rebuilt");
    }

    /// A shared handle to the current snapshot.
    #[must_use]
    pub fn snapshot(&self) -> Arc<RequirementStore> {
        Arc::clone(&self.store)
    }

    /// Looks up a requirement. Absence is a normal outcome.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Requirement> {
        self.store.get(id)
    }

    /// Iterates over every requirement in the store's canonical order.
    pub fn all_requirements(&self) -> impl Iterator<Item = &Requirement> {
        self.store.iter()
    }

    /// The number of requirements in the snapshot.
    #[must_use]
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Whether the snapshot is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Finds every requirement linking to `target`, grouped by relation type.
    ///
    /// A source is listed once per relation type even if it names `target`
    /// several times in that list. Sources appear in store order. The cost is
    /// proportional to the total number of links in the snapshot.
    #[must_use]
    #[instrument(level = "trace", skip(self))]
    pub fn incoming_links(&self, target: &str) -> Links {
        let mut incoming = Links::default();
        for requirement in self.store.iter() {
            for (relation, targets) in requirement.links().iter() {
                if targets.iter().any(|t| t.as_str() == target) {
                    incoming.push(relation.clone(), requirement.id().clone());
                }
            }
        }
        incoming
    }

    /// Lists every link whose target is not in the snapshot.
    pub fn dangling_links(&self) -> impl Iterator<Item = DanglingLink<'_>> {
        self.store.iter().flat_map(move |source| {
            source.links().iter().flat_map(move |(relation, targets)| {
                targets
                    .iter()
                    .filter(move |target| !self.store.contains(target))
                    .map(move |target| DanglingLink {
                        source,
                        relation,
                        target,
                    })
            })
        })
    }
}

/// A link whose target does not resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DanglingLink<'a> {
    /// The requirement declaring the link.
    pub source: &'a Requirement,
    /// The relation type of the link.
    pub relation: &'a RelationType,
    /// The missing target.
    pub target: &'a RequirementId,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DuplicatePolicy;

    fn id(s: &str) -> RequirementId {
        RequirementId::new(s).unwrap()
    }

    fn index(records: impl IntoIterator<Item = Requirement>) -> LinkIndex {
        LinkIndex::new(RequirementStore::new(records, DuplicatePolicy::Reject).unwrap())
    }

    fn sources<'a>(links: &'a Links, relation: &str) -> Vec<&'a str> {
        links
            .get(relation)
            .unwrap_or_default()
            .iter()
            .map(RequirementId::as_str)
            .collect()
    }

    #[test]
    fn incoming_links_group_by_relation() {
        let index = index([
            Requirement::new(id("A"), "A").with_link("implements", id("T")),
            Requirement::new(id("B"), "B")
                .with_link("satisfies", id("T"))
                .with_link("implements", id("X")),
            Requirement::new(id("C"), "C").with_link("implements", id("T")),
            Requirement::new(id("T"), "T"),
        ]);

        let incoming = index.incoming_links("T");
        assert_eq!(sources(&incoming, "implements"), ["A", "C"]);
        assert_eq!(sources(&incoming, "satisfies"), ["B"]);
        assert_eq!(incoming.total(), 3);
    }

    #[test]
    fn incoming_order_follows_store_order() {
        let index = index([
            Requirement::new(id("Z"), "Z").with_link("tests", id("T")),
            Requirement::new(id("A"), "A").with_link("tests", id("T")),
        ]);

        assert_eq!(sources(&index.incoming_links("T"), "tests"), ["Z", "A"]);
    }

    #[test]
    fn repeated_target_counts_once_per_relation() {
        let index = index([Requirement::new(id("A"), "A")
            .with_link("tests", id("T"))
            .with_link("tests", id("T"))
            .with_link("links", id("T"))]);

        let incoming = index.incoming_links("T");
        assert_eq!(sources(&incoming, "tests"), ["A"]);
        assert_eq!(sources(&incoming, "links"), ["A"]);
    }

    #[test]
    fn incoming_links_for_unknown_target_is_empty() {
        let index = index([Requirement::new(id("A"), "A")]);
        assert!(index.incoming_links("nope").is_empty());
        assert!(index.get("nope").is_none());
    }

    #[test]
    fn dangling_target_still_has_incoming_links() {
        let index = index([Requirement::new(id("A"), "A").with_link("implements", id("X"))]);
        assert_eq!(sources(&index.incoming_links("X"), "implements"), ["A"]);
    }

    #[test]
    fn self_link_is_its_own_incoming_link() {
        let index = index([Requirement::new(id("A"), "A").with_link("links", id("A"))]);
        assert_eq!(sources(&index.incoming_links("A"), "links"), ["A"]);
    }

    // Every (source, relation, target) triple in the forward graph shows up in
    // the reverse query for that target, and nothing else does.
    #[test]
    fn reverse_links_mirror_forward_links() {
        let index = index([
            Requirement::new(id("A"), "A")
                .with_link("satisfies", id("B"))
                .with_link("implements", id("C")),
            Requirement::new(id("B"), "B").with_link("satisfies", id("C")),
            Requirement::new(id("C"), "C").with_link("tests", id("A")),
            Requirement::new(id("D"), "D").with_link("implements", id("Q")),
        ]);

        let ids = ["A", "B", "C", "D", "Q"];
        for target in ids {
            let incoming = index.incoming_links(target);
            for source in index.all_requirements() {
                for (relation, targets) in source.links().iter() {
                    let forward = targets.iter().any(|t| t.as_str() == target);
                    let reverse = incoming.contains(relation.as_str(), source.id());
                    assert_eq!(forward, reverse, "{source:?} {relation} {target}");
                }
            }
            for (relation, srcs) in incoming.iter() {
                for src in srcs {
                    assert!(index.get(src).unwrap().links().contains(relation.as_str(), target));
                }
            }
        }
    }

    #[test]
    fn rebuild_swaps_snapshot_without_tearing_old_handles() {
        let mut index = index([Requirement::new(id("A"), "old")]);
        let old = index.snapshot();

        index.rebuild(
            RequirementStore::new([Requirement::new(id("B"), "new")], DuplicatePolicy::Reject)
                .unwrap(),
        );

        assert!(index.get("A").is_none());
        assert_eq!(index.get("B").unwrap().title(), "new");
        assert_eq!(old.get("A").unwrap().title(), "old");
    }

    #[test]
    fn dangling_links_are_listed() {
        let index = index([
            Requirement::new(id("A"), "A")
                .with_link("implements", id("X"))
                .with_link("implements", id("B")),
            Requirement::new(id("B"), "B"),
        ]);

        let dangling: Vec<_> = index
            .dangling_links()
            .map(|link| (link.source.id().as_str(), link.relation.as_str(), link.target.as_str()))
            .collect();
        assert_eq!(dangling, [("A", "implements", "X")]);
    }
}
