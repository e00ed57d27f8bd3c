//! Building the relationship tree from a query result.

use tracing::instrument;

use crate::{
    domain::{Direction, LinkIndex, RelationType, Relationships, RequirementId},
    view::{
        DisplayNames, collate,
        names::display_name,
        node::{
            DirectionGroup, Header, Leaf, LeafTarget, RelationTypeGroup, RelationsTree, Sentinel,
            ViewNode,
        },
    },
};

/// Shapes a relationship query result into a navigable tree.
///
/// Leaves are resolved against `index`; identifiers that do not resolve are
/// kept as warning leaves rather than dropped.
#[must_use]
#[instrument(level = "trace", skip_all)]
pub fn materialize<N: DisplayNames + ?Sized>(
    relationships: &Relationships<'_>,
    index: &LinkIndex,
    names: &N,
) -> RelationsTree {
    let mut roots = Vec::with_capacity(3);

    if let Some(selected) = relationships.selected {
        roots.push(ViewNode::Header(Header {
            id: selected.id().clone(),
            title: selected.title().to_string(),
            level: selected.level().map(ToString::to_string),
            status: selected.status().map(ToString::to_string),
        }));
    }

    if relationships.is_empty() {
        roots.push(ViewNode::Sentinel(Sentinel::default()));
        return RelationsTree { roots };
    }

    for direction in [Direction::Outgoing, Direction::Incoming] {
        let count = relationships.count(direction);
        if count == 0 {
            continue;
        }

        let groups = relationships
            .links(direction)
            .iter()
            .filter(|(_, ids)| !ids.is_empty())
            .map(|(relation, ids)| relation_group(relation, ids, direction, index, names))
            .collect();

        roots.push(ViewNode::Direction(DirectionGroup {
            direction,
            count,
            groups,
        }));
    }

    RelationsTree { roots }
}

fn relation_group<N: DisplayNames + ?Sized>(
    relation: &RelationType,
    ids: &[RequirementId],
    direction: Direction,
    index: &LinkIndex,
    names: &N,
) -> RelationTypeGroup {
    let mut leaves: Vec<Leaf> = ids.iter().map(|id| leaf(id, direction, index)).collect();
    leaves.sort_by(|a, b| collate::compare(&a.label, &b.label));

    RelationTypeGroup {
        relation: relation.clone(),
        direction,
        label: display_name(names, relation, direction),
        leaves,
    }
}

fn leaf(id: &RequirementId, direction: Direction, index: &LinkIndex) -> Leaf {
    match index.get(id) {
        Some(requirement) => Leaf {
            id: id.clone(),
            direction,
            label: format!("{id} - {}", requirement.title()),
            target: LeafTarget::Resolved {
                status: requirement.status().map(ToString::to_string),
            },
        },
        None => Leaf {
            id: id.clone(),
            direction,
            label: format!("{id} (not found)"),
            target: LeafTarget::Missing,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{Config, DuplicatePolicy, Requirement, RequirementStore},
        view::node::{Marker, NO_RELATIONSHIPS},
    };

    fn id(s: &str) -> RequirementId {
        RequirementId::new(s).unwrap()
    }

    fn index(records: impl IntoIterator<Item = Requirement>) -> LinkIndex {
        LinkIndex::new(RequirementStore::new(records, DuplicatePolicy::Reject).unwrap())
    }

    fn tree(index: &LinkIndex, selected: Option<&str>) -> RelationsTree {
        materialize(&Relationships::query(index, selected), index, &())
    }

    fn labels(group: &RelationTypeGroup) -> Vec<&str> {
        group.leaves.iter().map(|l| l.label.as_str()).collect()
    }

    fn scenario() -> LinkIndex {
        index([
            Requirement::new(id("A"), "Root")
                .with_level("system")
                .with_status("draft")
                .with_link("implements", id("B")),
            Requirement::new(id("B"), "Child").with_status("approved"),
        ])
    }

    #[test]
    fn outgoing_leaf_for_parent() {
        let index = scenario();
        let tree = tree(&index, Some("A"));

        assert_eq!(tree.roots.len(), 2);
        let header = tree.header().unwrap();
        assert_eq!(header.id, "A");
        assert_eq!(header.title, "Root");
        assert_eq!(header.level.as_deref(), Some("system"));
        assert_eq!(header.status.as_deref(), Some("draft"));

        let outgoing = tree.direction(Direction::Outgoing).unwrap();
        assert_eq!(outgoing.count, 1);
        let group = outgoing.group("implements").unwrap();
        assert_eq!(group.label, "implements");
        assert_eq!(group.count(), 1);
        assert_eq!(labels(group), ["B - Child"]);

        let leaf = &group.leaves[0];
        assert!(leaf.is_navigable());
        assert_eq!(leaf.status(), Some("approved"));
        assert_eq!(leaf.marker(), Marker::Outgoing);
        assert!(tree.direction(Direction::Incoming).is_none());
    }

    #[test]
    fn incoming_leaf_for_child() {
        let index = scenario();
        let tree = tree(&index, Some("B"));

        let incoming = tree.direction(Direction::Incoming).unwrap();
        let group = incoming.group("implements").unwrap();
        assert_eq!(group.label, "implements (reverse)");
        assert_eq!(labels(group), ["A - Root"]);
        assert_eq!(group.leaves[0].marker(), Marker::Incoming);
        assert!(tree.direction(Direction::Outgoing).is_none());
    }

    #[test]
    fn unresolved_selection_has_no_header() {
        let index = scenario();

        for selection in [None, Some("C")] {
            let tree = tree(&index, selection);
            assert_eq!(
                tree.roots,
                [ViewNode::Sentinel(Sentinel {
                    label: NO_RELATIONSHIPS.to_string()
                })]
            );
            assert!(tree.header().is_none());
        }
    }

    #[test]
    fn isolated_requirement_has_header_and_sentinel() {
        let index = index([Requirement::new(id("A"), "Alone")]);
        let tree = tree(&index, Some("A"));

        assert_eq!(tree.roots.len(), 2);
        assert!(tree.header().is_some());
        assert!(tree.is_empty());
    }

    #[test]
    fn dangling_target_is_a_warning_leaf() {
        let index = index([
            Requirement::new(id("A"), "A")
                .with_link("implements", id("X"))
                .with_link("satisfies", id("B")),
            Requirement::new(id("B"), "Bee"),
        ]);
        let tree = tree(&index, Some("A"));

        let outgoing = tree.direction(Direction::Outgoing).unwrap();
        assert_eq!(outgoing.count, 2);

        let implements = outgoing.group("implements").unwrap();
        assert_eq!(labels(implements), ["X (not found)"]);
        let leaf = &implements.leaves[0];
        assert!(!leaf.is_navigable());
        assert_eq!(leaf.target, LeafTarget::Missing);
        assert_eq!(leaf.marker(), Marker::Warning);

        let satisfies = outgoing.group("satisfies").unwrap();
        assert_eq!(labels(satisfies), ["B - Bee"]);
        assert!(satisfies.leaves[0].is_navigable());
    }

    #[test]
    fn leaves_sorted_and_outgoing_before_incoming() {
        let index = index([
            Requirement::new(id("M"), "middle")
                .with_link("tests", id("c"))
                .with_link("tests", id("a"))
                .with_link("tests", id("B")),
            Requirement::new(id("a"), "x"),
            Requirement::new(id("B"), "y"),
            Requirement::new(id("z"), "zed").with_link("tests", id("M")),
            Requirement::new(id("b"), "bee").with_link("tests", id("M")),
        ]);
        let tree = tree(&index, Some("M"));

        match tree.roots.as_slice() {
            [ViewNode::Header(_), ViewNode::Direction(out), ViewNode::Direction(inc)] => {
                assert_eq!(out.direction, Direction::Outgoing);
                assert_eq!(inc.direction, Direction::Incoming);
                assert_eq!(labels(&out.groups[0]), ["a - x", "B - y", "c (not found)"]);
                assert_eq!(labels(&inc.groups[0]), ["b - bee", "z - zed"]);
            }
            other => panic!("unexpected roots: {other:?}"),
        }
    }

    #[test]
    fn configured_display_names_are_used() {
        let index = scenario();
        let config = Config::default();
        let tree = materialize(&Relationships::query(&index, Some("B")), &index, &config);

        let group = tree
            .direction(Direction::Incoming)
            .unwrap()
            .group("implements")
            .unwrap();
        assert_eq!(group.label, "implemented_by");
    }

    #[test]
    fn self_link_renders_both_ways() {
        let index = index([Requirement::new(id("A"), "Self").with_link("links", id("A"))]);
        let tree = tree(&index, Some("A"));

        for direction in [Direction::Outgoing, Direction::Incoming] {
            let group = tree.direction(direction).unwrap().group("links").unwrap();
            assert_eq!(labels(group), ["A - Self"]);
        }
    }

    #[test]
    fn generic_children_walk_the_hierarchy() {
        let index = scenario();
        let tree = tree(&index, Some("A"));

        let direction = &tree.roots[1];
        assert!(direction.is_expandable());
        assert_eq!(direction.label(), "Outgoing");
        assert_eq!(direction.description().as_deref(), Some("(1)"));

        let groups = direction.children();
        assert_eq!(groups.len(), 1);
        let leaves = groups[0].children();
        assert_eq!(leaves.len(), 1);
        assert_eq!(leaves[0].label(), "B - Child");
        assert_eq!(leaves[0].description().as_deref(), Some("approved"));
        assert!(leaves[0].children().is_empty());

        assert_eq!(tree.roots[0].label(), "A: Root");
        assert_eq!(tree.roots[0].description().as_deref(), Some("system | draft"));
    }
}
