//! Relationship queries for a single selected requirement.

use tracing::instrument;

use crate::domain::{Direction, LinkIndex, Links, Requirement};

/// Everything linked to and from one requirement.
///
/// Only relation types with at least one entry are present in
/// [`Relationships::outgoing`] and [`Relationships::incoming`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Relationships<'a> {
    /// The resolved selected requirement, if the selection resolves.
    pub selected: Option<&'a Requirement>,
    /// Targets of the selected requirement's own links.
    pub outgoing: Links,
    /// Requirements whose links target the selected requirement.
    pub incoming: Links,
    /// Sum of the outgoing target list lengths.
    pub outgoing_count: usize,
    /// Sum of the incoming source list lengths.
    pub incoming_count: usize,
}

impl<'a> Relationships<'a> {
    /// Queries the relationships of `selected`.
    ///
    /// No selection, or a selection that no longer resolves, yields an empty
    /// result rather than an error.
    #[must_use]
    #[instrument(level = "trace", skip(index))]
    pub fn query(index: &'a LinkIndex, selected: Option<&str>) -> Self {
        let Some(requirement) = selected.and_then(|id| index.get(id)) else {
            tracing::trace!("selection does not resolve");
            return Self::default();
        };

        let outgoing = requirement.links().non_empty();
        let incoming = index.incoming_links(requirement.id()).non_empty();

        Self {
            selected: Some(requirement),
            outgoing_count: outgoing.total(),
            incoming_count: incoming.total(),
            outgoing,
            incoming,
        }
    }

    /// Whether there is nothing to show in either direction.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.outgoing_count == 0 && self.incoming_count == 0
    }

    /// The relations in one direction.
    #[must_use]
    pub const fn links(&self, direction: Direction) -> &Links {
        match direction {
            Direction::Outgoing => &self.outgoing,
            Direction::Incoming => &self.incoming,
        }
    }

    /// The total number of relations in one direction.
    #[must_use]
    pub const fn count(&self, direction: Direction) -> usize {
        match direction {
            Direction::Outgoing => self.outgoing_count,
            Direction::Incoming => self.incoming_count,
        }
    }
}
