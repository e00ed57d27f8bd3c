use crate::domain::{Config, Direction, RelationType};

/// Source of display names for relation types.
///
/// Implementations return `None` for relation types they know nothing
/// about; [`display_name`] then supplies the fallback.
pub trait DisplayNames {
    /// The display name of `relation` viewed in `direction`.
    fn display_name_for(&self, relation: &RelationType, direction: Direction) -> Option<String>;
}

impl DisplayNames for Config {
    fn display_name_for(&self, relation: &RelationType, direction: Direction) -> Option<String> {
        self.link_type(relation.as_str())
            .and_then(|link_type| link_type.display_name(direction))
            .map(ToString::to_string)
    }
}

/// No configuration at all: every name falls back.
impl DisplayNames for () {
    fn display_name_for(&self, _: &RelationType, _: Direction) -> Option<String> {
        None
    }
}

impl<T: DisplayNames> DisplayNames for Option<T> {
    fn display_name_for(&self, relation: &RelationType, direction: Direction) -> Option<String> {
        self.as_ref()
            .and_then(|names| names.display_name_for(relation, direction))
    }
}

impl<T: DisplayNames + ?Sized> DisplayNames for &T {
    fn display_name_for(&self, relation: &RelationType, direction: Direction) -> Option<String> {
        (**self).display_name_for(relation, direction)
    }
}

/// The display name of `relation` in `direction`, with fallbacks.
///
/// Unconfigured outgoing relations show the raw relation name; unconfigured
/// incoming relations show `"<relation> (reverse)"`.
pub fn display_name<N: DisplayNames + ?Sized>(
    names: &N,
    relation: &RelationType,
    direction: Direction,
) -> String {
    names
        .display_name_for(relation, direction)
        .unwrap_or_else(|| match direction {
            Direction::Outgoing => relation.to_string(),
            Direction::Incoming => format!("{relation} (reverse)"),
        })
}
