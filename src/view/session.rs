//! Selection state and the live relationship view built on top of it.

use std::fmt;

use tracing::instrument;

use crate::{
    domain::{LinkIndex, Relationships, Requirement, RequirementId, RequirementStore},
    view::{DisplayNames, Leaf, RelationsTree, materialize},
};

/// Which requirement the view is centred on.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selection {
    /// Nothing selected.
    #[default]
    NoSelection,
    /// A requirement id, whether or not it currently resolves.
    Selected(RequirementId),
}

impl Selection {
    /// The selected identifier, if any.
    #[must_use]
    pub const fn id(&self) -> Option<&RequirementId> {
        match self {
            Self::NoSelection => None,
            Self::Selected(id) => Some(id),
        }
    }
}

impl From<Option<RequirementId>> for Selection {
    fn from(id: Option<RequirementId>) -> Self {
        id.map_or(Self::NoSelection, Self::Selected)
    }
}

/// Receives a notification whenever the materialized view may have changed.
///
/// The observer is expected to pull a fresh [`RelationsTree`].
pub trait ViewObserver {
    /// Called after every selection change, rebuild or display-name change.
    fn view_changed(&self);
}

impl<F: Fn()> ViewObserver for F {
    fn view_changed(&self) {
        self();
    }
}

/// Opens a requirement at its source location.
pub trait Navigator {
    /// Error reported when navigation fails.
    type Error;

    /// Navigate to `requirement`.
    ///
    /// # Errors
    ///
    /// Implementation defined; the view keeps its selection when this fails.
    fn navigate_to(&mut self, requirement: &Requirement) -> Result<(), Self::Error>;
}

/// A relationship view over a [`LinkIndex`] that follows a selection.
///
/// All state changes go through this type so that observers are told to
/// refresh exactly when the view may differ.
pub struct RelationshipsView<N> {
    index: LinkIndex,
    names: N,
    selection: Selection,
    observers: Vec<Box<dyn ViewObserver>>,
}

impl<N: fmt::Debug> fmt::Debug for RelationshipsView<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelationshipsView")
            .field("index", &self.index)
            .field("names", &self.names)
            .field("selection", &self.selection)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl<N: DisplayNames> RelationshipsView<N> {
    /// Creates a view with nothing selected.
    #[must_use]
    pub const fn new(index: LinkIndex, names: N) -> Self {
        Self {
            index,
            names,
            selection: Selection::NoSelection,
            observers: Vec::new(),
        }
    }

    /// Registers an observer for "view changed" notifications.
    pub fn subscribe(&mut self, observer: impl ViewObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// The index the view reads from.
    #[must_use]
    pub const fn index(&self) -> &LinkIndex {
        &self.index
    }

    /// The current display names.
    #[must_use]
    pub const fn display_names(&self) -> &N {
        &self.names
    }

    /// The current selection.
    #[must_use]
    pub const fn selection(&self) -> &Selection {
        &self.selection
    }

    /// The selected requirement, if the selection resolves in the current
    /// snapshot.
    #[must_use]
    pub fn selected(&self) -> Option<&Requirement> {
        self.selection.id().and_then(|id| self.index.get(id))
    }

    /// Selects `id`, whether or not it resolves.
    #[instrument(level = "debug", skip(self))]
    pub fn select(&mut self, id: RequirementId) {
        self.selection = Selection::Selected(id);
        self.notify();
    }

    /// Clears the selection.
    #[instrument(level = "debug", skip(self))]
    pub fn clear(&mut self) {
        self.selection = Selection::NoSelection;
        self.notify();
    }

    /// Replaces the selection.
    pub fn set_selection(&mut self, selection: impl Into<Selection>) {
        self.selection = selection.into();
        self.notify();
    }

    /// Swaps in a freshly built store. The selection is kept as is.
    #[instrument(level = "debug", skip_all)]
    pub fn rebuild(&mut self, store: RequirementStore) {
        self.index.rebuild(store);
        self.notify();
    }

    /// Replaces the display names.
    pub fn set_display_names(&mut self, names: N) {
        self.names = names;
        self.notify();
    }

    /// Queries the relationships of the current selection.
    #[must_use]
    pub fn relationships(&self) -> Relationships<'_> {
        Relationships::query(&self.index, self.selection.id().map(RequirementId::as_str))
    }

    /// Materializes the current view.
    #[must_use]
    pub fn tree(&self) -> RelationsTree {
        materialize(&self.relationships(), &self.index, &self.names)
    }

    /// Activates a leaf: asks `navigator` to open it, then selects it.
    ///
    /// Returns `Ok(false)` without navigating if the leaf does not resolve in
    /// the current snapshot.
    ///
    /// # Errors
    ///
    /// Returns the navigator's error; the selection is left unchanged.
    #[instrument(level = "debug", skip(self, leaf, navigator), fields(leaf = %leaf.id))]
    pub fn activate<Nav: Navigator>(
        &mut self,
        leaf: &Leaf,
        navigator: &mut Nav,
    ) -> Result<bool, Nav::Error> {
        if !leaf.is_navigable() {
            return Ok(false);
        }
        let Some(requirement) = self.index.get(&leaf.id) else {
            tracing::debug!("leaf {} no longer resolves", leaf.id);
            return Ok(false);
        };

        navigator.navigate_to(requirement)?;
        self.select(leaf.id.clone());
        Ok(true)
    }

    fn notify(&self) {
        for observer in &self.observers {
            observer.view_changed();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::Cell, rc::Rc};

    use super::*;
    use crate::domain::{Direction, DuplicatePolicy};

    fn id(s: &str) -> RequirementId {
        RequirementId::new(s).unwrap()
    }

    fn store(records: impl IntoIterator<Item = Requirement>) -> RequirementStore {
        RequirementStore::new(records, DuplicatePolicy::Reject).unwrap()
    }

    fn scenario() -> RequirementStore {
        store([
            Requirement::new(id("A"), "Root").with_link("implements", id("B")),
            Requirement::new(id("B"), "Child"),
        ])
    }

    fn counted_view() -> (RelationshipsView<()>, Rc<Cell<usize>>) {
        let mut view = RelationshipsView::new(LinkIndex::new(scenario()), ());
        let count = Rc::new(Cell::new(0));
        let observed = Rc::clone(&count);
        view.subscribe(move || observed.set(observed.get() + 1));
        (view, count)
    }

    #[derive(Default)]
    struct RecordingNavigator {
        visited: Vec<String>,
        fail: bool,
    }

    impl Navigator for RecordingNavigator {
        type Error = String;

        fn navigate_to(&mut self, requirement: &Requirement) -> Result<(), Self::Error> {
            if self.fail {
                return Err(format!("cannot open {}", requirement.id()));
            }
            self.visited.push(requirement.id().to_string());
            Ok(())
        }
    }

    #[test]
    fn starts_without_selection() {
        let (view, count) = counted_view();
        assert_eq!(view.selection(), &Selection::NoSelection);
        assert!(view.tree().is_empty());
        assert!(view.tree().header().is_none());
        assert_eq!(count.get(), 0);
    }

    #[test]
    fn every_transition_notifies() {
        let (mut view, count) = counted_view();

        view.select(id("A"));
        assert_eq!(count.get(), 1);
        view.select(id("missing"));
        assert_eq!(count.get(), 2);
        view.clear();
        assert_eq!(count.get(), 3);
        view.rebuild(scenario());
        assert_eq!(count.get(), 4);
        view.set_display_names(());
        assert_eq!(count.get(), 5);
        view.set_selection(Some(id("B")));
        assert_eq!(count.get(), 6);
    }

    #[test]
    fn selecting_unknown_id_is_kept_but_shows_nothing() {
        let (mut view, _) = counted_view();
        view.select(id("C"));

        assert_eq!(view.selection(), &Selection::Selected(id("C")));
        assert!(view.selected().is_none());
        assert!(view.tree().is_empty());
    }

    #[test]
    fn rebuild_keeps_selection_and_reresolves() {
        let (mut view, _) = counted_view();
        view.select(id("A"));
        assert!(view.tree().header().is_some());

        view.rebuild(store([Requirement::new(id("B"), "Child")]));
        assert_eq!(view.selection(), &Selection::Selected(id("A")));
        assert!(view.tree().header().is_none());
        assert!(view.tree().is_empty());

        view.rebuild(scenario());
        assert_eq!(view.tree().header().unwrap().id, "A");
    }

    #[test]
    fn activating_a_leaf_navigates_and_follows() {
        let (mut view, count) = counted_view();
        view.select(id("A"));
        let tree = view.tree();
        let leaf = tree.direction(Direction::Outgoing).unwrap().groups[0].leaves[0].clone();

        let mut navigator = RecordingNavigator::default();
        assert_eq!(view.activate(&leaf, &mut navigator), Ok(true));

        assert_eq!(navigator.visited, ["B"]);
        assert_eq!(view.selection(), &Selection::Selected(id("B")));
        assert_eq!(count.get(), 2);
        assert!(view.tree().direction(Direction::Incoming).is_some());
    }

    #[test]
    fn missing_leaf_is_not_navigable() {
        let mut view = RelationshipsView::new(
            LinkIndex::new(store([
                Requirement::new(id("A"), "A").with_link("implements", id("X"))
            ])),
            (),
        );
        view.select(id("A"));
        let tree = view.tree();
        let leaf = tree.direction(Direction::Outgoing).unwrap().groups[0].leaves[0].clone();

        let mut navigator = RecordingNavigator::default();
        assert_eq!(view.activate(&leaf, &mut navigator), Ok(false));
        assert!(navigator.visited.is_empty());
        assert_eq!(view.selection(), &Selection::Selected(id("A")));
    }

    #[test]
    fn failed_navigation_keeps_selection() {
        let (mut view, _) = counted_view();
        view.select(id("A"));
        let tree = view.tree();
        let leaf = tree.direction(Direction::Outgoing).unwrap().groups[0].leaves[0].clone();

        let mut navigator = RecordingNavigator {
            fail: true,
            ..RecordingNavigator::default()
        };
        assert!(view.activate(&leaf, &mut navigator).is_err());
        assert_eq!(view.selection(), &Selection::Selected(id("A")));
    }
}
