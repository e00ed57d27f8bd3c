//! Presentation side: turns relationship queries into a navigable tree.
//!
//! [`materialize`] is a pure function of a query result, an index and a
//! source of display names. [`RelationshipsView`] wraps it with selection
//! state and change notifications.

pub mod collate;
mod materialize;
mod names;
pub mod node;
mod session;

pub use materialize::materialize;
pub use names::{DisplayNames, display_name};
pub use node::{
    DirectionGroup, Header, Leaf, LeafTarget, Marker, NO_RELATIONSHIPS, RelationTypeGroup,
    RelationsTree, Sentinel, ViewNode,
};
pub use session::{Navigator, RelationshipsView, Selection, ViewObserver};
