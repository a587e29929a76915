//! Shadow trees.
//!
//! # Conceptual overview
//! A shadow tree holds the current layout-annotated snapshot of one rendering surface, and turns
//! every new snapshot into a list of view mutations that a host applies to its actual views.
//!
//! ## Snapshots
//! Shadow nodes are immutable once sealed and are shared between snapshots with `Arc`s. A new
//! snapshot is derived from the current one by cloning only the nodes on the path to whatever
//! changed; every other subtree is the same object in both. Mutating a sealed node panics.
//!
//! ## Committing
//! Committing is optimistic. The candidate root is laid out, sealed and diffed against the root it
//! was derived from without holding the tree’s lock, and only then swapped in if that root is still
//! current. If another commit got there first, the candidate is discarded and the caller gets
//! [`CommitError::StaleBase`]. A tree only ever moves from one sealed root to another.
//!
//! ## Events
//! Each view has an event emitter. Emitters of created views are enabled and emitters of deleted
//! views are disabled while the commit still holds the tree’s lock, all under the global dispatch
//! lock (see [`events::dispatch_mutex`]), so no event is seen half way through a toggle. After the
//! swap, views whose layout changed get a layout event if they asked for one.
//!
//! ## Mounting
//! The mutation list of a commit is handed to the tree’s delegate, in order. Applying it in order
//! to a hierarchy that mirrored the old root yields one that mirrors the new root;
//! [`MountedTree`] does exactly that and is useful for checking it.

#[macro_use]
mod props;

pub mod delegate;
pub mod diff;
pub mod events;
pub mod layout;
mod mount;
mod mutation;
mod node;
mod rect;
mod root;
mod shadow_tree;

pub use delegate::{ChannelDelegate, CommitEvent, ShadowTreeDelegate};
pub use diff::{Differentiator, TreeDiff};
pub use events::{
    Event, EventDispatcher, EventEmitter, EventKind, LayoutEventEmitter, SharedEventEmitter,
    ViewEventEmitter,
};
pub use layout::{
    LayoutConstraints, LayoutContext, LayoutEngine, LayoutMetrics, Size, StackLayout,
};
pub use mount::{MountError, MountedTree};
pub use mutation::{ShadowView, ShadowViewMutation, ShadowViewMutationList};
pub use node::{Fragment, ShadowNode, SharedShadowNode, SharedShadowNodeList, SurfaceId, Tag};
pub use props::{Props, RootProps, SharedProps, ViewProps};
pub use rect::{Point, Rect};
pub use root::{RootShadowNode, SharedRootShadowNode};
pub use shadow_tree::{CommitError, Config, ShadowTree};
