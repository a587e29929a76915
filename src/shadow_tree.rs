use crate::delegate::ShadowTreeDelegate;
use crate::diff::{Differentiator, TreeDiff};
use crate::events::dispatch_mutex;
use crate::layout::{LayoutConstraints, LayoutContext, LayoutEngine, Size, StackLayout};
use crate::mutation::{ShadowViewMutation, ShadowViewMutationList};
use crate::node::{ShadowNode, SharedShadowNode, SharedShadowNodeList, SurfaceId};
use crate::root::{RootShadowNode, SharedRootShadowNode};
use core::cell::RefCell;
use core::fmt;
use parking_lot::{ReentrantMutex, RwLock};
use std::sync::Arc;
use thiserror::Error;

/// Reasons a commit did not happen.
///
/// Neither is exceptional: both mean the caller’s view of the tree is out of date, and it should
/// derive a new candidate from the current root or drop the change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum CommitError {
    /// The root the candidate was derived from is no longer the current root.
    #[error("the tree has been committed to since the candidate was derived")]
    StaleBase,
    /// The node to be replaced is not part of the current tree.
    #[error("the node to be replaced is not part of the current tree")]
    NodeNotFound,
}

/// Collaborators used by a shadow tree.
#[derive(Debug, Clone)]
pub struct Config {
    pub layout_engine: Arc<dyn LayoutEngine>,
    pub differentiator: Arc<dyn Differentiator>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            layout_engine: Arc::new(StackLayout),
            differentiator: Arc::new(TreeDiff),
        }
    }
}

/// Owns the current root of one surface and commits new roots to it.
///
/// All methods take `&self`; share the tree between threads with an `Arc`. Layout and diffing
/// happen without holding the tree’s lock, so two commits derived from the same root may race:
/// the first to swap wins, and the other fails with [`CommitError::StaleBase`].
pub struct ShadowTree {
    surface_id: SurfaceId,
    root: ReentrantMutex<RefCell<SharedRootShadowNode>>,
    delegate: RwLock<Option<Arc<dyn ShadowTreeDelegate>>>,
    config: Config,
}

impl ShadowTree {
    /// Creates a tree with an empty root, using the default layout engine and differentiator.
    pub fn new(
        surface_id: SurfaceId,
        layout_constraints: LayoutConstraints,
        layout_context: LayoutContext,
    ) -> ShadowTree {
        ShadowTree::with_config(
            surface_id,
            layout_constraints,
            layout_context,
            Config::default(),
        )
    }

    pub fn with_config(
        surface_id: SurfaceId,
        layout_constraints: LayoutConstraints,
        layout_context: LayoutContext,
        config: Config,
    ) -> ShadowTree {
        let root = RootShadowNode::new(surface_id, layout_constraints, layout_context);
        root.seal_recursive();

        ShadowTree {
            surface_id,
            root: ReentrantMutex::new(RefCell::new(Arc::new(root))),
            delegate: RwLock::new(None),
            config,
        }
    }

    pub fn surface_id(&self) -> SurfaceId {
        self.surface_id
    }

    /// Returns the current root.
    pub fn root_shadow_node(&self) -> SharedRootShadowNode {
        let root = self.root.lock();
        let root = root.borrow();
        Arc::clone(&*root)
    }

    /// Runs `work` while holding the tree’s lock.
    ///
    /// The lock is re-entrant, so `work` may itself read from and commit to this tree; no other
    /// thread can commit in the meantime.
    pub fn synchronize<R>(&self, work: impl FnOnce() -> R) -> R {
        let _lock = self.root.lock();
        work()
    }

    /// Computes the size the tree would have with the given constraints, without committing
    /// anything.
    pub fn measure(
        &self,
        layout_constraints: LayoutConstraints,
        layout_context: LayoutContext,
    ) -> Size {
        let mut root = self
            .root_shadow_node()
            .clone_with_layout(layout_constraints, layout_context);
        root.layout(&*self.config.layout_engine);
        root.layout_metrics().frame.size
    }

    /// Lays out the tree in new constraints and commits the result.
    pub fn constrain_layout(
        &self,
        layout_constraints: LayoutConstraints,
        layout_context: LayoutContext,
    ) -> Result<(), CommitError> {
        let old_root = self.root_shadow_node();
        let new_root = old_root.clone_with_layout(layout_constraints, layout_context);
        self.complete(&old_root, new_root)
    }

    /// Commits a root with new children.
    pub fn complete_root(&self, children: SharedShadowNodeList) -> Result<(), CommitError> {
        let old_root = self.root_shadow_node();
        let new_root = old_root.clone_with_children(children);
        self.complete(&old_root, new_root)
    }

    /// Commits a tree in which `old_node` (found by identity) is replaced with `new_node`.
    ///
    /// All ancestors of `old_node` are rebuilt; everything else is shared with the current tree.
    /// Fails with [`CommitError::NodeNotFound`] if `old_node` is not a descendant of the current
    /// root (this includes the root itself).
    pub fn complete_by_replacing_node(
        &self,
        old_node: &ShadowNode,
        new_node: SharedShadowNode,
    ) -> Result<(), CommitError> {
        let old_root = self.root_shadow_node();
        let path = old_root
            .path_to(old_node)
            .ok_or(CommitError::NodeNotFound)?;
        let children = old_root
            .children_replacing(&path, new_node)
            .ok_or(CommitError::NodeNotFound)?;
        self.complete(&old_root, old_root.clone_with_children(children))
    }

    /// Lays out, seals and commits `new_root`, which must have been derived from `old_root`.
    ///
    /// On success, layout events are emitted and the delegate is notified. Fails with
    /// [`CommitError::StaleBase`] (and has no side effects) if `old_root` is no longer current.
    pub fn complete(
        &self,
        old_root: &SharedRootShadowNode,
        mut new_root: RootShadowNode,
    ) -> Result<(), CommitError> {
        new_root.layout(&*self.config.layout_engine);
        new_root.seal_recursive();
        let new_root = Arc::new(new_root);

        let mutations = self
            .config
            .differentiator
            .calculate_mutations(old_root, &new_root);

        self.commit(old_root, new_root, &mutations)?;

        log::debug!(
            "committed {} mutations to surface {:?}",
            mutations.len(),
            self.surface_id
        );

        emit_layout_events(&mutations);

        if let Some(delegate) = self.delegate() {
            delegate.shadow_tree_did_commit(self, &mutations);
        }

        Ok(())
    }

    /// Replaces the current root if it is still `old_root`.
    ///
    /// This is the only place the root is ever written.
    fn commit(
        &self,
        old_root: &SharedRootShadowNode,
        new_root: SharedRootShadowNode,
        mutations: &ShadowViewMutationList,
    ) -> Result<(), CommitError> {
        let lock = self.root.lock();

        {
            let mut root = lock.borrow_mut();
            if !Arc::ptr_eq(old_root, &*root) {
                log::trace!("stale commit to surface {:?}", self.surface_id);
                return Err(CommitError::StaleBase);
            }
            *root = new_root;
        }

        toggle_event_emitters(mutations);
        Ok(())
    }

    /// Sets the delegate, replacing the current one.
    pub fn set_delegate(&self, delegate: Option<Arc<dyn ShadowTreeDelegate>>) {
        *self.delegate.write() = delegate;
    }

    pub fn delegate(&self) -> Option<Arc<dyn ShadowTreeDelegate>> {
        self.delegate.read().clone()
    }
}

impl fmt::Debug for ShadowTree {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("ShadowTree")
            .field("surface_id", &self.surface_id)
            .field("root", &self.root_shadow_node())
            .field("has_delegate", &self.delegate.read().is_some())
            .field("config", &self.config)
            .finish()
    }
}

/// Tears down the tree by committing an empty root, so every remaining emitter is disabled.
impl Drop for ShadowTree {
    fn drop(&mut self) {
        if let Err(err) = self.complete_root(Vec::new()) {
            log::warn!("failed to tear down surface {:?}: {}", self.surface_id, err);
        }
    }
}

/// Enables the emitters of created views, then disables the emitters of deleted views.
///
/// All enables happen before any disable, so an emitter that is deleted and created again within
/// one commit is never seen disabled.
fn toggle_event_emitters(mutations: &ShadowViewMutationList) {
    let _lock = dispatch_mutex().lock();

    for mutation in mutations {
        if let ShadowViewMutation::Create { new } = mutation {
            new.event_emitter.enable();
        }
    }

    for mutation in mutations {
        if let ShadowViewMutation::Delete { old } = mutation {
            old.event_emitter.disable();
        }
    }
}

/// Emits layout events for created views and updated views whose layout changed.
fn emit_layout_events(mutations: &ShadowViewMutationList) {
    for mutation in mutations {
        let (old, new) = match mutation {
            ShadowViewMutation::Create { new } => (None, new),
            ShadowViewMutation::Update { old, new, .. } => (Some(old), new),
            _ => continue,
        };

        let emitter = match new.event_emitter.as_layout_emitter() {
            Some(emitter) => emitter,
            None => continue,
        };

        if !new.props.layout_events_requested() {
            continue;
        }

        if let Some(old) = old {
            if old.layout_metrics == new.layout_metrics {
                continue;
            }
        }

        emitter.on_layout(&new.layout_metrics);
    }
}
