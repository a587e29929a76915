use crate::events::SharedEventEmitter;
use crate::layout::LayoutMetrics;
use crate::node::{ShadowNode, Tag};
use crate::props::SharedProps;
use std::sync::Arc;

/// The part of a shadow node that a mounted view cares about.
///
/// Does not reference the rest of the tree, so mutations can be applied without it.
#[derive(Debug, Clone)]
pub struct ShadowView {
    pub tag: Tag,
    pub props: SharedProps,
    pub event_emitter: SharedEventEmitter,
    pub layout_metrics: LayoutMetrics,
}

impl From<&ShadowNode> for ShadowView {
    fn from(node: &ShadowNode) -> ShadowView {
        ShadowView {
            tag: node.tag(),
            props: Arc::clone(node.props()),
            event_emitter: Arc::clone(node.event_emitter()),
            layout_metrics: node.layout_metrics(),
        }
    }
}

/// Props and event emitters are compared by identity.
impl PartialEq for ShadowView {
    fn eq(&self, other: &ShadowView) -> bool {
        self.tag == other.tag
            && Arc::ptr_eq(&self.props, &other.props)
            && Arc::ptr_eq(&self.event_emitter, &other.event_emitter)
            && self.layout_metrics == other.layout_metrics
    }
}

/// A single change to a view hierarchy.
///
/// Mutation lists are meant to be applied in order: a view is created before it’s inserted, and
/// removed from its parent before it’s deleted.
#[derive(Debug, Clone, PartialEq)]
pub enum ShadowViewMutation {
    /// Creates a view (that isn’t attached to anything yet).
    Create { new: ShadowView },
    /// Deletes a detached view.
    Delete { old: ShadowView },
    /// Attaches a view as the `index`th subview of `parent`.
    Insert {
        parent: Tag,
        new: ShadowView,
        index: usize,
    },
    /// Detaches the `index`th subview of `parent`.
    Remove {
        parent: Tag,
        old: ShadowView,
        index: usize,
    },
    /// Updates a view in place.
    ///
    /// `parent` is None for the root view.
    Update {
        parent: Option<Tag>,
        old: ShadowView,
        new: ShadowView,
        index: usize,
    },
}

impl ShadowViewMutation {
    /// The view as it was before this mutation, if there was one.
    pub fn old_child(&self) -> Option<&ShadowView> {
        match self {
            ShadowViewMutation::Delete { old }
            | ShadowViewMutation::Remove { old, .. }
            | ShadowViewMutation::Update { old, .. } => Some(old),
            ShadowViewMutation::Create { .. } | ShadowViewMutation::Insert { .. } => None,
        }
    }

    /// The view as it is after this mutation, if there is one.
    pub fn new_child(&self) -> Option<&ShadowView> {
        match self {
            ShadowViewMutation::Create { new }
            | ShadowViewMutation::Insert { new, .. }
            | ShadowViewMutation::Update { new, .. } => Some(new),
            ShadowViewMutation::Delete { .. } | ShadowViewMutation::Remove { .. } => None,
        }
    }
}

pub type ShadowViewMutationList = Vec<ShadowViewMutation>;

#[test]
fn test_shadow_view_equality() {
    use crate::events::ViewEventEmitter;
    use crate::props::ViewProps;

    let node = ShadowNode::new(
        Tag::new(),
        Arc::new(ViewProps::default()),
        Arc::new(ViewEventEmitter::new(None)),
        Vec::new(),
    );
    let view = ShadowView::from(&node);
    assert_eq!(view, ShadowView::from(&node.clone()));

    let with_equal_props = ShadowView {
        props: Arc::new(ViewProps::default()),
        ..view.clone()
    };
    assert_ne!(view, with_equal_props, "props should be compared by identity");

    let mut moved = view.clone();
    moved.layout_metrics.frame.origin.y = 1.;
    assert_ne!(view, moved);

    let update = ShadowViewMutation::Update {
        parent: None,
        old: view.clone(),
        new: moved.clone(),
        index: 0,
    };
    assert_eq!(update.old_child(), Some(&view));
    assert_eq!(update.new_child(), Some(&moved));
    assert_eq!(ShadowViewMutation::Delete { old: view }.new_child(), None);
}
