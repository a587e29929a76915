//! An in-memory view hierarchy that mutation lists can be applied to.

use crate::mutation::{ShadowView, ShadowViewMutation};
use crate::node::{ShadowNode, Tag};
use std::collections::HashMap;
use thiserror::Error;

/// Errors that may occur when applying a mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum MountError {
    #[error("no such view: {0:?}")]
    NoSuchView(Tag),
    #[error("view {0:?} already exists")]
    AlreadyExists(Tag),
    /// The view is still attached to a superview, or still has subviews.
    #[error("view {0:?} is still mounted")]
    StillMounted(Tag),
    #[error("index {index} is out of bounds for the subviews of {parent:?}")]
    IndexOutOfBounds { parent: Tag, index: usize },
    #[error("expected {expected:?} at index {index} of the subviews of {parent:?}")]
    Mismatch {
        parent: Tag,
        index: usize,
        expected: Tag,
    },
}

#[derive(Debug)]
struct MountedView {
    view: ShadowView,
    superview: Option<Tag>,
    subviews: Vec<Tag>,
}

/// A mirror of a mounted view hierarchy.
///
/// Applies mutations the way a platform view hierarchy would, but checks every step, so it can be
/// used to verify that a mutation list is applicable in order.
#[derive(Debug)]
pub struct MountedTree {
    root: Tag,
    views: HashMap<Tag, MountedView>,
}

impl MountedTree {
    /// Creates a hierarchy containing only the (childless) view of `root`.
    pub fn new(root: &ShadowNode) -> MountedTree {
        let mut views = HashMap::new();
        views.insert(
            root.tag(),
            MountedView {
                view: ShadowView::from(root),
                superview: None,
                subviews: Vec::new(),
            },
        );
        MountedTree {
            root: root.tag(),
            views,
        }
    }

    pub fn root(&self) -> Tag {
        self.root
    }

    /// Number of views, attached or not.
    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    pub fn view(&self, tag: Tag) -> Option<&ShadowView> {
        self.views.get(&tag).map(|node| &node.view)
    }

    pub fn superview(&self, tag: Tag) -> Option<Tag> {
        self.views.get(&tag).and_then(|node| node.superview)
    }

    pub fn subviews(&self, tag: Tag) -> Option<&[Tag]> {
        self.views.get(&tag).map(|node| &*node.subviews)
    }

    /// Applies mutations in order, stopping at the first one that fails.
    pub fn apply(&mut self, mutations: &[ShadowViewMutation]) -> Result<(), MountError> {
        for mutation in mutations {
            self.patch(mutation)?;
        }
        Ok(())
    }

    /// Applies a single mutation.
    pub fn patch(&mut self, mutation: &ShadowViewMutation) -> Result<(), MountError> {
        match mutation {
            ShadowViewMutation::Create { new } => self.create_view(new),
            ShadowViewMutation::Delete { old } => self.delete_view(old.tag),
            ShadowViewMutation::Insert { parent, new, index } => {
                self.insert_view(*parent, new, *index)
            }
            ShadowViewMutation::Remove { parent, old, index } => {
                self.remove_view(*parent, old.tag, *index)
            }
            ShadowViewMutation::Update { new, .. } => self.update_view(new),
        }
    }

    fn create_view(&mut self, view: &ShadowView) -> Result<(), MountError> {
        if self.views.contains_key(&view.tag) {
            return Err(MountError::AlreadyExists(view.tag));
        }
        self.views.insert(
            view.tag,
            MountedView {
                view: view.clone(),
                superview: None,
                subviews: Vec::new(),
            },
        );
        Ok(())
    }

    /// Deletes a view, which must be detached and empty.
    fn delete_view(&mut self, tag: Tag) -> Result<(), MountError> {
        let node = self.views.get(&tag).ok_or(MountError::NoSuchView(tag))?;
        if node.superview.is_some() || tag == self.root {
            return Err(MountError::StillMounted(tag));
        }
        if let Some(&subview) = node.subviews.first() {
            return Err(MountError::StillMounted(subview));
        }
        self.views.remove(&tag);
        Ok(())
    }

    fn insert_view(&mut self, parent: Tag, view: &ShadowView, index: usize) -> Result<(), MountError> {
        let node = self
            .views
            .get_mut(&view.tag)
            .ok_or(MountError::NoSuchView(view.tag))?;
        if node.superview.is_some() {
            return Err(MountError::StillMounted(view.tag));
        }
        if view.tag == parent {
            // a view can’t be its own subview
            return Err(MountError::NoSuchView(parent));
        }

        let parent_node = self
            .views
            .get_mut(&parent)
            .ok_or(MountError::NoSuchView(parent))?;
        if index > parent_node.subviews.len() {
            return Err(MountError::IndexOutOfBounds { parent, index });
        }
        parent_node.subviews.insert(index, view.tag);

        // checked above
        if let Some(node) = self.views.get_mut(&view.tag) {
            node.superview = Some(parent);
            node.view = view.clone();
        }
        Ok(())
    }

    fn remove_view(&mut self, parent: Tag, tag: Tag, index: usize) -> Result<(), MountError> {
        if !self.views.contains_key(&tag) {
            return Err(MountError::NoSuchView(tag));
        }
        let parent_node = self
            .views
            .get_mut(&parent)
            .ok_or(MountError::NoSuchView(parent))?;
        match parent_node.subviews.get(index) {
            Some(&subview) if subview == tag => {
                parent_node.subviews.remove(index);
            }
            Some(_) => {
                return Err(MountError::Mismatch {
                    parent,
                    index,
                    expected: tag,
                })
            }
            None => return Err(MountError::IndexOutOfBounds { parent, index }),
        }

        if let Some(node) = self.views.get_mut(&tag) {
            node.superview = None;
        }
        Ok(())
    }

    fn update_view(&mut self, view: &ShadowView) -> Result<(), MountError> {
        let node = self
            .views
            .get_mut(&view.tag)
            .ok_or(MountError::NoSuchView(view.tag))?;
        node.view = view.clone();
        Ok(())
    }

    /// Returns true if the hierarchy below the root exactly mirrors `root` and nothing else is
    /// left over.
    pub fn mirrors(&self, root: &ShadowNode) -> bool {
        let mut count = 0;
        root.tag() == self.root && self.mirrors_node(root, &mut count) && count == self.views.len()
    }

    fn mirrors_node(&self, node: &ShadowNode, count: &mut usize) -> bool {
        let mounted = match self.views.get(&node.tag()) {
            Some(mounted) => mounted,
            None => return false,
        };
        *count += 1;

        mounted.view == ShadowView::from(node)
            && mounted.subviews.len() == node.children().len()
            && mounted
                .subviews
                .iter()
                .zip(node.children())
                .all(|(&tag, child)| {
                    tag == child.tag()
                        && self.superview(tag) == Some(node.tag())
                        && self.mirrors_node(child, count)
                })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delegate::ShadowTreeDelegate;
    use crate::events::ViewEventEmitter;
    use crate::layout::{LayoutConstraints, LayoutContext};
    use crate::mutation::ShadowViewMutationList;
    use crate::node::{Fragment, SharedShadowNode};
    use crate::props::ViewProps;
    use crate::shadow_tree::ShadowTree;
    use cgmath::Vector2;
    use parking_lot::Mutex;
    use std::sync::Arc;

    /// Applies every commit to a mounted tree.
    struct MountingDelegate {
        mounted: Mutex<MountedTree>,
    }

    impl ShadowTreeDelegate for MountingDelegate {
        fn shadow_tree_did_commit(&self, _: &ShadowTree, mutations: &ShadowViewMutationList) {
            self.mounted
                .lock()
                .apply(mutations)
                .expect("mutations should apply cleanly");
        }
    }

    fn view(height: f64, children: Vec<SharedShadowNode>) -> SharedShadowNode {
        Arc::new(ShadowNode::new(
            Tag::new(),
            Arc::new(ViewProps {
                on_layout: false,
                size: if children.is_empty() {
                    Some(Vector2::new(10., height))
                } else {
                    None
                },
            }),
            Arc::new(ViewEventEmitter::new(None)),
            children,
        ))
    }

    fn mounted_tree() -> (ShadowTree, Arc<MountingDelegate>) {
        let tree = ShadowTree::new(
            Tag::new(),
            LayoutConstraints::unbounded(),
            LayoutContext::default(),
        );
        let delegate = Arc::new(MountingDelegate {
            mounted: Mutex::new(MountedTree::new(&tree.root_shadow_node())),
        });
        tree.set_delegate(Some(delegate.clone()));
        (tree, delegate)
    }

    #[test]
    fn test_mount_follows_commits() {
        let (tree, delegate) = mounted_tree();

        tree.complete_root(vec![
            view(0., vec![view(5., Vec::new()), view(6., Vec::new())]),
            view(7., Vec::new()),
            view(8., Vec::new()),
        ])
        .expect("commit");
        assert!(delegate.mounted.lock().mirrors(&tree.root_shadow_node()));

        // reorder, drop one, add one
        let root = tree.root_shadow_node();
        let children = root.children();
        tree.complete_root(vec![
            Arc::clone(&children[2]),
            view(9., vec![view(1., Vec::new())]),
            Arc::clone(&children[0]),
        ])
        .expect("commit");
        assert!(delegate.mounted.lock().mirrors(&tree.root_shadow_node()));

        // replace a nested node with a different one
        let root = tree.root_shadow_node();
        let nested = Arc::clone(&root.children()[2].children()[1]);
        tree.complete_by_replacing_node(&nested, view(20., Vec::new()))
            .expect("commit");
        assert!(delegate.mounted.lock().mirrors(&tree.root_shadow_node()));

        // relayout
        tree.constrain_layout(
            LayoutConstraints::exact(Vector2::new(100., 100.)),
            LayoutContext {
                point_scale_factor: 2.,
            },
        )
        .expect("commit");
        assert!(delegate.mounted.lock().mirrors(&tree.root_shadow_node()));

        tree.complete_root(Vec::new()).expect("commit");
        let mounted = delegate.mounted.lock();
        assert!(mounted.mirrors(&tree.root_shadow_node()));
        assert_eq!(mounted.len(), 1, "only the root should be left");
    }

    #[test]
    fn test_invalid_mutations() {
        let root = view(0., Vec::new());
        let child = view(1., Vec::new());
        let child_view = ShadowView::from(&*child);
        let mut mounted = MountedTree::new(&root);

        assert_eq!(
            mounted.patch(&ShadowViewMutation::Insert {
                parent: root.tag(),
                new: child_view.clone(),
                index: 0,
            }),
            Err(MountError::NoSuchView(child.tag()))
        );

        mounted
            .patch(&ShadowViewMutation::Create {
                new: child_view.clone(),
            })
            .expect("create");
        assert_eq!(
            mounted.patch(&ShadowViewMutation::Create {
                new: child_view.clone(),
            }),
            Err(MountError::AlreadyExists(child.tag()))
        );
        assert_eq!(
            mounted.patch(&ShadowViewMutation::Insert {
                parent: root.tag(),
                new: child_view.clone(),
                index: 1,
            }),
            Err(MountError::IndexOutOfBounds {
                parent: root.tag(),
                index: 1,
            })
        );

        mounted
            .patch(&ShadowViewMutation::Insert {
                parent: root.tag(),
                new: child_view.clone(),
                index: 0,
            })
            .expect("insert");
        assert_eq!(mounted.superview(child.tag()), Some(root.tag()));
        assert_eq!(
            mounted.patch(&ShadowViewMutation::Delete {
                old: child_view.clone(),
            }),
            Err(MountError::StillMounted(child.tag())),
            "attached views can’t be deleted"
        );

        let other = ShadowView::from(&*view(2., Vec::new()));
        mounted
            .patch(&ShadowViewMutation::Create { new: other.clone() })
            .expect("create");
        assert_eq!(
            mounted.patch(&ShadowViewMutation::Remove {
                parent: root.tag(),
                old: other.clone(),
                index: 0,
            }),
            Err(MountError::Mismatch {
                parent: root.tag(),
                index: 0,
                expected: other.tag,
            })
        );
        assert_eq!(mounted.subviews(root.tag()), Some(&[child.tag()][..]));

        mounted
            .apply(&[
                ShadowViewMutation::Remove {
                    parent: root.tag(),
                    old: child_view.clone(),
                    index: 0,
                },
                ShadowViewMutation::Delete { old: child_view },
                ShadowViewMutation::Delete { old: other },
            ])
            .expect("teardown");
        assert!(mounted.mirrors(&root));
    }

    #[test]
    fn test_clone_keeps_tag() {
        let node = view(1., Vec::new());
        let copy = node.clone_with(Fragment::default());
        let mut mounted = MountedTree::new(&node);
        mounted
            .patch(&ShadowViewMutation::Update {
                parent: None,
                old: ShadowView::from(&*node),
                new: ShadowView::from(&copy),
                index: 0,
            })
            .expect("update");
        assert!(mounted.mirrors(&copy));
        assert!(!mounted.is_empty());
    }
}
