//! Tree diffing.

use crate::mutation::{ShadowView, ShadowViewMutation, ShadowViewMutationList};
use crate::node::{ShadowNode, SharedShadowNode, Tag};
use core::fmt;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Computes the mutations that turn one tree into another.
///
/// Must be a pure function of the two (sealed) trees, and deterministic.
pub trait Differentiator: fmt::Debug + Send + Sync {
    fn calculate_mutations(&self, old_root: &ShadowNode, new_root: &ShadowNode)
        -> ShadowViewMutationList;
}

/// Tag-keyed tree diffing.
///
/// Children are matched by tag. Subtrees that are the same object in both trees are skipped
/// entirely, so diffing cost is proportional to the part of the tree that was rebuilt.
///
/// A node that moves to a different parent is deleted and created again. All updates come first,
/// then every remove and delete in the tree, then every create and insert, so a tag is never
/// created while its old view still exists.
#[derive(Debug, Clone, Copy, Default)]
pub struct TreeDiff;

impl Differentiator for TreeDiff {
    fn calculate_mutations(
        &self,
        old_root: &ShadowNode,
        new_root: &ShadowNode,
    ) -> ShadowViewMutationList {
        if core::ptr::eq(old_root, new_root) {
            return Vec::new();
        }

        let mut mutations = Mutations::default();
        let old_view = ShadowView::from(old_root);
        let new_view = ShadowView::from(new_root);
        if old_view != new_view {
            mutations.updates.push(ShadowViewMutation::Update {
                parent: None,
                old: old_view,
                new: new_view,
                index: 0,
            });
        }

        diff_children(
            &mut mutations,
            new_root.tag(),
            old_root.children(),
            new_root.children(),
        );
        mutations.into_list()
    }
}

/// Mutations collected during a diff, by phase.
#[derive(Default)]
struct Mutations {
    updates: ShadowViewMutationList,
    /// Removes and deletes; children are always torn down before their parent is deleted.
    teardown: ShadowViewMutationList,
    /// Creates and inserts; children are always built up before their parent is inserted.
    buildup: ShadowViewMutationList,
}

impl Mutations {
    fn into_list(self) -> ShadowViewMutationList {
        let mut list = self.updates;
        list.extend(self.teardown);
        list.extend(self.buildup);
        list
    }
}

/// Diffs the children of one parent.
///
/// Removes are emitted from the highest index down, after the teardown of deleted subtrees and
/// followed by the deletes. Inserts are emitted from the lowest index up, after the creates and
/// the build-up of created subtrees. Each step is then valid against the hierarchy the previous
/// steps left behind.
fn diff_children(
    mutations: &mut Mutations,
    parent: Tag,
    old_children: &[SharedShadowNode],
    new_children: &[SharedShadowNode],
) {
    if old_children.is_empty() && new_children.is_empty() {
        return;
    }

    // lock-step: children that stay at the same index
    let mut index = 0;
    while index < old_children.len() && index < new_children.len() {
        let old_child = &old_children[index];
        let new_child = &new_children[index];
        if old_child.tag() != new_child.tag() {
            break;
        }
        diff_kept(mutations, parent, old_child, new_child, index);
        index += 1;
    }
    let first_unmatched = index;

    let new_remaining: HashMap<Tag, usize> = new_children[first_unmatched..]
        .iter()
        .enumerate()
        .map(|(offset, child)| (child.tag(), first_unmatched + offset))
        .collect();
    let mut old_remaining = HashSet::new();
    let mut removes = Vec::new();
    let mut deletes = Vec::new();

    for (offset, old_child) in old_children[first_unmatched..].iter().enumerate() {
        let index = first_unmatched + offset;
        let old_view = ShadowView::from(&**old_child);
        old_remaining.insert(old_child.tag());

        removes.push(ShadowViewMutation::Remove {
            parent,
            old: old_view.clone(),
            index,
        });

        match new_remaining.get(&old_child.tag()) {
            Some(&new_index) => {
                // moved
                let new_child = &new_children[new_index];
                diff_kept(mutations, parent, old_child, new_child, new_index);
            }
            None => {
                deletes.push(ShadowViewMutation::Delete { old: old_view });
                diff_children(mutations, old_child.tag(), old_child.children(), &[]);
            }
        }
    }

    mutations.teardown.extend(removes.into_iter().rev());
    mutations.teardown.append(&mut deletes);

    let mut inserts = Vec::new();
    for (offset, new_child) in new_children[first_unmatched..].iter().enumerate() {
        let new_view = ShadowView::from(&**new_child);

        if !old_remaining.contains(&new_child.tag()) {
            mutations.buildup.push(ShadowViewMutation::Create {
                new: new_view.clone(),
            });
            diff_children(mutations, new_child.tag(), &[], new_child.children());
        }

        inserts.push(ShadowViewMutation::Insert {
            parent,
            new: new_view,
            index: first_unmatched + offset,
        });
    }

    mutations.buildup.append(&mut inserts);
}

/// Diffs a child that exists in both trees.
fn diff_kept(
    mutations: &mut Mutations,
    parent: Tag,
    old_child: &SharedShadowNode,
    new_child: &SharedShadowNode,
    index: usize,
) {
    if Arc::ptr_eq(old_child, new_child) {
        return;
    }

    let old_view = ShadowView::from(&**old_child);
    let new_view = ShadowView::from(&**new_child);
    if old_view != new_view {
        mutations.updates.push(ShadowViewMutation::Update {
            parent: Some(parent),
            old: old_view,
            new: new_view,
            index,
        });
    }

    diff_children(
        mutations,
        new_child.tag(),
        old_child.children(),
        new_child.children(),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::ViewEventEmitter;
    use crate::layout::LayoutMetrics;
    use crate::mount::MountedTree;
    use crate::node::Fragment;
    use crate::props::ViewProps;

    fn node(tag: Tag, children: Vec<SharedShadowNode>) -> SharedShadowNode {
        let node = Arc::new(ShadowNode::new(
            tag,
            Arc::new(ViewProps::default()),
            Arc::new(ViewEventEmitter::new(None)),
            children,
        ));
        node.seal_recursive();
        node
    }

    /// Short description of a mutation list.
    fn describe(mutations: &[ShadowViewMutation], names: &HashMap<Tag, &str>) -> Vec<String> {
        mutations
            .iter()
            .map(|mutation| match mutation {
                ShadowViewMutation::Create { new } => format!("create {}", names[&new.tag]),
                ShadowViewMutation::Delete { old } => format!("delete {}", names[&old.tag]),
                ShadowViewMutation::Insert { parent, new, index } => {
                    format!("insert {} into {} at {}", names[&new.tag], names[parent], index)
                }
                ShadowViewMutation::Remove { parent, old, index } => {
                    format!("remove {} from {} at {}", names[&old.tag], names[parent], index)
                }
                ShadowViewMutation::Update { new, .. } => format!("update {}", names[&new.tag]),
            })
            .collect()
    }

    #[test]
    fn test_identical_trees() {
        let root = node(Tag::new(), vec![node(Tag::new(), Vec::new())]);
        assert!(TreeDiff.calculate_mutations(&root, &root).is_empty());

        let copy = node(root.tag(), root.children().clone());
        let mutations = TreeDiff.calculate_mutations(&root, &copy);
        assert_eq!(mutations.len(), 1, "only the root should be updated");
    }

    #[test]
    fn test_insert_delete_and_move() {
        let (r, a, b, c, d) = (Tag::new(), Tag::new(), Tag::new(), Tag::new(), Tag::new());
        let names: HashMap<_, _> = vec![(r, "r"), (a, "a"), (b, "b"), (c, "c"), (d, "d")]
            .into_iter()
            .collect();

        let a_node = node(a, Vec::new());
        let b_node = node(b, vec![node(d, Vec::new())]);
        let c_node = node(c, Vec::new());
        let old_root = node(r, vec![a_node.clone(), b_node, c_node.clone()]);
        let new_root = old_root.clone_with(Fragment {
            children: Some(vec![a_node, c_node]),
            ..Fragment::default()
        });
        new_root.seal_recursive();

        // the root itself is unchanged: same props, emitter and metrics
        let mutations = TreeDiff.calculate_mutations(&old_root, &new_root);
        assert_eq!(
            describe(&mutations, &names),
            vec![
                "remove d from b at 0",
                "delete d",
                "remove c from r at 2",
                "remove b from r at 1",
                "delete b",
                "insert c into r at 1",
            ]
        );
    }

    #[test]
    fn test_created_subtree() {
        let (r, a, b) = (Tag::new(), Tag::new(), Tag::new());
        let names: HashMap<_, _> = vec![(r, "r"), (a, "a"), (b, "b")].into_iter().collect();

        let old_root = node(r, Vec::new());
        let new_root = node(r, vec![node(a, vec![node(b, Vec::new())])]);
        let mutations = TreeDiff.calculate_mutations(&old_root, &new_root);
        assert_eq!(
            describe(&mutations, &names),
            vec!["update r", "create a", "create b", "insert b into a at 0", "insert a into r at 0"]
        );
    }

    #[test]
    fn test_layout_change_is_an_update() {
        let r = Tag::new();
        let child = node(Tag::new(), Vec::new());
        let old_root = node(r, vec![child.clone()]);

        let mut moved = child.clone_with(Fragment::default());
        let mut metrics = LayoutMetrics::default();
        metrics.frame.origin.y = 10.;
        moved.set_layout_metrics(metrics);
        let new_root = old_root.clone_with(Fragment {
            children: Some(vec![Arc::new(moved)]),
            ..Fragment::default()
        });
        new_root.seal_recursive();

        let mutations = TreeDiff.calculate_mutations(&old_root, &new_root);
        match mutations.as_slice() {
            [ShadowViewMutation::Update {
                parent: Some(parent),
                old,
                new,
                index: 0,
            }] => {
                assert_eq!(*parent, r);
                assert_eq!(old.layout_metrics, LayoutMetrics::default());
                assert_eq!(new.layout_metrics, metrics);
            }
            other => panic!("unexpected mutations: {:?}", other),
        }
    }

    #[test]
    fn test_move_to_another_parent() {
        let (r, p1, p2, x, y) = (Tag::new(), Tag::new(), Tag::new(), Tag::new(), Tag::new());
        let names: HashMap<_, _> = vec![(r, "r"), (p1, "p1"), (p2, "p2"), (x, "x"), (y, "y")]
            .into_iter()
            .collect();

        let x_node = node(x, vec![node(y, Vec::new())]);
        let empty_root = node(r, Vec::new());
        let old_root = node(r, vec![node(p1, Vec::new()), node(p2, vec![x_node.clone()])]);
        let new_root = node(r, vec![node(p1, vec![x_node]), node(p2, Vec::new())]);

        let mut mounted = MountedTree::new(&empty_root);
        mounted
            .apply(&TreeDiff.calculate_mutations(&empty_root, &old_root))
            .expect("initial mount");
        assert!(mounted.mirrors(&old_root));

        // x moves from the later sibling into the earlier one
        let mutations = TreeDiff.calculate_mutations(&old_root, &new_root);
        assert_eq!(
            describe(&mutations, &names),
            vec![
                "update r",
                "update p1",
                "update p2",
                "remove y from x at 0",
                "delete y",
                "remove x from p2 at 0",
                "delete x",
                "create x",
                "create y",
                "insert y into x at 0",
                "insert x into p1 at 0",
            ]
        );
        assert_eq!(mounted.apply(&mutations), Ok(()));
        assert!(mounted.mirrors(&new_root));
    }
}
