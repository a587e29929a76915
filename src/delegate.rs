use crate::mutation::ShadowViewMutationList;
use crate::node::SurfaceId;
use crate::shadow_tree::ShadowTree;
use crossbeam::channel::{self, Receiver, Sender};

/// Observes commits to a shadow tree.
pub trait ShadowTreeDelegate: Send + Sync {
    /// Called once after every successful commit, synchronously on the committing thread, after
    /// the tree’s root has been replaced and commit side effects have run.
    ///
    /// The tree is not locked at this point, but committing to the same tree from in here will
    /// race with the caller that triggered this commit and should be avoided.
    fn shadow_tree_did_commit(&self, shadow_tree: &ShadowTree, mutations: &ShadowViewMutationList);
}

/// A commit, as sent by [`ChannelDelegate`].
#[derive(Debug, Clone)]
pub struct CommitEvent {
    pub surface_id: SurfaceId,
    pub mutations: ShadowViewMutationList,
}

/// A delegate that forwards commits to a channel, so they can be handled on another thread.
#[derive(Debug, Clone)]
pub struct ChannelDelegate {
    sender: Sender<CommitEvent>,
}

impl ChannelDelegate {
    /// Creates a new delegate and the receiving end of its queue.
    pub fn new() -> (ChannelDelegate, Receiver<CommitEvent>) {
        let (sender, receiver) = channel::unbounded();
        (ChannelDelegate { sender }, receiver)
    }
}

impl ShadowTreeDelegate for ChannelDelegate {
    fn shadow_tree_did_commit(&self, shadow_tree: &ShadowTree, mutations: &ShadowViewMutationList) {
        let event = CommitEvent {
            surface_id: shadow_tree.surface_id(),
            mutations: mutations.clone(),
        };
        if self.sender.send(event).is_err() {
            log::trace!(
                "commit receiver for surface {:?} has been disconnected",
                shadow_tree.surface_id()
            );
        }
    }
}
