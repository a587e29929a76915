use crate::events::SharedEventEmitter;
use crate::layout::LayoutMetrics;
use crate::props::SharedProps;
use core::{fmt, ptr};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use uuid::Uuid;

/// A unique identifier for a node, and the view it stands for.
///
/// (this is just a UUID)
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Tag(u32, u16, u16, [u8; 8]);

impl Tag {
    pub fn new() -> Tag {
        let uuid = Uuid::new_v4();
        let (a, b, c, d) = uuid.as_fields();
        Tag(a, b, c, *d)
    }
}

/// Identifies a surface; equal to the tag of the surface’s root node.
pub type SurfaceId = Tag;

pub type SharedShadowNode = Arc<ShadowNode>;
pub type SharedShadowNodeList = Vec<SharedShadowNode>;

/// A partial overlay of node fields, used when cloning.
///
/// Fields that are `None` are taken from the source node.
#[derive(Debug, Clone, Default)]
pub struct Fragment {
    pub tag: Option<Tag>,
    pub props: Option<SharedProps>,
    pub event_emitter: Option<SharedEventEmitter>,
    pub children: Option<SharedShadowNodeList>,
}

/// A node in the shadow tree.
///
/// Nodes are built (and laid out) in place and then sealed, after which they never change again.
/// Any change to a sealed tree is expressed as new nodes along the path from the change up to the
/// root; everything else is shared.
///
/// # Panics
/// All mutating methods panic if the node is sealed.
pub struct ShadowNode {
    tag: Tag,
    props: SharedProps,
    event_emitter: SharedEventEmitter,
    children: SharedShadowNodeList,
    layout_metrics: LayoutMetrics,
    sealed: AtomicBool,
}

impl ShadowNode {
    pub fn new(
        tag: Tag,
        props: SharedProps,
        event_emitter: SharedEventEmitter,
        children: SharedShadowNodeList,
    ) -> ShadowNode {
        ShadowNode {
            tag,
            props,
            event_emitter,
            children,
            layout_metrics: LayoutMetrics::default(),
            sealed: AtomicBool::new(false),
        }
    }

    /// Creates an unsealed copy of this node with the fragment’s fields overlaid.
    ///
    /// Layout metrics are carried over.
    pub fn clone_with(&self, fragment: Fragment) -> ShadowNode {
        ShadowNode {
            tag: fragment.tag.unwrap_or(self.tag),
            props: fragment.props.unwrap_or_else(|| Arc::clone(&self.props)),
            event_emitter: fragment
                .event_emitter
                .unwrap_or_else(|| Arc::clone(&self.event_emitter)),
            children: fragment.children.unwrap_or_else(|| self.children.clone()),
            layout_metrics: self.layout_metrics,
            sealed: AtomicBool::new(false),
        }
    }

    pub fn tag(&self) -> Tag {
        self.tag
    }

    pub fn props(&self) -> &SharedProps {
        &self.props
    }

    pub fn event_emitter(&self) -> &SharedEventEmitter {
        &self.event_emitter
    }

    pub fn children(&self) -> &SharedShadowNodeList {
        &self.children
    }

    pub fn layout_metrics(&self) -> LayoutMetrics {
        self.layout_metrics
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed.load(Ordering::Acquire)
    }

    /// Seals this node and its entire subtree.
    pub fn seal_recursive(&self) {
        if self.is_sealed() {
            // sealed nodes only ever have sealed descendants
            return;
        }
        self.sealed.store(true, Ordering::Release);
        for child in &self.children {
            child.seal_recursive();
        }
    }

    fn ensure_unsealed(&self) {
        if self.is_sealed() {
            panic!("attempted to mutate sealed shadow node {:?}", self.tag);
        }
    }

    pub fn set_layout_metrics(&mut self, layout_metrics: LayoutMetrics) {
        self.ensure_unsealed();
        self.layout_metrics = layout_metrics;
    }

    /// Returns a mutable reference to a child, replacing it with a private unsealed copy first if
    /// it’s sealed or shared.
    ///
    /// # Panics
    /// - if this node is sealed
    /// - if the index is out of bounds
    pub fn child_mut(&mut self, index: usize) -> &mut ShadowNode {
        self.ensure_unsealed();
        let child = &mut self.children[index];
        if child.is_sealed() {
            *child = Arc::new(child.clone_with(Fragment::default()));
        }
        Arc::make_mut(child)
    }

    /// Finds `node` in this node’s subtree by identity and returns the child indices leading to it.
    ///
    /// Returns None if `node` isn’t a (strict) descendant.
    pub fn path_to(&self, node: &ShadowNode) -> Option<Vec<usize>> {
        let mut path = Vec::new();
        if self.collect_path(node, &mut path) {
            Some(path)
        } else {
            None
        }
    }

    fn collect_path(&self, node: &ShadowNode, path: &mut Vec<usize>) -> bool {
        for (index, child) in self.children.iter().enumerate() {
            path.push(index);
            if ptr::eq(&**child, node) || child.collect_path(node, path) {
                return true;
            }
            path.pop();
        }
        false
    }

    /// Returns a copy of this node’s children in which the node at `path` is replaced with `node`.
    ///
    /// Every node between this one and the replaced node is cloned with updated children; all
    /// other subtrees are shared. Returns None if the path is empty or doesn’t exist.
    pub fn children_replacing(
        &self,
        path: &[usize],
        node: SharedShadowNode,
    ) -> Option<SharedShadowNodeList> {
        let (&last, rest) = path.split_last()?;

        // ancestors[0] is self; ancestors[i] is the parent of the node at path[i]
        let mut ancestors = Vec::with_capacity(path.len());
        let mut current = self;
        ancestors.push(current);
        for &index in rest {
            current = &**current.children.get(index)?;
            ancestors.push(current);
        }

        let mut index = last;
        let mut replacement = node;
        for depth in (1..ancestors.len()).rev() {
            let ancestor = ancestors[depth];
            let mut children = ancestor.children.clone();
            *children.get_mut(index)? = replacement;
            replacement = Arc::new(ancestor.clone_with(Fragment {
                children: Some(children),
                ..Fragment::default()
            }));
            index = path[depth - 1];
        }

        let mut children = self.children.clone();
        *children.get_mut(index)? = replacement;
        Some(children)
    }
}

/// Copies are always unsealed.
impl Clone for ShadowNode {
    fn clone(&self) -> Self {
        self.clone_with(Fragment::default())
    }
}

impl fmt::Debug for ShadowNode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("ShadowNode")
            .field("tag", &self.tag)
            .field("props", &self.props)
            .field("layout_metrics", &self.layout_metrics)
            .field("sealed", &self.is_sealed())
            .field("children", &self.children)
            .finish()
    }
}
