use crate::events::ViewEventEmitter;
use crate::layout::{LayoutConstraints, LayoutContext, LayoutEngine};
use crate::node::{Fragment, ShadowNode, SharedShadowNodeList, SurfaceId};
use crate::props::{RootProps, SharedProps};
use core::ops::Deref;
use std::sync::Arc;

pub type SharedRootShadowNode = Arc<RootShadowNode>;

/// The root node of a surface.
///
/// A regular shadow node whose props are always [`RootProps`], so it knows the constraints it has
/// to be laid out in.
#[derive(Debug, Clone)]
pub struct RootShadowNode {
    node: ShadowNode,
    props: Arc<RootProps>,
}

impl RootShadowNode {
    /// Creates an empty root with an event emitter that never delivers anything.
    pub fn new(
        surface_id: SurfaceId,
        layout_constraints: LayoutConstraints,
        layout_context: LayoutContext,
    ) -> RootShadowNode {
        let props = Arc::new(RootProps {
            layout_constraints,
            layout_context,
            ..RootProps::default()
        });
        RootShadowNode {
            node: ShadowNode::new(
                surface_id,
                Arc::clone(&props) as SharedProps,
                Arc::new(ViewEventEmitter::new(None)),
                Vec::new(),
            ),
            props,
        }
    }

    pub fn root_props(&self) -> &Arc<RootProps> {
        &self.props
    }

    /// Creates an unsealed copy with different layout constraints and context.
    pub fn clone_with_layout(
        &self,
        layout_constraints: LayoutConstraints,
        layout_context: LayoutContext,
    ) -> RootShadowNode {
        let props = Arc::new(RootProps::with_layout(
            &self.props,
            layout_constraints,
            layout_context,
        ));
        RootShadowNode {
            node: self.node.clone_with(Fragment {
                props: Some(Arc::clone(&props) as SharedProps),
                ..Fragment::default()
            }),
            props,
        }
    }

    /// Creates an unsealed copy with different children.
    pub fn clone_with_children(&self, children: SharedShadowNodeList) -> RootShadowNode {
        RootShadowNode {
            node: self.node.clone_with(Fragment {
                children: Some(children),
                ..Fragment::default()
            }),
            props: Arc::clone(&self.props),
        }
    }

    /// Lays out the whole tree within the root’s constraints.
    ///
    /// # Panics
    /// If the root is sealed.
    pub fn layout(&mut self, engine: &dyn LayoutEngine) {
        engine.layout(
            &mut self.node,
            self.props.layout_constraints,
            &self.props.layout_context,
        );
    }
}

impl Deref for RootShadowNode {
    type Target = ShadowNode;
    fn deref(&self) -> &ShadowNode {
        &self.node
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::StackLayout;
    use crate::node::Tag;
    use crate::props::ViewProps;
    use cgmath::Vector2;

    #[test]
    fn test_root_layout_uses_own_constraints() {
        let size = Vector2::new(320., 480.);
        let mut root = RootShadowNode::new(
            Tag::new(),
            LayoutConstraints::exact(size),
            LayoutContext::default(),
        );
        root.layout(&StackLayout);
        assert_eq!(root.layout_metrics().frame.size, size);
    }

    #[test]
    fn test_clone_with_layout() {
        let root = RootShadowNode::new(
            Tag::new(),
            LayoutConstraints::default(),
            LayoutContext::default(),
        );
        let child = Arc::new(ShadowNode::new(
            Tag::new(),
            Arc::new(ViewProps::default()),
            Arc::new(ViewEventEmitter::new(None)),
            Vec::new(),
        ));
        let root = root.clone_with_children(vec![Arc::clone(&child)]);
        root.seal_recursive();

        let constraints = LayoutConstraints::exact(Vector2::new(10., 10.));
        let copy = root.clone_with_layout(constraints, LayoutContext::default());
        assert_eq!(copy.tag(), root.tag());
        assert_eq!(copy.root_props().layout_constraints, constraints);
        assert!(
            copy.props().as_any().downcast_ref::<RootProps>().is_some(),
            "the node should carry the root props"
        );
        assert!(Arc::ptr_eq(&copy.children()[0], &child));
        assert!(!copy.is_sealed());
    }
}
