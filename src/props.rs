use crate::layout::{LayoutConstraints, LayoutContext, Size};
use core::any::Any;
use core::fmt;
use std::sync::Arc;

/// Implements the `Props` trait for a given struct.
///
/// Syntax:
///
/// ```text
/// impl_props! {
///     StructName;
///     (put overridden items like layout_events_requested() here, using normal rust syntax)
/// }
/// ```
#[macro_export]
macro_rules! impl_props {
    (
        $(#[$attr:meta])*
        $struct:ty;
        $($extra:tt)*
    ) => {
        $(#[$attr])*
        impl $crate::Props for $struct {
            fn as_any(&self) -> &dyn ::core::any::Any {
                self
            }

            $($extra)*
        }
    };
}

/// Properties of a shadow node.
///
/// Props are immutable values; a node with different props is a different node. They are compared
/// by identity (pointer), never by value, when diffing.
///
/// This trait should probably be implemented using the [`impl_props`] macro.
pub trait Props: Any + fmt::Debug + Send + Sync {
    /// For downcasting.
    fn as_any(&self) -> &dyn Any;

    /// Whether the node wants to be notified when its layout changes.
    ///
    /// Props that have no notion of layout events should keep the default.
    fn layout_events_requested(&self) -> bool {
        true
    }

    /// A fixed size requested by the node, if any.
    fn preferred_size(&self) -> Option<Size> {
        None
    }
}

pub type SharedProps = Arc<dyn Props>;

/// Props common to all views.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewProps {
    /// If true, layout events will be emitted when the view’s layout changes.
    pub on_layout: bool,

    /// A fixed size.
    pub size: Option<Size>,
}

impl_props! {
    ViewProps;
    fn layout_events_requested(&self) -> bool {
        self.on_layout
    }
    fn preferred_size(&self) -> Option<Size> {
        self.size
    }
}

/// Props of a root node; carry the layout state of the whole surface.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RootProps {
    pub view: ViewProps,
    pub layout_constraints: LayoutConstraints,
    pub layout_context: LayoutContext,
}

impl RootProps {
    /// Copies `props` with different layout constraints and context.
    pub fn with_layout(
        props: &RootProps,
        layout_constraints: LayoutConstraints,
        layout_context: LayoutContext,
    ) -> RootProps {
        RootProps {
            view: props.view.clone(),
            layout_constraints,
            layout_context,
        }
    }
}

impl_props! {
    RootProps;
    fn layout_events_requested(&self) -> bool {
        self.view.on_layout
    }
    // the root’s size always comes from its constraints and children
}

#[test]
fn test_props_capabilities() {
    let props: SharedProps = Arc::new(ViewProps::default());
    assert!(!props.layout_events_requested());
    assert!(props.as_any().downcast_ref::<ViewProps>().is_some());

    #[derive(Debug)]
    struct OpaqueProps;
    impl_props!(OpaqueProps;);

    let props: SharedProps = Arc::new(OpaqueProps);
    assert!(
        props.layout_events_requested(),
        "props without a layout event flag should not suppress layout events"
    );
    assert_eq!(props.preferred_size(), None);
}

#[test]
fn test_root_props_with_layout() {
    let props = RootProps {
        view: ViewProps {
            on_layout: true,
            size: None,
        },
        ..RootProps::default()
    };
    let context = LayoutContext {
        point_scale_factor: 3.,
    };
    let copy = RootProps::with_layout(&props, LayoutConstraints::unbounded(), context);
    assert_eq!(copy.view, props.view, "view props should be carried over");
    assert_eq!(copy.layout_context, context);
}
