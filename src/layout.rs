//! Layout primitives and the layout engine interface.

use crate::node::ShadowNode;
use crate::rect::Rect;
use cgmath::{Point2, Vector2, Zero};
use core::fmt;

/// A size (width, height).
pub type Size = Vector2<f64>;

/// Size constraints for laying out a root.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutConstraints {
    pub minimum_size: Size,
    pub maximum_size: Size,
}

impl LayoutConstraints {
    /// Constraints that only allow exactly one size.
    pub fn exact(size: Size) -> LayoutConstraints {
        LayoutConstraints {
            minimum_size: size,
            maximum_size: size,
        }
    }

    /// Constraints that allow any size.
    pub fn unbounded() -> LayoutConstraints {
        LayoutConstraints {
            minimum_size: Vector2::zero(),
            maximum_size: Vector2::new(f64::INFINITY, f64::INFINITY),
        }
    }

    /// Clamps a size so it satisfies these constraints.
    ///
    /// The minimum size wins if the constraints contradict each other.
    pub fn clamp(&self, size: Size) -> Size {
        Vector2::new(
            size.x.min(self.maximum_size.x).max(self.minimum_size.x),
            size.y.min(self.maximum_size.y).max(self.minimum_size.y),
        )
    }
}

impl Default for LayoutConstraints {
    fn default() -> Self {
        LayoutConstraints::unbounded()
    }
}

/// Lateral layout parameters that apply to a whole surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutContext {
    /// Number of device pixels per point.
    pub point_scale_factor: f64,
}

impl Default for LayoutContext {
    fn default() -> Self {
        LayoutContext {
            point_scale_factor: 1.,
        }
    }
}

/// Computed geometry of a node.
///
/// Equality is plain float equality on every field; two metrics are "unchanged" exactly when they
/// compare equal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutMetrics {
    /// Frame in the parent’s coordinate system.
    pub frame: Rect,
    pub point_scale_factor: f64,
}

impl Default for LayoutMetrics {
    fn default() -> Self {
        LayoutMetrics {
            frame: Rect::zero(),
            point_scale_factor: 1.,
        }
    }
}

/// A layout algorithm.
///
/// The engine is handed an unsealed node and lays out it and its subtree in place, touching only
/// layout metrics. It must be idempotent: running it twice before the node is sealed yields the same
/// metrics.
///
/// Children are shared and usually sealed, so an engine should only reach for
/// [`ShadowNode::child_mut`] when a child’s metrics actually change; that call replaces the child
/// with a private copy, and untouched children stay shared with the previous snapshot.
pub trait LayoutEngine: fmt::Debug + Send + Sync {
    fn layout(&self, node: &mut ShadowNode, constraints: LayoutConstraints, context: &LayoutContext);
}

/// A minimal layout engine that stacks children vertically.
///
/// - a node with a preferred size (see [`Props::preferred_size`](crate::Props::preferred_size))
///   takes exactly that size
/// - any other node is as wide as its widest child and as tall as all its children together
/// - children are placed top to bottom, flush left
///
/// The root is additionally clamped to its constraints.
#[derive(Debug, Clone, Copy, Default)]
pub struct StackLayout;

impl StackLayout {
    /// Computes the intrinsic size of a node.
    fn measure(node: &ShadowNode) -> Size {
        if let Some(size) = node.props().preferred_size() {
            return size;
        }

        let mut size = Vector2::zero();
        for child in node.children() {
            let child_size = Self::measure(child);
            size.x = f64::max(size.x, child_size.x);
            size.y += child_size.y;
        }
        size
    }

    fn layout_children(node: &mut ShadowNode, context: &LayoutContext) {
        let mut y = 0.;
        for index in 0..node.children().len() {
            let child = &node.children()[index];
            let size = Self::measure(child);
            let metrics = LayoutMetrics {
                frame: Rect::new(Point2::new(0., y), size),
                point_scale_factor: context.point_scale_factor,
            };
            y += size.y;

            // a sealed child with the same frame has already been laid out this way
            if child.is_sealed() && child.layout_metrics() == metrics {
                continue;
            }

            let child = node.child_mut(index);
            child.set_layout_metrics(metrics);
            Self::layout_children(child, context);
        }
    }
}

impl LayoutEngine for StackLayout {
    fn layout(&self, node: &mut ShadowNode, constraints: LayoutConstraints, context: &LayoutContext) {
        let size = constraints.clamp(Self::measure(node));
        let frame = node.layout_metrics().frame.with_size(size);
        node.set_layout_metrics(LayoutMetrics {
            frame,
            point_scale_factor: context.point_scale_factor,
        });
        Self::layout_children(node, context);
    }
}
