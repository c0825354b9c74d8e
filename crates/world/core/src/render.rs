//! Draw queue handed to the presentation collaborator.
//!
//! The core never rasterizes anything. A render pass walks active entities
//! in z-order, culls against the viewport predicate, and emits one
//! [`DrawOp`] per visible renderable. What a shape or color string means on
//! screen is entirely the consumer's business.

use serde::{Deserialize, Serialize};

use crate::common::{EntityId, WorldPos, WorldRect};
use crate::grid::Layer;

/// Primitive silhouette of a renderable entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Shape {
    Rectangle,
    Circle,
    Triangle,
}

impl Default for Shape {
    fn default() -> Self {
        Shape::Rectangle
    }
}

/// Visibility predicate supplied by the camera/viewport collaborator.
pub trait Viewport {
    /// Whether a world-space rectangle is at least partially visible.
    fn is_visible(&self, bounds: WorldRect) -> bool;
}

/// Viewport that accepts everything. Useful for tests and headless runs.
#[derive(Clone, Copy, Debug, Default)]
pub struct UnboundedViewport;

impl Viewport for UnboundedViewport {
    fn is_visible(&self, _bounds: WorldRect) -> bool {
        true
    }
}

/// Rectangular camera window.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RectViewport {
    pub window: WorldRect,
}

impl RectViewport {
    pub fn new(window: WorldRect) -> Self {
        Self { window }
    }
}

impl Viewport for RectViewport {
    fn is_visible(&self, bounds: WorldRect) -> bool {
        self.window.intersects(&bounds)
    }
}

/// One draw instruction, already sorted into draw order.
#[derive(Clone, Debug, PartialEq)]
pub struct DrawOp {
    pub entity: EntityId,
    pub layer: Layer,
    pub z_index: i32,
    pub position: WorldPos,
    pub size: f32,
    pub shape: Shape,
    pub color: String,
    /// Transient interaction feedback; rendered as an accent by the
    /// presentation layer.
    pub highlight: bool,
}
