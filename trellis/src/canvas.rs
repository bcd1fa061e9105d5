//! Paint boundary.
//!
//! Widgets paint into a [`Canvas`]; the raster backend lives elsewhere.
//! [`DisplayList`] is a recording canvas: it keeps draw ops in order with the
//! clip that was active for each one, which is enough to assert on paint
//! output without a GPU.

use crate::layout::metrics::CornerRadii;
use crate::primitives::{Color, Rect};

/// Drawing surface handed to `Widget::paint`. All rects are absolute.
pub trait Canvas {
    fn save(&mut self);
    fn restore(&mut self);
    fn clip_rect(&mut self, rect: Rect, radii: CornerRadii);
    fn fill_rect(&mut self, rect: Rect, radii: CornerRadii, color: Color);
    fn stroke_rect(&mut self, rect: Rect, radii: CornerRadii, width: i32, color: Color);
}

/// A recorded draw operation.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Fill {
        rect: Rect,
        radii: CornerRadii,
        color: Color,
        clip: Option<Rect>,
    },
    Stroke {
        rect: Rect,
        radii: CornerRadii,
        width: i32,
        color: Color,
        clip: Option<Rect>,
    },
}

impl DrawOp {
    pub fn rect(&self) -> Rect {
        match self {
            DrawOp::Fill { rect, .. } | DrawOp::Stroke { rect, .. } => *rect,
        }
    }
}

/// Recording canvas.
#[derive(Debug, Default, Clone)]
pub struct DisplayList {
    ops: Vec<DrawOp>,
    /// Effective clip per save level; `None` is unclipped.
    clip_stack: Vec<Option<Rect>>,
    current_clip: Option<Rect>,
}

impl DisplayList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    /// Rects of every fill, in paint order.
    pub fn filled_rects(&self) -> Vec<Rect> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Fill { rect, .. } => Some(*rect),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&mut self) {
        self.ops.clear();
        self.clip_stack.clear();
        self.current_clip = None;
    }

    pub fn current_clip(&self) -> Option<Rect> {
        self.current_clip
    }
}

impl Canvas for DisplayList {
    fn save(&mut self) {
        self.clip_stack.push(self.current_clip);
    }

    fn restore(&mut self) {
        self.current_clip = self.clip_stack.pop().flatten();
    }

    fn clip_rect(&mut self, rect: Rect, _radii: CornerRadii) {
        self.current_clip = Some(match self.current_clip {
            Some(clip) => intersect(&clip, &rect),
            None => rect,
        });
    }

    fn fill_rect(&mut self, rect: Rect, radii: CornerRadii, color: Color) {
        self.ops.push(DrawOp::Fill {
            rect,
            radii,
            color,
            clip: self.current_clip,
        });
    }

    fn stroke_rect(&mut self, rect: Rect, radii: CornerRadii, width: i32, color: Color) {
        self.ops.push(DrawOp::Stroke {
            rect,
            radii,
            width,
            color,
            clip: self.current_clip,
        });
    }
}

fn intersect(a: &Rect, b: &Rect) -> Rect {
    let x = a.x.max(b.x);
    let y = a.y.max(b.y);
    let right = a.right().min(b.right());
    let bottom = a.bottom().min(b.bottom());
    Rect::new(x, y, (right - x).max(0), (bottom - y).max(0))
}
