//! Widget capability interface.
//!
//! Every node in a layout tree implements [`Widget`]: it answers a bounded
//! preferred-size query, lays itself out at an allocated size, paints, and
//! hit-tests. Containers are concrete implementations; a parent owns handles
//! to its children and the child keeps only a weak back-reference, used for
//! upward invalidation.
//!
//! # Two-Phase Layout
//!
//! 1. **Measure** (`preferred_size`): report an ideal size under optional
//!    soft caps. Containers measure children before allocating.
//! 2. **Layout** (`layout`): receive the final size, lay out children and write
//!    each child's parent-local rectangle.
//!
//! Painting walks the same tree and reads the rectangles written by layout.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use crate::canvas::Canvas;
use crate::error::{LayoutError, Result};
use crate::layout::alignment::{Align, AlignPair};
use crate::layout::grid::GridPlacement;
use crate::layout::padding::Padding;
use crate::layout::sizing::Sizing;
use crate::observable::Subscription;
use crate::primitives::{Rect, Size};

/// Shared handle to a node in the tree.
pub type WidgetRef = Rc<RefCell<dyn Widget>>;

/// Non-owning back-reference to a node.
pub type WeakWidgetRef = Weak<RefCell<dyn Widget>>;

/// A layoutable, paintable node.
pub trait Widget {
    fn base(&self) -> &WidgetBase;
    fn base_mut(&mut self) -> &mut WidgetBase;

    /// Name used in diagnostics.
    fn type_name(&self) -> &'static str {
        "Widget"
    }

    /// Ideal size under optional soft caps. Nodes that only know their
    /// intrinsic size leave this unimplemented.
    fn preferred_size(&mut self, _max_width: Option<i32>, _max_height: Option<i32>) -> Result<Size> {
        Err(LayoutError::UnboundedOnly)
    }

    /// Legacy unbounded size query.
    fn intrinsic_size(&mut self) -> Result<Size> {
        Ok(Size::ZERO)
    }

    /// Lay out at the allocated size. Leaves only record that layout ran.
    fn layout(&mut self, width: i32, height: i32) -> Result<()> {
        self.base_mut().begin_layout(width, height);
        Ok(())
    }

    /// Paint at absolute coordinates.
    fn paint(&mut self, _canvas: &mut dyn Canvas, x: i32, y: i32, width: i32, height: i32) -> Result<()> {
        self.base_mut().set_last_rect(Rect::new(x, y, width, height));
        Ok(())
    }

    /// Deepest child under the absolute point, if any.
    fn hit_test(&self, _x: i32, _y: i32) -> Option<WidgetRef> {
        None
    }

    /// Structural children, for tree walks.
    fn children(&self) -> Vec<WidgetRef> {
        Vec::new()
    }

    /// Layout providers return the nodes to splice into the parent in their
    /// place. Ordinary nodes return `None`.
    fn provide_layout_children(&mut self) -> Option<Vec<WidgetRef>> {
        None
    }

    /// Cross-axis alignment override read by linear boxes.
    fn cross_align(&self) -> Option<Align> {
        None
    }

    /// Alignment override read by single-child boxes.
    fn layout_align(&self) -> Option<AlignPair> {
        None
    }

    /// Grid coordinates, for `GridItem`.
    fn grid_placement(&self) -> Option<GridPlacement> {
        None
    }

    /// Drop any memoized geometry.
    fn invalidate_layout_cache(&mut self) {}

    fn on_mount(&mut self, _this: &WeakWidgetRef) {}

    fn on_unmount(&mut self) {}

    /// A data source this node subscribed to has changed.
    fn on_source_changed(&mut self) {}

    // ---------------------------------------------------------------------
    // Provided accessors and setters
    // ---------------------------------------------------------------------

    fn width_sizing(&self) -> Sizing {
        self.base().width.get()
    }

    fn height_sizing(&self) -> Sizing {
        self.base().height.get()
    }

    /// Current insets. Named apart from the `padding(Padding)` builders on
    /// concrete containers.
    fn padding_insets(&self) -> Padding {
        self.base().padding.get()
    }

    fn layout_rect(&self) -> Option<Rect> {
        self.base().layout_rect
    }

    /// Replace the width with a literal, dropping any binding.
    fn set_width(&mut self, sizing: Sizing) {
        self.base_mut().width = Slot::Literal(sizing);
        self.invalidate();
    }

    fn set_height(&mut self, sizing: Sizing) {
        self.base_mut().height = Slot::Literal(sizing);
        self.invalidate();
    }

    fn set_padding(&mut self, padding: Padding) {
        self.base_mut().padding = Slot::Literal(padding);
        self.invalidate();
    }

    fn set_layout_cache_token(&mut self, token: Option<u64>) {
        self.base_mut().layout_cache_token = token;
        self.invalidate();
    }

    /// Invalidate memoized geometry and request a new layout pass.
    fn invalidate(&mut self) {
        self.invalidate_layout_cache();
        self.base_mut().mark_needs_layout();
    }
}

// =========================================================================
// Reactive slots
// =========================================================================

/// A field that is either a literal or driven by a subscription.
///
/// A bound slot also carries a pending cell. The subscription parks a new
/// value there when it fires while the node is borrowed; reads see it at
/// once and the next layout pass folds it into `value`.
pub enum Slot<T> {
    Literal(T),
    Bound {
        value: T,
        pending: Rc<Cell<Option<T>>>,
        subscription: Subscription,
    },
}

impl<T: Copy> Slot<T> {
    #[inline]
    pub fn get(&self) -> T {
        match self {
            Slot::Literal(v) => *v,
            Slot::Bound { value, pending, .. } => pending.get().unwrap_or(*value),
        }
    }

    /// Write a new value, keeping the binding if there is one.
    pub fn write(&mut self, new_value: T) {
        match self {
            Slot::Literal(v) => *v = new_value,
            Slot::Bound { value, pending, .. } => {
                pending.set(None);
                *value = new_value;
            }
        }
    }

    pub fn is_bound(&self) -> bool {
        matches!(self, Slot::Bound { .. })
    }

    pub fn has_pending(&self) -> bool {
        matches!(self, Slot::Bound { pending, .. } if pending.get().is_some())
    }

    /// Fold a parked value into the slot. Returns whether there was one.
    pub fn settle(&mut self) -> bool {
        match self {
            Slot::Bound { value, pending, .. } => match pending.take() {
                Some(next) => {
                    *value = next;
                    true
                }
                None => false,
            },
            Slot::Literal(_) => false,
        }
    }
}

impl<T: Default> Default for Slot<T> {
    fn default() -> Self {
        Slot::Literal(T::default())
    }
}

impl<T: Copy + fmt::Debug> fmt::Debug for Slot<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::Literal(v) => f.debug_tuple("Literal").field(v).finish(),
            Slot::Bound { .. } => f.debug_tuple("Bound").field(&self.get()).finish(),
        }
    }
}

// =========================================================================
// Shared node state
// =========================================================================

/// State every node carries.
#[derive(Default)]
pub struct WidgetBase {
    pub(crate) width: Slot<Sizing>,
    pub(crate) height: Slot<Sizing>,
    pub(crate) padding: Slot<Padding>,
    layout_rect: Option<Rect>,
    last_rect: Option<Rect>,
    laid_out_size: Option<Size>,
    needs_layout: bool,
    layout_cache_token: Option<u64>,
    parent: Option<WeakWidgetRef>,
    mounted: bool,
}

impl WidgetBase {
    pub fn new() -> Self {
        Self {
            needs_layout: true,
            ..Self::default()
        }
    }

    pub fn with_sizing(width: Sizing, height: Sizing) -> Self {
        Self {
            width: Slot::Literal(width),
            height: Slot::Literal(height),
            ..Self::new()
        }
    }

    pub fn width(&self) -> Sizing {
        self.width.get()
    }

    pub fn height(&self) -> Sizing {
        self.height.get()
    }

    pub fn padding(&self) -> Padding {
        self.padding.get()
    }

    pub fn is_width_bound(&self) -> bool {
        self.width.is_bound()
    }

    /// Parent-local rectangle from the last layout pass.
    pub fn layout_rect(&self) -> Option<Rect> {
        self.layout_rect
    }

    pub fn set_layout_rect(&mut self, rect: Rect) {
        self.layout_rect = Some(rect);
    }

    pub fn clear_layout_rect(&mut self) {
        self.layout_rect = None;
    }

    /// Absolute rectangle from the last paint.
    pub fn last_rect(&self) -> Option<Rect> {
        self.last_rect
    }

    pub fn set_last_rect(&mut self, rect: Rect) {
        self.last_rect = Some(rect);
    }

    /// Size of the last `layout` call on this node.
    pub fn laid_out_size(&self) -> Option<Size> {
        self.laid_out_size
    }

    /// Called at the start of every `layout` implementation.
    pub fn begin_layout(&mut self, width: i32, height: i32) {
        self.width.settle();
        self.height.settle();
        self.padding.settle();
        self.laid_out_size = Some(Size::new(width, height));
        self.needs_layout = false;
    }

    pub fn needs_layout(&self) -> bool {
        self.needs_layout || self.width.has_pending() || self.height.has_pending() || self.padding.has_pending()
    }

    pub fn clear_needs_layout(&mut self) {
        self.needs_layout = false;
    }

    /// Flag this node and its ancestors for layout.
    pub fn mark_needs_layout(&mut self) {
        self.needs_layout = true;
        let mut next = self.parent.as_ref().and_then(Weak::upgrade);
        while let Some(node) = next {
            // An ancestor being borrowed is mid-pass and will finish on its own.
            let Ok(mut node) = node.try_borrow_mut() else {
                break;
            };
            let base = node.base_mut();
            base.needs_layout = true;
            next = base.parent.as_ref().and_then(Weak::upgrade);
        }
    }

    pub fn layout_cache_token(&self) -> Option<u64> {
        self.layout_cache_token
    }

    pub fn parent(&self) -> Option<WidgetRef> {
        self.parent.as_ref().and_then(Weak::upgrade)
    }

    pub(crate) fn set_parent(&mut self, parent: Option<WeakWidgetRef>) {
        self.parent = parent;
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub(crate) fn set_mounted(&mut self, mounted: bool) {
        self.mounted = mounted;
    }
}

impl fmt::Debug for WidgetBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WidgetBase")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("padding", &self.padding)
            .field("layout_rect", &self.layout_rect)
            .field("needs_layout", &self.needs_layout)
            .finish()
    }
}

// =========================================================================
// Handles
// =========================================================================

/// Conversion into a shared tree handle.
pub trait IntoWidgetRef {
    fn into_widget_ref(self) -> WidgetRef;
}

impl<W: Widget + 'static> IntoWidgetRef for W {
    fn into_widget_ref(self) -> WidgetRef {
        Rc::new(RefCell::new(self))
    }
}

impl IntoWidgetRef for WidgetRef {
    fn into_widget_ref(self) -> WidgetRef {
        self
    }
}

/// Wrap a widget in a typed shared handle, keeping access to its own API.
pub fn shared<W: Widget + 'static>(widget: W) -> Rc<RefCell<W>> {
    Rc::new(RefCell::new(widget))
}

/// Erase a typed handle into a tree handle pointing at the same node.
pub fn erase<W: Widget + 'static>(widget: &Rc<RefCell<W>>) -> WidgetRef {
    widget.clone()
}

/// Whether two handles point at the same node.
pub fn same_widget(a: &WidgetRef, b: &WidgetRef) -> bool {
    Rc::ptr_eq(a, b)
}
