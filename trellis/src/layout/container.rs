//! Single-child boxes and leaves.
//!
//! `Container` and `Panel` delegate inset and placement math to a
//! [`LayoutEngine`]; `CrossAligned` is a transparent wrapper; `Leaf`,
//! `Measured` and `Spacer` are content nodes with no children.

use super::alignment::{Align, AlignPair};
use super::engine::{EngineOwner, LayoutEngine};
use super::measure::{self, child_bound, resolve_preferred};
use super::metrics::CornerRadii;
use super::padding::Padding;
use super::sizing::Sizing;
use crate::canvas::Canvas;
use crate::error::Result;
use crate::primitives::{Color, Rect, Size};
use crate::widget::{IntoWidgetRef, Widget, WidgetBase, WidgetRef};

// =========================================================================
// Leaves
// =========================================================================

/// Content with a fixed natural size, optionally filled when painted.
#[derive(Debug)]
pub struct Leaf {
    base: WidgetBase,
    natural: Size,
    fill: Color,
}

impl Leaf {
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            base: WidgetBase::new(),
            natural: Size::new(width, height).non_negative(),
            fill: Color::TRANSPARENT,
        }
    }

    pub fn fill(mut self, color: Color) -> Self {
        self.fill = color;
        self
    }

    pub fn width(mut self, sizing: Sizing) -> Self {
        self.set_width(sizing);
        self
    }

    pub fn height(mut self, sizing: Sizing) -> Self {
        self.set_height(sizing);
        self
    }

    pub fn natural_size(&self) -> Size {
        self.natural
    }
}

impl Widget for Leaf {
    fn base(&self) -> &WidgetBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut WidgetBase {
        &mut self.base
    }

    fn type_name(&self) -> &'static str {
        "Leaf"
    }

    fn preferred_size(&mut self, max_width: Option<i32>, max_height: Option<i32>) -> Result<Size> {
        Ok(resolve_preferred(
            self.base.width(),
            self.base.height(),
            self.natural,
            max_width,
            max_height,
        ))
    }

    fn paint(&mut self, canvas: &mut dyn Canvas, x: i32, y: i32, width: i32, height: i32) -> Result<()> {
        let rect = Rect::new(x, y, width, height);
        self.base.set_last_rect(rect);
        if self.fill.is_visible() {
            canvas.fill_rect(rect, CornerRadii::ZERO, self.fill);
        }
        Ok(())
    }
}

type MeasureFn = Box<dyn Fn(Option<i32>, Option<i32>) -> Size>;

/// Content whose size is answered by a closure, e.g. wrapped text that grows
/// taller as the width cap shrinks.
pub struct Measured {
    base: WidgetBase,
    measure: MeasureFn,
}

impl Measured {
    pub fn new(measure: impl Fn(Option<i32>, Option<i32>) -> Size + 'static) -> Self {
        Self {
            base: WidgetBase::new(),
            measure: Box::new(measure),
        }
    }
}

impl Widget for Measured {
    fn base(&self) -> &WidgetBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut WidgetBase {
        &mut self.base
    }

    fn type_name(&self) -> &'static str {
        "Measured"
    }

    fn preferred_size(&mut self, max_width: Option<i32>, max_height: Option<i32>) -> Result<Size> {
        Ok((self.measure)(max_width, max_height))
    }
}

/// Empty space. Reports its fixed extents, zero otherwise.
#[derive(Debug)]
pub struct Spacer {
    base: WidgetBase,
}

impl Spacer {
    pub fn new() -> Self {
        Self { base: WidgetBase::new() }
    }

    pub fn sized(width: Sizing, height: Sizing) -> Self {
        Self {
            base: WidgetBase::with_sizing(width, height),
        }
    }
}

impl Default for Spacer {
    fn default() -> Self {
        Self::new()
    }
}

impl Widget for Spacer {
    fn base(&self) -> &WidgetBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut WidgetBase {
        &mut self.base
    }

    fn type_name(&self) -> &'static str {
        "Spacer"
    }

    fn preferred_size(&mut self, _max_width: Option<i32>, _max_height: Option<i32>) -> Result<Size> {
        Ok(Size::new(
            self.base.width().fixed_px().unwrap_or(0),
            self.base.height().fixed_px().unwrap_or(0),
        ))
    }
}

// =========================================================================
// Single-child boxes
// =========================================================================

/// Child slot plus engine, shared by the single-child boxes.
#[derive(Default)]
pub(crate) struct SingleChild {
    pub(crate) child: Option<WidgetRef>,
    pub(crate) align: AlignPair,
    pub(crate) border_width: i32,
    engine: LayoutEngine,
}

impl SingleChild {
    fn owner(&self, base: &WidgetBase) -> EngineOwner {
        EngineOwner {
            padding: base.padding(),
            border_width: self.border_width,
            align: self.align,
            token: base.layout_cache_token(),
        }
    }

    fn inset(&self, base: &WidgetBase) -> Size {
        let p = base.padding();
        Size::new(
            p.horizontal() + self.border_width * 2,
            p.vertical() + self.border_width * 2,
        )
    }

    pub(crate) fn preferred_size(
        &mut self,
        base: &WidgetBase,
        max_width: Option<i32>,
        max_height: Option<i32>,
    ) -> Result<Size> {
        let inset = self.inset(base);
        let child_pref = match &self.child {
            Some(child) => measure::preferred_size(
                child,
                child_bound(base.width(), max_width, inset.width),
                child_bound(base.height(), max_height, inset.height),
            )?,
            None => Size::ZERO,
        };
        let owner = self.owner(base);
        let content = self.engine.preferred_size(&owner, child_pref);
        Ok(resolve_preferred(base.width(), base.height(), content, max_width, max_height))
    }

    pub(crate) fn layout(&mut self, base: &WidgetBase, width: i32, height: i32) -> Result<()> {
        let Some(child) = self.child.clone() else {
            return Ok(());
        };
        let owner = self.owner(base);
        let inner = self.engine.compute_inner_rect(&owner, Rect::new(0, 0, width, height));
        let rect = self.engine.resolve_child_geometry(&owner, &child, inner)?;
        measure::layout_child(&child, rect)
    }

    pub(crate) fn paint_child(&self, canvas: &mut dyn Canvas, x: i32, y: i32) -> Result<()> {
        if let Some(child) = &self.child {
            measure::paint_child(child, canvas, x, y)?;
        }
        Ok(())
    }

    pub(crate) fn children(&self) -> Vec<WidgetRef> {
        self.child.iter().cloned().collect()
    }

    pub(crate) fn invalidate(&mut self) {
        self.engine.invalidate_cache();
    }
}

/// A padded box holding one child, aligned inside the content rect.
pub struct Container {
    base: WidgetBase,
    inner: SingleChild,
}

impl Container {
    pub fn new() -> Self {
        Self {
            base: WidgetBase::new(),
            inner: SingleChild::default(),
        }
    }

    pub fn child(mut self, child: impl IntoWidgetRef) -> Self {
        self.inner.child = Some(child.into_widget_ref());
        self
    }

    pub fn align(mut self, align: impl Into<AlignPair>) -> Self {
        self.inner.align = align.into();
        self
    }

    pub fn padding(mut self, padding: Padding) -> Self {
        self.set_padding(padding);
        self
    }

    pub fn width(mut self, sizing: Sizing) -> Self {
        self.set_width(sizing);
        self
    }

    pub fn height(mut self, sizing: Sizing) -> Self {
        self.set_height(sizing);
        self
    }

    pub fn set_child(&mut self, child: Option<WidgetRef>) {
        self.inner.child = child;
        self.invalidate();
    }

    pub fn alignment(&self) -> AlignPair {
        self.inner.align
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

impl Widget for Container {
    fn base(&self) -> &WidgetBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut WidgetBase {
        &mut self.base
    }

    fn type_name(&self) -> &'static str {
        "Container"
    }

    fn preferred_size(&mut self, max_width: Option<i32>, max_height: Option<i32>) -> Result<Size> {
        self.inner.preferred_size(&self.base, max_width, max_height)
    }

    fn layout(&mut self, width: i32, height: i32) -> Result<()> {
        self.base.begin_layout(width, height);
        self.inner.layout(&self.base, width, height)
    }

    fn paint(&mut self, canvas: &mut dyn Canvas, x: i32, y: i32, width: i32, height: i32) -> Result<()> {
        self.base.set_last_rect(Rect::new(x, y, width, height));
        if measure::needs_relayout(&self.base, &self.inner.children(), width, height) {
            self.layout(width, height)?;
        }
        self.inner.paint_child(canvas, x, y)
    }

    fn hit_test(&self, x: i32, y: i32) -> Option<WidgetRef> {
        measure::hit_test_children(&self.inner.children(), x, y)
    }

    fn children(&self) -> Vec<WidgetRef> {
        self.inner.children()
    }

    fn invalidate_layout_cache(&mut self) {
        self.inner.invalidate();
    }
}

/// A [`Container`] with background, border and rounded corners.
///
/// The border width counts as an inset on every side. The child is clipped
/// to the rounded outline.
pub struct Panel {
    base: WidgetBase,
    inner: SingleChild,
    background: Color,
    border_color: Color,
    radii: CornerRadii,
}

impl Panel {
    pub fn new() -> Self {
        Self {
            base: WidgetBase::new(),
            inner: SingleChild::default(),
            background: Color::TRANSPARENT,
            border_color: Color::TRANSPARENT,
            radii: CornerRadii::ZERO,
        }
    }

    pub fn child(mut self, child: impl IntoWidgetRef) -> Self {
        self.inner.child = Some(child.into_widget_ref());
        self
    }

    pub fn align(mut self, align: impl Into<AlignPair>) -> Self {
        self.inner.align = align.into();
        self
    }

    pub fn padding(mut self, padding: Padding) -> Self {
        self.set_padding(padding);
        self
    }

    pub fn width(mut self, sizing: Sizing) -> Self {
        self.set_width(sizing);
        self
    }

    pub fn height(mut self, sizing: Sizing) -> Self {
        self.set_height(sizing);
        self
    }

    pub fn background(mut self, color: Color) -> Self {
        self.background = color;
        self
    }

    pub fn border(mut self, width: i32, color: Color) -> Self {
        self.inner.border_width = width.max(0);
        self.border_color = color;
        self
    }

    /// Radii at or below 0 are square, below 1 a share of half the shorter
    /// side, otherwise pixels.
    pub fn corner_radii(mut self, radii: impl Into<CornerRadii>) -> Self {
        self.radii = radii.into();
        self
    }

    pub fn border_width(&self) -> i32 {
        self.inner.border_width
    }
}

impl Default for Panel {
    fn default() -> Self {
        Self::new()
    }
}

impl Widget for Panel {
    fn base(&self) -> &WidgetBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut WidgetBase {
        &mut self.base
    }

    fn type_name(&self) -> &'static str {
        "Panel"
    }

    fn preferred_size(&mut self, max_width: Option<i32>, max_height: Option<i32>) -> Result<Size> {
        self.inner.preferred_size(&self.base, max_width, max_height)
    }

    fn layout(&mut self, width: i32, height: i32) -> Result<()> {
        self.base.begin_layout(width, height);
        self.inner.layout(&self.base, width, height)
    }

    fn paint(&mut self, canvas: &mut dyn Canvas, x: i32, y: i32, width: i32, height: i32) -> Result<()> {
        let rect = Rect::new(x, y, width, height);
        self.base.set_last_rect(rect);
        if measure::needs_relayout(&self.base, &self.inner.children(), width, height) {
            self.layout(width, height)?;
        }

        let radii = self.radii.resolve(width, height);
        if self.background.is_visible() {
            canvas.fill_rect(rect, radii, self.background);
        }
        if self.inner.border_width > 0 && self.border_color.is_visible() {
            canvas.stroke_rect(rect, radii, self.inner.border_width, self.border_color);
        }

        canvas.save();
        canvas.clip_rect(rect, radii);
        let painted = self.inner.paint_child(canvas, x, y);
        canvas.restore();
        painted
    }

    fn hit_test(&self, x: i32, y: i32) -> Option<WidgetRef> {
        measure::hit_test_children(&self.inner.children(), x, y)
    }

    fn children(&self) -> Vec<WidgetRef> {
        self.inner.children()
    }

    fn invalidate_layout_cache(&mut self) {
        self.inner.invalidate();
    }
}

/// Transparent wrapper that overrides the cross-axis alignment a linear box
/// uses for its child. Sizing is read through from the child.
pub struct CrossAligned {
    base: WidgetBase,
    child: WidgetRef,
    align: Align,
}

impl CrossAligned {
    pub fn new(child: impl IntoWidgetRef, align: impl Into<Align>) -> Self {
        let child = child.into_widget_ref();
        let (width, height) = match child.try_borrow() {
            Ok(c) => (c.width_sizing(), c.height_sizing()),
            Err(_) => (Sizing::Auto, Sizing::Auto),
        };
        Self {
            base: WidgetBase::with_sizing(width, height),
            child,
            align: align.into(),
        }
    }

    fn refresh_sizing(&mut self) {
        if let Ok(c) = self.child.try_borrow() {
            let (w, h) = (c.width_sizing(), c.height_sizing());
            self.base.width.write(w);
            self.base.height.write(h);
        }
    }
}

impl Widget for CrossAligned {
    fn base(&self) -> &WidgetBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut WidgetBase {
        &mut self.base
    }

    fn type_name(&self) -> &'static str {
        "CrossAligned"
    }

    fn width_sizing(&self) -> Sizing {
        self.child.try_borrow().map_or(self.base.width(), |c| c.width_sizing())
    }

    fn height_sizing(&self) -> Sizing {
        self.child.try_borrow().map_or(self.base.height(), |c| c.height_sizing())
    }

    fn preferred_size(&mut self, max_width: Option<i32>, max_height: Option<i32>) -> Result<Size> {
        self.refresh_sizing();
        measure::preferred_size(&self.child, max_width, max_height)
    }

    fn layout(&mut self, width: i32, height: i32) -> Result<()> {
        self.base.begin_layout(width, height);
        measure::layout_child(&self.child, Rect::new(0, 0, width, height))
    }

    fn paint(&mut self, canvas: &mut dyn Canvas, x: i32, y: i32, width: i32, height: i32) -> Result<()> {
        self.base.set_last_rect(Rect::new(x, y, width, height));
        if measure::needs_relayout(&self.base, std::slice::from_ref(&self.child), width, height) {
            self.layout(width, height)?;
        }
        measure::paint_child(&self.child, canvas, x, y)?;
        Ok(())
    }

    fn hit_test(&self, x: i32, y: i32) -> Option<WidgetRef> {
        measure::hit_test_children(std::slice::from_ref(&self.child), x, y)
    }

    fn children(&self) -> Vec<WidgetRef> {
        vec![self.child.clone()]
    }

    fn cross_align(&self) -> Option<Align> {
        Some(self.align)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::{DisplayList, DrawOp};
    use crate::widget::shared;

    #[test]
    fn test_leaf_caps_to_bounds_unless_fixed() {
        let mut leaf = Leaf::new(40, 20);
        assert_eq!(leaf.preferred_size(Some(30), Some(30)).unwrap(), Size::new(30, 20));
        leaf.set_width(Sizing::Fixed(50.0));
        assert_eq!(leaf.preferred_size(Some(30), None).unwrap(), Size::new(50, 20));
    }

    #[test]
    fn test_spacer_reports_fixed_extents() {
        let mut empty = Spacer::new();
        assert_eq!(empty.preferred_size(None, None).unwrap(), Size::ZERO);
        let mut sized = Spacer::sized(Sizing::Fixed(12.0), Sizing::Flex(1.0));
        assert_eq!(sized.preferred_size(Some(5), None).unwrap(), Size::new(12, 0));
    }

    #[test]
    fn test_container_preferred_adds_padding() {
        let mut c = Container::new()
            .padding(Padding::all(4))
            .child(Leaf::new(30, 10));
        assert_eq!(c.preferred_size(None, None).unwrap(), Size::new(38, 18));
        // cap reaches the child minus padding
        assert_eq!(c.preferred_size(Some(20), None).unwrap(), Size::new(20, 18));
    }

    #[test]
    fn test_container_fixed_size_wins() {
        let mut c = Container::new()
            .width(Sizing::Fixed(100.0))
            .child(Leaf::new(30, 10));
        assert_eq!(c.preferred_size(Some(50), None).unwrap(), Size::new(100, 10));
    }

    #[test]
    fn test_container_centers_child() {
        let leaf = shared(Leaf::new(20, 10));
        let mut c = Container::new()
            .align(AlignPair::CENTER)
            .padding(Padding::all(5))
            .child(crate::widget::erase(&leaf));
        c.layout(100, 50).unwrap();
        assert_eq!(leaf.borrow().layout_rect(), Some(Rect::new(40, 20, 20, 10)));
    }

    #[test]
    fn test_container_paint_lays_out_and_hit_tests() {
        let leaf = shared(Leaf::new(20, 10).fill(Color::WHITE));
        let mut c = Container::new().child(crate::widget::erase(&leaf));
        let mut list = DisplayList::new();
        c.paint(&mut list, 10, 10, 100, 100).unwrap();
        assert_eq!(leaf.borrow().base().last_rect(), Some(Rect::new(10, 10, 20, 10)));
        assert_eq!(list.filled_rects(), vec![Rect::new(10, 10, 20, 10)]);
        assert!(c.hit_test(15, 15).is_some());
        assert!(c.hit_test(90, 90).is_none());
    }

    #[test]
    fn test_panel_border_is_an_inset() {
        let leaf = shared(Leaf::new(10, 10));
        let mut panel = Panel::new()
            .border(2, Color::BLACK)
            .padding(Padding::all(3))
            .child(crate::widget::erase(&leaf));
        assert_eq!(panel.preferred_size(None, None).unwrap(), Size::new(20, 20));
        panel.layout(20, 20).unwrap();
        assert_eq!(leaf.borrow().layout_rect(), Some(Rect::new(5, 5, 10, 10)));
    }

    #[test]
    fn test_panel_paints_fill_stroke_and_clips_child() {
        let mut panel = Panel::new()
            .background(Color::WHITE)
            .border(1, Color::BLACK)
            .corner_radii(0.5)
            .child(Leaf::new(5, 5).fill(Color::BLACK));
        let mut list = DisplayList::new();
        panel.paint(&mut list, 0, 0, 40, 20).unwrap();

        let ops = list.ops();
        assert_eq!(ops.len(), 3);
        match &ops[0] {
            DrawOp::Fill { radii, clip, .. } => {
                assert_eq!(*radii, CornerRadii::all(5.0));
                assert_eq!(*clip, None);
            }
            other => panic!("expected fill, got {other:?}"),
        }
        assert!(matches!(ops[1], DrawOp::Stroke { width: 1, .. }));
        match &ops[2] {
            DrawOp::Fill { clip, .. } => assert_eq!(*clip, Some(Rect::new(0, 0, 40, 20))),
            other => panic!("expected child fill, got {other:?}"),
        }
        assert_eq!(list.current_clip(), None);
    }

    #[test]
    fn test_cross_aligned_reads_child_sizing() {
        let child = Leaf::new(10, 10).width(Sizing::Flex(2.0));
        let wrapper = CrossAligned::new(child, Align::End);
        assert_eq!(wrapper.width_sizing(), Sizing::Flex(2.0));
        assert_eq!(wrapper.cross_align(), Some(Align::End));
    }

    #[test]
    fn test_cross_aligned_child_fills_rect() {
        let leaf = shared(Leaf::new(10, 10));
        let mut wrapper = CrossAligned::new(crate::widget::erase(&leaf), Align::Center);
        wrapper.layout(30, 12).unwrap();
        assert_eq!(leaf.borrow().layout_rect(), Some(Rect::new(0, 0, 30, 12)));
    }
}
