//! Linear box: children placed one after another along a main axis.
//!
//! `LinearBox::row()` flows left to right, `LinearBox::column()` top to
//! bottom. Main-axis space goes to Fixed and Auto children first, at their
//! base size even when that overflows; Flex children split what is left by
//! weight. Nothing is clawed back when the box is too small.

use serde::{Deserialize, Serialize};

use super::alignment::{Align, MainAxisAlignment};
use super::expand;
use super::for_each::{ForEach, Items};
use super::measure::{self, child_bound, resolve_preferred};
use super::metrics::{align_offset, distribute_flex, distribute_main_axis_offsets, FlexInput};
use super::padding::Padding;
use super::sizing::Sizing;
use crate::canvas::Canvas;
use crate::error::Result;
use crate::primitives::{Rect, Size};
use crate::widget::{IntoWidgetRef, Widget, WidgetBase, WidgetRef};

/// Direction of the main axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Axis {
    #[default]
    Horizontal,
    Vertical,
}

impl Axis {
    #[inline]
    pub fn main(self, size: Size) -> i32 {
        match self {
            Axis::Horizontal => size.width,
            Axis::Vertical => size.height,
        }
    }

    #[inline]
    pub fn cross(self, size: Size) -> i32 {
        match self {
            Axis::Horizontal => size.height,
            Axis::Vertical => size.width,
        }
    }

    #[inline]
    pub fn size(self, main: i32, cross: i32) -> Size {
        match self {
            Axis::Horizontal => Size::new(main, cross),
            Axis::Vertical => Size::new(cross, main),
        }
    }

    #[inline]
    fn rect(self, main_offset: i32, cross_offset: i32, main: i32, cross: i32) -> Rect {
        match self {
            Axis::Horizontal => Rect::new(main_offset, cross_offset, main, cross),
            Axis::Vertical => Rect::new(cross_offset, main_offset, cross, main),
        }
    }

    fn main_sizing(self, widget: &dyn Widget) -> Sizing {
        match self {
            Axis::Horizontal => widget.width_sizing(),
            Axis::Vertical => widget.height_sizing(),
        }
    }

    fn cross_sizing(self, widget: &dyn Widget) -> Sizing {
        match self {
            Axis::Horizontal => widget.height_sizing(),
            Axis::Vertical => widget.width_sizing(),
        }
    }

    /// Measurement caps with only the cross axis bounded.
    fn bounds(self, cross: Option<i32>) -> (Option<i32>, Option<i32>) {
        match self {
            Axis::Horizontal => (None, cross),
            Axis::Vertical => (cross, None),
        }
    }
}

/// A row or column of children.
pub struct LinearBox {
    base: WidgetBase,
    axis: Axis,
    children: Vec<WidgetRef>,
    gap: i32,
    main_alignment: MainAxisAlignment,
    cross_alignment: Align,
}

impl LinearBox {
    pub fn new(axis: Axis) -> Self {
        Self {
            base: WidgetBase::new(),
            axis,
            children: Vec::new(),
            gap: 0,
            main_alignment: MainAxisAlignment::Start,
            cross_alignment: Align::Start,
        }
    }

    pub fn row() -> Self {
        Self::new(Axis::Horizontal)
    }

    pub fn column() -> Self {
        Self::new(Axis::Vertical)
    }

    /// A box whose only child is a [`ForEach`] over `items`.
    pub fn builder<T: Clone + PartialEq + 'static>(
        axis: Axis,
        items: impl Into<Items<T>>,
        build: impl Fn(&T, usize) -> anyhow::Result<WidgetRef> + 'static,
    ) -> Self {
        Self::new(axis).child(ForEach::new(items, build))
    }

    pub fn child(mut self, child: impl IntoWidgetRef) -> Self {
        self.children.push(child.into_widget_ref());
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = WidgetRef>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn gap(mut self, gap: i32) -> Self {
        self.gap = gap.max(0);
        self
    }

    pub fn main_alignment(mut self, alignment: impl Into<MainAxisAlignment>) -> Self {
        self.main_alignment = alignment.into();
        self
    }

    pub fn cross_alignment(mut self, alignment: impl Into<Align>) -> Self {
        self.cross_alignment = alignment.into();
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

    pub fn axis(&self) -> Axis {
        self.axis
    }

    pub fn push(&mut self, child: impl IntoWidgetRef) {
        self.children.push(child.into_widget_ref());
        self.invalidate();
    }

    fn total_gap(&self, count: usize) -> i32 {
        self.gap * (count.saturating_sub(1) as i32)
    }

    /// Cross extent for one child.
    fn cross_extent(&self, child: &dyn Widget, pref: i32, available: i32) -> i32 {
        let align = child.cross_align().unwrap_or(self.cross_alignment);
        let sizing = self.axis.cross_sizing(child);
        // A fixed extent wins over Stretch.
        let size = match sizing {
            Sizing::Fixed(_) => sizing.fixed_px().unwrap_or(0),
            Sizing::Flex(_) if available > 0 => available,
            Sizing::Auto if align == Align::Stretch && available > 0 => available,
            Sizing::Flex(_) | Sizing::Auto => pref,
        };
        if available > 0 { size.min(available) } else { size }
    }
}

impl Widget for LinearBox {
    fn base(&self) -> &WidgetBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut WidgetBase {
        &mut self.base
    }

    fn type_name(&self) -> &'static str {
        match self.axis {
            Axis::Horizontal => "Row",
            Axis::Vertical => "Column",
        }
    }

    fn preferred_size(&mut self, max_width: Option<i32>, max_height: Option<i32>) -> Result<Size> {
        let pad = self.base.padding();
        let cross_bound = match self.axis {
            Axis::Horizontal => child_bound(self.base.height(), max_height, pad.vertical()),
            Axis::Vertical => child_bound(self.base.width(), max_width, pad.horizontal()),
        };
        let (bw, bh) = self.axis.bounds(cross_bound);

        let children = expand::layout_children(&self.children);
        let mut main = self.total_gap(children.len());
        let mut cross = 0;
        for child in &children {
            let pref = measure::preferred_size(child, bw, bh)?;
            main += self.axis.main(pref);
            cross = cross.max(self.axis.cross(pref));
        }

        let content = self.axis.size(main, cross);
        let content = Size::new(content.width + pad.horizontal(), content.height + pad.vertical());
        Ok(resolve_preferred(self.base.width(), self.base.height(), content, max_width, max_height))
    }

    fn layout(&mut self, width: i32, height: i32) -> Result<()> {
        self.base.begin_layout(width, height);
        let pad = self.base.padding();
        let inner = Size::new(
            (width - pad.horizontal()).max(0),
            (height - pad.vertical()).max(0),
        );
        let (main_extent, cross_extent) = (self.axis.main(inner), self.axis.cross(inner));
        let (main_origin, cross_origin) = match self.axis {
            Axis::Horizontal => (pad.left(), pad.top()),
            Axis::Vertical => (pad.top(), pad.left()),
        };

        let children = expand::layout_children(&self.children);
        let (bw, bh) = self.axis.bounds(Some(cross_extent));
        let mut prefs = Vec::with_capacity(children.len());
        let mut inputs = Vec::with_capacity(children.len());
        for child in &children {
            let pref = measure::preferred_size(child, bw, bh)?;
            let sizing = child
                .try_borrow()
                .map_or(Sizing::Auto, |c| self.axis.main_sizing(&*c));
            inputs.push(FlexInput::from_sizing(sizing, self.axis.main(pref)));
            prefs.push(pref);
        }

        let usable = (main_extent - self.total_gap(children.len())).max(0);
        let alloc = distribute_flex(&inputs, usable);
        let offsets = distribute_main_axis_offsets(&alloc, main_extent, self.gap, self.main_alignment);

        for (i, child) in children.iter().enumerate() {
            let (cross_size, align) = match child.try_borrow() {
                Ok(c) => (
                    self.cross_extent(&*c, self.axis.cross(prefs[i]), cross_extent),
                    c.cross_align().unwrap_or(self.cross_alignment),
                ),
                Err(_) => (self.axis.cross(prefs[i]), self.cross_alignment),
            };
            let cross_offset = cross_origin + align_offset(cross_extent, cross_size, align);
            let rect = self
                .axis
                .rect(main_origin + offsets[i], cross_offset, alloc[i], cross_size);
            measure::layout_child(child, rect)?;
        }
        Ok(())
    }

    fn paint(&mut self, canvas: &mut dyn Canvas, x: i32, y: i32, width: i32, height: i32) -> Result<()> {
        self.base.set_last_rect(Rect::new(x, y, width, height));
        let children = expand::layout_children(&self.children);
        if measure::needs_relayout(&self.base, &children, width, height) {
            self.layout(width, height)?;
        }
        for child in &children {
            measure::paint_child(child, canvas, x, y)?;
        }
        Ok(())
    }

    fn hit_test(&self, x: i32, y: i32) -> Option<WidgetRef> {
        measure::hit_test_children(&expand::layout_children(&self.children), x, y)
    }

    fn children(&self) -> Vec<WidgetRef> {
        self.children.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::container::Leaf;
    use crate::error::LayoutError;
    use crate::widget::{erase, shared};

    fn rects(children: &[std::rc::Rc<std::cell::RefCell<Leaf>>]) -> Vec<Rect> {
        children
            .iter()
            .map(|c| c.borrow().layout_rect().unwrap_or_default())
            .collect()
    }

    #[test]
    fn test_fixed_then_flex_split() {
        let a = shared(Leaf::new(10, 10).width(Sizing::Fixed(50.0)));
        let b = shared(Leaf::new(10, 10).width(Sizing::Flex(1.0)));
        let c = shared(Leaf::new(10, 10).width(Sizing::Flex(1.0)));
        let mut row = LinearBox::row().child(erase(&a)).child(erase(&b)).child(erase(&c));
        row.layout(200, 20).unwrap();
        let widths: Vec<i32> = rects(&[a, b, c]).iter().map(|r| r.width).collect();
        assert_eq!(widths, vec![50, 75, 75]);
    }

    #[test]
    fn test_overflow_no_clawback() {
        let a = shared(Leaf::new(10, 10).width(Sizing::Fixed(60.0)));
        let b = shared(Leaf::new(10, 10).width(Sizing::Flex(1.0)));
        let mut row = LinearBox::row().child(erase(&a)).child(erase(&b));
        row.layout(50, 20).unwrap();
        let widths: Vec<i32> = rects(&[a, b]).iter().map(|r| r.width).collect();
        assert_eq!(widths, vec![60, 0]);
    }

    #[test]
    fn test_flex_allocations_fill_usable_space() {
        let leaves: Vec<_> = [Sizing::Fixed(13.0), Sizing::Flex(1.0), Sizing::Flex(2.0), Sizing::Auto]
            .into_iter()
            .map(|s| shared(Leaf::new(7, 5).width(s)))
            .collect();
        let mut row = LinearBox::row().gap(3).padding(Padding::all(2));
        for leaf in &leaves {
            row.push(erase(leaf));
        }
        row.layout(104, 30).unwrap();
        let total: i32 = rects(&leaves).iter().map(|r| r.width).sum();
        // 104 - 4 padding - 9 gaps
        assert_eq!(total, 91);
        let first = rects(&leaves)[0];
        assert_eq!((first.x, first.y), (2, 2));
    }

    #[test]
    fn test_column_center_preferred_and_offsets() {
        let a = shared(Leaf::new(60, 20));
        let b = shared(Leaf::new(60, 20));
        let mut col = LinearBox::column()
            .gap(5)
            .main_alignment("center")
            .cross_alignment(Align::Center)
            .child(erase(&a))
            .child(erase(&b));
        assert_eq!(col.preferred_size(None, None).unwrap(), Size::new(60, 45));

        col.layout(200, 200).unwrap();
        let r = rects(&[a, b]);
        assert_eq!(r[0], Rect::new(70, 77, 60, 20));
        assert_eq!(r[1], Rect::new(70, 102, 60, 20));
    }

    #[test]
    fn test_cross_stretch_and_override() {
        use crate::layout::container::CrossAligned;

        let a = shared(Leaf::new(10, 10));
        let b = shared(Leaf::new(10, 10));
        let mut row = LinearBox::row()
            .cross_alignment(Align::Stretch)
            .child(erase(&a))
            .child(CrossAligned::new(erase(&b), Align::End));
        row.layout(100, 40).unwrap();
        assert_eq!(a.borrow().layout_rect(), Some(Rect::new(0, 0, 10, 40)));
        // wrapper sits at the end of the cross axis
        let wrapper = &row.children()[1];
        assert_eq!(wrapper.borrow().layout_rect(), Some(Rect::new(10, 30, 10, 10)));
    }

    #[test]
    fn test_stretch_keeps_fixed_cross_size() {
        let fixed = shared(Leaf::new(10, 10).height(Sizing::Fixed(25.0)));
        let auto = shared(Leaf::new(10, 10));
        let mut row = LinearBox::row()
            .cross_alignment(Align::Stretch)
            .child(erase(&fixed))
            .child(erase(&auto));
        row.layout(100, 40).unwrap();
        assert_eq!(fixed.borrow().layout_rect(), Some(Rect::new(0, 0, 10, 25)));
        assert_eq!(auto.borrow().layout_rect(), Some(Rect::new(10, 0, 10, 40)));
    }

    #[test]
    fn test_negative_padding_cannot_reach_layout() {
        assert!(matches!(
            Padding::parse((-10, -5, 0, 0)),
            Err(LayoutError::InvalidPadding(_))
        ));
        let leaf = shared(Leaf::new(10, 10));
        let mut row = LinearBox::row().padding(Padding::all(-10)).child(erase(&leaf));
        row.layout(100, 20).unwrap();
        assert_eq!(row.padding_insets(), Padding::ZERO);
        assert_eq!(leaf.borrow().layout_rect(), Some(Rect::new(0, 0, 10, 10)));
    }

    #[test]
    fn test_padding_builder_and_accessor_coexist() {
        let row = LinearBox::row().padding(Padding::all(4));
        assert_eq!(row.padding_insets(), Padding::all(4));
        let erased: &dyn Widget = &row;
        assert_eq!(erased.padding_insets().horizontal(), 8);
    }

    /// Fails at layout and paint; structural when asked to be.
    struct Faulty {
        base: WidgetBase,
        structural: bool,
    }

    impl Faulty {
        fn new(structural: bool) -> Self {
            Self { base: WidgetBase::new(), structural }
        }
    }

    impl Widget for Faulty {
        fn base(&self) -> &WidgetBase {
            &self.base
        }

        fn base_mut(&mut self) -> &mut WidgetBase {
            &mut self.base
        }

        fn preferred_size(&mut self, _: Option<i32>, _: Option<i32>) -> Result<Size> {
            Ok(Size::new(10, 10))
        }

        fn layout(&mut self, _: i32, _: i32) -> Result<()> {
            if self.structural {
                return Err(LayoutError::InvalidPlacement("bad cell".into()));
            }
            Err(LayoutError::Widget("layout exploded".into()))
        }

        fn paint(&mut self, _: &mut dyn Canvas, _: i32, _: i32, _: i32, _: i32) -> Result<()> {
            Err(LayoutError::Widget("paint exploded".into()))
        }
    }

    #[test]
    fn test_failing_child_does_not_stop_siblings() {
        use crate::canvas::DisplayList;
        use crate::primitives::Color;

        let sibling = shared(Leaf::new(20, 10).fill(Color::WHITE));
        let mut row = LinearBox::row()
            .child(Faulty::new(false))
            .child(erase(&sibling));
        row.layout(100, 10).unwrap();
        assert_eq!(sibling.borrow().layout_rect(), Some(Rect::new(10, 0, 20, 10)));

        let mut list = DisplayList::new();
        row.paint(&mut list, 0, 0, 100, 10).unwrap();
        assert_eq!(list.filled_rects(), vec![Rect::new(10, 0, 20, 10)]);
    }

    #[test]
    fn test_structural_child_error_propagates() {
        let mut row = LinearBox::row().child(Faulty::new(true)).child(Leaf::new(5, 5));
        assert!(matches!(row.layout(100, 10), Err(LayoutError::InvalidPlacement(_))));
    }

    #[test]
    fn test_cross_fixed_and_flex_sizes() {
        let fixed = shared(Leaf::new(10, 10).height(Sizing::Fixed(25.0)));
        let flex = shared(Leaf::new(10, 10).height(Sizing::Flex(1.0)));
        let huge = shared(Leaf::new(10, 10).height(Sizing::Fixed(500.0)));
        let mut row = LinearBox::row()
            .child(erase(&fixed))
            .child(erase(&flex))
            .child(erase(&huge));
        row.layout(100, 40).unwrap();
        let heights: Vec<i32> = rects(&[fixed, flex, huge]).iter().map(|r| r.height).collect();
        assert_eq!(heights, vec![25, 40, 40]);
    }

    #[test]
    fn test_space_between() {
        let a = shared(Leaf::new(40, 10));
        let b = shared(Leaf::new(40, 10));
        let mut row = LinearBox::row()
            .main_alignment(MainAxisAlignment::SpaceBetween)
            .child(erase(&a))
            .child(erase(&b));
        row.layout(100, 10).unwrap();
        let xs: Vec<i32> = rects(&[a, b]).iter().map(|r| r.x).collect();
        assert_eq!(xs, vec![0, 60]);
    }

    #[test]
    fn test_preferred_caps_at_max() {
        let mut row = LinearBox::row()
            .gap(10)
            .child(Leaf::new(50, 10))
            .child(Leaf::new(50, 30));
        assert_eq!(row.preferred_size(None, None).unwrap(), Size::new(110, 30));
        assert_eq!(row.preferred_size(Some(80), Some(20)).unwrap(), Size::new(80, 20));
    }

    #[test]
    fn test_builder_expands_items() {
        let mut col = LinearBox::builder(Axis::Vertical, vec![5, 7], |v: &i32, _| {
            Ok(Leaf::new(*v, *v).into_widget_ref())
        });
        assert_eq!(col.preferred_size(None, None).unwrap(), Size::new(7, 12));
        col.layout(20, 20).unwrap();
        let mut list = crate::canvas::DisplayList::new();
        col.paint(&mut list, 0, 0, 20, 20).unwrap();
        assert!(col.hit_test(1, 6).is_some());
    }
}
