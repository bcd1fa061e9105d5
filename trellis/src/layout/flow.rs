//! Wrapping flow: children fill a line left to right and wrap onto new lines.

use std::ops::Range;

use super::alignment::Align;
use super::expand;
use super::for_each::{ForEach, Items};
use super::measure::{self, child_bound, resolve_preferred};
use super::metrics::align_offset;
use super::padding::Padding;
use super::sizing::Sizing;
use crate::canvas::Canvas;
use crate::error::Result;
use crate::primitives::{Rect, Size};
use crate::widget::{IntoWidgetRef, Widget, WidgetBase, WidgetRef};

/// Split items of the given widths into lines.
///
/// An item wraps when its line is non-empty and it would end past
/// `available`. Without a positive bound everything stays on one line.
pub fn partition_lines(widths: &[i32], available: Option<i32>, gap: i32) -> Vec<Range<usize>> {
    let limit = available.filter(|a| *a > 0);
    let mut lines = Vec::new();
    let mut start = 0;
    let mut line_width = 0;
    for (i, &w) in widths.iter().enumerate() {
        let w = w.max(0);
        if i > start {
            if let Some(limit) = limit {
                if line_width + gap + w > limit {
                    lines.push(start..i);
                    start = i;
                    line_width = w;
                    continue;
                }
            }
            line_width += gap + w;
        } else {
            line_width = w;
        }
    }
    if start < widths.len() {
        lines.push(start..widths.len());
    }
    lines
}

/// Wrapping row-of-rows container.
pub struct Flow {
    base: WidgetBase,
    children: Vec<WidgetRef>,
    main_gap: i32,
    cross_gap: i32,
    main_alignment: Align,
    run_alignment: Align,
    item_alignment: Align,
}

impl Flow {
    pub fn new() -> Self {
        Self {
            base: WidgetBase::new(),
            children: Vec::new(),
            main_gap: 0,
            cross_gap: 0,
            main_alignment: Align::Start,
            run_alignment: Align::Start,
            item_alignment: Align::Start,
        }
    }

    /// A flow whose only child is a [`ForEach`] over `items`.
    pub fn builder<T: Clone + PartialEq + 'static>(
        items: impl Into<Items<T>>,
        build: impl Fn(&T, usize) -> anyhow::Result<WidgetRef> + 'static,
    ) -> Self {
        Self::new().child(ForEach::new(items, build))
    }

    pub fn child(mut self, child: impl IntoWidgetRef) -> Self {
        self.children.push(child.into_widget_ref());
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = WidgetRef>) -> Self {
        self.children.extend(children);
        self
    }

    /// Space between items on a line.
    pub fn main_gap(mut self, gap: i32) -> Self {
        self.main_gap = gap.max(0);
        self
    }

    /// Space between lines.
    pub fn cross_gap(mut self, gap: i32) -> Self {
        self.cross_gap = gap.max(0);
        self
    }

    /// Horizontal placement of each line.
    pub fn main_alignment(mut self, align: impl Into<Align>) -> Self {
        self.main_alignment = align.into();
        self
    }

    /// Vertical placement of the block of lines.
    pub fn run_alignment(mut self, align: impl Into<Align>) -> Self {
        self.run_alignment = align.into();
        self
    }

    /// Vertical placement of an item within its line.
    pub fn item_alignment(mut self, align: impl Into<Align>) -> Self {
        self.item_alignment = align.into();
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

    fn line_width(&self, sizes: &[Size], line: &Range<usize>) -> i32 {
        sizes[line.clone()].iter().map(|s| s.width).sum::<i32>()
            + self.main_gap * (line.len().saturating_sub(1) as i32)
    }

    fn line_height(sizes: &[Size], line: &Range<usize>) -> i32 {
        sizes[line.clone()].iter().map(|s| s.height).max().unwrap_or(0)
    }

    /// Content size when measured under `inner_max_w`.
    fn content_size(&self, children: &[WidgetRef], inner_max_w: Option<i32>) -> Result<Size> {
        let bound = inner_max_w.filter(|w| *w > 0);
        let mut sizes = Vec::with_capacity(children.len());
        for child in children {
            sizes.push(measure::preferred_size(child, bound, None)?);
        }
        let widths: Vec<i32> = sizes.iter().map(|s| s.width).collect();
        let lines = partition_lines(&widths, bound, self.main_gap);

        let widest = lines.iter().map(|l| self.line_width(&sizes, l)).max().unwrap_or(0);
        let total_h = lines.iter().map(|l| Self::line_height(&sizes, l)).sum::<i32>()
            + self.cross_gap * (lines.len().saturating_sub(1) as i32);

        let width = match bound {
            Some(limit) if widest > 0 => widest.min(limit),
            Some(limit) => limit,
            None => widest,
        };
        Ok(Size::new(width, total_h))
    }
}

impl Default for Flow {
    fn default() -> Self {
        Self::new()
    }
}

impl Widget for Flow {
    fn base(&self) -> &WidgetBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut WidgetBase {
        &mut self.base
    }

    fn type_name(&self) -> &'static str {
        "Flow"
    }

    fn preferred_size(&mut self, max_width: Option<i32>, max_height: Option<i32>) -> Result<Size> {
        let pad = self.base.padding();
        let children = expand::layout_children(&self.children);
        let content = if children.is_empty() {
            Size::ZERO
        } else {
            let inner_max_w = child_bound(self.base.width(), max_width, pad.horizontal());
            self.content_size(&children, inner_max_w)?
        };
        let outer = Size::new(content.width + pad.horizontal(), content.height + pad.vertical());
        Ok(resolve_preferred(self.base.width(), self.base.height(), outer, max_width, max_height))
    }

    fn layout(&mut self, width: i32, height: i32) -> Result<()> {
        self.base.begin_layout(width, height);
        let children = expand::layout_children(&self.children);
        if children.is_empty() {
            return Ok(());
        }

        let pad = self.base.padding();
        let inner_w = (width - pad.horizontal()).max(0);
        let inner_h = (height - pad.vertical()).max(0);

        let mut sizes = Vec::with_capacity(children.len());
        for child in &children {
            sizes.push(measure::preferred_size(child, Some(inner_w), Some(inner_h))?);
        }
        let widths: Vec<i32> = sizes.iter().map(|s| s.width).collect();
        let lines = partition_lines(&widths, Some(inner_w), self.main_gap);

        let heights: Vec<i32> = lines.iter().map(|l| Self::line_height(&sizes, l)).collect();
        let block_h = heights.iter().sum::<i32>()
            + self.cross_gap * (lines.len().saturating_sub(1) as i32);

        let mut y = pad.top() + align_offset(inner_h, block_h, self.run_alignment);
        for (line, line_h) in lines.iter().zip(heights) {
            let mut x = pad.left() + align_offset(inner_w, self.line_width(&sizes, line), self.main_alignment);
            for i in line.clone() {
                let size = sizes[i];
                let item_y = y + align_offset(line_h, size.height, self.item_alignment);
                measure::layout_child(&children[i], Rect::new(x, item_y, size.width, size.height))?;
                x += size.width + self.main_gap;
            }
            y += line_h + self.cross_gap;
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
