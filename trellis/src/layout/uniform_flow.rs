//! Tile grid with equal-width columns.
//!
//! The column count is explicit, derived from a maximum column width, or one
//! per item. Remainder pixels of the width split go to the earliest columns.
//! With an aspect ratio every row is as tall as its tiles' ratio height.

use super::alignment::{Align, AlignPair};
use super::expand;
use super::for_each::{ForEach, Items};
use super::measure::{self, child_bound, resolve_preferred};
use super::metrics::{align_offset, prefix_offsets};
use super::padding::Padding;
use super::sizing::Sizing;
use crate::canvas::Canvas;
use crate::error::Result;
use crate::primitives::{Rect, Size};
use crate::widget::{IntoWidgetRef, Widget, WidgetBase, WidgetRef};

pub struct UniformFlow {
    base: WidgetBase,
    children: Vec<WidgetRef>,
    columns: Option<usize>,
    max_column_width: Option<i32>,
    aspect_ratio: Option<f64>,
    main_gap: i32,
    cross_gap: i32,
    main_alignment: Align,
    run_alignment: Align,
    item_alignment: AlignPair,
}

impl UniformFlow {
    pub fn new() -> Self {
        Self {
            base: WidgetBase::new(),
            children: Vec::new(),
            columns: None,
            max_column_width: None,
            aspect_ratio: None,
            main_gap: 0,
            cross_gap: 0,
            main_alignment: Align::Start,
            run_alignment: Align::Start,
            item_alignment: AlignPair::uniform(Align::Stretch),
        }
    }

    /// A tile grid whose only child is a [`ForEach`] over `items`.
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

    /// Explicit column count; zero clears it.
    pub fn columns(mut self, columns: usize) -> Self {
        self.columns = (columns > 0).then_some(columns);
        self
    }

    pub fn max_column_width(mut self, width: i32) -> Self {
        self.max_column_width = (width > 0).then_some(width);
        self
    }

    /// Tile width over height.
    pub fn aspect_ratio(mut self, ratio: f64) -> Self {
        self.aspect_ratio = (ratio.is_finite() && ratio > 0.0).then_some(ratio);
        self
    }

    pub fn main_gap(mut self, gap: i32) -> Self {
        self.main_gap = gap.max(0);
        self
    }

    pub fn cross_gap(mut self, gap: i32) -> Self {
        self.cross_gap = gap.max(0);
        self
    }

    pub fn main_alignment(mut self, align: impl Into<Align>) -> Self {
        self.main_alignment = align.into();
        self
    }

    pub fn run_alignment(mut self, align: impl Into<Align>) -> Self {
        self.run_alignment = align.into();
        self
    }

    /// Placement inside each cell. `Stretch` on an axis fills the cell.
    pub fn item_alignment(mut self, align: impl Into<AlignPair>) -> Self {
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

    /// Column count for `count` items across `available` pixels.
    pub fn resolve_columns(&self, count: usize, available: i32) -> usize {
        let count = count.max(1);
        if let Some(columns) = self.columns {
            return columns.min(count).max(1);
        }
        if let Some(mcw) = self.max_column_width {
            let denom = mcw + self.main_gap;
            if available > 0 && denom > 0 {
                let fit = ((available + self.main_gap) / denom).max(1) as usize;
                return fit.min(count);
            }
        }
        count
    }

    /// Column count used when measured without a width bound.
    pub fn intrinsic_columns(&self, count: usize) -> usize {
        let count = count.max(1);
        if let Some(columns) = self.columns {
            return columns.min(count).max(1);
        }
        if self.max_column_width.is_some() {
            let guess = ((count as f64).sqrt() as usize).max(1);
            return guess.min(count);
        }
        count
    }

    /// Tile height for a column width: ratio height rounded half to even,
    /// at least 1. Without a ratio the width itself.
    pub fn height_from_aspect(&self, width: i32) -> i32 {
        match self.aspect_ratio {
            Some(ratio) => ((f64::from(width) / ratio).round_ties_even() as i32).max(1),
            None => width.max(0),
        }
    }

    fn gaps(gap: i32, n: usize) -> i32 {
        gap * (n.saturating_sub(1) as i32)
    }

    fn column_widths(&self, cols: usize, inner_w: i32, children: &[WidgetRef]) -> Result<Vec<i32>> {
        let usable = (inner_w - Self::gaps(self.main_gap, cols)).max(0);
        if usable > 0 {
            let base = usable / cols as i32;
            let rem = (usable - base * cols as i32) as usize;
            return Ok((0..cols).map(|i| base + i32::from(i < rem)).collect());
        }
        let mut widths = vec![0; cols];
        for (i, child) in children.iter().enumerate() {
            let pref = measure::preferred_size(child, None, None)?;
            widths[i % cols] = widths[i % cols].max(pref.width);
        }
        Ok(widths)
    }

    fn row_heights(&self, rows: usize, col_widths: &[i32], children: &[WidgetRef]) -> Result<Vec<i32>> {
        let cols = col_widths.len().max(1);
        let mut heights = vec![0; rows];
        for (i, child) in children.iter().enumerate() {
            let col = i % cols;
            let row = (i / cols).min(rows - 1);
            let cell_w = col_widths.get(col).copied();
            let height = match (self.aspect_ratio, cell_w) {
                (Some(_), Some(w)) => self.height_from_aspect(w),
                _ => measure::preferred_size(child, cell_w, None)?.height,
            };
            heights[row] = heights[row].max(height);
        }
        if self.aspect_ratio.is_some() {
            if let Some(&first) = col_widths.first() {
                let fallback = self.height_from_aspect(first);
                for h in heights.iter_mut().filter(|h| **h == 0) {
                    *h = fallback;
                }
            }
        }
        Ok(heights)
    }

    fn content_size(&self, children: &[WidgetRef], inner_max_w: Option<i32>) -> Result<Size> {
        let count = children.len();
        let (cols, col_limit) = match inner_max_w.filter(|w| *w > 0) {
            Some(limit) => {
                let cols = self.resolve_columns(count, limit);
                let usable = (limit - Self::gaps(self.main_gap, cols)).max(0);
                let col_limit = if usable > 0 { usable / cols as i32 } else { limit };
                (cols, Some(col_limit))
            }
            None => (self.intrinsic_columns(count), inner_max_w),
        };
        let rows = count.div_ceil(cols).max(1);

        let mut tile = Size::ZERO;
        for child in children {
            let pref = measure::preferred_size(child, col_limit, None)?;
            tile.width = tile.width.max(pref.width);
            tile.height = tile.height.max(pref.height);
        }
        if self.aspect_ratio.is_some() && tile.width > 0 {
            tile.height = tile.height.max(self.height_from_aspect(tile.width));
        }
        Ok(Size::new(
            cols as i32 * tile.width + Self::gaps(self.main_gap, cols),
            rows as i32 * tile.height + Self::gaps(self.cross_gap, rows),
        ))
    }
}

impl Default for UniformFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl Widget for UniformFlow {
    fn base(&self) -> &WidgetBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut WidgetBase {
        &mut self.base
    }

    fn type_name(&self) -> &'static str {
        "UniformFlow"
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

        let cols = self.resolve_columns(children.len(), inner_w);
        let rows = children.len().div_ceil(cols).max(1);
        let col_widths = self.column_widths(cols, inner_w, &children)?;
        let row_heights = self.row_heights(rows, &col_widths, &children)?;

        let content_w = col_widths.iter().sum::<i32>() + Self::gaps(self.main_gap, cols);
        let content_h = row_heights.iter().sum::<i32>() + Self::gaps(self.cross_gap, rows);
        let start_x = pad.left() + align_offset(inner_w, content_w, self.main_alignment);
        let start_y = pad.top() + align_offset(inner_h, content_h, self.run_alignment);
        let col_offsets = prefix_offsets(&col_widths, self.main_gap);
        let row_offsets = prefix_offsets(&row_heights, self.cross_gap);

        let AlignPair { horizontal, vertical } = self.item_alignment;
        for (i, child) in children.iter().enumerate() {
            let (r, c) = (i / cols, i % cols);
            let (cell_w, cell_h) = (col_widths[c], row_heights[r]);
            let mut x = start_x + col_offsets[c];
            let mut y = start_y + row_offsets[r];
            let (mut w, mut h) = (cell_w, cell_h);

            let pref = measure::preferred_size(child, Some(cell_w), None)?;
            if horizontal != Align::Stretch {
                w = pref.width.min(cell_w);
                x += align_offset(cell_w, w, horizontal);
            }
            if vertical != Align::Stretch {
                h = pref.height.min(cell_h);
                y += align_offset(cell_h, h, vertical);
            }
            measure::layout_child(child, Rect::new(x, y, w, h))?;
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
