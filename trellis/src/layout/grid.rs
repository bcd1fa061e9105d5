//! Two-dimensional layout with explicit tracks.
//!
//! Every child is a [`GridItem`] placed either by `(row, column)` indices,
//! each a single index or a span, or by a named template area. Track lists
//! grow with Auto tracks to cover every placement.
//!
//! # Track sizing
//!
//! Fixed tracks start at their value, Auto and Flex at zero. Each placement
//! then tops up its non-fixed spanned tracks evenly until they cover its
//! preferred size minus the gaps it spans. Placements are applied one by one,
//! so a conflicting pair of spans settles on an adequate size rather than the
//! smallest one. At layout time Flex tracks share any space left over.

use std::ops::RangeInclusive;

use super::alignment::AlignPair;
use super::container::SingleChild;
use super::expand;
use super::for_each::{ForEach, Items};
use super::measure::{self, child_bound, resolve_preferred};
use super::padding::Padding;
use super::sizing::{self, Sizing, SizingSpec};
use crate::canvas::Canvas;
use crate::error::{LayoutError, Result};
use crate::log_once::error_once;
use crate::primitives::{Rect, Size};
use crate::widget::{IntoWidgetRef, Widget, WidgetBase, WidgetRef};

/// A row or column coordinate: one index, or any list of indices whose
/// min and max bound a span.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GridIndex {
    Single(i32),
    Span(Vec<i32>),
}

impl GridIndex {
    /// `(start, span)`, or `None` for an empty list.
    pub fn normalize(&self) -> Option<(i32, i32)> {
        match self {
            GridIndex::Single(i) => Some((*i, 1)),
            GridIndex::Span(values) => {
                let start = *values.iter().min()?;
                let end = *values.iter().max()?;
                Some((start, end - start + 1))
            }
        }
    }
}

impl From<i32> for GridIndex {
    fn from(index: i32) -> Self {
        GridIndex::Single(index)
    }
}

impl From<Vec<i32>> for GridIndex {
    fn from(values: Vec<i32>) -> Self {
        GridIndex::Span(values)
    }
}

impl<const N: usize> From<[i32; N]> for GridIndex {
    fn from(values: [i32; N]) -> Self {
        GridIndex::Span(values.to_vec())
    }
}

impl From<RangeInclusive<i32>> for GridIndex {
    fn from(range: RangeInclusive<i32>) -> Self {
        GridIndex::Span(vec![*range.start(), *range.end()])
    }
}

/// Placement a [`GridItem`] declares.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GridPlacement {
    Cell {
        row: Option<GridIndex>,
        column: Option<GridIndex>,
    },
    Area(String),
}

// =========================================================================
// GridItem
// =========================================================================

/// A single-child box carrying grid coordinates. Behaves like a
/// `Container` inside its cell; the default alignment is top-left.
pub struct GridItem {
    base: WidgetBase,
    inner: SingleChild,
    placement: GridPlacement,
}

impl GridItem {
    /// An item with no coordinates yet.
    pub fn new() -> Self {
        Self {
            base: WidgetBase::new(),
            inner: SingleChild::default(),
            placement: GridPlacement::Cell { row: None, column: None },
        }
    }

    pub fn at(row: impl Into<GridIndex>, column: impl Into<GridIndex>) -> Self {
        Self {
            placement: GridPlacement::Cell {
                row: Some(row.into()),
                column: Some(column.into()),
            },
            ..Self::new()
        }
    }

    pub fn area(name: impl Into<String>) -> Self {
        Self {
            placement: GridPlacement::Area(name.into()),
            ..Self::new()
        }
    }

    pub fn row(mut self, index: impl Into<GridIndex>) -> Self {
        match &mut self.placement {
            GridPlacement::Cell { row, .. } => *row = Some(index.into()),
            GridPlacement::Area(_) => {
                self.placement = GridPlacement::Cell {
                    row: Some(index.into()),
                    column: None,
                }
            }
        }
        self
    }

    pub fn column(mut self, index: impl Into<GridIndex>) -> Self {
        match &mut self.placement {
            GridPlacement::Cell { column, .. } => *column = Some(index.into()),
            GridPlacement::Area(_) => {
                self.placement = GridPlacement::Cell {
                    row: None,
                    column: Some(index.into()),
                }
            }
        }
        self
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
}

impl Default for GridItem {
    fn default() -> Self {
        Self::new()
    }
}

impl Widget for GridItem {
    fn base(&self) -> &WidgetBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut WidgetBase {
        &mut self.base
    }

    fn type_name(&self) -> &'static str {
        "GridItem"
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

    fn grid_placement(&self) -> Option<GridPlacement> {
        Some(self.placement.clone())
    }

    fn invalidate_layout_cache(&mut self) {
        self.inner.invalidate();
    }
}

// =========================================================================
// Grid
// =========================================================================

struct Resolved {
    child: WidgetRef,
    row: usize,
    column: usize,
    row_span: usize,
    column_span: usize,
    pref: Size,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TrackAxis {
    Rows,
    Columns,
}

impl TrackAxis {
    fn extent(self, p: &Resolved) -> (usize, usize, i32) {
        match self {
            TrackAxis::Rows => (p.row, p.row_span, p.pref.height),
            TrackAxis::Columns => (p.column, p.column_span, p.pref.width),
        }
    }
}

/// Parse a list of track literals (`80`, `"auto"`, `"50%"`).
pub fn parse_tracks<S: Into<SizingSpec>>(specs: impl IntoIterator<Item = S>) -> Result<Vec<Sizing>> {
    specs.into_iter().map(|s| sizing::parse(s, None)).collect()
}

/// Explicit-track grid.
pub struct Grid {
    base: WidgetBase,
    children: Vec<WidgetRef>,
    rows: Vec<Sizing>,
    columns: Vec<Sizing>,
    areas: Option<Vec<Vec<String>>>,
    row_gap: i32,
    column_gap: i32,
}

impl Grid {
    pub fn new() -> Self {
        Self {
            base: WidgetBase::new(),
            children: Vec::new(),
            rows: Vec::new(),
            columns: Vec::new(),
            areas: None,
            row_gap: 0,
            column_gap: 0,
        }
    }

    /// A grid with a named-area template. Every template row must have the
    /// same number of cells.
    pub fn named_areas<R, S>(areas: impl IntoIterator<Item = R>) -> Result<Self>
    where
        R: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let areas: Vec<Vec<String>> = areas
            .into_iter()
            .map(|row| row.into_iter().map(Into::into).collect())
            .collect();
        let mut grid = Self::new();
        if let Some(first) = areas.first() {
            let width = first.len();
            if areas.iter().any(|row| row.len() != width) {
                return Err(LayoutError::InvalidPlacement(
                    "all area rows must have the same number of columns".into(),
                ));
            }
            grid.areas = Some(areas);
        }
        Ok(grid)
    }

    /// A grid whose only child is a [`ForEach`] over `items`; the builder
    /// must return `GridItem`s.
    pub fn builder<T: Clone + PartialEq + 'static>(
        items: impl Into<Items<T>>,
        build: impl Fn(&T, usize) -> anyhow::Result<WidgetRef> + 'static,
    ) -> Self {
        Self::new().child(ForEach::new(items, build))
    }

    pub fn rows(mut self, rows: impl IntoIterator<Item = Sizing>) -> Self {
        self.rows = rows.into_iter().collect();
        self
    }

    pub fn columns(mut self, columns: impl IntoIterator<Item = Sizing>) -> Self {
        self.columns = columns.into_iter().collect();
        self
    }

    pub fn row_gap(mut self, gap: i32) -> Self {
        self.row_gap = gap.max(0);
        self
    }

    pub fn column_gap(mut self, gap: i32) -> Self {
        self.column_gap = gap.max(0);
        self
    }

    pub fn gap(self, gap: i32) -> Self {
        self.row_gap(gap).column_gap(gap)
    }

    pub fn child(mut self, child: impl IntoWidgetRef) -> Self {
        self.children.push(child.into_widget_ref());
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = WidgetRef>) -> Self {
        self.children.extend(children);
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

    /// Bounding box `(row, column, row_span, column_span)` of every cell
    /// named `name`.
    fn area_rect(&self, name: &str) -> Result<(i32, i32, i32, i32)> {
        let Some(areas) = &self.areas else {
            return Err(LayoutError::InvalidPlacement(format!(
                "grid has no areas defined (requested '{name}')"
            )));
        };
        let mut bounds: Option<(usize, usize, usize, usize)> = None;
        for (r, row) in areas.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                if cell == name {
                    bounds = Some(match bounds {
                        None => (r, r, c, c),
                        Some((r0, r1, c0, c1)) => (r0.min(r), r1.max(r), c0.min(c), c1.max(c)),
                    });
                }
            }
        }
        let (r0, r1, c0, c1) = bounds
            .ok_or_else(|| LayoutError::InvalidPlacement(format!("grid area '{name}' is not defined")))?;
        Ok((r0 as i32, c0 as i32, (r1 - r0 + 1) as i32, (c1 - c0 + 1) as i32))
    }

    fn resolve_placement(
        &self,
        child: &WidgetRef,
        rows: &mut Vec<Sizing>,
        columns: &mut Vec<Sizing>,
    ) -> Result<Option<Resolved>> {
        let placement = match child.try_borrow() {
            Ok(widget) => widget.grid_placement(),
            Err(_) => {
                error_once("grid.placement.reentrant", "grid child already borrowed; skipping it");
                return Ok(None);
            }
        };
        let (row, column, row_span, column_span) = match placement {
            None => {
                return Err(LayoutError::InvalidPlacement(
                    "grid children must be GridItem instances with explicit placement".into(),
                ));
            }
            Some(GridPlacement::Area(name)) => self.area_rect(&name)?,
            Some(GridPlacement::Cell { row, column }) => {
                let row = row.as_ref().and_then(GridIndex::normalize);
                let column = column.as_ref().and_then(GridIndex::normalize);
                let (Some((r, rs)), Some((c, cs))) = (row, column) else {
                    return Err(LayoutError::InvalidPlacement(
                        "GridItem requires an area or both row and column".into(),
                    ));
                };
                (r, c, rs.max(1), cs.max(1))
            }
        };
        if row < 0 || column < 0 {
            return Err(LayoutError::InvalidPlacement(format!(
                "grid indices must be non-negative (row {row}, column {column})"
            )));
        }

        let (row, column) = (row as usize, column as usize);
        let (row_span, column_span) = (row_span as usize, column_span as usize);
        extend_tracks(rows, row + row_span);
        extend_tracks(columns, column + column_span);
        Ok(Some(Resolved {
            child: child.clone(),
            row,
            column,
            row_span,
            column_span,
            pref: Size::ZERO,
        }))
    }

    fn prepare(
        &self,
        max_width: Option<i32>,
        max_height: Option<i32>,
    ) -> Result<(Vec<Resolved>, Vec<Sizing>, Vec<Sizing>)> {
        let mut rows = self.rows.clone();
        let mut columns = self.columns.clone();
        let mut placements = Vec::new();
        for child in expand::layout_children(&self.children) {
            let Some(mut placement) = self.resolve_placement(&child, &mut rows, &mut columns)? else {
                continue;
            };
            placement.pref = measure::preferred_size(&child, max_width, max_height)?;
            placements.push(placement);
        }
        Ok((placements, rows, columns))
    }
}

impl Default for Grid {
    fn default() -> Self {
        Self::new()
    }
}

fn extend_tracks(tracks: &mut Vec<Sizing>, required: usize) {
    if tracks.len() < required {
        tracks.resize(required, Sizing::Auto);
    }
}

/// Base track sizes from fixed values and per-placement top-ups.
fn measure_tracks(tracks: &[Sizing], placements: &[Resolved], axis: TrackAxis, gap: i32) -> Vec<f64> {
    let mut sizes: Vec<f64> = tracks
        .iter()
        .map(|t| if t.is_fixed() { f64::from(t.value()) } else { 0.0 })
        .collect();

    for placement in placements {
        let (start, span, pref) = axis.extent(placement);
        let end = (start + span).min(tracks.len());
        if span == 0 || end <= start {
            continue;
        }
        let mut fixed_total = 0.0;
        let mut dynamic = Vec::new();
        for idx in start..end {
            if tracks[idx].is_fixed() {
                fixed_total += sizes[idx];
            } else {
                dynamic.push(idx);
            }
        }
        if dynamic.is_empty() {
            continue;
        }
        let spanned_gaps = f64::from(gap) * (span.saturating_sub(1) as f64);
        let target = (f64::from(pref) - spanned_gaps - fixed_total).max(0.0);
        let current: f64 = dynamic.iter().map(|&i| sizes[i]).sum();
        if current >= target {
            continue;
        }
        let per = (target - current) / dynamic.len() as f64;
        for idx in dynamic {
            sizes[idx] += per;
        }
    }
    sizes
}

/// Grow Flex tracks by weight when `available` exceeds the base sizes and gaps.
fn stretch_tracks(tracks: &[Sizing], sizes: Vec<f64>, gap: i32, available: i32) -> Vec<f64> {
    if sizes.is_empty() {
        return sizes;
    }
    let usable = f64::from(available) - f64::from(gap) * (sizes.len() - 1) as f64;
    if usable <= 0.0 {
        return sizes;
    }
    let remaining = usable - sizes.iter().sum::<f64>();
    if remaining <= 0.0 {
        return sizes;
    }
    let weights: Vec<f64> = tracks
        .iter()
        .map(|t| if t.is_flex() { f64::from(t.weight()) } else { 0.0 })
        .collect();
    let total: f64 = weights.iter().sum();
    if total <= 0.0 {
        return sizes;
    }
    let unit = remaining / total;
    sizes
        .into_iter()
        .zip(weights)
        .map(|(size, w)| size + w * unit)
        .collect()
}

fn track_positions(start: i32, sizes: &[f64], gap: i32) -> Vec<f64> {
    let mut cursor = f64::from(start);
    sizes
        .iter()
        .map(|size| {
            let at = cursor;
            cursor += size + f64::from(gap);
            at
        })
        .collect()
}

fn span_extent(sizes: &[f64], start: usize, end: usize, gap: i32) -> f64 {
    sizes[start..end].iter().sum::<f64>() + f64::from(gap) * (end - start).saturating_sub(1) as f64
}

fn content_extent(sizes: &[f64], gap: i32) -> i32 {
    let total = sizes.iter().sum::<f64>() + f64::from(gap) * sizes.len().saturating_sub(1) as f64;
    total as i32
}

impl Widget for Grid {
    fn base(&self) -> &WidgetBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut WidgetBase {
        &mut self.base
    }

    fn type_name(&self) -> &'static str {
        "Grid"
    }

    fn preferred_size(&mut self, max_width: Option<i32>, max_height: Option<i32>) -> Result<Size> {
        let pad = self.base.padding();
        let child_w = child_bound(self.base.width(), max_width, pad.horizontal());
        let child_h = child_bound(self.base.height(), max_height, pad.vertical());

        let (placements, mut rows, mut columns) = self.prepare(child_w, child_h)?;
        extend_tracks(&mut rows, 1);
        extend_tracks(&mut columns, 1);

        let row_sizes = measure_tracks(&rows, &placements, TrackAxis::Rows, self.row_gap);
        let col_sizes = measure_tracks(&columns, &placements, TrackAxis::Columns, self.column_gap);
        let content = Size::new(
            content_extent(&col_sizes, self.column_gap) + pad.horizontal(),
            content_extent(&row_sizes, self.row_gap) + pad.vertical(),
        );
        Ok(resolve_preferred(self.base.width(), self.base.height(), content, max_width, max_height))
    }

    fn layout(&mut self, width: i32, height: i32) -> Result<()> {
        self.base.begin_layout(width, height);
        let (placements, rows, columns) = self.prepare(None, None)?;
        if placements.is_empty() && rows.is_empty() && columns.is_empty() {
            return Ok(());
        }

        let pad = self.base.padding();
        let inner_w = (width - pad.horizontal()).max(0);
        let inner_h = (height - pad.vertical()).max(0);

        let row_sizes = measure_tracks(&rows, &placements, TrackAxis::Rows, self.row_gap);
        let col_sizes = measure_tracks(&columns, &placements, TrackAxis::Columns, self.column_gap);
        let row_sizes = stretch_tracks(&rows, row_sizes, self.row_gap, inner_h);
        let col_sizes = stretch_tracks(&columns, col_sizes, self.column_gap, inner_w);
        let row_pos = track_positions(pad.top(), &row_sizes, self.row_gap);
        let col_pos = track_positions(pad.left(), &col_sizes, self.column_gap);

        for p in &placements {
            if p.row >= row_sizes.len() || p.column >= col_sizes.len() {
                continue;
            }
            let row_end = (p.row + p.row_span).min(row_sizes.len());
            let col_end = (p.column + p.column_span).min(col_sizes.len());
            let rect = Rect::new(
                col_pos[p.column] as i32,
                row_pos[p.row] as i32,
                span_extent(&col_sizes, p.column, col_end, self.column_gap) as i32,
                span_extent(&row_sizes, p.row, row_end, self.row_gap) as i32,
            );
            measure::layout_child(&p.child, rect)?;
        }
        Ok(())
    }

    fn paint(&mut self, canvas: &mut dyn Canvas, x: i32, y: i32, width: i32, height: i32) -> Result<()> {
        self.base.set_last_rect(Rect::new(x, y, width, height));
        let children = expand::layout_children(&self.children);
        if children.is_empty() {
            return Ok(());
        }
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
    use crate::canvas::DisplayList;
    use crate::layout::container::Leaf;
    use crate::widget::{erase, shared};

    #[test]
    fn test_index_normalization() {
        assert_eq!(GridIndex::from(3).normalize(), Some((3, 1)));
        assert_eq!(GridIndex::from(vec![4, 1, 2]).normalize(), Some((1, 4)));
        assert_eq!(GridIndex::from(2..=3).normalize(), Some((2, 2)));
        assert_eq!(GridIndex::Span(Vec::new()).normalize(), None);
    }

    #[test]
    fn test_missing_coordinates_is_placement_error() {
        let mut grid = Grid::new().child(GridItem::new().row(0).child(Leaf::new(10, 10)));
        assert!(matches!(
            grid.preferred_size(None, None),
            Err(LayoutError::InvalidPlacement(_))
        ));
    }

    #[test]
    fn test_plain_child_is_placement_error() {
        let mut grid = Grid::new().child(Leaf::new(10, 10));
        assert!(matches!(grid.layout(100, 100), Err(LayoutError::InvalidPlacement(_))));
    }

    #[test]
    fn test_negative_index_rejected() {
        let mut grid = Grid::new().child(GridItem::at(-1, 0));
        assert!(grid.preferred_size(None, None).is_err());
    }

    #[test]
    fn test_fixed_tracks_with_padding() {
        let leaf = shared(Leaf::new(20, 15));
        let mut grid = Grid::new()
            .rows([Sizing::Fixed(80.0)])
            .columns([Sizing::Fixed(120.0)])
            .padding(Padding::all(8))
            .child(GridItem::at(0, 0).child(erase(&leaf)));
        let mut list = DisplayList::new();
        grid.paint(&mut list, 0, 0, 400, 200).unwrap();
        assert_eq!(leaf.borrow().base().last_rect(), Some(Rect::new(8, 8, 20, 15)));
        assert_eq!(grid.preferred_size(None, None).unwrap(), Size::new(136, 96));
    }

    #[test]
    fn test_span_tops_up_evenly() {
        let tall = shared(GridItem::at([0, 1], 0).child(Leaf::new(10, 80)));
        let below = shared(GridItem::at(1, 0));
        let mut grid = Grid::new()
            .rows([Sizing::Auto, Sizing::Auto])
            .child(erase(&tall))
            .child(erase(&below));
        assert_eq!(grid.preferred_size(None, None).unwrap(), Size::new(10, 80));
        grid.layout(10, 80).unwrap();
        assert_eq!(tall.borrow().layout_rect(), Some(Rect::new(0, 0, 10, 80)));
        assert_eq!(below.borrow().layout_rect(), Some(Rect::new(0, 40, 10, 40)));
    }

    #[test]
    fn test_tracks_extend_with_auto() {
        let far = shared(GridItem::at(2, 3).child(Leaf::new(5, 5)));
        let mut grid = Grid::new().child(erase(&far));
        grid.layout(100, 100).unwrap();
        // earlier tracks are empty Auto tracks
        assert_eq!(far.borrow().layout_rect(), Some(Rect::new(0, 0, 5, 5)));
    }

    #[test]
    fn test_flex_tracks_take_leftover() {
        let a = shared(GridItem::at(0, 0).child(Leaf::new(10, 10)));
        let b = shared(GridItem::at(0, 1).child(Leaf::new(10, 10)));
        let mut grid = Grid::new()
            .columns([Sizing::Fixed(40.0), Sizing::Flex(1.0)])
            .column_gap(10)
            .child(erase(&a))
            .child(erase(&b));
        grid.layout(150, 20).unwrap();
        assert_eq!(a.borrow().layout_rect(), Some(Rect::new(0, 0, 40, 10)));
        assert_eq!(b.borrow().layout_rect(), Some(Rect::new(50, 0, 100, 10)));
    }

    #[test]
    fn test_named_areas_bounding_boxes() {
        let header = shared(GridItem::area("header").child(Leaf::new(100, 30)));
        let sidebar = shared(GridItem::area("sidebar").child(Leaf::new(80, 60)));
        let content = shared(GridItem::area("content").child(Leaf::new(150, 120)));
        let mut grid = Grid::named_areas([
            ["header", "header"],
            ["sidebar", "content"],
            ["sidebar", "content"],
        ])
        .unwrap()
        .gap(5)
        .child(erase(&header))
        .child(erase(&sidebar))
        .child(erase(&content));

        let pref = grid.preferred_size(None, None).unwrap();
        grid.layout(pref.width, pref.height).unwrap();
        let h = header.borrow().layout_rect().unwrap();
        let s = sidebar.borrow().layout_rect().unwrap();
        let c = content.borrow().layout_rect().unwrap();
        assert_eq!((h.x, h.y), (0, 0));
        assert_eq!(h.width, s.width + 5 + c.width);
        assert_eq!(s.x, 0);
        assert!(s.height >= 60);
        assert_eq!(c.x, s.width + 5);
    }

    #[test]
    fn test_ragged_areas_rejected() {
        let result = Grid::named_areas(vec![vec!["a", "b"], vec!["c"]]);
        assert!(matches!(result, Err(LayoutError::InvalidPlacement(_))));
    }

    #[test]
    fn test_unknown_area_rejected() {
        let mut grid = Grid::named_areas([["a"]]).unwrap().child(GridItem::area("b"));
        assert!(matches!(
            grid.preferred_size(None, None),
            Err(LayoutError::InvalidPlacement(_))
        ));
        let mut no_template = Grid::new().child(GridItem::area("a"));
        assert!(no_template.preferred_size(None, None).is_err());
    }

    #[test]
    fn test_growing_pref_never_shrinks_tracks() {
        let tracks = [Sizing::Auto, Sizing::Fixed(10.0), Sizing::Auto];
        let leaf = Leaf::new(0, 0).into_widget_ref();
        let mut last: Option<Vec<f64>> = None;
        for pref in [0, 20, 35, 90] {
            let p = Resolved {
                child: leaf.clone(),
                row: 0,
                column: 0,
                row_span: 1,
                column_span: 3,
                pref: Size::new(pref, 0),
            };
            let sizes = measure_tracks(&tracks, &[p], TrackAxis::Columns, 2);
            if let Some(prev) = &last {
                assert!(sizes.iter().zip(prev).all(|(a, b)| a >= b));
            }
            last = Some(sizes);
        }
    }

    #[test]
    fn test_parse_tracks() {
        assert_eq!(
            parse_tracks([SizingSpec::from(80), "auto".into(), "50%".into()]).unwrap(),
            vec![Sizing::Fixed(80.0), Sizing::Auto, Sizing::Flex(50.0)]
        );
        assert!(parse_tracks(["-5"]).is_err());
    }
}
