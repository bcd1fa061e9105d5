//! Overlay containers.
//!
//! A `Stack` draws every child on top of the previous one inside the padded
//! content box. A `Deck` lays out every child but shows one at a time.

use std::rc::Weak;

use super::alignment::{Align, AlignPair};
use super::expand;
use super::for_each::{ForEach, Items};
use super::measure::{self, child_bound, resolve_preferred};
use super::padding::Padding;
use super::sizing::Sizing;
use crate::canvas::Canvas;
use crate::error::{LayoutError, Result};
use crate::observable::{Observable, Subscription};
use crate::primitives::{Rect, Size};
use crate::widget::{IntoWidgetRef, WeakWidgetRef, Widget, WidgetBase, WidgetRef};

/// Largest child preferred size under the padded caps, plus padding.
fn overlay_preferred(
    base: &WidgetBase,
    children: &[WidgetRef],
    max_width: Option<i32>,
    max_height: Option<i32>,
) -> Result<Size> {
    let pad = base.padding();
    let bw = child_bound(base.width(), max_width, pad.horizontal());
    let bh = child_bound(base.height(), max_height, pad.vertical());
    let mut content = Size::ZERO;
    for child in children {
        let pref = measure::preferred_size(child, bw, bh)?;
        content.width = content.width.max(pref.width);
        content.height = content.height.max(pref.height);
    }
    let outer = Size::new(content.width + pad.horizontal(), content.height + pad.vertical());
    Ok(resolve_preferred(base.width(), base.height(), outer, max_width, max_height))
}

fn content_box(padding: Padding, width: i32, height: i32) -> Rect {
    Rect::new(
        padding.left(),
        padding.top(),
        (width - padding.horizontal()).max(0),
        (height - padding.vertical()).max(0),
    )
}

// =========================================================================
// Stack
// =========================================================================

/// Children overlaid in the content box, last on top.
///
/// Flex sizing on a child is read as a percentage of the content box
/// (`Flex(50.0)` is half). Children larger than the box overflow; a centered
/// or end-aligned child may get a negative offset.
pub struct Stack {
    base: WidgetBase,
    children: Vec<WidgetRef>,
    align: AlignPair,
}

impl Stack {
    pub fn new() -> Self {
        Self {
            base: WidgetBase::new(),
            children: Vec::new(),
            align: AlignPair::TOP_LEFT,
        }
    }

    /// A centered stack whose only child is a [`ForEach`] over `items`.
    pub fn builder<T: Clone + PartialEq + 'static>(
        items: impl Into<Items<T>>,
        build: impl Fn(&T, usize) -> anyhow::Result<WidgetRef> + 'static,
    ) -> Self {
        Self::new().align(AlignPair::CENTER).child(ForEach::new(items, build))
    }

    pub fn child(mut self, child: impl IntoWidgetRef) -> Self {
        self.children.push(child.into_widget_ref());
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = WidgetRef>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn align(mut self, align: impl Into<AlignPair>) -> Self {
        self.align = align.into();
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

impl Default for Stack {
    fn default() -> Self {
        Self::new()
    }
}

fn overlay_axis(sizing: Sizing, pref: i32, content: i32, align: Align) -> (i32, i32) {
    let size = match (sizing, align) {
        (Sizing::Flex(weight), _) => (content as f32 * weight / 100.0) as i32,
        (_, Align::Stretch) => content,
        _ => pref,
    };
    let offset = match align {
        Align::Center => (content - size) / 2,
        Align::End => content - size,
        Align::Start | Align::Stretch => 0,
    };
    (offset, size)
}

impl Widget for Stack {
    fn base(&self) -> &WidgetBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut WidgetBase {
        &mut self.base
    }

    fn type_name(&self) -> &'static str {
        "Stack"
    }

    fn preferred_size(&mut self, max_width: Option<i32>, max_height: Option<i32>) -> Result<Size> {
        let children = expand::layout_children(&self.children);
        overlay_preferred(&self.base, &children, max_width, max_height)
    }

    fn layout(&mut self, width: i32, height: i32) -> Result<()> {
        self.base.begin_layout(width, height);
        let content = content_box(self.base.padding(), width, height);
        for child in expand::layout_children(&self.children) {
            let pref = measure::preferred_size(&child, Some(content.width), Some(content.height))?;
            let (ws, hs) = child
                .try_borrow()
                .map_or((Sizing::Auto, Sizing::Auto), |c| (c.width_sizing(), c.height_sizing()));
            let (x, w) = overlay_axis(ws, pref.width, content.width, self.align.horizontal);
            let (y, h) = overlay_axis(hs, pref.height, content.height, self.align.vertical);
            measure::layout_child(&child, Rect::new(content.x + x, content.y + y, w, h))?;
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

// =========================================================================
// Deck
// =========================================================================

enum DeckIndex {
    Literal(usize),
    Bound {
        source: Observable<usize>,
        subscription: Option<Subscription>,
    },
}

/// Shows one child at a time.
///
/// Every child is laid out at the content size so switching keeps their
/// state warm, but only the selected child gets a rectangle, is painted and
/// is hit-tested.
pub struct Deck {
    base: WidgetBase,
    children: Vec<WidgetRef>,
    index: DeckIndex,
}

impl Deck {
    pub fn new() -> Self {
        Self {
            base: WidgetBase::new(),
            children: Vec::new(),
            index: DeckIndex::Literal(0),
        }
    }

    /// A deck whose only child is a [`ForEach`] over `items`.
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

    pub fn padding(mut self, padding: Padding) -> Self {
        self.set_padding(padding);
        self
    }

    pub fn index(mut self, index: usize) -> Self {
        self.index = DeckIndex::Literal(index);
        self
    }

    /// Follow `source`; the deck subscribes once mounted.
    pub fn bind_index(mut self, source: Observable<usize>) -> Self {
        self.index = DeckIndex::Bound {
            source,
            subscription: None,
        };
        self
    }

    pub fn set_index(&mut self, index: usize) -> Result<()> {
        match &mut self.index {
            DeckIndex::Literal(current) => {
                if *current != index {
                    *current = index;
                    self.invalidate();
                }
                Ok(())
            }
            DeckIndex::Bound { .. } => Err(LayoutError::Widget(
                "deck index is bound to an observable; set the observable instead".into(),
            )),
        }
    }

    fn requested_index(&self) -> usize {
        match &self.index {
            DeckIndex::Literal(i) => *i,
            DeckIndex::Bound { source, .. } => source.value(),
        }
    }

    /// Selected position in the effective child list, clamped.
    pub fn selected_index(&self) -> Option<usize> {
        let count = expand::layout_children(&self.children).len();
        (count > 0).then(|| self.requested_index().min(count - 1))
    }

    fn selected(&self) -> Option<WidgetRef> {
        let children = expand::layout_children(&self.children);
        let last = children.len().checked_sub(1)?;
        children.get(self.requested_index().min(last)).cloned()
    }
}

impl Default for Deck {
    fn default() -> Self {
        Self::new()
    }
}

impl Widget for Deck {
    fn base(&self) -> &WidgetBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut WidgetBase {
        &mut self.base
    }

    fn type_name(&self) -> &'static str {
        "Deck"
    }

    fn preferred_size(&mut self, max_width: Option<i32>, max_height: Option<i32>) -> Result<Size> {
        let selected: Vec<WidgetRef> = self.selected().into_iter().collect();
        overlay_preferred(&self.base, &selected, max_width, max_height)
    }

    fn layout(&mut self, width: i32, height: i32) -> Result<()> {
        self.base.begin_layout(width, height);
        let content = content_box(self.base.padding(), width, height);
        let children = expand::layout_children(&self.children);
        let Some(last) = children.len().checked_sub(1) else {
            return Ok(());
        };
        let selected = self.requested_index().min(last);
        for (i, child) in children.iter().enumerate() {
            if i == selected {
                measure::layout_child(child, content)?;
            } else {
                measure::layout_hidden(child, content.width, content.height)?;
            }
        }
        Ok(())
    }

    fn paint(&mut self, canvas: &mut dyn Canvas, x: i32, y: i32, width: i32, height: i32) -> Result<()> {
        self.base.set_last_rect(Rect::new(x, y, width, height));
        let Some(selected) = self.selected() else {
            return Ok(());
        };
        if measure::needs_relayout(&self.base, std::slice::from_ref(&selected), width, height) {
            self.layout(width, height)?;
        }
        measure::paint_child(&selected, canvas, x, y)?;
        Ok(())
    }

    fn hit_test(&self, x: i32, y: i32) -> Option<WidgetRef> {
        let selected = self.selected()?;
        measure::hit_test_children(std::slice::from_ref(&selected), x, y)
    }

    fn children(&self) -> Vec<WidgetRef> {
        self.children.clone()
    }

    fn on_mount(&mut self, this: &WeakWidgetRef) {
        if let DeckIndex::Bound { source, subscription } = &mut self.index {
            let weak: WeakWidgetRef = Weak::clone(this);
            *subscription = Some(source.subscribe(move |_| {
                if let Some(deck) = weak.upgrade() {
                    if let Ok(mut deck) = deck.try_borrow_mut() {
                        deck.invalidate();
                    }
                }
            }));
        }
    }

    fn on_unmount(&mut self) {
        if let DeckIndex::Bound { subscription, .. } = &mut self.index {
            *subscription = None;
        }
    }
}
