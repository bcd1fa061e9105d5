//! Measurement and containment helpers.
//!
//! Children are plugin-like: they may answer only the legacy unbounded size
//! query, or fail outright. Containers go through these helpers so a bad child
//! degrades to a zero-size element plus one logged diagnostic, while
//! configuration errors still surface to the caller.

use crate::canvas::Canvas;
use crate::error::{LayoutError, Result};
use crate::log_once::error_once;
use crate::layout::sizing::Sizing;
use crate::primitives::{Rect, Size};
use crate::widget::{Widget, WidgetBase, WidgetRef};

/// Preferred size of `child` under optional soft caps.
pub fn preferred_size(child: &WidgetRef, max_width: Option<i32>, max_height: Option<i32>) -> Result<Size> {
    let Ok(mut widget) = child.try_borrow_mut() else {
        error_once(
            "measure.reentrant",
            "child measured while already borrowed; is it in the tree twice?",
        );
        return Ok(Size::ZERO);
    };
    measure_widget(&mut *widget, max_width, max_height)
}

/// [`preferred_size`] on an already-borrowed widget.
pub fn measure_widget(
    widget: &mut dyn Widget,
    max_width: Option<i32>,
    max_height: Option<i32>,
) -> Result<Size> {
    let answer = match widget.preferred_size(max_width, max_height) {
        Err(LayoutError::UnboundedOnly) => widget.intrinsic_size(),
        other => other,
    };
    match answer {
        Ok(size) => Ok(size.non_negative()),
        Err(err) => contain(&format!("measure:{}", widget.type_name()), err).map(|()| Size::ZERO),
    }
}

/// Lay out `child` at `rect`'s size and record `rect` as its position.
pub fn layout_child(child: &WidgetRef, rect: Rect) -> Result<()> {
    let Ok(mut widget) = child.try_borrow_mut() else {
        error_once("layout.reentrant", "child laid out while already borrowed");
        return Ok(());
    };
    if let Err(err) = widget.layout(rect.width, rect.height) {
        contain(&format!("layout:{}", widget.type_name()), err)?;
    }
    widget.base_mut().set_layout_rect(rect);
    Ok(())
}

/// Lay out `child` without giving it a position, so it is neither painted
/// nor hit-tested until placed again.
pub fn layout_hidden(child: &WidgetRef, width: i32, height: i32) -> Result<()> {
    let Ok(mut widget) = child.try_borrow_mut() else {
        error_once("layout.reentrant", "child laid out while already borrowed");
        return Ok(());
    };
    if let Err(err) = widget.layout(width, height) {
        contain(&format!("layout:{}", widget.type_name()), err)?;
    }
    widget.base_mut().clear_layout_rect();
    Ok(())
}

/// Paint `child` at the absolute position of its layout rectangle.
///
/// Returns `false` when the child has no rectangle yet.
pub fn paint_child(child: &WidgetRef, canvas: &mut dyn Canvas, origin_x: i32, origin_y: i32) -> Result<bool> {
    let Ok(mut widget) = child.try_borrow_mut() else {
        error_once("paint.reentrant", "child painted while already borrowed");
        return Ok(false);
    };
    let Some(rect) = widget.base().layout_rect() else {
        return Ok(false);
    };
    let abs = rect.translate(origin_x, origin_y);
    widget.base_mut().set_last_rect(abs);
    if let Err(err) = widget.paint(canvas, abs.x, abs.y, abs.width, abs.height) {
        contain(&format!("paint:{}", widget.type_name()), err)?;
    }
    Ok(true)
}

/// Whether any child lacks a layout rectangle.
pub fn any_unplaced(children: &[WidgetRef]) -> bool {
    children
        .iter()
        .any(|c| c.try_borrow().is_ok_and(|w| w.base().layout_rect().is_none()))
}

/// Topmost child whose last painted rectangle contains the point.
pub fn hit_test_children(children: &[WidgetRef], x: i32, y: i32) -> Option<WidgetRef> {
    for child in children.iter().rev() {
        let Ok(widget) = child.try_borrow() else {
            continue;
        };
        if widget.base().last_rect().is_some_and(|r| r.contains(x, y)) {
            return widget.hit_test(x, y).or_else(|| Some(child.clone()));
        }
    }
    None
}

/// Soft cap handed to children: the fixed extent if any, else the incoming
/// cap, minus `inset`.
pub fn child_bound(sizing: Sizing, max: Option<i32>, inset: i32) -> Option<i32> {
    sizing.fixed_px().or(max).map(|v| (v - inset).max(0))
}

/// A node's own preferred size: fixed sizing wins per axis, otherwise the
/// content size capped by the incoming soft cap.
pub fn resolve_preferred(
    width: Sizing,
    height: Sizing,
    content: Size,
    max_width: Option<i32>,
    max_height: Option<i32>,
) -> Size {
    let axis = |sizing: Sizing, content: i32, max: Option<i32>| match sizing.fixed_px() {
        Some(px) => px,
        None => max.map_or(content, |m| content.min(m.max(0))),
    };
    Size::new(
        axis(width, content.width, max_width),
        axis(height, content.height, max_height),
    )
}

/// Whether a container must lay itself out again before painting at
/// `width` x `height`.
pub fn needs_relayout(base: &WidgetBase, children: &[WidgetRef], width: i32, height: i32) -> bool {
    base.needs_layout()
        || base.laid_out_size() != Some(Size::new(width, height))
        || any_unplaced(children)
}

/// Propagate structural errors, log and swallow everything else.
fn contain(site: &str, err: LayoutError) -> Result<()> {
    if err.is_structural() {
        return Err(err);
    }
    error_once(site, format_args!("{site} failed: {err}"));
    Ok(())
}
