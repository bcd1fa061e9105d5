//! Drive node fields from observables.
//!
//! A binding parses the source's current value into the node's slot, then
//! keeps writing through on every change. Invalid initial values are
//! rejected; invalid later values are logged once and ignored, leaving the
//! last good value in place. A change that arrives while the node is
//! borrowed is parked in the slot and flags the parent for layout.

use std::cell::Cell;
use std::rc::Rc;

use tracing::debug;

use crate::error::{LayoutError, Result};
use crate::layout::padding::{Padding, PaddingSpec};
use crate::layout::sizing::{self, Sizing, SizingSpec};
use crate::log_once::{error_once, warn_once};
use crate::observable::Observable;
use crate::widget::{Slot, WidgetBase, WidgetRef};

type Select<V> = fn(&mut WidgetBase) -> &mut Slot<V>;

pub fn bind_width<S>(widget: &WidgetRef, source: &Observable<S>) -> Result<()>
where
    S: Clone + Into<SizingSpec> + 'static,
{
    bind_slot(widget, source, "width", |s: S| sizing::parse(s, None), width_slot)
}

pub fn bind_height<S>(widget: &WidgetRef, source: &Observable<S>) -> Result<()>
where
    S: Clone + Into<SizingSpec> + 'static,
{
    bind_slot(widget, source, "height", |s: S| sizing::parse(s, None), height_slot)
}

pub fn bind_padding<S>(widget: &WidgetRef, source: &Observable<S>) -> Result<()>
where
    S: Clone + Into<PaddingSpec> + 'static,
{
    bind_slot(widget, source, "padding", |s: S| Padding::parse(s), padding_slot)
}

fn width_slot(base: &mut WidgetBase) -> &mut Slot<Sizing> {
    &mut base.width
}

fn height_slot(base: &mut WidgetBase) -> &mut Slot<Sizing> {
    &mut base.height
}

fn padding_slot(base: &mut WidgetBase) -> &mut Slot<Padding> {
    &mut base.padding
}

fn bind_slot<S, V>(
    widget: &WidgetRef,
    source: &Observable<S>,
    field: &'static str,
    parse: impl Fn(S) -> Result<V> + 'static,
    select: Select<V>,
) -> Result<()>
where
    S: Clone + 'static,
    V: Copy + 'static,
{
    let value = parse(source.value())?;
    let target = Rc::downgrade(widget);
    let pending = Rc::new(Cell::new(None));
    let parked = Rc::clone(&pending);

    let subscription = source.subscribe(move |raw: &S| {
        let Some(node) = target.upgrade() else {
            return;
        };
        let next = match parse(raw.clone()) {
            Ok(next) => next,
            Err(err) => {
                error_once(&format!("binding.{field}"), format_args!("ignoring bound {field}: {err}"));
                return;
            }
        };
        if let Ok(mut node) = node.try_borrow_mut() {
            select(node.base_mut()).write(next);
            node.invalidate();
            return;
        }
        parked.set(Some(next));
        debug!(field = field, "bound value parked until the node is released");
        let parent = node.try_borrow().ok().and_then(|n| n.base().parent());
        match parent.as_ref().map(|p| p.try_borrow_mut()) {
            Some(Ok(mut parent)) => parent.base_mut().mark_needs_layout(),
            Some(Err(_)) => {}
            None => warn_once(
                &format!("binding.{field}.reentrant"),
                format_args!("bound {field} changed mid-layout; applied on the next pass"),
            ),
        }
    });

    let Ok(mut node) = widget.try_borrow_mut() else {
        return Err(LayoutError::Widget(format!("cannot bind {field} on a borrowed node")));
    };
    *select(node.base_mut()) = Slot::Bound {
        value,
        pending,
        subscription,
    };
    node.invalidate();
    Ok(())
}
