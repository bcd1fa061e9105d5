//! Layout-provider expansion.
//!
//! A provider (such as `ForEach`) never takes part in layout itself. When a
//! container builds its effective child list, each provider is replaced in
//! place by the nodes it supplies.

use crate::log_once::error_once;
use crate::widget::WidgetRef;

/// Effective child list with providers spliced in.
pub fn layout_children(children: &[WidgetRef]) -> Vec<WidgetRef> {
    let mut out = Vec::with_capacity(children.len());
    for child in children {
        let Ok(mut widget) = child.try_borrow_mut() else {
            error_once(
                "expand.provide_layout_children",
                "layout provider is already borrowed; leaving it in place",
            );
            out.push(child.clone());
            continue;
        };
        match widget.provide_layout_children() {
            Some(provided) => {
                // The provider itself is never laid out; keep its dirty flag
                // clear so later invalidations still reach the parent.
                widget.base_mut().clear_needs_layout();
                out.extend(provided);
            }
            None => out.push(child.clone()),
        }
    }
    out
}
