//! Tree lifecycle.
//!
//! Containers are built bottom-up by value, so children cannot know their
//! parent at construction time. [`mount`] walks a finished tree once, wiring
//! each child's weak parent reference and running `on_mount` hooks (which is
//! where keyed providers and decks subscribe to their sources).

use std::rc::Rc;

use crate::widget::{WeakWidgetRef, WidgetRef};

/// Mount `root` and everything below it.
pub fn mount(root: &WidgetRef) {
    mount_under(None, root);
}

/// Mount `child` below an already-mounted `parent`.
pub fn mount_child(parent: &WeakWidgetRef, child: &WidgetRef) {
    mount_under(Some(parent.clone()), child);
}

fn mount_under(parent: Option<WeakWidgetRef>, node: &WidgetRef) {
    let this = Rc::downgrade(node);
    let children = {
        let Ok(mut widget) = node.try_borrow_mut() else {
            tracing::warn!("skipping mount of a node that is already borrowed");
            return;
        };
        let base = widget.base_mut();
        base.set_parent(parent);
        if base.is_mounted() {
            // Re-parenting only; hooks already ran.
            return;
        }
        base.set_mounted(true);
        widget.on_mount(&this);
        widget.children()
    };
    for child in &children {
        mount_under(Some(this.clone()), child);
    }
}

/// Unmount `root` and everything below it, children first.
pub fn unmount(root: &WidgetRef) {
    let children = match root.try_borrow() {
        Ok(widget) => widget.children(),
        Err(_) => return,
    };
    for child in &children {
        unmount(child);
    }
    if let Ok(mut widget) = root.try_borrow_mut() {
        if widget.base().is_mounted() {
            widget.on_unmount();
            let base = widget.base_mut();
            base.set_mounted(false);
            base.set_parent(None);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::container::{Container, Leaf};
    use crate::widget::IntoWidgetRef;

    #[test]
    fn test_mount_sets_parent_links() {
        let leaf = Leaf::new(10, 10).into_widget_ref();
        let root = Container::new().child(leaf.clone()).into_widget_ref();
        mount(&root);

        assert!(root.borrow().base().is_mounted());
        assert!(leaf.borrow().base().is_mounted());
        let parent = leaf.borrow().base().parent().expect("parent");
        assert!(Rc::ptr_eq(&parent, &root));

        unmount(&root);
        assert!(!leaf.borrow().base().is_mounted());
        assert!(leaf.borrow().base().parent().is_none());
    }
}
