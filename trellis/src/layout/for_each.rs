//! Keyed, reactive list provider.
//!
//! A [`ForEach`] turns a list of values into one fragment per item and
//! splices those fragments into its parent's child list. Each item gets a
//! stable token derived from its key; tokens drive the diff when the source
//! list changes:
//!
//! - token sequence unchanged: only items whose value changed are rebuilt
//! - anything else (insert, removal, reorder): every fragment is rebuilt
//!
//! Builder failures are contained. The failing item becomes an empty
//! [`Spacer`] and the failure is logged once per item scope.

use std::cell::Cell;
use std::collections::HashMap;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::canvas::Canvas;
use crate::error::Result;
use crate::layout::container::Spacer;
use crate::layout::measure;
use crate::layout::sizing::Sizing;
use crate::log_once::error_once;
use crate::observable::{Observable, Subscription};
use crate::primitives::Size;
use crate::tree;
use crate::widget::{IntoWidgetRef, WeakWidgetRef, Widget, WidgetBase, WidgetRef};

type Builder<T> = Box<dyn Fn(&T, usize) -> anyhow::Result<WidgetRef>>;
type KeyFn<T> = Box<dyn Fn(&T, usize) -> Option<String>>;
type Resolver<T> = Box<dyn Fn() -> Option<Observable<Vec<T>>>>;

thread_local! {
    static NEXT_SCOPE_ID: Cell<u64> = const { Cell::new(1) };
}

fn next_scope_id() -> u64 {
    NEXT_SCOPE_ID.with(|id| {
        let current = id.get();
        id.set(current + 1);
        current
    })
}

/// Where a [`ForEach`] reads its values from.
pub enum Items<T> {
    /// A fixed list.
    Snapshot(Vec<T>),
    /// A list that notifies on change.
    Observable(Observable<Vec<T>>),
    /// Looked up on every read; a `None` answer keeps the last source.
    Resolver(Resolver<T>),
}

impl<T> Items<T> {
    pub fn resolver(resolve: impl Fn() -> Option<Observable<Vec<T>>> + 'static) -> Self {
        Items::Resolver(Box::new(resolve))
    }
}

impl<T> From<Vec<T>> for Items<T> {
    fn from(items: Vec<T>) -> Self {
        Items::Snapshot(items)
    }
}

impl<T> From<Observable<Vec<T>>> for Items<T> {
    fn from(source: Observable<Vec<T>>) -> Self {
        Items::Observable(source)
    }
}

impl<T> From<&Observable<Vec<T>>> for Items<T> {
    fn from(source: &Observable<Vec<T>>) -> Self {
        Items::Observable(source.clone())
    }
}

/// One materialized item.
pub struct Entry<T> {
    token: String,
    scope_name: String,
    index: usize,
    value: T,
    fragment: WidgetRef,
    scope_id: u64,
}

impl<T> Entry<T> {
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Name used for diagnostics about this item, `item:<token>`.
    pub fn scope_name(&self) -> &str {
        &self.scope_name
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn fragment(&self) -> &WidgetRef {
        &self.fragment
    }

    /// Changes every time the fragment is rebuilt.
    pub fn scope_id(&self) -> u64 {
        self.scope_id
    }
}

struct Keyed<T> {
    token: String,
    index: usize,
    value: T,
}

/// Restrict a key label to `[A-Za-z0-9-_.:]`.
pub fn sanitize_token(label: &str) -> String {
    label
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | ':') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

pub struct ForEach<T: Clone + PartialEq + 'static> {
    base: WidgetBase,
    items: Items<T>,
    builder: Builder<T>,
    key: Option<KeyFn<T>>,
    entries: IndexMap<String, Entry<T>>,
    fragments: Vec<WidgetRef>,
    materialized: bool,
    this: Option<WeakWidgetRef>,
    source: Option<Observable<Vec<T>>>,
    subscription: Option<Subscription>,
    pending: Rc<Cell<bool>>,
    fragments_built: usize,
    full_rebuilds: usize,
}

impl<T: Clone + PartialEq + 'static> ForEach<T> {
    pub fn new(
        items: impl Into<Items<T>>,
        builder: impl Fn(&T, usize) -> anyhow::Result<WidgetRef> + 'static,
    ) -> Self {
        Self {
            base: WidgetBase::new(),
            items: items.into(),
            builder: Box::new(builder),
            key: None,
            entries: IndexMap::new(),
            fragments: Vec::new(),
            materialized: false,
            this: None,
            source: None,
            subscription: None,
            pending: Rc::new(Cell::new(false)),
            fragments_built: 0,
            full_rebuilds: 0,
        }
    }

    /// Key items by `key`. A `None` key is labelled `none`; without a key
    /// function items are keyed by position.
    pub fn key(mut self, key: impl Fn(&T, usize) -> Option<String> + 'static) -> Self {
        self.key = Some(Box::new(key));
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

    pub fn entries(&self) -> impl Iterator<Item = &Entry<T>> {
        self.entries.values()
    }

    pub fn entry(&self, token: &str) -> Option<&Entry<T>> {
        self.entries.get(token)
    }

    pub fn tokens(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    /// Number of builder invocations so far.
    pub fn fragments_built(&self) -> usize {
        self.fragments_built
    }

    /// Number of diffs that fell back to rebuilding every fragment.
    pub fn full_rebuilds(&self) -> usize {
        self.full_rebuilds
    }

    /// Current fragments, building them on first use.
    pub fn fragments(&mut self) -> Vec<WidgetRef> {
        if self.pending.get() {
            self.handle_items_changed();
        } else if !self.materialized {
            self.materialize();
        }
        self.fragments.clone()
    }

    /// Re-read the source and reconcile entries against it.
    pub fn handle_items_changed(&mut self) {
        self.pending.set(false);
        self.materialized = true;
        let values = self.snapshot();
        let keyed = self.keyed(values);

        if self.entries.is_empty() {
            self.build_all(keyed);
            self.invalidate();
            return;
        }

        let same_order = self.entries.len() == keyed.len()
            && self.entries.keys().zip(&keyed).all(|(token, k)| *token == k.token);
        if !same_order {
            tracing::debug!(
                old = self.entries.len(),
                new = keyed.len(),
                "item tokens changed; rebuilding every fragment"
            );
            self.full_rebuilds += 1;
            self.dispose_all();
            self.build_all(keyed);
            self.invalidate();
            return;
        }

        let mut changed = false;
        for k in keyed {
            let unchanged = self.entries.get(&k.token).is_some_and(|e| e.value == k.value);
            if unchanged {
                continue;
            }
            let fragment = self.build_fragment(&k.value, k.index, &format!("item:{}", k.token));
            if let Some(entry) = self.entries.get_mut(&k.token) {
                tree::unmount(&entry.fragment);
                entry.fragment = fragment;
                entry.value = k.value;
                entry.index = k.index;
                entry.scope_id = next_scope_id();
                changed = true;
            }
        }
        if changed {
            self.collect_fragments();
            self.invalidate();
        }
    }

    fn materialize(&mut self) {
        self.materialized = true;
        let values = self.snapshot();
        let keyed = self.keyed(values);
        self.build_all(keyed);
    }

    /// Resolve the current source, re-subscribing when its identity changes.
    fn current_source(&mut self) -> Option<Observable<Vec<T>>> {
        let resolved = match &self.items {
            Items::Snapshot(_) => None,
            Items::Observable(source) => Some(source.clone()),
            Items::Resolver(resolve) => resolve().or_else(|| self.source.clone()),
        };
        if let Some(source) = &resolved {
            let moved = self.source.as_ref().is_none_or(|old| !old.ptr_eq(source));
            if moved {
                self.source = Some(source.clone());
                if self.base.is_mounted() {
                    self.subscribe();
                }
            }
        }
        resolved
    }

    fn snapshot(&mut self) -> Vec<T> {
        match self.current_source() {
            Some(source) => source.value(),
            None => match &self.items {
                Items::Snapshot(items) => items.clone(),
                _ => Vec::new(),
            },
        }
    }

    fn subscribe(&mut self) {
        self.subscription = None;
        let (Some(this), Some(source)) = (self.this.clone(), self.source.as_ref()) else {
            return;
        };
        let pending = Rc::clone(&self.pending);
        self.subscription = Some(source.subscribe(move |_| {
            pending.set(true);
            let Some(node) = this.upgrade() else {
                return;
            };
            // A borrowed node is mid-pass; the pending flag is picked up on
            // its next read.
            if let Ok(mut node) = node.try_borrow_mut() {
                node.on_source_changed();
            }
        }));
    }

    fn keyed(&self, values: Vec<T>) -> Vec<Keyed<T>> {
        let mut seen: HashMap<String, usize> = HashMap::new();
        values
            .into_iter()
            .enumerate()
            .map(|(index, value)| {
                let label = match &self.key {
                    Some(key) => key(&value, index).unwrap_or_else(|| "none".to_owned()),
                    None => format!("idx{index}"),
                };
                let mut base = sanitize_token(&label);
                if base.is_empty() {
                    base = format!("idx{index}");
                }
                let count = seen.entry(base.clone()).or_insert(0);
                let token = if *count == 0 { base } else { format!("{base}#{count}") };
                *count += 1;
                Keyed { token, index, value }
            })
            .collect()
    }

    fn build_all(&mut self, keyed: Vec<Keyed<T>>) {
        for k in keyed {
            let scope_name = format!("item:{}", k.token);
            let fragment = self.build_fragment(&k.value, k.index, &scope_name);
            self.entries.insert(
                k.token.clone(),
                Entry {
                    token: k.token,
                    scope_name,
                    index: k.index,
                    value: k.value,
                    fragment,
                    scope_id: next_scope_id(),
                },
            );
        }
        self.collect_fragments();
    }

    fn build_fragment(&mut self, value: &T, index: usize, scope_name: &str) -> WidgetRef {
        self.fragments_built += 1;
        let fragment = match (self.builder)(value, index) {
            Ok(fragment) => fragment,
            Err(err) => {
                error_once(
                    &format!("for_each.builder:{scope_name}"),
                    format_args!("item builder failed for {scope_name} at index {index}: {err:#}"),
                );
                Spacer::new().into_widget_ref()
            }
        };
        if self.base.is_mounted() {
            if let Some(this) = &self.this {
                tree::mount_child(this, &fragment);
            }
        }
        fragment
    }

    fn dispose_all(&mut self) {
        for (_, entry) in self.entries.drain(..) {
            tree::unmount(&entry.fragment);
        }
        self.fragments.clear();
    }

    fn collect_fragments(&mut self) {
        self.fragments = self.entries.values().map(|e| e.fragment.clone()).collect();
    }
}

impl<T: Clone + PartialEq + 'static> Widget for ForEach<T> {
    fn base(&self) -> &WidgetBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut WidgetBase {
        &mut self.base
    }

    fn type_name(&self) -> &'static str {
        "ForEach"
    }

    fn preferred_size(&mut self, max_width: Option<i32>, max_height: Option<i32>) -> Result<Size> {
        let width = self.base.width();
        let height = self.base.height();
        let bound_w = width.fixed_px().or(max_width);
        let bound_h = height.fixed_px().or(max_height);
        let mut content = Size::ZERO;
        for fragment in self.fragments() {
            let size = measure::preferred_size(&fragment, bound_w, bound_h)?;
            content.width = content.width.max(size.width);
            content.height = content.height.max(size.height);
        }
        Ok(measure::resolve_preferred(width, height, content, max_width, max_height))
    }

    fn paint(
        &mut self,
        _canvas: &mut dyn Canvas,
        _x: i32,
        _y: i32,
        _width: i32,
        _height: i32,
    ) -> Result<()> {
        Ok(())
    }

    fn children(&self) -> Vec<WidgetRef> {
        self.fragments.clone()
    }

    fn provide_layout_children(&mut self) -> Option<Vec<WidgetRef>> {
        Some(self.fragments())
    }

    fn on_mount(&mut self, this: &WeakWidgetRef) {
        self.this = Some(this.clone());
        if self.current_source().is_some() && self.subscription.is_none() {
            self.subscribe();
        }
    }

    fn on_unmount(&mut self) {
        self.subscription = None;
        self.this = None;
        self.entries.clear();
        self.fragments.clear();
        self.materialized = false;
        self.pending.set(false);
    }

    fn on_source_changed(&mut self) {
        if self.pending.get() {
            self.handle_items_changed();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    use crate::layout::container::Leaf;
    use crate::widget::{erase, same_widget, shared};

    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        id: u32,
        label: &'static str,
    }

    fn row(id: u32, label: &'static str) -> Row {
        Row { id, label }
    }

    fn keyed_list(source: &Observable<Vec<Row>>) -> ForEach<Row> {
        ForEach::new(source, |r: &Row, _| Ok(Leaf::new(r.id as i32 * 10, 10).into_widget_ref()))
            .key(|r, _| Some(r.id.to_string()))
    }

    #[test]
    fn test_tokens_by_position_without_key() {
        let mut list = ForEach::new(vec!["a", "b"], |_: &&str, _| Ok(Leaf::new(1, 1).into_widget_ref()));
        assert_eq!(list.fragments().len(), 2);
        assert_eq!(list.tokens(), vec!["idx0", "idx1"]);
        assert_eq!(list.entry("idx1").map(|e| e.scope_name()), Some("item:idx1"));
    }

    #[test]
    fn test_tokens_sanitized_and_disambiguated() {
        let mut list = ForEach::new(vec!["a b", "x", "x", "x", "", "none"], |_: &&str, _| {
            Ok(Leaf::new(1, 1).into_widget_ref())
        })
        .key(|v: &&str, _| if *v == "none" { None } else { Some((*v).to_owned()) });
        list.fragments();
        assert_eq!(list.tokens(), vec!["a_b", "x", "x#1", "x#2", "idx4", "none"]);
    }

    #[test]
    fn test_sanitize_token_keeps_allowed_punctuation() {
        assert_eq!(sanitize_token("user:42.v-1_a"), "user:42.v-1_a");
        assert_eq!(sanitize_token("a/b c"), "a_b_c");
    }

    #[test]
    fn test_reorder_rebuilds_every_fragment() {
        let source = Observable::new(vec![row(1, "a"), row(2, "b")]);
        let list = shared(keyed_list(&source));
        tree::mount(&erase(&list));
        list.borrow_mut().fragments();
        assert_eq!(list.borrow().fragments_built(), 2);

        source.set(vec![row(2, "b"), row(1, "a")]);
        let list = list.borrow();
        assert_eq!(list.tokens(), vec!["2", "1"]);
        assert_eq!(list.full_rebuilds(), 1);
        assert_eq!(list.fragments_built(), 4);
        assert_eq!(list.entry("2").map(|e| e.index()), Some(0));
    }

    #[test]
    fn test_same_order_rebuilds_only_changed_items() {
        let source = Observable::new(vec![row(1, "a"), row(2, "b")]);
        let list = shared(keyed_list(&source));
        tree::mount(&erase(&list));
        let before = list.borrow_mut().fragments();
        let scope_before = list.borrow().entry("2").map(|e| e.scope_id());

        source.set(vec![row(1, "a"), row(2, "B")]);
        let after = list.borrow_mut().fragments();
        let list = list.borrow();
        assert_eq!(list.full_rebuilds(), 0);
        assert_eq!(list.fragments_built(), 3);
        assert!(same_widget(&before[0], &after[0]));
        assert!(!same_widget(&before[1], &after[1]));
        assert_ne!(list.entry("2").map(|e| e.scope_id()), scope_before);
        assert_eq!(list.entry("2").map(|e| e.value().label), Some("B"));
        assert!(after[1].borrow().base().is_mounted());
        assert!(!before[1].borrow().base().is_mounted());
    }

    #[test]
    fn test_append_counts_as_full_rebuild() {
        let source = Observable::new(vec![row(1, "a")]);
        let list = shared(keyed_list(&source));
        tree::mount(&erase(&list));
        list.borrow_mut().fragments();

        source.update(|rows| rows.push(row(3, "c")));
        assert_eq!(list.borrow().tokens(), vec!["1", "3"]);
        assert_eq!(list.borrow().full_rebuilds(), 1);
    }

    #[test]
    fn test_builder_failure_becomes_placeholder() {
        let mut list = ForEach::new(vec![1, 2, 3], |v: &i32, _| {
            if *v == 2 {
                anyhow::bail!("no widget for {v}");
            }
            Ok(Leaf::new(5, 5).into_widget_ref())
        });
        let fragments = list.fragments();
        assert_eq!(fragments.len(), 3);
        assert_eq!(fragments[1].borrow().type_name(), "Spacer");
        let size = measure::preferred_size(&fragments[1], None, None).unwrap();
        assert_eq!(size, Size::ZERO);
    }

    #[test]
    fn test_preferred_size_is_largest_fragment() {
        let mut list = ForEach::new(vec![(10, 30), (25, 5)], |&(w, h): &(i32, i32), _| {
            Ok(Leaf::new(w, h).into_widget_ref())
        });
        assert_eq!(list.preferred_size(None, None).unwrap(), Size::new(25, 30));
        assert_eq!(list.preferred_size(Some(20), None).unwrap(), Size::new(20, 30));
    }

    #[test]
    fn test_resolver_follows_new_source() {
        let first = Observable::new(vec![1]);
        let slot = Rc::new(RefCell::new(first.clone()));
        let resolve_from = Rc::clone(&slot);
        let list = shared(ForEach::new(
            Items::resolver(move || Some(resolve_from.borrow().clone())),
            |_: &i32, _| Ok(Leaf::new(1, 1).into_widget_ref()),
        ));
        tree::mount(&erase(&list));
        assert_eq!(list.borrow_mut().fragments().len(), 1);
        assert_eq!(first.subscriber_count(), 1);

        let second = Observable::new(vec![1, 2, 3]);
        *slot.borrow_mut() = second.clone();
        list.borrow_mut().handle_items_changed();
        assert_eq!(list.borrow().tokens().len(), 3);
        assert_eq!(first.subscriber_count(), 0);
        assert_eq!(second.subscriber_count(), 1);

        second.set(vec![4]);
        assert_eq!(list.borrow().tokens(), vec!["idx0"]);
    }

    #[test]
    fn test_unmount_releases_subscription() {
        let source = Observable::new(vec![row(1, "a")]);
        let list = erase(&shared(keyed_list(&source)));
        tree::mount(&list);
        assert_eq!(source.subscriber_count(), 1);
        tree::unmount(&list);
        assert_eq!(source.subscriber_count(), 0);
    }
}
