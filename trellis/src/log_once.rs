//! Emit a diagnostic at most once per failure site.
//!
//! Containers swallow misbehaving children and keep going, which means the same
//! failure repeats every frame. Each site key is logged the first time it is
//! seen; the key set is an `LruCache` so it stays bounded in long-running processes.

use std::cell::RefCell;
use std::fmt::Display;
use std::num::NonZeroUsize;

use lru::LruCache;

pub const DEFAULT_CAPACITY: NonZeroUsize = NonZeroUsize::MIN.saturating_add(1023);

thread_local! {
    static SEEN: RefCell<LruCache<String, ()>> = RefCell::new(LruCache::new(DEFAULT_CAPACITY));
}

/// Record `site` and report whether this is its first occurrence.
pub fn first_occurrence(site: &str) -> bool {
    SEEN.with(|seen| {
        let mut seen = seen.borrow_mut();
        if seen.contains(site) {
            return false;
        }
        seen.put(site.to_owned(), ());
        true
    })
}

pub fn warn_once(site: &str, message: impl Display) {
    if first_occurrence(site) {
        tracing::warn!(site = %site, "{}", message);
    }
}

pub fn debug_once(site: &str, message: impl Display) {
    if first_occurrence(site) {
        tracing::debug!(site = %site, "{}", message);
    }
}

pub fn error_once(site: &str, message: impl Display) {
    if first_occurrence(site) {
        tracing::error!(site = %site, "{}", message);
    }
}

/// Resize the key set. A capacity of zero is treated as one.
pub fn set_capacity(capacity: usize) {
    let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
    SEEN.with(|seen| seen.borrow_mut().resize(capacity));
}

pub fn capacity() -> usize {
    SEEN.with(|seen| seen.borrow().cap().get())
}

/// Forget every recorded site.
pub fn reset() {
    SEEN.with(|seen| seen.borrow_mut().clear());
}
