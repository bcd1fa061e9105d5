//! Runtime configuration.

use std::cell::RefCell;

use serde::{Deserialize, Serialize};

use crate::layout::{engine, sizing};
use crate::log_once;

/// Process-wide layout settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Count sizing parse-cache hits and misses.
    pub sizing_cache_profiling: bool,
    /// Count `LayoutEngine` cache hits and misses.
    pub layout_cache_profiling: bool,
    /// Number of distinct failure sites remembered by the log-once filter.
    pub log_once_capacity: usize,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            sizing_cache_profiling: false,
            layout_cache_profiling: false,
            log_once_capacity: log_once::DEFAULT_CAPACITY.get(),
        }
    }
}

thread_local! {
    static CURRENT: RefCell<LayoutConfig> = RefCell::new(LayoutConfig::default());
}

/// Apply `config` to this thread's layout state.
pub fn install(config: &LayoutConfig) {
    sizing::enable_sizing_cache_profiling(config.sizing_cache_profiling);
    engine::enable_layout_cache_profiling(config.layout_cache_profiling);
    log_once::set_capacity(config.log_once_capacity);
    CURRENT.with(|current| *current.borrow_mut() = config.clone());
    tracing::debug!(?config, "layout configuration installed");
}

pub fn current() -> LayoutConfig {
    CURRENT.with(|current| current.borrow().clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: LayoutConfig = serde_json::from_str(r#"{"layout_cache_profiling": true}"#).unwrap();
        assert!(config.layout_cache_profiling);
        assert!(!config.sizing_cache_profiling);
        assert_eq!(config.log_once_capacity, 1024);
    }

    #[test]
    fn test_install_applies_settings() {
        let config = LayoutConfig {
            sizing_cache_profiling: true,
            layout_cache_profiling: true,
            log_once_capacity: 8,
        };
        install(&config);
        assert!(sizing::sizing_cache_profiling_enabled());
        assert!(engine::layout_cache_profiling_enabled());
        assert_eq!(log_once::capacity(), 8);
        assert_eq!(current(), config);

        install(&LayoutConfig::default());
        assert!(!engine::layout_cache_profiling_enabled());
        assert_eq!(log_once::capacity(), 1024);
    }
}
