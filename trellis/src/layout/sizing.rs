//! Sizing requests along one axis.
//!
//! A node declares how much space it wants per axis: an exact pixel count, its
//! content size, or a weighted share of whatever the parent has left over.
//! Callers usually write these as literals (`120`, `"auto"`, `"50%"`), so
//! [`parse`] normalizes and memoizes them.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{LayoutError, Result};

/// Space-request policy for one axis.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum Sizing {
    /// Exact size in pixels.
    Fixed(f32),
    /// Size derived from content.
    #[default]
    Auto,
    /// Share of leftover space by weight. Always positive.
    Flex(f32),
}

/// Discriminant of a [`Sizing`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SizingKind {
    Fixed,
    Auto,
    Flex,
}

/// Hashable `(kind, value)` form of a sizing, used in cache keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SizingSignature {
    pub kind: SizingKind,
    bits: u32,
}

impl SizingSignature {
    pub fn value(&self) -> f32 {
        f32::from_bits(self.bits)
    }
}

impl Sizing {
    #[inline]
    pub fn fixed(value: f32) -> Self {
        Sizing::Fixed(value)
    }

    #[inline]
    pub fn auto() -> Self {
        Sizing::Auto
    }

    /// A flex weight; non-positive weights degrade to `Auto`.
    #[inline]
    pub fn flex(weight: f32) -> Self {
        if weight > 0.0 {
            Sizing::Flex(weight)
        } else {
            Sizing::Auto
        }
    }

    pub fn kind(&self) -> SizingKind {
        match self {
            Sizing::Fixed(_) => SizingKind::Fixed,
            Sizing::Auto => SizingKind::Auto,
            Sizing::Flex(_) => SizingKind::Flex,
        }
    }

    /// Numeric payload; 0 for `Auto`.
    pub fn value(&self) -> f32 {
        match self {
            Sizing::Fixed(v) | Sizing::Flex(v) => *v,
            Sizing::Auto => 0.0,
        }
    }

    /// Fixed value truncated to whole pixels.
    pub fn fixed_px(&self) -> Option<i32> {
        match self {
            Sizing::Fixed(v) => Some(v.max(0.0) as i32),
            _ => None,
        }
    }

    /// Flex weight, or 0 if not flexible.
    pub fn weight(&self) -> f32 {
        match self {
            Sizing::Flex(w) => *w,
            _ => 0.0,
        }
    }

    #[inline]
    pub fn is_fixed(&self) -> bool {
        matches!(self, Sizing::Fixed(_))
    }

    #[inline]
    pub fn is_flex(&self) -> bool {
        matches!(self, Sizing::Flex(_))
    }

    pub fn signature(&self) -> SizingSignature {
        SizingSignature {
            kind: self.kind(),
            bits: self.value().to_bits(),
        }
    }
}

// =========================================================================
// Parsing
// =========================================================================

/// A sizing request as written by a caller.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SizingSpec {
    /// Nothing given; resolves to the default.
    #[default]
    Unset,
    Number(f64),
    Text(String),
    Resolved(Sizing),
}

impl From<Sizing> for SizingSpec {
    fn from(value: Sizing) -> Self {
        SizingSpec::Resolved(value)
    }
}

impl From<&str> for SizingSpec {
    fn from(value: &str) -> Self {
        SizingSpec::Text(value.to_owned())
    }
}

impl From<String> for SizingSpec {
    fn from(value: String) -> Self {
        SizingSpec::Text(value)
    }
}

macro_rules! sizing_spec_from_number {
    ($($t:ty),*) => {
        $(impl From<$t> for SizingSpec {
            fn from(value: $t) -> Self {
                SizingSpec::Number(value as f64)
            }
        })*
    };
}

sizing_spec_from_number!(i32, i64, u32, u16, usize, f32, f64);

impl<T: Into<SizingSpec>> From<Option<T>> for SizingSpec {
    fn from(value: Option<T>) -> Self {
        value.map_or(SizingSpec::Unset, Into::into)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum CacheKey {
    Unset,
    Default(SizingSignature),
    Number(u64),
    Text(String),
}

thread_local! {
    static PARSE_CACHE: RefCell<HashMap<CacheKey, Sizing>> = RefCell::new(HashMap::new());
    static PROFILING: Cell<bool> = const { Cell::new(false) };
    static STATS: Cell<SizingCacheStats> = const { Cell::new(SizingCacheStats { parse_hits: 0, parse_misses: 0 }) };
}

/// Parse-cache counters, collected while profiling is enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SizingCacheStats {
    pub parse_hits: u64,
    pub parse_misses: u64,
}

/// Normalize a sizing request.
///
/// `Unset` resolves to `default` (or `Auto`). Numbers must be non-negative and
/// finite. Strings accept `"auto"` in any case and `"<weight>%"` with a
/// positive weight. An already-resolved `Sizing` passes through untouched.
pub fn parse(spec: impl Into<SizingSpec>, default: Option<Sizing>) -> Result<Sizing> {
    let spec = spec.into();
    let key = match &spec {
        SizingSpec::Resolved(sizing) => return Ok(*sizing),
        SizingSpec::Unset => match default {
            Some(d) => CacheKey::Default(d.signature()),
            None => CacheKey::Unset,
        },
        SizingSpec::Number(n) => CacheKey::Number(n.to_bits()),
        SizingSpec::Text(t) => CacheKey::Text(t.trim().to_lowercase()),
    };

    if let Some(hit) = PARSE_CACHE.with(|cache| cache.borrow().get(&key).copied()) {
        record(|s| s.parse_hits += 1);
        return Ok(hit);
    }

    let resolved = resolve(&spec, default)?;
    PARSE_CACHE.with(|cache| cache.borrow_mut().insert(key, resolved));
    record(|s| s.parse_misses += 1);
    Ok(resolved)
}

fn resolve(spec: &SizingSpec, default: Option<Sizing>) -> Result<Sizing> {
    match spec {
        SizingSpec::Resolved(sizing) => Ok(*sizing),
        SizingSpec::Unset => Ok(default.unwrap_or(Sizing::Auto)),
        SizingSpec::Number(n) => {
            if !n.is_finite() || *n < 0.0 {
                return Err(LayoutError::InvalidSizing(format!(
                    "sizing value must be a non-negative number, got {n}"
                )));
            }
            Ok(Sizing::Fixed(*n as f32))
        }
        SizingSpec::Text(raw) => {
            let trimmed = raw.trim().to_lowercase();
            if trimmed == "auto" {
                return Ok(Sizing::Auto);
            }
            let Some(number) = trimmed.strip_suffix('%') else {
                return Err(LayoutError::InvalidSizing(format!(
                    "unsupported sizing string: {raw:?}"
                )));
            };
            let number = number.trim();
            if number.is_empty() {
                return Err(LayoutError::InvalidSizing(format!(
                    "percentage sizing missing numeric weight: {raw:?}"
                )));
            }
            let weight: f32 = number.parse().map_err(|_| {
                LayoutError::InvalidSizing(format!("unparseable percentage weight: {raw:?}"))
            })?;
            if !weight.is_finite() || weight <= 0.0 {
                return Err(LayoutError::InvalidSizing(format!(
                    "percentage weight must be positive: {raw:?}"
                )));
            }
            Ok(Sizing::Flex(weight))
        }
    }
}

fn record(f: impl FnOnce(&mut SizingCacheStats)) {
    if PROFILING.with(Cell::get) {
        STATS.with(|stats| {
            let mut current = stats.get();
            f(&mut current);
            stats.set(current);
        });
    }
}

/// Drop every memoized parse result.
pub fn clear_parse_cache() {
    PARSE_CACHE.with(|cache| cache.borrow_mut().clear());
}

pub fn parse_cache_len() -> usize {
    PARSE_CACHE.with(|cache| cache.borrow().len())
}

pub fn enable_sizing_cache_profiling(enabled: bool) {
    PROFILING.with(|p| p.set(enabled));
}

pub fn sizing_cache_profiling_enabled() -> bool {
    PROFILING.with(Cell::get)
}

pub fn reset_sizing_cache_stats() {
    STATS.with(|stats| stats.set(SizingCacheStats::default()));
}

pub fn sizing_cache_stats() -> SizingCacheStats {
    STATS.with(Cell::get)
}
