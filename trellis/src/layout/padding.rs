//! Box insets.

use serde::{Deserialize, Serialize};

use crate::error::{LayoutError, Result};

/// Padding around content, in pixels. Components are never negative; the
/// only ways to build one are [`Padding::parse`], [`Padding::all`] and
/// deserialization, which all enforce that.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "Sides")]
pub struct Padding {
    left: i32,
    top: i32,
    right: i32,
    bottom: i32,
}

/// Unchecked wire form of [`Padding`].
#[derive(Deserialize)]
struct Sides {
    left: i32,
    top: i32,
    right: i32,
    bottom: i32,
}

impl TryFrom<Sides> for Padding {
    type Error = LayoutError;

    fn try_from(raw: Sides) -> Result<Self> {
        Padding::parse((raw.left, raw.top, raw.right, raw.bottom))
    }
}

/// A padding request as written by a caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PaddingSpec {
    Uniform(i32),
    /// `(horizontal, vertical)`
    Symmetric(i32, i32),
    /// `(left, top, right, bottom)`
    Sides(i32, i32, i32, i32),
    Resolved(Padding),
}

impl From<i32> for PaddingSpec {
    fn from(value: i32) -> Self {
        PaddingSpec::Uniform(value)
    }
}

impl From<(i32, i32)> for PaddingSpec {
    fn from((h, v): (i32, i32)) -> Self {
        PaddingSpec::Symmetric(h, v)
    }
}

impl From<(i32, i32, i32, i32)> for PaddingSpec {
    fn from((l, t, r, b): (i32, i32, i32, i32)) -> Self {
        PaddingSpec::Sides(l, t, r, b)
    }
}

impl From<Padding> for PaddingSpec {
    fn from(value: Padding) -> Self {
        PaddingSpec::Resolved(value)
    }
}

impl Padding {
    pub const ZERO: Self = Self {
        left: 0,
        top: 0,
        right: 0,
        bottom: 0,
    };

    /// Normalize a padding request, rejecting negative components.
    pub fn parse(spec: impl Into<PaddingSpec>) -> Result<Self> {
        let padding = match spec.into() {
            PaddingSpec::Uniform(v) => Padding {
                left: v,
                top: v,
                right: v,
                bottom: v,
            },
            PaddingSpec::Symmetric(h, v) => Padding {
                left: h,
                top: v,
                right: h,
                bottom: v,
            },
            PaddingSpec::Sides(left, top, right, bottom) => Padding {
                left,
                top,
                right,
                bottom,
            },
            PaddingSpec::Resolved(p) => p,
        };
        if padding.left < 0 || padding.top < 0 || padding.right < 0 || padding.bottom < 0 {
            return Err(LayoutError::InvalidPadding(format!(
                "padding components must be non-negative, got {padding:?}"
            )));
        }
        Ok(padding)
    }

    /// Uniform padding. Negative values clamp to zero.
    pub fn all(value: i32) -> Self {
        let v = value.max(0);
        Self {
            left: v,
            top: v,
            right: v,
            bottom: v,
        }
    }

    pub fn left(&self) -> i32 {
        self.left
    }

    pub fn top(&self) -> i32 {
        self.top
    }

    pub fn right(&self) -> i32 {
        self.right
    }

    pub fn bottom(&self) -> i32 {
        self.bottom
    }

    /// Left plus right.
    #[inline]
    pub fn horizontal(&self) -> i32 {
        self.left + self.right
    }

    /// Top plus bottom.
    #[inline]
    pub fn vertical(&self) -> i32 {
        self.top + self.bottom
    }

    pub fn as_tuple(&self) -> (i32, i32, i32, i32) {
        (self.left, self.top, self.right, self.bottom)
    }
}
