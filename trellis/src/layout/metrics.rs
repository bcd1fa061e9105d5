//! Shared alignment, spacing and flex math.
//!
//! All functions here are pure and work on whole pixels. Integer remainders are
//! always handed to the earliest items so output is reproducible run to run.

use serde::{Deserialize, Serialize};

use super::alignment::{Align, MainAxisAlignment};
use super::sizing::Sizing;

/// Leading offset of a child of extent `child` inside `container`.
#[inline]
pub fn align_offset(container: i32, child: i32, align: Align) -> i32 {
    let c = container.max(0);
    let ch = child.max(0);
    if c <= 0 {
        return 0;
    }
    match align {
        Align::Start | Align::Stretch => 0,
        Align::Center => ((c - ch) / 2).max(0),
        Align::End => (c - ch).max(0),
    }
}

/// Offsets of items packed from zero with `gap` between them.
pub fn prefix_offsets(sizes: &[i32], gap: i32) -> Vec<i32> {
    let mut offsets = Vec::with_capacity(sizes.len());
    let mut cursor = 0;
    for (i, size) in sizes.iter().enumerate() {
        offsets.push(cursor);
        cursor += (*size).max(0);
        if i + 1 < sizes.len() {
            cursor += gap;
        }
    }
    offsets
}

/// Leading offset of each item along a main axis of length `total`.
pub fn distribute_main_axis_offsets(
    sizes: &[i32],
    total: i32,
    gap: i32,
    mode: MainAxisAlignment,
) -> Vec<i32> {
    let n = sizes.len();
    if n == 0 {
        return Vec::new();
    }
    let content: i32 = sizes.iter().sum::<i32>() + gap * (n as i32 - 1);
    let free = (total - content).max(0);

    match mode {
        MainAxisAlignment::Start => prefix_offsets(sizes, gap),
        MainAxisAlignment::Center => shifted(prefix_offsets(sizes, gap), free / 2),
        MainAxisAlignment::End => shifted(prefix_offsets(sizes, gap), free),
        MainAxisAlignment::SpaceBetween => {
            if n == 1 {
                return vec![0];
            }
            let slots = n as i32 - 1;
            let (step, rem) = (free / slots, free % slots);
            let mut offsets = Vec::with_capacity(n);
            let mut cursor = 0;
            for (i, size) in sizes.iter().enumerate() {
                offsets.push(cursor);
                if i + 1 < n {
                    let extra = step + i32::from((i as i32) < rem);
                    cursor += size + gap + extra;
                }
            }
            offsets
        }
        MainAxisAlignment::SpaceAround => {
            let (unit, rem) = (free / n as i32, free % n as i32);
            let mut offsets = Vec::with_capacity(n);
            let mut cursor = 0;
            for (i, size) in sizes.iter().enumerate() {
                let extra = unit + i32::from((i as i32) < rem);
                let before = extra / 2;
                let after = extra - before;
                cursor += before;
                offsets.push(cursor);
                cursor += size + gap + after;
            }
            offsets
        }
        MainAxisAlignment::SpaceEvenly => {
            let slots = n as i32 + 1;
            let (unit, rem) = (free / slots, free % slots);
            let mut offsets = Vec::with_capacity(n);
            let mut cursor = 0;
            for (i, size) in sizes.iter().enumerate() {
                // gap i sits before item i
                cursor += unit + i32::from((i as i32) < rem);
                offsets.push(cursor);
                cursor += size + gap;
            }
            offsets
        }
    }
}

fn shifted(mut offsets: Vec<i32>, by: i32) -> Vec<i32> {
    for o in &mut offsets {
        *o += by;
    }
    offsets
}

// =========================================================================
// Flex distribution
// =========================================================================

/// Main-axis input for one child: a base size it always receives, or a weight.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FlexInput {
    /// Fixed or content-sized child.
    Base(i32),
    /// Flexible child sharing leftover space.
    Flex(f32),
}

impl FlexInput {
    /// Fixed → the fixed value, Auto → the measured size, Flex → its weight.
    pub fn from_sizing(sizing: Sizing, measured: i32) -> Self {
        match sizing {
            Sizing::Fixed(_) => FlexInput::Base(sizing.fixed_px().unwrap_or(0)),
            Sizing::Auto => FlexInput::Base(measured.max(0)),
            Sizing::Flex(w) => FlexInput::Flex(if w > 0.0 { w } else { 1.0 }),
        }
    }

    pub fn base(&self) -> i32 {
        match self {
            FlexInput::Base(b) => *b,
            FlexInput::Flex(_) => 0,
        }
    }

    pub fn weight(&self) -> f32 {
        match self {
            FlexInput::Base(_) => 0.0,
            FlexInput::Flex(w) => *w,
        }
    }
}

/// Split `usable` between children.
///
/// Weight-0 items get exactly their base size, even if that overflows.
/// Whatever is left goes to weighted items in proportion to weight, truncated
/// per item, with leftover pixels handed out one at a time in index order.
pub fn distribute_flex_space(base_sizes: &[i32], weights: &[f32], usable: i32) -> Vec<i32> {
    let n = base_sizes.len();
    if n == 0 {
        return Vec::new();
    }
    let usable = usable.max(0);
    if usable == 0 {
        return vec![0; n];
    }
    let weight_at = |i: usize| weights.get(i).copied().unwrap_or(0.0).max(0.0);

    let mut alloc: Vec<i32> = base_sizes.iter().map(|b| (*b).max(0)).collect();
    let minimum: i32 = (0..n).filter(|&i| weight_at(i) == 0.0).map(|i| alloc[i]).sum();
    let remaining = usable - minimum;
    let total_weight: f32 = (0..n).map(weight_at).sum();

    // No clawback: a negative remainder leaves the flex items at their base.
    if remaining <= 0 || total_weight <= 0.0 {
        return alloc;
    }

    let mut used = 0;
    for (i, size) in alloc.iter_mut().enumerate() {
        let w = weight_at(i);
        if w > 0.0 {
            let share = (w as f64 / total_weight as f64 * remaining as f64) as i32;
            *size += share;
            used += share;
        }
    }
    let mut leftover = remaining - used;
    for (i, size) in alloc.iter_mut().enumerate() {
        if leftover == 0 {
            break;
        }
        if weight_at(i) > 0.0 {
            *size += 1;
            leftover -= 1;
        }
    }
    alloc
}

/// [`distribute_flex_space`] over [`FlexInput`]s.
pub fn distribute_flex(inputs: &[FlexInput], usable: i32) -> Vec<i32> {
    let bases: Vec<i32> = inputs.iter().map(FlexInput::base).collect();
    let weights: Vec<f32> = inputs.iter().map(FlexInput::weight).collect();
    distribute_flex_space(&bases, &weights, usable)
}

// =========================================================================
// Corner radii
// =========================================================================

/// Per-corner radius request. Values in `(0, 1)` are a fraction of half the
/// shorter side; values `>= 1` are pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CornerRadii {
    pub top_left: f32,
    pub top_right: f32,
    pub bottom_right: f32,
    pub bottom_left: f32,
}

impl CornerRadii {
    pub const ZERO: Self = Self::all(0.0);

    pub const fn all(radius: f32) -> Self {
        Self {
            top_left: radius,
            top_right: radius,
            bottom_right: radius,
            bottom_left: radius,
        }
    }

    pub const fn new(top_left: f32, top_right: f32, bottom_right: f32, bottom_left: f32) -> Self {
        Self {
            top_left,
            top_right,
            bottom_right,
            bottom_left,
        }
    }

    /// Resolve to pixel radii for a `width` x `height` box.
    pub fn resolve(&self, width: i32, height: i32) -> CornerRadii {
        let limit = (width.min(height).max(0) as f32) / 2.0;
        let one = |r: f32| {
            if r <= 0.0 || !r.is_finite() {
                0.0
            } else if r < 1.0 {
                r * limit
            } else {
                r.min(limit)
            }
        };
        CornerRadii {
            top_left: one(self.top_left),
            top_right: one(self.top_right),
            bottom_right: one(self.bottom_right),
            bottom_left: one(self.bottom_left),
        }
    }

    pub fn is_square(&self) -> bool {
        self.top_left <= 0.0
            && self.top_right <= 0.0
            && self.bottom_right <= 0.0
            && self.bottom_left <= 0.0
    }
}

impl From<f32> for CornerRadii {
    fn from(radius: f32) -> Self {
        CornerRadii::all(radius)
    }
}
