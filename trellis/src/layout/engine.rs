//! Geometry cache for single-child boxes.
//!
//! A `LayoutEngine` belongs to one box and memoizes three things against cheap
//! keys: the inset-inclusive preferred size, the inner content rect, and the
//! child's placement inside it. Each slot holds one entry; a changed key
//! recomputes only that slot.

use std::cell::Cell;

use super::alignment::{Align, AlignPair};
use super::measure;
use super::padding::Padding;
use super::sizing::{Sizing, SizingSignature};
use crate::error::Result;
use crate::primitives::{Rect, Size};
use crate::widget::WidgetRef;

/// What the owning box contributes to every computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct EngineOwner {
    pub padding: Padding,
    pub border_width: i32,
    pub align: AlignPair,
    /// Opaque generation token of the owner.
    pub token: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct InsetKey {
    padding: Padding,
    border_width: i32,
    token: Option<u64>,
}

impl From<&EngineOwner> for InsetKey {
    fn from(owner: &EngineOwner) -> Self {
        Self {
            padding: owner.padding,
            border_width: owner.border_width,
            token: owner.token,
        }
    }
}

/// Inputs that decide one child placement, beyond the inner size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PlacementRequest {
    pub child_align: Option<AlignPair>,
    pub clamp_width: bool,
    pub clamp_height: bool,
    pub child_token: Option<u64>,
    pub width_signature: Option<SizingSignature>,
    pub height_signature: Option<SizingSignature>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct PlacementKey {
    request: PlacementRequest,
    owner_align: AlignPair,
    inner: Size,
    pref: Size,
}

/// Cache counters, collected while profiling is enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LayoutCacheStats {
    pub preferred_hits: u64,
    pub preferred_misses: u64,
    pub inner_hits: u64,
    pub inner_misses: u64,
    pub placement_hits: u64,
    pub placement_misses: u64,
}

thread_local! {
    static PROFILING: Cell<bool> = const { Cell::new(false) };
    static STATS: Cell<LayoutCacheStats> = const {
        Cell::new(LayoutCacheStats {
            preferred_hits: 0,
            preferred_misses: 0,
            inner_hits: 0,
            inner_misses: 0,
            placement_hits: 0,
            placement_misses: 0,
        })
    };
}

fn record(f: impl FnOnce(&mut LayoutCacheStats)) {
    if PROFILING.with(Cell::get) {
        STATS.with(|stats| {
            let mut current = stats.get();
            f(&mut current);
            stats.set(current);
        });
    }
}

pub fn enable_layout_cache_profiling(enabled: bool) {
    PROFILING.with(|p| p.set(enabled));
}

pub fn layout_cache_profiling_enabled() -> bool {
    PROFILING.with(Cell::get)
}

pub fn reset_layout_cache_stats() {
    STATS.with(|stats| stats.set(LayoutCacheStats::default()));
}

pub fn layout_cache_stats() -> LayoutCacheStats {
    STATS.with(Cell::get)
}

/// Insets derived from padding and border: origin offset and total shrink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Insets {
    offset_x: i32,
    offset_y: i32,
    shrink_w: i32,
    shrink_h: i32,
}

/// Memoized geometry for one single-child box.
#[derive(Debug, Default, Clone)]
pub struct LayoutEngine {
    preferred: Option<(InsetKey, Size)>,
    inner: Option<(InsetKey, Insets)>,
    placement: Option<(PlacementKey, Rect)>,
}

impl LayoutEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Child preferred size plus padding and border on both sides.
    pub fn preferred_size(&mut self, owner: &EngineOwner, child_pref: Size) -> Size {
        let key = InsetKey::from(owner);
        let extra = match self.preferred {
            Some((cached, extra)) if cached == key => {
                record(|s| s.preferred_hits += 1);
                extra
            }
            _ => {
                let p = owner.padding;
                let extra = Size::new(
                    p.horizontal() + owner.border_width * 2,
                    p.vertical() + owner.border_width * 2,
                );
                self.preferred = Some((key, extra));
                record(|s| s.preferred_misses += 1);
                extra
            }
        };
        Size::new(
            child_pref.width.max(0) + extra.width,
            child_pref.height.max(0) + extra.height,
        )
    }

    /// Content rect inside `outer` after padding and border.
    pub fn compute_inner_rect(&mut self, owner: &EngineOwner, outer: Rect) -> Rect {
        let key = InsetKey::from(owner);
        let insets = match self.inner {
            Some((cached, insets)) if cached == key => {
                record(|s| s.inner_hits += 1);
                insets
            }
            _ => {
                let p = owner.padding;
                let bw = owner.border_width;
                let insets = Insets {
                    offset_x: p.left() + bw,
                    offset_y: p.top() + bw,
                    shrink_w: p.horizontal() + bw * 2,
                    shrink_h: p.vertical() + bw * 2,
                };
                self.inner = Some((key, insets));
                record(|s| s.inner_misses += 1);
                insets
            }
        };
        Rect::new(
            outer.x + insets.offset_x,
            outer.y + insets.offset_y,
            (outer.width - insets.shrink_w).max(0),
            (outer.height - insets.shrink_h).max(0),
        )
    }

    /// Child offset (relative to the inner rect) and size.
    ///
    /// A positive preferred extent is used as-is, zero fills the inner extent.
    /// Clamped axes never exceed the inner extent. The child's own alignment
    /// wins over the owner's.
    pub fn compute_child_placement(
        &mut self,
        owner: &EngineOwner,
        inner: Size,
        pref: Size,
        request: PlacementRequest,
    ) -> Rect {
        let key = PlacementKey {
            request,
            owner_align: owner.align,
            inner,
            pref,
        };
        if let Some((cached, rect)) = self.placement {
            if cached == key {
                record(|s| s.placement_hits += 1);
                return rect;
            }
        }
        record(|s| s.placement_misses += 1);

        let mut w = if pref.width > 0 { pref.width } else { inner.width };
        let mut h = if pref.height > 0 { pref.height } else { inner.height };
        if request.clamp_width {
            w = w.min(inner.width);
        }
        if request.clamp_height {
            h = h.min(inner.height);
        }

        let align = request.child_align.unwrap_or(owner.align);
        let x = offset_within(inner.width, w, align.horizontal);
        let y = offset_within(inner.height, h, align.vertical);

        let rect = Rect::new(x, y, w, h);
        self.placement = Some((key, rect));
        rect
    }

    /// Measure `child` inside `inner` and place it. Returns a rect in the
    /// same space as `inner`.
    pub fn resolve_child_geometry(
        &mut self,
        owner: &EngineOwner,
        child: &WidgetRef,
        inner: Rect,
    ) -> Result<Rect> {
        let measured = measure::preferred_size(child, Some(inner.width), Some(inner.height))?;
        let (width_sizing, height_sizing, child_align, child_token) = match child.try_borrow() {
            Ok(w) => (
                w.width_sizing(),
                w.height_sizing(),
                w.layout_align(),
                w.base().layout_cache_token(),
            ),
            Err(_) => (Sizing::Auto, Sizing::Auto, None, None),
        };

        let (pref_w, clamp_w) = axis_preference(width_sizing, measured.width);
        let (pref_h, clamp_h) = axis_preference(height_sizing, measured.height);

        let placed = self.compute_child_placement(
            owner,
            inner.size(),
            Size::new(pref_w, pref_h),
            PlacementRequest {
                child_align,
                clamp_width: clamp_w,
                clamp_height: clamp_h,
                child_token,
                width_signature: Some(width_sizing.signature()),
                height_signature: Some(height_sizing.signature()),
            },
        );
        Ok(placed.translate(inner.x, inner.y))
    }

    /// Forget all three cached entries.
    pub fn invalidate_cache(&mut self) {
        self.preferred = None;
        self.inner = None;
        self.placement = None;
    }
}

/// Fixed enlarges the measurement and is never clamped; Flex claims nothing
/// so the inner extent fills it; Auto is clamped to the inner extent.
fn axis_preference(sizing: Sizing, measured: i32) -> (i32, bool) {
    match sizing {
        Sizing::Fixed(_) => (measured.max(sizing.fixed_px().unwrap_or(0)), false),
        Sizing::Flex(_) => (0, false),
        Sizing::Auto => (measured, true),
    }
}

fn offset_within(extent: i32, child: i32, align: Align) -> i32 {
    match align {
        Align::Center => (extent - child).div_euclid(2),
        Align::End => extent - child,
        Align::Start | Align::Stretch => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::container::Leaf;
    use crate::widget::{IntoWidgetRef, Widget};

    fn owner(padding: (i32, i32, i32, i32), border_width: i32) -> EngineOwner {
        EngineOwner {
            padding: Padding::parse(padding).unwrap(),
            border_width,
            ..EngineOwner::default()
        }
    }

    #[test]
    fn test_preferred_size_includes_insets() {
        let mut engine = LayoutEngine::new();
        let o = owner((2, 3, 4, 5), 1);
        assert_eq!(engine.preferred_size(&o, Size::new(10, 20)), Size::new(18, 30));
    }

    #[test]
    fn test_inner_rect() {
        let mut engine = LayoutEngine::new();
        let o = owner((5, 6, 7, 8), 2);
        let inner = engine.compute_inner_rect(&o, Rect::new(0, 0, 100, 50));
        assert_eq!(inner, Rect::new(7, 8, 84, 28));
        // insets larger than the box clamp at zero
        let tiny = engine.compute_inner_rect(&o, Rect::new(0, 0, 5, 5));
        assert_eq!(tiny.size(), Size::ZERO);
    }

    #[test]
    fn test_placement_alignment() {
        let mut engine = LayoutEngine::new();
        let o = EngineOwner {
            align: AlignPair::new(Align::Center, Align::End),
            ..EngineOwner::default()
        };
        let r = engine.compute_child_placement(
            &o,
            Size::new(80, 60),
            Size::new(40, 20),
            PlacementRequest::default(),
        );
        assert_eq!(r, Rect::new(20, 40, 40, 20));
        let fill = engine.compute_child_placement(
            &o,
            Size::new(80, 60),
            Size::ZERO,
            PlacementRequest::default(),
        );
        assert_eq!(fill, Rect::new(0, 0, 80, 60));
    }

    #[test]
    fn test_child_align_overrides_owner() {
        let mut engine = LayoutEngine::new();
        let o = EngineOwner {
            align: AlignPair::CENTER,
            ..EngineOwner::default()
        };
        let r = engine.compute_child_placement(
            &o,
            Size::new(100, 100),
            Size::new(10, 10),
            PlacementRequest {
                child_align: Some(AlignPair::new(Align::End, Align::Start)),
                ..PlacementRequest::default()
            },
        );
        assert_eq!(r, Rect::new(90, 0, 10, 10));
    }

    #[test]
    fn test_auto_child_clamped_to_inner() {
        let mut engine = LayoutEngine::new();
        let o = EngineOwner::default();
        let child = Leaf::new(400, 20).into_widget_ref();
        let r = engine
            .resolve_child_geometry(&o, &child, Rect::new(0, 0, 120, 40))
            .unwrap();
        assert_eq!(r.width, 120);
    }

    #[test]
    fn test_fixed_child_not_clamped() {
        let mut engine = LayoutEngine::new();
        let o = EngineOwner::default();
        let child = Leaf::new(10, 20).into_widget_ref();
        child.borrow_mut().set_width(Sizing::Fixed(300.0));
        let r = engine
            .resolve_child_geometry(&o, &child, Rect::new(0, 0, 120, 40))
            .unwrap();
        assert_eq!(r.width, 300);
    }

    #[test]
    fn test_flex_child_fills_inner() {
        let mut engine = LayoutEngine::new();
        let o = EngineOwner::default();
        let child = Leaf::new(10, 20).into_widget_ref();
        child.borrow_mut().set_width(Sizing::Flex(1.0));
        let r = engine
            .resolve_child_geometry(&o, &child, Rect::new(5, 5, 120, 40))
            .unwrap();
        assert_eq!(r, Rect::new(5, 5, 120, 20));
    }

    #[test]
    fn test_cache_hits_and_token_miss() {
        enable_layout_cache_profiling(true);
        reset_layout_cache_stats();

        let mut engine = LayoutEngine::new();
        let o = owner((1, 1, 1, 1), 0);
        let child = Leaf::new(10, 10).into_widget_ref();
        let inner = Rect::new(0, 0, 50, 50);

        engine.preferred_size(&o, Size::new(1, 1));
        engine.preferred_size(&o, Size::new(2, 2));
        engine.compute_inner_rect(&o, inner);
        engine.compute_inner_rect(&o, inner);
        engine.resolve_child_geometry(&o, &child, inner).unwrap();
        engine.resolve_child_geometry(&o, &child, inner).unwrap();

        child.borrow_mut().set_layout_cache_token(Some(7));
        engine.resolve_child_geometry(&o, &child, inner).unwrap();

        let stats = layout_cache_stats();
        assert_eq!(stats.preferred_misses, 1);
        assert_eq!(stats.preferred_hits, 1);
        assert_eq!(stats.inner_misses, 1);
        assert_eq!(stats.inner_hits, 1);
        assert_eq!(stats.placement_misses, 2);
        assert_eq!(stats.placement_hits, 1);

        engine.invalidate_cache();
        engine.compute_inner_rect(&o, inner);
        assert_eq!(layout_cache_stats().inner_misses, 2);

        enable_layout_cache_profiling(false);
    }

    #[test]
    fn test_owner_token_changes_key() {
        enable_layout_cache_profiling(true);
        reset_layout_cache_stats();
        let mut engine = LayoutEngine::new();
        let mut o = owner((0, 0, 0, 0), 1);
        engine.preferred_size(&o, Size::ZERO);
        o.token = Some(1);
        engine.preferred_size(&o, Size::ZERO);
        assert_eq!(layout_cache_stats().preferred_misses, 2);
        enable_layout_cache_profiling(false);
    }
}
