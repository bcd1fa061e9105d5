//! Layout algorithms.
//!
//! ```text
//! preferred_size(max_w, max_h) -> layout(w, h) writes child rects -> paint
//! ```
//!
//! Pure helpers (sizing normalization, padding, alignment offsets, flex
//! distribution) live below the containers that use them.

pub mod alignment;
pub mod metrics;
pub mod padding;
pub mod sizing;

pub mod engine;
pub mod expand;
pub mod measure;

pub mod container;
pub mod flow;
pub mod for_each;
pub mod grid;
pub mod linear;
pub mod stack;
pub mod uniform_flow;

pub use alignment::{Align, AlignPair, MainAxisAlignment};
pub use container::{Container, CrossAligned, Leaf, Measured, Panel, Spacer};
pub use engine::{EngineOwner, LayoutCacheStats, LayoutEngine, PlacementRequest};
pub use flow::Flow;
pub use for_each::{Entry, ForEach, Items};
pub use grid::{Grid, GridIndex, GridItem, GridPlacement};
pub use linear::{Axis, LinearBox};
pub use metrics::CornerRadii;
pub use padding::{Padding, PaddingSpec};
pub use sizing::{Sizing, SizingSpec};
pub use stack::{Deck, Stack};
pub use uniform_flow::UniformFlow;
