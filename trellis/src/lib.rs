//! Trellis: a retained-mode layout engine.
//!
//! A tree of [`Widget`] nodes is measured, laid out and painted in two
//! phases. Containers cover the usual shapes (single child, linear boxes,
//! stacks, grids, wrapping flows, uniform tiles) and any multi-child
//! container can take a keyed [`ForEach`] provider that materializes children
//! from a list.
//!
//! # Usage
//!
//! ```ignore
//! use trellis::{LinearBox, Leaf, Sizing, tree};
//!
//! let row = LinearBox::row()
//!     .gap(8)
//!     .child(Leaf::new(40, 20))
//!     .child(Leaf::new(10, 20).width(Sizing::flex(1.0)))
//!     .into_widget_ref();
//! tree::mount(&row);
//! row.borrow_mut().layout(200, 20)?;
//! ```

// Core primitives
pub mod error;
pub mod primitives;

// Diagnostics and settings
pub mod config;
pub mod log_once;

// Reactive boundary
pub mod binding;
pub mod observable;

// Node model
pub mod canvas;
pub mod tree;
pub mod widget;

pub mod layout;

// Re-export core types
pub use canvas::{Canvas, DisplayList, DrawOp};
pub use config::LayoutConfig;
pub use error::{LayoutError, Result};
pub use observable::{Observable, Subscription};
pub use primitives::{Color, Rect, Size};
pub use widget::{IntoWidgetRef, Slot, WeakWidgetRef, Widget, WidgetBase, WidgetRef, erase, same_widget, shared};

pub use layout::{
    Align, AlignPair, Axis, Container, CornerRadii, CrossAligned, Deck, Flow, ForEach, Grid, GridIndex,
    GridItem, GridPlacement, Items, LayoutEngine, Leaf, LinearBox, MainAxisAlignment, Measured, Padding,
    Panel, Sizing, SizingSpec, Spacer, Stack, UniformFlow,
};
