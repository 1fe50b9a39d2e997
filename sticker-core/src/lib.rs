//! # Sticker Core
//!
//! Core composition logic for Sticker Studio: the scene of placed
//! stickers, the transform math that makes direct manipulation correct
//! under rotation and scale, and the automatic layout algorithms.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                sticker-core                 │
//! ├─────────────────────────────────────────────┤
//! │  Scene           │  Interaction Controller  │
//! │  - Elements      │  - Drag sessions         │
//! │  - Z-order       │  - Pinch / wheel scaling │
//! │  - Selection     │  - Keyboard rotation     │
//! ├─────────────────────────────────────────────┤
//! │  Geometry Kernel │  Layout Engine           │
//! │  - World↔local   │  - Grid / circle         │
//! │  - Hit testing   │  - Collage / auto pack   │
//! │  - Text measure  │  - Zoom / spacing        │
//! └─────────────────────────────────────────────┘
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod element;
pub mod error;
pub mod event;
pub mod geometry;
pub mod interaction;
pub mod layout;
pub mod scene;

pub use element::{Element, ElementId, ElementKind, Transform, MAX_SCALE, MIN_SCALE};
pub use error::{StickerError, StickerResult};
pub use event::{InputEvent, KeyModifiers, TouchEvent, TouchPhase, TouchPoint};
pub use geometry::{AdvanceWidthMeasurer, RoundedRect, TextMeasurer};
pub use interaction::InteractionController;
pub use layout::LayoutEngine;
pub use scene::{Scene, StickerRecord};

/// Sticker core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
