//! # Sticker Renderer
//!
//! CPU export pipeline for Sticker Studio: renders a
//! [`sticker_core::Scene`] in z-order to an SVG intermediate and
//! rasterizes it with resvg/tiny-skia into PNG or JPEG bytes. Also owns
//! image decoding, the decoded-raster cache the scene's image references
//! resolve through, and coalesced redraw scheduling.
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │              sticker-renderer               │
//! ├─────────────────────────────────────────────┤
//! │  Raster          │  Export                  │
//! │  - decode bytes  │  - scene → SVG           │
//! │  - batch decode  │  - SVG → pixmap          │
//! │  - texture cache │  - PNG / JPEG / SVG      │
//! ├─────────────────────────────────────────────┤
//! │  Redraw: coalesced paint requests           │
//! └─────────────────────────────────────────────┘
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod export;
pub mod raster;
pub mod redraw;

pub use error::{RenderError, RenderResult};
pub use export::{ExportConfig, ExportFormat, SceneExporter};
pub use raster::{decode_batch, decode_image, RasterImage, TextureCache};
pub use redraw::RedrawScheduler;

/// Sticker renderer version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
