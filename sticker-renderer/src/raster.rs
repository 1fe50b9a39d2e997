//! Image decoding and the decoded-raster cache.
//!
//! Decoding is the one suspension point in the system: each upload is a
//! single-result async task that either resolves with a decoded raster
//! or fails, and only resolved rasters ever reach the scene.

use std::collections::HashMap;

use base64::Engine;
use image::ImageEncoder;

use crate::error::{RenderError, RenderResult};

/// A decoded raster: RGBA pixels plus natural dimensions.
#[derive(Debug, Clone)]
pub struct RasterImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// RGBA pixel data (4 bytes per pixel).
    pub rgba: Vec<u8>,
}

impl RasterImage {
    /// Re-encode as PNG and wrap in a `data:` URI for embedding in the
    /// SVG intermediate.
    ///
    /// # Errors
    ///
    /// Returns an error if PNG encoding fails.
    pub fn png_data_uri(&self) -> RenderResult<String> {
        let mut png = Vec::new();
        let encoder = image::codecs::png::PngEncoder::new(&mut png);
        encoder
            .write_image(
                &self.rgba,
                self.width,
                self.height,
                image::ExtendedColorType::Rgba8,
            )
            .map_err(|e| RenderError::Export(format!("PNG encoding failed: {e}")))?;
        let b64 = base64::engine::general_purpose::STANDARD.encode(&png);
        Ok(format!("data:image/png;base64,{b64}"))
    }
}

/// Decode an image from raw bytes.
///
/// # Errors
///
/// Returns a [`RenderError::Decode`] if the bytes are not a decodable
/// image.
#[allow(clippy::unused_async)] // decoding is the system's one suspension point
pub async fn decode_image(bytes: &[u8]) -> RenderResult<RasterImage> {
    let img =
        image::load_from_memory(bytes).map_err(|e| RenderError::Decode(e.to_string()))?;
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();

    Ok(RasterImage {
        width,
        height,
        rgba: rgba.into_raw(),
    })
}

/// Decode a batch of keyed byte buffers.
///
/// Files that fail to decode are skipped with a warning and the rest of
/// the batch continues; successes come back in input order.
pub async fn decode_batch(inputs: Vec<(String, Vec<u8>)>) -> Vec<(String, RasterImage)> {
    let mut decoded = Vec::with_capacity(inputs.len());
    for (key, bytes) in inputs {
        match decode_image(&bytes).await {
            Ok(raster) => decoded.push((key, raster)),
            Err(e) => tracing::warn!("Skipping undecodable input {key}: {e}"),
        }
    }
    decoded
}

/// Cache of decoded rasters, keyed by the image reference stored in
/// `ElementKind::Image::src`.
#[derive(Debug, Default)]
pub struct TextureCache {
    entries: HashMap<String, RasterImage>,
}

impl TextureCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a decoded raster under the given reference, replacing any
    /// previous entry.
    pub fn insert(&mut self, key: impl Into<String>, raster: RasterImage) {
        self.entries.insert(key.into(), raster);
    }

    /// Look up a decoded raster.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&RasterImage> {
        self.entries.get(key)
    }

    /// Whether a reference is cached.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Drop a cached raster.
    pub fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }

    /// Number of cached rasters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
