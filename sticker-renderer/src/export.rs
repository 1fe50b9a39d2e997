//! Scene export to image formats.
//!
//! Renders a [`Scene`] in z-order to an SVG intermediate and rasterizes
//! it with the resvg/tiny-skia pipeline. Image stickers resolve their
//! pixels through the [`TextureCache`]; references with no cached raster
//! render as their outline only rather than failing the export.

use std::fmt::Write;

use sticker_core::{Element, ElementKind, RoundedRect, Scene};

use crate::error::{RenderError, RenderResult};
use crate::raster::TextureCache;

/// Largest corner radius of an image sticker's outline.
const IMAGE_OUTLINE_RADIUS_MAX: f32 = 40.0;

/// Outline radius as a fraction of an image sticker's longer edge.
const IMAGE_OUTLINE_RADIUS_FACTOR: f32 = 0.06;

/// Largest corner radius of a text sticker's outline.
const TEXT_OUTLINE_RADIUS_MAX: f32 = 24.0;

/// Outline radius as a fraction of a text sticker's font size.
const TEXT_OUTLINE_RADIUS_FACTOR: f32 = 0.35;

/// Smallest element scale accepted when converting device-space outline
/// thickness into local units.
const MIN_SCALE_DENOM: f32 = 0.0001;

/// Export output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// PNG image.
    Png,
    /// JPEG image (alpha flattened onto the background color).
    Jpeg,
    /// SVG markup as UTF-8 bytes.
    Svg,
    /// PDF document. Not available in this build; callers fall back to
    /// PNG.
    Pdf,
}

/// Configuration for scene export.
#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// Output width in pixels (default: scene canvas width).
    pub width: Option<u32>,
    /// Output height in pixels (default: scene canvas height).
    pub height: Option<u32>,
    /// Background color as RGBA bytes.
    pub background: [u8; 4],
    /// JPEG quality 1-100 (default: 85).
    pub jpeg_quality: u8,
    /// Scale factor (e.g. 2.0 for retina output).
    pub scale: f32,
    /// Global outline toggle; a sticker's outline renders only when
    /// both this and the sticker's own flag are set.
    pub outline: bool,
    /// Outline thickness in device pixels, converted to each sticker's
    /// local units at render time.
    pub outline_size: f32,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            width: None,
            height: None,
            background: [255, 255, 255, 255],
            jpeg_quality: 85,
            scale: 1.0,
            outline: true,
            outline_size: 6.0,
        }
    }
}

/// Exports a [`Scene`] to raster and vector formats.
pub struct SceneExporter {
    config: ExportConfig,
}

impl SceneExporter {
    /// Create a new exporter with the given configuration.
    #[must_use]
    pub fn new(config: ExportConfig) -> Self {
        Self { config }
    }

    /// Create an exporter with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(ExportConfig::default())
    }

    /// Export a scene to the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if the scene cannot be rendered or encoded, or
    /// [`RenderError::Unsupported`] for formats this build cannot
    /// produce.
    pub fn export(
        &self,
        scene: &Scene,
        cache: &TextureCache,
        format: ExportFormat,
    ) -> RenderResult<Vec<u8>> {
        match format {
            ExportFormat::Png => self.render_to_png(scene, cache),
            ExportFormat::Jpeg => self.render_to_jpeg(scene, cache),
            ExportFormat::Svg => {
                let svg = self.render_to_svg(scene, cache)?;
                Ok(svg.into_bytes())
            }
            ExportFormat::Pdf => Err(RenderError::Unsupported(
                "PDF export is not built in; fall back to PNG".to_string(),
            )),
        }
    }

    /// Export the scene to PNG bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering or encoding fails.
    pub fn render_to_png(&self, scene: &Scene, cache: &TextureCache) -> RenderResult<Vec<u8>> {
        let svg_string = self.render_to_svg(scene, cache)?;
        let pixmap = Self::rasterize_svg(&svg_string)?;

        pixmap
            .encode_png()
            .map_err(|e| RenderError::Export(format!("PNG encoding failed: {e}")))
    }

    /// Export the scene to JPEG bytes, flattening alpha onto the
    /// configured background.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering or encoding fails.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn render_to_jpeg(&self, scene: &Scene, cache: &TextureCache) -> RenderResult<Vec<u8>> {
        use image::ImageEncoder;

        let svg_string = self.render_to_svg(scene, cache)?;
        let pixmap = Self::rasterize_svg(&svg_string)?;

        let (width, height) = (pixmap.width(), pixmap.height());
        let bg = &self.config.background;
        let mut rgb_data = Vec::with_capacity((width * height * 3) as usize);
        for pixel in pixmap.data().chunks_exact(4) {
            let alpha = f32::from(pixel[3]) / 255.0;
            let inv = 1.0 - alpha;
            rgb_data.push((f32::from(pixel[0]).mul_add(alpha, f32::from(bg[0]) * inv)) as u8);
            rgb_data.push((f32::from(pixel[1]).mul_add(alpha, f32::from(bg[1]) * inv)) as u8);
            rgb_data.push((f32::from(pixel[2]).mul_add(alpha, f32::from(bg[2]) * inv)) as u8);
        }

        let mut buf = std::io::Cursor::new(Vec::new());
        let encoder =
            image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buf, self.config.jpeg_quality);
        encoder
            .write_image(&rgb_data, width, height, image::ExtendedColorType::Rgb8)
            .map_err(|e| RenderError::Export(format!("JPEG encoding failed: {e}")))?;

        Ok(buf.into_inner())
    }

    /// Render the scene to an SVG string.
    ///
    /// # Errors
    ///
    /// Returns an error if a cached raster cannot be re-encoded for
    /// embedding.
    #[allow(clippy::cast_precision_loss)]
    pub fn render_to_svg(&self, scene: &Scene, cache: &TextureCache) -> RenderResult<String> {
        let (out_w, out_h) = self.output_dimensions(scene);
        let scale = self.config.scale;
        let view_w = out_w as f32 / scale;
        let view_h = out_h as f32 / scale;

        let mut svg = String::with_capacity(4096);
        let _ = write!(
            svg,
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{out_w}\" height=\"{out_h}\" viewBox=\"0 0 {view_w} {view_h}\">",
        );

        // Board background
        let bg = &self.config.background;
        let bg_alpha = f32::from(bg[3]) / 255.0;
        let _ = write!(
            svg,
            "<rect width=\"100%\" height=\"100%\" fill=\"rgba({},{},{},{})\"/>",
            bg[0], bg[1], bg[2], bg_alpha,
        );

        // Vec order is paint order; no sorting needed.
        for element in scene.elements() {
            self.render_element_svg(&mut svg, element, cache)?;
        }

        svg.push_str("</svg>");
        Ok(svg)
    }

    /// Render a single sticker into the SVG stream.
    fn render_element_svg(
        &self,
        svg: &mut String,
        element: &Element,
        cache: &TextureCache,
    ) -> RenderResult<()> {
        let t = &element.transform;
        let _ = write!(
            svg,
            "<g transform=\"translate({} {}) rotate({}) scale({})\">",
            t.x, t.y, t.rotation, t.scale,
        );

        let show_outline = self.config.outline && element.outline;
        let pad = self.config.outline_size / t.scale.max(MIN_SCALE_DENOM);
        let (w, h) = (element.width, element.height);

        match &element.kind {
            ElementKind::Image { src, .. } => {
                if show_outline && pad > 0.0 {
                    let radius = (w.max(h) * IMAGE_OUTLINE_RADIUS_FACTOR)
                        .min(IMAGE_OUTLINE_RADIUS_MAX);
                    write_outline_rect(svg, w, h, pad, radius);
                }
                if let Some(raster) = cache.get(src) {
                    let href = raster.png_data_uri()?;
                    let _ = write!(
                        svg,
                        "<image x=\"{}\" y=\"{}\" width=\"{w}\" height=\"{h}\" href=\"{href}\"/>",
                        -w / 2.0,
                        -h / 2.0,
                    );
                } else {
                    tracing::warn!("No cached raster for {src}; rendering outline only");
                }
            }

            ElementKind::Text {
                content,
                font_family,
                font_size,
                color,
            } => {
                if show_outline && pad > 0.0 {
                    let radius =
                        (font_size * TEXT_OUTLINE_RADIUS_FACTOR).min(TEXT_OUTLINE_RADIUS_MAX);
                    write_outline_rect(svg, w, h, pad, radius);
                }
                let _ = write!(
                    svg,
                    "<text x=\"0\" y=\"0\" font-family=\"{}\" font-size=\"{font_size}\" fill=\"{}\" text-anchor=\"middle\" dominant-baseline=\"central\">{}</text>",
                    escape_xml(font_family),
                    escape_xml(color),
                    escape_xml(content),
                );
            }
        }

        svg.push_str("</g>");
        Ok(())
    }

    /// Get output dimensions (width, height) in pixels.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn output_dimensions(&self, scene: &Scene) -> (u32, u32) {
        let base_w = self.config.width.unwrap_or_else(|| scene.width() as u32);
        let base_h = self.config.height.unwrap_or_else(|| scene.height() as u32);

        #[allow(clippy::cast_precision_loss)]
        let out_w = (base_w as f32 * self.config.scale) as u32;
        #[allow(clippy::cast_precision_loss)]
        let out_h = (base_h as f32 * self.config.scale) as u32;
        (out_w.max(1), out_h.max(1))
    }

    /// Rasterize an SVG string to a tiny-skia Pixmap.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn rasterize_svg(svg_string: &str) -> RenderResult<tiny_skia::Pixmap> {
        let mut opt = usvg::Options::default();
        opt.fontdb_mut().load_system_fonts();
        let tree = usvg::Tree::from_str(svg_string, &opt)
            .map_err(|e| RenderError::Export(format!("SVG parsing failed: {e}")))?;

        let px_w = tree.size().width() as u32;
        let px_h = tree.size().height() as u32;

        let mut pixmap = tiny_skia::Pixmap::new(px_w.max(1), px_h.max(1))
            .ok_or_else(|| RenderError::Export("Failed to create pixmap".to_string()))?;

        resvg::render(&tree, tiny_skia::Transform::default(), &mut pixmap.as_mut());

        Ok(pixmap)
    }
}

/// Write a white rounded-rect outline centered on the local origin,
/// extending `pad` local units beyond the content box.
fn write_outline_rect(svg: &mut String, w: f32, h: f32, pad: f32, radius: f32) {
    let rect = RoundedRect::new(
        -w / 2.0 - pad,
        -h / 2.0 - pad,
        w + pad * 2.0,
        h + pad * 2.0,
        radius,
    );
    let _ = write!(
        svg,
        "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" rx=\"{}\" fill=\"#ffffff\"/>",
        rect.x, rect.y, rect.width, rect.height, rect.radius,
    );
}

/// Escape text for inclusion in SVG markup.
fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
