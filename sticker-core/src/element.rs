//! Scene elements - the stickers placed on the board.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geometry::{self, TextMeasurer, HIT_TEST_PAD};

/// Lower bound for an element's uniform scale.
pub const MIN_SCALE: f32 = 0.05;

/// Upper bound for an element's uniform scale.
pub const MAX_SCALE: f32 = 8.0;

/// Target display size for the longer edge of a freshly added image.
const IMAGE_TARGET_EDGE: f32 = 240.0;

/// Unique identifier for an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementId(Uuid);

impl ElementId {
    /// Create a new unique element ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create from an existing UUID.
    #[must_use]
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for ElementId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ElementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The content a sticker carries.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ElementKind {
    /// A placed raster image.
    ///
    /// The pixels themselves live in the renderer's texture cache; the
    /// core only holds the reference and the natural pixel dimensions.
    Image {
        /// Image reference (file path, URI or cache key).
        src: String,
        /// Source width in pixels.
        natural_width: u32,
        /// Source height in pixels.
        natural_height: u32,
    },

    /// A text label.
    Text {
        /// Text content.
        content: String,
        /// Font family name.
        font_family: String,
        /// Font size in pixels.
        font_size: f32,
        /// Text color as hex.
        color: String,
    },
}

/// Position, scale and rotation of a sticker.
///
/// `x`/`y` is the center point in canvas coordinates; `scale` is a
/// uniform factor over the intrinsic size; `rotation` is in degrees and
/// accumulates without wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    /// Center X in canvas pixels.
    pub x: f32,
    /// Center Y in canvas pixels.
    pub y: f32,
    /// Uniform scale factor, always positive.
    pub scale: f32,
    /// Rotation in degrees about the center point.
    pub rotation: f32,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            scale: 1.0,
            rotation: 0.0,
        }
    }
}

/// A sticker: content plus transform plus outline eligibility.
///
/// `width`/`height` is the intrinsic (unscaled, unrotated) content size -
/// source pixel dimensions for images, the measured block size for text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Element {
    /// Unique identifier, stable for the element's lifetime.
    pub id: ElementId,
    /// Content payload.
    pub kind: ElementKind,
    /// Position, scale and rotation.
    pub transform: Transform,
    /// Whether a backing rounded-rect outline may render behind this
    /// element (the global outline toggle also applies).
    pub outline: bool,
    /// Intrinsic content width in local units.
    pub width: f32,
    /// Intrinsic content height in local units.
    pub height: f32,
}

impl Element {
    /// Create an image sticker centered on the canvas.
    ///
    /// The initial scale maps the longer source edge to roughly 240
    /// display pixels but never upscales beyond 1.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn image(
        src: impl Into<String>,
        natural_width: u32,
        natural_height: u32,
        canvas_width: f32,
        canvas_height: f32,
    ) -> Self {
        let longest = natural_width.max(natural_height) as f32;
        let scale = if longest > 0.0 {
            (IMAGE_TARGET_EDGE / longest).min(1.0)
        } else {
            1.0
        };

        Self {
            id: ElementId::new(),
            kind: ElementKind::Image {
                src: src.into(),
                natural_width,
                natural_height,
            },
            transform: Transform {
                x: canvas_width / 2.0,
                y: canvas_height / 2.0,
                scale,
                rotation: 0.0,
            },
            outline: true,
            width: natural_width as f32,
            height: natural_height as f32,
        }
    }

    /// Create a text sticker centered on the canvas at scale 1.
    #[must_use]
    pub fn text(
        content: impl Into<String>,
        font_family: impl Into<String>,
        font_size: f32,
        color: impl Into<String>,
        canvas_width: f32,
        canvas_height: f32,
        measurer: &dyn TextMeasurer,
    ) -> Self {
        let content = content.into();
        let font_family = font_family.into();
        let (width, height) = measurer.measure(&content, &font_family, font_size);

        Self {
            id: ElementId::new(),
            kind: ElementKind::Text {
                content,
                font_family,
                font_size,
                color: color.into(),
            },
            transform: Transform {
                x: canvas_width / 2.0,
                y: canvas_height / 2.0,
                scale: 1.0,
                rotation: 0.0,
            },
            outline: true,
            width,
            height,
        }
    }

    /// Move the element's center to the given canvas coordinates.
    pub fn set_position(&mut self, x: f32, y: f32) {
        self.transform.x = x;
        self.transform.y = y;
    }

    /// Set the uniform scale, clamped to `[0.05, 8]`.
    pub fn set_scale(&mut self, scale: f32) {
        self.transform.scale = scale.clamp(MIN_SCALE, MAX_SCALE);
    }

    /// Set the rotation in degrees. Any real value is accepted; callers
    /// normalize for display only.
    pub fn set_rotation(&mut self, degrees: f32) {
        self.transform.rotation = degrees;
    }

    /// Add to the rotation in degrees.
    pub fn rotate_by(&mut self, degrees: f32) {
        self.transform.rotation += degrees;
    }

    /// Replace the text content and re-measure. No-op on image stickers.
    pub fn set_content(&mut self, content: impl Into<String>, measurer: &dyn TextMeasurer) {
        if let ElementKind::Text {
            content: current, ..
        } = &mut self.kind
        {
            *current = content.into();
            self.remeasure(measurer);
        }
    }

    /// Replace the font family and re-measure. No-op on image stickers.
    pub fn set_font_family(&mut self, font_family: impl Into<String>, measurer: &dyn TextMeasurer) {
        if let ElementKind::Text {
            font_family: current,
            ..
        } = &mut self.kind
        {
            *current = font_family.into();
            self.remeasure(measurer);
        }
    }

    /// Change the font size and re-measure. Non-positive sizes are
    /// ignored. No-op on image stickers.
    pub fn set_font_size(&mut self, size_px: f32, measurer: &dyn TextMeasurer) {
        if size_px <= 0.0 {
            return;
        }
        if let ElementKind::Text { font_size, .. } = &mut self.kind {
            *font_size = size_px;
            self.remeasure(measurer);
        }
    }

    /// Change the text color. No-op on image stickers.
    pub fn set_color(&mut self, color: impl Into<String>) {
        if let ElementKind::Text { color: current, .. } = &mut self.kind {
            *current = color.into();
        }
    }

    /// Current displayed size in canvas pixels (intrinsic x scale).
    #[must_use]
    pub fn displayed_size(&self) -> (f32, f32) {
        (
            self.width * self.transform.scale,
            self.height * self.transform.scale,
        )
    }

    /// Hit test a canvas-space point against the element's padded,
    /// oriented bounding box.
    #[must_use]
    pub fn contains_point(&self, x: f32, y: f32) -> bool {
        let (lx, ly) = geometry::world_to_local(x, y, &self.transform);
        geometry::point_in_box(lx, ly, self.width, self.height, HIT_TEST_PAD)
    }

    /// Re-derive the intrinsic size of a text sticker from its current
    /// content, family and size.
    fn remeasure(&mut self, measurer: &dyn TextMeasurer) {
        if let ElementKind::Text {
            content,
            font_family,
            font_size,
            ..
        } = &self.kind
        {
            let (w, h) = measurer.measure(content, font_family, *font_size);
            self.width = w;
            self.height = h;
        }
    }
}
