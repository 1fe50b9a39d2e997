//! Pure geometry: local/world transforms, hit boxes, rounded rects and
//! the text measurement contract.

use serde::{Deserialize, Serialize};

use crate::element::Transform;

/// Padding around an element's local bounding box during hit testing.
///
/// Makes thin or heavily scaled-down targets easier to grab.
pub const HIT_TEST_PAD: f32 = 8.0;

/// Fixed line-height multiplier for measured text blocks.
pub const LINE_HEIGHT: f32 = 1.2;

/// Smallest denominator accepted when dividing by an element scale.
const MIN_DENOM: f32 = 0.0001;

/// Transform a world-space point into an element's local frame.
///
/// Translates by the negated position, rotates by the negated rotation,
/// then divides by the scale. The result is centered at the element's
/// origin in unscaled, unrotated units.
#[must_use]
pub fn world_to_local(x: f32, y: f32, transform: &Transform) -> (f32, f32) {
    let dx = x - transform.x;
    let dy = y - transform.y;
    let angle = (-transform.rotation).to_radians();
    let (sin, cos) = angle.sin_cos();
    let scale = transform.scale.max(MIN_DENOM);
    ((dx * cos - dy * sin) / scale, (dx * sin + dy * cos) / scale)
}

/// Test a local-frame point against a centered box of the given intrinsic
/// size, widened by `pad` on every side.
#[must_use]
pub fn point_in_box(local_x: f32, local_y: f32, width: f32, height: f32, pad: f32) -> bool {
    let half_w = width / 2.0 + pad;
    let half_h = height / 2.0 + pad;
    local_x >= -half_w && local_x <= half_w && local_y >= -half_h && local_y <= half_h
}

/// A rectangle with clamped corner radius, ready for path construction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoundedRect {
    /// Left edge.
    pub x: f32,
    /// Top edge.
    pub y: f32,
    /// Width (may be negative for inverted rects; the radius clamp uses
    /// the absolute value).
    pub width: f32,
    /// Height.
    pub height: f32,
    /// Corner radius, already clamped to half the shorter edge.
    pub radius: f32,
}

impl RoundedRect {
    /// Create a rounded rect, clamping the radius to
    /// `min(radius, |width|/2, |height|/2)`.
    #[must_use]
    pub fn new(x: f32, y: f32, width: f32, height: f32, radius: f32) -> Self {
        let clamped = radius
            .min(width.abs() / 2.0)
            .min(height.abs() / 2.0)
            .max(0.0);
        Self {
            x,
            y,
            width,
            height,
            radius: clamped,
        }
    }
}

/// Contract surface toward a text measurement capability.
///
/// Returns `(width, height)` for a single-line text block, where height
/// is always `ceil(size_px * 1.2)` regardless of tight glyph bounds.
/// Real text stacks implement this against their shaping engine; tests
/// inject fixed-size fakes.
pub trait TextMeasurer {
    /// Measure the rendered block size of `text` at the given font/size.
    fn measure(&self, text: &str, font_family: &str, size_px: f32) -> (f32, f32);
}

/// Default measurer using a flat per-character advance estimate.
///
/// Width is `chars * size_px * 0.6`, a serviceable stand-in for Latin
/// text until a shaping backend is wired in.
#[derive(Debug, Clone, Copy, Default)]
pub struct AdvanceWidthMeasurer;

impl AdvanceWidthMeasurer {
    /// Fraction of the font size assumed per character advance.
    const ADVANCE_FACTOR: f32 = 0.6;
}

impl TextMeasurer for AdvanceWidthMeasurer {
    #[allow(clippy::cast_precision_loss)]
    fn measure(&self, text: &str, _font_family: &str, size_px: f32) -> (f32, f32) {
        let size = size_px.max(0.0);
        let width = (text.chars().count() as f32 * size * Self::ADVANCE_FACTOR).ceil();
        let height = (size * LINE_HEIGHT).ceil();
        (width, height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_world_to_local_translation_only() {
        let t = Transform {
            x: 100.0,
            y: 50.0,
            scale: 1.0,
            rotation: 0.0,
        };
        let (lx, ly) = world_to_local(110.0, 45.0, &t);
        assert!((lx - 10.0).abs() < 1e-4);
        assert!((ly + 5.0).abs() < 1e-4);
    }

    #[test]
    fn test_world_to_local_undoes_rotation() {
        // A point directly "above" a 90°-rotated element maps onto its
        // local x axis.
        let t = Transform {
            x: 0.0,
            y: 0.0,
            scale: 1.0,
            rotation: 90.0,
        };
        let (lx, ly) = world_to_local(0.0, -10.0, &t);
        assert!((lx + 10.0).abs() < 1e-4);
        assert!(ly.abs() < 1e-4);
    }

    #[test]
    fn test_world_to_local_divides_by_scale() {
        let t = Transform {
            x: 0.0,
            y: 0.0,
            scale: 2.0,
            rotation: 0.0,
        };
        let (lx, ly) = world_to_local(10.0, 20.0, &t);
        assert!((lx - 5.0).abs() < 1e-4);
        assert!((ly - 10.0).abs() < 1e-4);
    }

    #[test]
    fn test_point_in_box_respects_pad() {
        assert!(point_in_box(54.0, 0.0, 100.0, 40.0, 8.0));
        assert!(!point_in_box(59.0, 0.0, 100.0, 40.0, 8.0));
        assert!(point_in_box(0.0, -28.0, 100.0, 40.0, 8.0));
    }

    #[test]
    fn test_rounded_rect_clamps_radius() {
        let r = RoundedRect::new(0.0, 0.0, 100.0, 40.0, 30.0);
        assert!((r.radius - 20.0).abs() < f32::EPSILON);

        // Inverted extents still clamp against absolute size.
        let r = RoundedRect::new(0.0, 0.0, -10.0, 40.0, 30.0);
        assert!((r.radius - 5.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_measurer_uses_fixed_line_height() {
        let m = AdvanceWidthMeasurer;
        let (w, h) = m.measure("hello", "Arial", 36.0);
        assert!((h - (36.0f32 * 1.2).ceil()).abs() < f32::EPSILON);
        assert!(w > 0.0);
    }
}
