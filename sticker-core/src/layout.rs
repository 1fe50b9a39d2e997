//! Automatic layout algorithms.
//!
//! Every operation is a full recomputation over the scene in z-order:
//! given the same scene and canvas size it produces the same transforms
//! (the randomized collage is the one intentional exception). The engine
//! carries two independent running multipliers - the spacing factor
//! consumed by grid/circle/collage, and the zoom accumulator applied
//! about the canvas center - which never feed into each other.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::scene::Scene;

/// Fraction of a grid cell an element may fill.
const GRID_FILL: f32 = 0.7;

/// Target display size for the longer edge in the circle layout.
const CIRCLE_TARGET_EDGE: f32 = 150.0;

/// Target display size for the longer edge in the collage layout.
const COLLAGE_TARGET_EDGE: f32 = 120.0;

/// Multiplicative step applied by [`LayoutEngine::tighten`].
const TIGHTEN_FACTOR: f32 = 0.9;

/// Multiplicative step applied by [`LayoutEngine::loosen`].
const LOOSEN_FACTOR: f32 = 1.1;

/// Outer padding of the width-driven auto-arrange packer.
const ARRANGE_PAD: f32 = 40.0;

/// Gap between auto-arrange cells.
const ARRANGE_GAP: f32 = 30.0;

/// Auto-arrange cell edge length.
const ARRANGE_CELL: f32 = 260.0;

/// Target display size for the longer edge in auto-arrange.
const ARRANGE_TARGET_EDGE: f32 = 220.0;

/// Auto-arrange scale band, applied before the global clamp.
const ARRANGE_MIN_SCALE: f32 = 0.1;
const ARRANGE_MAX_SCALE: f32 = 4.0;

/// Deterministic layout algorithms plus the running spacing and zoom
/// multipliers. The scene and canvas dimensions are passed in
/// explicitly; the engine holds no reference to them.
#[derive(Debug)]
pub struct LayoutEngine {
    /// Running spacing multiplier consumed by grid/circle/collage.
    spacing: f32,
    /// Running zoom product, tracked for observability; behavior is
    /// defined by the multiplicative updates themselves.
    zoom: f32,
    /// Position source for the collage layout.
    rng: StdRng,
}

impl LayoutEngine {
    /// Create an engine with neutral multipliers and an OS-seeded RNG.
    #[must_use]
    pub fn new() -> Self {
        Self {
            spacing: 1.0,
            zoom: 1.0,
            rng: StdRng::from_entropy(),
        }
    }

    /// Create an engine with a fixed RNG seed, for reproducible collage
    /// placement.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self {
            spacing: 1.0,
            zoom: 1.0,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// The current spacing multiplier.
    #[must_use]
    pub fn spacing(&self) -> f32 {
        self.spacing
    }

    /// The accumulated zoom product.
    #[must_use]
    pub fn zoom_factor(&self) -> f32 {
        self.zoom
    }

    /// Tighten layout density (spacing x0.9). Takes effect on the next
    /// grid/circle/collage invocation and persists across layout
    /// switches.
    pub fn tighten(&mut self) {
        self.spacing *= TIGHTEN_FACTOR;
    }

    /// Loosen layout density (spacing x1.1).
    pub fn loosen(&mut self) {
        self.spacing *= LOOSEN_FACTOR;
    }

    /// Reset the spacing multiplier to 1.
    pub fn reset_spacing(&mut self) {
        self.spacing = 1.0;
    }

    /// Set the spacing multiplier directly. Non-finite or non-positive
    /// values are ignored.
    pub fn set_spacing(&mut self, spacing: f32) {
        if spacing.is_finite() && spacing > 0.0 {
            self.spacing = spacing;
        }
    }

    /// Arrange elements in a near-square grid.
    ///
    /// `cols = ceil(sqrt(n))`, `rows = ceil(n / cols)`; element `i`
    /// (in z-order) is centered in cell `(i % cols, i / cols)` and
    /// scaled to fit 70% of its cell. Rotation resets to 0. Idempotent.
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn grid(&self, scene: &mut Scene) {
        let n = scene.len();
        if n == 0 {
            return;
        }
        let cols = (n as f32).sqrt().ceil() as usize;
        let rows = n.div_ceil(cols);
        let cell_w = scene.width() / cols as f32 * self.spacing;
        let cell_h = scene.height() / rows as f32 * self.spacing;
        tracing::debug!("Grid layout: {n} elements, {cols}x{rows} cells");

        for (i, element) in scene.elements_mut().enumerate() {
            let col = i % cols;
            let row = i / cols;
            let scale = if element.width > 0.0 && element.height > 0.0 {
                (cell_w * GRID_FILL / element.width).min(cell_h * GRID_FILL / element.height)
            } else {
                1.0
            };
            element.set_position((col as f32 + 0.5) * cell_w, (row as f32 + 0.5) * cell_h);
            element.set_scale(scale);
            element.set_rotation(0.0);
        }
    }

    /// Arrange elements at equal angular steps on a circle around the
    /// canvas center, radius `min(w, h) / 3` times the spacing factor.
    /// Rotation resets to 0. Idempotent.
    #[allow(clippy::cast_precision_loss)]
    pub fn circle(&self, scene: &mut Scene) {
        let n = scene.len();
        if n == 0 {
            return;
        }
        let center_x = scene.width() / 2.0;
        let center_y = scene.height() / 2.0;
        let radius = scene.width().min(scene.height()) / 3.0 * self.spacing;
        tracing::debug!("Circle layout: {n} elements, radius {radius}");

        for (i, element) in scene.elements_mut().enumerate() {
            let angle = i as f32 / n as f32 * std::f32::consts::TAU;
            let scale = fit_scale(CIRCLE_TARGET_EDGE, element.width, element.height);
            element.set_position(
                center_x + radius * angle.cos(),
                center_y + radius * angle.sin(),
            );
            element.set_scale(scale);
            element.set_rotation(0.0);
        }
    }

    /// Scatter elements at random positions, pulled toward the canvas
    /// center by the spacing factor. Re-randomizes on every call by
    /// design; seed the engine for reproducible placement.
    pub fn collage(&mut self, scene: &mut Scene) {
        if scene.is_empty() {
            return;
        }
        let width = scene.width();
        let height = scene.height();
        let center_x = width / 2.0;
        let center_y = height / 2.0;
        let spacing = self.spacing;
        tracing::debug!("Collage layout: {} elements", scene.len());

        for element in scene.elements_mut() {
            let rx = self.rng.gen_range(0.0..width);
            let ry = self.rng.gen_range(0.0..height);
            let x = (center_x + (rx - center_x) * spacing).clamp(0.0, width);
            let y = (center_y + (ry - center_y) * spacing).clamp(0.0, height);
            let scale = fit_scale(COLLAGE_TARGET_EDGE, element.width, element.height);
            element.set_position(x, y);
            element.set_scale(scale);
            element.set_rotation(0.0);
        }
    }

    /// Scale the whole composition about the canvas center: every
    /// element's offset from the center and its scale are multiplied by
    /// `factor`. Compounds across calls; rotation is untouched.
    pub fn zoom_all(&mut self, scene: &mut Scene, factor: f32) {
        if !factor.is_finite() || factor <= 0.0 {
            tracing::warn!("Ignoring degenerate zoom factor {factor}");
            return;
        }
        let center_x = scene.width() / 2.0;
        let center_y = scene.height() / 2.0;
        self.zoom *= factor;

        for element in scene.elements_mut() {
            let x = center_x + (element.transform.x - center_x) * factor;
            let y = center_y + (element.transform.y - center_y) * factor;
            let scale = element.transform.scale * factor;
            element.set_position(x, y);
            element.set_scale(scale);
        }
    }

    /// Pack elements left-to-right, top-to-bottom in fixed 260 px cells
    /// driven by the available canvas width. Rotation resets to 0; the
    /// longer edge is scaled toward 220 px within `[0.1, 4]`.
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn auto_arrange(&self, scene: &mut Scene) {
        if scene.is_empty() {
            return;
        }
        let step = ARRANGE_CELL + ARRANGE_GAP;
        let usable = scene.width() - ARRANGE_PAD * 2.0 + ARRANGE_GAP;
        let cols = ((usable / step).floor() as usize).max(1);
        tracing::debug!("Auto-arrange: {} elements, {cols} columns", scene.len());

        let mut x = ARRANGE_PAD;
        let mut y = ARRANGE_PAD;
        let mut col = 0;
        for element in scene.elements_mut() {
            let major = element.width.max(element.height);
            let scale = if major > 0.0 {
                (ARRANGE_TARGET_EDGE / major).clamp(ARRANGE_MIN_SCALE, ARRANGE_MAX_SCALE)
            } else {
                1.0
            };
            element.set_position(x + ARRANGE_CELL / 2.0, y + ARRANGE_CELL / 2.0);
            element.set_scale(scale);
            element.set_rotation(0.0);

            col += 1;
            if col >= cols {
                col = 0;
                x = ARRANGE_PAD;
                y += step;
            } else {
                x += step;
            }
        }
    }
}

impl Default for LayoutEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Scale mapping the longer intrinsic edge to `target` pixels, falling
/// back to 1.0 for zero-sized content (e.g. a not-yet-measured text
/// sticker).
fn fit_scale(target: f32, width: f32, height: f32) -> f32 {
    let major = width.max(height);
    if major > 0.0 {
        target / major
    } else {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::Element;

    fn scene_with(n: usize) -> Scene {
        let mut scene = Scene::new(1000.0, 1000.0);
        for _ in 0..n {
            scene.add(Element::image("img.png", 100, 100, 1000.0, 1000.0));
        }
        scene
    }

    fn transforms(scene: &Scene) -> Vec<(f32, f32, f32, f32)> {
        scene
            .elements()
            .map(|e| {
                (
                    e.transform.x,
                    e.transform.y,
                    e.transform.scale,
                    e.transform.rotation,
                )
            })
            .collect()
    }

    #[test]
    fn test_grid_four_elements_on_square_canvas() {
        let mut scene = scene_with(4);
        let engine = LayoutEngine::new();
        engine.grid(&mut scene);

        // cols = rows = 2, cells of 500x500; index 2 lands in row 1.
        let t = transforms(&scene);
        assert!((t[0].0 - 250.0).abs() < 1e-3);
        assert!((t[0].1 - 250.0).abs() < 1e-3);
        assert!((t[2].0 - 250.0).abs() < 1e-3);
        assert!((t[2].1 - 750.0).abs() < 1e-3);
        // 100x100 content fits 70% of a 500 px cell.
        assert!((t[0].2 - 3.5).abs() < 1e-3);
        assert!(t.iter().all(|t| t.3.abs() < f32::EPSILON));
    }

    #[test]
    fn test_grid_is_idempotent() {
        let mut scene = scene_with(7);
        let engine = LayoutEngine::new();
        engine.grid(&mut scene);
        let first = transforms(&scene);
        engine.grid(&mut scene);
        assert_eq!(first, transforms(&scene));
    }

    #[test]
    fn test_grid_resets_rotation() {
        let mut scene = scene_with(3);
        for e in scene.elements_mut() {
            e.set_rotation(135.0);
        }
        LayoutEngine::new().grid(&mut scene);
        assert!(scene.elements().all(|e| e.transform.rotation.abs() < f32::EPSILON));
    }

    #[test]
    fn test_circle_places_on_ring() {
        let mut scene = scene_with(4);
        let engine = LayoutEngine::new();
        engine.circle(&mut scene);

        let radius = 1000.0 / 3.0;
        for e in scene.elements() {
            let dx = e.transform.x - 500.0;
            let dy = e.transform.y - 500.0;
            assert!((dx.hypot(dy) - radius).abs() < 1e-2);
            assert!((e.transform.scale - 1.5).abs() < 1e-3); // 150 / 100
        }
    }

    #[test]
    fn test_collage_is_seed_deterministic() {
        let mut a = scene_with(5);
        let mut b = a.clone();
        LayoutEngine::with_seed(42).collage(&mut a);
        LayoutEngine::with_seed(42).collage(&mut b);
        assert_eq!(transforms(&a), transforms(&b));

        for e in a.elements() {
            assert!(e.transform.x >= 0.0 && e.transform.x <= 1000.0);
            assert!(e.transform.y >= 0.0 && e.transform.y <= 1000.0);
            assert!((e.transform.scale - 1.2).abs() < 1e-3); // 120 / 100
        }
    }

    #[test]
    fn test_collage_rerandomizes_across_calls() {
        let mut scene = scene_with(6);
        let mut engine = LayoutEngine::with_seed(7);
        engine.collage(&mut scene);
        let first = transforms(&scene);
        engine.collage(&mut scene);
        assert_ne!(first, transforms(&scene));
    }

    #[test]
    fn test_zoom_all_compounds_and_clamps_scale() {
        let mut scene = scene_with(1);
        {
            let e = scene.elements_mut().next().unwrap();
            e.set_position(600.0, 500.0);
            e.set_scale(1.0);
        }
        let mut engine = LayoutEngine::new();
        engine.zoom_all(&mut scene, 2.0);
        engine.zoom_all(&mut scene, 2.0);

        let e = scene.elements().next().unwrap();
        assert!((e.transform.x - 900.0).abs() < 1e-3);
        assert!((e.transform.y - 500.0).abs() < 1e-3);
        assert!((e.transform.scale - 4.0).abs() < 1e-3);
        assert!((engine.zoom_factor() - 4.0).abs() < 1e-3);

        engine.zoom_all(&mut scene, 100.0);
        let e = scene.elements().next().unwrap();
        assert!((e.transform.scale - crate::element::MAX_SCALE).abs() < f32::EPSILON);
    }

    #[test]
    fn test_zoom_all_ignores_degenerate_factors() {
        let mut scene = scene_with(2);
        let before = transforms(&scene);
        let mut engine = LayoutEngine::new();
        engine.zoom_all(&mut scene, 0.0);
        engine.zoom_all(&mut scene, f32::NAN);
        assert_eq!(before, transforms(&scene));
        assert!((engine.zoom_factor() - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_spacing_persists_across_layout_switches() {
        let mut scene = scene_with(4);
        let mut engine = LayoutEngine::new();
        engine.tighten();
        assert!((engine.spacing() - 0.9).abs() < 1e-6);

        engine.grid(&mut scene);
        let e = scene.elements().next().unwrap();
        // Cell shrinks to 450, center of cell 0 moves accordingly.
        assert!((e.transform.x - 225.0).abs() < 1e-3);

        engine.circle(&mut scene);
        let e = scene.elements().next().unwrap();
        let dx = e.transform.x - 500.0;
        let dy = e.transform.y - 500.0;
        assert!((dx.hypot(dy) - 300.0).abs() < 1e-2);

        engine.reset_spacing();
        assert!((engine.spacing() - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_auto_arrange_flows_rows() {
        let mut scene = scene_with(4);
        let engine = LayoutEngine::new();
        engine.auto_arrange(&mut scene);

        // 1000 px wide: floor((1000 - 80 + 30) / 290) = 3 columns.
        let t = transforms(&scene);
        assert!((t[0].0 - 170.0).abs() < 1e-3);
        assert!((t[0].1 - 170.0).abs() < 1e-3);
        assert!((t[2].0 - 750.0).abs() < 1e-3);
        assert!((t[3].0 - 170.0).abs() < 1e-3);
        assert!((t[3].1 - 460.0).abs() < 1e-3);
        // 100 px content targets 220 px.
        assert!((t[0].2 - 2.2).abs() < 1e-3);
    }

    #[test]
    fn test_layouts_on_empty_scene_are_no_ops() {
        let mut scene = Scene::new(1000.0, 1000.0);
        let mut engine = LayoutEngine::with_seed(1);
        engine.grid(&mut scene);
        engine.circle(&mut scene);
        engine.collage(&mut scene);
        engine.auto_arrange(&mut scene);
        engine.zoom_all(&mut scene, 2.0);
        assert!(scene.is_empty());
    }

    #[test]
    fn test_unmeasured_text_gets_scale_fallback() {
        let mut scene = Scene::new(1000.0, 1000.0);
        let mut el = Element::image("z.png", 0, 0, 1000.0, 1000.0);
        el.width = 0.0;
        el.height = 0.0;
        scene.add(el);

        let engine = LayoutEngine::new();
        engine.grid(&mut scene);
        let e = scene.elements().next().unwrap();
        assert!((e.transform.scale - 1.0).abs() < f32::EPSILON);
        assert!(e.transform.scale.is_finite());
    }
}
