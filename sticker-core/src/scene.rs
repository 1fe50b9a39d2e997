//! The scene: an ordered collection of stickers plus selection state.
//!
//! Order encodes paint/z-order - index 0 draws first (bottom), the last
//! element draws on top and wins hit-test ties.

use serde::{Deserialize, Serialize};

use crate::element::{Element, ElementId, ElementKind};
use crate::error::StickerResult;

/// Minimum canvas edge length in pixels.
pub const MIN_CANVAS_EDGE: f32 = 200.0;

/// The sticker board: elements in z-order, at most one selection, and
/// the canvas dimensions layouts and exports work against.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scene {
    /// Elements in paint order (index 0 = bottom).
    elements: Vec<Element>,
    /// Currently selected element, if any. Always references a present
    /// element.
    selected: Option<ElementId>,
    /// Canvas width in pixels.
    width: f32,
    /// Canvas height in pixels.
    height: f32,
}

impl Scene {
    /// Create an empty scene. Dimensions are clamped to the 200 px
    /// minimum edge.
    #[must_use]
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            elements: Vec::new(),
            selected: None,
            width: width.max(MIN_CANVAS_EDGE),
            height: height.max(MIN_CANVAS_EDGE),
        }
    }

    /// Canvas width in pixels.
    #[must_use]
    pub fn width(&self) -> f32 {
        self.width
    }

    /// Canvas height in pixels.
    #[must_use]
    pub fn height(&self) -> f32 {
        self.height
    }

    /// Resize the canvas. Element world positions are left untouched,
    /// which may place them outside the new bounds.
    pub fn resize(&mut self, width: f32, height: f32) {
        self.width = width.max(MIN_CANVAS_EDGE);
        self.height = height.max(MIN_CANVAS_EDGE);
        tracing::debug!("Canvas resized to {}x{}", self.width, self.height);
    }

    /// Append an element at the top of the z-order and select it.
    pub fn add(&mut self, element: Element) -> ElementId {
        let id = element.id;
        self.elements.push(element);
        self.selected = Some(id);
        tracing::debug!("Added element {id}, scene now has {}", self.elements.len());
        id
    }

    /// Remove an element by id. Clears the selection if it pointed at
    /// the removed element; silently does nothing for unknown ids.
    pub fn remove(&mut self, id: ElementId) {
        let before = self.elements.len();
        self.elements.retain(|e| e.id != id);
        if self.elements.len() < before {
            if self.selected == Some(id) {
                self.selected = None;
            }
            tracing::debug!("Removed element {id}");
        }
    }

    /// Get an element by id.
    #[must_use]
    pub fn get(&self, id: ElementId) -> Option<&Element> {
        self.elements.iter().find(|e| e.id == id)
    }

    /// Get a mutable reference to an element by id.
    pub fn get_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        self.elements.iter_mut().find(|e| e.id == id)
    }

    /// Move an element to the top of the z-order, preserving the
    /// relative order of everything else. No-op for unknown ids.
    pub fn bring_to_front(&mut self, id: ElementId) {
        if let Some(idx) = self.elements.iter().position(|e| e.id == id) {
            let element = self.elements.remove(idx);
            self.elements.push(element);
        }
    }

    /// Move an element to the bottom of the z-order, preserving the
    /// relative order of everything else. No-op for unknown ids.
    pub fn send_to_back(&mut self, id: ElementId) {
        if let Some(idx) = self.elements.iter().position(|e| e.id == id) {
            let element = self.elements.remove(idx);
            self.elements.insert(0, element);
        }
    }

    /// Find the topmost element whose padded oriented bounding box
    /// contains the given canvas point.
    ///
    /// Scans from the top of the z-order down so visually occluding
    /// elements win ties.
    #[must_use]
    pub fn pick_topmost(&self, x: f32, y: f32) -> Option<ElementId> {
        self.elements
            .iter()
            .rev()
            .find(|e| e.contains_point(x, y))
            .map(|e| e.id)
    }

    /// Pointer-select at a canvas point: picks the topmost hit, raises
    /// it to the front and selects it; clears the selection on a miss.
    pub fn select_at(&mut self, x: f32, y: f32) -> Option<ElementId> {
        match self.pick_topmost(x, y) {
            Some(id) => {
                self.bring_to_front(id);
                self.selected = Some(id);
                Some(id)
            }
            None => {
                self.selected = None;
                None
            }
        }
    }

    /// Select an element by id. Returns false (leaving the selection
    /// unchanged) if the id is not present.
    pub fn select(&mut self, id: ElementId) -> bool {
        if self.get(id).is_some() {
            self.selected = Some(id);
            true
        } else {
            false
        }
    }

    /// Clear the selection.
    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// The currently selected element id, if any.
    #[must_use]
    pub fn selected(&self) -> Option<ElementId> {
        self.selected
    }

    /// The currently selected element, if any.
    #[must_use]
    pub fn selected_element(&self) -> Option<&Element> {
        self.selected.and_then(|id| self.get(id))
    }

    /// Mutable access to the currently selected element, if any.
    pub fn selected_element_mut(&mut self) -> Option<&mut Element> {
        let id = self.selected?;
        self.get_mut(id)
    }

    /// Elements in paint order (bottom first).
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.elements.iter()
    }

    /// Mutable iteration in paint order.
    pub fn elements_mut(&mut self) -> impl Iterator<Item = &mut Element> {
        self.elements.iter_mut()
    }

    /// Number of elements in the scene.
    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Whether the scene has no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Flatten the image stickers into persistable records, in z-order.
    ///
    /// Width and height are the absolute current pixel size (intrinsic
    /// size times scale), not intrinsic size plus a factor. Text
    /// stickers are session state and are not persisted.
    #[must_use]
    pub fn to_records(&self) -> Vec<StickerRecord> {
        self.elements
            .iter()
            .filter_map(|e| match &e.kind {
                ElementKind::Image { src, .. } => {
                    let (w, h) = e.displayed_size();
                    Some(StickerRecord {
                        image: src.clone(),
                        x: e.transform.x,
                        y: e.transform.y,
                        w,
                        h,
                    })
                }
                ElementKind::Text { .. } => None,
            })
            .collect()
    }

    /// Serialize the persistable records to a JSON blob.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn records_json(&self) -> StickerResult<String> {
        Ok(serde_json::to_string(&self.to_records())?)
    }

    /// Parse a JSON blob back into records.
    ///
    /// # Errors
    ///
    /// Returns an error if the blob is not valid record JSON.
    pub fn records_from_json(json: &str) -> StickerResult<Vec<StickerRecord>> {
        Ok(serde_json::from_str(json)?)
    }
}

/// One persisted sticker: image reference plus absolute placement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StickerRecord {
    /// Image reference (matches `ElementKind::Image::src`).
    pub image: String,
    /// Center X in canvas pixels.
    pub x: f32,
    /// Center Y in canvas pixels.
    pub y: f32,
    /// Displayed width in pixels (post-scale).
    pub w: f32,
    /// Displayed height in pixels (post-scale).
    pub h: f32,
}

impl StickerRecord {
    /// Reconstruct an element from this record and the decoded image's
    /// natural dimensions, at the exact persisted position and size.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn restore(&self, natural_width: u32, natural_height: u32) -> Element {
        let mut element =
            Element::image(self.image.clone(), natural_width, natural_height, 0.0, 0.0);
        let scale = if natural_width > 0 {
            self.w / natural_width as f32
        } else {
            1.0
        };
        element.set_scale(scale);
        element.set_position(self.x, self.y);
        element
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image_at(x: f32, y: f32) -> Element {
        let mut e = Element::image("test.png", 100, 100, 1000.0, 1000.0);
        e.set_position(x, y);
        e
    }

    #[test]
    fn test_add_selects_and_appends_on_top() {
        let mut scene = Scene::new(1000.0, 1000.0);
        let a = scene.add(image_at(100.0, 100.0));
        let b = scene.add(image_at(100.0, 100.0));
        assert_eq!(scene.selected(), Some(b));
        assert_eq!(scene.pick_topmost(100.0, 100.0), Some(b));
        assert_ne!(a, b);
    }

    #[test]
    fn test_remove_clears_selection_and_ignores_unknown() {
        let mut scene = Scene::new(1000.0, 1000.0);
        let id = scene.add(image_at(100.0, 100.0));
        scene.remove(id);
        assert!(scene.selected().is_none());
        assert!(scene.is_empty());

        // Unknown id is a silent no-op.
        scene.remove(id);
        assert!(scene.is_empty());
    }

    #[test]
    fn test_reorder_preserves_relative_order_of_others() {
        let mut scene = Scene::new(1000.0, 1000.0);
        let a = scene.add(image_at(1.0, 1.0));
        let b = scene.add(image_at(2.0, 2.0));
        let c = scene.add(image_at(3.0, 3.0));

        scene.bring_to_front(a);
        let order: Vec<_> = scene.elements().map(|e| e.id).collect();
        assert_eq!(order, vec![b, c, a]);

        scene.send_to_back(c);
        let order: Vec<_> = scene.elements().map(|e| e.id).collect();
        assert_eq!(order, vec![c, b, a]);
    }

    #[test]
    fn test_pick_topmost_honors_z_order() {
        let mut scene = Scene::new(1000.0, 1000.0);
        let bottom = scene.add(image_at(500.0, 500.0));
        let top = scene.add(image_at(500.0, 500.0));
        assert_eq!(scene.pick_topmost(500.0, 500.0), Some(top));

        scene.bring_to_front(bottom);
        assert_eq!(scene.pick_topmost(500.0, 500.0), Some(bottom));
    }

    #[test]
    fn test_select_at_raises_hit_and_clears_on_miss() {
        let mut scene = Scene::new(1000.0, 1000.0);
        let a = scene.add(image_at(200.0, 200.0));
        let _b = scene.add(image_at(700.0, 700.0));

        assert_eq!(scene.select_at(200.0, 200.0), Some(a));
        assert_eq!(scene.selected(), Some(a));
        let order: Vec<_> = scene.elements().map(|e| e.id).collect();
        assert_eq!(order.last(), Some(&a));

        assert!(scene.select_at(50.0, 950.0).is_none());
        assert!(scene.selected().is_none());
    }

    #[test]
    fn test_resize_clamps_and_keeps_positions() {
        let mut scene = Scene::new(1000.0, 1000.0);
        scene.add(image_at(900.0, 900.0));
        scene.resize(100.0, 300.0);
        assert!((scene.width() - MIN_CANVAS_EDGE).abs() < f32::EPSILON);
        assert!((scene.height() - 300.0).abs() < f32::EPSILON);
        let e = scene.elements().next().unwrap();
        assert!((e.transform.x - 900.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_records_round_trip_exactly() {
        let mut scene = Scene::new(1000.0, 1000.0);
        let id = scene.add(Element::image("cat.png", 480, 320, 1000.0, 1000.0));
        {
            let e = scene.get_mut(id).unwrap();
            e.set_position(250.0, 750.0);
            e.set_scale(0.25);
        }

        let json = scene.records_json().unwrap();
        let records = Scene::records_from_json(&json).unwrap();
        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert_eq!(r.image, "cat.png");
        assert!((r.w - 120.0).abs() < f32::EPSILON);
        assert!((r.h - 80.0).abs() < f32::EPSILON);

        let restored = r.restore(480, 320);
        assert!((restored.transform.x - 250.0).abs() < f32::EPSILON);
        assert!((restored.transform.y - 750.0).abs() < f32::EPSILON);
        let (w, h) = restored.displayed_size();
        assert!((w - r.w).abs() < f32::EPSILON);
        assert!((h - r.h).abs() < f32::EPSILON);
    }

    #[test]
    fn test_records_skip_text_stickers() {
        use crate::geometry::AdvanceWidthMeasurer;
        let mut scene = Scene::new(1000.0, 1000.0);
        scene.add(Element::image("a.png", 100, 100, 1000.0, 1000.0));
        scene.add(Element::text(
            "label",
            "Arial",
            36.0,
            "#111",
            1000.0,
            1000.0,
            &AdvanceWidthMeasurer,
        ));
        assert_eq!(scene.to_records().len(), 1);
    }
}
