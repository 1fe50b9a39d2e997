//! Direct manipulation: drag-to-move, wheel and pinch scaling, keyboard
//! rotation and deletion.
//!
//! The controller owns the ephemeral session state (at most one drag, at
//! most one pinch, cleared unconditionally on release) and mutates the
//! scene it is handed. Every method reports whether a redraw is needed
//! so hosts can coalesce paint requests.

use crate::element::ElementId;
use crate::event::{InputEvent, TouchEvent, TouchPhase, TouchPoint};
use crate::layout::LayoutEngine;
use crate::scene::Scene;

/// Wheel scale step per notch.
pub const WHEEL_STEP: f32 = 0.05;

/// Wheel scale step per notch with the fine modifier held.
pub const WHEEL_STEP_FINE: f32 = 0.01;

/// Rotation step for the keyboard rotate keys, in degrees.
pub const ROTATE_STEP_DEGREES: f32 = 5.0;

/// An in-flight drag: which element, where the pointer went down, and
/// where the element was at that moment.
#[derive(Debug, Clone, Copy)]
struct DragSession {
    id: ElementId,
    start_x: f32,
    start_y: f32,
    origin_x: f32,
    origin_y: f32,
}

/// An in-flight two-finger pinch.
#[derive(Debug, Clone, Copy)]
struct PinchSession {
    last_distance: f32,
}

/// Translates raw pointer/touch/wheel/key input into scene mutations.
#[derive(Debug, Default)]
pub struct InteractionController {
    drag: Option<DragSession>,
    pinch: Option<PinchSession>,
}

impl InteractionController {
    /// Create a controller with no active sessions.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a drag session is active.
    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Whether a pinch session is active.
    #[must_use]
    pub fn is_pinching(&self) -> bool {
        self.pinch.is_some()
    }

    /// Dispatch one input event.
    pub fn handle(&mut self, scene: &mut Scene, layout: &mut LayoutEngine, event: &InputEvent) -> bool {
        match event {
            InputEvent::PointerDown { x, y } => self.pointer_down(scene, *x, *y),
            InputEvent::PointerMove { x, y } => self.pointer_move(scene, *x, *y),
            InputEvent::PointerUp => self.pointer_up(),
            InputEvent::Wheel { delta_y, modifiers } => {
                self.wheel(scene, *delta_y, modifiers.shift)
            }
            InputEvent::Key { key, .. } => self.key_down(scene, key),
            InputEvent::Touch(touch) => self.touch(scene, layout, touch),
        }
    }

    /// Pointer pressed: select (and raise) the topmost hit and start a
    /// drag; clear the selection on a miss.
    pub fn pointer_down(&mut self, scene: &mut Scene, x: f32, y: f32) -> bool {
        match scene.select_at(x, y) {
            Some(id) => {
                if let Some(element) = scene.get(id) {
                    self.drag = Some(DragSession {
                        id,
                        start_x: x,
                        start_y: y,
                        origin_x: element.transform.x,
                        origin_y: element.transform.y,
                    });
                }
            }
            None => self.drag = None,
        }
        true
    }

    /// Pointer moved: update the dragged element's position from the
    /// accumulated pointer delta. Ends the session silently if the
    /// element has vanished.
    pub fn pointer_move(&mut self, scene: &mut Scene, x: f32, y: f32) -> bool {
        let Some(drag) = self.drag else {
            return false;
        };
        match scene.get_mut(drag.id) {
            Some(element) => {
                element.set_position(
                    drag.origin_x + (x - drag.start_x),
                    drag.origin_y + (y - drag.start_y),
                );
                true
            }
            None => {
                self.drag = None;
                false
            }
        }
    }

    /// Pointer released: ends any drag immediately and unconditionally.
    pub fn pointer_up(&mut self) -> bool {
        self.drag = None;
        false
    }

    /// Wheel over the board scales the selected element; `fine` selects
    /// the smaller step. Positive `delta_y` (scrolling "out") shrinks.
    pub fn wheel(&mut self, scene: &mut Scene, delta_y: f32, fine: bool) -> bool {
        let Some(element) = scene.selected_element_mut() else {
            return false;
        };
        let step = if fine { WHEEL_STEP_FINE } else { WHEEL_STEP };
        let delta = if delta_y > 0.0 { -step } else { step };
        element.set_scale(element.transform.scale + delta);
        true
    }

    /// Keyboard: `q`/`e` rotate the selected element by 5 degrees,
    /// Delete/Backspace removes it.
    pub fn key_down(&mut self, scene: &mut Scene, key: &str) -> bool {
        if scene.selected().is_none() {
            return false;
        }
        match key.to_lowercase().as_str() {
            "q" => {
                if let Some(element) = scene.selected_element_mut() {
                    element.rotate_by(-ROTATE_STEP_DEGREES);
                }
                true
            }
            "e" => {
                if let Some(element) = scene.selected_element_mut() {
                    element.rotate_by(ROTATE_STEP_DEGREES);
                }
                true
            }
            "delete" | "backspace" => {
                if let Some(id) = scene.selected() {
                    self.drag = None;
                    scene.remove(id);
                }
                true
            }
            _ => false,
        }
    }

    /// Raw touch dispatch: one finger drags like the pointer path, two
    /// fingers run a pinch that zooms the whole composition. Release
    /// clears every session.
    pub fn touch(&mut self, scene: &mut Scene, layout: &mut LayoutEngine, event: &TouchEvent) -> bool {
        match event.phase {
            TouchPhase::Start => {
                if event.is_multi_touch() {
                    self.drag = None;
                    self.pinch = touch_distance(&event.touches).map(|d| PinchSession { last_distance: d });
                    false
                } else if let Some(touch) = event.primary_touch() {
                    self.pointer_down(scene, touch.x, touch.y)
                } else {
                    false
                }
            }
            TouchPhase::Move => {
                if event.is_multi_touch() {
                    self.pinch_move(scene, layout, &event.touches)
                } else if let Some(touch) = event.primary_touch() {
                    self.pointer_move(scene, touch.x, touch.y)
                } else {
                    false
                }
            }
            TouchPhase::End | TouchPhase::Cancel => {
                self.drag = None;
                self.pinch = None;
                false
            }
        }
    }

    /// Apply a pinch update: zoom the composition by the ratio between
    /// the current and previous two-finger distance.
    fn pinch_move(&mut self, scene: &mut Scene, layout: &mut LayoutEngine, touches: &[TouchPoint]) -> bool {
        let Some(distance) = touch_distance(touches) else {
            return false;
        };
        let Some(pinch) = &mut self.pinch else {
            return false;
        };
        if pinch.last_distance <= f32::EPSILON {
            pinch.last_distance = distance;
            return false;
        }
        let factor = distance / pinch.last_distance;
        pinch.last_distance = distance;
        layout.zoom_all(scene, factor);
        true
    }
}

/// Distance between the first two touch points, if there are two.
fn touch_distance(touches: &[TouchPoint]) -> Option<f32> {
    match touches {
        [a, b, ..] => Some((b.x - a.x).hypot(b.y - a.y)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::Element;

    fn scene_with_one() -> (Scene, ElementId) {
        let mut scene = Scene::new(1000.0, 1000.0);
        let id = scene.add(Element::image("a.png", 100, 100, 1000.0, 1000.0));
        (scene, id)
    }

    #[test]
    fn test_drag_moves_by_pointer_delta() {
        let (mut scene, id) = scene_with_one();
        let mut ctl = InteractionController::new();

        assert!(ctl.pointer_down(&mut scene, 510.0, 490.0));
        assert!(ctl.is_dragging());
        assert_eq!(scene.selected(), Some(id));

        ctl.pointer_move(&mut scene, 560.0, 510.0);
        let e = scene.get(id).unwrap();
        assert!((e.transform.x - 550.0).abs() < 1e-4);
        assert!((e.transform.y - 520.0).abs() < 1e-4);

        ctl.pointer_up();
        assert!(!ctl.is_dragging());
        ctl.pointer_move(&mut scene, 900.0, 900.0);
        let e = scene.get(id).unwrap();
        assert!((e.transform.x - 550.0).abs() < 1e-4);
    }

    #[test]
    fn test_pointer_down_on_empty_space_clears_selection() {
        let (mut scene, _id) = scene_with_one();
        let mut ctl = InteractionController::new();
        ctl.pointer_down(&mut scene, 500.0, 500.0);
        assert!(scene.selected().is_some());

        ctl.pointer_down(&mut scene, 50.0, 50.0);
        assert!(scene.selected().is_none());
        assert!(!ctl.is_dragging());
    }

    #[test]
    fn test_drag_survivorship_when_element_vanishes() {
        let (mut scene, id) = scene_with_one();
        let mut ctl = InteractionController::new();
        ctl.pointer_down(&mut scene, 500.0, 500.0);
        scene.remove(id);
        assert!(!ctl.pointer_move(&mut scene, 600.0, 600.0));
        assert!(!ctl.is_dragging());
    }

    #[test]
    fn test_wheel_steps_and_clamps() {
        let (mut scene, id) = scene_with_one();
        let mut ctl = InteractionController::new();

        // Scroll "in" once from 1.0.
        ctl.wheel(&mut scene, -1.0, false);
        assert!((scene.get(id).unwrap().transform.scale - 1.05).abs() < 1e-5);

        // Fine step.
        ctl.wheel(&mut scene, -1.0, true);
        assert!((scene.get(id).unwrap().transform.scale - 1.06).abs() < 1e-5);

        // Scroll "out" from the floor stays at the floor, never negative.
        scene.get_mut(id).unwrap().set_scale(0.05);
        ctl.wheel(&mut scene, 1.0, false);
        assert!((scene.get(id).unwrap().transform.scale - 0.05).abs() < 1e-5);
    }

    #[test]
    fn test_wheel_without_selection_is_a_no_op() {
        let (mut scene, _id) = scene_with_one();
        scene.clear_selection();
        let mut ctl = InteractionController::new();
        assert!(!ctl.wheel(&mut scene, -1.0, false));
    }

    #[test]
    fn test_rotate_keys_step_five_degrees() {
        let (mut scene, id) = scene_with_one();
        let mut ctl = InteractionController::new();
        ctl.key_down(&mut scene, "e");
        ctl.key_down(&mut scene, "E");
        ctl.key_down(&mut scene, "q");
        assert!((scene.get(id).unwrap().transform.rotation - 5.0).abs() < 1e-5);
    }

    #[test]
    fn test_delete_key_removes_selected_and_clears_pick() {
        let (mut scene, _id) = scene_with_one();
        let mut ctl = InteractionController::new();
        ctl.pointer_down(&mut scene, 500.0, 500.0);
        ctl.key_down(&mut scene, "Delete");
        assert!(scene.selected().is_none());
        assert!(scene.is_empty());
        assert!(scene.pick_topmost(500.0, 500.0).is_none());
    }

    #[test]
    fn test_pinch_zooms_composition() {
        let (mut scene, id) = scene_with_one();
        let mut ctl = InteractionController::new();
        let mut layout = LayoutEngine::new();

        let start = TouchEvent::new(
            TouchPhase::Start,
            vec![
                TouchPoint { id: 0, x: 400.0, y: 500.0 },
                TouchPoint { id: 1, x: 600.0, y: 500.0 },
            ],
        );
        ctl.touch(&mut scene, &mut layout, &start);
        assert!(ctl.is_pinching());

        // Fingers spread from 200 px apart to 300 px: 1.5x zoom.
        let spread = TouchEvent::new(
            TouchPhase::Move,
            vec![
                TouchPoint { id: 0, x: 350.0, y: 500.0 },
                TouchPoint { id: 1, x: 650.0, y: 500.0 },
            ],
        );
        assert!(ctl.touch(&mut scene, &mut layout, &spread));
        assert!((scene.get(id).unwrap().transform.scale - 1.5).abs() < 1e-4);
        assert!((layout.zoom_factor() - 1.5).abs() < 1e-4);

        let end = TouchEvent::new(TouchPhase::End, vec![]);
        ctl.touch(&mut scene, &mut layout, &end);
        assert!(!ctl.is_pinching());
    }

    #[test]
    fn test_single_touch_drags() {
        let (mut scene, id) = scene_with_one();
        let mut ctl = InteractionController::new();
        let mut layout = LayoutEngine::new();

        let down = TouchEvent::new(TouchPhase::Start, vec![TouchPoint { id: 0, x: 500.0, y: 500.0 }]);
        ctl.touch(&mut scene, &mut layout, &down);
        let drag = TouchEvent::new(TouchPhase::Move, vec![TouchPoint { id: 0, x: 530.0, y: 480.0 }]);
        ctl.touch(&mut scene, &mut layout, &drag);

        let e = scene.get(id).unwrap();
        assert!((e.transform.x - 530.0).abs() < 1e-4);
        assert!((e.transform.y - 480.0).abs() < 1e-4);
    }
}
