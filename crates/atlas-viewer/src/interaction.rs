//! Pointer drag to object rotation.

use atlas_mesh::Orientation;

/// Radians of rotation per pixel of pointer travel.
pub const DRAG_SENSITIVITY: f32 = 0.01;

/// Tracks one drag gesture. Mouse and touch feed the same handlers.
#[derive(Clone, Copy, Debug, Default)]
pub struct InteractionController {
    dragging: bool,
    last: (f64, f64),
}

impl InteractionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn pointer_down(&mut self, x: f64, y: f64) {
        self.dragging = true;
        self.last = (x, y);
    }

    /// Apply the travel since the last event to `target`. Horizontal motion
    /// turns about Y, vertical about X. Ignored unless dragging.
    pub fn pointer_move(&mut self, x: f64, y: f64, target: Option<&mut Orientation>) {
        if !self.dragging {
            return;
        }
        let Some(orientation) = target else {
            return;
        };
        let dx = (x - self.last.0) as f32;
        let dy = (y - self.last.1) as f32;
        orientation.rotate(dy * DRAG_SENSITIVITY, dx * DRAG_SENSITIVITY);
        self.last = (x, y);
    }

    /// Release, cancel and pointer-leave all end the drag.
    pub fn pointer_up(&mut self) {
        self.dragging = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drag_rotates_both_axes() {
        let mut controller = InteractionController::new();
        let mut orientation = Orientation::default();
        controller.pointer_down(100.0, 100.0);
        controller.pointer_move(150.0, 130.0, Some(&mut orientation));
        assert!((orientation.y - 0.5).abs() < 1e-6, "dx drives y, got {}", orientation.y);
        assert!((orientation.x - 0.3).abs() < 1e-6, "dy drives x, got {}", orientation.x);
    }

    #[test]
    fn test_moves_accumulate_from_latch() {
        let mut controller = InteractionController::new();
        let mut orientation = Orientation::new(1.0, 1.0);
        controller.pointer_down(0.0, 0.0);
        controller.pointer_move(10.0, 0.0, Some(&mut orientation));
        controller.pointer_move(20.0, 0.0, Some(&mut orientation));
        assert!((orientation.y - 1.2).abs() < 1e-6);
        assert_eq!(orientation.x, 1.0);
    }

    #[test]
    fn test_move_without_drag_is_ignored() {
        let mut controller = InteractionController::new();
        let mut orientation = Orientation::default();
        controller.pointer_move(50.0, 50.0, Some(&mut orientation));
        assert_eq!(orientation, Orientation::default());
    }

    #[test]
    fn test_pointer_up_ends_drag() {
        let mut controller = InteractionController::new();
        let mut orientation = Orientation::default();
        controller.pointer_down(0.0, 0.0);
        controller.pointer_up();
        assert!(!controller.is_dragging());
        controller.pointer_move(40.0, 40.0, Some(&mut orientation));
        assert_eq!(orientation, Orientation::default());
    }

    #[test]
    fn test_move_without_object_keeps_latch() {
        let mut controller = InteractionController::new();
        controller.pointer_down(0.0, 0.0);
        controller.pointer_move(30.0, 30.0, None);
        let mut orientation = Orientation::default();
        controller.pointer_move(40.0, 30.0, Some(&mut orientation));
        assert!((orientation.y - 0.4).abs() < 1e-6);
    }
}
