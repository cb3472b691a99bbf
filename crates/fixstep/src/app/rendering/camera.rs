use crate::app::geometry::Vec2;

pub const CAMERA_ZOOM_DEFAULT: f32 = 1.0;
pub const CAMERA_ZOOM_MIN: f32 = 0.1;
pub const CAMERA_ZOOM_MAX: f32 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
        }
    }
}

/// View transform: `position` is the world point shown at the viewport centre.
/// Screen y grows downwards, matching world y.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera2D {
    pub position: Vec2,
    pub zoom: f32,
}

impl Default for Camera2D {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            zoom: CAMERA_ZOOM_DEFAULT,
        }
    }
}

impl Camera2D {
    pub fn effective_zoom(&self) -> f32 {
        clamp_camera_zoom(self.zoom)
    }

    pub fn set_zoom_clamped(&mut self, zoom: f32) {
        self.zoom = clamp_camera_zoom(zoom);
    }

    pub fn world_to_screen(&self, world: Vec2, viewport: Viewport) -> (i32, i32) {
        let zoom = self.effective_zoom();
        let x = (world.x - self.position.x) * zoom + viewport.width as f32 * 0.5;
        let y = (world.y - self.position.y) * zoom + viewport.height as f32 * 0.5;
        (x.round() as i32, y.round() as i32)
    }

    pub fn screen_to_world(&self, screen: (i32, i32), viewport: Viewport) -> Vec2 {
        let zoom = self.effective_zoom();
        Vec2 {
            x: (screen.0 as f32 - viewport.width as f32 * 0.5) / zoom + self.position.x,
            y: (screen.1 as f32 - viewport.height as f32 * 0.5) / zoom + self.position.y,
        }
    }

    /// Moves towards `target`; `smoothing` 0 snaps, 1 never moves.
    pub fn follow(&mut self, target: Vec2, smoothing: f32) {
        let factor = 1.0 - smoothing.clamp(0.0, 1.0);
        self.position += (target - self.position) * factor;
    }
}

fn clamp_camera_zoom(zoom: f32) -> f32 {
    if !zoom.is_finite() {
        return CAMERA_ZOOM_DEFAULT;
    }
    zoom.clamp(CAMERA_ZOOM_MIN, CAMERA_ZOOM_MAX)
}
