mod camera;
mod draw;
mod visual;

pub use camera::{Camera2D, Viewport, CAMERA_ZOOM_DEFAULT, CAMERA_ZOOM_MAX, CAMERA_ZOOM_MIN};
pub use draw::{DrawError, DrawTarget, RenderError};
pub use visual::{Visual, VisualKind};
