use std::collections::HashSet;
use std::thread;
use std::time::{Duration, Instant};

use fixstep::{
    Camera2D, Color, DrawError, DrawTarget, Platform, PumpStatus, Transform, Viewport, Visual,
    VisualKind,
};
use tracing::{debug, trace};

/// Platform without a window. Draw calls are projected through the camera and
/// logged; frames are paced with `thread::sleep`.
#[derive(Debug)]
pub(crate) struct HeadlessPlatform {
    viewport: Viewport,
    frame_target: Option<Duration>,
    last_pump: Option<Instant>,
    loaded_sprites: HashSet<String>,
    draws_this_frame: usize,
    total_draws: u64,
    frames_presented: u64,
}

impl HeadlessPlatform {
    pub(crate) fn unpaced() -> Self {
        Self {
            viewport: Viewport::default(),
            frame_target: None,
            last_pump: None,
            loaded_sprites: HashSet::new(),
            draws_this_frame: 0,
            total_draws: 0,
            frames_presented: 0,
        }
    }

    pub(crate) fn paced(target_fps: u32) -> Self {
        Self {
            frame_target: target_frame_duration(target_fps),
            ..Self::unpaced()
        }
    }

    pub(crate) fn with_sprite(mut self, key: impl Into<String>) -> Self {
        self.loaded_sprites.insert(key.into());
        self
    }

    pub(crate) fn total_draws(&self) -> u64 {
        self.total_draws
    }

    pub(crate) fn frames_presented(&self) -> u64 {
        self.frames_presented
    }
}

impl DrawTarget for HeadlessPlatform {
    fn clear(&mut self, background: Color) -> Result<(), DrawError> {
        self.draws_this_frame = 0;
        trace!(r = background.r, g = background.g, b = background.b, "clear");
        Ok(())
    }

    fn draw(
        &mut self,
        visual: &Visual,
        transform: &Transform,
        camera: &Camera2D,
    ) -> Result<(), DrawError> {
        if let VisualKind::Sprite(key) = &visual.kind {
            if !self.loaded_sprites.contains(key) {
                return Err(DrawError::MissingSprite {
                    sprite_key: key.clone(),
                });
            }
        }
        let (screen_x, screen_y) = camera.world_to_screen(transform.position, self.viewport);
        trace!(
            sprite = visual.sprite_key().unwrap_or("placeholder"),
            screen_x,
            screen_y,
            "draw"
        );
        self.draws_this_frame += 1;
        self.total_draws += 1;
        Ok(())
    }
}

impl Platform for HeadlessPlatform {
    fn pump_events(&mut self) -> PumpStatus {
        let now = Instant::now();
        if let (Some(target), Some(last)) = (self.frame_target, self.last_pump) {
            let sleep = compute_cap_sleep(now.saturating_duration_since(last), target);
            if sleep > Duration::ZERO {
                thread::sleep(sleep);
            }
        }
        self.last_pump = Some(Instant::now());
        PumpStatus::Continue
    }

    fn now(&self) -> Instant {
        Instant::now()
    }

    fn present(&mut self) -> Result<(), DrawError> {
        self.frames_presented += 1;
        debug!(
            frame = self.frames_presented,
            draws = self.draws_this_frame,
            "present"
        );
        Ok(())
    }
}

fn target_frame_duration(target_fps: u32) -> Option<Duration> {
    (target_fps > 0).then(|| Duration::from_secs_f64(1.0 / target_fps as f64))
}

fn compute_cap_sleep(elapsed: Duration, target: Duration) -> Duration {
    target.saturating_sub(elapsed)
}

#[cfg(test)]
mod tests {
    use fixstep::Vec2;

    use super::*;

    #[test]
    fn compute_cap_sleep_zero_when_over_budget() {
        let target = Duration::from_millis(16);
        assert_eq!(
            compute_cap_sleep(Duration::from_millis(20), target),
            Duration::ZERO
        );
    }

    #[test]
    fn compute_cap_sleep_positive_when_under_budget() {
        let target = Duration::from_millis(16);
        assert_eq!(
            compute_cap_sleep(Duration::from_millis(10), target),
            Duration::from_millis(6)
        );
    }

    #[test]
    fn target_frame_duration_off_for_zero() {
        assert_eq!(target_frame_duration(0), None);
        assert_eq!(target_frame_duration(50), Some(Duration::from_millis(20)));
    }

    #[test]
    fn unknown_sprite_is_reported() {
        let mut platform = HeadlessPlatform::unpaced().with_sprite("player");
        let camera = Camera2D::default();
        let transform = Transform::at(Vec2::new(1.0, 2.0));

        assert!(platform
            .draw(&Visual::sprite("player"), &transform, &camera)
            .is_ok());
        let error = platform
            .draw(&Visual::sprite("boss"), &transform, &camera)
            .expect_err("boss is not loaded");

        assert!(matches!(error, DrawError::MissingSprite { sprite_key } if sprite_key == "boss"));
        assert_eq!(platform.total_draws(), 1);
    }

    #[test]
    fn present_counts_frames_and_clear_resets_frame_draws() {
        let mut platform = HeadlessPlatform::unpaced();
        let camera = Camera2D::default();

        platform.clear(Color::BLACK).expect("clear");
        platform
            .draw(&Visual::placeholder(Color::RED), &Transform::default(), &camera)
            .expect("draw");
        platform.present().expect("present");
        platform.clear(Color::BLACK).expect("clear");

        assert_eq!(platform.frames_presented(), 1);
        assert_eq!(platform.draws_this_frame, 0);
        assert_eq!(platform.total_draws(), 1);
    }
}
