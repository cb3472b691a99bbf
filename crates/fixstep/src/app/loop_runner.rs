use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{info, warn};

use super::config::{ConfigError, LoopConfig};
use super::metrics::{MetricsAccumulator, MetricsHandle};
use super::rendering::{DrawError, DrawTarget, RenderError};
use super::scene::{Scene, TickSummary};
use super::scheduler::{plan_frame_ticks, FixedStepScheduler};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PumpStatus {
    Continue,
    Quit,
}

/// Host services the loop needs: event pumping, a clock, and a surface to
/// draw on and present.
pub trait Platform: DrawTarget {
    fn pump_events(&mut self) -> PumpStatus;

    fn now(&self) -> Instant;

    fn present(&mut self) -> Result<(), DrawError>;
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("render pass failed: {0}")]
    Render(#[from] RenderError),
    #[error("failed to present frame: {0}")]
    Present(#[source] DrawError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameReport {
    pub ticks_run: u32,
    pub dropped_ticks: u32,
    pub drawn: usize,
    pub tick_summary: TickSummary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    Quit,
    FrameBudget,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub frames: u64,
    pub ticks: u64,
    pub dropped_ticks: u64,
    pub totals: TickSummary,
    pub stop_reason: StopReason,
}

/// One active scene driven by a fixed-step scheduler.
#[derive(Debug)]
pub struct FrameRunner {
    scheduler: FixedStepScheduler,
    max_ticks_per_frame: u32,
    metrics: MetricsAccumulator,
    metrics_handle: MetricsHandle,
    scene: Scene,
    last_frame: Instant,
}

impl FrameRunner {
    pub fn new(config: &LoopConfig, scene: Scene, start: Instant) -> Self {
        Self::with_metrics(config, scene, start, MetricsHandle::default())
    }

    pub fn with_metrics(
        config: &LoopConfig,
        scene: Scene,
        start: Instant,
        metrics_handle: MetricsHandle,
    ) -> Self {
        let config = config.clone().validated();
        Self {
            scheduler: FixedStepScheduler::new(config.target_tps, config.max_frame_delta(), start),
            max_ticks_per_frame: config.max_ticks_per_frame,
            metrics: MetricsAccumulator::new(config.metrics_log_interval(), start),
            metrics_handle,
            scene,
            last_frame: start,
        }
    }

    /// Runs one frame: schedule, update, render, present, then metrics.
    pub fn run_frame<P>(&mut self, platform: &mut P) -> Result<FrameReport, AppError>
    where
        P: Platform + ?Sized,
    {
        let now = platform.now();
        let frame_dt = now.saturating_duration_since(self.last_frame);
        self.last_frame = now;

        let plan = self.scheduler.tick(now);
        let frame_ticks = plan_frame_ticks(plan.update_count, self.max_ticks_per_frame);
        if frame_ticks.dropped_ticks > 0 {
            warn!(
                dropped_ticks = frame_ticks.dropped_ticks,
                max_ticks_per_frame = self.max_ticks_per_frame,
                "sim_clamp_triggered"
            );
        }

        let dt_seconds = plan.fixed_dt_seconds();
        let mut tick_summary = TickSummary::default();
        for _ in 0..frame_ticks.ticks_to_run {
            tick_summary += self.scene.update(dt_seconds);
        }

        let drawn = self.scene.render(platform).map_err(|error| {
            warn!(
                error = %error,
                entity_id = error.entity_id().map(|id| id.0),
                "render_failed"
            );
            AppError::Render(error)
        })?;
        platform.present().map_err(|error| {
            warn!(error = %error, "present_failed");
            AppError::Present(error)
        })?;

        self.metrics.record_frame(frame_dt);
        self.metrics.record_ticks(frame_ticks.ticks_to_run);
        self.metrics.record_dropped(frame_ticks.dropped_ticks);
        if let Some(snapshot) = self.metrics.maybe_snapshot(now) {
            self.metrics_handle.publish(snapshot);
            info!(
                fps = snapshot.fps,
                tps = snapshot.tps,
                frame_time_ms = snapshot.frame_time_ms,
                dropped_ticks = snapshot.dropped_ticks,
                entity_count = self.scene.entity_count(),
                "loop_metrics"
            );
        }

        Ok(FrameReport {
            ticks_run: frame_ticks.ticks_to_run,
            dropped_ticks: frame_ticks.dropped_ticks,
            drawn,
            tick_summary,
        })
    }

    /// Makes `scene` the active scene and hands back the previous one untouched.
    pub fn set_scene(&mut self, scene: Scene) -> Scene {
        let previous = std::mem::replace(&mut self.scene, scene);
        info!(
            previous_entity_count = previous.entity_count(),
            entity_count = self.scene.entity_count(),
            "scene_swapped"
        );
        previous
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    pub fn into_scene(self) -> Scene {
        self.scene
    }

    pub fn metrics(&self) -> &MetricsHandle {
        &self.metrics_handle
    }

    pub fn fixed_dt(&self) -> Duration {
        self.scheduler.fixed_dt()
    }
}

pub fn run_app<P>(
    config: LoopConfig,
    scene: Scene,
    platform: &mut P,
) -> Result<RunSummary, AppError>
where
    P: Platform + ?Sized,
{
    run_app_with_metrics(config, scene, platform, MetricsHandle::default())
}

/// Drives frames until the platform quits, the frame budget runs out, or a
/// render/present error occurs. Errors are returned, not retried.
///
/// `config.render_order` replaces whatever order `scene` was built with.
pub fn run_app_with_metrics<P>(
    config: LoopConfig,
    mut scene: Scene,
    platform: &mut P,
    metrics_handle: MetricsHandle,
) -> Result<RunSummary, AppError>
where
    P: Platform + ?Sized,
{
    let config = config.validated();
    config.check()?;
    scene.set_render_order(config.render_order);

    info!(
        target_tps = config.target_tps,
        max_frame_delta_ms = config.max_frame_delta_ms,
        max_ticks_per_frame = config.max_ticks_per_frame,
        metrics_log_interval_ms = config.metrics_log_interval_ms,
        render_order = ?config.render_order,
        max_frames = ?config.max_frames,
        entity_count = scene.entity_count(),
        "loop_config"
    );

    let mut runner = FrameRunner::with_metrics(&config, scene, platform.now(), metrics_handle);
    let mut frames = 0u64;
    let mut ticks = 0u64;
    let mut dropped_ticks = 0u64;
    let mut totals = TickSummary::default();

    let stop_reason = loop {
        if config.max_frames.is_some_and(|budget| frames >= budget) {
            break StopReason::FrameBudget;
        }
        if platform.pump_events() == PumpStatus::Quit {
            break StopReason::Quit;
        }

        let report = match runner.run_frame(platform) {
            Ok(report) => report,
            Err(error) => {
                info!(frames, ticks, reason = "error", "shutdown");
                return Err(error);
            }
        };
        frames += 1;
        ticks += u64::from(report.ticks_run);
        dropped_ticks += u64::from(report.dropped_ticks);
        totals += report.tick_summary;
    };

    info!(
        frames,
        ticks,
        dropped_ticks,
        reason = ?stop_reason,
        entity_count = runner.scene().entity_count(),
        "shutdown"
    );

    Ok(RunSummary {
        frames,
        ticks,
        dropped_ticks,
        totals,
        stop_reason,
    })
}
