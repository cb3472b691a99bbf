use std::time::{Duration, Instant};

/// Fixed tick length for `target_tps`, truncated to whole nanoseconds so that
/// `n * dt` never exceeds the real time it stands for.
pub fn fixed_dt_for_tps(target_tps: u32) -> Duration {
    Duration::from_nanos(1_000_000_000 / u64::from(target_tps.max(1)))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickPlan {
    pub update_count: u32,
    pub fixed_dt: Duration,
}

impl TickPlan {
    pub fn fixed_dt_seconds(&self) -> f32 {
        self.fixed_dt.as_secs_f32()
    }
}

/// Accumulator-based fixed timestep.
///
/// Each sample adds the elapsed wall time (clamped to `max_frame_delta`) to the
/// accumulator and drains it in whole `fixed_dt` steps. The remainder is always
/// smaller than one step.
#[derive(Debug, Clone)]
pub struct FixedStepScheduler {
    fixed_dt: Duration,
    max_frame_delta: Duration,
    accumulator: Duration,
    last_sample: Instant,
}

impl FixedStepScheduler {
    pub fn new(target_tps: u32, max_frame_delta: Duration, start: Instant) -> Self {
        Self::with_fixed_dt(fixed_dt_for_tps(target_tps), max_frame_delta, start)
    }

    pub fn with_fixed_dt(fixed_dt: Duration, max_frame_delta: Duration, start: Instant) -> Self {
        Self {
            fixed_dt: if fixed_dt.is_zero() {
                fixed_dt_for_tps(60)
            } else {
                fixed_dt
            },
            max_frame_delta,
            accumulator: Duration::ZERO,
            last_sample: start,
        }
    }

    /// Samples `now`. A timestamp earlier than the previous sample counts as zero elapsed.
    pub fn tick(&mut self, now: Instant) -> TickPlan {
        let elapsed = now.saturating_duration_since(self.last_sample);
        self.last_sample = now;
        self.advance(elapsed)
    }

    pub fn advance(&mut self, elapsed: Duration) -> TickPlan {
        let clamped = clamp_frame_delta(elapsed, self.max_frame_delta);
        self.accumulator = self.accumulator.saturating_add(clamped);

        let mut update_count = 0u32;
        while self.accumulator >= self.fixed_dt {
            self.accumulator -= self.fixed_dt;
            update_count = update_count.saturating_add(1);
        }

        TickPlan {
            update_count,
            fixed_dt: self.fixed_dt,
        }
    }

    /// Forgets leftover time, e.g. after swapping scenes.
    pub fn reset(&mut self, now: Instant) {
        self.accumulator = Duration::ZERO;
        self.last_sample = now;
    }

    pub fn accumulator(&self) -> Duration {
        self.accumulator
    }

    pub fn fixed_dt(&self) -> Duration {
        self.fixed_dt
    }

    pub fn max_frame_delta(&self) -> Duration {
        self.max_frame_delta
    }
}

pub(crate) fn clamp_frame_delta(frame_dt: Duration, max_frame_delta: Duration) -> Duration {
    frame_dt.min(max_frame_delta)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FrameTicks {
    pub ticks_to_run: u32,
    pub dropped_ticks: u32,
}

/// Caller-side ceiling on logic ticks per rendered frame. Excess ticks are dropped.
pub(crate) fn plan_frame_ticks(update_count: u32, max_ticks_per_frame: u32) -> FrameTicks {
    let ticks_to_run = update_count.min(max_ticks_per_frame);
    FrameTicks {
        ticks_to_run,
        dropped_ticks: update_count - ticks_to_run,
    }
}
