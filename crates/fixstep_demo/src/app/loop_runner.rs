use std::process::ExitCode;

use fixstep::run_app;
use tracing::{error, info};

use super::bootstrap::build_app;

pub(crate) fn run() -> ExitCode {
    let mut app = match build_app() {
        Ok(app) => app,
        Err(err) => {
            error!(error = %err, "startup_failed");
            return ExitCode::FAILURE;
        }
    };

    match run_app(app.config, app.scene, &mut app.platform) {
        Ok(summary) => {
            info!(
                frames = summary.frames,
                ticks = summary.ticks,
                entered = summary.totals.entered,
                exited = summary.totals.exited,
                spawned = summary.totals.spawned,
                removed = summary.totals.removed,
                presented = app.platform.frames_presented(),
                draws = app.platform.total_draws(),
                "demo_finished"
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!(error = %err, "run_failed");
            ExitCode::FAILURE
        }
    }
}
