mod collision;
mod config;
mod entity;
mod geometry;
mod loop_runner;
mod metrics;
mod rendering;
mod scene;
mod scheduler;

pub use collision::{
    detect_overlaps, Collider, CollisionPair, CollisionTracker, CollisionTransitions, ALL_LAYERS,
};
pub use config::{ConfigError, LoopConfig, TARGET_TPS_ENV_VAR};
pub use entity::{Behavior, CollisionHandler, CollisionHandlers, CollisionPhase, Entity, EntityId};
pub use geometry::{Color, Rect, Transform, Vec2};
pub use loop_runner::{
    run_app, run_app_with_metrics, AppError, FrameReport, FrameRunner, Platform, PumpStatus,
    RunSummary, StopReason,
};
pub use metrics::{LoopMetricsSnapshot, MetricsHandle};
pub use rendering::{
    Camera2D, DrawError, DrawTarget, RenderError, Viewport, Visual, VisualKind,
    CAMERA_ZOOM_DEFAULT, CAMERA_ZOOM_MAX, CAMERA_ZOOM_MIN,
};
pub use scene::{
    EntityIdAllocator, PendingApplied, RenderOrder, Scene, SceneCommands, TickSummary,
};
pub use scheduler::{fixed_dt_for_tps, FixedStepScheduler, TickPlan};
