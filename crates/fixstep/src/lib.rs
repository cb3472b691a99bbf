pub mod app;

pub use app::{
    detect_overlaps, fixed_dt_for_tps, run_app, run_app_with_metrics, AppError, Behavior,
    Camera2D, Collider, CollisionHandler, CollisionHandlers, CollisionPair, CollisionPhase,
    CollisionTracker, CollisionTransitions, Color, ConfigError, DrawError, DrawTarget, Entity,
    EntityId, EntityIdAllocator, FixedStepScheduler, FrameReport, FrameRunner, LoopConfig,
    LoopMetricsSnapshot, MetricsHandle, PendingApplied, Platform, PumpStatus, Rect, RenderError,
    RenderOrder, RunSummary, Scene, SceneCommands, StopReason, TickPlan, TickSummary, Transform,
    Vec2, Viewport, Visual, VisualKind, ALL_LAYERS, CAMERA_ZOOM_DEFAULT, CAMERA_ZOOM_MAX,
    CAMERA_ZOOM_MIN, TARGET_TPS_ENV_VAR,
};
