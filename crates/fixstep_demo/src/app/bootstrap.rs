use std::env;
use std::path::Path;

use fixstep::{ConfigError, LoopConfig, Scene};
use tracing::info;
use tracing_subscriber::EnvFilter;

use super::demo_scene::{build_demo_scene, PLAYER_SPRITE};
use super::headless::HeadlessPlatform;

const CONFIG_ENV_VAR: &str = "FIXSTEP_CONFIG";
const DEFAULT_DEMO_FRAMES: u64 = 240;

pub(crate) struct AppWiring {
    pub(crate) config: LoopConfig,
    pub(crate) scene: Scene,
    pub(crate) platform: HeadlessPlatform,
}

pub(crate) fn build_app() -> Result<AppWiring, ConfigError> {
    init_tracing();
    info!("=== fixstep demo startup ===");

    let config = load_config(env::var(CONFIG_ENV_VAR).ok().as_deref())?.with_env_overrides();
    let platform = HeadlessPlatform::paced(config.target_tps).with_sprite(PLAYER_SPRITE);
    let (scene, ids) = build_demo_scene();
    info!(
        player = %ids.player,
        pickup = %ids.pickup,
        ghost = %ids.ghost,
        entity_count = scene.entity_count(),
        "scene_loaded"
    );

    Ok(AppWiring {
        config,
        scene,
        platform,
    })
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}

/// Falls back to a fixed frame count when the config sets no `max_frames`.
fn load_config(path: Option<&str>) -> Result<LoopConfig, ConfigError> {
    let mut config = match path.map(str::trim).filter(|raw| !raw.is_empty()) {
        Some(raw) => {
            let config = LoopConfig::load(Path::new(raw))?;
            info!(path = raw, "config_loaded");
            config
        }
        None => LoopConfig::default(),
    };
    if config.max_frames.is_none() {
        config.max_frames = Some(DEFAULT_DEMO_FRAMES);
    }
    Ok(config)
}
