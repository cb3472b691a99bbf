use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

use super::scene::RenderOrder;

pub const TARGET_TPS_ENV_VAR: &str = "FIXSTEP_TARGET_TPS";

const DEFAULT_TARGET_TPS: u32 = 60;
const DEFAULT_MAX_FRAME_DELTA_MS: u64 = 250;
const DEFAULT_MAX_TICKS_PER_FRAME: u32 = 8;
const DEFAULT_METRICS_LOG_INTERVAL_MS: u64 = 1000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {message}")]
    Parse { path: String, message: String },
    #[error("invalid config value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoopConfig {
    pub target_tps: u32,
    pub max_frame_delta_ms: u64,
    pub max_ticks_per_frame: u32,
    pub metrics_log_interval_ms: u64,
    pub render_order: RenderOrder,
    pub max_frames: Option<u64>,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            target_tps: DEFAULT_TARGET_TPS,
            max_frame_delta_ms: DEFAULT_MAX_FRAME_DELTA_MS,
            max_ticks_per_frame: DEFAULT_MAX_TICKS_PER_FRAME,
            metrics_log_interval_ms: DEFAULT_METRICS_LOG_INTERVAL_MS,
            render_order: RenderOrder::default(),
            max_frames: None,
        }
    }
}

impl LoopConfig {
    /// Parses JSON config. Parse errors carry the path of the offending field.
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        parse_config(raw, "<inline>")
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        parse_config(&raw, &path.display().to_string())
    }

    /// Replaces zero values with their defaults.
    pub fn validated(mut self) -> Self {
        if self.target_tps == 0 {
            self.target_tps = DEFAULT_TARGET_TPS;
        }
        if self.max_frame_delta_ms == 0 {
            self.max_frame_delta_ms = DEFAULT_MAX_FRAME_DELTA_MS;
        }
        self.max_ticks_per_frame = self.max_ticks_per_frame.max(1);
        if self.metrics_log_interval_ms == 0 {
            self.metrics_log_interval_ms = DEFAULT_METRICS_LOG_INTERVAL_MS;
        }
        self
    }

    /// Fails on values `validated` cannot repair.
    pub fn check(&self) -> Result<(), ConfigError> {
        if self.max_frames == Some(0) {
            return Err(ConfigError::Invalid {
                field: "max_frames",
                reason: "frame budget must be at least 1 when set".to_string(),
            });
        }
        if self.target_tps > 10_000 {
            return Err(ConfigError::Invalid {
                field: "target_tps",
                reason: format!("{} exceeds the supported maximum of 10000", self.target_tps),
            });
        }
        Ok(())
    }

    pub fn with_env_overrides(self) -> Self {
        match env::var(TARGET_TPS_ENV_VAR) {
            Ok(value) => self.with_target_tps_override(Some(&value)),
            Err(env::VarError::NotPresent) => self,
            Err(err) => {
                warn!(
                    env_var = TARGET_TPS_ENV_VAR,
                    error = %err,
                    "unable to read target tps env var; falling back to config"
                );
                self
            }
        }
    }

    fn with_target_tps_override(mut self, value: Option<&str>) -> Self {
        let Some(value) = value else {
            return self;
        };
        match value.trim().parse::<u32>() {
            Ok(tps) if tps > 0 => self.target_tps = tps,
            _ => {
                warn!(
                    env_var = TARGET_TPS_ENV_VAR,
                    value,
                    "invalid target tps env var value; falling back to config"
                );
            }
        }
        self
    }

    pub fn max_frame_delta(&self) -> Duration {
        Duration::from_millis(self.max_frame_delta_ms)
    }

    pub fn metrics_log_interval(&self) -> Duration {
        Duration::from_millis(self.metrics_log_interval_ms)
    }
}

fn parse_config(raw: &str, origin: &str) -> Result<LoopConfig, ConfigError> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    serde_path_to_error::deserialize(&mut deserializer).map_err(|error| {
        let field_path = error.path().to_string();
        ConfigError::Parse {
            path: origin.to_string(),
            message: format!("{field_path}: {}", error.inner()),
        }
    })
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn empty_object_yields_defaults() {
        let config = LoopConfig::from_json_str("{}").expect("parse");
        assert_eq!(config, LoopConfig::default());
        assert_eq!(config.max_frame_delta(), Duration::from_millis(250));
        assert_eq!(config.max_ticks_per_frame, 8);
    }

    #[test]
    fn partial_config_overrides_named_fields() {
        let config = LoopConfig::from_json_str(
            r#"{ "target_tps": 30, "render_order": "z_order", "max_frames": 120 }"#,
        )
        .expect("parse");

        assert_eq!(config.target_tps, 30);
        assert_eq!(config.render_order, RenderOrder::ZOrder);
        assert_eq!(config.max_frames, Some(120));
        assert_eq!(config.metrics_log_interval(), Duration::from_secs(1));
    }

    #[test]
    fn type_error_names_offending_field() {
        let error = LoopConfig::from_json_str(r#"{ "max_ticks_per_frame": "many" }"#)
            .expect_err("string is not a tick count");

        match error {
            ConfigError::Parse { message, .. } => {
                assert!(message.starts_with("max_ticks_per_frame"), "{message}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn unknown_field_is_rejected() {
        let error = LoopConfig::from_json_str(r#"{ "window_title": "demo" }"#)
            .expect_err("unknown field");
        assert!(error.to_string().contains("window_title"));
    }

    #[test]
    fn load_reads_json_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, r#"{{ "target_tps": 120, "max_frame_delta_ms": 100 }}"#).expect("write");

        let config = LoopConfig::load(file.path()).expect("load");

        assert_eq!(config.target_tps, 120);
        assert_eq!(config.max_frame_delta(), Duration::from_millis(100));
    }

    #[test]
    fn load_missing_file_reports_read_error_with_path() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("missing.json");

        let error = LoopConfig::load(&path).expect_err("missing file");

        match error {
            ConfigError::Read { path: reported, .. } => assert_eq!(reported, path),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn validated_replaces_zeros_with_defaults() {
        let config = LoopConfig {
            target_tps: 0,
            max_frame_delta_ms: 0,
            max_ticks_per_frame: 0,
            metrics_log_interval_ms: 0,
            ..LoopConfig::default()
        }
        .validated();

        assert_eq!(config.target_tps, 60);
        assert_eq!(config.max_frame_delta_ms, 250);
        assert_eq!(config.max_ticks_per_frame, 1);
        assert_eq!(config.metrics_log_interval_ms, 1000);
    }

    #[test]
    fn check_rejects_zero_frame_budget() {
        let config = LoopConfig {
            max_frames: Some(0),
            ..LoopConfig::default()
        };
        assert!(matches!(
            config.check(),
            Err(ConfigError::Invalid {
                field: "max_frames",
                ..
            })
        ));
        assert!(LoopConfig::default().check().is_ok());
    }

    #[test]
    fn target_tps_override_applies_valid_value() {
        let config = LoopConfig::default().with_target_tps_override(Some(" 30 "));
        assert_eq!(config.target_tps, 30);
    }

    #[test]
    fn target_tps_override_ignores_invalid_value() {
        let config = LoopConfig::default().with_target_tps_override(Some("fast"));
        assert_eq!(config.target_tps, 60);

        let config = LoopConfig::default().with_target_tps_override(Some("0"));
        assert_eq!(config.target_tps, 60);

        let config = LoopConfig::default().with_target_tps_override(None);
        assert_eq!(config.target_tps, 60);
    }
}
