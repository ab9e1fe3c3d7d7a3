#![forbid(unsafe_code)]

//! Playback configuration.
//!
//! Every tunable of the timing engine and run state lives in one
//! [`PlaybackConfig`], loadable from TOML or JSON and overridable from
//! `SORT_VIZ_<FIELD>` environment variables.
//!
//! ```toml
//! # sortviz.toml
//! fps_default = 30
//! per_second = 500
//! checkpoint_stride = 100
//! ```
//!
//! ```rust,ignore
//! let config = PlaybackConfig::load("sortviz.toml")?;
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use sortviz_core::RunConfig;

/// Prefix for environment overrides.
pub const ENV_PREFIX: &str = "SORT_VIZ_";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Smallest dataset size offered.
    pub min_n: usize,
    pub max_n: usize,
    pub default_n: usize,
    /// Default value range for generated datasets.
    pub min_val: i64,
    pub max_val: i64,
    pub fps_min: u32,
    pub fps_max: u32,
    pub fps_default: u32,
    /// Lateness tolerated before a tick applies a catch-up step.
    pub jitter_budget_ms: u64,
    /// Steps applied per tick, at most.
    pub per_tick: u32,
    /// Steps admitted per rolling one-second window.
    pub per_second: u32,
    /// Steps between checkpoints.
    pub checkpoint_stride: usize,
    /// Steps drained eagerly before switching to on-demand pulls.
    pub precompute_cap: usize,
    /// Rate of the post-finish confirm sweep.
    pub confirm_sweep_hz: u32,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        let run = RunConfig::default();
        Self {
            min_n: 5,
            max_n: 200,
            default_n: 32,
            min_val: 1,
            max_val: 200,
            fps_min: 1,
            fps_max: 60,
            fps_default: 24,
            jitter_budget_ms: 10,
            per_tick: 8,
            per_second: 1000,
            checkpoint_stride: run.checkpoint_stride,
            precompute_cap: run.precompute_cap,
            confirm_sweep_hz: 60,
        }
    }
}

impl PlaybackConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(ConfigError::Toml)
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_toml_str(&content)
    }

    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(s).map_err(ConfigError::Json)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_json_str(&content)
    }

    /// Load a file (JSON when the extension is `.json`, TOML otherwise),
    /// apply environment overrides and validate.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let config = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_file(path)?,
            _ => Self::from_toml_file(path)?,
        };
        let config = config.with_env_overrides()?;
        config.validated()
    }

    /// Apply `SORT_VIZ_<FIELD>` overrides from the process environment.
    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        self.with_overrides(std::env::vars())
    }

    /// Apply `SORT_VIZ_<FIELD>` overrides from `vars`. Empty values and
    /// unknown fields are ignored; unparsable values are a validation error.
    pub fn with_overrides<I, K, V>(mut self, vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut errors = Vec::new();
        for (key, value) in vars {
            let Some(field) = key.as_ref().strip_prefix(ENV_PREFIX) else {
                continue;
            };
            let raw = value.as_ref().trim();
            if raw.is_empty() {
                continue;
            }
            let field = field.to_ascii_lowercase();
            match self.set_field(&field, raw) {
                Ok(true) => tracing::debug!(field = %field, value = raw, "config override"),
                Ok(false) => {}
                Err(msg) => errors.push(format!("{}{}: {msg}", ENV_PREFIX, field.to_uppercase())),
            }
        }
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    fn set_field(&mut self, field: &str, raw: &str) -> Result<bool, String> {
        fn parse<T: std::str::FromStr>(raw: &str) -> Result<T, String>
        where
            T::Err: std::fmt::Display,
        {
            raw.parse::<T>().map_err(|e| e.to_string())
        }

        match field {
            "min_n" => self.min_n = parse(raw)?,
            "max_n" => self.max_n = parse(raw)?,
            "default_n" => self.default_n = parse(raw)?,
            "min_val" => self.min_val = parse(raw)?,
            "max_val" => self.max_val = parse(raw)?,
            "fps_min" => self.fps_min = parse(raw)?,
            "fps_max" => self.fps_max = parse(raw)?,
            "fps_default" => self.fps_default = parse(raw)?,
            "jitter_budget_ms" => self.jitter_budget_ms = parse(raw)?,
            "per_tick" => self.per_tick = parse(raw)?,
            "per_second" => self.per_second = parse(raw)?,
            "checkpoint_stride" => self.checkpoint_stride = parse(raw)?,
            "precompute_cap" => self.precompute_cap = parse(raw)?,
            "confirm_sweep_hz" => self.confirm_sweep_hz = parse(raw)?,
            _ => return Ok(false),
        }
        Ok(true)
    }

    /// Validate all parameters.
    ///
    /// Returns a list of validation errors. An empty list means the config
    /// is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.fps_min == 0 {
            errors.push("fps_min must be > 0".into());
        }
        if self.fps_min > self.fps_max {
            errors.push(format!(
                "fps_min ({}) must be <= fps_max ({})",
                self.fps_min, self.fps_max
            ));
        }
        if !(self.fps_min..=self.fps_max).contains(&self.fps_default) {
            errors.push(format!(
                "fps_default ({}) must be within [{}, {}]",
                self.fps_default, self.fps_min, self.fps_max
            ));
        }
        if self.fps_max > 1000 {
            errors.push(format!("fps_max must be <= 1000, got {}", self.fps_max));
        }
        if self.per_tick == 0 {
            errors.push("per_tick must be > 0".into());
        }
        if self.per_second == 0 {
            errors.push("per_second must be > 0".into());
        }
        if self.checkpoint_stride == 0 {
            errors.push("checkpoint_stride must be > 0".into());
        }
        if self.confirm_sweep_hz == 0 {
            errors.push("confirm_sweep_hz must be > 0".into());
        }
        if self.min_n > self.max_n {
            errors.push(format!(
                "min_n ({}) must be <= max_n ({})",
                self.min_n, self.max_n
            ));
        }
        if !(self.min_n..=self.max_n).contains(&self.default_n) {
            errors.push(format!(
                "default_n ({}) must be within [{}, {}]",
                self.default_n, self.min_n, self.max_n
            ));
        }
        if self.min_val > self.max_val {
            errors.push(format!(
                "min_val ({}) must be <= max_val ({})",
                self.min_val, self.max_val
            ));
        }

        errors
    }

    /// `self` if valid, otherwise every validation message.
    pub fn validated(self) -> Result<Self, ConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    #[must_use]
    pub fn clamp_fps(&self, fps: u32) -> u32 {
        fps.clamp(self.fps_min.max(1), self.fps_max.max(self.fps_min).max(1))
    }

    #[must_use]
    pub fn jitter_budget(&self) -> Duration {
        Duration::from_millis(self.jitter_budget_ms)
    }

    #[must_use]
    pub fn run_config(&self) -> RunConfig {
        RunConfig {
            checkpoint_stride: self.checkpoint_stride.max(1),
            precompute_cap: self.precompute_cap,
        }
    }

    /// Serialize to a single-line JSON object.
    #[must_use]
    pub fn to_jsonl(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}

/// Errors from loading a [`PlaybackConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[source] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[source] toml::de::Error),
    #[error("JSON parse error: {0}")]
    Json(#[source] serde_json::Error),
    #[error("validation errors: {}", .0.join("; "))]
    Validation(Vec<String>),
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn default_is_valid() {
        let config = PlaybackConfig::default();
        assert!(config.validate().is_empty(), "{:?}", config.validate());
        assert_eq!(config.fps_default, 24);
        assert_eq!(config.per_tick, 8);
        assert_eq!(config.per_second, 1000);
        assert_eq!(config.checkpoint_stride, 200);
        assert_eq!(config.precompute_cap, 10_000);
    }

    #[test]
    fn toml_partial_uses_defaults() {
        let config = PlaybackConfig::from_toml_str("fps_default = 30\nper_second = 5\n").unwrap();
        assert_eq!(config.fps_default, 30);
        assert_eq!(config.per_second, 5);
        assert_eq!(config.per_tick, 8);
    }

    #[test]
    fn json_round_trip() {
        let config = PlaybackConfig {
            checkpoint_stride: 7,
            ..PlaybackConfig::default()
        };
        let back = PlaybackConfig::from_json_str(&config.to_jsonl()).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn empty_toml_is_default() {
        assert_eq!(
            PlaybackConfig::from_toml_str("").unwrap(),
            PlaybackConfig::default()
        );
    }

    #[test]
    fn bad_toml_is_error() {
        assert!(matches!(
            PlaybackConfig::from_toml_str("fps_default = \"fast\""),
            Err(ConfigError::Toml(_))
        ));
    }

    #[test]
    fn validate_catches_inverted_fps_range() {
        let config = PlaybackConfig {
            fps_min: 30,
            fps_max: 10,
            ..PlaybackConfig::default()
        };
        let errors = config.validate();
        assert!(errors.iter().any(|e| e.contains("fps_min")));
        assert!(errors.iter().any(|e| e.contains("fps_default")));
    }

    #[test]
    fn validate_catches_zero_caps() {
        let config = PlaybackConfig {
            per_tick: 0,
            per_second: 0,
            checkpoint_stride: 0,
            ..PlaybackConfig::default()
        };
        let errors = config.validate();
        assert!(errors.iter().any(|e| e.contains("per_tick")));
        assert!(errors.iter().any(|e| e.contains("per_second")));
        assert!(errors.iter().any(|e| e.contains("checkpoint_stride")));
        assert!(matches!(config.validated(), Err(ConfigError::Validation(v)) if v.len() == 3));
    }

    #[test]
    fn overrides_apply_by_field_name() {
        let vars = [
            ("SORT_VIZ_FPS_DEFAULT", "12"),
            ("SORT_VIZ_CHECKPOINT_STRIDE", "50"),
            ("SORT_VIZ_BAR_COLOR", "#fff"),
            ("SORT_VIZ_PER_TICK", ""),
            ("HOME", "/root"),
        ];
        let config = PlaybackConfig::default().with_overrides(vars).unwrap();
        assert_eq!(config.fps_default, 12);
        assert_eq!(config.checkpoint_stride, 50);
        assert_eq!(config.per_tick, 8);
    }

    #[test]
    fn unparsable_override_is_reported() {
        let err = PlaybackConfig::default()
            .with_overrides([("SORT_VIZ_PER_SECOND", "lots")])
            .unwrap_err();
        match err {
            ConfigError::Validation(msgs) => {
                assert_eq!(msgs.len(), 1);
                assert!(msgs[0].starts_with("SORT_VIZ_PER_SECOND"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn load_picks_format_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let json = dir.path().join("sortviz.json");
        std::fs::File::create(&json)
            .unwrap()
            .write_all(br#"{"fps_default": 48}"#)
            .unwrap();
        let toml_path = dir.path().join("sortviz.toml");
        std::fs::write(&toml_path, "per_tick = 3\n").unwrap();

        assert_eq!(PlaybackConfig::from_json_file(&json).unwrap().fps_default, 48);
        assert_eq!(PlaybackConfig::from_toml_file(&toml_path).unwrap().per_tick, 3);
        assert!(matches!(
            PlaybackConfig::from_toml_file(dir.path().join("missing.toml")),
            Err(ConfigError::Io(_))
        ));
    }

    #[test]
    fn clamp_fps_respects_bounds() {
        let config = PlaybackConfig::default();
        assert_eq!(config.clamp_fps(0), 1);
        assert_eq!(config.clamp_fps(500), 60);
        assert_eq!(config.clamp_fps(24), 24);
    }
}
