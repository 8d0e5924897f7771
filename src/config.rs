use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::body_type::{VisibilityGate, DEFAULT_WAIST_FRACTION};
use crate::error::Result;
use crate::palette::ColorStrategyKind;

/// Tunables shared by the analyzers and the frame worker.
///
/// Every field has a default, so a config file only needs the keys it
/// changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub color_strategy: ColorStrategyKind,
    /// Visibility gate applied before a pose is measured.
    pub body: VisibilityGate,
    /// Position of the waist along the shoulder-to-hip line.
    pub waist_fraction: f32,
    /// Minimum time between two analyses of a live stream.
    pub analysis_interval_ms: u64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            color_strategy: ColorStrategyKind::default(),
            body: VisibilityGate::default(),
            waist_fraction: DEFAULT_WAIST_FRACTION,
            analysis_interval_ms: 500,
        }
    }
}

impl AnalysisConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let config: AnalysisConfig = serde_json::from_str(&content)?;
        debug!(path = %path.display(), strategy = ?config.color_strategy, "loaded analysis config");
        Ok(config)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn analysis_interval(&self) -> Duration {
        Duration::from_millis(self.analysis_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn defaults() {
        let config = AnalysisConfig::default();
        assert_eq!(config.color_strategy, ColorStrategyKind::HsvRules);
        assert_eq!(config.body.min_visibility, 0.7);
        assert_eq!(config.body.min_visible_landmarks, 20);
        assert_eq!(config.waist_fraction, 0.6);
        assert_eq!(config.analysis_interval(), Duration::from_millis(500));
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: AnalysisConfig = serde_json::from_str(
            r#"{"color_strategy":"nearest-reference","body":{"min_visible_landmarks":12}}"#,
        )
        .unwrap();
        assert_eq!(config.color_strategy, ColorStrategyKind::NearestReference);
        assert_eq!(config.body.min_visible_landmarks, 12);
        assert_eq!(config.body.min_visibility, 0.7);
        assert_eq!(config.analysis_interval_ms, 500);
    }

    #[test]
    fn save_then_load() {
        let path = std::env::temp_dir().join(format!("anthro-traits-config-{}.json", std::process::id()));
        let config = AnalysisConfig {
            analysis_interval_ms: 250,
            ..AnalysisConfig::default()
        };
        config.save(&path).unwrap();
        let loaded = AnalysisConfig::load(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(loaded, config);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = AnalysisConfig::load("/nonexistent/anthro-traits.json").unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
