//! Pipeline and batch configuration.
//!
//! [`PipelineConfig`] holds the defaults the normalizer falls back to and
//! the knobs of the extractor. [`BatchConfig`] holds pacing and scheduling
//! settings for the batch driver and can be loaded from a JSON file.
//!
//! # Example
//!
//! ```rust
//! use trailmark_core::PipelineConfig;
//!
//! let config = PipelineConfig::builder()
//!     .seed(42)
//!     .jitter(0.05)
//!     .max_fallback_stages(6)
//!     .build();
//! assert_eq!(config.seed, Some(42));
//! ```

use std::fs;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::fetch::FetchConfig;
use crate::{Result, TrailmarkError};

/// Configuration for the extraction-to-record pipeline.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Suffix the source site appends to page titles (default: " - WalkHighlands").
    pub site_name_suffix: String,

    /// Title used when a page has none (default: "Unknown Walk").
    pub placeholder_title: String,

    /// Cap on paragraph-derived stages when no "Stage N" markers exist (default: 10).
    pub max_fallback_stages: usize,

    /// Half-width of the uniform coordinate jitter in degrees (default: 0.1).
    pub jitter: f64,

    /// Distance in km when none was recovered (default: 5.0).
    pub default_distance_km: f64,

    /// Ascent in metres when neither ascent nor distance was recovered (default: 100).
    pub default_ascent_m: u32,

    /// Added to ascent to estimate the highest point (default: 200).
    pub elevation_offset_m: u32,

    /// Walking time in hours when no duration was recovered (default: 2.0).
    pub default_hours: f64,

    /// Closed range estimated ascents are clamped into (default: 10..=2000).
    pub ascent_clamp: RangeInclusive<u32>,

    /// Characters kept for a short description without a full stop (default: 150).
    pub short_description_chars: usize,

    /// Seed for jitter and sampled counts; `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            site_name_suffix: " - WalkHighlands".to_string(),
            placeholder_title: "Unknown Walk".to_string(),
            max_fallback_stages: 10,
            jitter: 0.1,
            default_distance_km: 5.0,
            default_ascent_m: 100,
            elevation_offset_m: 200,
            default_hours: 2.0,
            ascent_clamp: 10..=2000,
            short_description_chars: 150,
            seed: None,
        }
    }
}

impl PipelineConfig {
    /// Creates a new builder for PipelineConfig.
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::new()
    }
}

/// Builder for PipelineConfig.
pub struct PipelineConfigBuilder {
    config: PipelineConfig,
}

impl PipelineConfigBuilder {
    /// Creates a new builder with default values.
    pub fn new() -> Self {
        Self { config: PipelineConfig::default() }
    }

    /// Sets the site-name suffix stripped from titles.
    pub fn site_name_suffix(mut self, value: impl Into<String>) -> Self {
        self.config.site_name_suffix = value.into();
        self
    }

    /// Sets the placeholder title.
    pub fn placeholder_title(mut self, value: impl Into<String>) -> Self {
        self.config.placeholder_title = value.into();
        self
    }

    /// Sets the cap on paragraph-derived stages.
    pub fn max_fallback_stages(mut self, value: usize) -> Self {
        self.config.max_fallback_stages = value;
        self
    }

    /// Sets the coordinate jitter half-width.
    pub fn jitter(mut self, value: f64) -> Self {
        self.config.jitter = value.abs();
        self
    }

    /// Sets the default distance.
    pub fn default_distance_km(mut self, value: f64) -> Self {
        self.config.default_distance_km = value;
        self
    }

    /// Sets the default ascent.
    pub fn default_ascent_m(mut self, value: u32) -> Self {
        self.config.default_ascent_m = value;
        self
    }

    /// Sets the elevation offset.
    pub fn elevation_offset_m(mut self, value: u32) -> Self {
        self.config.elevation_offset_m = value;
        self
    }

    /// Sets the default walking time.
    pub fn default_hours(mut self, value: f64) -> Self {
        self.config.default_hours = value;
        self
    }

    /// Sets the ascent clamp range.
    pub fn ascent_clamp(mut self, value: RangeInclusive<u32>) -> Self {
        let (start, end) = value.into_inner();
        self.config.ascent_clamp = start.min(end)..=start.max(end);
        self
    }

    /// Sets the short-description prefix length.
    pub fn short_description_chars(mut self, value: usize) -> Self {
        self.config.short_description_chars = value;
        self
    }

    /// Fixes the random seed.
    pub fn seed(mut self, value: u64) -> Self {
        self.config.seed = Some(value);
        self
    }

    /// Builds the config.
    pub fn build(self) -> PipelineConfig {
        self.config
    }
}

impl Default for PipelineConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Settings for the batch driver.
///
/// Every field has a default, so a config file only needs the keys it
/// overrides:
///
/// ```json
/// { "batch_size": 10, "priority_keywords": ["skye", "nevis"] }
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// URLs per batch; a checkpoint is written after each (default: 15).
    pub batch_size: usize,

    /// Pause between page requests in seconds (default: 2.5).
    pub request_delay_secs: f64,

    /// Pause between batches in seconds (default: 10.0).
    pub batch_pause_secs: f64,

    /// Directory checkpoint files are written to (default: current directory).
    pub checkpoint_dir: PathBuf,

    /// URL substrings that mark high-value walks to fetch first.
    pub priority_keywords: Vec<String>,

    /// HTTP settings.
    pub fetch: FetchConfig,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batch_size: 15,
            request_delay_secs: 2.5,
            batch_pause_secs: 10.0,
            checkpoint_dir: PathBuf::from("."),
            priority_keywords: ["skye", "storr", "quiraing", "nevis", "glencoe", "ben-", "cuillin", "cairngorms", "fairy"]
                .iter()
                .map(|k| k.to_string())
                .collect(),
            fetch: FetchConfig::default(),
        }
    }
}

impl BatchConfig {
    /// Loads a batch config from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`TrailmarkError::FileNotFound`] for a missing file and
    /// [`TrailmarkError::ConfigError`] for unreadable or invalid JSON.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(TrailmarkError::FileNotFound(path.to_path_buf()));
        }
        let raw = fs::read_to_string(path)
            .map_err(|e| TrailmarkError::ConfigError(format!("{}: {}", path.display(), e)))?;
        let config: Self = serde_json::from_str(&raw)
            .map_err(|e| TrailmarkError::ConfigError(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the batch size and that both pauses are finite and non-negative.
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(TrailmarkError::ConfigError("batch_size must be at least 1".to_string()));
        }
        for (name, secs) in [("request_delay_secs", self.request_delay_secs), ("batch_pause_secs", self.batch_pause_secs)] {
            if !secs.is_finite() || secs < 0.0 {
                return Err(TrailmarkError::ConfigError(format!("{} must be a finite, non-negative number", name)));
            }
        }
        Ok(())
    }

    /// Standard config location: `<config dir>/trailmark/config.json`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("trailmark").join("config.json"))
    }

    /// Loads the config from [`BatchConfig::default_path`] when it exists,
    /// otherwise returns defaults.
    pub fn discover() -> Result<Self> {
        match Self::default_path() {
            Some(path) if path.exists() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Whether a URL matches any priority keyword (case-insensitive).
    pub fn is_priority(&self, url: &str) -> bool {
        let url = url.to_lowercase();
        self.priority_keywords.iter().any(|k| url.contains(&k.to_lowercase()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_pipeline_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.max_fallback_stages, 10);
        assert_eq!(config.default_ascent_m, 100);
        assert_eq!(config.ascent_clamp, 10..=2000);
        assert_eq!(config.seed, None);
    }

    #[test]
    fn test_pipeline_builder() {
        let config = PipelineConfig::builder()
            .site_name_suffix(" | Walks")
            .jitter(-0.2)
            .default_hours(3.0)
            .seed(7)
            .build();

        assert_eq!(config.site_name_suffix, " | Walks");
        assert_eq!(config.jitter, 0.2);
        assert_eq!(config.default_hours, 3.0);
        assert_eq!(config.seed, Some(7));
    }

    #[test]
    fn test_batch_config_partial_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"batch_size": 4, "priority_keywords": ["torridon"]}}"#).unwrap();

        let config = BatchConfig::load(file.path()).unwrap();
        assert_eq!(config.batch_size, 4);
        assert_eq!(config.request_delay_secs, 2.5);
        assert!(config.is_priority("https://www.walkhighlands.co.uk/Torridon/liathach.shtml"));
        assert!(!config.is_priority("https://www.walkhighlands.co.uk/skye/storr.shtml"));
    }

    #[test]
    fn test_batch_config_rejects_zero_batch() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"batch_size": 0}}"#).unwrap();
        assert!(matches!(BatchConfig::load(file.path()), Err(TrailmarkError::ConfigError(_))));
    }

    #[test]
    fn test_batch_config_rejects_non_finite_pause() {
        let config = BatchConfig { request_delay_secs: f64::INFINITY, ..Default::default() };
        assert!(matches!(config.validate(), Err(TrailmarkError::ConfigError(_))));

        let config = BatchConfig { batch_pause_secs: -1.0, ..Default::default() };
        assert!(matches!(config.validate(), Err(TrailmarkError::ConfigError(_))));

        assert!(BatchConfig::default().validate().is_ok());
    }

    #[test]
    fn test_ascent_clamp_reversed_range() {
        let config = PipelineConfig::builder().ascent_clamp(500..=50).build();
        assert_eq!(config.ascent_clamp, 50..=500);
    }

    #[test]
    fn test_batch_config_invalid_json() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(matches!(BatchConfig::load(file.path()), Err(TrailmarkError::ConfigError(_))));
    }

    #[test]
    fn test_batch_config_missing_file() {
        let result = BatchConfig::load(Path::new("/definitely/not/here.json"));
        assert!(matches!(result, Err(TrailmarkError::FileNotFound(_))));
    }

    #[test]
    fn test_default_priority_keywords() {
        let config = BatchConfig::default();
        assert!(config.is_priority("https://www.walkhighlands.co.uk/skye/neistpoint.shtml"));
        assert!(config.is_priority("https://www.walkhighlands.co.uk/fortwilliam/ben-nevis.shtml"));
        assert!(!config.is_priority("https://www.walkhighlands.co.uk/perthshire/birks.shtml"));
    }
}
