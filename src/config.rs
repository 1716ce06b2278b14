use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const DEFAULT_UNIT_COUNT: f64 = 5.0;
const DEFAULT_INITIAL_PICKS: f64 = 10.0;
const DEFAULT_WINDOW_SIZE: f64 = 100.0;
const DEFAULT_TRACK_LENGTH: f64 = 80.0;
const DEFAULT_TARGET_MIN: f64 = 30.0;
const DEFAULT_TARGET_MAX: f64 = 70.0;
const DEFAULT_SPEEDS: [f64; 4] = [0.8, 1.0, 1.3, 1.6];

/// Raw, possibly malformed configuration as read from disk or assembled from
/// CLI flags. Every field is optional; `Config::from_raw` fills the gaps.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RawConfig {
    pub unit_count: Option<f64>,
    pub initial_picks: Option<f64>,
    pub target_window_size: Option<f64>,
    pub speed_variants: Option<Vec<f64>>,
    pub track_length: Option<f64>,
    pub target_position_min: Option<f64>,
    pub target_position_max: Option<f64>,
}

/// Inclusive range target centers are rolled from, in percent of travel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetRange {
    pub min: f64,
    pub max: f64,
}

impl TargetRange {
    pub fn width(&self) -> f64 {
        self.max - self.min
    }
}

/// Validated game configuration; immutable once a session starts.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Number of lock units, always within [3, 5].
    pub unit_count: usize,
    /// Starting lockpick count, at least 1.
    pub initial_picks: u32,
    /// Width of the target window, in render-surface units.
    pub target_window_size: f64,
    /// Candidate indicator speeds, each within [0.5, 5]; one is sampled per
    /// engage.
    pub speed_variants: Vec<f64>,
    /// How far the indicator travels before stopping on its own, in percent.
    pub track_length: f64,
    pub target_range: TargetRange,
}

fn bounded(value: Option<f64>, lo: f64, hi: f64, default: f64) -> f64 {
    match value {
        Some(v) if v.is_finite() => v.clamp(lo, hi),
        _ => default,
    }
}

impl Config {
    /// Coerce a raw configuration into safe operating bounds. Never fails:
    /// missing, non-finite, or out-of-range fields fall back to defaults or
    /// get clamped.
    pub fn from_raw(raw: RawConfig) -> Self {
        let unit_count = bounded(raw.unit_count, 3.0, 5.0, DEFAULT_UNIT_COUNT).round() as usize;

        let initial_picks = match raw.initial_picks {
            Some(v) if v.is_finite() => v.max(1.0).round() as u32,
            _ => DEFAULT_INITIAL_PICKS as u32,
        };

        let target_window_size = bounded(raw.target_window_size, 20.0, 200.0, DEFAULT_WINDOW_SIZE);

        let speed_variants = match raw.speed_variants {
            Some(v) if !v.is_empty() => v
                .into_iter()
                .map(|s| if s.is_finite() { s.clamp(0.5, 5.0) } else { 1.0 })
                .collect(),
            _ => DEFAULT_SPEEDS.to_vec(),
        };

        let track_length = bounded(raw.track_length, 50.0, 100.0, DEFAULT_TRACK_LENGTH);

        // Min leaves room for the +10 separation so max stays within [10, 90].
        let min = bounded(raw.target_position_min, 10.0, 80.0, DEFAULT_TARGET_MIN);
        let max = bounded(raw.target_position_max, 10.0, 90.0, DEFAULT_TARGET_MAX).max(min + 10.0);

        Self {
            unit_count,
            initial_picks,
            target_window_size,
            speed_variants,
            track_length,
            target_range: TargetRange { min, max },
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_raw(RawConfig::default())
    }
}

pub trait ConfigStore {
    fn load(&self) -> RawConfig;
    fn save(&self, cfg: &RawConfig) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = if let Some(pd) = ProjectDirs::from("", "", "picklock") {
            pd.config_dir().join("config.json")
        } else {
            PathBuf::from("picklock_config.json")
        };
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> RawConfig {
        if let Ok(bytes) = fs::read(&self.path) {
            if let Ok(cfg) = serde_json::from_slice::<RawConfig>(&bytes) {
                return cfg;
            }
        }
        RawConfig::default()
    }

    fn save(&self, cfg: &RawConfig) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg).map_err(std::io::Error::from)?;
        fs::write(&self.path, data)
    }
}
