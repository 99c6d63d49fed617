//! Engine configuration.
//!
//! | Field              | Purpose |
//! |--------------------|---------|
//! | `collect_step_secs`| Fixed clock step while collecting, also the kinematics time step |
//! | `initial_time_warp`| Starting multiplier for wall-clock increments while warping |
//! | `reference`        | Time-base character (first loaded when `None`) |
//! | `gating`           | Which characters must finish a loop before warping starts |
//! | `magnitude`        | Displacement magnitude formula used by the kinematics pass |
//! | `sample_capacity`  | Samples reserved per trajectory store |
//! | `marker`           | Visualization marker cadence |
//! | `characters`       | Synthetic characters to load (viewer / demos) |

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::data::characters::CharacterId;
use crate::data::kinematics::MagnitudeMode;
use crate::data::playback::GatingPolicy;
use crate::data::trajectory::DEFAULT_SAMPLE_CAPACITY;
use crate::error::{SyncError, SyncResult};
use crate::motion::synthetic::GaitParams;

// ─────────────────────────────────────────────────────────────────────────────
// Markers
// ─────────────────────────────────────────────────────────────────────────────

/// Cadence and appearance of the marker events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkerConfig {
    pub enabled: bool,
    pub interval_secs: f64,
    /// No markers once the elapsed time passes this.
    pub window_end_secs: f64,
    pub color: [f32; 3],
}

impl Default for MarkerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: 0.1,
            window_end_secs: 20.0,
            color: [0.8, 0.3, 0.3],
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Characters
// ─────────────────────────────────────────────────────────────────────────────

/// A character described in the config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterSpec {
    pub id: CharacterId,
    /// Bone tracked for sync-frame detection.
    pub tracked_point: String,
    #[serde(default = "default_character_color")]
    pub color: [f32; 3],
    /// Procedural gait. `None` uses [`GaitParams::default`].
    #[serde(default)]
    pub gait: Option<GaitParams>,
}

fn default_character_color() -> [f32; 3] {
    [0.3, 0.6, 0.9]
}

impl CharacterSpec {
    pub fn new<I: Into<CharacterId>, S: Into<String>>(id: I, tracked_point: S) -> Self {
        Self {
            id: id.into(),
            tracked_point: tracked_point.into(),
            color: default_character_color(),
            gait: None,
        }
    }

    pub fn with_gait(mut self, gait: GaitParams) -> Self {
        self.gait = Some(gait);
        self
    }

    pub fn with_color(mut self, color: [f32; 3]) -> Self {
        self.color = color;
        self
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// SyncConfig
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    pub collect_step_secs: f64,
    pub initial_time_warp: f64,
    pub reference: Option<CharacterId>,
    pub gating: GatingPolicy,
    pub magnitude: MagnitudeMode,
    pub sample_capacity: usize,
    pub marker: MarkerConfig,
    pub characters: Vec<CharacterSpec>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            collect_step_secs: 1.0 / 120.0,
            initial_time_warp: 1.0,
            reference: None,
            gating: GatingPolicy::default(),
            magnitude: MagnitudeMode::default(),
            sample_capacity: DEFAULT_SAMPLE_CAPACITY,
            marker: MarkerConfig::default(),
            characters: Vec::new(),
        }
    }
}

impl SyncConfig {
    /// Load from a `.yaml`/`.yml` or `.json` file and validate.
    pub fn load<P: AsRef<Path>>(path: P) -> SyncResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        let cfg: SyncConfig = match ext.as_str() {
            "yaml" | "yml" => serde_yaml::from_str(&text)?,
            "json" => serde_json::from_str(&text)?,
            other => {
                return Err(SyncError::Config(format!(
                    "unsupported config extension '{}' ({})",
                    other,
                    path.display()
                )))
            }
        };
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> SyncResult<()> {
        let path = path.as_ref();
        if let Some(dir) = path.parent() {
            if !dir.as_os_str().is_empty() {
                std::fs::create_dir_all(dir)?;
            }
        }
        let text = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => serde_json::to_string_pretty(self)?,
            _ => self.to_yaml()?,
        };
        std::fs::write(path, text)?;
        Ok(())
    }

    pub fn to_yaml(&self) -> SyncResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn validate(&self) -> SyncResult<()> {
        if !(self.collect_step_secs > 0.0) || !self.collect_step_secs.is_finite() {
            return Err(SyncError::Config(format!(
                "collect_step_secs must be positive, got {}",
                self.collect_step_secs
            )));
        }
        if !(self.initial_time_warp > 0.0) || !self.initial_time_warp.is_finite() {
            return Err(SyncError::Config(format!(
                "initial_time_warp must be positive, got {}",
                self.initial_time_warp
            )));
        }
        if self.marker.enabled && !(self.marker.interval_secs > 0.0) {
            return Err(SyncError::Config(format!(
                "marker.interval_secs must be positive, got {}",
                self.marker.interval_secs
            )));
        }
        if self.sample_capacity == 0 {
            return Err(SyncError::Config("sample_capacity must be non-zero".to_string()));
        }

        let mut seen = HashSet::new();
        for spec in &self.characters {
            if !seen.insert(&spec.id) {
                return Err(SyncError::DuplicateCharacter(spec.id.to_string()));
            }
            if spec.tracked_point.is_empty() {
                return Err(SyncError::Config(format!(
                    "character '{}' has an empty tracked_point",
                    spec.id
                )));
            }
        }
        if !self.characters.is_empty() {
            if let Some(reference) = &self.reference {
                if !seen.contains(reference) {
                    return Err(SyncError::UnknownCharacter(reference.to_string()));
                }
            }
            if let GatingPolicy::Character(id) = &self.gating {
                if !seen.contains(id) {
                    return Err(SyncError::UnknownCharacter(id.to_string()));
                }
            }
        }
        Ok(())
    }

    /// Three walkers with different cadence, used by the viewer when no file is given.
    pub fn demo() -> Self {
        Self {
            characters: vec![
                CharacterSpec::new("walker", "LeftToeBase")
                    .with_color([0.90, 0.45, 0.20])
                    .with_gait(GaitParams::default().with_period(1.0)),
                CharacterSpec::new("hurried", "ltoes")
                    .with_color([0.25, 0.70, 0.35])
                    .with_gait(GaitParams::default().with_period(0.8).with_strides(4)),
                CharacterSpec::new("stroller", "LeftToe")
                    .with_color([0.30, 0.55, 0.95])
                    .with_gait(GaitParams::default().with_period(1.2).with_phase(0.25)),
            ],
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        assert!(SyncConfig::default().validate().is_ok());
        assert!(SyncConfig::demo().validate().is_ok());
    }

    #[test]
    fn rejects_non_positive_step() {
        let cfg = SyncConfig {
            collect_step_secs: 0.0,
            ..SyncConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(SyncError::Config(_))));
    }

    #[test]
    fn rejects_duplicate_ids() {
        let mut cfg = SyncConfig::demo();
        cfg.characters.push(CharacterSpec::new("walker", "Toe"));
        assert!(matches!(
            cfg.validate(),
            Err(SyncError::DuplicateCharacter(id)) if id == "walker"
        ));
    }

    #[test]
    fn rejects_unknown_reference() {
        let cfg = SyncConfig {
            reference: Some(CharacterId::from("ghost")),
            ..SyncConfig::demo()
        };
        assert!(matches!(cfg.validate(), Err(SyncError::UnknownCharacter(_))));
    }

    #[test]
    fn yaml_uses_defaults_for_missing_fields() {
        let cfg: SyncConfig = serde_yaml::from_str(
            "initial_time_warp: 2.0\ngating: all_except_reference\n",
        )
        .unwrap();
        assert_eq!(cfg.initial_time_warp, 2.0);
        assert_eq!(cfg.gating, GatingPolicy::AllExceptReference);
        assert!((cfg.collect_step_secs - 1.0 / 120.0).abs() < 1e-12);
        assert_eq!(cfg.marker, MarkerConfig::default());
    }
}
