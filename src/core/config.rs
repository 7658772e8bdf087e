//! Scene configuration: profile selection, animation timing and camera bounds.
//!
//! Lookup order:
//! 1. path in the `NEO_VIEWER_CONFIG` environment variable
//! 2. `<platform config dir>/neo-viewer/scene.json`
//! 3. built-in defaults

use anyhow::Context;
use bevy::prelude::*;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::bodies::CelestialBody;

pub const CONFIG_ENV_VAR: &str = "NEO_VIEWER_CONFIG";

/// One of the three scene variants.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SceneProfile {
    /// Earth, Moon and Apophis inside a star sphere. No labels, only the Moon is pickable.
    Minimal,
    /// Earth, Moon and eight NEOs with labels. Only the Moon is pickable.
    Labeled,
    /// Labels, starfield, and every annotated body pickable with rich popups.
    #[default]
    Extended,
}

/// Decorations and behaviour implied by a profile.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProfileFeatures {
    pub labels: bool,
    pub star_sphere: bool,
    pub starfield: bool,
    pub orbit_ring: bool,
}

impl SceneProfile {
    pub fn features(self) -> ProfileFeatures {
        match self {
            SceneProfile::Minimal => ProfileFeatures {
                labels: false,
                star_sphere: true,
                starfield: false,
                orbit_ring: true,
            },
            SceneProfile::Labeled => ProfileFeatures {
                labels: true,
                star_sphere: false,
                starfield: false,
                orbit_ring: true,
            },
            SceneProfile::Extended => ProfileFeatures {
                labels: true,
                star_sphere: false,
                starfield: true,
                orbit_ring: true,
            },
        }
    }
}

/// How per-frame spin increments relate to wall-clock time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnimationTiming {
    /// Fixed increment every frame; angular speed follows the display refresh rate.
    #[default]
    PerFrame,
    /// Increment scaled by `delta_seconds * reference_fps`.
    FrameDelta { reference_fps: f32 },
}

impl AnimationTiming {
    pub fn is_valid(&self) -> bool {
        match self {
            AnimationTiming::PerFrame => true,
            AnimationTiming::FrameDelta { reference_fps } => {
                reference_fps.is_finite() && *reference_fps > 0.0
            }
        }
    }
}

/// Allowed orbit-camera distance from its focus, in world units.
#[derive(Resource, Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraBounds {
    pub min_distance: f32,
    pub max_distance: f32,
}

impl Default for CameraBounds {
    fn default() -> Self {
        Self {
            min_distance: 1.2,
            max_distance: 100.0,
        }
    }
}

impl CameraBounds {
    /// Both distances finite, positive and ordered.
    pub fn is_valid(&self) -> bool {
        self.min_distance.is_finite()
            && self.max_distance.is_finite()
            && self.min_distance > 0.0
            && self.min_distance <= self.max_distance
    }

    /// Never panics, even for bounds that fail [`CameraBounds::is_valid`]; the lower bound wins.
    pub fn clamp(&self, distance: f32) -> f32 {
        if distance.is_nan() {
            return self.min_distance;
        }
        distance.min(self.max_distance).max(self.min_distance)
    }
}

#[derive(Resource, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub profile: SceneProfile,
    pub animation: AnimationTiming,
    pub camera: CameraBounds,
    /// Overrides the profile's label setting when present.
    pub labels: Option<bool>,
    pub extra_bodies: Vec<CelestialBody>,
}

impl SceneConfig {
    /// Resolve configuration from the environment, falling back to defaults on any error.
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            info!("No scene config found; using built-in defaults");
            return Self::default();
        };

        match Self::from_file(&path) {
            Ok(config) => {
                info!("Loaded scene config from {}", path.display());
                config
            }
            Err(err) => {
                warn!("Ignoring scene config {}: {:#}", path.display(), err);
                Self::default()
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, anyhow::Error> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let config: Self = serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        Ok(config.sanitized())
    }

    /// Replace out-of-range settings with their defaults.
    pub fn sanitized(mut self) -> Self {
        if !self.camera.is_valid() {
            warn!(
                "Ignoring camera bounds [{}, {}]; using defaults",
                self.camera.min_distance, self.camera.max_distance
            );
            self.camera = CameraBounds::default();
        }
        if !self.animation.is_valid() {
            warn!("Ignoring animation timing {:?}; using per-frame", self.animation);
            self.animation = AnimationTiming::default();
        }
        self
    }

    fn config_path() -> Option<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            return Some(PathBuf::from(path));
        }
        let dirs = ProjectDirs::from("", "", "neo-viewer")?;
        let path = dirs.config_dir().join("scene.json");
        path.exists().then_some(path)
    }

    pub fn features(&self) -> ProfileFeatures {
        let mut features = self.profile.features();
        if let Some(labels) = self.labels {
            features.labels = labels;
        }
        features
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn unique_temp_file(test_name: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        std::env::temp_dir().join(format!(
            "neo-viewer-config-{}-{}-{}.json",
            test_name,
            std::process::id(),
            nanos
        ))
    }

    #[test]
    fn defaults_match_source_scene() {
        let config = SceneConfig::default();
        assert_eq!(config.profile, SceneProfile::Extended);
        assert_eq!(config.animation, AnimationTiming::PerFrame);
        assert_eq!(config.camera.min_distance, 1.2);
        assert_eq!(config.camera.max_distance, 100.0);
        assert!(config.extra_bodies.is_empty());
    }

    #[test]
    fn camera_bounds_clamp() {
        let bounds = CameraBounds::default();
        assert_eq!(bounds.clamp(0.0), 1.2);
        assert_eq!(bounds.clamp(-50.0), 1.2);
        assert_eq!(bounds.clamp(3.0), 3.0);
        assert_eq!(bounds.clamp(1.0e9), 100.0);
        assert_eq!(bounds.clamp(f32::INFINITY), 100.0);
        assert_eq!(bounds.clamp(f32::NAN), 1.2);
    }

    #[test]
    fn labels_override_profile() {
        let mut config = SceneConfig {
            profile: SceneProfile::Minimal,
            ..default()
        };
        assert!(!config.features().labels);
        config.labels = Some(true);
        assert!(config.features().labels);
        assert!(config.features().star_sphere);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let path = unique_temp_file("partial");
        fs::write(
            &path,
            r#"{ "profile": "labeled", "animation": { "frame_delta": { "reference_fps": 60.0 } } }"#,
        )
        .unwrap();

        let config = SceneConfig::from_file(&path).unwrap();
        assert_eq!(config.profile, SceneProfile::Labeled);
        assert_eq!(
            config.animation,
            AnimationTiming::FrameDelta { reference_fps: 60.0 }
        );
        assert_eq!(config.camera, CameraBounds::default());

        let _ = fs::remove_file(path);
    }

    #[test]
    fn out_of_range_settings_fall_back_to_defaults() {
        let path = unique_temp_file("inverted");
        fs::write(
            &path,
            r#"{ "profile": "minimal",
                 "camera": { "min_distance": 50.0, "max_distance": 10.0 },
                 "animation": { "frame_delta": { "reference_fps": 0.0 } } }"#,
        )
        .unwrap();

        let config = SceneConfig::from_file(&path).unwrap();
        assert_eq!(config.profile, SceneProfile::Minimal);
        assert_eq!(config.camera, CameraBounds::default());
        assert_eq!(config.animation, AnimationTiming::PerFrame);
        assert_eq!(config.camera.clamp(20.0), 20.0);

        let _ = fs::remove_file(path);
    }

    #[test]
    fn inverted_bounds_clamp_without_panicking() {
        let bounds = CameraBounds {
            min_distance: 50.0,
            max_distance: 10.0,
        };
        assert!(!bounds.is_valid());
        assert_eq!(bounds.clamp(20.0), 50.0);
        assert!(!CameraBounds {
            min_distance: 0.0,
            max_distance: 10.0
        }
        .is_valid());
        assert!(CameraBounds::default().is_valid());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let path = unique_temp_file("malformed");
        fs::write(&path, "{ not json").unwrap();
        assert!(SceneConfig::from_file(&path).is_err());
        let _ = fs::remove_file(path);

        assert!(SceneConfig::from_file(Path::new("/definitely/missing/scene.json")).is_err());
    }
}
