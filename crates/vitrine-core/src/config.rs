//! Viewer configuration loading and validation

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

use crate::settings::ViewerSettings;
use crate::theme::{Rgb, ThemePalette};
use crate::tween::Easing;
use crate::viewport::Perspective;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    SerializeError(#[from] toml::ser::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ViewerConfig {
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub scene: SceneConfig,
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default)]
    pub lights: LightsConfig,
    /// Initial values of the debug panel
    #[serde(default)]
    pub settings: ViewerSettings,
    #[serde(default)]
    pub presets: PresetsConfig,
    #[serde(default)]
    pub themes: ThemesConfig,
    #[serde(default)]
    pub animation: AnimationConfig,
    /// Optional image-based lighting
    #[serde(default)]
    pub environment: Option<EnvironmentConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// glTF asset, relative to the served root or an absolute http(s) URL
    #[serde(default = "default_model_path")]
    pub path: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: default_model_path(),
        }
    }
}

fn default_model_path() -> String {
    "models-3d/rhino/rhino-scaled.gltf".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneConfig {
    #[serde(default = "default_background")]
    pub background: Rgb,
    /// Edge length of the square ground plane
    #[serde(default = "default_floor_size")]
    pub floor_size: f32,
    /// Darkness of the shadows the floor catches
    #[serde(default = "default_floor_opacity")]
    pub floor_opacity: f32,
    #[serde(default = "default_shadow_map_size")]
    pub shadow_map_size: u32,
    /// Farthest distance the key light's shadows reach
    #[serde(default = "default_shadow_far")]
    pub shadow_far: f32,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            background: default_background(),
            floor_size: default_floor_size(),
            floor_opacity: default_floor_opacity(),
            shadow_map_size: default_shadow_map_size(),
            shadow_far: default_shadow_far(),
        }
    }
}

fn default_background() -> Rgb {
    Rgb::WHITE
}

fn default_floor_size() -> f32 {
    2000.0
}

fn default_floor_opacity() -> f32 {
    0.06
}

fn default_shadow_map_size() -> u32 {
    1024
}

fn default_shadow_far() -> f32 {
    40.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub position: [f32; 3],
    pub target: [f32; 3],
    /// Vertical field of view
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub enable_damping: bool,
    pub damping_factor: f32,
    pub auto_rotate: bool,
    pub auto_rotate_speed: f32,
    /// Share of the window width the canvas occupies after a resize
    pub viewport_width_fraction: f32,
    pub max_pixel_ratio: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: [-3.5, 1.0, -3.5],
            target: [0.0, 0.0, 0.0],
            fov_degrees: 75.0,
            near: 0.1,
            far: 100.0,
            enable_damping: true,
            damping_factor: 0.05,
            auto_rotate: true,
            auto_rotate_speed: 0.1,
            viewport_width_fraction: 0.9,
            max_pixel_ratio: 2.0,
        }
    }
}

impl CameraConfig {
    /// Projection before the first resize; the aspect is fixed up once the
    /// viewport is known.
    pub fn perspective(&self) -> Perspective {
        Perspective::new(self.fov_degrees, 1.0, self.near, self.far)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightsConfig {
    pub key_color: Rgb,
    pub fill_color: Rgb,
    pub ambient_color: Rgb,
    /// Engine illuminance (lux) per unit of panel intensity
    pub illuminance_per_unit: f32,
    /// Engine ambient brightness per unit of panel intensity
    pub ambient_brightness_per_unit: f32,
}

impl Default for LightsConfig {
    fn default() -> Self {
        Self {
            key_color: Rgb::WHITE,
            fill_color: Rgb::WHITE,
            ambient_color: Rgb::WHITE,
            illuminance_per_unit: 1000.0,
            ambient_brightness_per_unit: 500.0,
        }
    }
}

/// Camera positions the page buttons fly to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PresetsConfig {
    pub home: [f32; 3],
    pub plaque: [f32; 3],
}

impl Default for PresetsConfig {
    fn default() -> Self {
        Self {
            home: [-3.5, 1.0, -3.5],
            plaque: [-0.0891468593121543, 0.6074576004433101, 2.6611596870724576],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThemesConfig {
    #[serde(default = "ThemePalette::day")]
    pub day: ThemePalette,
    #[serde(default = "ThemePalette::night")]
    pub night: ThemePalette,
}

impl Default for ThemesConfig {
    fn default() -> Self {
        Self {
            day: ThemePalette::day(),
            night: ThemePalette::night(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    pub duration_secs: f32,
    pub easing: Easing,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            duration_secs: 1.0,
            easing: Easing::QuadOut,
        }
    }
}

impl AnimationConfig {
    pub fn duration(&self) -> Duration {
        Duration::try_from_secs_f32(self.duration_secs).unwrap_or(Duration::from_secs(1))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentConfig {
    /// Diffuse cube map (KTX2)
    pub diffuse_map: String,
    /// Specular cube map (KTX2)
    pub specular_map: String,
    /// Engine intensity per unit of the panel's environment intensity
    #[serde(default = "default_environment_scale")]
    pub intensity_scale: f32,
}

fn default_environment_scale() -> f32 {
    100.0
}

impl ViewerConfig {
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: ViewerConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Reject values the renderer cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let camera = &self.camera;
        if !(camera.near > 0.0 && camera.near < camera.far) {
            return Err(ConfigError::Invalid(format!(
                "camera near ({}) must be positive and below far ({})",
                camera.near, camera.far
            )));
        }
        if !(camera.fov_degrees > 0.0 && camera.fov_degrees < 180.0) {
            return Err(ConfigError::Invalid(format!(
                "camera fov_degrees ({}) must be within (0, 180)",
                camera.fov_degrees
            )));
        }
        if !(camera.viewport_width_fraction > 0.0 && camera.viewport_width_fraction <= 1.0) {
            return Err(ConfigError::Invalid(format!(
                "camera viewport_width_fraction ({}) must be within (0, 1]",
                camera.viewport_width_fraction
            )));
        }
        if !(camera.max_pixel_ratio > 0.0) {
            return Err(ConfigError::Invalid("camera max_pixel_ratio must be positive".to_string()));
        }
        if !(camera.damping_factor > 0.0 && camera.damping_factor <= 1.0) {
            return Err(ConfigError::Invalid(format!(
                "camera damping_factor ({}) must be within (0, 1]",
                camera.damping_factor
            )));
        }
        if !(self.animation.duration_secs.is_finite() && self.animation.duration_secs > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "animation duration_secs ({}) must be positive",
                self.animation.duration_secs
            )));
        }
        if !(0.0..=1.0).contains(&self.scene.floor_opacity) {
            return Err(ConfigError::Invalid(format!(
                "scene floor_opacity ({}) must be within [0, 1]",
                self.scene.floor_opacity
            )));
        }
        if self.model.path.trim().is_empty() {
            return Err(ConfigError::Invalid("model path is empty".to_string()));
        }
        Ok(())
    }
}

/// Load configuration from file, falling back to defaults when it is absent
pub fn load_config(path: &Path) -> Result<ViewerConfig, ConfigError> {
    if path.exists() {
        let content = std::fs::read_to_string(path)?;
        let config = ViewerConfig::from_toml(&content)?;
        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    } else {
        info!(
            path = %path.display(),
            "Configuration file not found, using defaults"
        );
        Ok(ViewerConfig::default())
    }
}

/// Save default configuration to file
pub fn save_default_config(path: &Path) -> Result<(), ConfigError> {
    let content = ViewerConfig::default().to_toml()?;
    std::fs::write(path, content)?;
    Ok(())
}
