//! Typed debug settings and the parameters exposed on the panel
//!
//! The panel never holds references into scene objects. It reads
//! [`ViewerSettings`], emits a [`ParamChange`] when the user moves a control,
//! and the application applies the change with [`ViewerSettings::apply`].

use serde::{Deserialize, Serialize};
use std::f32::consts::PI;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SettingsError {
    #[error("parameter {id:?} expects a {expected} value")]
    WrongKind { id: ParamId, expected: &'static str },
}

/// Tone mapping operators offered on the panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToneMapping {
    None,
    Linear,
    Reinhard,
    Cineon,
    #[default]
    AcesFilmic,
}

impl ToneMapping {
    pub const ALL: [ToneMapping; 5] = [
        ToneMapping::None,
        ToneMapping::Linear,
        ToneMapping::Reinhard,
        ToneMapping::Cineon,
        ToneMapping::AcesFilmic,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ToneMapping::None => "No",
            ToneMapping::Linear => "Linear",
            ToneMapping::Reinhard => "Reinhard",
            ToneMapping::Cineon => "Cineon",
            ToneMapping::AcesFilmic => "ACESFilmic",
        }
    }
}

/// Every tunable the debug panel can touch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamId {
    EnvMapIntensity,
    AmbientIntensity,
    KeyLightIntensity,
    KeyLightX,
    KeyLightY,
    KeyLightZ,
    ToneMapping,
    ModelRotationY,
}

/// Range, step and label of a numeric parameter
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumericSpec {
    pub label: &'static str,
    pub min: f32,
    pub max: f32,
    pub step: f32,
}

impl NumericSpec {
    const fn new(label: &'static str, min: f32, max: f32, step: f32) -> Self {
        Self { label, min, max, step }
    }

    /// Snap to the step grid, then clamp into range
    pub fn constrain(&self, value: f32) -> f32 {
        snap(value, self.step).clamp(self.min, self.max)
    }
}

/// Round `value` to a multiple of `step`. Decimal steps (0.001, 0.1, ...)
/// round through their reciprocal so 2.5 stays exactly 2.5.
fn snap(value: f32, step: f32) -> f32 {
    if step <= 0.0 {
        return value;
    }
    let step = f64::from(step);
    let reciprocal = 1.0 / step;
    let whole = reciprocal.round();
    let snapped = if whole >= 1.0 && (reciprocal - whole).abs() < 1e-6 * whole {
        (f64::from(value) * whole).round() / whole
    } else {
        (f64::from(value) / step).round() * step
    };
    snapped as f32
}

impl ParamId {
    /// Panel order, without the model rotation
    pub const SCENE: [ParamId; 7] = [
        ParamId::EnvMapIntensity,
        ParamId::AmbientIntensity,
        ParamId::KeyLightIntensity,
        ParamId::KeyLightX,
        ParamId::KeyLightY,
        ParamId::KeyLightZ,
        ParamId::ToneMapping,
    ];

    /// Parameters shown on the panel. The model rotation is appended once a
    /// model is attached.
    pub fn panel_order(model_loaded: bool) -> Vec<ParamId> {
        let mut ids = Self::SCENE.to_vec();
        if model_loaded {
            ids.push(ParamId::ModelRotationY);
        }
        ids
    }

    pub fn label(self) -> &'static str {
        match self.numeric_spec() {
            Some(spec) => spec.label,
            None => "Tone mapping",
        }
    }

    /// `None` for enumerated parameters
    pub fn numeric_spec(self) -> Option<NumericSpec> {
        let intensity = |label| NumericSpec::new(label, 0.0, 10.0, 0.001);
        let light_axis = |label| NumericSpec::new(label, -5.0, 5.0, 0.001);
        match self {
            ParamId::EnvMapIntensity => Some(intensity("Intensité environnement")),
            ParamId::AmbientIntensity => Some(intensity("Intensité ambiante")),
            ParamId::KeyLightIntensity => Some(intensity("Intensité directionnelle")),
            ParamId::KeyLightX => Some(light_axis("Lumière X")),
            ParamId::KeyLightY => Some(light_axis("Lumière Y")),
            ParamId::KeyLightZ => Some(light_axis("Lumière Z")),
            ParamId::ModelRotationY => {
                Some(NumericSpec::new("Helmet : rotation Y", -PI, PI, 0.001))
            }
            ParamId::ToneMapping => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Number(f32),
    ToneMapping(ToneMapping),
}

/// A single edit coming from the panel
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamChange {
    pub id: ParamId,
    pub value: ParamValue,
}

impl ParamChange {
    pub fn number(id: ParamId, value: f32) -> Self {
        Self { id, value: ParamValue::Number(value) }
    }

    pub fn tone_mapping(value: ToneMapping) -> Self {
        Self { id: ParamId::ToneMapping, value: ParamValue::ToneMapping(value) }
    }
}

/// What applying a change requires from the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChangeOutcome {
    pub changed: bool,
    pub refresh_materials: bool,
}

/// Everything the debug panel tunes, plus the fill light which only the
/// theme animation moves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerSettings {
    pub env_map_intensity: f32,
    pub ambient_intensity: f32,
    pub key_light_intensity: f32,
    pub key_light_position: [f32; 3],
    pub fill_light_intensity: f32,
    pub fill_light_position: [f32; 3],
    pub tone_mapping: ToneMapping,
    pub model_rotation_y: f32,
}

impl Default for ViewerSettings {
    fn default() -> Self {
        Self {
            env_map_intensity: 5.0,
            ambient_intensity: 0.3,
            key_light_intensity: 8.0,
            key_light_position: [-5.0, 2.0, -0.7],
            fill_light_intensity: 1.0,
            fill_light_position: [5.0, 2.0, -0.7],
            tone_mapping: ToneMapping::AcesFilmic,
            model_rotation_y: 0.0,
        }
    }
}

impl ViewerSettings {
    pub fn get(&self, id: ParamId) -> ParamValue {
        match id {
            ParamId::EnvMapIntensity => ParamValue::Number(self.env_map_intensity),
            ParamId::AmbientIntensity => ParamValue::Number(self.ambient_intensity),
            ParamId::KeyLightIntensity => ParamValue::Number(self.key_light_intensity),
            ParamId::KeyLightX => ParamValue::Number(self.key_light_position[0]),
            ParamId::KeyLightY => ParamValue::Number(self.key_light_position[1]),
            ParamId::KeyLightZ => ParamValue::Number(self.key_light_position[2]),
            ParamId::ModelRotationY => ParamValue::Number(self.model_rotation_y),
            ParamId::ToneMapping => ParamValue::ToneMapping(self.tone_mapping),
        }
    }

    fn number_mut(&mut self, id: ParamId) -> Option<&mut f32> {
        match id {
            ParamId::EnvMapIntensity => Some(&mut self.env_map_intensity),
            ParamId::AmbientIntensity => Some(&mut self.ambient_intensity),
            ParamId::KeyLightIntensity => Some(&mut self.key_light_intensity),
            ParamId::KeyLightX => Some(&mut self.key_light_position[0]),
            ParamId::KeyLightY => Some(&mut self.key_light_position[1]),
            ParamId::KeyLightZ => Some(&mut self.key_light_position[2]),
            ParamId::ModelRotationY => Some(&mut self.model_rotation_y),
            ParamId::ToneMapping => None,
        }
    }

    /// Apply a panel edit. Numbers are snapped to the parameter's step and
    /// clamped to its range.
    pub fn apply(&mut self, change: ParamChange) -> Result<ChangeOutcome, SettingsError> {
        let changed = match (change.id, change.value) {
            (ParamId::ToneMapping, ParamValue::ToneMapping(mode)) => {
                let changed = self.tone_mapping != mode;
                self.tone_mapping = mode;
                changed
            }
            (ParamId::ToneMapping, ParamValue::Number(_)) => {
                return Err(SettingsError::WrongKind {
                    id: change.id,
                    expected: "tone mapping",
                });
            }
            (id, ParamValue::Number(value)) => {
                let constrained = match id.numeric_spec() {
                    Some(spec) => spec.constrain(value),
                    None => value,
                };
                match self.number_mut(id) {
                    Some(slot) => {
                        let changed = *slot != constrained;
                        *slot = constrained;
                        changed
                    }
                    None => false,
                }
            }
            (id, ParamValue::ToneMapping(_)) => {
                return Err(SettingsError::WrongKind { id, expected: "numeric" });
            }
        };

        Ok(ChangeOutcome {
            changed,
            refresh_materials: changed && change.id == ParamId::EnvMapIntensity,
        })
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_bootstrap_values() {
        let s = ViewerSettings::default();
        assert_eq!(s.env_map_intensity, 5.0);
        assert_eq!(s.key_light_position, [-5.0, 2.0, -0.7]);
        assert_eq!(s.fill_light_position, [5.0, 2.0, -0.7]);
        assert_eq!(s.tone_mapping, ToneMapping::AcesFilmic);
    }

    #[test]
    fn test_only_env_intensity_requests_refresh() {
        let mut s = ViewerSettings::default();

        let outcome = s.apply(ParamChange::number(ParamId::EnvMapIntensity, 2.5)).unwrap();
        assert!(outcome.changed);
        assert!(outcome.refresh_materials);
        assert_eq!(s.env_map_intensity, 2.5);

        let outcome = s.apply(ParamChange::number(ParamId::AmbientIntensity, 1.0)).unwrap();
        assert!(outcome.changed);
        assert!(!outcome.refresh_materials);

        // Same value again is not a change, so no refresh either
        let outcome = s.apply(ParamChange::number(ParamId::EnvMapIntensity, 2.5)).unwrap();
        assert_eq!(outcome, ChangeOutcome::default());
    }

    #[test]
    fn test_values_are_clamped_to_range() {
        let mut s = ViewerSettings::default();
        s.apply(ParamChange::number(ParamId::KeyLightX, 42.0)).unwrap();
        assert_eq!(s.key_light_position[0], 5.0);
        s.apply(ParamChange::number(ParamId::EnvMapIntensity, -3.0)).unwrap();
        assert_eq!(s.env_map_intensity, 0.0);
        s.apply(ParamChange::number(ParamId::ModelRotationY, 10.0)).unwrap();
        assert_eq!(s.model_rotation_y, PI);
    }

    #[test]
    fn test_values_are_snapped_to_step() {
        let mut s = ViewerSettings::default();
        s.apply(ParamChange::number(ParamId::KeyLightY, 1.23456)).unwrap();
        assert!((s.key_light_position[1] - 1.235).abs() < 1e-5);
    }

    #[test]
    fn test_wrong_kind_is_rejected() {
        let mut s = ViewerSettings::default();
        let err = s.apply(ParamChange {
            id: ParamId::ToneMapping,
            value: ParamValue::Number(1.0),
        });
        assert!(matches!(err, Err(SettingsError::WrongKind { .. })));

        let err = s.apply(ParamChange {
            id: ParamId::AmbientIntensity,
            value: ParamValue::ToneMapping(ToneMapping::Linear),
        });
        assert!(err.is_err());
        assert_eq!(s, ViewerSettings::default());
    }

    #[test]
    fn test_tone_mapping_change() {
        let mut s = ViewerSettings::default();
        let outcome = s.apply(ParamChange::tone_mapping(ToneMapping::Reinhard)).unwrap();
        assert!(outcome.changed);
        assert!(!outcome.refresh_materials);
        assert_eq!(s.get(ParamId::ToneMapping), ParamValue::ToneMapping(ToneMapping::Reinhard));
    }

    #[test]
    fn test_panel_order_adds_rotation_after_load() {
        assert!(!ParamId::panel_order(false).contains(&ParamId::ModelRotationY));
        let loaded = ParamId::panel_order(true);
        assert_eq!(loaded.len(), 8);
        assert_eq!(loaded[..7], ParamId::SCENE);
        assert_eq!(loaded.last(), Some(&ParamId::ModelRotationY));
    }

    #[test]
    fn test_settings_export_as_json() {
        let json = ViewerSettings::default().to_json().unwrap();
        assert!(json.contains("\"tone_mapping\": \"aces_filmic\""));
        let back: ViewerSettings = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ViewerSettings::default());
    }
}
