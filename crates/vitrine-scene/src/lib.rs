//! Vitrine Scene - Bevy rendering for the product viewer
//!
//! Builds the showcase scene (floor, lights, camera), loads the glTF model,
//! keeps materials in sync with the debug settings, runs the camera tweens
//! and draws the egui debug panel. Host-specific glue (DOM, keyboard) lives
//! in `vitrine-web` and talks to this crate through messages.

pub mod animation;
pub mod camera;
pub mod interaction;
pub mod materials;
pub mod models;
pub mod panel;
pub mod scene;
pub mod types;

use bevy::prelude::*;
use vitrine_core::ViewerConfig;

/// Plugin that sets up the whole viewer scene
pub struct VitrineScenePlugin {
    pub config: ViewerConfig,
}

impl Plugin for VitrineScenePlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(types::TypesPlugin {
            config: self.config.clone(),
        })
        .add_plugins(scene::SceneSetupPlugin)
        .add_plugins(camera::CameraPlugin)
        .add_plugins(models::ModelsPlugin)
        .add_plugins(materials::MaterialsPlugin)
        .add_plugins(animation::AnimationPlugin)
        .add_plugins(interaction::InteractionPlugin)
        .add_plugins(panel::PanelPlugin);
    }
}

pub use camera::{MainCamera, OrbitCamera};
pub use types::*;
