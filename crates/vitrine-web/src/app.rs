//! Bevy application setup

use anyhow::Result;
use bevy::asset::AssetMetaCheck;
use bevy::prelude::*;
use bevy_egui::EguiPlugin;
use bevy_picking::DefaultPickingPlugins;
use vitrine_core::ViewerConfig;
use vitrine_scene::VitrineScenePlugin;

use crate::host::HostPlugin;

/// Run the Bevy application on the web, with the built-in configuration
#[cfg(target_arch = "wasm32")]
pub fn run() -> Result<()> {
    let mut config = ViewerConfig::default();
    if let Some(model) = crate::dom::model_override() {
        info!("Loading model from URL parameter: {}", model);
        config.model.path = model;
    }
    run_with(config)
}

/// Run the Bevy application from a configuration file, or the defaults when
/// it does not exist
#[cfg(not(target_arch = "wasm32"))]
pub fn run_native(config_path: &std::path::Path) -> Result<()> {
    use anyhow::Context;

    let config = vitrine_core::config::load_config(config_path)
        .with_context(|| format!("Failed to load configuration from {}", config_path.display()))?;
    run_with(config)
}

/// Write the default configuration to `path`, refusing to overwrite an
/// existing file
#[cfg(not(target_arch = "wasm32"))]
pub fn write_default_config(path: &std::path::Path) -> Result<()> {
    use anyhow::Context;

    if path.exists() {
        anyhow::bail!("{} already exists", path.display());
    }
    vitrine_core::config::save_default_config(path)
        .with_context(|| format!("Failed to write default configuration to {}", path.display()))
}

fn run_with(config: ViewerConfig) -> Result<()> {
    match build_app(config).run() {
        AppExit::Success => Ok(()),
        AppExit::Error(code) => anyhow::bail!("Viewer exited with code {}", code),
    }
}

fn asset_root() -> String {
    if cfg!(target_arch = "wasm32") {
        // Models are served next to the page
        String::new()
    } else {
        "assets".to_string()
    }
}

pub fn build_app(config: ViewerConfig) -> App {
    let mut app = App::new();
    let plugins = DefaultPlugins
        .set(WindowPlugin {
            primary_window: Some(Window {
                title: "Vitrine".to_string(),
                canvas: Some("canvas.webgl".to_string()),
                prevent_default_event_handling: false,
                ..default()
            }),
            ..default()
        })
        .set(AssetPlugin {
            file_path: asset_root(),
            // Don't look for .meta files - the static server doesn't have them
            meta_check: AssetMetaCheck::Never,
            ..default()
        });

    // tracing-wasm is already installed as the global subscriber on the web
    #[cfg(target_arch = "wasm32")]
    let plugins = plugins.disable::<bevy::log::LogPlugin>();

    app.add_plugins(plugins)
        // Picking must come before EguiPlugin so it can detect PickingPlugin
        .add_plugins(DefaultPickingPlugins)
        .add_plugins(EguiPlugin::default())
        .add_plugins(VitrineScenePlugin { config })
        .add_plugins(HostPlugin);
    app
}
