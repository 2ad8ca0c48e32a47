//! Shared resources and messages

use bevy::prelude::*;
use vitrine_core::{Effect, ParamChange, UiAction, ViewerConfig, ViewerSettings, Viewport};

/// Configuration the viewer was started with
#[derive(Debug, Clone, Resource, Default)]
pub struct ViewerOptions(pub ViewerConfig);

/// Live values behind the debug panel
#[derive(Debug, Clone, Resource, Default)]
pub struct DebugSettings(pub ViewerSettings);

/// A debug panel edit, applied to [`DebugSettings`] by the scene
#[derive(Message, Debug, Clone)]
pub struct ParamChanged(pub ParamChange);

/// Request a material refresh pass over every mesh surface
#[derive(Message, Debug, Clone, Copy, Default)]
pub struct RefreshMaterials;

/// The model's glTF finished loading and its scene is ready to attach
#[derive(Message, Debug, Clone)]
pub struct ModelLoaded {
    pub scene: Handle<Scene>,
    pub path: String,
}

/// A page control was used
#[derive(Message, Debug, Clone, Copy)]
pub struct ControlAction(pub UiAction);

/// An effect only the host page can apply (CSS properties, overlays)
#[derive(Message, Debug, Clone)]
pub struct HostEffect(pub Effect);

/// The host wants the viewport recomputed from its current size
#[derive(Message, Debug, Clone, Copy, Default)]
pub struct ResizeRequested;

/// New viewport size. `resize_surface` is false when the window system has
/// already resized the surface and only the camera needs to follow.
#[derive(Message, Debug, Clone, Copy)]
pub struct ViewportResized {
    pub viewport: Viewport,
    pub resize_surface: bool,
}

/// Frame phases of the viewer, run in this order during `Update`
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewerSystems {
    /// Host events, panel edits and pointer input
    Input,
    /// Tweens write their current values
    Animate,
    /// Orbit damping and the camera transform
    Camera,
}

/// Registers the shared resources and messages
pub struct TypesPlugin {
    pub config: ViewerConfig,
}

impl Plugin for TypesPlugin {
    fn build(&self, app: &mut App) {
        app.configure_sets(
            Update,
            (ViewerSystems::Input, ViewerSystems::Animate, ViewerSystems::Camera).chain(),
        )
        .insert_resource(DebugSettings(self.config.settings.clone()))
        .insert_resource(ViewerOptions(self.config.clone()))
        .add_message::<ParamChanged>()
        .add_message::<RefreshMaterials>()
        .add_message::<ModelLoaded>()
        .add_message::<ControlAction>()
        .add_message::<HostEffect>()
        .add_message::<ResizeRequested>()
        .add_message::<ViewportResized>();
    }
}
