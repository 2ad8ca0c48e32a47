//! Page control handling

use bevy::prelude::*;
use vitrine_core::{Controller, Effect, LightRole};

use crate::animation::Animations;
use crate::camera::OrbitCamera;
use crate::scene::to_color;
use crate::types::{ControlAction, DebugSettings, HostEffect, ViewerOptions, ViewerSystems};

/// The UI reducer, holding dark mode and helper state
#[derive(Resource, Debug, Clone)]
pub struct ControlState(pub Controller);

impl FromWorld for ControlState {
    fn from_world(world: &mut World) -> Self {
        let options = world.get_resource::<ViewerOptions>().cloned().unwrap_or_default();
        Self(Controller::new(&options.0))
    }
}

pub struct InteractionPlugin;

impl Plugin for InteractionPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ControlState>()
            .add_systems(Update, handle_control_actions.in_set(ViewerSystems::Input));
    }
}

/// Run page controls through the reducer. Scene effects are applied here,
/// page effects are forwarded to the host.
pub fn handle_control_actions(
    mut actions: MessageReader<ControlAction>,
    mut control: ResMut<ControlState>,
    mut animations: ResMut<Animations>,
    mut clear_color: ResMut<ClearColor>,
    orbit_camera: Res<OrbitCamera>,
    settings: Res<DebugSettings>,
    mut host_effects: MessageWriter<HostEffect>,
) {
    for ControlAction(action) in actions.read() {
        for effect in control.0.handle(*action) {
            match effect {
                Effect::SetBackground(color) => {
                    clear_color.0 = to_color(color);
                }
                Effect::AnimateLightX {
                    light,
                    x,
                    duration,
                    easing,
                } => {
                    let from = match light {
                        LightRole::Key => settings.0.key_light_position[0],
                        LightRole::Fill => settings.0.fill_light_position[0],
                    };
                    animations.animate_light_x(light, from, x, duration, easing);
                }
                Effect::AnimateCamera {
                    target,
                    duration,
                    easing,
                } => {
                    animations.animate_camera(orbit_camera.orbit.position(), target, duration, easing);
                }
                Effect::LogCameraPosition => {
                    let [x, y, z] = orbit_camera.orbit.position();
                    info!("Camera position: ({}, {}, {})", x, y, z);
                }
                effect @ (Effect::SetCssProperty { .. } | Effect::SetHelperVisible(_)) => {
                    host_effects.write(HostEffect(effect));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TypesPlugin;
    use bevy::ecs::message::Messages;
    use vitrine_core::{Rgb, UiAction, ViewerConfig};

    fn test_app() -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .add_plugins(TypesPlugin {
                config: ViewerConfig::default(),
            })
            .insert_resource(ClearColor(Color::WHITE))
            .init_resource::<OrbitCamera>()
            .init_resource::<Animations>()
            .init_resource::<ControlState>()
            .add_systems(Update, handle_control_actions);
        app
    }

    #[test]
    fn test_dark_mode_reaches_scene_and_host() {
        let mut app = test_app();
        app.world_mut().write_message(ControlAction(UiAction::ToggleDarkMode));
        app.update();

        let world = app.world();
        assert!(world.resource::<ControlState>().0.modes().dark_mode);
        assert_eq!(world.resource::<ClearColor>().0, to_color(Rgb::CHARCOAL));

        let animations = world.resource::<Animations>();
        assert_eq!(animations.key_light_x.target(), Some(5.0));
        assert_eq!(animations.fill_light_x.target(), Some(-5.0));
        assert!(!animations.camera.is_active());

        // Both CSS custom properties go to the page
        assert_eq!(world.resource::<Messages<HostEffect>>().len(), 2);
    }

    #[test]
    fn test_rapid_camera_clicks_keep_one_tween() {
        let mut app = test_app();
        app.world_mut().write_message(ControlAction(UiAction::SeePlaque));
        app.world_mut().write_message(ControlAction(UiAction::ResetCamera));
        app.update();

        let animations = app.world().resource::<Animations>();
        assert_eq!(animations.camera.target(), Some([-3.5, 1.0, -3.5]));
    }

    #[test]
    fn test_helper_hover_is_forwarded() {
        let mut app = test_app();
        app.world_mut().write_message(ControlAction(UiAction::ShowHelper));
        app.update();

        let messages = app.world().resource::<Messages<HostEffect>>();
        assert_eq!(messages.len(), 1);
        assert!(app.world().resource::<ControlState>().0.modes().helper_visible);
    }
}
