//! Camera controls and orbit navigation

use bevy::input::mouse::{AccumulatedMouseMotion, AccumulatedMouseScroll, MouseScrollUnit};
use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use bevy_egui::EguiContexts;
use vitrine_core::viewport::Perspective;
use vitrine_core::OrbitState;

use crate::types::{ViewerOptions, ViewerSystems, ViewportResized};

/// Pixel-unit scroll deltas per wheel notch
const PIXELS_PER_LINE: f32 = 100.0;

/// Marker component for the main camera
#[derive(Component)]
pub struct MainCamera;

/// Orbit state and projection of the main camera
#[derive(Debug, Clone, Resource)]
pub struct OrbitCamera {
    pub orbit: OrbitState,
    pub perspective: Perspective,
}

impl OrbitCamera {
    pub fn from_options(options: &ViewerOptions) -> Self {
        let camera = &options.0.camera;
        let mut orbit = OrbitState::new(camera.position, camera.target);
        orbit.enable_damping = camera.enable_damping;
        orbit.damping_factor = camera.damping_factor;
        orbit.auto_rotate = camera.auto_rotate;
        orbit.auto_rotate_speed = camera.auto_rotate_speed;
        Self {
            orbit,
            perspective: camera.perspective(),
        }
    }
}

impl FromWorld for OrbitCamera {
    fn from_world(world: &mut World) -> Self {
        let options = world.get_resource::<ViewerOptions>().cloned().unwrap_or_default();
        Self::from_options(&options)
    }
}

/// Plugin for camera controls
pub struct CameraPlugin;

impl Plugin for CameraPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<OrbitCamera>()
            .add_systems(Update, (orbit_input, apply_viewport).in_set(ViewerSystems::Input))
            .add_systems(Update, update_camera_transform.in_set(ViewerSystems::Camera));
    }
}

fn orbit_input(
    mut orbit_camera: ResMut<OrbitCamera>,
    mouse_button: Res<ButtonInput<MouseButton>>,
    mouse_motion: Res<AccumulatedMouseMotion>,
    mouse_scroll: Res<AccumulatedMouseScroll>,
    touch_input: Res<Touches>,
    windows: Query<&Window, With<PrimaryWindow>>,
    mut contexts: EguiContexts,
) {
    // Leave the pointer to the panel while it is hovered or dragged
    let egui_wants_pointer = contexts
        .ctx_mut()
        .map(|ctx| ctx.wants_pointer_input() || ctx.is_pointer_over_area())
        .unwrap_or(false);

    let height = windows.single().map(|w| w.height()).unwrap_or(1.0);
    let fov = orbit_camera.perspective.fov_radians();
    let orbit = &mut orbit_camera.orbit;

    let dragging = !egui_wants_pointer
        && (mouse_button.pressed(MouseButton::Left) || mouse_button.pressed(MouseButton::Right));
    orbit.set_interacting(dragging || touch_input.iter().next().is_some());

    if egui_wants_pointer {
        return;
    }

    let delta = mouse_motion.delta;
    if delta != Vec2::ZERO {
        if mouse_button.pressed(MouseButton::Left) {
            orbit.rotate_by_pixels(delta.x, delta.y, height);
        } else if mouse_button.pressed(MouseButton::Right) {
            orbit.pan_by_pixels(delta.x, delta.y, height, fov);
        }
    }

    let steps = match mouse_scroll.unit {
        MouseScrollUnit::Line => mouse_scroll.delta.y,
        MouseScrollUnit::Pixel => mouse_scroll.delta.y / PIXELS_PER_LINE,
    };
    if steps != 0.0 {
        orbit.zoom(steps);
    }

    let touches: Vec<_> = touch_input.iter().collect();
    match touches.as_slice() {
        [touch] => {
            let delta = touch.delta();
            if delta != Vec2::ZERO {
                orbit.rotate_by_pixels(delta.x, delta.y, height);
            }
        }
        [t1, t2] => {
            // Pinch: fingers spreading apart move the camera closer
            let current = t1.position().distance(t2.position());
            let previous = (t1.position() - t1.delta()).distance(t2.position() - t2.delta());
            if current > 1.0 && previous > 1.0 && current != previous {
                orbit.zoom((previous / current).ln() / 0.95_f32.ln());
            }
        }
        _ => {}
    }
}

fn update_camera_transform(
    time: Res<Time>,
    mut orbit_camera: ResMut<OrbitCamera>,
    mut camera_query: Query<&mut Transform, With<MainCamera>>,
) {
    let position = orbit_camera.orbit.update(time.delta_secs());
    let target = Vec3::from_array(orbit_camera.orbit.target);

    if let Ok(mut transform) = camera_query.single_mut() {
        *transform = Transform::from_translation(Vec3::from_array(position)).looking_at(target, Vec3::Y);
    }
}

/// Follow viewport changes: new aspect ratio, and a new surface size when
/// the host asks for one
fn apply_viewport(
    mut resized: MessageReader<ViewportResized>,
    mut orbit_camera: ResMut<OrbitCamera>,
    mut projections: Query<&mut Projection, With<MainCamera>>,
    mut windows: Query<&mut Window, With<PrimaryWindow>>,
) {
    let Some(last) = resized.read().last().copied() else {
        return;
    };
    let viewport = last.viewport;

    orbit_camera.perspective = orbit_camera.perspective.resized(&viewport);
    debug!(
        width = viewport.width,
        height = viewport.height,
        pixel_ratio = viewport.pixel_ratio,
        aspect = orbit_camera.perspective.aspect,
        "Viewport resized"
    );

    if let Ok(mut projection) = projections.single_mut() {
        if let Projection::Perspective(perspective) = projection.as_mut() {
            perspective.aspect_ratio = orbit_camera.perspective.aspect;
            perspective.near = orbit_camera.perspective.near;
            perspective.far = orbit_camera.perspective.far;
        }
    }

    if !last.resize_surface {
        return;
    }
    if let Ok(mut window) = windows.single_mut() {
        window.resolution.set(viewport.width, viewport.height);
        if (window.resolution.scale_factor() - viewport.pixel_ratio).abs() > f32::EPSILON {
            window.resolution.set_scale_factor_override(Some(viewport.pixel_ratio));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TypesPlugin;
    use vitrine_core::{Viewport, ViewerConfig};

    #[test]
    fn test_orbit_camera_follows_config() {
        let mut config = ViewerConfig::default();
        config.camera.auto_rotate_speed = 0.5;
        let camera = OrbitCamera::from_options(&ViewerOptions(config));
        assert!(camera.orbit.auto_rotate);
        assert_eq!(camera.orbit.auto_rotate_speed, 0.5);
        assert_eq!(camera.perspective.fov_degrees, 75.0);
        let position = camera.orbit.position();
        assert!((position[0] + 3.5).abs() < 1e-4 && (position[1] - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_viewport_message_updates_aspect_only() {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .add_plugins(TypesPlugin {
                config: ViewerConfig::default(),
            })
            .init_resource::<OrbitCamera>()
            .add_systems(Update, apply_viewport);

        let camera = app
            .world_mut()
            .spawn((
                MainCamera,
                Projection::Perspective(PerspectiveProjection {
                    fov: 75.0_f32.to_radians(),
                    near: 0.1,
                    far: 100.0,
                    ..default()
                }),
            ))
            .id();

        app.world_mut().write_message(ViewportResized {
            viewport: Viewport::from_canvas(1600.0, 900.0, 1.0, 2.0),
            resize_surface: false,
        });
        app.update();

        let orbit_camera = app.world().resource::<OrbitCamera>();
        assert_eq!(orbit_camera.perspective.aspect, 1600.0 / 900.0);
        assert_eq!(orbit_camera.perspective.near, 0.1);
        assert_eq!(orbit_camera.perspective.far, 100.0);

        let Some(Projection::Perspective(perspective)) = app.world().get::<Projection>(camera) else {
            panic!("camera lost its perspective projection");
        };
        assert_eq!(perspective.aspect_ratio, 1600.0 / 900.0);
        assert_eq!(perspective.far, 100.0);
    }
}
