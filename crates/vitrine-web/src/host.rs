//! Bridge between the host (page or native window) and the scene
//!
//! DOM callbacks never touch the ECS world. They push [`HostEvent`]s into a
//! shared [`HostQueue`] that a system drains once per frame.

use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use vitrine_core::{HostSize, UiAction, Viewport};
use vitrine_scene::interaction::handle_control_actions;
use vitrine_scene::{ControlAction, HostEffect, ResizeRequested, ViewerOptions, ViewerSystems, ViewportResized};

/// Something that happened on the host side
#[derive(Debug, Clone, PartialEq)]
pub enum HostEvent {
    Action(UiAction),
    /// Window resized or finished loading, with its new size
    Resized(HostSize),
}

/// Events pushed from host callbacks, drained by [`drain_host_events`]
#[derive(Resource, Clone, Default)]
pub struct HostQueue(pub Arc<Mutex<VecDeque<HostEvent>>>);

impl HostQueue {
    /// Lock the queue. A callback that panicked while holding the lock
    /// leaves the events intact, so keep using them.
    fn lock(&self) -> MutexGuard<'_, VecDeque<HostEvent>> {
        self.0.lock().unwrap_or_else(|poisoned| {
            warn!("Host event queue poisoned, recovering");
            poisoned.into_inner()
        })
    }

    pub fn push(&self, event: HostEvent) {
        self.lock().push_back(event);
    }

    pub fn drain(&self) -> Vec<HostEvent> {
        self.lock().drain(..).collect()
    }
}

pub struct HostPlugin;

impl Plugin for HostPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<HostQueue>()
            .add_systems(Startup, install_host)
            .add_systems(
                Update,
                (
                    drain_host_events.before(handle_control_actions),
                    answer_resize_requests,
                    apply_host_effects.after(handle_control_actions),
                )
                    .in_set(ViewerSystems::Input),
            );

        #[cfg(not(target_arch = "wasm32"))]
        app.add_systems(
            Update,
            (native_shortcuts, native_window_resized)
                .before(drain_host_events)
                .in_set(ViewerSystems::Input),
        );
    }
}

/// Turn queued host events into scene messages
pub fn drain_host_events(
    queue: Res<HostQueue>,
    options: Res<ViewerOptions>,
    mut actions: MessageWriter<ControlAction>,
    mut resized: MessageWriter<ViewportResized>,
) {
    let camera = &options.0.camera;
    for event in queue.drain() {
        match event {
            HostEvent::Action(action) => {
                actions.write(ControlAction(action));
            }
            HostEvent::Resized(size) => {
                resized.write(ViewportResized {
                    viewport: Viewport::from_window(size, camera.viewport_width_fraction, camera.max_pixel_ratio),
                    resize_surface: true,
                });
            }
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn install_host(
    queue: Res<HostQueue>,
    options: Res<ViewerOptions>,
    mut resized: MessageWriter<ViewportResized>,
) {
    use crate::dom;

    // Startup size comes from the canvas itself, later ones from the window
    match dom::canvas_viewport(options.0.camera.max_pixel_ratio) {
        Ok(viewport) => {
            resized.write(ViewportResized {
                viewport,
                resize_surface: true,
            });
        }
        Err(e) => error!("Cannot size the viewport from the canvas: {}", e),
    }

    if let Err(e) = dom::install_listeners(&queue) {
        error!("Page controls are not bound: {}", e);
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn install_host(
    windows: Query<&Window, With<PrimaryWindow>>,
    options: Res<ViewerOptions>,
    mut resized: MessageWriter<ViewportResized>,
) {
    if let Ok(window) = windows.single() {
        resized.write(ViewportResized {
            viewport: window_viewport(window, options.0.camera.max_pixel_ratio),
            resize_surface: false,
        });
    }
    info!("Keys: D dark mode, R reset camera, P see plaque, I info overlay; click logs the camera position");
}

/// Viewport of a native window, which the window system already sized
#[cfg(not(target_arch = "wasm32"))]
fn window_viewport(window: &Window, max_pixel_ratio: f32) -> Viewport {
    Viewport::from_canvas(window.width(), window.height(), window.scale_factor(), max_pixel_ratio)
}

/// Recompute the viewport when the scene asks, e.g. after a model loads
#[cfg(target_arch = "wasm32")]
fn answer_resize_requests(mut requests: MessageReader<ResizeRequested>, queue: Res<HostQueue>) {
    if requests.read().count() == 0 {
        return;
    }
    match crate::dom::host_size() {
        Ok(size) => queue.push(HostEvent::Resized(size)),
        Err(e) => warn!("Cannot read the window size: {}", e),
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn answer_resize_requests(
    mut requests: MessageReader<ResizeRequested>,
    windows: Query<&Window, With<PrimaryWindow>>,
    options: Res<ViewerOptions>,
    mut resized: MessageWriter<ViewportResized>,
) {
    if requests.read().count() == 0 {
        return;
    }
    if let Ok(window) = windows.single() {
        resized.write(ViewportResized {
            viewport: window_viewport(window, options.0.camera.max_pixel_ratio),
            resize_surface: false,
        });
    }
}

/// Apply page-side effects: CSS properties and the info overlay
fn apply_host_effects(mut effects: MessageReader<HostEffect>) {
    for HostEffect(effect) in effects.read() {
        #[cfg(target_arch = "wasm32")]
        if let Err(e) = crate::dom::apply_effect(effect) {
            error!("Failed to apply {:?}: {}", effect, e);
        }

        #[cfg(not(target_arch = "wasm32"))]
        debug!(?effect, "No page to apply effect to");
    }
}

/// Desktop stand-ins for the page buttons
#[cfg(not(target_arch = "wasm32"))]
fn native_shortcuts(
    keys: Res<ButtonInput<KeyCode>>,
    mouse_button: Res<ButtonInput<MouseButton>>,
    control: Res<vitrine_scene::interaction::ControlState>,
    mut contexts: bevy_egui::EguiContexts,
    queue: Res<HostQueue>,
) {
    let egui_wants_input = contexts
        .ctx_mut()
        .map(|ctx| ctx.wants_keyboard_input() || ctx.is_pointer_over_area())
        .unwrap_or(false);
    if egui_wants_input {
        return;
    }

    if keys.just_pressed(KeyCode::KeyD) {
        queue.push(HostEvent::Action(UiAction::ToggleDarkMode));
    }
    if keys.just_pressed(KeyCode::KeyR) {
        queue.push(HostEvent::Action(UiAction::ResetCamera));
    }
    if keys.just_pressed(KeyCode::KeyP) {
        queue.push(HostEvent::Action(UiAction::SeePlaque));
    }
    if keys.just_pressed(KeyCode::KeyI) {
        let action = if control.0.modes().helper_visible {
            UiAction::HideHelper
        } else {
            UiAction::ShowHelper
        };
        queue.push(HostEvent::Action(action));
    }
    if mouse_button.just_pressed(MouseButton::Left) {
        queue.push(HostEvent::Action(UiAction::LogCameraPosition));
    }
}

/// The OS already resized the surface; only the camera follows
#[cfg(not(target_arch = "wasm32"))]
fn native_window_resized(
    mut events: MessageReader<bevy::window::WindowResized>,
    windows: Query<&Window, With<PrimaryWindow>>,
    options: Res<ViewerOptions>,
    mut resized: MessageWriter<ViewportResized>,
) {
    if events.read().count() == 0 {
        return;
    }
    if let Ok(window) = windows.single() {
        resized.write(ViewportResized {
            viewport: window_viewport(window, options.0.camera.max_pixel_ratio),
            resize_surface: false,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::ecs::message::Messages;
    use vitrine_core::ViewerConfig;
    use vitrine_scene::TypesPlugin;

    fn test_app() -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .add_plugins(TypesPlugin {
                config: ViewerConfig::default(),
            })
            .init_resource::<HostQueue>()
            .add_systems(Update, drain_host_events);
        app
    }

    #[test]
    fn test_queue_preserves_order() {
        let queue = HostQueue::default();
        queue.push(HostEvent::Action(UiAction::ShowHelper));
        queue.push(HostEvent::Action(UiAction::HideHelper));
        assert_eq!(
            queue.drain(),
            vec![
                HostEvent::Action(UiAction::ShowHelper),
                HostEvent::Action(UiAction::HideHelper)
            ]
        );
        assert!(queue.drain().is_empty());
    }

    #[test]
    fn test_queue_survives_poisoned_lock() {
        let queue = HostQueue::default();
        queue.push(HostEvent::Action(UiAction::ResetCamera));

        let shared = queue.clone();
        let result = std::thread::spawn(move || {
            let _guard = shared.0.lock().unwrap();
            panic!("listener panicked while holding the queue");
        })
        .join();
        assert!(result.is_err());
        assert!(queue.0.is_poisoned());

        queue.push(HostEvent::Action(UiAction::SeePlaque));
        assert_eq!(
            queue.drain(),
            vec![
                HostEvent::Action(UiAction::ResetCamera),
                HostEvent::Action(UiAction::SeePlaque)
            ]
        );
    }

    #[test]
    fn test_clicks_become_control_actions() {
        let mut app = test_app();
        let queue = app.world().resource::<HostQueue>().clone();
        queue.push(HostEvent::Action(UiAction::ToggleDarkMode));
        queue.push(HostEvent::Action(UiAction::SeePlaque));
        app.update();

        assert_eq!(app.world().resource::<Messages<ControlAction>>().len(), 2);
        assert!(queue.drain().is_empty());
    }

    #[test]
    fn test_window_resize_uses_width_fraction() {
        let mut app = test_app();
        app.world().resource::<HostQueue>().push(HostEvent::Resized(HostSize {
            inner_width: 1000.0,
            inner_height: 800.0,
            device_pixel_ratio: 3.0,
        }));
        app.update();

        let resized = app
            .world_mut()
            .resource_mut::<Messages<ViewportResized>>()
            .drain()
            .next()
            .expect("viewport message");
        assert_eq!(resized.viewport.width, 900.0);
        assert_eq!(resized.viewport.height, 800.0);
        assert_eq!(resized.viewport.pixel_ratio, 2.0);
        assert!(resized.resize_surface);
    }
}
