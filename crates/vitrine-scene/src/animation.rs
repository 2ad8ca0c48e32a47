//! Tweens driving the camera and the directional lights

use bevy::prelude::*;
use std::time::Duration;
use vitrine_core::{Easing, LightRole, TweenSlot};

use crate::camera::OrbitCamera;
use crate::types::{DebugSettings, ViewerSystems};

/// One slot per animated property
#[derive(Resource, Default)]
pub struct Animations {
    pub camera: TweenSlot<[f32; 3]>,
    pub key_light_x: TweenSlot<f32>,
    pub fill_light_x: TweenSlot<f32>,
}

impl Animations {
    pub fn light_x(&mut self, light: LightRole) -> &mut TweenSlot<f32> {
        match light {
            LightRole::Key => &mut self.key_light_x,
            LightRole::Fill => &mut self.fill_light_x,
        }
    }

    /// Fly the camera from where it is now
    pub fn animate_camera(&mut self, from: [f32; 3], to: [f32; 3], duration: Duration, easing: Easing) {
        self.camera.start(from, to, duration, easing);
    }

    pub fn animate_light_x(&mut self, light: LightRole, from: f32, to: f32, duration: Duration, easing: Easing) {
        self.light_x(light).start(from, to, duration, easing);
    }

    pub fn is_idle(&self) -> bool {
        !self.camera.is_active() && !self.key_light_x.is_active() && !self.fill_light_x.is_active()
    }
}

pub struct AnimationPlugin;

impl Plugin for AnimationPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<Animations>()
            .add_systems(Update, advance_animations.in_set(ViewerSystems::Animate));
    }
}

pub fn advance_animations(
    time: Res<Time>,
    mut animations: ResMut<Animations>,
    mut orbit_camera: ResMut<OrbitCamera>,
    mut settings: ResMut<DebugSettings>,
) {
    if animations.is_idle() {
        return;
    }
    let dt = time.delta();

    if let Some(position) = animations.camera.advance(dt) {
        orbit_camera.orbit.set_position(position);
    }
    if let Some(x) = animations.key_light_x.advance(dt) {
        settings.0.key_light_position[0] = x;
    }
    if let Some(x) = animations.fill_light_x.advance(dt) {
        settings.0.fill_light_position[0] = x;
    }
}
