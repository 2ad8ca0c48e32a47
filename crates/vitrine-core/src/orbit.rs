//! Orbit camera math (Y up)
//!
//! The camera sits on a sphere around `target`. Input accumulates deltas
//! that [`OrbitState::update`] bleeds into the spherical coordinates with
//! exponential damping, so motion keeps gliding after the pointer stops.

use std::f32::consts::{PI, TAU};

const EPS: f32 = 1e-6;

/// Seconds-based equivalent of "one step per frame at 60 fps"
const REFERENCE_FPS: f32 = 60.0;

#[derive(Debug, Clone, PartialEq)]
pub struct OrbitState {
    pub target: [f32; 3],
    radius: f32,
    /// Azimuth around +Y, measured from +Z toward +X
    theta: f32,
    /// Polar angle from +Y
    phi: f32,
    delta_theta: f32,
    delta_phi: f32,
    scale: f32,
    pan_offset: [f32; 3],
    interacting: bool,
    pub enable_damping: bool,
    pub damping_factor: f32,
    pub auto_rotate: bool,
    /// 1.0 completes a turn every 60 s
    pub auto_rotate_speed: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
}

impl OrbitState {
    pub fn new(position: [f32; 3], target: [f32; 3]) -> Self {
        let mut state = Self {
            target,
            radius: 1.0,
            theta: 0.0,
            phi: PI / 2.0,
            delta_theta: 0.0,
            delta_phi: 0.0,
            scale: 1.0,
            pan_offset: [0.0; 3],
            interacting: false,
            enable_damping: true,
            damping_factor: 0.05,
            auto_rotate: false,
            auto_rotate_speed: 2.0,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            min_distance: 0.0,
            max_distance: f32::INFINITY,
        };
        state.set_position(position);
        state
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn position(&self) -> [f32; 3] {
        let sin_phi = self.phi.sin();
        [
            self.target[0] + self.radius * sin_phi * self.theta.sin(),
            self.target[1] + self.radius * self.phi.cos(),
            self.target[2] + self.radius * sin_phi * self.theta.cos(),
        ]
    }

    /// Move the camera to `position` while keeping the target. Used when
    /// something other than the pointer (a tween) drives the camera.
    pub fn set_position(&mut self, position: [f32; 3]) {
        let offset = sub(position, self.target);
        let radius = length(offset);
        self.radius = radius;
        if radius < EPS {
            self.theta = 0.0;
            self.phi = PI / 2.0;
            return;
        }
        self.theta = offset[0].atan2(offset[2]);
        self.phi = (offset[1] / radius).clamp(-1.0, 1.0).acos();
    }

    /// Pointer is held down; suspends auto-rotation like a grab would
    pub fn set_interacting(&mut self, interacting: bool) {
        self.interacting = interacting;
    }

    pub fn rotate_left(&mut self, angle: f32) {
        self.delta_theta -= angle;
    }

    pub fn rotate_up(&mut self, angle: f32) {
        self.delta_phi -= angle;
    }

    /// Drag of `(dx, dy)` pixels on a viewport `viewport_height` pixels tall.
    /// A drag across the full height turns a full circle.
    pub fn rotate_by_pixels(&mut self, dx: f32, dy: f32, viewport_height: f32) {
        let height = viewport_height.max(1.0);
        self.rotate_left(TAU * dx / height * self.rotate_speed);
        self.rotate_up(TAU * dy / height * self.rotate_speed);
    }

    /// Positive steps move the camera closer
    pub fn zoom(&mut self, steps: f32) {
        self.scale *= 0.95_f32.powf(self.zoom_speed * steps);
    }

    /// Screen-space pan so the point under the cursor follows the drag
    pub fn pan_by_pixels(&mut self, dx: f32, dy: f32, viewport_height: f32, fov_radians: f32) {
        let height = viewport_height.max(1.0);
        let offset = sub(self.position(), self.target);
        let target_distance = length(offset) * (fov_radians / 2.0).tan();

        let forward = normalize(scale(offset, -1.0));
        let right = normalize(cross(forward, [0.0, 1.0, 0.0]));
        let up = cross(right, forward);

        let left_amount = 2.0 * dx * target_distance / height;
        let up_amount = 2.0 * dy * target_distance / height;
        self.pan_offset = add(self.pan_offset, scale(right, -left_amount));
        self.pan_offset = add(self.pan_offset, scale(up, up_amount));
    }

    /// Advance by `dt` seconds and return the new camera position
    pub fn update(&mut self, dt: f32) -> [f32; 3] {
        if self.auto_rotate && !self.interacting {
            self.rotate_left(TAU / REFERENCE_FPS * self.auto_rotate_speed * dt);
        }

        let (apply, keep) = if self.enable_damping {
            let keep = (1.0 - self.damping_factor).clamp(0.0, 1.0).powf(dt * REFERENCE_FPS);
            (1.0 - keep, keep)
        } else {
            (1.0, 0.0)
        };

        self.theta += self.delta_theta * apply;
        self.phi = (self.phi + self.delta_phi * apply).clamp(EPS, PI - EPS);
        self.radius = (self.radius * self.scale).clamp(self.min_distance, self.max_distance);
        self.target = add(self.target, scale(self.pan_offset, apply));

        self.delta_theta *= keep;
        self.delta_phi *= keep;
        self.pan_offset = scale(self.pan_offset, keep);
        self.scale = 1.0;

        self.position()
    }
}

fn add(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
    [a[0] + b[0], a[1] + b[1], a[2] + b[2]]
}

fn sub(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

fn scale(a: [f32; 3], s: f32) -> [f32; 3] {
    [a[0] * s, a[1] * s, a[2] * s]
}

fn cross(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

fn length(a: [f32; 3]) -> f32 {
    (a[0] * a[0] + a[1] * a[1] + a[2] * a[2]).sqrt()
}

fn normalize(a: [f32; 3]) -> [f32; 3] {
    let len = length(a);
    if len < EPS {
        return [0.0; 3];
    }
    scale(a, 1.0 / len)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: [f32; 3], b: [f32; 3], tol: f32) {
        for i in 0..3 {
            assert!((a[i] - b[i]).abs() < tol, "{a:?} != {b:?}");
        }
    }

    #[test]
    fn test_position_survives_spherical_conversion() {
        let start = [-3.5, 1.0, -3.5];
        let orbit = OrbitState::new(start, [0.0; 3]);
        assert_close(orbit.position(), start, 1e-4);
    }

    #[test]
    fn test_auto_rotate_keeps_radius_and_height() {
        let mut orbit = OrbitState::new([-3.5, 1.0, -3.5], [0.0; 3]);
        orbit.auto_rotate = true;
        orbit.auto_rotate_speed = 0.1;
        let radius = orbit.radius();
        let mut last = orbit.position();
        for _ in 0..120 {
            last = orbit.update(1.0 / 60.0);
        }
        assert!((orbit.radius() - radius).abs() < 1e-4);
        assert!((last[1] - 1.0).abs() < 1e-4);
        assert_ne!(last, [-3.5, 1.0, -3.5]);
    }

    #[test]
    fn test_grab_suspends_auto_rotate() {
        let mut orbit = OrbitState::new([0.0, 0.0, 5.0], [0.0; 3]);
        orbit.auto_rotate = true;
        orbit.set_interacting(true);
        let pos = orbit.update(0.5);
        assert_close(pos, [0.0, 0.0, 5.0], 1e-5);
    }

    #[test]
    fn test_damping_converges_to_full_rotation() {
        let mut orbit = OrbitState::new([0.0, 0.0, 5.0], [0.0; 3]);
        orbit.rotate_left(-PI / 2.0);
        for _ in 0..1000 {
            orbit.update(1.0 / 60.0);
        }
        // Quarter turn from +Z lands on +X
        assert_close(orbit.position(), [5.0, 0.0, 0.0], 1e-3);
    }

    #[test]
    fn test_undamped_rotation_applies_at_once() {
        let mut orbit = OrbitState::new([0.0, 0.0, 5.0], [0.0; 3]);
        orbit.enable_damping = false;
        orbit.rotate_left(-PI / 2.0);
        assert_close(orbit.update(1.0 / 60.0), [5.0, 0.0, 0.0], 1e-4);
    }

    #[test]
    fn test_zoom_in_moves_closer() {
        let mut orbit = OrbitState::new([0.0, 0.0, 5.0], [0.0; 3]);
        orbit.zoom(1.0);
        orbit.update(1.0 / 60.0);
        assert!((orbit.radius() - 4.75).abs() < 1e-4);
        orbit.zoom(-2.0);
        orbit.update(1.0 / 60.0);
        assert!(orbit.radius() > 4.75);
    }

    #[test]
    fn test_polar_angle_is_clamped() {
        let mut orbit = OrbitState::new([0.0, 0.0, 5.0], [0.0; 3]);
        orbit.enable_damping = false;
        orbit.rotate_up(10.0);
        let pos = orbit.update(1.0 / 60.0);
        assert!(pos[1] > 4.99 && pos[1] <= 5.0);
    }

    #[test]
    fn test_pan_moves_target_sideways() {
        let mut orbit = OrbitState::new([0.0, 0.0, 5.0], [0.0; 3]);
        orbit.enable_damping = false;
        orbit.pan_by_pixels(100.0, 0.0, 800.0, 75.0_f32.to_radians());
        orbit.update(1.0 / 60.0);
        // Looking down -Z, dragging right drags the scene right: target goes -X
        assert!(orbit.target[0] < 0.0);
        assert!(orbit.target[1].abs() < 1e-5);
        assert!(orbit.target[2].abs() < 1e-5);
    }

    #[test]
    fn test_set_position_keeps_target() {
        let mut orbit = OrbitState::new([0.0, 0.0, 5.0], [1.0, 0.0, 0.0]);
        orbit.set_position([1.0, 3.0, 0.0]);
        assert_eq!(orbit.target, [1.0, 0.0, 0.0]);
        assert!((orbit.radius() - 3.0).abs() < 1e-5);
        assert_close(orbit.position(), [1.0, 3.0, 0.0], 1e-4);
    }
}
