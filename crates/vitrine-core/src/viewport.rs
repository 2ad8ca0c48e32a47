//! Viewport sizing and perspective parameters

use serde::{Deserialize, Serialize};

/// Raw sizes reported by the host page
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HostSize {
    pub inner_width: f32,
    pub inner_height: f32,
    pub device_pixel_ratio: f32,
}

/// Drawing surface size in CSS pixels plus the pixel ratio to render at
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
    pub pixel_ratio: f32,
}

impl Viewport {
    /// Size from the browser window: a fraction of the inner width, the full
    /// inner height, and the device pixel ratio capped at `max_pixel_ratio`.
    pub fn from_window(host: HostSize, width_fraction: f32, max_pixel_ratio: f32) -> Self {
        Self {
            width: (host.inner_width * width_fraction).max(1.0),
            height: host.inner_height.max(1.0),
            pixel_ratio: cap_pixel_ratio(host.device_pixel_ratio, max_pixel_ratio),
        }
    }

    /// Size from the canvas element itself. Used once at startup; later
    /// resizes go through [`Viewport::from_window`].
    pub fn from_canvas(client_width: f32, client_height: f32, device_pixel_ratio: f32, max_pixel_ratio: f32) -> Self {
        Self {
            width: client_width.max(1.0),
            height: client_height.max(1.0),
            pixel_ratio: cap_pixel_ratio(device_pixel_ratio, max_pixel_ratio),
        }
    }

    pub fn aspect(&self) -> f32 {
        self.width / self.height
    }
}

fn cap_pixel_ratio(ratio: f32, max: f32) -> f32 {
    if ratio.is_finite() && ratio > 0.0 {
        ratio.min(max)
    } else {
        1.0
    }
}

/// Perspective camera parameters in the page's conventions (vertical fov in
/// degrees)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Perspective {
    pub fov_degrees: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Perspective {
    pub fn new(fov_degrees: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self { fov_degrees, aspect, near, far }
    }

    pub fn fov_radians(&self) -> f32 {
        self.fov_degrees.to_radians()
    }

    /// Follow a viewport change. Only the aspect ratio moves.
    pub fn resized(self, viewport: &Viewport) -> Self {
        Self {
            aspect: viewport.aspect(),
            ..self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_sizing_uses_width_fraction() {
        let host = HostSize { inner_width: 1000.0, inner_height: 800.0, device_pixel_ratio: 1.0 };
        let vp = Viewport::from_window(host, 0.9, 2.0);
        assert_eq!(vp.width, 900.0);
        assert_eq!(vp.height, 800.0);
        assert_eq!(vp.aspect(), 900.0 / 800.0);
    }

    #[test]
    fn test_pixel_ratio_is_capped() {
        let host = HostSize { inner_width: 400.0, inner_height: 800.0, device_pixel_ratio: 3.0 };
        assert_eq!(Viewport::from_window(host, 1.0, 2.0).pixel_ratio, 2.0);
        let host = HostSize { device_pixel_ratio: 1.5, ..host };
        assert_eq!(Viewport::from_window(host, 1.0, 2.0).pixel_ratio, 1.5);
        let host = HostSize { device_pixel_ratio: f32::NAN, ..host };
        assert_eq!(Viewport::from_window(host, 1.0, 2.0).pixel_ratio, 1.0);
    }

    #[test]
    fn test_resize_keeps_near_and_far() {
        let camera = Perspective::new(75.0, 1.0, 0.1, 100.0);
        for (w, h) in [(1920.0, 1080.0), (390.0, 844.0), (1.0, 1.0)] {
            let vp = Viewport::from_canvas(w, h, 1.0, 2.0);
            let resized = camera.resized(&vp);
            assert_eq!(resized.aspect, w / h);
            assert_eq!(resized.near, 0.1);
            assert_eq!(resized.far, 100.0);
            assert_eq!(resized.fov_degrees, 75.0);
        }
    }

    #[test]
    fn test_degenerate_sizes_never_divide_by_zero() {
        let vp = Viewport::from_canvas(0.0, 0.0, 1.0, 2.0);
        assert!(vp.aspect().is_finite());
    }
}
