//! Vitrine Core - Engine-free logic for the product viewer
//!
//! This crate holds everything the viewer decides on its own, independent of
//! the rendering engine and the browser:
//! - Viewer configuration (TOML) and the typed debug settings it seeds
//! - Day/night themes and the UI action reducer
//! - Tweens with per-property cancellation
//! - Orbit camera math and viewport sizing
//! - The material refresh pass over shaded surfaces

pub mod config;
pub mod interaction;
pub mod orbit;
pub mod settings;
pub mod surface;
pub mod theme;
pub mod tween;
pub mod viewport;

pub use config::{ConfigError, ViewerConfig};
pub use interaction::{Controller, Effect, LightRole, UiAction, UiModes, PRIMARY_COLOR_PROPERTY, SECONDARY_COLOR_PROPERTY};
pub use orbit::OrbitState;
pub use settings::{ParamChange, ParamId, ParamValue, SettingsError, ToneMapping, ViewerSettings};
pub use surface::{refresh_surfaces, RefreshReport, ShadedSurface, ShadowFlags, SurfaceKind};
pub use theme::{Rgb, Theme, ThemeError, ThemePalette};
pub use tween::{Easing, Interpolate, Tween, TweenSlot};
pub use viewport::{HostSize, Perspective, Viewport};
