//! Page controls reduced to viewer effects
//!
//! The [`Controller`] owns the UI modes and turns each [`UiAction`] into a
//! list of [`Effect`]s. The engine applies the scene effects, the host page
//! applies the CSS and helper ones.

use std::time::Duration;
use tracing::{debug, info};

use crate::config::ViewerConfig;
use crate::theme::{Rgb, Theme, ThemePalette};
use crate::tween::Easing;

pub const PRIMARY_COLOR_PROPERTY: &str = "--primary-color";
pub const SECONDARY_COLOR_PROPERTY: &str = "--secondary-color";

/// Something the user did on the page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UiAction {
    ToggleDarkMode,
    ResetCamera,
    ShowHelper,
    HideHelper,
    SeePlaque,
    /// Click anywhere on the document
    LogCameraPosition,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LightRole {
    /// Shadow-casting light the panel controls
    Key,
    Fill,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    SetCssProperty { name: &'static str, value: String },
    SetBackground(Rgb),
    AnimateLightX {
        light: LightRole,
        x: f32,
        duration: Duration,
        easing: Easing,
    },
    AnimateCamera {
        target: [f32; 3],
        duration: Duration,
        easing: Easing,
    },
    SetHelperVisible(bool),
    LogCameraPosition,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UiModes {
    pub dark_mode: bool,
    pub helper_visible: bool,
}

impl UiModes {
    pub fn theme(&self) -> Theme {
        if self.dark_mode {
            Theme::Night
        } else {
            Theme::Day
        }
    }
}

#[derive(Debug, Clone)]
pub struct Controller {
    modes: UiModes,
    day: ThemePalette,
    night: ThemePalette,
    home: [f32; 3],
    plaque: [f32; 3],
    duration: Duration,
    easing: Easing,
}

impl Controller {
    pub fn new(config: &ViewerConfig) -> Self {
        Self {
            modes: UiModes::default(),
            day: config.themes.day.clone(),
            night: config.themes.night.clone(),
            home: config.presets.home,
            plaque: config.presets.plaque,
            duration: config.animation.duration(),
            easing: config.animation.easing,
        }
    }

    pub fn modes(&self) -> UiModes {
        self.modes
    }

    pub fn palette(&self, theme: Theme) -> &ThemePalette {
        match theme {
            Theme::Day => &self.day,
            Theme::Night => &self.night,
        }
    }

    pub fn handle(&mut self, action: UiAction) -> Vec<Effect> {
        debug!(?action, "Handling UI action");
        match action {
            UiAction::ToggleDarkMode => {
                let theme = self.modes.theme().toggled();
                self.modes.dark_mode = theme == Theme::Night;
                info!(?theme, "Switching theme");
                self.theme_effects(theme)
            }
            UiAction::ResetCamera => vec![self.fly_to(self.home)],
            UiAction::SeePlaque => vec![self.fly_to(self.plaque)],
            UiAction::ShowHelper => {
                self.modes.helper_visible = true;
                vec![Effect::SetHelperVisible(true)]
            }
            UiAction::HideHelper => {
                self.modes.helper_visible = false;
                vec![Effect::SetHelperVisible(false)]
            }
            UiAction::LogCameraPosition => vec![Effect::LogCameraPosition],
        }
    }

    fn theme_effects(&self, theme: Theme) -> Vec<Effect> {
        let palette = self.palette(theme);
        vec![
            Effect::SetCssProperty {
                name: PRIMARY_COLOR_PROPERTY,
                value: palette.primary.to_hex(),
            },
            Effect::SetCssProperty {
                name: SECONDARY_COLOR_PROPERTY,
                value: palette.secondary.to_hex(),
            },
            Effect::SetBackground(palette.background),
            Effect::AnimateLightX {
                light: LightRole::Key,
                x: palette.key_light_x,
                duration: self.duration,
                easing: self.easing,
            },
            Effect::AnimateLightX {
                light: LightRole::Fill,
                x: palette.fill_light_x,
                duration: self.duration,
                easing: self.easing,
            },
        ]
    }

    fn fly_to(&self, target: [f32; 3]) -> Effect {
        Effect::AnimateCamera {
            target,
            duration: self.duration,
            easing: self.easing,
        }
    }
}
