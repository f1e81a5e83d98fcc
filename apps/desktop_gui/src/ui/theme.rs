//! Window chrome for the light/dark theme.

use client_core::ThemePresenter;
use eframe::egui;
use shared::domain::Theme;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub user_bubble: egui::Color32,
    pub ai_bubble: egui::Color32,
    pub error_bubble: egui::Color32,
    pub text: egui::Color32,
    pub strong_text: egui::Color32,
    pub hint_text: egui::Color32,
    pub code_background: egui::Color32,
    pub link: egui::Color32,
}

pub fn palette_for(theme: Theme) -> Palette {
    match theme {
        Theme::Light => Palette {
            user_bubble: egui::Color32::from_rgb(219, 234, 254),
            ai_bubble: egui::Color32::from_rgb(243, 244, 246),
            error_bubble: egui::Color32::from_rgb(254, 226, 226),
            text: egui::Color32::from_rgb(17, 24, 39),
            strong_text: egui::Color32::BLACK,
            hint_text: egui::Color32::from_rgb(107, 114, 128),
            code_background: egui::Color32::from_rgb(229, 231, 235),
            link: egui::Color32::from_rgb(37, 99, 235),
        },
        Theme::Dark => Palette {
            user_bubble: egui::Color32::from_rgb(30, 58, 138),
            ai_bubble: egui::Color32::from_rgb(55, 65, 81),
            error_bubble: egui::Color32::from_rgb(127, 29, 29),
            text: egui::Color32::from_rgb(243, 244, 246),
            strong_text: egui::Color32::WHITE,
            hint_text: egui::Color32::from_rgb(156, 163, 175),
            code_background: egui::Color32::from_rgb(31, 41, 55),
            link: egui::Color32::from_rgb(147, 197, 253),
        },
    }
}

pub fn visuals_for_theme(theme: Theme) -> egui::Visuals {
    match theme {
        Theme::Light => egui::Visuals::light(),
        Theme::Dark => {
            let mut v = egui::Visuals::dark();
            v.panel_fill = egui::Color32::from_rgb(17, 24, 39);
            v.window_fill = egui::Color32::from_rgb(17, 24, 39);
            v.extreme_bg_color = egui::Color32::from_rgb(31, 41, 55);
            v
        }
    }
}

/// Theme state shown by the window: the active theme plus the two toggle icons.
#[derive(Debug, Default)]
pub struct ThemeChrome {
    attribute: Option<Theme>,
    light_icon_visible: bool,
    dark_icon_visible: bool,
    applied: Option<Theme>,
}

impl ThemeChrome {
    pub fn theme(&self) -> Theme {
        self.attribute.unwrap_or(Theme::Light)
    }

    /// Icon for the theme a toggle would switch to.
    pub fn toggle_icon(&self) -> &'static str {
        if self.dark_icon_visible {
            "🌙"
        } else if self.light_icon_visible {
            "☀"
        } else {
            "◐"
        }
    }

    pub fn apply_theme_if_needed(&mut self, ctx: &egui::Context) {
        let theme = self.theme();
        if self.applied == Some(theme) {
            return;
        }

        let mut style = (*ctx.style()).clone();
        style.visuals = visuals_for_theme(theme);
        style.spacing.item_spacing = egui::vec2(8.0, 6.0);
        style.spacing.button_padding = egui::vec2(10.0, 6.0);
        ctx.set_style(style);
        self.applied = Some(theme);
    }
}

impl ThemePresenter for ThemeChrome {
    fn theme_attribute(&self) -> Option<Theme> {
        self.attribute
    }

    fn set_theme_attribute(&mut self, theme: Theme) {
        self.attribute = Some(theme);
    }

    fn set_icon_visibility(&mut self, light_icon_visible: bool, dark_icon_visible: bool) {
        self.light_icon_visible = light_icon_visible;
        self.dark_icon_visible = dark_icon_visible;
    }
}
