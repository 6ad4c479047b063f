//! Theme and styling for the FarmerAI UI
//!
//! Light, green "field" palette with brown accents for the gallery action.

use egui::{Color32, FontFamily, FontId, Rounding, Stroke, TextStyle, Vec2, Visuals};

/// Application theme configuration
#[derive(Clone, Debug)]
pub struct Theme {
    /// Primary accent (leaf green)
    pub primary: Color32,
    /// Darker green for headings
    pub primary_dark: Color32,
    /// Soil brown, used by the gallery action
    pub secondary: Color32,
    /// Sun amber for the weather card
    pub accent: Color32,
    pub error: Color32,

    /// Background colors
    pub bg_primary: Color32,
    pub bg_card: Color32,
    pub bg_result: Color32,

    /// Text colors
    pub text_primary: Color32,
    pub text_secondary: Color32,
    pub text_muted: Color32,
    pub text_on_primary: Color32,

    /// Border radius for buttons
    pub button_rounding: Rounding,
    /// Border radius for cards/panels
    pub card_rounding: Rounding,

    /// Standard spacing
    pub spacing: f32,
    /// Large spacing
    pub spacing_lg: f32,
    /// Small spacing
    pub spacing_sm: f32,
}

impl Default for Theme {
    fn default() -> Self {
        Self::field()
    }
}

impl Theme {
    pub fn field() -> Self {
        Self {
            primary: Color32::from_rgb(46, 125, 50),
            primary_dark: Color32::from_rgb(27, 94, 32),
            secondary: Color32::from_rgb(139, 69, 19),
            accent: Color32::from_rgb(255, 160, 0),
            error: Color32::from_rgb(211, 47, 47),

            bg_primary: Color32::from_rgb(241, 248, 233),
            bg_card: Color32::WHITE,
            bg_result: Color32::from_rgb(232, 245, 233),

            text_primary: Color32::from_rgb(33, 33, 33),
            text_secondary: Color32::from_rgb(85, 85, 85),
            text_muted: Color32::from_rgb(153, 153, 153),
            text_on_primary: Color32::WHITE,

            button_rounding: Rounding::same(10.0),
            card_rounding: Rounding::same(16.0),

            spacing: 16.0,
            spacing_lg: 24.0,
            spacing_sm: 8.0,
        }
    }

    /// Apply this theme to egui
    pub fn apply(&self, ctx: &egui::Context) {
        let mut visuals = Visuals::light();

        visuals.panel_fill = self.bg_primary;
        visuals.window_fill = self.bg_card;
        visuals.extreme_bg_color = self.bg_card;

        visuals.widgets.noninteractive.bg_fill = self.bg_card;
        visuals.widgets.noninteractive.fg_stroke = Stroke::new(1.0, self.text_secondary);

        visuals.widgets.inactive.bg_fill = self.bg_result;
        visuals.widgets.inactive.weak_bg_fill = self.bg_result;
        visuals.widgets.inactive.fg_stroke = Stroke::new(1.0, self.primary_dark);

        visuals.widgets.hovered.bg_fill = self.primary.gamma_multiply(0.85);
        visuals.widgets.hovered.weak_bg_fill = self.primary.gamma_multiply(0.85);
        visuals.widgets.hovered.fg_stroke = Stroke::new(1.0, self.text_on_primary);

        visuals.widgets.active.bg_fill = self.primary;
        visuals.widgets.active.weak_bg_fill = self.primary;
        visuals.widgets.active.fg_stroke = Stroke::new(1.0, self.text_on_primary);

        visuals.selection.bg_fill = self.primary.gamma_multiply(0.3);
        visuals.selection.stroke = Stroke::new(1.0, self.primary);

        visuals.hyperlink_color = self.primary;

        visuals.window_rounding = self.card_rounding;
        visuals.menu_rounding = self.button_rounding;

        ctx.set_visuals(visuals);

        let mut style = (*ctx.style()).clone();
        style.spacing.item_spacing = Vec2::new(self.spacing_sm, self.spacing_sm);
        style.spacing.button_padding = Vec2::new(14.0, 8.0);
        style.text_styles.insert(
            TextStyle::Heading,
            FontId::new(22.0, FontFamily::Proportional),
        );
        style
            .text_styles
            .insert(TextStyle::Body, FontId::new(15.0, FontFamily::Proportional));
        style
            .text_styles
            .insert(TextStyle::Button, FontId::new(15.0, FontFamily::Proportional));
        ctx.set_style(style);
    }

    /// Filled frame used for every card on the home screen
    pub fn card_frame(&self) -> egui::Frame {
        egui::Frame::none()
            .fill(self.bg_card)
            .rounding(self.card_rounding)
            .inner_margin(self.spacing)
    }
}
