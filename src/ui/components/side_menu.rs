//! Settings menu and the privacy-policy panel

use super::label_widget;
use crate::ui::state::AppState;
use crate::ui::theme::Theme;
use egui::{Align2, RichText, Vec2, WidgetType};

const PRIVACY_SECTIONS: [(&str, &str); 3] = [
    (
        "1. Bayanan da muke tattarawa",
        "Muna amfani da hotunan da kuka dauka ne kawai don binciken cututtukan shuka ta hanyar fasahar AI.",
    ),
    (
        "2. Yadda muke amfani da bayanai",
        "Ba mu sayar da bayanan ku ga wasu kamfanoni. Ana amfani da su ne kawai don inganta nomanku.",
    ),
    (
        "3. Tsaro",
        "Duk hotunan da aka tura ana kiyaye su ta hanyar rufaffen nishadi (encryption).",
    ),
];

pub struct SideMenu<'a> {
    state: &'a mut AppState,
    theme: &'a Theme,
}

impl<'a> SideMenu<'a> {
    pub fn new(state: &'a mut AppState, theme: &'a Theme) -> Self {
        Self { state, theme }
    }

    pub fn show(self, ctx: &egui::Context) {
        if !self.state.menu_open {
            return;
        }

        let profile = self.state.session.session().cloned();

        egui::SidePanel::right("side_menu")
            .resizable(false)
            .exact_width(240.0)
            .frame(egui::Frame::none().fill(self.theme.bg_card).inner_margin(self.theme.spacing))
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.label(
                        RichText::new("Saituna")
                            .size(20.0)
                            .strong()
                            .color(self.theme.primary_dark),
                    );
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        let close = ui.add(egui::Button::new("✖").frame(false));
                        label_widget(&close, WidgetType::Button, true, "Close menu");
                        if close.clicked() {
                            self.state.menu_open = false;
                        }
                    });
                });
                ui.separator();

                if let Some(profile) = &profile {
                    ui.label(RichText::new("Profile Dina").color(self.theme.text_muted));
                    ui.label(RichText::new(profile.display_label()).strong());
                    if let Some(email) = &profile.email {
                        ui.label(RichText::new(email).size(12.0).color(self.theme.text_secondary));
                    }
                    ui.separator();
                }

                let privacy = ui.add(egui::Button::new("🛡 Privacy Policy").frame(false));
                label_widget(&privacy, WidgetType::Button, true, "Open privacy policy");
                if privacy.clicked() {
                    self.state.privacy_open = true;
                    self.state.menu_open = false;
                }

                ui.add_space(self.theme.spacing);

                let enabled = !self.state.auth_pending && !self.state.is_busy();
                let logout = ui.add_enabled(
                    enabled,
                    egui::Button::new(RichText::new("⎋ Fita (Logout)").color(self.theme.error))
                        .frame(false),
                );
                label_widget(&logout, WidgetType::Button, enabled, "Sign out");
                if logout.clicked() {
                    self.state.sign_out();
                }
            });
    }
}

pub struct PrivacyPanel<'a> {
    state: &'a mut AppState,
    theme: &'a Theme,
}

impl<'a> PrivacyPanel<'a> {
    pub fn new(state: &'a mut AppState, theme: &'a Theme) -> Self {
        Self { state, theme }
    }

    pub fn show(self, ctx: &egui::Context) {
        if !self.state.privacy_open {
            return;
        }

        egui::Window::new(RichText::new("Privacy Policy").strong())
            .id(egui::Id::new("privacy_policy"))
            .collapsible(false)
            .resizable(false)
            .anchor(Align2::CENTER_CENTER, Vec2::ZERO)
            .show(ctx, |ui| {
                let intro = ui.label(
                    RichText::new(
                        "Barka da amfani da FarmerAI. Tsaron bayananku yana da muhimmanci a gare mu.",
                    )
                    .color(self.theme.text_primary),
                );
                label_widget(&intro, WidgetType::Label, true, "Privacy policy text");

                for (heading, body) in PRIVACY_SECTIONS {
                    ui.add_space(self.theme.spacing_sm);
                    ui.label(RichText::new(heading).strong().color(self.theme.primary_dark));
                    ui.label(RichText::new(body).color(self.theme.text_secondary));
                }

                ui.add_space(self.theme.spacing);
                ui.vertical_centered(|ui| {
                    let close = ui.add(
                        egui::Button::new(
                            RichText::new("Na Karanta, Na Gane").color(self.theme.text_on_primary),
                        )
                        .fill(self.theme.primary)
                        .rounding(self.theme.button_rounding),
                    );
                    label_widget(&close, WidgetType::Button, true, "Close privacy policy");
                    if close.clicked() {
                        self.state.privacy_open = false;
                    }
                });
            });
    }
}
