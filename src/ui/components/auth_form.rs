//! Sign-in and registration forms

use super::label_widget;
use crate::session::Route;
use crate::ui::state::AppState;
use crate::ui::theme::Theme;
use egui::{RichText, WidgetType};

/// Caption, hint and accessibility label of one form input
struct Field {
    caption: &'static str,
    hint: &'static str,
    label: &'static str,
    password: bool,
}

const FULL_NAME: Field = Field {
    caption: "Cikakken Suna",
    hint: "Misali: Musa Aliyu",
    label: "Full name input",
    password: false,
};

const EMAIL: Field = Field {
    caption: "Email (Imel)",
    hint: "manomi@email.com",
    label: "Email input",
    password: false,
};

const PASSWORD: Field = Field {
    caption: "Kalmar Sirri (Password)",
    hint: "********",
    label: "Password input",
    password: true,
};

fn form_field(ui: &mut egui::Ui, theme: &Theme, field: &Field, value: &mut String, enabled: bool) {
    ui.label(RichText::new(field.caption).size(13.0).color(theme.text_secondary));
    let edit = egui::TextEdit::singleline(value)
        .hint_text(field.hint)
        .password(field.password)
        .desired_width(f32::INFINITY);
    let response = ui.add_enabled(enabled, edit);
    label_widget(&response, WidgetType::TextEdit, enabled, field.label);
    ui.add_space(theme.spacing_sm);
}

fn primary_button(ui: &mut egui::Ui, theme: &Theme, text: &str, enabled: bool, label: &str) -> bool {
    let response = ui.add_enabled(
        enabled,
        egui::Button::new(RichText::new(text).size(16.0).color(theme.text_on_primary))
            .fill(theme.primary)
            .rounding(theme.button_rounding)
            .min_size(egui::vec2(ui.available_width(), 44.0)),
    );
    label_widget(&response, WidgetType::Button, enabled, label);
    response.clicked()
}

fn switch_link(ui: &mut egui::Ui, theme: &Theme, prompt: &str, link: &str, label: &str) -> bool {
    let mut clicked = false;
    ui.horizontal(|ui| {
        ui.label(RichText::new(prompt).color(theme.text_secondary));
        let response = ui.add(
            egui::Button::new(RichText::new(link).strong().color(theme.primary)).frame(false),
        );
        label_widget(&response, WidgetType::Button, true, label);
        clicked = response.clicked();
    });
    clicked
}

pub struct LoginView<'a> {
    state: &'a mut AppState,
    theme: &'a Theme,
}

impl<'a> LoginView<'a> {
    pub fn new(state: &'a mut AppState, theme: &'a Theme) -> Self {
        Self { state, theme }
    }

    pub fn show(self, ui: &mut egui::Ui) {
        let theme = self.theme;
        let enabled = !self.state.auth_pending;

        ui.vertical(|ui| {
            ui.add_space(theme.spacing_lg);
            ui.label(
                RichText::new("Barka da Dawowa! 🌿")
                    .size(26.0)
                    .strong()
                    .color(theme.primary_dark),
            );
            ui.label(RichText::new("Shiga don ci gaba da kula da gonarka").color(theme.text_muted));
            ui.add_space(theme.spacing_lg);

            form_field(ui, theme, &EMAIL, &mut self.state.login.email, enabled);
            form_field(ui, theme, &PASSWORD, &mut self.state.login.password, enabled);

            if primary_button(ui, theme, "Shiga", enabled, "Sign in") {
                self.state.sign_in();
            }
            if !enabled {
                ui.vertical_centered(|ui| {
                    ui.add(egui::Spinner::new().color(theme.primary));
                });
            }

            ui.add_space(theme.spacing);
            if switch_link(ui, theme, "Ba ku da account?", "Yi Rajista", "Go to register") {
                self.state.navigate(Route::Register);
            }
        });
    }
}

pub struct RegisterView<'a> {
    state: &'a mut AppState,
    theme: &'a Theme,
}

impl<'a> RegisterView<'a> {
    pub fn new(state: &'a mut AppState, theme: &'a Theme) -> Self {
        Self { state, theme }
    }

    pub fn show(self, ui: &mut egui::Ui) {
        let theme = self.theme;
        let enabled = !self.state.auth_pending;

        ui.vertical(|ui| {
            ui.add_space(theme.spacing_lg);
            ui.label(
                RichText::new("FarmerAI 🌿")
                    .size(26.0)
                    .strong()
                    .color(theme.primary_dark),
            );
            ui.label(
                RichText::new("Yi rajista don fara binciken amfanin gona").color(theme.text_muted),
            );
            ui.add_space(theme.spacing_lg);

            form_field(ui, theme, &FULL_NAME, &mut self.state.register.full_name, enabled);
            form_field(ui, theme, &EMAIL, &mut self.state.register.email, enabled);
            form_field(ui, theme, &PASSWORD, &mut self.state.register.password, enabled);

            if primary_button(ui, theme, "Yi Rajista", enabled, "Create account") {
                self.state.register_account();
            }
            if !enabled {
                ui.vertical_centered(|ui| {
                    ui.add(egui::Spinner::new().color(theme.primary));
                });
            }

            ui.add_space(theme.spacing);
            if switch_link(ui, theme, "Kuna da account?", "Shiga nan", "Go to sign in") {
                self.state.navigate(Route::Login);
            }
        });
    }
}
