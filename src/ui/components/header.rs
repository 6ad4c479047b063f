//! Home header: date line, greeting and the menu button

use super::label_widget;
use crate::ui::state::AppState;
use crate::ui::theme::Theme;
use crate::utils::{greeting_for_hour, hausa_date};
use chrono::{DateTime, Local, Timelike};
use egui::{RichText, WidgetType};

pub struct Header<'a> {
    state: &'a mut AppState,
    theme: &'a Theme,
    now: DateTime<Local>,
}

impl<'a> Header<'a> {
    pub fn new(state: &'a mut AppState, theme: &'a Theme) -> Self {
        Self {
            state,
            theme,
            now: Local::now(),
        }
    }

    /// Render as if the clock read `now`
    pub fn at(mut self, now: DateTime<Local>) -> Self {
        self.now = now;
        self
    }

    pub fn show(self, ui: &mut egui::Ui) {
        let name = self
            .state
            .session
            .session()
            .map(|s| s.display_label())
            .unwrap_or_default();

        ui.horizontal(|ui| {
            ui.vertical(|ui| {
                ui.label(
                    RichText::new(hausa_date(&self.now))
                        .size(13.0)
                        .color(self.theme.text_secondary),
                );
                let greeting = ui.label(
                    RichText::new(greeting_for_hour(self.now.hour()))
                        .size(20.0)
                        .strong()
                        .color(self.theme.primary_dark),
                );
                label_widget(&greeting, WidgetType::Label, true, "Greeting");
                if !name.is_empty() {
                    ui.label(RichText::new(name).size(14.0).color(self.theme.text_muted));
                }
            });

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let menu = ui.add_enabled(
                    !self.state.is_busy(),
                    egui::Button::new(RichText::new("⋮").size(22.0)).frame(false),
                );
                label_widget(&menu, WidgetType::Button, !self.state.is_busy(), "Open menu");
                if menu.clicked() {
                    self.state.menu_open = true;
                }
            });
        });
    }
}
