//! Modal alert with a single acknowledge button

use super::label_widget;
use crate::ui::state::AppState;
use crate::ui::theme::Theme;
use egui::{Align2, RichText, Vec2, WidgetType};

pub struct AlertDialog<'a> {
    state: &'a mut AppState,
    theme: &'a Theme,
}

impl<'a> AlertDialog<'a> {
    pub fn new(state: &'a mut AppState, theme: &'a Theme) -> Self {
        Self { state, theme }
    }

    pub fn show(self, ctx: &egui::Context) {
        let Some(alert) = self.state.active_alert() else {
            return;
        };

        egui::Window::new(RichText::new(&alert.title).strong())
            .id(egui::Id::new("alert_dialog"))
            .collapsible(false)
            .resizable(false)
            .anchor(Align2::CENTER_CENTER, Vec2::ZERO)
            .show(ctx, |ui| {
                let message = ui.label(RichText::new(&alert.message).color(self.theme.text_primary));
                label_widget(
                    &message,
                    WidgetType::Label,
                    true,
                    &format!("Alert: {}", alert.message),
                );

                ui.add_space(self.theme.spacing_sm);
                ui.vertical_centered(|ui| {
                    let ok = ui.add(
                        egui::Button::new(RichText::new("To").color(self.theme.text_on_primary))
                            .fill(self.theme.primary)
                            .rounding(self.theme.button_rounding),
                    );
                    label_widget(&ok, WidgetType::Button, true, "Close alert");
                    if ok.clicked() {
                        self.state.close_alert();
                    }
                });
            });
    }
}
