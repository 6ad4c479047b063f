//! Result card, or the info card when there is no result

use super::label_widget;
use crate::ui::state::AppState;
use crate::ui::theme::Theme;
use egui::{RichText, WidgetType};

const RESULT_TITLE: &str = "Sakamakon FarmerAI";
const DISMISS_LABEL: &str = "Goge/Sake Wani";
const INFO_TEXT: &str =
    "FarmerAI zai taimake ka gano cutar shuka da kuma ingancin ƙasarka cikin daƙiƙu kadan.";

pub struct ResultCard<'a> {
    state: &'a mut AppState,
    theme: &'a Theme,
}

impl<'a> ResultCard<'a> {
    pub fn new(state: &'a mut AppState, theme: &'a Theme) -> Self {
        Self { state, theme }
    }

    pub fn show(self, ui: &mut egui::Ui) {
        match self.state.flow.result_text.clone() {
            Some(result) => self.show_result(ui, &result),
            None => self.show_info(ui),
        }
    }

    fn show_result(self, ui: &mut egui::Ui, result: &str) {
        let busy = self.state.is_busy();

        self.theme
            .card_frame()
            .fill(self.theme.bg_result)
            .show(ui, |ui| {
                ui.set_width(ui.available_width());
                ui.horizontal(|ui| {
                    ui.label(
                        RichText::new(RESULT_TITLE)
                            .size(17.0)
                            .strong()
                            .color(self.theme.primary_dark),
                    );
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        let replay = ui.add_enabled(
                            !busy,
                            egui::Button::new(RichText::new("🔊").size(20.0)).frame(false),
                        );
                        label_widget(&replay, WidgetType::Button, !busy, "Replay narration");
                        if replay.clicked() {
                            self.state.replay();
                        }
                    });
                });

                let body = ui.label(RichText::new(result).size(15.0).color(self.theme.text_primary));
                label_widget(&body, WidgetType::Label, true, &format!("Result: {}", result));

                ui.add_space(self.theme.spacing_sm);
                let dismiss = ui.add_enabled(
                    !busy,
                    egui::Button::new(RichText::new(DISMISS_LABEL).color(self.theme.text_on_primary))
                        .fill(self.theme.primary)
                        .rounding(self.theme.button_rounding),
                );
                label_widget(&dismiss, WidgetType::Button, !busy, "Dismiss result");
                if dismiss.clicked() {
                    self.state.dismiss_result();
                }
            });
    }

    fn show_info(self, ui: &mut egui::Ui) {
        self.theme.card_frame().show(ui, |ui| {
            ui.set_width(ui.available_width());
            let info = ui.label(RichText::new(INFO_TEXT).size(14.0).color(self.theme.text_secondary));
            label_widget(&info, WidgetType::Label, true, "About FarmerAI");
        });
    }
}
