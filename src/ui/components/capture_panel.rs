//! Capture actions: camera, gallery and the question box

use super::label_widget;
use crate::capture::ImageSource;
use crate::ui::state::AppState;
use crate::ui::theme::Theme;
use egui::{Color32, Key, RichText, Vec2, WidgetType};

const SECTION_TITLE: &str = "Binciken FarmerAI";
const QUESTION_HINT: &str = "Rubuta tambayarka a nan...";

pub struct CapturePanel<'a> {
    state: &'a mut AppState,
    theme: &'a Theme,
}

impl<'a> CapturePanel<'a> {
    pub fn new(state: &'a mut AppState, theme: &'a Theme) -> Self {
        Self { state, theme }
    }

    pub fn show(mut self, ui: &mut egui::Ui) {
        let busy = self.state.is_busy();

        ui.label(
            RichText::new(SECTION_TITLE)
                .size(18.0)
                .strong()
                .color(self.theme.primary_dark),
        );
        ui.add_space(self.theme.spacing_sm);

        ui.horizontal(|ui| {
            let camera = self.action_button(ui, "📷", "Duba Shuka", self.theme.primary, busy);
            label_widget(&camera, WidgetType::Button, !busy, "Take photo");
            if camera.clicked() {
                self.state.pick(ImageSource::Camera);
            }

            ui.add_space(self.theme.spacing);

            let library = self.action_button(ui, "🖼", "Hoton Gona", self.theme.secondary, busy);
            label_widget(&library, WidgetType::Button, !busy, "Choose from gallery");
            if library.clicked() {
                self.state.pick(ImageSource::Library);
            }
        });

        ui.add_space(self.theme.spacing_sm);
        self.show_question(ui, busy);

        if busy {
            ui.add_space(self.theme.spacing_sm);
            ui.vertical_centered(|ui| {
                let spinner = ui.add(egui::Spinner::new().size(32.0).color(self.theme.primary));
                label_widget(&spinner, WidgetType::ProgressIndicator, true, "Analyzing");
            });
        }
    }

    fn action_button(
        &self,
        ui: &mut egui::Ui,
        icon: &str,
        caption: &str,
        fill: Color32,
        busy: bool,
    ) -> egui::Response {
        let text = RichText::new(format!("{}\n{}", icon, caption))
            .size(15.0)
            .color(self.theme.text_on_primary);
        let button = egui::Button::new(text)
            .fill(fill)
            .rounding(self.theme.card_rounding)
            .min_size(Vec2::new(140.0, 72.0));
        ui.add_enabled(!busy, button)
    }

    fn show_question(&mut self, ui: &mut egui::Ui, busy: bool) {
        ui.horizontal(|ui| {
            let mut text = self.state.question_input.clone();
            let edit = egui::TextEdit::singleline(&mut text)
                .hint_text(QUESTION_HINT)
                .desired_width(ui.available_width() - 80.0)
                .id(egui::Id::new("question_input"));
            let response = ui.add_enabled(!busy, edit);
            label_widget(&response, WidgetType::TextEdit, !busy, "Question input");

            if response.changed() {
                self.state.edit_question(text);
            }

            let enter = response.lost_focus() && ui.input(|i| i.key_pressed(Key::Enter));

            let can_send = self.state.can_send();
            let send = ui.add_enabled(
                can_send,
                egui::Button::new(RichText::new("Aika").color(self.theme.text_on_primary))
                    .fill(self.theme.primary)
                    .rounding(self.theme.button_rounding),
            );
            label_widget(&send, WidgetType::Button, can_send, "Send question");

            if send.clicked() || enter {
                self.state.submit();
            }
        });
    }
}
