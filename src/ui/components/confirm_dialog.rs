//! Approval dialog for a freshly picked image

use super::label_widget;
use crate::capture::CaptureState;
use crate::ui::state::AppState;
use crate::ui::theme::Theme;
use egui::{Align2, RichText, Vec2, WidgetType};

const TITLE: &str = "Tabbatar da Hoto";
const QUESTION: &str = "Shin hoton nan ya fito da kyau don bincike?";

pub struct ConfirmDialog<'a> {
    state: &'a mut AppState,
    theme: &'a Theme,
}

impl<'a> ConfirmDialog<'a> {
    pub fn new(state: &'a mut AppState, theme: &'a Theme) -> Self {
        Self { state, theme }
    }

    /// Shown while the flow is confirming, and while the confirmed image is being analyzed
    fn is_open(&self) -> bool {
        match self.state.flow.state {
            CaptureState::Confirming => true,
            CaptureState::Submitting => self.state.flow.draft.has_image(),
            _ => false,
        }
    }

    pub fn show(self, ctx: &egui::Context) {
        if !self.is_open() {
            return;
        }

        let busy = self.state.is_busy();
        let draft = self.state.flow.draft.clone();
        let texture = draft.image_preview_ref.as_deref().and_then(|key| {
            self.state
                .textures
                .get_or_load(ctx, key, || draft.thumbnail.as_deref().cloned())
        });

        egui::Window::new(TITLE)
            .collapsible(false)
            .resizable(false)
            .anchor(Align2::CENTER_CENTER, Vec2::ZERO)
            .show(ctx, |ui| {
                ui.vertical_centered(|ui| {
                    match &texture {
                        Some(texture) => {
                            let preview = ui.add(
                                egui::Image::new(texture).max_size(Vec2::new(300.0, 300.0)),
                            );
                            label_widget(&preview, WidgetType::Other, true, "Image preview");
                        }
                        None => {
                            let name = draft.image_preview_ref.as_deref().unwrap_or_default();
                            ui.label(RichText::new(format!("🖼 {}", name)).color(self.theme.text_muted));
                        }
                    }

                    ui.add_space(self.theme.spacing_sm);
                    ui.label(RichText::new(QUESTION).color(self.theme.text_secondary));

                    if busy {
                        let spinner =
                            ui.add(egui::Spinner::new().size(28.0).color(self.theme.primary));
                        label_widget(&spinner, WidgetType::ProgressIndicator, true, "Analyzing");
                    }

                    ui.add_space(self.theme.spacing_sm);
                    ui.horizontal(|ui| {
                        let retake = ui.add_enabled(
                            !busy,
                            egui::Button::new("Sake Ɗauka").rounding(self.theme.button_rounding),
                        );
                        label_widget(&retake, WidgetType::Button, !busy, "Retake photo");
                        if retake.clicked() {
                            self.state.retake();
                        }

                        let confirm = ui.add_enabled(
                            !busy,
                            egui::Button::new(
                                RichText::new("Fara Bincike").color(self.theme.text_on_primary),
                            )
                            .fill(self.theme.primary)
                            .rounding(self.theme.button_rounding),
                        );
                        label_widget(&confirm, WidgetType::Button, !busy, "Confirm photo");
                        if confirm.clicked() {
                            self.state.submit();
                        }
                    });
                });
            });
    }
}
