//! History screen: record list and the detail overlay

use super::label_widget;
use crate::history::HistoryRecord;
use crate::ui::state::{AppState, HistoryStatus};
use crate::ui::theme::Theme;
use crate::utils::imaging::thumbnail_from_data_uri;
use chrono::Local;
use egui::{Align2, RichText, Sense, TextureHandle, Vec2, WidgetType};
use tracing::debug;

const TITLE: &str = "Tarihin Bincike";
const EMPTY_TEXT: &str = "Baka yi bincike ko daya ba tukunna.";
const SNIPPET_CHARS: usize = 90;

fn format_date(record: &HistoryRecord) -> String {
    record
        .created_at
        .with_timezone(&Local)
        .format("%d/%m/%Y %H:%M")
        .to_string()
}

/// Cached thumbnail for a record's inline image
fn record_texture(
    state: &mut AppState,
    ctx: &egui::Context,
    record: &HistoryRecord,
) -> Option<TextureHandle> {
    let uri = record.image_payload.as_deref().filter(|_| record.has_image())?;
    let key = format!("history:{}", record.id);
    state.textures.get_or_load(ctx, &key, || match thumbnail_from_data_uri(uri) {
        Ok(thumb) => Some(thumb),
        Err(e) => {
            debug!("No preview for record {}: {}", record.id, e);
            None
        }
    })
}

pub struct HistoryList<'a> {
    state: &'a mut AppState,
    theme: &'a Theme,
}

impl<'a> HistoryList<'a> {
    pub fn new(state: &'a mut AppState, theme: &'a Theme) -> Self {
        Self { state, theme }
    }

    pub fn show(self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.label(
                RichText::new(TITLE)
                    .size(20.0)
                    .strong()
                    .color(self.theme.primary_dark),
            );
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let loading = self.state.history.status == HistoryStatus::Loading;
                let refresh = ui.add_enabled(!loading, egui::Button::new("⟳").frame(false));
                label_widget(&refresh, WidgetType::Button, !loading, "Refresh history");
                if refresh.clicked() {
                    self.state.refresh_history();
                }
            });
        });
        ui.add_space(self.theme.spacing_sm);

        match self.state.history.status.clone() {
            HistoryStatus::NotLoaded | HistoryStatus::Loading => {
                ui.vertical_centered(|ui| {
                    let spinner = ui.add(egui::Spinner::new().size(32.0).color(self.theme.primary));
                    label_widget(&spinner, WidgetType::ProgressIndicator, true, "Loading history");
                });
            }
            HistoryStatus::Failed(message) => {
                let label = ui.label(RichText::new(&message).color(self.theme.error));
                label_widget(&label, WidgetType::Label, true, &format!("History error: {}", message));
            }
            HistoryStatus::Loaded if self.state.history.records.is_empty() => {
                ui.vertical_centered(|ui| {
                    ui.add_space(self.theme.spacing_lg);
                    let empty = ui.label(RichText::new(EMPTY_TEXT).color(self.theme.text_muted));
                    label_widget(&empty, WidgetType::Label, true, "No history yet");
                });
            }
            HistoryStatus::Loaded => self.show_records(ui),
        }
    }

    fn show_records(self, ui: &mut egui::Ui) {
        let records = self.state.history.records.clone();

        egui::ScrollArea::vertical()
            .id_salt("history_records")
            .auto_shrink([false, false])
            .show(ui, |ui| {
                for record in &records {
                    let texture = record_texture(self.state, ui.ctx(), record);
                    let response = entry_card(self.theme, ui, record, texture.as_ref());
                    label_widget(
                        &response,
                        WidgetType::Button,
                        true,
                        &format!("History entry: {}", record.title()),
                    );
                    if response.clicked() {
                        self.state.select_record(Some(record.id.clone()));
                    }
                    ui.add_space(self.theme.spacing_sm);
                }
            });
    }
}

fn entry_card(
    theme: &Theme,
    ui: &mut egui::Ui,
    record: &HistoryRecord,
    texture: Option<&TextureHandle>,
) -> egui::Response {
    let inner = theme.card_frame().show(ui, |ui| {
        ui.set_width(ui.available_width());
        ui.horizontal(|ui| {
            match texture {
                Some(texture) => {
                    ui.add(egui::Image::new(texture).fit_to_exact_size(Vec2::splat(56.0)));
                }
                None => {
                    ui.label(RichText::new("💬").size(32.0).color(theme.primary));
                }
            }

            ui.vertical(|ui| {
                ui.label(
                    RichText::new(format_date(record))
                        .size(11.0)
                        .color(theme.text_muted),
                );
                ui.label(
                    RichText::new(record.title())
                        .size(15.0)
                        .strong()
                        .color(theme.text_primary),
                );
                ui.add(
                    egui::Label::new(
                        RichText::new(record.snippet(SNIPPET_CHARS))
                            .size(13.0)
                            .color(theme.text_secondary),
                    )
                    .wrap(),
                );
            });
        });
    });
    inner.response.interact(Sense::click())
}

/// Full-detail overlay for the selected record
pub struct HistoryDetail<'a> {
    state: &'a mut AppState,
    theme: &'a Theme,
}

impl<'a> HistoryDetail<'a> {
    pub fn new(state: &'a mut AppState, theme: &'a Theme) -> Self {
        Self { state, theme }
    }

    pub fn show(self, ctx: &egui::Context) {
        let Some(record) = self.state.history.selected_record().cloned() else {
            return;
        };
        let texture = record_texture(self.state, ctx, &record);

        egui::Window::new(RichText::new(record.title()).strong())
            .id(egui::Id::new("history_detail"))
            .collapsible(false)
            .resizable(false)
            .anchor(Align2::CENTER_CENTER, Vec2::ZERO)
            .show(ctx, |ui| {
                ui.label(
                    RichText::new(format_date(&record))
                        .size(12.0)
                        .color(self.theme.text_muted),
                );

                if let Some(texture) = &texture {
                    ui.vertical_centered(|ui| {
                        ui.add(egui::Image::new(texture).max_size(Vec2::new(300.0, 220.0)));
                    });
                }

                if let Some(question) = record.question_text.as_deref().filter(|q| !q.trim().is_empty()) {
                    ui.label(RichText::new("Tambayar Ka:").strong().color(self.theme.primary_dark));
                    ui.label(RichText::new(question).color(self.theme.text_primary));
                    ui.add_space(self.theme.spacing_sm);
                }

                ui.label(RichText::new("Amsar FarmerAI:").strong().color(self.theme.primary_dark));
                egui::ScrollArea::vertical()
                    .id_salt("history_detail_body")
                    .max_height(260.0)
                    .show(ui, |ui| {
                        let body = ui.label(RichText::new(&record.result_text).color(self.theme.text_primary));
                        label_widget(
                            &body,
                            WidgetType::Label,
                            true,
                            &format!("Detail result: {}", record.result_text),
                        );
                    });

                ui.add_space(self.theme.spacing_sm);
                ui.vertical_centered(|ui| {
                    let close = ui.add(
                        egui::Button::new(RichText::new("Rufe").color(self.theme.text_on_primary))
                            .fill(self.theme.primary)
                            .rounding(self.theme.button_rounding),
                    );
                    label_widget(&close, WidgetType::Button, true, "Close detail");
                    if close.clicked() {
                        self.state.select_record(None);
                    }
                });
            });
    }
}
