//! Current-weather card

use super::label_widget;
use crate::ui::theme::Theme;
use crate::weather::{WeatherReport, WeatherStatus};
use egui::{RichText, WidgetType};

const OUTLOOK: &str = "Zai iya yin ruwa anjima kaɗan";

pub struct WeatherCard<'a> {
    report: &'a WeatherReport,
    theme: &'a Theme,
}

impl<'a> WeatherCard<'a> {
    pub fn new(report: &'a WeatherReport, theme: &'a Theme) -> Self {
        Self { report, theme }
    }

    pub fn show(self, ui: &mut egui::Ui) {
        self.theme.card_frame().show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.horizontal(|ui| {
                ui.vertical(|ui| {
                    let temp = ui.label(
                        RichText::new(self.report.temperature_label())
                            .size(32.0)
                            .strong()
                            .color(self.theme.text_primary),
                    );
                    label_widget(
                        &temp,
                        WidgetType::Label,
                        true,
                        &format!(
                            "Weather: {} {}",
                            self.report.temperature_label(),
                            self.report.status.label()
                        ),
                    );
                    ui.label(
                        RichText::new(self.report.status.label())
                            .size(16.0)
                            .color(self.theme.primary),
                    );
                    ui.label(RichText::new(OUTLOOK).size(12.0).color(self.theme.text_muted));
                });

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.label(
                        RichText::new(status_icon(self.report.status))
                            .size(40.0)
                            .color(self.theme.accent),
                    );
                });
            });
        });
    }
}

fn status_icon(status: WeatherStatus) -> &'static str {
    match status {
        WeatherStatus::Clear => "☀",
        WeatherStatus::Cloudy => "☁",
        WeatherStatus::Rainy => "☔",
    }
}
