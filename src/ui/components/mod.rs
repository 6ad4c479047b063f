//! UI components module
//!
//! Reusable pieces of the FarmerAI screens. Every interactive widget carries
//! an English accessibility label so tests can drive it through AccessKit.

pub mod alert;
pub mod auth_form;
pub mod capture_panel;
pub mod confirm_dialog;
pub mod header;
pub mod history_list;
pub mod result_card;
pub mod side_menu;
pub mod weather_card;

pub use alert::AlertDialog;
pub use auth_form::{LoginView, RegisterView};
pub use capture_panel::CapturePanel;
pub use confirm_dialog::ConfirmDialog;
pub use header::Header;
pub use history_list::{HistoryDetail, HistoryList};
pub use result_card::ResultCard;
pub use side_menu::{PrivacyPanel, SideMenu};
pub use weather_card::WeatherCard;

/// Attach an accessibility label to a widget response
pub(crate) fn label_widget(
    response: &egui::Response,
    kind: egui::WidgetType,
    enabled: bool,
    label: &str,
) {
    response.widget_info(|| egui::WidgetInfo::labeled(kind, enabled, label));
}
