//! Main application struct and eframe integration
//!
//! This module contains the main FarmerApp that implements eframe::App.

use crate::integration::{AppCommand, OrchestratorHandle};
use crate::session::{GateDecision, Route};
use crate::ui::components::{
    label_widget, AlertDialog, CapturePanel, ConfirmDialog, Header, HistoryDetail, HistoryList,
    LoginView, PrivacyPanel, RegisterView, ResultCard, SideMenu, WeatherCard,
};
use crate::ui::state::AppState;
use crate::ui::theme::Theme;
use egui::{CentralPanel, RichText, TopBottomPanel, WidgetType};
use std::time::Duration;
use tracing::{error, info};

/// Events from the orchestrator arrive without user input
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Main FarmerAI application
pub struct FarmerApp {
    state: AppState,
    theme: Theme,
    handle: OrchestratorHandle,
    initialized: bool,
}

impl FarmerApp {
    pub fn new(cc: &eframe::CreationContext<'_>, handle: OrchestratorHandle) -> Self {
        let theme = Theme::field();
        theme.apply(&cc.egui_ctx);

        Self {
            state: AppState::new(),
            theme,
            handle,
            initialized: false,
        }
    }

    /// Resolve the session and fetch the weather (called on first frame)
    fn initialize(&mut self) {
        if self.initialized {
            return;
        }

        self.state.dispatch(AppCommand::Initialize);
        self.state.dispatch(AppCommand::RefreshWeather);
        self.initialized = true;
        info!("FarmerAI UI initialized");
    }

    fn poll_events(&mut self) {
        while let Some(event) = self.handle.try_recv_event() {
            self.state.apply(event);
        }
        self.state.sync_session(self.handle.session().state());
    }

    fn flush_commands(&mut self) {
        for command in self.state.take_commands() {
            if let Err(e) = self.handle.send_command(command) {
                error!("Dropping UI command: {}", e);
            }
        }
    }
}

impl eframe::App for FarmerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.initialize();
        self.poll_events();

        show_screens(ctx, &mut self.state, &self.theme);

        self.flush_commands();
        ctx.request_repaint_after(POLL_INTERVAL);
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        info!("FarmerAI shutting down");
        let _ = self.handle.send_command(AppCommand::Shutdown);
    }
}

/// Render the routed screen and any overlays for one frame
pub fn show_screens(ctx: &egui::Context, state: &mut AppState, theme: &Theme) {
    if state.apply_gate() == GateDecision::Wait {
        CentralPanel::default().show(ctx, |ui| {
            ui.centered_and_justified(|ui| {
                let spinner = ui.add(egui::Spinner::new().size(40.0).color(theme.primary));
                label_widget(&spinner, WidgetType::ProgressIndicator, true, "Starting");
            });
        });
        return;
    }

    match state.route {
        Route::Home => show_home(ctx, state, theme),
        Route::History => show_history(ctx, state, theme),
        Route::Login => {
            CentralPanel::default().show(ctx, |ui| LoginView::new(state, theme).show(ui));
        }
        Route::Register => {
            CentralPanel::default().show(ctx, |ui| RegisterView::new(state, theme).show(ui));
        }
    }

    SideMenu::new(state, theme).show(ctx);
    PrivacyPanel::new(state, theme).show(ctx);
    AlertDialog::new(state, theme).show(ctx);
}

fn show_home(ctx: &egui::Context, state: &mut AppState, theme: &Theme) {
    TopBottomPanel::top("header")
        .frame(egui::Frame::none().fill(theme.bg_primary).inner_margin(theme.spacing))
        .show(ctx, |ui| Header::new(state, theme).show(ui));

    show_footer(ctx, state, theme);

    CentralPanel::default()
        .frame(egui::Frame::none().fill(theme.bg_primary).inner_margin(theme.spacing))
        .show(ctx, |ui| {
            egui::ScrollArea::vertical()
                .id_salt("home")
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    WeatherCard::new(&state.weather, theme).show(ui);
                    ui.add_space(theme.spacing);
                    CapturePanel::new(state, theme).show(ui);
                    ui.add_space(theme.spacing);
                    ResultCard::new(state, theme).show(ui);
                });
        });

    ConfirmDialog::new(state, theme).show(ctx);
}

fn show_history(ctx: &egui::Context, state: &mut AppState, theme: &Theme) {
    show_footer(ctx, state, theme);

    CentralPanel::default()
        .frame(egui::Frame::none().fill(theme.bg_primary).inner_margin(theme.spacing))
        .show(ctx, |ui| HistoryList::new(state, theme).show(ui));

    HistoryDetail::new(state, theme).show(ctx);
}

fn show_footer(ctx: &egui::Context, state: &mut AppState, theme: &Theme) {
    TopBottomPanel::bottom("footer")
        .frame(egui::Frame::none().fill(theme.bg_card).inner_margin(theme.spacing_sm))
        .show(ctx, |ui| {
            ui.columns(2, |columns| {
                for (column, route, text, label) in [
                    (0, Route::Home, "🏠 Gida", "Home tab"),
                    (1, Route::History, "🌿 History", "History tab"),
                ] {
                    let ui = &mut columns[column];
                    ui.vertical_centered(|ui| {
                        let color = if state.route == route {
                            theme.primary
                        } else {
                            theme.text_muted
                        };
                        let enabled = !state.is_busy();
                        let tab = ui.add_enabled(
                            enabled,
                            egui::Button::new(RichText::new(text).color(color)).frame(false),
                        );
                        label_widget(&tab, WidgetType::Button, enabled, label);
                        if tab.clicked() {
                            state.navigate(route);
                        }
                    });
                }
            });
        });
}
