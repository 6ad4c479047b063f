//! UI components and application module
//!
//! This module provides the egui/eframe-based user interface for FarmerAI.

mod app;
pub mod components;
mod state;
mod theme;

pub use app::{show_screens, FarmerApp};
pub use state::{
    Alert, AppState, HistoryStatus, HistoryView, LoginForm, RegisterForm, TextureCache,
    AUTH_ERROR_TITLE, ERROR_TITLE, REGISTERED_MESSAGE, REGISTERED_TITLE,
};
pub use theme::Theme;
