//! Integration layer connecting the UI to the services

pub mod orchestrator;
pub mod services;

pub use orchestrator::{AppCommand, AppEvent, Orchestrator, OrchestratorHandle};
pub use services::AppServices;
