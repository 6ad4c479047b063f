use anyhow::{anyhow, Context, Result};
use farmerai::config::AppConfig;
use farmerai::integration::{AppCommand, AppServices, Orchestrator};
use farmerai::session::session_context;
use farmerai::ui::FarmerApp;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "farmerai=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting FarmerAI");

    let config = AppConfig::load().context("loading configuration")?;
    config.validate().context("validating configuration")?;

    let (writer, reader) = session_context();
    let services = AppServices::from_config(&config, reader).context("building services")?;
    let (orchestrator, handle) =
        Orchestrator::new(services, writer).context("creating orchestrator")?;
    let worker = orchestrator.start().context("starting orchestrator")?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("FarmerAI")
            .with_inner_size([420.0, 820.0])
            .with_min_inner_size([360.0, 600.0]),
        ..Default::default()
    };

    let app_handle = handle.clone();
    let result = eframe::run_native(
        "FarmerAI",
        options,
        Box::new(move |cc| Ok(Box::new(FarmerApp::new(cc, app_handle)))),
    );

    // The window may close without on_exit on some platforms
    let _ = handle.send_command(AppCommand::Shutdown);
    if worker.join().is_err() {
        error!("Orchestrator thread panicked");
    }

    result.map_err(|e| anyhow!("GUI error: {}", e))
}
