use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Result;
use axum::Router;
use tokio::net::TcpListener;

use resource_publisher::channel::LatchedBus;
use resource_publisher::cli::{self, Cli};
use resource_publisher::config::Settings;
use resource_publisher::error::ConfigurationError;
use resource_publisher::publisher;
use resource_publisher::server::{create_app, AppState};
use resource_publisher::shutdown::{wait_for_signal, ShutdownSignal};
use resource_publisher::telemetry;

#[tokio::main]
async fn main() -> ExitCode {
    let (cli, settings) = match startup() {
        Ok(started) => started,
        Err(ConfigurationError::Arguments(e)) if cli::is_informational(&e) => e.exit(),
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::from(e.exit_code() as u8);
        }
    };
    tracing::info!("Configuration loaded");

    match run(cli, settings).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => match e.downcast_ref::<ConfigurationError>() {
            Some(config_error) => {
                tracing::error!(error = %config_error, "Configuration error, nothing published");
                ExitCode::from(config_error.exit_code() as u8)
            }
            None => {
                tracing::error!(error = %e, "Publisher failed");
                ExitCode::FAILURE
            }
        },
    }
}

/// Parse arguments, load settings and install tracing
fn startup() -> Result<(Cli, Settings), ConfigurationError> {
    let cli = Cli::parse_from_args(std::env::args_os())?;
    let settings = Settings::load(cli.config.as_deref())?;
    telemetry::init_telemetry(&settings.log)?;
    Ok((cli, settings))
}

async fn run(cli: Cli, settings: Settings) -> Result<()> {
    let options = cli.publish_options();
    let bus = Arc::new(LatchedBus::new());

    let index = settings.package_index();
    tracing::debug!(prefixes = ?index.prefixes(), "Package search path");

    let mut coordinator = publisher::prepare(&options, &index, bus.clone())?;
    let report = coordinator.run(options.targets.clone())?;
    tracing::info!(
        state = ?coordinator.state(),
        published = report.published.len(),
        failed = report.failed.len(),
        "Serving latched channels"
    );

    let shutdown = ShutdownSignal::new();
    let signal_handle = {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            wait_for_signal().await;
            shutdown.trigger();
        })
    };

    // Channels are already latched; from here on only a signal ends the process
    if settings.server.enabled {
        let addr = settings.server_addr();
        let state = AppState::new(settings, bus.clone(), report, shutdown.clone());

        if let Err(e) = serve(&addr, create_app(state), shutdown.clone()).await {
            tracing::error!(
                addr = %addr,
                error = %e,
                "HTTP server unavailable, holding latched channels without it"
            );
        }
    } else {
        tracing::info!("HTTP server disabled, holding latched channels until shutdown");
    }
    shutdown.wait().await;

    signal_handle.abort();

    // Endpoints stay alive until here
    tracing::info!(
        channels = coordinator.publisher().endpoint_count(),
        publishes = coordinator.publisher().records().len(),
        "Releasing latched channels"
    );
    Ok(())
}

async fn serve(addr: &str, app: Router, shutdown: ShutdownSignal) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.wait().await })
        .await
}
