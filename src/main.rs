use bikeshare_dashboard::config::Config;
use bikeshare_dashboard::session::{DashboardSession, DashboardSnapshot, SessionCommand};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::signal;
use tokio::sync::watch;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Logs go to stderr, stdout carries snapshots
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,bikeshare_dashboard=debug")),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Bike-sharing dashboard starting...");

    let config = Config::load("config/config.yaml").map_err(|e| {
        anyhow::anyhow!(
            "Failed to load configuration: {}\n\n\
             Make sure:\n\
             1. config/config.yaml exists\n\
             2. All referenced environment variables are set (check .env.example)\n\
             3. Create a .env file if needed",
            e
        )
    })?;
    info!("Configuration loaded");

    let mut session = DashboardSession::load(&config).await.map_err(|e| {
        if e.is_load_error() {
            anyhow::anyhow!(
                "Failed to load dataset: {}\n\n\
                 Rides source: {}\n\
                 Temperature source: {}\n\n\
                 Check the path exists or the URL is reachable.",
                e,
                config.datasets.rides,
                config.datasets.temperature.as_deref().unwrap_or("(same as rides)")
            )
        } else {
            anyhow::anyhow!("Failed to prepare dataset: {}", e)
        }
    })?;

    if let Some(bounds) = session.date_bounds() {
        info!("Dataset covers {}", bounds);
    }

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    tokio::spawn(async move {
        shutdown_signal().await;
        let _ = shutdown_tx.send(true);
    });

    let initial = session.snapshot()?;
    emit(&initial).await?;

    run_event_loop(&mut session, shutdown_rx).await?;

    info!("Bike-sharing dashboard shutting down");
    Ok(())
}

/// Read one command per stdin line until EOF, `quit` or a shutdown signal.
async fn run_event_loop(
    session: &mut DashboardSession,
    mut shutdown_rx: watch::Receiver<bool>,
) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = shutdown_rx.changed() => {
                info!("Shutdown signal received, closing session");
                break;
            }
        };

        let Some(line) = line else {
            info!("Input closed, ending session");
            break;
        };

        if line.trim().is_empty() {
            continue;
        }

        let result = match line.parse::<SessionCommand>() {
            Ok(SessionCommand::Confirm(range)) => session.confirm(range),
            Ok(SessionCommand::Reset) => session.reset(),
            Ok(SessionCommand::Quit) => break,
            Err(e) => {
                warn!("Ignoring command '{}': {}", line.trim(), e);
                continue;
            }
        };

        match result {
            Ok(snapshot) => emit(&snapshot).await?,
            Err(e) => error!("Recompute failed: {}", e),
        }
    }

    Ok(())
}

async fn emit(snapshot: &DashboardSnapshot) -> anyhow::Result<()> {
    let mut stdout = tokio::io::stdout();
    let mut line = snapshot.to_json()?;
    line.push('\n');
    stdout.write_all(line.as_bytes()).await?;
    stdout.flush().await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown");
        }
    }
}
