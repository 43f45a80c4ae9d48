//! `yar-keyservice` binary entry point.

use std::fs::OpenOptions;
use std::path::Path;

use clap::Parser;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use yar_keyservice::{app, Cli, Config};

/// Open `path` for appending and wrap it in a `tracing-appender`
/// non-blocking writer. Appends rather than truncates so a restarted
/// process doesn't clobber prior log history.
fn open_appender(path: &Path) -> std::io::Result<(NonBlocking, WorkerGuard)> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    Ok(tracing_appender::non_blocking(file))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| cli.log.as_tracing_level().into());

    // `--logfile` and `--syslog` each name an independent file path this
    // build appends to via its own `tracing-appender` non-blocking sink,
    // alongside the default stderr output (spec.md §6; neither flag
    // speaks an actual syslog wire protocol). The worker guards are held
    // for the process's lifetime so buffered lines keep flushing until
    // shutdown.
    let mut guards: Vec<WorkerGuard> = Vec::new();

    let logfile_layer = match &cli.logfile {
        Some(path) => {
            let (writer, guard) = open_appender(path)?;
            guards.push(guard);
            Some(tracing_subscriber::fmt::layer().with_ansi(false).with_writer(writer))
        }
        None => None,
    };
    let syslog_layer = match &cli.syslog {
        Some(path) => {
            let (writer, guard) = open_appender(path)?;
            guards.push(guard);
            Some(tracing_subscriber::fmt::layer().with_ansi(false).with_writer(writer))
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .with(logfile_layer)
        .with(syslog_layer)
        .init();

    let config = Config::from(&cli);

    tracing::info!(lon = %config.lon, key_store = %config.key_store, "starting yar-keyservice");

    let listener = tokio::net::TcpListener::bind(config.lon).await?;
    let app = app(&config);
    axum::serve(listener, app).await?;

    Ok(())
}
