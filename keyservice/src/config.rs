//! Command-line configuration for the credential service binary.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use yar_keystore::StoreAddress;

/// `yar-keyservice` flags.
#[derive(Debug, Parser)]
#[command(name = "yar-keyservice", version, about = "yar credential service")]
pub struct Cli {
    /// Logging verbosity.
    #[arg(long = "log", value_enum, default_value_t = LogLevel::Error)]
    pub log: LogLevel,

    /// Listen address, `host:port`.
    #[arg(long = "lon", default_value = "127.0.0.1:8070")]
    pub lon: SocketAddr,

    /// Document-database address, `host:port/db`.
    #[arg(long = "key_store")]
    pub key_store: StoreAddress,

    /// Per-request timeout to the document database, in seconds.
    #[arg(long = "store_timeout", default_value_t = 10)]
    pub store_timeout_secs: u64,

    /// Optional syslog-equivalent log destination: a file path additional
    /// log lines are appended to via a `tracing-appender` non-blocking
    /// file sink, alongside the default stderr output.
    #[arg(long = "syslog")]
    pub syslog: Option<PathBuf>,

    /// Optional log file path; wired through the same `tracing-appender`
    /// file sink as `--syslog`.
    #[arg(long = "logfile")]
    pub logfile: Option<PathBuf>,
}

/// `--log` levels, matching `spec.md`'s five-level grammar.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum LogLevel {
    /// Most verbose.
    Debug,
    /// Informational.
    Info,
    /// Default.
    Warning,
    /// Errors only.
    Error,
    /// Catastrophic failures only.
    Critical,
    /// Alias accepted for interop with the source's logging module.
    Fatal,
}

impl LogLevel {
    /// Map onto a `tracing`/`EnvFilter` level name.
    pub fn as_tracing_level(self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warning => "warn",
            LogLevel::Error => "error",
            LogLevel::Critical | LogLevel::Fatal => "error",
        }
    }
}

/// Runtime configuration derived from [`Cli`].
#[derive(Debug, Clone)]
pub struct Config {
    /// Listen address.
    pub lon: SocketAddr,
    /// Document-database address.
    pub key_store: StoreAddress,
    /// Per-request key store timeout.
    pub store_timeout: Duration,
}

impl From<&Cli> for Config {
    fn from(cli: &Cli) -> Self {
        Config {
            lon: cli.lon,
            key_store: cli.key_store.clone(),
            store_timeout: Duration::from_secs(cli.store_timeout_secs),
        }
    }
}
