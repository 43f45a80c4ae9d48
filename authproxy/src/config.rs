//! Command-line configuration for the auth proxy binary.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

/// `yar-authproxy` flags, per `spec.md` §6.
#[derive(Debug, Parser)]
#[command(name = "yar-authproxy", version, about = "yar MAC authentication proxy")]
pub struct Cli {
    /// Logging verbosity.
    #[arg(long = "log", value_enum, default_value_t = LogLevel::Error)]
    pub log: LogLevel,

    /// Listen address, `host:port`.
    #[arg(long = "lon", default_value = "127.0.0.1:8000")]
    pub lon: SocketAddr,

    /// Credential service address, `host:port`.
    #[arg(long = "keyserver", default_value = "127.0.0.1:8070")]
    pub keyserver: SocketAddr,

    /// Application service address, `host:port`.
    #[arg(long = "appserver")]
    pub appserver: SocketAddr,

    /// Freshness window, in seconds.
    #[arg(long = "maxage", default_value_t = 30)]
    pub maxage: u64,

    /// Authentication method. Only `DAS` (the source's MAC scheme) is
    /// currently named in the spec.
    #[arg(long = "authmethod", value_enum, default_value_t = AuthMethod::Das)]
    pub authmethod: AuthMethod,

    /// Optional syslog-equivalent log destination: a file path additional
    /// log lines are appended to via a `tracing-appender` non-blocking
    /// file sink, alongside the default stderr output.
    #[arg(long = "syslog")]
    pub syslog: Option<PathBuf>,

    /// Optional log file path; wired through the same `tracing-appender`
    /// file sink as `--syslog`.
    #[arg(long = "logfile")]
    pub logfile: Option<PathBuf>,

    /// Fallback `Host` header host when absent or unparsable.
    #[arg(long = "host_if_not_found", default_value = "localhost")]
    pub host_if_not_found: String,

    /// Fallback `Host` header port when absent or unparsable.
    #[arg(long = "port_if_not_found", default_value_t = 80)]
    pub port_if_not_found: u16,

    /// Per-request timeout to the credential service and application
    /// service, in seconds.
    #[arg(long = "upstream_timeout", default_value_t = 10)]
    pub upstream_timeout_secs: u64,
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

/// Authentication method selector. `DAS` is the only scheme this pipeline
/// implements; the flag exists so an operator's deployment scripts that
/// already pass `--authmethod DAS` keep working unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum AuthMethod {
    /// The MAC scheme this proxy verifies.
    Das,
}

/// Runtime configuration derived from [`Cli`].
#[derive(Debug, Clone)]
pub struct Config {
    /// Listen address.
    pub lon: SocketAddr,
    /// Credential service base URL.
    pub keyserver_base_url: String,
    /// Application service base URL.
    pub appserver_base_url: String,
    /// Freshness window.
    pub maxage: Duration,
    /// Fallback `Host` header host.
    pub host_if_not_found: String,
    /// Fallback `Host` header port.
    pub port_if_not_found: u16,
    /// Per-request upstream timeout.
    pub upstream_timeout: Duration,
}

impl From<&Cli> for Config {
    fn from(cli: &Cli) -> Self {
        Config {
            lon: cli.lon,
            keyserver_base_url: format!("http://{}", cli.keyserver),
            appserver_base_url: format!("http://{}", cli.appserver),
            maxage: Duration::from_secs(cli.maxage),
            host_if_not_found: cli.host_if_not_found.clone(),
            port_if_not_found: cli.port_if_not_found,
            upstream_timeout: Duration::from_secs(cli.upstream_timeout_secs),
        }
    }
}
