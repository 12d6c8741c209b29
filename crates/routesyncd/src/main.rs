//! Route Synchronization Daemon
//!
//! Main entry point for the routesyncd daemon.
//! Mirrors container bridge routes from the main kernel table into a managed
//! routing table until SIGINT or SIGTERM.
//!
//! # NIST 800-53 Rev 5 Control Mappings
//! - AU-3: Content of Audit Records - Structured logging
//! - AU-12: Audit Record Generation - Log daemon lifecycle
//! - CM-6: Configuration Settings - CLI and TOML configuration
//! - SI-4: System Monitoring - Real-time event processing

use anyhow::Context;
use clap::Parser;
use routesyncd::{
    DockerRegistry, EngineOptions, KernelRouteSource, ManagedTable, RouteSyncEngine,
    RoutesyncConfig, SyncMode,
};
use std::path::PathBuf;
use std::process::ExitCode;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Mirror container bridge routes into a managed routing table
#[derive(Parser, Debug)]
#[command(name = "routesyncd")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Routing table ID that receives the bridge routes
    #[arg(long = "managed-rt", value_name = "ID")]
    managed_rt: u32,

    /// Sync every bridge-type interface, not only registry networks
    #[arg(long)]
    all_bridges: bool,

    /// Optional TOML configuration file
    #[arg(short = 'c', long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Docker Engine API socket (overrides the configuration file)
    #[arg(long, value_name = "PATH")]
    docker_socket: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
    #[arg(short = 'l', long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Help and version are reported as failures too.
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let _ = e.print();
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = init_logging(&args.log_level) {
        eprintln!("routesyncd: {:#}", e);
        return ExitCode::FAILURE;
    }

    match run_daemon(args).await {
        Ok(()) => {
            info!("routesyncd: Daemon exiting normally");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %format!("{:#}", e), "routesyncd: Daemon exiting with error");
            ExitCode::FAILURE
        }
    }
}

/// Initialize structured logging
///
/// `RUST_LOG` wins over `--log-level` when set.
fn init_logging(level: &str) -> anyhow::Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(level)
            .with_context(|| format!("invalid log level '{}'", level))?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_line_number(true)
        .compact()
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to set logger: {}", e))
}

/// Validated startup settings
#[derive(Debug)]
struct Settings {
    table: ManagedTable,
    mode: SyncMode,
    config: RoutesyncConfig,
}

fn load_settings(args: &Args) -> anyhow::Result<Settings> {
    let table = ManagedTable::new(args.managed_rt).context("invalid --managed-rt")?;
    let mode = SyncMode::from_all_bridges(args.all_bridges);

    let mut config =
        RoutesyncConfig::load(args.config.as_deref()).context("failed to load configuration")?;
    if let Some(socket) = &args.docker_socket {
        config.registry.socket_path = socket.clone();
    }

    Ok(Settings {
        table,
        mode,
        config,
    })
}

async fn run_daemon(args: Args) -> anyhow::Result<()> {
    let Settings {
        table,
        mode,
        config,
    } = load_settings(&args)?;

    let registry = DockerRegistry::new(&config.registry);
    let kernel = KernelRouteSource::new()
        .context("failed to open netlink socket")?
        .with_receive_buffer(config.events.receive_buffer_bytes);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        docker_socket = %registry.socket_path().display(),
        "routesyncd: Starting route synchronization daemon"
    );

    let options = EngineOptions::from_config(table, mode, &config);
    let mut engine = RouteSyncEngine::new(kernel, registry, options);
    info!(
        table = %engine.table(),
        mode = %engine.mode(),
        "routesyncd: Syncing bridge routes into managed table"
    );

    let cancel = CancellationToken::new();
    let signals = spawn_signal_listener(cancel.clone());

    let result = engine.run(cancel).await;
    signals.abort();

    result.context("route synchronization stopped")?;
    info!("routesyncd: Graceful shutdown complete");
    Ok(())
}

/// Cancel `cancel` on the first SIGINT or SIGTERM
fn spawn_signal_listener(cancel: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(async move {
        match wait_for_shutdown().await {
            Ok(signal) => {
                info!(signal, "routesyncd: Received shutdown signal");
                cancel.cancel();
            }
            Err(e) => {
                error!(error = %e, "routesyncd: Failed to listen for shutdown signals");
            }
        }
    })
}

#[cfg(unix)]
async fn wait_for_shutdown() -> std::io::Result<&'static str> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigterm = signal(SignalKind::terminate())?;
    tokio::select! {
        res = tokio::signal::ctrl_c() => res.map(|_| "SIGINT"),
        _ = sigterm.recv() => Ok("SIGTERM"),
    }
}

#[cfg(not(unix))]
async fn wait_for_shutdown() -> std::io::Result<&'static str> {
    tokio::signal::ctrl_c().await.map(|_| "SIGINT")
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use clap::error::ErrorKind;
    use std::io::Write;

    #[test]
    fn test_args_definition() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_minimal_args() {
        let args = Args::try_parse_from(["routesyncd", "--managed-rt", "100"]).unwrap();
        assert_eq!(args.managed_rt, 100);
        assert!(!args.all_bridges);
        assert!(args.config.is_none());
        assert!(args.docker_socket.is_none());
        assert_eq!(args.log_level, "info");
    }

    #[test]
    fn test_all_args() {
        let args = Args::try_parse_from([
            "routesyncd",
            "--managed-rt",
            "1000",
            "--all-bridges",
            "--config",
            "/etc/routesyncd.toml",
            "--docker-socket",
            "/run/docker.sock",
            "--log-level",
            "debug",
        ])
        .unwrap();
        assert_eq!(args.managed_rt, 1000);
        assert!(args.all_bridges);
        assert_eq!(args.config, Some(PathBuf::from("/etc/routesyncd.toml")));
        assert_eq!(args.docker_socket, Some(PathBuf::from("/run/docker.sock")));
        assert_eq!(args.log_level, "debug");
    }

    #[test]
    fn test_managed_table_required() {
        let err = Args::try_parse_from(["routesyncd"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn test_managed_table_must_be_numeric() {
        let err = Args::try_parse_from(["routesyncd", "--managed-rt", "main"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueValidation);
    }

    #[test]
    fn test_help_is_an_error() {
        let err = Args::try_parse_from(["routesyncd", "--help"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_reserved_table_fails_startup() {
        for id in ["0", "253", "254", "255"] {
            let args = Args::try_parse_from(["routesyncd", "--managed-rt", id]).unwrap();
            let err = load_settings(&args).unwrap_err();
            assert!(format!("{:#}", err).contains("invalid --managed-rt"));
        }
    }

    #[test]
    fn test_settings_from_args() {
        let args = Args::try_parse_from(["routesyncd", "--managed-rt", "100", "--all-bridges"])
            .unwrap();
        let settings = load_settings(&args).unwrap();
        assert_eq!(settings.table.id(), 100);
        assert_eq!(settings.mode, SyncMode::AllBridges);
        assert_eq!(settings.config, RoutesyncConfig::default());
    }

    #[test]
    fn test_docker_socket_overrides_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[registry]\nsocket_path = \"/run/podman/podman.sock\"\n\n[resolver]\nmax_attempts = 4"
        )
        .unwrap();
        let path = file.path().to_str().unwrap().to_string();

        let args = Args::try_parse_from([
            "routesyncd",
            "--managed-rt",
            "100",
            "--config",
            &path,
            "--docker-socket",
            "/run/docker.sock",
        ])
        .unwrap();
        let settings = load_settings(&args).unwrap();
        assert_eq!(settings.mode, SyncMode::RegistryOnly);
        assert_eq!(
            settings.config.registry.socket_path,
            PathBuf::from("/run/docker.sock")
        );
        assert_eq!(settings.config.resolver.max_attempts, 4);
    }

    #[test]
    fn test_missing_config_file_fails_startup() {
        let args = Args::try_parse_from([
            "routesyncd",
            "--managed-rt",
            "100",
            "--config",
            "/nonexistent/routesyncd.toml",
        ])
        .unwrap();
        let err = load_settings(&args).unwrap_err();
        assert!(format!("{:#}", err).contains("failed to load configuration"));
    }
}
