// # netwatchd - Connectivity Monitoring Daemon
//
// This daemon is a THIN integration layer. It is responsible for:
// 1. Reading configuration from environment variables
// 2. Initializing the runtime and tracing
// 3. Constructing the platform probe selected by configuration
// 4. Starting the connectivity notifier engine
//
// All connectivity logic (roster tracking, duplicate suppression,
// registration policy) lives in netwatch-core. Do not add it here.
//
// ## Configuration
//
// All configuration is done via environment variables:
//
// ### Probe
// - `NETWATCH_PROBE`: Platform probe to use (netlink, poll).
//   Defaults to netlink on Linux, poll elsewhere.
// - `NETWATCH_POLL_INTERVAL_SECS`: Snapshot interval for the poll probe
//
// ### Engine
// - `NETWATCH_POLICY`: When to hold the platform subscription
//   (always, foreground). Defaults to always; a daemon has no
//   application lifecycle to follow.
//
// ### Logging
// - `NETWATCH_LOG_LEVEL`: Log level (trace, debug, info, warn, error)
//
// ## Example
//
// ```bash
// export NETWATCH_PROBE=netlink
// export NETWATCH_POLICY=always
// export NETWATCH_LOG_LEVEL=info
//
// netwatchd
// ```

use anyhow::Result;
use std::env;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{Level, debug, error, info};
use tracing_subscriber::FmtSubscriber;

use netwatch_core::{
    ConnectionType, ConnectivityNotifier, NetworkId, NetworkObserver, NotifierConfig,
    PlatformProbe, RegistrationPolicy,
};

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime error (unexpected)
#[derive(Debug, Clone, Copy)]
enum NetwatchExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error (unexpected failure)
    RuntimeError = 2,
}

impl From<NetwatchExitCode> for ExitCode {
    fn from(code: NetwatchExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Application configuration
struct Config {
    probe_type: String,
    poll_interval_secs: Option<u64>,
    policy: String,
    log_level: String,
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Result<Self> {
        let poll_interval_secs = match env::var("NETWATCH_POLL_INTERVAL_SECS") {
            Ok(raw) => match raw.parse::<u64>() {
                Ok(secs) => Some(secs),
                Err(_) => anyhow::bail!(
                    "NETWATCH_POLL_INTERVAL_SECS must be an integer number of seconds. Got: {}",
                    raw
                ),
            },
            Err(_) => None,
        };

        Ok(Self {
            probe_type: env::var("NETWATCH_PROBE")
                .unwrap_or_else(|_| default_probe().to_string()),
            poll_interval_secs,
            policy: env::var("NETWATCH_POLICY").unwrap_or_else(|_| "always".to_string()),
            log_level: env::var("NETWATCH_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// Validate the configuration
    ///
    /// This performs comprehensive validation including:
    /// - Type enumeration validation
    /// - Platform support for the selected probe
    /// - Numeric range validation
    fn validate(&self) -> Result<()> {
        // Validate probe type
        match self.probe_type.as_str() {
            "netlink" | "poll" => {}
            _ => anyhow::bail!(
                "NETWATCH_PROBE '{}' is not supported. \
                Supported probes: netlink, poll",
                self.probe_type
            ),
        }

        if self.probe_type == "netlink" && !cfg!(target_os = "linux") {
            anyhow::bail!(
                "NETWATCH_PROBE=netlink requires Linux (rtnetlink is a Linux interface). \
                Use NETWATCH_PROBE=poll on this platform."
            );
        }

        // Validate poll interval range
        if let Some(interval) = self.poll_interval_secs
            && !(1..=3600).contains(&interval)
        {
            anyhow::bail!(
                "NETWATCH_POLL_INTERVAL_SECS must be between 1 and 3600 seconds. Got: {}",
                interval
            );
        }

        // Validate registration policy
        match self.policy.as_str() {
            "always" | "foreground" => {}
            _ => anyhow::bail!(
                "NETWATCH_POLICY '{}' is not valid. \
                Valid policies: always, foreground",
                self.policy
            ),
        }

        // Validate log level
        match self.log_level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!(
                "NETWATCH_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        }

        Ok(())
    }
}

/// Probe to use when `NETWATCH_PROBE` is unset.
fn default_probe() -> &'static str {
    if cfg!(target_os = "linux") {
        "netlink"
    } else {
        "poll"
    }
}

fn main() -> ExitCode {
    // Load configuration from environment
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return NetwatchExitCode::ConfigError.into();
        }
    };

    // Validate configuration
    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {}", e);
        return NetwatchExitCode::ConfigError.into();
    }

    // Initialize tracing
    let log_level = match config.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return NetwatchExitCode::ConfigError.into();
    }

    info!("Starting netwatchd daemon");
    info!(
        "Configuration loaded: probe={} policy={}",
        config.probe_type, config.policy
    );

    // Enter tokio runtime
    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return NetwatchExitCode::RuntimeError.into();
        }
    };

    let result = rt.block_on(async {
        if let Err(e) = run_daemon(config).await {
            error!("Daemon error: {}", e);
            NetwatchExitCode::RuntimeError
        } else {
            NetwatchExitCode::CleanShutdown
        }
    });

    result.into()
}

/// Run the daemon
async fn run_daemon(config: Config) -> Result<()> {
    let probe = build_probe(&config)?;
    info!("Platform probe: {}", probe.probe_name());

    let policy = match config.policy.as_str() {
        "foreground" => RegistrationPolicy::WhileForeground,
        _ => RegistrationPolicy::Always,
    };

    let (notifier, handle) =
        ConnectivityNotifier::new(probe, NotifierConfig::new().with_policy(policy));
    handle.add_observer(Arc::new(LoggingObserver));

    let notifier_task = tokio::spawn(notifier.run());

    info!("Daemon initialized successfully");
    info!("Watching for connectivity changes");

    let signal = wait_for_shutdown().await?;
    info!("Received shutdown signal: {}", signal);
    info!("Shutting down daemon");

    handle.shutdown().await?;
    notifier_task.await??;

    Ok(())
}

/// Construct the platform probe selected by configuration.
///
/// `Config::validate` has already rejected probe types the current
/// platform cannot run, so an unmatched arm here is a configuration
/// error slipping through rather than a platform limitation.
fn build_probe(config: &Config) -> Result<Arc<dyn PlatformProbe>> {
    match config.probe_type.as_str() {
        #[cfg(target_os = "linux")]
        "netlink" => Ok(Arc::new(netwatch_probe_netlink::NetlinkProbe::new())),
        #[cfg(unix)]
        "poll" => {
            let probe = match config.poll_interval_secs {
                Some(secs) => netwatch_probe_poll::PollProbe::with_interval(
                    std::time::Duration::from_secs(secs),
                ),
                None => netwatch_probe_poll::PollProbe::new(),
            };
            Ok(Arc::new(probe))
        }
        other => anyhow::bail!(
            "NETWATCH_PROBE '{}' is not supported on this platform",
            other
        ),
    }
}

/// Observer that reports every connectivity change on the log stream.
///
/// This is the daemon's entire output surface. Library embedders would
/// register their own observers instead.
struct LoggingObserver;

impl NetworkObserver for LoggingObserver {
    fn on_connection_type_changed(&self, new_type: ConnectionType) {
        info!(%new_type, "connection type changed");
    }

    fn on_max_bandwidth_changed(&self, max_bandwidth_mbps: f64) {
        info!(max_bandwidth_mbps, "max bandwidth changed");
    }

    fn on_network_connected(&self, id: NetworkId, connection_type: ConnectionType) {
        debug!(%id, %connection_type, "network connected");
    }

    fn on_network_soon_to_disconnect(&self, id: NetworkId) {
        debug!(%id, "network soon to disconnect");
    }

    fn on_network_disconnected(&self, id: NetworkId) {
        debug!(%id, "network disconnected");
    }

    fn on_network_list_purged(&self, active: &[NetworkId]) {
        debug!(?active, "network list purged");
    }
}

/// Wait for shutdown signals (SIGTERM, SIGINT)
///
/// # Returns
///
/// Returns the name of the signal received.
#[cfg(unix)]
async fn wait_for_shutdown() -> Result<&'static str> {
    // Set up signal handlers for SIGTERM and SIGINT
    let mut sigterm = signal(SignalKind::terminate())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGTERM handler: {}", e))?;
    let mut sigint = signal(SignalKind::interrupt())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGINT handler: {}", e))?;

    let signal = tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
    };

    Ok(signal)
}

/// Wait for shutdown (CTRL-C only)
///
/// Fallback implementation for non-Unix platforms.
#[cfg(not(unix))]
async fn wait_for_shutdown() -> Result<&'static str> {
    tokio::signal::ctrl_c()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to wait for CTRL-C: {}", e))?;

    Ok("SIGINT")
}
