// # ddns-sync - one-shot DNS reconciler
//
// This binary is a THIN integration layer: it reads settings, initializes
// logging and the runtime, wires the collaborators, and runs the
// reconciliation once. All decision logic lives in ddns-core.
//
// The ddns-sync binary is responsible for:
// 1. Reading settings from environment variables
// 2. Loading the JSON configuration file
// 3. Building the HTTP IP resolver and the Cloud DNS zone store
// 4. Running the SyncRunner once and mapping the result to an exit code
//
// It is meant to be invoked periodically by an external scheduler
// (cron, systemd timer). It never loops or retries.
//
// ## Settings
//
// - `DDNS_CONFIG`: Path to the configuration file (default `./config.json`)
// - `DDNS_LOG_LEVEL`: trace, debug, info, warn, error (default info)
// - `DDNS_MODE`: `live` or `dry-run` (default live)
// - `GOOGLE_APPLICATION_CREDENTIALS`: Service account key file, used when
//   the configuration has no `keyFileLocation`
//
// ## Example
//
// ```bash
// cat > /etc/ddns/config.json <<'JSON'
// {
//   "projectId": "my-project",
//   "keyFileLocation": "/etc/ddns/service-account.json",
//   "zoneName": "home-zone",
//   "dnsNames": ["home.example.com", "vpn.example.com"]
// }
// JSON
//
// DDNS_CONFIG=/etc/ddns/config.json ddns-sync
// ```

use anyhow::Result;
use ddns_core::{Error, RunOutcome, SyncConfig, SyncRunner};
use ddns_ip_http::HttpIpResolver;
use ddns_provider_gcloud::CloudDnsStore;
use std::env;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{Level, debug, error, info};
use tracing_subscriber::FmtSubscriber;

const DEFAULT_CONFIG_PATH: &str = "./config.json";

/// Exit codes for the possible run results
///
/// - 0: The zone is up to date (changed or not)
/// - 1: Configuration error (settings, config file, credentials)
/// - 2: Runtime error (IP resolution, zone read, zone write)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DdnsExitCode {
    Success = 0,
    ConfigError = 1,
    RuntimeError = 2,
}

impl From<DdnsExitCode> for ExitCode {
    fn from(code: DdnsExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

impl From<&Error> for DdnsExitCode {
    fn from(error: &Error) -> Self {
        if error.is_config() {
            DdnsExitCode::ConfigError
        } else {
            DdnsExitCode::RuntimeError
        }
    }
}

/// Process settings read from the environment
#[derive(Debug, Clone, PartialEq, Eq)]
struct Settings {
    config_path: PathBuf,
    log_level: String,
    mode: String,
    credentials_env: Option<String>,
}

impl Settings {
    /// Load settings from environment variables
    fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            config_path: lookup("DDNS_CONFIG")
                .filter(|p| !p.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string())
                .into(),
            log_level: lookup("DDNS_LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            mode: lookup("DDNS_MODE").unwrap_or_else(|| "live".to_string()),
            credentials_env: lookup("GOOGLE_APPLICATION_CREDENTIALS")
                .filter(|p| !p.trim().is_empty()),
        }
    }

    /// Validate the settings
    fn validate(&self) -> Result<()> {
        match self.log_level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!(
                "DDNS_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        }

        match self.mode.to_lowercase().as_str() {
            "live" | "dry-run" => {}
            _ => anyhow::bail!(
                "DDNS_MODE '{}' is not valid. Valid modes: live, dry-run",
                self.mode
            ),
        }

        Ok(())
    }

    fn log_level(&self) -> Level {
        match self.log_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        }
    }

    fn dry_run(&self) -> bool {
        self.mode.eq_ignore_ascii_case("dry-run")
    }
}

/// Pick the service account key file: configuration first, then environment
fn key_file_path(config: &SyncConfig, credentials_env: Option<&str>) -> Result<PathBuf, Error> {
    config
        .key_file_location
        .as_deref()
        .filter(|p| !p.trim().is_empty())
        .or(credentials_env)
        .map(PathBuf::from)
        .ok_or_else(|| {
            Error::config(
                "No service account key: set keyFileLocation in the configuration \
                or GOOGLE_APPLICATION_CREDENTIALS",
            )
        })
}

fn main() -> ExitCode {
    let settings = Settings::from_env();

    if let Err(e) = settings.validate() {
        eprintln!("Configuration validation error: {}", e);
        return DdnsExitCode::ConfigError.into();
    }

    let subscriber = FmtSubscriber::builder()
        .with_max_level(settings.log_level())
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return DdnsExitCode::ConfigError.into();
    }

    info!("********************");
    info!(
        "{} - updating dynamic dns entries",
        chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
    );

    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return DdnsExitCode::RuntimeError.into();
        }
    };

    let code = rt.block_on(async {
        match run_once(&settings).await {
            Ok(outcome) => {
                debug!("Run outcome: {:?}", outcome);
                info!("done");
                DdnsExitCode::Success
            }
            Err(e) => {
                error!("Run failed: {}", e);
                DdnsExitCode::from(&e)
            }
        }
    });

    code.into()
}

/// Load the configuration, wire the collaborators, and reconcile once
async fn run_once(settings: &Settings) -> Result<RunOutcome, Error> {
    let config = SyncConfig::from_file(&settings.config_path)?;
    config.validate()?;
    info!(
        "Configuration loaded from {}: {} name(s) in zone {}",
        settings.config_path.display(),
        config.dns_names.len(),
        config.zone_name
    );

    let key_file = key_file_path(&config, settings.credentials_env.as_deref())?;

    let resolver = HttpIpResolver::from_config(&config)?;
    let store = CloudDnsStore::from_key_file(&config.project_id, &key_file, settings.dry_run())?;
    if store.is_dry_run() {
        info!("Running in dry-run mode: no change will be submitted");
    }

    let (runner, mut events) = SyncRunner::new(Box::new(resolver), Box::new(store), &config)?;

    let monitor = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            debug!("Run event: {:?}", event);
        }
    });

    let result = runner.run().await;

    // Closing the sender ends the monitor
    drop(runner);
    let _ = monitor.await;

    result
}
