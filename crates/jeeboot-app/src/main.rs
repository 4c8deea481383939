//! JeeBoot status view: entry point.
//!
//! Starts the `myApp` application, connects to the jeebus backend in the
//! background, activates the route for the start path, and logs the rendered
//! view.  Runs until Ctrl+C.
//!
//! # Usage
//!
//! ```text
//! jeeboot-app [OPTIONS]
//!
//! Options:
//!   --config      <FILE>  TOML configuration file
//!   --backend-url <URL>   jeebus WebSocket URL [default: ws://127.0.0.1:3333/ws]
//!   --service     <NAME>  Service name to connect to [default: jeebus]
//!   --assets-dir  <DIR>   Template directory [default: assets]
//!   --path        <PATH>  Path to navigate to at startup [default: /]
//! ```
//!
//! Flags take precedence over the configuration file; every flag can also be
//! set through the `JEEBOOT_*` variable listed in `--help`.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use jeeboot_app::application::{
    AppRegistry, BackendClient, BackendHandle, ControllerRegistry, FeatureSet, RouteTable,
};
use jeeboot_app::domain::AppConfig;
use jeeboot_app::infrastructure::{FsTemplateSource, JeebusClient};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// JeeBoot status view.
#[derive(Debug, Parser)]
#[command(
    name = "jeeboot-app",
    about = "Bootstraps the JeeBoot status view and connects it to jeebus",
    version
)]
struct Cli {
    /// TOML configuration file.  Missing fields use their defaults.
    #[arg(long, env = "JEEBOOT_CONFIG")]
    config: Option<PathBuf>,

    /// WebSocket URL of the jeebus backend.
    #[arg(long, env = "JEEBOOT_BACKEND_URL")]
    backend_url: Option<String>,

    /// Service name to connect to.
    #[arg(long, env = "JEEBOOT_SERVICE")]
    service: Option<String>,

    /// Directory containing `jeeboot.html`.
    #[arg(long, env = "JEEBOOT_ASSETS_DIR")]
    assets_dir: Option<PathBuf>,

    /// Path navigated to once startup has finished.
    #[arg(long, env = "JEEBOOT_PATH")]
    path: Option<String>,
}

impl Cli {
    /// Builds the runtime configuration: the file (if any), then flags.
    ///
    /// # Errors
    ///
    /// Returns an error if `--config` names a file that cannot be read or
    /// parsed.
    fn into_app_config(self) -> anyhow::Result<AppConfig> {
        let mut config = match &self.config {
            Some(path) => AppConfig::load(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => AppConfig::default(),
        };

        if let Some(url) = self.backend_url {
            config.backend_url = url;
        }
        if let Some(service) = self.service {
            config.service_name = service;
        }
        if let Some(dir) = self.assets_dir {
            config.assets_dir = dir;
        }
        if let Some(path) = self.path {
            config.start_path = path;
        }
        Ok(config)
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Cli::parse().into_app_config()?;
    info!(
        "JeeBoot starting: backend={}, assets={}",
        config.backend_url,
        config.assets_dir.display()
    );

    // A missing feature stops the process here with a non-zero exit.
    let registry = AppRegistry::jeeboot(&FeatureSet::builtin(), &config.service_name)
        .context("application failed to load")?;

    let jeebus = Arc::new(JeebusClient::new(config.backend_url.clone()));
    let mut events = jeebus.subscribe();
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => debug!("jeebus event: {event}"),
                Err(RecvError::Lagged(n)) => warn!("jeebus: dropped {n} events"),
                Err(RecvError::Closed) => break,
            }
        }
    });

    let backend: BackendHandle = jeebus.clone();
    let app = registry
        .start(backend)
        .context("application failed to start")?;

    // ── Initial navigation ────────────────────────────────────────────────────
    let templates = Arc::new(FsTemplateSource::new(config.assets_dir.clone()));
    let mut router = app.router(
        RouteTable::jeeboot(),
        ControllerRegistry::builtin(),
        templates,
    );

    match router.navigate(&config.start_path).await {
        Ok(view) => {
            info!(
                "view {:?} active, controller {}",
                view.route.name,
                view.controller.name()
            );
            info!("rendered {}:\n{}", view.route.template_resource, app.render(&view.template));
        }
        Err(e) => warn!("navigation to {:?} failed: {e}; state {}", config.start_path, router.state()),
    }

    // ── Run until Ctrl+C ──────────────────────────────────────────────────────
    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for Ctrl+C")?;

    info!("shutting down, jeebus link {:?}", jeebus.status());
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn cli(args: &[&str]) -> Cli {
        Cli::parse_from(std::iter::once("jeeboot-app").chain(args.iter().copied()))
    }

    #[test]
    fn test_no_flags_gives_default_config() {
        // Arrange
        let cli = Cli {
            config: None,
            backend_url: None,
            service: None,
            assets_dir: None,
            path: None,
        };

        // Act
        let config = cli.into_app_config().unwrap();

        // Assert
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_flags_override_defaults() {
        let config = cli(&[
            "--backend-url",
            "ws://hub:3333/ws",
            "--service",
            "jeebus2",
            "--assets-dir",
            "/srv/jeeboot",
            "--path",
            "/?x=1",
        ])
        .into_app_config()
        .unwrap();

        assert_eq!(config.backend_url, "ws://hub:3333/ws");
        assert_eq!(config.service_name, "jeebus2");
        assert_eq!(config.assets_dir, PathBuf::from("/srv/jeeboot"));
        assert_eq!(config.start_path, "/?x=1");
    }

    #[test]
    fn test_flags_override_config_file() {
        // Arrange
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "backend_url = \"ws://file:1/ws\"\nassets_dir = \"web\"").unwrap();
        let path = file.path().to_str().unwrap().to_string();

        // Act
        let config = cli(&["--config", &path, "--backend-url", "ws://flag:2/ws"])
            .into_app_config()
            .unwrap();

        // Assert
        assert_eq!(config.backend_url, "ws://flag:2/ws");
        assert_eq!(config.assets_dir, PathBuf::from("web"));
        assert_eq!(config.service_name, "jeebus");
    }

    #[test]
    fn test_missing_config_file_is_an_error() {
        let result = cli(&["--config", "/nonexistent/jeeboot.toml"]).into_app_config();
        assert!(result.is_err());
    }
}
