//! JeeBoot boot server: entry point.
//!
//! # Usage
//!
//! ```text
//! jeeboot-server [OPTIONS]
//!
//! Options:
//!   --dev    <ADDR>  TCP serial bridge of the JeeLink running RF12demo [default: 127.0.0.1:2000]
//!   --band   <MHZ>   Frequency band to listen on [default: 868]
//!   --group  <ID>    Net group to listen on [default: 212]
//!   --config <FILE>  Boot configuration with swid/hwid details [default: config.json]
//!   -i, --info       Print version information and exit
//! ```
//!
//! Firmware file names in the configuration are resolved against the current
//! directory.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use jeeboot_core::protocol::init_command;
use jeeboot_core::BootConfig;
use jeeboot_server::application::{BootResponder, FirmwareStore};
use jeeboot_server::infrastructure::{connect, SerialSession};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Server for remote nodes running the JeeBoot loader.
#[derive(Debug, Parser)]
#[command(
    name = "jeeboot-server",
    about = "Serves pairing, upgrade and firmware download requests from JeeBoot nodes",
    version
)]
struct Cli {
    /// TCP serial bridge (`host:port`) of the JeeLink running RF12demo.
    #[arg(long, default_value = "127.0.0.1:2000", env = "JEEBOOT_DEV")]
    dev: String,

    /// Frequency band in MHz used to listen for JeeBoot requests.
    #[arg(long, default_value_t = 868, env = "JEEBOOT_BAND")]
    band: u16,

    /// Net group used to listen for JeeBoot requests.
    #[arg(long, default_value_t = 212, env = "JEEBOOT_GROUP")]
    group: u8,

    /// Configuration file containing the swid/hwid details.
    #[arg(long, default_value = "config.json", env = "JEEBOOT_CONFIG")]
    config: PathBuf,

    /// Display some information about this tool and exit.
    #[arg(short, long)]
    info: bool,
}

impl Cli {
    /// Loads the boot configuration and its firmware and builds the responder.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be read or parsed, or if
    /// any firmware file it names cannot be loaded.
    fn build_responder(&self, firmware_dir: &Path) -> anyhow::Result<BootResponder> {
        let config = BootConfig::load(&self.config)
            .with_context(|| format!("loading {}", self.config.display()))?;
        info!(
            "config: {} swid(s), {} hwid(s)",
            config.swids.len(),
            config.hwids.len()
        );
        let firmware = FirmwareStore::load(&config, firmware_dir)
            .context("loading firmware images")?;
        Ok(BootResponder::new(config, firmware, self.group))
    }
}

fn version_info() -> String {
    format!("JeeBoot server {}", env!("CARGO_PKG_VERSION"))
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    if cli.info {
        println!("{}", version_info());
        return Ok(());
    }

    let responder = Arc::new(cli.build_responder(Path::new("."))?);
    let stream = connect(&cli.dev).await?;
    let session = SerialSession::new(stream, responder);
    let init = init_command(cli.band, cli.group);

    info!(
        "JeeBoot server listening on {} ({} MHz, group {})",
        cli.dev, cli.band, cli.group
    );

    tokio::select! {
        result = session.run(&init) => {
            let stats = result?;
            info!("session ended: {stats:?}");
        }
        signal = tokio::signal::ctrl_c() => {
            signal.context("failed to listen for Ctrl+C")?;
            info!("received Ctrl+C, shutting down");
        }
    }

    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
