//! Identity API server
//!
//! ```sh
//! # Run with default config (~/.config/identity-api/config.toml)
//! identity-api
//!
//! # Custom config path and port
//! identity-api --config /etc/identity-api/config.toml --port 8081
//!
//! # Validate config without starting
//! identity-api --check
//! ```

use std::path::PathBuf;

use clap::Parser;
use tracing::{error, info};

use identity_api::config::{AppConfig, ConfigError};
use identity_api::server::{init_tracing, ServerHandle, ServerOptions};

/// Registration, login with lockout, roles and role assignment over HTTP.
#[derive(Parser, Debug)]
#[command(
    name = "identity-api",
    version,
    about = "Minimal identity HTTP API",
    long_about = "Identity API: user registration, login with lockout, role creation \
                  and role assignment.\n\n\
                  Default config: ~/.config/identity-api/config.toml"
)]
struct Cli {
    /// Path to the configuration file (TOML).
    #[arg(short, long, env = "IDENTITY_API_CONFIG")]
    config: Option<PathBuf>,

    /// Override the listen port.
    #[arg(short, long)]
    port: Option<u16>,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(short, long)]
    log_level: Option<String>,

    /// Validate the configuration file and exit without starting the server.
    #[arg(long)]
    check: bool,

    /// Skip database migrations on startup.
    #[arg(long)]
    no_migrate: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // ── Load configuration ─────────────────────────────────────
    let config_path = cli
        .config
        .unwrap_or_else(identity_api::default_config_path);

    let (mut config, load_error) = match AppConfig::load(&config_path) {
        Ok(cfg) => (cfg, None),
        Err(e) => {
            let mut cfg = AppConfig::default();
            cfg.apply_env_overrides();
            (cfg, Some(e))
        }
    };

    if let Some(ref level) = cli.log_level {
        config.logging.level = level.clone();
    }
    init_tracing(&config);

    match load_error {
        None => info!("Configuration loaded from {}", config_path.display()),
        Some(ConfigError::NotFound(path)) => {
            info!("No config file at {}, using defaults", path.display())
        }
        Some(e) => {
            error!("Failed to load config from {}: {}", config_path.display(), e);
            if cli.check {
                return Err(e.into());
            }
            error!("Using default configuration.");
        }
    }

    // ── Apply CLI overrides ────────────────────────────────────
    if let Some(port) = cli.port {
        info!("CLI override: port = {}", port);
        config.server.port = port;
    }

    // ── Config validation mode ─────────────────────────────────
    if cli.check {
        println!("Configuration is valid");
        println!("   Config file : {}", config_path.display());
        println!("   Address     : {}", config.server.address());
        println!("   Database    : {}", config.database.url);
        println!("   Locale      : {:?}", config.i18n.locale);
        println!("   Log level   : {}", config.logging.level);
        return Ok(());
    }

    // ── Start server ───────────────────────────────────────────
    let handle = ServerHandle::start(ServerOptions {
        config,
        auto_migrate: !cli.no_migrate,
    })
    .await?;

    handle.install_signal_handler();
    info!("Press Ctrl+C to shutdown gracefully.");

    handle.shutdown_signal().wait().await;
    handle.wait().await;

    Ok(())
}
