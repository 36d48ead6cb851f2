//! Serve command - launches the demo server.

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context as _, Result};
use clap::Args;
use tracing::{info, warn};

use sessionkit_config::{Backend, LoadedConfig, SECRET_ENV_VAR, SessionkitConfig};
use sessionkit_store::{CookieStore, MemoryStore, MemoryStoreConfig, SharedStore};

use super::Context;
use crate::app::Server;

/// Arguments for the serve command.
///
/// CLI arguments override config file values.
#[derive(Args, Debug, Default)]
pub struct ServeArgs {
    /// Address to bind to, with or without a port (overrides config)
    #[arg(short, long)]
    pub bind: Option<String>,

    /// Port to listen on (overrides config)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Secret the signing key is derived from (at least 32 bytes)
    #[arg(long, env = SECRET_ENV_VAR, hide_env_values = true)]
    pub secret: Option<String>,

    /// Session store backend: cookie or memory (overrides config)
    #[arg(long)]
    pub backend: Option<Backend>,

    /// Path to config file (overrides default discovery)
    #[arg(long)]
    pub config: Option<PathBuf>,
}

/// Run the serve command.
pub async fn run(args: ServeArgs, ctx: &Context) -> Result<()> {
    let loaded = sessionkit_config::load_config(args.config.as_deref())?;
    report_loaded(&loaded, ctx);

    let config = apply_overrides(loaded.config, &args)?;
    config.validate()?;

    let store = build_store(&config)?;
    info!(
        backend = %config.session.backend,
        bind = %config.server.bind,
        "Session store ready"
    );

    Server::new(store, config.server.request_logging)
        .run(config.server.bind)
        .await
}

pub(crate) fn report_loaded(loaded: &LoadedConfig, ctx: &Context) {
    for warning in &loaded.warnings {
        warn!("{}", warning);
    }

    if ctx.verbose {
        match &loaded.source {
            Some(path) => println!("Loaded config: {}", path.display()),
            None => println!("No config file found, using defaults + CLI args"),
        }
    }
}

/// Layer CLI arguments over the file configuration.
fn apply_overrides(mut config: SessionkitConfig, args: &ServeArgs) -> Result<SessionkitConfig> {
    if let Some(bind) = &args.bind {
        config.server.bind = match bind.parse::<SocketAddr>() {
            Ok(addr) => addr,
            Err(_) => {
                let ip: IpAddr = bind
                    .parse()
                    .with_context(|| format!("invalid bind address '{}'", bind))?;
                SocketAddr::new(ip, config.server.bind.port())
            }
        };
    }
    if let Some(port) = args.port {
        config.server.bind.set_port(port);
    }
    if let Some(secret) = &args.secret {
        config.session.secret = Some(secret.clone());
    }
    if let Some(backend) = args.backend {
        config.session.backend = backend;
    }
    Ok(config)
}

/// Build the configured session store.
fn build_store(config: &SessionkitConfig) -> Result<SharedStore> {
    let secret = config.require_secret()?;
    let options = config.session.options.clone();

    let store: SharedStore = match config.session.backend {
        Backend::Cookie => Arc::new(CookieStore::derived(secret)?.with_options(options)),
        Backend::Memory => {
            let memory_config =
                MemoryStoreConfig::new().with_max_sessions(config.session.max_sessions);
            Arc::new(MemoryStore::derived(secret, memory_config)?.with_options(options))
        }
    };
    Ok(store)
}
