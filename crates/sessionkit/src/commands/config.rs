//! Config command - shows the resolved configuration.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use super::Context;
use super::serve::report_loaded;

/// Arguments for the config command.
#[derive(Args, Debug, Default)]
pub struct ConfigArgs {
    /// Path to config file (overrides default discovery)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Only print where the user config file lives
    #[arg(long)]
    pub path: bool,
}

/// Run the config command.
pub async fn run(args: ConfigArgs, ctx: &Context) -> Result<()> {
    if args.path {
        let path = sessionkit_config::user_config_path()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
        println!("{}", path.display());
        return Ok(());
    }

    let loaded = sessionkit_config::load_config(args.config.as_deref())?;
    report_loaded(&loaded, ctx);

    match &loaded.source {
        Some(path) => println!("# Loaded from {}\n", path.display()),
        None => println!("# No config file found (using defaults)\n"),
    }
    print!("{}", loaded.config.redacted().to_toml()?);
    Ok(())
}
