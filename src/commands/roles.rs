use std::path::PathBuf;

use anyhow::Context;
use clap::Args;

use super::doctor::OutputFormat;
use crate::bot::catalog::RoleCatalog;
use crate::config;
use crate::error::ExitError;

#[derive(Debug, Args)]
pub struct RolesArgs {
    /// Config file (default: .rolecall.toml or .rolecall.json in the current directory)
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Output format
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,
}

impl RolesArgs {
    /// Print the effective role catalog.
    pub fn execute(&self) -> anyhow::Result<()> {
        let cwd = std::env::current_dir()
            .context("could not determine current directory")?;
        let (config, _) = config::resolve_config(self.config.as_deref(), &cwd)?;
        let catalog = config
            .catalog()
            .map_err(|e| ExitError::Config(format!("role catalog: {e}")))?;

        match OutputFormat::resolve(self.format) {
            OutputFormat::Pretty => print_pretty(&catalog),
            OutputFormat::Text => print_text(&catalog),
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&catalog)?),
        }
        Ok(())
    }
}

fn print_pretty(catalog: &RoleCatalog) {
    println!("=== Roles ({}) ===", catalog.len());
    for role in catalog.roles() {
        println!("\n{} [{}]", role.name, role.key);
        println!("  {}", role.description);
    }
}

fn print_text(catalog: &RoleCatalog) {
    for role in catalog.roles() {
        println!("{}\t{}", role.key, role.name);
    }
}
