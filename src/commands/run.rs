use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Args;
use tracing::{info, warn};

use crate::bot::{ClaimNegotiator, Router};
use crate::config;
use crate::error::ExitError;
use crate::telegram;

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Config file (default: .rolecall.toml or .rolecall.json in the current directory)
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl RunArgs {
    /// Build the negotiator from config and serve Telegram updates until Ctrl-C.
    pub fn execute(&self) -> anyhow::Result<()> {
        let cwd = std::env::current_dir()
            .context("could not determine current directory")?;
        let (config, source) = config::resolve_config(self.config.as_deref(), &cwd)?;
        match &source {
            Some(path) => info!(config = %path.display(), "loaded config"),
            None => info!("no config file found; using defaults"),
        }

        let catalog = config
            .catalog()
            .map_err(|e| ExitError::Config(format!("role catalog: {e}")))?;
        let admins = config.admin_set(&config::admin_ids_from_env());
        if admins.is_empty() {
            warn!("no admin ids configured; /reset is disabled");
        }
        let token = config.bot_token().ok_or_else(|| ExitError::MissingToken {
            env: config.bot.token_env.clone(),
        })?;

        info!(roles = catalog.len(), admins = admins.len(), "starting");
        let negotiator = ClaimNegotiator::new(catalog, admins);
        let router = Router::new(Arc::new(negotiator), config.bot.title.clone());

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .context("starting async runtime")?;
        runtime.block_on(telegram::run(token, router))
    }
}
