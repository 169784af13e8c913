use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use crate::config::{self, Config};

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Directory to write .rolecall.toml into (default: current directory)
    #[arg(long)]
    pub dir: Option<PathBuf>,
    /// Overwrite an existing config
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    pub fn execute(&self) -> Result<()> {
        let dir = match self.dir.clone() {
            Some(d) => d,
            None => std::env::current_dir()
                .context("could not determine current directory")?,
        };

        if let Some(existing) = config::find_config(&dir)
            && !self.force
        {
            anyhow::bail!(
                "{} already exists (use --force to overwrite)",
                existing.display()
            );
        }

        fs::create_dir_all(&dir)
            .with_context(|| format!("creating {}", dir.display()))?;
        let path = dir.join(config::CONFIG_TOML);
        let contents = Config::starter().to_toml()?;
        fs::write(&path, contents)
            .with_context(|| format!("writing {}", path.display()))?;

        tracing::info!(path = %path.display(), "wrote starter config");
        println!("Wrote {}", path.display());
        println!("Next: put BOT_TOKEN=<token> and ADMIN_IDS=<your id> in .env, then run `rolecall run`.");
        Ok(())
    }
}
