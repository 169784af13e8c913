use anyhow::Result;
use clap::Args;
use schemars::schema::RootSchema;
use schemars::schema_for;

use crate::config::{CONFIG_TOML, Config};

#[derive(Debug, Args)]
pub struct SchemaArgs {
    /// Print on one line instead of pretty-printed
    #[arg(long)]
    pub compact: bool,
}

impl SchemaArgs {
    pub fn execute(&self) -> Result<()> {
        let schema = config_schema();
        let json = if self.compact {
            serde_json::to_string(&schema)?
        } else {
            serde_json::to_string_pretty(&schema)?
        };
        println!("{json}");
        Ok(())
    }
}

/// JSON Schema for the config file, usable by editors for completion.
pub fn config_schema() -> RootSchema {
    let mut schema = schema_for!(Config);
    let metadata = schema.schema.metadata();
    metadata.title = Some(format!("rolecall {CONFIG_TOML}"));
    metadata.description = Some("Bot settings and the claimable role catalog.".to_string());
    schema
}
