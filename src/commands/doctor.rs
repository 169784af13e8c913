use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use serde::{Deserialize, Serialize};

use crate::config::{self, Config};
use crate::error::ExitError;

#[derive(Debug, Args)]
pub struct DoctorArgs {
    /// Config file (default: .rolecall.toml or .rolecall.json in the current directory)
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Strict mode: treat warnings (no admins configured) as problems
    #[arg(long)]
    pub strict: bool,
    /// Output format
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum OutputFormat {
    Pretty,
    Text,
    Json,
}

impl OutputFormat {
    /// Pretty on a terminal, plain text otherwise.
    pub fn resolve(explicit: Option<Self>) -> Self {
        explicit.unwrap_or_else(|| {
            if std::io::stdout().is_terminal() {
                OutputFormat::Pretty
            } else {
                OutputFormat::Text
            }
        })
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DoctorReport {
    pub config: ConfigStatus,
    pub roles: usize,
    pub admins: usize,
    pub token_present: bool,
    pub issues: Vec<String>,
    pub warnings: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ConfigStatus {
    /// Config file path, or None when running on defaults.
    pub source: Option<String>,
    pub version: String,
    pub title: String,
    pub token_env: String,
}

/// Collect config problems. Hard errors go to `issues`, soft ones to `warnings`.
pub fn diagnose(config: &Config, source: Option<String>, env_admins: &[u64], token_present: bool) -> DoctorReport {
    let mut report = DoctorReport {
        config: ConfigStatus {
            source,
            version: config.version.clone(),
            title: config.bot.title.clone(),
            token_env: config.bot.token_env.clone(),
        },
        roles: 0,
        admins: 0,
        token_present,
        issues: vec![],
        warnings: vec![],
    };

    match config.catalog() {
        Ok(catalog) => report.roles = catalog.len(),
        Err(e) => report.issues.push(format!("role catalog: {e}")),
    }
    if config.roles.is_empty() {
        report.warnings.push("no [[roles]] defined; using the built-in catalog".to_string());
    }

    report.admins = config.admin_set(env_admins).len();
    if report.admins == 0 {
        report
            .warnings
            .push(format!("no admins configured; /reset is disabled (set bot.admin_ids or {})", config::ADMIN_IDS_ENV));
    }

    if !token_present {
        report.issues.push(format!("{} is not set", config.bot.token_env));
    }

    report
}

impl DoctorArgs {
    pub fn execute(&self) -> anyhow::Result<()> {
        let cwd = std::env::current_dir()
            .context("could not determine current directory")?;
        let (config, source) = config::resolve_config(self.config.as_deref(), &cwd)?;

        let format = OutputFormat::resolve(self.format);

        let mut report = diagnose(
            &config,
            source.map(|p| p.display().to_string()),
            &config::admin_ids_from_env(),
            config.bot_token().is_some(),
        );

        if self.strict && !report.warnings.is_empty() {
            let warnings = std::mem::take(&mut report.warnings);
            report.issues.extend(warnings);
        }

        let issue_count = report.issues.len();

        match format {
            OutputFormat::Pretty => {
                Self::print_pretty(&report);
            }
            OutputFormat::Text => {
                Self::print_text(&report);
            }
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&report)?);
            }
        }

        // Return error with issue count for proper exit code handling
        if issue_count > 0 {
            return Err(ExitError::DoctorFailed { count: issue_count }.into());
        }

        Ok(())
    }

    fn print_pretty(report: &DoctorReport) {
        println!("=== rolecall doctor ===\n");
        println!("Config:  {}", report.config.source.as_deref().unwrap_or("(defaults)"));
        println!("Version: {}", report.config.version);
        println!("Title:   {}", report.config.title);
        println!();

        if report.token_present {
            println!("  ✓ token: {} is set", report.config.token_env);
        } else {
            println!("  ✗ token: {} is not set", report.config.token_env);
        }
        println!("  • roles: {}", report.roles);
        println!("  • admins: {}", report.admins);

        if !report.warnings.is_empty() {
            println!("\nWarnings ({}):", report.warnings.len());
            for warning in &report.warnings {
                println!("  • {warning}");
            }
        }

        if report.issues.is_empty() {
            println!("\n✓ No issues found");
        } else {
            println!("\nIssues ({}):", report.issues.len());
            for issue in &report.issues {
                println!("  • {issue}");
            }
        }
    }

    fn print_text(report: &DoctorReport) {
        println!(
            "rolecall-doctor  config={}  version={}  roles={}  admins={}  token={}",
            report.config.source.as_deref().unwrap_or("-"),
            report.config.version,
            report.roles,
            report.admins,
            if report.token_present { "set" } else { "missing" }
        );

        for warning in &report.warnings {
            println!("warning  {warning}");
        }
        if !report.issues.is_empty() {
            println!("issues  count={}", report.issues.len());
            for issue in &report.issues {
                println!("issue  {issue}");
            }
        }
    }
}
