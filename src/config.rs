use std::path::{Path, PathBuf};

use anyhow::Context;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::bot::catalog::{CatalogError, Role, RoleCatalog, builtin_roles};
use crate::bot::negotiator::AdminSet;
use crate::bot::store::ClaimantId;
use crate::error::ExitError;

/// Config file name constants.
pub const CONFIG_TOML: &str = ".rolecall.toml";
pub const CONFIG_JSON: &str = ".rolecall.json";

/// Environment variable holding extra admin ids, comma-separated.
pub const ADMIN_IDS_ENV: &str = "ADMIN_IDS";

/// Find the config file path, preferring .rolecall.toml over .rolecall.json.
/// Returns None if neither exists.
pub fn find_config(dir: &Path) -> Option<PathBuf> {
    let toml_path = dir.join(CONFIG_TOML);
    if toml_path.exists() {
        return Some(toml_path);
    }
    let json_path = dir.join(CONFIG_JSON);
    if json_path.exists() {
        return Some(json_path);
    }
    None
}

/// Load the config named on the command line, or the one in `dir`, or defaults.
///
/// Returns the config and the file it came from (None for defaults).
pub fn resolve_config(
    explicit: Option<&Path>,
    dir: &Path,
) -> anyhow::Result<(Config, Option<PathBuf>)> {
    if let Some(path) = explicit {
        let config = Config::load(path)?;
        return Ok((config, Some(path.to_path_buf())));
    }
    match find_config(dir) {
        Some(path) => {
            let config = Config::load(&path)?;
            Ok((config, Some(path)))
        }
        None => Ok((Config::default(), None)),
    }
}

/// Top-level .rolecall.toml config.
///
/// Fields use snake_case (TOML native) with `alias` attributes so camelCase
/// JSON configs load too.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub bot: BotConfig,
    /// Claimable roles in display order. Empty means the built-in catalog.
    #[serde(default)]
    pub roles: Vec<Role>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct BotConfig {
    /// Project title shown in the welcome message.
    #[serde(default = "default_title")]
    pub title: String,
    /// Telegram user ids allowed to run /reset.
    #[serde(default, alias = "adminIds")]
    pub admin_ids: Vec<u64>,
    /// Environment variable that holds the bot token.
    #[serde(default = "default_token_env", alias = "tokenEnv")]
    pub token_env: String,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            admin_ids: Vec::new(),
            token_env: default_token_env(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: default_version(),
            bot: BotConfig::default(),
            roles: Vec::new(),
        }
    }
}

// Default value functions for serde
fn default_version() -> String {
    "1".into()
}

fn default_title() -> String {
    "Complaint Management & Feedback Platform".into()
}

fn default_token_env() -> String {
    "BOT_TOKEN".into()
}

impl Config {
    /// Config written by `rolecall init`: defaults plus the built-in roles spelled out.
    pub fn starter() -> Self {
        Self {
            roles: builtin_roles(),
            ..Self::default()
        }
    }

    /// Load config from a file (TOML or JSON, auto-detected by extension).
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        match ext {
            "toml" => Self::parse_toml(&contents),
            "json" => Self::parse_json(&contents),
            _ => {
                // Try TOML first, then JSON
                Self::parse_toml(&contents).or_else(|_| Self::parse_json(&contents))
            }
        }
    }

    /// Parse config from a TOML string.
    pub fn parse_toml(toml_str: &str) -> anyhow::Result<Self> {
        toml::from_str(toml_str).map_err(|e| {
            ExitError::Config(format!("invalid .rolecall.toml: {e}")).into()
        })
    }

    /// Parse config from a JSON string.
    pub fn parse_json(json: &str) -> anyhow::Result<Self> {
        serde_json::from_str(json).map_err(|e| {
            ExitError::Config(format!("invalid .rolecall.json: {e}")).into()
        })
    }

    /// Serialize config to a TOML string with helpful comments.
    pub fn to_toml(&self) -> anyhow::Result<String> {
        let raw = toml::to_string_pretty(self)
            .context("serializing config to TOML")?;

        let mut doc: toml_edit::DocumentMut = raw.parse()
            .context("parsing generated TOML for comment injection")?;

        doc.decor_mut().set_prefix("# rolecall configuration\n# The bot token is read from the environment (see bot.token_env).\n\n");

        if let Some(tbl) = doc.get_mut("bot").and_then(|item| item.as_table_mut()) {
            tbl.decor_mut().set_prefix("\n# Chat settings. ADMIN_IDS in the environment adds more admins.\n");
        }
        if let Some(first) = doc
            .get_mut("roles")
            .and_then(|item| item.as_array_of_tables_mut())
            .and_then(|roles| roles.get_mut(0))
        {
            first.decor_mut().set_prefix("\n# Claimable roles, in display order. Keys: [a-z0-9_-], at most 32 chars.\n");
        }

        Ok(doc.to_string())
    }

    /// The validated role catalog; the built-in one when `roles` is empty.
    pub fn catalog(&self) -> Result<RoleCatalog, CatalogError> {
        if self.roles.is_empty() {
            return Ok(RoleCatalog::default());
        }
        RoleCatalog::new(self.roles.clone())
    }

    /// Admins from the config file merged with `extra` (usually from `ADMIN_IDS`).
    pub fn admin_set(&self, extra: &[u64]) -> AdminSet {
        AdminSet::new(
            self.bot
                .admin_ids
                .iter()
                .chain(extra)
                .copied()
                .map(ClaimantId),
        )
    }

    /// The bot token from the configured environment variable, if set and non-empty.
    pub fn bot_token(&self) -> Option<String> {
        std::env::var(&self.bot.token_env)
            .ok()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
    }
}

/// Parse a comma-separated id list. Entries that are not plain digits are skipped.
pub fn parse_admin_ids(raw: &str) -> Vec<u64> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty() && part.chars().all(|c| c.is_ascii_digit()))
        .filter_map(|part| part.parse().ok())
        .collect()
}

/// Admin ids from the `ADMIN_IDS` environment variable.
pub fn admin_ids_from_env() -> Vec<u64> {
    std::env::var(ADMIN_IDS_ENV)
        .map(|raw| parse_admin_ids(&raw))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_full_toml_config() {
        let toml_str = r#"
version = "1"

[bot]
title = "Compiler Course"
admin_ids = [42, 7]
token_env = "ROLECALL_TOKEN"

[[roles]]
key = "lexer"
name = "Lexer Author"
description = "Writes the tokenizer."

[[roles]]
key = "parser"
name = "Parser Author"
description = "Writes the grammar."
"#;

        let config = Config::parse_toml(toml_str).unwrap();
        assert_eq!(config.bot.title, "Compiler Course");
        assert_eq!(config.bot.token_env, "ROLECALL_TOKEN");

        let catalog = config.catalog().unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.roles()[1].name, "Parser Author");

        let admins = config.admin_set(&[]);
        assert!(admins.contains(ClaimantId(42)));
        assert!(admins.contains(ClaimantId(7)));
        assert!(!admins.contains(ClaimantId(1)));
    }

    #[test]
    fn parse_json_config_with_camel_case() {
        let json = r#"{
            "version": "1",
            "bot": { "title": "Demo", "adminIds": [5], "tokenEnv": "TG_TOKEN" },
            "roles": [{ "key": "pm", "name": "PM", "description": "plans" }]
        }"#;

        let config = Config::parse_json(json).unwrap();
        assert_eq!(config.bot.admin_ids, vec![5]);
        assert_eq!(config.bot.token_env, "TG_TOKEN");
        assert_eq!(config.catalog().unwrap().len(), 1);
    }

    #[test]
    fn empty_config_uses_defaults() {
        let config = Config::parse_toml("").unwrap();
        assert_eq!(config.version, "1");
        assert_eq!(config.bot.token_env, "BOT_TOKEN");
        assert!(config.bot.admin_ids.is_empty());
        assert_eq!(config.catalog().unwrap(), RoleCatalog::default());
    }

    #[test]
    fn duplicate_roles_fail_catalog_validation() {
        let toml_str = r#"
[[roles]]
key = "pm"
name = "PM"
description = ""

[[roles]]
key = "pm"
name = "Other PM"
description = ""
"#;
        let config = Config::parse_toml(toml_str).unwrap();
        assert_eq!(
            config.catalog(),
            Err(CatalogError::DuplicateKey("pm".into()))
        );
    }

    #[test]
    fn invalid_role_key_is_a_parse_error() {
        let toml_str = r#"
[[roles]]
key = "Project Manager"
name = "PM"
description = ""
"#;
        let err = Config::parse_toml(toml_str).unwrap_err();
        assert!(err.to_string().contains("invalid .rolecall.toml"));
    }

    #[test]
    fn parse_malformed_toml() {
        let err = Config::parse_toml("not valid toml [[[").unwrap_err();
        assert!(err.to_string().contains("invalid .rolecall.toml"));
        assert!(err.downcast_ref::<ExitError>().is_some());
    }

    #[test]
    fn parse_malformed_json() {
        let err = Config::parse_json("not json").unwrap_err();
        assert!(err.to_string().contains("invalid .rolecall.json"));
    }

    #[test]
    fn admin_ids_skip_non_numeric_entries() {
        assert_eq!(parse_admin_ids("1, 22 ,abc,,-5, 333"), vec![1, 22, 333]);
        assert!(parse_admin_ids("").is_empty());
    }

    #[test]
    fn admin_set_merges_sources() {
        let config = Config {
            bot: BotConfig {
                admin_ids: vec![1],
                ..BotConfig::default()
            },
            ..Config::default()
        };
        let admins = config.admin_set(&[2, 1]);
        assert_eq!(admins.len(), 2);
        assert!(admins.contains(ClaimantId(2)));
    }

    #[test]
    fn starter_config_roundtrips() {
        let starter = Config::starter();
        let output = starter.to_toml().unwrap();
        assert!(output.starts_with("# rolecall configuration"));
        assert!(output.contains("# Claimable roles"));

        let parsed = Config::parse_toml(&output).unwrap();
        assert_eq!(parsed.roles, starter.roles);
        assert_eq!(parsed.bot.title, starter.bot.title);
    }

    #[test]
    fn find_config_prefers_toml() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_TOML), "").unwrap();
        std::fs::write(dir.path().join(CONFIG_JSON), "{}").unwrap();

        let found = find_config(dir.path()).unwrap();
        assert!(found.to_string_lossy().ends_with(".rolecall.toml"));
    }

    #[test]
    fn find_config_falls_back_to_json() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_JSON), "{}").unwrap();

        let found = find_config(dir.path()).unwrap();
        assert!(found.to_string_lossy().ends_with(".rolecall.json"));
    }

    #[test]
    fn resolve_config_defaults_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let (config, source) = resolve_config(None, dir.path()).unwrap();
        assert!(source.is_none());
        assert!(config.roles.is_empty());
    }

    #[test]
    fn resolve_config_explicit_path_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        let err = resolve_config(Some(&missing), dir.path()).unwrap_err();
        assert!(err.to_string().contains("reading"));
    }
}
