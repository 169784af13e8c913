//! Button payloads and chat commands.
//!
//! Buttons carry a short action string: `select:<role>`, `confirm:<role>`,
//! `cancel` or `noop`.
use std::fmt;
use std::str::FromStr;

use teloxide::utils::command::BotCommands;

use super::catalog::RoleKey;

/// A parsed button payload.
///
/// Role keys are kept as raw strings: validating them against the catalog
/// is the negotiator's job, so an unknown key surfaces as `InvalidRole`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackAction {
    Select(String),
    Confirm(String),
    Cancel,
    Noop,
}

impl CallbackAction {
    pub fn select(key: &RoleKey) -> Self {
        Self::Select(key.to_string())
    }

    pub fn confirm(key: &RoleKey) -> Self {
        Self::Confirm(key.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized button action: {0:?}")]
pub struct ActionParseError(pub String);

impl FromStr for CallbackAction {
    type Err = ActionParseError;

    fn from_str(data: &str) -> Result<Self, Self::Err> {
        match data {
            "cancel" => return Ok(Self::Cancel),
            "noop" => return Ok(Self::Noop),
            _ => {}
        }
        match data.split_once(':') {
            Some(("select", key)) => Ok(Self::Select(key.to_string())),
            Some(("confirm", key)) => Ok(Self::Confirm(key.to_string())),
            _ => Err(ActionParseError(data.to_string())),
        }
    }
}

impl fmt::Display for CallbackAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Select(key) => write!(f, "select:{key}"),
            Self::Confirm(key) => write!(f, "confirm:{key}"),
            Self::Cancel => write!(f, "cancel"),
            Self::Noop => write!(f, "noop"),
        }
    }
}

/// Slash commands understood by the bot.
#[derive(BotCommands, Debug, Clone, Copy, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "Role selection commands:")]
pub enum ChatCommand {
    #[command(description = "show the roles and pick one.")]
    Start,
    #[command(description = "show the roles and pick one.")]
    Roles,
    #[command(description = "show who holds which role.")]
    Status,
    #[command(description = "show your role.")]
    Myrole,
    #[command(description = "clear all assignments (admins only).")]
    Reset,
}
