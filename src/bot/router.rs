//! Maps inbound chat commands and button presses to negotiator calls and
//! decides what the transport should send back.

use std::sync::Arc;

use tracing::debug;

use super::action::{CallbackAction, ChatCommand};
use super::negotiator::{ClaimError, ClaimNegotiator};
use super::render::{self, Screen};
use super::store::Claimant;

/// Where a command was sent from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatScope {
    Private,
    Group,
    /// Channels and anything else the bot does not serve.
    Other,
}

/// What to do in response to a button press.
///
/// The transport must always acknowledge the press; `notice` is shown as an
/// alert when present and `edit` replaces the message carrying the button.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CallbackReply {
    pub notice: Option<String>,
    pub edit: Option<Screen>,
}

impl CallbackReply {
    fn notice(text: String) -> Self {
        Self {
            notice: Some(text),
            edit: None,
        }
    }

    fn edit(screen: Screen) -> Self {
        Self {
            notice: None,
            edit: Some(screen),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Router {
    negotiator: Arc<ClaimNegotiator>,
    title: String,
}

impl Router {
    pub fn new(negotiator: Arc<ClaimNegotiator>, title: impl Into<String>) -> Self {
        Self {
            negotiator,
            title: title.into(),
        }
    }

    /// Handle a slash command. `None` means the command is ignored in this scope.
    pub fn handle_command(
        &self,
        command: ChatCommand,
        scope: ChatScope,
        from: Option<&Claimant>,
    ) -> Option<Screen> {
        match scope {
            ChatScope::Private => {
                return (command == ChatCommand::Start).then(|| Screen::text(render::private_welcome()));
            }
            ChatScope::Other => return None,
            ChatScope::Group => {}
        }

        let n = &self.negotiator;
        match command {
            ChatCommand::Start | ChatCommand::Roles => {
                let snapshot = n.snapshot();
                Some(render::roles_screen(&self.title, n.catalog(), &snapshot))
            }
            ChatCommand::Status => {
                let snapshot = n.snapshot();
                Some(render::status_screen(n.catalog(), &snapshot))
            }
            ChatCommand::Myrole => {
                let claimant = from?;
                let held = n.role_of(claimant.id);
                let held = held.as_ref().map(|(role, assignment)| (role, assignment));
                Some(Screen::text(render::my_role_message(held)))
            }
            ChatCommand::Reset => {
                let claimant = from?;
                let text = match n.reset(claimant.id) {
                    Ok(()) => render::reset_message(),
                    Err(err) => render::claim_error_notice(&err),
                };
                Some(Screen::text(text))
            }
        }
    }

    /// Handle a button press carrying `data`.
    pub fn handle_callback(&self, data: &str, from: &Claimant) -> CallbackReply {
        let action = match data.parse::<CallbackAction>() {
            Ok(action) => action,
            Err(err) => {
                debug!(claimant = %from.id, %err, "ignoring button");
                return CallbackReply::notice(render::unknown_action_notice());
            }
        };

        let n = &self.negotiator;
        match action {
            CallbackAction::Noop => CallbackReply::notice(render::taken_button_notice()),
            CallbackAction::Select(key) => match n.select(from, &key) {
                Ok(role) => CallbackReply::edit(render::confirm_prompt(&role)),
                Err(err) => CallbackReply::notice(render::select_error_notice(&err)),
            },
            CallbackAction::Confirm(key) => match n.confirm(from, &key) {
                Ok(role) => CallbackReply::edit(Screen::text(render::assigned_message(
                    from.id,
                    &from.display_name,
                    &role,
                ))),
                // A stale confirm button is acknowledged without a notice.
                Err(ClaimError::NoPendingClaim) => CallbackReply::default(),
                Err(err) => CallbackReply::notice(render::confirm_error_notice(&err)),
            },
            CallbackAction::Cancel => {
                n.cancel(from);
                CallbackReply::edit(Screen::text(render::cancelled_message()))
            }
        }
    }
}
