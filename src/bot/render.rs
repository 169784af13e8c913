//! Presentation: turns the catalog and a store snapshot into chat text and buttons.
//!
//! Every function here is pure. Text is Telegram HTML; anything that came
//! from a user or from config is escaped.

use html_escape::{encode_double_quoted_attribute, encode_text};

use super::action::CallbackAction;
use super::catalog::{Role, RoleCatalog};
use super::negotiator::ClaimError;
use super::store::{Assignment, ClaimantId, StoreSnapshot};

/// One button in an inline keyboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionButton {
    pub label: String,
    pub action: CallbackAction,
}

impl ActionButton {
    pub fn new(label: impl Into<String>, action: CallbackAction) -> Self {
        Self {
            label: label.into(),
            action,
        }
    }
}

/// A message body plus its keyboard, one inner Vec per keyboard row.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Screen {
    pub text: String,
    pub keyboard: Vec<Vec<ActionButton>>,
}

impl Screen {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            keyboard: Vec::new(),
        }
    }
}

/// Inline mention linking to the member's profile.
pub fn mention(id: ClaimantId, display_name: &str) -> String {
    let href = format!("tg://user?id={id}");
    format!(
        "<a href=\"{}\">{}</a>",
        encode_double_quoted_attribute(&href),
        encode_text(display_name)
    )
}

/// One block per role, in catalog order: who holds it, or that it is free.
pub fn render_catalog_status(catalog: &RoleCatalog, snapshot: &StoreSnapshot) -> String {
    let blocks: Vec<String> = catalog
        .roles()
        .iter()
        .map(|role| {
            let name = encode_text(&role.name);
            match snapshot.assignment(&role.key) {
                Some(a) => format!(
                    "✅ <b>{name}</b>\nAssigned to: {}",
                    mention(a.claimant_id, &a.claimant_display_name)
                ),
                None => format!("🟦 <b>{name}</b>\n<i>(Available)</i>"),
            }
        })
        .collect();
    blocks.join("\n\n")
}

/// One button per role. Taken roles get an inert `noop` button.
pub fn render_selectable_roles(catalog: &RoleCatalog, snapshot: &StoreSnapshot) -> Vec<ActionButton> {
    catalog
        .roles()
        .iter()
        .map(|role| match snapshot.assignment(&role.key) {
            Some(a) => ActionButton::new(
                format!("{} (Taken by {})", role.name, a.claimant_display_name),
                CallbackAction::Noop,
            ),
            None => ActionButton::new(role.name.clone(), CallbackAction::select(&role.key)),
        })
        .collect()
}

pub fn render_role_detail(role: &Role) -> String {
    format!(
        "<b>{}</b>\n\n{}",
        encode_text(&role.name),
        encode_text(&role.description)
    )
}

/// `/start` and `/roles` in a group: greeting, current status, one button per row.
pub fn roles_screen(title: &str, catalog: &RoleCatalog, snapshot: &StoreSnapshot) -> Screen {
    let mut text = format!(
        "👋 <b>Welcome to the {} Group Role Selector!</b>\n\n\
         Below are the project roles. Click a role to view its description and claim it.\n\n",
        encode_text(title)
    );
    text.push_str(&render_catalog_status(catalog, snapshot));

    Screen {
        text,
        keyboard: render_selectable_roles(catalog, snapshot)
            .into_iter()
            .map(|button| vec![button])
            .collect(),
    }
}

pub fn status_screen(catalog: &RoleCatalog, snapshot: &StoreSnapshot) -> Screen {
    Screen::text(format!(
        "📋 <b>Current Role Assignments:</b>\n\n{}",
        render_catalog_status(catalog, snapshot)
    ))
}

/// Shown after `select`: the role detail with Confirm / Cancel.
pub fn confirm_prompt(role: &Role) -> Screen {
    Screen {
        text: format!(
            "{}\n\n<i>Do you want to take this role?</i>",
            render_role_detail(role)
        ),
        keyboard: vec![vec![
            ActionButton::new("✅ Confirm", CallbackAction::confirm(&role.key)),
            ActionButton::new("❌ Cancel", CallbackAction::Cancel),
        ]],
    }
}

pub fn assigned_message(id: ClaimantId, display_name: &str, role: &Role) -> String {
    format!(
        "🎉 Congratulations, {}!\n\nYou are now assigned: <b>{}</b>.",
        mention(id, display_name),
        encode_text(&role.name)
    )
}

pub fn cancelled_message() -> String {
    "❌ Role selection cancelled. You can pick a role again using /roles.".to_string()
}

pub fn my_role_message(held: Option<(&Role, &Assignment)>) -> String {
    match held {
        Some((role, assignment)) => format!(
            "🌟 Your role:\n\n<b>{}</b>\n{}\n\n<i>Claimed {}</i>",
            encode_text(&role.name),
            encode_text(&role.description),
            assignment.claimed_at.format("%Y-%m-%d %H:%M UTC")
        ),
        None => "You haven't selected a role yet! Use /roles to pick one.".to_string(),
    }
}

pub fn reset_message() -> String {
    "🔄 All role assignments have been reset!\nEveryone can select roles again.".to_string()
}

pub fn private_welcome() -> String {
    "👋 Hi! Please add me to your group and use /roles to pick a project role.".to_string()
}

pub fn taken_button_notice() -> String {
    "This role is already assigned.".to_string()
}

pub fn unknown_action_notice() -> String {
    "This button is no longer valid. Use /roles to start again.".to_string()
}

/// Short notice for a rejected `select`.
pub fn select_error_notice(err: &ClaimError) -> String {
    match err {
        ClaimError::RoleTaken => "This role is already taken.".to_string(),
        ClaimError::AlreadyAssigned => "You already selected a role!".to_string(),
        other => claim_error_notice(other),
    }
}

/// Short notice for a rejected `confirm`.
pub fn confirm_error_notice(err: &ClaimError) -> String {
    match err {
        ClaimError::RoleTaken => "Sorry, this role is already taken!".to_string(),
        ClaimError::AlreadyAssigned => "You can select only one role!".to_string(),
        other => claim_error_notice(other),
    }
}

pub fn claim_error_notice(err: &ClaimError) -> String {
    match err {
        ClaimError::RoleTaken => "This role is already taken.".to_string(),
        ClaimError::AlreadyAssigned => "You already hold a role.".to_string(),
        ClaimError::InvalidRole(_) => "Invalid role!".to_string(),
        ClaimError::Unauthorized => {
            "⛔ <b>You are not authorized to reset assignments.</b>".to_string()
        }
        ClaimError::NoPendingClaim => "There is no pending selection.".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::bot::catalog::RoleKey;
    use crate::bot::store::AssignmentStore;

    fn key(raw: &str) -> RoleKey {
        RoleKey::parse(raw).unwrap()
    }

    #[test]
    fn status_lists_every_role_once_in_order() {
        let catalog = RoleCatalog::default();
        let text = render_catalog_status(&catalog, &StoreSnapshot::default());

        assert_eq!(text.matches("(Available)").count(), catalog.len());
        let mut last = 0;
        for role in catalog.roles() {
            let name = encode_text(&role.name).to_string();
            assert_eq!(text.matches(name.as_str()).count(), 1, "{name} should appear once");
            let pos = text.find(name.as_str()).unwrap();
            assert!(pos >= last, "{name} out of order");
            last = pos;
        }
    }

    #[test]
    fn status_shows_holder() {
        let catalog = RoleCatalog::default();
        let store = AssignmentStore::new();
        store.set_assignment(key("ml"), ClaimantId(7), "Grace").unwrap();

        let text = render_catalog_status(&catalog, &store.snapshot());
        assert!(text.contains("Assigned to: <a href=\"tg://user?id=7\">Grace</a>"));
        assert_eq!(text.matches("(Available)").count(), catalog.len() - 1);
    }

    #[test]
    fn display_names_are_escaped() {
        let catalog = RoleCatalog::default();
        let store = AssignmentStore::new();
        store.set_assignment(key("pm"), ClaimantId(1), "<b>Eve</b> & co").unwrap();

        let text = render_catalog_status(&catalog, &store.snapshot());
        assert!(text.contains("&lt;b&gt;Eve&lt;/b&gt; &amp; co"));
        assert!(!text.contains("<b>Eve</b>"));
        // Role names from config are escaped too.
        assert!(text.contains("Project Manager &amp; System Analyst"));
    }

    #[test]
    fn taken_roles_render_as_noop_buttons() {
        let catalog = RoleCatalog::default();
        let store = AssignmentStore::new();
        store.set_assignment(key("backend"), ClaimantId(3), "Linus").unwrap();

        let buttons = render_selectable_roles(&catalog, &store.snapshot());
        assert_eq!(buttons.len(), catalog.len());
        assert_eq!(buttons[0].action, CallbackAction::Select("pm".into()));
        assert_eq!(buttons[1].label, "Backend Developer (Taken by Linus)");
        assert_eq!(buttons[1].action, CallbackAction::Noop);
    }

    #[test]
    fn roles_screen_has_one_button_per_row() {
        let catalog = RoleCatalog::default();
        let screen = roles_screen("Demo", &catalog, &StoreSnapshot::default());
        assert!(screen.text.starts_with("👋 <b>Welcome to the Demo Group Role Selector!</b>"));
        assert_eq!(screen.keyboard.len(), catalog.len());
        assert!(screen.keyboard.iter().all(|row| row.len() == 1));
    }

    #[test]
    fn confirm_prompt_offers_confirm_and_cancel() {
        let catalog = RoleCatalog::default();
        let role = catalog.get("devops").unwrap();
        let screen = confirm_prompt(role);

        assert!(screen.text.contains(&render_role_detail(role)));
        assert!(screen.text.ends_with("<i>Do you want to take this role?</i>"));
        let actions: Vec<_> = screen.keyboard[0].iter().map(|b| b.action.to_string()).collect();
        assert_eq!(actions, vec!["confirm:devops", "cancel"]);
    }

    #[test]
    fn my_role_shows_role_and_claim_time() {
        assert!(my_role_message(None).contains("/roles"));

        let catalog = RoleCatalog::default();
        let role = catalog.get("frontend").unwrap();
        let assignment = Assignment {
            role_key: role.key.clone(),
            claimant_id: ClaimantId(4),
            claimant_display_name: "Ken".into(),
            claimed_at: Utc.with_ymd_and_hms(2026, 3, 14, 9, 26, 53).unwrap(),
        };
        let text = my_role_message(Some((role, &assignment)));
        assert!(text.contains("<b>Frontend Developer</b>"));
        assert!(text.ends_with("<i>Claimed 2026-03-14 09:26 UTC</i>"));
    }

    #[test]
    fn error_notices_differ_by_step() {
        assert_eq!(select_error_notice(&ClaimError::RoleTaken), "This role is already taken.");
        assert_eq!(
            confirm_error_notice(&ClaimError::RoleTaken),
            "Sorry, this role is already taken!"
        );
        assert_eq!(
            select_error_notice(&ClaimError::InvalidRole("x".into())),
            "Invalid role!"
        );
    }
}
