//! Role claiming: catalog, assignment store, negotiation and presentation.

pub mod action;
pub mod catalog;
pub mod negotiator;
pub mod render;
pub mod router;
pub mod store;

pub use action::{CallbackAction, ChatCommand};
pub use catalog::{Role, RoleCatalog, RoleKey};
pub use negotiator::{AdminSet, ClaimError, ClaimNegotiator};
pub use router::{CallbackReply, ChatScope, Router};
pub use store::{Assignment, AssignmentStore, Claimant, ClaimantId, StoreSnapshot};
