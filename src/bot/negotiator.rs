//! Claim negotiation: select -> confirm/cancel, plus the admin reset.
//!
//! Every transition runs inside a single store transaction and checks all
//! of its preconditions before touching anything, so a rejected call never
//! leaves partial state behind. `confirm` re-checks availability instead of
//! trusting the earlier `select`: a human sits between the two calls and
//! other members may have claimed the role in the meantime.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::{debug, info};

use super::catalog::{Role, RoleCatalog, RoleKey};
use super::store::{Assignment, AssignmentStore, Claimant, ClaimantId, StoreError, StoreSnapshot};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClaimError {
    #[error("role is already taken")]
    RoleTaken,

    #[error("claimant already holds a role")]
    AlreadyAssigned,

    #[error("unknown role key: {0}")]
    InvalidRole(String),

    #[error("caller is not an admin")]
    Unauthorized,

    #[error("no pending claim for this role")]
    NoPendingClaim,
}

impl From<StoreError> for ClaimError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::RoleConflict { .. } => Self::RoleTaken,
            StoreError::ClaimantConflict { .. } => Self::AlreadyAssigned,
        }
    }
}

/// Identities allowed to reset all assignments. Fixed at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdminSet(BTreeSet<ClaimantId>);

impl AdminSet {
    pub fn new(ids: impl IntoIterator<Item = ClaimantId>) -> Self {
        Self(ids.into_iter().collect())
    }

    pub fn contains(&self, id: ClaimantId) -> bool {
        self.0.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Owns the catalog, the store and the admin list.
#[derive(Debug)]
pub struct ClaimNegotiator {
    catalog: Arc<RoleCatalog>,
    store: AssignmentStore,
    admins: AdminSet,
}

impl ClaimNegotiator {
    pub fn new(catalog: RoleCatalog, admins: AdminSet) -> Self {
        Self {
            catalog: Arc::new(catalog),
            store: AssignmentStore::new(),
            admins,
        }
    }

    pub fn catalog(&self) -> &RoleCatalog {
        &self.catalog
    }

    pub fn store(&self) -> &AssignmentStore {
        &self.store
    }

    pub fn is_admin(&self, id: ClaimantId) -> bool {
        self.admins.contains(id)
    }

    fn role(&self, key: &str) -> Result<&Role, ClaimError> {
        self.catalog
            .get(key)
            .ok_or_else(|| ClaimError::InvalidRole(key.to_string()))
    }

    /// Start claiming `role_key`. Replaces any earlier pending selection.
    pub fn select(&self, claimant: &Claimant, role_key: &str) -> Result<Role, ClaimError> {
        let role = self.role(role_key)?;
        let result = self
            .store
            .set_pending(claimant.id, role.key.clone())
            .map_err(ClaimError::from);

        match result {
            Ok(previous) => {
                info!(
                    claimant = %claimant.id,
                    role = %role.key,
                    replaced = previous.as_ref().map(RoleKey::as_str),
                    "role selected"
                );
                Ok(role.clone())
            }
            Err(err) => {
                debug!(claimant = %claimant.id, role = %role.key, %err, "select rejected");
                Err(err)
            }
        }
    }

    /// Turn the claimant's pending selection of `role_key` into an assignment.
    pub fn confirm(&self, claimant: &Claimant, role_key: &str) -> Result<Role, ClaimError> {
        let role = self.role(role_key)?;
        let result = self.store.transact(|state| {
            if state.get_assignment(&role.key).is_some() {
                return Err(ClaimError::RoleTaken);
            }
            if state.assignment_for_claimant(claimant.id).is_some() {
                return Err(ClaimError::AlreadyAssigned);
            }
            if state.get_pending(claimant.id) != Some(&role.key) {
                return Err(ClaimError::NoPendingClaim);
            }
            state.set_assignment(role.key.clone(), claimant.id, claimant.display_name.clone())?;
            state.clear_pending(claimant.id);
            Ok(())
        });

        match result {
            Ok(()) => {
                info!(claimant = %claimant.id, role = %role.key, "role assigned");
                Ok(role.clone())
            }
            Err(err) => {
                debug!(claimant = %claimant.id, role = %role.key, %err, "confirm rejected");
                Err(err)
            }
        }
    }

    /// Drop the claimant's pending selection. Returns the role it pointed at, if any.
    pub fn cancel(&self, claimant: &Claimant) -> Option<RoleKey> {
        let cleared = self.store.transact(|state| state.clear_pending(claimant.id));
        if let Some(role) = &cleared {
            info!(claimant = %claimant.id, %role, "selection cancelled");
        }
        cleared
    }

    /// Clear every assignment and pending selection.
    pub fn reset(&self, caller: ClaimantId) -> Result<(), ClaimError> {
        if !self.is_admin(caller) {
            debug!(%caller, "reset rejected");
            return Err(ClaimError::Unauthorized);
        }
        self.store.reset_all();
        info!(%caller, "all assignments reset");
        Ok(())
    }

    /// The role this claimant holds, with the assignment that binds it.
    pub fn role_of(&self, claimant: ClaimantId) -> Option<(Role, Assignment)> {
        let assignment = self.store.transact(|state| {
            let key = state.assignment_for_claimant(claimant)?;
            state.get_assignment(key).cloned()
        })?;
        let role = self.catalog.get(assignment.role_key.as_str())?.clone();
        Some((role, assignment))
    }

    pub fn snapshot(&self) -> StoreSnapshot {
        self.store.snapshot()
    }
}
