//! In-memory assignment store.
//!
//! Holds confirmed assignments (role -> claimant) and pending, unconfirmed
//! selections (claimant -> role). Everything sits behind one mutex: the
//! data is tiny and every negotiation step needs a consistent view of both
//! maps at once. All state is lost on restart.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::catalog::RoleKey;

/// Opaque chat-member identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClaimantId(pub u64);

impl fmt::Display for ClaimantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ClaimantId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// Who is acting on an inbound event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Claimant {
    pub id: ClaimantId,
    pub display_name: String,
}

impl Claimant {
    pub fn new(id: impl Into<ClaimantId>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
        }
    }
}

/// A confirmed, exclusive binding of a role to a claimant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub role_key: RoleKey,
    pub claimant_id: ClaimantId,
    pub claimant_display_name: String,
    pub claimed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("role {role} is already assigned to {holder}")]
    RoleConflict { role: RoleKey, holder: ClaimantId },

    #[error("claimant {claimant} already holds role {role}")]
    ClaimantConflict { claimant: ClaimantId, role: RoleKey },
}

/// The two maps, unsynchronized. Only reachable through [`AssignmentStore`].
#[derive(Debug, Default, Clone)]
pub struct StoreState {
    assignments: HashMap<RoleKey, Assignment>,
    pending: HashMap<ClaimantId, RoleKey>,
}

impl StoreState {
    pub fn get_assignment(&self, role: &RoleKey) -> Option<&Assignment> {
        self.assignments.get(role)
    }

    /// Role currently held by `claimant`, if any. Linear scan.
    pub fn assignment_for_claimant(&self, claimant: ClaimantId) -> Option<&RoleKey> {
        self.assignments
            .values()
            .find(|a| a.claimant_id == claimant)
            .map(|a| &a.role_key)
    }

    /// Insert an assignment if neither the role nor the claimant is taken.
    pub fn set_assignment(
        &mut self,
        role: RoleKey,
        claimant: ClaimantId,
        display_name: String,
    ) -> Result<&Assignment, StoreError> {
        if let Some(existing) = self.assignments.get(&role) {
            return Err(StoreError::RoleConflict {
                role,
                holder: existing.claimant_id,
            });
        }
        if let Some(held) = self.assignment_for_claimant(claimant) {
            return Err(StoreError::ClaimantConflict {
                claimant,
                role: held.clone(),
            });
        }
        // Nobody can confirm a pending claim on a role that is now taken.
        self.pending.retain(|_, pending_role| *pending_role != role);

        let assignment = Assignment {
            role_key: role.clone(),
            claimant_id: claimant,
            claimant_display_name: display_name,
            claimed_at: Utc::now(),
        };
        Ok(self.assignments.entry(role).or_insert(assignment))
    }

    pub fn get_pending(&self, claimant: ClaimantId) -> Option<&RoleKey> {
        self.pending.get(&claimant)
    }

    /// Record a pending selection, replacing any earlier one for this claimant.
    ///
    /// Assigned roles cannot be selected, and a claimant who already holds a
    /// role cannot select another. Returns the replaced selection.
    pub fn set_pending(
        &mut self,
        claimant: ClaimantId,
        role: RoleKey,
    ) -> Result<Option<RoleKey>, StoreError> {
        if let Some(existing) = self.assignments.get(&role) {
            return Err(StoreError::RoleConflict {
                role,
                holder: existing.claimant_id,
            });
        }
        if let Some(held) = self.assignment_for_claimant(claimant) {
            return Err(StoreError::ClaimantConflict {
                claimant,
                role: held.clone(),
            });
        }
        Ok(self.pending.insert(claimant, role))
    }

    pub fn clear_pending(&mut self, claimant: ClaimantId) -> Option<RoleKey> {
        self.pending.remove(&claimant)
    }

    pub fn reset_all(&mut self) {
        self.assignments.clear();
        self.pending.clear();
    }

    pub fn assignment_count(&self) -> usize {
        self.assignments.len()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}

/// Point-in-time copy of the assignments, taken under the lock and rendered outside it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreSnapshot {
    assignments: HashMap<RoleKey, Assignment>,
}

impl StoreSnapshot {
    pub fn assignment(&self, role: &RoleKey) -> Option<&Assignment> {
        self.assignments.get(role)
    }

    pub fn is_taken(&self, role: &RoleKey) -> bool {
        self.assignments.contains_key(role)
    }

    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }
}

/// Thread-safe assignment store.
#[derive(Debug, Default)]
pub struct AssignmentStore {
    state: Mutex<StoreState>,
}

impl AssignmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    // Each operation validates before it mutates, so state behind a
    // poisoned lock is still consistent.
    fn lock(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run `f` with exclusive access to both maps.
    pub fn transact<R>(&self, f: impl FnOnce(&mut StoreState) -> R) -> R {
        let mut state = self.lock();
        f(&mut state)
    }

    pub fn get_assignment(&self, role: &RoleKey) -> Option<Assignment> {
        self.lock().get_assignment(role).cloned()
    }

    pub fn assignment_for_claimant(&self, claimant: ClaimantId) -> Option<RoleKey> {
        self.lock().assignment_for_claimant(claimant).cloned()
    }

    pub fn set_assignment(
        &self,
        role: RoleKey,
        claimant: ClaimantId,
        display_name: impl Into<String>,
    ) -> Result<Assignment, StoreError> {
        self.lock()
            .set_assignment(role, claimant, display_name.into())
            .cloned()
    }

    pub fn get_pending(&self, claimant: ClaimantId) -> Option<RoleKey> {
        self.lock().get_pending(claimant).cloned()
    }

    pub fn set_pending(
        &self,
        claimant: ClaimantId,
        role: RoleKey,
    ) -> Result<Option<RoleKey>, StoreError> {
        self.lock().set_pending(claimant, role)
    }

    pub fn clear_pending(&self, claimant: ClaimantId) {
        self.lock().clear_pending(claimant);
    }

    pub fn reset_all(&self) {
        self.lock().reset_all();
    }

    pub fn snapshot(&self) -> StoreSnapshot {
        StoreSnapshot {
            assignments: self.lock().assignments.clone(),
        }
    }
}
