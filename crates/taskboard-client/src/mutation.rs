//! Per-entity mutation status.
//!
//! Every write is tracked under `(kind, target)`, where the target is the id
//! of the entity being changed (or the owning scope for creates). Two updates
//! to different tasks therefore report independently; [`any_pending`]
//! gives the coarse "something of this kind is in flight" view.
//!
//! [`any_pending`]: MutationTracker::any_pending

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MutationKind {
    CreateUser,
    RenameUser,
    DeleteUser,
    CreateTask,
    UpdateTask,
    DeleteTask,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum MutationStatus {
    #[default]
    Idle,
    Pending,
    Success,
    Error(String),
}

impl MutationStatus {
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Error(message) => Some(message),
            _ => None,
        }
    }
}

type Slot = (MutationKind, Option<Uuid>);

#[derive(Debug, Default)]
struct SlotState {
    status: MutationStatus,
    in_flight: usize,
}

#[derive(Clone, Default)]
pub struct MutationTracker {
    slots: Arc<Mutex<HashMap<Slot, SlotState>>>,
}

impl MutationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Slot, SlotState>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn begin(&self, kind: MutationKind, target: Option<Uuid>) {
        let mut slots = self.lock();
        let slot = slots.entry((kind, target)).or_default();
        slot.in_flight += 1;
        slot.status = MutationStatus::Pending;
    }

    /// Settle one call. With overlapping calls on the same target the slot
    /// stays pending until the last one lands, and that one decides.
    pub(crate) fn settle(
        &self,
        kind: MutationKind,
        target: Option<Uuid>,
        outcome: Result<(), String>,
    ) {
        let mut slots = self.lock();
        let slot = slots.entry((kind, target)).or_default();
        slot.in_flight = slot.in_flight.saturating_sub(1);
        if slot.in_flight == 0 {
            slot.status = match outcome {
                Ok(()) => MutationStatus::Success,
                Err(message) => MutationStatus::Error(message),
            };
        }
    }

    pub fn status(&self, kind: MutationKind, target: Option<Uuid>) -> MutationStatus {
        self.lock()
            .get(&(kind, target))
            .map(|slot| slot.status.clone())
            .unwrap_or_default()
    }

    pub fn is_pending(&self, kind: MutationKind, target: Option<Uuid>) -> bool {
        self.status(kind, target).is_pending()
    }

    pub fn any_pending(&self, kind: MutationKind) -> bool {
        self.lock()
            .iter()
            .any(|((k, _), slot)| *k == kind && slot.in_flight > 0)
    }

    /// Targets with a call of `kind` in flight.
    pub fn pending_targets(&self, kind: MutationKind) -> Vec<Option<Uuid>> {
        self.lock()
            .iter()
            .filter(|((k, _), slot)| *k == kind && slot.in_flight > 0)
            .map(|((_, target), _)| *target)
            .collect()
    }

    /// Forget a settled outcome. A pending slot is left alone.
    pub fn reset(&self, kind: MutationKind, target: Option<Uuid>) {
        let mut slots = self.lock();
        if slots.get(&(kind, target)).is_some_and(|slot| slot.in_flight == 0) {
            slots.remove(&(kind, target));
        }
    }
}
