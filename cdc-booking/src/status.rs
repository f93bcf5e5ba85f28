use chrono::{DateTime, Utc};
use std::sync::Arc;
use uuid::Uuid;

use cdc_core::{Actor, StoreError};

use crate::models::{BookingPatch, WorkflowStep};
use crate::repository::BookingStore;
use crate::{models::Booking, WorkflowError, WorkflowResult};

/// Validates and applies workflow step transitions against the transition
/// table and the booking's current state.
pub struct BookingStatusService {
    store: Arc<dyn BookingStore>,
}

/// Result of a successful transition.
#[derive(Debug, Clone)]
pub struct TransitionOutcome {
    pub booking: Booking,
    pub previous_step: WorkflowStep,
    pub new_step: WorkflowStep,
    pub changed_by: String,
    pub changed_at: DateTime<Utc>,
    pub notes: Option<String>,
}

/// Read-only view of a booking's position in the workflow.
#[derive(Debug, Clone)]
pub struct StepOverview {
    pub booking_id: Uuid,
    pub current_step: WorkflowStep,
    pub step_label: &'static str,
    pub terminal: bool,
    pub allowed_transitions: Vec<WorkflowStep>,
}

impl BookingStatusService {
    pub fn new(store: Arc<dyn BookingStore>) -> Self {
        Self { store }
    }

    /// Moves a booking to `new_step` if the transition table allows it from
    /// the current step.
    ///
    /// The step read during the legality check is passed to the store as an
    /// expected-current-step precondition, so a concurrent writer loses with
    /// a conflict instead of silently overwriting the transition.
    pub async fn request_transition(
        &self,
        booking_id: Uuid,
        new_step: &str,
        actor: &Actor,
        notes: Option<String>,
    ) -> WorkflowResult<TransitionOutcome> {
        let requested = WorkflowStep::parse(new_step).ok_or_else(|| {
            WorkflowError::InvalidArgument(format!(
                "unknown workflow step '{}'; valid steps: {}",
                new_step,
                WorkflowStep::names()
            ))
        })?;

        let booking = self.fetch(booking_id).await?;
        let current = booking.current_step;

        if requested == current {
            return Err(WorkflowError::InvalidArgument(format!(
                "booking is already at {}",
                current
            )));
        }

        if !current.can_transition_to(requested) {
            return Err(WorkflowError::IllegalTransition {
                current,
                requested,
                allowed: current.allowed_transitions().to_vec(),
            });
        }

        let patch = BookingPatch {
            current_step: Some(requested),
            updated_by: Some(actor.id.clone()),
            expected_step: Some(current),
        };

        let updated = self
            .store
            .update_booking(booking_id, patch)
            .await
            .map_err(|e| match e {
                StoreError::NotFound(id) => WorkflowError::BookingNotFound(id),
                StoreError::Conflict { .. } => WorkflowError::Conflict {
                    id: booking_id.to_string(),
                    expected: current,
                },
                StoreError::Backend(msg) => WorkflowError::Internal(msg),
            })?;

        tracing::info!(
            booking = %booking_id,
            from = %current,
            to = %requested,
            actor = %actor.id,
            "booking step changed"
        );

        Ok(TransitionOutcome {
            previous_step: current,
            new_step: requested,
            changed_by: actor.id.clone(),
            changed_at: updated.updated_at,
            notes,
            booking: updated,
        })
    }

    /// Current step plus its transition-table row. Pure lookup; never
    /// mutates the booking.
    pub async fn allowed_transitions(&self, booking_id: Uuid) -> WorkflowResult<StepOverview> {
        let booking = self.fetch(booking_id).await?;
        let current = booking.current_step;
        Ok(StepOverview {
            booking_id,
            current_step: current,
            step_label: current.label(),
            terminal: current.is_terminal(),
            allowed_transitions: current.allowed_transitions().to_vec(),
        })
    }

    async fn fetch(&self, booking_id: Uuid) -> WorkflowResult<Booking> {
        self.store
            .get_booking(booking_id)
            .await
            .map_err(|e| WorkflowError::Internal(e.to_string()))?
            .ok_or_else(|| WorkflowError::BookingNotFound(booking_id.to_string()))
    }
}
