pub mod collaboration;
pub mod models;
pub mod repository;
pub mod status;

pub use collaboration::{CollaborationService, DeletedRequest, NewCollaborationRequest};
pub use models::{
    Booking, BookingPatch, CollaborationPatch, CollaborationPriority, CollaborationRequest,
    CollaborationStatus, CollaborationType, Department, NewBooking, RequestedBy, RequestedTo,
    WorkflowStep,
};
pub use repository::{BookingStore, CollaborationStore};
pub use status::{BookingStatusService, StepOverview, TransitionOutcome};

use models::WorkflowStep as Step;

/// Failures raised by the workflow and collaboration services.
///
/// The HTTP surface maps these 1:1 to status codes; everything the caller
/// needs to self-correct (notably the allowed list on an illegal transition)
/// rides on the variant.
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error("booking not found: {0}")]
    BookingNotFound(String),

    #[error("collaboration request not found: {0}")]
    RequestNotFound(String),

    #[error("{0}")]
    InvalidArgument(String),

    #[error("cannot move booking from {current} to {requested}")]
    IllegalTransition {
        current: Step,
        requested: Step,
        allowed: Vec<Step>,
    },

    #[error("booking {id} was modified concurrently (expected step {expected})")]
    Conflict { id: String, expected: Step },

    #[error("store failure: {0}")]
    Internal(String),
}

pub type WorkflowResult<T> = Result<T, WorkflowError>;
