use chrono::{DateTime, Utc};
use std::sync::Arc;
use uuid::Uuid;

use cdc_core::Actor;

use crate::models::{
    CollaborationPatch, CollaborationPriority, CollaborationRequest, CollaborationStatus,
    CollaborationType, Department, RequestedBy, RequestedTo,
};
use crate::repository::{BookingStore, CollaborationStore};
use crate::{WorkflowError, WorkflowResult};

/// Creates, queries and mutates cross-team collaboration requests. Touches
/// the booking store only to confirm the referenced booking exists.
pub struct CollaborationService {
    bookings: Arc<dyn BookingStore>,
    requests: Arc<dyn CollaborationStore>,
}

/// Creation payload. Team, type and priority arrive as raw strings so
/// rejections can enumerate the valid values.
#[derive(Debug, Clone)]
pub struct NewCollaborationRequest {
    pub requested_to_team: String,
    pub requested_to_user_ids: Vec<String>,
    pub request_type: String,
    pub priority: Option<String>,
    pub title: String,
    pub description: String,
    pub due_date: Option<DateTime<Utc>>,
}

/// Confirmation returned by a delete.
#[derive(Debug, Clone)]
pub struct DeletedRequest {
    pub id: Uuid,
    pub title: String,
}

impl CollaborationService {
    pub fn new(bookings: Arc<dyn BookingStore>, requests: Arc<dyn CollaborationStore>) -> Self {
        Self { bookings, requests }
    }

    pub async fn create_request(
        &self,
        booking_id: Uuid,
        actor: &Actor,
        input: NewCollaborationRequest,
    ) -> WorkflowResult<CollaborationRequest> {
        let booking = self
            .bookings
            .get_booking(booking_id)
            .await
            .map_err(|e| WorkflowError::Internal(e.to_string()))?
            .ok_or_else(|| WorkflowError::BookingNotFound(booking_id.to_string()))?;

        let to_team = Department::parse(&input.requested_to_team).ok_or_else(|| {
            WorkflowError::InvalidArgument(format!(
                "unknown team '{}'; valid teams: {}",
                input.requested_to_team,
                Department::names()
            ))
        })?;

        let request_type = CollaborationType::parse(&input.request_type).ok_or_else(|| {
            WorkflowError::InvalidArgument(format!(
                "unknown request type '{}'; valid types: {}",
                input.request_type,
                CollaborationType::names()
            ))
        })?;

        let priority = match input.priority.as_deref() {
            Some(raw) => CollaborationPriority::parse(raw).ok_or_else(|| {
                WorkflowError::InvalidArgument(format!(
                    "unknown priority '{}'; valid priorities: {}",
                    raw,
                    CollaborationPriority::names()
                ))
            })?,
            None => CollaborationPriority::default(),
        };

        let title = input.title.trim();
        if title.is_empty() {
            return Err(WorkflowError::InvalidArgument(
                "title must not be empty".to_string(),
            ));
        }
        let description = input.description.trim();
        if description.is_empty() {
            return Err(WorkflowError::InvalidArgument(
                "description must not be empty".to_string(),
            ));
        }

        if to_team == booking.primary_team {
            return Err(WorkflowError::InvalidArgument(
                "cannot request collaboration from your own team".to_string(),
            ));
        }

        // The requester acts for the team owning the booking unless the
        // claims say otherwise.
        let by_team = actor
            .team
            .as_deref()
            .and_then(Department::parse)
            .unwrap_or(booking.primary_team);
        if by_team == to_team {
            return Err(WorkflowError::InvalidArgument(
                "cannot request collaboration from your own team".to_string(),
            ));
        }

        let now = Utc::now();
        let request = CollaborationRequest {
            id: Uuid::new_v4(),
            booking_id,
            requested_by: RequestedBy {
                team: by_team,
                user_id: actor.id.clone(),
            },
            requested_to: RequestedTo {
                team: to_team,
                user_ids: input.requested_to_user_ids,
            },
            request_type,
            status: CollaborationStatus::Pending,
            priority,
            title: title.to_string(),
            description: description.to_string(),
            response: None,
            notes: None,
            assigned_to: None,
            due_date: input.due_date,
            created_at: now,
            updated_at: now,
        };

        self.requests
            .insert_request(request.clone())
            .await
            .map_err(|e| WorkflowError::Internal(e.to_string()))?;

        tracing::info!(
            booking = %booking_id,
            request = %request.id,
            to_team = %to_team,
            request_type = %request_type,
            "collaboration request created"
        );

        Ok(request)
    }

    /// All requests for one booking, with optional status/type equality
    /// filters applied after the fetch. No pagination.
    pub async fn list_requests(
        &self,
        booking_id: Uuid,
        status: Option<&str>,
        request_type: Option<&str>,
    ) -> WorkflowResult<Vec<CollaborationRequest>> {
        self.bookings
            .get_booking(booking_id)
            .await
            .map_err(|e| WorkflowError::Internal(e.to_string()))?
            .ok_or_else(|| WorkflowError::BookingNotFound(booking_id.to_string()))?;

        let status = status
            .map(|raw| {
                CollaborationStatus::parse(raw).ok_or_else(|| {
                    WorkflowError::InvalidArgument(format!(
                        "unknown status '{}'; valid statuses: {}",
                        raw,
                        CollaborationStatus::names()
                    ))
                })
            })
            .transpose()?;
        let request_type = request_type
            .map(|raw| {
                CollaborationType::parse(raw).ok_or_else(|| {
                    WorkflowError::InvalidArgument(format!(
                        "unknown request type '{}'; valid types: {}",
                        raw,
                        CollaborationType::names()
                    ))
                })
            })
            .transpose()?;

        let mut requests = self
            .requests
            .list_for_booking(booking_id)
            .await
            .map_err(|e| WorkflowError::Internal(e.to_string()))?;

        if let Some(status) = status {
            requests.retain(|r| r.status == status);
        }
        if let Some(request_type) = request_type {
            requests.retain(|r| r.request_type == request_type);
        }

        Ok(requests)
    }

    pub async fn get_request(&self, id: Uuid) -> WorkflowResult<CollaborationRequest> {
        self.requests
            .get_request(id)
            .await
            .map_err(|e| WorkflowError::Internal(e.to_string()))?
            .ok_or_else(|| WorkflowError::RequestNotFound(id.to_string()))
    }

    /// Merges only the supplied fields into the request.
    pub async fn update_request(
        &self,
        id: Uuid,
        patch: CollaborationPatch,
    ) -> WorkflowResult<CollaborationRequest> {
        if patch.is_empty() {
            return Err(WorkflowError::InvalidArgument(
                "nothing to update".to_string(),
            ));
        }

        let mut request = self.get_request(id).await?;

        if let Some(raw) = patch.status.as_deref() {
            request.status = CollaborationStatus::parse(raw).ok_or_else(|| {
                WorkflowError::InvalidArgument(format!(
                    "unknown status '{}'; valid statuses: {}",
                    raw,
                    CollaborationStatus::names()
                ))
            })?;
        }
        if let Some(raw) = patch.priority.as_deref() {
            request.priority = CollaborationPriority::parse(raw).ok_or_else(|| {
                WorkflowError::InvalidArgument(format!(
                    "unknown priority '{}'; valid priorities: {}",
                    raw,
                    CollaborationPriority::names()
                ))
            })?;
        }
        if let Some(response) = patch.response {
            request.response = Some(response);
        }
        if let Some(notes) = patch.notes {
            request.notes = Some(notes);
        }
        if let Some(assigned_to) = patch.assigned_to {
            request.assigned_to = Some(assigned_to);
        }
        if let Some(due_date) = patch.due_date {
            request.due_date = Some(due_date);
        }
        request.updated_at = Utc::now();

        self.requests
            .save_request(&request)
            .await
            .map_err(|e| WorkflowError::Internal(e.to_string()))?;

        Ok(request)
    }

    /// Permanent removal; refused once the request has been completed.
    pub async fn delete_request(&self, id: Uuid) -> WorkflowResult<DeletedRequest> {
        let request = self.get_request(id).await?;

        if request.status == CollaborationStatus::Completed {
            return Err(WorkflowError::InvalidArgument(
                "cannot delete a completed request".to_string(),
            ));
        }

        self.requests
            .delete_request(id)
            .await
            .map_err(|e| WorkflowError::Internal(e.to_string()))?;

        tracing::info!(request = %id, "collaboration request deleted");

        Ok(DeletedRequest {
            id,
            title: request.title,
        })
    }
}
