use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use cdc_booking::collaboration::NewCollaborationRequest;
use cdc_booking::models::{CollaborationPatch, CollaborationRequest};
use cdc_core::Actor;

use crate::error::AppError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/v1/bookings/{id}/collaborate",
            get(list_collaborations).post(create_collaboration),
        )
        .route(
            "/v1/collaborations/{id}",
            get(get_collaboration)
                .put(update_collaboration)
                .delete(delete_collaboration),
        )
}

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCollaborationRequest {
    pub requested_to_team: String,
    #[serde(default)]
    pub requested_to_user_ids: Vec<String>,
    #[serde(rename = "type")]
    pub request_type: String,
    pub priority: Option<String>,
    pub title: String,
    pub description: String,
    pub due_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct ListCollaborationsParams {
    pub status: Option<String>,
    #[serde(rename = "type")]
    pub request_type: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResponse {
    pub id: Uuid,
    pub title: String,
    pub deleted: bool,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /v1/bookings/:id/collaborate
/// Opens a cross-team work request against the booking.
async fn create_collaboration(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(booking_id): Path<Uuid>,
    Json(req): Json<CreateCollaborationRequest>,
) -> Result<(StatusCode, Json<CollaborationRequest>), AppError> {
    let input = NewCollaborationRequest {
        requested_to_team: req.requested_to_team,
        requested_to_user_ids: req.requested_to_user_ids,
        request_type: req.request_type,
        priority: req.priority,
        title: req.title,
        description: req.description,
        due_date: req.due_date,
    };

    let request = state
        .collaboration
        .create_request(booking_id, &actor, input)
        .await?;

    Ok((StatusCode::CREATED, Json(request)))
}

/// GET /v1/bookings/:id/collaborate?status=&type=
async fn list_collaborations(
    State(state): State<AppState>,
    Path(booking_id): Path<Uuid>,
    Query(params): Query<ListCollaborationsParams>,
) -> Result<Json<Vec<CollaborationRequest>>, AppError> {
    let requests = state
        .collaboration
        .list_requests(
            booking_id,
            params.status.as_deref(),
            params.request_type.as_deref(),
        )
        .await?;
    Ok(Json(requests))
}

/// GET /v1/collaborations/:id
async fn get_collaboration(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CollaborationRequest>, AppError> {
    let request = state.collaboration.get_request(id).await?;
    Ok(Json(request))
}

/// PUT /v1/collaborations/:id
/// Partial update; rejects an empty payload.
async fn update_collaboration(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(patch): Json<CollaborationPatch>,
) -> Result<Json<CollaborationRequest>, AppError> {
    let request = state.collaboration.update_request(id, patch).await?;
    Ok(Json(request))
}

/// DELETE /v1/collaborations/:id
/// Permanent removal; refused for completed requests.
async fn delete_collaboration(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<DeleteResponse>, AppError> {
    let deleted = state.collaboration.delete_request(id).await?;
    Ok(Json(DeleteResponse {
        id: deleted.id,
        title: deleted.title,
        deleted: true,
    }))
}
