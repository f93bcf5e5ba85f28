use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Extension, Json, Router,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use cdc_booking::models::{Booking, Department, NewBooking, WorkflowStep};
use cdc_core::Actor;

use crate::error::AppError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/bookings", get(list_bookings).post(create_booking))
        .route("/v1/bookings/{id}/status", get(get_status).put(update_status))
}

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
    pub booking_number: String,
    pub primary_team: String,
    pub customer_name: String,
    #[serde(default = "default_pax_count")]
    pub pax_count: i32,
    pub departure_date: Option<NaiveDate>,
    #[serde(default)]
    pub total_price_amount: i32,
    #[serde(default = "default_currency")]
    pub total_price_currency: String,
}

fn default_pax_count() -> i32 {
    1
}

fn default_currency() -> String {
    "USD".to_string()
}

#[derive(Debug, Deserialize)]
pub struct ListBookingsParams {
    pub team: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusRequest {
    pub new_status: String,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub booking_id: Uuid,
    pub current_step: WorkflowStep,
    pub step_label: &'static str,
    pub terminal: bool,
    pub allowed_transitions: Vec<WorkflowStep>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionResponse {
    pub booking_id: Uuid,
    pub previous_step: WorkflowStep,
    pub new_step: WorkflowStep,
    pub changed_by: String,
    pub changed_at: DateTime<Utc>,
    pub notes: Option<String>,
    pub booking: Booking,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /v1/bookings
/// Intake: creates a booking at INQUIRY in its department's partition.
async fn create_booking(
    State(state): State<AppState>,
    Json(req): Json<CreateBookingRequest>,
) -> Result<(StatusCode, Json<Booking>), AppError> {
    let team = Department::parse(&req.primary_team).ok_or_else(|| {
        AppError::ValidationError(format!(
            "unknown team '{}'; valid teams: {}",
            req.primary_team,
            Department::names()
        ))
    })?;
    if req.booking_number.trim().is_empty() {
        return Err(AppError::ValidationError(
            "bookingNumber must not be empty".to_string(),
        ));
    }

    let data = NewBooking {
        booking_number: req.booking_number,
        customer_name: req.customer_name,
        pax_count: req.pax_count,
        departure_date: req.departure_date,
        total_price_amount: req.total_price_amount,
        total_price_currency: req.total_price_currency,
    };

    let booking = state
        .bookings
        .add_booking(team, data)
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;

    Ok((StatusCode::CREATED, Json(booking)))
}

/// GET /v1/bookings?team=
/// Per-department listing, or the cross-partition merge when no team is
/// given; both newest first.
async fn list_bookings(
    State(state): State<AppState>,
    Query(params): Query<ListBookingsParams>,
) -> Result<Json<Vec<Booking>>, AppError> {
    let bookings = match params.team.as_deref() {
        Some(raw) => {
            let team = Department::parse(raw).ok_or_else(|| {
                AppError::ValidationError(format!(
                    "unknown team '{}'; valid teams: {}",
                    raw,
                    Department::names()
                ))
            })?;
            state.bookings.list_by_department(team).await
        }
        None => state.bookings.list_all().await,
    }
    .map_err(|e| AppError::InternalServerError(e.to_string()))?;

    Ok(Json(bookings))
}

/// GET /v1/bookings/:id/status
/// Current step plus the transition-table row for it.
async fn get_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<StatusResponse>, AppError> {
    let overview = state.status.allowed_transitions(id).await?;
    Ok(Json(StatusResponse {
        booking_id: overview.booking_id,
        current_step: overview.current_step,
        step_label: overview.step_label,
        terminal: overview.terminal,
        allowed_transitions: overview.allowed_transitions,
    }))
}

/// PUT /v1/bookings/:id/status
/// Applies a workflow step transition for the authenticated actor.
async fn update_status(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<Json<TransitionResponse>, AppError> {
    let outcome = state
        .status
        .request_transition(id, &req.new_status, &actor, req.notes)
        .await?;

    Ok(Json(TransitionResponse {
        booking_id: id,
        previous_step: outcome.previous_step,
        new_step: outcome.new_step,
        changed_by: outcome.changed_by,
        changed_at: outcome.changed_at,
        notes: outcome.notes,
        booking: outcome.booking,
    }))
}
