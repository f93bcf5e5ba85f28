use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ============================================================================
// Departments
// ============================================================================

/// Department that exclusively owns a booking. Each department maps to one
/// storage partition; the set is closed and enforced here rather than by
/// string concatenation at the call sites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Department {
    Air,
    Cint,
}

impl Department {
    pub const ALL: [Department; 2] = [Department::Air, Department::Cint];

    pub fn as_str(&self) -> &'static str {
        match self {
            Department::Air => "AIR",
            Department::Cint => "CINT",
        }
    }

    pub fn parse(value: &str) -> Option<Department> {
        match value {
            "AIR" => Some(Department::Air),
            "CINT" => Some(Department::Cint),
            _ => None,
        }
    }

    pub fn names() -> String {
        Department::ALL
            .iter()
            .map(|d| d.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Department {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Workflow steps
// ============================================================================

/// Lifecycle position of a booking. The transition table below is the single
/// source of truth for which moves are legal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkflowStep {
    Inquiry,
    QuoteRequested,
    QuoteReceived,
    CustomerNotified,
    Confirmed,
    DepositInvoiced,
    DepositReceived,
    Blocked,
    FinalPaymentInvoiced,
    FinalPaymentReceived,
    Ticketed,
    Completed,
    Cancelled,
    OnHold,
}

impl WorkflowStep {
    pub const ALL: [WorkflowStep; 14] = [
        WorkflowStep::Inquiry,
        WorkflowStep::QuoteRequested,
        WorkflowStep::QuoteReceived,
        WorkflowStep::CustomerNotified,
        WorkflowStep::Confirmed,
        WorkflowStep::DepositInvoiced,
        WorkflowStep::DepositReceived,
        WorkflowStep::Blocked,
        WorkflowStep::FinalPaymentInvoiced,
        WorkflowStep::FinalPaymentReceived,
        WorkflowStep::Ticketed,
        WorkflowStep::Completed,
        WorkflowStep::Cancelled,
        WorkflowStep::OnHold,
    ];

    /// Transition table row for this step. Kept as data so callers can render
    /// the legal options without re-deriving them.
    pub fn allowed_transitions(&self) -> &'static [WorkflowStep] {
        use WorkflowStep::*;
        match self {
            Inquiry => &[QuoteRequested, Cancelled, OnHold],
            QuoteRequested => &[QuoteReceived, Cancelled, OnHold],
            QuoteReceived => &[CustomerNotified, Cancelled, OnHold],
            CustomerNotified => &[Confirmed, Cancelled, OnHold],
            Confirmed => &[DepositInvoiced, FinalPaymentInvoiced, Cancelled],
            DepositInvoiced => &[DepositReceived, Cancelled],
            DepositReceived => &[Blocked, Cancelled],
            Blocked => &[FinalPaymentInvoiced, Ticketed, Cancelled],
            FinalPaymentInvoiced => &[FinalPaymentReceived, Cancelled],
            FinalPaymentReceived => &[Ticketed],
            Ticketed => &[Completed],
            Completed | Cancelled => &[],
            OnHold => &[QuoteRequested, Cancelled],
        }
    }

    pub fn can_transition_to(&self, next: WorkflowStep) -> bool {
        self.allowed_transitions().contains(&next)
    }

    pub fn is_terminal(&self) -> bool {
        self.allowed_transitions().is_empty()
    }

    /// Human-facing label for admin screens.
    pub fn label(&self) -> &'static str {
        use WorkflowStep::*;
        match self {
            Inquiry => "Inquiry",
            QuoteRequested => "Quote Requested",
            QuoteReceived => "Quote Received",
            CustomerNotified => "Customer Notified",
            Confirmed => "Confirmed",
            DepositInvoiced => "Deposit Invoiced",
            DepositReceived => "Deposit Received",
            Blocked => "Blocked",
            FinalPaymentInvoiced => "Final Payment Invoiced",
            FinalPaymentReceived => "Final Payment Received",
            Ticketed => "Ticketed",
            Completed => "Completed",
            Cancelled => "Cancelled",
            OnHold => "On Hold",
        }
    }

    pub fn as_str(&self) -> &'static str {
        use WorkflowStep::*;
        match self {
            Inquiry => "INQUIRY",
            QuoteRequested => "QUOTE_REQUESTED",
            QuoteReceived => "QUOTE_RECEIVED",
            CustomerNotified => "CUSTOMER_NOTIFIED",
            Confirmed => "CONFIRMED",
            DepositInvoiced => "DEPOSIT_INVOICED",
            DepositReceived => "DEPOSIT_RECEIVED",
            Blocked => "BLOCKED",
            FinalPaymentInvoiced => "FINAL_PAYMENT_INVOICED",
            FinalPaymentReceived => "FINAL_PAYMENT_RECEIVED",
            Ticketed => "TICKETED",
            Completed => "COMPLETED",
            Cancelled => "CANCELLED",
            OnHold => "ON_HOLD",
        }
    }

    pub fn parse(value: &str) -> Option<WorkflowStep> {
        WorkflowStep::ALL.iter().copied().find(|s| s.as_str() == value)
    }

    pub fn names() -> String {
        WorkflowStep::ALL
            .iter()
            .map(|s| s.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for WorkflowStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Bookings
// ============================================================================

/// A travel reservation progressing through the workflow. Financial and
/// traveler fields are opaque payload as far as the workflow engine goes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: Uuid,
    /// Human-facing reference; unique by convention, not enforced.
    pub booking_number: String,
    pub primary_team: Department,
    pub current_step: WorkflowStep,
    pub customer_name: String,
    pub pax_count: i32,
    pub departure_date: Option<NaiveDate>,
    pub total_price_amount: i32,
    pub total_price_currency: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub updated_by: Option<String>,
}

/// Intake payload; the store assigns id, timestamps and the initial step.
/// The owning department is the partition the booking is added to.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBooking {
    pub booking_number: String,
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

/// Field-level update applied to a booking document. `expected_step`, when
/// set, is a compare-and-swap guard: the write is rejected if the stored step
/// no longer matches.
#[derive(Debug, Default, Clone)]
pub struct BookingPatch {
    pub current_step: Option<WorkflowStep>,
    pub updated_by: Option<String>,
    pub expected_step: Option<WorkflowStep>,
}

// ============================================================================
// Collaboration requests
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CollaborationStatus {
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

impl CollaborationStatus {
    pub const ALL: [CollaborationStatus; 4] = [
        CollaborationStatus::Pending,
        CollaborationStatus::InProgress,
        CollaborationStatus::Completed,
        CollaborationStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CollaborationStatus::Pending => "PENDING",
            CollaborationStatus::InProgress => "IN_PROGRESS",
            CollaborationStatus::Completed => "COMPLETED",
            CollaborationStatus::Cancelled => "CANCELLED",
        }
    }

    pub fn parse(value: &str) -> Option<CollaborationStatus> {
        CollaborationStatus::ALL
            .iter()
            .copied()
            .find(|s| s.as_str() == value)
    }

    pub fn names() -> String {
        CollaborationStatus::ALL
            .iter()
            .map(|s| s.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for CollaborationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CollaborationPriority {
    Low,
    Medium,
    High,
    Urgent,
}

impl CollaborationPriority {
    pub const ALL: [CollaborationPriority; 4] = [
        CollaborationPriority::Low,
        CollaborationPriority::Medium,
        CollaborationPriority::High,
        CollaborationPriority::Urgent,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CollaborationPriority::Low => "LOW",
            CollaborationPriority::Medium => "MEDIUM",
            CollaborationPriority::High => "HIGH",
            CollaborationPriority::Urgent => "URGENT",
        }
    }

    pub fn parse(value: &str) -> Option<CollaborationPriority> {
        CollaborationPriority::ALL
            .iter()
            .copied()
            .find(|p| p.as_str() == value)
    }

    pub fn names() -> String {
        CollaborationPriority::ALL
            .iter()
            .map(|p| p.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl Default for CollaborationPriority {
    fn default() -> Self {
        CollaborationPriority::Medium
    }
}

impl fmt::Display for CollaborationPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Category of cross-team work being requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CollaborationType {
    FlightQuote,
    LandQuote,
    PackageConsultation,
    PricingReview,
    DocumentReview,
    CustomerConsultation,
    Other,
}

impl CollaborationType {
    pub const ALL: [CollaborationType; 7] = [
        CollaborationType::FlightQuote,
        CollaborationType::LandQuote,
        CollaborationType::PackageConsultation,
        CollaborationType::PricingReview,
        CollaborationType::DocumentReview,
        CollaborationType::CustomerConsultation,
        CollaborationType::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CollaborationType::FlightQuote => "FLIGHT_QUOTE",
            CollaborationType::LandQuote => "LAND_QUOTE",
            CollaborationType::PackageConsultation => "PACKAGE_CONSULTATION",
            CollaborationType::PricingReview => "PRICING_REVIEW",
            CollaborationType::DocumentReview => "DOCUMENT_REVIEW",
            CollaborationType::CustomerConsultation => "CUSTOMER_CONSULTATION",
            CollaborationType::Other => "OTHER",
        }
    }

    pub fn parse(value: &str) -> Option<CollaborationType> {
        CollaborationType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == value)
    }

    pub fn names() -> String {
        CollaborationType::ALL
            .iter()
            .map(|t| t.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for CollaborationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestedBy {
    pub team: Department,
    pub user_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestedTo {
    pub team: Department,
    /// Empty means the whole team; otherwise narrows to these users.
    #[serde(default)]
    pub user_ids: Vec<String>,
}

/// Cross-team work item attached to exactly one booking. References the
/// booking by id only; it does not own it and deletion does not cascade.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollaborationRequest {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub requested_by: RequestedBy,
    pub requested_to: RequestedTo,
    pub request_type: CollaborationType,
    pub status: CollaborationStatus,
    pub priority: CollaborationPriority,
    pub title: String,
    pub description: String,
    pub response: Option<String>,
    pub notes: Option<String>,
    pub assigned_to: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Partial update for a collaboration request. Status and priority arrive as
/// raw strings so the service can reject out-of-enum values with the full
/// list of valid ones.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollaborationPatch {
    pub status: Option<String>,
    pub priority: Option<String>,
    pub response: Option<String>,
    pub notes: Option<String>,
    pub assigned_to: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
}

impl CollaborationPatch {
    pub fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.priority.is_none()
            && self.response.is_none()
            && self.notes.is_none()
            && self.assigned_to.is_none()
            && self.due_date.is_none()
    }
}
