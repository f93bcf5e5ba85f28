use async_trait::async_trait;
use cdc_core::StoreResult;
use uuid::Uuid;

use crate::models::{
    Booking, BookingPatch, CollaborationRequest, Department, NewBooking,
};

/// Contract the workflow engine requires from a booking document store.
///
/// Bookings live in exactly one department partition; lookups by id probe
/// both partitions, and `list_all` is the cross-partition merge (O(both
/// partitions), newest first).
#[async_trait]
pub trait BookingStore: Send + Sync {
    async fn get_booking(&self, id: Uuid) -> StoreResult<Option<Booking>>;

    /// Inserts into the partition named by `team` and returns the stored
    /// booking, with id and timestamps assigned.
    async fn add_booking(&self, team: Department, data: NewBooking) -> StoreResult<Booking>;

    /// Merges the supplied fields into the document and touches `updated_at`.
    /// Fails with `StoreError::Conflict` when the patch carries an
    /// `expected_step` that no longer matches the stored one.
    async fn update_booking(&self, id: Uuid, patch: BookingPatch) -> StoreResult<Booking>;

    /// Bookings owned by one department, ordered by creation time descending.
    async fn list_by_department(&self, team: Department) -> StoreResult<Vec<Booking>>;

    /// All bookings across both partitions, ordered by creation time
    /// descending.
    async fn list_all(&self) -> StoreResult<Vec<Booking>>;
}

/// Contract for collaboration request storage. Requests are stored
/// independently of bookings, so no operation here ever needs a
/// multi-document transaction.
#[async_trait]
pub trait CollaborationStore: Send + Sync {
    async fn insert_request(&self, request: CollaborationRequest) -> StoreResult<()>;

    async fn get_request(&self, id: Uuid) -> StoreResult<Option<CollaborationRequest>>;

    /// All requests attached to one booking, newest first.
    async fn list_for_booking(&self, booking_id: Uuid) -> StoreResult<Vec<CollaborationRequest>>;

    /// Replaces the stored request; fails with NotFound if it is absent.
    async fn save_request(&self, request: &CollaborationRequest) -> StoreResult<()>;

    async fn delete_request(&self, id: Uuid) -> StoreResult<()>;
}
