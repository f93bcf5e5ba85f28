use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use cdc_booking::models::{
    Booking, BookingPatch, CollaborationRequest, Department, NewBooking, WorkflowStep,
};
use cdc_booking::repository::{BookingStore, CollaborationStore};
use cdc_core::{StoreError, StoreResult};

/// In-memory reference store. One vector per department partition keeps the
/// per-partition creation order for free; collaboration requests live in a
/// flat map of their own, independent of the booking documents.
pub struct MemoryStore {
    partitions: RwLock<HashMap<Department, Vec<Booking>>>,
    requests: RwLock<HashMap<Uuid, CollaborationRequest>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        let mut partitions = HashMap::new();
        for team in Department::ALL {
            partitions.insert(team, Vec::new());
        }
        Self {
            partitions: RwLock::new(partitions),
            requests: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BookingStore for MemoryStore {
    async fn get_booking(&self, id: Uuid) -> StoreResult<Option<Booking>> {
        let partitions = self.partitions.read().await;
        for bookings in partitions.values() {
            if let Some(booking) = bookings.iter().find(|b| b.id == id) {
                return Ok(Some(booking.clone()));
            }
        }
        Ok(None)
    }

    async fn add_booking(&self, team: Department, data: NewBooking) -> StoreResult<Booking> {
        let now = Utc::now();
        let booking = Booking {
            id: Uuid::new_v4(),
            booking_number: data.booking_number,
            primary_team: team,
            current_step: WorkflowStep::Inquiry,
            customer_name: data.customer_name,
            pax_count: data.pax_count,
            departure_date: data.departure_date,
            total_price_amount: data.total_price_amount,
            total_price_currency: data.total_price_currency,
            created_at: now,
            updated_at: now,
            updated_by: None,
        };

        let mut partitions = self.partitions.write().await;
        let bookings = partitions
            .get_mut(&team)
            .ok_or_else(|| StoreError::Backend(format!("no partition for team {}", team)))?;
        bookings.push(booking.clone());
        Ok(booking)
    }

    async fn update_booking(&self, id: Uuid, patch: BookingPatch) -> StoreResult<Booking> {
        let mut partitions = self.partitions.write().await;
        let booking = partitions
            .values_mut()
            .flat_map(|bookings| bookings.iter_mut())
            .find(|b| b.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        if let Some(expected) = patch.expected_step {
            if booking.current_step != expected {
                return Err(StoreError::Conflict {
                    expected: expected.to_string(),
                    actual: booking.current_step.to_string(),
                });
            }
        }

        if let Some(step) = patch.current_step {
            booking.current_step = step;
        }
        if let Some(updated_by) = patch.updated_by {
            booking.updated_by = Some(updated_by);
        }
        booking.updated_at = Utc::now();

        Ok(booking.clone())
    }

    async fn list_by_department(&self, team: Department) -> StoreResult<Vec<Booking>> {
        let partitions = self.partitions.read().await;
        let bookings = partitions
            .get(&team)
            .ok_or_else(|| StoreError::Backend(format!("no partition for team {}", team)))?;
        // Insertion order is creation order, so newest-first is a reverse.
        Ok(bookings.iter().rev().cloned().collect())
    }

    async fn list_all(&self) -> StoreResult<Vec<Booking>> {
        let partitions = self.partitions.read().await;
        let mut merged: Vec<Booking> = partitions
            .values()
            .flat_map(|bookings| bookings.iter().cloned())
            .collect();
        merged.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(merged)
    }
}

#[async_trait]
impl CollaborationStore for MemoryStore {
    async fn insert_request(&self, request: CollaborationRequest) -> StoreResult<()> {
        let mut requests = self.requests.write().await;
        requests.insert(request.id, request);
        Ok(())
    }

    async fn get_request(&self, id: Uuid) -> StoreResult<Option<CollaborationRequest>> {
        let requests = self.requests.read().await;
        Ok(requests.get(&id).cloned())
    }

    async fn list_for_booking(&self, booking_id: Uuid) -> StoreResult<Vec<CollaborationRequest>> {
        let requests = self.requests.read().await;
        let mut matching: Vec<CollaborationRequest> = requests
            .values()
            .filter(|r| r.booking_id == booking_id)
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(matching)
    }

    async fn save_request(&self, request: &CollaborationRequest) -> StoreResult<()> {
        let mut requests = self.requests.write().await;
        if !requests.contains_key(&request.id) {
            return Err(StoreError::NotFound(request.id.to_string()));
        }
        requests.insert(request.id, request.clone());
        Ok(())
    }

    async fn delete_request(&self, id: Uuid) -> StoreResult<()> {
        let mut requests = self.requests.write().await;
        requests
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cdc_booking::collaboration::NewCollaborationRequest;
    use cdc_booking::{BookingStatusService, CollaborationService, WorkflowError};
    use cdc_core::Actor;
    use std::sync::Arc;

    fn actor() -> Actor {
        Actor::new("agent-7", "agent7@cdctravel.example")
    }

    fn new_booking(number: &str) -> NewBooking {
        NewBooking {
            booking_number: number.to_string(),
            customer_name: "Kim Minji".to_string(),
            pax_count: 2,
            departure_date: None,
            total_price_amount: 250_000,
            total_price_currency: "USD".to_string(),
        }
    }

    fn collab_input(to_team: &str) -> NewCollaborationRequest {
        NewCollaborationRequest {
            requested_to_team: to_team.to_string(),
            requested_to_user_ids: vec![],
            request_type: "LAND_QUOTE".to_string(),
            priority: None,
            title: "Quote hotel block for group".to_string(),
            description: "Need land portion priced for 2 pax, 5 nights".to_string(),
            due_date: None,
        }
    }

    struct Fixture {
        store: Arc<MemoryStore>,
        status: BookingStatusService,
        collaboration: CollaborationService,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let bookings: Arc<dyn BookingStore> = store.clone();
        let requests: Arc<dyn CollaborationStore> = store.clone();
        Fixture {
            status: BookingStatusService::new(bookings.clone()),
            collaboration: CollaborationService::new(bookings, requests),
            store,
        }
    }

    async fn seed(store: &MemoryStore, team: Department, number: &str) -> Booking {
        store.add_booking(team, new_booking(number)).await.unwrap()
    }

    /// Forces a booking to an arbitrary step, bypassing the legality check.
    async fn force_step(store: &MemoryStore, id: Uuid, step: WorkflowStep) {
        let patch = BookingPatch {
            current_step: Some(step),
            ..Default::default()
        };
        store.update_booking(id, patch).await.unwrap();
    }

    // ------------------------------------------------------------------
    // Store semantics
    // ------------------------------------------------------------------

    #[tokio::test]
    async fn bookings_are_routed_to_their_partition() {
        let f = fixture();
        let air = seed(&f.store, Department::Air, "CDC-1001").await;
        let cint = seed(&f.store, Department::Cint, "CDC-1002").await;

        let air_list = f.store.list_by_department(Department::Air).await.unwrap();
        assert_eq!(air_list.len(), 1);
        assert_eq!(air_list[0].id, air.id);

        let cint_list = f.store.list_by_department(Department::Cint).await.unwrap();
        assert_eq!(cint_list.len(), 1);
        assert_eq!(cint_list[0].id, cint.id);
    }

    #[tokio::test]
    async fn department_listing_is_newest_first() {
        let f = fixture();
        let first = seed(&f.store, Department::Air, "CDC-2001").await;
        let second = seed(&f.store, Department::Air, "CDC-2002").await;

        let list = f.store.list_by_department(Department::Air).await.unwrap();
        assert_eq!(list[0].id, second.id);
        assert_eq!(list[1].id, first.id);
    }

    #[tokio::test]
    async fn list_all_merges_both_partitions() {
        let f = fixture();
        seed(&f.store, Department::Air, "CDC-3001").await;
        seed(&f.store, Department::Cint, "CDC-3002").await;
        seed(&f.store, Department::Air, "CDC-3003").await;

        let all = f.store.list_all().await.unwrap();
        assert_eq!(all.len(), 3);
        for pair in all.windows(2) {
            assert!(pair[0].created_at >= pair[1].created_at);
        }
    }

    #[tokio::test]
    async fn new_bookings_start_at_inquiry() {
        let f = fixture();
        let booking = seed(&f.store, Department::Air, "CDC-4001").await;
        assert_eq!(booking.current_step, WorkflowStep::Inquiry);
        assert!(booking.updated_by.is_none());
    }

    #[tokio::test]
    async fn stale_expected_step_is_a_conflict() {
        let f = fixture();
        let booking = seed(&f.store, Department::Air, "CDC-5001").await;
        force_step(&f.store, booking.id, WorkflowStep::Confirmed).await;

        let patch = BookingPatch {
            current_step: Some(WorkflowStep::QuoteRequested),
            expected_step: Some(WorkflowStep::Inquiry),
            ..Default::default()
        };
        let err = f.store.update_booking(booking.id, patch).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict { .. }));
    }

    // ------------------------------------------------------------------
    // Status service
    // ------------------------------------------------------------------

    #[tokio::test]
    async fn allowed_transitions_match_the_table_for_every_step() {
        let f = fixture();
        let booking = seed(&f.store, Department::Air, "CDC-6001").await;

        for step in WorkflowStep::ALL {
            force_step(&f.store, booking.id, step).await;
            let overview = f.status.allowed_transitions(booking.id).await.unwrap();
            assert_eq!(overview.current_step, step);
            assert_eq!(overview.allowed_transitions, step.allowed_transitions());
            assert_eq!(overview.terminal, step.is_terminal());
        }

        // The read never moved the booking off its last forced step.
        let stored = f.store.get_booking(booking.id).await.unwrap().unwrap();
        assert_eq!(stored.current_step, WorkflowStep::OnHold);
    }

    #[tokio::test]
    async fn legal_transition_moves_the_booking() {
        let f = fixture();
        let booking = seed(&f.store, Department::Air, "CDC-6002").await;

        let outcome = f
            .status
            .request_transition(booking.id, "QUOTE_REQUESTED", &actor(), None)
            .await
            .unwrap();
        assert_eq!(outcome.previous_step, WorkflowStep::Inquiry);
        assert_eq!(outcome.new_step, WorkflowStep::QuoteRequested);
        assert_eq!(outcome.changed_by, "agent-7");

        let stored = f.store.get_booking(booking.id).await.unwrap().unwrap();
        assert_eq!(stored.current_step, WorkflowStep::QuoteRequested);
        assert_eq!(stored.updated_by.as_deref(), Some("agent-7"));
    }

    #[tokio::test]
    async fn transition_to_current_step_is_rejected() {
        let f = fixture();
        let booking = seed(&f.store, Department::Air, "CDC-6003").await;

        let err = f
            .status
            .request_transition(booking.id, "INQUIRY", &actor(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::InvalidArgument(_)));

        let stored = f.store.get_booking(booking.id).await.unwrap().unwrap();
        assert_eq!(stored.current_step, WorkflowStep::Inquiry);
    }

    #[tokio::test]
    async fn illegal_transition_reports_the_allowed_row() {
        let f = fixture();
        let booking = seed(&f.store, Department::Air, "CDC-6004").await;

        let err = f
            .status
            .request_transition(booking.id, "TICKETED", &actor(), None)
            .await
            .unwrap_err();
        match err {
            WorkflowError::IllegalTransition {
                current,
                requested,
                allowed,
            } => {
                assert_eq!(current, WorkflowStep::Inquiry);
                assert_eq!(requested, WorkflowStep::Ticketed);
                assert_eq!(allowed, WorkflowStep::Inquiry.allowed_transitions());
            }
            other => panic!("expected IllegalTransition, got {:?}", other),
        }

        let stored = f.store.get_booking(booking.id).await.unwrap().unwrap();
        assert_eq!(stored.current_step, WorkflowStep::Inquiry);
    }

    #[tokio::test]
    async fn unknown_step_name_is_invalid() {
        let f = fixture();
        let booking = seed(&f.store, Department::Air, "CDC-6005").await;

        let err = f
            .status
            .request_transition(booking.id, "SHIPPED", &actor(), None)
            .await
            .unwrap_err();
        match err {
            WorkflowError::InvalidArgument(msg) => assert!(msg.contains("QUOTE_REQUESTED")),
            other => panic!("expected InvalidArgument, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn unknown_booking_is_not_found() {
        let f = fixture();
        let err = f
            .status
            .request_transition(Uuid::new_v4(), "QUOTE_REQUESTED", &actor(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::BookingNotFound(_)));
    }

    #[tokio::test]
    async fn inquiry_cannot_jump_to_confirmed() {
        let f = fixture();
        let booking = seed(&f.store, Department::Air, "CDC-6006").await;

        f.status
            .request_transition(booking.id, "QUOTE_REQUESTED", &actor(), None)
            .await
            .unwrap();

        let err = f
            .status
            .request_transition(booking.id, "CONFIRMED", &actor(), None)
            .await
            .unwrap_err();
        match err {
            WorkflowError::IllegalTransition { allowed, .. } => {
                assert_eq!(
                    allowed,
                    vec![
                        WorkflowStep::QuoteReceived,
                        WorkflowStep::Cancelled,
                        WorkflowStep::OnHold,
                    ]
                );
            }
            other => panic!("expected IllegalTransition, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn deposit_steps_advance_one_at_a_time() {
        let f = fixture();
        let booking = seed(&f.store, Department::Air, "CDC-6007").await;
        force_step(&f.store, booking.id, WorkflowStep::Confirmed).await;

        f.status
            .request_transition(booking.id, "DEPOSIT_INVOICED", &actor(), None)
            .await
            .unwrap();
        let overview = f.status.allowed_transitions(booking.id).await.unwrap();
        assert_eq!(overview.current_step, WorkflowStep::DepositInvoiced);
        assert_eq!(
            overview.allowed_transitions,
            vec![WorkflowStep::DepositReceived, WorkflowStep::Cancelled]
        );

        f.status
            .request_transition(booking.id, "DEPOSIT_RECEIVED", &actor(), None)
            .await
            .unwrap();
        let overview = f.status.allowed_transitions(booking.id).await.unwrap();
        assert_eq!(overview.current_step, WorkflowStep::DepositReceived);
    }

    // ------------------------------------------------------------------
    // Collaboration service
    // ------------------------------------------------------------------

    #[tokio::test]
    async fn own_team_collaboration_is_rejected_for_every_team() {
        let f = fixture();
        for team in Department::ALL {
            let booking = seed(&f.store, team, "CDC-7001").await;
            let err = f
                .collaboration
                .create_request(booking.id, &actor(), collab_input(team.as_str()))
                .await
                .unwrap_err();
            match err {
                WorkflowError::InvalidArgument(msg) => assert!(msg.contains("own team")),
                other => panic!("expected InvalidArgument, got {:?}", other),
            }
        }
    }

    #[tokio::test]
    async fn cross_team_request_starts_pending_with_default_priority() {
        let f = fixture();
        let booking = seed(&f.store, Department::Air, "CDC-7002").await;

        let request = f
            .collaboration
            .create_request(booking.id, &actor(), collab_input("CINT"))
            .await
            .unwrap();
        assert_eq!(request.status, cdc_booking::CollaborationStatus::Pending);
        assert_eq!(
            request.priority,
            cdc_booking::CollaborationPriority::Medium
        );
        assert_eq!(request.requested_to.team, Department::Cint);
        assert_eq!(request.requested_by.team, Department::Air);
        assert_eq!(request.requested_by.user_id, "agent-7");
    }

    #[tokio::test]
    async fn blank_title_or_description_is_rejected() {
        let f = fixture();
        let booking = seed(&f.store, Department::Air, "CDC-7003").await;

        let mut input = collab_input("CINT");
        input.title = "   ".to_string();
        let err = f
            .collaboration
            .create_request(booking.id, &actor(), input)
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::InvalidArgument(_)));

        let mut input = collab_input("CINT");
        input.description = "".to_string();
        let err = f
            .collaboration
            .create_request(booking.id, &actor(), input)
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn unknown_request_type_lists_valid_values() {
        let f = fixture();
        let booking = seed(&f.store, Department::Air, "CDC-7004").await;

        let mut input = collab_input("CINT");
        input.request_type = "BUS_QUOTE".to_string();
        let err = f
            .collaboration
            .create_request(booking.id, &actor(), input)
            .await
            .unwrap_err();
        match err {
            WorkflowError::InvalidArgument(msg) => {
                assert!(msg.contains("FLIGHT_QUOTE"));
                assert!(msg.contains("OTHER"));
            }
            other => panic!("expected InvalidArgument, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn listing_applies_status_and_type_filters() {
        let f = fixture();
        let booking = seed(&f.store, Department::Air, "CDC-7005").await;

        let first = f
            .collaboration
            .create_request(booking.id, &actor(), collab_input("CINT"))
            .await
            .unwrap();
        let mut other = collab_input("CINT");
        other.request_type = "PRICING_REVIEW".to_string();
        f.collaboration
            .create_request(booking.id, &actor(), other)
            .await
            .unwrap();

        let all = f
            .collaboration
            .list_requests(booking.id, None, None)
            .await
            .unwrap();
        assert_eq!(all.len(), 2);

        let land = f
            .collaboration
            .list_requests(booking.id, None, Some("LAND_QUOTE"))
            .await
            .unwrap();
        assert_eq!(land.len(), 1);
        assert_eq!(land[0].id, first.id);

        let done = f
            .collaboration
            .list_requests(booking.id, Some("COMPLETED"), None)
            .await
            .unwrap();
        assert!(done.is_empty());
    }

    #[tokio::test]
    async fn empty_update_is_rejected() {
        let f = fixture();
        let booking = seed(&f.store, Department::Air, "CDC-7006").await;
        let request = f
            .collaboration
            .create_request(booking.id, &actor(), collab_input("CINT"))
            .await
            .unwrap();

        let err = f
            .collaboration
            .update_request(request.id, Default::default())
            .await
            .unwrap_err();
        match err {
            WorkflowError::InvalidArgument(msg) => assert!(msg.contains("nothing to update")),
            other => panic!("expected InvalidArgument, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn update_merges_only_supplied_fields() {
        let f = fixture();
        let booking = seed(&f.store, Department::Air, "CDC-7007").await;
        let request = f
            .collaboration
            .create_request(booking.id, &actor(), collab_input("CINT"))
            .await
            .unwrap();

        let patch = cdc_booking::CollaborationPatch {
            status: Some("IN_PROGRESS".to_string()),
            response: Some("Working on rates".to_string()),
            ..Default::default()
        };
        let updated = f.collaboration.update_request(request.id, patch).await.unwrap();
        assert_eq!(updated.status, cdc_booking::CollaborationStatus::InProgress);
        assert_eq!(updated.response.as_deref(), Some("Working on rates"));
        assert_eq!(updated.title, request.title);
        assert_eq!(updated.priority, request.priority);
    }

    #[tokio::test]
    async fn update_with_unknown_status_is_rejected() {
        let f = fixture();
        let booking = seed(&f.store, Department::Air, "CDC-7008").await;
        let request = f
            .collaboration
            .create_request(booking.id, &actor(), collab_input("CINT"))
            .await
            .unwrap();

        let patch = cdc_booking::CollaborationPatch {
            status: Some("DONE".to_string()),
            ..Default::default()
        };
        let err = f
            .collaboration
            .update_request(request.id, patch)
            .await
            .unwrap_err();
        match err {
            WorkflowError::InvalidArgument(msg) => assert!(msg.contains("IN_PROGRESS")),
            other => panic!("expected InvalidArgument, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn completed_requests_cannot_be_deleted() {
        let f = fixture();
        let booking = seed(&f.store, Department::Air, "CDC-7009").await;
        let request = f
            .collaboration
            .create_request(booking.id, &actor(), collab_input("CINT"))
            .await
            .unwrap();

        let patch = cdc_booking::CollaborationPatch {
            status: Some("COMPLETED".to_string()),
            ..Default::default()
        };
        f.collaboration.update_request(request.id, patch).await.unwrap();

        let err = f.collaboration.delete_request(request.id).await.unwrap_err();
        match err {
            WorkflowError::InvalidArgument(msg) => assert!(msg.contains("completed")),
            other => panic!("expected InvalidArgument, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn pending_requests_delete_and_disappear() {
        let f = fixture();
        let booking = seed(&f.store, Department::Air, "CDC-7010").await;
        let request = f
            .collaboration
            .create_request(booking.id, &actor(), collab_input("CINT"))
            .await
            .unwrap();

        let deleted = f.collaboration.delete_request(request.id).await.unwrap();
        assert_eq!(deleted.id, request.id);
        assert_eq!(deleted.title, request.title);

        let err = f.collaboration.get_request(request.id).await.unwrap_err();
        assert!(matches!(err, WorkflowError::RequestNotFound(_)));
    }

    #[tokio::test]
    async fn collaboration_against_unknown_booking_is_not_found() {
        let f = fixture();
        let err = f
            .collaboration
            .create_request(Uuid::new_v4(), &actor(), collab_input("CINT"))
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::BookingNotFound(_)));
    }
}
