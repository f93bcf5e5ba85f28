use std::sync::Arc;

use cdc_booking::repository::{BookingStore, CollaborationStore};
use cdc_booking::{BookingStatusService, CollaborationService};

use crate::ratelimit::RateLimiter;

#[derive(Clone)]
pub struct AuthConfig {
    pub secret: String,
    pub expiration: u64,
}

#[derive(Clone)]
pub struct AppState {
    pub bookings: Arc<dyn BookingStore>,
    pub status: Arc<BookingStatusService>,
    pub collaboration: Arc<CollaborationService>,
    pub limiter: Arc<dyn RateLimiter>,
    pub auth: AuthConfig,
}

impl AppState {
    pub fn new(
        bookings: Arc<dyn BookingStore>,
        requests: Arc<dyn CollaborationStore>,
        limiter: Arc<dyn RateLimiter>,
        auth: AuthConfig,
    ) -> Self {
        Self {
            status: Arc::new(BookingStatusService::new(bookings.clone())),
            collaboration: Arc::new(CollaborationService::new(bookings.clone(), requests)),
            bookings,
            limiter,
            auth,
        }
    }
}
