use serde::{Deserialize, Serialize};

/// Verified actor identity produced by the authentication boundary.
///
/// Token verification itself is out of scope; whatever verifies the bearer
/// credential hands one of these to the services.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Actor {
    pub id: String,
    pub email: String,
    /// Department tag from the token claims, when present. Not validated
    /// against the closed team set until a service needs it.
    pub team: Option<String>,
}

impl Actor {
    pub fn new(id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
            team: None,
        }
    }
}
