use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use cdc_core::Actor;

use crate::error::AppError;
use crate::state::AppState;

// ============================================================================
// JWT Claims
// ============================================================================

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AgentClaims {
    pub sub: String,
    pub email: String,
    #[serde(default)]
    pub team: Option<String>,
    pub role: String,
    pub exp: usize,
}

// ============================================================================
// Agent Authentication Middleware
// ============================================================================

pub async fn agent_auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    // 1. Extract token from Authorization header
    let auth_header = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| AppError::AuthenticationError("missing Authorization header".to_string()))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::AuthenticationError("expected a bearer token".to_string()))?;

    // 2. Decode and validate JWT
    let token_data = decode::<AgentClaims>(
        token,
        &DecodingKey::from_secret(state.auth.secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| AppError::AuthenticationError(e.to_string()))?;

    let claims = token_data.claims;

    // 3. Check role is AGENT or ADMIN
    if claims.role != "AGENT" && claims.role != "ADMIN" {
        return Err(AppError::AuthorizationError(
            "agent or admin role required".to_string(),
        ));
    }

    // 4. Inject the verified actor into request extensions
    let actor = Actor {
        id: claims.sub.clone(),
        email: claims.email.clone(),
        team: claims.team.clone(),
    };
    req.extensions_mut().insert(claims);
    req.extensions_mut().insert(actor);

    Ok(next.run(req).await)
}
