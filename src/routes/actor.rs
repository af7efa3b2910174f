use std::sync::Arc;

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use crate::error::AppError;
use crate::scheduling::{Actor, ActorRole};
use crate::AppState;

/// Extractor for the acting identity.
///
/// Authentication lives in the upstream gateway; it verifies the session
/// and forwards the caller's identity in `x-actor-id` / `x-actor-role`
/// headers. Requests reaching this service without them are rejected.
pub struct ActorContext(pub Actor);

#[async_trait]
impl FromRequestParts<Arc<AppState>> for ActorContext {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let id = parts
            .headers
            .get("x-actor-id")
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| {
                tracing::debug!("Missing or empty x-actor-id header");
                AppError::Unauthorized
            })?;

        let role = parts
            .headers
            .get("x-actor-role")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                tracing::debug!("Missing x-actor-role header");
                AppError::Unauthorized
            })?;

        let role = match role.to_ascii_lowercase().as_str() {
            "client" => ActorRole::Client,
            "professional" => ActorRole::Professional,
            other => {
                return Err(AppError::BadRequest(format!("Unknown actor role: {other}")));
            }
        };

        Ok(ActorContext(Actor {
            id: id.to_string(),
            role,
        }))
    }
}
