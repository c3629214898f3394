//! Caller identity from gateway headers.
//!
//! The upstream gateway authenticates the caller and forwards the tenant
//! and user ids. The role is always taken from the user store, never from
//! the request.

use axum::http::HeaderMap;
use coreport_core::context::{Actor, RequestContext};
use coreport_core::error::CoreportError;
use coreport_core::repository::UserRepository;
use surrealdb::Connection;
use uuid::Uuid;

use crate::AppState;
use crate::error::ApiError;

pub const TENANT_HEADER: &str = "x-tenant-id";
pub const ACTOR_HEADER: &str = "x-actor-id";
pub const REQUEST_ID_HEADER: &str = "x-request-id";

fn header_uuid(headers: &HeaderMap, name: &str) -> Result<Option<Uuid>, ApiError> {
    let Some(value) = headers.get(name) else {
        return Ok(None);
    };
    value
        .to_str()
        .ok()
        .and_then(|v| Uuid::parse_str(v.trim()).ok())
        .map(Some)
        .ok_or_else(|| ApiError::validation(format!("header {name} must be a UUID")))
}

fn required_uuid(headers: &HeaderMap, name: &str) -> Result<Uuid, ApiError> {
    header_uuid(headers, name)?
        .ok_or_else(|| ApiError::validation(format!("missing header {name}")))
}

/// Build the request context for the calling user.
pub async fn request_context<C: Connection>(
    state: &AppState<C>,
    headers: &HeaderMap,
) -> Result<RequestContext, ApiError> {
    let tenant_id = required_uuid(headers, TENANT_HEADER)?;
    let actor_id = required_uuid(headers, ACTOR_HEADER)?;

    let user = match state.users.get_by_id(tenant_id, actor_id).await {
        Ok(user) => user,
        Err(CoreportError::NotFound { .. }) => {
            tracing::warn!(%tenant_id, %actor_id, "unknown caller");
            return Err(ApiError::forbidden(format!(
                "caller {actor_id} is not a user of this tenant"
            )));
        }
        Err(err) => return Err(err.into()),
    };
    if !user.active {
        return Err(ApiError::forbidden(format!("caller {actor_id} is inactive")));
    }

    let actor = Actor::from(&user);
    Ok(match header_uuid(headers, REQUEST_ID_HEADER)? {
        Some(id) => RequestContext::with_correlation_id(tenant_id, actor, id),
        None => RequestContext::new(tenant_id, actor),
    })
}
