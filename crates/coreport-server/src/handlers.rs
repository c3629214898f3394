use axum::Json;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use coreport_core::error::CoreportError;
use coreport_links::{ConsistencyReport, LinkReceipt, PairStatus, Resolution};
use serde_json::{Value, json};
use surrealdb::Connection;
use uuid::Uuid;

use crate::SharedState;
use crate::context::request_context;
use crate::error::ApiResult;

pub async fn health<C: Connection>(State(state): State<SharedState<C>>) -> ApiResult<Json<Value>> {
    let db_ok = match state.db.query("RETURN true").await {
        Ok(response) => response.check().is_ok(),
        Err(_) => false,
    };
    if !db_ok {
        return Err(CoreportError::Internal("database is unreachable".into()).into());
    }
    Ok(Json(json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    })))
}

pub async fn report<C: Connection>(
    State(state): State<SharedState<C>>,
    headers: HeaderMap,
) -> ApiResult<Json<ConsistencyReport>> {
    let ctx = request_context(&state, &headers).await?;
    Ok(Json(state.links.report(&ctx).await?))
}

pub async fn pair_status<C: Connection>(
    State(state): State<SharedState<C>>,
    headers: HeaderMap,
    Path((user_id, company_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<PairStatus>> {
    let ctx = request_context(&state, &headers).await?;
    Ok(Json(state.links.pair_status(&ctx, user_id, company_id).await?))
}

pub async fn add_link<C: Connection>(
    State(state): State<SharedState<C>>,
    headers: HeaderMap,
    Path((user_id, company_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<LinkReceipt>> {
    let ctx = request_context(&state, &headers).await?;
    Ok(Json(state.links.add_link(&ctx, user_id, company_id).await?))
}

pub async fn remove_link<C: Connection>(
    State(state): State<SharedState<C>>,
    headers: HeaderMap,
    Path((user_id, company_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<LinkReceipt>> {
    let ctx = request_context(&state, &headers).await?;
    Ok(Json(state.links.remove_link(&ctx, user_id, company_id).await?))
}

pub async fn resolve<C: Connection>(
    State(state): State<SharedState<C>>,
    headers: HeaderMap,
    Path((user_id, company_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<Resolution>> {
    let ctx = request_context(&state, &headers).await?;
    Ok(Json(state.links.resolve(&ctx, user_id, company_id).await?))
}

pub async fn set_employee<C: Connection>(
    State(state): State<SharedState<C>>,
    headers: HeaderMap,
    Path((company_id, user_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<LinkReceipt>> {
    let ctx = request_context(&state, &headers).await?;
    Ok(Json(state.links.set_employee(&ctx, company_id, user_id).await?))
}

pub async fn remove_employee<C: Connection>(
    State(state): State<SharedState<C>>,
    headers: HeaderMap,
    Path((company_id, user_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<LinkReceipt>> {
    let ctx = request_context(&state, &headers).await?;
    Ok(Json(
        state.links.remove_employee(&ctx, company_id, user_id).await?,
    ))
}

pub async fn set_responsible<C: Connection>(
    State(state): State<SharedState<C>>,
    headers: HeaderMap,
    Path((company_id, user_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<LinkReceipt>> {
    let ctx = request_context(&state, &headers).await?;
    Ok(Json(
        state.links.set_responsible(&ctx, company_id, user_id).await?,
    ))
}

pub async fn remove_responsible<C: Connection>(
    State(state): State<SharedState<C>>,
    headers: HeaderMap,
    Path(company_id): Path<Uuid>,
) -> ApiResult<Json<LinkReceipt>> {
    let ctx = request_context(&state, &headers).await?;
    Ok(Json(state.links.remove_responsible(&ctx, company_id).await?))
}
