//! Coreport Server: HTTP boundary for the link consistency engine.

pub mod context;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod settings;

use std::sync::Arc;

use axum::Router;
use axum::routing::{delete, get, post, put};
use coreport_db::repository::{SurrealLinkStore, SurrealUserRepository};
use coreport_links::{LinkConfig, LinkService};
use surrealdb::{Connection, Surreal};
use tower_http::trace::TraceLayer;

/// Shared per-process state. Holds no caller information.
pub struct AppState<C: Connection> {
    pub db: Surreal<C>,
    pub users: SurrealUserRepository<C>,
    pub links: LinkService<SurrealLinkStore<C>>,
}

impl<C: Connection> AppState<C> {
    pub fn new(db: Surreal<C>, config: LinkConfig) -> Self {
        Self {
            users: SurrealUserRepository::new(db.clone()),
            links: LinkService::new(SurrealLinkStore::new(db.clone()), config),
            db,
        }
    }
}

pub type SharedState<C> = Arc<AppState<C>>;

pub fn router<C: Connection>(state: AppState<C>) -> Router {
    Router::new()
        .route("/api/health", get(handlers::health::<C>))
        .route("/api/links/report", get(handlers::report::<C>))
        .route(
            "/api/links/:user_id/:company_id",
            get(handlers::pair_status::<C>)
                .post(handlers::add_link::<C>)
                .delete(handlers::remove_link::<C>),
        )
        .route(
            "/api/links/:user_id/:company_id/resolve",
            post(handlers::resolve::<C>),
        )
        .route(
            "/api/companies/:company_id/employees/:user_id",
            post(handlers::set_employee::<C>).delete(handlers::remove_employee::<C>),
        )
        .route(
            "/api/companies/:company_id/responsible/:user_id",
            put(handlers::set_responsible::<C>),
        )
        .route(
            "/api/companies/:company_id/responsible",
            delete(handlers::remove_responsible::<C>),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}
