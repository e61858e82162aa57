// HTTP API - routing, shared state, error responses
//
// Every success is a 200 with a JSON body; every failure is a 400 with
// `{"error": ..., "kind": ...}`.

pub mod form;
pub mod records;

use crate::entities::{Actor, Movie};
use crate::error::{CatalogError, Result};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use rusqlite::Connection;
use serde::Serialize;
use std::sync::{Arc, Mutex};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::warn;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    db: Arc<Mutex<Connection>>,
}

impl AppState {
    pub fn new(conn: Connection) -> Self {
        Self {
            db: Arc::new(Mutex::new(conn)),
        }
    }

    /// Run `f` against the connection on the blocking pool. Each request is
    /// one unit of work.
    pub async fn with_conn<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let db = Arc::clone(&self.db);
        tokio::task::spawn_blocking(move || {
            let conn = db.lock().map_err(|_| CatalogError::Unavailable)?;
            f(&conn)
        })
        .await
        .map_err(|err| {
            warn!(error = %err, "store task failed");
            CatalogError::Unavailable
        })?
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    kind: &'static str,
}

impl IntoResponse for CatalogError {
    fn into_response(self) -> Response {
        let kind = self.kind();
        warn!(kind, error = %self, "request failed");

        (
            StatusCode::BAD_REQUEST,
            Json(ErrorBody {
                error: self.to_string(),
                kind,
            }),
        )
            .into_response()
    }
}

pub type ApiResult<T> = std::result::Result<Json<T>, CatalogError>;

#[derive(Serialize)]
struct Health {
    status: &'static str,
    version: &'static str,
}

/// GET /api/health - Health check
async fn health_check() -> Json<Health> {
    Json(Health {
        status: "ok",
        version: crate::VERSION,
    })
}

/// Build the full application router.
pub fn router(state: AppState) -> Router {
    use records::{add_relation, create, delete, get_by_id, list, remove_relations, update};

    let api_routes = Router::new()
        .route("/health", get(health_check))
        // Actors
        .route("/actors", get(list::<Actor>))
        .route(
            "/actor",
            get(get_by_id::<Actor>)
                .post(create::<Actor>)
                .put(update::<Actor>)
                .delete(delete::<Actor>),
        )
        .route(
            "/actor-relations",
            axum::routing::put(add_relation::<Actor>).delete(remove_relations::<Actor>),
        )
        // Movies
        .route("/movies", get(list::<Movie>))
        .route(
            "/movie",
            get(get_by_id::<Movie>)
                .post(create::<Movie>)
                .put(update::<Movie>)
                .delete(delete::<Movie>),
        )
        .route(
            "/movie-relations",
            axum::routing::put(add_relation::<Movie>).delete(remove_relations::<Movie>),
        )
        .with_state(state);

    Router::new()
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
