use axum::Router;
use axum::routing::{get, post};

use crate::handlers::{ask, tables, upload};
use crate::state::AppState;

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/ask", post(ask))
        .route("/upload/{table}", post(upload))
        .route("/tables", get(tables))
}
