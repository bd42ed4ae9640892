use crate::AppState;
use axum::Router;

pub mod catalog;
pub mod wizard;

/// API v1 routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(catalog::routes())
        .nest("/wizard", wizard::routes())
}
