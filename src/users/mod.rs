use axum::Router;

use crate::state::AppState;

pub mod handlers;
pub mod model;

pub fn router() -> Router<AppState> {
    handlers::routes()
}
