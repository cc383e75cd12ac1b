use axum::Router;

use crate::state::AppState;

pub mod dto;
pub mod google;
pub mod handlers;
pub mod jwt;
pub mod password;
pub mod service;

pub fn router() -> Router<AppState> {
    handlers::routes()
}
