use axum::{extract::State, routing::get, Json, Router};
use tracing::instrument;

use crate::auth::jwt::AuthUser;
use crate::auth::service;
use crate::error::ApiError;
use crate::state::AppState;
use crate::users::model::PublicUser;

pub fn routes() -> Router<AppState> {
    Router::new().route("/me", get(get_me))
}

/// Fetches the current logged-in user's profile.
#[instrument(skip(state))]
async fn get_me(
    State(state): State<AppState>,
    AuthUser(email): AuthUser,
) -> Result<Json<PublicUser>, ApiError> {
    let user = service::current_user(state.store.as_ref(), &email).await?;
    Ok(Json(user))
}
