use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::post,
    Form, Json, Router,
};
use tracing::instrument;

use crate::auth::dto::{
    GoogleLoginRequest, GoogleLoginResponse, GoogleSignupRequest, GoogleSignupResponse, JwtKeys,
    SignupRequest, SignupResponse, TokenForm, TokenResponse,
};
use crate::auth::service::{self, GoogleLogin};
use crate::error::ApiError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/token", post(token))
        .route("/google-login", post(google_login))
        .route("/google-signup", post(google_signup))
}

#[instrument(skip(state, payload))]
async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<SignupRequest>,
) -> Result<(StatusCode, Json<SignupResponse>), ApiError> {
    let id = service::signup(state.store.as_ref(), payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(SignupResponse {
            id,
            msg: "User created successfully".into(),
        }),
    ))
}

#[instrument(skip(state, form))]
async fn token(
    State(state): State<AppState>,
    Form(form): Form<TokenForm>,
) -> Result<Json<TokenResponse>, ApiError> {
    let keys = JwtKeys::from_ref(&state);
    let token = service::login(state.store.as_ref(), &keys, &form.username, &form.password).await?;
    Ok(Json(TokenResponse {
        access_token: token,
        token_type: "bearer".into(),
    }))
}

#[instrument(skip(state, payload))]
async fn google_login(
    State(state): State<AppState>,
    Json(payload): Json<GoogleLoginRequest>,
) -> Result<Json<GoogleLoginResponse>, ApiError> {
    let keys = JwtKeys::from_ref(&state);
    let outcome = service::google_login(
        state.store.as_ref(),
        state.google.as_ref(),
        &keys,
        &payload.token,
    )
    .await?;

    let response = match outcome {
        GoogleLogin::Registered { token, user } => GoogleLoginResponse::Registered {
            access_token: token,
            token_type: "bearer".into(),
            is_new_user: false,
            user,
        },
        GoogleLogin::NotRegistered { email } => GoogleLoginResponse::NotRegistered {
            msg: "User not registered".into(),
            email,
            is_new_user: true,
        },
    };
    Ok(Json(response))
}

#[instrument(skip(state, payload))]
async fn google_signup(
    State(state): State<AppState>,
    Json(payload): Json<GoogleSignupRequest>,
) -> Result<(StatusCode, Json<GoogleSignupResponse>), ApiError> {
    let keys = JwtKeys::from_ref(&state);
    let onboarding = service::google_signup(
        state.store.as_ref(),
        state.google.as_ref(),
        &keys,
        payload,
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(GoogleSignupResponse {
            id: onboarding.id,
            access_token: onboarding.token,
            token_type: "bearer".into(),
            user: onboarding.user,
        }),
    ))
}
