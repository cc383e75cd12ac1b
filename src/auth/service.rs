use lazy_static::lazy_static;
use mongodb::bson::DateTime;
use regex::Regex;
use tracing::{debug, info, warn};

use crate::auth::dto::{GoogleSignupRequest, JwtKeys, SignupRequest};
use crate::auth::google::IdTokenVerifier;
use crate::auth::password::{hash_password, random_placeholder_password, verify_password};
use crate::db::{StoreError, UserStore};
use crate::error::ApiError;
use crate::users::model::{AuthProvider, PublicUser, UserRecord};

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Outcome of a Google login attempt. An unknown verified email is not
/// an error; the caller redirects to the signup flow.
#[derive(Debug)]
pub enum GoogleLogin {
    Registered { token: String, user: PublicUser },
    NotRegistered { email: String },
}

/// Result of Google onboarding, whether it created or overwrote.
#[derive(Debug)]
pub struct GoogleOnboarding {
    pub id: String,
    pub token: String,
    pub user: PublicUser,
}

/// Register a local (email/password) account. Duplicate email is a
/// hard conflict, unlike the Google path.
pub async fn signup(store: &dyn UserStore, req: SignupRequest) -> Result<String, ApiError> {
    let email = req.email.trim().to_string();
    if !is_valid_email(&email) {
        return Err(ApiError::Validation("Invalid email".into()));
    }
    if req.password.len() < 8 {
        return Err(ApiError::Validation("Password too short".into()));
    }
    req.profile.validate()?;

    if store.find_by_email(&email).await?.is_some() {
        warn!(email = %email, "signup with registered email");
        return Err(ApiError::Conflict("Email already registered".into()));
    }

    let hashed_password = hash_password(&req.password)?;
    let record = UserRecord {
        id: None,
        email: email.clone(),
        hashed_password,
        auth_provider: AuthProvider::Local,
        created_at: DateTime::now(),
        profile: req.profile,
    };

    // The pre-check above is racy; the store's unique index is what
    // actually guarantees one record per email.
    let id = store.insert(record).await.map_err(|e| match e {
        StoreError::Duplicate => ApiError::Conflict("Email already registered".into()),
        StoreError::Other(e) => ApiError::Internal(e),
    })?;

    info!(user_id = %id, email = %email, "user registered");
    Ok(id)
}

/// Exchange email + password for a bearer token. Unknown email and bad
/// password are indistinguishable to the caller.
pub async fn login(
    store: &dyn UserStore,
    keys: &JwtKeys,
    email: &str,
    password: &str,
) -> Result<String, ApiError> {
    let email = email.trim();
    let user = match store.find_by_email(email).await? {
        Some(u) => u,
        None => {
            warn!(email = %email, "login with unknown email");
            return Err(ApiError::Unauthorized("Incorrect email or password".into()));
        }
    };

    if !verify_password(password, &user.hashed_password) {
        warn!(email = %email, "login with invalid password");
        return Err(ApiError::Unauthorized("Incorrect email or password".into()));
    }

    let token = keys.sign(&user.email)?;
    info!(email = %user.email, "user logged in");
    Ok(token)
}

/// Log in with a Google ID token. Verification happens before any
/// store access; an unregistered verified email is a signal, not an
/// error.
pub async fn google_login(
    store: &dyn UserStore,
    verifier: &dyn IdTokenVerifier,
    keys: &JwtKeys,
    id_token: &str,
) -> Result<GoogleLogin, ApiError> {
    let identity = verifier.verify(id_token).await.map_err(|e| {
        warn!(error = %e, "google login with invalid token");
        ApiError::Unauthorized("Invalid Google token".into())
    })?;
    debug!(email = %identity.email, issuer = %identity.issuer, subject = %identity.subject, "google identity verified");

    match store.find_by_email(&identity.email).await? {
        Some(user) => {
            let token = keys.sign(&user.email)?;
            info!(email = %user.email, "google login");
            Ok(GoogleLogin::Registered {
                token,
                user: user.into(),
            })
        }
        None => Ok(GoogleLogin::NotRegistered {
            email: identity.email,
        }),
    }
}

/// Onboard through Google. A fresh email creates the account; an
/// existing one gets its profile overwritten in place and keeps its id.
pub async fn google_signup(
    store: &dyn UserStore,
    verifier: &dyn IdTokenVerifier,
    keys: &JwtKeys,
    req: GoogleSignupRequest,
) -> Result<GoogleOnboarding, ApiError> {
    let identity = verifier.verify(&req.token).await.map_err(|e| {
        warn!(error = %e, "google signup with invalid token");
        ApiError::Unauthorized("Invalid Google token".into())
    })?;
    debug!(email = %identity.email, issuer = %identity.issuer, subject = %identity.subject, "google identity verified");

    req.profile.validate()?;

    if let Some(existing) = store.find_by_email(&identity.email).await? {
        // Re-onboarding: replace the profile fields, keep identity
        // fields and the record id.
        let id = existing
            .id
            .map(|oid| oid.to_hex())
            .ok_or_else(|| anyhow::anyhow!("stored user has no id"))?;
        let fields = mongodb::bson::to_document(&req.profile)
            .map_err(|e| ApiError::Internal(e.into()))?;
        store.update_fields(&id, fields).await?;

        let refreshed = store
            .find_by_id(&id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("User {id} not found")))?;
        let token = keys.sign(&identity.email)?;
        info!(user_id = %id, email = %identity.email, "google re-onboarding overwrote profile");
        return Ok(GoogleOnboarding {
            id,
            token,
            user: refreshed.into(),
        });
    }

    // No usable password on this path; store the hash of a random one
    // so the record shape stays uniform.
    let hashed_password = hash_password(&random_placeholder_password())?;
    let record = UserRecord {
        id: None,
        // Taken from the verified token, never from the client body.
        email: identity.email.clone(),
        hashed_password,
        auth_provider: AuthProvider::Google,
        created_at: DateTime::now(),
        profile: req.profile,
    };

    let id = store.insert(record).await.map_err(|e| match e {
        StoreError::Duplicate => ApiError::Conflict("User already exists".into()),
        StoreError::Other(e) => ApiError::Internal(e),
    })?;

    let user = store
        .find_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("User {id} not found")))?;
    let token = keys.sign(&identity.email)?;
    info!(user_id = %id, email = %identity.email, "google user registered");
    Ok(GoogleOnboarding {
        id,
        token,
        user: user.into(),
    })
}

/// Resolve a verified token subject back to a sanitized user view.
pub async fn current_user(store: &dyn UserStore, email: &str) -> Result<PublicUser, ApiError> {
    let user = store
        .find_by_email(email)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Could not validate credentials".into()))?;
    Ok(user.into())
}
