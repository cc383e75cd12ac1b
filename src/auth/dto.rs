use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey};
use serde::{Deserialize, Serialize};
use time::Duration;

use crate::users::model::{Profile, PublicUser};

/// JWT payload. The subject is the user's email.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String, // user email
    pub iat: usize,  // issued at (unix timestamp)
    pub exp: usize,  // expires at (unix timestamp)
}

/// Holds JWT signing and verification keys with config data.
#[derive(Clone)]
pub struct JwtKeys {
    pub encoding: EncodingKey,
    pub decoding: DecodingKey,
    pub algorithm: Algorithm,
    pub ttl: Duration,
}

/// Request body for password signup: credentials plus the full profile.
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    #[serde(flatten)]
    pub profile: Profile,
}

/// OAuth2-style password form posted to /auth/token.
#[derive(Debug, Deserialize)]
pub struct TokenForm {
    pub username: String, // the email
    pub password: String,
}

/// Request body for Google login: just the Google ID token.
#[derive(Debug, Deserialize)]
pub struct GoogleLoginRequest {
    pub token: String,
}

/// Request body for Google signup: the ID token plus the profile. Any
/// client-supplied email is ignored in favor of the verified one.
#[derive(Debug, Deserialize)]
pub struct GoogleSignupRequest {
    pub token: String,
    #[serde(flatten)]
    pub profile: Profile,
}

#[derive(Debug, Serialize)]
pub struct SignupResponse {
    pub id: String,
    pub msg: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum GoogleLoginResponse {
    Registered {
        access_token: String,
        token_type: String,
        is_new_user: bool,
        user: PublicUser,
    },
    NotRegistered {
        msg: String,
        email: String,
        is_new_user: bool,
    },
}

#[derive(Debug, Serialize)]
pub struct GoogleSignupResponse {
    pub id: String,
    pub access_token: String,
    pub token_type: String,
    pub user: PublicUser,
}
