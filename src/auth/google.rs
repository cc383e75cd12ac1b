use anyhow::Context;
use axum::async_trait;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use tracing::debug;

const GOOGLE_JWKS_URL: &str = "https://www.googleapis.com/oauth2/v3/certs";
const GOOGLE_ISSUERS: [&str; 2] = ["accounts.google.com", "https://accounts.google.com"];

/// Claims extracted from a fully validated identity token. Nothing in
/// here is ever populated from an unchecked token.
#[derive(Debug, Clone)]
pub struct VerifiedIdentity {
    pub email: String,
    pub subject: String,
    pub issuer: String,
}

/// Trust boundary for third-party identity. The verified email is
/// authoritative; client-supplied emails on this path are ignored.
#[async_trait]
pub trait IdTokenVerifier: Send + Sync {
    async fn verify(&self, id_token: &str) -> anyhow::Result<VerifiedIdentity>;
}

#[derive(Debug, Deserialize)]
struct Jwks {
    keys: Vec<Jwk>,
}

#[derive(Debug, Deserialize)]
struct Jwk {
    kid: String,
    n: String,
    e: String,
}

#[derive(Debug, Deserialize)]
struct GoogleClaims {
    sub: String,
    iss: String,
    email: String,
}

/// Verifies Google ID tokens against Google's published signing keys.
pub struct GoogleVerifier {
    http: reqwest::Client,
    client_id: String,
}

impl GoogleVerifier {
    pub fn new(client_id: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            client_id: client_id.to_string(),
        }
    }

    async fn fetch_jwks(&self) -> anyhow::Result<Jwks> {
        let jwks = self
            .http
            .get(GOOGLE_JWKS_URL)
            .send()
            .await
            .context("fetch google jwks")?
            .error_for_status()
            .context("google jwks status")?
            .json::<Jwks>()
            .await
            .context("parse google jwks")?;
        Ok(jwks)
    }
}

#[async_trait]
impl IdTokenVerifier for GoogleVerifier {
    async fn verify(&self, id_token: &str) -> anyhow::Result<VerifiedIdentity> {
        let header = decode_header(id_token).context("malformed id token header")?;
        let kid = header.kid.context("id token has no kid")?;

        let jwks = self.fetch_jwks().await?;
        let jwk = jwks
            .keys
            .iter()
            .find(|k| k.kid == kid)
            .context("no matching google signing key")?;
        let key =
            DecodingKey::from_rsa_components(&jwk.n, &jwk.e).context("bad google signing key")?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(std::slice::from_ref(&self.client_id));
        validation.set_issuer(&GOOGLE_ISSUERS);

        let data = decode::<GoogleClaims>(id_token, &key, &validation)
            .context("google id token rejected")?;
        let claims = data.claims;
        debug!(email = %claims.email, "google id token verified");

        Ok(VerifiedIdentity {
            email: claims.email,
            subject: claims.sub,
            issuer: claims.iss,
        })
    }
}
