use std::str::FromStr;

use jsonwebtoken::Algorithm;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub algorithm: Algorithm,
    pub ttl_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub mongo_url: String,
    pub db_name: String,
    pub jwt: JwtConfig,
    pub google_client_id: String,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let mongo_url =
            std::env::var("MONGO_URL").unwrap_or_else(|_| "mongodb://localhost:27017".into());
        let db_name = std::env::var("DB_NAME").unwrap_or_else(|_| "blind_connect".into());

        let algorithm = match std::env::var("ALGORITHM") {
            Ok(name) => {
                let alg = Algorithm::from_str(&name)
                    .map_err(|_| anyhow::anyhow!("unknown JWT algorithm {name:?}"))?;
                // Tokens are signed with a symmetric secret.
                if !matches!(alg, Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512) {
                    anyhow::bail!("JWT algorithm {name:?} is not an HMAC algorithm");
                }
                alg
            }
            Err(_) => Algorithm::HS256,
        };

        let jwt = JwtConfig {
            secret: std::env::var("SECRET_KEY")?,
            algorithm,
            ttl_minutes: std::env::var("ACCESS_TOKEN_EXPIRE_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(30),
        };

        Ok(Self {
            mongo_url,
            db_name,
            jwt,
            google_client_id: std::env::var("GOOGLE_CLIENT_ID")?,
        })
    }
}
