use std::sync::Arc;

use crate::auth::google::{GoogleVerifier, IdTokenVerifier};
use crate::config::AppConfig;
use crate::db::{MongoStore, UserStore};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn UserStore>,
    pub google: Arc<dyn IdTokenVerifier>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let store = Arc::new(MongoStore::connect(&config.mongo_url, &config.db_name).await?)
            as Arc<dyn UserStore>;
        let google =
            Arc::new(GoogleVerifier::new(&config.google_client_id)) as Arc<dyn IdTokenVerifier>;

        Ok(Self {
            store,
            google,
            config,
        })
    }
}
