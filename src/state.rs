use crate::config::AppConfig;
use crate::db;
use sqlx::SqlitePool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);
        let db = db::connect(&config.database_url).await?;
        Ok(Self { db, config })
    }

    #[cfg(test)]
    pub async fn fake() -> Self {
        use crate::config::SessionConfig;

        let db = db::in_memory().await;
        let config = Arc::new(AppConfig {
            database_url: "sqlite::memory:".into(),
            host: "127.0.0.1".into(),
            port: 0,
            session: SessionConfig {
                cookie_name: "session_id".into(),
                ttl_minutes: 30,
                secure_cookie: false,
            },
        });
        Self { db, config }
    }
}
