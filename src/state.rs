use crate::config::AppConfig;
use crate::users::UserStore;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserStore>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn from_parts(users: Arc<dyn UserStore>, config: Arc<AppConfig>) -> Self {
        Self { users, config }
    }

    #[cfg(test)]
    pub fn fake() -> Self {
        Self::fake_with(
            Arc::new(crate::users::repo::MemoryUserStore::default()),
            Some("test-secret"),
        )
    }

    #[cfg(test)]
    pub fn fake_with(users: Arc<dyn UserStore>, jwt_secret: Option<&str>) -> Self {
        let config = Arc::new(AppConfig {
            database: sqlx::postgres::PgConnectOptions::new()
                .host("localhost")
                .username("postgres")
                .database("postgres"),
            max_connections: 1,
            listen_addr: std::net::SocketAddr::from(([127, 0, 0, 1], 0)),
            jwt: crate::config::JwtConfig {
                secret: jwt_secret.map(Into::into),
                ttl_hours: 24,
            },
        });
        Self::from_parts(users, config)
    }
}
