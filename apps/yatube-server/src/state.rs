//! Application state - shared across all handlers.

use std::sync::Arc;

use yatube_core::ports::{
    GroupRepository, PasswordService, PostRepository, TokenService, UserRepository,
};
use yatube_infra::database::{DatabaseConfig, DatabaseConnections};
use yatube_infra::{
    Argon2PasswordService, InMemoryGroupRepository, InMemoryPostRepository,
    InMemoryUserRepository, JwtConfig, JwtTokenService,
};

#[cfg(feature = "postgres")]
use yatube_infra::{PostgresGroupRepository, PostgresPostRepository, PostgresUserRepository};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub groups: Arc<dyn GroupRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub tokens: Arc<dyn TokenService>,
    pub passwords: Arc<dyn PasswordService>,
    pub db: Option<Arc<DatabaseConnections>>,
}

impl AppState {
    /// Build the application state with appropriate implementations.
    pub async fn new(db_config: Option<&DatabaseConfig>, jwt: JwtConfig) -> Self {
        let tokens: Arc<dyn TokenService> = Arc::new(JwtTokenService::new(jwt));
        let passwords: Arc<dyn PasswordService> = Arc::new(Argon2PasswordService::new());

        #[cfg(feature = "postgres")]
        let state = match db_config {
            Some(config) => match DatabaseConnections::init(config).await {
                Ok(connections) => {
                    let conn = Arc::new(connections);
                    Self {
                        users: Arc::new(PostgresUserRepository::new(conn.main.clone())),
                        groups: Arc::new(PostgresGroupRepository::new(conn.main.clone())),
                        posts: Arc::new(PostgresPostRepository::new(conn.main.clone())),
                        tokens,
                        passwords,
                        db: Some(conn),
                    }
                }
                Err(e) => {
                    tracing::error!(
                        "Failed to connect to database: {}. Using in-memory fallback.",
                        e
                    );
                    Self::in_memory(tokens, passwords)
                }
            },
            None => {
                tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
                Self::in_memory(tokens, passwords)
            }
        };

        #[cfg(not(feature = "postgres"))]
        let state = {
            let _ = db_config;
            tracing::info!("Running without postgres feature - using in-memory repositories");
            Self::in_memory(tokens, passwords)
        };

        tracing::info!(persistent = state.db.is_some(), "Application state initialized");

        state
    }

    /// State backed by the in-memory repositories.
    pub fn in_memory(tokens: Arc<dyn TokenService>, passwords: Arc<dyn PasswordService>) -> Self {
        Self {
            users: Arc::new(InMemoryUserRepository::new()),
            groups: Arc::new(InMemoryGroupRepository::new()),
            posts: Arc::new(InMemoryPostRepository::new()),
            tokens,
            passwords,
            db: None,
        }
    }
}
