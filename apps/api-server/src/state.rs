//! Application state - shared across all handlers.

use std::sync::Arc;

use inkwell_core::ports::{
    BlogRepository, MediaStore, PasswordService, TokenService, UserRepository,
};
use inkwell_core::services::{AccountService, BlogService};
use inkwell_infra::{
    Argon2PasswordService, InMemoryBlogRepository, InMemoryMediaStore, InMemoryUserRepository,
};

#[cfg(feature = "cloudinary")]
use inkwell_infra::{CloudinaryConfig, CloudinaryMediaStore};
#[cfg(feature = "postgres")]
use inkwell_infra::{PostgresBlogRepository, PostgresUserRepository};

use crate::config::AppConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub blogs: Arc<BlogService>,
    pub accounts: Arc<AccountService>,
    /// Which store backs the repositories, reported by the health check.
    pub storage: &'static str,
}

type Stores = (Arc<dyn UserRepository>, Arc<dyn BlogRepository>, &'static str);

impl AppState {
    /// Wire services over the given adapters.
    pub fn assemble(
        users: Arc<dyn UserRepository>,
        blogs: Arc<dyn BlogRepository>,
        media: Arc<dyn MediaStore>,
        tokens: Arc<dyn TokenService>,
        storage: &'static str,
    ) -> Self {
        let passwords: Arc<dyn PasswordService> = Arc::new(Argon2PasswordService::new());

        Self {
            blogs: Arc::new(BlogService::new(blogs.clone(), users.clone(), media.clone())),
            accounts: Arc::new(AccountService::new(users, blogs, passwords, tokens, media)),
            storage,
        }
    }

    /// Build the application state with appropriate implementations.
    pub async fn new(config: &AppConfig, tokens: Arc<dyn TokenService>) -> Self {
        let (users, blogs, storage) = Self::stores(config).await;
        let media = Self::media(config);

        tracing::info!(storage, "Application state initialized");
        Self::assemble(users, blogs, media, tokens, storage)
    }

    #[cfg(feature = "postgres")]
    async fn stores(config: &AppConfig) -> Stores {
        let Some(db_config) = &config.database else {
            tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
            return Self::memory_stores();
        };

        match inkwell_infra::connect(db_config).await {
            Ok(conn) => {
                let users: Arc<dyn UserRepository> =
                    Arc::new(PostgresUserRepository::new(conn.clone()));
                let blogs: Arc<dyn BlogRepository> = Arc::new(PostgresBlogRepository::new(conn));
                (users, blogs, "postgres")
            }
            Err(e) => {
                tracing::error!(
                    "Failed to connect to database: {}. Using in-memory fallback.",
                    e
                );
                Self::memory_stores()
            }
        }
    }

    #[cfg(not(feature = "postgres"))]
    async fn stores(_config: &AppConfig) -> Stores {
        tracing::info!("Running without postgres feature - using in-memory repositories");
        Self::memory_stores()
    }

    fn memory_stores() -> Stores {
        let users: Arc<dyn UserRepository> = Arc::new(InMemoryUserRepository::new());
        let blogs: Arc<dyn BlogRepository> = Arc::new(InMemoryBlogRepository::new());
        (users, blogs, "memory")
    }

    fn media(config: &AppConfig) -> Arc<dyn MediaStore> {
        if let Some(store) = Self::hosted_media() {
            return store;
        }

        tracing::warn!(
            base_url = %config.media_base_url,
            "Cloudinary not configured. Images are kept in memory."
        );
        Arc::new(InMemoryMediaStore::new(config.media_base_url.clone()))
    }

    #[cfg(feature = "cloudinary")]
    fn hosted_media() -> Option<Arc<dyn MediaStore>> {
        let cloudinary = CloudinaryConfig::from_env()?;
        tracing::info!(cloud = %cloudinary.cloud_name, "Using Cloudinary media store");
        Some(Arc::new(CloudinaryMediaStore::new(cloudinary)))
    }

    #[cfg(not(feature = "cloudinary"))]
    fn hosted_media() -> Option<Arc<dyn MediaStore>> {
        None
    }
}
