//! # Inkwell Infrastructure
//!
//! Concrete implementations of the ports defined in `inkwell-core`:
//! blog/user storage, credential services and image hosting.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `minimal` - No external services, in-memory only
//! - `postgres` - PostgreSQL storage via SeaORM
//! - `auth` - JWT + Argon2 authentication
//! - `cloudinary` - Cloudinary image hosting via reqwest

pub mod database;
pub mod media;

#[cfg(feature = "auth")]
pub mod auth;

// Re-exports - In-Memory
pub use database::{DatabaseConfig, InMemoryBlogRepository, InMemoryUserRepository};
pub use media::InMemoryMediaStore;

#[cfg(feature = "auth")]
pub use auth::{Argon2PasswordService, JwtConfig, JwtTokenService};

// Re-exports - External services
#[cfg(feature = "postgres")]
pub use database::{PostgresBlogRepository, PostgresUserRepository, connect};
#[cfg(feature = "cloudinary")]
pub use media::{CloudinaryConfig, CloudinaryMediaStore};
