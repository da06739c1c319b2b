//! SeaORM entities.

pub mod blog;
pub mod blog_like;
pub mod comment;
pub mod user;
