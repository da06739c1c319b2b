//! Inkwell schema. Run with `cargo run -p migration -- up`.

pub use sea_orm_migration::prelude::*;

mod m20250101_000001_create_users;
mod m20250101_000002_create_blogs;
mod m20250101_000003_create_blog_likes;
mod m20250101_000004_create_comments;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250101_000001_create_users::Migration),
            Box::new(m20250101_000002_create_blogs::Migration),
            Box::new(m20250101_000003_create_blog_likes::Migration),
            Box::new(m20250101_000004_create_comments::Migration),
        ]
    }
}
