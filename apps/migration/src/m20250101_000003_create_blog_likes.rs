use sea_orm_migration::prelude::*;

use super::m20250101_000002_create_blogs::Blogs;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // user_id carries no foreign key: likes survive account deletion.
        manager
            .create_table(
                Table::create()
                    .table(BlogLikes::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(BlogLikes::BlogId).uuid().not_null())
                    .col(ColumnDef::new(BlogLikes::UserId).uuid().not_null())
                    .col(
                        ColumnDef::new(BlogLikes::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .primary_key(
                        Index::create()
                            .col(BlogLikes::BlogId)
                            .col(BlogLikes::UserId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_blog_likes_blog")
                            .from(BlogLikes::Table, BlogLikes::BlogId)
                            .to(Blogs::Table, Blogs::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(BlogLikes::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum BlogLikes {
    Table,
    BlogId,
    UserId,
    CreatedAt,
}
