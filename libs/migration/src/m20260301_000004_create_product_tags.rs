use sea_orm_migration::{prelude::*, schema::*};

use crate::m20260301_000002_create_tags::Tags;
use crate::m20260301_000003_create_products::Products;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ProductTags::Table)
                    .if_not_exists()
                    .col(integer(ProductTags::ProductId))
                    .col(integer(ProductTags::TagId))
                    .primary_key(
                        Index::create()
                            .name("pk_product_tags")
                            .col(ProductTags::ProductId)
                            .col(ProductTags::TagId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_product_tags_product_id")
                            .from(ProductTags::Table, ProductTags::ProductId)
                            .to(Products::Table, Products::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_product_tags_tag_id")
                            .from(ProductTags::Table, ProductTags::TagId)
                            .to(Tags::Table, Tags::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // product_id is covered by the primary key
        manager
            .create_index(
                Index::create()
                    .name("idx_product_tags_tag_id")
                    .table(ProductTags::Table)
                    .col(ProductTags::TagId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ProductTags::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum ProductTags {
    Table,
    ProductId,
    TagId,
}
