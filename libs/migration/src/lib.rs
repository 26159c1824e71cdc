pub use sea_orm_migration::prelude::*;

mod m20260301_000001_create_categories;
mod m20260301_000002_create_tags;
mod m20260301_000003_create_products;
mod m20260301_000004_create_product_tags;
mod m20260301_000005_create_reviews;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260301_000001_create_categories::Migration),
            Box::new(m20260301_000002_create_tags::Migration),
            Box::new(m20260301_000003_create_products::Migration),
            Box::new(m20260301_000004_create_product_tags::Migration),
            Box::new(m20260301_000005_create_reviews::Migration),
        ]
    }
}
