use async_trait::async_trait;
use database::BaseRepository;
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbBackend, DbErr,
    EntityTrait, FromQueryResult, PaginatorTrait, QueryFilter, QueryOrder, SqlErr, Statement,
    TransactionTrait,
};
use std::collections::HashMap;

use crate::{
    entity::{category, product, product_tag, review, tag},
    error::{CatalogError, CatalogResult},
    models::{
        Category, CategoryFields, Product, ProductFields, Review, ReviewFields, Tag, TagFields,
    },
    repository::CatalogRepository,
};

const COUNT_CATEGORIZED_PRODUCTS: &str = r#"
    SELECT COUNT(p.id) AS count_products
    FROM categories c
    INNER JOIN products p ON p.category_id = c.id
"#;

const AVERAGE_STARS: &str = "SELECT AVG(stars)::float8 AS avg FROM reviews";

#[derive(Debug, FromQueryResult)]
struct ProductCountRow {
    count_products: i64,
}

#[derive(Debug, FromQueryResult)]
struct AverageStarsRow {
    avg: Option<f64>,
}

pub struct PgCatalogRepository {
    categories: BaseRepository<category::Entity>,
    tags: BaseRepository<tag::Entity>,
    products: BaseRepository<product::Entity>,
    reviews: BaseRepository<review::Entity>,
}

impl PgCatalogRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            categories: BaseRepository::new(db.clone()),
            tags: BaseRepository::new(db.clone()),
            products: BaseRepository::new(db.clone()),
            reviews: BaseRepository::new(db),
        }
    }

    fn db(&self) -> &DatabaseConnection {
        self.products.db()
    }
}

/// Tag ids per product, each list ascending.
async fn tag_ids_by_product<C: ConnectionTrait>(
    conn: &C,
    product_ids: &[i32],
) -> Result<HashMap<i32, Vec<i32>>, DbErr> {
    let mut by_product: HashMap<i32, Vec<i32>> = HashMap::new();
    if product_ids.is_empty() {
        return Ok(by_product);
    }

    let links = product_tag::Entity::find()
        .filter(product_tag::Column::ProductId.is_in(product_ids.iter().copied()))
        .order_by_asc(product_tag::Column::TagId)
        .all(conn)
        .await?;

    for link in links {
        by_product
            .entry(link.product_id)
            .or_default()
            .push(link.tag_id);
    }
    Ok(by_product)
}

async fn link_tags<C: ConnectionTrait>(
    conn: &C,
    product_id: i32,
    tags: &[i32],
) -> Result<(), DbErr> {
    if tags.is_empty() {
        return Ok(());
    }

    let links = tags.iter().map(|&tag_id| product_tag::ActiveModel {
        product_id: Set(product_id),
        tag_id: Set(tag_id),
    });
    product_tag::Entity::insert_many(links)
        .exec_without_returning(conn)
        .await?;
    Ok(())
}

async fn unlink_tags<C: ConnectionTrait>(
    conn: &C,
    column: product_tag::Column,
    id: i32,
) -> Result<u64, DbErr> {
    let result = product_tag::Entity::delete_many()
        .filter(column.eq(id))
        .exec(conn)
        .await?;
    Ok(result.rows_affected)
}

fn is_foreign_key_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::ForeignKeyConstraintViolation(_)))
}

#[async_trait]
impl CatalogRepository for PgCatalogRepository {
    async fn list_categories(&self) -> CatalogResult<Vec<Category>> {
        let models = self.categories.find_all().await?;
        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn count_categorized_products(&self) -> CatalogResult<u64> {
        let stmt =
            Statement::from_string(DbBackend::Postgres, COUNT_CATEGORIZED_PRODUCTS.to_owned());
        let row = ProductCountRow::find_by_statement(stmt).one(self.db()).await?;
        Ok(row.map_or(0, |r| r.count_products as u64))
    }

    async fn count_products_in_category(&self, id: i32) -> CatalogResult<u64> {
        let count = product::Entity::find()
            .filter(product::Column::CategoryId.eq(id))
            .count(self.db())
            .await?;
        Ok(count)
    }

    async fn get_category(&self, id: i32) -> CatalogResult<Option<Category>> {
        let model = self.categories.find_by_id(id).await?;
        Ok(model.map(Into::into))
    }

    async fn create_category(&self, fields: CategoryFields) -> CatalogResult<Category> {
        let model = self
            .categories
            .insert(category::ActiveModel {
                name: Set(fields.name),
                ..Default::default()
            })
            .await?;

        tracing::info!(category_id = model.id, "Created category");
        Ok(model.into())
    }

    async fn update_category(
        &self,
        id: i32,
        fields: CategoryFields,
    ) -> CatalogResult<Option<Category>> {
        if !self.categories.exists(id).await? {
            return Ok(None);
        }

        let model = self
            .categories
            .update(category::ActiveModel {
                id: Set(id),
                name: Set(fields.name),
            })
            .await?;

        tracing::info!(category_id = id, "Updated category");
        Ok(Some(model.into()))
    }

    async fn delete_category(&self, id: i32) -> CatalogResult<bool> {
        match self.categories.delete_by_id(id).await {
            Ok(rows) => {
                if rows > 0 {
                    tracing::info!(category_id = id, "Deleted category");
                }
                Ok(rows > 0)
            }
            Err(e) if is_foreign_key_violation(&e) => {
                let products = self.count_products_in_category(id).await?;
                Err(CatalogError::CategoryInUse { id, products })
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn count_tags(&self) -> CatalogResult<u64> {
        Ok(self.tags.count().await?)
    }

    async fn list_tags(&self, offset: u64, limit: u64) -> CatalogResult<Vec<Tag>> {
        let models = self.tags.find_page(offset, limit).await?;
        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn get_tag(&self, id: i32) -> CatalogResult<Option<Tag>> {
        let model = self.tags.find_by_id(id).await?;
        Ok(model.map(Into::into))
    }

    async fn missing_tags(&self, ids: &[i32]) -> CatalogResult<Vec<i32>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let found: Vec<i32> = tag::Entity::find()
            .filter(tag::Column::Id.is_in(ids.iter().copied()))
            .all(self.db())
            .await?
            .into_iter()
            .map(|t| t.id)
            .collect();

        let mut missing: Vec<i32> = ids
            .iter()
            .copied()
            .filter(|id| !found.contains(id))
            .collect();
        missing.sort_unstable();
        missing.dedup();
        Ok(missing)
    }

    async fn create_tag(&self, fields: TagFields) -> CatalogResult<Tag> {
        let model = self
            .tags
            .insert(tag::ActiveModel {
                name: Set(fields.name),
                ..Default::default()
            })
            .await?;

        tracing::info!(tag_id = model.id, "Created tag");
        Ok(model.into())
    }

    async fn update_tag(&self, id: i32, fields: TagFields) -> CatalogResult<Option<Tag>> {
        if !self.tags.exists(id).await? {
            return Ok(None);
        }

        let model = self
            .tags
            .update(tag::ActiveModel {
                id: Set(id),
                name: Set(fields.name),
            })
            .await?;

        tracing::info!(tag_id = id, "Updated tag");
        Ok(Some(model.into()))
    }

    async fn delete_tag(&self, id: i32) -> CatalogResult<bool> {
        let txn = self.db().begin().await?;

        let unlinked = unlink_tags(&txn, product_tag::Column::TagId, id).await?;
        let result = tag::Entity::delete_by_id(id).exec(&txn).await?;
        txn.commit().await?;

        let deleted = result.rows_affected > 0;
        if deleted {
            tracing::info!(tag_id = id, unlinked_products = unlinked, "Deleted tag");
        }
        Ok(deleted)
    }

    async fn count_products(&self) -> CatalogResult<u64> {
        Ok(self.products.count().await?)
    }

    async fn list_products(&self, offset: u64, limit: u64) -> CatalogResult<Vec<Product>> {
        let models = self.products.find_page(offset, limit).await?;
        let ids: Vec<i32> = models.iter().map(|m| m.id).collect();
        let mut tags = tag_ids_by_product(self.db(), &ids).await?;

        Ok(models
            .into_iter()
            .map(|m| {
                let product_tags = tags.remove(&m.id).unwrap_or_default();
                m.into_product(product_tags)
            })
            .collect())
    }

    async fn get_product(&self, id: i32) -> CatalogResult<Option<Product>> {
        let Some(model) = self.products.find_by_id(id).await? else {
            return Ok(None);
        };

        let tags = tag_ids_by_product(self.db(), &[id])
            .await?
            .remove(&id)
            .unwrap_or_default();
        Ok(Some(model.into_product(tags)))
    }

    async fn create_product(&self, fields: ProductFields) -> CatalogResult<Product> {
        let txn = self.db().begin().await?;

        let model = product::ActiveModel {
            title: Set(fields.title),
            description: Set(fields.description),
            price: Set(fields.price),
            category_id: Set(fields.category_id),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        link_tags(&txn, model.id, &fields.tags).await?;

        txn.commit().await?;

        tracing::info!(product_id = model.id, tags = ?fields.tags, "Created product");
        Ok(model.into_product(fields.tags))
    }

    async fn update_product(
        &self,
        id: i32,
        fields: ProductFields,
    ) -> CatalogResult<Option<Product>> {
        let txn = self.db().begin().await?;

        if product::Entity::find_by_id(id).one(&txn).await?.is_none() {
            return Ok(None);
        }

        let model = product::ActiveModel {
            id: Set(id),
            title: Set(fields.title),
            description: Set(fields.description),
            price: Set(fields.price),
            category_id: Set(fields.category_id),
        }
        .update(&txn)
        .await?;
        unlink_tags(&txn, product_tag::Column::ProductId, id).await?;
        link_tags(&txn, id, &fields.tags).await?;

        txn.commit().await?;

        tracing::info!(product_id = id, "Updated product");
        Ok(Some(model.into_product(fields.tags)))
    }

    async fn delete_product(&self, id: i32) -> CatalogResult<bool> {
        let txn = self.db().begin().await?;

        review::Entity::delete_many()
            .filter(review::Column::ProductId.eq(id))
            .exec(&txn)
            .await?;
        unlink_tags(&txn, product_tag::Column::ProductId, id).await?;
        let result = product::Entity::delete_by_id(id).exec(&txn).await?;

        txn.commit().await?;

        let deleted = result.rows_affected > 0;
        if deleted {
            tracing::info!(product_id = id, "Deleted product");
        }
        Ok(deleted)
    }

    async fn count_reviews(&self) -> CatalogResult<u64> {
        Ok(self.reviews.count().await?)
    }

    async fn list_reviews(&self, offset: u64, limit: u64) -> CatalogResult<Vec<Review>> {
        let models = self.reviews.find_page(offset, limit).await?;
        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn list_all_reviews(&self) -> CatalogResult<Vec<Review>> {
        let models = self.reviews.find_all().await?;
        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn average_stars(&self) -> CatalogResult<Option<f64>> {
        let stmt = Statement::from_string(DbBackend::Postgres, AVERAGE_STARS.to_owned());
        let row = AverageStarsRow::find_by_statement(stmt).one(self.db()).await?;
        Ok(row.and_then(|r| r.avg))
    }

    async fn get_review(&self, id: i32) -> CatalogResult<Option<Review>> {
        let model = self.reviews.find_by_id(id).await?;
        Ok(model.map(Into::into))
    }

    async fn create_review(&self, fields: ReviewFields) -> CatalogResult<Review> {
        let model = self
            .reviews
            .insert(review::ActiveModel {
                text: Set(fields.text),
                stars: Set(fields.stars),
                product_id: Set(fields.product_id),
                ..Default::default()
            })
            .await?;

        tracing::info!(review_id = model.id, product_id = model.product_id, "Created review");
        Ok(model.into())
    }

    async fn update_review(&self, id: i32, fields: ReviewFields) -> CatalogResult<Option<Review>> {
        if !self.reviews.exists(id).await? {
            return Ok(None);
        }

        let model = self
            .reviews
            .update(review::ActiveModel {
                id: Set(id),
                text: Set(fields.text),
                stars: Set(fields.stars),
                product_id: Set(fields.product_id),
            })
            .await?;

        tracing::info!(review_id = id, "Updated review");
        Ok(Some(model.into()))
    }

    async fn delete_review(&self, id: i32) -> CatalogResult<bool> {
        let rows = self.reviews.delete_by_id(id).await?;
        if rows > 0 {
            tracing::info!(review_id = id, "Deleted review");
        }
        Ok(rows > 0)
    }
}
