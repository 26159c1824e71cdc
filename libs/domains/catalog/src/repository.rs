use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::{CatalogError, CatalogResult};
use crate::models::{
    Category, CategoryFields, Product, ProductFields, Review, ReviewFields, Tag, TagFields,
};

/// Persistence for the catalog.
///
/// Lookups return `Ok(None)` and deletes return `Ok(false)` on a missing id;
/// turning that into a 404 is the service's job. Listings are ordered by id.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    // Categories

    async fn list_categories(&self) -> CatalogResult<Vec<Category>>;

    /// Products joined to any category, counted once over the whole table
    async fn count_categorized_products(&self) -> CatalogResult<u64>;

    async fn count_products_in_category(&self, id: i32) -> CatalogResult<u64>;

    async fn get_category(&self, id: i32) -> CatalogResult<Option<Category>>;

    async fn create_category(&self, fields: CategoryFields) -> CatalogResult<Category>;

    async fn update_category(
        &self,
        id: i32,
        fields: CategoryFields,
    ) -> CatalogResult<Option<Category>>;

    /// Fails with [`CatalogError::CategoryInUse`] while products reference it
    async fn delete_category(&self, id: i32) -> CatalogResult<bool>;

    // Tags

    async fn count_tags(&self) -> CatalogResult<u64>;

    async fn list_tags(&self, offset: u64, limit: u64) -> CatalogResult<Vec<Tag>>;

    async fn get_tag(&self, id: i32) -> CatalogResult<Option<Tag>>;

    /// The subset of `ids` with no matching tag, ascending
    async fn missing_tags(&self, ids: &[i32]) -> CatalogResult<Vec<i32>>;

    async fn create_tag(&self, fields: TagFields) -> CatalogResult<Tag>;

    async fn update_tag(&self, id: i32, fields: TagFields) -> CatalogResult<Option<Tag>>;

    /// Also unlinks the tag from every product
    async fn delete_tag(&self, id: i32) -> CatalogResult<bool>;

    // Products

    async fn count_products(&self) -> CatalogResult<u64>;

    async fn list_products(&self, offset: u64, limit: u64) -> CatalogResult<Vec<Product>>;

    async fn get_product(&self, id: i32) -> CatalogResult<Option<Product>>;

    async fn create_product(&self, fields: ProductFields) -> CatalogResult<Product>;

    /// Replaces every column and the whole tag set
    async fn update_product(&self, id: i32, fields: ProductFields)
    -> CatalogResult<Option<Product>>;

    /// Also removes the product's reviews and tag links
    async fn delete_product(&self, id: i32) -> CatalogResult<bool>;

    // Reviews

    async fn count_reviews(&self) -> CatalogResult<u64>;

    async fn list_reviews(&self, offset: u64, limit: u64) -> CatalogResult<Vec<Review>>;

    async fn list_all_reviews(&self) -> CatalogResult<Vec<Review>>;

    /// Mean of `stars`, `None` without reviews
    async fn average_stars(&self) -> CatalogResult<Option<f64>>;

    async fn get_review(&self, id: i32) -> CatalogResult<Option<Review>>;

    async fn create_review(&self, fields: ReviewFields) -> CatalogResult<Review>;

    async fn update_review(&self, id: i32, fields: ReviewFields) -> CatalogResult<Option<Review>>;

    async fn delete_review(&self, id: i32) -> CatalogResult<bool>;
}

#[derive(Debug, Default)]
struct Store {
    categories: BTreeMap<i32, Category>,
    tags: BTreeMap<i32, Tag>,
    products: BTreeMap<i32, Product>,
    reviews: BTreeMap<i32, Review>,
    sequences: Sequences,
}

/// Serial counters; ids are never reused, like a database sequence.
#[derive(Debug, Default)]
struct Sequences {
    category: i32,
    tag: i32,
    product: i32,
    review: i32,
}

fn next(counter: &mut i32) -> i32 {
    *counter += 1;
    *counter
}

impl Store {
    /// Foreign keys the in-memory tables enforce on product writes.
    fn check_product_references(&self, fields: &ProductFields) -> CatalogResult<()> {
        if !self.categories.contains_key(&fields.category_id) {
            return Err(CatalogError::missing_reference(
                "category_id",
                &[fields.category_id],
            ));
        }

        let missing: Vec<i32> = fields
            .tags
            .iter()
            .copied()
            .filter(|id| !self.tags.contains_key(id))
            .collect();
        if !missing.is_empty() {
            return Err(CatalogError::missing_reference("tags", &missing));
        }
        Ok(())
    }

    fn check_review_product(&self, product_id: i32) -> CatalogResult<()> {
        if !self.products.contains_key(&product_id) {
            return Err(CatalogError::missing_reference("product_id", &[product_id]));
        }
        Ok(())
    }
}

fn window<T: Clone>(rows: &BTreeMap<i32, T>, offset: u64, limit: u64) -> Vec<T> {
    rows.values()
        .skip(offset as usize)
        .take(limit as usize)
        .cloned()
        .collect()
}

/// In-memory implementation of CatalogRepository (for development/testing)
///
/// One lock guards every table so cascades happen atomically.
#[derive(Debug, Default, Clone)]
pub struct InMemoryCatalogRepository {
    store: Arc<RwLock<Store>>,
}

impl InMemoryCatalogRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CatalogRepository for InMemoryCatalogRepository {
    async fn list_categories(&self) -> CatalogResult<Vec<Category>> {
        let store = self.store.read().await;
        Ok(store.categories.values().cloned().collect())
    }

    async fn count_categorized_products(&self) -> CatalogResult<u64> {
        let store = self.store.read().await;
        let count = store
            .products
            .values()
            .filter(|p| store.categories.contains_key(&p.category_id))
            .count();
        Ok(count as u64)
    }

    async fn count_products_in_category(&self, id: i32) -> CatalogResult<u64> {
        let store = self.store.read().await;
        let count = store
            .products
            .values()
            .filter(|p| p.category_id == id)
            .count();
        Ok(count as u64)
    }

    async fn get_category(&self, id: i32) -> CatalogResult<Option<Category>> {
        let store = self.store.read().await;
        Ok(store.categories.get(&id).cloned())
    }

    async fn create_category(&self, fields: CategoryFields) -> CatalogResult<Category> {
        let mut store = self.store.write().await;

        let category = Category {
            id: next(&mut store.sequences.category),
            name: fields.name,
        };
        store.categories.insert(category.id, category.clone());

        tracing::info!(category_id = category.id, "Created category");
        Ok(category)
    }

    async fn update_category(
        &self,
        id: i32,
        fields: CategoryFields,
    ) -> CatalogResult<Option<Category>> {
        let mut store = self.store.write().await;

        let Some(category) = store.categories.get_mut(&id) else {
            return Ok(None);
        };
        category.name = fields.name;

        tracing::info!(category_id = id, "Updated category");
        Ok(Some(category.clone()))
    }

    async fn delete_category(&self, id: i32) -> CatalogResult<bool> {
        let mut store = self.store.write().await;

        let products = store
            .products
            .values()
            .filter(|p| p.category_id == id)
            .count() as u64;
        if products > 0 {
            return Err(CatalogError::CategoryInUse { id, products });
        }

        if store.categories.remove(&id).is_some() {
            tracing::info!(category_id = id, "Deleted category");
            Ok(true)
        } else {
            Ok(false)
        }
    }

    async fn count_tags(&self) -> CatalogResult<u64> {
        Ok(self.store.read().await.tags.len() as u64)
    }

    async fn list_tags(&self, offset: u64, limit: u64) -> CatalogResult<Vec<Tag>> {
        let store = self.store.read().await;
        Ok(window(&store.tags, offset, limit))
    }

    async fn get_tag(&self, id: i32) -> CatalogResult<Option<Tag>> {
        let store = self.store.read().await;
        Ok(store.tags.get(&id).cloned())
    }

    async fn missing_tags(&self, ids: &[i32]) -> CatalogResult<Vec<i32>> {
        let store = self.store.read().await;
        let mut missing: Vec<i32> = ids
            .iter()
            .copied()
            .filter(|id| !store.tags.contains_key(id))
            .collect();
        missing.sort_unstable();
        missing.dedup();
        Ok(missing)
    }

    async fn create_tag(&self, fields: TagFields) -> CatalogResult<Tag> {
        let mut store = self.store.write().await;

        let tag = Tag {
            id: next(&mut store.sequences.tag),
            name: fields.name,
        };
        store.tags.insert(tag.id, tag.clone());

        tracing::info!(tag_id = tag.id, "Created tag");
        Ok(tag)
    }

    async fn update_tag(&self, id: i32, fields: TagFields) -> CatalogResult<Option<Tag>> {
        let mut store = self.store.write().await;

        let Some(tag) = store.tags.get_mut(&id) else {
            return Ok(None);
        };
        tag.name = fields.name;

        tracing::info!(tag_id = id, "Updated tag");
        Ok(Some(tag.clone()))
    }

    async fn delete_tag(&self, id: i32) -> CatalogResult<bool> {
        let mut store = self.store.write().await;

        if store.tags.remove(&id).is_none() {
            return Ok(false);
        }
        for product in store.products.values_mut() {
            product.tags.retain(|tag_id| *tag_id != id);
        }

        tracing::info!(tag_id = id, "Deleted tag");
        Ok(true)
    }

    async fn count_products(&self) -> CatalogResult<u64> {
        Ok(self.store.read().await.products.len() as u64)
    }

    async fn list_products(&self, offset: u64, limit: u64) -> CatalogResult<Vec<Product>> {
        let store = self.store.read().await;
        Ok(window(&store.products, offset, limit))
    }

    async fn get_product(&self, id: i32) -> CatalogResult<Option<Product>> {
        let store = self.store.read().await;
        Ok(store.products.get(&id).cloned())
    }

    async fn create_product(&self, fields: ProductFields) -> CatalogResult<Product> {
        let mut store = self.store.write().await;
        store.check_product_references(&fields)?;

        let product = Product {
            id: next(&mut store.sequences.product),
            title: fields.title,
            description: fields.description,
            price: fields.price,
            category_id: fields.category_id,
            tags: fields.tags,
        };
        store.products.insert(product.id, product.clone());

        tracing::info!(product_id = product.id, tags = ?product.tags, "Created product");
        Ok(product)
    }

    async fn update_product(
        &self,
        id: i32,
        fields: ProductFields,
    ) -> CatalogResult<Option<Product>> {
        let mut store = self.store.write().await;

        if !store.products.contains_key(&id) {
            return Ok(None);
        }
        store.check_product_references(&fields)?;

        let Some(product) = store.products.get_mut(&id) else {
            return Ok(None);
        };
        product.title = fields.title;
        product.description = fields.description;
        product.price = fields.price;
        product.category_id = fields.category_id;
        product.tags = fields.tags;

        tracing::info!(product_id = id, "Updated product");
        Ok(Some(product.clone()))
    }

    async fn delete_product(&self, id: i32) -> CatalogResult<bool> {
        let mut store = self.store.write().await;

        if store.products.remove(&id).is_none() {
            return Ok(false);
        }
        store.reviews.retain(|_, review| review.product_id != id);

        tracing::info!(product_id = id, "Deleted product");
        Ok(true)
    }

    async fn count_reviews(&self) -> CatalogResult<u64> {
        Ok(self.store.read().await.reviews.len() as u64)
    }

    async fn list_reviews(&self, offset: u64, limit: u64) -> CatalogResult<Vec<Review>> {
        let store = self.store.read().await;
        Ok(window(&store.reviews, offset, limit))
    }

    async fn list_all_reviews(&self) -> CatalogResult<Vec<Review>> {
        let store = self.store.read().await;
        Ok(store.reviews.values().cloned().collect())
    }

    async fn average_stars(&self) -> CatalogResult<Option<f64>> {
        let store = self.store.read().await;
        if store.reviews.is_empty() {
            return Ok(None);
        }

        let total: i64 = store.reviews.values().map(|r| i64::from(r.stars)).sum();
        Ok(Some(total as f64 / store.reviews.len() as f64))
    }

    async fn get_review(&self, id: i32) -> CatalogResult<Option<Review>> {
        let store = self.store.read().await;
        Ok(store.reviews.get(&id).cloned())
    }

    async fn create_review(&self, fields: ReviewFields) -> CatalogResult<Review> {
        let mut store = self.store.write().await;
        store.check_review_product(fields.product_id)?;

        let review = Review {
            id: next(&mut store.sequences.review),
            text: fields.text,
            stars: fields.stars,
            product_id: fields.product_id,
        };
        store.reviews.insert(review.id, review.clone());

        tracing::info!(review_id = review.id, product_id = review.product_id, "Created review");
        Ok(review)
    }

    async fn update_review(&self, id: i32, fields: ReviewFields) -> CatalogResult<Option<Review>> {
        let mut store = self.store.write().await;

        if !store.reviews.contains_key(&id) {
            return Ok(None);
        }
        store.check_review_product(fields.product_id)?;

        let Some(review) = store.reviews.get_mut(&id) else {
            return Ok(None);
        };
        review.text = fields.text;
        review.stars = fields.stars;
        review.product_id = fields.product_id;

        tracing::info!(review_id = id, "Updated review");
        Ok(Some(review.clone()))
    }

    async fn delete_review(&self, id: i32) -> CatalogResult<bool> {
        let mut store = self.store.write().await;

        if store.reviews.remove(&id).is_some() {
            tracing::info!(review_id = id, "Deleted review");
            Ok(true)
        } else {
            Ok(false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    async fn seeded() -> (InMemoryCatalogRepository, Category, Tag, Product) {
        let repo = InMemoryCatalogRepository::new();
        let category = repo
            .create_category(CategoryFields {
                name: "Beverages".into(),
            })
            .await
            .unwrap();
        let tag = repo
            .create_tag(TagFields {
                name: "organic".into(),
            })
            .await
            .unwrap();
        let product = repo
            .create_product(ProductFields {
                title: "Green tea".into(),
                description: String::new(),
                price: dec!(4.50),
                category_id: category.id,
                tags: vec![tag.id],
            })
            .await
            .unwrap();

        (repo, category, tag, product)
    }

    fn review(product_id: i32, stars: i32) -> ReviewFields {
        ReviewFields {
            text: "fine".into(),
            stars,
            product_id,
        }
    }

    #[tokio::test]
    async fn test_ids_are_sequential_and_not_reused() {
        let repo = InMemoryCatalogRepository::new();
        let first = repo.create_tag(TagFields { name: "a".into() }).await.unwrap();
        let second = repo.create_tag(TagFields { name: "b".into() }).await.unwrap();
        assert_eq!((first.id, second.id), (1, 2));

        assert!(repo.delete_tag(second.id).await.unwrap());
        let third = repo.create_tag(TagFields { name: "c".into() }).await.unwrap();
        assert_eq!(third.id, 3);
    }

    #[tokio::test]
    async fn test_list_window_is_ordered_by_id() {
        let repo = InMemoryCatalogRepository::new();
        for i in 0..5 {
            repo.create_tag(TagFields {
                name: format!("tag-{i}"),
            })
            .await
            .unwrap();
        }

        let page: Vec<i32> = repo
            .list_tags(2, 2)
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(page, vec![3, 4]);
        assert_eq!(repo.count_tags().await.unwrap(), 5);
    }

    #[tokio::test]
    async fn test_delete_category_in_use_is_refused() {
        let (repo, category, _, product) = seeded().await;

        let err = repo.delete_category(category.id).await.unwrap_err();
        assert!(matches!(err, CatalogError::CategoryInUse { products: 1, .. }));
        assert!(repo.get_category(category.id).await.unwrap().is_some());

        assert!(repo.delete_product(product.id).await.unwrap());
        assert!(repo.delete_category(category.id).await.unwrap());
        assert!(!repo.delete_category(category.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_product_cascades_reviews() {
        let (repo, _, _, product) = seeded().await;
        repo.create_review(review(product.id, 4)).await.unwrap();
        repo.create_review(review(product.id, 2)).await.unwrap();

        assert!(repo.delete_product(product.id).await.unwrap());
        assert_eq!(repo.count_reviews().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_delete_tag_unlinks_products() {
        let (repo, _, tag, product) = seeded().await;

        assert!(repo.delete_tag(tag.id).await.unwrap());

        let product = repo.get_product(product.id).await.unwrap().unwrap();
        assert!(product.tags.is_empty());
    }

    #[tokio::test]
    async fn test_missing_tags() {
        let (repo, _, tag, _) = seeded().await;
        let missing = repo.missing_tags(&[9, tag.id, 7, 9]).await.unwrap();
        assert_eq!(missing, vec![7, 9]);
    }

    #[tokio::test]
    async fn test_average_stars() {
        let (repo, _, _, product) = seeded().await;
        assert_eq!(repo.average_stars().await.unwrap(), None);

        repo.create_review(review(product.id, 4)).await.unwrap();
        repo.create_review(review(product.id, 5)).await.unwrap();
        assert_eq!(repo.average_stars().await.unwrap(), Some(4.5));
    }

    #[tokio::test]
    async fn test_count_categorized_products_is_global() {
        let (repo, category, _, _) = seeded().await;
        let other = repo
            .create_category(CategoryFields {
                name: "Snacks".into(),
            })
            .await
            .unwrap();
        repo.create_product(ProductFields {
            title: "Crackers".into(),
            description: String::new(),
            price: dec!(2.00),
            category_id: other.id,
            tags: vec![],
        })
        .await
        .unwrap();

        assert_eq!(repo.count_categorized_products().await.unwrap(), 2);
        assert_eq!(repo.count_products_in_category(category.id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_update_missing_rows_return_none() {
        let repo = InMemoryCatalogRepository::new();
        assert!(
            repo.update_tag(1, TagFields { name: "x".into() })
                .await
                .unwrap()
                .is_none()
        );
        assert!(repo.update_review(1, review(1, 3)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_product_writes_enforce_references() {
        let (repo, category, tag, product) = seeded().await;

        let mut fields = ProductFields {
            title: "Black tea".into(),
            description: String::new(),
            price: dec!(3.00),
            category_id: 99,
            tags: vec![tag.id],
        };
        let err = repo.create_product(fields.clone()).await.unwrap_err();
        assert!(matches!(
            err,
            CatalogError::InvalidReference(ref e) if e.field_errors().contains_key("category_id")
        ));

        fields.category_id = category.id;
        fields.tags = vec![tag.id, 42];
        let err = repo.update_product(product.id, fields).await.unwrap_err();
        assert!(matches!(
            err,
            CatalogError::InvalidReference(ref e) if e.field_errors()["tags"].len() == 1
        ));

        let unchanged = repo.get_product(product.id).await.unwrap().unwrap();
        assert_eq!(unchanged, product);
        assert_eq!(repo.count_products().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_review_writes_enforce_product() {
        let (repo, _, _, product) = seeded().await;
        let kept = repo.create_review(review(product.id, 4)).await.unwrap();

        let err = repo.create_review(review(product.id + 1, 5)).await.unwrap_err();
        assert!(matches!(
            err,
            CatalogError::InvalidReference(ref e) if e.field_errors().contains_key("product_id")
        ));

        assert!(repo.update_review(kept.id, review(77, 1)).await.is_err());
        assert_eq!(repo.get_review(kept.id).await.unwrap().unwrap().product_id, product.id);
        assert_eq!(repo.count_reviews().await.unwrap(), 1);
    }
}
