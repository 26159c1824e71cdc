use std::sync::Arc;

use core_proc_macros::ApiResource;

use crate::entity::{category, product, review, tag};
use crate::error::{CatalogError, CatalogResult};
use crate::models::{
    AverageStars, Category, CategoryFields, CategoryListing, Product, ProductCount,
    ProductFields, Review, ReviewFields, ReviewReport, Tag, TagFields,
};
use crate::pagination::{PageNumber, PageWindow, Paginated};
use crate::repository::CatalogRepository;

/// Service layer for catalog business logic
///
/// Payloads arrive already validated; the service checks that referenced
/// rows exist, enforces the delete policy and resolves pages.
#[derive(Clone)]
pub struct CatalogService<R: CatalogRepository> {
    repository: Arc<R>,
    page_size: u64,
}

impl<R: CatalogRepository> CatalogService<R> {
    pub fn new(repository: R, page_size: u64) -> Self {
        Self {
            repository: Arc::new(repository),
            page_size: page_size.max(1),
        }
    }

    // ------------------------------------------------------------------
    // Products
    // ------------------------------------------------------------------

    pub async fn list_products(&self, page: PageNumber) -> CatalogResult<Paginated<Product>> {
        let count = self.repository.count_products().await?;
        let window = PageWindow::resolve(page, count, self.page_size)?;
        let items = self
            .repository
            .list_products(window.offset, window.limit)
            .await?;

        Ok(Paginated {
            items,
            count,
            window,
        })
    }

    pub async fn get_product(&self, id: i32) -> CatalogResult<Product> {
        self.repository
            .get_product(id)
            .await?
            .ok_or(CatalogError::not_found(product::Model::RESOURCE, id))
    }

    pub async fn create_product(&self, fields: ProductFields) -> CatalogResult<Product> {
        self.check_product_references(&fields).await?;
        self.repository.create_product(fields).await
    }

    /// Full replacement, tag set included. A missing product wins over bad references.
    pub async fn update_product(&self, id: i32, fields: ProductFields) -> CatalogResult<Product> {
        self.get_product(id).await?;
        self.check_product_references(&fields).await?;

        self.repository
            .update_product(id, fields)
            .await?
            .ok_or(CatalogError::not_found(product::Model::RESOURCE, id))
    }

    pub async fn delete_product(&self, id: i32) -> CatalogResult<()> {
        if !self.repository.delete_product(id).await? {
            return Err(CatalogError::not_found(product::Model::RESOURCE, id));
        }
        Ok(())
    }

    async fn check_product_references(&self, fields: &ProductFields) -> CatalogResult<()> {
        if self
            .repository
            .get_category(fields.category_id)
            .await?
            .is_none()
        {
            return Err(CatalogError::missing_reference(
                "category_id",
                &[fields.category_id],
            ));
        }

        let missing = self.repository.missing_tags(&fields.tags).await?;
        if !missing.is_empty() {
            return Err(CatalogError::missing_reference("tags", &missing));
        }

        Ok(())
    }

    // ------------------------------------------------------------------
    // Reviews
    // ------------------------------------------------------------------

    pub async fn list_reviews(&self, page: PageNumber) -> CatalogResult<Paginated<Review>> {
        let count = self.repository.count_reviews().await?;
        let window = PageWindow::resolve(page, count, self.page_size)?;
        let items = self
            .repository
            .list_reviews(window.offset, window.limit)
            .await?;

        Ok(Paginated {
            items,
            count,
            window,
        })
    }

    /// Every review next to the mean rating.
    pub async fn review_report(&self) -> CatalogResult<ReviewReport> {
        let reviews = self.repository.list_all_reviews().await?;
        let avg = self.repository.average_stars().await?;
        Ok(ReviewReport(reviews, AverageStars { avg }))
    }

    pub async fn get_review(&self, id: i32) -> CatalogResult<Review> {
        self.repository
            .get_review(id)
            .await?
            .ok_or(CatalogError::not_found(review::Model::RESOURCE, id))
    }

    pub async fn create_review(&self, fields: ReviewFields) -> CatalogResult<Review> {
        self.check_review_product(fields.product_id).await?;
        self.repository.create_review(fields).await
    }

    pub async fn update_review(&self, id: i32, fields: ReviewFields) -> CatalogResult<Review> {
        self.get_review(id).await?;
        self.check_review_product(fields.product_id).await?;

        self.repository
            .update_review(id, fields)
            .await?
            .ok_or(CatalogError::not_found(review::Model::RESOURCE, id))
    }

    pub async fn delete_review(&self, id: i32) -> CatalogResult<()> {
        if !self.repository.delete_review(id).await? {
            return Err(CatalogError::not_found(review::Model::RESOURCE, id));
        }
        Ok(())
    }

    async fn check_review_product(&self, product_id: i32) -> CatalogResult<()> {
        if self.repository.get_product(product_id).await?.is_none() {
            return Err(CatalogError::missing_reference("product_id", &[product_id]));
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Categories
    // ------------------------------------------------------------------

    /// All categories plus one global product count (not per category).
    pub async fn list_categories(&self) -> CatalogResult<CategoryListing> {
        let categories = self.repository.list_categories().await?;
        let count_products = self.repository.count_categorized_products().await?;
        Ok(CategoryListing(categories, ProductCount { count_products }))
    }

    pub async fn get_category(&self, id: i32) -> CatalogResult<Category> {
        self.repository
            .get_category(id)
            .await?
            .ok_or(CatalogError::not_found(category::Model::RESOURCE, id))
    }

    pub async fn create_category(&self, fields: CategoryFields) -> CatalogResult<Category> {
        self.repository.create_category(fields).await
    }

    pub async fn update_category(&self, id: i32, fields: CategoryFields) -> CatalogResult<Category> {
        self.repository
            .update_category(id, fields)
            .await?
            .ok_or(CatalogError::not_found(category::Model::RESOURCE, id))
    }

    /// Refused with [`CatalogError::CategoryInUse`] while products reference the category.
    pub async fn delete_category(&self, id: i32) -> CatalogResult<()> {
        self.get_category(id).await?;

        let products = self.repository.count_products_in_category(id).await?;
        if products > 0 {
            return Err(CatalogError::CategoryInUse { id, products });
        }

        if !self.repository.delete_category(id).await? {
            return Err(CatalogError::not_found(category::Model::RESOURCE, id));
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Tags
    // ------------------------------------------------------------------

    pub async fn list_tags(&self, page: PageNumber) -> CatalogResult<Paginated<Tag>> {
        let count = self.repository.count_tags().await?;
        let window = PageWindow::resolve(page, count, self.page_size)?;
        let items = self.repository.list_tags(window.offset, window.limit).await?;

        Ok(Paginated {
            items,
            count,
            window,
        })
    }

    pub async fn get_tag(&self, id: i32) -> CatalogResult<Tag> {
        self.repository
            .get_tag(id)
            .await?
            .ok_or(CatalogError::not_found(tag::Model::RESOURCE, id))
    }

    pub async fn create_tag(&self, fields: TagFields) -> CatalogResult<Tag> {
        self.repository.create_tag(fields).await
    }

    pub async fn update_tag(&self, id: i32, fields: TagFields) -> CatalogResult<Tag> {
        self.repository
            .update_tag(id, fields)
            .await?
            .ok_or(CatalogError::not_found(tag::Model::RESOURCE, id))
    }

    /// Removes the tag and its product links; the products stay.
    pub async fn delete_tag(&self, id: i32) -> CatalogResult<()> {
        if !self.repository.delete_tag(id).await? {
            return Err(CatalogError::not_found(tag::Model::RESOURCE, id));
        }
        Ok(())
    }
}
