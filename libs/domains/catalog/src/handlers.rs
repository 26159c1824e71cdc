use axum::{
    Json, Router,
    extract::{OriginalUri, Query, State, rejection::QueryRejection},
    http::{HeaderName, StatusCode, Uri, header},
    response::IntoResponse,
    routing::get,
};
use axum_helpers::{
    IdPath, ValidatedJson,
    errors::responses::{
        BadRequestIdResponse, BadRequestValidationResponse, ConflictResponse,
        InternalServerErrorResponse, NotFoundResponse,
    },
};
use core_proc_macros::ApiResource;
use std::sync::Arc;
use utoipa::OpenApi;

use crate::entity::{category, product, review, tag};
use crate::error::CatalogResult;
use crate::models::{
    AverageStars, Category, CategoryListing, CategoryPayload, Product, ProductCount,
    ProductPayload, Review, ReviewPayload, ReviewReport, Tag, TagPayload,
};
use crate::pagination::{Page, PageQuery};
use crate::repository::CatalogRepository;
use crate::service::CatalogService;

const REVIEW_REPORT_URL: &str = "/reviews/report";

/// OpenAPI documentation for the catalog API
#[derive(OpenApi)]
#[openapi(
    paths(
        list_products,
        create_product,
        get_product,
        update_product,
        delete_product,
        list_reviews,
        create_review,
        review_report,
        get_review,
        update_review,
        delete_review,
        list_categories,
        create_category,
        get_category,
        update_category,
        delete_category,
        list_tags,
        create_tag,
        get_tag,
        update_tag,
        delete_tag,
    ),
    components(
        schemas(
            Product,
            ProductPayload,
            Review,
            ReviewPayload,
            ReviewReport,
            AverageStars,
            Category,
            CategoryPayload,
            CategoryListing,
            ProductCount,
            Tag,
            TagPayload,
            Page<Product>,
            Page<Review>,
            Page<Tag>,
        ),
        responses(
            NotFoundResponse,
            BadRequestValidationResponse,
            BadRequestIdResponse,
            ConflictResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = product::Model::TAG, description = "Products with their category and tags"),
        (name = review::Model::TAG, description = "Product reviews and the rating report"),
        (name = category::Model::TAG, description = "Product categories"),
        (name = tag::Model::TAG, description = "Free-form product tags")
    )
)]
pub struct ApiDoc;

/// Create the catalog router with all HTTP endpoints.
///
/// Paths are absolute (`/products`, `/tags/{id}`, ...); merge or nest the
/// result under the API prefix.
pub fn router<R: CatalogRepository + 'static>(service: CatalogService<R>) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route(
            product::Model::URL,
            get(list_products).post(create_product),
        )
        .route(
            product::Model::URL_WITH_ID,
            get(get_product).put(update_product).delete(delete_product),
        )
        .route(review::Model::URL, get(list_reviews).post(create_review))
        .route(REVIEW_REPORT_URL, get(review_report))
        .route(
            review::Model::URL_WITH_ID,
            get(get_review).put(update_review).delete(delete_review),
        )
        .route(
            category::Model::URL,
            get(list_categories).post(create_category),
        )
        .route(
            category::Model::URL_WITH_ID,
            get(get_category)
                .put(update_category)
                .delete(delete_category),
        )
        .route(tag::Model::URL, get(list_tags).post(create_tag))
        .route(
            tag::Model::URL_WITH_ID,
            get(get_tag).put(update_tag).delete(delete_tag),
        )
        .with_state(shared_service)
}

/// 201 with `Location` pointing at the new row, relative to the request path.
fn created(uri: &Uri, id: i32) -> (StatusCode, [(HeaderName, String); 1]) {
    let location = format!("{}/{}", uri.path().trim_end_matches('/'), id);
    (StatusCode::CREATED, [(header::LOCATION, location)])
}

// ============================================================================
// Products
// ============================================================================

/// List products, one page at a time
#[utoipa::path(
    get,
    path = "/products",
    tag = product::Model::TAG,
    params(PageQuery),
    responses(
        (status = 200, description = "Page of products", body = Page<Product>),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_products<R: CatalogRepository>(
    State(service): State<Arc<CatalogService<R>>>,
    OriginalUri(uri): OriginalUri,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> CatalogResult<Json<Page<Product>>> {
    let page = service.list_products(PageQuery::requested(query)?).await?;
    Ok(Json(page.into_page(uri.path())))
}

/// Create a product and attach its tags
#[utoipa::path(
    post,
    path = "/products",
    tag = product::Model::TAG,
    request_body = ProductPayload,
    responses(
        (status = 201, description = "Product created",
            headers(("Location" = String, description = "URL of the new product"))),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_product<R: CatalogRepository>(
    State(service): State<Arc<CatalogService<R>>>,
    OriginalUri(uri): OriginalUri,
    ValidatedJson(payload): ValidatedJson<ProductPayload>,
) -> CatalogResult<impl IntoResponse> {
    let product = service.create_product(payload.into_fields()).await?;
    Ok(created(&uri, product.id))
}

/// Get a product by ID
#[utoipa::path(
    get,
    path = "/products/{id}",
    tag = product::Model::TAG,
    params(("id" = i32, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Product found", body = Product),
        (status = 400, response = BadRequestIdResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_product<R: CatalogRepository>(
    State(service): State<Arc<CatalogService<R>>>,
    IdPath(id): IdPath,
) -> CatalogResult<Json<Product>> {
    let product = service.get_product(id).await?;
    Ok(Json(product))
}

/// Replace every field of a product, tag set included
#[utoipa::path(
    put,
    path = "/products/{id}",
    tag = product::Model::TAG,
    params(("id" = i32, Path, description = "Product ID")),
    request_body = ProductPayload,
    responses(
        (status = 200, description = "Product updated"),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_product<R: CatalogRepository>(
    State(service): State<Arc<CatalogService<R>>>,
    IdPath(id): IdPath,
    ValidatedJson(payload): ValidatedJson<ProductPayload>,
) -> CatalogResult<StatusCode> {
    service.update_product(id, payload.into_fields()).await?;
    Ok(StatusCode::OK)
}

/// Delete a product with its reviews
#[utoipa::path(
    delete,
    path = "/products/{id}",
    tag = product::Model::TAG,
    params(("id" = i32, Path, description = "Product ID")),
    responses(
        (status = 204, description = "Product deleted"),
        (status = 400, response = BadRequestIdResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_product<R: CatalogRepository>(
    State(service): State<Arc<CatalogService<R>>>,
    IdPath(id): IdPath,
) -> CatalogResult<StatusCode> {
    service.delete_product(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Reviews
// ============================================================================

/// List reviews, one page at a time
#[utoipa::path(
    get,
    path = "/reviews",
    tag = review::Model::TAG,
    params(PageQuery),
    responses(
        (status = 200, description = "Page of reviews", body = Page<Review>),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_reviews<R: CatalogRepository>(
    State(service): State<Arc<CatalogService<R>>>,
    OriginalUri(uri): OriginalUri,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> CatalogResult<Json<Page<Review>>> {
    let page = service.list_reviews(PageQuery::requested(query)?).await?;
    Ok(Json(page.into_page(uri.path())))
}

/// Submit a review
#[utoipa::path(
    post,
    path = "/reviews",
    tag = review::Model::TAG,
    request_body = ReviewPayload,
    responses(
        (status = 201, description = "Review created",
            headers(("Location" = String, description = "URL of the new review"))),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_review<R: CatalogRepository>(
    State(service): State<Arc<CatalogService<R>>>,
    OriginalUri(uri): OriginalUri,
    ValidatedJson(payload): ValidatedJson<ReviewPayload>,
) -> CatalogResult<impl IntoResponse> {
    let review = service.create_review(payload.into_fields()).await?;
    Ok(created(&uri, review.id))
}

/// Every review together with the average rating
#[utoipa::path(
    get,
    path = "/reviews/report",
    tag = review::Model::TAG,
    responses(
        (status = 200, description = "`[[review, ...], {\"avg\": X}]`", body = ReviewReport),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn review_report<R: CatalogRepository>(
    State(service): State<Arc<CatalogService<R>>>,
) -> CatalogResult<Json<ReviewReport>> {
    let report = service.review_report().await?;
    Ok(Json(report))
}

/// Get a review by ID
#[utoipa::path(
    get,
    path = "/reviews/{id}",
    tag = review::Model::TAG,
    params(("id" = i32, Path, description = "Review ID")),
    responses(
        (status = 200, description = "Review found", body = Review),
        (status = 400, response = BadRequestIdResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_review<R: CatalogRepository>(
    State(service): State<Arc<CatalogService<R>>>,
    IdPath(id): IdPath,
) -> CatalogResult<Json<Review>> {
    let review = service.get_review(id).await?;
    Ok(Json(review))
}

/// Replace a review
#[utoipa::path(
    put,
    path = "/reviews/{id}",
    tag = review::Model::TAG,
    params(("id" = i32, Path, description = "Review ID")),
    request_body = ReviewPayload,
    responses(
        (status = 200, description = "Review updated"),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_review<R: CatalogRepository>(
    State(service): State<Arc<CatalogService<R>>>,
    IdPath(id): IdPath,
    ValidatedJson(payload): ValidatedJson<ReviewPayload>,
) -> CatalogResult<StatusCode> {
    service.update_review(id, payload.into_fields()).await?;
    Ok(StatusCode::OK)
}

/// Delete a review
#[utoipa::path(
    delete,
    path = "/reviews/{id}",
    tag = review::Model::TAG,
    params(("id" = i32, Path, description = "Review ID")),
    responses(
        (status = 204, description = "Review deleted"),
        (status = 400, response = BadRequestIdResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_review<R: CatalogRepository>(
    State(service): State<Arc<CatalogService<R>>>,
    IdPath(id): IdPath,
) -> CatalogResult<StatusCode> {
    service.delete_review(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Categories
// ============================================================================

/// List every category next to the number of categorized products
#[utoipa::path(
    get,
    path = "/categories",
    tag = category::Model::TAG,
    responses(
        (status = 200, description = "`[[category, ...], {\"count_products\": N}]`", body = CategoryListing),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_categories<R: CatalogRepository>(
    State(service): State<Arc<CatalogService<R>>>,
) -> CatalogResult<Json<CategoryListing>> {
    let listing = service.list_categories().await?;
    Ok(Json(listing))
}

/// Create a category
#[utoipa::path(
    post,
    path = "/categories",
    tag = category::Model::TAG,
    request_body = CategoryPayload,
    responses(
        (status = 201, description = "Category created",
            headers(("Location" = String, description = "URL of the new category"))),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_category<R: CatalogRepository>(
    State(service): State<Arc<CatalogService<R>>>,
    OriginalUri(uri): OriginalUri,
    ValidatedJson(payload): ValidatedJson<CategoryPayload>,
) -> CatalogResult<impl IntoResponse> {
    let category = service.create_category(payload.into_fields()).await?;
    Ok(created(&uri, category.id))
}

/// Get a category by ID
#[utoipa::path(
    get,
    path = "/categories/{id}",
    tag = category::Model::TAG,
    params(("id" = i32, Path, description = "Category ID")),
    responses(
        (status = 200, description = "Category found", body = Category),
        (status = 400, response = BadRequestIdResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_category<R: CatalogRepository>(
    State(service): State<Arc<CatalogService<R>>>,
    IdPath(id): IdPath,
) -> CatalogResult<Json<Category>> {
    let category = service.get_category(id).await?;
    Ok(Json(category))
}

/// Rename a category
#[utoipa::path(
    put,
    path = "/categories/{id}",
    tag = category::Model::TAG,
    params(("id" = i32, Path, description = "Category ID")),
    request_body = CategoryPayload,
    responses(
        (status = 200, description = "Category updated"),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_category<R: CatalogRepository>(
    State(service): State<Arc<CatalogService<R>>>,
    IdPath(id): IdPath,
    ValidatedJson(payload): ValidatedJson<CategoryPayload>,
) -> CatalogResult<StatusCode> {
    service.update_category(id, payload.into_fields()).await?;
    Ok(StatusCode::OK)
}

/// Delete a category that no product references
#[utoipa::path(
    delete,
    path = "/categories/{id}",
    tag = category::Model::TAG,
    params(("id" = i32, Path, description = "Category ID")),
    responses(
        (status = 204, description = "Category deleted"),
        (status = 400, response = BadRequestIdResponse),
        (status = 404, response = NotFoundResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_category<R: CatalogRepository>(
    State(service): State<Arc<CatalogService<R>>>,
    IdPath(id): IdPath,
) -> CatalogResult<StatusCode> {
    service.delete_category(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Tags
// ============================================================================

/// List tags, one page at a time
#[utoipa::path(
    get,
    path = "/tags",
    tag = tag::Model::TAG,
    params(PageQuery),
    responses(
        (status = 200, description = "Page of tags", body = Page<Tag>),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_tags<R: CatalogRepository>(
    State(service): State<Arc<CatalogService<R>>>,
    OriginalUri(uri): OriginalUri,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> CatalogResult<Json<Page<Tag>>> {
    let page = service.list_tags(PageQuery::requested(query)?).await?;
    Ok(Json(page.into_page(uri.path())))
}

/// Create a tag
#[utoipa::path(
    post,
    path = "/tags",
    tag = tag::Model::TAG,
    request_body = TagPayload,
    responses(
        (status = 201, description = "Tag created",
            headers(("Location" = String, description = "URL of the new tag"))),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_tag<R: CatalogRepository>(
    State(service): State<Arc<CatalogService<R>>>,
    OriginalUri(uri): OriginalUri,
    ValidatedJson(payload): ValidatedJson<TagPayload>,
) -> CatalogResult<impl IntoResponse> {
    let tag = service.create_tag(payload.into_fields()).await?;
    Ok(created(&uri, tag.id))
}

/// Get a tag by ID
#[utoipa::path(
    get,
    path = "/tags/{id}",
    tag = tag::Model::TAG,
    params(("id" = i32, Path, description = "Tag ID")),
    responses(
        (status = 200, description = "Tag found", body = Tag),
        (status = 400, response = BadRequestIdResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_tag<R: CatalogRepository>(
    State(service): State<Arc<CatalogService<R>>>,
    IdPath(id): IdPath,
) -> CatalogResult<Json<Tag>> {
    let tag = service.get_tag(id).await?;
    Ok(Json(tag))
}

/// Rename a tag
#[utoipa::path(
    put,
    path = "/tags/{id}",
    tag = tag::Model::TAG,
    params(("id" = i32, Path, description = "Tag ID")),
    request_body = TagPayload,
    responses(
        (status = 200, description = "Tag updated"),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_tag<R: CatalogRepository>(
    State(service): State<Arc<CatalogService<R>>>,
    IdPath(id): IdPath,
    ValidatedJson(payload): ValidatedJson<TagPayload>,
) -> CatalogResult<StatusCode> {
    service.update_tag(id, payload.into_fields()).await?;
    Ok(StatusCode::OK)
}

/// Delete a tag and unlink it from its products
#[utoipa::path(
    delete,
    path = "/tags/{id}",
    tag = tag::Model::TAG,
    params(("id" = i32, Path, description = "Tag ID")),
    responses(
        (status = 204, description = "Tag deleted"),
        (status = 400, response = BadRequestIdResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_tag<R: CatalogRepository>(
    State(service): State<Arc<CatalogService<R>>>,
    IdPath(id): IdPath,
) -> CatalogResult<StatusCode> {
    service.delete_tag(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
