use crate::entities::{ProductModel, ProductVariantModel, ProductVariantPriceModel};
use crate::handlers::common::{
    created_response, normalize_optional_string, success_response, validate_input, ApiJson,
    ApiPath,
};
use crate::{
    errors::ApiError,
    listing::Combination,
    services::{CreateProductInput, VariantOptionsInput, VariantPriceInput},
    AppState,
};
use axum::{
    extract::State,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Creates the router for product endpoints
pub fn products_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_product))
        .route("/:id", get(get_product))
        .route(
            "/:id/variants",
            get(list_product_options).post(add_variant_options),
        )
        .route("/:id/combinations", get(variant_combinations))
        .route("/:id/prices", post(create_variant_prices))
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProductResponse {
    pub id: Uuid,
    pub title: String,
    pub sku: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ProductModel> for ProductResponse {
    fn from(model: ProductModel) -> Self {
        Self {
            id: model.id,
            title: model.title,
            sku: model.sku,
            description: model.description,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProductOptionResponse {
    pub id: Uuid,
    pub variant_id: Uuid,
    #[schema(example = "XL")]
    pub variant_title: String,
    pub product_id: Uuid,
}

impl From<ProductVariantModel> for ProductOptionResponse {
    fn from(model: ProductVariantModel) -> Self {
        Self {
            id: model.id,
            variant_id: model.variant_id,
            variant_title: model.variant_title,
            product_id: model.product_id,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct VariantPriceResponse {
    pub id: Uuid,
    pub product_id: Uuid,
    pub product_variant_one: Option<Uuid>,
    pub product_variant_two: Option<Uuid>,
    pub product_variant_three: Option<Uuid>,
    #[schema(value_type = String, example = "24.50")]
    pub price: Decimal,
    pub stock: i32,
}

impl From<ProductVariantPriceModel> for VariantPriceResponse {
    fn from(model: ProductVariantPriceModel) -> Self {
        Self {
            id: model.id,
            product_id: model.product_id,
            product_variant_one: model.product_variant_one,
            product_variant_two: model.product_variant_two,
            product_variant_three: model.product_variant_three,
            price: model.price,
            stock: model.stock,
        }
    }
}

/// Create a new product
#[utoipa::path(
    post,
    path = "/api/v1/products",
    request_body = CreateProductInput,
    responses(
        (status = 201, description = "Product created", body = crate::ApiResponse<ProductResponse>),
        (status = 400, description = "Invalid payload or duplicate SKU", body = crate::errors::ErrorResponse)
    ),
    tag = "Products"
)]
pub async fn create_product(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CreateProductInput>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let input = CreateProductInput {
        description: normalize_optional_string(payload.description),
        ..payload
    };

    let product = state
        .services
        .product_catalog
        .create_product(input)
        .await?;

    Ok(created_response(ProductResponse::from(product)))
}

/// Get a product by ID
#[utoipa::path(
    get,
    path = "/api/v1/products/{id}",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Product retrieved", body = crate::ApiResponse<ProductResponse>),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Products"
)]
pub async fn get_product(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let product = state
        .services
        .product_catalog
        .get_product(id)
        .await?;

    Ok(success_response(ProductResponse::from(product)))
}

/// List the option values of a product
#[utoipa::path(
    get,
    path = "/api/v1/products/{id}/variants",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Options retrieved", body = crate::ApiResponse<Vec<ProductOptionResponse>>),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Products"
)]
pub async fn list_product_options(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let catalog = &state.services.product_catalog;
    catalog.get_product(id).await?;
    let options = catalog.get_product_options(id).await?;

    Ok(success_response(
        options
            .into_iter()
            .map(ProductOptionResponse::from)
            .collect::<Vec<_>>(),
    ))
}

/// Add option values for up to three variant groups
#[utoipa::path(
    post,
    path = "/api/v1/products/{id}/variants",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    request_body = Vec<VariantOptionsInput>,
    responses(
        (status = 201, description = "Options saved", body = crate::ApiResponse<Vec<ProductOptionResponse>>),
        (status = 400, description = "Invalid variant groups", body = crate::errors::ErrorResponse),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Products"
)]
pub async fn add_variant_options(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<Vec<VariantOptionsInput>>,
) -> Result<impl IntoResponse, ApiError> {
    let options = state
        .services
        .product_catalog
        .add_variant_options(id, payload)
        .await?;

    Ok(created_response(
        options
            .into_iter()
            .map(ProductOptionResponse::from)
            .collect::<Vec<_>>(),
    ))
}

/// Preview every option combination of a product
#[utoipa::path(
    get,
    path = "/api/v1/products/{id}/combinations",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Combination preview", body = crate::ApiResponse<Vec<Combination>>),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Products"
)]
pub async fn variant_combinations(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let combinations = state
        .services
        .product_catalog
        .variant_combinations(id)
        .await?;

    Ok(success_response(combinations))
}

/// Save priced option combinations
#[utoipa::path(
    post,
    path = "/api/v1/products/{id}/prices",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    request_body = Vec<VariantPriceInput>,
    responses(
        (status = 201, description = "Prices saved", body = crate::ApiResponse<Vec<VariantPriceResponse>>),
        (status = 400, description = "Invalid price rows", body = crate::errors::ErrorResponse),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Products"
)]
pub async fn create_variant_prices(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<Vec<VariantPriceInput>>,
) -> Result<impl IntoResponse, ApiError> {
    let prices = state
        .services
        .product_catalog
        .create_variant_prices(id, payload)
        .await?;

    Ok(created_response(
        prices
            .into_iter()
            .map(VariantPriceResponse::from)
            .collect::<Vec<_>>(),
    ))
}
