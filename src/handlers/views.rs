//! View contexts consumed by the storefront back-office templates.

use crate::handlers::common::{context_response, ApiQuery};
use crate::{errors::ApiError, listing::ProductListParams, AppState};
use axum::{extract::State, response::IntoResponse, routing::get, Router};

pub fn view_routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(product_list_view))
        .route("/products/create", get(create_product_view))
}

/// Context of the "create product" form
#[utoipa::path(
    get,
    path = "/products/create",
    responses(
        (status = 200, description = "Create form context", body = crate::services::CreateFormContext)
    ),
    tag = "Views"
)]
pub async fn create_product_view(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let context = state.services.listing.create_form_context().await?;

    Ok(context_response(context))
}

/// Context of the filtered, paginated product list
#[utoipa::path(
    get,
    path = "/products",
    params(ProductListParams),
    responses(
        (status = 200, description = "Product list context", body = crate::services::ProductListContext),
        (status = 400, description = "Malformed filter value", body = crate::errors::ErrorResponse)
    ),
    tag = "Views"
)]
pub async fn product_list_view(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<ProductListParams>,
) -> Result<impl IntoResponse, ApiError> {
    let context = state
        .services
        .listing
        .product_list_context(params)
        .await?;

    Ok(context_response(context))
}
