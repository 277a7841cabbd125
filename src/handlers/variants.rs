use crate::entities::VariantModel;
use crate::handlers::common::{
    created_response, success_response, validate_input, ApiJson, ApiQuery,
};
use crate::{errors::ApiError, services::CreateVariantInput, AppState};
use axum::{extract::State, response::IntoResponse, routing::get, Router};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

/// Creates the router for variant group endpoints
pub fn variants_routes() -> Router<AppState> {
    Router::new().route("/", get(list_variants).post(create_variant))
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct VariantListQuery {
    /// Only return active variants
    #[serde(default)]
    pub active: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct VariantResponse {
    pub id: Uuid,
    #[schema(example = "Size")]
    pub title: String,
    pub description: Option<String>,
    pub active: bool,
}

impl From<VariantModel> for VariantResponse {
    fn from(model: VariantModel) -> Self {
        Self {
            id: model.id,
            title: model.title,
            description: model.description,
            active: model.active,
        }
    }
}

/// Create a variant group
#[utoipa::path(
    post,
    path = "/api/v1/variants",
    request_body = CreateVariantInput,
    responses(
        (status = 201, description = "Variant created", body = crate::ApiResponse<VariantResponse>),
        (status = 400, description = "Invalid payload", body = crate::errors::ErrorResponse),
        (status = 409, description = "Title already taken", body = crate::errors::ErrorResponse)
    ),
    tag = "Variants"
)]
pub async fn create_variant(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CreateVariantInput>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let variant = state.services.variants.create_variant(payload).await?;

    Ok(created_response(VariantResponse::from(variant)))
}

/// List variant groups ordered by title
#[utoipa::path(
    get,
    path = "/api/v1/variants",
    params(VariantListQuery),
    responses(
        (status = 200, description = "Variants retrieved", body = crate::ApiResponse<Vec<VariantResponse>>)
    ),
    tag = "Variants"
)]
pub async fn list_variants(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<VariantListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let variants = state
        .services
        .variants
        .list_variants(query.active.unwrap_or(false))
        .await?;

    Ok(success_response(
        variants
            .into_iter()
            .map(VariantResponse::from)
            .collect::<Vec<_>>(),
    ))
}
