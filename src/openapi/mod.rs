use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Product Catalog API",
        version = "0.1.0",
        description = r#"
# Product Catalog API

Back-office service for a storefront product catalog.

## Features

- **Products**: create products, add variant options (Size, Color, Style, ...) and price every option combination
- **Variants**: manage the variant groups offered by the create form
- **Views**: JSON contexts for the "create product" form and the filtered product list

## Product list filters

`GET /products` accepts `title`, `variant`, `price_from`, `price_to`, `date` (`YYYY-MM-DD`) and `page`.
Blank values are ignored. Malformed values return `400`.

## Error Handling

Errors share one body:

```json
{
  "error": "Bad Request",
  "message": "Validation error: price_from must be a number",
  "request_id": "6c1d...",
  "timestamp": "2024-01-01T00:00:00Z"
}
```
        "#,
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development")
    ),
    tags(
        (name = "Products", description = "Product creation endpoints"),
        (name = "Variants", description = "Variant group endpoints"),
        (name = "Views", description = "Page contexts for the back-office templates"),
        (name = "Health", description = "Health check endpoints")
    ),
    paths(
        // Products
        crate::handlers::products::create_product,
        crate::handlers::products::get_product,
        crate::handlers::products::list_product_options,
        crate::handlers::products::add_variant_options,
        crate::handlers::products::variant_combinations,
        crate::handlers::products::create_variant_prices,

        // Variants
        crate::handlers::variants::create_variant,
        crate::handlers::variants::list_variants,

        // Views
        crate::handlers::views::create_product_view,
        crate::handlers::views::product_list_view,

        // Health
        crate::health::health_check,
    ),
    components(
        schemas(
            crate::handlers::products::ProductResponse,
            crate::handlers::products::ProductOptionResponse,
            crate::handlers::products::VariantPriceResponse,
            crate::handlers::variants::VariantResponse,
            crate::services::CreateProductInput,
            crate::services::VariantOptionsInput,
            crate::services::VariantPriceInput,
            crate::services::CreateVariantInput,
            crate::services::CreateFormContext,
            crate::services::ProductListContext,
            crate::listing::ProductCard,
            crate::listing::Page,
            crate::listing::ProductFilter,
            crate::listing::Combination,
            crate::health::HealthInfo,

            // Error types
            crate::errors::ErrorResponse
        )
    )
)]
pub struct ApiDocV1;

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDocV1::openapi())
        .config(utoipa_swagger_ui::Config::from("/api-docs/openapi.json").try_it_out_enabled(true))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_lists_catalog_paths() {
        let openapi = ApiDocV1::openapi();
        let json = serde_json::to_string_pretty(&openapi).unwrap();
        assert!(json.contains("Product Catalog API"));
        assert!(json.contains("/api/v1/products"));
        assert!(json.contains("/api/v1/products/{id}/prices"));
        assert!(json.contains("\"/products\""));
        assert!(json.contains("ErrorResponse"));
    }
}
