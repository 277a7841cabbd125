// Catalog write side: products, options and priced combinations
pub mod product_catalog_service;
pub mod variant_service;

// Read side: view contexts of the product pages
pub mod product_listing_service;

pub use product_catalog_service::{
    CreateProductInput, ProductCatalogService, VariantOptionsInput, VariantPriceInput,
};
pub use product_listing_service::{
    CreateFormContext, ProductListContext, ProductListingService, VariantChoice,
};
pub use variant_service::{CreateVariantInput, VariantService};
