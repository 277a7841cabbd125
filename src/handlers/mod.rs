pub mod common;
pub mod products;
pub mod variants;
pub mod views;

use crate::config::AppConfig;
use crate::db::DbPool;
use crate::services::{ProductCatalogService, ProductListingService, VariantService};
use std::sync::Arc;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub product_catalog: Arc<ProductCatalogService>,
    pub variants: Arc<VariantService>,
    pub listing: Arc<ProductListingService>,
}

impl AppServices {
    pub fn new(db_pool: Arc<DbPool>, config: &AppConfig) -> Self {
        Self {
            product_catalog: Arc::new(ProductCatalogService::new(db_pool.clone())),
            variants: Arc::new(VariantService::new(db_pool.clone())),
            listing: Arc::new(ProductListingService::new(
                db_pool,
                config.listing.page_size,
            )),
        }
    }
}
