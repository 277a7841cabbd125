use crate::{
    entities::{
        product, product_variant, product_variant_price, variant, Product, ProductVariant,
        ProductVariantPrice, Variant, VariantModel,
    },
    errors::ServiceError,
    listing::{
        build_product_cards, catalog_option_map, Page, ProductCard, ProductFilter,
        ProductListParams,
    },
};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::{debug, info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;

/// Builds the view contexts of the product pages
#[derive(Clone)]
pub struct ProductListingService {
    db: Arc<DatabaseConnection>,
    page_size: u64,
}

impl ProductListingService {
    pub fn new(db: Arc<DatabaseConnection>, page_size: u64) -> Self {
        Self {
            db,
            page_size: page_size.max(1),
        }
    }

    pub fn page_size(&self) -> u64 {
        self.page_size
    }

    /// Context of the "create product" form
    #[instrument(skip(self))]
    pub async fn create_form_context(&self) -> Result<CreateFormContext, ServiceError> {
        let variants = Variant::find()
            .filter(variant::Column::Active.eq(true))
            .order_by_asc(variant::Column::Title)
            .all(&*self.db)
            .await?
            .into_iter()
            .map(|v| VariantChoice {
                id: v.id,
                title: v.title,
            })
            .collect();

        Ok(CreateFormContext {
            product: true,
            variants,
        })
    }

    /// Context of the filtered, paginated product list
    #[instrument(skip(self))]
    pub async fn product_list_context(
        &self,
        params: ProductListParams,
    ) -> Result<ProductListContext, ServiceError> {
        let filters = ProductFilter::from_params(&params)?;
        let query = Product::find().filter(filters.to_condition());

        let total = query.clone().count(&*self.db).await?;
        let page = Page::resolve(params.page.as_deref(), total, self.page_size);
        debug!(total, page = page.number, "Resolved product list page");

        let products = query
            .order_by_desc(product::Column::CreatedAt)
            .order_by_asc(product::Column::Title)
            .order_by_asc(product::Column::Id)
            .offset(page.offset())
            .limit(page.limit())
            .all(&*self.db)
            .await?;

        let product_ids: Vec<Uuid> = products.iter().map(|p| p.id).collect();
        let (options, prices) = if product_ids.is_empty() {
            (Vec::new(), Vec::new())
        } else {
            let options = ProductVariant::find()
                .filter(product_variant::Column::ProductId.is_in(product_ids.clone()))
                .all(&*self.db)
                .await?;
            let prices = ProductVariantPrice::find()
                .filter(product_variant_price::Column::ProductId.is_in(product_ids))
                .all(&*self.db)
                .await?;
            (options, prices)
        };

        let groups = Variant::find()
            .order_by_asc(variant::Column::Title)
            .all(&*self.db)
            .await?;

        let catalog_options: Vec<(Uuid, String)> = ProductVariant::find()
            .select_only()
            .column(product_variant::Column::VariantId)
            .column(product_variant::Column::VariantTitle)
            .distinct()
            .into_tuple()
            .all(&*self.db)
            .await?;

        let variants = catalog_option_map(&groups, catalog_options);
        let by_id: HashMap<Uuid, VariantModel> = groups.into_iter().map(|v| (v.id, v)).collect();
        let products = build_product_cards(products, &options, &prices, &by_id);

        info!(
            total,
            page = page.number,
            shown = products.len(),
            filtered = !filters.is_empty(),
            "Built product list context"
        );

        Ok(ProductListContext {
            products,
            page,
            variants,
            filters,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct VariantChoice {
    pub id: Uuid,
    pub title: String,
}

/// Context of the "create product" form
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateFormContext {
    /// Marks the product section active in the navigation
    pub product: bool,
    /// Active variant groups offered by the form
    pub variants: Vec<VariantChoice>,
}

/// Context of the product list page
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProductListContext {
    pub products: Vec<ProductCard>,
    pub page: Page,
    /// Variant group title to every option value in the catalog
    pub variants: BTreeMap<String, Vec<String>>,
    /// Filters applied to this listing
    pub filters: ProductFilter,
}
