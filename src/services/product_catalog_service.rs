use crate::{
    entities::{
        product, product_variant, product_variant_price, Product, ProductModel, ProductVariant,
        ProductVariantModel, ProductVariantPriceModel, Variant, VariantModel,
    },
    errors::ServiceError,
    listing::{combine_options, group_options, Combination},
};
use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set, SqlErr, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// A product carries options for at most this many variant groups,
/// one per price row slot.
pub const MAX_VARIANT_GROUPS: usize = 3;

/// Creates products together with their options and priced combinations
#[derive(Clone)]
pub struct ProductCatalogService {
    db: Arc<DatabaseConnection>,
}

impl ProductCatalogService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Create a new product
    #[instrument(skip(self, input), fields(sku = %input.sku))]
    pub async fn create_product(
        &self,
        input: CreateProductInput,
    ) -> Result<ProductModel, ServiceError> {
        input.validate()?;
        let title = required_trimmed("title", &input.title)?;
        let sku = required_trimmed("sku", &input.sku)?;

        self.ensure_unique_sku(&sku).await?;

        let now = Utc::now();
        let product = product::ActiveModel {
            id: Set(Uuid::new_v4()),
            title: Set(title),
            sku: Set(sku.clone()),
            description: Set(input.description.unwrap_or_default().trim().to_string()),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let product = product
            .insert(&*self.db)
            .await
            .map_err(|e| duplicate_sku_or_db(e, &sku))?;

        info!(product_id = %product.id, "Created product");
        Ok(product)
    }

    /// Get a product by ID
    #[instrument(skip(self))]
    pub async fn get_product(&self, product_id: Uuid) -> Result<ProductModel, ServiceError> {
        Product::find_by_id(product_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Product {} not found", product_id)))
    }

    /// Options of a product in insertion order
    #[instrument(skip(self))]
    pub async fn get_product_options(
        &self,
        product_id: Uuid,
    ) -> Result<Vec<ProductVariantModel>, ServiceError> {
        ProductVariant::find()
            .filter(product_variant::Column::ProductId.eq(product_id))
            .order_by_asc(product_variant::Column::CreatedAt)
            .all(&*self.db)
            .await
            .map_err(Into::into)
    }

    /// Saves one option per tag for each variant group.
    ///
    /// Options that already exist are returned instead of duplicated.
    #[instrument(skip(self, groups), fields(groups = groups.len()))]
    pub async fn add_variant_options(
        &self,
        product_id: Uuid,
        groups: Vec<VariantOptionsInput>,
    ) -> Result<Vec<ProductVariantModel>, ServiceError> {
        self.get_product(product_id).await?;

        let groups = normalize_option_groups(groups)?;
        if groups.is_empty() {
            return Err(ServiceError::ValidationError(
                "at least one option value is required".to_string(),
            ));
        }

        let variant_ids: Vec<Uuid> = groups.iter().map(|(id, _)| *id).collect();
        let variants: HashMap<Uuid, VariantModel> = Variant::find()
            .filter(crate::entities::variant::Column::Id.is_in(variant_ids.clone()))
            .all(&*self.db)
            .await?
            .into_iter()
            .map(|v| (v.id, v))
            .collect();

        for variant_id in &variant_ids {
            match variants.get(variant_id) {
                None => {
                    return Err(ServiceError::ValidationError(format!(
                        "Variant {} does not exist",
                        variant_id
                    )))
                }
                Some(v) if !v.active => {
                    return Err(ServiceError::ValidationError(format!(
                        "Variant '{}' is not active",
                        v.title
                    )))
                }
                Some(_) => {}
            }
        }

        let existing = self.get_product_options(product_id).await?;
        let mut group_ids: HashSet<Uuid> = existing.iter().map(|o| o.variant_id).collect();
        group_ids.extend(variant_ids.iter().copied());
        if group_ids.len() > MAX_VARIANT_GROUPS {
            return Err(ServiceError::ValidationError(format!(
                "a product supports at most {} variant groups",
                MAX_VARIANT_GROUPS
            )));
        }

        let existing: HashMap<(Uuid, String), ProductVariantModel> = existing
            .into_iter()
            .map(|o| ((o.variant_id, o.variant_title.clone()), o))
            .collect();

        let txn = self.db.begin().await?;
        let base = Utc::now();
        let mut saved = Vec::new();
        let mut created = 0usize;

        for (variant_id, tags) in groups {
            for tag in tags {
                if let Some(option) = existing.get(&(variant_id, tag.clone())) {
                    saved.push(option.clone());
                    continue;
                }

                // Offsets keep request order when options are sorted by creation time
                let stamp = base + Duration::microseconds(created as i64);
                let option = product_variant::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    variant_title: Set(tag),
                    variant_id: Set(variant_id),
                    product_id: Set(product_id),
                    created_at: Set(stamp),
                    updated_at: Set(stamp),
                }
                .insert(&txn)
                .await?;
                created += 1;
                saved.push(option);
            }
        }

        txn.commit().await?;

        info!(%product_id, created, total = saved.len(), "Saved variant options");
        Ok(saved)
    }

    /// Validates every price row, then inserts them in one transaction
    #[instrument(skip(self, rows), fields(rows = rows.len()))]
    pub async fn create_variant_prices(
        &self,
        product_id: Uuid,
        rows: Vec<VariantPriceInput>,
    ) -> Result<Vec<ProductVariantPriceModel>, ServiceError> {
        self.get_product(product_id).await?;

        if rows.is_empty() {
            return Err(ServiceError::ValidationError(
                "at least one price row is required".to_string(),
            ));
        }

        let options: HashMap<Uuid, ProductVariantModel> = self
            .get_product_options(product_id)
            .await?
            .into_iter()
            .map(|o| (o.id, o))
            .collect();

        for (index, row) in rows.iter().enumerate() {
            validate_price_row(index, row, &options)?;
        }

        let base = Utc::now();
        let models: Vec<product_variant_price::ActiveModel> = rows
            .into_iter()
            .enumerate()
            .map(|(index, row)| {
                let stamp = base + Duration::microseconds(index as i64);
                product_variant_price::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    product_id: Set(product_id),
                    product_variant_one: Set(row.product_variant_one),
                    product_variant_two: Set(row.product_variant_two),
                    product_variant_three: Set(row.product_variant_three),
                    price: Set(row.price),
                    stock: Set(row.stock),
                    created_at: Set(stamp),
                    updated_at: Set(stamp),
                }
            })
            .collect();

        let saved = self
            .db
            .transaction::<_, Vec<ProductVariantPriceModel>, ServiceError>(|txn| {
                Box::pin(async move {
                    let mut saved = Vec::with_capacity(models.len());
                    for model in models {
                        saved.push(model.insert(txn).await?);
                    }
                    Ok(saved)
                })
            })
            .await
            .map_err(ServiceError::from_transaction)?;

        info!(%product_id, count = saved.len(), "Saved variant prices");
        Ok(saved)
    }

    /// Every option combination of a product, for the create form preview
    #[instrument(skip(self))]
    pub async fn variant_combinations(
        &self,
        product_id: Uuid,
    ) -> Result<Vec<Combination>, ServiceError> {
        self.get_product(product_id).await?;

        let options = self.get_product_options(product_id).await?;
        let variant_ids: Vec<Uuid> = options.iter().map(|o| o.variant_id).collect();
        let variants: HashMap<Uuid, VariantModel> = Variant::find()
            .filter(crate::entities::variant::Column::Id.is_in(variant_ids))
            .all(&*self.db)
            .await?
            .into_iter()
            .map(|v| (v.id, v))
            .collect();

        let refs: Vec<&ProductVariantModel> = options.iter().collect();
        let groups = group_options(&refs, &variants);
        Ok(combine_options(&groups))
    }

    async fn ensure_unique_sku(&self, sku: &str) -> Result<(), ServiceError> {
        let taken = Product::find()
            .filter(product::Column::Sku.eq(sku))
            .one(&*self.db)
            .await?
            .is_some();

        if taken {
            return Err(ServiceError::ValidationError(format!(
                "SKU {} already exists",
                sku
            )));
        }

        Ok(())
    }
}

fn required_trimmed(field: &str, value: &str) -> Result<String, ServiceError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ServiceError::ValidationError(format!(
            "{} must not be empty",
            field
        )));
    }
    Ok(value.to_string())
}

fn duplicate_sku_or_db(err: DbErr, sku: &str) -> ServiceError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            warn!(%sku, "SKU inserted concurrently");
            ServiceError::ValidationError(format!("SKU {} already exists", sku))
        }
        _ => ServiceError::DatabaseError(err),
    }
}

/// Trims and de-duplicates tags, drops groups left without tags and
/// rejects a variant group listed twice.
fn normalize_option_groups(
    groups: Vec<VariantOptionsInput>,
) -> Result<Vec<(Uuid, Vec<String>)>, ServiceError> {
    let mut seen = HashSet::new();
    let mut normalized = Vec::with_capacity(groups.len());

    for group in groups {
        if !seen.insert(group.variant_id) {
            return Err(ServiceError::ValidationError(format!(
                "variant {} is listed more than once",
                group.variant_id
            )));
        }

        let mut tags: Vec<String> = Vec::new();
        for tag in group.tags {
            let tag = tag.trim();
            if !tag.is_empty() && !tags.iter().any(|t| t == tag) {
                tags.push(tag.to_string());
            }
        }

        if !tags.is_empty() {
            normalized.push((group.variant_id, tags));
        }
    }

    Ok(normalized)
}

fn validate_price_row(
    index: usize,
    row: &VariantPriceInput,
    options: &HashMap<Uuid, ProductVariantModel>,
) -> Result<(), ServiceError> {
    let invalid = |msg: String| ServiceError::ValidationError(format!("row {}: {}", index, msg));

    let slots: Vec<Uuid> = [
        row.product_variant_one,
        row.product_variant_two,
        row.product_variant_three,
    ]
    .into_iter()
    .flatten()
    .collect();

    if slots.is_empty() {
        return Err(invalid("at least one variant option is required".into()));
    }
    if row.price < Decimal::ZERO {
        return Err(invalid("price must not be negative".into()));
    }
    if row.stock < 0 {
        return Err(invalid("stock must not be negative".into()));
    }

    let mut groups = HashSet::new();
    for slot in slots {
        let option = options
            .get(&slot)
            .ok_or_else(|| invalid(format!("option {} does not belong to this product", slot)))?;
        if !groups.insert(option.variant_id) {
            return Err(invalid(
                "two options of the same variant group were selected".into(),
            ));
        }
    }

    Ok(())
}

/// Input for creating a product
#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
pub struct CreateProductInput {
    #[validate(length(min = 1, max = 255))]
    #[serde(alias = "name")]
    #[schema(example = "Classic T-Shirt")]
    pub title: String,
    #[validate(length(min = 1, max = 255))]
    #[schema(example = "TSHIRT-001")]
    pub sku: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Option values to add for one variant group
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct VariantOptionsInput {
    /// Variant group, e.g. the id of `Size`
    #[serde(alias = "option")]
    pub variant_id: Uuid,
    /// Option values, e.g. `["S", "M", "XL"]`
    pub tags: Vec<String>,
}

/// One priced combination of up to three options
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct VariantPriceInput {
    #[serde(default)]
    pub product_variant_one: Option<Uuid>,
    #[serde(default)]
    pub product_variant_two: Option<Uuid>,
    #[serde(default)]
    pub product_variant_three: Option<Uuid>,
    #[schema(value_type = String, example = "24.50")]
    pub price: Decimal,
    #[serde(default)]
    pub stock: i32,
}
