use crate::{
    entities::{variant, Variant, VariantModel},
    errors::ServiceError,
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder,
    Set, SqlErr,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Manages variant groups such as Size, Color or Style
#[derive(Clone)]
pub struct VariantService {
    db: Arc<DatabaseConnection>,
}

impl VariantService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Create a variant group. Titles are unique regardless of case.
    #[instrument(skip(self, input), fields(title = %input.title))]
    pub async fn create_variant(
        &self,
        input: CreateVariantInput,
    ) -> Result<VariantModel, ServiceError> {
        input.validate()?;
        let title = input.title.trim().to_string();
        if title.is_empty() {
            return Err(ServiceError::ValidationError(
                "title must not be empty".to_string(),
            ));
        }

        let key = variant::title_key(&title);
        let taken = Variant::find()
            .filter(variant::Column::TitleKey.eq(key.as_str()))
            .one(&*self.db)
            .await?;
        if let Some(existing) = taken {
            return Err(ServiceError::Conflict(format!(
                "Variant '{}' already exists",
                existing.title
            )));
        }

        let now = Utc::now();
        let variant = variant::ActiveModel {
            id: Set(Uuid::new_v4()),
            title: Set(title.clone()),
            title_key: Set(key),
            description: Set(input
                .description
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty())),
            active: Set(input.active.unwrap_or(true)),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&*self.db)
        .await
        .map_err(|e| duplicate_title_or_db(e, &title))?;

        info!(variant_id = %variant.id, "Created variant");
        Ok(variant)
    }

    /// Variants ordered by title, optionally only the active ones
    #[instrument(skip(self))]
    pub async fn list_variants(&self, active_only: bool) -> Result<Vec<VariantModel>, ServiceError> {
        let mut query = Variant::find();
        if active_only {
            query = query.filter(variant::Column::Active.eq(true));
        }

        query
            .order_by_asc(variant::Column::Title)
            .all(&*self.db)
            .await
            .map_err(Into::into)
    }
}

fn duplicate_title_or_db(err: DbErr, title: &str) -> ServiceError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            warn!(%title, "Variant title inserted concurrently");
            ServiceError::Conflict(format!("Variant '{}' already exists", title))
        }
        _ => ServiceError::DatabaseError(err),
    }
}

/// Input for creating a variant group
#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
pub struct CreateVariantInput {
    #[validate(length(min = 1, max = 40))]
    #[schema(example = "Size")]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Defaults to active
    #[serde(default)]
    pub active: Option<bool>,
}
