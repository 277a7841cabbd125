use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A priced stock-keeping unit made of up to three variant selections
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "product_variant_prices")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub product_id: Uuid,
    #[sea_orm(nullable)]
    pub product_variant_one: Option<Uuid>,
    #[sea_orm(nullable)]
    pub product_variant_two: Option<Uuid>,
    #[sea_orm(nullable)]
    pub product_variant_three: Option<Uuid>,
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub price: Decimal,
    pub stock: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Model {
    /// The variant selections in slot order, skipping empty slots
    pub fn selections(&self) -> impl Iterator<Item = Uuid> {
        [
            self.product_variant_one,
            self.product_variant_two,
            self.product_variant_three,
        ]
        .into_iter()
        .flatten()
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::product::Entity",
        from = "Column::ProductId",
        to = "super::product::Column::Id",
        on_delete = "Cascade"
    )]
    Product,
    #[sea_orm(
        belongs_to = "super::product_variant::Entity",
        from = "Column::ProductVariantOne",
        to = "super::product_variant::Column::Id"
    )]
    ProductVariantOne,
    #[sea_orm(
        belongs_to = "super::product_variant::Entity",
        from = "Column::ProductVariantTwo",
        to = "super::product_variant::Column::Id"
    )]
    ProductVariantTwo,
    #[sea_orm(
        belongs_to = "super::product_variant::Entity",
        from = "Column::ProductVariantThree",
        to = "super::product_variant::Column::Id"
    )]
    ProductVariantThree,
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
