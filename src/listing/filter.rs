use crate::entities::{product, product_variant, product_variant_price};
use crate::errors::ServiceError;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::sea_query::{Expr, Func, LikeExpr, Query};
use sea_orm::{ColumnTrait, Condition};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use utoipa::{IntoParams, ToSchema};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Raw query string of the product list page.
///
/// Every field stays a string so that blank inputs from an unfilled form
/// (`?title=&variant=`) are accepted and malformed values get a proper 400.
#[derive(Debug, Clone, Default, Deserialize, Serialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ProductListParams {
    /// Case-insensitive substring of the product title
    pub title: Option<String>,
    /// Exact option value, e.g. `XL`
    pub variant: Option<String>,
    /// Lower price bound (inclusive)
    pub price_from: Option<String>,
    /// Upper price bound (inclusive)
    pub price_to: Option<String>,
    /// Creation day, `YYYY-MM-DD`
    pub date: Option<String>,
    /// 1-based page number
    pub page: Option<String>,
}

/// Validated filters, echoed back to the list view
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ProductFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_from: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_to: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>, format = Date)]
    pub date: Option<NaiveDate>,
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn parse_price(field: &str, raw: Option<&str>) -> Result<Option<Decimal>, ServiceError> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    let price = Decimal::from_str(raw)
        .map_err(|_| ServiceError::ValidationError(format!("{field} must be a number")))?;
    if price.is_sign_negative() {
        return Err(ServiceError::ValidationError(format!(
            "{field} must not be negative"
        )));
    }
    Ok(Some(price))
}

fn parse_date(raw: Option<&str>) -> Result<Option<NaiveDate>, ServiceError> {
    raw.map(|raw| {
        NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|_| {
            ServiceError::ValidationError("date must be formatted as YYYY-MM-DD".to_string())
        })
    })
    .transpose()
}

/// Escape character of title patterns; needs no quoting on any backend
pub const LIKE_ESCAPE: char = '!';

/// Escapes LIKE wildcards so user input matches literally
pub fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        if matches!(ch, LIKE_ESCAPE | '%' | '_') {
            escaped.push(LIKE_ESCAPE);
        }
        escaped.push(ch);
    }
    escaped
}

/// Half-open UTC range `[day 00:00, next day 00:00)`
pub fn day_bounds(day: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = day.and_time(chrono::NaiveTime::MIN).and_utc();
    (start, start + Duration::days(1))
}

impl ProductFilter {
    /// Parses the raw query string. Blank values count as absent.
    pub fn from_params(params: &ProductListParams) -> Result<Self, ServiceError> {
        let price_from = parse_price("price_from", non_blank(&params.price_from))?;
        let price_to = parse_price("price_to", non_blank(&params.price_to))?;

        if let (Some(from), Some(to)) = (price_from, price_to) {
            if from > to {
                return Err(ServiceError::ValidationError(
                    "price_from must not exceed price_to".to_string(),
                ));
            }
        }

        Ok(Self {
            title: non_blank(&params.title).map(str::to_string),
            variant: non_blank(&params.variant).map(str::to_string),
            price_from,
            price_to,
            date: parse_date(non_blank(&params.date))?,
        })
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// AND-composes one predicate per present filter
    pub fn to_condition(&self) -> Condition {
        Condition::all()
            .add_option(self.title.as_deref().map(title_contains))
            .add_option(self.variant.as_deref().map(has_option_value))
            .add_option(self.price_range())
            .add_option(self.date.map(created_on))
    }

    fn price_range(&self) -> Option<sea_orm::sea_query::SimpleExpr> {
        if self.price_from.is_none() && self.price_to.is_none() {
            return None;
        }

        // Both bounds go into one subquery so they apply to the same price row
        let mut rows = Query::select();
        rows.column(product_variant_price::Column::ProductId)
            .from(product_variant_price::Entity);
        if let Some(from) = self.price_from {
            rows.and_where(product_variant_price::Column::Price.gte(from));
        }
        if let Some(to) = self.price_to {
            rows.and_where(product_variant_price::Column::Price.lte(to));
        }

        Some(product::Column::Id.in_subquery(rows.to_owned()))
    }
}

fn title_contains(title: &str) -> sea_orm::sea_query::SimpleExpr {
    let pattern = format!("%{}%", escape_like(&title.to_lowercase()));
    Expr::expr(Func::lower(Expr::col((
        product::Entity,
        product::Column::Title,
    ))))
    .like(LikeExpr::new(pattern).escape(LIKE_ESCAPE))
}

fn has_option_value(value: &str) -> sea_orm::sea_query::SimpleExpr {
    product::Column::Id.in_subquery(
        Query::select()
            .column(product_variant::Column::ProductId)
            .from(product_variant::Entity)
            .and_where(product_variant::Column::VariantTitle.eq(value))
            .to_owned(),
    )
}

fn created_on(day: NaiveDate) -> sea_orm::sea_query::SimpleExpr {
    let (start, end) = day_bounds(day);
    product::Column::CreatedAt
        .gte(start)
        .and(product::Column::CreatedAt.lt(end))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use rust_decimal_macros::dec;
    use sea_orm::{DbBackend, EntityTrait, QueryFilter, QueryTrait};

    fn params(pairs: &[(&str, &str)]) -> ProductListParams {
        let mut p = ProductListParams::default();
        for (key, value) in pairs {
            let value = Some(value.to_string());
            match *key {
                "title" => p.title = value,
                "variant" => p.variant = value,
                "price_from" => p.price_from = value,
                "price_to" => p.price_to = value,
                "date" => p.date = value,
                "page" => p.page = value,
                other => panic!("unknown parameter {other}"),
            }
        }
        p
    }

    fn sql_for(filter: &ProductFilter) -> String {
        product::Entity::find()
            .filter(filter.to_condition())
            .build(DbBackend::Postgres)
            .to_string()
    }

    #[test]
    fn blank_parameters_are_ignored() {
        let filter =
            ProductFilter::from_params(&params(&[("title", "  "), ("price_from", "")])).unwrap();
        assert!(filter.is_empty());
        let sql = sql_for(&filter);
        let predicate = sql.split_once(" WHERE ").map(|(_, rest)| rest);
        assert_matches!(predicate, None | Some("TRUE"), "{sql}");
    }

    #[test]
    fn parses_every_filter() {
        let filter = ProductFilter::from_params(&params(&[
            ("title", " Shirt "),
            ("variant", "XL"),
            ("price_from", "10"),
            ("price_to", "24.50"),
            ("date", "2024-03-01"),
        ]))
        .unwrap();

        assert_eq!(filter.title.as_deref(), Some("Shirt"));
        assert_eq!(filter.variant.as_deref(), Some("XL"));
        assert_eq!(filter.price_from, Some(dec!(10)));
        assert_eq!(filter.price_to, Some(dec!(24.50)));
        assert_eq!(filter.date, NaiveDate::from_ymd_opt(2024, 3, 1));
    }

    #[test]
    fn malformed_values_are_validation_errors() {
        assert_matches!(
            ProductFilter::from_params(&params(&[("price_from", "ten")])),
            Err(ServiceError::ValidationError(msg)) if msg.contains("price_from")
        );
        assert_matches!(
            ProductFilter::from_params(&params(&[("price_to", "-1")])),
            Err(ServiceError::ValidationError(_))
        );
        assert_matches!(
            ProductFilter::from_params(&params(&[("date", "01/03/2024")])),
            Err(ServiceError::ValidationError(_))
        );
        assert_matches!(
            ProductFilter::from_params(&params(&[("date", "2024-02-30")])),
            Err(ServiceError::ValidationError(_))
        );
    }

    #[test]
    fn reversed_price_range_is_rejected() {
        assert_matches!(
            ProductFilter::from_params(&params(&[("price_from", "30"), ("price_to", "10")])),
            Err(ServiceError::ValidationError(_))
        );
        // Equal bounds are a valid single-price range
        assert!(
            ProductFilter::from_params(&params(&[("price_from", "10"), ("price_to", "10")]))
                .is_ok()
        );
    }

    #[test]
    fn like_wildcards_are_escaped() {
        assert_eq!(escape_like("50%_off!"), "50!%!_off!!");
        assert_eq!(escape_like("plain"), "plain");
    }

    #[test]
    fn day_bounds_cover_one_utc_day() {
        let (start, end) = day_bounds(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
        assert_eq!(start.to_rfc3339(), "2024-02-29T00:00:00+00:00");
        assert_eq!(end.to_rfc3339(), "2024-03-01T00:00:00+00:00");
    }

    #[test]
    fn price_bounds_share_one_subquery() {
        let filter = ProductFilter {
            price_from: Some(dec!(10)),
            price_to: Some(dec!(20)),
            ..Default::default()
        };
        let sql = sql_for(&filter);
        assert_eq!(sql.matches("FROM \"product_variant_prices\"").count(), 1);
        assert!(sql.contains(">= 10"));
        assert!(sql.contains("<= 20"));
    }

    #[test]
    fn title_filter_is_case_insensitive_like() {
        let filter = ProductFilter {
            title: Some("T-Shirt".into()),
            ..Default::default()
        };
        let sql = sql_for(&filter);
        assert!(sql.contains("LOWER(\"products\".\"title\") LIKE '%t-shirt%'"));
    }

    #[test]
    fn variant_filter_matches_option_value() {
        let filter = ProductFilter {
            variant: Some("XL".into()),
            ..Default::default()
        };
        let sql = sql_for(&filter);
        assert!(sql.contains("\"product_variants\""));
        assert!(sql.contains("\"variant_title\" = 'XL'"));
    }
}
