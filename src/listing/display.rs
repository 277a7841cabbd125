//! Reshapes product, option and price rows into the nested structure the
//! list and create views render.

use crate::entities::{ProductModel, ProductVariantModel, ProductVariantPriceModel, VariantModel};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use utoipa::ToSchema;
use uuid::Uuid;

pub const VARIANT_TITLE_SEPARATOR: &str = " / ";

/// Joins the present option titles, e.g. `XL / Red / V-Neck`.
/// Blank parts are skipped so there are never dangling separators.
pub fn compose_variant_title<'a, I>(parts: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    parts
        .into_iter()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(VARIANT_TITLE_SEPARATOR)
}

/// One priced row on a product card
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct VariantLine {
    pub id: Uuid,
    #[schema(example = "XL / Red / V-Neck")]
    pub variant_title: String,
    #[schema(value_type = String, example = "24.50")]
    pub price: Decimal,
    pub stock: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct OptionValue {
    /// ProductVariant id, used as a price slot reference
    pub id: Uuid,
    pub title: String,
}

/// Options a product offers for one variant group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct OptionGroup {
    pub variant_id: Uuid,
    #[schema(example = "Size")]
    pub title: String,
    pub options: Vec<OptionValue>,
}

/// A product as shown on the list page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ProductCard {
    pub id: Uuid,
    pub title: String,
    pub sku: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub variants: Vec<VariantLine>,
    pub options: Vec<OptionGroup>,
}

/// One entry of the combination preview
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Combination {
    pub variant_title: String,
    pub product_variant_one: Option<Uuid>,
    pub product_variant_two: Option<Uuid>,
    pub product_variant_three: Option<Uuid>,
}

/// Groups a product's options by variant group.
///
/// Groups keep the order in which they were first added to the product,
/// options keep their insertion order.
pub fn group_options(
    options: &[&ProductVariantModel],
    variants: &HashMap<Uuid, VariantModel>,
) -> Vec<OptionGroup> {
    let mut ordered: Vec<&ProductVariantModel> = options.to_vec();
    ordered.sort_by(|a, b| {
        a.created_at
            .cmp(&b.created_at)
            .then_with(|| a.variant_title.cmp(&b.variant_title))
    });

    let mut groups: Vec<OptionGroup> = Vec::new();
    for option in ordered {
        let value = OptionValue {
            id: option.id,
            title: option.variant_title.clone(),
        };
        match groups.iter_mut().find(|g| g.variant_id == option.variant_id) {
            Some(group) => group.options.push(value),
            None => groups.push(OptionGroup {
                variant_id: option.variant_id,
                title: variants
                    .get(&option.variant_id)
                    .map(|v| v.title.clone())
                    .unwrap_or_default(),
                options: vec![value],
            }),
        }
    }
    groups
}

/// Builds the combined title of a price row from its slot references
pub fn price_row_title(
    price: &ProductVariantPriceModel,
    options: &HashMap<Uuid, &ProductVariantModel>,
) -> String {
    compose_variant_title(
        price
            .selections()
            .filter_map(|id| options.get(&id).map(|o| o.variant_title.as_str())),
    )
}

/// Reshapes one page of products with their options and price rows
pub fn build_product_cards(
    products: Vec<ProductModel>,
    options: &[ProductVariantModel],
    prices: &[ProductVariantPriceModel],
    variants: &HashMap<Uuid, VariantModel>,
) -> Vec<ProductCard> {
    let options_by_id: HashMap<Uuid, &ProductVariantModel> =
        options.iter().map(|o| (o.id, o)).collect();

    let mut options_by_product: HashMap<Uuid, Vec<&ProductVariantModel>> = HashMap::new();
    for option in options {
        options_by_product
            .entry(option.product_id)
            .or_default()
            .push(option);
    }

    let mut prices_by_product: HashMap<Uuid, Vec<&ProductVariantPriceModel>> = HashMap::new();
    for price in prices {
        prices_by_product
            .entry(price.product_id)
            .or_default()
            .push(price);
    }

    products
        .into_iter()
        .map(|product| {
            let mut rows = prices_by_product.remove(&product.id).unwrap_or_default();
            rows.sort_by_key(|p| p.created_at);

            let lines = rows
                .into_iter()
                .map(|price| VariantLine {
                    id: price.id,
                    variant_title: price_row_title(price, &options_by_id),
                    price: price.price,
                    stock: price.stock,
                })
                .collect();

            let own_options = options_by_product.remove(&product.id).unwrap_or_default();

            ProductCard {
                id: product.id,
                title: product.title,
                sku: product.sku,
                description: product.description,
                created_at: product.created_at,
                variants: lines,
                options: group_options(&own_options, variants),
            }
        })
        .collect()
}

/// Variant group title to the sorted, de-duplicated option values across
/// the catalog. Groups without options map to an empty list.
pub fn catalog_option_map<'a, G, O>(groups: G, options: O) -> BTreeMap<String, Vec<String>>
where
    G: IntoIterator<Item = &'a VariantModel>,
    O: IntoIterator<Item = (Uuid, String)>,
{
    let mut titles: HashMap<Uuid, &str> = HashMap::new();
    let mut map: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    for group in groups {
        titles.insert(group.id, group.title.as_str());
        map.entry(group.title.clone()).or_default();
    }

    for (variant_id, value) in options {
        if let Some(title) = titles.get(&variant_id) {
            map.entry((*title).to_string()).or_default().insert(value);
        }
    }

    map.into_iter()
        .map(|(title, values)| (title, values.into_iter().collect()))
        .collect()
}

/// Cartesian product of the option groups, in group order.
///
/// Only the first three groups take part since a price row has three slots.
pub fn combine_options(groups: &[OptionGroup]) -> Vec<Combination> {
    let groups: Vec<&OptionGroup> = groups.iter().take(3).collect();
    if groups.is_empty() || groups.iter().any(|g| g.options.is_empty()) {
        return Vec::new();
    }

    let mut picks: Vec<Vec<&OptionValue>> = vec![Vec::new()];
    for group in groups {
        picks = picks
            .into_iter()
            .flat_map(|prefix| {
                group.options.iter().map(move |option| {
                    let mut next = prefix.clone();
                    next.push(option);
                    next
                })
            })
            .collect();
    }

    picks
        .into_iter()
        .map(|pick| Combination {
            variant_title: compose_variant_title(pick.iter().map(|o| o.title.as_str())),
            product_variant_one: pick.first().map(|o| o.id),
            product_variant_two: pick.get(1).map(|o| o.id),
            product_variant_three: pick.get(2).map(|o| o.id),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn at(minute: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap() + Duration::minutes(minute)
    }

    fn variant(title: &str) -> VariantModel {
        VariantModel {
            id: Uuid::new_v4(),
            title: title.to_string(),
            title_key: crate::entities::variant::title_key(title),
            description: None,
            active: true,
            created_at: at(0),
            updated_at: at(0),
        }
    }

    fn option(product_id: Uuid, group: &VariantModel, title: &str, minute: i64) -> ProductVariantModel {
        ProductVariantModel {
            id: Uuid::new_v4(),
            variant_title: title.to_string(),
            variant_id: group.id,
            product_id,
            created_at: at(minute),
            updated_at: at(minute),
        }
    }

    fn product(title: &str) -> ProductModel {
        ProductModel {
            id: Uuid::new_v4(),
            title: title.to_string(),
            sku: format!("{}-sku", title.to_lowercase()),
            description: String::new(),
            created_at: at(0),
            updated_at: at(0),
        }
    }

    fn price(
        product_id: Uuid,
        slots: [Option<Uuid>; 3],
        amount: Decimal,
        minute: i64,
    ) -> ProductVariantPriceModel {
        ProductVariantPriceModel {
            id: Uuid::new_v4(),
            product_id,
            product_variant_one: slots[0],
            product_variant_two: slots[1],
            product_variant_three: slots[2],
            price: amount,
            stock: 5,
            created_at: at(minute),
            updated_at: at(minute),
        }
    }

    #[test]
    fn joins_titles_without_dangling_separators() {
        assert_eq!(compose_variant_title(["XL", "Red", "V-Neck"]), "XL / Red / V-Neck");
        assert_eq!(compose_variant_title(["XL", "", "V-Neck"]), "XL / V-Neck");
        assert_eq!(compose_variant_title(["", "Red", " "]), "Red");
        assert_eq!(compose_variant_title(Vec::<&str>::new()), "");
    }

    #[test]
    fn cards_carry_lines_and_groups() {
        let size = variant("Size");
        let color = variant("Color");
        let variants: HashMap<Uuid, VariantModel> =
            [(size.id, size.clone()), (color.id, color.clone())].into();

        let shirt = product("Shirt");
        let xl = option(shirt.id, &size, "XL", 1);
        let m = option(shirt.id, &size, "M", 2);
        let red = option(shirt.id, &color, "Red", 3);
        let options = vec![red.clone(), xl.clone(), m.clone()];
        let prices = vec![
            price(shirt.id, [Some(m.id), Some(red.id), None], dec!(19.99), 2),
            price(shirt.id, [Some(xl.id), None, Some(red.id)], dec!(24.50), 1),
        ];

        let cards = build_product_cards(vec![shirt.clone()], &options, &prices, &variants);
        assert_eq!(cards.len(), 1);
        let card = &cards[0];

        let titles: Vec<&str> = card.variants.iter().map(|l| l.variant_title.as_str()).collect();
        assert_eq!(titles, vec!["XL / Red", "M / Red"]);
        assert_eq!(card.variants[0].price, dec!(24.50));

        assert_eq!(card.options.len(), 2);
        assert_eq!(card.options[0].title, "Size");
        let sizes: Vec<&str> = card.options[0].options.iter().map(|o| o.title.as_str()).collect();
        assert_eq!(sizes, vec!["XL", "M"]);
        assert_eq!(card.options[1].title, "Color");
    }

    #[test]
    fn products_without_rows_get_empty_sections() {
        let cards = build_product_cards(vec![product("Mug")], &[], &[], &HashMap::new());
        assert!(cards[0].variants.is_empty());
        assert!(cards[0].options.is_empty());
    }

    #[test]
    fn catalog_map_is_sorted_and_deduplicated() {
        let size = variant("Size");
        let style = variant("Style");
        let a = product("A");
        let b = product("B");
        let options = vec![
            option(a.id, &size, "XL", 0),
            option(b.id, &size, "XL", 0),
            option(b.id, &size, "M", 0),
        ];

        let map = catalog_option_map(
            [&size, &style],
            options.iter().map(|o| (o.variant_id, o.variant_title.clone())),
        );
        assert_eq!(map["Size"], vec!["M".to_string(), "XL".to_string()]);
        assert!(map["Style"].is_empty());
    }

    #[test]
    fn combinations_follow_group_order() {
        let size = variant("Size");
        let color = variant("Color");
        let variants: HashMap<Uuid, VariantModel> =
            [(size.id, size.clone()), (color.id, color.clone())].into();
        let shirt = product("Shirt");
        let xl = option(shirt.id, &size, "XL", 1);
        let m = option(shirt.id, &size, "M", 2);
        let red = option(shirt.id, &color, "Red", 3);
        let blue = option(shirt.id, &color, "Blue", 4);

        let groups = group_options(&[&xl, &m, &red, &blue], &variants);
        let combos = combine_options(&groups);

        let titles: Vec<&str> = combos.iter().map(|c| c.variant_title.as_str()).collect();
        assert_eq!(titles, vec!["XL / Red", "XL / Blue", "M / Red", "M / Blue"]);
        assert_eq!(combos[0].product_variant_one, Some(xl.id));
        assert_eq!(combos[0].product_variant_two, Some(red.id));
        assert_eq!(combos[0].product_variant_three, None);
    }

    #[test]
    fn no_groups_means_no_combinations() {
        assert!(combine_options(&[]).is_empty());
    }

    proptest! {
        #[test]
        fn composed_title_never_has_dangling_separator(
            parts in proptest::collection::vec("[A-Za-z ]{0,6}", 0..4)
        ) {
            let title = compose_variant_title(parts.iter().map(String::as_str));
            prop_assert!(!title.starts_with(VARIANT_TITLE_SEPARATOR));
            prop_assert!(!title.ends_with(VARIANT_TITLE_SEPARATOR));
            prop_assert!(!title.contains(" /  / "));
        }

        #[test]
        fn combination_count_is_product_of_group_sizes(sizes in proptest::collection::vec(1usize..4, 1..4)) {
            let groups: Vec<OptionGroup> = sizes
                .iter()
                .enumerate()
                .map(|(g, n)| OptionGroup {
                    variant_id: Uuid::new_v4(),
                    title: format!("G{g}"),
                    options: (0..*n)
                        .map(|i| OptionValue { id: Uuid::new_v4(), title: format!("o{g}{i}") })
                        .collect(),
                })
                .collect();
            let expected: usize = sizes.iter().product();
            prop_assert_eq!(combine_options(&groups).len(), expected);
        }
    }
}
