//! Product list filtering, pagination and display reshaping.
pub mod display;
pub mod filter;
pub mod pagination;

pub use display::{
    build_product_cards, catalog_option_map, combine_options, compose_variant_title,
    group_options, Combination, OptionGroup, OptionValue, ProductCard, VariantLine,
};
pub use filter::{ProductFilter, ProductListParams};
pub use pagination::Page;
