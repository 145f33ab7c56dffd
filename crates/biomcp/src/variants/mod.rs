//! Genetic variant search and retrieval (MyVariant.info).

pub mod filters;
pub mod getter;
pub mod links;
pub mod search;

pub use filters::{PATH_FILTERS, filter_variants};
pub use getter::get_variant;
pub use links::inject_links;
pub use search::{
    ClinicalSignificance, PolyPhenPrediction, SiftPrediction, VariantQuery, VariantSource,
    build_query_string, convert_query, search_variants,
};
