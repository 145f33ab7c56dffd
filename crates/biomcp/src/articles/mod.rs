//! Article search and retrieval through PubTator3.
//!
//! - [`autocomplete`]: normalize a concept term to a PubTator entity id
//! - [`search`]: structured search with abstracts attached
//! - [`fetch`]: title, abstract and full text for a set of PMIDs

pub mod autocomplete;
pub mod fetch;
pub mod search;

pub use autocomplete::{Concept, Entity, EntityRequest, autocomplete};
pub use fetch::{
    Article, ArticleRecord, FetchArticlesResponse, Passage, call_pubtator_api, fetch_articles,
};
pub use search::{
    PubmedRequest, PubtatorRequest, ResultItem, SearchResponse, convert_request, search_articles,
};
