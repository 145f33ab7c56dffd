//! PubTator3 article search.

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::autocomplete::{Concept, EntityRequest, autocomplete};
use super::fetch::{call_pubtator_api, pmc_url, pubmed_url};
use crate::config::api::SYSTEM_PAGE_SIZE;
use crate::error::{RequestResult, ToolResult};
use crate::formatters::{ResponseFormat, error_list, render_output};
use crate::models::string_list;
use crate::tools::ToolContext;

/// Author lists longer than this collapse to first, ellipsis, last.
const MAX_AUTHORS: usize = 4;

/// Structured article search criteria.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PubmedRequest {
    /// Chemicals, e.g. `Cisplatin`.
    #[serde(default, deserialize_with = "string_list")]
    pub chemicals: Vec<String>,
    /// Diseases, e.g. `Lung Adenocarcinoma`.
    #[serde(default, deserialize_with = "string_list")]
    pub diseases: Vec<String>,
    /// Genes, e.g. `BRAF`.
    #[serde(default, deserialize_with = "string_list")]
    pub genes: Vec<String>,
    /// Free-text keywords.
    #[serde(default, deserialize_with = "string_list")]
    pub keywords: Vec<String>,
    /// Variants, e.g. `BRAF V600E`.
    #[serde(default, deserialize_with = "string_list")]
    pub variants: Vec<String>,
}

impl PubmedRequest {
    fn values(&self, concept: Concept) -> &[String] {
        match concept {
            Concept::Chemical => &self.chemicals,
            Concept::Disease => &self.diseases,
            Concept::Gene => &self.genes,
            Concept::Variant => &self.variants,
        }
    }

    /// `(concept, value)` pairs in concept order.
    pub fn iter_concepts(&self) -> impl Iterator<Item = (Concept, &str)> {
        Concept::ALL.iter().flat_map(move |&concept| {
            self.values(concept)
                .iter()
                .map(move |value| (concept, value.as_str()))
        })
    }

    /// Whether no criteria were given.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty() && Concept::ALL.iter().all(|&c| self.values(c).is_empty())
    }
}

/// Query sent to the PubTator3 search endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PubtatorRequest {
    /// Boolean query text.
    pub text: String,
    /// Page size.
    pub size: u32,
}

/// One search hit.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResultItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pmid: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pmcid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub journal: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authors: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doi: Option<String>,
    #[serde(default, rename = "abstract", skip_serializing_if = "Option::is_none")]
    pub abstract_text: Option<String>,
}

impl ResultItem {
    /// Record with derived links, as handed to the renderer.
    fn to_record(&self) -> ToolResult<Value> {
        let mut record = match serde_json::to_value(self)? {
            Value::Object(map) => map,
            _ => Map::new(),
        };

        if let Some(pmid) = self.pmid.filter(|&p| p > 0) {
            record.insert("pubmed_url".into(), Value::String(pubmed_url(pmid)));
        }
        if let Some(pmcid) = self.pmcid.as_deref().filter(|s| !s.is_empty()) {
            record.insert("pmc_url".into(), Value::String(pmc_url(pmcid)));
        }
        if let Some(doi) = self.doi.as_deref().filter(|s| !s.is_empty()) {
            let doi_url = format!("https://doi.org/{doi}");
            record.insert("doi_url".into(), Value::String(doi_url));
        }

        clean_authors(&mut record);
        Ok(Value::Object(record))
    }
}

/// Search endpoint response.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    pub results: Vec<ResultItem>,
    pub page_size: u32,
    pub current: u32,
    pub count: u64,
    pub total_pages: u32,
}

/// Keep only the first and last author when there are more than four.
pub fn clean_authors(record: &mut Map<String, Value>) {
    if let Some(Value::Array(authors)) = record.get_mut("authors") {
        if authors.len() > MAX_AUTHORS {
            let first = authors[0].clone();
            let last = authors[authors.len() - 1].clone();
            *authors = vec![first, Value::String("...".into()), last];
        }
    }
}

/// Build the PubTator query.
///
/// Keywords come first, then each concept value (in concept order) replaced
/// by its entity id when autocomplete finds one. Lookups run concurrently.
pub async fn convert_request(ctx: &ToolContext, request: &PubmedRequest) -> PubtatorRequest {
    let lookups = request.iter_concepts().map(move |(concept, value)| async move {
        let entity = autocomplete(ctx, &EntityRequest::new(Some(concept), value)).await;
        entity.map_or_else(|| value.to_string(), |e| e.entity_id)
    });

    let mut parts = request.keywords.clone();
    parts.extend(join_all(lookups).await);

    PubtatorRequest {
        text: parts.join(" AND "),
        size: SYSTEM_PAGE_SIZE,
    }
}

/// Fill in abstracts from the export API. Failures leave abstracts empty.
async fn add_abstracts(ctx: &ToolContext, response: &mut SearchResponse) {
    let pmids: Vec<u64> = response
        .results
        .iter()
        .filter_map(|r| r.pmid)
        .filter(|&p| p > 0)
        .collect();
    if pmids.is_empty() {
        return;
    }

    match call_pubtator_api(ctx, &pmids, false).await {
        Ok(abstracts) => {
            for result in &mut response.results {
                result.abstract_text = result
                    .pmid
                    .and_then(|pmid| abstracts.get_abstract(pmid));
            }
        }
        Err(e) => tracing::warn!(error = %e, "Could not fetch abstracts"),
    }
}

/// Run the search and return typed results with abstracts attached.
pub async fn search(ctx: &ToolContext, request: &PubmedRequest) -> RequestResult<SearchResponse> {
    let pubtator_request = convert_request(ctx, request).await;
    tracing::debug!(text = %pubtator_request.text, "Searching PubTator3");

    let url = format!("{}/search/", ctx.config.pubtator_url);
    let api_request = ctx.get(url).params_from(&pubtator_request)?;
    let mut response: SearchResponse = ctx.client.request(&api_request).await?;

    add_abstracts(ctx, &mut response).await;
    Ok(response)
}

/// Search articles and render the results.
pub async fn search_articles(
    ctx: &ToolContext,
    request: &PubmedRequest,
    format: ResponseFormat,
) -> ToolResult<String> {
    let data = match search(ctx, request).await {
        Ok(response) => {
            let records = response
                .results
                .iter()
                .map(ResultItem::to_record)
                .collect::<ToolResult<Vec<_>>>()?;
            Value::Array(records)
        }
        Err(e) => error_list(&e),
    };

    render_output(&data, format)
}
