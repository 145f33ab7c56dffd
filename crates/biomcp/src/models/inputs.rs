//! Input models for MCP tool parameters.
//!
//! Search inputs flatten the domain query so tool arguments and CLI-built
//! queries share one definition.

use serde::{Deserialize, Deserializer, Serialize};

use crate::articles::PubmedRequest;
use crate::formatters::ResponseFormat;
use crate::trials::TrialQuery;
use crate::variants::VariantQuery;

/// Input for `article_searcher`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArticleSearchInput {
    #[serde(flatten)]
    pub request: PubmedRequest,

    /// Output format.
    #[serde(default)]
    pub response_format: ResponseFormat,
}

/// Input for `article_details`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleDetailsInput {
    /// PubMed id, as a number or a numeric string.
    #[serde(deserialize_with = "pmid")]
    pub pmid: u64,

    /// Output format.
    #[serde(default)]
    pub response_format: ResponseFormat,
}

/// Input for `trial_searcher`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrialSearchInput {
    #[serde(flatten)]
    pub query: TrialQuery,

    /// Output format.
    #[serde(default)]
    pub response_format: ResponseFormat,
}

/// Input for the single-trial tools.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrialDetailInput {
    /// NCT id, e.g. `NCT04280705`.
    pub nct_id: String,

    /// Output format.
    #[serde(default)]
    pub response_format: ResponseFormat,
}

/// Input for `variant_searcher`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VariantSearchInput {
    #[serde(flatten)]
    pub query: VariantQuery,

    /// Output format.
    #[serde(default)]
    pub response_format: ResponseFormat,
}

/// Input for `variant_details`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariantDetailsInput {
    /// MyVariant.info id (`chr7:g.140453136A>T`) or rsID.
    pub variant_id: String,

    /// Output format.
    #[serde(default)]
    pub response_format: ResponseFormat,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(u64),
    Text(String),
}

/// Accept `34397683` or `"34397683"`.
fn pmid<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(n) => Ok(n),
        NumberOrString::Text(s) => s
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("invalid pmid '{s}'"))),
    }
}
