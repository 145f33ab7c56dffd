//! Article tools: article_searcher, article_details.

use serde_json::json;

use super::{McpTool, ToolContext, response_format_schema};
use crate::articles::{fetch_articles, search_articles};
use crate::error::ToolResult;
use crate::models::{ArticleDetailsInput, ArticleSearchInput};

fn string_list_schema(description: &str) -> serde_json::Value {
    json!({
        "anyOf": [
            {"type": "string"},
            {"type": "array", "items": {"type": "string"}}
        ],
        "description": description
    })
}

/// PubTator3 article search tool.
pub struct ArticleSearcherTool;

#[async_trait::async_trait]
impl McpTool for ArticleSearcherTool {
    fn name(&self) -> &'static str {
        "article_searcher"
    }

    fn description(&self) -> &'static str {
        "Search PubMed articles by chemicals, diseases, genes, variants and keywords. \
         Prefer full terms (\"Non-small cell lung carcinoma\") over abbreviations (\"NSCLC\"). \
         Returns up to 40 articles with PMID, title, abstract and links."
    }

    fn input_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "chemicals": string_list_schema("Chemicals, e.g. Cisplatin"),
                "diseases": string_list_schema("Diseases, e.g. Lung Adenocarcinoma"),
                "genes": string_list_schema("Genes, e.g. BRAF"),
                "keywords": string_list_schema("Other terms that fit no other category"),
                "variants": string_list_schema("Variants, e.g. BRAF V600E"),
                "response_format": response_format_schema()
            }
        })
    }

    async fn execute(&self, ctx: &ToolContext, input: serde_json::Value) -> ToolResult<String> {
        let params: ArticleSearchInput = serde_json::from_value(input)?;
        search_articles(ctx, &params.request, params.response_format).await
    }
}

/// Single-article retrieval tool (title, abstract and full text).
pub struct ArticleDetailsTool;

#[async_trait::async_trait]
impl McpTool for ArticleDetailsTool {
    fn name(&self) -> &'static str {
        "article_details"
    }

    fn description(&self) -> &'static str {
        "Retrieve one PubMed article by PMID (e.g. 34397683): title, abstract and full text \
         when available, via the PubTator3 export API."
    }

    fn input_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "pmid": {
                    "anyOf": [{"type": "integer"}, {"type": "string"}],
                    "description": "PubMed ID"
                },
                "response_format": response_format_schema()
            },
            "required": ["pmid"]
        })
    }

    async fn execute(&self, ctx: &ToolContext, input: serde_json::Value) -> ToolResult<String> {
        let params: ArticleDetailsInput = serde_json::from_value(input)?;
        fetch_articles(ctx, &[params.pmid], true, params.response_format).await
    }
}
