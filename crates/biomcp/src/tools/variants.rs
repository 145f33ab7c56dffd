//! Variant tools: variant_searcher, variant_details.

use serde_json::json;

use super::{McpTool, ToolContext, response_format_schema};
use crate::error::{ToolError, ToolResult};
use crate::models::{VariantDetailsInput, VariantSearchInput};
use crate::variants::{
    ClinicalSignificance, PolyPhenPrediction, SiftPrediction, VariantSource, get_variant,
    search_variants,
};

fn codes(all: &[impl std::fmt::Display]) -> Vec<String> {
    all.iter().map(ToString::to_string).collect()
}

/// MyVariant.info search tool.
pub struct VariantSearcherTool;

#[async_trait::async_trait]
impl McpTool for VariantSearcherTool {
    fn name(&self) -> &'static str {
        "variant_searcher"
    }

    fn description(&self) -> &'static str {
        "Search genetic variants in MyVariant.info by gene, HGVS notation, rsID, region, \
         ClinVar significance, population frequency, CADD score and PolyPhen/SIFT predictions. \
         At least one criterion is required."
    }

    fn input_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "gene": {"type": "string", "description": "Gene symbol, e.g. BRAF"},
                "hgvsp": {"type": "string", "description": "Protein change, e.g. p.V600E"},
                "hgvsc": {"type": "string", "description": "cDNA change, e.g. c.1799T>A"},
                "rsid": {"type": "string", "description": "dbSNP rsID, e.g. rs113488022"},
                "region": {"type": "string", "description": "Genomic region chr:start-end"},
                "significance": {
                    "type": "string",
                    "enum": codes(ClinicalSignificance::ALL),
                    "description": "ClinVar clinical significance"
                },
                "max_frequency": {
                    "type": "number",
                    "description": "Maximum gnomAD exome allele frequency"
                },
                "min_frequency": {
                    "type": "number",
                    "description": "Minimum gnomAD exome allele frequency"
                },
                "cadd": {"type": "number", "description": "Minimum CADD phred score"},
                "polyphen": {
                    "type": "string",
                    "enum": codes(PolyPhenPrediction::ALL),
                    "description": "PolyPhen-2 prediction (D, P, B)"
                },
                "sift": {
                    "type": "string",
                    "enum": codes(SiftPrediction::ALL),
                    "description": "SIFT prediction (D, T)"
                },
                "sources": {
                    "type": "array",
                    "items": {"type": "string", "enum": codes(VariantSource::ALL)},
                    "description": "Sources whose full annotations to include"
                },
                "size": {"type": "integer", "default": 40, "description": "Number of results"},
                "offset": {"type": "integer", "default": 0, "description": "Result offset"},
                "response_format": response_format_schema()
            }
        })
    }

    async fn execute(&self, ctx: &ToolContext, input: serde_json::Value) -> ToolResult<String> {
        let params: VariantSearchInput = serde_json::from_value(input)?;
        params.query.validate()?;
        search_variants(ctx, &params.query, params.response_format).await
    }
}

/// Single-variant retrieval tool.
pub struct VariantDetailsTool;

#[async_trait::async_trait]
impl McpTool for VariantDetailsTool {
    fn name(&self) -> &'static str {
        "variant_details"
    }

    fn description(&self) -> &'static str {
        "Retrieve every annotation for one variant (e.g. chr7:g.140453136A>T or rs113488022): \
         genomic context, frequencies, predictions and clinical data. Use variant_searcher to \
         find the id first."
    }

    fn input_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "variant_id": {"type": "string", "description": "MyVariant.info id or rsID"},
                "response_format": response_format_schema()
            },
            "required": ["variant_id"]
        })
    }

    async fn execute(&self, ctx: &ToolContext, input: serde_json::Value) -> ToolResult<String> {
        let params: VariantDetailsInput = serde_json::from_value(input)?;
        let variant_id = params.variant_id.trim();
        if variant_id.is_empty() {
            return Err(ToolError::validation("variant_id", "must not be empty"));
        }
        get_variant(ctx, variant_id, params.response_format).await
    }
}
