//! MyVariant.info variant search.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::filters::filter_variants;
use super::links::inject_links;
use crate::config::api::SYSTEM_PAGE_SIZE;
use crate::error::{ToolError, ToolResult};
use crate::formatters::{ResponseFormat, error_list, render_output};
use crate::models::{api_enum, decimal};
use crate::tools::ToolContext;

/// Fields always requested from the query endpoint.
pub const MYVARIANT_FIELDS: &[&str] = &[
    "_id",
    "chrom",
    "vcf.position",
    "vcf.ref",
    "vcf.alt",
    "cadd.phred",
    "civic.id",
    "civic.openCravatUrl",
    "clinvar.rcv.clinical_significance",
    "clinvar.variant_id",
    "cosmic.cosmic_id",
    "dbnsfp.genename",
    "dbnsfp.hgvsc",
    "dbnsfp.hgvsp",
    "dbnsfp.polyphen2.hdiv.pred",
    "dbnsfp.polyphen2.hdiv.score",
    "dbnsfp.sift.pred",
    "dbnsfp.sift.score",
    "dbsnp.rsid",
    "exac.af",
    "gnomad_exome.af.af",
];

api_enum! {
    /// ClinVar clinical significance.
    pub enum ClinicalSignificance {
        Pathogenic => "pathogenic",
        LikelyPathogenic => "likely pathogenic",
        UncertainSignificance => "uncertain significance",
        LikelyBenign => "likely benign",
        Benign => "benign",
    }
}

api_enum! {
    /// PolyPhen-2 HDIV prediction code.
    pub enum PolyPhenPrediction {
        ProbablyDamaging => "D",
        PossiblyDamaging => "P",
        Benign => "B",
    }
}

api_enum! {
    /// SIFT prediction code.
    pub enum SiftPrediction {
        Deleterious => "D",
        Tolerated => "T",
    }
}

api_enum! {
    /// Annotation source whose full record should be included.
    pub enum VariantSource {
        Cadd => "cadd",
        Cgi => "cgi",
        Civic => "civic",
        Clinvar => "clinvar",
        Cosmic => "cosmic",
        Dbnsfp => "dbnsfp",
        Dbsnp => "dbsnp",
        Docm => "docm",
        Emv => "evm",
        Exac => "exac",
        GnomadExome => "gnomad_exome",
        Hg19 => "hg19",
        Mutdb => "mutdb",
        Snpeff => "snpeff",
        Vcf => "vcf",
    }
}

const fn default_size() -> u32 {
    SYSTEM_PAGE_SIZE
}

/// Variant search criteria.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantQuery {
    /// Gene symbol, e.g. `BRAF`.
    #[serde(default)]
    pub gene: Option<String>,
    /// Protein change, e.g. `p.V600E`.
    #[serde(default)]
    pub hgvsp: Option<String>,
    /// cDNA change, e.g. `c.1799T>A`.
    #[serde(default)]
    pub hgvsc: Option<String>,
    /// dbSNP id, e.g. `rs113488022`.
    #[serde(default)]
    pub rsid: Option<String>,
    /// Region as `chr:start-end`.
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub significance: Option<ClinicalSignificance>,
    /// Maximum gnomAD exome allele frequency.
    #[serde(default)]
    pub max_frequency: Option<f64>,
    /// Minimum gnomAD exome allele frequency.
    #[serde(default)]
    pub min_frequency: Option<f64>,
    /// Minimum CADD phred score.
    #[serde(default)]
    pub cadd: Option<f64>,
    #[serde(default)]
    pub polyphen: Option<PolyPhenPrediction>,
    #[serde(default)]
    pub sift: Option<SiftPrediction>,
    #[serde(default)]
    pub sources: Vec<VariantSource>,
    #[serde(default = "default_size")]
    pub size: u32,
    #[serde(default)]
    pub offset: u32,
}

impl Default for VariantQuery {
    fn default() -> Self {
        Self {
            gene: None,
            hgvsp: None,
            hgvsc: None,
            rsid: None,
            region: None,
            significance: None,
            max_frequency: None,
            min_frequency: None,
            cadd: None,
            polyphen: None,
            sift: None,
            sources: Vec::new(),
            size: default_size(),
            offset: 0,
        }
    }
}

impl VariantQuery {
    /// Query for a gene symbol.
    #[must_use]
    pub fn gene(gene: impl Into<String>) -> Self {
        Self {
            gene: Some(gene.into()),
            ..Self::default()
        }
    }

    /// Reject a query where every field is at its default.
    pub fn validate(&self) -> ToolResult<()> {
        if *self == Self::default() {
            return Err(ToolError::validation(
                "query",
                "At least one search parameter is required",
            ));
        }
        Ok(())
    }
}

/// Parameters sent to the query endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct MyVariantRequest {
    pub q: String,
    pub size: u32,
    pub from: u32,
    pub fields: String,
}

fn quoted(field: &str, value: Option<&str>) -> Option<String> {
    value.map(|v| format!("{field}:\"{v}\""))
}

fn ranged(field: &str, operator: &str, value: Option<f64>) -> Option<String> {
    value.map(|v| format!("{field}:{operator}{}", decimal(v)))
}

/// Build the Lucene-style `q` string, `*` when nothing is set.
#[must_use]
pub fn build_query_string(query: &VariantQuery) -> String {
    let mut parts: Vec<String> = [&query.region, &query.rsid]
        .into_iter()
        .flatten()
        .filter(|s| !s.is_empty())
        .cloned()
        .collect();

    parts.extend(
        [
            quoted("dbnsfp.genename", query.gene.as_deref()),
            quoted("dbnsfp.hgvsp", query.hgvsp.as_deref()),
            quoted("dbnsfp.hgvsc", query.hgvsc.as_deref()),
            quoted("dbsnp.rsid", query.rsid.as_deref()),
            quoted(
                "clinvar.rcv.clinical_significance",
                query.significance.map(ClinicalSignificance::as_str),
            ),
            ranged("gnomad_exome.af.af", "<=", query.max_frequency),
            ranged("gnomad_exome.af.af", ">=", query.min_frequency),
            ranged("cadd.phred", ">=", query.cadd),
            quoted(
                "dbnsfp.polyphen2.hdiv.pred",
                query.polyphen.map(PolyPhenPrediction::as_str),
            ),
            quoted("dbnsfp.sift.pred", query.sift.map(SiftPrediction::as_str)),
        ]
        .into_iter()
        .flatten(),
    );

    if parts.is_empty() {
        "*".to_string()
    } else {
        parts.join(" AND ")
    }
}

/// Translate a query into MyVariant.info parameters.
#[must_use]
pub fn convert_query(query: &VariantQuery) -> MyVariantRequest {
    let mut fields: Vec<String> = MYVARIANT_FIELDS
        .iter()
        .map(ToString::to_string)
        .collect();
    fields.extend(query.sources.iter().map(|source| format!("{source}.*")));

    MyVariantRequest {
        q: build_query_string(query),
        size: query.size,
        from: query.offset,
        fields: fields.join(","),
    }
}

/// Search variants and render the hits with links added and noisy paths removed.
pub async fn search_variants(
    ctx: &ToolContext,
    query: &VariantQuery,
    format: ResponseFormat,
) -> ToolResult<String> {
    let params = convert_query(query);
    tracing::debug!(q = %params.q, "Searching MyVariant.info");

    let url = format!("{}/query", ctx.config.myvariant_url);
    let result = match ctx.get(url).params_from(&params) {
        Ok(request) => ctx.client.request_value(&request).await,
        Err(e) => Err(e),
    };

    let data = match result {
        Ok(mut response) => {
            let mut hits = match response.get_mut("hits").map(Value::take) {
                Some(Value::Array(hits)) => hits,
                _ => Vec::new(),
            };
            inject_links(&mut hits);
            Value::Array(filter_variants(hits))
        }
        Err(e) => error_list(&e),
    };

    render_output(&data, format)
}
