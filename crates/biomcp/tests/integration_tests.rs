//! Integration tests for BioMCP.
//!
//! These tests hit the real PubTator3, ClinicalTrials.gov and MyVariant.info APIs.
//! Run with: `cargo test --features integration -- --nocapture`

#![cfg(feature = "integration")]

use serde_json::Value;

use biomcp::articles::{self, PubmedRequest};
use biomcp::config::{CacheBackend, Config};
use biomcp::formatters::ResponseFormat;
use biomcp::tools::ToolContext;
use biomcp::trials::{self, TrialModule, TrialQuery};
use biomcp::variants::{self, VariantQuery};

/// Well-known identifiers.
mod ids {
    /// Adaptive COVID-19 Treatment Trial
    pub const ACTT: &str = "NCT04280705";
    /// Vemurafenib in BRAF V600E melanoma (Chapman et al. 2011)
    pub const VEMURAFENIB_PMID: u64 = 21717063;
    /// BRAF V600E
    pub const BRAF_V600E: &str = "rs113488022";
}

fn create_context() -> ToolContext {
    let config = Config {
        cache_backend: CacheBackend::Memory,
        ..Config::default()
    };
    ToolContext::from_config(config).expect("Failed to create context")
}

fn parse(text: &str) -> Value {
    serde_json::from_str(text).expect("tool output should be JSON")
}

// =============================================================================
// Articles
// =============================================================================

#[tokio::test]
async fn test_article_search_braf_melanoma() {
    let ctx = create_context();
    let request = PubmedRequest {
        genes: vec!["BRAF".into()],
        diseases: vec!["Melanoma".into()],
        ..PubmedRequest::default()
    };

    let text = articles::search_articles(&ctx, &request, ResponseFormat::Json)
        .await
        .unwrap();
    let records = parse(&text);
    let records = records.as_array().unwrap();
    assert!(!records.is_empty());
    assert!(records[0].get("error").is_none(), "{:?}", records[0]);
    assert!(records[0]["pubmed_url"].is_string());
}

#[tokio::test]
async fn test_article_fetch_by_pmid() {
    let ctx = create_context();
    let pmids = [ids::VEMURAFENIB_PMID];
    let text = articles::fetch_articles(&ctx, &pmids, false, ResponseFormat::Json)
        .await
        .unwrap();
    let records = parse(&text);
    assert_eq!(records[0]["pmid"], ids::VEMURAFENIB_PMID);
    let title = records[0]["title"].as_str().unwrap().to_lowercase();
    assert!(title.contains("vemurafenib"));
}

// =============================================================================
// Trials
// =============================================================================

#[tokio::test]
async fn test_trial_search_melanoma() {
    let ctx = create_context();
    let query = TrialQuery {
        conditions: vec!["melanoma".into()],
        ..TrialQuery::default()
    };

    let text = trials::search_trials(&ctx, &query, ResponseFormat::Json)
        .await
        .unwrap();
    let rows = parse(&text);
    let rows = rows.as_array().expect("CSV rows");
    assert!(!rows.is_empty());
    assert!(rows[0]["NCT Number"].as_str().unwrap().starts_with("NCT"));
}

#[tokio::test]
async fn test_trial_protocol() {
    let ctx = create_context();
    let study = trials::fetch_trial(&ctx, ids::ACTT, TrialModule::Protocol).await;

    assert!(study.get("error").is_none(), "{study:?}");
    assert_eq!(
        study["URL"],
        format!("https://clinicaltrials.gov/study/{}", ids::ACTT)
    );
    assert_eq!(
        study["protocolSection"]["identificationModule"]["nctId"],
        ids::ACTT
    );
}

// =============================================================================
// Variants
// =============================================================================

#[tokio::test]
async fn test_variant_search_braf() {
    let ctx = create_context();
    let query = VariantQuery {
        size: 5,
        ..VariantQuery::gene("BRAF")
    };

    let text = variants::search_variants(&ctx, &query, ResponseFormat::Json)
        .await
        .unwrap();
    let hits = parse(&text);
    let hits = hits.as_array().unwrap();
    assert!(!hits.is_empty());
    assert!(hits.len() <= 5);
}

#[tokio::test]
async fn test_variant_details_rsid() {
    let ctx = create_context();
    let text = variants::get_variant(&ctx, ids::BRAF_V600E, ResponseFormat::Json)
        .await
        .unwrap();
    let records = parse(&text);

    let first = &records[0];
    assert!(first.get("error").is_none(), "{first:?}");
    assert_eq!(
        first["dbsnp"]["url"],
        "https://www.ncbi.nlm.nih.gov/snp/rs113488022"
    );
}
