//! Reachability checks for every upstream endpoint.
//!
//! Each endpoint gets one uncached request with a small, known-good query.
//! The checks run concurrently and never fail: an unreachable endpoint is
//! reported with its status (599 for transport failures) and error text.

use futures::future::join_all;
use serde::Serialize;
use serde_json::{Map, Value, json};

use crate::client::{HttpClient, TlsPolicy};
use crate::config::Config;
use crate::error::ToolResult;
use crate::formatters::{ResponseFormat, render_output};
use crate::tools::ToolContext;

/// Longest response excerpt kept in a status.
pub const CONTENT_LIMIT: usize = 500;

/// One upstream endpoint and the query used to exercise it.
#[derive(Debug, Clone, PartialEq)]
pub struct Endpoint {
    pub name: &'static str,
    pub url: String,
    pub params: Map<String, Value>,
}

impl Endpoint {
    fn new(name: &'static str, url: String, params: &Value) -> Self {
        Self {
            name,
            url,
            params: params.as_object().cloned().unwrap_or_default(),
        }
    }
}

/// Outcome of checking one endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EndpointStatus {
    pub name: String,
    pub url: String,
    pub status: u16,
    pub accessible: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

/// Endpoints exercised by the health check, in report order.
#[must_use]
pub fn endpoints(config: &Config) -> Vec<Endpoint> {
    let pubtator = &config.pubtator_url;
    let ctgov = &config.ctgov_url;
    let myvariant = &config.myvariant_url;

    vec![
        Endpoint::new(
            "PubTator3 Autocomplete",
            format!("{pubtator}/entity/autocomplete/"),
            &json!({"query": "BRAF", "concept": "gene", "limit": 2}),
        ),
        Endpoint::new(
            "PubTator3 Publications",
            format!("{pubtator}/publications/export/biocjson"),
            &json!({"pmids": "29355051", "full": "false"}),
        ),
        Endpoint::new(
            "PubTator3 Search",
            format!("{pubtator}/search/"),
            &json!({"text": "@CHEMICAL_remdesivir", "page": 1, "size": 1}),
        ),
        Endpoint::new(
            "ClinicalTrials.gov Search API",
            ctgov.clone(),
            &json!({"query.term": "cancer", "pageSize": "1"}),
        ),
        Endpoint::new(
            "ClinicalTrials.gov Study API",
            format!("{ctgov}/NCT04280705"),
            &json!({"fields": "IdentificationModule,StatusModule"}),
        ),
        Endpoint::new(
            "MyVariant.info Query API",
            format!("{myvariant}/query"),
            &json!({"q": "rs113488022", "size": 1}),
        ),
        Endpoint::new(
            "MyVariant.info Variant API",
            format!("{myvariant}/variant/rs113488022"),
            &json!({"fields": "all"}),
        ),
    ]
}

/// Issue one request against `endpoint` and summarize the answer.
pub async fn check_endpoint(client: &HttpClient, endpoint: &Endpoint) -> EndpointStatus {
    let raw = client
        .fetch_raw("GET", &endpoint.url, &endpoint.params, TlsPolicy::Negotiate)
        .await;
    let accessible = raw.status == 200;

    tracing::debug!(
        endpoint = endpoint.name,
        status = raw.status,
        "Health check"
    );

    EndpointStatus {
        name: endpoint.name.to_string(),
        url: endpoint.url.clone(),
        status: raw.status,
        accessible,
        message: if accessible {
            "OK".to_string()
        } else {
            format!("Error: HTTP {}", raw.status)
        },
        content: Some(raw.body.chars().take(CONTENT_LIMIT).collect()),
    }
}

/// Check every endpoint concurrently.
pub async fn check_all(ctx: &ToolContext) -> Vec<EndpointStatus> {
    let endpoints = endpoints(&ctx.config);
    let checks = endpoints.iter().map(|e| check_endpoint(&ctx.client, e));
    join_all(checks).await
}

/// Render the health report.
///
/// Response excerpts are kept only for failing endpoints, and only when
/// `verbose` is set.
pub async fn health_report(
    ctx: &ToolContext,
    verbose: bool,
    format: ResponseFormat,
) -> ToolResult<String> {
    let mut statuses = check_all(ctx).await;
    for status in &mut statuses {
        if status.accessible || !verbose {
            status.content = None;
        }
    }

    let healthy = statuses.iter().all(|s| s.accessible);
    if !healthy {
        tracing::warn!("Some upstream endpoints are unreachable");
    }

    let report = json!({ "healthy": healthy, "endpoints": statuses });
    render_output(&report, format)
}
