//! PubTator3 entity autocomplete.
//!
//! Maps free text such as `BRAF` to a PubTator entity id (`@GENE_BRAF`) so
//! article searches hit normalized concepts instead of raw strings.

use serde::{Deserialize, Serialize};

use crate::models::api_enum;
use crate::tools::ToolContext;

api_enum! {
    /// Biomedical concept recognised by PubTator3. Declared in sorted order.
    pub enum Concept {
        Chemical => "chemical",
        Disease => "disease",
        Gene => "gene",
        Variant => "variant",
    }
}

/// Autocomplete request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntityRequest {
    /// Restrict matches to one concept.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub concept: Option<Concept>,
    /// Text to match.
    pub query: String,
    /// Maximum matches (1..=100).
    pub limit: u32,
}

impl EntityRequest {
    /// Request the single best match for `query`.
    #[must_use]
    pub fn new(concept: Option<Concept>, query: impl Into<String>) -> Self {
        Self {
            concept,
            query: query.into(),
            limit: 1,
        }
    }
}

/// A matched entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    /// Entity id in `@<BIOTYPE>_<name>` form.
    #[serde(rename = "_id")]
    pub entity_id: String,
    /// Concept of the entity.
    #[serde(rename = "biotype")]
    pub concept: Concept,
    /// Preferred name.
    pub name: String,
    /// Why the entity matched.
    #[serde(default, rename = "match")]
    pub match_reason: Option<String>,
}

impl PartialEq for Entity {
    fn eq(&self, other: &Self) -> bool {
        self.entity_id == other.entity_id
    }
}

/// Best matching entity, or `None` when the lookup fails or finds nothing.
pub async fn autocomplete(ctx: &ToolContext, request: &EntityRequest) -> Option<Entity> {
    let url = format!("{}/entity/autocomplete/", ctx.config.pubtator_url);
    let api_request = ctx.get(url).params_from(request).ok()?;

    match ctx.client.request::<Vec<Entity>>(&api_request).await {
        Ok(entities) => entities.into_iter().next(),
        Err(e) => {
            tracing::debug!(query = %request.query, error = %e, "Autocomplete lookup failed");
            None
        }
    }
}
