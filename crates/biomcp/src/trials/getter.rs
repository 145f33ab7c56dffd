//! Single-study retrieval from ClinicalTrials.gov.

use serde_json::{Map, Value, json};

use crate::client::TlsPolicy;
use crate::config::api::CT_GOV_STUDY_PAGE;
use crate::error::ToolResult;
use crate::formatters::{ResponseFormat, render_output};
use crate::models::api_enum;
use crate::tools::ToolContext;

api_enum! {
    /// Section of a study record to fetch.
    pub enum TrialModule {
        Protocol => "Protocol",
        Locations => "Locations",
        References => "References",
        Outcomes => "Outcomes",
    }
}

impl Default for TrialModule {
    fn default() -> Self {
        Self::Protocol
    }
}

impl TrialModule {
    /// Upstream module names requested through `fields`.
    #[must_use]
    pub const fn fields(self) -> &'static [&'static str] {
        match self {
            Self::Protocol => &[
                "IdentificationModule",
                "StatusModule",
                "SponsorCollaboratorsModule",
                "OversightModule",
                "DescriptionModule",
                "ConditionsModule",
                "DesignModule",
                "ArmsInterventionsModule",
                "EligibilityModule",
            ],
            Self::Locations => &["ContactsLocationsModule"],
            Self::References => &["ReferencesModule"],
            Self::Outcomes => &["OutcomesModule", "ResultsSection"],
        }
    }
}

/// Public study page for an NCT id.
#[must_use]
pub fn study_url(nct_id: &str) -> String {
    format!("{CT_GOV_STUDY_PAGE}/{nct_id}")
}

/// Fetch one module of a study as JSON.
///
/// Always yields an object: the study with a `URL` key added, or an
/// `error` object describing why nothing came back.
pub async fn fetch_trial(ctx: &ToolContext, nct_id: &str, module: TrialModule) -> Value {
    let url = format!("{}/{}", ctx.config.ctgov_url, nct_id);
    let request = ctx
        .get(url)
        .param("fields", module.fields().join(","))
        .tls(TlsPolicy::Tls12);

    tracing::debug!(nct_id, module = %module, "Fetching trial");

    match ctx.client.request::<Map<String, Value>>(&request).await {
        Ok(mut study) if !study.is_empty() => {
            study.insert("URL".into(), Value::String(study_url(nct_id)));
            Value::Object(study)
        }
        Ok(_) => json!({"error": format!("No data found for {nct_id} with module {module}")}),
        Err(e) => json!({"error": format!("API Error {}", e.code()), "details": e.message()}),
    }
}

/// Fetch one module of a study and render it.
pub async fn get_trial(
    ctx: &ToolContext,
    nct_id: &str,
    module: TrialModule,
    format: ResponseFormat,
) -> ToolResult<String> {
    let data = fetch_trial(ctx, nct_id, module).await;
    render_output(&data, format)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_fields() {
        assert_eq!(TrialModule::Protocol.fields().len(), 9);
        assert_eq!(
            TrialModule::Locations.fields(),
            &["ContactsLocationsModule"]
        );
        assert_eq!(
            TrialModule::Outcomes.fields().join(","),
            "OutcomesModule,ResultsSection"
        );
    }

    #[test]
    fn test_module_parse() {
        assert_eq!(
            "references".parse::<TrialModule>().unwrap(),
            TrialModule::References
        );
        assert_eq!(
            "OUTCOMES".parse::<TrialModule>().unwrap(),
            TrialModule::Outcomes
        );
        assert_eq!(TrialModule::default(), TrialModule::Protocol);
        assert!("arms".parse::<TrialModule>().is_err());
    }

    #[test]
    fn test_study_url() {
        assert_eq!(
            study_url("NCT04280705"),
            "https://clinicaltrials.gov/study/NCT04280705"
        );
    }
}
