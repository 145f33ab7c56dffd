//! Trial tools: trial_searcher, trial_protocol, trial_locations,
//! trial_outcomes, trial_references.

use serde_json::json;

use super::{McpTool, ToolContext, response_format_schema};
use crate::error::{ToolError, ToolResult};
use crate::models::{TrialDetailInput, TrialSearchInput};
use crate::trials::{
    AgeGroup, DateField, InterventionType, PrimaryPurpose, RecruitingStatus, SortOrder,
    SponsorType, StudyDesign, StudyType, TrialModule, TrialPhase, get_trial, search_trials,
};

fn codes(all: &[impl std::fmt::Display]) -> Vec<String> {
    all.iter().map(ToString::to_string).collect()
}

fn choice(all: &[impl std::fmt::Display], description: &str) -> serde_json::Value {
    json!({"type": "string", "enum": codes(all), "description": description})
}

fn string_list(description: &str) -> serde_json::Value {
    json!({
        "anyOf": [
            {"type": "string"},
            {"type": "array", "items": {"type": "string"}}
        ],
        "description": description
    })
}

/// ClinicalTrials.gov search tool.
pub struct TrialSearcherTool;

#[async_trait::async_trait]
impl McpTool for TrialSearcherTool {
    fn name(&self) -> &'static str {
        "trial_searcher"
    }

    fn description(&self) -> &'static str {
        "Search ClinicalTrials.gov by condition, intervention, terms, location, dates, phase, \
         and design. Defaults to trials that are open for enrollment. Returns up to 40 studies \
         and a page token for the next page."
    }

    fn input_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "conditions": string_list("Condition terms, e.g. breast cancer"),
                "terms": string_list("General search terms"),
                "interventions": string_list("Intervention names, e.g. pembrolizumab"),
                "recruiting_status": choice(
                    RecruitingStatus::ALL,
                    "Recruitment status (default OPEN)"
                ),
                "study_type": choice(StudyType::ALL, "Type of study"),
                "nct_ids": string_list("Clinical trial NCT IDs"),
                "lat": {"type": "number", "description": "Latitude for location search"},
                "long": {"type": "number", "description": "Longitude for location search"},
                "distance": {
                    "type": "integer",
                    "description": "Distance from lat/long in miles (default 50)"
                },
                "min_date": {"type": "string", "description": "Minimum date (YYYY-MM-DD)"},
                "max_date": {"type": "string", "description": "Maximum date (YYYY-MM-DD)"},
                "date_field": choice(DateField::ALL, "Date field the range applies to"),
                "phase": choice(TrialPhase::ALL, "Trial phase"),
                "age_group": choice(AgeGroup::ALL, "Participant age group"),
                "primary_purpose": choice(PrimaryPurpose::ALL, "Primary purpose"),
                "intervention_type": choice(InterventionType::ALL, "Intervention type"),
                "sponsor_type": choice(SponsorType::ALL, "Lead sponsor type"),
                "study_design": choice(StudyDesign::ALL, "Allocation design"),
                "sort": choice(SortOrder::ALL, "Sort order (default RELEVANCE)"),
                "next_page_hash": {
                    "type": "string",
                    "description": "Page token from a previous search"
                },
                "response_format": response_format_schema()
            }
        })
    }

    async fn execute(&self, ctx: &ToolContext, input: serde_json::Value) -> ToolResult<String> {
        let params: TrialSearchInput = serde_json::from_value(input)?;
        search_trials(ctx, &params.query, params.response_format).await
    }
}

fn detail_schema() -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "nct_id": {"type": "string", "description": "NCT ID, e.g. NCT04280705"},
            "response_format": response_format_schema()
        },
        "required": ["nct_id"]
    })
}

async fn run_detail(
    ctx: &ToolContext,
    input: serde_json::Value,
    module: TrialModule,
) -> ToolResult<String> {
    let params: TrialDetailInput = serde_json::from_value(input)?;
    let nct_id = params.nct_id.trim();
    if nct_id.is_empty() {
        return Err(ToolError::validation("nct_id", "must not be empty"));
    }
    get_trial(ctx, nct_id, module, params.response_format).await
}

macro_rules! trial_detail_tool {
    ($tool:ident, $name:literal, $module:expr, $description:literal) => {
        #[doc = concat!("`", $name, "` tool.")]
        pub struct $tool;

        #[async_trait::async_trait]
        impl McpTool for $tool {
            fn name(&self) -> &'static str {
                $name
            }

            fn description(&self) -> &'static str {
                $description
            }

            fn input_schema(&self) -> serde_json::Value {
                detail_schema()
            }

            async fn execute(
                &self,
                ctx: &ToolContext,
                input: serde_json::Value,
            ) -> ToolResult<String> {
                run_detail(ctx, input, $module).await
            }
        }
    };
}

trial_detail_tool!(
    TrialProtocolTool,
    "trial_protocol",
    TrialModule::Protocol,
    "Retrieve the core protocol of one trial by NCT ID: identification, status, sponsor, \
     description, conditions, design, arms and interventions, eligibility."
);

trial_detail_tool!(
    TrialLocationsTool,
    "trial_locations",
    TrialModule::Locations,
    "Retrieve facility locations and contacts of one trial by NCT ID."
);

trial_detail_tool!(
    TrialOutcomesTool,
    "trial_outcomes",
    TrialModule::Outcomes,
    "Retrieve outcome measures, posted results and adverse events of one trial by NCT ID."
);

trial_detail_tool!(
    TrialReferencesTool,
    "trial_references",
    TrialModule::References,
    "Retrieve publications and other references of one trial by NCT ID, including PMIDs."
);
