//! ClinicalTrials.gov v2 study search.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::client::TlsPolicy;
use crate::config::api::SYSTEM_PAGE_SIZE;
use crate::error::ToolResult;
use crate::formatters::{ResponseFormat, error_payload, render_output};
use crate::models::{api_enum, decimal, string_list};
use crate::tools::ToolContext;

/// Geo search radius used when only coordinates are given.
pub const DEFAULT_DISTANCE_MILES: u32 = 50;

/// Statuses of trials still accepting participants.
pub const OPEN_STATUSES: &[&str] =
    &["AVAILABLE", "ENROLLING_BY_INVITATION", "NOT_YET_RECRUITING", "RECRUITING"];

/// Statuses of trials no longer accepting participants.
pub const CLOSED_STATUSES: &[&str] =
    &["ACTIVE_NOT_RECRUITING", "COMPLETED", "SUSPENDED", "TERMINATED", "WITHDRAWN"];

/// CSV columns requested from the search endpoint.
pub const SEARCH_FIELDS: &[&str] = &[
    "NCT Number",
    "Study Title",
    "Study URL",
    "Study Status",
    "Brief Summary",
    "Study Results",
    "Conditions",
    "Interventions",
    "Phases",
    "Enrollment",
    "Study Type",
    "Study Design",
    "Start Date",
    "Completion Date",
];

api_enum! {
    /// Result ordering.
    pub enum SortOrder {
        Relevance => "RELEVANCE",
        LastUpdate => "LAST_UPDATE",
        Enrollment => "ENROLLMENT",
        StartDate => "START_DATE",
        CompletionDate => "COMPLETION_DATE",
        SubmittedDate => "SUBMITTED_DATE",
    }
}

impl SortOrder {
    /// `sort` parameter value.
    #[must_use]
    pub const fn ctgov_value(self) -> &'static str {
        match self {
            Self::Relevance => "@relevance",
            Self::LastUpdate => "LastUpdatePostDate:desc",
            Self::Enrollment => "EnrollmentCount:desc",
            Self::StartDate => "StudyStartDate:desc",
            Self::CompletionDate => "PrimaryCompletionDate:desc",
            Self::SubmittedDate => "StudyFirstSubmitDate:desc",
        }
    }
}

api_enum! {
    /// Trial phase.
    pub enum TrialPhase {
        EarlyPhase1 => "EARLY_PHASE1",
        Phase1 => "PHASE1",
        Phase2 => "PHASE2",
        Phase3 => "PHASE3",
        Phase4 => "PHASE4",
        NotApplicable => "NOT_APPLICABLE",
    }
}

api_enum! {
    /// Coarse recruitment filter.
    pub enum RecruitingStatus {
        Open => "OPEN",
        Closed => "CLOSED",
        Any => "ANY",
    }
}

impl RecruitingStatus {
    /// Upstream statuses covered, `None` for no filter.
    #[must_use]
    pub const fn statuses(self) -> Option<&'static [&'static str]> {
        match self {
            Self::Open => Some(OPEN_STATUSES),
            Self::Closed => Some(CLOSED_STATUSES),
            Self::Any => None,
        }
    }
}

api_enum! {
    /// Study type.
    pub enum StudyType {
        Interventional => "INTERVENTIONAL",
        Observational => "OBSERVATIONAL",
        ExpandedAccess => "EXPANDED_ACCESS",
        Other => "OTHER",
    }
}

impl StudyType {
    /// Value used in `AREA[StudyType]`.
    #[must_use]
    pub const fn ctgov_value(self) -> &'static str {
        match self {
            Self::Interventional => "Interventional",
            Self::Observational => "Observational",
            Self::ExpandedAccess => "Expanded Access",
            Self::Other => "Other",
        }
    }
}

api_enum! {
    /// Intervention type.
    pub enum InterventionType {
        Drug => "DRUG",
        Device => "DEVICE",
        Biological => "BIOLOGICAL",
        Procedure => "PROCEDURE",
        Radiation => "RADIATION",
        Behavioral => "BEHAVIORAL",
        Genetic => "GENETIC",
        Dietary => "DIETARY",
        DiagnosticTest => "DIAGNOSTIC_TEST",
        Other => "OTHER",
    }
}

impl InterventionType {
    /// Value used in `AREA[InterventionType]`.
    #[must_use]
    pub const fn ctgov_value(self) -> &'static str {
        match self {
            Self::Drug => "Drug",
            Self::Device => "Device",
            Self::Biological => "Biological",
            Self::Procedure => "Procedure",
            Self::Radiation => "Radiation",
            Self::Behavioral => "Behavioral",
            Self::Genetic => "Genetic",
            Self::Dietary => "Dietary",
            Self::DiagnosticTest => "Diagnostic Test",
            Self::Other => "Other",
        }
    }
}

api_enum! {
    /// Lead sponsor class.
    pub enum SponsorType {
        Industry => "INDUSTRY",
        Government => "GOVERNMENT",
        Academic => "ACADEMIC",
        Other => "OTHER",
    }
}

impl SponsorType {
    /// Value used in `AREA[SponsorType]`.
    #[must_use]
    pub const fn ctgov_value(self) -> &'static str {
        match self {
            Self::Industry => "Industry",
            Self::Government => "Government",
            Self::Academic => "Academic",
            Self::Other => "Other",
        }
    }
}

api_enum! {
    /// Allocation design.
    pub enum StudyDesign {
        Randomized => "RANDOMIZED",
        NonRandomized => "NON_RANDOMIZED",
        Observational => "OBSERVATIONAL",
    }
}

impl StudyDesign {
    /// Value used in `AREA[StudyDesign]`.
    #[must_use]
    pub const fn ctgov_value(self) -> &'static str {
        match self {
            Self::Randomized => "Randomized",
            Self::NonRandomized => "Non-Randomized",
            Self::Observational => "Observational",
        }
    }
}

api_enum! {
    /// Date a range filter applies to.
    pub enum DateField {
        LastUpdate => "LAST_UPDATE",
        StudyStart => "STUDY_START",
        PrimaryCompletion => "PRIMARY_COMPLETION",
        OutcomePosting => "OUTCOME_POSTING",
        Completion => "COMPLETION",
        FirstPosting => "FIRST_POSTING",
        SubmittedDate => "SUBMITTED_DATE",
    }
}

impl DateField {
    /// Study field name used in `AREA[...]RANGE[...]`.
    #[must_use]
    pub const fn ctgov_value(self) -> &'static str {
        match self {
            Self::LastUpdate => "LastUpdatePostDate",
            Self::StudyStart => "StartDate",
            Self::PrimaryCompletion => "PrimaryCompletionDate",
            Self::OutcomePosting => "ResultsFirstPostDate",
            Self::Completion => "CompletionDate",
            Self::FirstPosting => "StudyFirstPostDate",
            Self::SubmittedDate => "StudyFirstSubmitDate",
        }
    }
}

api_enum! {
    /// Primary purpose of the trial.
    pub enum PrimaryPurpose {
        Treatment => "TREATMENT",
        Prevention => "PREVENTION",
        Diagnostic => "DIAGNOSTIC",
        SupportiveCare => "SUPPORTIVE_CARE",
        Screening => "SCREENING",
        HealthServices => "HEALTH_SERVICES",
        BasicScience => "BASIC_SCIENCE",
        DeviceFeasibility => "DEVICE_FEASIBILITY",
        Other => "OTHER",
    }
}

impl PrimaryPurpose {
    /// Value used in `AREA[DesignPrimaryPurpose]`.
    #[must_use]
    pub const fn ctgov_value(self) -> &'static str {
        match self {
            Self::Treatment => "Treatment",
            Self::Prevention => "Prevention",
            Self::Diagnostic => "Diagnostic",
            Self::SupportiveCare => "Supportive Care",
            Self::Screening => "Screening",
            Self::HealthServices => "Health Services",
            Self::BasicScience => "Basic Science",
            Self::DeviceFeasibility => "Device Feasibility",
            Self::Other => "Other",
        }
    }
}

api_enum! {
    /// Participant age group.
    pub enum AgeGroup {
        Child => "CHILD",
        Adult => "ADULT",
        Senior => "SENIOR",
        All => "ALL",
    }
}

impl AgeGroup {
    /// Value used in `AREA[StdAge]`, `None` for no filter.
    #[must_use]
    pub const fn ctgov_value(self) -> Option<&'static str> {
        match self {
            Self::Child => Some("Child"),
            Self::Adult => Some("Adult"),
            Self::Senior => Some("Older Adult"),
            Self::All => None,
        }
    }
}

/// Clinical trial search criteria. List fields accept one string or many.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrialQuery {
    /// Condition terms.
    #[serde(default, deserialize_with = "string_list")]
    pub conditions: Vec<String>,
    /// General search terms.
    #[serde(default, deserialize_with = "string_list")]
    pub terms: Vec<String>,
    /// Intervention names.
    #[serde(default, deserialize_with = "string_list")]
    pub interventions: Vec<String>,
    /// Recruitment status (open when unset).
    #[serde(default)]
    pub recruiting_status: Option<RecruitingStatus>,
    /// Study type.
    #[serde(default)]
    pub study_type: Option<StudyType>,
    /// NCT ids.
    #[serde(default, deserialize_with = "string_list")]
    pub nct_ids: Vec<String>,
    /// Latitude for geo search.
    #[serde(default)]
    pub lat: Option<f64>,
    /// Longitude for geo search.
    #[serde(default)]
    pub long: Option<f64>,
    /// Radius in miles.
    #[serde(default)]
    pub distance: Option<u32>,
    /// Lower date bound (YYYY-MM-DD).
    #[serde(default)]
    pub min_date: Option<String>,
    /// Upper date bound (YYYY-MM-DD).
    #[serde(default)]
    pub max_date: Option<String>,
    /// Date the bounds apply to.
    #[serde(default)]
    pub date_field: Option<DateField>,
    /// Phase.
    #[serde(default)]
    pub phase: Option<TrialPhase>,
    /// Age group.
    #[serde(default)]
    pub age_group: Option<AgeGroup>,
    /// Primary purpose.
    #[serde(default)]
    pub primary_purpose: Option<PrimaryPurpose>,
    /// Intervention type.
    #[serde(default)]
    pub intervention_type: Option<InterventionType>,
    /// Sponsor type.
    #[serde(default)]
    pub sponsor_type: Option<SponsorType>,
    /// Study design.
    #[serde(default)]
    pub study_design: Option<StudyDesign>,
    /// Sort order (relevance when unset).
    #[serde(default)]
    pub sort: Option<SortOrder>,
    /// Page token from a previous search.
    #[serde(default)]
    pub next_page_hash: Option<String>,
}

fn non_blank(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|s| !s.trim().is_empty())
}

/// Translate a query into ClinicalTrials.gov parameters.
///
/// Every value is a one-element list of strings.
#[must_use]
pub fn convert_query(query: &TrialQuery) -> Map<String, Value> {
    let mut params = Map::new();
    let mut set = |key: &str, value: String| {
        params.insert(key.to_string(), Value::Array(vec![Value::String(value)]));
    };

    set("format", "csv".to_string());
    set("markupFormat", "markdown".to_string());

    for (key, values) in [
        ("query.cond", &query.conditions),
        ("query.term", &query.terms),
        ("query.intr", &query.interventions),
    ] {
        match values.as_slice() {
            [] => {}
            [single] => set(key, single.clone()),
            many => set(key, format!("({})", many.join(" OR "))),
        }
    }

    if let (Some(lat), Some(long)) = (query.lat, query.long) {
        let distance = query.distance.unwrap_or(DEFAULT_DISTANCE_MILES);
        let geo = format!(
            "distance({},{},{}mi)",
            decimal(lat),
            decimal(long),
            distance
        );
        set("filter.geo", geo);
    }

    let mut advanced = Vec::new();

    if let Some(date_field) = query.date_field {
        let min = non_blank(query.min_date.as_ref());
        let max = non_blank(query.max_date.as_ref());
        if min.is_some() || max.is_some() {
            advanced.push(format!(
                "AREA[{}]RANGE[{},{}]",
                date_field.ctgov_value(),
                min.unwrap_or("MIN"),
                max.unwrap_or("MAX")
            ));
        }
    }

    let areas = [
        ("DesignPrimaryPurpose", query.primary_purpose.map(PrimaryPurpose::ctgov_value)),
        ("StudyType", query.study_type.map(StudyType::ctgov_value)),
        ("InterventionType", query.intervention_type.map(InterventionType::ctgov_value)),
        ("SponsorType", query.sponsor_type.map(SponsorType::ctgov_value)),
        ("StudyDesign", query.study_design.map(StudyDesign::ctgov_value)),
        ("Phase", query.phase.map(TrialPhase::as_str)),
        ("StdAge", query.age_group.and_then(AgeGroup::ctgov_value)),
    ];
    for (area, value) in areas {
        if let Some(value) = value {
            advanced.push(format!("AREA[{area}]{value}"));
        }
    }

    if !advanced.is_empty() {
        set("filter.advanced", advanced.join(" AND "));
    }

    let status = query.recruiting_status.unwrap_or(RecruitingStatus::Open);
    if let Some(statuses) = status.statuses() {
        set("filter.overallStatus", statuses.join(","));
    }

    if !query.nct_ids.is_empty() {
        set("query.id", query.nct_ids.join(","));
    }

    let sort = query.sort.unwrap_or(SortOrder::Relevance);
    set("sort", sort.ctgov_value().to_string());

    if let Some(token) = non_blank(query.next_page_hash.as_ref()) {
        set("pageToken", token.to_string());
    }

    set("fields", SEARCH_FIELDS.join(","));
    set("pageSize", SYSTEM_PAGE_SIZE.to_string());

    params
}

/// Search trials and render the CSV rows.
pub async fn search_trials(
    ctx: &ToolContext,
    query: &TrialQuery,
    format: ResponseFormat,
) -> ToolResult<String> {
    let mut request = ctx.get(ctx.config.ctgov_url.clone()).tls(TlsPolicy::Tls12);
    request.params = convert_query(query);
    tracing::debug!(params = ?request.params, "Searching ClinicalTrials.gov");

    let data = match ctx.client.request_value(&request).await {
        Ok(data) => data,
        Err(e) => error_payload(&e),
    };

    render_output(&data, format)
}
