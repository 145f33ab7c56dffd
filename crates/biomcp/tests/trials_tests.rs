//! Trial search and retrieval tests against a mocked ClinicalTrials.gov.

use serde_json::{Value, json};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use biomcp::config::Config;
use biomcp::formatters::ResponseFormat;
use biomcp::tools::ToolContext;
use biomcp::trials::{
    AgeGroup, RecruitingStatus, TrialModule, TrialPhase, TrialQuery, fetch_trial, get_trial,
    search_trials,
};

const STUDIES: &str = "/api/v2/studies";

const CSV_PAGE: &str = concat!(
    "NCT Number,Study Title,Study URL,Study Status,Conditions\n",
    "NCT04280705,Adaptive COVID-19 Treatment Trial (ACTT),",
    "https://clinicaltrials.gov/study/NCT04280705,COMPLETED,COVID-19\n",
    "NCT05000000,\"Melanoma, Stage IV\",",
    "https://clinicaltrials.gov/study/NCT05000000,RECRUITING,Melanoma\n",
);

fn setup_test_context(mock_server: &MockServer) -> ToolContext {
    ToolContext::from_config(Config::for_testing(&mock_server.uri())).unwrap()
}

fn study_path(nct_id: &str) -> String {
    format!("{STUDIES}/{nct_id}")
}

// =============================================================================
// Search
// =============================================================================

#[tokio::test]
async fn test_search_trials_parses_csv_rows() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(STUDIES))
        .and(query_param("format", "csv"))
        .and(query_param("markupFormat", "markdown"))
        .and(query_param("query.cond", "melanoma"))
        .and(query_param(
            "filter.overallStatus",
            "AVAILABLE,ENROLLING_BY_INVITATION,NOT_YET_RECRUITING,RECRUITING",
        ))
        .and(query_param("sort", "@relevance"))
        .and(query_param("pageSize", "40"))
        .respond_with(ResponseTemplate::new(200).set_body_string(CSV_PAGE))
        .expect(1)
        .mount(&mock_server)
        .await;

    let ctx = setup_test_context(&mock_server);
    let query = TrialQuery {
        conditions: vec!["melanoma".into()],
        ..TrialQuery::default()
    };

    let text = search_trials(&ctx, &query, ResponseFormat::Json)
        .await
        .unwrap();
    let rows: Value = serde_json::from_str(&text).unwrap();

    assert_eq!(rows.as_array().unwrap().len(), 2);
    assert_eq!(rows[0]["NCT Number"], "NCT04280705");
    assert_eq!(rows[1]["Study Title"], "Melanoma, Stage IV");
    assert_eq!(rows[1]["Study Status"], "RECRUITING");
}

#[tokio::test]
async fn test_search_trials_markdown() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(STUDIES))
        .respond_with(ResponseTemplate::new(200).set_body_string(CSV_PAGE))
        .mount(&mock_server)
        .await;

    let ctx = setup_test_context(&mock_server);
    let query = TrialQuery {
        terms: vec!["covid".into()],
        ..TrialQuery::default()
    };

    let markdown = search_trials(&ctx, &query, ResponseFormat::Markdown)
        .await
        .unwrap();
    assert!(markdown.starts_with("# Record 1\nNct Number: NCT04280705\n"));
    assert!(markdown.contains("Study Url: https://clinicaltrials.gov/study/NCT04280705"));
    assert!(markdown.contains("\n\n# Record 2\n"));
}

#[tokio::test]
async fn test_search_trials_sends_filters() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(STUDIES))
        .and(query_param("query.cond", "(lung cancer OR melanoma)"))
        .and(query_param("query.intr", "pembrolizumab"))
        .and(query_param("filter.geo", "distance(40.7128,-74.006,50mi)"))
        .and(query_param(
            "filter.advanced",
            "AREA[Phase]PHASE3 AND AREA[StdAge]Older Adult",
        ))
        .and(query_param("query.id", "NCT1,NCT2"))
        .and(query_param("pageToken", "abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_string(CSV_PAGE))
        .expect(1)
        .mount(&mock_server)
        .await;

    let ctx = setup_test_context(&mock_server);
    let query = TrialQuery {
        conditions: vec!["lung cancer".into(), "melanoma".into()],
        interventions: vec!["pembrolizumab".into()],
        nct_ids: vec!["NCT1".into(), "NCT2".into()],
        lat: Some(40.7128),
        long: Some(-74.006),
        phase: Some(TrialPhase::Phase3),
        age_group: Some(AgeGroup::Senior),
        recruiting_status: Some(RecruitingStatus::Any),
        next_page_hash: Some("abc123".into()),
        ..TrialQuery::default()
    };

    let text = search_trials(&ctx, &query, ResponseFormat::Json)
        .await
        .unwrap();
    assert!(text.contains("NCT04280705"));
}

#[tokio::test]
async fn test_search_trials_empty_page_falls_back_to_json() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(STUDIES))
        .respond_with(ResponseTemplate::new(200).set_body_string("NCT Number,Study Title\n"))
        .mount(&mock_server)
        .await;

    let ctx = setup_test_context(&mock_server);
    let query = TrialQuery::default();
    let markdown = search_trials(&ctx, &query, ResponseFormat::Markdown)
        .await
        .unwrap();
    assert_eq!(markdown, "[]");
}

#[tokio::test]
async fn test_search_trials_upstream_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(STUDIES))
        .respond_with(ResponseTemplate::new(400).set_body_string("invalid filter.advanced"))
        .mount(&mock_server)
        .await;

    let ctx = setup_test_context(&mock_server);
    let query = TrialQuery::default();
    let json_text = search_trials(&ctx, &query, ResponseFormat::Json)
        .await
        .unwrap();
    let value: Value = serde_json::from_str(&json_text).unwrap();
    assert_eq!(
        value,
        json!({"error": "Error 400: invalid filter.advanced"})
    );

    let markdown = search_trials(&ctx, &query, ResponseFormat::Markdown)
        .await
        .unwrap();
    assert_eq!(markdown, "Error: Error 400: invalid filter.advanced\n");
}

// =============================================================================
// Retrieval
// =============================================================================

#[tokio::test]
async fn test_get_trial_protocol_markdown() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(study_path("NCT04280705")))
        .and(query_param(
            "fields",
            "IdentificationModule,StatusModule,SponsorCollaboratorsModule,OversightModule,\
             DescriptionModule,ConditionsModule,DesignModule,ArmsInterventionsModule,\
             EligibilityModule",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "protocolSection": {
                "identificationModule": {"nctId": "NCT04280705", "briefTitle": "ACTT"}
            }
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let ctx = setup_test_context(&mock_server);
    let markdown = get_trial(
        &ctx,
        "NCT04280705",
        TrialModule::Protocol,
        ResponseFormat::Markdown,
    )
    .await
    .unwrap();

    assert_eq!(
        markdown,
        "Url: https://clinicaltrials.gov/study/NCT04280705\n\n\
         # Protocol Section\n\n\
         ## Identification Module\n\
         Nct Id: NCT04280705\n\
         Brief Title: ACTT\n"
    );
}

#[tokio::test]
async fn test_fetch_trial_locations_adds_url_and_caches() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(study_path("NCT04280705")))
        .and(query_param("fields", "ContactsLocationsModule"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "protocolSection": {
                "contactsLocationsModule": {
                    "locations": [{"facility": "Mayo Clinic", "city": "Rochester"}]
                }
            }
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let ctx = setup_test_context(&mock_server);
    let first = fetch_trial(&ctx, "NCT04280705", TrialModule::Locations).await;
    let second = fetch_trial(&ctx, "NCT04280705", TrialModule::Locations).await;

    assert_eq!(first, second);
    assert_eq!(first["URL"], "https://clinicaltrials.gov/study/NCT04280705");
    assert_eq!(
        first["protocolSection"]["contactsLocationsModule"]["locations"][0]["city"],
        "Rochester"
    );
}

#[tokio::test]
async fn test_fetch_trial_outcomes_fields() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(study_path("NCT1")))
        .and(query_param("fields", "OutcomesModule,ResultsSection"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"resultsSection": {"x": 1}})),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let ctx = setup_test_context(&mock_server);
    let study = fetch_trial(&ctx, "NCT1", TrialModule::Outcomes).await;
    assert_eq!(study["resultsSection"]["x"], 1);
}

#[tokio::test]
async fn test_fetch_trial_empty_object_is_no_data() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(study_path("NCT1")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&mock_server)
        .await;

    let ctx = setup_test_context(&mock_server);
    let study = fetch_trial(&ctx, "NCT1", TrialModule::References).await;
    assert_eq!(
        study,
        json!({"error": "No data found for NCT1 with module References"})
    );
}

#[tokio::test]
async fn test_fetch_trial_http_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(study_path("NCT404")))
        .respond_with(ResponseTemplate::new(404).set_body_string("Study not found"))
        .mount(&mock_server)
        .await;

    let ctx = setup_test_context(&mock_server);
    let study = fetch_trial(&ctx, "NCT404", TrialModule::Protocol).await;
    assert_eq!(
        study,
        json!({"error": "API Error 404", "details": "Study not found"})
    );
}

#[tokio::test]
async fn test_fetch_trial_non_object_is_parse_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(study_path("NCT1")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(["not", "a", "study"])))
        .mount(&mock_server)
        .await;

    let ctx = setup_test_context(&mock_server);
    let study = fetch_trial(&ctx, "NCT1", TrialModule::Protocol).await;
    assert_eq!(study["error"], "API Error 500");
    assert!(study["details"].as_str().unwrap().starts_with("parse failure"));
}
