//! Property-based tests for tool input models and query conversion.

use proptest::prelude::*;
use serde_json::json;

use biomcp::models::{ArticleDetailsInput, TrialSearchInput, decimal};
use biomcp::trials::{SortOrder, TrialPhase, TrialQuery, convert_query};
use biomcp::variants::{VariantQuery, build_query_string};

fn arb_phase() -> impl Strategy<Value = TrialPhase> {
    proptest::sample::select(TrialPhase::ALL.to_vec())
}

fn arb_terms() -> impl Strategy<Value = Vec<String>> {
    proptest::collection::vec("[a-z]{1,10}( [a-z]{1,10})?", 1..5)
}

proptest! {
    #[test]
    fn enum_codes_parse_in_any_case(phase in arb_phase(), upper in any::<bool>()) {
        let code = phase.as_str();
        let spelled = if upper {
            code.to_string()
        } else {
            code.to_lowercase().replace('_', " ")
        };
        prop_assert_eq!(spelled.parse::<TrialPhase>().unwrap(), phase);

        let from_json: TrialPhase = serde_json::from_value(json!(spelled)).unwrap();
        prop_assert_eq!(from_json, phase);
    }

    #[test]
    fn pmid_accepts_number_or_string(pmid in 1u64..100_000_000) {
        let as_number: ArticleDetailsInput =
            serde_json::from_value(json!({"pmid": pmid})).unwrap();
        let as_string: ArticleDetailsInput =
            serde_json::from_value(json!({"pmid": pmid.to_string()})).unwrap();
        prop_assert_eq!(as_number.pmid, pmid);
        prop_assert_eq!(as_string.pmid, pmid);
    }

    #[test]
    fn single_condition_equals_one_element_list(term in "[A-Za-z ]{1,30}") {
        let bare: TrialSearchInput =
            serde_json::from_value(json!({"conditions": term})).unwrap();
        let listed: TrialSearchInput =
            serde_json::from_value(json!({"conditions": [term]})).unwrap();
        prop_assert_eq!(bare.query, listed.query);
    }

    #[test]
    fn condition_lists_become_or_groups(terms in arb_terms()) {
        let query = TrialQuery {
            conditions: terms.clone(),
            ..TrialQuery::default()
        };
        let params = convert_query(&query);
        let cond = params["query.cond"][0].as_str().unwrap().to_string();

        if terms.len() == 1 {
            prop_assert_eq!(cond, terms[0].clone());
        } else {
            prop_assert_eq!(cond, format!("({})", terms.join(" OR ")));
        }
    }

    #[test]
    fn every_trial_param_is_a_single_string_list(
        phase in proptest::option::of(arb_phase()),
        terms in arb_terms()
    ) {
        let query = TrialQuery {
            terms,
            phase,
            sort: Some(SortOrder::Enrollment),
            ..TrialQuery::default()
        };
        for (key, value) in convert_query(&query) {
            let list = value.as_array().unwrap();
            prop_assert_eq!(list.len(), 1, "{}", key);
            prop_assert!(list[0].is_string(), "{}", key);
        }
    }

    #[test]
    fn decimal_round_trips(value in -1.0e6f64..1.0e6) {
        let text = decimal(value);
        prop_assert_eq!(text.parse::<f64>().unwrap(), value);
        prop_assert!(text.contains('.') || text.contains('e'));
    }

    #[test]
    fn variant_query_string_is_never_empty(gene in proptest::option::of("[A-Z0-9]{1,8}")) {
        let query = VariantQuery {
            gene,
            ..VariantQuery::default()
        };
        let q = build_query_string(&query);
        prop_assert!(!q.is_empty());
        prop_assert_eq!(q == "*", query.gene.is_none());
    }
}
