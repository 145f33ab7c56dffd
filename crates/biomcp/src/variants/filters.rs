//! Removal of bulky or duplicated paths from variant records.

use serde_json::Value;

/// Dotted paths dropped from every record.
pub const PATH_FILTERS: &[&str] = &[
    "civic.contributors",
    "civic.molecularProfiles",
    "dbsnp.gene.rnas",
    // duplicate of the top-level clinvar section
    "dbnsfp.clinvar",
    "civic.lastAcceptedRevisionEvent",
    "civic.lastSubmittedRevisionEvent",
    "civic.creationActivity",
];

/// Remove a dotted path. Missing intermediate keys and non-object
/// intermediates leave the record unchanged.
fn delete_path(record: &mut Value, path: &str) {
    let mut keys: Vec<&str> = path.split('.').collect();
    let Some(last) = keys.pop() else {
        return;
    };

    let mut current = record;
    for key in keys {
        match current.get_mut(key) {
            Some(next) => current = next,
            None => return,
        }
    }

    if let Some(map) = current.as_object_mut() {
        map.shift_remove(last);
    }
}

/// Strip [`PATH_FILTERS`] from each record, keeping remaining key order.
#[must_use]
pub fn filter_variants(mut variants: Vec<Value>) -> Vec<Value> {
    for variant in &mut variants {
        for path in PATH_FILTERS {
            delete_path(variant, path);
        }
    }
    variants
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_filter_variants_removes_paths() {
        let variants = vec![json!({
            "_id": "x",
            "civic": {"id": 1, "contributors": [], "molecularProfiles": {}, "name": "V600E"},
            "dbsnp": {"gene": {"symbol": "BRAF", "rnas": [1, 2]}, "rsid": "rs1"},
            "dbnsfp": {"clinvar": {"a": 1}, "genename": "BRAF"}
        })];
        let filtered = filter_variants(variants);
        assert_eq!(
            filtered[0],
            json!({
                "_id": "x",
                "civic": {"id": 1, "name": "V600E"},
                "dbsnp": {"gene": {"symbol": "BRAF"}, "rsid": "rs1"},
                "dbnsfp": {"genename": "BRAF"}
            })
        );
    }

    #[test]
    fn test_filter_preserves_key_order() {
        let filtered =
            filter_variants(vec![json!({"civic": {"z": 1, "contributors": 2, "a": 3}})]);
        let keys: Vec<&String> = filtered[0]["civic"]
            .as_object()
            .unwrap()
            .keys()
            .collect();
        assert_eq!(keys, ["z", "a"]);
    }

    #[test]
    fn test_filter_ignores_non_object_intermediates() {
        let record = json!({"dbsnp": {"gene": ["list"]}, "civic": "text"});
        let filtered = filter_variants(vec![record.clone()]);
        assert_eq!(filtered[0], record);
    }
}
