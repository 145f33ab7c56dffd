//! Database links added to MyVariant.info records.

use serde_json::{Map, Value};

/// Text of an identifier field when it is set: non-empty strings and
/// non-zero numbers count, anything else is treated as missing.
fn id_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) if n.as_f64() != Some(0.0) => Some(n.to_string()),
        _ => None,
    }
}

/// First element of a list, or the value itself.
fn first_value(value: &Value) -> &Value {
    match value {
        Value::Array(items) => items.first().unwrap_or(value),
        other => other,
    }
}

fn as_integer(value: Option<&Value>) -> i64 {
    match value {
        Some(Value::Number(n)) => n.as_i64().unwrap_or_default(),
        Some(Value::String(s)) => s.trim().parse().unwrap_or_default(),
        _ => 0,
    }
}

fn char_len(value: Option<&Value>) -> i64 {
    value
        .and_then(Value::as_str)
        .map_or(0, |s| i64::try_from(s.chars().count()).unwrap_or(i64::MAX))
}

/// End coordinate for the UCSC browser link.
///
/// Insertions span one base, deletions the reference length, substitutions
/// `max(0, len(alt) + 1 - len(ref))` past the start.
#[must_use]
pub fn vcf_end(variant: &Map<String, Value>) -> i64 {
    let Some(vcf) = variant.get("vcf").and_then(Value::as_object) else {
        return 0;
    };

    let pos = as_integer(vcf.get("position"));
    let ref_len = char_len(vcf.get("ref"));
    let alt_len = char_len(vcf.get("alt"));

    if ref_len == 0 && alt_len > 0 {
        pos + 1
    } else if ref_len > 0 && alt_len == 0 {
        pos + ref_len
    } else {
        pos + (alt_len + 1 - ref_len).max(0)
    }
}

/// Add `key: url` to the top-level `url` section, creating it when missing.
fn add_url(variant: &mut Map<String, Value>, key: &str, url: String) {
    let section = variant.entry("url").or_insert_with(|| Value::Object(Map::new()));
    if let Some(section) = section.as_object_mut() {
        section.insert(key.to_string(), Value::String(url));
    }
}

/// Set `url` inside a source section when `id_field` holds an id.
fn add_section_link(
    variant: &mut Map<String, Value>,
    section: &str,
    id_field: &str,
    make_url: impl FnOnce(&str) -> String,
) -> Option<String> {
    let section = variant.get_mut(section)?.as_object_mut()?;
    let id = id_text(section.get(id_field))?;
    section.insert("url".into(), Value::String(make_url(&id)));
    Some(id)
}

fn add_dbsnp_links(variant: &mut Map<String, Value>) {
    let rsid = add_section_link(variant, "dbsnp", "rsid", |rsid| {
        format!("https://www.ncbi.nlm.nih.gov/snp/{rsid}")
    });
    if let Some(rsid) = rsid {
        let url = format!("https://ensembl.org/Homo_sapiens/Variation/Explore?v={rsid}");
        add_url(variant, "ensembl", url);
    }
}

fn add_ucsc_link(variant: &mut Map<String, Value>) {
    let Some(chrom) = variant.get("chrom") else {
        return;
    };
    let chrom = id_text(Some(chrom)).unwrap_or_default();
    let Some(vcf) = variant.get("vcf") else {
        return;
    };
    let Some(position) = id_text(vcf.get("position")) else {
        return;
    };

    let end = vcf_end(variant);
    let url = format!(
        "https://genome.ucsc.edu/cgi-bin/hgTracks?db=hg19&position=chr{chrom}:{position}-{end}"
    );
    add_url(variant, "ucsc_genome_browser", url);
}

fn add_hgnc_link(variant: &mut Map<String, Value>) {
    let gene = variant
        .get("dbnsfp")
        .and_then(|dbnsfp| dbnsfp.get("genename"))
        .and_then(|genename| id_text(Some(first_value(genename))));

    if let Some(gene) = gene {
        let url = format!("https://www.genenames.org/data/gene-symbol-report/#!/symbol/{gene}");
        add_url(variant, "hgnc", url);
    }
}

/// Add dbSNP, Ensembl, ClinVar, COSMIC, CIViC, UCSC and HGNC links in place.
/// Non-object entries are left untouched.
pub fn inject_links(variants: &mut [Value]) {
    for variant in variants.iter_mut().filter_map(Value::as_object_mut) {
        add_dbsnp_links(variant);
        add_section_link(variant, "clinvar", "variant_id", |id| {
            format!("https://www.ncbi.nlm.nih.gov/clinvar/variation/{id}/")
        });
        add_section_link(variant, "cosmic", "cosmic_id", |id| {
            format!("https://cancer.sanger.ac.uk/cosmic/mutation/overview?id={id}")
        });
        add_section_link(variant, "civic", "id", |id| {
            format!("https://civicdb.org/variants/{id}/summary")
        });
        add_ucsc_link(variant);
        add_hgnc_link(variant);
    }
}
