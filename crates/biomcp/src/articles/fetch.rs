//! Article text retrieval via the PubTator3 BioC JSON export.

use serde::{Deserialize, Serialize};

use crate::client::TlsPolicy;
use crate::error::{RequestResult, ToolResult};
use crate::formatters::{ResponseFormat, error_list, render_output};
use crate::tools::ToolContext;

/// Sections counted as body text.
const TEXT_SECTIONS: &[&str] = &["INTRO", "RESULTS", "METHODS", "DISCUSS", "CONCL", "FIG", "TABLE"];

/// PubMed article page.
pub(crate) fn pubmed_url(pmid: u64) -> String {
    format!("https://pubmed.ncbi.nlm.nih.gov/{pmid}/")
}

/// PubMed Central article page.
pub(crate) fn pmc_url(pmcid: &str) -> String {
    format!("https://www.ncbi.nlm.nih.gov/pmc/articles/{pmcid}/")
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

/// Passage annotations.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PassageInfo {
    /// Section of the paper.
    #[serde(default)]
    pub section_type: Option<String>,
    /// Passage kind, used when no section is given.
    #[serde(default, rename = "type")]
    pub passage_type: Option<String>,
}

/// One passage of an article.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Passage {
    /// Annotations.
    #[serde(default, rename = "infons")]
    pub info: Option<PassageInfo>,
    /// Passage text.
    #[serde(default)]
    pub text: Option<String>,
}

impl Passage {
    /// Upper-cased section name, `UNKNOWN` when absent.
    #[must_use]
    pub fn section_type(&self) -> String {
        self.info
            .as_ref()
            .and_then(|info| {
                non_empty(&info.section_type).or_else(|| non_empty(&info.passage_type))
            })
            .unwrap_or("UNKNOWN")
            .to_uppercase()
    }

    fn is_title(&self) -> bool {
        self.section_type() == "TITLE"
    }

    fn is_abstract(&self) -> bool {
        self.section_type() == "ABSTRACT"
    }

    fn is_text(&self) -> bool {
        TEXT_SECTIONS.contains(&self.section_type().as_str())
    }
}

/// Article as returned by the export API.
#[derive(Debug, Clone, Deserialize)]
pub struct Article {
    /// PubMed id.
    #[serde(default)]
    pub pmid: Option<u64>,
    /// PubMed Central id.
    #[serde(default)]
    pub pmcid: Option<String>,
    /// Publication date.
    #[serde(default)]
    pub date: Option<String>,
    /// Journal name.
    #[serde(default)]
    pub journal: Option<String>,
    /// Author names.
    #[serde(default)]
    pub authors: Option<Vec<String>>,
    /// Text passages.
    pub passages: Vec<Passage>,
}

impl Article {
    fn joined(&self, keep: impl Fn(&Passage) -> bool, separator: &str) -> String {
        self.passages
            .iter()
            .filter(|p| keep(*p))
            .filter_map(|p| p.text.as_deref())
            .filter(|text| !text.is_empty())
            .collect::<Vec<_>>()
            .join(separator)
    }

    fn placeholder(&self) -> String {
        match self.pmid {
            Some(pmid) => format!("Article: {pmid}"),
            None => "Article: None".to_string(),
        }
    }

    /// Title passages joined with ` ... `.
    #[must_use]
    pub fn title(&self) -> String {
        let title = self.joined(Passage::is_title, " ... ");
        if title.is_empty() {
            self.placeholder()
        } else {
            title
        }
    }

    /// Abstract passages separated by blank lines.
    #[must_use]
    pub fn abstract_text(&self) -> String {
        let text = self.joined(Passage::is_abstract, "\n\n");
        if text.is_empty() {
            self.placeholder()
        } else {
            text
        }
    }

    /// Body passages separated by blank lines.
    #[must_use]
    pub fn full_text(&self) -> String {
        self.joined(Passage::is_text, "\n\n")
    }

    /// Flatten into the record shape handed to the renderer.
    #[must_use]
    pub fn to_record(&self, include_full_text: bool) -> ArticleRecord {
        ArticleRecord {
            pmid: self.pmid,
            pmcid: self.pmcid.clone(),
            date: self.date.clone(),
            journal: self.journal.clone(),
            authors: self.authors.clone(),
            title: self.title(),
            abstract_text: self.abstract_text(),
            full_text: include_full_text.then(|| self.full_text()),
            pubmed_url: self.pmid.map(pubmed_url),
            pmc_url: self
                .pmcid
                .as_deref()
                .filter(|id| !id.is_empty())
                .map(pmc_url),
        }
    }
}

/// Serialized article.
#[derive(Debug, Clone, Serialize)]
pub struct ArticleRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pmid: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pmcid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub journal: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authors: Option<Vec<String>>,
    pub title: String,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pubmed_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pmc_url: Option<String>,
}

/// Export API response.
#[derive(Debug, Clone, Deserialize)]
pub struct FetchArticlesResponse {
    /// Articles found.
    #[serde(rename = "PubTator3")]
    pub articles: Vec<Article>,
}

impl FetchArticlesResponse {
    /// Abstract of the article with the given PMID.
    #[must_use]
    pub fn get_abstract(&self, pmid: u64) -> Option<String> {
        self.articles
            .iter()
            .find(|a| a.pmid == Some(pmid))
            .map(Article::abstract_text)
    }
}

/// Call the BioC JSON export for a set of PMIDs.
pub async fn call_pubtator_api(
    ctx: &ToolContext,
    pmids: &[u64],
    full: bool,
) -> RequestResult<FetchArticlesResponse> {
    let url = format!("{}/publications/export/biocjson", ctx.config.pubtator_url);
    let pmids = pmids
        .iter()
        .map(u64::to_string)
        .collect::<Vec<_>>()
        .join(",");
    let request = ctx
        .get(url)
        .param("pmids", pmids)
        .param("full", if full { "true" } else { "false" })
        .tls(TlsPolicy::Tls12);

    ctx.client.request(&request).await
}

/// Fetch articles and render them.
///
/// The export API returns body text even when `full` is false, so the
/// `full_text` field is dropped unless requested.
pub async fn fetch_articles(
    ctx: &ToolContext,
    pmids: &[u64],
    full: bool,
    format: ResponseFormat,
) -> ToolResult<String> {
    tracing::debug!(?pmids, full, "Fetching articles");

    let data = match call_pubtator_api(ctx, pmids, full).await {
        Ok(response) => {
            let records: Vec<ArticleRecord> = response
                .articles
                .iter()
                .map(|a| a.to_record(full))
                .collect();
            serde_json::to_value(records)?
        }
        Err(e) => error_list(&e),
    };

    render_output(&data, format)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn article() -> Article {
        serde_json::from_value(json!({
            "pmid": 34397683,
            "pmcid": "PMC1234",
            "journal": "Nature",
            "authors": ["Smith J", "Doe A"],
            "passages": [
                {"infons": {"type": "title"}, "text": "First title"},
                {"infons": {"section_type": "TITLE", "type": "front"}, "text": "Second"},
                {"infons": {"type": "abstract"}, "text": "Abstract one."},
                {"infons": {"type": "abstract"}, "text": "Abstract two."},
                {"infons": {"section_type": "INTRO"}, "text": "Intro text."},
                {"infons": {"section_type": "REF"}, "text": "Ignored."},
                {"text": "No infons."}
            ]
        }))
        .unwrap()
    }

    #[test]
    fn test_computed_fields() {
        let article = article();
        assert_eq!(article.title(), "First title ... Second");
        assert_eq!(article.abstract_text(), "Abstract one.\n\nAbstract two.");
        assert_eq!(article.full_text(), "Intro text.");
    }

    #[test]
    fn test_section_type_fallback() {
        let passage = Passage::default();
        assert_eq!(passage.section_type(), "UNKNOWN");
    }

    #[test]
    fn test_placeholders() {
        let article: Article = serde_json::from_value(json!({"pmid": 42, "passages": []})).unwrap();
        assert_eq!(article.title(), "Article: 42");
        assert_eq!(article.abstract_text(), "Article: 42");
        assert_eq!(article.full_text(), "");
    }

    #[test]
    fn test_record_key_order_and_exclusion() {
        let record = serde_json::to_value(article().to_record(false)).unwrap();
        let keys: Vec<&str> = record
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(
            keys,
            vec![
                "pmid",
                "pmcid",
                "journal",
                "authors",
                "title",
                "abstract",
                "pubmed_url",
                "pmc_url"
            ]
        );
        assert_eq!(
            record["pubmed_url"],
            "https://pubmed.ncbi.nlm.nih.gov/34397683/"
        );
        assert_eq!(
            record["pmc_url"],
            "https://www.ncbi.nlm.nih.gov/pmc/articles/PMC1234/"
        );

        let full = serde_json::to_value(article().to_record(true)).unwrap();
        assert_eq!(full["full_text"], "Intro text.");
    }

    #[test]
    fn test_get_abstract() {
        let response = FetchArticlesResponse {
            articles: vec![article()],
        };
        assert_eq!(
            response.get_abstract(34397683).as_deref(),
            Some("Abstract one.\n\nAbstract two.")
        );
        assert_eq!(response.get_abstract(1), None);
    }
}
