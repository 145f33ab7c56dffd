//! Static MCP resources: usage notes and a research persona for agents.

use serde::Serialize;
use serde_json::{Value, json};

/// A read-only Markdown document served over `resources/read`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Resource {
    pub uri: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    #[serde(rename = "mimeType")]
    pub mime_type: &'static str,
    #[serde(skip)]
    pub text: &'static str,
}

impl Resource {
    /// `resources/read` payload for this document.
    #[must_use]
    pub fn contents(&self) -> Value {
        json!({
            "contents": [{
                "uri": self.uri,
                "mimeType": self.mime_type,
                "text": self.text
            }]
        })
    }
}

/// Every resource, in listing order.
pub const RESOURCES: &[Resource] = &[
    Resource {
        uri: "biomcp://instructions.md",
        name: "instructions.md",
        description: "How to use the BioMCP article, trial and variant tools",
        mime_type: "text/markdown",
        text: include_str!("instructions.md"),
    },
    Resource {
        uri: "biomcp://researcher.md",
        name: "researcher.md",
        description: "Persona and working method for biomedical research",
        mime_type: "text/markdown",
        text: include_str!("researcher.md"),
    },
];

/// Look up a resource by URI.
#[must_use]
pub fn find(uri: &str) -> Option<&'static Resource> {
    RESOURCES.iter().find(|r| r.uri == uri)
}
