//! Plain-text documents for a conversational agent's knowledge base.
//!
//! The indexer itself is an external service; this module prepares what it
//! receives: the page text with tags, scripts and styles removed, one text run
//! per line, truncated to a character budget with a visible marker.

use std::fs;
use std::path::PathBuf;

use scraper::{Html, Node, Selector};
use serde::{Deserialize, Serialize};

use crate::Result;

/// Elements whose text never reaches the knowledge base.
const SKIPPED_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

/// Configuration for knowledge-text preparation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KnowledgeConfig {
    /// Maximum characters of text, excluding the marker (default: 100 000).
    pub max_chars: usize,
    /// Appended when the text was cut.
    pub truncation_marker: String,
    /// Name used when the page has no title.
    pub fallback_name: String,
}

impl Default for KnowledgeConfig {
    fn default() -> Self {
        Self {
            max_chars: 100_000,
            truncation_marker: "\n... (content truncated)".to_string(),
            fallback_name: "Page content".to_string(),
        }
    }
}

/// A text document ready for indexing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KnowledgeDocument {
    pub name: String,
    pub text: String,
    pub truncated: bool,
}

/// The knowledge-base collaborator.
pub trait KnowledgeIndexer {
    /// Registers a document and returns the indexer's id for it.
    fn index(&self, document: &KnowledgeDocument) -> impl Future<Output = Result<String>> + Send;
}

/// Indexer that stores documents as JSON files in a directory.
///
/// The returned id is the file stem, derived from the document name. Writes
/// use blocking file I/O; async servers should call [`store`](Self::store)
/// from a blocking thread rather than awaiting [`KnowledgeIndexer::index`].
#[derive(Debug, Clone)]
pub struct DirectoryIndexer {
    dir: PathBuf,
}

impl DirectoryIndexer {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn file_stem(name: &str) -> String {
        let slug: String = name
            .to_lowercase()
            .chars()
            .map(|c| if c.is_alphanumeric() { c } else { '-' })
            .collect();
        let slug = slug.split('-').filter(|part| !part.is_empty()).collect::<Vec<_>>().join("-");
        if slug.is_empty() { "document".to_string() } else { slug }
    }

    /// Writes the document to `<dir>/<id>.json`, creating the directory, and
    /// returns the id. Blocks on file I/O.
    pub fn store(&self, document: &KnowledgeDocument) -> Result<String> {
        fs::create_dir_all(&self.dir)?;
        let id = Self::file_stem(&document.name);
        let path = self.dir.join(format!("{id}.json"));
        fs::write(&path, serde_json::to_string_pretty(document)?)?;
        tracing::debug!(path = %path.display(), "stored knowledge document");
        Ok(id)
    }
}

impl KnowledgeIndexer for DirectoryIndexer {
    async fn index(&self, document: &KnowledgeDocument) -> Result<String> {
        self.store(document)
    }
}

/// Extracts text runs, trimmed and joined with newlines.
pub fn extract_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut lines = Vec::new();

    for node in document.tree.root().descendants() {
        let Node::Text(text) = node.value() else {
            continue;
        };
        let skipped = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|el| SKIPPED_ELEMENTS.contains(&el.name()))
        });
        if skipped {
            continue;
        }
        let trimmed = text.trim();
        if !trimmed.is_empty() {
            lines.push(trimmed.to_string());
        }
    }

    lines.join("\n")
}

/// Cuts `text` to `max_chars` characters and appends the marker if anything was cut.
pub fn truncate_text(text: &str, max_chars: usize, marker: &str) -> (String, bool) {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => (format!("{}{}", &text[..byte_index], marker), true),
        None => (text.to_string(), false),
    }
}

/// Builds the knowledge document for a (usually cleaned) page.
pub fn knowledge_document(html: &str, config: &KnowledgeConfig) -> KnowledgeDocument {
    let name = page_title(html).unwrap_or_else(|| config.fallback_name.clone());
    let (text, truncated) = truncate_text(&extract_text(html), config.max_chars, &config.truncation_marker);
    if truncated {
        tracing::debug!(max_chars = config.max_chars, "knowledge text truncated");
    }
    KnowledgeDocument { name, text, truncated }
}

fn page_title(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("title").ok()?;
    let title = document.select(&selector).next()?.text().collect::<String>();
    let title = title.trim();
    if title.is_empty() { None } else { Some(title.to_string()) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_text_skips_scripts_and_styles() {
        let html = "<html><head><title>Plan</title><style>p{}</style></head>\
            <body><h1>Critical illness</h1><script>var secret = 1;</script>\
            <p>  Coverage starts today. </p><ul><li>One</li><li>Two</li></ul></body></html>";
        let text = extract_text(html);
        assert_eq!(text, "Plan\nCritical illness\nCoverage starts today.\nOne\nTwo");
        assert!(!text.contains("secret"));
    }

    #[test]
    fn test_truncate_counts_characters() {
        let (text, truncated) = truncate_text("héllo wörld", 5, "…");
        assert_eq!(text, "héllo…");
        assert!(truncated);

        let (text, truncated) = truncate_text("short", 5, "…");
        assert_eq!(text, "short");
        assert!(!truncated);
    }

    #[test]
    fn test_knowledge_document() {
        let config = KnowledgeConfig { max_chars: 10, ..Default::default() };
        let doc = knowledge_document("<html><head><title> Sun Life </title></head><body><p>abcdefghijklmnop</p></body></html>", &config);
        assert_eq!(doc.name, "Sun Life");
        assert!(doc.truncated);
        assert_eq!(doc.text, "Sun Life\na\n... (content truncated)");
    }

    #[tokio::test]
    async fn test_directory_indexer() {
        let dir = tempfile::tempdir().unwrap();
        let indexer = DirectoryIndexer::new(dir.path());
        let doc = KnowledgeDocument { name: "Sun Life: Critical Illness!".to_string(), text: "x".to_string(), truncated: false };

        let id = indexer.index(&doc).await.unwrap();
        assert_eq!(id, "sun-life-critical-illness");

        let stored = std::fs::read_to_string(dir.path().join("sun-life-critical-illness.json")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&stored).unwrap();
        assert_eq!(value["text"], "x");
    }

    #[test]
    fn test_directory_indexer_store_creates_nested_dir() {
        let dir = tempfile::tempdir().unwrap();
        let indexer = DirectoryIndexer::new(dir.path().join("kb").join("pages"));
        let doc = KnowledgeDocument { name: "???".to_string(), text: "y".to_string(), truncated: true };

        assert_eq!(indexer.store(&doc).unwrap(), "document");
        assert!(dir.path().join("kb/pages/document.json").exists());
    }

    #[test]
    fn test_knowledge_document_fallback_name() {
        let doc = knowledge_document("<p>Body</p>", &KnowledgeConfig::default());
        assert_eq!(doc.name, "Page content");
        assert_eq!(doc.text, "Body");
        assert!(!doc.truncated);
    }
}
