//! Script classification and removal.
//!
//! Each `<script>` is classified from its `src`, `id`, `type` and text.
//! The first matching rule wins:
//!
//! 1. tracking: `src` contains a tracker signature, `id` contains a tracker
//!    id marker, or the text contains a tracker text marker
//! 2. structured data: `type` is exactly a structured-data MIME type
//! 3. inline tracking: the text contains an inline tracking call
//!
//! Scripts matching nothing are kept verbatim.

use dom_query::NodeRef;
use serde::Serialize;

use crate::dom::{self, Document};
use crate::signatures::Signatures;

/// The attributes and text a classification looks at.
///
/// Missing attributes are empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptFacts {
    pub src: String,
    pub id: String,
    pub mime_type: String,
    pub text: String,
}

impl ScriptFacts {
    /// Reads the facts from a `<script>` node.
    pub fn from_node(node: &NodeRef) -> Self {
        Self {
            src: dom::attr_or_empty(node, "src"),
            id: dom::attr_or_empty(node, "id"),
            mime_type: dom::attr_or_empty(node, "type"),
            text: node.text().to_string(),
        }
    }
}

/// Outcome of classifying one script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "verdict", content = "category")]
pub enum ScriptVerdict {
    /// Third-party tracker, with the matching signature category.
    Tracking(String),
    /// JSON-LD or other structured-data block.
    StructuredData,
    /// Inline tracking bootstrap code.
    InlineTracking,
    /// Application script, kept.
    Keep,
}

impl ScriptVerdict {
    /// Whether the script should be removed.
    pub fn is_removal(&self) -> bool {
        !matches!(self, ScriptVerdict::Keep)
    }
}

/// Classifies a script.
pub fn classify_script(facts: &ScriptFacts, signatures: &Signatures) -> ScriptVerdict {
    if let Some(category) = signatures.script_source_category(&facts.src) {
        return ScriptVerdict::Tracking(category.to_string());
    }
    if signatures.script_ids.iter().any(|marker| facts.id.contains(marker.as_str())) {
        return ScriptVerdict::Tracking("id".to_string());
    }
    if signatures
        .script_text_markers
        .iter()
        .any(|marker| facts.text.contains(marker.as_str()))
    {
        return ScriptVerdict::Tracking("inline_marker".to_string());
    }

    if signatures.structured_data_types.iter().any(|t| *t == facts.mime_type) {
        return ScriptVerdict::StructuredData;
    }

    if signatures
        .inline_tracking
        .iter()
        .any(|call| facts.text.contains(call.as_str()))
    {
        return ScriptVerdict::InlineTracking;
    }

    ScriptVerdict::Keep
}

/// Counts of scripts removed per rule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScriptReport {
    pub tracking: usize,
    pub structured_data: usize,
    pub inline_tracking: usize,
    pub kept: usize,
}

impl ScriptReport {
    /// Total scripts removed.
    pub fn removed(&self) -> usize {
        self.tracking + self.structured_data + self.inline_tracking
    }
}

/// Removes tracking, structured-data and inline-tracking scripts.
pub fn remove_tracking_scripts(doc: &Document, signatures: &Signatures) -> ScriptReport {
    let mut report = ScriptReport::default();

    for script in doc.nodes("script") {
        if !dom::is_attached(doc, &script) {
            continue;
        }
        let verdict = classify_script(&ScriptFacts::from_node(&script), signatures);
        match &verdict {
            ScriptVerdict::Keep => {
                report.kept += 1;
                continue;
            }
            ScriptVerdict::Tracking(category) => {
                tracing::trace!(category = %category, "removing tracking script");
                report.tracking += 1;
            }
            ScriptVerdict::StructuredData => report.structured_data += 1,
            ScriptVerdict::InlineTracking => report.inline_tracking += 1,
        }
        dom::detach(doc, &script);
    }

    tracing::debug!(
        removed = report.removed(),
        kept = report.kept,
        "script classifier"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn facts(src: &str, id: &str, mime_type: &str, text: &str) -> ScriptFacts {
        ScriptFacts {
            src: src.to_string(),
            id: id.to_string(),
            mime_type: mime_type.to_string(),
            text: text.to_string(),
        }
    }

    #[rstest]
    #[case("https://www.googletagmanager.com/gtm.js", "tag_manager")]
    #[case("https://www.google-analytics.com/analytics.js", "analytics")]
    #[case("https://connect.facebook.net/en_US/fbevents.js", "social")]
    #[case("https://cdn.cookielaw.org/scripttemplates/otSDKStub.js", "consent")]
    #[case("https://s.go-mpulse.net/boomerang/ABC", "performance")]
    #[case("chrome-extension://abcdef/inject.js", "extension")]
    #[case("https://TAGS.TIQ.SUNLIFE.com/utag.js", "tag_manager")]
    fn test_tracking_sources(#[case] src: &str, #[case] category: &str) {
        let verdict = classify_script(&facts(src, "", "", ""), &Signatures::default());
        assert_eq!(verdict, ScriptVerdict::Tracking(category.to_string()));
    }

    #[test]
    fn test_application_script_kept() {
        let verdict = classify_script(
            &facts("https://cdn.example.com/app.js", "", "", ""),
            &Signatures::default(),
        );
        assert_eq!(verdict, ScriptVerdict::Keep);
        assert!(!verdict.is_removal());
    }

    #[test]
    fn test_id_and_text_markers() {
        let sigs = Signatures::default();
        assert!(matches!(
            classify_script(&facts("", "utag-loader", "", ""), &sigs),
            ScriptVerdict::Tracking(_)
        ));
        assert!(matches!(
            classify_script(&facts("", "", "", "window.BOOMR = {};"), &sigs),
            ScriptVerdict::Tracking(_)
        ));
    }

    #[test]
    fn test_precedence_tracking_before_structured_data() {
        let verdict = classify_script(
            &facts("", "utag", "application/ld+json", "{}"),
            &Signatures::default(),
        );
        assert!(matches!(verdict, ScriptVerdict::Tracking(_)));
    }

    #[test]
    fn test_structured_data_requires_exact_type() {
        let sigs = Signatures::default();
        assert_eq!(
            classify_script(&facts("", "", "application/ld+json", "{}"), &sigs),
            ScriptVerdict::StructuredData
        );
        assert_eq!(
            classify_script(&facts("", "", "application/LD+JSON", "{}"), &sigs),
            ScriptVerdict::Keep
        );
    }

    #[rstest]
    #[case("var utag_data = {page: 'x'};")]
    #[case("fbq('init', '123');")]
    #[case("gtag('config', 'G-1');")]
    #[case("_linkedin_data_partner_ids.push('1');")]
    fn test_inline_tracking(#[case] text: &str) {
        let verdict = classify_script(&facts("", "", "", text), &Signatures::default());
        assert_eq!(verdict, ScriptVerdict::InlineTracking);
    }

    #[test]
    fn test_remove_tracking_scripts() {
        let doc = Document::parse(
            r#"<html><head>
                <script src="https://www.googletagmanager.com/gtm.js"></script>
                <script src="https://cdn.example.com/app.js"></script>
                <script type="application/ld+json">{"@type": "WebPage"}</script>
            </head><body>
                <script>fbq('track', 'PageView');</script>
                <script>if (x < 3) { document.write("</div>"); }</script>
            </body></html>"#,
        );
        let report = remove_tracking_scripts(&doc, &Signatures::default());

        assert_eq!(report, ScriptReport { tracking: 1, structured_data: 1, inline_tracking: 1, kept: 2 });
        let remaining = doc.nodes("script");
        assert_eq!(remaining.len(), 2);
        assert_eq!(dom::attr(&remaining[0], "src").as_deref(), Some("https://cdn.example.com/app.js"));
    }

    #[test]
    fn test_verdict_serializes_with_category() {
        let json = serde_json::to_string(&ScriptVerdict::Tracking("social".to_string())).unwrap();
        assert_eq!(json, r#"{"verdict":"tracking","category":"social"}"#);
    }
}
