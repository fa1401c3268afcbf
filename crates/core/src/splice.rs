//! Region splicing.
//!
//! Puts a generated main-content block back into a page: the block replaces
//! the page's main-content element, and a style element carrying the
//! accessibility stylesheet is (re)injected into `<head>`.

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use crate::dom::{self, Document};
use crate::extract::{Locator, locate_main};
use crate::{PlainpageError, Result};

/// Stylesheet injected into spliced pages by default.
pub const DEFAULT_CSS: &str = include_str!("../assets/a11y.css");

static CODE_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*```[A-Za-z0-9_-]*\s*$").unwrap());

/// Shape of the replacement block and the injected style element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpliceConfig {
    /// Tag name the replacement root must have (default: `main`).
    pub root_tag: String,
    /// Class given to a synthesized wrapper (default: `a11y-page`).
    pub wrapper_class: String,
    /// Role given to a synthesized wrapper (default: `main`).
    pub wrapper_role: String,
    /// Id of the injected style element (default: `a11y-simplify-style`).
    pub style_id: String,
    /// Stylesheet text.
    pub css: String,
}

impl Default for SpliceConfig {
    fn default() -> Self {
        Self {
            root_tag: "main".to_string(),
            wrapper_class: "a11y-page".to_string(),
            wrapper_role: "main".to_string(),
            style_id: "a11y-simplify-style".to_string(),
            css: DEFAULT_CSS.to_string(),
        }
    }
}

fn root_block_pattern(tag: &str) -> Result<Regex> {
    let tag = regex::escape(tag);
    RegexBuilder::new(&format!(r"<{tag}\b.*</{tag}\s*>"))
        .case_insensitive(true)
        .dot_matches_new_line(true)
        .build()
        .map_err(|e| PlainpageError::ConfigError(format!("invalid root tag: {e}")))
}

/// Turns generator output into exactly one root element of the required tag.
///
/// Text around the outermost root block (prose, code fences) is dropped. When
/// no root block is present the remaining markup is wrapped in a synthesized
/// root before parsing.
///
/// # Errors
///
/// Returns [`PlainpageError::Malformed`] when the output is blank or does not
/// parse into a single root element.
pub fn normalize_replacement(raw: &str, config: &SpliceConfig) -> Result<String> {
    let unfenced = CODE_FENCE.replace_all(raw, "");
    let unfenced = unfenced.trim();
    if unfenced.is_empty() {
        return Err(PlainpageError::Malformed("replacement is empty".to_string()));
    }

    let tag = config.root_tag.to_lowercase();
    let block = match root_block_pattern(&tag)?.find(unfenced) {
        Some(m) => m.as_str().to_string(),
        None => {
            tracing::debug!(tag = %tag, "replacement lacks a root element, wrapping");
            format!(
                r#"<{tag} class="{}" role="{}">{unfenced}</{tag}>"#,
                config.wrapper_class, config.wrapper_role
            )
        }
    };

    let parsed = Document::parse(&block);
    let roots: Vec<_> = parsed
        .nodes(&tag)
        .into_iter()
        .filter(|node| !dom::has_ancestor(node, &tag))
        .collect();

    match roots.as_slice() {
        [root] => Ok(root.html().to_string()),
        [] => Err(PlainpageError::Malformed(format!("no <{tag}> root element after normalization"))),
        many => Err(PlainpageError::Malformed(format!(
            "expected one <{tag}> root element, found {}",
            many.len()
        ))),
    }
}

/// Replaces the main content of `original` with `replacement` and injects
/// the stylesheet. Returns the serialized page.
///
/// `original` is left untouched; the splice happens on a copy. The target is
/// found with the same order as [`crate::extract_main_content`] minus the
/// whole-document fallback. When the target is `<body>`, the block replaces
/// the body's children. Any other `<main>` elements are removed so the page
/// ends up with a single main region.
///
/// # Errors
///
/// [`PlainpageError::Malformed`] from [`normalize_replacement`], and
/// [`PlainpageError::NotFound`] when the page has no main-content candidate.
pub fn splice_main_content(original: &Document, replacement: &str, config: &SpliceConfig) -> Result<String> {
    let block = normalize_replacement(replacement, config)?;
    let doc = original.duplicate();

    let (locator, target) = locate_main(&doc).ok_or_else(|| {
        PlainpageError::NotFound("main-content candidate (main, #main-content, [role=main], body)".to_string())
    })?;

    let extra = doc
        .nodes("main")
        .iter()
        .filter(|node| node.id != target.id && !dom::has_ancestor(node, "main"))
        .filter(|node| dom::detach(&doc, node))
        .count();
    if extra > 0 {
        tracing::warn!(extra, "page has several <main> elements, keeping the first");
    }

    let target = dom_query::Selection::from(target);
    if locator == Locator::Body {
        target.set_html(block.as_str());
    } else {
        target.replace_with_html(block.as_str());
    }
    tracing::debug!(?locator, "spliced main content");

    inject_style(&doc, config);
    Ok(doc.to_html())
}

/// Ensures a `<head>` exists and holds exactly one injected style element.
fn inject_style(doc: &Document, config: &SpliceConfig) {
    if doc.select("head").is_empty() {
        let parent = doc.nodes("html").into_iter().next().unwrap_or_else(|| doc.root());
        let head = doc.inner().tree.new_element("head");
        parent.prepend_child(&head.id);
    }

    for node in doc.nodes("style[id]") {
        if dom::attr(&node, "id").as_deref() == Some(config.style_id.as_str()) {
            dom::detach(doc, &node);
        }
    }

    let style = format!(r#"<style id="{}">{}</style>"#, config.style_id, config.css);
    doc.select("head").first().append_html(style);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> SpliceConfig {
        SpliceConfig { css: ".a11y-page{color:#111}".to_string(), ..Default::default() }
    }

    #[test]
    fn test_splice_replaces_main() {
        let original = Document::parse(
            r#"<html><head><title>T</title></head><body><nav>Menu</nav><main id="x">OLD</main><aside>Side</aside></body></html>"#,
        );
        let out = splice_main_content(&original, r#"<main class="a11y-page" role="main">NEW</main>"#, &config()).unwrap();

        let spliced = Document::parse(&out);
        assert_eq!(spliced.nodes("main").len(), 1);
        assert_eq!(spliced.select("main").text().trim(), "NEW");
        assert!(!out.contains("OLD"));
        assert!(out.contains("Menu"));
        assert!(out.contains("Side"));
        assert_eq!(spliced.nodes("head style").len(), 1);
        assert_eq!(spliced.nodes("style#a11y-simplify-style").len(), 1);

        assert!(original.to_html().contains("OLD"));
    }

    #[test]
    fn test_splice_into_role_main() {
        let original = Document::parse(r#"<body><div role="main"><p>OLD</p></div><p>after</p></body>"#);
        let out = splice_main_content(&original, "<main>NEW</main>", &config()).unwrap();
        assert!(!out.contains("OLD"));
        assert!(out.contains("<main>NEW</main>"));
        assert!(out.contains("after"));
    }

    #[test]
    fn test_splice_into_body_keeps_body() {
        let original = Document::parse(r#"<html><body><p>OLD</p></body></html>"#);
        let out = splice_main_content(&original, "<main>NEW</main>", &config()).unwrap();
        assert!(out.contains("<body><main>NEW</main></body>"));
    }

    #[test]
    fn test_reinjection_replaces_previous_style() {
        let original = Document::parse(
            r#"<html><head><style id="a11y-simplify-style">old{}</style><style>site{}</style></head><body><main>x</main></body></html>"#,
        );
        let out = splice_main_content(&original, "<main>y</main>", &config()).unwrap();
        let spliced = Document::parse(&out);
        assert_eq!(spliced.nodes("style#a11y-simplify-style").len(), 1);
        assert_eq!(spliced.nodes("style").len(), 2);
        assert!(!out.contains("old{}"));
    }

    #[test]
    fn test_missing_head_is_created() {
        let doc = Document::parse("<html><body><main>x</main></body></html>");
        doc.select("head").remove();
        assert!(doc.nodes("head").is_empty());

        inject_style(&doc, &config());

        assert_eq!(doc.nodes("html > head").len(), 1);
        assert_eq!(doc.nodes("head > style#a11y-simplify-style").len(), 1);
        assert!(doc.to_html().starts_with(r#"<html><head><style id="a11y-simplify-style">"#));
    }

    #[test]
    fn test_extra_main_elements_are_dropped() {
        let original = Document::parse(
            r#"<body><main id="a"><p>first</p></main><p>between</p><main id="b"><p>second</p></main></body>"#,
        );
        let out = splice_main_content(&original, "<main>NEW</main>", &config()).unwrap();

        let spliced = Document::parse(&out);
        assert_eq!(spliced.nodes("main").len(), 1);
        assert_eq!(spliced.select("main").text().trim(), "NEW");
        assert!(out.contains("between"));
        assert!(!out.contains("first"));
        assert!(!out.contains("second"));
    }

    #[test]
    fn test_not_found_without_candidate() {
        let original = Document::parse("<p>x</p>");
        original.select("body").remove();
        let result = splice_main_content(&original, "<main>y</main>", &config());
        assert!(matches!(result, Err(PlainpageError::NotFound(_))));
    }

    #[test]
    fn test_normalize_strips_surrounding_text() {
        let raw = "Here is the page:\n```html\n<main class=\"a11y-page\" role=\"main\"><h1>Hi</h1></main>\n```\nDone.";
        let block = normalize_replacement(raw, &config()).unwrap();
        assert_eq!(block, r#"<main class="a11y-page" role="main"><h1>Hi</h1></main>"#);
    }

    #[test]
    fn test_normalize_wraps_missing_root() {
        let block = normalize_replacement("<h1>Hi</h1><p>Body</p>", &config()).unwrap();
        assert_eq!(block, r#"<main class="a11y-page" role="main"><h1>Hi</h1><p>Body</p></main>"#);
    }

    #[test]
    fn test_normalize_rejects_blank_and_multiple_roots() {
        assert!(matches!(normalize_replacement("  \n ", &config()), Err(PlainpageError::Malformed(_))));
        assert!(matches!(
            normalize_replacement("<main>a</main><main>b</main>", &config()),
            Err(PlainpageError::Malformed(_))
        ));
    }

    #[test]
    fn test_normalize_keeps_nested_root() {
        let block = normalize_replacement("<main><main>inner</main></main>", &config()).unwrap();
        assert_eq!(block, "<main><main>inner</main></main>");
    }
}
