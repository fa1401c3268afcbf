use dom_query::NodeRef;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use crate::dom::{self, Document};

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Where the main content was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Locator {
    /// A `<main>` element.
    Main,
    /// An element with `id="main-content"`.
    MainContentId,
    /// An element with a `role="main"` attribute.
    RoleMain,
    /// The document body.
    Body,
    /// The whole document.
    Document,
}

impl Locator {
    /// Candidates in priority order with the selector that finds them.
    ///
    /// [`Locator::Document`] has no selector and is not listed.
    pub const CANDIDATES: [(Locator, &'static str); 4] = [
        (Locator::Main, "main"),
        (Locator::MainContentId, "#main-content"),
        (Locator::RoleMain, "[role=\"main\"]"),
        (Locator::Body, "body"),
    ];
}

/// The main content of a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MainContent {
    /// Outer HTML of the main-content element.
    pub html: String,
    /// Canonical URL of the page, if declared.
    pub canonical_url: Option<String>,
    /// Which candidate matched.
    pub locator: Locator,
}

/// Finds the first main-content candidate element, excluding the whole-document fallback.
pub fn locate_main(doc: &Document) -> Option<(Locator, NodeRef<'_>)> {
    Locator::CANDIDATES.iter().find_map(|(locator, selector)| {
        doc.nodes(selector).into_iter().next().map(|node| (*locator, node))
    })
}

/// Returns the `href` of the first `<link rel="canonical">`.
pub fn canonical_url(doc: &Document) -> Option<String> {
    doc.nodes("link[rel][href]")
        .iter()
        .find(|link| {
            dom::attr_or_empty(link, "rel")
                .split_whitespace()
                .any(|token| token.eq_ignore_ascii_case("canonical"))
        })
        .and_then(|link| dom::attr(link, "href"))
        .map(|href| href.trim().to_string())
        .filter(|href| !href.is_empty())
}

/// Extracts the main-content subtree and the canonical URL.
///
/// Does not modify the document. Falls back to the whole document when not
/// even `<body>` exists.
pub fn extract_main_content(doc: &Document) -> MainContent {
    let canonical_url = canonical_url(doc);
    match locate_main(doc) {
        Some((locator, node)) => MainContent { html: node.html().to_string(), canonical_url, locator },
        None => MainContent { html: doc.to_html(), canonical_url, locator: Locator::Document },
    }
}

/// Compacts main-content HTML for a language-model prompt.
///
/// Drops every attribute except `href` on anchors and collapses whitespace
/// runs to single spaces.
pub fn prompt_html(html: &str) -> String {
    let stripped = strip_attributes_for_prompt(html);
    collapse_whitespace(&stripped)
}

fn strip_attributes_for_prompt(html: &str) -> String {
    let mut output = String::new();
    let mut rewriter = lol_html::HtmlRewriter::new(
        lol_html::Settings {
            element_content_handlers: vec![lol_html::element!("*", |el| {
                let keep_href = el.tag_name() == "a";
                let names: Vec<String> = el.attributes().iter().map(|a| a.name()).collect();
                for name in names {
                    if !(keep_href && name == "href") {
                        el.remove_attribute(&name);
                    }
                }
                Ok(())
            })],
            ..Default::default()
        },
        |c: &[u8]| {
            output.push_str(&String::from_utf8_lossy(c));
        },
    );

    match rewriter.write(html.as_bytes()) {
        Ok(_) => {}
        Err(_) => return html.to_string(),
    }

    match rewriter.end() {
        Ok(_) => {}
        Err(_) => return html.to_string(),
    }

    if output.is_empty() { html.to_string() } else { output }
}

fn collapse_whitespace(html: &str) -> String {
    WHITESPACE.replace_all(html, " ").trim().to_string()
}
