//! The cleaning pipeline.
//!
//! Runs every filter over one parsed tree, in this order:
//!
//! 1. element pruning
//! 2. script classification
//! 3. `aria-hidden` and `display: none` removal
//! 4. chrome filter (navigation-aware variant only), judging headers on what
//!    1-3 left behind
//! 5. attribute stripping (after 3, which reads `style`)
//! 6. emptiness removal (last, since earlier removals can empty a parent)
//!
//! # Example
//!
//! ```rust
//! use plainpage_core::{CleanOptions, Signatures, clean_html};
//!
//! let html = r#"<html><body>
//!     <script src="https://www.googletagmanager.com/gtm.js"></script>
//!     <main><p style="color:red">Hello</p><div></div></main>
//! </body></html>"#;
//!
//! let cleaned = clean_html(html, &CleanOptions::default(), &Signatures::default());
//! assert!(!cleaned.contains("googletagmanager"));
//! assert!(!cleaned.contains("style="));
//! assert!(cleaned.contains("Hello"));
//! ```

use serde::Serialize;

use crate::chrome::filter_chrome;
use crate::dom::Document;
use crate::options::CleanOptions;
use crate::prune::{prune_elements, strip_attributes};
use crate::scripts::remove_tracking_scripts;
use crate::signatures::Signatures;
use crate::visibility::{remove_aria_hidden, remove_display_none, remove_empty_containers};

/// Removal counts from one pipeline run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CleanReport {
    pub headers_removed: usize,
    pub headers_kept: usize,
    pub footers_removed: usize,
    pub elements_pruned: usize,
    pub scripts_removed: usize,
    pub scripts_kept: usize,
    pub aria_hidden_removed: usize,
    pub display_none_removed: usize,
    pub attributes_stripped: usize,
    pub empty_removed: usize,
}

impl CleanReport {
    /// Number of elements removed across all passes.
    pub fn elements_removed(&self) -> usize {
        self.headers_removed
            + self.footers_removed
            + self.elements_pruned
            + self.scripts_removed
            + self.aria_hidden_removed
            + self.display_none_removed
            + self.empty_removed
    }

    /// Whether the run changed nothing.
    pub fn is_unchanged(&self) -> bool {
        self.elements_removed() == 0 && self.attributes_stripped == 0
    }
}

/// Cleans a document in place.
pub fn clean_document(doc: &Document, options: &CleanOptions, signatures: &Signatures) -> CleanReport {
    let mut report = CleanReport::default();

    report.elements_pruned = prune_elements(doc, options, signatures);

    let scripts = remove_tracking_scripts(doc, signatures);
    report.scripts_removed = scripts.removed();
    report.scripts_kept = scripts.kept;

    report.aria_hidden_removed = remove_aria_hidden(doc);
    report.display_none_removed = remove_display_none(doc);

    if options.preserve_navigational_headers {
        let chrome = filter_chrome(doc, signatures);
        report.headers_removed = chrome.headers_removed;
        report.headers_kept = chrome.headers_kept;
        report.footers_removed = chrome.footers_removed;
    }

    report.attributes_stripped = strip_attributes(doc, options, signatures);
    report.empty_removed = remove_empty_containers(doc, options.max_empty_passes);

    tracing::debug!(
        elements_removed = report.elements_removed(),
        attributes_stripped = report.attributes_stripped,
        empty_removed = report.empty_removed,
        "cleaned document"
    );
    report
}

/// Parses, cleans and pretty-prints HTML.
pub fn clean_html(html: &str, options: &CleanOptions, signatures: &Signatures) -> String {
    let doc = Document::parse(html);
    clean_document(&doc, options, signatures);
    doc.to_pretty_html()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<!DOCTYPE html>
        <html style="scroll-behavior:smooth">
        <head>
            <meta charset="utf-8">
            <meta name="description" content="x">
            <link rel="canonical" href="https://example.com/ci">
            <style>.a{}</style>
            <script src="https://cdn.cookielaw.org/otSDKStub.js"></script>
        </head>
        <body>
            <header class="site-header"><div class="logo"><a href="/">Brand</a></div></header>
            <header class="hero"><h2>Promo</h2></header>
            <div id="onetrust-consent-sdk"><p>We use cookies</p></div>
            <main>
                <div class="wrapper" style="display: none"><p>hidden copy</p></div>
                <div data-cy="card" class="card" style="padding:4px"><h2>Coverage</h2><p>Details</p></div>
                <span aria-hidden="true">*</span>
                <div><span></span></div>
                <script type="application/ld+json">{}</script>
                <script>gtag('config', 'x');</script>
            </main>
            <footer>Copyright</footer>
        </body>
        </html>"#;

    #[test]
    fn test_full_clean() {
        let doc = Document::parse(PAGE);
        let report = clean_document(&doc, &CleanOptions::default(), &Signatures::default());

        assert_eq!(report.headers_kept, 1);
        assert_eq!(report.headers_removed, 1);
        assert_eq!(report.footers_removed, 1);
        assert_eq!(report.scripts_removed, 3);
        assert_eq!(report.aria_hidden_removed, 1);
        assert_eq!(report.display_none_removed, 1);
        assert_eq!(report.empty_removed, 1);

        let html = doc.to_html();
        assert!(html.contains("Brand"));
        assert!(!html.contains("Promo"));
        assert!(!html.contains("We use cookies"));
        assert!(!html.contains("hidden copy"));
        assert!(!html.contains("data-cy"));
        assert!(!html.contains("padding"));
        assert!(html.contains(r#"class="card""#));
        assert!(html.contains("scroll-behavior"));
        assert!(!html.contains("Copyright"));
        assert!(!html.contains("canonical"));
        assert!(!html.contains("description"));
    }

    #[test]
    fn test_basic_variant() {
        let doc = Document::parse(PAGE);
        let report = clean_document(&doc, &CleanOptions::basic(), &Signatures::default());
        assert_eq!(report.headers_kept, 0);
        assert!(doc.nodes("header").is_empty());
        assert!(!doc.to_html().contains("scroll-behavior"));
    }

    #[test]
    fn test_second_run_is_fixed_point() {
        let first = clean_html(PAGE, &CleanOptions::default(), &Signatures::default());
        let doc = Document::parse(&first);
        let report = clean_document(&doc, &CleanOptions::default(), &Signatures::default());
        assert!(report.is_unchanged(), "{report:?}");
    }

    fn assert_fixed_point(html: &str) -> String {
        let first = clean_html(html, &CleanOptions::default(), &Signatures::default());
        let doc = Document::parse(&first);
        let report = clean_document(&doc, &CleanOptions::default(), &Signatures::default());
        assert!(report.is_unchanged(), "second run changed {first}: {report:?}");
        first
    }

    #[test]
    fn test_header_kept_only_by_hidden_toggle_is_removed_once() {
        let cleaned = assert_fixed_point(
            r#"<body><header><div class="menu-toggle" aria-hidden="true">=</div><h1>Spring sale</h1></header>
               <main><p>Body</p></main></body>"#,
        );
        assert!(!cleaned.contains("Spring sale"));
    }

    #[test]
    fn test_header_kept_only_by_empty_logo_is_removed_once() {
        let cleaned = assert_fixed_point(
            r#"<body><header><span class="logo"></span><h1>Spring sale</h1></header>
               <main><p>Body</p></main></body>"#,
        );
        assert!(!cleaned.contains("Spring sale"));
    }

    #[test]
    fn test_header_kept_only_by_pruned_banner_is_removed_once() {
        let cleaned = assert_fixed_point(
            r#"<body><header><div class="banner"><ul class="menu"><li><a href="/">Home</a></li></ul></div>
               <h1>Spring sale</h1></header><main><p>Body</p></main></body>"#,
        );
        assert!(!cleaned.contains("Spring sale"));
    }

    #[test]
    fn test_navigational_header_survives_second_run() {
        let cleaned = assert_fixed_point(
            r#"<body><header><nav><a href="/">Home</a></nav><span class="logo"></span></header>
               <main><p>Body</p></main></body>"#,
        );
        assert!(cleaned.contains("<nav>"));
        assert!(cleaned.contains("Home"));
    }

    #[test]
    fn test_malformed_input_does_not_panic() {
        let cleaned = clean_html(
            "<div><p>unclosed <b>bold <script>gtag('x')</div></span><<>>",
            &CleanOptions::default(),
            &Signatures::default(),
        );
        assert!(cleaned.contains("unclosed"));
        assert!(!cleaned.contains("gtag"));
    }
}
