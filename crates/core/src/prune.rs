//! Tag and attribute pruning.
//!
//! Removes whole elements that never carry reader-facing content (style
//! blocks, frames, SEO links, browser-extension widgets, consent banners) and
//! strips vendor attributes from what remains.

use crate::dom::{self, Document};
use crate::options::CleanOptions;
use crate::signatures::Signatures;

/// Tags removed in every variant.
const DENIED_TAGS: &[&str] = &["style", "iframe", "noscript"];

/// Page chrome removed unconditionally by the basic variant.
const CHROME_TAGS: &[&str] = &["nav", "header", "footer"];

/// Tags that may keep their `style` attribute.
const ROOT_TAGS: &[&str] = &["html", "head", "body"];

/// Removes denied tags and non-content elements. Returns the number removed.
///
/// In the navigation-aware variant `header` and `footer` are left to the
/// chrome filter, and `nav` survives inside a kept `header`.
pub fn prune_elements(doc: &Document, options: &CleanOptions, signatures: &Signatures) -> usize {
    let mut removed = remove_denied_tags(doc, options);
    removed += remove_extension_elements(doc, signatures);
    removed += remove_hint_links(doc, signatures);
    removed += remove_meta(doc, signatures);
    removed += remove_consent_banners(doc, signatures);
    removed
}

fn remove_denied_tags(doc: &Document, options: &CleanOptions) -> usize {
    let mut removed = 0;
    for tag in DENIED_TAGS {
        removed += doc.nodes(tag).iter().filter(|node| dom::detach(doc, node)).count();
    }

    for tag in CHROME_TAGS {
        for node in doc.nodes(tag) {
            let keep = options.preserve_navigational_headers
                && (*tag != "nav" || dom::has_ancestor(&node, "header"));
            if !keep && dom::detach(doc, &node) {
                removed += 1;
            }
        }
    }
    removed
}

fn remove_extension_elements(doc: &Document, signatures: &Signatures) -> usize {
    let mut removed = 0;
    for node in doc.nodes("*") {
        let is_extension_tag = dom::tag_name(&node)
            .is_some_and(|name| signatures.extension_tags.iter().any(|tag| tag.eq_ignore_ascii_case(&name)));
        let is_extension_marked = ["class", "id"]
            .iter()
            .filter_map(|name| dom::attr(&node, name))
            .any(|value| signatures.matches_extension_token(&value));

        if (is_extension_tag || is_extension_marked) && dom::detach(doc, &node) {
            removed += 1;
        }
    }
    removed
}

fn remove_hint_links(doc: &Document, signatures: &Signatures) -> usize {
    let mut removed = 0;
    for link in doc.nodes("link[rel]") {
        let rel = dom::attr_or_empty(&link, "rel").to_lowercase();
        let denied = rel
            .split_whitespace()
            .any(|token| signatures.link_rels.iter().any(|r| r == token));
        if denied && dom::detach(doc, &link) {
            removed += 1;
        }
    }
    removed
}

fn remove_meta(doc: &Document, signatures: &Signatures) -> usize {
    let mut removed = 0;
    for meta in doc.nodes("meta") {
        let has_charset = meta.has_attr("charset");
        let kept_name = dom::attr(&meta, "name")
            .is_some_and(|name| signatures.meta_names.iter().any(|kept| kept.eq_ignore_ascii_case(&name)));
        if !has_charset && !kept_name && dom::detach(doc, &meta) {
            removed += 1;
        }
    }
    removed
}

fn remove_consent_banners(doc: &Document, signatures: &Signatures) -> usize {
    let mut removed = 0;
    for id in &signatures.consent_ids {
        for node in doc.nodes("[id]") {
            if dom::attr(&node, "id").as_deref() == Some(id.as_str()) && dom::detach(doc, &node) {
                removed += 1;
            }
        }
    }

    for node in doc.nodes("[class]") {
        let class = dom::attr_or_empty(&node, "class");
        let marked = class
            .split_whitespace()
            .any(|token| signatures.consent_classes.iter().any(|c| c == token));
        if marked && dom::detach(doc, &node) {
            removed += 1;
        }
    }
    removed
}

/// Strips `style` and denylisted vendor attributes. Returns the number of
/// attributes removed.
///
/// Must run after the visibility filter, which reads `style`.
pub fn strip_attributes(doc: &Document, options: &CleanOptions, signatures: &Signatures) -> usize {
    let mut removed = 0;
    for node in doc.nodes("*") {
        let is_root = dom::tag_name(&node).is_some_and(|name| ROOT_TAGS.contains(&name.as_str()));
        if node.has_attr("style") && (options.strip_root_styles || !is_root) {
            node.remove_attr("style");
            removed += 1;
        }

        for name in &signatures.denied_attributes {
            if node.has_attr(name) {
                node.remove_attr(name);
                removed += 1;
            }
        }
    }
    removed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prune(html: &str, options: CleanOptions) -> (Document, usize) {
        let doc = Document::parse(html);
        let removed = prune_elements(&doc, &options, &Signatures::default());
        (doc, removed)
    }

    #[test]
    fn test_denied_tags_removed() {
        let (doc, removed) = prune(
            r#"<html><head><style>p{}</style></head><body>
                <iframe src="https://ads.example"></iframe>
                <noscript>Enable JavaScript</noscript>
                <p>Content</p></body></html>"#,
            CleanOptions::default(),
        );
        assert_eq!(removed, 3);
        let html = doc.to_html();
        assert!(!html.contains("<style"));
        assert!(!html.contains("<iframe"));
        assert!(!html.contains("Enable JavaScript"));
        assert!(html.contains("<p>Content</p>"));
    }

    #[test]
    fn test_basic_variant_removes_chrome() {
        let (doc, _) = prune(
            r#"<header><nav><a href="/">Home</a></nav></header><main>Body</main><footer>Foot</footer>"#,
            CleanOptions::basic(),
        );
        assert!(doc.nodes("header").is_empty());
        assert!(doc.nodes("nav").is_empty());
        assert!(doc.nodes("footer").is_empty());
        assert_eq!(doc.nodes("main").len(), 1);
    }

    #[test]
    fn test_aware_variant_keeps_nav_inside_header() {
        let (doc, _) = prune(
            r#"<header><nav id="top"><a href="/">Home</a></nav></header><nav id="side">Side</nav>"#,
            CleanOptions::default(),
        );
        assert_eq!(doc.nodes("header").len(), 1);
        assert_eq!(doc.nodes("nav#top").len(), 1);
        assert!(doc.nodes("nav#side").is_empty());
    }

    #[test]
    fn test_extension_elements_removed() {
        let (doc, removed) = prune(
            r#"<body><grammarly-desktop-integration></grammarly-desktop-integration>
                <div class="x-ApolloIO-widget">Apollo</div>
                <div id="extension-opener-1">Opener</div>
                <div class="article">Keep</div></body>"#,
            CleanOptions::default(),
        );
        assert_eq!(removed, 3);
        let html = doc.to_html();
        assert!(!html.contains("grammarly"));
        assert!(!html.contains("Apollo"));
        assert!(!html.contains("Opener"));
        assert!(html.contains("Keep"));
    }

    #[test]
    fn test_links_and_meta() {
        let (doc, _) = prune(
            r#"<html><head>
                <meta charset="utf-8">
                <meta name="viewport" content="width=device-width">
                <meta name="description" content="SEO">
                <meta property="og:title" content="OG">
                <link rel="preload" href="/font.woff2">
                <link rel="dns-prefetch prefetch" href="//cdn">
                <link rel="canonical" href="https://example.com/page">
                <link rel="alternate" hreflang="fr" href="/fr">
                <link rel="stylesheet" href="/site.css">
            </head><body></body></html>"#,
            CleanOptions::default(),
        );
        assert_eq!(doc.nodes("meta").len(), 2);
        assert_eq!(doc.nodes("link").len(), 1);
        assert_eq!(doc.nodes("link[rel=stylesheet]").len(), 1);
    }

    #[test]
    fn test_consent_banners_removed() {
        let (doc, _) = prune(
            r#"<div id="onetrust-consent-sdk">Consent</div>
               <div class="cookie notice">Cookies</div>
               <div class="banner">Promo</div>
               <div class="cookie-policy-link">Policy</div>"#,
            CleanOptions::default(),
        );
        let html = doc.to_html();
        assert!(!html.contains("Consent"));
        assert!(!html.contains("Cookies"));
        assert!(!html.contains("Promo"));
        assert!(html.contains("Policy"));
    }

    #[test]
    fn test_strip_attributes_keeps_class() {
        let doc = Document::parse(
            r#"<body style="margin:0"><div class="form" style="display:block" data-parsley-required="true" data-cy="f">x</div></body>"#,
        );
        let removed = strip_attributes(&doc, &CleanOptions::default(), &Signatures::default());
        assert_eq!(removed, 3);

        let div = &doc.nodes("div")[0];
        assert!(!div.has_attr("style"));
        assert!(!div.has_attr("data-parsley-required"));
        assert!(!div.has_attr("data-cy"));
        assert_eq!(dom::attr(div, "class"), Some("form".to_string()));
        assert!(doc.nodes("body")[0].has_attr("style"));
    }

    #[test]
    fn test_strip_root_styles() {
        let doc = Document::parse(r#"<html style="color:red"><body style="margin:0"><p>x</p></body></html>"#);
        strip_attributes(&doc, &CleanOptions::basic(), &Signatures::default());
        assert!(!doc.nodes("html")[0].has_attr("style"));
        assert!(!doc.nodes("body")[0].has_attr("style"));
    }
}
