//! Mutable HTML document.
//!
//! [`Document`] wraps a `dom_query` tree and adds the handful of node
//! helpers the cleaning passes share: lowercase tag names, attribute reads,
//! attachment checks and detaching.
//!
//! Passes collect their matches before mutating, so a node in a collected list
//! may already have been removed together with an ancestor. [`is_attached`]
//! answers whether a node is still reachable from the document root and
//! [`detach`] is a no-op for nodes that are not.
//!
//! # Example
//!
//! ```rust
//! use plainpage_core::Document;
//!
//! let doc = Document::parse("<html><head><title>Test</title></head><body><p>Hello</p></body></html>");
//! assert_eq!(doc.title(), Some("Test".to_string()));
//! assert!(doc.to_pretty_html().contains("Hello"));
//! ```

use dom_query::{NodeRef, Selection};

/// Elements that never have children or a closing tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source", "track", "wbr",
];

/// Elements whose contents the pretty printer emits untouched.
const VERBATIM_ELEMENTS: &[&str] = &["script", "style", "pre", "textarea", "template"];

/// A parsed, mutable HTML document.
///
/// Parsing never fails: malformed markup produces a best-effort tree with the
/// usual `html`/`head`/`body` skeleton.
pub struct Document {
    inner: dom_query::Document,
}

impl Document {
    /// Parses HTML from a string.
    pub fn parse(html: &str) -> Self {
        Self { inner: dom_query::Document::from(html) }
    }

    /// Returns a structurally independent copy of this document.
    pub fn duplicate(&self) -> Self {
        Self::parse(&self.to_html())
    }

    /// Gets the underlying `dom_query` document.
    pub fn inner(&self) -> &dom_query::Document {
        &self.inner
    }

    /// Selects elements with a CSS selector.
    pub fn select(&self, selector: &str) -> Selection<'_> {
        self.inner.select(selector)
    }

    /// Collects the nodes matched by a selector, in document order.
    pub fn nodes(&self, selector: &str) -> Vec<NodeRef<'_>> {
        self.inner.select(selector).nodes().to_vec()
    }

    /// The document node at the top of the tree.
    pub fn root(&self) -> NodeRef<'_> {
        self.inner.root()
    }

    /// Gets the text of the `<title>` element, if present and not blank.
    pub fn title(&self) -> Option<String> {
        let title = self.inner.select("title").text();
        let title = title.trim();
        if title.is_empty() { None } else { Some(title.to_string()) }
    }

    /// Serializes the document without reformatting.
    pub fn to_html(&self) -> String {
        self.inner.html().to_string()
    }

    /// Serializes the document with one tag or text run per line.
    ///
    /// Comments and doctype nodes are dropped and a `<!DOCTYPE html>` line is
    /// emitted instead. Whitespace-only text is skipped and other text is
    /// trimmed. `script`, `style`, `pre`, `textarea` and `template` are written
    /// verbatim.
    pub fn to_pretty_html(&self) -> String {
        let mut out = String::from("<!DOCTYPE html>\n");
        for child in self.root().children() {
            write_pretty(&child, 0, &mut out);
        }
        out
    }
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document").field("html", &self.to_html()).finish()
    }
}

/// Lowercase tag name of an element node.
pub fn tag_name(node: &NodeRef) -> Option<String> {
    node.node_name().map(|name| name.to_lowercase())
}

/// Attribute value as an owned string.
pub fn attr(node: &NodeRef, name: &str) -> Option<String> {
    node.attr(name).map(|value| value.to_string())
}

/// Attribute value, treating a missing attribute as empty.
pub fn attr_or_empty(node: &NodeRef, name: &str) -> String {
    attr(node, name).unwrap_or_default()
}

/// Whether the node is still reachable from the document root.
pub fn is_attached(doc: &Document, node: &NodeRef) -> bool {
    let root = doc.root();
    let mut current = node.clone();
    loop {
        if current.id == root.id {
            return true;
        }
        match current.parent() {
            Some(parent) => current = parent,
            None => return false,
        }
    }
}

/// Detaches a node and its subtree from the document.
///
/// Returns `false` without touching the tree when the node is already
/// detached, directly or through an ancestor.
pub fn detach(doc: &Document, node: &NodeRef) -> bool {
    if !is_attached(doc, node) {
        return false;
    }
    node.remove_from_parent();
    true
}

/// Whether any ancestor of the node is an element with the given tag.
pub fn has_ancestor(node: &NodeRef, tag: &str) -> bool {
    let mut current = node.parent();
    while let Some(parent) = current {
        if parent.is_element() && tag_name(&parent).as_deref() == Some(tag) {
            return true;
        }
        current = parent.parent();
    }
    false
}

/// Element descendants of a node matching a selector.
pub fn descendants<'a>(node: &NodeRef<'a>, selector: &str) -> Vec<NodeRef<'a>> {
    Selection::from(node.clone()).select(selector).nodes().to_vec()
}

/// All text below a node, trimmed.
pub fn trimmed_text(node: &NodeRef) -> String {
    node.text().trim().to_string()
}

fn write_pretty(node: &NodeRef, depth: usize, out: &mut String) {
    let indent = " ".repeat(depth);

    if node.is_text() {
        let text = node.text();
        let text = text.trim();
        if !text.is_empty() {
            out.push_str(&indent);
            out.push_str(&escape_text(text));
            out.push('\n');
        }
        return;
    }

    if !node.is_element() {
        return;
    }

    let Some(name) = tag_name(node) else {
        return;
    };

    if VERBATIM_ELEMENTS.contains(&name.as_str()) {
        out.push_str(&indent);
        out.push_str(&node.html());
        out.push('\n');
        return;
    }

    out.push_str(&indent);
    out.push('<');
    out.push_str(&name);
    for attribute in node.attrs() {
        out.push(' ');
        if let Some(prefix) = &attribute.name.prefix {
            out.push_str(prefix);
            out.push(':');
        }
        out.push_str(&attribute.name.local);
        out.push_str("=\"");
        out.push_str(&escape_attr(&attribute.value));
        out.push('"');
    }
    out.push_str(">\n");

    if VOID_ELEMENTS.contains(&name.as_str()) {
        return;
    }

    for child in node.children() {
        write_pretty(&child, depth + 1, out);
    }

    out.push_str(&indent);
    out.push_str("</");
    out.push_str(&name);
    out.push_str(">\n");
}

fn escape_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '\u{a0}' => escaped.push_str("&nbsp;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn escape_attr(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '"' => escaped.push_str("&quot;"),
            '\u{a0}' => escaped.push_str("&nbsp;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_HTML: &str = r#"
        <!DOCTYPE html>
        <html lang="en">
        <head>
            <meta charset="UTF-8">
            <title>Test Page</title>
        </head>
        <body>
            <!-- layout comment -->
            <h1>Heading</h1>
            <p class="content">Fish &amp; chips</p>
            <pre>  keep   spacing  </pre>
            <img src="a.png" alt="A">
        </body>
        </html>
    "#;

    #[test]
    fn test_parse_and_title() {
        let doc = Document::parse(SAMPLE_HTML);
        assert_eq!(doc.title(), Some("Test Page".to_string()));
    }

    #[test]
    fn test_blank_title_is_none() {
        let doc = Document::parse("<html><head><title>   </title></head></html>");
        assert_eq!(doc.title(), None);
    }

    #[test]
    fn test_pretty_html_layout() {
        let doc = Document::parse(SAMPLE_HTML);
        let pretty = doc.to_pretty_html();

        assert!(pretty.starts_with("<!DOCTYPE html>\n<html lang=\"en\">\n"));
        assert!(pretty.contains("\n  <h1>\n   Heading\n  </h1>\n"));
        assert!(pretty.contains("Fish &amp; chips"));
        assert!(pretty.contains("<pre>  keep   spacing  </pre>"));
        assert!(pretty.contains("<img src=\"a.png\" alt=\"A\">\n"));
        assert!(!pretty.contains("</img>"));
        assert!(!pretty.contains("layout comment"));
    }

    #[test]
    fn test_pretty_html_reparses_equivalently() {
        let doc = Document::parse(SAMPLE_HTML);
        let reparsed = Document::parse(&doc.to_pretty_html());
        assert_eq!(reparsed.title(), doc.title());
        assert_eq!(reparsed.nodes("p.content").len(), 1);
        assert_eq!(reparsed.select("p.content").text().trim(), "Fish & chips");
    }

    #[test]
    fn test_pretty_html_keeps_template_and_prefixed_attributes() {
        let doc = Document::parse(
            r##"<main><template id="t"><p>tpl</p></template><svg><use xlink:href="#icon"></use></svg></main>"##,
        );
        let pretty = doc.to_pretty_html();

        assert!(pretty.contains("<p>tpl</p>"), "{pretty}");
        assert!(pretty.contains(r##"xlink:href="#icon""##), "{pretty}");

        let reparsed = Document::parse(&pretty);
        assert_eq!(reparsed.to_pretty_html(), pretty);
    }

    #[test]
    fn test_detach_is_noop_for_detached_nodes() {
        let doc = Document::parse("<div id=\"outer\"><span id=\"inner\">x</span></div>");
        let outer = doc.nodes("#outer");
        let inner = doc.nodes("#inner");

        assert!(detach(&doc, &outer[0]));
        assert!(!is_attached(&doc, &inner[0]));
        assert!(!detach(&doc, &inner[0]));
        assert!(!detach(&doc, &outer[0]));
        assert!(doc.nodes("span").is_empty());
    }

    #[test]
    fn test_has_ancestor() {
        let doc = Document::parse("<header><nav><a href=\"/\">Home</a></nav></header><nav id=\"solo\"></nav>");
        let navs = doc.nodes("nav");
        assert!(has_ancestor(&navs[0], "header"));
        assert!(!has_ancestor(&navs[1], "header"));
    }

    #[test]
    fn test_attr_helpers() {
        let doc = Document::parse("<script id=\"x\"></script>");
        let script = &doc.nodes("script")[0];
        assert_eq!(attr(script, "id"), Some("x".to_string()));
        assert_eq!(attr_or_empty(script, "src"), "");
        assert_eq!(tag_name(script), Some("script".to_string()));
    }
}
