//! Hidden and empty element removal.

use regex::Regex;
use std::sync::LazyLock;

use crate::dom::{self, Document};

static DISPLAY_NONE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"display\s*:\s*none").unwrap());

/// Containers removed when they hold no content.
const EMPTY_CANDIDATES: &str = "div, span";

/// Descendants that make a container meaningful even without text.
const MEANINGFUL_TAGS: &str = "img, a, h1, h2, h3, h4, h5, h6";

/// Removes elements marked `aria-hidden="true"`.
pub fn remove_aria_hidden(doc: &Document) -> usize {
    doc.nodes("[aria-hidden]")
        .iter()
        .filter(|node| dom::attr(node, "aria-hidden").as_deref() == Some("true"))
        .filter(|node| dom::detach(doc, node))
        .count()
}

/// Removes elements whose inline style hides them with `display: none`.
///
/// Nodes already detached with a hidden ancestor are skipped before their
/// style is read.
pub fn remove_display_none(doc: &Document) -> usize {
    let mut removed = 0;
    for node in doc.nodes("[style]") {
        if !dom::is_attached(doc, &node) {
            continue;
        }
        let style = dom::attr_or_empty(&node, "style").to_lowercase();
        if DISPLAY_NONE.is_match(&style) && dom::detach(doc, &node) {
            removed += 1;
        }
    }
    removed
}

/// Whether a container has neither text nor a meaningful descendant.
pub fn is_empty_container(node: &dom_query::NodeRef) -> bool {
    dom::trimmed_text(node).is_empty() && dom::descendants(node, MEANINGFUL_TAGS).is_empty()
}

/// Whether the node is a `div` or `span` the emptiness pass would remove.
pub(crate) fn is_removable_empty(node: &dom_query::NodeRef) -> bool {
    node.is_element()
        && dom::tag_name(node).is_some_and(|name| name == "div" || name == "span")
        && is_empty_container(node)
}

/// Removes empty `div` and `span` elements.
///
/// Runs at most `max_passes` passes (at least one) and stops early once a
/// pass removes nothing.
pub fn remove_empty_containers(doc: &Document, max_passes: usize) -> usize {
    let mut total = 0;
    for pass in 0..max_passes.max(1) {
        let mut removed = 0;
        for node in doc.nodes(EMPTY_CANDIDATES) {
            if dom::is_attached(doc, &node) && is_empty_container(&node) && dom::detach(doc, &node) {
                removed += 1;
            }
        }
        tracing::trace!(pass, removed, "emptiness pass");
        total += removed;
        if removed == 0 {
            break;
        }
    }
    total
}
