//! Navigation-aware header and footer filter.
//!
//! A `<header>` survives when it looks like site navigation: it contains a
//! `<nav>`, a descendant whose class mentions navigation, a menu or a logo, or
//! an image whose alt text names a logo or home link. Footers are always
//! removed.
//!
//! A header that cannot be classified is kept.

use dom_query::NodeRef;
use regex::{Regex, RegexBuilder};

use crate::dom::{self, Document};
use crate::signatures::Signatures;
use crate::visibility;
use crate::{PlainpageError, Result};

/// Compiled navigation patterns.
#[derive(Debug, Clone)]
pub struct NavigationProbe {
    class_pattern: Regex,
    alt_pattern: Regex,
}

impl NavigationProbe {
    /// Compiles the class and alt-text patterns case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns [`PlainpageError::InvalidSignature`] when a pattern does not compile.
    pub fn compile(signatures: &Signatures) -> Result<Self> {
        Ok(Self {
            class_pattern: compile_pattern(&signatures.navigation_class_pattern)?,
            alt_pattern: compile_pattern(&signatures.navigation_alt_pattern)?,
        })
    }

    /// Whether the element holds navigation.
    pub fn probe(&self, element: &NodeRef) -> bool {
        self.matches(element, |_| true)
    }

    /// Like [`probe`](Self::probe), but ignores descendants that sit inside
    /// an empty `div` or `span`, which the emptiness pass removes later.
    pub fn probe_surviving(&self, element: &NodeRef) -> bool {
        self.matches(element, |node| !inside_empty_container(node, element))
    }

    fn matches(&self, element: &NodeRef, counts: impl Fn(&NodeRef) -> bool) -> bool {
        if dom::descendants(element, "nav").iter().any(|node| counts(node)) {
            return true;
        }

        let classes = dom::descendants(element, "[class]")
            .iter()
            .filter(|node| counts(node))
            .map(|node| dom::attr_or_empty(node, "class"))
            .collect::<Vec<_>>()
            .join(" ");
        if self.class_pattern.is_match(&classes) {
            return true;
        }

        dom::descendants(element, "img[alt]")
            .iter()
            .filter(|node| counts(node))
            .any(|img| self.alt_pattern.is_match(&dom::attr_or_empty(img, "alt")))
    }
}

/// Whether `node`, or an ancestor below `boundary`, is an empty container.
fn inside_empty_container(node: &NodeRef, boundary: &NodeRef) -> bool {
    let mut current = Some(node.clone());
    while let Some(candidate) = current {
        if candidate.id == boundary.id {
            return false;
        }
        if visibility::is_removable_empty(&candidate) {
            return true;
        }
        current = candidate.parent();
    }
    false
}

fn compile_pattern(pattern: &str) -> Result<Regex> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|e| PlainpageError::InvalidSignature(format!("{pattern}: {e}")))
}

/// Whether the element contains navigation.
///
/// Falls back to `true` when the signature patterns are unusable, so an
/// unclassifiable header is preserved.
pub fn contains_navigation(element: &NodeRef, signatures: &Signatures) -> bool {
    match NavigationProbe::compile(signatures) {
        Ok(probe) => probe.probe(element),
        Err(e) => {
            tracing::warn!(error = %e, "navigation check failed, keeping element");
            true
        }
    }
}

/// Counts of chrome elements removed by [`filter_chrome`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChromeReport {
    pub headers_removed: usize,
    pub headers_kept: usize,
    pub footers_removed: usize,
}

/// Removes non-navigational headers and every footer.
///
/// Runs after the pruning, script and visibility passes so each header is
/// judged on what survives them. Footers go first, then headers innermost
/// first, so an outer header sees its subtree without any nested header that
/// was removed. Descendants inside empty containers do not count as
/// navigation.
pub fn filter_chrome(doc: &Document, signatures: &Signatures) -> ChromeReport {
    let mut report = ChromeReport::default();

    let probe = match NavigationProbe::compile(signatures) {
        Ok(probe) => Some(probe),
        Err(e) => {
            tracing::warn!(error = %e, "navigation patterns unusable, keeping all headers");
            None
        }
    };

    for footer in doc.nodes("footer") {
        if dom::detach(doc, &footer) {
            report.footers_removed += 1;
        }
    }

    for header in doc.nodes("header").iter().rev() {
        if !dom::is_attached(doc, header) {
            continue;
        }
        let navigational = probe.as_ref().is_none_or(|p| p.probe_surviving(header));
        if navigational {
            report.headers_kept += 1;
        } else if dom::detach(doc, header) {
            report.headers_removed += 1;
        }
    }

    tracing::debug!(
        headers_removed = report.headers_removed,
        headers_kept = report.headers_kept,
        footers_removed = report.footers_removed,
        "chrome filter"
    );
    report
}
