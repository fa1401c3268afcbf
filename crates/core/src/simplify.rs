//! End-to-end page simplification.
//!
//! Parses the page, cleans a copy, compacts its main content into a prompt,
//! asks a [`ContentGenerator`] for a simplified block and splices the block
//! back into either the untouched original or the cleaned copy.
//!
//! Parsed trees are not `Send`, so everything that touches a tree happens
//! before or after the generator call, never across it.

use serde::{Deserialize, Serialize};

use crate::dom::Document;
use crate::extract::{Locator, canonical_url, extract_main_content, locate_main, prompt_html};
use crate::generator::{ContentGenerator, PromptInput};
use crate::options::CleanOptions;
use crate::pipeline::{CleanReport, clean_document};
use crate::signatures::Signatures;
use crate::splice::{SpliceConfig, splice_main_content};
use crate::{PlainpageError, Result};

/// Which tree the generated block is spliced into.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpliceBase {
    /// The page as received; site chrome and scripts stay intact.
    #[default]
    Original,
    /// The cleaned copy.
    Cleaned,
}

/// Settings for [`simplify_page`].
#[derive(Debug, Clone, Default)]
pub struct SimplifyConfig {
    pub clean: CleanOptions,
    pub signatures: Signatures,
    pub splice: SpliceConfig,
    pub base: SpliceBase,
}

/// Result of [`simplify_page`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Simplified {
    /// The spliced page.
    pub html: String,
    pub canonical_url: Option<String>,
    /// Where the main content was found in the cleaned copy.
    pub locator: Locator,
    pub report: CleanReport,
}

/// Everything the generator call needs, detached from any parsed tree.
#[derive(Debug)]
struct Prepared {
    input: PromptInput,
    base_html: String,
    locator: Locator,
    report: CleanReport,
}

fn prepare(html: &str, config: &SimplifyConfig) -> Result<Prepared> {
    let original = Document::parse(html);
    let canonical = canonical_url(&original);

    let cleaned = original.duplicate();
    let report = clean_document(&cleaned, &config.clean, &config.signatures);
    let main = extract_main_content(&cleaned);

    let base_html = match config.base {
        SpliceBase::Original => html.to_string(),
        SpliceBase::Cleaned => cleaned.to_html(),
    };

    let base = match config.base {
        SpliceBase::Original => &original,
        SpliceBase::Cleaned => &cleaned,
    };
    if locate_main(base).is_none() {
        return Err(PlainpageError::NotFound(
            "main-content candidate (main, #main-content, [role=main], body)".to_string(),
        ));
    }

    let compact = prompt_html(&main.html);
    tracing::debug!(
        locator = ?main.locator,
        prompt_chars = compact.chars().count(),
        elements_removed = report.elements_removed(),
        "prepared prompt"
    );

    Ok(Prepared {
        input: PromptInput { html: compact, canonical_url: canonical },
        base_html,
        locator: main.locator,
        report,
    })
}

/// Simplifies a page with `generator`.
///
/// # Errors
///
/// [`PlainpageError::NotFound`] when the splice base has no main-content
/// candidate (checked before the generator is called), generator failures
/// as returned by the generator, and [`PlainpageError::Malformed`] when the
/// generated block cannot be normalized.
pub async fn simplify_page<G: ContentGenerator>(
    html: &str, generator: &G, config: &SimplifyConfig,
) -> Result<Simplified> {
    let prepared = prepare(html, config)?;

    let raw = generator.generate(&prepared.input).await?;

    let base = Document::parse(&prepared.base_html);
    let spliced = splice_main_content(&base, &raw, &config.splice).inspect_err(|e| {
        tracing::warn!(error = %e, "generated content could not be spliced");
    })?;

    Ok(Simplified {
        html: spliced,
        canonical_url: prepared.input.canonical_url,
        locator: prepared.locator,
        report: prepared.report,
    })
}
