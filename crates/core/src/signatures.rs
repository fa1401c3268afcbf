//! Tracker and vendor signature tables.
//!
//! Every heuristic filter reads its keyword lists from a [`Signatures`] value
//! instead of inline literals, so the classifiers can be exercised with small
//! hand-written tables and the vendor lists can be updated without a rebuild.
//!
//! The built-in tables are returned by [`Signatures::default`]. A JSON file
//! with the same shape can replace them (see [`Signatures::from_file`] and
//! [`Signatures::load`]).

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{PlainpageError, Result};

/// Current version of the signature file format.
pub const SIGNATURES_VERSION: u32 = 1;

/// File name looked up in the user configuration directory.
pub const SIGNATURES_FILE: &str = "signatures.json";

/// Static lookup tables used by the cleaning pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Signatures {
    /// Format version, must not exceed [`SIGNATURES_VERSION`].
    pub version: u32,
    /// Category (analytics, social, ...) to substrings matched against a script's `src`.
    pub script_sources: BTreeMap<String, Vec<String>>,
    /// Substrings matched against a script's `id`.
    pub script_ids: Vec<String>,
    /// Substrings matched against a script's text that mark it as a tracker.
    pub script_text_markers: Vec<String>,
    /// Exact `type` values of structured-data blocks.
    pub structured_data_types: Vec<String>,
    /// Inline tracking call signatures matched against a script's text.
    pub inline_tracking: Vec<String>,
    /// Tag names injected by browser extensions.
    pub extension_tags: Vec<String>,
    /// Case-insensitive tokens matched against `class` and `id` values.
    pub extension_tokens: Vec<String>,
    /// Element ids of consent-management banners.
    pub consent_ids: Vec<String>,
    /// Exact class tokens of cookie and banner overlays.
    pub consent_classes: Vec<String>,
    /// `rel` values of `<link>` elements to drop.
    pub link_rels: Vec<String>,
    /// `name` values of `<meta>` elements to keep.
    pub meta_names: Vec<String>,
    /// Attributes removed from every element.
    pub denied_attributes: Vec<String>,
    /// Regex matched case-insensitively against descendant classes of a header.
    pub navigation_class_pattern: String,
    /// Regex matched case-insensitively against descendant image `alt` text of a header.
    pub navigation_alt_pattern: String,
}

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

impl Default for Signatures {
    fn default() -> Self {
        let mut script_sources = BTreeMap::new();
        script_sources.insert(
            "analytics".to_string(),
            owned(&["analytics", "gtag", "google-analytics", "decibelinsight", "coveo"]),
        );
        script_sources.insert(
            "tag_manager".to_string(),
            owned(&["googletagmanager", "tiq.sunlife", "utag", "tealium"]),
        );
        script_sources.insert(
            "social".to_string(),
            owned(&[
                "facebook.net",
                "fbevents",
                "connect.facebook",
                "linkedin.com",
                "li.lms-analytics",
                "reddit",
                "pixel",
                "pinterest",
                "pintrk",
            ]),
        );
        script_sources.insert("consent".to_string(), owned(&["cookielaw", "onetrust"]));
        script_sources.insert("performance".to_string(), owned(&["go-mpulse", "boomerang"]));
        script_sources.insert("extension".to_string(), owned(&["chrome-extension://"]));

        Self {
            version: SIGNATURES_VERSION,
            script_sources,
            script_ids: owned(&["utag"]),
            script_text_markers: owned(&["BOOMR"]),
            structured_data_types: owned(&["application/ld+json"]),
            inline_tracking: owned(&["utag_data", "fbq(", "gtag(", "_linkedin_data_partner_ids"]),
            extension_tags: owned(&["grammarly-desktop-integration", "simplify-jobs-page-script"]),
            extension_tokens: owned(&["apolloio", "extension-opener", "simplify-jobs"]),
            consent_ids: owned(&["onetrust-consent-sdk", "onetrust-banner-sdk", "onetrust-pc-sdk"]),
            consent_classes: owned(&["cookie", "banner"]),
            link_rels: owned(&["preload", "prefetch", "canonical", "alternate"]),
            meta_names: owned(&["viewport", "charset"]),
            denied_attributes: owned(&[
                "data-sl-aem-component",
                "data-sl-component",
                "data-cmp-hook-accordion",
                "data-bs-target",
                "data-bs-toggle",
                "data-bs-dismiss",
                "data-class",
                "data-class-icon",
                "data-parsley-validate",
                "data-parsley-error-message",
                "data-parsley-id",
                "data-parsley-pattern",
                "data-parsley-pattern-message",
                "data-parsley-required",
                "data-parsley-required-message",
                "data-single-expansion",
                "data-title",
                "data-fa-i2svg",
                "data-icon",
                "data-prefix",
                "data-cy",
                "data-grammarly-shadow-root",
            ]),
            navigation_class_pattern: "navigation|menu|logo".to_string(),
            navigation_alt_pattern: "logo|home".to_string(),
        }
    }
}

impl Signatures {
    /// Parses a signature table from JSON.
    ///
    /// Missing fields fall back to the built-in values, so a file only needs
    /// to list the tables it overrides.
    ///
    /// # Errors
    ///
    /// Returns [`PlainpageError::Json`] for invalid JSON and
    /// [`PlainpageError::ConfigError`] for an unsupported version.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let signatures: Signatures = serde_json::from_str(json)?;
        if signatures.version > SIGNATURES_VERSION {
            return Err(PlainpageError::ConfigError(format!(
                "signature file version {} is newer than supported version {}",
                signatures.version, SIGNATURES_VERSION
            )));
        }
        Ok(signatures)
    }

    /// Reads a signature table from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(PlainpageError::FileNotFound(path.to_path_buf()));
        }
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Default location of the user signature file, if a config directory exists.
    pub fn user_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("plainpage").join(SIGNATURES_FILE))
    }

    /// Loads the user signature file when present, otherwise the built-ins.
    ///
    /// A user file that fails to parse is reported and ignored.
    pub fn load() -> Self {
        let Some(path) = Self::user_path() else {
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }
        match Self::from_file(&path) {
            Ok(signatures) => {
                tracing::debug!(path = %path.display(), "loaded user signatures");
                signatures
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring invalid signature file");
                Self::default()
            }
        }
    }

    /// Returns the first script-source category whose substring occurs in `src`.
    ///
    /// `src` and the substrings are compared case-insensitively.
    pub fn script_source_category(&self, src: &str) -> Option<&str> {
        let src = src.to_lowercase();
        if src.is_empty() {
            return None;
        }
        self.script_sources
            .iter()
            .find(|(_, needles)| needles.iter().any(|n| src.contains(&n.to_lowercase())))
            .map(|(category, _)| category.as_str())
    }

    /// Whether `value` (a class or id) contains a browser-extension token.
    pub fn matches_extension_token(&self, value: &str) -> bool {
        let value = value.to_lowercase();
        self.extension_tokens
            .iter()
            .any(|token| value.contains(&token.to_lowercase()))
    }
}
