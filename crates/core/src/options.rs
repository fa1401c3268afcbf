//! Cleaning pipeline options.

use serde::{Deserialize, Serialize};

/// Toggles that select between the aggressive and the navigation-aware
/// cleaning variants.
///
/// # Example
///
/// ```rust
/// use plainpage_core::CleanOptions;
///
/// let options = CleanOptions::builder()
///     .preserve_navigational_headers(false)
///     .strip_root_styles(true)
///     .build();
/// assert_eq!(options, CleanOptions::basic());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleanOptions {
    /// Keep `<header>` elements that contain navigation (default: true).
    ///
    /// When false, `header`, `footer` and `nav` are removed unconditionally.
    pub preserve_navigational_headers: bool,

    /// Remove `style` attributes from `html`, `head` and `body` too (default: false).
    pub strip_root_styles: bool,

    /// Upper bound on emptiness passes (default: 1).
    ///
    /// One pass matches the reference behaviour. Larger values repeat the
    /// pass until it removes nothing or the bound is reached.
    pub max_empty_passes: usize,
}

impl Default for CleanOptions {
    fn default() -> Self {
        Self { preserve_navigational_headers: true, strip_root_styles: false, max_empty_passes: 1 }
    }
}

impl CleanOptions {
    /// The aggressive variant: chrome removed unconditionally, root styles stripped.
    pub fn basic() -> Self {
        Self { preserve_navigational_headers: false, strip_root_styles: true, ..Self::default() }
    }

    /// Creates a new builder starting from the defaults.
    pub fn builder() -> CleanOptionsBuilder {
        CleanOptionsBuilder::new()
    }
}

/// Builder for [`CleanOptions`].
pub struct CleanOptionsBuilder {
    options: CleanOptions,
}

impl CleanOptionsBuilder {
    /// Creates a new builder with default values.
    pub fn new() -> Self {
        Self { options: CleanOptions::default() }
    }

    /// Sets whether navigational headers survive cleaning.
    pub fn preserve_navigational_headers(mut self, preserve: bool) -> Self {
        self.options.preserve_navigational_headers = preserve;
        self
    }

    /// Sets whether root-level `style` attributes are stripped.
    pub fn strip_root_styles(mut self, strip: bool) -> Self {
        self.options.strip_root_styles = strip;
        self
    }

    /// Sets the emptiness pass bound. Zero is treated as one.
    pub fn max_empty_passes(mut self, passes: usize) -> Self {
        self.options.max_empty_passes = passes.max(1);
        self
    }

    /// Builds the options.
    pub fn build(self) -> CleanOptions {
        self.options
    }
}

impl Default for CleanOptionsBuilder {
    fn default() -> Self {
        Self::new()
    }
}
