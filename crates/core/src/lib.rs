pub mod chrome;
pub mod dom;
pub mod error;
pub mod extract;
#[cfg(feature = "fetch")]
pub mod fetch;
pub mod generator;
pub mod knowledge;
pub mod options;
pub mod pipeline;
pub mod prune;
pub mod scripts;
pub mod signatures;
pub mod simplify;
pub mod splice;
pub mod visibility;

pub use chrome::{ChromeReport, NavigationProbe, contains_navigation, filter_chrome};
pub use dom::Document;
pub use error::{PlainpageError, Result};
pub use extract::{Locator, MainContent, canonical_url, extract_main_content, prompt_html};
#[cfg(feature = "fetch")]
pub use fetch::{FetchConfig, Input, fetch_file, fetch_stdin, fetch_url};
#[cfg(feature = "fetch")]
pub use generator::ChatCompletionsGenerator;
pub use generator::{ContentGenerator, GeneratorConfig, PromptInput};
pub use knowledge::{DirectoryIndexer, KnowledgeConfig, KnowledgeDocument, KnowledgeIndexer, knowledge_document};
pub use options::{CleanOptions, CleanOptionsBuilder};
pub use pipeline::{CleanReport, clean_document, clean_html};
#[doc(hidden)]
pub use prune::{prune_elements, strip_attributes};
pub use scripts::{ScriptFacts, ScriptReport, ScriptVerdict, classify_script, remove_tracking_scripts};
pub use signatures::Signatures;
pub use simplify::{SimplifyConfig, Simplified, SpliceBase, simplify_page};
pub use splice::{DEFAULT_CSS, SpliceConfig, normalize_replacement, splice_main_content};
#[doc(hidden)]
pub use visibility::{remove_aria_hidden, remove_display_none, remove_empty_containers};
