use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};
use owo_colors::OwoColorize;
use plainpage_core::{
    ChatCompletionsGenerator, CleanOptions, CleanReport, DirectoryIndexer, Document, FetchConfig, GeneratorConfig,
    Input, KnowledgeConfig, KnowledgeIndexer, Signatures, SimplifyConfig, SpliceBase, SpliceConfig, canonical_url,
    clean_document, extract_main_content, fetch_file, knowledge_document, prompt_html, simplify_page,
    splice_main_content,
};
use tracing_subscriber::EnvFilter;

mod echo;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Environment variables checked, in order, for the generator API key
const API_KEY_VARS: [&str; 2] = ["PLAINPAGE_API_KEY", "OPENAI_API_KEY"];

/// Tree the generated content is spliced into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct BaseArg(SpliceBase);

impl FromStr for BaseArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "original" => Ok(Self(SpliceBase::Original)),
            "cleaned" => Ok(Self(SpliceBase::Cleaned)),
            _ => Err(format!("Invalid base: {}. Valid options: original, cleaned", s)),
        }
    }
}

/// Strip tracking and boilerplate from web pages and build simplified versions
#[derive(Parser, Debug)]
#[command(name = "plainpage")]
#[command(author = "Plainpage Contributors")]
#[command(version)]
#[command(about = "Strip tracking and boilerplate from web pages and build simplified versions", long_about = None)]
struct Cli {
    /// Signature table (JSON) replacing the built-in tracker lists
    #[arg(long, global = true, value_name = "FILE")]
    signatures: Option<PathBuf>,

    /// HTTP timeout in seconds
    #[arg(long, global = true, default_value = "30", value_name = "SECS")]
    timeout: u64,

    /// Custom User-Agent for HTTP requests
    #[arg(long, global = true, value_name = "UA")]
    user_agent: Option<String>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Clean a page and print the pretty-printed result
    Clean {
        #[command(flatten)]
        io: IoArgs,

        #[command(flatten)]
        cleaning: CleanArgs,

        /// Print the per-stage removal summary to stderr
        #[arg(long)]
        report: bool,
    },

    /// Print the main content of the cleaned page
    Extract {
        #[command(flatten)]
        io: IoArgs,

        #[command(flatten)]
        cleaning: CleanArgs,

        /// Keep attributes and whitespace instead of compacting for a prompt
        #[arg(long)]
        raw: bool,

        /// Print JSON with the canonical URL and the matched locator
        #[arg(long)]
        json: bool,
    },

    /// Print the plain text a knowledge base would receive
    Knowledge {
        #[command(flatten)]
        io: IoArgs,

        #[command(flatten)]
        cleaning: CleanArgs,

        /// Maximum characters of text before truncation
        #[arg(long, default_value = "100000", value_name = "NUM")]
        max_chars: usize,

        /// Print the document as JSON
        #[arg(long)]
        json: bool,

        /// Store the document in this directory instead of printing it
        #[arg(long, value_name = "DIR")]
        index_dir: Option<PathBuf>,
    },

    /// Splice a generated main-content block into a page
    Splice {
        #[command(flatten)]
        io: IoArgs,

        /// File holding the generated block
        #[arg(short, long, value_name = "FILE")]
        replacement: PathBuf,

        /// Stylesheet injected instead of the built-in one
        #[arg(long, value_name = "FILE")]
        css: Option<PathBuf>,
    },

    /// Clean, generate simplified content with a language model, and splice it in
    Simplify {
        #[command(flatten)]
        io: IoArgs,

        #[command(flatten)]
        cleaning: CleanArgs,

        /// Chat-completions endpoint
        #[arg(long, value_name = "URL")]
        endpoint: Option<String>,

        /// Model name
        #[arg(long, value_name = "MODEL")]
        model: Option<String>,

        /// Completion token cap
        #[arg(long, value_name = "NUM")]
        max_tokens: Option<u32>,

        /// Generator request timeout in seconds
        #[arg(long, default_value = "120", value_name = "SECS")]
        generator_timeout: u64,

        /// Splice into the original page or the cleaned copy (original, cleaned)
        #[arg(long, default_value = "original", value_name = "BASE")]
        base: BaseArg,

        /// Stylesheet injected instead of the built-in one
        #[arg(long, value_name = "FILE")]
        css: Option<PathBuf>,
    },
}

#[derive(Args, Debug)]
struct IoArgs {
    /// URL to fetch, local HTML file, or "-" for stdin
    #[arg(value_name = "INPUT")]
    input: String,

    /// Output file (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct CleanArgs {
    /// Remove every header, footer and nav, and strip root styles
    #[arg(long)]
    basic: bool,

    /// Upper bound on emptiness passes
    #[arg(long, default_value = "1", value_name = "NUM")]
    max_empty_passes: usize,
}

impl CleanArgs {
    fn options(&self) -> CleanOptions {
        let base = if self.basic { CleanOptions::basic() } else { CleanOptions::default() };
        CleanOptions::builder()
            .preserve_navigational_headers(base.preserve_navigational_headers)
            .strip_root_styles(base.strip_root_styles)
            .max_empty_passes(self.max_empty_passes)
            .build()
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "plainpage=debug" } else { "plainpage=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_signatures(path: Option<&Path>) -> anyhow::Result<Signatures> {
    match path {
        Some(path) => Signatures::from_file(path)
            .with_context(|| format!("Failed to load signatures: {}", path.display())),
        None => Ok(Signatures::load()),
    }
}

fn splice_config(css: Option<&Path>) -> anyhow::Result<SpliceConfig> {
    let mut config = SpliceConfig::default();
    if let Some(path) = css {
        config.css = fs::read_to_string(path).with_context(|| format!("Failed to read stylesheet: {}", path.display()))?;
    }
    Ok(config)
}

fn api_key() -> Option<String> {
    API_KEY_VARS
        .iter()
        .find_map(|name| std::env::var(name).ok())
        .filter(|key| !key.trim().is_empty())
}

async fn read_input(cli: &Cli, io: &IoArgs, step: (usize, usize)) -> anyhow::Result<String> {
    let input = Input::from_arg(&io.input);
    if cli.verbose {
        let message = match &input {
            Input::Url(url) => format!("Fetching from {}", url.bright_white().underline()),
            Input::File(path) => format!("Reading from file {}", path.display().bright_white()),
            Input::Stdin => "Reading from stdin".to_string(),
        };
        echo::print_step(step.0, step.1, &message);
    }

    let mut config = FetchConfig { timeout: cli.timeout, ..Default::default() };
    if let Some(user_agent) = &cli.user_agent {
        config.user_agent = user_agent.clone();
    }

    let html = input
        .read(&config)
        .await
        .with_context(|| format!("Failed to read input: {}", io.input))?;

    if cli.verbose {
        echo::print_detail("Size", &echo::format_size(html.len()));
        eprintln!();
    }
    Ok(html)
}

fn write_output(output: Option<&Path>, content: &str) -> anyhow::Result<()> {
    match output {
        Some(path) => {
            fs::write(path, content).with_context(|| format!("Failed to write to file: {}", path.display()))?;
            echo::print_success(&format!("Output written to {}", path.display().bright_white()));
        }
        None => print!("{}", content),
    }
    Ok(())
}

fn clean_step(cli: &Cli, html: &str, cleaning: &CleanArgs, signatures: &Signatures) -> (Document, CleanReport) {
    let doc = Document::parse(html);
    if cli.verbose {
        if let Some(title) = doc.title() {
            echo::print_detail("Title", &title);
        }
    }
    let report = clean_document(&doc, &cleaning.options(), signatures);
    if cli.verbose {
        echo::print_detail("Elements removed", &report.elements_removed().to_string());
        eprintln!();
    }
    (doc, report)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if cli.verbose {
        echo::print_banner();
        echo::print_info("Debug logging enabled");
        eprintln!();
    }

    let signatures = load_signatures(cli.signatures.as_deref())?;

    match &cli.command {
        Command::Clean { io, cleaning, report } => {
            let html = read_input(&cli, io, (1, 3)).await?;
            if cli.verbose {
                echo::print_step(2, 3, "Cleaning document");
            }
            let (doc, clean_report) = clean_step(&cli, &html, cleaning, &signatures);
            if *report {
                echo::print_report(&clean_report);
            }
            if cli.verbose {
                echo::print_step(3, 3, "Writing output");
            }
            write_output(io.output.as_deref(), &doc.to_pretty_html())?;
        }

        Command::Extract { io, cleaning, raw, json } => {
            let html = read_input(&cli, io, (1, 3)).await?;
            if cli.verbose {
                echo::print_step(2, 3, "Cleaning and extracting main content");
            }
            let canonical = canonical_url(&Document::parse(&html));
            let (doc, _) = clean_step(&cli, &html, cleaning, &signatures);
            let mut main = extract_main_content(&doc);
            main.canonical_url = canonical;
            if !*raw {
                main.html = prompt_html(&main.html);
            }
            if cli.verbose {
                echo::print_detail("Locator", &format!("{:?}", main.locator));
                eprintln!();
                echo::print_step(3, 3, "Writing output");
            }

            let output = if *json {
                serde_json::to_string_pretty(&main).context("Failed to serialize main content")? + "\n"
            } else {
                main.html + "\n"
            };
            write_output(io.output.as_deref(), &output)?;
        }

        Command::Knowledge { io, cleaning, max_chars, json, index_dir } => {
            let html = read_input(&cli, io, (1, 3)).await?;
            if cli.verbose {
                echo::print_step(2, 3, "Preparing knowledge text");
            }
            let (doc, _) = clean_step(&cli, &html, cleaning, &signatures);
            let config = KnowledgeConfig { max_chars: *max_chars, ..Default::default() };
            let document = knowledge_document(&doc.to_pretty_html(), &config);
            if document.truncated {
                echo::print_warning(&format!("Text truncated to {} characters", max_chars));
            }

            if cli.verbose {
                echo::print_step(3, 3, "Writing output");
            }
            if let Some(dir) = index_dir {
                let id = DirectoryIndexer::new(dir)
                    .index(&document)
                    .await
                    .with_context(|| format!("Failed to index document in {}", dir.display()))?;
                echo::print_success(&format!("Indexed as {}", id.bright_white()));
                println!("{}", id);
            } else if *json {
                let output = serde_json::to_string_pretty(&document).context("Failed to serialize document")?;
                write_output(io.output.as_deref(), &(output + "\n"))?;
            } else {
                write_output(io.output.as_deref(), &(document.text + "\n"))?;
            }
        }

        Command::Splice { io, replacement, css } => {
            let html = read_input(&cli, io, (1, 3)).await?;
            if cli.verbose {
                echo::print_step(2, 3, &format!("Splicing {}", replacement.display().bright_white()));
            }
            let generated = fetch_file(replacement.clone())
                .with_context(|| format!("Failed to read replacement: {}", replacement.display()))?;
            let spliced = splice_main_content(&Document::parse(&html), &generated, &splice_config(css.as_deref())?)
                .context("Failed to splice replacement")?;
            if cli.verbose {
                echo::print_step(3, 3, "Writing output");
            }
            write_output(io.output.as_deref(), &spliced)?;
        }

        Command::Simplify { io, cleaning, endpoint, model, max_tokens, generator_timeout, base, css } => {
            let html = read_input(&cli, io, (1, 3)).await?;

            let mut generator_config = GeneratorConfig { timeout: *generator_timeout, api_key: api_key(), ..Default::default() };
            if let Some(endpoint) = endpoint {
                generator_config.endpoint = endpoint.clone();
            }
            if let Some(model) = model {
                generator_config.model = model.clone();
            }
            if let Some(max_tokens) = max_tokens {
                generator_config.max_tokens = *max_tokens;
            }
            if generator_config.api_key.is_none() {
                echo::print_warning(&format!("No API key found in {}", API_KEY_VARS.join(" or ")));
            }
            if generator_config.max_tokens == 0 {
                bail!("--max-tokens must be greater than zero");
            }

            if cli.verbose {
                echo::print_step(
                    2,
                    3,
                    &format!("Generating with {}", generator_config.model.bright_white()),
                );
            }
            let generator = ChatCompletionsGenerator::new(generator_config).context("Failed to configure generator")?;
            let config = SimplifyConfig {
                clean: cleaning.options(),
                signatures,
                splice: splice_config(css.as_deref())?,
                base: base.0,
            };
            let simplified = simplify_page(&html, &generator, &config).await.context("Failed to simplify page")?;

            if cli.verbose {
                echo::print_detail("Locator", &format!("{:?}", simplified.locator));
                if let Some(url) = &simplified.canonical_url {
                    echo::print_detail("Canonical", url);
                }
                eprintln!();
                echo::print_step(3, 3, "Writing output");
            }
            write_output(io.output.as_deref(), &simplified.html)?;
        }
    }

    Ok(())
}
