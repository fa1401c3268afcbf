use std::{env, fs, path::PathBuf};

use clap::{Arg, ArgAction, Command, arg, value_parser};

fn io_args(cmd: Command) -> Command {
    cmd.arg(arg!(<INPUT> "URL to fetch, local HTML file, or '-' for stdin")).arg(
        arg!(-o --output <FILE> "Output file (default: stdout)")
            .required(false)
            .value_name("FILE")
            .value_parser(value_parser!(PathBuf)),
    )
}

fn clean_args(cmd: Command) -> Command {
    cmd.arg(arg!(--basic "Remove every header, footer and nav, and strip root styles"))
        .arg(arg!(--"max-empty-passes" <NUM> "Upper bound on emptiness passes").required(false).default_value("1"))
}

fn css_arg() -> Arg {
    arg!(--css <FILE> "Stylesheet injected instead of the built-in one")
        .required(false)
        .value_parser(value_parser!(PathBuf))
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=OUT_DIR");

    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let completions_dir = out_dir.join("completions");

    fs::create_dir_all(&completions_dir).unwrap();

    let mut cmd = Command::new("plainpage")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Plainpage Contributors")
        .about("Strip tracking and boilerplate from web pages and build simplified versions")
        .subcommand_required(true)
        .arg(
            arg!(--signatures <FILE> "Signature table (JSON) replacing the built-in tracker lists")
                .required(false)
                .global(true)
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(arg!(--timeout <SECS> "HTTP timeout in seconds").required(false).global(true).default_value("30"))
        .arg(arg!(--"user-agent" <UA> "Custom User-Agent for HTTP requests").required(false).global(true))
        .arg(arg!(-v --verbose "Enable debug logging").global(true).action(ArgAction::SetTrue))
        .subcommand(
            clean_args(io_args(Command::new("clean").about("Clean a page and print the pretty-printed result")))
                .arg(arg!(--report "Print the per-stage removal summary to stderr")),
        )
        .subcommand(
            clean_args(io_args(Command::new("extract").about("Print the main content of the cleaned page")))
                .arg(arg!(--raw "Keep attributes and whitespace instead of compacting for a prompt"))
                .arg(arg!(--json "Print JSON with the canonical URL and the matched locator")),
        )
        .subcommand(
            clean_args(io_args(
                Command::new("knowledge").about("Print the plain text a knowledge base would receive"),
            ))
            .arg(
                arg!(--"max-chars" <NUM> "Maximum characters of text before truncation")
                    .required(false)
                    .default_value("100000"),
            )
            .arg(arg!(--json "Print the document as JSON"))
            .arg(
                arg!(--"index-dir" <DIR> "Store the document in this directory instead of printing it")
                    .required(false)
                    .value_parser(value_parser!(PathBuf)),
            ),
        )
        .subcommand(
            io_args(Command::new("splice").about("Splice a generated main-content block into a page"))
                .arg(
                    arg!(-r --replacement <FILE> "File holding the generated block")
                        .required(true)
                        .value_parser(value_parser!(PathBuf)),
                )
                .arg(css_arg()),
        )
        .subcommand(
            clean_args(io_args(
                Command::new("simplify")
                    .about("Clean, generate simplified content with a language model, and splice it in"),
            ))
            .arg(arg!(--endpoint <URL> "Chat-completions endpoint").required(false))
            .arg(arg!(--model <MODEL> "Model name").required(false))
            .arg(arg!(--"max-tokens" <NUM> "Completion token cap").required(false))
            .arg(
                arg!(--"generator-timeout" <SECS> "Generator request timeout in seconds")
                    .required(false)
                    .default_value("120"),
            )
            .arg(
                arg!(--base <BASE> "Splice into the original page or the cleaned copy")
                    .required(false)
                    .default_value("original")
                    .value_parser(["original", "cleaned"]),
            )
            .arg(css_arg()),
        );

    for shell in [
        clap_complete::Shell::Bash,
        clap_complete::Shell::Zsh,
        clap_complete::Shell::Fish,
        clap_complete::Shell::PowerShell,
    ] {
        clap_complete::generate_to(shell, &mut cmd, "plainpage", &completions_dir).unwrap();
    }

    println!(
        "cargo:warning=Shell completions generated in: {}",
        completions_dir.display()
    );
}
