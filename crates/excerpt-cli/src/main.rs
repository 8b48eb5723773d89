use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use excerpt_core::{Delimiters, Escaper, SnippetConfig};
use excerpt_engine::{HtmlEscaper, NoEscape, SnippetRequest};
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "excerpt")]
#[command(about = "Extract keyword-highlighted snippets from text", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the plain-text snippet for the given keywords.
    Snippet(SnippetCmd),
    /// Print the snippet with keyword occurrences wrapped in delimiters.
    Markup(MarkupCmd),
    /// Print version info.
    Version(VersionCmd),
}

#[derive(clap::Args, Debug)]
struct InputArgs {
    /// Keyword or phrase (repeatable). Case and extra whitespace are ignored.
    #[arg(long = "keyword", short = 'k')]
    keywords: Vec<String>,
    /// Input text file. Reads stdin when omitted or "-".
    #[arg(long)]
    input: Option<PathBuf>,
    /// Overall snippet budget in characters, shared by the selected paragraphs.
    #[arg(long, env = "EXCERPT_MAX_LENGTH")]
    max_length: Option<usize>,
    /// Keywords beyond this many are ignored (scoring is exponential in the keyword count).
    #[arg(long, env = "EXCERPT_MAX_KEYWORDS")]
    max_keywords: Option<usize>,
    /// Output format: json|text
    #[arg(long = "output", alias = "format", default_value = "json")]
    output: String,
}

#[derive(clap::Args, Debug)]
struct SnippetCmd {
    #[command(flatten)]
    input: InputArgs,
}

#[derive(clap::Args, Debug)]
struct MarkupCmd {
    #[command(flatten)]
    input: InputArgs,
    /// Inserted before every keyword occurrence.
    #[arg(long, env = "EXCERPT_HIGHLIGHT_START")]
    start: Option<String>,
    /// Inserted after every keyword occurrence.
    #[arg(long, env = "EXCERPT_HIGHLIGHT_END")]
    end: Option<String>,
    /// Escaping applied to snippet text (not to delimiters). Allowed: html, none
    #[arg(long, default_value = "html")]
    escape: String,
}

#[derive(clap::Args, Debug)]
struct VersionCmd {
    /// Output format: json|text
    #[arg(long = "output", alias = "format", default_value = "json")]
    output: String,
}

fn init_tracing() {
    // stdout carries results; diagnostics go to stderr.
    let filter = std::env::var("EXCERPT_LOG")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .map(EnvFilter::new)
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn load_env_file() {
    // Opt-in only; never overrides variables already set in the process environment.
    let Ok(p) = std::env::var("EXCERPT_ENV_FILE") else {
        return;
    };
    let p = p.trim();
    if p.is_empty() {
        return;
    }
    let Ok(txt) = std::fs::read_to_string(p) else {
        return;
    };
    for raw in txt.lines() {
        let s = raw.trim();
        if s.is_empty() || s.starts_with('#') {
            continue;
        }
        let Some((k, v)) = s.split_once('=') else {
            continue;
        };
        let k = k.trim();
        if k.is_empty() {
            continue;
        }
        if std::env::var_os(k).is_none() {
            std::env::set_var(k, v.trim());
        }
    }
}

fn read_input(path: Option<&Path>) -> Result<String> {
    let bytes = match path {
        Some(p) if p != Path::new("-") => {
            std::fs::read(p).with_context(|| format!("failed to read input {}", p.display()))?
        }
        _ => {
            let mut buf = Vec::new();
            std::io::stdin()
                .read_to_end(&mut buf)
                .context("failed to read stdin")?;
            buf
        }
    };
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn build_request(args: &InputArgs) -> Result<(SnippetRequest, SnippetConfig)> {
    let mut cfg = SnippetConfig::from_env();
    if let Some(n) = args.max_length {
        cfg.max_length = n;
    }
    if let Some(n) = args.max_keywords {
        cfg.max_keywords = n;
    }
    let text = read_input(args.input.as_deref())?;
    let req = SnippetRequest::with_config(text, &args.keywords, cfg.clone())?;
    tracing::debug!(
        keywords = req.keywords().len(),
        max_length = cfg.max_length,
        "snippet request"
    );
    Ok((req, cfg))
}

fn is_text(output: &str) -> bool {
    output.eq_ignore_ascii_case("text")
}

fn run_snippet(cmd: SnippetCmd) -> Result<()> {
    let (mut req, cfg) = build_request(&cmd.input)?;
    let snippet = req.snippet(None)?.cloned();
    if is_text(&cmd.input.output) {
        if let Some(s) = &snippet {
            println!("{}", s.text);
        }
        return Ok(());
    }
    let highlights = req.highlights(None)?;
    let uncovered = req.uncovered()?;
    let v = serde_json::json!({
        "schema_version": 1,
        "kind": "snippet",
        "ok": true,
        "keywords": req.keywords(),
        "max_length": cfg.max_length,
        "snippet": snippet.as_ref().map(|s| s.text.as_str()),
        "segments": snippet.as_ref().map(|s| &s.segments),
        "highlights": highlights,
        "uncovered": uncovered,
    });
    println!("{}", v);
    Ok(())
}

fn run_markup(cmd: MarkupCmd) -> Result<()> {
    let (mut req, cfg) = build_request(&cmd.input)?;
    let delimiters = Delimiters {
        start: cmd.start.unwrap_or(cfg.delimiters.start),
        end: cmd.end.unwrap_or(cfg.delimiters.end),
    };
    let escaper: &dyn Escaper = match cmd.escape.to_ascii_lowercase().as_str() {
        "html" => &HtmlEscaper,
        "none" => &NoEscape,
        other => anyhow::bail!("unknown --escape value {other:?} (allowed: html, none)"),
    };
    let marked = req.markup_with(None, Some(&delimiters), escaper)?;
    let uncovered = req.uncovered()?;
    if is_text(&cmd.input.output) {
        if let Some(m) = &marked {
            println!("{m}");
        }
        return Ok(());
    }
    let v = serde_json::json!({
        "schema_version": 1,
        "kind": "markup",
        "ok": true,
        "keywords": req.keywords(),
        "max_length": cfg.max_length,
        "delimiters": delimiters,
        "markup": marked,
        "uncovered": uncovered,
    });
    println!("{}", v);
    Ok(())
}

fn main() -> Result<()> {
    load_env_file();
    init_tracing();

    let cli = Cli::parse();
    match cli.command {
        Commands::Snippet(cmd) => run_snippet(cmd)?,
        Commands::Markup(cmd) => run_markup(cmd)?,
        Commands::Version(args) => {
            let v = serde_json::json!({
                "schema_version": 1,
                "kind": "version",
                "ok": true,
                "name": "excerpt",
                "version": env!("CARGO_PKG_VERSION"),
            });
            match args.output.to_ascii_lowercase().as_str() {
                "text" => println!("excerpt {}", env!("CARGO_PKG_VERSION")),
                _ => println!("{}", v),
            }
        }
    }
    Ok(())
}
