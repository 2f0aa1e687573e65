use std::path::{Component, Path, PathBuf};
use std::sync::Once;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use pyrite_core::{AnalysisSession, AnalyzerConfig};

mod output;

static TRACE_INIT: Once = Once::new();
const DEFAULT_TRACE_FILTER: &str = "pyrite_core=info,pyrite_cli=info";

#[derive(Debug, Parser)]
#[command(name = "pyrite", author, version, about = "Static analysis for Python source files", long_about = None)]
struct CliArgs {
    #[command(subcommand)]
    command: Commands,

    /// Analyzer settings (TOML); defaults apply when omitted
    #[arg(long, global = true, value_name = "FILE", value_parser = parse_sanitized_path)]
    config: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
enum Format {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Report syntax and type errors; exits with status 1 when any error is found.
    Check {
        #[arg(value_name = "FILE", value_parser = parse_sanitized_path)]
        file: PathBuf,
        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },
    /// List completion candidates at a 1-indexed cursor position.
    Complete {
        #[arg(value_name = "FILE", value_parser = parse_sanitized_path)]
        file: PathBuf,
        #[arg(long)]
        line: u32,
        #[arg(long)]
        column: u32,
        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },
    /// Print the scope tree with bindings and inferred types.
    Symbols {
        #[arg(value_name = "FILE", value_parser = parse_sanitized_path)]
        file: PathBuf,
    },
}

fn read_file_content(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read file '{}'", path.display()))
}

fn sanitize_path(raw: &str) -> anyhow::Result<PathBuf> {
    let p = Path::new(raw);

    for comp in p.components() {
        if matches!(comp, Component::ParentDir) {
            return Err(anyhow::anyhow!(
                "Parent directory components ('..') are not allowed in file paths."
            ));
        }
    }

    Ok(p.to_path_buf())
}

fn parse_sanitized_path(raw: &str) -> Result<PathBuf, String> {
    sanitize_path(raw).map_err(|e| e.to_string())
}

fn env_toggle_enabled(raw: &str) -> bool {
    let trimmed = raw.trim();
    !(trimmed.eq_ignore_ascii_case("0") || trimmed.eq_ignore_ascii_case("false") || trimmed.eq_ignore_ascii_case("off"))
}

fn filter_expr_from(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty()
        || trimmed.eq_ignore_ascii_case("1")
        || trimmed.eq_ignore_ascii_case("true")
        || trimmed.eq_ignore_ascii_case("on")
    {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Log to stderr. `PYRITE_LOG` holds a filter expression (or `off`); `RUST_LOG` is
/// the fallback.
fn init_tracing() {
    let raw = std::env::var("PYRITE_LOG").ok();
    if raw.as_deref().is_some_and(|r| !env_toggle_enabled(r)) {
        return;
    }

    TRACE_INIT.call_once(|| {
        use tracing_subscriber::EnvFilter;
        use tracing_subscriber::fmt;

        let filter_expr = raw
            .as_deref()
            .and_then(filter_expr_from)
            .or_else(|| std::env::var("RUST_LOG").ok());

        let builder = fmt().with_writer(std::io::stderr);

        let builder = match filter_expr.and_then(|expr| EnvFilter::try_new(expr).ok()) {
            Some(filter) => builder.with_env_filter(filter),
            None => builder.with_env_filter(DEFAULT_TRACE_FILTER),
        };

        let _ = builder.try_init();
    });
}

fn load_config(path: Option<&Path>) -> anyhow::Result<AnalyzerConfig> {
    match path {
        Some(path) => AnalyzerConfig::from_file(path),
        None => Ok(AnalyzerConfig::default()),
    }
}

fn analyze(path: &Path, config: AnalyzerConfig) -> anyhow::Result<AnalysisSession> {
    let src = read_file_content(path)?;
    let session = AnalysisSession::with_config(config.into());
    session.update_source(&src);
    tracing::debug!(file = %path.display(), "analyzed");
    Ok(session)
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    let CliArgs { command, config } = CliArgs::parse();
    let config = load_config(config.as_deref())?;

    match command {
        Commands::Check { file, format } => {
            let session = analyze(&file, config)?;
            let diagnostics = session.get_diagnostics();
            let rendered = match format {
                Format::Text => output::diagnostics_text(&file, &diagnostics),
                Format::Json => output::to_json(&diagnostics)?,
            };
            print!("{rendered}");
            if diagnostics.iter().any(|d| d.is_error()) {
                std::process::exit(1);
            }
        }
        Commands::Complete {
            file,
            line,
            column,
            format,
        } => {
            let session = analyze(&file, config)?;
            let items = session.get_autocomplete_suggestions(line, column);
            let rendered = match format {
                Format::Text => output::completions_text(&items),
                Format::Json => output::to_json(&items)?,
            };
            print!("{rendered}");
        }
        Commands::Symbols { file } => {
            let session = analyze(&file, config)?;
            if let Some(model) = session.model() {
                print!("{}", output::symbols_text(model.scopes()));
            }
        }
    }
    Ok(())
}
