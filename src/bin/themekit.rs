//! `themekit` command-line tool.
//!
//! Reads JSON or YAML token files and runs the engine over them:
//!
//! ```text
//! themekit resolve tokens.yaml --base base.yaml --path colors.primary
//! themekit --config themekit.yaml resolve --theme dark
//! themekit validate tokens.json --config themekit.yaml
//! themekit diff old.json new.json
//! themekit aliases tokens.json
//! ```
//!
//! Logging is controlled with `THEMEKIT_LOG` (an `EnvFilter` directive,
//! default `warn`).

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::rc::Rc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use themekit::config::OutputFormat;
use themekit::{
    diff, find_aliases, merge, resolve_aliases, validate, ThemeKit, ThemeKitConfig, TokenTree,
    TokenValue,
};

#[derive(Parser)]
#[command(name = "themekit", version, about = "Resolve, validate and diff design token files")]
struct Cli {
    /// Configuration file (YAML or JSON) with aliasing and validation settings
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Output format (defaults to the configured `cli.format`)
    #[arg(short, long, global = true, value_enum)]
    format: Option<Format>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge and resolve aliases in a token file, or resolve a configured theme
    Resolve {
        /// Token file. Without one, a theme from `--config` is resolved.
        file: Option<PathBuf>,
        /// Configured theme to resolve (defaults to `cli.theme`, then the initial theme)
        #[arg(short, long, conflicts_with = "file")]
        theme: Option<String>,
        /// Token file the input is merged on top of
        #[arg(short, long)]
        base: Option<PathBuf>,
        /// Print only the token at this dot-path
        #[arg(short, long)]
        path: Option<String>,
        /// Maximum alias hops (defaults to the configured `aliasing.maxDepth`)
        #[arg(long)]
        max_depth: Option<usize>,
    },
    /// Check token keys and values against the configured rules
    Validate { file: PathBuf },
    /// Show leaf-level differences between two token files
    Diff { old: PathBuf, new: PathBuf },
    /// List alias references in a token file
    Aliases { file: PathBuf },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Json,
    Yaml,
}

impl From<OutputFormat> for Format {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Json => Format::Json,
            OutputFormat::Yaml => Format::Yaml,
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("THEMEKIT_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(Cli::parse()) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(err) => {
            eprintln!("error: {:#}", err);
            ExitCode::from(2)
        }
    }
}

/// Runs a command. `Ok(false)` means the command ran but found problems.
fn run(cli: Cli) -> Result<bool> {
    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ThemeKitConfig::default(),
    };
    let format = cli.format.unwrap_or_else(|| config.cli.format.into());

    match cli.command {
        Commands::Resolve {
            file: None,
            theme,
            path,
            ..
        } => {
            let theme = theme.or_else(|| config.cli.theme.clone());
            let resolved = resolve_configured(config, theme.as_deref())?;
            print_token(&resolved, path.as_deref(), format)?;
            Ok(true)
        }
        Commands::Resolve {
            file: Some(file),
            base,
            path,
            max_depth,
            ..
        } => {
            let mut tokens = load_tokens(&file)?;
            if let Some(base) = base {
                tokens = merge(&load_tokens(&base)?, &tokens);
            }
            let max_depth = max_depth.unwrap_or(config.aliasing.max_depth);
            let resolved = resolve_aliases(&tokens, max_depth)
                .with_context(|| format!("failed to resolve {}", file.display()))?;
            print_token(&resolved, path.as_deref(), format)?;
            Ok(true)
        }
        Commands::Validate { file } => {
            let tokens = load_tokens(&file)?;
            let rules = config.validation.compile_rules()?;
            let report = validate(&TokenValue::Tree(tokens), &rules, &config.validation)?;
            if cli.format.is_some() {
                print(&report, format)?;
            } else {
                for message in report.errors() {
                    println!("{}", message);
                }
                if report.is_valid() {
                    println!("{}: ok", file.display());
                }
            }
            Ok(report.is_valid())
        }
        Commands::Diff { old, new } => {
            let changes = diff(&load_tokens(&old)?, &load_tokens(&new)?);
            if cli.format.is_some() {
                print(&changes, format)?;
            } else {
                for change in &changes {
                    println!("{}", change);
                }
            }
            Ok(true)
        }
        Commands::Aliases { file } => {
            print(&find_aliases(&load_tokens(&file)?), format)?;
            Ok(true)
        }
    }
}

/// Resolves a theme registered through the configuration file.
fn resolve_configured(config: ThemeKitConfig, theme: Option<&str>) -> Result<Rc<TokenTree>> {
    let kit = ThemeKit::new(config.persistence(false))?;
    let name = match theme.or_else(|| kit.current_theme()) {
        Some(name) => name.to_string(),
        None => bail!("no themes configured; pass a token file or a config with themes"),
    };
    kit.resolve_tokens(&name)
        .with_context(|| format!("failed to resolve theme '{}'", name))
}

fn print_token(tokens: &TokenTree, path: Option<&str>, format: Format) -> Result<()> {
    let Some(path) = path else {
        return print(tokens, format);
    };
    match tokens.get_path(path) {
        Some(TokenValue::Tree(subtree)) => print(subtree, format),
        Some(value) => {
            println!("{}", value);
            Ok(())
        }
        None => bail!("no token at '{}'", path),
    }
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some("yaml") | Some("yml")
    )
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn load_tokens(path: &Path) -> Result<TokenTree> {
    let source = read(path)?;
    let tokens = if is_yaml(path) {
        TokenTree::from_yaml(&source)
    } else {
        TokenTree::from_json(&source)
    };
    tokens.with_context(|| format!("failed to parse {}", path.display()))
}

fn load_config(path: &Path) -> Result<ThemeKitConfig> {
    let source = read(path)?;
    let config = if is_yaml(path) {
        ThemeKitConfig::from_yaml(&source)
    } else {
        ThemeKitConfig::from_json(&source)
    };
    config.with_context(|| format!("failed to parse config {}", path.display()))
}

fn print<T: Serialize>(value: &T, format: Format) -> Result<()> {
    let text = match format {
        Format::Json => serde_json::to_string_pretty(value)?,
        Format::Yaml => serde_yaml::to_string(value)?,
    };
    println!("{}", text.trim_end());
    Ok(())
}
