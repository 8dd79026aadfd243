pub mod analyze;
pub mod normalize;
pub mod render;

use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use req2dom_core::{AnalyzerKind, Config, Locale};
use std::str::FromStr;

#[derive(Parser)]
#[command(
    name = "req2dom",
    about = "Turn natural-language requirements into class diagrams",
    version
)]
pub struct Cli {
    /// Configuration file (defaults to <config dir>/req2dom/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Requirement language: pt or en
    #[arg(short, long, global = true, value_parser = Locale::from_str)]
    pub locale: Option<Locale>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Extract a domain model and write it as a diagram
    Analyze {
        /// Requirements file (stdin when omitted or "-")
        file: Option<PathBuf>,
        /// pattern, statistical, syntactic, completion or hybrid
        #[arg(short, long, value_parser = AnalyzerKind::from_str)]
        analyzer: Option<AnalyzerKind>,
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Xml)]
        format: OutputFormat,
        /// Write here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Render canonical model JSON as a diagram
    Render {
        /// JSON file (stdin when omitted or "-")
        file: Option<PathBuf>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print the labeled requirement units
    Normalize {
        /// Requirements file (stdin when omitted or "-")
        file: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// mxGraph document
    Xml,
    /// Canonical model JSON
    Json,
}

/// Loads configuration and applies the global command-line overrides.
pub fn load_config(path: Option<&Path>, locale: Option<Locale>) -> Result<Config> {
    let mut config = Config::load(path).context("Failed to load configuration")?;
    if let Some(locale) = locale {
        config.locale = locale;
    }
    Ok(config)
}

pub fn read_input(file: Option<&Path>) -> Result<String> {
    match file {
        Some(path) if path != Path::new("-") => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
        }
        _ => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read stdin")?;
            Ok(text)
        }
    }
}

pub fn write_output(output: Option<&Path>, content: &str) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(content.as_bytes())?;
            if !content.ends_with('\n') {
                stdout.write_all(b"\n")?;
            }
            Ok(())
        }
    }
}
