use std::path::Path;

use anyhow::{Context, Result};
use req2dom_core::{AnalyzerKind, Locale, Pipeline};

use super::{load_config, read_input, write_output, OutputFormat};

pub async fn run(
    config_path: Option<&Path>,
    locale: Option<Locale>,
    file: Option<&Path>,
    analyzer: Option<AnalyzerKind>,
    format: OutputFormat,
    output: Option<&Path>,
) -> Result<()> {
    let mut config = load_config(config_path, locale)?;
    if let Some(kind) = analyzer {
        config.analyzer = kind;
    }

    let text = read_input(file)?;
    let pipeline = Pipeline::from_config(&config).context("Failed to set up analyzer")?;
    let result = pipeline.run(&text).await?;

    for substitution in &result.substitutions {
        tracing::warn!(
            failed = %substitution.failed,
            used = %substitution.used,
            reason = %substitution.reason,
            "Degraded result"
        );
    }
    if !result.fallback_classes.is_empty() {
        tracing::info!(classes = ?result.fallback_classes, "Generic classes were injected");
    }

    let content = match format {
        OutputFormat::Xml => result.diagram.xml,
        OutputFormat::Json => result.model.to_json()?,
    };
    write_output(output, &content)
}
