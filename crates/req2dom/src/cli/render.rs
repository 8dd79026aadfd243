use std::path::Path;

use anyhow::Result;
use req2dom_core::{DiagramSerializer, Locale};

use super::{load_config, read_input, write_output};

/// Malformed input still yields a diagnostic diagram and a zero exit.
pub fn run(config_path: Option<&Path>, locale: Option<Locale>, file: Option<&Path>, output: Option<&Path>) -> Result<()> {
    let config = load_config(config_path, locale)?;
    let raw = read_input(file)?;
    let diagram = DiagramSerializer::new(config.layout).serialize_json(&raw);
    if diagram.dropped_edges > 0 {
        tracing::warn!(dropped = diagram.dropped_edges, "Some relationships point to unknown classes");
    }
    write_output(output, &diagram.xml)
}
