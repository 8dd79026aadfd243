use std::path::Path;

use anyhow::Result;
use req2dom_core::{Locale, TextNormalizer};

use super::{load_config, read_input, write_output};

pub fn run(config_path: Option<&Path>, locale: Option<Locale>, file: Option<&Path>) -> Result<()> {
    let config = load_config(config_path, locale)?;
    let text = read_input(file)?;
    let document = TextNormalizer::new().normalize(&text);
    write_output(None, &document.render(config.locale.lexicon()))
}
