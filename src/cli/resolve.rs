//! Replace placeholders with concrete values.

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use super::common::{read_json, write_json};
use crate::config::Settings;
use crate::datasource::{field_settings, load_catalog};
use crate::templating::resolve_placeholders;

#[derive(Args)]
pub struct ResolveCommand {
    /// Templatized JSON file
    input: PathBuf,

    /// Settings dictionary JSON file the placeholder paths point into
    #[arg(long, required_unless_present = "catalog", conflicts_with = "catalog")]
    settings: Option<PathBuf>,

    /// Datasource catalog; resolves field placeholders to the catalog's own names
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Fail on placeholders the settings cannot satisfy
    #[arg(long)]
    strict: bool,

    /// Write the result here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

impl ResolveCommand {
    pub async fn execute(self, config: &Settings) -> Result<()> {
        let template = read_json(&self.input).await?;

        let settings = match (&self.settings, &self.catalog) {
            (Some(path), _) => read_json(path).await?,
            (None, Some(path)) => field_settings(&load_catalog(path).await?),
            (None, None) => anyhow::bail!("Either --settings or --catalog is required"),
        };

        let strict = self.strict || config.strict_placeholders;
        tracing::info!("Resolving {} (strict: {})", self.input.display(), strict);

        let resolved = resolve_placeholders(&template, &settings, strict)?;
        write_json(&resolved, self.output.as_deref()).await
    }
}
