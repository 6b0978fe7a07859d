//! Report which dashboard objects reference which datasources.

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use super::common::{read_json, write_json};
use crate::dashboard::{referencing_objects, retain_referenced, track_references};
use crate::datasource::load_catalog;

#[derive(Args)]
pub struct ReferencesCommand {
    /// Dashboard data JSON file
    dashboard: PathBuf,

    /// Datasource catalog JSON file
    #[arg(long)]
    catalog: PathBuf,

    /// Only list datasources that are referenced
    #[arg(long)]
    referenced_only: bool,

    /// Write the result here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

impl ReferencesCommand {
    pub async fn execute(self) -> Result<()> {
        let data = read_json(&self.dashboard).await?;
        let mut catalog = load_catalog(&self.catalog).await?;

        let objects = referencing_objects(&data);
        tracing::info!("Tracking references from {} dashboard object(s)", objects.len());
        track_references(objects, &mut catalog);

        if self.referenced_only {
            retain_referenced(&mut catalog);
        }

        write_json(&catalog, self.output.as_deref()).await
    }
}
