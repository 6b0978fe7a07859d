//! Rewrite field references in item data into placeholders.

use anyhow::Result;
use clap::{Args, ValueEnum};
use std::path::PathBuf;

use super::common::{read_json, write_json};
use crate::config::Settings;
use crate::dashboard::templatize_dashboard;
use crate::datasource::load_catalog;
use crate::templating::{PatternMode, Templatizer};
use crate::webapp::templatize_web_application;

/// Kind of item the input data belongs to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ItemKind {
    /// Any JSON document, templatized as one object
    #[default]
    Generic,
    /// Dashboard data; output carries the referenced datasources
    Dashboard,
    /// Web application data; keys under `values` are templatized
    WebApp,
}

#[derive(Args)]
pub struct TemplatizeCommand {
    /// Item data JSON file
    input: PathBuf,

    /// Datasource catalog JSON file (array of datasource records)
    #[arg(long)]
    catalog: PathBuf,

    /// Kind of item the data belongs to
    #[arg(long, value_enum, default_value_t = ItemKind::Generic)]
    kind: ItemKind,

    /// Also rewrite object keys that equal field names
    #[arg(long)]
    templatize_keys: bool,

    /// How catalog urls and ids are matched (overrides the config)
    #[arg(long, value_enum)]
    pattern_mode: Option<PatternMode>,

    /// Write the result here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

impl TemplatizeCommand {
    pub async fn execute(self, settings: &Settings) -> Result<()> {
        let data = read_json(&self.input).await?;
        let catalog = load_catalog(&self.catalog).await?;

        let mut options = settings.templatize_options();
        options.templatize_keys |= self.templatize_keys;
        if let Some(mode) = self.pattern_mode {
            options.pattern_mode = mode;
        }
        let templatizer = Templatizer::new(options);

        tracing::info!(
            "Templatizing {} as {:?} against {} datasource(s)",
            self.input.display(),
            self.kind,
            catalog.len()
        );

        match self.kind {
            ItemKind::Generic => {
                let result = templatizer.templatize_object(&data, &catalog)?;
                write_json(&result, self.output.as_deref()).await
            }
            ItemKind::Dashboard => {
                let template = templatize_dashboard(&data, &catalog, &templatizer)?;
                tracing::info!("{} datasource(s) referenced", template.datasources.len());
                write_json(&template, self.output.as_deref()).await
            }
            ItemKind::WebApp => {
                let result = templatize_web_application(&data, &catalog, &templatizer)?;
                write_json(&result, self.output.as_deref()).await
            }
        }
    }
}
