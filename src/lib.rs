//! solution-templatize - field-reference templatization for ArcGIS solution items
//!
//! Dashboards and web applications refer to feature layer fields by their
//! literal names. Before such an item can be deployed into another
//! organization, every field name has to become a placeholder bound to the
//! layer that owns it, e.g. `NUMBEDS` becomes
//! `{{934a9ef8efa7448fa8ddf7b13cef0240.layer2.fields.numbeds.name}}`, so the
//! deployment can substitute whatever the target layer calls that field.
//!
//! # Architecture
//!
//! - [`datasource`] - the catalog of feature layers an item may use
//! - [`templating`] - ranking datasources against JSON objects and rewriting
//!   field references, plus resolving placeholders back
//! - [`dashboard`] - dashboard conversion and datasource reference tracking
//! - [`webapp`] - web application conversion
//! - [`config`] - user settings
//! - [`cli`] - the `solution-templatize` command line
//! - [`core`] - error types and user-facing error reporting
//!
//! # Example
//!
//! ```rust,no_run
//! use serde_json::json;
//! use solution_templatize::datasource::DatasourceInfo;
//! use solution_templatize::templating::Templatizer;
//!
//! let catalog = vec![
//!     DatasourceInfo::new("abc.layer0.fields")
//!         .with_item_id("abc")
//!         .with_layer_id(0)
//!         .with_fields(["STATUS"]),
//! ];
//! let widget = json!({"datasets": [{"dataSource": {"itemId": "abc", "layerId": 0}}], "field": "STATUS"});
//!
//! let template = Templatizer::default().templatize_object(&widget, &catalog)?;
//! assert_eq!(template["field"], "{{abc.layer0.fields.status.name}}");
//! # Ok::<(), solution_templatize::core::TemplatizeError>(())
//! ```

pub mod cli;
pub mod config;
pub mod core;

// Conversion
pub mod dashboard;
pub mod datasource;
pub mod templating;
pub mod webapp;

// test_utils module is available for both unit tests and integration tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
