//! Field-reference templatization engine.
//!
//! Dashboards and web applications refer to feature layer fields by their
//! literal names, scattered through widget and data source configuration of no
//! fixed shape. To make such an item deployable into another organization,
//! every field name has to become a placeholder bound to the schema of the layer
//! that owns it, and the owner has to be worked out from whatever evidence sits
//! in the document: a layer url, a web map layer id, a service url or an item
//! id.
//!
//! # Modules
//!
//! - [`pattern`] - turning catalog values into match patterns
//! - [`rank`] - ranking datasources against an object and ordering rewrites
//! - [`fields`] - rewriting field names into placeholders
//! - [`walker`] - rewriting the objects that directly hold a layer reference
//! - [`object`] - the two-pass templatizer tying it together
//! - [`resolve`] - resolving placeholders back into values
//!
//! # Example
//!
//! ```rust,no_run
//! use serde_json::json;
//! use solution_templatize::datasource::DatasourceInfo;
//! use solution_templatize::templating::Templatizer;
//!
//! let catalog = vec![
//!     DatasourceInfo::new("934a9ef8efa7448fa8ddf7b13cef0240.layer2.fields")
//!         .with_item_id("934a9ef8efa7448fa8ddf7b13cef0240")
//!         .with_layer_id(2)
//!         .with_fields(["NUMBEDS"]),
//! ];
//!
//! let widget = json!({
//!     "datasets": [{"dataSource": {"itemId": "934a9ef8efa7448fa8ddf7b13cef0240", "layerId": 2}}],
//!     "valueField": "NUMBEDS"
//! });
//!
//! let templatized = Templatizer::default().templatize_object(&widget, &catalog)?;
//! assert_eq!(
//!     templatized["valueField"],
//!     "{{934a9ef8efa7448fa8ddf7b13cef0240.layer2.fields.numbeds.name}}"
//! );
//! # Ok::<(), solution_templatize::core::TemplatizeError>(())
//! ```

pub mod fields;
pub mod object;
pub mod pattern;
pub mod rank;
pub mod resolve;
pub mod walker;

pub use fields::{field_placeholder, templatize_field_references};
pub use object::{TemplatizeOptions, Templatizer};
pub use pattern::PatternMode;
pub use rank::{SortOrder, replace_order, replace_order_with, sort_order};
pub use resolve::resolve_placeholders;
pub use walker::{templatize_parent_by_url, templatize_parent_by_web_map_layer_id};
