//! Dashboard conversion.
//!
//! A dashboard's data holds widgets, selectors (in the header and side
//! panels) and url parameters. Each of these may carry `datasets` whose
//! `dataSource` names a feature layer by item id and layer id:
//!
//! ```json
//! {
//!   "id": "map0",
//!   "datasets": [
//!     {"dataSource": {"itemId": "934a9ef8efa7448fa8ddf7b13cef0240", "layerId": 0}},
//!     {"dataSource": {"itemId": "934a9ef8efa7448fa8ddf7b13cef0240", "layerId": 1}}
//!   ]
//! }
//! ```
//!
//! [`track_references`] records, on each catalog entry, the ids of the objects
//! that use it. Entries nobody references are not real dependencies of the
//! dashboard and can be dropped with [`retain_referenced`].

use serde::Serialize;
use serde_json::Value;

use crate::core::Result;
use crate::datasource::{DatasourceInfo, LayerId};
use crate::templating::{Templatizer, templatize_field_references};

/// JSON pointers of the arrays holding objects that can reference datasources.
///
/// Older dashboards keep widgets and panels at the top level; newer ones split
/// them into a desktop and a mobile view.
pub const REFERENCE_COLLECTIONS: &[&str] = &[
    "/widgets",
    "/headerPanel/selectors",
    "/leftPanel/selectors",
    "/urlParameters",
    "/desktopView/widgets",
    "/desktopView/headerPanel/selectors",
    "/desktopView/leftPanel/selectors",
    "/mobileView/widgets",
    "/mobileView/headerPanel/selectors",
    "/mobileView/leftPanel/selectors",
];

/// A templatized dashboard and the datasources it actually uses.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardTemplate {
    pub data: Value,
    /// Catalog entries with at least one reference, in catalog order.
    pub datasources: Vec<DatasourceInfo>,
}

/// Every object in `data` that can reference a datasource, in
/// [`REFERENCE_COLLECTIONS`] order.
#[must_use]
pub fn referencing_objects(data: &Value) -> Vec<&Value> {
    REFERENCE_COLLECTIONS
        .iter()
        .filter_map(|pointer| data.pointer(pointer).and_then(Value::as_array))
        .flatten()
        .collect()
}

/// Record, on the matching catalog entry, the id of each object whose datasets
/// reference it.
///
/// A dataset matches the first entry whose item id and layer id both equal its
/// `dataSource.itemId` and `dataSource.layerId`. Every matching dataset appends
/// one reference, so an object using the same layer twice is recorded twice.
/// Objects without an id and datasets without a match are skipped.
pub fn track_references<'v, I>(objs: I, infos: &mut [DatasourceInfo])
where
    I: IntoIterator<Item = &'v Value>,
{
    for obj in objs {
        let Some(datasets) = obj.get("datasets").and_then(Value::as_array) else {
            continue;
        };
        let Some(id) = object_id(obj) else {
            tracing::trace!("Skipping object without an id");
            continue;
        };

        for dataset in datasets {
            match bound_datasource(dataset, infos) {
                Some(index) => {
                    let info = &mut infos[index];
                    tracing::trace!("{} references datasource {}", id, info.label());
                    info.references.push(id.clone());
                }
                None => {
                    tracing::trace!("{} has a dataset without a known datasource", id);
                }
            }
        }
    }
}

/// Index of the catalog entry a dataset's `dataSource` names.
///
/// The first entry whose item id equals `dataSource.itemId` and whose layer id
/// equals `dataSource.layerId` wins. A missing `layerId` only matches entries
/// without one; a `layerId` that is not a layer id matches nothing.
#[must_use]
pub fn bound_datasource(dataset: &Value, infos: &[DatasourceInfo]) -> Option<usize> {
    let data_source = dataset.get("dataSource")?;
    let item_id = data_source.get("itemId").and_then(Value::as_str)?;
    let layer_id = data_source.get("layerId");

    infos.iter().position(|info| {
        info.item_id.as_deref() == Some(item_id)
            && LayerId::matches_member(info.layer_id.as_ref(), layer_id)
    })
}

/// Catalog entries bound by the datasets of `obj`, in dataset order, each once.
#[must_use]
pub fn bound_datasources(obj: &Value, infos: &[DatasourceInfo]) -> Vec<usize> {
    let mut bound = Vec::new();
    for dataset in obj.get("datasets").and_then(Value::as_array).into_iter().flatten() {
        if let Some(index) = bound_datasource(dataset, infos)
            && !bound.contains(&index)
        {
            bound.push(index);
        }
    }
    bound
}

/// Drop catalog entries that no object references.
pub fn retain_referenced(infos: &mut Vec<DatasourceInfo>) {
    let before = infos.len();
    infos.retain(|info| !info.references.is_empty());
    if infos.len() != before {
        tracing::debug!("Dropped {} unreferenced datasource(s)", before - infos.len());
    }
}

/// Templatize the field references of every widget, selector and url parameter
/// of a dashboard.
///
/// Each object is first rewritten with the fields of the datasources its own
/// datasets are bound to, so a widget on layer 2 keeps layer 2's fields even
/// when a sibling layer of the same item shares the field names. The general
/// object templatizer then picks up whatever is left.
///
/// References are tracked on a copy of `infos`; the returned template only
/// keeps the entries that ended up referenced.
pub fn templatize_dashboard(
    data: &Value,
    infos: &[DatasourceInfo],
    templatizer: &Templatizer,
) -> Result<DashboardTemplate> {
    let mut catalog = infos.to_vec();
    track_references(referencing_objects(data), &mut catalog);

    let templatizer = templatizer.with_templatize_keys(false);
    let mut templatized = data.clone();
    for pointer in REFERENCE_COLLECTIONS {
        if let Some(Value::Array(items)) = templatized.pointer_mut(pointer) {
            tracing::debug!("Templatizing {} object(s) in {}", items.len(), pointer);
            for item in items.iter_mut() {
                let mut bound = item.clone();
                for index in bound_datasources(item, &catalog) {
                    let info = &catalog[index];
                    tracing::trace!("Binding object to datasource {}", info.label());
                    bound = templatize_field_references(&bound, &info.fields, &info.base_path, false);
                }
                *item = templatizer.templatize_object(&bound, &catalog)?;
            }
        }
    }

    retain_referenced(&mut catalog);

    Ok(DashboardTemplate {
        data: templatized,
        datasources: catalog,
    })
}

fn object_id(obj: &Value) -> Option<String> {
    match obj.get("id")? {
        Value::String(id) => Some(id.clone()),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}
