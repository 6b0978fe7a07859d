//! Shared fixtures.

use serde_json::{Value, json};
use std::path::{Path, PathBuf};

use crate::datasource::DatasourceInfo;

/// Item id of the hospital feature service.
pub const HOSPITAL_ITEM_ID: &str = "934a9ef8efa7448fa8ddf7b13cef0240";

/// Web map layer id of the hospitals layer.
pub const WEB_MAP_LAYER_ID: &str = "Hospitals_5140";

/// Catalog for a feature service with a facilities layer (0) and a
/// hospitals layer (2). Both layers have a `NAME` field.
#[must_use]
pub fn hospital_catalog() -> Vec<DatasourceInfo> {
    let url = format!("{{{{{HOSPITAL_ITEM_ID}.url}}}}");
    vec![
        DatasourceInfo::new(format!("{HOSPITAL_ITEM_ID}.layer0.fields"))
            .with_item_id(HOSPITAL_ITEM_ID)
            .with_layer_id(0)
            .with_url(url.clone())
            .with_fields(["OBJECTID", "NAME", "FACILITYTYPE"]),
        DatasourceInfo::new(format!("{HOSPITAL_ITEM_ID}.layer2.fields"))
            .with_item_id(HOSPITAL_ITEM_ID)
            .with_layer_id(2)
            .with_url(url)
            .with_ids([WEB_MAP_LAYER_ID])
            .with_fields(["OBJECTID", "NAME", "NUMBEDS", "FACILITYID"]),
    ]
}

/// Dashboard with a map (both layers), a gauge on hospitals and a header
/// selector on hospitals.
#[must_use]
pub fn sample_dashboard() -> Value {
    let dataset = |layer_id: i64| {
        json!({
            "type": "serviceDataset",
            "dataSource": {"type": "featureServiceDataSource", "itemId": HOSPITAL_ITEM_ID, "layerId": layer_id}
        })
    };

    json!({
        "version": 27,
        "desktopView": {
            "widgets": [
                {
                    "id": "map0",
                    "type": "mapWidget",
                    "datasets": [dataset(0), dataset(2)]
                },
                {
                    "id": "gauge0",
                    "type": "gaugeWidget",
                    "datasets": [dataset(2)],
                    "valueField": "NUMBEDS",
                    "labelText": "Beds at {FACILITYID}"
                }
            ],
            "headerPanel": {
                "selectors": [{
                    "id": "selector0",
                    "type": "categorySelectorWidget",
                    "datasets": [dataset(2)],
                    "labelField": "FACILITYID",
                    "itemText": "{FACILITYID}"
                }]
            }
        }
    })
}

/// Web application data keyed by the hospitals web map layer id.
#[must_use]
pub fn sample_web_app() -> Value {
    json!({
        "source": "5a7c4b8d3e2f4a1b9c0d8e7f6a5b4c3d",
        "values": {
            "title": "Hospital finder",
            "searchLayers": {
                WEB_MAP_LAYER_ID: {"searchFields": ["NAME", "FACILITYID"]}
            }
        }
    })
}

/// Write `value` as JSON to `dir/name` and return the path.
pub fn write_json_file(dir: &Path, name: &str, value: &Value) -> std::io::Result<PathBuf> {
    let path = dir.join(name);
    std::fs::write(&path, serde_json::to_string_pretty(value)?)?;
    Ok(path)
}
