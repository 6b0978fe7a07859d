//! Dashboard conversion against the shared hospital fixtures.

use serde_json::json;
use solution_templatize::dashboard::{referencing_objects, templatize_dashboard, track_references};
use solution_templatize::datasource::DatasourceInfo;
use solution_templatize::templating::Templatizer;
use solution_templatize::test_utils::{
    HOSPITAL_ITEM_ID, hospital_catalog, init_test_logging, sample_dashboard,
};

fn placeholder(layer: u32, field: &str) -> String {
    format!("{{{{{HOSPITAL_ITEM_ID}.layer{layer}.fields.{field}.name}}}}")
}

#[test]
fn test_sample_dashboard_is_templatized() {
    init_test_logging(None);

    let template =
        templatize_dashboard(&sample_dashboard(), &hospital_catalog(), &Templatizer::default())
            .unwrap();

    let gauge = &template.data["desktopView"]["widgets"][1];
    assert_eq!(gauge["valueField"], json!(placeholder(2, "numbeds")));
    assert_eq!(
        gauge["labelText"],
        json!(format!("Beds at {{{}}}", placeholder(2, "facilityid")))
    );

    let selector = &template.data["desktopView"]["headerPanel"]["selectors"][0];
    assert_eq!(selector["labelField"], json!(placeholder(2, "facilityid")));

    // datasets are left alone
    assert_eq!(gauge["datasets"], sample_dashboard()["desktopView"]["widgets"][1]["datasets"]);
}

#[test]
fn test_sample_dashboard_references() {
    let template =
        templatize_dashboard(&sample_dashboard(), &hospital_catalog(), &Templatizer::default())
            .unwrap();

    let references: Vec<(&str, Vec<&str>)> = template
        .datasources
        .iter()
        .map(|info| {
            (info.base_path.as_str(), info.references.iter().map(String::as_str).collect())
        })
        .collect();

    let layer0 = format!("{HOSPITAL_ITEM_ID}.layer0.fields");
    let layer2 = format!("{HOSPITAL_ITEM_ID}.layer2.fields");
    assert_eq!(
        references,
        vec![
            (layer0.as_str(), vec!["map0"]),
            (layer2.as_str(), vec!["map0", "gauge0", "selector0"]),
        ]
    );
}

#[test]
fn test_unreferenced_datasources_are_dropped() {
    let mut dashboard = sample_dashboard();
    dashboard["desktopView"]["widgets"].as_array_mut().unwrap().remove(0);

    let template =
        templatize_dashboard(&dashboard, &hospital_catalog(), &Templatizer::default()).unwrap();

    assert_eq!(template.datasources.len(), 1);
    assert_eq!(template.datasources[0].base_path, format!("{HOSPITAL_ITEM_ID}.layer2.fields"));
}

#[test]
fn test_tracking_twice_appends_twice() {
    let dashboard = sample_dashboard();
    let mut catalog = hospital_catalog();

    track_references(referencing_objects(&dashboard), &mut catalog);
    track_references(referencing_objects(&dashboard), &mut catalog);

    assert_eq!(catalog[0].references, vec!["map0", "map0"]);
    assert_eq!(catalog[1].references.len(), 6);
}

#[test]
fn test_widgets_keep_their_own_layer_fields() {
    init_test_logging(None);

    let catalog: Vec<DatasourceInfo> = [0_i64, 2]
        .into_iter()
        .map(|layer_id| {
            DatasourceInfo::new(format!("abc.layer{layer_id}.fields"))
                .with_item_id("abc")
                .with_layer_id(layer_id)
                .with_fields(["NUMBEDS"])
        })
        .collect();

    let dashboard = json!({
        "widgets": [
            {
                "id": "gauge0",
                "datasets": [{"dataSource": {"itemId": "abc", "layerId": 2}}],
                "valueField": "NUMBEDS"
            },
            {
                "id": "indicator0",
                "datasets": [{"dataSource": {"itemId": "abc", "layerId": 0}}],
                "valueField": "NUMBEDS"
            }
        ]
    });

    let template = templatize_dashboard(&dashboard, &catalog, &Templatizer::default()).unwrap();

    assert_eq!(
        template.data["widgets"][0]["valueField"],
        json!("{{abc.layer2.fields.numbeds.name}}")
    );
    assert_eq!(
        template.data["widgets"][1]["valueField"],
        json!("{{abc.layer0.fields.numbeds.name}}")
    );

    let references: Vec<&Vec<String>> = template.datasources.iter().map(|info| &info.references).collect();
    assert_eq!(references, vec![&vec!["indicator0".to_string()], &vec!["gauge0".to_string()]]);
}
