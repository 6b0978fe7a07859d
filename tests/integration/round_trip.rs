//! Templatizing and then resolving against the catalog's own field names
//! gives back the original document.

use serde_json::json;
use solution_templatize::datasource::{DatasourceInfo, field_settings};
use solution_templatize::templating::{Templatizer, resolve_placeholders};
use solution_templatize::test_utils::{hospital_catalog, sample_dashboard, sample_web_app};
use solution_templatize::webapp::templatize_web_application;

#[test]
fn test_dashboard_round_trip() {
    let catalog = hospital_catalog();
    let dashboard = sample_dashboard();

    let template = solution_templatize::dashboard::templatize_dashboard(
        &dashboard,
        &catalog,
        &Templatizer::default(),
    )
    .unwrap();
    assert_ne!(template.data, dashboard);

    let resolved = resolve_placeholders(&template.data, &field_settings(&catalog), true).unwrap();
    assert_eq!(resolved, dashboard);
}

#[test]
fn test_web_app_round_trip() {
    let catalog = hospital_catalog();
    let app = sample_web_app();

    let template = templatize_web_application(&app, &catalog, &Templatizer::default()).unwrap();
    let resolved = resolve_placeholders(&template, &field_settings(&catalog), true).unwrap();
    assert_eq!(resolved, app);
}

#[test]
fn test_resolve_into_another_organization() {
    let catalog = vec![
        DatasourceInfo::new("src.layer0.fields").with_item_id("src").with_fields(["STATUS"]),
    ];
    let widget = json!({"itemId": "src", "field": "STATUS", "title": "{STATUS} today"});

    let template = Templatizer::default().templatize_object(&widget, &catalog).unwrap();
    let target = json!({"src": {"layer0": {"fields": {"status": {"name": "CONDITION"}}}}});

    let deployed = resolve_placeholders(&template, &target, true).unwrap();
    assert_eq!(deployed, json!({"itemId": "src", "field": "CONDITION", "title": "{CONDITION} today"}));
}
