//! Web application conversion against the shared hospital fixtures.

use serde_json::json;
use solution_templatize::templating::{PatternMode, TemplatizeOptions, Templatizer};
use solution_templatize::test_utils::{
    HOSPITAL_ITEM_ID, WEB_MAP_LAYER_ID, hospital_catalog, sample_web_app,
};
use solution_templatize::webapp::templatize_web_application;

#[test]
fn test_search_fields_follow_web_map_layer_id() {
    let result =
        templatize_web_application(&sample_web_app(), &hospital_catalog(), &Templatizer::default())
            .unwrap();

    let fields = &result["values"]["searchLayers"][WEB_MAP_LAYER_ID]["searchFields"];
    assert_eq!(
        fields,
        &json!([
            format!("{{{{{HOSPITAL_ITEM_ID}.layer2.fields.name.name}}}}"),
            format!("{{{{{HOSPITAL_ITEM_ID}.layer2.fields.facilityid.name}}}}"),
        ])
    );
    assert_eq!(result["values"]["title"], json!("Hospital finder"));
    assert_eq!(result["source"], sample_web_app()["source"]);
}

#[test]
fn test_escaped_mode_gives_same_result_for_plain_ids() {
    let escaped = Templatizer::new(TemplatizeOptions {
        pattern_mode: PatternMode::Escaped,
        templatize_keys: false,
    });

    let raw =
        templatize_web_application(&sample_web_app(), &hospital_catalog(), &Templatizer::default())
            .unwrap();
    let literal =
        templatize_web_application(&sample_web_app(), &hospital_catalog(), &escaped).unwrap();
    assert_eq!(raw, literal);
}
