mod common;
use common::{keys, setup_facade};

use script_config::configs::{BasicsConfig, MetasConfig};
use serde_json::{Value, json};

const IMPORT: &str = r#"{
  "basicId": "hn-top",
  "scriptsId": "hacker-news",
  "apiUrlField": "https://hn.example/api/top",
  "urlParamsField": null,
  "urlTypedField": 2,
  "rootPath": "hits",
  "fieldsConfig": {
    "fieldId": "hn-fields",
    "quoteId": "hn-fields",
    "idField": "objectID",
    "titleField": "title",
    "sourceUrlField": "url",
    "metaList": [
      { "metaKey": "date", "metaValue": "created_at", "metaList": null }
    ]
  },
  "metaList": [
    {
      "metaKey": "headers",
      "metaList": [
        { "metaKey": "Accept", "metaValue": "application/json", "metaTyped": 1 }
      ]
    }
  ]
}"#;

#[test]
fn imported_json_persists_and_exports_camel_case() {
    let (_db, facade, _raw) = setup_facade();

    let cfg = BasicsConfig::from_json(IMPORT).unwrap();
    cfg.validate().unwrap();
    assert!(cfg.meta_list[0].meta_id.is_none());
    facade.insert(&cfg).unwrap();

    let got = facade.get_by_id("hn-top").unwrap().expect("imported");
    assert_eq!(keys(&got.meta_list), ["headers"]);
    assert_eq!(keys(&got.meta_list[0].meta_list), ["Accept"]);
    assert!(got.meta_list[0].meta_id.is_some());
    // no metaTyped in the document means category 0
    assert_eq!(got.meta_list[0].meta_typed, Some(0));

    let fields = got.fields_config.as_ref().expect("fields");
    assert_eq!(fields.source_url_field.as_deref(), Some("url"));
    assert_eq!(fields.meta_list[0].quote_id, "hn-fields");

    let out: Value = serde_json::to_value(&got).unwrap();
    assert_eq!(out["basicId"], json!("hn-top"));
    assert_eq!(out["urlTypedField"], json!(2));
    assert_eq!(out["urlParamsField"], Value::Null);
    assert_eq!(out["fieldsConfig"]["picField"], Value::Null);
    assert_eq!(out["metaList"][0]["metaList"][0]["metaTyped"], json!(1));
    assert_eq!(out["metaList"][0]["quoteId"], json!("hn-top"));
    // leaves export an empty list, never null
    assert_eq!(out["metaList"][0]["metaList"][0]["metaList"], json!([]));
}

#[test]
fn exported_json_reimports_as_an_update() {
    let (_db, facade, _raw) = setup_facade();
    let cfg: BasicsConfig = serde_json::from_str(IMPORT).unwrap();
    facade.insert(&cfg).unwrap();

    let exported = serde_json::to_string(&facade.get_by_id("hn-top").unwrap().unwrap()).unwrap();
    let mut edited = BasicsConfig::from_json(&exported).unwrap();
    edited.root_path = "data.hits".into();

    assert_eq!(facade.update(&edited).unwrap(), 1);
    assert_eq!(facade.get_by_id("hn-top").unwrap().unwrap(), edited);
}

#[test]
fn invalid_import_is_rejected_before_writing() {
    let mut doc: Value = serde_json::from_str(IMPORT).unwrap();
    doc["apiUrlField"] = json!("");
    let cfg: BasicsConfig = serde_json::from_value(doc).unwrap();
    assert!(cfg.validate().is_err());
}

#[test]
fn deep_tree_exports_and_reimports() {
    let (_db, facade, _raw) = setup_facade();

    let depth = 100;
    let mut node = MetasConfig::new(format!("k{}", depth - 1), None);
    for i in (0..depth - 1).rev() {
        node = MetasConfig::new(format!("k{i}"), None).with_children(vec![node]);
    }
    let mut cfg = BasicsConfig::new("deep", "https://example.com/deep", "items");
    cfg.meta_list.push(node);
    facade.insert(&cfg).unwrap();

    let stored = facade.get_by_id(&cfg.basic_id).unwrap().unwrap();
    let exported = serde_json::to_string_pretty(&stored).unwrap();
    // the stock reader gives up long before this depth
    assert!(serde_json::from_str::<BasicsConfig>(&exported).is_err());

    let mut reimported = BasicsConfig::from_json(&exported).unwrap();
    assert_eq!(reimported.meta_list[0].depth(), depth);

    reimported.root_path = "data.items".into();
    assert_eq!(facade.update(&reimported).unwrap(), 1);
    let got = facade.get_by_id(&cfg.basic_id).unwrap().unwrap();
    assert_eq!(got, reimported);
    assert_eq!(got.meta_list[0].node_count(), depth);
}
