mod common;
use common::setup_facade;

use proptest::prelude::*;
use script_config::configs::{BasicsConfig, FieldsConfig, MetasConfig};

/// Comparable view of a tree: everything but ids.
#[derive(Debug, PartialEq)]
struct Shape {
    key: Option<String>,
    value: Option<String>,
    typed: Option<i32>,
    quote: String,
    children: Vec<Shape>,
}

fn shape(nodes: &[MetasConfig], owner: &str) -> Vec<Shape> {
    nodes
        .iter()
        .map(|n| Shape {
            key: n.meta_key.clone(),
            value: n.meta_value.clone(),
            typed: n.meta_typed,
            quote: owner.to_string(),
            children: shape(&n.meta_list, owner),
        })
        .collect()
}

fn read_shape(nodes: &[MetasConfig]) -> Vec<Shape> {
    nodes
        .iter()
        .map(|n| Shape {
            key: n.meta_key.clone(),
            value: n.meta_value.clone(),
            typed: n.meta_typed,
            quote: n.quote_id.clone(),
            children: read_shape(&n.meta_list),
        })
        .collect()
}

fn node() -> impl Strategy<Value = MetasConfig> {
    let leaf = (
        proptest::option::of("[a-z]{1,6}"),
        proptest::option::of("[ -~]{0,8}"),
        proptest::option::of(-3i32..10),
    )
        .prop_map(|(key, value, typed)| MetasConfig {
            meta_id: None,
            quote_id: String::new(),
            meta_key: key,
            meta_value: value,
            meta_typed: typed,
            meta_list: Vec::new(),
        });

    leaf.prop_recursive(5, 40, 4, |inner| {
        (inner.clone(), proptest::collection::vec(inner, 0..4)).prop_map(|(mut parent, kids)| {
            parent.meta_list = kids;
            parent
        })
    })
}

fn aggregate() -> impl Strategy<Value = BasicsConfig> {
    (
        proptest::collection::vec(node(), 0..4),
        proptest::option::of(proptest::collection::vec(node(), 0..3)),
        proptest::option::of("[a-z=&]{0,10}"),
        0i32..3,
    )
        .prop_map(|(metas, fields_metas, params, typed)| {
            let mut b = BasicsConfig::new("script", "https://example.com/feed", "items");
            b.url_params_field = params;
            b.url_typed_field = typed;
            b.meta_list = metas;
            b.fields_config = fields_metas.map(|m| {
                let mut f = FieldsConfig::new("id", "title");
                f.meta_list = m;
                f
            });
            b
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn insert_then_get_reproduces_the_aggregate(cfg in aggregate()) {
        let (_db, facade, _raw) = setup_facade();
        facade.insert(&cfg).unwrap();

        let got = facade.get_by_id(&cfg.basic_id).unwrap().expect("present");
        prop_assert_eq!(&got.scripts_id, &cfg.scripts_id);
        prop_assert_eq!(&got.url_params_field, &cfg.url_params_field);
        prop_assert_eq!(got.url_typed_field, cfg.url_typed_field);
        prop_assert_eq!(read_shape(&got.meta_list), shape(&cfg.meta_list, &cfg.basic_id));

        match (&got.fields_config, &cfg.fields_config) {
            (None, None) => {}
            (Some(g), Some(c)) => {
                prop_assert_eq!(&g.field_id, &c.field_id);
                prop_assert_eq!(read_shape(&g.meta_list), shape(&c.meta_list, &c.field_id));
            }
            _ => prop_assert!(false, "fields presence differs"),
        }

        prop_assert_eq!(facade.delete(&cfg.basic_id).unwrap(), 1);
        prop_assert!(facade.get_metas_config_by_quote_id(&cfg.basic_id).unwrap().is_empty());
        if let Some(c) = &cfg.fields_config {
            prop_assert!(facade.get_fields_config_by_id(&c.field_id).unwrap().is_none());
            prop_assert!(facade.get_metas_config_by_quote_id(&c.field_id).unwrap().is_empty());
        }
    }
}
