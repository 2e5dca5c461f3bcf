use accel_core::{CopyMode, CoreError, Data, DataCatalog, DatasetHandle, MemoryDataset, MemoryFactory, NamingRule};
use accel_core::DatasetFactory;
use serde_json::json;

#[test]
fn physical_names_follow_naming_rule() {
    let mut legacy = DataCatalog::with_naming(NamingRule::for_version("0.16.1"));
    let mut modern = DataCatalog::with_naming(NamingRule::for_version("0.17.0"));
    for cat in [&mut legacy, &mut modern] {
        cat.add("params:alpha", DatasetHandle::new(MemoryDataset::new()), false).unwrap();
    }
    assert!(legacy.get_physical("params:alpha").is_some());
    assert!(modern.get_physical("params__alpha").is_some());
    assert_eq!(modern.list(), vec!["params:alpha"]);
}

#[test]
fn bulk_replace_keeps_membership_and_order() {
    let factory = MemoryFactory::new();
    let mut cat = DataCatalog::new();
    for n in ["a", "b@x", "c"] {
        cat.add(n, factory.create(n).unwrap(), false).unwrap();
    }
    let before = cat.list();
    let replacements = vec![("c".to_string(), factory.create("c").unwrap()),
                            ("a".to_string(), factory.create("a").unwrap())];
    cat.add_all(replacements, true).unwrap();
    assert_eq!(cat.list(), before);
}

#[test]
fn copy_mode_through_catalog() {
    let mut cat = DataCatalog::new();
    cat.add("shared", DatasetHandle::new(MemoryDataset::with_copy_mode(Some(CopyMode::Assign))), false)
       .unwrap();
    cat.add("isolated", DatasetHandle::new(MemoryDataset::with_copy_mode(Some(CopyMode::DeepCopy))), false)
       .unwrap();
    let doc = Data::new(json!({"rows": [{"id": 1}]}));
    cat.save("shared", doc.clone()).unwrap();
    cat.save("isolated", doc.clone()).unwrap();
    assert!(Data::ptr_eq(&cat.load("shared").unwrap(), &doc));
    let isolated = cat.load("isolated").unwrap();
    assert_eq!(isolated, doc);
    assert!(!Data::ptr_eq(&isolated, &doc));
}

#[test]
fn unknown_dataset_errors() {
    let cat = DataCatalog::new();
    assert!(matches!(cat.save("nope", Data::new(json!(1))), Err(CoreError::DatasetNotFound(_))));
    assert!(!cat.exists("nope").unwrap());
    cat.release("nope").unwrap();
}
