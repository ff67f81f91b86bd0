//! Integration tests for tagged types and the type registry

use std::sync::Arc;

use rtable_foundation::{
    DataType, MAYBE_TYPE_NAME, TagType, TypeManager, TypeRegistry, Value,
};

#[test]
fn maybe_is_always_known() {
    let registry = TypeRegistry::new();
    let maybe = registry.lookup_tagged_type(MAYBE_TYPE_NAME).unwrap();
    assert_eq!(maybe.tags.len(), 2);
    assert_eq!(
        registry.make_maybe_type(DataType::Text),
        DataType::maybe(DataType::Text)
    );
    assert!(registry.maybe_missing().is_missing());
    assert_eq!(
        registry.maybe_present(Value::from(1)).as_maybe(),
        Some(Some(&Value::from(1)))
    );
}

#[test]
fn registration_is_idempotent_but_not_overwriting() {
    let mut registry = TypeRegistry::new();
    let tags = vec![TagType::bare("lo"), TagType::bare("hi")];
    let first = registry.register_tagged_type("level 0", vec![], tags.clone()).unwrap();
    let again = registry.register_tagged_type("level 0", vec![], tags).unwrap();
    assert!(Arc::ptr_eq(&first, &again));

    let clash = registry.register_tagged_type("level 0", vec![], vec![TagType::bare("other")]);
    assert!(clash.is_none());
    assert_eq!(registry.known_tagged_types().len(), 2);
}

#[test]
fn enum_membership_ignores_order() {
    let mut registry = TypeRegistry::new();
    let def = registry
        .register_tagged_type(
            "size 0",
            vec![],
            vec![TagType::bare("S"), TagType::bare("M"), TagType::bare("L")],
        )
        .unwrap();
    let levels: Vec<Arc<str>> = ["L", "S", "M"].into_iter().map(Arc::from).collect();
    assert!(def.is_enum_over(&levels));
    assert!(!def.is_enum_over(&levels[..2]));
    assert_eq!(def.tag_index("M"), Some(1));
}

#[test]
fn generic_definitions_instantiate() {
    let maybe = TypeRegistry::new().lookup_tagged_type(MAYBE_TYPE_NAME).unwrap();
    let tags = maybe.instantiate(&[DataType::Boolean]);
    assert_eq!(tags[1].inner, Some(DataType::Boolean));
    assert!(!maybe.is_enum());
}
