use super::*;
use crate::report::{DiagnosticKind, Diagnostics};
use serde_json::json;

#[test]
fn test_classify_scalars() {
    assert_eq!(classify(&json!(null)).unwrap(), MetadataValue::Null);
    assert_eq!(
        classify(&json!(true)).unwrap(),
        MetadataValue::Scalar(Scalar::Bool(true))
    );
    assert_eq!(
        classify(&json!(42)).unwrap(),
        MetadataValue::Scalar(Scalar::Int(42))
    );
    assert_eq!(
        classify(&json!(1.0)).unwrap(),
        MetadataValue::Scalar(Scalar::Float(1.0))
    );
    assert_eq!(
        classify(&json!("Fp1")).unwrap(),
        MetadataValue::Scalar(Scalar::String("Fp1".to_string()))
    );
}

#[test]
fn test_classify_homogeneous_array() {
    let value = classify(&json!(["A", "B", "C"])).unwrap();
    let MetadataValue::Array(array) = value else {
        panic!("expected array");
    };
    assert_eq!(array.kind(), Some(ScalarKind::String));
    assert_eq!(array.shape(), &[3]);
}

#[test]
fn test_mixed_array_coerced_to_float() {
    let mut diagnostics = Diagnostics::new();
    let value = classify_at("Info.mixed", &json!([1, 2.5, 3]), &mut diagnostics).unwrap();

    assert_eq!(
        value,
        MetadataValue::Array(ArrayValue::from_floats([1.0, 2.5, 3.0]))
    );
    assert_eq!(diagnostics.len(), 1);
    let diagnostic = diagnostics.iter().next().unwrap();
    assert_eq!(diagnostic.path, "Info.mixed");
    assert_eq!(diagnostic.kind, DiagnosticKind::CoercedToFloat);
}

#[test]
fn test_nulls_in_numeric_array_become_nan() {
    let value = classify(&json!([0.1, null, 0.3])).unwrap();
    let MetadataValue::Array(array) = value else {
        panic!("expected array");
    };
    assert_eq!(array.kind(), Some(ScalarKind::Float));
    assert!(matches!(array.elements()[1], Scalar::Float(v) if v.is_nan()));
}

#[test]
fn test_uncoercible_array_is_rejected() {
    let result = classify(&json!(["abc", 1]));
    assert!(matches!(result, Err(ValueError::Heterogeneous { .. })));
}

#[test]
fn test_numeric_strings_coerce() {
    let value = classify(&json!(["1.5", 2])).unwrap();
    assert_eq!(
        value,
        MetadataValue::Array(ArrayValue::from_floats([1.5, 2.0]))
    );
}

#[test]
fn test_ragged_array_is_rejected() {
    let result = classify(&json!([[1, 2], [3]]));
    assert!(matches!(result, Err(ValueError::Ragged { .. })));
}

#[test]
fn test_mixed_container_is_rejected() {
    let result = classify(&json!([{"a": 1}, 2]));
    assert!(matches!(result, Err(ValueError::MixedContainer { .. })));
}

#[test]
fn test_list_of_maps() {
    let value = classify(&json!([{"ch_name": "A"}, {"ch_name": "B"}])).unwrap();
    let MetadataValue::ListOfMaps(items) = value else {
        panic!("expected list of maps");
    };
    assert_eq!(items.len(), 2);
    assert_eq!(
        items[1].get("ch_name"),
        Some(&MetadataValue::Scalar(Scalar::String("B".to_string())))
    );
}

#[test]
fn test_map_preserves_key_order() {
    let value = classify(&json!({"zeta": 1, "alpha": 2, "mid": 3})).unwrap();
    let MetadataValue::Map(map) = value else {
        panic!("expected map");
    };
    let keys: Vec<&str> = map.keys().collect();
    assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
}

#[test]
fn test_two_dimensional_array_keeps_shape() {
    let value = classify(&json!([[1, 2, 3], [4, 5, 6]])).unwrap();
    let MetadataValue::Array(array) = value else {
        panic!("expected array");
    };
    assert_eq!(array.shape(), &[2, 3]);
    assert_eq!(array.ndim(), 2);
}

#[test]
fn test_multidimensional_array_skips_type_checks() {
    let mixed = classify(&json!([[1, "a"], [2, 3]])).unwrap();
    let MetadataValue::Array(mixed) = mixed else {
        panic!("expected array");
    };
    assert_eq!(mixed.shape(), &[2, 2]);
    assert_eq!(mixed.kind(), None);

    let maps = classify(&json!([[{"a": 1}]])).unwrap();
    let MetadataValue::Array(maps) = maps else {
        panic!("expected array");
    };
    assert_eq!(maps.shape(), &[1, 1]);
}

#[test]
fn test_dimensionality() {
    assert_eq!(dimensionality(&json!(1.0)), 0);
    assert_eq!(dimensionality(&json!({"a": [1, 2]})), 0);
    assert_eq!(dimensionality(&json!([1, 2])), 1);
    assert_eq!(dimensionality(&json!([[1, 2], [3, 4]])), 2);
    assert_eq!(dimensionality(&json!([[[1], [2]], [[3], [4]]])), 3);
    assert_eq!(dimensionality(&json!([[1, 2], [3]])), 1);
}

#[test]
fn test_coord_transform_is_composite() {
    let raw = json!({
        "from": 1,
        "to": 4,
        "trans": [[1.0, 0.0, 0.0, 0.0],
                  [0.0, 1.0, 0.0, 0.0],
                  [0.0, 0.0, 1.0, 0.04],
                  [0.0, 0.0, 0.0, 1.0]]
    });
    let value = classify(&raw).unwrap();
    let MetadataValue::Composite(composite) = value else {
        panic!("expected composite");
    };
    assert_eq!(composite.kind, CompositeKind::CoordTransform);
    assert_eq!(composite.fields.len(), 2);
    let aux = composite.aux.expect("aux array");
    assert_eq!(aux.field, "trans");
    assert_eq!(aux.shape, vec![4, 4]);
    assert_eq!(aux.data[11], 0.04);
}

#[test]
fn test_transform_lookalike_without_matrix_is_a_map() {
    let value = classify(&json!({"from": 1, "to": 4, "trans": "identity"})).unwrap();
    assert!(matches!(value, MetadataValue::Map(_)));
}

#[test]
fn test_classify_map_rejects_non_object() {
    let mut diagnostics = Diagnostics::new();
    let result = classify_map("Info", &json!([1, 2]), &mut diagnostics);
    assert!(matches!(result, Err(ValueError::NotAMap { found: "array", .. })));
    assert!(classify_map("Info", &json!(null), &mut diagnostics)
        .unwrap()
        .is_empty());
}

#[test]
fn test_to_json_renders_nested_shapes() {
    let raw = json!({"dev_head_t": {"from": 1, "to": 4, "trans": [[1.0, 2.0], [3.0, 4.0]]},
                     "matrix": [[1, 2], [3, 4]]});
    let value = classify(&raw).unwrap();
    assert_eq!(value.to_json(), raw);
}

#[test]
fn test_map_insert_replaces_in_place() {
    let mut map = MetadataMap::new();
    map.insert("a", Scalar::Int(1).into());
    map.insert("b", Scalar::Int(2).into());
    let old = map.insert("a", Scalar::Int(3).into());

    assert_eq!(old, Some(MetadataValue::Scalar(Scalar::Int(1))));
    assert_eq!(map.keys().collect::<Vec<_>>(), vec!["a", "b"]);
    assert_eq!(map.get("a"), Some(&MetadataValue::Scalar(Scalar::Int(3))));
}

#[test]
fn test_scalar_float_serde_keeps_non_finite() {
    let values = vec![
        Scalar::Float(f64::NAN),
        Scalar::Float(f64::INFINITY),
        Scalar::Float(-0.5),
    ];
    let json = serde_json::to_string(&values).unwrap();
    let restored: Vec<Scalar> = serde_json::from_str(&json).unwrap();

    assert!(matches!(restored[0], Scalar::Float(v) if v.is_nan()));
    assert_eq!(restored[1], Scalar::Float(f64::INFINITY));
    assert_eq!(restored[2], Scalar::Float(-0.5));
}
