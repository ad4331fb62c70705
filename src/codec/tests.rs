use super::*;
use crate::report::{DiagnosticKind, Diagnostics};
use crate::store::{Block, Section};
use crate::value::{classify_map, ArrayValue, MetadataValue, Scalar};
use serde_json::{json, Value};

fn encode_json(raw: &Value) -> (Section, Block, Diagnostics) {
    let mut diagnostics = Diagnostics::new();
    let map = classify_map("Info", raw, &mut diagnostics).unwrap();
    let mut section = Section::new("Info", "File metadata");
    let mut block = Block::new("EEG Data Block", "Recording");
    encode(&map, &mut section, &mut block, &mut diagnostics).unwrap();
    (section, block, diagnostics)
}

fn round_trip(raw: &Value) -> Value {
    let (section, block, _) = encode_json(raw);
    decode(&section, Some(&block)).unwrap().to_json()
}

// ==================== Tag Table Tests ====================

#[test]
fn test_property_type_tags_are_total() {
    for kind in crate::value::ScalarKind::ALL {
        for property_type in [PropertyType::Scalar(kind), PropertyType::Array(kind)] {
            assert_eq!(PropertyType::from_tag(property_type.tag()), Some(property_type));
        }
    }
    assert_eq!(PropertyType::from_tag("ref"), Some(PropertyType::DataRef));
    assert_eq!(PropertyType::from_tag("complex"), None);
    assert_eq!(PropertyType::from_tag("float[][]"), None);
}

#[test]
fn test_parse_list_item_name() {
    assert_eq!(parse_list_item_name("chs-12"), Some(("chs", 12)));
    assert_eq!(parse_list_item_name("dig-points-0"), Some(("dig-points", 0)));
    assert_eq!(parse_list_item_name("chs"), None);
    assert_eq!(parse_list_item_name("chs-"), None);
    assert_eq!(parse_list_item_name("chs-x"), None);
}

// ==================== Encode Tests ====================

#[test]
fn test_encode_scalars_and_arrays() {
    let (section, _, diagnostics) = encode_json(&json!({
        "sfreq": 256.0,
        "nchan": 3,
        "highpass_on": true,
        "description": "resting state",
        "bads": ["T7", "T8"],
    }));

    assert!(diagnostics.is_empty());
    let tags: Vec<(&str, &str)> = section
        .properties()
        .map(|p| (p.name.as_str(), p.type_tag.as_str()))
        .collect();
    assert_eq!(
        tags,
        vec![
            ("sfreq", "float"),
            ("nchan", "int"),
            ("highpass_on", "bool"),
            ("description", "string"),
            ("bads", "string[]"),
        ]
    );
}

#[test]
fn test_encode_skips_null_empty_and_multidimensional() {
    let (section, _, diagnostics) = encode_json(&json!({
        "line_freq": null,
        "projs": [],
        "matrix": [[1, 2], [3, 4]],
        "kept": 1,
    }));

    let names: Vec<&str> = section.entries().iter().map(|e| e.name()).collect();
    assert_eq!(names, vec!["kept"]);

    assert_eq!(diagnostics.len(), 2);
    assert!(diagnostics.contains_path("Info.projs"));
    assert!(diagnostics.contains_path("Info.matrix"));
    assert!(!diagnostics.contains_path("Info.line_freq"));
    assert!(diagnostics
        .iter()
        .any(|d| d.kind == DiagnosticKind::SkippedDimensionality(2)));
}

#[test]
fn test_encode_skips_multidimensional_mixed_and_map_arrays() {
    for matrix in [json!([[1, "a"], [2, 3]]), json!([[{"a": 1}]])] {
        let raw = json!({"m": matrix, "kept": 1});
        let (section, block, diagnostics) = encode_json(&raw);

        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics.contains_path("Info.m"));
        assert!(diagnostics
            .iter()
            .any(|d| d.kind == DiagnosticKind::SkippedDimensionality(2)));

        let decoded = decode(&section, Some(&block)).unwrap();
        assert!(decoded.get("m").is_none());
        assert_eq!(decoded.to_json(), json!({"kept": 1}));
    }
}

#[test]
fn test_encode_list_of_maps_as_enumerated_sections() {
    let (section, _, _) = encode_json(&json!({
        "chs": [{"ch_name": "A"}, {"ch_name": "B"}, {"ch_name": "C"}]
    }));

    let names: Vec<(&str, &str)> = section
        .sections()
        .map(|s| (s.name.as_str(), s.type_tag.as_str()))
        .collect();
    assert_eq!(
        names,
        vec![
            ("chs-0", "metadata-item"),
            ("chs-1", "metadata-item"),
            ("chs-2", "metadata-item"),
        ]
    );
}

#[test]
fn test_encode_retries_heterogeneous_array_as_float() {
    let mut map = crate::value::MetadataMap::new();
    map.insert(
        "mixed",
        MetadataValue::Array(ArrayValue::new(vec![
            Scalar::Int(1),
            Scalar::Float(2.5),
            Scalar::Int(3),
        ])),
    );
    let mut section = Section::new("Info", "File metadata");
    let mut block = Block::new("b", "Recording");
    let mut diagnostics = Diagnostics::new();

    encode(&map, &mut section, &mut block, &mut diagnostics).unwrap();

    let property = section.property("mixed").unwrap();
    assert_eq!(property.type_tag, "float[]");
    assert_eq!(
        property.values,
        vec![Scalar::Float(1.0), Scalar::Float(2.5), Scalar::Float(3.0)]
    );
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(
        diagnostics.iter().next().unwrap().kind,
        DiagnosticKind::CoercedToFloat
    );
}

#[test]
fn test_encode_fails_when_coercion_fails() {
    let mut map = crate::value::MetadataMap::new();
    map.insert(
        "broken",
        MetadataValue::Array(ArrayValue::new(vec![
            Scalar::String("abc".to_string()),
            Scalar::Int(1),
        ])),
    );
    let mut section = Section::new("Info", "File metadata");
    let mut block = Block::new("b", "Recording");
    let mut diagnostics = Diagnostics::new();

    let result = encode(&map, &mut section, &mut block, &mut diagnostics);
    assert!(matches!(
        result,
        Err(EncodeError::Heterogeneous { ref path }) if path == "Info.broken"
    ));
}

#[test]
fn test_encode_composite_links_aux_array() {
    let (section, block, _) = encode_json(&json!({
        "dev_head_t": {"from": 1, "to": 4, "trans": [[1.0, 0.0], [0.0, 1.0]]}
    }));

    let transform = section.section("dev_head_t").unwrap();
    assert_eq!(transform.type_tag, "coord-transform");
    assert_eq!(transform.property("trans").unwrap().type_tag, "ref");

    let linked = block.linked_data_arrays(transform.id);
    assert_eq!(linked.len(), 1);
    assert_eq!(linked[0].type_tag, AUX_ARRAY_TYPE);
    assert_eq!(linked[0].shape, vec![2, 2]);
    assert_eq!(linked[0].name, format!("{}.trans", transform.id));
    assert_eq!(linked[0].dimensions.len(), 2);
}

// ==================== Decode Tests ====================

#[test]
fn test_round_trip_nested_metadata() {
    let raw = json!({
        "meas_date": "2019-02-01T10:00:00",
        "sfreq": 500.0,
        "bads": [],
        "chs": [
            {"ch_name": "Fp1", "kind": 2, "loc": [0.1, 0.2, 0.3]},
            {"ch_name": "Fp2", "kind": 2, "loc": [0.4, 0.5, 0.6]}
        ],
        "subject_info": {"his_id": "sub-01", "hand": 1, "weight": {"kg": 70.5}},
        "dev_head_t": {"from": 1, "to": 4, "trans": [[1.0, 0.0], [0.0, 1.0]]},
        "custom_ref_applied": false
    });

    let mut expected = raw.clone();
    expected.as_object_mut().unwrap().remove("bads");

    assert_eq!(round_trip(&raw), expected);
}

#[test]
fn test_round_trip_preserves_single_element_arrays() {
    let raw = json!({"one": [1.5], "scalar": 1.5, "names": ["only"]});
    assert_eq!(round_trip(&raw), raw);
}

#[test]
fn test_round_trip_composite_with_list_of_maps_field() {
    let raw = json!({
        "t": {"from": [{"a": 1}, {"a": 2}], "to": 4, "trans": [[1.0]]},
        "kept": "yes"
    });
    let (section, block, diagnostics) = encode_json(&raw);
    assert!(diagnostics.is_empty());

    let decoded = decode(&section, Some(&block)).unwrap();
    let Some(MetadataValue::Composite(composite)) = decoded.get("t") else {
        panic!("expected composite");
    };
    assert!(composite.fields.get("from-0").is_none());
    assert!(matches!(
        composite.fields.get("from"),
        Some(MetadataValue::ListOfMaps(items)) if items.len() == 2
    ));
    assert_eq!(decoded.to_json(), raw);
}

#[test]
fn test_mixed_array_decodes_as_float() {
    let decoded = round_trip(&json!({"mixed": [1, 2.5, 3]}));
    assert_eq!(decoded, json!({"mixed": [1.0, 2.5, 3.0]}));
}

#[test]
fn test_decode_unknown_property_type() {
    let mut section = Section::new("Info", "File metadata");
    section
        .create_property("weird", "complex", vec![Scalar::Float(1.0)])
        .unwrap();

    let result = decode(&section, None);
    assert!(matches!(
        result,
        Err(DecodeError::UnknownType { ref tag, .. }) if tag == "complex"
    ));
}

#[test]
fn test_decode_unknown_section_type() {
    let mut section = Section::new("Info", "File metadata");
    section.create_section("odd", "mystery").unwrap();

    let result = decode(&section, None);
    assert!(matches!(result, Err(DecodeError::UnknownSectionType { .. })));
}

#[test]
fn test_decode_orphan_list_item() {
    let mut section = Section::new("Info", "File metadata");
    section.create_section("chs-1", SECTION_LIST_ITEM).unwrap();

    let result = decode(&section, None);
    assert!(matches!(result, Err(DecodeError::OrphanListItem { .. })));
}

#[test]
fn test_decode_scalar_type_mismatch() {
    let mut section = Section::new("Info", "File metadata");
    section
        .create_property("n", "int", vec![Scalar::String("x".to_string())])
        .unwrap();

    let result = decode(&section, None);
    assert!(matches!(result, Err(DecodeError::TypeMismatch { .. })));
}

#[test]
fn test_decode_composite_requires_block() {
    let (section, _, _) = encode_json(&json!({
        "dev_head_t": {"from": 1, "to": 4, "trans": [[1.0]]}
    }));

    let result = decode(&section, None);
    assert!(matches!(result, Err(DecodeError::InvalidReference { .. })));
}
