use super::*;
use crate::events::Event;
use crate::recording::{Annotation, SampleData};
use crate::report::DiagnosticKind;
use crate::signal::BLOCK_NAME;
use crate::store::{StoreFile, StoreError};
use crate::value::{MetadataValue, Scalar};
use serde_json::json;
use std::fs;
use tempfile::tempdir;

fn recording() -> RawRecording {
    let rows: Vec<Vec<f64>> = (0..3)
        .map(|c| (0..100).map(|s| (c * 100 + s) as f64 * 1e-6).collect())
        .collect();
    RawRecording {
        sample_rate: 10.0,
        unit: "V".to_string(),
        channel_names: vec!["A".into(), "B".into(), "C".into()],
        n_times: Some(100),
        data: SampleData::Rows(rows),
        info: json!({
            "sfreq": 10.0,
            "nchan": 3,
            "bads": [],
            "projs": [[1, 2], [3, 4]],
            "highpass": 0.1,
            "subject_info": {"his_id": "sub-01", "sex": 1},
            "chs": [
                {"ch_name": "A", "loc": [0.0, 0.0, 0.0]},
                {"ch_name": "B", "loc": [0.0, 0.0, 0.0]},
                {"ch_name": "C", "loc": [0.0, 0.0, 0.0]}
            ]
        }),
        extras: vec![json!({"filter": "bandpass", "gains": [1, 2.5, 3]})],
        annotations: vec![Annotation {
            onset: 2.0,
            duration: 0.5,
            description: "S1".to_string(),
        }],
    }
}

// ==================== Forward Conversion Tests ====================

#[test]
fn test_convert_combined_scenario() {
    let dir = tempdir().unwrap();
    let output = dir.path().join("scenario.sigtree");

    let report = Converter::new()
        .convert(&recording(), &output, PhysicalLayout::Combined)
        .unwrap();

    assert_eq!(report.channels, 3);
    assert_eq!(report.samples, 100);
    assert_eq!(report.events, 1);
    assert_eq!(report.layout, PhysicalLayout::Combined);
    assert!(report.store.file_size_bytes > 0);
    assert!(report.diagnostics.contains_path("Info.bads"));
    assert!(report.diagnostics.contains_path("Info.projs"));
    assert!(report.diagnostics.contains_path("Extras.gains"));

    let store = StoreFile::open(&output).unwrap();
    assert_eq!(store.sections()[0].name, INFO_SECTION);
    assert_eq!(store.sections()[1].name, EXTRAS_SECTION);

    let block = store.block(BLOCK_NAME).unwrap();
    let raw = crate::signal::raw_arrays(block).unwrap();
    assert_eq!(raw.len(), 1);
    assert_eq!(raw[0].shape, vec![3, 100]);
    assert_eq!(raw[0].dimensions[0].labels().unwrap().len(), 3);
    let ticks = raw[0].dimensions[1].ticks().unwrap();
    assert_eq!(ticks.len(), 100);
    assert!((ticks.get(1).unwrap() - 0.1).abs() < 1e-12);

    let tag = block.multi_tag_by_name(crate::events::TAG_NAME).unwrap();
    assert_eq!(block.data_array(tag.positions).unwrap().data(), &[0.0, 2.0]);
    let extents = tag.extents.unwrap();
    assert_eq!(block.data_array(extents).unwrap().data(), &[2.0, 0.5]);
}

#[test]
fn test_convert_refuses_existing_output() {
    let dir = tempdir().unwrap();
    let output = dir.path().join("exists.sigtree");
    fs::write(&output, b"occupied").unwrap();

    let result = Converter::new().convert(&recording(), &output, PhysicalLayout::Split);
    assert!(matches!(
        result,
        Err(ConvertError::StoreError(StoreError::AlreadyExists(_)))
    ));

    let converter = Converter::with_config(ConversionConfig::default().with_overwrite(true));
    assert!(converter
        .convert(&recording(), &output, PhysicalLayout::Split)
        .is_ok());
}

#[test]
fn test_failed_conversion_still_closes_store() {
    let dir = tempdir().unwrap();
    let output = dir.path().join("broken.sigtree");
    let mut broken = recording();
    broken.channel_names.pop();
    broken.n_times = None;

    let result = Converter::new().convert(&broken, &output, PhysicalLayout::Combined);
    assert!(matches!(result, Err(ConvertError::LayoutError(_))));

    // Metadata written before the failure is persisted
    let store = StoreFile::open(&output).unwrap();
    assert!(store.section(INFO_SECTION).is_some());
}

#[test]
fn test_multiple_extras_sections_are_numbered() {
    let dir = tempdir().unwrap();
    let output = dir.path().join("extras.sigtree");
    let mut input = recording();
    input.extras = vec![json!({"a": 1}), json!({"b": "two"})];

    Converter::new()
        .convert(&input, &output, PhysicalLayout::Split)
        .unwrap();

    let store = StoreFile::open(&output).unwrap();
    assert!(store.section("Extras-0").is_some());
    assert!(store.section("Extras-1").is_some());
}

#[test]
fn test_convert_file_with_montage() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("recording.json");
    let montage = dir.path().join("cap.sfp");
    let output = dir.path().join("montage.sigtree");

    recording().write_to_path(&input).unwrap();
    fs::write(&montage, "# cap\nA 0.1 0.2 0.3\nB 0.4 0.5 0.6\n").unwrap();

    let report = Converter::new()
        .convert_file(&input, Some(montage.as_path()), &output, PhysicalLayout::Split)
        .unwrap();

    assert!(report
        .diagnostics
        .iter()
        .any(|d| d.path == "C" && d.kind == DiagnosticKind::MontageUnmatched));

    let imported = import(&output).unwrap();
    let chs = imported.info.get("chs").unwrap();
    let MetadataValue::ListOfMaps(chs) = chs else {
        panic!("chs should be a list of maps");
    };
    assert_eq!(
        chs[0].get("loc").unwrap().to_json(),
        json!([0.1, 0.2, 0.3])
    );
}

// ==================== Import Tests ====================

#[test]
fn test_layouts_import_identically() {
    let dir = tempdir().unwrap();
    let combined = dir.path().join("combined.sigtree");
    let split = dir.path().join("split.sigtree");

    let converter = Converter::new();
    converter
        .convert(&recording(), &combined, PhysicalLayout::Combined)
        .unwrap();
    converter
        .convert(&recording(), &split, PhysicalLayout::Split)
        .unwrap();

    let a = import(&combined).unwrap();
    let b = import(&split).unwrap();

    assert_eq!(a.layout, PhysicalLayout::Combined);
    assert_eq!(b.layout, PhysicalLayout::Split);
    assert_eq!(a.signal, b.signal);
    assert_eq!(a.events, b.events);
    assert_eq!(a.info, b.info);
    assert_eq!(
        a.events.iter().collect::<Vec<_>>(),
        vec![&Event::new(2.0, 0.5, "S1")]
    );
}

#[test]
fn test_import_restores_metadata() {
    let dir = tempdir().unwrap();
    let output = dir.path().join("meta.sigtree");
    Converter::new()
        .convert(&recording(), &output, PhysicalLayout::Combined)
        .unwrap();

    let imported = import(&output).unwrap();
    assert_eq!(
        imported.info.get("nchan"),
        Some(&MetadataValue::Scalar(Scalar::Int(3)))
    );
    assert!(imported.info.get("bads").is_none());
    assert_eq!(
        imported.info.get("subject_info").unwrap().to_json(),
        json!({"his_id": "sub-01", "sex": 1})
    );
    assert_eq!(imported.extras.len(), 1);
    assert_eq!(
        imported.extras[0].get("gains").unwrap().to_json(),
        json!([1.0, 2.5, 3.0])
    );

    let raw = imported.to_raw();
    assert_eq!(raw.channel_names, vec!["A", "B", "C"]);
    assert_eq!(raw.annotations.len(), 1);
    assert_eq!(raw.signal().unwrap(), imported.signal);
}

#[test]
fn test_import_without_block_fails() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("empty.sigtree");
    StoreFile::create(&path, Default::default())
        .unwrap()
        .close()
        .unwrap();

    assert!(matches!(
        import(&path),
        Err(ConvertError::MissingBlock { .. })
    ));
}
