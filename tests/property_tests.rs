//! Property tests for the metadata codec, the signal layouts and event tags.

use proptest::collection::{btree_map, vec};
use proptest::prelude::*;
use serde_json::{json, Value};
use sigtree::codec::{decode, encode};
use sigtree::events::{event_samples, read_events, tag, Event, EventSet};
use sigtree::report::Diagnostics;
use sigtree::signal::{self, PhysicalLayout, SignalHeader, SignalMatrix, BLOCK_NAME, BLOCK_TYPE};
use sigtree::store::{Block, Section};
use sigtree::value::classify_map;

fn finite() -> impl Strategy<Value = f64> {
    any::<f64>().prop_filter("finite", |v| v.is_finite())
}

/// Keys may end in `-NN`; lists stay shorter than any such suffix
fn key() -> impl Strategy<Value = String> {
    "k[a-z]{0,4}(-[1-9][0-9])?"
}

fn scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<bool>().prop_map(Value::from),
        any::<i64>().prop_map(Value::from),
        finite().prop_map(Value::from),
        "[a-zA-Z0-9 ]{0,12}".prop_map(Value::from),
    ]
}

fn array() -> impl Strategy<Value = Value> {
    prop_oneof![
        vec(any::<bool>(), 1..5).prop_map(Value::from),
        vec(any::<i64>(), 1..5).prop_map(Value::from),
        vec(finite(), 1..5).prop_map(Value::from),
        vec("[a-z]{1,6}", 1..5).prop_map(Value::from),
    ]
}

fn matrix_2d() -> impl Strategy<Value = Value> {
    (1usize..4, 1usize..4)
        .prop_flat_map(|(rows, cols)| vec(vec(finite(), cols), rows))
        .prop_map(Value::from)
}

/// 2-D array whose leaves mix types, including maps
fn mixed_matrix() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![scalar(), Just(json!({"a": 1})), Just(Value::Null)].boxed();
    (1usize..4, 1usize..4).prop_flat_map(move |(rows, cols)| {
        vec(vec(leaf.clone(), cols), rows).prop_map(|rows| {
            Value::Array(rows.into_iter().map(Value::Array).collect())
        })
    })
}

fn object(entries: std::collections::BTreeMap<String, Value>) -> Value {
    Value::Object(entries.into_iter().collect())
}

fn metadata() -> impl Strategy<Value = Value> {
    prop_oneof![scalar(), array()].prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            btree_map(key(), inner.clone(), 0..4).prop_map(object),
            vec(btree_map(key(), inner.clone(), 1..4).prop_map(object), 1..3)
                .prop_map(Value::Array),
            (inner, scalar(), matrix_2d()).prop_map(|(from, to, trans)| {
                json!({"from": from, "to": to, "trans": trans})
            }),
        ]
    })
}

fn document() -> impl Strategy<Value = Value> {
    btree_map(key(), metadata(), 0..6).prop_map(object)
}

fn matrix() -> impl Strategy<Value = SignalMatrix> {
    (1usize..5, 1usize..30, 1.0f64..1000.0).prop_flat_map(|(channels, samples, rate)| {
        vec(vec(finite(), samples), channels).prop_map(move |rows| {
            let names = (0..channels).map(|c| format!("ch{}", c)).collect();
            SignalMatrix::new(SignalHeader::new(rate, names, "V"), rows).unwrap()
        })
    })
}

fn layout() -> impl Strategy<Value = PhysicalLayout> {
    prop_oneof![Just(PhysicalLayout::Combined), Just(PhysicalLayout::Split)]
}

proptest! {
    /// Metadata without empty or multidimensional arrays survives the section tree,
    /// including coordinate transforms
    #[test]
    fn test_metadata_round_trip(doc in document()) {
        let mut diagnostics = Diagnostics::new();
        let map = classify_map("Info", &doc, &mut diagnostics).unwrap();
        let mut section = Section::new("Info", "File metadata");
        let mut block = Block::new(BLOCK_NAME, BLOCK_TYPE);

        encode(&map, &mut section, &mut block, &mut diagnostics).unwrap();
        let decoded = decode(&section, Some(&block)).unwrap();

        prop_assert!(diagnostics.is_empty());
        prop_assert_eq!(decoded.to_json(), doc);
    }

    /// Multidimensional values are skipped with a diagnostic, whatever their leaves
    #[test]
    fn test_multidimensional_values_are_skipped(doc in document(), nd in mixed_matrix()) {
        let mut input = doc.clone();
        if let Value::Object(object) = &mut input {
            object.insert("nd".to_string(), nd);
        }

        let mut diagnostics = Diagnostics::new();
        let map = classify_map("Info", &input, &mut diagnostics).unwrap();
        let mut section = Section::new("Info", "File metadata");
        let mut block = Block::new(BLOCK_NAME, BLOCK_TYPE);

        encode(&map, &mut section, &mut block, &mut diagnostics).unwrap();
        let decoded = decode(&section, Some(&block)).unwrap();

        prop_assert_eq!(diagnostics.len(), 1);
        prop_assert!(diagnostics.contains_path("Info.nd"));
        prop_assert_eq!(decoded.to_json(), doc);
    }

    /// Either layout reads back the matrix that was written
    #[test]
    fn test_signal_round_trip(m in matrix(), layout in layout()) {
        let mut block = Block::new(BLOCK_NAME, BLOCK_TYPE);
        signal::write(&mut block, &m, layout).unwrap();

        prop_assert_eq!(signal::detect_layout(&block).unwrap(), layout);
        prop_assert_eq!(signal::read(&block).unwrap(), m);
    }

    /// Event samples are exactly those whose time lies in [onset, onset + duration)
    #[test]
    fn test_event_sample_windows(
        windows in vec((0usize..50, 0usize..10), 1..4),
        layout in layout(),
    ) {
        let rate = 10.0;
        let samples = 60;
        let rows = vec![
            (0..samples).map(|s| s as f64).collect(),
            (0..samples).map(|s| -(s as f64)).collect(),
        ];
        let header = SignalHeader::new(rate, vec!["A".into(), "B".into()], "V");
        let m = SignalMatrix::new(header, rows).unwrap();

        let events: EventSet = windows
            .iter()
            .enumerate()
            .map(|(i, &(start, length))| {
                Event::new(start as f64 / rate, length as f64 / rate, format!("E{}", i))
            })
            .collect();

        let mut block = Block::new(BLOCK_NAME, BLOCK_TYPE);
        let handle = signal::write(&mut block, &m, layout).unwrap();
        let tagged = tag(&mut block, &events, layout, &handle).unwrap().unwrap();
        prop_assert_eq!(tagged.events, events.len());
        prop_assert_eq!(read_events(&block).unwrap(), events.clone());

        for (index, event) in events.iter().enumerate() {
            let expected: Vec<f64> = (0..samples)
                .filter(|&s| {
                    let t = s as f64 / rate;
                    t >= event.onset && t < event.onset + event.duration
                })
                .map(|s| s as f64)
                .collect();
            prop_assert_eq!(event_samples(&block, index, "A").unwrap(), expected.clone());

            let negated: Vec<f64> = expected.iter().map(|v| -v).collect();
            prop_assert_eq!(event_samples(&block, index, "B").unwrap(), negated);
        }
    }
}
