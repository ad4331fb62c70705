use super::*;
use crate::store::{Block, Dimension, Ticks};

fn header(names: &[&str]) -> SignalHeader {
    SignalHeader::new(10.0, names.iter().map(|s| s.to_string()).collect(), "V")
}

fn ramp(channels: usize, samples: usize) -> Vec<Vec<f64>> {
    (0..channels)
        .map(|c| (0..samples).map(|s| (c * 1000 + s) as f64).collect())
        .collect()
}

fn new_block() -> Block {
    Block::new(BLOCK_NAME, BLOCK_TYPE)
}

// ==================== Axis Tests ====================

#[test]
fn test_locate_axes() {
    assert_eq!(locate_axes([3, 100], 3, 100).unwrap(), AxisOrder::ChannelsFirst);
    assert_eq!(locate_axes([100, 3], 3, 100).unwrap(), AxisOrder::SamplesFirst);
    assert_eq!(locate_axes([1, 1], 1, 1).unwrap(), AxisOrder::ChannelsFirst);
    assert_eq!(locate_axes([4, 4], 4, 4).unwrap(), AxisOrder::ChannelsFirst);
    assert!(matches!(
        locate_axes([3, 99], 3, 100),
        Err(LayoutError::ShapeMismatch { .. })
    ));
}

#[test]
fn test_normalize_transposed_buffer() {
    // (samples, channels) = (3, 2)
    let buffer = SampleBuffer::new([3, 2], vec![1.0, 10.0, 2.0, 20.0, 3.0, 30.0]).unwrap();
    let (matrix, order) = normalize(header(&["A", "B"]), &buffer, 3).unwrap();

    assert_eq!(order, AxisOrder::SamplesFirst);
    assert_eq!(matrix.channel(0).unwrap(), &[1.0, 2.0, 3.0]);
    assert_eq!(matrix.channel_by_name("B").unwrap(), &[10.0, 20.0, 30.0]);
}

#[test]
fn test_header_validation() {
    assert!(header(&["A", "A"]).validate().is_err());
    assert!(header(&[]).validate().is_err());
    assert!(SignalHeader::new(0.0, vec!["A".into()], "V").validate().is_err());
    assert!(header(&["A", "B"]).validate().is_ok());
}

#[test]
fn test_matrix_rejects_ragged_rows() {
    let result = SignalMatrix::new(header(&["A", "B"]), vec![vec![1.0, 2.0], vec![3.0]]);
    assert!(result.is_err());
}

// ==================== Combined Layout Tests ====================

#[test]
fn test_combined_layout_dimensions() {
    let matrix = SignalMatrix::new(header(&["A", "B", "C"]), ramp(3, 100)).unwrap();
    let mut block = new_block();
    let handle = write(&mut block, &matrix, PhysicalLayout::Combined).unwrap();

    assert_eq!(handle.arrays.len(), 1);
    assert_eq!(handle.channel_axis, Some(0));
    let array = block.data_array(handle.arrays[0]).unwrap();
    assert_eq!(array.name, COMBINED_ARRAY_NAME);
    assert_eq!(array.shape, vec![3, 100]);
    assert_eq!(array.unit.as_deref(), Some("V"));
    assert_eq!(array.dimensions[0].labels().unwrap(), &["A", "B", "C"]);

    let Dimension::Range { ticks, unit, .. } = &array.dimensions[1] else {
        panic!("expected range dimension");
    };
    assert_eq!(unit.as_deref(), Some("s"));
    assert_eq!(ticks.len(), 100);
    let values = ticks.values();
    assert!((values[1] - values[0] - 0.1).abs() < 1e-12);
    assert!((values[99] - 9.9).abs() < 1e-12);
}

#[test]
fn test_combined_keeps_transposed_orientation() {
    let buffer = SampleBuffer::new([4, 2], (0..8).map(f64::from).collect()).unwrap();
    let mut block = new_block();
    let handle = write_buffer(
        &mut block,
        header(&["A", "B"]),
        &buffer,
        4,
        PhysicalLayout::Combined,
    )
    .unwrap();

    assert_eq!(handle.channel_axis, Some(1));
    let array = block.data_array(handle.arrays[0]).unwrap();
    assert_eq!(array.shape, vec![4, 2]);
    assert_eq!(array.data(), buffer.values.as_slice());
    assert!(array.dimensions[1].is_set());

    let matrix = read(&block).unwrap();
    assert_eq!(matrix.channel(0).unwrap(), &[0.0, 2.0, 4.0, 6.0]);
    assert_eq!(matrix.channel(1).unwrap(), &[1.0, 3.0, 5.0, 7.0]);
}

#[test]
fn test_combined_round_trip() {
    let matrix = SignalMatrix::new(header(&["Fp1", "Fp2", "Cz"]), ramp(3, 50)).unwrap();
    let mut block = new_block();
    write(&mut block, &matrix, PhysicalLayout::Combined).unwrap();

    assert_eq!(detect_layout(&block).unwrap(), PhysicalLayout::Combined);
    assert_eq!(read(&block).unwrap(), matrix);
}

// ==================== Split Layout Tests ====================

#[test]
fn test_split_layout_one_array_per_channel() {
    let matrix = SignalMatrix::new(header(&["O2", "Cz", "Fp1"]), ramp(3, 20)).unwrap();
    let mut block = new_block();
    let handle = write(&mut block, &matrix, PhysicalLayout::Split).unwrap();

    assert_eq!(handle.arrays.len(), 3);
    assert_eq!(handle.channel_axis, None);
    let names: Vec<&str> = block
        .group_data_arrays(handle.group)
        .unwrap()
        .iter()
        .map(|a| a.name.as_str())
        .collect();
    assert_eq!(names, vec!["O2", "Cz", "Fp1"]);

    for array in block.group_data_arrays(handle.group).unwrap() {
        assert_eq!(array.shape, vec![20]);
        assert_eq!(array.dimensions.len(), 1);
        assert!(array.dimensions[0].ticks().is_some());
    }
}

#[test]
fn test_split_round_trip_matches_combined() {
    let matrix = SignalMatrix::new(header(&["A", "B", "C"]), ramp(3, 30)).unwrap();

    let mut split = new_block();
    write(&mut split, &matrix, PhysicalLayout::Split).unwrap();
    let mut combined = new_block();
    write(&mut combined, &matrix, PhysicalLayout::Combined).unwrap();

    assert_eq!(detect_layout(&split).unwrap(), PhysicalLayout::Split);
    assert_eq!(read(&split).unwrap(), read(&combined).unwrap());
}

#[test]
fn test_single_channel_split_is_detected() {
    let matrix = SignalMatrix::new(header(&["A"]), ramp(1, 5)).unwrap();
    let mut block = new_block();
    write(&mut block, &matrix, PhysicalLayout::Split).unwrap();

    assert_eq!(detect_layout(&block).unwrap(), PhysicalLayout::Split);
    assert_eq!(read(&block).unwrap(), matrix);
}

// ==================== Corrupt Layout Tests ====================

#[test]
fn test_read_without_group_is_corrupt() {
    let block = new_block();
    assert!(matches!(read(&block), Err(LayoutError::Corrupt(_))));
}

#[test]
fn test_read_split_member_without_range_is_corrupt() {
    let mut block = new_block();
    let group = block.create_group(GROUP_NAME, GROUP_TYPE).unwrap();
    let id = block
        .create_data_array("A", RAW_DATA_TYPE, vec![3], vec![0.0; 3])
        .unwrap()
        .id;
    block.add_group_data_array(group, id).unwrap();

    assert!(matches!(read(&block), Err(LayoutError::Corrupt(_))));
}

#[test]
fn test_read_split_length_mismatch_is_corrupt() {
    let mut block = new_block();
    let group = block.create_group(GROUP_NAME, GROUP_TYPE).unwrap();
    for (name, len) in [("A", 3), ("B", 4)] {
        let array = block
            .create_data_array(name, RAW_DATA_TYPE, vec![len], vec![0.0; len])
            .unwrap();
        array
            .append_range_dimension(Ticks::uniform(10.0, len), TIME_LABEL, TIME_UNIT)
            .unwrap();
        let id = array.id;
        block.add_group_data_array(group, id).unwrap();
    }

    assert!(matches!(read(&block), Err(LayoutError::Corrupt(_))));
}
