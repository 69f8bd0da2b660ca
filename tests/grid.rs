use std::collections::HashSet;

use kira_powersim::SimError;
use kira_powersim::grid::{SampleSizeRange, build_grid};

#[test]
fn linear_range_inclusive() {
    let range = SampleSizeRange {
        min: 30,
        max: 90,
        step: 30,
    };
    assert_eq!(range.sequence().unwrap(), vec![30, 60, 90]);

    let uneven = SampleSizeRange {
        min: 30,
        max: 100,
        step: 30,
    };
    assert_eq!(uneven.sequence().unwrap(), vec![30, 60, 90]);

    let single = SampleSizeRange {
        min: 20,
        max: 20,
        step: 5,
    };
    assert_eq!(single.sequence().unwrap(), vec![20]);
}

#[test]
fn bad_ranges_rejected() {
    for range in [
        SampleSizeRange {
            min: 0,
            max: 10,
            step: 5,
        },
        SampleSizeRange {
            min: 10,
            max: 20,
            step: 0,
        },
        SampleSizeRange {
            min: 30,
            max: 20,
            step: 5,
        },
    ] {
        let err = range.sequence().unwrap_err();
        assert!(matches!(err, SimError::InvalidParameter { .. }), "{:?}", range);
    }
}

#[test]
fn grid_is_cartesian_product() {
    let grid = build_grid(&[30, 60, 90], 4).unwrap();
    assert_eq!(grid.len(), 12);
    for (i, unit) in grid.iter().enumerate() {
        assert_eq!(unit.index, i);
        assert_eq!(unit.sample_size, [30, 60, 90][i / 4]);
        assert_eq!(unit.replication, i % 4 + 1);
    }
}

#[test]
fn grid_is_deterministic() {
    assert_eq!(build_grid(&[10, 20], 3).unwrap(), build_grid(&[10, 20], 3).unwrap());
}

#[test]
fn unit_streams_are_distinct() {
    let grid = build_grid(&[10, 20, 30], 50).unwrap();
    let streams: HashSet<u64> = grid.iter().map(|u| u.stream()).collect();
    assert_eq!(streams.len(), grid.len());
}

#[test]
fn invalid_grids_rejected() {
    assert!(matches!(
        build_grid(&[], 10).unwrap_err(),
        SimError::InvalidParameter { .. }
    ));
    assert!(matches!(
        build_grid(&[10, 0], 10).unwrap_err(),
        SimError::InvalidParameter { .. }
    ));
    assert!(matches!(
        build_grid(&[10, 20], 0).unwrap_err(),
        SimError::InvalidParameter { .. }
    ));
    assert!(matches!(
        build_grid(&[10, 20, 10], 5).unwrap_err(),
        SimError::InvalidParameter { .. }
    ));
}
