#![warn(clippy::pedantic)]

use approx::assert_relative_eq;
use geo::{Area, BooleanOps};
use tributary::{
    point, Distribution, DistributionError, FloorBoundary, FloorConfig, FloorPlan, Point,
};

fn square_plan(columns: &[(&str, Point)]) -> FloorPlan {
    let boundary =
        FloorBoundary::rectangle(point(0.0, 0.0), point(10.0, 10.0)).expect("square accepted");
    plan_on(boundary, columns)
}

fn plan_on(boundary: FloorBoundary, columns: &[(&str, Point)]) -> FloorPlan {
    let mut plan = FloorPlan::new(boundary);
    for (label, position) in columns {
        plan.add_column(*label, *position)
            .expect("column placement succeeds");
    }
    plan
}

fn assert_cells_do_not_overlap(distribution: &Distribution) {
    let allocations = &distribution.allocations;
    for (i, first) in allocations.iter().enumerate() {
        for second in &allocations[i + 1..] {
            let shared = first.cell.region.intersection(&second.cell.region);
            assert!(
                shared.unsigned_area() < 1.0e-6,
                "cells {} and {} overlap",
                first.label,
                second.label
            );
        }
    }
}

#[test]
fn two_columns_split_the_square_down_the_middle() {
    let plan = square_plan(&[("A", point(2.0, 5.0)), ("B", point(8.0, 5.0))]);
    let distribution = plan.distribute(100.0).expect("distribution succeeds");

    for allocation in &distribution.allocations {
        assert_relative_eq!(allocation.area(), 50.0, epsilon = 1.0e-9);
        assert_relative_eq!(allocation.force, 50.0, epsilon = 1.0e-9);
    }
    // Every vertex of A's cell lies on the left half, every vertex of B's on the right.
    let left = &distribution.allocations[0].cell.rings()[0];
    assert!(left.iter().all(|vertex| vertex.x <= 5.0 + 1.0e-9));
    let right = &distribution.allocations[1].cell.rings()[0];
    assert!(right.iter().all(|vertex| vertex.x >= 5.0 - 1.0e-9));
}

#[test]
fn single_column_carries_the_whole_floor() {
    let plan = square_plan(&[("only", point(3.0, 7.0))]);
    let distribution = plan.distribute(250.0).expect("distribution succeeds");
    let only = &distribution.allocations[0];
    assert_relative_eq!(only.area(), 100.0, epsilon = 1.0e-9);
    assert_relative_eq!(only.force, 250.0, epsilon = 1.0e-9);
}

#[test]
fn triangular_arrangement_gives_three_disjoint_cells() {
    let columns: Vec<(String, Point)> = [90.0_f64, 210.0, 330.0]
        .iter()
        .enumerate()
        .map(|(i, angle)| {
            let radians = angle.to_radians();
            (
                format!("C{i}"),
                point(5.0 + 3.0 * radians.cos(), 5.0 + 3.0 * radians.sin()),
            )
        })
        .collect();
    let named: Vec<(&str, Point)> = columns
        .iter()
        .map(|(label, position)| (label.as_str(), *position))
        .collect();
    let distribution = square_plan(&named)
        .distribute(90.0)
        .expect("distribution succeeds");

    assert_eq!(distribution.allocations.len(), 3);
    assert!(distribution
        .allocations
        .iter()
        .all(|allocation| !allocation.cell.is_degenerate()));
    assert_relative_eq!(distribution.total_area, 100.0, epsilon = 1.0e-9);
    assert_relative_eq!(distribution.force_sum(), 90.0, epsilon = 1.0e-9);
    assert_cells_do_not_overlap(&distribution);
}

#[test]
fn duplicate_positions_get_nothing_and_do_not_panic() {
    let plan = square_plan(&[
        ("A", point(4.0, 4.0)),
        ("A'", point(4.0, 4.0)),
        ("B", point(6.0, 6.0)),
    ]);
    let distribution = plan.distribute(100.0).expect("distribution succeeds");
    for label in ["A", "A'"] {
        let allocation = distribution.allocation(label).expect("column reported");
        assert_relative_eq!(allocation.area(), 0.0);
        assert_relative_eq!(allocation.force, 0.0);
    }
    assert_relative_eq!(
        distribution.allocation("B").expect("B reported").force,
        100.0,
        epsilon = 1.0e-9
    );
}

#[test]
fn fully_coincident_columns_have_no_valid_partition() {
    let plan = square_plan(&[("A", point(5.0, 5.0)), ("B", point(5.0, 5.0))]);
    let error = plan.distribute(100.0).expect_err("no column owns the floor");
    assert_eq!(error, DistributionError::NoValidPartition);
    assert_eq!(
        error.to_string(),
        "no valid partition: no valid allocation possible"
    );
}

#[test]
fn l_shaped_floor_is_covered_completely() {
    let boundary = FloorBoundary::new(vec![
        point(0.0, 0.0),
        point(10.0, 0.0),
        point(10.0, 4.0),
        point(4.0, 4.0),
        point(4.0, 10.0),
        point(0.0, 10.0),
    ])
    .expect("L-shape accepted");
    let plan = plan_on(
        boundary,
        &[
            ("corner", point(2.0, 2.0)),
            ("east", point(8.0, 2.0)),
            ("north", point(2.0, 8.0)),
        ],
    );
    let distribution = plan.distribute(64.0).expect("distribution succeeds");
    assert_relative_eq!(distribution.total_area, 64.0, epsilon = 1.0e-6);
    assert_relative_eq!(distribution.force_sum(), 64.0, epsilon = 1.0e-6);
    // The wings are mirror images about the diagonal.
    assert_relative_eq!(
        distribution.allocation("east").expect("east").area(),
        distribution.allocation("north").expect("north").area(),
        epsilon = 1.0e-6
    );
    assert_cells_do_not_overlap(&distribution);
}

#[test]
fn columns_hugging_the_corners_still_cover_the_floor() {
    let plan = square_plan(&[
        ("south-west", point(1.0e-3, 1.0e-3)),
        ("north-east", point(10.0 - 1.0e-3, 10.0 - 1.0e-3)),
        ("edge", point(10.0, 2.0)),
    ]);
    let distribution = plan.distribute(30.0).expect("distribution succeeds");
    assert_relative_eq!(distribution.total_area, 100.0, epsilon = 1.0e-6);
    assert!(distribution.unassigned_area < 1.0e-6);
    assert_cells_do_not_overlap(&distribution);
}

#[test]
fn sample_slab_distributes_the_full_load() {
    let config = FloorConfig::sample_slab();
    let plan = config.build_plan().expect("sample slab is valid");
    let distribution = plan
        .distribute(config.total_force)
        .expect("distribution succeeds");
    assert_eq!(distribution.allocations.len(), 14);
    assert_relative_eq!(distribution.force_sum(), 300.0, epsilon = 1.0e-6);
    assert_relative_eq!(distribution.total_area, 18.69 * 11.51, epsilon = 1.0e-6);
    assert!(distribution
        .allocations
        .iter()
        .all(|allocation| allocation.area() > 0.0));
    assert_cells_do_not_overlap(&distribution);
    // The 10 % padding points sit 2.2 m from the (0, 0) corner, nearer than column A at
    // 3.1 m, so exactly one widening is needed and then nothing is left over.
    assert_relative_eq!(distribution.padding_ratio, 0.2);
    assert!(distribution.unassigned_area < 1.0e-9);
}

#[test]
fn slender_strip_splits_evenly_between_its_columns() {
    let boundary = FloorBoundary::rectangle(point(0.0, 0.0), point(1000.0, 0.01))
        .expect("strip accepted");
    let labels: Vec<String> = (0..10).map(|i| format!("S{i}")).collect();
    let columns: Vec<(&str, Point)> = labels
        .iter()
        .zip(0..10)
        .map(|(label, i)| (label.as_str(), point(50.0 + 100.0 * f64::from(i), 0.005)))
        .collect();
    let distribution = plan_on(boundary, &columns)
        .distribute(100.0)
        .expect("distribution succeeds");
    for allocation in &distribution.allocations {
        assert_relative_eq!(allocation.area(), 1.0, epsilon = 1.0e-9);
        assert_relative_eq!(allocation.force, 10.0, epsilon = 1.0e-6);
    }
    assert_relative_eq!(distribution.total_area, 10.0, epsilon = 1.0e-9);
}
