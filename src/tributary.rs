//! Core data structures for tributary-area load distribution.

use log::warn;
use serde::Serialize;

use crate::errors::{DistributionError, LayoutError};
use crate::geometry::{FloorBoundary, Point};
use crate::partition::{partition, Cell, PartitionSettings};

/// A labelled column position on the floor.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Column {
    /// Unique label of the column.
    pub label: String,
    /// Position of the column in metres.
    pub position: Point,
}

/// Force share assigned to one column.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LoadAllocation {
    /// Label of the column.
    pub label: String,
    /// Position of the column in metres.
    pub position: Point,
    /// Tributary cell of the column.
    #[serde(flatten)]
    pub cell: Cell,
    /// Force carried by the column, in the units of the total force.
    pub force: f64,
}

impl LoadAllocation {
    /// Tributary area in square metres.
    #[must_use]
    pub fn area(&self) -> f64 {
        self.cell.area
    }
}

/// Result of distributing a force over a [`FloorPlan`].
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Distribution {
    /// One allocation per column, in the order the columns were added.
    pub allocations: Vec<LoadAllocation>,
    /// Force that was distributed.
    pub total_force: f64,
    /// Sum of the tributary areas in square metres.
    pub total_area: f64,
    /// Floor area owned by no column in square metres.
    pub unassigned_area: f64,
    /// Padding ratio used for the final partition.
    pub padding_ratio: f64,
    /// Floor outline the cells were clipped to.
    pub boundary: FloorBoundary,
}

impl Distribution {
    /// Look up the allocation of a column by label.
    #[must_use]
    pub fn allocation(&self, label: &str) -> Option<&LoadAllocation> {
        self.allocations
            .iter()
            .find(|allocation| allocation.label == label)
    }

    /// Area enclosed by the floor outline in square metres.
    #[must_use]
    pub fn boundary_area(&self) -> f64 {
        self.boundary.area()
    }

    /// Sum of the allocated forces.
    #[must_use]
    pub fn force_sum(&self) -> f64 {
        self.allocations.iter().map(|allocation| allocation.force).sum()
    }
}

/// Columns laid out on a floor slab.
#[derive(Clone, Debug)]
pub struct FloorPlan {
    /// Outline of the slab.
    boundary: FloorBoundary,
    /// Columns in insertion order.
    columns: Vec<Column>,
    /// Auxiliary point placement for the partition.
    settings: PartitionSettings,
}

impl FloorPlan {
    /// Create a plan with no columns.
    ///
    /// # Examples
    /// ```
    /// use tributary::{point, FloorBoundary, FloorPlan};
    ///
    /// let boundary = FloorBoundary::rectangle(point(0.0, 0.0), point(6.0, 6.0)).unwrap();
    /// let plan = FloorPlan::new(boundary);
    /// assert_eq!(plan.column_count(), 0);
    /// ```
    #[must_use]
    pub fn new(boundary: FloorBoundary) -> Self {
        Self {
            boundary,
            columns: Vec::new(),
            settings: PartitionSettings::default(),
        }
    }

    /// Replace the partition settings.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::InvalidPadding`] when the padding ratio is unusable.
    pub fn with_settings(mut self, settings: PartitionSettings) -> Result<Self, LayoutError> {
        settings.validate()?;
        self.settings = settings;
        Ok(self)
    }

    /// Outline of the slab.
    #[must_use]
    pub fn boundary(&self) -> &FloorBoundary {
        &self.boundary
    }

    /// Columns in insertion order.
    #[must_use]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Return the number of columns.
    #[must_use]
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Current partition settings.
    #[must_use]
    pub fn settings(&self) -> &PartitionSettings {
        &self.settings
    }

    /// Add a column to the plan.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::DuplicateLabel`] when `label` is already used and
    /// [`LayoutError::NonFiniteColumn`] when `position` is not finite.
    pub fn add_column(
        &mut self,
        label: impl Into<String>,
        position: Point,
    ) -> Result<(), LayoutError> {
        let label = label.into();
        if self.columns.iter().any(|column| column.label == label) {
            return Err(LayoutError::DuplicateLabel(label));
        }
        if !position.is_finite() {
            return Err(LayoutError::NonFiniteColumn(label));
        }
        self.columns.push(Column { label, position });
        Ok(())
    }

    /// Split `total_force` among the columns in proportion to their tributary areas.
    ///
    /// Columns whose cell is empty (coincident positions, or no overlap with the floor)
    /// receive zero force.
    ///
    /// # Errors
    ///
    /// Returns [`DistributionError::InvalidForce`] when `total_force` is not positive and
    /// finite, and [`DistributionError::NoValidPartition`] when no column owns any part
    /// of the floor.
    ///
    /// # Examples
    /// ```
    /// use tributary::{point, FloorBoundary, FloorPlan};
    ///
    /// let boundary = FloorBoundary::rectangle(point(0.0, 0.0), point(10.0, 10.0)).unwrap();
    /// let mut plan = FloorPlan::new(boundary);
    /// plan.add_column("A", point(2.0, 5.0)).unwrap();
    /// plan.add_column("B", point(8.0, 5.0)).unwrap();
    ///
    /// let distribution = plan.distribute(100.0).unwrap();
    /// assert!((distribution.allocations[0].force - 50.0).abs() < 1.0e-6);
    /// assert!((distribution.allocations[1].area() - 50.0).abs() < 1.0e-6);
    /// ```
    pub fn distribute(&self, total_force: f64) -> Result<Distribution, DistributionError> {
        if !(total_force.is_finite() && total_force > 0.0) {
            return Err(DistributionError::InvalidForce(total_force));
        }
        let sites: Vec<Point> = self.columns.iter().map(|column| column.position).collect();
        let partition = partition(&sites, &self.boundary, &self.settings)?;

        let total_area: f64 = partition.cells.iter().map(|cell| cell.area).sum();
        if total_area <= 0.0 {
            return Err(DistributionError::NoValidPartition);
        }

        let allocations = self
            .columns
            .iter()
            .zip(partition.cells)
            .map(|(column, cell)| {
                if cell.is_degenerate() {
                    warn!("column {} has no tributary area", column.label);
                }
                LoadAllocation {
                    label: column.label.clone(),
                    position: column.position,
                    force: total_force * cell.area / total_area,
                    cell,
                }
            })
            .collect();

        Ok(Distribution {
            allocations,
            total_force,
            total_area,
            unassigned_area: partition.unassigned_area,
            padding_ratio: partition.padding_ratio,
            boundary: self.boundary.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::geometry::point;

    fn plan_with(columns: &[(&str, Point)]) -> FloorPlan {
        let boundary =
            FloorBoundary::rectangle(point(0.0, 0.0), point(10.0, 10.0)).expect("square accepted");
        let mut plan = FloorPlan::new(boundary);
        for (label, position) in columns {
            plan.add_column(*label, *position).expect("column accepted");
        }
        plan
    }

    #[test]
    fn column_mutators_reject_invalid_input() {
        let mut plan = plan_with(&[("A", point(1.0, 1.0))]);
        assert_eq!(
            plan.add_column("A", point(2.0, 2.0)),
            Err(LayoutError::DuplicateLabel("A".to_owned()))
        );
        assert_eq!(
            plan.add_column("B", point(f64::INFINITY, 2.0)),
            Err(LayoutError::NonFiniteColumn("B".to_owned()))
        );
        assert_eq!(plan.column_count(), 1);
    }

    #[test]
    fn invalid_force_is_rejected_before_partitioning() {
        let plan = plan_with(&[("A", point(5.0, 5.0))]);
        for force in [0.0, -10.0, f64::NAN] {
            let error = plan.distribute(force).expect_err("force rejected");
            assert!(matches!(error, DistributionError::InvalidForce(_)));
        }
    }

    #[test]
    fn empty_plan_has_no_valid_partition() {
        let plan = plan_with(&[]);
        assert_eq!(
            plan.distribute(100.0),
            Err(DistributionError::NoValidPartition)
        );
    }

    #[test]
    fn coincident_columns_have_no_valid_partition() {
        let plan = plan_with(&[("A", point(5.0, 5.0)), ("B", point(5.0, 5.0))]);
        assert_eq!(
            plan.distribute(100.0),
            Err(DistributionError::NoValidPartition)
        );
    }

    #[test]
    fn column_outside_the_floor_carries_nothing() {
        let plan = plan_with(&[("inside", point(5.0, 5.0)), ("far", point(40.0, 5.0))]);
        let distribution = plan.distribute(300.0).expect("distribution succeeds");
        let far = distribution.allocation("far").expect("far column reported");
        assert_relative_eq!(far.force, 0.0);
        assert!(far.cell.is_degenerate());
        assert_relative_eq!(
            distribution.allocation("inside").expect("inside column").force,
            300.0,
            epsilon = 1.0e-9
        );
    }

    #[test]
    fn allocations_follow_insertion_order() {
        let plan = plan_with(&[
            ("Z", point(8.0, 8.0)),
            ("A", point(2.0, 2.0)),
            ("M", point(5.0, 5.0)),
        ]);
        let distribution = plan.distribute(90.0).expect("distribution succeeds");
        let labels: Vec<&str> = distribution
            .allocations
            .iter()
            .map(|allocation| allocation.label.as_str())
            .collect();
        assert_eq!(labels, ["Z", "A", "M"]);
        assert_relative_eq!(distribution.force_sum(), 90.0, epsilon = 1.0e-9);
        assert_relative_eq!(
            distribution.total_area,
            distribution.boundary_area(),
            epsilon = 1.0e-9
        );
    }

    #[test]
    fn distribution_serializes_cells_as_rings() {
        let plan = plan_with(&[("A", point(2.0, 5.0)), ("B", point(8.0, 5.0))]);
        let distribution = plan.distribute(100.0).expect("distribution succeeds");
        let json = serde_json::to_value(&distribution).expect("serializable");
        let first = &json["allocations"][0];
        assert_eq!(first["label"], "A");
        assert!(first["region"][0].as_array().expect("ring").len() >= 4);
        assert!((first["area"].as_f64().expect("area") - 50.0).abs() < 1.0e-6);
        assert_eq!(json["boundary"]["vertices"].as_array().expect("vertices").len(), 4);
    }
}
