use tributary::{point, FloorBoundary, FloorPlan};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let boundary = FloorBoundary::rectangle(point(0.0, 0.0), point(10.0, 10.0))?;
    let mut plan = FloorPlan::new(boundary);
    plan.add_column("A", point(2.0, 5.0))?;
    plan.add_column("B", point(8.0, 5.0))?;

    let distribution = plan.distribute(100.0)?;

    for allocation in &distribution.allocations {
        println!(
            "{}: area = {:.2} m², force = {:.1} kN",
            allocation.label,
            allocation.area(),
            allocation.force
        );
    }

    Ok(())
}
