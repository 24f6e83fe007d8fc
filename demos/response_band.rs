use tributary::{ResponseCurve, ThresholdBand};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let curve = ResponseCurve::new(0.6)?;
    let analysis = curve.analyse(&ThresholdBand::default())?;

    println!("upper crossings: {:?}", analysis.upper_crossings);
    println!("lower crossings: {:?}", analysis.lower_crossings);
    for (low, high) in &analysis.band_intervals {
        println!("in band for f/fn in [{low:.4}, {high:.4}]");
    }

    Ok(())
}
