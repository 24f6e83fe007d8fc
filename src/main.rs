mod analysis;
mod conditions;
mod report;

use analysis::{run_distribution, run_rays, run_response};
use clap::{Parser, Subcommand};
use conditions::{load_floor_conditions, response_conditions, ResponseOverrides};
use log::info;
use report::{render_distribution, render_response, render_rays};
use std::error::Error;
use std::path::PathBuf;
use tributary::render::{ray_svg, response_svg, tributary_svg, PlotWindow};

/// Tributary-area load distribution and companion floor studies.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Split the floor force among the columns by tributary area.
    Distribute {
        /// Floor configuration (JSON); the built-in sample slab when omitted.
        #[arg(long)]
        config: Option<PathBuf>,
        /// Write the tributary drawing to this SVG file.
        #[arg(long)]
        svg: Option<PathBuf>,
        /// Print the distribution as JSON instead of a table.
        #[arg(long)]
        json: bool,
    },
    /// Find where the deformation response factor leaves the acceptable band.
    Response {
        /// Response configuration (JSON); defaults when omitted.
        #[arg(long)]
        config: Option<PathBuf>,
        /// Damping ratio.
        #[arg(long)]
        damping: Option<f64>,
        /// Upper threshold.
        #[arg(long)]
        upper: Option<f64>,
        /// Lower threshold.
        #[arg(long)]
        lower: Option<f64>,
        /// Write the full response plot to this SVG file.
        #[arg(long)]
        svg: Option<PathBuf>,
        /// Write the close-up of the flat region to this SVG file.
        #[arg(long)]
        zoom_svg: Option<PathBuf>,
    },
    /// Cast diagonal rays from every column and draw bisectors where they meet.
    Rays {
        /// Floor configuration (JSON); the built-in sample slab when omitted.
        #[arg(long)]
        config: Option<PathBuf>,
        /// Write the ray drawing to this SVG file.
        #[arg(long)]
        svg: Option<PathBuf>,
    },
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Distribute { config, svg, json } => {
            let conditions = load_floor_conditions(config.as_deref())?;
            info!(
                "distributing {} {} over {} columns",
                conditions.total_force,
                conditions.force_unit,
                conditions.plan.column_count()
            );
            let summary = run_distribution(&conditions)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&summary.distribution)?);
            } else {
                println!("{}", render_distribution(&summary));
            }
            if let Some(path) = svg {
                tributary_svg(&summary.distribution, &summary.force_unit).save(path)?;
            }
        }
        Command::Response {
            config,
            damping,
            upper,
            lower,
            svg,
            zoom_svg,
        } => {
            let overrides = ResponseOverrides {
                damping,
                upper,
                lower,
            };
            let config = response_conditions(config.as_deref(), overrides)?;
            let summary = run_response(&config)?;
            println!("{}", render_response(&summary));
            if let Some(path) = svg {
                let window = PlotWindow::full(&summary.curve);
                response_svg(&summary.curve, &summary.analysis, &window).save(path)?;
            }
            if let Some(path) = zoom_svg {
                let window = PlotWindow::zoomed();
                response_svg(&summary.curve, &summary.analysis, &window).save(path)?;
            }
        }
        Command::Rays { config, svg } => {
            let conditions = load_floor_conditions(config.as_deref())?;
            let diagram = run_rays(&conditions)?;
            println!("{}", render_rays(&diagram));
            if let Some(path) = svg {
                let plan = &conditions.plan;
                ray_svg(plan.boundary(), plan.columns(), &diagram).save(path)?;
            }
        }
    }

    Ok(())
}
