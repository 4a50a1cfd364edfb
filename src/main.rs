use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use rebar_optimizer::project::Project;
use rebar_optimizer::render;
use rebar_optimizer::types::{OptimizationResult, SourceType};

#[derive(Parser)]
#[command(
    name = "rebar_optimizer",
    about = "Rebar splice planning and cutting-stock optimization"
)]
struct Cli {
    /// Project file (JSON)
    #[arg(long)]
    project: std::path::PathBuf,

    /// Seed for the Monte Carlo shuffles; omit for a random seed
    #[arg(long)]
    seed: Option<u64>,

    /// Show an ASCII layout of each cutting pattern
    #[arg(long)]
    layout: bool,

    /// Emit the raw result as JSON instead of report tables
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = Cli::parse();
    let text = std::fs::read_to_string(&cli.project)
        .with_context(|| format!("reading {}", cli.project.display()))?;
    let project = Project::from_json(&text)
        .with_context(|| format!("parsing {}", cli.project.display()))?;

    let solver = project.solver()?;
    let result = match cli.seed {
        Some(seed) => solver.solve_seeded(seed),
        None => solver.solve(),
    }?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    print_report(&project, &result, cli.layout);
    Ok(())
}

fn print_report(project: &Project, result: &OptimizationResult, layout: bool) {
    println!("Project: {}", project.project_name);
    println!();

    for warning in &result.warnings {
        println!("{warning}");
    }
    if !result.warnings.is_empty() {
        println!();
    }

    if !result.splice_plan.is_empty() {
        println!("Install schedule:");
        for item in &result.splice_plan {
            println!("  {} ({}):", item.bar_mark, item.run_id);
            for (i, piece) in item.pieces.iter().enumerate() {
                println!(
                    "    #{} {} mm @ [{}, {})",
                    i + 1,
                    piece.length_mm,
                    piece.start_mm,
                    piece.end_mm
                );
            }
        }
        println!();
    }

    println!("Cutting plan:");
    for item in &result.cutting_plan {
        let source = match item.source {
            SourceType::NewStock => "new",
            SourceType::ExistingInventory => "yard",
        };
        let pattern = item
            .cuts
            .iter()
            .map(|c| c.to_string())
            .collect::<Vec<_>>()
            .join(" + ");
        let residual = if item.offcut_mm > 0 {
            format!("offcut {} mm", item.offcut_mm)
        } else {
            format!("waste {} mm", item.waste_mm)
        };
        println!(
            "  dia {:>2} | {:>4} | {:>5} mm x{:<3} | {} | {}",
            item.dia, source, item.stock_length_mm, item.count, pattern, residual
        );
        if layout {
            print!("         {}", render::render_pattern(item, project.settings.kerf_mm));
        }
    }
    println!();

    if !result.procurement.is_empty() {
        println!("Procurement:");
        for item in &result.procurement {
            println!(
                "  dia {:>2} | {:>5} mm x{:<3} | total {:.1} m",
                item.dia,
                item.stock_length_mm,
                item.quantity,
                item.total_length_mm as f64 / 1000.0
            );
        }
        println!();
    }

    let s = &result.summary;
    println!(
        "Summary: {:.3} t steel, {:.1} m waste ({:.2}%), {} new bar{}, {} from yard",
        s.total_weight_kg / 1000.0,
        s.total_waste_mm as f64 / 1000.0,
        s.waste_percent,
        s.new_bar_count,
        if s.new_bar_count == 1 { "" } else { "s" },
        s.inventory_bar_count,
    );
}
