use anyhow::Context;
use clap::{Parser, Subcommand, Args, ValueEnum};
use caredash::prelude::*;
use caredash::export::exporter_for;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "caredash")]
#[command(about = "Healthcare Dashboard CLI - Summarize, filter, and aggregate patient billing data", long_about = None)]
struct Cli {
    /// Path to a TOML config file (defaults to the user config, then CAREDASH_* variables)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show headline statistics for the dataset
    Summary(DataArgs),
    /// List control options and billing slider bounds
    Options(DataArgs),
    /// Print every panel for a control state as JSON
    Render(RenderArgs),
    /// Export every panel for a control state to JSON or CSV
    Export(ExportArgs),
}

#[derive(Args)]
struct DataArgs {
    /// Path to the patient records CSV
    #[arg(short, long, env = "CAREDASH_DATA_PATH")]
    data: Option<PathBuf>,
    /// Drop rows with a malformed age or empty category instead of keeping them
    #[arg(long)]
    skip_invalid: bool,
}

#[derive(Args)]
struct ControlArgs {
    /// Gender filter (omit for all)
    #[arg(long)]
    gender: Option<String>,
    /// Medical condition filter for the admission trends panel
    #[arg(long)]
    condition: Option<String>,
    /// Billing ceiling (defaults to the median billing amount)
    #[arg(long)]
    ceiling: Option<f64>,
    /// Admission trend chart type: line or bar
    #[arg(long, default_value = "line")]
    chart_type: String,
}

#[derive(Args)]
struct RenderArgs {
    #[command(flatten)]
    data: DataArgs,
    #[command(flatten)]
    controls: ControlArgs,
    /// Write compact JSON instead of pretty-printed
    #[arg(long)]
    compact: bool,
}

#[derive(Args)]
struct ExportArgs {
    #[command(flatten)]
    data: DataArgs,
    #[command(flatten)]
    controls: ControlArgs,
    /// Output file (JSON) or directory (CSV)
    #[arg(short, long)]
    output: PathBuf,
    /// Export format
    #[arg(long, value_enum, default_value_t = ExportFormatOpt::Json)]
    format: ExportFormatOpt,
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
enum ExportFormatOpt {
    Json,
    Csv,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Summary(args) => cmd_summary(cli.config, args),
        Commands::Options(args) => cmd_options(cli.config, args),
        Commands::Render(args) => cmd_render(cli.config, args),
        Commands::Export(args) => cmd_export(cli.config, args),
    };

    if let Err(e) = result {
        match e.downcast_ref::<DashboardError>() {
            Some(err) => eprintln!("Error: {}", err.user_message()),
            None => eprintln!("Error: {:#}", e),
        }
        std::process::exit(1);
    }
}

fn load_config(path: Option<PathBuf>) -> anyhow::Result<DashboardConfig> {
    match path {
        Some(path) => DashboardConfig::from_file(&path)
            .with_context(|| format!("reading config {}", path.display())),
        None => Ok(DashboardConfig::load()),
    }
}

fn load_dataset(config: Option<PathBuf>, args: &DataArgs) -> anyhow::Result<(Dataset, DashboardConfig)> {
    let mut config = load_config(config)?;
    if let Some(data) = &args.data {
        config.data_path = data.clone();
    }
    if args.skip_invalid {
        config.skip_invalid_records = true;
    }
    let dataset = DatasetBuilder::from_config(config.clone()).build()?;
    Ok((dataset, config))
}

fn controls_for(dataset: &Dataset, args: &ControlArgs) -> ControlState {
    let mut controls = ControlState::initial(dataset)
        .with_gender(args.gender.as_deref())
        .with_condition(args.condition.as_deref())
        .with_chart_type(ChartType::from_value(&args.chart_type));
    if let Some(ceiling) = args.ceiling {
        controls = controls.with_billing_ceiling(ceiling);
    }
    controls
}

fn cmd_summary(config: Option<PathBuf>, args: DataArgs) -> anyhow::Result<()> {
    let (dataset, _) = load_dataset(config, &args)?;
    dataset.summary().print_summary();
    let report = dataset.report();
    if report.missing_billing > 0 || report.missing_age > 0 || report.skipped > 0 {
        println!(
            "Missing billing amounts: {} | Missing ages: {} | Skipped rows: {}",
            report.missing_billing, report.missing_age, report.skipped
        );
    }
    Ok(())
}

fn cmd_options(config: Option<PathBuf>, args: DataArgs) -> anyhow::Result<()> {
    let (dataset, config) = load_dataset(config, &args)?;
    println!("Genders: {}", dataset.gender_options().join(", "));
    println!("Conditions: {}", dataset.condition_options().join(", "));
    match dataset.billing_bounds(config.slider_step) {
        Some(bounds) => {
            println!(
                "Billing slider: {:.2} to {:.2} (default {:.2}, step {})",
                bounds.min, bounds.max, bounds.median, bounds.step
            );
            let marks: Vec<&str> = bounds.marks.iter().map(|m| m.label.as_str()).collect();
            println!("Marks: {}", marks.join("  "));
        }
        None => println!("Billing slider: no billing amounts available"),
    }
    println!("Chart types: {}, {}", ChartType::Line.as_str(), ChartType::Bar.as_str());
    Ok(())
}

fn cmd_render(config: Option<PathBuf>, args: RenderArgs) -> anyhow::Result<()> {
    let (dataset, _) = load_dataset(config, &args.data)?;
    let snapshot = Dashboard::new(&dataset).render(&controls_for(&dataset, &args.controls));
    JsonExporter::new()
        .with_pretty_print(!args.compact)
        .write_to(&snapshot, std::io::stdout().lock())?;
    Ok(())
}

fn cmd_export(config: Option<PathBuf>, args: ExportArgs) -> anyhow::Result<()> {
    let (dataset, _) = load_dataset(config, &args.data)?;
    let snapshot = Dashboard::new(&dataset).render(&controls_for(&dataset, &args.controls));
    let format = match args.format {
        ExportFormatOpt::Json => ExportFormat::Json,
        ExportFormatOpt::Csv => ExportFormat::Csv,
    };
    exporter_for(format).export(&snapshot, &args.output)?;
    println!("Exported {} snapshot to {}", format, args.output.display());
    Ok(())
}
