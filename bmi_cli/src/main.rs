mod chart;

use bmi_core::export::series_to_json;
use bmi_core::*;
use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "bmi")]
#[command(about = "Body mass index calculator and history tracker", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Calculate BMI, record it and show the person's history
    Calc {
        /// Person name
        #[arg(long)]
        name: String,

        /// Weight in kilograms
        #[arg(long, allow_hyphen_values = true)]
        weight: String,

        /// Height in metres
        #[arg(long, allow_hyphen_values = true)]
        height: String,

        /// Also export the summary report
        #[arg(long)]
        report: bool,
    },

    /// Show a person's recorded BMI history
    History {
        /// Person name (exact, case-sensitive)
        name: String,

        /// Print the series as JSON
        #[arg(long)]
        json: bool,

        /// Write all of the person's records to a CSV file
        #[arg(long)]
        csv: Option<PathBuf>,
    },

    /// Export the summary report without recording a measurement
    Report {
        /// Person name
        #[arg(long)]
        name: String,

        /// Weight in kilograms
        #[arg(long, allow_hyphen_values = true)]
        weight: String,

        /// Height in metres
        #[arg(long, allow_hyphen_values = true)]
        height: String,
    },
}

/// Resolved locations for one run
struct Paths {
    database: PathBuf,
    reports: PathBuf,
}

fn main() -> ExitCode {
    // Initialize logging
    bmi_core::logging::init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!("Command failed: {:?}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    // Determine data directory
    let config = Config::load()?;
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());
    let paths = Paths {
        database: config.database_path(&data_dir),
        reports: config.reports_dir(&data_dir),
    };

    match cli.command {
        Some(Commands::Calc {
            name,
            weight,
            height,
            report,
        }) => {
            let input = MeasurementInput::parse(&name, &weight, &height)?;
            let mut log = open_log(&paths)?;
            cmd_calc(&mut log, &input, report, &paths, &config).map(|_| ())
        }
        Some(Commands::History { name, json, csv }) => {
            let log = open_log(&paths)?;
            cmd_history(&log, &name, json, csv.as_deref(), &config)
        }
        Some(Commands::Report {
            name,
            weight,
            height,
        }) => {
            let input = MeasurementInput::parse(&name, &weight, &height)?;
            cmd_report(&input, &paths)
        }
        None => {
            // Default to an interactive calculation
            let mut log = open_log(&paths)?;
            cmd_interactive(&mut log, &paths, &config)
        }
    }
}

/// Open the store once for this process and wrap it in the log
fn open_log(paths: &Paths) -> Result<SqliteMeasurementLog> {
    let store = Store::open(&paths.database)?;
    Ok(SqliteMeasurementLog::new(store))
}

fn cmd_calc(
    log: &mut impl MeasurementLog,
    input: &MeasurementInput,
    export_report: bool,
    paths: &Paths,
    config: &Config,
) -> Result<Assessment> {
    let assessment = compute(input.weight_kg, input.height_m)?;
    let measurement = NewMeasurement::from_assessment(input, &assessment, now_local());

    // Nothing is shown unless the record is stored
    log.append(&measurement)?;

    display_assessment(&input.name, &assessment);

    let series = log.history_for(&input.name)?;
    println!();
    print!("{}", chart::render(&input.name, &series, config.chart.width));

    if export_report {
        let report = Report::new(input, &assessment, measurement.recorded_at);
        let path = report.write_to(&paths.reports)?;
        println!();
        println!("✓ Report saved to {}", path.display());
    }

    Ok(assessment)
}

fn cmd_history(
    log: &impl MeasurementLog,
    name: &str,
    json: bool,
    csv: Option<&Path>,
    config: &Config,
) -> Result<()> {
    if let Some(csv_path) = csv {
        let records = log.records_for(name)?;
        let count = write_records_csv(csv_path, &records)?;
        println!("✓ Exported {} measurements to {}", count, csv_path.display());
        return Ok(());
    }

    let series = log.history_for(name)?;

    if json {
        println!("{}", series_to_json(&series)?);
        return Ok(());
    }

    if series.is_empty() {
        println!("No measurements recorded for {}.", name);
        return Ok(());
    }

    print!("{}", chart::render(name, &series, config.chart.width));
    Ok(())
}

fn cmd_report(input: &MeasurementInput, paths: &Paths) -> Result<()> {
    let assessment = compute(input.weight_kg, input.height_m)?;
    let report = Report::new(input, &assessment, now_local());
    let path = report.write_to(&paths.reports)?;

    display_assessment(&input.name, &assessment);
    println!();
    println!("✓ Report saved to {}", path.display());
    Ok(())
}

fn cmd_interactive(
    log: &mut impl MeasurementLog,
    paths: &Paths,
    config: &Config,
) -> Result<()> {
    println!("╭─────────────────────────────────────────╮");
    println!("│  BMI CALCULATOR");
    println!("╰─────────────────────────────────────────╯");
    println!();

    let input = loop {
        let name = prompt("Name: ")?;
        let weight = prompt("Weight (kg): ")?;
        let height = prompt("Height (m): ")?;

        match MeasurementInput::parse(&name, &weight, &height) {
            Ok(input) => break input,
            Err(e) if e.is_invalid_input() => {
                eprintln!("{}", e);
                println!("Please try again.\n");
            }
            Err(e) => return Err(e),
        }
    };

    println!();
    let assessment = cmd_calc(log, &input, false, paths, config)?;

    println!();
    let answer = read_line_prompt("Save a report? [y/N] ")?;
    if matches!(answer.as_deref().map(str::trim), Some("y") | Some("Y")) {
        let report = Report::new(&input, &assessment, now_local());
        let path = report.write_to(&paths.reports)?;
        println!("✓ Report saved to {}", path.display());
    }

    Ok(())
}

fn display_assessment(name: &str, assessment: &Assessment) {
    println!("  {}", name);
    println!("  BMI: {:.2}", assessment.bmi);
    println!("  Category: {}", assessment.category);
    println!("  → {}", assessment.recommendation);
}

/// Prompt for a required line; end of input is an error
fn prompt(label: &str) -> Result<String> {
    read_line_prompt(label)?
        .ok_or_else(|| Error::Other("input closed before a measurement was entered".into()))
}

/// Prompt and read one line, `None` at end of input
fn read_line_prompt(label: &str) -> Result<Option<String>> {
    print!("{}", label);
    io::stdout().flush()?;

    let mut input = String::new();
    if io::stdin().read_line(&mut input)? == 0 {
        return Ok(None);
    }
    Ok(Some(input.trim_end_matches(&['\r', '\n'][..]).to_string()))
}
