//! DhakaSeis CLI - Command-line interface for DhakaSeis
//!
//! Commands:
//! - assess: Assess a site and print the traffic-light risk message
//! - spectrum: Print the design response spectrum for a site
//! - sites: List the locations and soil classes in the site table
//! - check-table: Validate a custom site table file

use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use dhakaseis::assessment::{AssessmentRequest, SiteAssessor};
use dhakaseis::report::ReportEncoder;
use dhakaseis::site::SiteTable;
use dhakaseis::spectrum::{
    evaluate_points, peak_point, PeriodGrid, DEFAULT_GRID_END_S, DEFAULT_GRID_SAMPLES,
};
use dhakaseis::types::{
    AdvisoryLevel, BuildingInput, OccupancyCategory, SiteAssessment, SpectrumPoint,
    StructuralSystem, TrafficLight,
};
use dhakaseis::{RiskTier, SeismicError, PRODUCER_NAME, SEIS_VERSION};

/// DhakaSeis - Simplified seismic design response spectrum for Bangladesh sites
#[derive(Parser)]
#[command(name = "dhakaseis")]
#[command(version = SEIS_VERSION)]
#[command(
    about = "Seismic response spectrum and risk triage for a building site",
    long_about = None
)]
struct Cli {
    /// Custom site table (JSON) replacing the built-in table (use - for stdin)
    #[arg(long, global = true, env = "DHAKASEIS_TABLE")]
    table: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug); RUST_LOG takes precedence
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Assess a site and print the risk message
    Assess {
        /// Location name (e.g. Dhaka)
        #[arg(short, long)]
        location: String,

        /// Soil class (e.g. SC)
        #[arg(short, long)]
        soil: String,

        /// Building height in metres
        #[arg(long)]
        height: Option<f64>,

        /// Occupancy category (used with --height)
        #[arg(long, value_enum, default_value = "standard-residential")]
        occupancy: OccupancyArg,

        /// Structural system (used with --height)
        #[arg(long, value_enum, default_value = "concrete-moment-frame")]
        system: SystemArg,

        /// Number of periods in the grid
        #[arg(long, default_value_t = DEFAULT_GRID_SAMPLES)]
        samples: usize,

        /// Longest period in the grid (s)
        #[arg(long, default_value_t = DEFAULT_GRID_END_S)]
        max_period: f64,

        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: ReportFormat,
    },

    /// Print the design response spectrum
    Spectrum {
        /// Location name
        #[arg(short, long, conflicts_with = "zone", required_unless_present = "zone")]
        location: Option<String>,

        /// Explicit zone coefficient instead of a location
        #[arg(short, long)]
        zone: Option<f64>,

        /// Soil class
        #[arg(short, long)]
        soil: String,

        /// Shortest period (s)
        #[arg(long, default_value_t = 0.0)]
        start: f64,

        /// Longest period (s)
        #[arg(long, default_value_t = DEFAULT_GRID_END_S)]
        end: f64,

        /// Number of periods
        #[arg(long, default_value_t = DEFAULT_GRID_SAMPLES)]
        samples: usize,

        /// Output format
        #[arg(long, value_enum, default_value = "table")]
        format: SpectrumFormat,
    },

    /// List locations and soil classes
    Sites {
        /// Output the table as JSON
        #[arg(long)]
        json: bool,
    },

    /// Validate a site table file
    CheckTable {
        /// Table file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output validation report as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, ValueEnum)]
enum OccupancyArg {
    StandardResidential,
    /// Hospital, school or other essential facility
    Essential,
    HazardousStorage,
}

impl From<OccupancyArg> for OccupancyCategory {
    fn from(arg: OccupancyArg) -> Self {
        match arg {
            OccupancyArg::StandardResidential => OccupancyCategory::StandardResidential,
            OccupancyArg::Essential => OccupancyCategory::Essential,
            OccupancyArg::HazardousStorage => OccupancyCategory::HazardousStorage,
        }
    }
}

#[derive(Clone, ValueEnum)]
enum SystemArg {
    ConcreteMomentFrame,
    SteelMomentFrame,
    EccentricBracedSteel,
    Other,
}

impl From<SystemArg> for StructuralSystem {
    fn from(arg: SystemArg) -> Self {
        match arg {
            SystemArg::ConcreteMomentFrame => StructuralSystem::ConcreteMomentFrame,
            SystemArg::SteelMomentFrame => StructuralSystem::SteelMomentFrame,
            SystemArg::EccentricBracedSteel => StructuralSystem::EccentricBracedSteel,
            SystemArg::Other => StructuralSystem::Other,
        }
    }
}

#[derive(Clone, ValueEnum)]
enum ReportFormat {
    /// Human-readable traffic-light summary
    Text,
    /// Compact JSON report
    Json,
    /// Pretty-printed JSON report
    JsonPretty,
}

#[derive(Clone, ValueEnum)]
enum SpectrumFormat {
    /// Aligned columns
    Table,
    /// Comma-separated values with a header row
    Csv,
    /// JSON array of points
    Json,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<(), SeisCliError> {
    match cli.command {
        Commands::Assess {
            location,
            soil,
            height,
            occupancy,
            system,
            samples,
            max_period,
            format,
        } => {
            let building =
                height.map(|h| BuildingInput::new(h, occupancy.into(), system.into()));
            let grid = PeriodGrid {
                start_s: 0.0,
                end_s: max_period,
                samples,
            };
            cmd_assess(cli.table.as_deref(), &location, &soil, building, grid, format)
        }

        Commands::Spectrum {
            location,
            zone,
            soil,
            start,
            end,
            samples,
            format,
        } => {
            let grid = PeriodGrid {
                start_s: start,
                end_s: end,
                samples,
            };
            cmd_spectrum(
                cli.table.as_deref(),
                location.as_deref(),
                zone,
                &soil,
                grid,
                format,
            )
        }

        Commands::Sites { json } => cmd_sites(cli.table.as_deref(), json),

        Commands::CheckTable { input, json } => cmd_check_table(&input, json),
    }
}

fn cmd_assess(
    table: Option<&Path>,
    location: &str,
    soil: &str,
    building: Option<BuildingInput>,
    grid: PeriodGrid,
    format: ReportFormat,
) -> Result<(), SeisCliError> {
    let assessor = SiteAssessor::new(load_table(table)?, grid);

    let mut request = AssessmentRequest::new(location, soil);
    if let Some(building) = building {
        request = request.with_building(building);
    }

    let assessment = assessor.assess(&request)?;
    let encoder = ReportEncoder::new();

    match format {
        ReportFormat::Text => print_assessment(&assessment, atty::is(atty::Stream::Stdout)),
        ReportFormat::Json => println!("{}", encoder.encode_to_json(&assessment)?),
        ReportFormat::JsonPretty => println!("{}", encoder.encode_to_json_pretty(&assessment)?),
    }

    Ok(())
}

fn cmd_spectrum(
    table: Option<&Path>,
    location: Option<&str>,
    zone: Option<f64>,
    soil: &str,
    grid: PeriodGrid,
    format: SpectrumFormat,
) -> Result<(), SeisCliError> {
    let table = load_table(table)?;

    let zone_coefficient = match (zone, location) {
        (Some(z), _) => z,
        (None, Some(name)) => table.lookup_zone(name)?,
        (None, None) => return Err(SeisCliError::MissingZone),
    };
    let profile = table.lookup_soil(soil)?;

    let points = evaluate_points(zone_coefficient, profile, &grid.periods()?)?;
    debug!(samples = points.len(), "spectrum ready");

    print!("{}", format_spectrum(&points, &format)?);

    if let SpectrumFormat::Table = format {
        let peak = peak_point(&points)?;
        println!(
            "\nPeak: {:.4} g at T = {:.3} s ({})",
            peak.sa_g,
            peak.period_s,
            peak.branch.as_str()
        );
    }

    Ok(())
}

fn cmd_sites(table: Option<&Path>, json: bool) -> Result<(), SeisCliError> {
    let table = load_table(table)?;

    if json {
        println!("{}", table.to_json()?);
        return Ok(());
    }

    println!("Locations");
    println!("=========");
    for (name, z) in table.locations() {
        println!("  {:<16} Z = {:.2}", name, z);
    }

    println!("\nSoil classes");
    println!("============");
    for (name, profile) in table.soil_classes() {
        println!(
            "  {:<4} S = {:.2}  TB = {:.2} s  TC = {:.2} s  TD = {:.2} s",
            name,
            profile.s(),
            profile.tb(),
            profile.tc(),
            profile.td()
        );
        if !profile.description().is_empty() {
            println!("       {}", profile.description());
        }
    }

    Ok(())
}

fn cmd_check_table(input: &Path, json: bool) -> Result<(), SeisCliError> {
    let content = read_input(input)?;

    let report = match SiteTable::from_json(&content) {
        Ok(table) => TableReport {
            valid: true,
            locations: table.locations().count(),
            soil_classes: table.soil_classes().count(),
            error: None,
        },
        Err(e) => TableReport {
            valid: false,
            locations: 0,
            soil_classes: 0,
            error: Some(e.to_string()),
        },
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Site Table Report");
        println!("=================");
        println!("Producer:     {} {}", PRODUCER_NAME, SEIS_VERSION);
        println!("Valid:        {}", report.valid);
        println!("Locations:    {}", report.locations);
        println!("Soil classes: {}", report.soil_classes);
        if let Some(error) = &report.error {
            println!("\nError: {}", error);
        }
    }

    if report.valid {
        Ok(())
    } else {
        Err(SeisCliError::TableInvalid)
    }
}

// Helper functions

fn read_input(path: &Path) -> Result<String, SeisCliError> {
    if path.to_string_lossy() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(fs::read_to_string(path)?)
    }
}

fn load_table(path: Option<&Path>) -> Result<SiteTable, SeisCliError> {
    match path {
        Some(path) => {
            info!(path = %path.display(), "loading site table");
            let content = read_input(path)?;
            Ok(SiteTable::from_json(&content)?)
        }
        None => Ok(SiteTable::builtin().clone()),
    }
}

fn format_spectrum(
    points: &[SpectrumPoint],
    format: &SpectrumFormat,
) -> Result<String, SeisCliError> {
    match format {
        SpectrumFormat::Table => {
            let mut out = format!("{:>10}  {:>10}  {}\n", "T (s)", "Sa (g)", "branch");
            for p in points {
                out.push_str(&format!(
                    "{:>10.4}  {:>10.4}  {}\n",
                    p.period_s,
                    p.sa_g,
                    p.branch.as_str()
                ));
            }
            Ok(out)
        }
        SpectrumFormat::Csv => {
            let mut out = String::from("period_s,sa_g,branch\n");
            for p in points {
                out.push_str(&format!("{},{},{}\n", p.period_s, p.sa_g, p.branch.as_str()));
            }
            Ok(out)
        }
        SpectrumFormat::Json => Ok(serde_json::to_string(points)? + "\n"),
    }
}

fn print_assessment(assessment: &SiteAssessment, color: bool) {
    let soil = &assessment.soil;

    println!(
        "Site:  {} (Z = {:.2}), soil {} (S = {:.2}, TB = {:.2} s, TC = {:.2} s, TD = {:.2} s)",
        assessment.location,
        assessment.zone_coefficient,
        assessment.soil_class,
        soil.s(),
        soil.tb(),
        soil.tc(),
        soil.td()
    );
    if !soil.description().is_empty() {
        println!("       {}", soil.description());
    }

    println!(
        "Peak:  {:.3} g at T = {:.2} s ({})",
        assessment.peak.sa_g,
        assessment.peak.period_s,
        assessment.peak.branch.as_str()
    );

    let risk = &assessment.risk;
    println!();
    println!("{} {}", light_badge(risk.light, risk.tier, color), risk.headline);
    println!("  {}", risk.guidance);

    if let Some(building) = &assessment.building {
        println!();
        println!(
            "Building: {:.1} m, {}, T ≈ {:.2} s, design Sa = {:.3} g ({})",
            building.input.height_m,
            building.input.occupancy.label(),
            building.period_s,
            building.design_sa_g,
            building.branch.as_str()
        );
        let tag = match building.advisory.level {
            AdvisoryLevel::Ok => "[OK]",
            AdvisoryLevel::Warning => "[WARN]",
        };
        println!("  {} {}", tag, building.advisory.message);
    }
}

fn light_badge(light: TrafficLight, tier: RiskTier, color: bool) -> String {
    let label = format!("[{}]", tier.as_str().to_uppercase());
    if !color {
        return label;
    }

    let code = match light {
        TrafficLight::Green => "32",
        TrafficLight::Amber => "33",
        TrafficLight::Red => "31",
    };
    format!("\x1b[1;{}m{}\x1b[0m", code, label)
}

// Error types

#[derive(Debug)]
enum SeisCliError {
    Io(io::Error),
    Seismic(SeismicError),
    Json(serde_json::Error),
    MissingZone,
    TableInvalid,
}

impl From<io::Error> for SeisCliError {
    fn from(e: io::Error) -> Self {
        SeisCliError::Io(e)
    }
}

impl From<SeismicError> for SeisCliError {
    fn from(e: SeismicError) -> Self {
        SeisCliError::Seismic(e)
    }
}

impl From<serde_json::Error> for SeisCliError {
    fn from(e: serde_json::Error) -> Self {
        SeisCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<SeisCliError> for CliError {
    fn from(e: SeisCliError) -> Self {
        match e {
            SeisCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            SeisCliError::Seismic(e) => {
                let (code, hint) = match &e {
                    SeismicError::UnknownLocation(_) => {
                        ("UNKNOWN_LOCATION", "Run 'dhakaseis sites' to list locations")
                    }
                    SeismicError::UnknownSoilClass(_) => {
                        ("UNKNOWN_SOIL_CLASS", "Run 'dhakaseis sites' to list soil classes")
                    }
                    SeismicError::InvalidSiteTable(_)
                    | SeismicError::InvalidSoilProfile(_)
                    | SeismicError::JsonError(_) => {
                        ("INVALID_TABLE", "Run 'dhakaseis check-table' for details")
                    }
                    _ => ("INVALID_INPUT", "Check the numeric arguments"),
                };
                CliError {
                    code: code.to_string(),
                    message: e.to_string(),
                    hint: Some(hint.to_string()),
                }
            }
            SeisCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: None,
            },
            SeisCliError::MissingZone => CliError {
                code: "MISSING_ZONE".to_string(),
                message: "Either --location or --zone is required".to_string(),
                hint: None,
            },
            SeisCliError::TableInvalid => CliError {
                code: "TABLE_INVALID".to_string(),
                message: "Site table failed validation".to_string(),
                hint: Some("Fix the reported error and retry".to_string()),
            },
        }
    }
}

// Report types

#[derive(serde::Serialize)]
struct TableReport {
    valid: bool,
    locations: usize,
    soil_classes: usize,
    error: Option<String>,
}
