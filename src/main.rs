mod config;
mod scenario;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use surveyor_zone::ZonePlan;

use crate::config::{SurveyorConfig, load_config_from_path};
use crate::scenario::{Survey, load_scenario_from_path};

#[derive(Parser, Debug)]
#[command(name = "surveyor", about = "Axis-linked markers and chunked zone plans")]
struct Cli {
    /// Write logs to this file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Play a scenario file and report the resulting markers and zone
    Run {
        scenario: PathBuf,
        /// Surveyor config (TOML); defaults apply when omitted
        #[arg(long)]
        config: Option<PathBuf>,
        /// Write the encoded zone plan here
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Decode a zone plan written by `run --out` and list its chunks
    Inspect { zone: PathBuf },
}

fn init_logging(log_file: Option<&Path>) -> Result<(), String> {
    match log_file {
        Some(path) => {
            let file = std::fs::File::create(path)
                .map_err(|e| format!("cannot create log file {}: {}", path.display(), e))?;
            simplelog::WriteLogger::init(
                simplelog::LevelFilter::Debug,
                simplelog::Config::default(),
                file,
            )
            .map_err(|e| format!("logger init failed: {}", e))
        }
        None => {
            env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
                .init();
            Ok(())
        }
    }
}

fn run(scenario: &Path, config: Option<&Path>, out: Option<&Path>) -> Result<(), String> {
    let cfg = match config {
        Some(path) => load_config_from_path(path)?,
        None => SurveyorConfig::default(),
    };
    log::info!(
        target: "survey",
        "marker range {}, zone seed {}",
        cfg.markers.range, cfg.zone.seed
    );
    let scenario = load_scenario_from_path(scenario)?;
    let mut survey = Survey::new(&cfg);
    survey.run(&scenario)?;

    for line in survey.report() {
        println!("{}", line);
    }
    for (x, z) in survey.sample(cfg.zone.samples) {
        println!("sample ({}, {})", x, z);
    }
    if let Some(path) = out {
        let bytes = survey.zone().to_bytes();
        std::fs::write(path, &bytes).map_err(|e| format!("write error: {}", e))?;
        log::info!(target: "survey", "wrote {} byte(s) to {}", bytes.len(), path.display());
    }
    Ok(())
}

fn inspect(path: &Path) -> Result<(), String> {
    let bytes = std::fs::read(path).map_err(|e| format!("read error: {}", e))?;
    let plan = ZonePlan::from_bytes(&bytes).map_err(|e| {
        log::warn!(target: "zone", "{} is not a zone plan: {}", path.display(), e);
        format!("decode error: {}", e)
    })?;
    for (pos, chunk) in plan.chunks() {
        let (ox, oz) = pos.origin();
        let fill = if chunk.is_full() {
            "full".to_string()
        } else {
            format!("{} column(s)", chunk.count())
        };
        println!("chunk ({}, {}) at ({}, {}): {}", pos.cx, pos.cz, ox, oz, fill);
    }
    println!("zone: {} column(s) in {} chunk(s)", plan.area(), plan.len());
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(e) = init_logging(cli.log_file.as_deref()) {
        eprintln!("{}", e);
        return ExitCode::FAILURE;
    }
    let result = match &cli.command {
        Command::Run { scenario, config, out } => run(scenario, config.as_deref(), out.as_deref()),
        Command::Inspect { zone } => inspect(zone),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            eprintln!("surveyor: {}", e);
            ExitCode::FAILURE
        }
    }
}
