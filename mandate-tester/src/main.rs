mod common;
mod logic;

use anyhow::{Context, Result, bail};
use clap::Parser;
use colored::Colorize;
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use common::scenario::{catalog, select_scenarios};
use common::split_csv;
use logic::{LogicTester, ScenarioResult, resolve_seed_inputs};

#[derive(Debug, Parser)]
#[command(name = "mandate-tester", version)]
#[command(about = "Headless campaign simulator and invariant checker for Mandate")]
struct Args {
    /// Scenarios to run (comma-separated, or `all`)
    #[arg(long, default_value = "smoke")]
    scenarios: String,

    /// List all available scenarios and exit
    #[arg(long)]
    list_scenarios: bool,

    /// Seeds to run (comma-separated integers or share codes, or `all`)
    #[arg(long, default_value = "1337")]
    seeds: String,

    /// Number of iterations per scenario and seed
    #[arg(long, default_value_t = 10)]
    iterations: usize,

    /// Output report format
    #[arg(long, default_value = "console")]
    #[arg(value_parser = ["json", "markdown", "console", "csv"])]
    report: String,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if args.list_scenarios {
        let mut output_target = OutputTarget::new(args.output.clone())?;
        write_scenario_list(&mut output_target)?;
        output_target.flush()?;
        return Ok(());
    }

    let console = args.report == "console";
    if console {
        announce_banner();
    }

    let seeds = resolve_seed_inputs(&split_csv(&args.seeds))?;
    let scenarios = select_scenarios(&split_csv(&args.scenarios))?;
    log::info!(
        "running {} scenario(s) over {} seed(s), {} iteration(s) each",
        scenarios.len(),
        seeds.len(),
        args.iterations
    );

    let start_time = Instant::now();
    let tester = LogicTester::new(args.verbose);
    let results: Vec<ScenarioResult> = scenarios
        .iter()
        .flat_map(|scenario| tester.run_scenario(scenario, &seeds, args.iterations))
        .collect();

    let mut output_target = OutputTarget::new(args.output.clone())?;
    write_report(&mut output_target, &args.report, &results, start_time.elapsed())?;
    output_target.flush()?;

    let failed = results.iter().filter(|result| !result.passed).count();
    if failed > 0 {
        bail!("{failed} of {} scenario run(s) failed", results.len());
    }
    if console {
        println!("{}", "🎉 All scenarios passed".green().bold());
    }
    Ok(())
}

fn announce_banner() {
    println!("{}", "🗳️  Mandate Automated Tester".bright_cyan().bold());
    println!("{}", "================================".cyan());
}

fn write_scenario_list(out: &mut dyn Write) -> Result<()> {
    writeln!(out, "Available scenarios:")?;
    for scenario in catalog() {
        writeln!(out, "  {:25} - {}", scenario.name, scenario.description)?;
    }
    writeln!(out, "  {:25} - Every scenario above", "all")?;
    Ok(())
}

fn write_report(
    out: &mut dyn Write,
    format: &str,
    results: &[ScenarioResult],
    elapsed: Duration,
) -> Result<()> {
    match format {
        "json" => logic::reports::generate_json_report(out, results),
        "markdown" => {
            if results.is_empty() {
                writeln!(
                    out,
                    "# Mandate Campaign Test Results\n\n_No scenarios executed._"
                )?;
                Ok(())
            } else {
                logic::reports::generate_markdown_report(out, results)
            }
        }
        "csv" => logic::reports::generate_csv_report(out, results),
        _ => {
            if results.is_empty() {
                writeln!(out, "No scenarios executed.")?;
                Ok(())
            } else {
                logic::reports::generate_console_report(out, results, elapsed)
            }
        }
    }
}

enum OutputTarget {
    Stdout(BufWriter<std::io::Stdout>),
    File(BufWriter<File>),
}

impl OutputTarget {
    fn new(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Self::File(BufWriter::new(file)))
        } else {
            Ok(Self::Stdout(BufWriter::new(stdout())))
        }
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Stdout(w) => w,
            Self::File(w) => w,
        }
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.writer().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.writer().flush()
    }
}
