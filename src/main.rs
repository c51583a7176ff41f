/// License Report - find which files share which license statement
///
/// The main entry point for the license report. It parses command-line
/// arguments, runs the search and prints the grouped report.

use anyhow::Result;
use clap::{ArgAction, Parser};
use colored::Colorize;
use log::{info, LevelFilter};
use std::fs::File;
use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::time::Instant;

use license_report::app::collect_licenses;
use license_report::{write_report, ReportOptions, SearchCommand};

/// Command line argument structure
#[derive(Parser, Debug)]
#[command(
    name = "license_report",
    version,
    about = "Report which files share which license statement",
    long_about = "Greps the current directory tree for lines mentioning \"license\" and prints each
distinct license statement followed by the files that carry it. Useful for
spotting the files whose boilerplate differs from the rest of a project."
)]
struct Args {
    /// Directory to scan (default: current directory)
    #[arg(long = "dir", default_value = ".")]
    dir: PathBuf,

    /// Order groups by number of files, most common first
    #[arg(long = "sort", action = ArgAction::SetTrue)]
    sort: bool,

    /// Output in markdown format (wrapped in triple backticks)
    #[arg(long = "md", action = ArgAction::SetTrue)]
    md: bool,

    /// Disable colored output
    #[arg(long = "no-color", action = ArgAction::SetTrue)]
    no_color: bool,

    /// Set logging level (default: WARN)
    #[arg(long = "log-level", default_value = "warn")]
    log_level: LevelFilter,

    /// Write log output to this file instead of stderr
    #[arg(long = "log-file")]
    log_file: Option<PathBuf>,
}

/// Main entry point function
fn main() -> Result<()> {
    let start_time = Instant::now();

    let args = Args::parse();

    setup_logging(&args)?;

    let color = !args.no_color && io::stdout().is_terminal();
    if !color {
        colored::control::set_override(false);
    }

    let options = ReportOptions {
        sort: args.sort,
        markdown: args.md,
        color,
    };

    let groups = collect_licenses(&SearchCommand::new(&args.dir))?;

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    write_report(&groups, &options, &mut handle)?;

    info!(
        "Reported {} license statements in {:.2} seconds",
        groups.len(),
        start_time.elapsed().as_secs_f64()
    );

    Ok(())
}

/// Set up logging to stderr or to the requested log file
fn setup_logging(args: &Args) -> Result<()> {
    let mut builder = env_logger::Builder::new();

    builder.filter_level(args.log_level);

    builder.format(|buf, record| {
        use chrono::Local;
        use std::io::Write;
        writeln!(
            buf,
            "{} - {} - {} - {}",
            Local::now().format("%Y-%m-%d %H:%M:%S"),
            record.level(),
            record.target(),
            record.args()
        )
    });

    if let Some(log_file) = &args.log_file {
        match File::create(log_file) {
            Ok(file) => {
                builder.target(env_logger::Target::Pipe(Box::new(file)));
            }
            Err(e) => {
                eprintln!(
                    "{} could not open log file {}: {}",
                    "Warning:".yellow(),
                    log_file.display(),
                    e
                );
            }
        }
    }

    builder.try_init()?;

    Ok(())
}
