mod analyzer;
mod config;
mod error;
mod parser;
mod report;

use clap::Parser;
use config::{Config, DEFAULT_FAILED_LOGIN_THRESHOLD, DEFAULT_LOG_FILE, DEFAULT_OUTPUT_CSV};
use std::io::IsTerminal;
use std::path::PathBuf;

/// Summarises a web server access log: requests per client address, the most
/// accessed endpoint, and addresses with too many failed logins
#[derive(Parser, Debug)]
#[command(
    name = "access_log_report",
    author,
    version,
    about = "Counts requests per IP and endpoint, flags failed-login offenders, writes a CSV summary"
)]
struct Args {
    /// Path to the access log to analyze
    #[arg(value_name = "LOG_FILE", default_value = DEFAULT_LOG_FILE)]
    file: PathBuf,

    /// Where to write the CSV summary
    #[arg(short = 'o', long = "output", default_value = DEFAULT_OUTPUT_CSV, value_name = "CSV_FILE")]
    output: PathBuf,

    /// Failed logins (HTTP 401) an IP may have before it is flagged
    #[arg(
        short = 't',
        long = "threshold",
        default_value_t = DEFAULT_FAILED_LOGIN_THRESHOLD,
        value_name = "COUNT"
    )]
    threshold: usize,

    /// Also export the summary as JSON to the specified file path
    #[arg(short = 'j', long = "json-output", value_name = "OUTPUT_FILE")]
    json_output: Option<PathBuf>,

    /// Disable colored headers
    #[arg(long = "no-color")]
    no_color: bool,

    /// Log progress to stderr
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,
}

impl From<Args> for Config {
    fn from(args: Args) -> Self {
        Config {
            log_file: args.file,
            output_csv: args.output,
            failed_login_threshold: args.threshold,
            json_output: args.json_output,
        }
    }
}

fn main() {
    let args = Args::parse();

    let mut logger = env_logger::Builder::from_default_env();
    if args.verbose {
        logger.filter_level(log::LevelFilter::Debug);
    }
    logger.init();

    if args.no_color || !std::io::stdout().is_terminal() {
        colored::control::set_override(false);
    }

    let config = Config::from(args);
    log::debug!("running with {:?}", config);

    if let Err(e) = run(&config) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

fn run(config: &Config) -> error::Result<()> {
    let aggregates = parser::parse_log(&config.log_file)?;
    let summary = report::report(&aggregates, config)?;
    log::debug!(
        "{} addresses, {} flagged over threshold {}",
        summary.requests_per_ip.len(),
        summary.suspicious.len(),
        summary.failed_login_threshold
    );
    Ok(())
}
