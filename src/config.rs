use std::path::PathBuf;

/// Log file read when no path is given on the command line.
pub const DEFAULT_LOG_FILE: &str = "sample.log";

/// CSV artifact written when no output path is given.
pub const DEFAULT_OUTPUT_CSV: &str = "log_analysis_results.csv";

/// Failed logins (HTTP 401) an address may have before it is flagged.
/// Flagging is strictly greater-than.
pub const DEFAULT_FAILED_LOGIN_THRESHOLD: usize = 10;

/// Run configuration, built once in `main` and passed to the parse and
/// report steps.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub log_file: PathBuf,
    pub output_csv: PathBuf,
    pub failed_login_threshold: usize,
    pub json_output: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
            output_csv: PathBuf::from(DEFAULT_OUTPUT_CSV),
            failed_login_threshold: DEFAULT_FAILED_LOGIN_THRESHOLD,
            json_output: None,
        }
    }
}
