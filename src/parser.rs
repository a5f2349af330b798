use crate::error::{AnalyzerError, Result};
use indexmap::IndexMap;
use regex::Regex;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::OnceLock;

/// HTTP status recorded as a failed login.
pub const FAILED_LOGIN_STATUS: u16 = 401;

/// Counts keyed by address or endpoint, in order of first appearance.
pub type Counts = IndexMap<String, usize>;

/// The three aggregates built by a single pass over a log file.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct LogAggregates {
    /// Lines attributed to each client address.
    pub request_counts: Counts,
    /// Requests per endpoint path, for lines carrying a quoted request.
    pub endpoint_counts: Counts,
    /// Lines with status 401, per client address.
    pub failed_login_counts: Counts,
    /// Every line seen, matched or not.
    pub lines_read: usize,
    /// Lines without a leading address.
    pub lines_skipped: usize,
}

impl LogAggregates {
    /// Fold one log line into the aggregates.
    ///
    /// Returns `false` if the line has no leading address and was skipped.
    pub fn ingest_line(&mut self, line: &str) -> bool {
        self.lines_read += 1;

        let Some(ip) = extract_address(line) else {
            self.lines_skipped += 1;
            return false;
        };

        *self.request_counts.entry(ip.to_string()).or_insert(0) += 1;

        if let Some(endpoint) = extract_endpoint(line) {
            *self.endpoint_counts.entry(endpoint.to_string()).or_insert(0) += 1;
        }

        if extract_status(line) == Some(FAILED_LOGIN_STATUS) {
            *self.failed_login_counts.entry(ip.to_string()).or_insert(0) += 1;
        }

        true
    }
}

/// Leading dotted-quad address, anchored at column 0:
///   ^([0-9]+\.[0-9]+\.[0-9]+\.[0-9]+)
static ADDRESS_REGEX: OnceLock<Regex> = OnceLock::new();

/// Quoted request line with one of the four recognised methods:
///   "(GET|POST|PUT|DELETE) <path> HTTP
static REQUEST_REGEX: OnceLock<Regex> = OnceLock::new();

/// Status code right after the closing quote of the request:
///   " ([0-9]{3})<space>
static STATUS_REGEX: OnceLock<Regex> = OnceLock::new();

fn address_regex() -> &'static Regex {
    ADDRESS_REGEX.get_or_init(|| {
        Regex::new(r"^([0-9]+\.[0-9]+\.[0-9]+\.[0-9]+)")
            .expect("hard-coded regex should always compile")
    })
}

fn request_regex() -> &'static Regex {
    REQUEST_REGEX.get_or_init(|| {
        Regex::new(r#""(?:GET|POST|PUT|DELETE) ([^ ]+) HTTP"#)
            .expect("hard-coded regex should always compile")
    })
}

fn status_regex() -> &'static Regex {
    STATUS_REGEX.get_or_init(|| {
        Regex::new(r#"" ([0-9]{3}) "#).expect("hard-coded regex should always compile")
    })
}

/// Client address at the very start of the line, if any.
///
/// Lines with leading whitespace or fewer than four dotted groups yield `None`.
pub fn extract_address(line: &str) -> Option<&str> {
    address_regex()
        .captures(line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Request path from the first quoted `METHOD <path> HTTP` segment.
pub fn extract_endpoint(line: &str) -> Option<&str> {
    request_regex()
        .captures(line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Status code following a `" ` delimiter and followed by a space.
///
/// A code at the very end of a line has no trailing space and is not seen.
pub fn extract_status(line: &str) -> Option<u16> {
    status_regex()
        .captures(line)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Parse the log file at `path` into request, endpoint and failed-login counts.
pub fn parse_log(path: &Path) -> Result<LogAggregates> {
    let file = File::open(path).map_err(|source| AnalyzerError::FileAccess {
        path: path.to_path_buf(),
        source,
    })?;
    log::debug!("opened log file '{}'", path.display());

    let aggregates = parse_reader(BufReader::new(file)).map_err(|source| {
        AnalyzerError::FileAccess {
            path: path.to_path_buf(),
            source,
        }
    })?;

    log::info!(
        "parsed '{}': {} lines, {} skipped, {} distinct addresses",
        path.display(),
        aggregates.lines_read,
        aggregates.lines_skipped,
        aggregates.request_counts.len()
    );
    Ok(aggregates)
}

/// Same pass as [`parse_log`] over any buffered reader.
///
/// Invalid UTF-8 is replaced rather than rejected so one noisy line can't
/// abort the run.
pub fn parse_reader<R: BufRead>(reader: R) -> std::io::Result<LogAggregates> {
    let mut aggregates = LogAggregates::default();

    for chunk in reader.split(b'\n') {
        let bytes = chunk?;
        let text = String::from_utf8_lossy(&bytes);
        aggregates.ingest_line(text.strip_suffix('\r').unwrap_or(&*text));
    }

    Ok(aggregates)
}

// ─── Unit Tests ──────────────────────────────────────────────────────────────
