//! Constants used throughout the core crate.

/// Default directory for report storage when no explicit directory is configured.
pub const DEFAULT_REPORT_DATA_DIR: &str = "report_data";

/// Directory name under the data directory that holds sharded report records.
pub const REPORTS_DIR_NAME: &str = "reports";

/// Filename of a persisted report inside its sharded directory.
pub const REPORT_JSON_FILENAME: &str = "report.json";

/// Temporary filename used while a report is being written.
pub const REPORT_JSON_TMP_FILENAME: &str = "report.json.tmp";

/// Default Gemini model.
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";

/// Default Gemini REST base URL.
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Title stored when the oracle returns nothing usable for the title stage.
pub const UNTITLED_REPORT: &str = "Untitled consultation";

pub const DEFAULT_ORACLE_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_PIPELINE_DEADLINE_SECS: u64 = 180;
pub const DEFAULT_ORACLE_MAX_ATTEMPTS: u32 = 1;
pub const DEFAULT_ORACLE_RETRY_BACKOFF_MS: u64 = 1_000;
pub const DEFAULT_ORACLE_MAX_CONCURRENCY: usize = 8;

/// Upper bound on a single retry delay, regardless of attempt number.
pub const MAX_RETRY_BACKOFF_MS: u64 = 10_000;
