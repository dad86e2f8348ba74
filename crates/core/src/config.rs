//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into services. Request
//! handling never reads process-wide environment variables, which keeps behaviour consistent in
//! multi-threaded runtimes and test harnesses.

use crate::constants::{
    DEFAULT_GEMINI_BASE_URL, DEFAULT_GEMINI_MODEL, DEFAULT_ORACLE_MAX_ATTEMPTS,
    DEFAULT_ORACLE_MAX_CONCURRENCY, DEFAULT_ORACLE_RETRY_BACKOFF_MS, DEFAULT_ORACLE_TIMEOUT_SECS,
    DEFAULT_PIPELINE_DEADLINE_SECS, DEFAULT_REPORT_DATA_DIR, REPORTS_DIR_NAME,
};
use crate::oracle::GenerationConfig;
use crate::{ReportError, ReportResult};
use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

/// Which persistence backend to use.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoreKind {
    /// Sharded JSON files under the report data directory.
    File,
    /// Process-local map; contents are lost on exit.
    Memory,
}

impl FromStr for StoreKind {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "file" => Ok(StoreKind::File),
            "memory" => Ok(StoreKind::Memory),
            other => Err(ReportError::InvalidInput(format!(
                "unknown store kind '{other}' (expected 'file' or 'memory')"
            ))),
        }
    }
}

/// Storage configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    report_data_dir: PathBuf,
    store_kind: StoreKind,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::InvalidInput`] if the file store is selected with an empty data
    /// directory path.
    pub fn new(report_data_dir: PathBuf, store_kind: StoreKind) -> ReportResult<Self> {
        if store_kind == StoreKind::File && report_data_dir.as_os_str().is_empty() {
            return Err(ReportError::InvalidInput(
                "report data directory cannot be empty".into(),
            ));
        }

        Ok(Self {
            report_data_dir,
            store_kind,
        })
    }

    pub fn report_data_dir(&self) -> &Path {
        &self.report_data_dir
    }

    pub fn reports_dir(&self) -> PathBuf {
        self.report_data_dir.join(REPORTS_DIR_NAME)
    }

    pub fn store_kind(&self) -> StoreKind {
        self.store_kind
    }
}

/// Connection details for the Gemini oracle.
#[derive(Clone, Debug)]
pub struct OracleConfig {
    /// `None` (or empty) leaves the client unable to complete prompts; every call then fails with
    /// `OracleError::MissingApiKey`.
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub generation: GenerationConfig,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_GEMINI_MODEL.into(),
            base_url: DEFAULT_GEMINI_BASE_URL.into(),
            generation: GenerationConfig::default(),
        }
    }
}

/// Timing, retry and admission settings for the report pipeline.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Upper bound for a single oracle request.
    pub call_timeout: Duration,
    /// Upper bound for a whole `generate_report` invocation, retries included.
    pub deadline: Duration,
    /// Attempts per stage; `1` means no retry.
    pub max_attempts: u32,
    /// Base delay before the first retry; doubles per attempt.
    pub retry_backoff: Duration,
    /// Pipelines allowed to talk to the oracle at the same time.
    pub max_concurrency: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            call_timeout: Duration::from_secs(DEFAULT_ORACLE_TIMEOUT_SECS),
            deadline: Duration::from_secs(DEFAULT_PIPELINE_DEADLINE_SECS),
            max_attempts: DEFAULT_ORACLE_MAX_ATTEMPTS,
            retry_backoff: Duration::from_millis(DEFAULT_ORACLE_RETRY_BACKOFF_MS),
            max_concurrency: DEFAULT_ORACLE_MAX_CONCURRENCY,
        }
    }
}

impl PipelineConfig {
    /// Checks the settings are usable.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::InvalidInput`] for zero timeouts, zero attempts or zero concurrency.
    pub fn validate(&self) -> ReportResult<()> {
        if self.call_timeout.is_zero() || self.deadline.is_zero() {
            return Err(ReportError::InvalidInput(
                "oracle timeout and pipeline deadline must be greater than zero".into(),
            ));
        }
        if self.max_attempts == 0 {
            return Err(ReportError::InvalidInput(
                "oracle max attempts must be at least 1".into(),
            ));
        }
        if self.max_concurrency == 0 {
            return Err(ReportError::InvalidInput(
                "oracle max concurrency must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Everything the binaries need to build a `ReportService`.
#[derive(Clone, Debug)]
pub struct RuntimeConfig {
    pub core: CoreConfig,
    pub oracle: OracleConfig,
    pub pipeline: PipelineConfig,
}

impl RuntimeConfig {
    /// Resolves configuration from the process environment.
    ///
    /// Call once at startup (after loading any `.env` file).
    ///
    /// # Environment Variables
    /// - `REPORT_DATA_DIR`: report storage directory (default: `report_data`)
    /// - `MW_STORE`: `file` (default) or `memory`
    /// - `GEMINI_API_KEY`, `GEMINI_MODEL`, `GEMINI_BASE_URL`
    /// - `MW_ORACLE_TIMEOUT_SECS`, `MW_PIPELINE_DEADLINE_SECS`, `MW_ORACLE_MAX_ATTEMPTS`,
    ///   `MW_ORACLE_RETRY_BACKOFF_MS`, `MW_ORACLE_MAX_CONCURRENCY`
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::InvalidInput`] if any value fails to parse or validate.
    pub fn from_env() -> ReportResult<Self> {
        let var = |name: &str| std::env::var(name).ok();

        let report_data_dir = var("REPORT_DATA_DIR")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_REPORT_DATA_DIR.into());
        let store_kind = parse_env_value("MW_STORE", var("MW_STORE"), StoreKind::File)?;
        let core = CoreConfig::new(PathBuf::from(report_data_dir), store_kind)?;

        let defaults = OracleConfig::default();
        let oracle = OracleConfig {
            api_key: var("GEMINI_API_KEY").filter(|v| !v.trim().is_empty()),
            model: var("GEMINI_MODEL")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.model),
            base_url: var("GEMINI_BASE_URL")
                .filter(|v| !v.trim().is_empty())
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or(defaults.base_url),
            generation: defaults.generation,
        };

        let pipeline = PipelineConfig {
            call_timeout: Duration::from_secs(parse_env_value(
                "MW_ORACLE_TIMEOUT_SECS",
                var("MW_ORACLE_TIMEOUT_SECS"),
                DEFAULT_ORACLE_TIMEOUT_SECS,
            )?),
            deadline: Duration::from_secs(parse_env_value(
                "MW_PIPELINE_DEADLINE_SECS",
                var("MW_PIPELINE_DEADLINE_SECS"),
                DEFAULT_PIPELINE_DEADLINE_SECS,
            )?),
            max_attempts: parse_env_value(
                "MW_ORACLE_MAX_ATTEMPTS",
                var("MW_ORACLE_MAX_ATTEMPTS"),
                DEFAULT_ORACLE_MAX_ATTEMPTS,
            )?,
            retry_backoff: Duration::from_millis(parse_env_value(
                "MW_ORACLE_RETRY_BACKOFF_MS",
                var("MW_ORACLE_RETRY_BACKOFF_MS"),
                DEFAULT_ORACLE_RETRY_BACKOFF_MS,
            )?),
            max_concurrency: parse_env_value(
                "MW_ORACLE_MAX_CONCURRENCY",
                var("MW_ORACLE_MAX_CONCURRENCY"),
                DEFAULT_ORACLE_MAX_CONCURRENCY,
            )?,
        };
        pipeline.validate()?;

        Ok(Self {
            core,
            oracle,
            pipeline,
        })
    }
}

/// Parse an optional environment value, falling back to `default` when unset or blank.
///
/// # Errors
///
/// Returns [`ReportError::InvalidInput`] naming the variable if the value does not parse.
pub fn parse_env_value<T>(name: &str, value: Option<String>, default: T) -> ReportResult<T>
where
    T: FromStr,
    T::Err: Display,
{
    let value = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());

    match value {
        None => Ok(default),
        Some(v) => v
            .parse::<T>()
            .map_err(|e| ReportError::InvalidInput(format!("{name}='{v}' is invalid: {e}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_env_value_uses_default_when_unset_or_blank() {
        assert_eq!(parse_env_value("X", None, 7u32).unwrap(), 7);
        assert_eq!(parse_env_value("X", Some("  ".into()), 7u32).unwrap(), 7);
    }

    #[test]
    fn parse_env_value_parses_trimmed_value() {
        assert_eq!(parse_env_value("X", Some(" 42 ".into()), 7u64).unwrap(), 42);
    }

    #[test]
    fn parse_env_value_names_the_variable_on_error() {
        let err = parse_env_value("MW_ORACLE_MAX_ATTEMPTS", Some("three".into()), 1u32)
            .unwrap_err();
        assert!(err.to_string().contains("MW_ORACLE_MAX_ATTEMPTS='three'"));
    }

    #[test]
    fn store_kind_parses_case_insensitively() {
        assert_eq!("Memory".parse::<StoreKind>().unwrap(), StoreKind::Memory);
        assert_eq!("file".parse::<StoreKind>().unwrap(), StoreKind::File);
        assert!("mongo".parse::<StoreKind>().is_err());
    }

    #[test]
    fn core_config_rejects_empty_dir_for_file_store() {
        assert!(CoreConfig::new(PathBuf::new(), StoreKind::File).is_err());
        assert!(CoreConfig::new(PathBuf::new(), StoreKind::Memory).is_ok());
    }

    #[test]
    fn reports_dir_is_nested_under_data_dir() {
        let cfg = CoreConfig::new(PathBuf::from("/srv/mw"), StoreKind::File).unwrap();
        assert_eq!(cfg.reports_dir(), PathBuf::from("/srv/mw/reports"));
    }

    #[test]
    fn pipeline_config_validation() {
        assert!(PipelineConfig::default().validate().is_ok());

        let zero_attempts = PipelineConfig {
            max_attempts: 0,
            ..PipelineConfig::default()
        };
        assert!(zero_attempts.validate().is_err());

        let zero_timeout = PipelineConfig {
            call_timeout: Duration::ZERO,
            ..PipelineConfig::default()
        };
        assert!(zero_timeout.validate().is_err());
    }
}
