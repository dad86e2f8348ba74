//! Report generation pipeline and report lookups.
//!
//! [`ReportService`] is the single entry point used by the REST API and the CLI. It owns the
//! oracle, the store and the pipeline settings, and is cheap to clone.
//!
//! A generation run is strictly sequential: SOAP note, then diagnosis (fed the raw SOAP
//! completion), then title. Only after all three completions are in does it sanitise, parse and
//! validate, and only a fully valid run is persisted.

use crate::config::{PipelineConfig, RuntimeConfig};
use crate::constants::MAX_RETRY_BACKOFF_MS;
use crate::markdown;
use crate::oracle::{GeminiOracle, Oracle, OracleError};
use crate::prompts;
use crate::report::{GeneratedReport, Report};
use crate::sanitise::{clean_title, strip_code_fences};
use crate::store::{open_store, ReportStore};
use crate::{ReportError, ReportResult, Stage};
use mw_types::{validate_document, DifferentialDiagnosisDocument, NonEmptyText, SoapNote};
use mw_uuid::ReportId;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::time::Instant;

#[derive(Clone)]
pub struct ReportService {
    oracle: Arc<dyn Oracle>,
    store: Arc<dyn ReportStore>,
    cfg: Arc<PipelineConfig>,
    admission: Arc<Semaphore>,
}

impl ReportService {
    pub fn new(oracle: Arc<dyn Oracle>, store: Arc<dyn ReportStore>, cfg: PipelineConfig) -> Self {
        let admission = Arc::new(Semaphore::new(cfg.max_concurrency.max(1)));
        Self {
            oracle,
            store,
            cfg: Arc::new(cfg),
            admission,
        }
    }

    /// Wire up the Gemini oracle and the configured store.
    ///
    /// A missing API key is not fatal here: lookups still work, and generation fails per request
    /// with `OracleUnavailable`.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::PersistenceFailure`] if the store cannot be opened.
    pub fn from_runtime_config(cfg: &RuntimeConfig) -> ReportResult<Self> {
        if cfg.oracle.api_key.is_none() {
            tracing::warn!("GEMINI_API_KEY is not set; report generation will fail");
        }

        let store = open_store(&cfg.core)?;
        let oracle = Arc::new(GeminiOracle::from_config(&cfg.oracle));

        tracing::info!(
            store = ?cfg.core.store_kind(),
            model = %cfg.oracle.model,
            max_concurrency = cfg.pipeline.max_concurrency,
            "report service ready"
        );

        Ok(Self::new(oracle, store, cfg.pipeline.clone()))
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.cfg
    }

    /// Turn a consultation transcript into a stored report.
    ///
    /// Waits for an admission permit first; the pipeline deadline starts once the permit is held.
    ///
    /// # Errors
    ///
    /// * [`ReportError::InvalidInput`] for a blank transcript (no oracle call is made).
    /// * [`ReportError::OracleUnavailable`] when any completion fails, times out or runs past
    ///   the deadline. Later stages are not attempted.
    /// * [`ReportError::MalformedGeneration`] when a completion is not JSON or does not match its
    ///   schema.
    /// * [`ReportError::PersistenceFailure`] when the record cannot be written.
    #[tracing::instrument(skip_all, fields(oracle = self.oracle.name()))]
    pub async fn generate_report(&self, transcript: &str) -> ReportResult<GeneratedReport> {
        let transcript = NonEmptyText::new(transcript)
            .map_err(|_| ReportError::InvalidInput("transcript cannot be empty".into()))?;
        let transcript = transcript.as_str();

        let _permit = self.admission.acquire().await.map_err(|_| {
            ReportError::OracleUnavailable {
                stage: Stage::SoapNote,
                source: OracleError::Request("admission closed".into()),
            }
        })?;
        let deadline = Instant::now() + self.cfg.deadline;

        tracing::info!(stage = %Stage::SoapNote, "requesting completion");
        let soap_raw = self
            .call_oracle(Stage::SoapNote, &prompts::soap_prompt(transcript), deadline)
            .await?;

        tracing::info!(stage = %Stage::Diagnosis, "requesting completion");
        let diagnosis_raw = self
            .call_oracle(
                Stage::Diagnosis,
                &prompts::diagnosis_prompt(&soap_raw),
                deadline,
            )
            .await?;

        tracing::info!(stage = %Stage::Title, "requesting completion");
        let title_raw = self
            .call_oracle(Stage::Title, &prompts::title_prompt(transcript), deadline)
            .await?;

        let (soap_text, soap) = parse_document::<SoapNote>(Stage::SoapNote, &soap_raw)?;
        let (diagnosis_text, diagnosis) =
            parse_document::<DifferentialDiagnosisDocument>(Stage::Diagnosis, &diagnosis_raw)?;

        let report = Report::new(
            clean_title(&title_raw),
            transcript.to_string(),
            soap_text,
            diagnosis_text,
        );
        self.store.insert(&report)?;

        tracing::info!(report_id = %report.id, title = %report.title, "report stored");

        Ok(GeneratedReport {
            report,
            soap,
            diagnosis,
        })
    }

    /// # Errors
    ///
    /// Returns [`ReportError::NotFound`] for an unknown or malformed id.
    pub fn get_report(&self, id: &str) -> ReportResult<Report> {
        let report_id = parse_report_id(id)?;
        self.store
            .get(&report_id)?
            .ok_or_else(|| ReportError::NotFound(id.to_string()))
    }

    /// Every stored report, newest first.
    pub fn list_reports(&self) -> ReportResult<Vec<Report>> {
        let mut reports = self.store.list()?;
        reports.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(reports)
    }

    /// # Errors
    ///
    /// Returns [`ReportError::NotFound`] if nothing is stored under `id`.
    pub fn delete_report(&self, id: &str) -> ReportResult<()> {
        let report_id = parse_report_id(id)?;
        if self.store.delete(&report_id)? {
            tracing::info!(report_id = %report_id, "report deleted");
            Ok(())
        } else {
            Err(ReportError::NotFound(id.to_string()))
        }
    }

    /// Stored report rendered as a Markdown document.
    pub fn render_markdown(&self, id: &str) -> ReportResult<String> {
        let report = self.get_report(id)?;
        markdown::render_report(&report)
    }

    /// One stage's completion, bounded by the per-call timeout and the run deadline.
    ///
    /// Transient failures are retried up to `max_attempts` with exponential backoff; the backoff
    /// never sleeps past the deadline.
    async fn call_oracle(
        &self,
        stage: Stage,
        prompt: &str,
        deadline: Instant,
    ) -> ReportResult<String> {
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;

            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(ReportError::OracleUnavailable {
                    stage,
                    source: OracleError::DeadlineExceeded,
                });
            }

            let deadline_bound = remaining <= self.cfg.call_timeout;
            let budget = remaining.min(self.cfg.call_timeout);

            let outcome = match tokio::time::timeout(budget, self.oracle.complete(prompt)).await {
                Ok(result) => result,
                Err(_) if deadline_bound => Err(OracleError::DeadlineExceeded),
                Err(_) => Err(OracleError::Timeout),
            };

            match outcome {
                Ok(text) => return Ok(text),
                Err(err) if err.is_retryable() && attempt < self.cfg.max_attempts => {
                    let delay = backoff_delay(self.cfg.retry_backoff, attempt - 1)
                        .min(deadline.saturating_duration_since(Instant::now()));
                    tracing::warn!(
                        stage = %stage,
                        attempt,
                        max_attempts = self.cfg.max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "oracle call failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(err) => {
                    return Err(ReportError::OracleUnavailable { stage, source: err });
                }
            }
        }
    }
}

/// Backoff before retry number `retry + 1`: `base * 2^retry`, capped, plus up to 25% jitter.
fn backoff_delay(base: Duration, retry: u32) -> Duration {
    let scaled = base.saturating_mul(2u32.saturating_pow(retry));
    let capped = scaled.min(Duration::from_millis(MAX_RETRY_BACKOFF_MS));
    let jitter_ms = fastrand::u64(0..=capped.as_millis() as u64 / 4);
    capped + Duration::from_millis(jitter_ms)
}

/// Sanitise, parse and schema-check one completion.
///
/// Returns the sanitised text (what gets stored) and the parsed document (what gets returned).
fn parse_document<T: DeserializeOwned>(
    stage: Stage,
    raw: &str,
) -> ReportResult<(String, serde_json::Value)> {
    let text = strip_code_fences(raw);

    let value: serde_json::Value =
        serde_json::from_str(&text).map_err(|e| ReportError::MalformedGeneration {
            stage,
            reason: format!("not valid JSON: {e}"),
        })?;

    validate_document::<T>(&value).map_err(|e| ReportError::MalformedGeneration {
        stage,
        reason: e.to_string(),
    })?;

    Ok((text, value))
}

fn parse_report_id(id: &str) -> ReportResult<ReportId> {
    ReportId::parse(id.trim()).map_err(|_| ReportError::NotFound(id.to_string()))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::oracle::ScriptedOracle;
    use crate::store::MemoryReportStore;

    pub(crate) const HEADACHE: &str = "Patient reports headache for 3 days, worse in morning.";

    pub(crate) const SOAP_JSON: &str = r#"{
  "Subjective": {
    "Chief_Complaint": "Headache for 3 days",
    "History_of_Present_Illness": {
      "Duration": "3 days",
      "Symptoms": ["Headache"],
      "Aggravating_Factors": ["Morning"],
      "Relieving_Factors": [],
      "Associated_Symptoms": []
    },
    "Past_Medical_History": [],
    "Social_History": {
      "Smoking_Status": "",
      "Alcohol_Use": "",
      "Occupation": "",
      "Other_Relevant_Habits": ""
    },
    "Review_of_Systems": {
      "General": [],
      "Respiratory": [],
      "Cardiovascular": [],
      "Gastrointestinal": [],
      "Neurological": ["Headache"],
      "Other": []
    }
  },
  "Objective": {
    "Vital_Signs": {
      "Temperature": "",
      "Blood_Pressure": "",
      "Heart_Rate": "",
      "Respiratory_Rate": "",
      "Oxygen_Saturation": ""
    },
    "Physical_Exam": {
      "General": "",
      "Respiratory": "",
      "Cardiac": "",
      "Lymph_Nodes": "",
      "Other_Findings": ""
    },
    "Initial_Diagnostic_Workup_Ordered": []
  },
  "Assessment_and_Plan": {
    "Assessment": "Likely tension-type headache",
    "Plan": {
      "Diagnosis": "Tension headache",
      "Treatment_Plan": ["Analgesia", "Sleep hygiene"],
      "Follow_Up": "2 weeks"
    }
  }
}"#;

    pub(crate) const DIAGNOSIS_JSON: &str = r#"{
  "Differential_Diagnosis": {
    "Primary_Diagnosis": {
      "Condition": "Tension headache",
      "Next_Steps": ["Headache diary"]
    },
    "Alternative_Diagnoses": [
      { "Condition": "Migraine", "Next_Steps": ["Trial of triptan"] },
      { "Condition": "Sleep apnoea", "Next_Steps": ["Sleep study"] },
      { "Condition": "Hypertension", "Next_Steps": ["Blood pressure check"] },
      { "Condition": "Medication overuse headache", "Next_Steps": ["Review analgesic use"] }
    ]
  }
}"#;

    pub(crate) fn service_with(oracle: Arc<ScriptedOracle>, cfg: PipelineConfig) -> ReportService {
        ReportService::new(oracle, Arc::new(MemoryReportStore::new()), cfg)
    }

    fn fast_config() -> PipelineConfig {
        PipelineConfig {
            call_timeout: Duration::from_secs(5),
            deadline: Duration::from_secs(10),
            max_attempts: 1,
            retry_backoff: Duration::from_millis(1),
            max_concurrency: 2,
        }
    }

    fn happy_oracle() -> Arc<ScriptedOracle> {
        Arc::new(ScriptedOracle::from_texts([
            format!("```json\n{SOAP_JSON}\n```"),
            DIAGNOSIS_JSON.to_string(),
            "Tension Headache".to_string(),
        ]))
    }

    #[tokio::test]
    async fn test_headache_scenario_produces_and_stores_report() {
        let oracle = happy_oracle();
        let service = service_with(oracle.clone(), fast_config());

        let generated = service.generate_report(HEADACHE).await.unwrap();

        assert_eq!(generated.report.title, "Tension Headache");
        assert_eq!(
            generated.soap["Subjective"]["Chief_Complaint"],
            "Headache for 3 days"
        );
        assert!(generated.diagnosis["Differential_Diagnosis"]["Primary_Diagnosis"].is_object());
        assert_eq!(oracle.calls(), 3);

        let stored = service.get_report(&generated.report.id.to_string()).unwrap();
        assert_eq!(stored.title, "Tension Headache");
        assert_eq!(stored.transcript, HEADACHE);
    }

    #[tokio::test]
    async fn test_stored_documents_parse_deep_equal_to_returned() {
        let service = service_with(happy_oracle(), fast_config());

        let generated = service.generate_report(HEADACHE).await.unwrap();
        let stored = service.get_report(&generated.report.id.to_string()).unwrap();

        assert_eq!(stored.soap_document().unwrap(), generated.soap);
        assert_eq!(stored.diagnosis_document().unwrap(), generated.diagnosis);
        assert!(!stored.soap_note.contains("```"));
    }

    #[tokio::test]
    async fn test_prompts_chain_soap_output_and_transcript() {
        let oracle = happy_oracle();
        let service = service_with(oracle.clone(), fast_config());

        service.generate_report(HEADACHE).await.unwrap();

        let prompts = oracle.prompts();
        assert_eq!(prompts.len(), 3);
        assert!(prompts[0].ends_with(HEADACHE));
        assert!(prompts[1].contains(&format!("```json\n{SOAP_JSON}\n```")));
        assert!(prompts[2].ends_with(HEADACHE));
    }

    #[tokio::test]
    async fn test_blank_transcript_is_rejected_without_oracle_calls() {
        let oracle = happy_oracle();
        let service = service_with(oracle.clone(), fast_config());

        for transcript in ["", "   \n\t "] {
            let err = service.generate_report(transcript).await.unwrap_err();
            assert!(matches!(err, ReportError::InvalidInput(_)));
        }
        assert_eq!(oracle.calls(), 0);
    }

    #[tokio::test]
    async fn test_prose_soap_note_is_malformed_and_not_persisted() {
        let oracle = Arc::new(ScriptedOracle::from_texts([
            "I'm sorry, I can't help with that.",
            DIAGNOSIS_JSON,
            "Headache",
        ]));
        let service = service_with(oracle, fast_config());

        let err = service.generate_report(HEADACHE).await.unwrap_err();

        assert!(matches!(
            err,
            ReportError::MalformedGeneration {
                stage: Stage::SoapNote,
                ..
            }
        ));
        assert!(service.list_reports().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_schema_violation_names_the_path() {
        let oracle = Arc::new(ScriptedOracle::from_texts([
            SOAP_JSON,
            r#"{"Differential_Diagnosis": {"Primary_Diagnosis": {"Condition": "X"}}}"#,
            "Headache",
        ]));
        let service = service_with(oracle, fast_config());

        let err = service.generate_report(HEADACHE).await.unwrap_err();

        match err {
            ReportError::MalformedGeneration { stage, reason } => {
                assert_eq!(stage, Stage::Diagnosis);
                assert!(reason.contains("Differential_Diagnosis.Primary_Diagnosis"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(service.list_reports().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_numeric_and_null_leaves_are_accepted() {
        let mut soap: serde_json::Value = serde_json::from_str(SOAP_JSON).unwrap();
        soap["Objective"]["Vital_Signs"]["Heart_Rate"] = serde_json::json!(88);
        soap["Subjective"]["Social_History"]["Occupation"] = serde_json::Value::Null;
        let oracle = Arc::new(ScriptedOracle::from_texts([
            soap.to_string(),
            DIAGNOSIS_JSON.to_string(),
            "Tension Headache".to_string(),
        ]));
        let service = service_with(oracle, fast_config());

        let generated = service.generate_report(HEADACHE).await.unwrap();

        assert_eq!(generated.soap["Objective"]["Vital_Signs"]["Heart_Rate"], 88);
        assert!(generated.soap["Subjective"]["Social_History"]["Occupation"].is_null());
        assert_eq!(service.list_reports().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_admission_serialises_runs_beyond_capacity() {
        let oracle = Arc::new(
            ScriptedOracle::from_texts([
                SOAP_JSON,
                DIAGNOSIS_JSON,
                "First",
                SOAP_JSON,
                DIAGNOSIS_JSON,
                "Second",
            ])
            .with_delay(Duration::from_millis(20)),
        );
        let cfg = PipelineConfig {
            max_concurrency: 1,
            ..fast_config()
        };
        let service = service_with(oracle.clone(), cfg);

        const A: &str = "Patient A reports cough.";
        const B: &str = "Patient B reports rash.";
        let (a, b) = tokio::join!(service.generate_report(A), service.generate_report(B));
        a.unwrap();
        b.unwrap();

        // Each run's three calls are contiguous: soap, diagnosis, title, then the next run.
        let seen = oracle.prompts();
        assert_eq!(seen.len(), 6);
        for run in seen.chunks(3) {
            assert!(run[0].starts_with(prompts::SOAP_INSTRUCTIONS));
            assert!(run[1].starts_with(prompts::DIAGNOSIS_INSTRUCTIONS));
            assert!(run[2].starts_with(prompts::TITLE_INSTRUCTIONS));
        }
        let (first, second) = if seen[0].ends_with(A) { (A, B) } else { (B, A) };
        assert!(seen[2].ends_with(first));
        assert!(seen[3].ends_with(second));
        assert!(seen[5].ends_with(second));
    }

    #[tokio::test]
    async fn test_transport_error_short_circuits_later_stages() {
        let oracle = Arc::new(ScriptedOracle::new([
            Err(OracleError::Request("connection refused".into())),
            Ok(DIAGNOSIS_JSON.to_string()),
            Ok("Headache".to_string()),
        ]));
        let service = service_with(oracle.clone(), fast_config());

        let err = service.generate_report(HEADACHE).await.unwrap_err();

        assert!(matches!(
            err,
            ReportError::OracleUnavailable {
                stage: Stage::SoapNote,
                source: OracleError::Request(_)
            }
        ));
        assert_eq!(oracle.calls(), 1);
        assert!(service.list_reports().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_per_call_timeout_is_oracle_unavailable() {
        let oracle = Arc::new(
            ScriptedOracle::from_texts([SOAP_JSON, DIAGNOSIS_JSON, "Headache"])
                .with_delay(Duration::from_millis(200)),
        );
        let cfg = PipelineConfig {
            call_timeout: Duration::from_millis(20),
            ..fast_config()
        };
        let service = service_with(oracle.clone(), cfg);

        let err = service.generate_report(HEADACHE).await.unwrap_err();

        assert!(matches!(
            err,
            ReportError::OracleUnavailable {
                stage: Stage::SoapNote,
                source: OracleError::Timeout
            }
        ));
        assert_eq!(oracle.calls(), 1);
    }

    #[tokio::test]
    async fn test_deadline_caps_the_whole_run() {
        let oracle = Arc::new(
            ScriptedOracle::from_texts([SOAP_JSON, DIAGNOSIS_JSON, "Headache"])
                .with_delay(Duration::from_millis(60)),
        );
        let cfg = PipelineConfig {
            call_timeout: Duration::from_secs(5),
            deadline: Duration::from_millis(100),
            ..fast_config()
        };
        let service = service_with(oracle.clone(), cfg);

        let err = service.generate_report(HEADACHE).await.unwrap_err();

        assert!(matches!(
            err,
            ReportError::OracleUnavailable {
                stage: Stage::Diagnosis,
                source: OracleError::DeadlineExceeded
            }
        ));
        assert_eq!(oracle.calls(), 2);
    }

    #[tokio::test]
    async fn test_retry_recovers_from_transient_failure() {
        let oracle = Arc::new(ScriptedOracle::new([
            Err(OracleError::Status {
                status: 503,
                body: "overloaded".into(),
            }),
            Ok(SOAP_JSON.to_string()),
            Ok(DIAGNOSIS_JSON.to_string()),
            Ok("Tension Headache".to_string()),
        ]));
        let cfg = PipelineConfig {
            max_attempts: 2,
            ..fast_config()
        };
        let service = service_with(oracle.clone(), cfg);

        let generated = service.generate_report(HEADACHE).await.unwrap();

        assert_eq!(generated.report.title, "Tension Headache");
        assert_eq!(oracle.calls(), 4);
    }

    #[tokio::test]
    async fn test_non_retryable_failure_is_not_retried() {
        let oracle = Arc::new(ScriptedOracle::new([
            Err(OracleError::MissingApiKey),
            Ok(SOAP_JSON.to_string()),
        ]));
        let cfg = PipelineConfig {
            max_attempts: 3,
            ..fast_config()
        };
        let service = service_with(oracle.clone(), cfg);

        assert!(service.generate_report(HEADACHE).await.is_err());
        assert_eq!(oracle.calls(), 1);
    }

    #[tokio::test]
    async fn test_delete_then_get_is_not_found() {
        let service = service_with(happy_oracle(), fast_config());
        let id = service
            .generate_report(HEADACHE)
            .await
            .unwrap()
            .report
            .id
            .to_string();

        service.delete_report(&id).unwrap();

        assert!(matches!(
            service.get_report(&id),
            Err(ReportError::NotFound(_))
        ));
        assert!(matches!(
            service.delete_report(&id),
            Err(ReportError::NotFound(_))
        ));
    }

    #[test]
    fn test_malformed_id_is_not_found() {
        let service = service_with(happy_oracle(), fast_config());

        assert!(matches!(
            service.get_report("not-an-id"),
            Err(ReportError::NotFound(_))
        ));
        assert!(matches!(
            service.delete_report("../../etc"),
            Err(ReportError::NotFound(_))
        ));
    }

    #[test]
    fn test_list_reports_is_newest_first() {
        let store = Arc::new(MemoryReportStore::new());
        let mut older = Report::new("Older".into(), "t".into(), "{}".into(), "{}".into());
        older.timestamp -= chrono::Duration::minutes(5);
        let newer = Report::new("Newer".into(), "t".into(), "{}".into(), "{}".into());
        store.insert(&older).unwrap();
        store.insert(&newer).unwrap();
        let service = ReportService::new(happy_oracle(), store, fast_config());

        let titles: Vec<String> = service
            .list_reports()
            .unwrap()
            .into_iter()
            .map(|r| r.title)
            .collect();

        assert_eq!(titles, vec!["Newer", "Older"]);
    }

    #[test]
    fn test_backoff_grows_and_is_capped() {
        let base = Duration::from_millis(100);

        let first = backoff_delay(base, 0);
        assert!(first >= base && first <= base + base / 4);

        let third = backoff_delay(base, 2);
        assert!(third >= Duration::from_millis(400));

        let capped = backoff_delay(base, 20);
        let max = Duration::from_millis(MAX_RETRY_BACKOFF_MS);
        assert!(capped >= max && capped <= max + max / 4);
    }
}
