//! Differential diagnosis schema: one primary candidate plus any number of alternatives.

use crate::Leaf;
use serde::{Deserialize, Serialize};

/// Top-level wrapper; the oracle nests everything under `Differential_Diagnosis`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DifferentialDiagnosisDocument {
    #[serde(rename = "Differential_Diagnosis")]
    pub differential_diagnosis: DifferentialDiagnosis,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DifferentialDiagnosis {
    #[serde(rename = "Primary_Diagnosis")]
    pub primary_diagnosis: DiagnosisCandidate,
    #[serde(rename = "Alternative_Diagnoses")]
    pub alternative_diagnoses: Vec<DiagnosisCandidate>,
}

/// A candidate condition with suggested next steps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosisCandidate {
    #[serde(rename = "Condition")]
    pub condition: Leaf,
    #[serde(rename = "Next_Steps")]
    pub next_steps: Vec<Leaf>,
}
