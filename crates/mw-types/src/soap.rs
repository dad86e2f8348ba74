//! SOAP (Subjective, Objective, Assessment, Plan) note schema.
//!
//! Field names mirror the JSON keys the note instruction asks the oracle to emit, so every struct
//! renames its fields explicitly. All keys are required. Scalar fields are [`Leaf`]s, so a number or
//! `null` is accepted where text was asked for; list fields may be empty.

use crate::Leaf;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoapNote {
    #[serde(rename = "Subjective")]
    pub subjective: Subjective,
    #[serde(rename = "Objective")]
    pub objective: Objective,
    #[serde(rename = "Assessment_and_Plan")]
    pub assessment_and_plan: AssessmentAndPlan,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subjective {
    #[serde(rename = "Chief_Complaint")]
    pub chief_complaint: Leaf,
    #[serde(rename = "History_of_Present_Illness")]
    pub history_of_present_illness: PresentIllness,
    #[serde(rename = "Past_Medical_History")]
    pub past_medical_history: Vec<Leaf>,
    #[serde(rename = "Social_History")]
    pub social_history: SocialHistory,
    #[serde(rename = "Review_of_Systems")]
    pub review_of_systems: ReviewOfSystems,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresentIllness {
    #[serde(rename = "Duration")]
    pub duration: Leaf,
    #[serde(rename = "Symptoms")]
    pub symptoms: Vec<Leaf>,
    #[serde(rename = "Aggravating_Factors")]
    pub aggravating_factors: Vec<Leaf>,
    #[serde(rename = "Relieving_Factors")]
    pub relieving_factors: Vec<Leaf>,
    #[serde(rename = "Associated_Symptoms")]
    pub associated_symptoms: Vec<Leaf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialHistory {
    #[serde(rename = "Smoking_Status")]
    pub smoking_status: Leaf,
    #[serde(rename = "Alcohol_Use")]
    pub alcohol_use: Leaf,
    #[serde(rename = "Occupation")]
    pub occupation: Leaf,
    #[serde(rename = "Other_Relevant_Habits")]
    pub other_relevant_habits: Leaf,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewOfSystems {
    #[serde(rename = "General")]
    pub general: Vec<Leaf>,
    #[serde(rename = "Respiratory")]
    pub respiratory: Vec<Leaf>,
    #[serde(rename = "Cardiovascular")]
    pub cardiovascular: Vec<Leaf>,
    #[serde(rename = "Gastrointestinal")]
    pub gastrointestinal: Vec<Leaf>,
    #[serde(rename = "Neurological")]
    pub neurological: Vec<Leaf>,
    #[serde(rename = "Other")]
    pub other: Vec<Leaf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Objective {
    #[serde(rename = "Vital_Signs")]
    pub vital_signs: VitalSigns,
    #[serde(rename = "Physical_Exam")]
    pub physical_exam: PhysicalExam,
    #[serde(rename = "Initial_Diagnostic_Workup_Ordered")]
    pub initial_diagnostic_workup_ordered: Vec<Leaf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VitalSigns {
    #[serde(rename = "Temperature")]
    pub temperature: Leaf,
    #[serde(rename = "Blood_Pressure")]
    pub blood_pressure: Leaf,
    #[serde(rename = "Heart_Rate")]
    pub heart_rate: Leaf,
    #[serde(rename = "Respiratory_Rate")]
    pub respiratory_rate: Leaf,
    #[serde(rename = "Oxygen_Saturation")]
    pub oxygen_saturation: Leaf,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhysicalExam {
    #[serde(rename = "General")]
    pub general: Leaf,
    #[serde(rename = "Respiratory")]
    pub respiratory: Leaf,
    #[serde(rename = "Cardiac")]
    pub cardiac: Leaf,
    #[serde(rename = "Lymph_Nodes")]
    pub lymph_nodes: Leaf,
    #[serde(rename = "Other_Findings")]
    pub other_findings: Leaf,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssessmentAndPlan {
    #[serde(rename = "Assessment")]
    pub assessment: Leaf,
    #[serde(rename = "Plan")]
    pub plan: Plan,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    #[serde(rename = "Diagnosis")]
    pub diagnosis: Leaf,
    #[serde(rename = "Treatment_Plan")]
    pub treatment_plan: Vec<Leaf>,
    #[serde(rename = "Follow_Up")]
    pub follow_up: Leaf,
}
