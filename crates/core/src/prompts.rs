//! Instruction templates for the three completion stages.
//!
//! Each prompt is the fixed instruction text followed directly by the stage input. The JSON
//! layouts embedded here must stay in step with `mw_types::soap` and `mw_types::diagnosis`, which
//! validate what comes back.

/// Stage 1 instructions: consultation transcript to SOAP note JSON.
pub const SOAP_INSTRUCTIONS: &str = r#"
You are an expert medical assistant. Produce a structured SOAP (Subjective, Objective, Assessment, Plan) note in JSON from the patient-doctor conversation below.

Rules:
1. Extract only clinically relevant details from the conversation.
2. Organise them into the SOAP layout shown.
3. Reply with JSON only, no commentary and no extra text.
4. Use proper medical terminology.
5. Keep every key; use "" or [] when the conversation gives no information.

JSON layout:
{
  "Subjective": {
    "Chief_Complaint": "",
    "History_of_Present_Illness": {
      "Duration": "",
      "Symptoms": [],
      "Aggravating_Factors": [],
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
      "Neurological": [],
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
    "Assessment": "",
    "Plan": {
      "Diagnosis": "",
      "Treatment_Plan": [],
      "Follow_Up": ""
    }
  }
}

Conversation:
"#;

/// Stage 2 instructions: SOAP note to differential diagnosis JSON.
pub const DIAGNOSIS_INSTRUCTIONS: &str = r#"
You are an expert medical assistant. Produce a structured differential diagnosis in JSON from the SOAP note below.

Rules:
1. Base the diagnosis only on details in the SOAP note.
2. Give one primary diagnosis and four alternatives, each with suggested next steps.
3. Reply with JSON only, no commentary and no extra text.
4. Use proper medical terminology.

JSON layout:
{
  "Differential_Diagnosis": {
    "Primary_Diagnosis": {
      "Condition": "",
      "Next_Steps": []
    },
    "Alternative_Diagnoses": [
      { "Condition": "", "Next_Steps": [] },
      { "Condition": "", "Next_Steps": [] },
      { "Condition": "", "Next_Steps": [] },
      { "Condition": "", "Next_Steps": [] }
    ]
  }
}

SOAP note:
"#;

/// Stage 3 instructions: transcript to a one-line title.
pub const TITLE_INSTRUCTIONS: &str = "\nProvide a single, concise title that accurately describes \
the patient's condition based on the following transcript. Reply with the title only.\n\n";

pub fn soap_prompt(transcript: &str) -> String {
    format!("{SOAP_INSTRUCTIONS}{transcript}")
}

/// The diagnosis stage is chained off the raw SOAP completion, not the transcript.
pub fn diagnosis_prompt(soap_raw: &str) -> String {
    format!("{DIAGNOSIS_INSTRUCTIONS}{soap_raw}")
}

pub fn title_prompt(transcript: &str) -> String {
    format!("{TITLE_INSTRUCTIONS}{transcript}")
}
