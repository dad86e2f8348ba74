//! # MediWhisper types
//!
//! Validated primitives and the clinical document schemas that the report pipeline expects the
//! oracle to produce.
//!
//! - [`NonEmptyText`] guards transcripts and titles against blank input.
//! - [`soap`] and [`diagnosis`] describe the declared JSON layouts. They are used to check that a
//!   generated document carries every required key with the right object or list shape. Scalar
//!   values are [`Leaf`]s and may be any JSON scalar. Callers keep working with the parsed
//!   `serde_json::Value` so extra keys survive untouched.

pub mod diagnosis;
mod leaf;
pub mod soap;

pub use diagnosis::{DiagnosisCandidate, DifferentialDiagnosis, DifferentialDiagnosisDocument};
pub use leaf::Leaf;
pub use soap::SoapNote;

/// Errors that can occur when creating validated text types.
#[derive(Debug, thiserror::Error)]
pub enum TextError {
    /// The input text was empty or contained only whitespace
    #[error("Text cannot be empty")]
    Empty,
}

/// A string type that guarantees non-empty content.
///
/// The input is trimmed of leading and trailing whitespace during construction, so a transcript
/// of only spaces and newlines is rejected the same way as an empty one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NonEmptyText(String);

impl NonEmptyText {
    /// Creates a new `NonEmptyText` from the given input.
    ///
    /// # Errors
    ///
    /// Returns [`TextError::Empty`] if the trimmed input is empty.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TextError::Empty);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the inner string as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the wrapper and returns the owned string.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl std::fmt::Display for NonEmptyText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for NonEmptyText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl serde::Serialize for NonEmptyText {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for NonEmptyText {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NonEmptyText::new(&s).map_err(serde::de::Error::custom)
    }
}

/// A document that did not match its declared schema.
///
/// `path` is the dotted location of the first offending field (`<root>` when the document itself
/// has the wrong shape), as reported by `serde_path_to_error`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("schema mismatch at {path}: {reason}")]
pub struct SchemaError {
    pub path: String,
    pub reason: String,
}

/// Strictly checks `value` against the schema type `T`.
///
/// The value is only borrowed; a successful check returns the typed view so callers can inspect
/// it, but the pipeline itself only cares that the check passed.
///
/// # Errors
///
/// Returns [`SchemaError`] naming the first missing or mistyped field.
pub fn validate_document<'de, T>(value: &'de serde_json::Value) -> Result<T, SchemaError>
where
    T: serde::Deserialize<'de>,
{
    match serde_path_to_error::deserialize::<_, T>(value) {
        Ok(parsed) => Ok(parsed),
        Err(err) => {
            let path = err.path().to_string();
            let path = if path.is_empty() || path == "." {
                "<root>".to_string()
            } else {
                path
            };
            Err(SchemaError {
                path,
                reason: err.into_inner().to_string(),
            })
        }
    }
}
