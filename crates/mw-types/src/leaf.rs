//! Scalar leaf of a generated clinical document.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;

/// Any JSON scalar: string, number, boolean or null.
///
/// Models are told to fill text fields with strings, but regularly answer `"Heart_Rate": 88` or
/// `"Occupation": null`. Those are still usable notes, so a leaf accepts every scalar and only
/// rejects objects and arrays, which would mean the document has the wrong shape.
///
/// A leaf is still required: a missing key fails deserialisation like any other field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Leaf(Value);

impl Leaf {
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// The text, if the leaf is a string.
    pub fn as_str(&self) -> Option<&str> {
        self.0.as_str()
    }

    /// `null` or a blank string.
    pub fn is_empty(&self) -> bool {
        match &self.0 {
            Value::Null => true,
            Value::String(s) => s.trim().is_empty(),
            _ => false,
        }
    }
}

impl fmt::Display for Leaf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Value::Null => Ok(()),
            Value::String(s) => f.write_str(s),
            other => write!(f, "{other}"),
        }
    }
}

impl PartialEq<str> for Leaf {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == Some(other)
    }
}

impl PartialEq<&str> for Leaf {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == Some(*other)
    }
}

impl Serialize for Leaf {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Leaf {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Value::deserialize(deserializer)? {
            Value::Object(_) => Err(serde::de::Error::custom(
                "invalid type: object, expected a scalar value",
            )),
            Value::Array(_) => Err(serde::de::Error::custom(
                "invalid type: array, expected a scalar value",
            )),
            scalar => Ok(Leaf(scalar)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accepts_every_scalar() {
        for value in [json!("88 bpm"), json!(88), json!(37.2), json!(true), json!(null)] {
            let leaf: Leaf = serde_json::from_value(value.clone()).unwrap();
            assert_eq!(leaf.as_value(), &value);
        }
    }

    #[test]
    fn rejects_containers() {
        assert!(serde_json::from_value::<Leaf>(json!({"bpm": 88})).is_err());
        assert!(serde_json::from_value::<Leaf>(json!(["88"])).is_err());
    }

    #[test]
    fn empty_means_null_or_blank() {
        assert!(Leaf(json!(null)).is_empty());
        assert!(Leaf(json!("  ")).is_empty());
        assert!(!Leaf(json!(0)).is_empty());
    }

    #[test]
    fn display_prints_text_without_quotes() {
        assert_eq!(Leaf(json!("Migraine")).to_string(), "Migraine");
        assert_eq!(Leaf(json!(88)).to_string(), "88");
        assert_eq!(Leaf(json!(null)).to_string(), "");
    }
}
