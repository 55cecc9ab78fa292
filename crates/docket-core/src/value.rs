//! Typed front-matter values.
//!
//! Every configurable field is converted from `serde_yaml::Value` into a
//! [`FieldValue`] exactly once, when the document is parsed. Validators,
//! resolvers and fixers then switch on the variant instead of inspecting
//! untyped YAML.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

// ---------------------------------------------------------------------------
// Number
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Number {
    Int(i64),
    /// Integers above `i64::MAX`.
    UInt(u64),
    Float(f64),
}

impl Number {
    pub fn as_f64(self) -> f64 {
        match self {
            Number::Int(i) => i as f64,
            Number::UInt(u) => u as f64,
            Number::Float(f) => f,
        }
    }

    /// Parse a number from text, preferring an integer representation.
    pub fn parse(s: &str) -> Option<Number> {
        let s = s.trim();
        if let Ok(i) = s.parse::<i64>() {
            return Some(Number::Int(i));
        }
        if let Ok(u) = s.parse::<u64>() {
            return Some(Number::UInt(u));
        }
        s.parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .map(Number::Float)
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int(i) => write!(f, "{i}"),
            Number::UInt(u) => write!(f, "{u}"),
            Number::Float(x) => write!(f, "{x}"),
        }
    }
}

// ---------------------------------------------------------------------------
// FieldValue
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Sequence(Vec<FieldValue>),
    Mapping(BTreeMap<String, FieldValue>),
}

impl FieldValue {
    /// Null, a blank string, or an empty collection.
    pub fn is_empty_equivalent(&self) -> bool {
        match self {
            FieldValue::Null => true,
            FieldValue::String(s) => s.trim().is_empty(),
            FieldValue::Sequence(items) => items.is_empty(),
            FieldValue::Mapping(map) => map.is_empty(),
            FieldValue::Bool(_) | FieldValue::Number(_) => false,
        }
    }

    pub fn is_scalar(&self) -> bool {
        !matches!(self, FieldValue::Sequence(_) | FieldValue::Mapping(_))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(n.as_f64()),
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            FieldValue::Null => "null",
            FieldValue::Bool(_) => "boolean",
            FieldValue::Number(_) => "number",
            FieldValue::String(_) => "string",
            FieldValue::Sequence(_) => "sequence",
            FieldValue::Mapping(_) => "mapping",
        }
    }

    /// Key used for array uniqueness: scalars compare by value, everything
    /// else by its string form.
    pub fn identity_key(&self) -> String {
        format!("{}:{}", self.type_name(), self)
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Null => f.write_str("null"),
            FieldValue::Bool(b) => write!(f, "{b}"),
            FieldValue::Number(n) => write!(f, "{n}"),
            FieldValue::String(s) => f.write_str(s),
            FieldValue::Sequence(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            FieldValue::Mapping(map) => {
                f.write_str("{")?;
                for (i, (k, v)) in map.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{k}: {v}")?;
                }
                f.write_str("}")
            }
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::String(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::String(s)
    }
}

impl From<i64> for FieldValue {
    fn from(i: i64) -> Self {
        FieldValue::Number(Number::Int(i))
    }
}

impl From<f64> for FieldValue {
    fn from(f: f64) -> Self {
        FieldValue::Number(Number::Float(f))
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Bool(b)
    }
}

impl<T: Into<FieldValue>> From<Vec<T>> for FieldValue {
    fn from(items: Vec<T>) -> Self {
        FieldValue::Sequence(items.into_iter().map(Into::into).collect())
    }
}

impl From<serde_yaml::Value> for FieldValue {
    fn from(value: serde_yaml::Value) -> Self {
        use serde_yaml::Value;
        match value {
            Value::Null => FieldValue::Null,
            Value::Bool(b) => FieldValue::Bool(b),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    FieldValue::Number(Number::Int(i))
                } else if let Some(u) = n.as_u64() {
                    FieldValue::Number(Number::UInt(u))
                } else {
                    FieldValue::Number(Number::Float(n.as_f64().unwrap_or(f64::NAN)))
                }
            }
            Value::String(s) => FieldValue::String(s),
            Value::Sequence(items) => {
                FieldValue::Sequence(items.into_iter().map(FieldValue::from).collect())
            }
            Value::Mapping(map) => FieldValue::Mapping(
                map.into_iter()
                    .map(|(k, v)| (FieldValue::from(k).to_string(), FieldValue::from(v)))
                    .collect(),
            ),
            Value::Tagged(tagged) => FieldValue::from(tagged.value),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_yaml_variants() {
        let yaml: serde_yaml::Value =
            serde_yaml::from_str("a: 1\nb: 2.5\nc: [x, y]\nd: ~\ne: true\nf: {g: h}\n").unwrap();
        let FieldValue::Mapping(map) = FieldValue::from(yaml) else {
            panic!("expected mapping");
        };
        assert_eq!(map["a"], FieldValue::from(1_i64));
        assert_eq!(map["b"], FieldValue::from(2.5_f64));
        assert_eq!(map["c"], FieldValue::from(vec!["x", "y"]));
        assert_eq!(map["d"], FieldValue::Null);
        assert_eq!(map["e"], FieldValue::Bool(true));
        assert!(matches!(map["f"], FieldValue::Mapping(_)));

        let big: serde_yaml::Value = serde_yaml::from_str("18446744073709551615").unwrap();
        assert_eq!(
            FieldValue::from(big),
            FieldValue::Number(Number::UInt(u64::MAX))
        );
    }

    #[test]
    fn empty_equivalence() {
        assert!(FieldValue::Null.is_empty_equivalent());
        assert!(FieldValue::from("").is_empty_equivalent());
        assert!(FieldValue::from("   ").is_empty_equivalent());
        assert!(FieldValue::Sequence(vec![]).is_empty_equivalent());
        assert!(!FieldValue::from(0_i64).is_empty_equivalent());
        assert!(!FieldValue::Bool(false).is_empty_equivalent());
        assert!(!FieldValue::from("x").is_empty_equivalent());
    }

    #[test]
    fn number_parse_prefers_int() {
        assert_eq!(Number::parse("42"), Some(Number::Int(42)));
        assert_eq!(Number::parse(" 1.5 "), Some(Number::Float(1.5)));
        assert_eq!(
            Number::parse("18446744073709551615"),
            Some(Number::UInt(u64::MAX))
        );
        assert_eq!(Number::parse("inf"), None);
        assert_eq!(Number::parse("abc"), None);
    }

    #[test]
    fn display_forms() {
        assert_eq!(FieldValue::from(vec!["a", "b"]).to_string(), "[a, b]");
        assert_eq!(FieldValue::from(3_i64).to_string(), "3");
        assert_ne!(
            FieldValue::from("1").identity_key(),
            FieldValue::from(1_i64).identity_key()
        );
    }
}
