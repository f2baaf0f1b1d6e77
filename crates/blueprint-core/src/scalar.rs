//! Scalar values: integers, floats, booleans and strings.

use blueprint_source_map::SourceMeta;
use serde::{Deserialize, Serialize};

/// The type tag of a scalar value, as declared in config field definitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalarType {
    String,
    Integer,
    Float,
    Boolean,
}

impl std::fmt::Display for ScalarType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ScalarType::String => "string",
            ScalarType::Integer => "integer",
            ScalarType::Float => "float",
            ScalarType::Boolean => "boolean",
        };
        f.write_str(name)
    }
}

/// The value held by a non-empty scalar.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Int(i64),
    Float(f64),
    Bool(bool),
    String(String),
}

impl Scalar {
    pub fn scalar_type(&self) -> ScalarType {
        match self {
            Scalar::Int(_) => ScalarType::Integer,
            Scalar::Float(_) => ScalarType::Float,
            Scalar::Bool(_) => ScalarType::Boolean,
            Scalar::String(_) => ScalarType::String,
        }
    }

    /// Interpret the text of an untyped scalar token.
    ///
    /// Text without a decimal point is tried as an integer first, then as a
    /// boolean, then as a float. Anything else is a string.
    pub fn from_text(text: &str) -> Scalar {
        if !text.contains('.') {
            if let Some(int) = parse_int(text) {
                return Scalar::Int(int);
            }
        }
        if let Some(boolean) = parse_bool(text) {
            return Scalar::Bool(boolean);
        }
        if let Some(float) = parse_float(text) {
            return Scalar::Float(float);
        }
        Scalar::String(text.to_string())
    }
}

impl std::fmt::Display for Scalar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Scalar::Int(value) => write!(f, "{}", value),
            Scalar::Float(value) => write!(f, "{}", value),
            Scalar::Bool(value) => write!(f, "{}", value),
            Scalar::String(value) => f.write_str(value),
        }
    }
}

/// A scalar in a blueprint document.
///
/// `value` is `None` for the empty scalar, which is distinct from the zero
/// value of any type. Derived equality compares source positions too; use
/// [`ScalarValue::equal`] to compare values only.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ScalarValue {
    pub value: Option<Scalar>,
    pub source_meta: Option<SourceMeta>,
}

impl ScalarValue {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn new(value: Scalar) -> Self {
        Self {
            value: Some(value),
            source_meta: None,
        }
    }

    pub fn from_int(value: i64) -> Self {
        Self::new(Scalar::Int(value))
    }

    pub fn from_float(value: f64) -> Self {
        Self::new(Scalar::Float(value))
    }

    pub fn from_bool(value: bool) -> Self {
        Self::new(Scalar::Bool(value))
    }

    pub fn from_string(value: impl Into<String>) -> Self {
        Self::new(Scalar::String(value.into()))
    }

    /// Parse untyped scalar text, see [`Scalar::from_text`].
    pub fn from_text(text: &str) -> Self {
        Self::new(Scalar::from_text(text))
    }

    pub fn with_source_meta(mut self, source_meta: Option<SourceMeta>) -> Self {
        self.source_meta = source_meta;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_none()
    }

    /// Type of the held value, `None` for the empty scalar.
    pub fn scalar_type(&self) -> Option<ScalarType> {
        self.value.as_ref().map(Scalar::scalar_type)
    }

    pub fn as_int(&self) -> Option<i64> {
        match self.value {
            Some(Scalar::Int(value)) => Some(value),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self.value {
            Some(Scalar::Float(value)) => Some(value),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self.value {
            Some(Scalar::Bool(value)) => Some(value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match &self.value {
            Some(Scalar::String(value)) => Some(value),
            _ => None,
        }
    }

    /// Value equality, ignoring source positions.
    ///
    /// Values of different types are never equal, and an empty scalar is not
    /// equal to anything (including another empty scalar).
    pub fn equal(&self, other: &ScalarValue) -> bool {
        match (&self.value, &other.value) {
            (Some(Scalar::Int(a)), Some(Scalar::Int(b))) => a == b,
            (Some(Scalar::Float(a)), Some(Scalar::Float(b))) => a == b,
            (Some(Scalar::Bool(a)), Some(Scalar::Bool(b))) => a == b,
            (Some(Scalar::String(a)), Some(Scalar::String(b))) => a == b,
            _ => false,
        }
    }
}

impl std::fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.value {
            Some(value) => value.fmt(f),
            None => Ok(()),
        }
    }
}

impl From<i64> for ScalarValue {
    fn from(value: i64) -> Self {
        ScalarValue::from_int(value)
    }
}

impl From<f64> for ScalarValue {
    fn from(value: f64) -> Self {
        ScalarValue::from_float(value)
    }
}

impl From<bool> for ScalarValue {
    fn from(value: bool) -> Self {
        ScalarValue::from_bool(value)
    }
}

impl From<&str> for ScalarValue {
    fn from(value: &str) -> Self {
        ScalarValue::from_string(value)
    }
}

impl From<String> for ScalarValue {
    fn from(value: String) -> Self {
        ScalarValue::from_string(value)
    }
}

/// The string held by `scalar`, or an empty string.
pub fn string_value_from_scalar(scalar: Option<&ScalarValue>) -> String {
    scalar
        .and_then(ScalarValue::as_str)
        .map(str::to_string)
        .unwrap_or_default()
}

/// The integer held by `scalar`, or 0.
pub fn int_value_from_scalar(scalar: Option<&ScalarValue>) -> i64 {
    scalar.and_then(ScalarValue::as_int).unwrap_or_default()
}

/// The float held by `scalar`, or 0.0.
pub fn float_value_from_scalar(scalar: Option<&ScalarValue>) -> f64 {
    scalar.and_then(ScalarValue::as_float).unwrap_or_default()
}

/// The boolean held by `scalar`, or false.
pub fn bool_value_from_scalar(scalar: Option<&ScalarValue>) -> bool {
    scalar.and_then(ScalarValue::as_bool).unwrap_or_default()
}

fn parse_int(text: &str) -> Option<i64> {
    text.parse::<i64>().ok()
}

fn parse_bool(text: &str) -> Option<bool> {
    match text {
        "true" | "True" | "TRUE" => Some(true),
        "false" | "False" | "FALSE" => Some(false),
        _ => None,
    }
}

/// Decimal and exponent notation plus the YAML spellings of infinity and NaN.
///
/// Words such as "inf" or "nan" stay strings; `str::parse::<f64>` alone
/// would accept them. Only spellings the YAML emitter quotes are read as
/// floats, so `+.inf` stays a string.
fn parse_float(text: &str) -> Option<f64> {
    match text {
        ".inf" | ".Inf" | ".INF" => return Some(f64::INFINITY),
        "-.inf" | "-.Inf" | "-.INF" => return Some(f64::NEG_INFINITY),
        ".nan" | ".NaN" | ".NAN" => return Some(f64::NAN),
        _ => {}
    }
    if text
        .chars()
        .any(|ch| ch.is_ascii_alphabetic() && ch != 'e' && ch != 'E')
    {
        return None;
    }
    text.parse::<f64>().ok()
}
