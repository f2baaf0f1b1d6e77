//! JSON decoding and encoding of mapping nodes.
//!
//! The `Serialize` and `Deserialize` implementations for [`ScalarValue`] and
//! [`MappingNode`] live here. Deserialization goes through
//! `serde_json::Value`, so it works with any self-describing serde format.
//! JSON carries no source positions.

use crate::decode::string_node;
use crate::error::{Error, Result};
use crate::mapping::{Fields, MappingNode, NodeContent};
use crate::scalar::{Scalar, ScalarValue};
use blueprint_substitutions::{
    InterpolationParser, ParseOptions, SubstitutionParser, substitutions_to_string,
};
use serde::de::Error as _;
use serde::ser::{Error as _, SerializeMap, SerializeSeq};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Number, Value};

/// Decode a JSON document into a mapping node.
///
/// # Example
///
/// ```rust
/// use blueprint_core::json;
///
/// let node = json::decode(r#"{"ports": [80, 443]}"#).unwrap();
/// assert_eq!(node.get_field("ports").unwrap().as_items().unwrap().len(), 2);
/// ```
pub fn decode(content: &str) -> Result<MappingNode> {
    decode_with_parser(content, &InterpolationParser)
}

/// Decode a JSON document, splitting `${..}` placeholders with `parser`.
pub fn decode_with_parser(content: &str, parser: &dyn SubstitutionParser) -> Result<MappingNode> {
    let value: Value = serde_json::from_str(content)?;
    let node = node_from_value(value, parser)?;
    tracing::debug!(format = "json", root = node.kind_name(), "decoded mapping node");
    Ok(node)
}

/// Decode a JSON document holding a single scalar.
pub fn decode_scalar(content: &str) -> Result<ScalarValue> {
    let value: Value = serde_json::from_str(content)?;
    scalar_from_value(value)
}

/// Encode a mapping node as compact JSON.
///
/// A nil node anywhere in the tree fails with `MissingMappingNode`, and an
/// infinite or NaN float fails with `JsonEmit`.
pub fn encode(node: &MappingNode) -> Result<String> {
    ensure_encodable(node)?;
    serde_json::to_string(node).map_err(|err| Error::JsonEmit {
        message: err.to_string(),
        position: None,
    })
}

/// Encode a mapping node as indented JSON.
pub fn encode_pretty(node: &MappingNode) -> Result<String> {
    ensure_encodable(node)?;
    serde_json::to_string_pretty(node).map_err(|err| Error::JsonEmit {
        message: err.to_string(),
        position: None,
    })
}

/// Finds nil nodes and non-finite floats up front so the error keeps its
/// kind and position. JSON has no spelling for infinity or NaN.
fn ensure_encodable(node: &MappingNode) -> Result<()> {
    let position = || node.source_meta.as_ref().map(|meta| meta.position);
    match &node.content {
        NodeContent::Nil => Err(Error::MissingMappingNode {
            position: position(),
        }),
        NodeContent::Scalar(ScalarValue {
            value: Some(Scalar::Float(value)),
            ..
        }) if !value.is_finite() => Err(Error::JsonEmit {
            message: format!("float value {} cannot be represented in JSON", value),
            position: position(),
        }),
        NodeContent::Fields(fields) => fields.values().try_for_each(ensure_encodable),
        NodeContent::Items(items) => items.iter().try_for_each(ensure_encodable),
        NodeContent::Scalar(_) | NodeContent::StringWithSubstitutions(_) => Ok(()),
    }
}

fn node_from_value(value: Value, parser: &dyn SubstitutionParser) -> Result<MappingNode> {
    let node = match value {
        Value::Null => MappingNode::nil(),
        Value::String(text) => string_node(parser, &text, None, ParseOptions::default(), |text| {
            Scalar::String(text.to_string())
        })?,
        Value::Array(values) => MappingNode::from_items(
            values
                .into_iter()
                .map(|value| node_from_value(value, parser))
                .collect::<Result<Vec<_>>>()?,
        ),
        Value::Object(entries) => {
            let mut fields = Fields::with_capacity(entries.len());
            for (key, value) in entries {
                fields.insert(key, node_from_value(value, parser)?);
            }
            MappingNode::from_fields(fields)
        }
        Value::Bool(value) => MappingNode::from_bool(value),
        Value::Number(number) => MappingNode::from_scalar(ScalarValue::new(number_scalar(&number))),
    };
    Ok(node)
}

fn scalar_from_value(value: Value) -> Result<ScalarValue> {
    match value {
        Value::Bool(value) => Ok(ScalarValue::from_bool(value)),
        Value::Number(number) => Ok(ScalarValue::new(number_scalar(&number))),
        Value::String(text) => Ok(ScalarValue::from_string(text)),
        Value::Null | Value::Array(_) | Value::Object(_) => {
            Err(Error::MustBeScalar { position: None })
        }
    }
}

/// Integers that fit in an i64 stay integers; everything else is a float.
fn number_scalar(number: &Number) -> Scalar {
    match number.as_i64() {
        Some(value) => Scalar::Int(value),
        None => Scalar::Float(number.as_f64().unwrap_or(f64::NAN)),
    }
}

impl Serialize for ScalarValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match &self.value {
            Some(Scalar::Int(value)) => serializer.serialize_i64(*value),
            Some(Scalar::Bool(value)) => serializer.serialize_bool(*value),
            Some(Scalar::Float(value)) => serializer.serialize_f64(*value),
            Some(Scalar::String(value)) => serializer.serialize_str(value),
            None => serializer.serialize_none(),
        }
    }
}

impl<'de> Deserialize<'de> for ScalarValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        scalar_from_value(value).map_err(D::Error::custom)
    }
}

impl Serialize for MappingNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match &self.content {
            NodeContent::Nil => Err(S::Error::custom(Error::MissingMappingNode {
                position: self.source_meta.as_ref().map(|meta| meta.position),
            })),
            NodeContent::Scalar(scalar) => scalar.serialize(serializer),
            NodeContent::Fields(fields) => {
                let mut map = serializer.serialize_map(Some(fields.len()))?;
                for (key, value) in fields {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
            NodeContent::Items(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            NodeContent::StringWithSubstitutions(value) => {
                serializer.serialize_str(&substitutions_to_string(value))
            }
        }
    }
}

impl<'de> Deserialize<'de> for MappingNode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        node_from_value(value, &InterpolationParser).map_err(D::Error::custom)
    }
}
