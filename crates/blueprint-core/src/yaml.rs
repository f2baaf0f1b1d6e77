//! YAML decoding and encoding of mapping nodes.
//!
//! Decoding runs on `yaml-rust2` parser events so that every node keeps the
//! 1-based position it was read from. Encoding builds a `yaml_rust2::Yaml`
//! tree and hands it to the emitter.

use crate::decode::string_node;
use crate::error::{Error, Result};
use crate::mapping::{Fields, MappingNode, NodeContent};
use crate::scalar::{Scalar, ScalarValue};
use blueprint_source_map::{Position, SourceMeta};
use blueprint_substitutions::{
    InterpolationParser, ParseOptions, SubstitutionParser, substitutions_to_string,
};
use indexmap::IndexMap;
use yaml_rust2::parser::{Event, MarkedEventReceiver, Parser};
use yaml_rust2::scanner::{Marker, TScalarStyle};
use yaml_rust2::{Yaml, YamlEmitter};

/// Decode a YAML document into a mapping node.
///
/// Only the first document of a stream is read. An empty document decodes
/// to the nil node.
///
/// # Example
///
/// ```rust
/// use blueprint_core::yaml;
///
/// let node = yaml::decode("region: eu-west-2\nretries: 3").unwrap();
/// assert_eq!(node.get_field("retries").unwrap().as_scalar().unwrap().as_int(), Some(3));
/// ```
pub fn decode(content: &str) -> Result<MappingNode> {
    decode_with_parser(content, &InterpolationParser)
}

/// Decode a YAML document, splitting `${..}` placeholders with `parser`.
pub fn decode_with_parser(content: &str, parser: &dyn SubstitutionParser) -> Result<MappingNode> {
    let node = decode_impl(content, Some(parser))?;
    tracing::debug!(format = "yaml", root = node.kind_name(), "decoded mapping node");
    Ok(node)
}

/// Decode a YAML document holding a single scalar.
///
/// Placeholders are not split out; `${..}` text stays part of the string.
pub fn decode_scalar(content: &str) -> Result<ScalarValue> {
    let node = decode_impl(content, None)?;
    let position = node.source_meta.as_ref().map(|meta| meta.position);
    match node.content {
        NodeContent::Scalar(scalar) => Ok(scalar),
        _ => Err(Error::MustBeScalar { position }),
    }
}

fn decode_impl(content: &str, parser: Option<&dyn SubstitutionParser>) -> Result<MappingNode> {
    let mut yaml_parser = Parser::new_from_str(content);
    let mut builder = NodeBuilder::new(parser);

    yaml_parser.load(&mut builder, false)?;

    builder.result()
}

/// Builds mapping nodes from parser events.
///
/// Errors cannot be returned from `on_event`, so the first one is stored and
/// all later events are ignored.
struct NodeBuilder<'p> {
    parser: Option<&'p dyn SubstitutionParser>,
    stack: Vec<BuildNode>,
    root: Option<MappingNode>,
    error: Option<Error>,
}

enum BuildNode {
    Sequence {
        start: Position,
        items: Vec<MappingNode>,
    },
    Mapping {
        start: Position,
        fields: Fields,
        key_positions: IndexMap<String, SourceMeta>,
        pending_key: Option<(String, SourceMeta)>,
    },
}

impl<'p> NodeBuilder<'p> {
    fn new(parser: Option<&'p dyn SubstitutionParser>) -> Self {
        Self {
            parser,
            stack: Vec::new(),
            root: None,
            error: None,
        }
    }

    fn result(self) -> Result<MappingNode> {
        if let Some(err) = self.error {
            return Err(err);
        }
        Ok(self.root.unwrap_or_default())
    }

    /// True when the innermost open mapping is waiting for a key.
    fn expects_key(&self) -> bool {
        matches!(
            self.stack.last(),
            Some(BuildNode::Mapping {
                pending_key: None,
                ..
            })
        )
    }

    fn push_complete(&mut self, node: MappingNode) -> Result<()> {
        match self.stack.last_mut() {
            None => {
                self.root = Some(node);
            }
            Some(BuildNode::Sequence { items, .. }) => items.push(node),
            Some(BuildNode::Mapping {
                fields,
                key_positions,
                pending_key,
                ..
            }) => {
                let position = node.source_meta.as_ref().map(|meta| meta.position);
                let Some((key, key_meta)) = pending_key.take() else {
                    return Err(Error::InvalidMappingNode { position });
                };
                if let Some(previous) = key_positions.get(&key) {
                    return Err(Error::YamlParse {
                        message: format!(
                            "mapping key \"{}\" already defined at line {}",
                            key,
                            previous.line()
                        ),
                        position: Some(key_meta.position),
                    });
                }
                key_positions.insert(key.clone(), key_meta);
                fields.insert(key, node);
            }
        }
        Ok(())
    }

    fn on_scalar(
        &mut self,
        value: String,
        style: TScalarStyle,
        is_str_tag: bool,
        position: Position,
    ) -> Result<()> {
        if self.expects_key() {
            if let Some(BuildNode::Mapping { pending_key, .. }) = self.stack.last_mut() {
                *pending_key = Some((value, SourceMeta::new(position)));
            }
            return Ok(());
        }

        let kind = ScalarKind::from_style(style);
        if kind == ScalarKind::Plain && !is_str_tag && is_null(&value) {
            let node = MappingNode::nil().with_source_meta(Some(SourceMeta::new(position)));
            return self.push_complete(node);
        }

        let source_meta = Some(scalar_source_meta(&value, kind, position));
        let keep_string = is_str_tag || kind != ScalarKind::Plain;
        let collapse = |text: &str| {
            if keep_string {
                Scalar::String(text.to_string())
            } else {
                Scalar::from_text(text)
            }
        };

        let node = match self.parser {
            Some(parser) => {
                let options = ParseOptions {
                    output_line_info: true,
                    ignore_parent_column: kind == ScalarKind::Block,
                    preceding_char_count: usize::from(kind == ScalarKind::Quoted),
                };
                string_node(parser, &value, source_meta, options, collapse)?
            }
            None => {
                let scalar = ScalarValue::new(collapse(&value)).with_source_meta(source_meta.clone());
                MappingNode::from_scalar(scalar).with_source_meta(source_meta)
            }
        };
        self.push_complete(node)
    }

    fn start_collection(&mut self, build_node: BuildNode, position: Position) -> Result<()> {
        if self.expects_key() {
            // Only scalar keys are supported.
            return Err(Error::InvalidMappingNode {
                position: Some(position),
            });
        }
        self.stack.push(build_node);
        Ok(())
    }

    fn end_collection(&mut self) -> Result<()> {
        let node = match self.stack.pop() {
            Some(BuildNode::Sequence { start, items }) => {
                MappingNode::from_items(items).with_source_meta(Some(SourceMeta::new(start)))
            }
            Some(BuildNode::Mapping {
                start,
                fields,
                key_positions,
                ..
            }) => MappingNode::from_fields(fields)
                .with_source_meta(Some(SourceMeta::new(start)))
                .with_fields_source_meta(Some(key_positions)),
            None => {
                return Err(Error::YamlParse {
                    message: "collection end without a matching start".to_string(),
                    position: None,
                });
            }
        };
        self.push_complete(node)
    }

    fn handle(&mut self, ev: Event, marker: Marker) -> Result<()> {
        let position = marker_position(&marker);
        match ev {
            Event::Scalar(value, style, _anchor_id, tag) => {
                let is_str_tag = tag.is_some_and(|tag| {
                    tag.suffix == "str" && (tag.handle == "!!" || tag.handle == "tag:yaml.org,2002:")
                });
                self.on_scalar(value, style, is_str_tag, position)
            }
            Event::SequenceStart(_anchor_id, _tag) => self.start_collection(
                BuildNode::Sequence {
                    start: position,
                    items: Vec::new(),
                },
                position,
            ),
            Event::MappingStart(_anchor_id, _tag) => self.start_collection(
                BuildNode::Mapping {
                    start: position,
                    fields: Fields::new(),
                    key_positions: IndexMap::new(),
                    pending_key: None,
                },
                position,
            ),
            Event::SequenceEnd | Event::MappingEnd => self.end_collection(),
            // Anchors and aliases are not part of the blueprint document model.
            Event::Alias(_anchor_id) => Err(Error::InvalidMappingNode {
                position: Some(position),
            }),
            _ => Ok(()),
        }
    }
}

impl MarkedEventReceiver for NodeBuilder<'_> {
    fn on_event(&mut self, ev: Event, marker: Marker) {
        if self.error.is_some() {
            return;
        }
        if let Err(err) = self.handle(ev, marker) {
            self.error = Some(err);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScalarKind {
    Plain,
    Quoted,
    Block,
}

impl ScalarKind {
    fn from_style(style: TScalarStyle) -> Self {
        match style {
            TScalarStyle::Plain => ScalarKind::Plain,
            TScalarStyle::SingleQuoted | TScalarStyle::DoubleQuoted => ScalarKind::Quoted,
            _ => ScalarKind::Block,
        }
    }
}

fn marker_position(marker: &Marker) -> Position {
    // Marker lines are 1-based, columns 0-based.
    Position::new(marker.line(), marker.col() + 1)
}

fn is_null(value: &str) -> bool {
    matches!(value, "" | "~" | "null" | "Null" | "NULL")
}

/// Position of a scalar, with an exclusive end for single-line values.
fn scalar_source_meta(value: &str, kind: ScalarKind, start: Position) -> SourceMeta {
    let meta = SourceMeta::new(start);
    if kind == ScalarKind::Block || value.contains('\n') {
        return meta;
    }
    let quotes = if kind == ScalarKind::Quoted { 2 } else { 0 };
    meta.with_end(start.advance_columns(value.chars().count() + quotes))
}

/// Encode a mapping node as a YAML document.
///
/// Strings with substitutions are written back in their `${..}` form. A nil
/// node anywhere in the tree fails with `MissingMappingNode`.
pub fn encode(node: &MappingNode) -> Result<String> {
    let yaml = to_yaml(node)?;
    let mut out = String::new();
    let mut emitter = YamlEmitter::new(&mut out);
    emitter.dump(&yaml).map_err(|err| Error::YamlEmit {
        message: err.to_string(),
    })?;
    Ok(out)
}

/// Encode a scalar value as a YAML document.
pub fn encode_scalar(scalar: &ScalarValue) -> Result<String> {
    encode(&MappingNode::from_scalar(scalar.clone()))
}

fn to_yaml(node: &MappingNode) -> Result<Yaml> {
    let yaml = match &node.content {
        NodeContent::Nil => {
            return Err(Error::MissingMappingNode {
                position: node.source_meta.as_ref().map(|meta| meta.position),
            });
        }
        NodeContent::Scalar(scalar) => scalar_to_yaml(scalar),
        NodeContent::Fields(fields) => {
            let mut hash = yaml_rust2::yaml::Hash::new();
            for (key, value) in fields {
                hash.insert(Yaml::String(key.clone()), to_yaml(value)?);
            }
            Yaml::Hash(hash)
        }
        NodeContent::Items(items) => {
            Yaml::Array(items.iter().map(to_yaml).collect::<Result<Vec<_>>>()?)
        }
        NodeContent::StringWithSubstitutions(value) => {
            Yaml::String(substitutions_to_string(value))
        }
    };
    Ok(yaml)
}

fn scalar_to_yaml(scalar: &ScalarValue) -> Yaml {
    match &scalar.value {
        Some(Scalar::Int(value)) => Yaml::Integer(*value),
        Some(Scalar::Bool(value)) => Yaml::Boolean(*value),
        Some(Scalar::Float(value)) => Yaml::Real(format_float(*value)),
        Some(Scalar::String(value)) => Yaml::String(value.clone()),
        None => Yaml::Null,
    }
}

/// Float text that always reads back as a float.
fn format_float(value: f64) -> String {
    if value.is_nan() {
        return ".nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { ".inf" } else { "-.inf" }.to_string();
    }
    let text = value.to_string();
    if text.contains('.') {
        text
    } else {
        format!("{}.0", text)
    }
}
