//! The recursive value tree of blueprint documents.

use crate::scalar::ScalarValue;
use blueprint_source_map::SourceMeta;
use blueprint_substitutions::StringOrSubstitutions;
use indexmap::IndexMap;

/// Ordered map of field name to child node.
pub type Fields = IndexMap<String, MappingNode>;

/// What a [`MappingNode`] holds.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum NodeContent {
    /// No value (the nil node).
    #[default]
    Nil,
    Scalar(ScalarValue),
    Fields(Fields),
    Items(Vec<MappingNode>),
    /// A string containing at least one `${..}` placeholder.
    StringWithSubstitutions(StringOrSubstitutions),
}

/// A value in a blueprint resource spec, config or state document.
///
/// A node owns its children exclusively. `fields_source_meta` records the
/// position of each field key and is only used for diagnostics.
///
/// Derived equality is structural and includes positions. Use
/// [`mapping_node_equal`] to compare values only.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MappingNode {
    pub content: NodeContent,
    pub source_meta: Option<SourceMeta>,
    pub fields_source_meta: Option<IndexMap<String, SourceMeta>>,
}

impl MappingNode {
    pub fn new(content: NodeContent) -> Self {
        Self {
            content,
            source_meta: None,
            fields_source_meta: None,
        }
    }

    pub fn nil() -> Self {
        Self::default()
    }

    pub fn from_scalar(scalar: ScalarValue) -> Self {
        Self::new(NodeContent::Scalar(scalar))
    }

    pub fn from_string(value: impl Into<String>) -> Self {
        Self::from_scalar(ScalarValue::from_string(value))
    }

    pub fn from_int(value: i64) -> Self {
        Self::from_scalar(ScalarValue::from_int(value))
    }

    pub fn from_float(value: f64) -> Self {
        Self::from_scalar(ScalarValue::from_float(value))
    }

    pub fn from_bool(value: bool) -> Self {
        Self::from_scalar(ScalarValue::from_bool(value))
    }

    pub fn from_fields(fields: Fields) -> Self {
        Self::new(NodeContent::Fields(fields))
    }

    pub fn from_items(items: Vec<MappingNode>) -> Self {
        Self::new(NodeContent::Items(items))
    }

    pub fn from_substitutions(value: StringOrSubstitutions) -> Self {
        Self::new(NodeContent::StringWithSubstitutions(value))
    }

    pub fn with_source_meta(mut self, source_meta: Option<SourceMeta>) -> Self {
        self.source_meta = source_meta;
        self
    }

    pub fn with_fields_source_meta(
        mut self,
        fields_source_meta: Option<IndexMap<String, SourceMeta>>,
    ) -> Self {
        self.fields_source_meta = fields_source_meta;
        self
    }

    pub fn is_nil(&self) -> bool {
        matches!(self.content, NodeContent::Nil)
    }

    /// True for nodes holding a map of fields.
    pub fn is_object(&self) -> bool {
        matches!(self.content, NodeContent::Fields(_))
    }

    /// True for nodes holding a list of items.
    pub fn is_array(&self) -> bool {
        matches!(self.content, NodeContent::Items(_))
    }

    pub fn is_scalar(&self) -> bool {
        matches!(self.content, NodeContent::Scalar(_))
    }

    pub fn is_substitutions(&self) -> bool {
        matches!(self.content, NodeContent::StringWithSubstitutions(_))
    }

    pub fn as_scalar(&self) -> Option<&ScalarValue> {
        match &self.content {
            NodeContent::Scalar(scalar) => Some(scalar),
            _ => None,
        }
    }

    pub fn as_fields(&self) -> Option<&Fields> {
        match &self.content {
            NodeContent::Fields(fields) => Some(fields),
            _ => None,
        }
    }

    pub fn as_fields_mut(&mut self) -> Option<&mut Fields> {
        match &mut self.content {
            NodeContent::Fields(fields) => Some(fields),
            _ => None,
        }
    }

    pub fn as_items(&self) -> Option<&[MappingNode]> {
        match &self.content {
            NodeContent::Items(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_items_mut(&mut self) -> Option<&mut Vec<MappingNode>> {
        match &mut self.content {
            NodeContent::Items(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_substitutions(&self) -> Option<&StringOrSubstitutions> {
        match &self.content {
            NodeContent::StringWithSubstitutions(value) => Some(value),
            _ => None,
        }
    }

    pub fn get_field(&self, name: &str) -> Option<&MappingNode> {
        self.as_fields().and_then(|fields| fields.get(name))
    }

    pub fn get_item(&self, index: usize) -> Option<&MappingNode> {
        self.as_items().and_then(|items| items.get(index))
    }

    /// Position of the key of field `name`, when the decoder recorded it.
    pub fn field_source_meta(&self, name: &str) -> Option<&SourceMeta> {
        self.fields_source_meta
            .as_ref()
            .and_then(|positions| positions.get(name))
    }

    /// Short name of the held variant, used in log events.
    pub fn kind_name(&self) -> &'static str {
        match self.content {
            NodeContent::Nil => "nil",
            NodeContent::Scalar(_) => "scalar",
            NodeContent::Fields(_) => "fields",
            NodeContent::Items(_) => "items",
            NodeContent::StringWithSubstitutions(_) => "substitutions",
        }
    }

    /// An independent copy of the tree without source positions.
    ///
    /// Strings with substitutions are carried over as they are; copies are
    /// meant for resolved trees.
    pub fn deep_copy(&self) -> MappingNode {
        let content = match &self.content {
            NodeContent::Nil => NodeContent::Nil,
            NodeContent::Scalar(scalar) => NodeContent::Scalar(ScalarValue {
                value: scalar.value.clone(),
                source_meta: None,
            }),
            NodeContent::Fields(fields) => NodeContent::Fields(
                fields
                    .iter()
                    .map(|(key, value)| (key.clone(), value.deep_copy()))
                    .collect(),
            ),
            NodeContent::Items(items) => {
                NodeContent::Items(items.iter().map(MappingNode::deep_copy).collect())
            }
            NodeContent::StringWithSubstitutions(value) => {
                NodeContent::StringWithSubstitutions(value.clone())
            }
        };
        MappingNode::new(content)
    }
}

impl From<ScalarValue> for MappingNode {
    fn from(scalar: ScalarValue) -> Self {
        MappingNode::from_scalar(scalar)
    }
}

impl From<Fields> for MappingNode {
    fn from(fields: Fields) -> Self {
        MappingNode::from_fields(fields)
    }
}

impl From<Vec<MappingNode>> for MappingNode {
    fn from(items: Vec<MappingNode>) -> Self {
        MappingNode::from_items(items)
    }
}

/// Compare the scalar values of two nodes.
///
/// Two nodes without scalars (including missing nodes) compare equal; a node
/// with a scalar never equals one without.
pub fn scalar_mapping_node_equal(a: Option<&MappingNode>, b: Option<&MappingNode>) -> bool {
    let scalar_a = a.and_then(MappingNode::as_scalar);
    let scalar_b = b.and_then(MappingNode::as_scalar);
    match (scalar_a, scalar_b) {
        (None, None) => true,
        (Some(a), Some(b)) => a.equal(b),
        _ => false,
    }
}

/// Deep value equality of two nodes, ignoring source positions.
///
/// Field maps need the same keys (in any order) and items the same length.
/// Nodes holding different variants are not equal. Nil nodes and strings
/// with substitutions never compare equal.
pub fn mapping_node_equal(a: Option<&MappingNode>, b: Option<&MappingNode>) -> bool {
    let (Some(a), Some(b)) = (a, b) else {
        return false;
    };

    match (&a.content, &b.content) {
        (NodeContent::Scalar(a), NodeContent::Scalar(b)) => a.equal(b),
        (NodeContent::Fields(a), NodeContent::Fields(b)) => {
            a.len() == b.len()
                && a.iter()
                    .all(|(key, value)| mapping_node_equal(Some(value), b.get(key)))
        }
        (NodeContent::Items(a), NodeContent::Items(b)) => {
            a.len() == b.len()
                && a.iter()
                    .zip(b)
                    .all(|(a, b)| mapping_node_equal(Some(a), Some(b)))
        }
        _ => false,
    }
}

/// Merge the fields of several nodes into one field-bearing node.
///
/// Later nodes win on key collisions. Nodes that do not hold fields
/// contribute nothing.
pub fn merge_maps<'a>(nodes: impl IntoIterator<Item = &'a MappingNode>) -> MappingNode {
    let mut merged = Fields::new();
    for node in nodes {
        if let Some(fields) = node.as_fields() {
            for (key, value) in fields {
                merged.insert(key.clone(), value.clone());
            }
        }
    }
    MappingNode::from_fields(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use blueprint_source_map::Position;
    use blueprint_substitutions::StringOrSubstitution;

    fn fields(entries: Vec<(&str, MappingNode)>) -> MappingNode {
        MappingNode::from_fields(
            entries
                .into_iter()
                .map(|(key, value)| (key.to_string(), value))
                .collect(),
        )
    }

    fn substitution(expression: &str) -> MappingNode {
        MappingNode::from_substitutions(StringOrSubstitutions::new(vec![
            StringOrSubstitution::substitution(expression),
        ]))
    }

    #[test]
    fn test_predicates() {
        assert!(MappingNode::nil().is_nil());
        assert!(MappingNode::from_int(1).is_scalar());
        assert!(fields(vec![]).is_object());
        assert!(MappingNode::from_items(vec![]).is_array());
        assert!(substitution("variables.a").is_substitutions());
        assert!(!MappingNode::from_items(vec![]).is_nil());
    }

    #[test]
    fn test_deep_equality_ignores_order_and_positions() {
        let a = fields(vec![
            ("name", MappingNode::from_string("orders")),
            (
                "ports",
                MappingNode::from_items(vec![MappingNode::from_int(80), MappingNode::from_int(443)]),
            ),
        ]);
        let b = fields(vec![
            (
                "ports",
                MappingNode::from_items(vec![MappingNode::from_int(80), MappingNode::from_int(443)]),
            ),
            (
                "name",
                MappingNode::from_string("orders")
                    .with_source_meta(Some(SourceMeta::new(Position::new(2, 7)))),
            ),
        ]);
        assert!(mapping_node_equal(Some(&a), Some(&b)));
    }

    #[test]
    fn test_deep_equality_mismatches() {
        let short = MappingNode::from_items(vec![MappingNode::from_int(80)]);
        let long = MappingNode::from_items(vec![MappingNode::from_int(80), MappingNode::from_int(1)]);
        assert!(!mapping_node_equal(Some(&short), Some(&long)));

        let a = fields(vec![("a", MappingNode::from_int(1))]);
        let b = fields(vec![("b", MappingNode::from_int(1))]);
        assert!(!mapping_node_equal(Some(&a), Some(&b)));

        let items = MappingNode::from_items(vec![]);
        assert!(!mapping_node_equal(Some(&items), Some(&fields(vec![]))));
        assert!(!mapping_node_equal(Some(&substitution("a")), Some(&substitution("a"))));
        assert!(!mapping_node_equal(None, None));
    }

    #[test]
    fn test_scalar_node_equality() {
        let ten = MappingNode::from_int(10);
        assert!(scalar_mapping_node_equal(Some(&ten), Some(&MappingNode::from_int(10))));
        assert!(!scalar_mapping_node_equal(Some(&ten), Some(&MappingNode::from_float(10.0))));
        assert!(!scalar_mapping_node_equal(Some(&ten), None));
        assert!(scalar_mapping_node_equal(None, Some(&fields(vec![]))));
    }

    #[test]
    fn test_deep_copy_is_independent() {
        let original = fields(vec![(
            "tags",
            MappingNode::from_items(vec![
                MappingNode::from_string("a")
                    .with_source_meta(Some(SourceMeta::new(Position::new(4, 5)))),
            ]),
        )]);
        let mut copy = original.deep_copy();
        assert!(mapping_node_equal(Some(&original), Some(&copy)));
        assert_eq!(copy.get_field("tags").unwrap().get_item(0).unwrap().source_meta, None);

        copy.as_fields_mut()
            .unwrap()
            .insert("extra".to_string(), MappingNode::from_bool(true));
        assert!(original.get_field("extra").is_none());
    }

    #[test]
    fn test_merge_maps_later_wins() {
        let first = fields(vec![
            ("region", MappingNode::from_string("eu-west-1")),
            ("retries", MappingNode::from_int(3)),
        ]);
        let second = fields(vec![("region", MappingNode::from_string("us-east-1"))]);
        let ignored = MappingNode::from_int(5);

        let merged = merge_maps([&first, &ignored, &second]);
        let merged_fields = merged.as_fields().unwrap();
        assert_eq!(merged_fields.len(), 2);
        assert_eq!(
            merged.get_field("region").and_then(MappingNode::as_scalar),
            Some(&ScalarValue::from_string("us-east-1"))
        );
        assert_eq!(
            merged.get_field("retries").and_then(MappingNode::as_scalar),
            Some(&ScalarValue::from_int(3))
        );
    }
}
