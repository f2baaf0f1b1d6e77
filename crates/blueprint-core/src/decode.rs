//! Helpers shared by the YAML and JSON decoders.

use crate::error::Result;
use crate::mapping::MappingNode;
use crate::scalar::{Scalar, ScalarValue};
use blueprint_source_map::SourceMeta;
use blueprint_substitutions::{
    ParseOptions, StringOrSubstitution, StringOrSubstitutions, SubstitutionParser,
};

/// Decode a string token into a node.
///
/// Strings with `${..}` placeholders become substitution nodes. Strings
/// without them collapse to the scalar built by `collapse`.
pub(crate) fn string_node(
    parser: &dyn SubstitutionParser,
    text: &str,
    source_meta: Option<SourceMeta>,
    options: ParseOptions,
    collapse: impl FnOnce(&str) -> Scalar,
) -> Result<MappingNode> {
    let mut segments = parser.parse("", text, source_meta.as_ref(), options)?;

    let is_literal = match segments.as_slice() {
        [] => true,
        [StringOrSubstitution::StringValue { .. }] => true,
        _ => false,
    };
    if is_literal {
        let literal = match segments.pop() {
            Some(StringOrSubstitution::StringValue { value, .. }) => value,
            _ => text.to_string(),
        };
        let scalar = ScalarValue::new(collapse(&literal)).with_source_meta(source_meta.clone());
        return Ok(MappingNode::from_scalar(scalar).with_source_meta(source_meta));
    }

    let value = StringOrSubstitutions::new(segments).with_source_meta(source_meta.clone());
    Ok(MappingNode::from_substitutions(value).with_source_meta(source_meta))
}
