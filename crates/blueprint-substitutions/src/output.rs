//! Rendering interpolated strings back to source text.

use crate::types::{StringOrSubstitution, StringOrSubstitutions};

/// Render a string with substitutions back into its `${..}` source form.
///
/// Placeholder expressions are emitted verbatim, so splitting the output
/// again yields the same segments.
pub fn substitutions_to_string(value: &StringOrSubstitutions) -> String {
    let mut out = String::new();
    for segment in &value.values {
        match segment {
            StringOrSubstitution::StringValue { value, .. } => out.push_str(value),
            StringOrSubstitution::SubstitutionValue { substitution, .. } => {
                out.push_str("${");
                out.push_str(&substitution.expression);
                out.push('}');
            }
        }
    }
    out
}
