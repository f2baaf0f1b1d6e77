//! Segment types for strings with `${..}` placeholders.

use blueprint_source_map::SourceMeta;

/// A string value interpolated with `${..}` substitutions.
///
/// Segments are kept in source order; concatenating the literal text and the
/// resolved placeholders yields the final string.
#[derive(Debug, Clone, PartialEq)]
pub struct StringOrSubstitutions {
    pub values: Vec<StringOrSubstitution>,
    pub source_meta: Option<SourceMeta>,
}

impl StringOrSubstitutions {
    pub fn new(values: Vec<StringOrSubstitution>) -> Self {
        Self {
            values,
            source_meta: None,
        }
    }

    pub fn with_source_meta(mut self, source_meta: Option<SourceMeta>) -> Self {
        self.source_meta = source_meta;
        self
    }

    /// Number of placeholder segments.
    pub fn substitution_count(&self) -> usize {
        self.values
            .iter()
            .filter(|value| value.as_substitution().is_some())
            .count()
    }
}

/// One segment of an interpolated string.
#[derive(Debug, Clone, PartialEq)]
pub enum StringOrSubstitution {
    /// Literal text between (or around) placeholders.
    StringValue {
        value: String,
        source_meta: Option<SourceMeta>,
    },
    /// A `${..}` placeholder, positioned from `$` to the closing `}`.
    SubstitutionValue {
        substitution: Substitution,
        source_meta: Option<SourceMeta>,
    },
}

impl StringOrSubstitution {
    pub fn string(value: impl Into<String>) -> Self {
        StringOrSubstitution::StringValue {
            value: value.into(),
            source_meta: None,
        }
    }

    pub fn substitution(expression: impl Into<String>) -> Self {
        StringOrSubstitution::SubstitutionValue {
            substitution: Substitution::new(expression),
            source_meta: None,
        }
    }

    pub fn as_string_value(&self) -> Option<&str> {
        match self {
            StringOrSubstitution::StringValue { value, .. } => Some(value),
            StringOrSubstitution::SubstitutionValue { .. } => None,
        }
    }

    pub fn as_substitution(&self) -> Option<&Substitution> {
        match self {
            StringOrSubstitution::SubstitutionValue { substitution, .. } => Some(substitution),
            StringOrSubstitution::StringValue { .. } => None,
        }
    }

    pub fn source_meta(&self) -> Option<&SourceMeta> {
        match self {
            StringOrSubstitution::StringValue { source_meta, .. } => source_meta.as_ref(),
            StringOrSubstitution::SubstitutionValue { source_meta, .. } => source_meta.as_ref(),
        }
    }
}

/// The contents of a `${..}` placeholder.
///
/// The expression is the raw text between `${` and `}`; it is not interpreted here.
#[derive(Debug, Clone, PartialEq)]
pub struct Substitution {
    pub expression: String,
    /// Position of the expression text (excluding `${` and `}`).
    pub source_meta: Option<SourceMeta>,
}

impl Substitution {
    pub fn new(expression: impl Into<String>) -> Self {
        Self {
            expression: expression.into(),
            source_meta: None,
        }
    }
}
