//! Error types for substitution splitting.

use blueprint_source_map::Position;
use thiserror::Error;

/// Result type alias for substitution parsing.
pub type Result<T> = std::result::Result<T, SubstitutionError>;

/// A single problem found in a `${..}` placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubstitutionIssue {
    /// `${}` or a placeholder containing only whitespace.
    #[error("empty substitution found{}", at(.position))]
    Empty { position: Option<Position> },

    /// A `${` opened inside another placeholder expression.
    #[error("nested substitution found in \"{expression}\"{}", at(.position))]
    Nested {
        expression: String,
        position: Option<Position>,
    },
}

impl SubstitutionIssue {
    pub fn position(&self) -> Option<Position> {
        match self {
            SubstitutionIssue::Empty { position } => *position,
            SubstitutionIssue::Nested { position, .. } => *position,
        }
    }
}

/// All placeholder problems found in one string value.
///
/// Every issue in the string is collected so that a document author sees all
/// of them at once instead of fixing them one parse at a time.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", describe(.context, .issues))]
pub struct SubstitutionError {
    /// Field or key the string was found in (may be empty).
    pub context: String,
    pub issues: Vec<SubstitutionIssue>,
    /// Start of the string value the issues were found in.
    pub position: Option<Position>,
}

fn at(position: &Option<Position>) -> String {
    match position {
        Some(pos) => format!(" at {}", pos),
        None => String::new(),
    }
}

fn describe(context: &str, issues: &[SubstitutionIssue]) -> String {
    let prefix = if context.is_empty() {
        "invalid substitutions".to_string()
    } else {
        format!("invalid substitutions in \"{}\"", context)
    };
    let details: Vec<String> = issues.iter().map(|issue| issue.to_string()).collect();
    format!("{}: {}", prefix, details.join("; "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_lists_every_issue() {
        let err = SubstitutionError {
            context: "spec.name".to_string(),
            issues: vec![
                SubstitutionIssue::Empty {
                    position: Some(Position::new(1, 3)),
                },
                SubstitutionIssue::Nested {
                    expression: "a${b".to_string(),
                    position: None,
                },
            ],
            position: Some(Position::new(1, 1)),
        };
        assert_eq!(
            err.to_string(),
            "invalid substitutions in \"spec.name\": empty substitution found at 1:3; \
             nested substitution found in \"a${b\""
        );
    }
}
