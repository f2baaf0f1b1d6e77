//! # blueprint-substitutions
//!
//! Splits blueprint string values into literal text and `${..}` placeholder
//! substitutions, keeping the source position of every segment.
//!
//! The placeholder expression itself is kept as opaque source text: resolving
//! or type-checking it is the job of the substitution engine, not this crate.
//! The tree layer only needs to know whether a string carries placeholders at
//! all and where each segment sits in the document.
//!
//! ## Example
//!
//! ```rust
//! use blueprint_substitutions::{InterpolationParser, ParseOptions, SubstitutionParser};
//!
//! let segments = InterpolationParser
//!     .parse("", "db-${variables.env}", None, ParseOptions::default())
//!     .unwrap();
//! assert_eq!(segments.len(), 2);
//! assert_eq!(segments[0].as_string_value(), Some("db-"));
//! ```

mod error;
mod output;
mod parse;
mod types;

pub use error::{Result, SubstitutionError, SubstitutionIssue};
pub use output::substitutions_to_string;
pub use parse::{InterpolationParser, ParseOptions, SubstitutionParser, parse_substitution_values};
pub use types::{StringOrSubstitution, StringOrSubstitutions, Substitution};
