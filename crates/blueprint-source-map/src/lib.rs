//! Source positions for blueprint documents.
//!
//! Every value decoded from a blueprint document (YAML or JSON) can carry a
//! [`SourceMeta`] describing where it came from. Positions are 1-based in both
//! dimensions so they can be handed straight to editors and diagnostics.
//!
//! # Example
//!
//! ```rust
//! use blueprint_source_map::{Position, SourceMeta};
//!
//! let meta = SourceMeta::new(Position::new(2, 15)).with_end(Position::new(2, 23));
//! assert_eq!(meta.position.line, 2);
//! assert_eq!(meta.end_position, Some(Position::new(2, 23)));
//! ```

mod types;

pub use types::{Position, SourceMeta};
