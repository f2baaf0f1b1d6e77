//! # blueprint-core
//!
//! The value model of blueprint documents.
//!
//! - [`ScalarValue`]: an integer, float, boolean or string, or the empty scalar
//! - [`MappingNode`]: the recursive tree every resource spec, config and
//!   state value is represented with, decoded from [`yaml`] or [`json`] with
//!   source positions and `${..}` substitutions kept apart from literal text
//! - [`get_path_value`] / [`inject_path_value`]: reading and writing values
//!   with paths such as `$.config["cluster.v1"].hosts[0]`
//! - [`validate_config_definition`]: checking [`PluginConfig`] against a
//!   [`ConfigDefinition`], including templated keys
//!
//! ## Example
//!
//! ```rust
//! use blueprint_core::{get_path_value, yaml, DEFAULT_MAX_TRAVERSE_DEPTH};
//!
//! let node = yaml::decode(
//!     "resources:\n  orders:\n    tableName: \"orders-${variables.env}\"",
//! )
//! .unwrap();
//!
//! let table = get_path_value("$.resources.orders.tableName", &node, DEFAULT_MAX_TRAVERSE_DEPTH)
//!     .unwrap()
//!     .unwrap();
//! assert!(table.is_substitutions());
//! ```

mod config_definition;
mod decode;
mod diagnostic;
mod error;
mod mapping;
mod paths;
mod plugin_config;
mod scalar;

pub mod json;
pub mod yaml;

pub use config_definition::{
    ConfigDefinition, ConfigFieldDefinition, ConfigValidateFn, is_template_field,
    populate_default_config_values, template_pattern_source, validate_config_definition,
};
pub use diagnostic::{Diagnostic, DiagnosticLevel, DiagnosticRange};
pub use error::{Error, ErrorReasonCode, Result};
pub use mapping::{
    Fields, MappingNode, NodeContent, mapping_node_equal, merge_maps, scalar_mapping_node_equal,
};
pub use paths::{
    DEFAULT_MAX_TRAVERSE_DEPTH, MappingPath, PathAccessor, get_path_value, inject_path_value,
};
pub use plugin_config::PluginConfig;
pub use scalar::{
    Scalar, ScalarType, ScalarValue, bool_value_from_scalar, float_value_from_scalar,
    int_value_from_scalar, string_value_from_scalar,
};

pub use blueprint_source_map::{Position, SourceMeta};
pub use blueprint_substitutions::{
    InterpolationParser, ParseOptions, StringOrSubstitution, StringOrSubstitutions, Substitution,
    SubstitutionParser,
};
