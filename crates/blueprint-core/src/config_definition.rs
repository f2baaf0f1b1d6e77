//! Schemas for plugin configuration and their validation.
//!
//! A [`ConfigDefinition`] maps field keys to [`ConfigFieldDefinition`]s. A key
//! containing `<placeholder>` segments is a template that matches a family
//! of concrete keys, e.g. `aws.config.regionKMSKeys.<region>` matches
//! `aws.config.regionKMSKeys.us-east-1`.

use crate::diagnostic::{Diagnostic, DiagnosticRange};
use crate::error::{Error, Result};
use crate::plugin_config::PluginConfig;
use crate::scalar::{ScalarType, ScalarValue};
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, PoisonError, RwLock};

/// Custom check for a config value.
///
/// Called with the concrete key, the value and the whole config being
/// validated. Returned diagnostics are added to the validation result.
pub type ConfigValidateFn =
    Arc<dyn Fn(&str, &ScalarValue, &PluginConfig) -> Vec<Diagnostic> + Send + Sync>;

/// Schema of the configuration a plugin accepts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigDefinition {
    pub fields: IndexMap<String, ConfigFieldDefinition>,
    /// Accept keys that no field definition matches.
    #[serde(default)]
    pub allow_additional_fields: bool,
}

impl ConfigDefinition {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_field(mut self, key: impl Into<String>, field: ConfigFieldDefinition) -> Self {
        self.fields.insert(key.into(), field);
        self
    }

    pub fn allow_additional_fields(mut self, allow: bool) -> Self {
        self.allow_additional_fields = allow;
        self
    }
}

/// Definition of a single config field.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigFieldDefinition {
    #[serde(rename = "type")]
    pub field_type: ScalarType,
    pub label: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<ScalarValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_values: Option<Vec<ScalarValue>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub examples: Option<Vec<ScalarValue>>,
    /// The value is sensitive and must not be shown in plain text.
    #[serde(default)]
    pub secret: bool,
    #[serde(default)]
    pub required: bool,
    #[serde(skip)]
    pub validate_func: Option<ConfigValidateFn>,
}

impl ConfigFieldDefinition {
    pub fn new(field_type: ScalarType) -> Self {
        Self {
            field_type,
            label: String::new(),
            description: String::new(),
            default_value: None,
            allowed_values: None,
            examples: None,
            secret: false,
            required: false,
            validate_func: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_default(mut self, default_value: ScalarValue) -> Self {
        self.default_value = Some(default_value);
        self
    }

    pub fn with_allowed_values(mut self, allowed_values: Vec<ScalarValue>) -> Self {
        self.allowed_values = Some(allowed_values);
        self
    }

    pub fn with_examples(mut self, examples: Vec<ScalarValue>) -> Self {
        self.examples = Some(examples);
        self
    }

    pub fn secret(mut self) -> Self {
        self.secret = true;
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_validate_func(
        mut self,
        validate: impl Fn(&str, &ScalarValue, &PluginConfig) -> Vec<Diagnostic> + Send + Sync + 'static,
    ) -> Self {
        self.validate_func = Some(Arc::new(validate));
        self
    }
}

impl std::fmt::Debug for ConfigFieldDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigFieldDefinition")
            .field("field_type", &self.field_type)
            .field("label", &self.label)
            .field("description", &self.description)
            .field("default_value", &self.default_value)
            .field("allowed_values", &self.allowed_values)
            .field("examples", &self.examples)
            .field("secret", &self.secret)
            .field("required", &self.required)
            .field("validate_func", &self.validate_func.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

static TEMPLATE_PLACEHOLDER: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^<>]+>").unwrap());

/// Compiled template patterns keyed by field definition key. Entries are
/// never evicted; the map holds at most one pattern per distinct template
/// key across the loaded config definitions.
static PATTERN_CACHE: Lazy<RwLock<HashMap<String, Regex>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

const PLACEHOLDER_VALUE: &str = r"([A-Za-z0-9\-_]+)";

/// True for field keys with `<placeholder>` segments.
pub fn is_template_field(key: &str) -> bool {
    TEMPLATE_PLACEHOLDER.is_match(key)
}

/// Regex source matching the concrete keys of a template field key.
///
/// Literal parts are escaped and each placeholder matches one key segment
/// of letters, digits, `-` or `_`.
pub fn template_pattern_source(key: &str) -> String {
    let mut source = String::from("^");
    let mut last = 0;
    for placeholder in TEMPLATE_PLACEHOLDER.find_iter(key) {
        source.push_str(&regex::escape(&key[last..placeholder.start()]));
        source.push_str(PLACEHOLDER_VALUE);
        last = placeholder.end();
    }
    source.push_str(&regex::escape(&key[last..]));
    source.push('$');
    source
}

/// Compiled pattern for a template field key, cached per key.
fn template_pattern(key: &str) -> Result<Regex> {
    let cache = PATTERN_CACHE.read().unwrap_or_else(PoisonError::into_inner);
    if let Some(pattern) = cache.get(key) {
        return Ok(pattern.clone());
    }
    drop(cache);

    let source = template_pattern_source(key);
    tracing::trace!(key, pattern = %source, "compiling config field pattern");
    let pattern = Regex::new(&source).map_err(|err| Error::InvalidConfigFieldPattern {
        key: key.to_string(),
        message: err.to_string(),
    })?;

    PATTERN_CACHE
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .insert(key.to_string(), pattern.clone());
    Ok(pattern)
}

/// Fill in declared defaults for fields missing from `config`.
///
/// Template fields never receive defaults, as there is no way to tell how
/// many concrete keys they should produce.
pub fn populate_default_config_values(
    mut config: PluginConfig,
    definition: &ConfigDefinition,
) -> Result<PluginConfig> {
    for (key, field) in &definition.fields {
        if is_template_field(key) || config.contains_key(key) {
            continue;
        }
        if let Some(default_value) = &field.default_value {
            config.insert(key.clone(), default_value.clone());
        }
    }
    Ok(config)
}

/// Check `config` against `definition`.
///
/// Findings are returned as diagnostics in field definition order, followed
/// by unexpected keys in config order. An error is only returned when a
/// template field key cannot be turned into a pattern.
pub fn validate_config_definition(
    plugin_name: &str,
    plugin_kind: &str,
    config: &PluginConfig,
    definition: &ConfigDefinition,
) -> Result<Vec<Diagnostic>> {
    let mut diagnostics = Vec::new();
    let mut matched_keys: HashSet<&str> = HashSet::new();

    for (field_key, field) in &definition.fields {
        let is_template = is_template_field(field_key);
        let matches: Vec<(&str, &ScalarValue)> = if is_template {
            let pattern = template_pattern(field_key)?;
            config
                .iter()
                .filter(|(key, _)| pattern.is_match(key))
                .map(|(key, value)| (key.as_str(), value))
                .collect()
        } else {
            config
                .get(field_key)
                .map(|value| (field_key.as_str(), value))
                .into_iter()
                .collect()
        };

        if matches.is_empty() {
            if field.required && field.default_value.is_none() {
                let message = if is_template {
                    format!(
                        "The \"{}\" {} configuration requires at least one config value \
                         with a key that matches the pattern \"{}\".",
                        plugin_name, plugin_kind, field_key
                    )
                } else {
                    format!(
                        "The \"{}\" {} configuration requires the field \"{}\".",
                        plugin_name, plugin_kind, field_key
                    )
                };
                diagnostics.push(general_error(message));
            }
            continue;
        }

        for (key, value) in matches {
            matched_keys.insert(key);
            validate_value(plugin_name, plugin_kind, key, value, field, config, &mut diagnostics);
        }
    }

    if !definition.allow_additional_fields {
        for key in config.keys() {
            if !matched_keys.contains(key) {
                diagnostics.push(general_error(format!(
                    "The \"{}\" {} configuration contains an unexpected field \"{}\".",
                    plugin_name, plugin_kind, key
                )));
            }
        }
    }

    tracing::debug!(
        plugin_name,
        plugin_kind,
        diagnostics = diagnostics.len(),
        "validated plugin config"
    );
    Ok(diagnostics)
}

fn validate_value(
    plugin_name: &str,
    plugin_kind: &str,
    key: &str,
    value: &ScalarValue,
    field: &ConfigFieldDefinition,
    config: &PluginConfig,
    diagnostics: &mut Vec<Diagnostic>,
) {
    if value.scalar_type() != Some(field.field_type) {
        let got = value
            .scalar_type()
            .map_or_else(|| "empty".to_string(), |scalar_type| scalar_type.to_string());
        diagnostics.push(general_error(format!(
            "The value of the \"{}\" config field in the {} {} is not a valid {}. \
             Expected a value of type {}, but got {}.",
            key, plugin_name, plugin_kind, field.field_type, field.field_type, got
        )));
    }

    if let Some(allowed_values) = &field.allowed_values {
        if !allowed_values.iter().any(|allowed| allowed.equal(value)) {
            diagnostics.push(general_error(format!(
                "The \"{}\" {} configuration field \"{}\" has an unexpected value {}.",
                plugin_name, plugin_kind, key, value
            )));
        }
    }

    if let Some(validate) = &field.validate_func {
        diagnostics.extend(validate(key, value, config));
    }
}

fn general_error(message: String) -> Diagnostic {
    Diagnostic::error(message).with_range(DiagnosticRange::general())
}
