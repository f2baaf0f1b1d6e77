use blueprint_core::{
    ConfigDefinition, ConfigFieldDefinition, Diagnostic, DiagnosticRange, PluginConfig,
    ScalarType, ScalarValue, populate_default_config_values, validate_config_definition,
};

const KMS_KEY_TEMPLATE: &str = "aws.config.regionKMSKeys.<region>.other.<placeholder>";

fn test_config_definition() -> ConfigDefinition {
    ConfigDefinition::new()
        .with_field(
            "intField",
            ConfigFieldDefinition::new(ScalarType::Integer)
                .with_label("Int Field")
                .with_description("An integer field")
                .with_allowed_values(vec![
                    ScalarValue::from_int(10),
                    ScalarValue::from_int(22),
                    ScalarValue::from_int(45),
                    ScalarValue::from_int(57),
                ])
                .required(),
        )
        .with_field(
            "floatField",
            ConfigFieldDefinition::new(ScalarType::Float)
                .with_label("Float Field")
                .with_description("A float field")
                .required(),
        )
        .with_field(
            "boolField",
            ConfigFieldDefinition::new(ScalarType::Boolean)
                .with_label("Bool Field")
                .with_description("A boolean field")
                .required(),
        )
        .with_field(
            "stringField",
            ConfigFieldDefinition::new(ScalarType::String)
                .with_label("String Field")
                .with_description("A string field")
                .required(),
        )
        .with_field(
            KMS_KEY_TEMPLATE,
            ConfigFieldDefinition::new(ScalarType::String)
                .with_label("AWS Region KMS Keys")
                .with_description("AWS region KMS keys")
                .required(),
        )
        .with_field(
            "intFieldWithDefault",
            ConfigFieldDefinition::new(ScalarType::Integer)
                .with_label("Int Field with Default")
                .with_description("An integer field with a default value")
                .with_default(ScalarValue::from_int(100)),
        )
}

fn config(entries: Vec<(&str, ScalarValue)>) -> PluginConfig {
    entries
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect()
}

fn kms_keys() -> Vec<(&'static str, ScalarValue)> {
    vec![
        (
            "aws.config.regionKMSKeys.us-east-1.other.value1",
            ScalarValue::from_string("arn:aws:kms:us-east-1:123456789012:key/abcd1234"),
        ),
        (
            "aws.config.regionKMSKeys.eu-west-1.other.value2",
            ScalarValue::from_string("arn:aws:kms:eu-west-1:123456789012:key/abcd2345"),
        ),
    ]
}

fn valid_entries() -> Vec<(&'static str, ScalarValue)> {
    let mut entries = vec![
        ("intField", ScalarValue::from_int(10)),
        ("floatField", ScalarValue::from_float(2.5)),
        ("boolField", ScalarValue::from_bool(true)),
        ("stringField", ScalarValue::from_string("another value")),
    ];
    entries.extend(kms_keys());
    entries
}

fn general_error(message: &str) -> Diagnostic {
    Diagnostic::error(message).with_range(DiagnosticRange::general())
}

fn validate(config: &PluginConfig, definition: &ConfigDefinition) -> Vec<Diagnostic> {
    validate_config_definition("aws", "provider", config, definition).unwrap()
}

#[test]
fn test_populate_defaults_for_missing_config_values() {
    let input = config(vec![
        ("intField", ScalarValue::from_int(45)),
        ("floatField", ScalarValue::from_float(2.5)),
        ("boolField", ScalarValue::from_bool(true)),
        ("stringField", ScalarValue::from_string("a value")),
        // Template fields never receive defaults.
        (
            "aws.config.regionKMSKeys.us-east-1.other.value1",
            ScalarValue::from_string("arn:aws:kms:us-east-1:123456789012:key/abcd1234"),
        ),
    ]);

    let with_defaults =
        populate_default_config_values(input.clone(), &test_config_definition()).unwrap();

    let mut expected = input;
    expected.insert("intFieldWithDefault", ScalarValue::from_int(100));
    assert_eq!(with_defaults, expected);
}

#[test]
fn test_populate_defaults_keeps_existing_values() {
    let input = config(vec![("intFieldWithDefault", ScalarValue::from_int(7))]);
    let with_defaults =
        populate_default_config_values(input.clone(), &test_config_definition()).unwrap();
    assert_eq!(with_defaults, input);
}

#[test]
fn test_populated_config_passes_validation() -> blueprint_core::Result<()> {
    let definition = test_config_definition();

    let populated = populate_default_config_values(config(valid_entries()), &definition)?;
    assert_eq!(
        populated.get("intFieldWithDefault"),
        Some(&ScalarValue::from_int(100))
    );
    let diagnostics = validate_config_definition("aws", "provider", &populated, &definition)?;
    assert!(diagnostics.is_empty(), "{:?}", diagnostics);
    Ok(())
}

#[test]
fn test_passes_validation_for_valid_input_config() {
    let diagnostics = validate(&config(valid_entries()), &test_config_definition());
    assert!(diagnostics.is_empty(), "{:?}", diagnostics);
}

#[test]
fn test_passes_validation_with_additional_fields_when_allowed() {
    let mut entries = valid_entries();
    entries.push(("additionalField", ScalarValue::from_string("additional value")));
    let definition = test_config_definition().allow_additional_fields(true);

    let diagnostics = validate(&config(entries), &definition);
    assert!(diagnostics.is_empty(), "{:?}", diagnostics);
}

#[test]
fn test_fails_validation_for_missing_required_value() {
    let entries: Vec<_> = valid_entries()
        .into_iter()
        .filter(|(key, _)| *key != "boolField")
        .collect();

    let diagnostics = validate(&config(entries), &test_config_definition());
    assert_eq!(
        diagnostics,
        vec![general_error(
            "The \"aws\" provider configuration requires the field \"boolField\"."
        )]
    );
}

#[test]
fn test_fails_validation_for_missing_dynamic_fields() {
    let entries: Vec<_> = valid_entries()
        .into_iter()
        .filter(|(key, _)| !key.starts_with("aws."))
        .collect();

    let diagnostics = validate(&config(entries), &test_config_definition());
    assert_eq!(
        diagnostics,
        vec![general_error(
            "The \"aws\" provider configuration requires at least one config value with a key \
             that matches the pattern \"aws.config.regionKMSKeys.<region>.other.<placeholder>\"."
        )]
    );
}

#[test]
fn test_fails_validation_when_additional_values_are_not_allowed() {
    let mut entries = valid_entries();
    entries.push(("additionalField", ScalarValue::from_string("additional value")));

    let diagnostics = validate(&config(entries), &test_config_definition());
    assert_eq!(
        diagnostics,
        vec![general_error(
            "The \"aws\" provider configuration contains an unexpected field \"additionalField\"."
        )]
    );
}

#[test]
fn test_fails_validation_for_values_not_in_allowed_list() {
    let mut entries = valid_entries();
    entries[0] = ("intField", ScalarValue::from_int(70));

    let diagnostics = validate(&config(entries), &test_config_definition());
    assert_eq!(
        diagnostics,
        vec![general_error(
            "The \"aws\" provider configuration field \"intField\" has an unexpected value 70."
        )]
    );
}

#[test]
fn test_fails_validation_for_value_of_wrong_type() {
    let mut entries = valid_entries();
    entries[0] = ("intField", ScalarValue::from_string("not an integer"));

    let diagnostics = validate(&config(entries), &test_config_definition());
    assert_eq!(
        diagnostics,
        vec![
            general_error(
                "The value of the \"intField\" config field in the aws provider is not a valid \
                 integer. Expected a value of type integer, but got string."
            ),
            general_error(
                "The \"aws\" provider configuration field \"intField\" has an unexpected value \
                 not an integer."
            ),
        ]
    );
}

#[test]
fn test_dynamic_field_is_satisfied_by_any_matching_key() {
    let definition = ConfigDefinition::new().with_field(
        "a.b.<region>.c",
        ConfigFieldDefinition::new(ScalarType::String).required(),
    );

    let both = config(vec![
        ("a.b.us-east-1.c", ScalarValue::from_string("x")),
        ("a.b.eu-west-1.c", ScalarValue::from_string("y")),
    ]);
    assert!(validate(&both, &definition).is_empty());

    let one = config(vec![("a.b.eu-west-1.c", ScalarValue::from_string("y"))]);
    assert!(validate(&one, &definition).is_empty());
}

#[test]
fn test_type_mismatch_reports_every_matching_dynamic_key() {
    let definition = ConfigDefinition::new().with_field(
        "limits.<name>",
        ConfigFieldDefinition::new(ScalarType::Integer),
    );
    let input = config(vec![
        ("limits.cpu", ScalarValue::from_int(2)),
        ("limits.memory", ScalarValue::from_string("2Gi")),
        ("limits.disk", ScalarValue::empty()),
    ]);

    let messages: Vec<String> = validate(&input, &definition)
        .into_iter()
        .map(|diagnostic| diagnostic.message)
        .collect();
    assert_eq!(
        messages,
        vec![
            "The value of the \"limits.memory\" config field in the aws provider is not a valid \
             integer. Expected a value of type integer, but got string."
                .to_string(),
            "The value of the \"limits.disk\" config field in the aws provider is not a valid \
             integer. Expected a value of type integer, but got empty."
                .to_string(),
        ]
    );
}

#[test]
fn test_required_field_with_default_is_not_reported() {
    let definition = ConfigDefinition::new().with_field(
        "timeout",
        ConfigFieldDefinition::new(ScalarType::Integer)
            .with_default(ScalarValue::from_int(30))
            .required(),
    );
    assert!(validate(&PluginConfig::new(), &definition).is_empty());
}
