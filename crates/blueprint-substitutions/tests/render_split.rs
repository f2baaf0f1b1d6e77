use blueprint_substitutions::{
    InterpolationParser, ParseOptions, StringOrSubstitutions, SubstitutionParser,
    substitutions_to_string,
};

fn split(value: &str) -> StringOrSubstitutions {
    let segments = InterpolationParser
        .parse("", value, None, ParseOptions::default())
        .unwrap();
    StringOrSubstitutions::new(segments)
}

#[test]
fn test_rendered_strings_split_into_the_same_segments() {
    for value in [
        "plain value",
        "${variables.environment}",
        "arn:aws:s3:::${variables.bucket}/*",
        "${a}${b}",
        "${join(\"}\", values.list)} done",
        "multi\nline ${x}\ntext",
    ] {
        let first = split(value);
        let rendered = substitutions_to_string(&first);
        assert_eq!(rendered, value);
        assert_eq!(split(&rendered), first);
    }
}

#[test]
fn test_adjacent_placeholders_have_no_empty_literals() {
    let value = split("${a}${b}");
    assert_eq!(value.values.len(), 2);
    assert_eq!(value.substitution_count(), 2);
}

#[test]
fn test_invalid_placeholders_name_their_context() {
    let err = InterpolationParser
        .parse("resources.bucket.spec.name", "x-${}", None, ParseOptions::default())
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "invalid substitutions in \"resources.bucket.spec.name\": empty substitution found"
    );
}
