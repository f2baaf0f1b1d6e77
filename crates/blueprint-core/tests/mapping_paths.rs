use blueprint_core::{
    Error, ErrorReasonCode, Fields, MappingNode, get_path_value, inject_path_value,
    mapping_node_equal,
};

const ENDPOINT: &str = "https://sfg94832-api.example.com";
const NEW_ENDPOINT: &str = "https://sfg94831-api.example.com";

fn fields(entries: Vec<(&str, MappingNode)>) -> MappingNode {
    MappingNode::from_fields(
        entries
            .into_iter()
            .map(|(key, value)| (key.to_string(), value))
            .collect(),
    )
}

fn cluster_node() -> MappingNode {
    fields(vec![(
        "cluster\".v1",
        fields(vec![(
            "config",
            fields(vec![(
                "environments",
                MappingNode::from_items(vec![fields(vec![(
                    "hosts",
                    MappingNode::from_items(vec![fields(vec![(
                        "endpoint",
                        MappingNode::from_string(ENDPOINT),
                    )])]),
                )])]),
            )]),
        )]),
    )])
}

fn injectable_cluster_node() -> MappingNode {
    fields(vec![(
        "cluster\".v1",
        fields(vec![(
            "config",
            fields(vec![("environments", MappingNode::from_items(vec![]))]),
        )]),
    )])
}

/// A chain of `depth` nested fields and the path to the innermost one.
fn deep_node(depth: usize) -> (MappingNode, String) {
    let mut path = String::from("$");
    for i in 0..depth {
        path.push_str(&format!(".field{}", i));
    }

    let mut node = MappingNode::from_fields(Fields::new());
    for i in (0..depth).rev() {
        let mut parent = Fields::new();
        parent.insert(format!("field{}", i), node);
        node = MappingNode::from_fields(parent);
    }
    (node, path)
}

#[test]
fn test_get_value_for_complex_path() {
    let node = cluster_node();
    let value = get_path_value(
        "$[\"cluster\\\".v1\"].config.environments[0].hosts[0].endpoint",
        &node,
        10,
    )
    .unwrap()
    .unwrap();
    assert_eq!(value.as_scalar().unwrap().as_str(), Some(ENDPOINT));
}

#[test]
fn test_root_path_returns_the_node_itself() {
    let node = cluster_node();
    let value = get_path_value("$", &node, 10).unwrap().unwrap();
    assert!(std::ptr::eq(value, &node));

    let value = get_path_value("$", &node, 0).unwrap().unwrap();
    assert!(std::ptr::eq(value, &node));
}

#[test]
fn test_missing_field_is_none() {
    let node = cluster_node();
    let value = get_path_value(
        "$[\"cluster\\\".v1\"].config.environments[0].hosts[0].missingField",
        &node,
        10,
    )
    .unwrap();
    assert!(value.is_none());
}

#[test]
fn test_path_beyond_max_depth_is_none() {
    let (node, path) = deep_node(30);
    assert!(get_path_value(&path, &node, 10).unwrap().is_none());
    assert!(get_path_value(&path, &node, 30).unwrap().is_some());
}

#[test]
fn test_invalid_path_reports_the_path() {
    let node = cluster_node();
    for path in [
        "$[\"cluster\\\".v1\"].config.environments[0unexpected].hosts[0].missingField",
        ".config[\"hosts\"][0]",
    ] {
        let err = get_path_value(path, &node, 10).unwrap_err();
        assert_eq!(err.reason_code(), ErrorReasonCode::InvalidMappingPath);
        match err {
            Error::InvalidMappingPath { path: reported, .. } => assert_eq!(reported, path),
            other => panic!("unexpected error: {:?}", other),
        }
    }
}

#[test]
fn test_inject_value_for_map_field() {
    let path = "$[\"cluster\\\".v1\"].config.endpoint";
    let mut node = injectable_cluster_node();
    inject_path_value(path, MappingNode::from_string(NEW_ENDPOINT), &mut node, 10).unwrap();

    let injected = get_path_value(path, &node, 10).unwrap();
    assert!(mapping_node_equal(
        injected,
        Some(&MappingNode::from_string(NEW_ENDPOINT))
    ));
}

#[test]
fn test_inject_value_for_array_item() {
    let path = "$[\"cluster\\\".v1\"].config.environments[0]";
    let mut node = injectable_cluster_node();
    inject_path_value(path, MappingNode::from_string(NEW_ENDPOINT), &mut node, 10).unwrap();

    let injected = get_path_value(path, &node, 10).unwrap();
    assert!(mapping_node_equal(
        injected,
        Some(&MappingNode::from_string(NEW_ENDPOINT))
    ));
}

#[test]
fn test_inject_value_for_complex_path() {
    let path = "$[\"cluster\\\".v1\"].config.environments[0].hosts[0].endpoint";
    let mut node = injectable_cluster_node();
    inject_path_value(path, MappingNode::from_string(NEW_ENDPOINT), &mut node, 10).unwrap();

    let injected = get_path_value(path, &node, 10).unwrap();
    assert!(mapping_node_equal(
        injected,
        Some(&MappingNode::from_string(NEW_ENDPOINT))
    ));

    let environments = get_path_value("$[\"cluster\\\".v1\"].config.environments", &node, 10)
        .unwrap()
        .unwrap();
    assert_eq!(environments.as_items().unwrap().len(), 1);
}

#[test]
fn test_inject_fails_when_structure_does_not_match() {
    // "config" is a map, so it cannot be indexed.
    let mut node = injectable_cluster_node();
    let err = inject_path_value(
        "$[\"cluster\\\".v1\"].config[0]",
        MappingNode::from_string(NEW_ENDPOINT),
        &mut node,
        10,
    )
    .unwrap_err();
    assert_eq!(
        err.to_string(),
        "path \"$[\\\"cluster\\\\\\\".v1\\\"].config[0]\" could not be injected into the mapping node, \
         the structure of the mapping node does not match the path"
    );
}

#[test]
fn test_inject_fails_beyond_max_depth() {
    let (mut node, path) = deep_node(30);
    let err = inject_path_value(&path, MappingNode::from_string(NEW_ENDPOINT), &mut node, 10)
        .unwrap_err();
    assert_eq!(err.reason_code(), ErrorReasonCode::MappingPathMaxDepthExceeded);
    assert_eq!(
        err.to_string(),
        "path \"$.field0.field1.field2.field3.field4.field5.field6.\
         field7.field8.field9.field10.field11.field12.field13.field14.\
         field15.field16.field17.field18.field19.field20.field21.field22.\
         field23.field24.field25.field26.field27.field28.field29\" \
         could not be injected into the mapping node, \
         the path goes beyond the maximum depth of the node"
    );
}

#[test]
fn test_inject_leaves_tree_unchanged_on_depth_error() {
    let (mut node, path) = deep_node(12);
    let before = node.clone();
    assert!(inject_path_value(&path, MappingNode::from_int(1), &mut node, 10).is_err());
    assert_eq!(node, before);
}
