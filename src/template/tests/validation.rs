use super::*;

#[test]
fn test_undeclared_condition_on_resource() {
    let mut t = Template::new();
    t.add_resource(
        "aliasRecord",
        Resource::new("AWS::Route53::RecordSet").with_condition("zoneIdSet"),
    )
    .unwrap();

    let err = t.render().unwrap_err();
    assert_eq!(
        err,
        TemplateError::UnresolvedReference {
            kind: ReferenceKind::Condition,
            name: "zoneIdSet".to_string(),
            referrer: "aliasRecord".to_string(),
        }
    );
}

#[test]
fn test_mutual_depends_on_is_a_cycle() {
    let mut t = Template::new();
    t.add_resource("A", bucket().depends_on("B")).unwrap();
    t.add_resource("B", bucket().depends_on("A")).unwrap();

    assert_eq!(
        t.render().unwrap_err(),
        TemplateError::CyclicDependency {
            path: vec!["A".to_string(), "B".to_string(), "A".to_string()],
        }
    );
}

#[parameterized(
    depends_on = { bucket().depends_on("B"), bucket().depends_on("A") },
    get_att = { bucket().with_property("P", Value::get_att("B", "Arn")), bucket().with_property("Q", Value::reference("A")) },
    sub = { bucket().with_property("P", Value::sub("${B}")), bucket().with_property("Q", Value::sub("${A.Arn}")) },
    nested = {
        bucket().with_property("P", Value::object([("Deep", Value::list([Value::reference("B")]))])),
        bucket().depends_on("A")
    },
    json_refs = {
        bucket().with_property("R", json!({"Ref": "B"})),
        bucket().with_property("S", json!({"Ref": "A"}))
    },
    json_get_att = {
        bucket().with_property("R", json!({"Tags": [{"Value": {"Fn::GetAtt": ["B", "Arn"]}}]})),
        bucket().with_property("S", Value::literal(json!({"Ref": "A"})))
    },
)]
fn test_two_resource_cycles_name_both(a: Resource, b: Resource) {
    let mut t = Template::new();
    t.add_resource("A", a).unwrap();
    t.add_resource("B", b).unwrap();

    match t.render() {
        Err(TemplateError::CyclicDependency { path }) => {
            assert!(path.contains(&"A".to_string()));
            assert!(path.contains(&"B".to_string()));
            assert_eq!(path.first(), path.last());
        }
        other => panic!("expected a cycle, got {other:?}"),
    }
}

#[parameterized(
    reference = { Value::reference("ghost"), ReferenceKind::Ref },
    get_att = { Value::get_att("ghost", "Arn"), ReferenceKind::GetAtt },
    sub = { Value::sub("prefix-${ghost}"), ReferenceKind::Sub },
    sub_attribute = { Value::sub("${ghost.Arn}"), ReferenceKind::GetAtt },
    if_condition = { Value::if_condition("ghost", "a", "b"), ReferenceKind::Condition },
    nested_join = { Value::join("-", [Value::from("x"), Value::reference("ghost")]), ReferenceKind::Ref },
    json_ref = { Value::from(json!({"Ref": "ghost"})), ReferenceKind::Ref },
    json_nested_get_att = { Value::literal(json!([{"Arn": {"Fn::GetAtt": ["ghost", "Arn"]}}])), ReferenceKind::GetAtt },
    json_sub = { Value::from(json!({"Fn::Sub": "${ghost}.example.com"})), ReferenceKind::Sub },
)]
fn test_unresolved_references(value: Value, kind: ReferenceKind) {
    let mut t = Template::new();
    t.add_resource("site", bucket().with_property("P", value)).unwrap();

    assert_eq!(
        t.render().unwrap_err(),
        TemplateError::unresolved(kind, "ghost", "site")
    );
}

#[test]
fn test_references_must_match_entity_kind() {
    let mut t = Template::new();
    t.add_parameter("domainName", Parameter::string()).unwrap();
    t.add_resource("site", bucket().with_property("P", Value::get_att("domainName", "Arn")))
        .unwrap();
    assert_eq!(
        t.render().unwrap_err(),
        TemplateError::unresolved(ReferenceKind::GetAtt, "domainName", "site")
    );

    let mut t = Template::new();
    t.add_parameter("domainName", Parameter::string()).unwrap();
    t.add_resource("site", bucket().with_condition("domainName"))
        .unwrap();
    assert_eq!(
        t.render().unwrap_err(),
        TemplateError::unresolved(ReferenceKind::Condition, "domainName", "site")
    );
}

#[test]
fn test_output_references_are_checked() {
    let mut t = Template::new();
    t.add_output("DistributionId", Output::new(Value::reference("myDistribution")))
        .unwrap();
    assert_eq!(
        t.render().unwrap_err(),
        TemplateError::unresolved(ReferenceKind::Ref, "myDistribution", "DistributionId")
    );

    let mut t = Template::new();
    t.add_resource("myDistribution", bucket()).unwrap();
    t.add_output(
        "DistributionId",
        Output::new(Value::reference("myDistribution")).with_condition("isProd"),
    )
    .unwrap();
    assert_eq!(
        t.render().unwrap_err(),
        TemplateError::unresolved(ReferenceKind::Condition, "isProd", "DistributionId")
    );
}

#[test]
fn test_pseudo_parameters_resolve_without_declaration() {
    let mut t = Template::new();
    t.add_resource(
        "site",
        bucket()
            .with_property("Name", PseudoParameter::StackName)
            .with_property("Region", Value::sub("${AWS::Region}-${AWS::AccountId}"))
            .with_property("Nothing", PseudoParameter::NoValue),
    )
    .unwrap();
    assert!(t.validate().is_ok());
}

#[test]
fn test_forward_references_between_resources() {
    let mut t = Template::new();
    t.add_resource("alias", bucket().with_property("Target", Value::get_att("dist", "DomainName")))
        .unwrap();
    t.add_resource("dist", bucket()).unwrap();
    assert!(t.render().is_ok());
}

#[test]
fn test_escaped_and_explicit_sub_variables() {
    let mut t = Template::new();
    t.add_parameter("domainName", Parameter::string()).unwrap();
    t.add_resource(
        "site",
        bucket().with_property(
            "P",
            Value::sub_with(
                "${!Literal}-${host}",
                [("host", Value::reference("domainName"))],
            ),
        ),
    )
    .unwrap();
    assert!(t.validate().is_ok());
}

#[parameterized(
    empty_join = { Value::join("", Vec::<Value>::new()) },
    empty_attribute = { Value::get_att("other", "") },
    empty_ref = { Value::reference("") },
    equals_in_property = { Value::equals("a", "b") },
    object_key_get_att = { Value::object([("Fn::GetAtt", Value::list(["nowhere", "Arn"]))]) },
    object_key_ref = { Value::object([("Tags", Value::object([("Ref", "other")]))]) },
    json_malformed_ref = { Value::from(json!({"Ref": 3})) },
    raw_literal_ref = { Value::Literal(json!({"Bucket": {"Ref": "ghost"}})) },
)]
fn test_malformed_intrinsics_fail_render(value: Value) {
    let mut t = Template::new();
    t.add_resource("other", bucket()).unwrap();
    t.add_resource("site", bucket().with_property("P", value))
        .unwrap();
    assert!(matches!(
        t.render(),
        Err(TemplateError::MalformedIntrinsic { ref entity, .. }) if entity == "site"
    ));
}

#[test]
fn test_condition_must_be_boolean() {
    let mut t = Template::new();
    t.add_parameter("env", Parameter::string()).unwrap();

    let err = t
        .add_condition("notBoolean", Value::reference("env"))
        .unwrap_err();
    assert_eq!(
        err,
        TemplateError::InvalidCondition {
            name: "notBoolean".to_string(),
            reason: "expected a boolean expression, found Ref".to_string(),
        }
    );
    assert!(t.condition("notBoolean").is_none());
}

#[parameterized(
    undeclared_parameter = {
        Value::equals(Value::reference("missing"), "x"),
        "references undeclared parameter 'missing'"
    },
    resource_operand = {
        Value::equals(Value::reference("site"), "x"),
        "references Resource 'site', conditions may only reference parameters"
    },
    undeclared_condition = {
        Value::not(Value::condition("missing")),
        "references undeclared condition 'missing'"
    },
    get_att_operand = {
        Value::equals(Value::get_att("site", "Arn"), "x"),
        "Fn::GetAtt is not allowed in a condition"
    },
    boolean_operand = {
        Value::equals(Value::not(Value::equals("a", "b")), "x"),
        "Fn::Not used where a value is expected"
    },
    literal_leaf = {
        Value::and([Value::condition("base"), Value::from(true)]),
        "expected a boolean expression, found a literal"
    },
    sub_attribute = {
        Value::equals(Value::sub("${site.Arn}"), "x"),
        "Fn::Sub placeholder '${site.Arn}' reads a resource attribute"
    },
)]
fn test_invalid_conditions(expression: Value, reason: &str) {
    let mut t = Template::new();
    t.add_parameter("env", Parameter::string()).unwrap();
    t.add_condition("base", Value::equals(Value::reference("env"), "prod"))
        .unwrap();
    t.add_resource("site", bucket()).unwrap();

    assert_eq!(
        t.add_condition("broken", expression).unwrap_err(),
        TemplateError::InvalidCondition {
            name: "broken".to_string(),
            reason: reason.to_string(),
        }
    );
}

#[test]
fn test_condition_combinators_need_two_operands() {
    let mut t = Template::new();
    t.add_parameter("env", Parameter::string()).unwrap();
    t.add_condition("base", Value::equals(Value::reference("env"), "prod"))
        .unwrap();

    assert_eq!(
        t.add_condition("lonely", Value::or([Value::condition("base")]))
            .unwrap_err(),
        TemplateError::malformed("lonely", "Fn::Or requires at least two conditions")
    );
}

#[test]
fn test_valid_condition_operands() {
    let mut t = Template::new();
    t.add_parameter("env", Parameter::string()).unwrap();
    t.add_parameter("zones", Parameter::new(ParameterType::CommaDelimitedList))
        .unwrap();

    t.add_condition(
        "firstZoneIsA",
        Value::equals(Value::select(0, Value::reference("zones")), "a"),
    )
    .unwrap();
    t.add_condition(
        "prodInRegion",
        Value::equals(
            Value::join("-", [Value::reference("env"), PseudoParameter::Region.reference()]),
            Value::sub("prod-${AWS::Region}"),
        ),
    )
    .unwrap();
    t.add_condition(
        "splitMatch",
        Value::equals(Value::list(["a"]), Value::split(",", Value::reference("env"))),
    )
    .unwrap();
    assert_eq!(t.conditions().count(), 3);
}

#[test]
fn test_render_is_all_or_nothing() {
    let mut t = full_site_template();
    t.add_output("broken", Output::new(Value::reference("nowhere")))
        .unwrap();
    assert!(t.render().is_err());
    assert_eq!(t.state(), TemplateState::Open);
}

#[test]
fn test_strict_render_with_catalog() {
    let t = full_site_template();
    assert!(t.render_strict(static_site_catalog()).is_ok());

    let mut t = full_site_template();
    t.add_resource("server", Resource::new("AWS::EC2::Instance"))
        .unwrap();
    assert_eq!(
        t.render_strict(static_site_catalog()).unwrap_err(),
        TemplateError::UnknownResourceType {
            name: "server".to_string(),
            resource_type: "AWS::EC2::Instance".to_string(),
        }
    );
    // The plain render does not consult a catalog.
    assert!(t.render().is_ok());

    let mut t = Template::new();
    t.add_resource("site", bucket().with_property("Colour", "blue"))
        .unwrap();
    let catalog = StaticCatalog::new().with_type("AWS::S3::Bucket", ["BucketName"]);
    assert_eq!(
        t.render_strict(&catalog).unwrap_err(),
        TemplateError::UnknownProperty {
            name: "site".to_string(),
            resource_type: "AWS::S3::Bucket".to_string(),
            property: "Colour".to_string(),
        }
    );
}

#[test]
fn test_strict_render_reports_graph_errors_first() {
    let mut t = Template::new();
    t.add_resource("server", Resource::new("AWS::EC2::Instance").depends_on("ghost"))
        .unwrap();
    assert_eq!(
        t.render_strict(static_site_catalog()).unwrap_err(),
        TemplateError::unresolved(ReferenceKind::DependsOn, "ghost", "server")
    );
}

#[test]
fn test_creation_order() {
    let t = full_site_template();
    let order = t.creation_order().unwrap();
    assert_eq!(
        order,
        vec!["myCert", "myBucket", "myBucketPolicy", "myDistribution", "aliasDnsRecord"]
    );

    let position = |name: &str| order.iter().position(|n| n == name).unwrap();
    assert!(position("myCert") < position("myDistribution"));
    assert!(position("myDistribution") < position("aliasDnsRecord"));
}

#[test]
fn test_creation_order_follows_sub_placeholders() {
    let mut t = Template::new();
    t.add_resource("first", bucket().with_property("Name", Value::sub("${second.Arn}")))
        .unwrap();
    t.add_resource("second", bucket()).unwrap();
    assert_eq!(t.creation_order().unwrap(), vec!["second", "first"]);
    assert_eq!(
        t.dependency_graph().dependencies_of("first"),
        &[("second".to_string(), crate::graph::DependencyEdge::GetAtt)]
    );
}

#[test]
fn test_creation_order_rejects_invalid_templates() {
    let mut t = Template::new();
    t.add_resource("A", bucket().depends_on("B")).unwrap();
    t.add_resource("B", bucket().with_property("P", Value::reference("A")))
        .unwrap();
    assert!(matches!(
        t.creation_order(),
        Err(TemplateError::CyclicDependency { .. })
    ));
}

#[test]
fn test_intrinsic_shaped_data_never_renders() {
    let mut t = Template::new();
    t.add_resource("A", bucket().with_property("P", json!({"Ref": "ghost"})))
        .unwrap();
    t.add_resource(
        "B",
        bucket().with_property("Q", Value::object([("Fn::GetAtt", vec!["nowhere", "Arn"])])),
    )
    .unwrap();

    assert_eq!(
        t.render().unwrap_err(),
        TemplateError::unresolved(ReferenceKind::Ref, "ghost", "A")
    );
    assert_eq!(t.state(), TemplateState::Open);
}

#[test]
fn test_json_properties_with_declared_names_render() {
    let mut t = Template::new();
    t.add_parameter("domainName", Parameter::string()).unwrap();
    t.add_resource("myBucket", bucket()).unwrap();
    t.add_resource(
        "site",
        bucket().with_property(
            "Config",
            json!({
                "Alias": {"Ref": "domainName"},
                "Origin": {"Fn::GetAtt": ["myBucket", "DomainName"]},
                "Statement": {"Effect": "Allow", "Condition": {"Bool": {"aws:SecureTransport": "true"}}}
            }),
        ),
    )
    .unwrap();

    assert_eq!(t.creation_order().unwrap(), vec!["myBucket", "site"]);
    assert_eq!(
        rendered_json(&t)["Resources"]["site"]["Properties"]["Config"]["Origin"],
        json!({"Fn::GetAtt": ["myBucket", "DomainName"]})
    );
}
