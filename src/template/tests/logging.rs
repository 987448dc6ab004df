use super::*;

#[test]
#[serial_test::serial]
fn test_add_and_render_are_logged() {
    let sink = log_sink();
    sink.0.lock().unwrap().clear();

    let mut t = Template::new();
    t.add_parameter("logDomain", Parameter::string()).unwrap();
    t.add_resource("logBucket", bucket()).unwrap();
    t.add_output("logOutput", Output::new(Value::reference("logBucket")))
        .unwrap();
    t.render().unwrap();

    let logs = captured_logs(&sink);
    for phase in ["AddParameter", "AddResource", "AddOutput", "Validated", "Rendered"] {
        assert!(logs.contains(phase), "expected {phase} in logs: {logs}");
    }
    assert!(
        logs.contains("logBucket"),
        "expected resource name in logs: {logs}"
    );
    assert!(
        logs.contains("resources=1") || logs.contains("resources: 1"),
        "expected resource count in logs: {logs}"
    );
}

#[test]
#[serial_test::serial]
fn test_mutation_after_render_warns() {
    let sink = log_sink();
    sink.0.lock().unwrap().clear();

    let mut t = Template::new();
    t.add_resource("earlyBucket", bucket()).unwrap();
    t.render().unwrap();
    t.add_resource("lateBucket", bucket()).unwrap();
    t.add_dependency("lateBucket", "earlyBucket").unwrap();

    let logs = captured_logs(&sink);
    assert!(
        logs.contains("AfterRender"),
        "expected after-render warning in logs: {logs}"
    );
    assert!(logs.contains("WARN"), "expected warn level in logs: {logs}");
    assert!(
        logs.contains("AddDependency"),
        "expected dependency event in logs: {logs}"
    );
}

#[test]
#[serial_test::serial]
fn test_rejected_render_is_logged() {
    let sink = log_sink();
    sink.0.lock().unwrap().clear();

    let mut t = Template::new();
    t.add_resource("rejectedA", bucket().depends_on("rejectedB"))
        .unwrap();
    t.add_resource("rejectedB", bucket().depends_on("rejectedA"))
        .unwrap();
    assert!(t.render().is_err());

    let logs = captured_logs(&sink);
    assert!(logs.contains("Rejected"), "expected rejection in logs: {logs}");
    assert!(
        logs.contains("rejectedA -> rejectedB -> rejectedA"),
        "expected cycle path in logs: {logs}"
    );
}
