//! End-to-end scenarios and invariants against the public `Template`
//! façade, exercised as a black box — no internal modules touched.

use parchment::Template;
use serde_json::{json, Value};

fn render(source: &str, data: Value) -> Result<String, parchment::Error> {
    let mut t = Template::create("t");
    t.parse(source)?;
    let mut out = String::new();
    t.execute(&mut out, data)?;
    Ok(out)
}

#[test]
fn literal_text() {
    assert_eq!(render("hello world", Value::Null).unwrap(), "hello world");
}

#[test]
fn field_access() {
    assert_eq!(render("{{.x}}", json!({"x": "x"})).unwrap(), "x");
}

#[test]
fn custom_delimiters() {
    let mut t = Template::create("t");
    t.set_delimiters(Some("<<"), Some(">>"));
    t.parse(r#"<<.msg>><<"<<">>"#).unwrap();
    let mut out = String::new();
    t.execute(&mut out, json!({"msg": "hello world"})).unwrap();
    assert_eq!(out, "hello world<<");
}

#[test]
fn for_over_mapping_list() {
    let src = "Hello{{ for .recipientData }}, {{ .firstName }}{{ end }}";
    let data = json!({"recipientData": [{"firstName": "John"}, {"firstName": "Jane"}]});
    assert_eq!(render(src, data).unwrap(), "Hello, John, Jane");
}

#[test]
fn pipeline_with_urlencode() {
    let src = "Hello {{ .email | urlencode }}";
    let data = json!({"email": "test+user@carepay.com"});
    assert_eq!(render(src, data).unwrap(), "Hello test%2Buser%40carepay.com");
}

#[test]
fn default_with_missing_and_present_value() {
    let src = r#"Hello {{ .email | default "user@host.com" }}"#;
    assert_eq!(render(src, json!({})).unwrap(), "Hello user@host.com");
    assert_eq!(
        render(src, json!({"email": "john@doe.com"})).unwrap(),
        "Hello john@doe.com"
    );
}

#[test]
fn define_and_template_invocation() {
    let mut t = Template::create("main");
    t.parse(r#"{{define "foo"}} FOO {{end}}{{define "bar"}} BAR {{end}}"#).unwrap();

    let mut foo_out = String::new();
    t.execute_template(&mut foo_out, "foo", Value::Null).unwrap();
    assert_eq!(foo_out, " FOO ");

    let mut bar_out = String::new();
    t.execute_template(&mut bar_out, "bar", Value::Null).unwrap();
    assert_eq!(bar_out, " BAR ");

    let names: Vec<String> = t.get_templates().iter().map(|tpl| tpl.name().to_string()).collect();
    assert!(names.contains(&"foo".to_string()));
    assert!(names.contains(&"bar".to_string()));
}

#[test]
fn parse_error_carries_position_of_the_unterminated_construct() {
    let mut t = Template::create("main");
    let err = t.parse(r#"{{define "foo"}} FOO "#).unwrap_err();
    let message = err.to_string();
    assert!(message.contains("main"));
    assert!(message.contains(':'));
}

#[test]
fn empty_definition_does_not_clobber_a_prior_non_empty_one() {
    let mut t = Template::create("main");
    t.parse(r#"{{define "x"}}keep{{end}}"#).unwrap();
    t.parse(r#"{{define "x"}} {{end}}"#).unwrap();
    let mut out = String::new();
    t.execute_template(&mut out, "x", Value::Null).unwrap();
    assert_eq!(out, "keep");
}

#[test]
fn truthiness_is_total_for_every_adapter_kind() {
    let cases = [
        json!(null),
        json!(true),
        json!(false),
        json!(0),
        json!(1),
        json!(-1),
        json!(""),
        json!("x"),
        json!([]),
        json!([1]),
        json!({}),
        json!({"k": 1}),
    ];
    for case in cases {
        let truthy = render("{{if .}}T{{else}}F{{end}}", case.clone()).unwrap();
        assert!(truthy == "T" || truthy == "F", "value {case:?} rendered {truthy:?}");
    }
}

#[test]
fn pipeline_fold_applies_each_stage_to_the_previous_result() {
    let src = "{{.n | add 1 | mul 10}}";
    assert_eq!(render(src, json!({"n": 2})).unwrap(), "30");
}

#[test]
fn variable_scoping_does_not_leak_past_the_closing_end() {
    let mut t = Template::create("main");
    let err = t.parse("{{if true}}{{$x := 1}}{{end}}{{$x}}").unwrap_err();
    assert!(err.to_string().to_lowercase().contains("undefined variable"));
}

#[test]
fn recursive_self_invocation_hits_the_depth_limit_instead_of_overflowing_the_stack() {
    let mut t = Template::create("main");
    t.parse(r#"{{define "loop"}}{{template "loop" .}}{{end}}{{template "loop" .}}"#).unwrap();
    let mut out = String::new();
    let err = t.execute(&mut out, Value::Null).unwrap_err();
    assert!(err.to_string().contains("depth"));
}
