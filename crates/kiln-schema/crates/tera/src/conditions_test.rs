// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/spkenv/spk

use std::collections::BTreeSet;

use rstest::rstest;
use serde_json::json;

use super::Conditions;

fn conditions(source: &str) -> Conditions {
    let mut tera = tera::Tera::default();
    tera.add_raw_template("meta.yaml", source).unwrap();
    Conditions::from_ast(&tera.get_template("meta.yaml").unwrap().ast)
}

#[rstest]
#[case("{% if GIT_DESCRIBE_TAG %}x{% endif %}", &["GIT_DESCRIBE_TAG"])]
#[case("{% if not missing %}x{% endif %}", &["missing"])]
#[case("{% if flag and other or a.c %}x{% endif %}", &["a.c", "other"])]
#[case("{% if flag %}x{% elif other %}y{% endif %}", &["other"])]
#[case("{{ a.b or missing }}", &["missing"])]
#[case("{% if missing is defined %}x{% endif %}", &[])]
#[case("{% if missing | default(value=true) %}x{% endif %}", &[])]
#[case("{% if missing == 1 %}x{% endif %}", &[])]
#[case("{% if a.b %}x{% endif %}{% if items.0 %}y{% endif %}", &[])]
#[case("{% for i in items %}{% if i and loop.first %}x{% endif %}{% endfor %}", &[])]
#[case("{% set local = 1 %}{% if local %}x{% endif %}", &[])]
fn test_undefined_conditions(#[case] source: &str, #[case] expected: &[&str]) {
    let data = json!({"a": {"b": 1}, "items": [1], "flag": true});
    let expected: BTreeSet<String> = expected.iter().map(ToString::to_string).collect();
    assert_eq!(conditions(source).undefined(&data), expected, "{source}");
}

#[rstest]
fn test_nested_conditions() {
    let source = "{% if flag %}{% for i in items %}{% if inner %}x{% endif %}{% endfor %}{% endif %}";
    assert_eq!(
        conditions(source).undefined(&json!({"flag": true, "items": []})),
        BTreeSet::from(["inner".to_string()])
    );
}
