// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/spkenv/spk

use indexmap::IndexMap;
use rstest::rstest;
use serde_json::json;

use super::{Global, GlobalsProvider, NoGlobals, RenderScope, template_data};
use crate::{Context, Interpreter, Os, Platform};

fn context() -> Context {
    Context::new(Platform::new(Os::Linux, 64))
        .with_interpreter(Interpreter::Python, "2.7")
        .with_environ([("PKG_BUILDNUM", "3")])
}

fn source_globals(scope: &RenderScope<'_>) -> IndexMap<String, Global> {
    let mut globals = IndexMap::new();
    globals.insert("GIT_DESCRIBE_TAG".to_string(), Global::Value(json!("v1.2")));
    globals.insert(
        "GIT_FULL_HASH".to_string(),
        Global::Unavailable("source has not been fetched".into()),
    );
    globals.insert("pass".to_string(), Global::Value(json!(scope.pass())));
    globals
}

#[rstest]
fn test_scope_outside_of_render() {
    let context = context();
    let scope = RenderScope::new(&context);
    assert!(!scope.is_rendering());
    assert_eq!(scope.pass(), 0);
    assert!(scope.previous().is_none());
}

#[rstest]
fn test_scope_for_pass() {
    let context = context();
    let scope = RenderScope::for_pass(&context, 2, None, None);
    assert!(scope.is_rendering());
    assert_eq!(scope.pass(), 2);
}

#[rstest]
fn test_template_data_has_context_facts() {
    let context = context();
    let data = template_data(&RenderScope::new(&context), &NoGlobals);
    assert_eq!(data["linux64"], json!(true));
    assert_eq!(data["py"], json!(27));
    assert_eq!(data["py27"], json!(true));
    assert_eq!(data["PKG_BUILDNUM"], json!("3"));
    assert_eq!(data["environ"], json!({"PKG_BUILDNUM": "3"}));
}

#[rstest]
fn test_template_data_skips_unavailable_globals() {
    let context = context();
    let scope = RenderScope::for_pass(&context, 1, None, None);
    let data = template_data(&scope, &source_globals);
    assert_eq!(data["GIT_DESCRIBE_TAG"], json!("v1.2"));
    assert_eq!(data["pass"], json!(1));
    assert!(!data.contains_key("GIT_FULL_HASH"));
}

#[rstest]
fn test_no_globals() {
    let context = context();
    assert!(NoGlobals.globals(&RenderScope::new(&context)).is_empty());
}
