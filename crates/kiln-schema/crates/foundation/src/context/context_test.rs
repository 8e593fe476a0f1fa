// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/spkenv/spk

use rstest::rstest;

use super::{Context, Fact, Interpreter, Os, Platform, dotted_version, version_number};

fn linux64() -> Context {
    Context::new(Platform::new(Os::Linux, 64))
        .with_interpreter(Interpreter::Python, "3.6")
        .with_interpreter(Interpreter::Numpy, "1.11")
        .with_interpreter(Interpreter::Lua, "2.0")
}

#[rstest]
#[case("27", "2.7")]
#[case("36", "3.6")]
#[case("310", "3.10")]
#[case("111", "1.11")]
#[case("3.6", "3.6")]
#[case("5", "5")]
fn test_dotted_version(#[case] version: &str, #[case] expected: &str) {
    assert_eq!(dotted_version(version), expected);
}

#[rstest]
#[case("3.6", Some(36))]
#[case("1.11", Some(111))]
#[case("27", Some(27))]
#[case("abc", None)]
fn test_version_number(#[case] version: &str, #[case] expected: Option<i64>) {
    assert_eq!(version_number(version), expected);
}

#[rstest]
#[case("python", Some(Interpreter::Python))]
#[case("numpy", Some(Interpreter::Numpy))]
#[case("r-base", Some(Interpreter::R))]
#[case("r", Some(Interpreter::R))]
#[case("scipy", None)]
fn test_interpreter_for_package(#[case] name: &str, #[case] expected: Option<Interpreter>) {
    assert_eq!(Interpreter::for_package(name), expected);
}

#[rstest]
fn test_facts_platform_flags() {
    let facts = linux64().facts();
    assert_eq!(facts.get("linux"), Some(&Fact::Bool(true)));
    assert_eq!(facts.get("linux64"), Some(&Fact::Bool(true)));
    assert_eq!(facts.get("unix"), Some(&Fact::Bool(true)));
    assert_eq!(facts.get("x86_64"), Some(&Fact::Bool(true)));
    assert_eq!(facts.get("win"), Some(&Fact::Bool(false)));
    assert_eq!(facts.get("armv7l"), Some(&Fact::Bool(false)));
}

#[rstest]
fn test_facts_interpreters() {
    let facts = linux64().facts();
    assert_eq!(facts.get("py"), Some(&Fact::Int(36)));
    assert_eq!(facts.get("py3k"), Some(&Fact::Bool(true)));
    assert_eq!(facts.get("py2k"), Some(&Fact::Bool(false)));
    assert_eq!(facts.get("py36"), Some(&Fact::Bool(true)));
    assert_eq!(facts.get("np"), Some(&Fact::Int(111)));
    assert_eq!(facts.get("luajit"), Some(&Fact::Bool(true)));
    assert_eq!(facts.get("pl"), None, "unconfigured perl should not be a fact");
}

#[rstest]
fn test_facts_precedence() {
    let facts = linux64()
        .with_feature("mkl", true)
        .with_feature("linux", false)
        .with_environ([("HOME", "/home/kiln"), ("py", "nope"), ("mkl", "env")])
        .facts();
    assert_eq!(facts.get("HOME"), Some(&Fact::Str("/home/kiln".into())));
    assert_eq!(facts.get("mkl"), Some(&Fact::Bool(true)), "features win over env");
    assert_eq!(facts.get("py"), Some(&Fact::Int(36)), "facts win over env");
    assert_eq!(facts.get("linux"), Some(&Fact::Bool(true)), "facts win over features");
    let Some(Fact::Mapping(environ)) = facts.get("environ") else {
        panic!("environ should be a mapping fact");
    };
    assert_eq!(environ.get("HOME").map(String::as_str), Some("/home/kiln"));
}
