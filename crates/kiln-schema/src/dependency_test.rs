// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/spkenv/spk

use std::str::FromStr;

use rstest::{fixture, rstest};

use super::{DependencyKind, DependencySpec, resolve_requirements};
use crate::{Context, Error, Interpreter, Os, Platform};

#[fixture]
fn context() -> Context {
    Context::new(Platform::new(Os::Linux, 64))
        .with_interpreter(Interpreter::Python, "3.6")
        .with_interpreter(Interpreter::Numpy, "1.15")
        .with_interpreter(Interpreter::Perl, "5.20.3")
}

fn resolve(
    context: &Context,
    requirements: &[&str],
    kind: DependencyKind,
) -> crate::Result<Vec<String>> {
    let deps = resolve_requirements("mypkg", requirements, context, false, kind)?;
    Ok(deps.iter().map(ToString::to_string).collect())
}

#[rstest]
#[case("python", 1)]
#[case("python 2.7*", 2)]
#[case("python 2.7* py27_0", 3)]
fn test_parse_spec(#[case] spec: &str, #[case] strictness: usize) {
    let dep = DependencySpec::from_str(spec).unwrap();
    assert_eq!(dep.name, "python");
    assert_eq!(dep.strictness(), strictness);
    assert_eq!(dep.to_string(), spec);
}

#[rstest]
#[case("")]
#[case("   ")]
#[case("a b c d")]
fn test_parse_invalid_spec(#[case] spec: &str) {
    let err = DependencySpec::from_str(spec).unwrap_err();
    assert!(err.to_string().starts_with("Invalid package specification"));
}

#[rstest]
#[case(&["python"], DependencyKind::Run, &["python 3.6*"])]
#[case(&["numpy"], DependencyKind::Run, &["numpy"])]
#[case(&["numpy"], DependencyKind::Build, &["numpy 1.15*"])]
#[case(&["numpy x.x"], DependencyKind::Run, &["numpy 1.15*"])]
#[case(&["python >=2.7"], DependencyKind::Run, &["python >=2.7"])]
#[case(&["python 2.7* py27_0"], DependencyKind::Build, &["python 2.7* py27_0"])]
#[case(&["perl", "zlib 1.2*"], DependencyKind::Run, &["perl 5.20.3*", "zlib 1.2*"])]
#[case(&["lua"], DependencyKind::Run, &["lua"])]
fn test_resolve_requirements(
    context: Context,
    #[case] requirements: &[&str],
    #[case] kind: DependencyKind,
    #[case] expected: &[&str],
) {
    assert_eq!(resolve(&context, requirements, kind).unwrap(), expected);
}

#[rstest]
fn test_undotted_versions_are_dotted(context: Context) {
    let context = context.with_interpreter(Interpreter::Python, "27");
    assert_eq!(
        resolve(&context, &["python"], DependencyKind::Run).unwrap(),
        vec!["python 2.7*"]
    );
}

#[rstest]
fn test_noarch_python_is_not_bound(context: Context) {
    let deps = resolve_requirements("mypkg", &["python", "numpy"][..], &context, true, DependencyKind::Run)
        .unwrap();
    assert_eq!(deps, vec![DependencySpec::new("python"), DependencySpec::new("numpy")]);
}

#[rstest]
fn test_missing_configured_version(context: Context) {
    let context = context.without_interpreter(Interpreter::Numpy);
    let err = resolve(&context, &["numpy x.x"], DependencyKind::Build).unwrap_err();
    match err {
        Error::MissingRequiredField(message) => {
            assert_eq!(message, "'numpy x.x' requires external setting");
        }
        err => panic!("expected a missing field error, got: {err}"),
    }
}

#[rstest]
fn test_self_dependency(context: Context) {
    let err = resolve(&context, &["zlib", "mypkg 1.0"], DependencyKind::Run).unwrap_err();
    assert!(matches!(err, Error::SelfDependency(name) if name == "mypkg"));
}

#[rstest]
#[case("python>=2.7", "Perhaps you meant 'python >=2.7'")]
#[case("python >= 2.7", "Perhaps you meant 'python >=2.7'")]
#[case("python == 2.7", "Perhaps you meant 'python ==2.7'")]
#[case("foo@bar", "bad character '@' in package name dependency 'foo@bar'")]
fn test_malformed_operators(context: Context, #[case] spec: &str, #[case] expected: &str) {
    let err = resolve(&context, &[spec], DependencyKind::Run).unwrap_err();
    assert!(matches!(err, Error::InvalidFieldValue(_)));
    let message = err.to_string();
    assert!(
        message.contains(expected),
        "expected '{expected}' in: {message}"
    );
}

#[rstest]
fn test_dependency_kind_field() {
    assert_eq!(DependencyKind::Conflicts.field(), "requirements/conflicts");
    assert_eq!(DependencyKind::from_str("run").unwrap(), DependencyKind::Run);
}
