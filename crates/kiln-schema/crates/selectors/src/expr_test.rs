// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/spkenv/spk

use std::collections::BTreeMap;

use rstest::{fixture, rstest};

use crate::parsing::parse_expression;
use crate::{EvalError, Namespace, Value};

#[fixture]
fn namespace() -> Namespace {
    let environ = BTreeMap::from([("CI".to_string(), "true".to_string())]);
    [
        ("linux", Value::Bool(true)),
        ("win", Value::Bool(false)),
        ("py", Value::Int(36)),
        ("np", Value::Int(111)),
        ("pl", Value::Str("5.20.3".into())),
        ("environ", Value::Map(environ)),
    ]
    .into_iter()
    .collect()
}

fn eval(source: &str, namespace: &Namespace) -> Result<Value, EvalError> {
    parse_expression(source)
        .expect("expression should parse")
        .eval(namespace)
}

#[rstest]
#[case("linux", Value::Bool(true))]
#[case("not win", Value::Bool(true))]
#[case("linux and py", Value::Int(36))]
#[case("win and undefined_name", Value::Bool(false))]
#[case("win or py", Value::Int(36))]
#[case("linux or undefined_name", Value::Bool(true))]
#[case("py >= 27", Value::Bool(true))]
#[case("27 <= py < 35", Value::Bool(false))]
#[case("py in (27, 36)", Value::Bool(true))]
#[case("py not in [27, 36]", Value::Bool(false))]
#[case("py // 10", Value::Int(3))]
#[case("-7 // 2", Value::Int(-4))]
#[case("-7 % 2", Value::Int(1))]
#[case("7 % -2", Value::Int(-1))]
#[case("np - 100 * 1", Value::Int(11))]
#[case("linux + 1", Value::Int(2))]
#[case("True == 1", Value::Bool(true))]
#[case("'5.' in pl", Value::Bool(true))]
#[case("pl.startswith('5')", Value::Bool(true))]
#[case("pl.endswith(('.2', '.3'))", Value::Bool(true))]
#[case("pl[0]", Value::Str("5".into()))]
#[case("pl[-1]", Value::Str("3".into()))]
#[case("'a' + 'b' * 2", Value::Str("abb".into()))]
#[case("environ['CI'] == 'true'", Value::Bool(true))]
#[case("environ.get('HOME')", Value::None)]
#[case("environ.get('HOME', 'none')", Value::Str("none".into()))]
#[case("'CI' in environ", Value::Bool(true))]
#[case("None == None", Value::Bool(true))]
#[case("(1, 2) < (1, 3)", Value::Bool(true))]
fn test_eval(#[case] source: &str, #[case] expected: Value, namespace: Namespace) {
    assert_eq!(eval(source, &namespace), Ok(expected), "{source}");
}

#[rstest]
#[case("osx", EvalError::UndefinedName("osx".into()))]
#[case("py // 0", EvalError::DivisionByZero)]
#[case("'a' * 999999999999999 == ''", EvalError::Overflow)]
#[case("70000 * 'a'", EvalError::Overflow)]
#[case("environ['HOME']", EvalError::KeyNotFound("HOME".into()))]
#[case("pl[10]", EvalError::IndexOutOfRange(10))]
#[case("pl.lower()", EvalError::UnknownMethod { target: "str", method: "lower".into() })]
#[case(
    "py < 'a'",
    EvalError::UnsupportedOperands { op: "<", left: "int", right: "str" }
)]
#[case(
    "py + 'a'",
    EvalError::UnsupportedOperands { op: "+", left: "int", right: "str" }
)]
#[case(
    "-pl",
    EvalError::UnsupportedOperand { op: "unary -", operand: "str" }
)]
fn test_eval_errors(#[case] source: &str, #[case] expected: EvalError, namespace: Namespace) {
    assert_eq!(eval(source, &namespace), Err(expected), "{source}");
}

#[rstest]
#[case(Value::None, false)]
#[case(Value::Int(0), false)]
#[case(Value::Int(-1), true)]
#[case(Value::Str(String::new()), false)]
#[case(Value::Seq(vec![Value::None]), true)]
#[case(Value::Map(BTreeMap::new()), false)]
fn test_truthiness(#[case] value: Value, #[case] expected: bool) {
    assert_eq!(value.is_truthy(), expected);
}
