// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/spkenv/spk

use rstest::rstest;

use super::{FieldValue, yaml11_bool};

#[rstest]
#[case("yes", Some(true))]
#[case("On", Some(true))]
#[case("TRUE", Some(true))]
#[case("y", Some(true))]
#[case("off", Some(false))]
#[case("No", Some(false))]
#[case("n", Some(false))]
#[case("1", None)]
#[case("", None)]
#[case("maybe", None)]
fn test_yaml11_bool(#[case] value: &str, #[case] expected: Option<bool>) {
    assert_eq!(yaml11_bool(value), expected);
}

#[rstest]
#[case(FieldValue::from(""), false)]
#[case(FieldValue::from("x"), true)]
#[case(FieldValue::from(false), false)]
#[case(FieldValue::from(vec!["a"]), true)]
#[case(FieldValue::List(Vec::new()), false)]
fn test_field_value_truthy(#[case] value: FieldValue, #[case] expected: bool) {
    assert_eq!(value.is_truthy(), expected);
}

#[rstest]
fn test_field_value_serialize() {
    let value = FieldValue::from(vec!["python", "numpy"]);
    assert_eq!(
        serde_json::to_value(&value).unwrap(),
        serde_json::json!(["python", "numpy"])
    );
    assert_eq!(
        serde_json::to_value(FieldValue::from(true)).unwrap(),
        serde_json::json!(true)
    );
}
