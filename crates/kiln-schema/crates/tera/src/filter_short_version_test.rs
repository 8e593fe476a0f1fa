// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/spkenv/spk

use rstest::rstest;
use serde_json::json;

#[rstest]
#[case("{{ version | short_version }}", "1.2")]
#[case("{{ version | short_version(parts=1) }}", "1")]
#[case("{{ version | short_version(parts=5) }}", "1.2.3")]
fn test_short_version(#[case] tpl: &str, #[case] expected: &str) {
    let data = json!({"version": "1.2.3"});
    let rendered =
        crate::render_template("test", tpl, &data).expect("template should not fail to render");
    assert_eq!(rendered, expected);
}

#[rstest]
#[case("{{ version | short_version(parts=0) }}")]
#[case("{{ version | short_version(parts='2') }}")]
#[case("{{ [1] | short_version }}")]
fn test_short_version_invalid(#[case] tpl: &str) {
    let data = json!({"version": "1.2.3"});
    crate::render_template("test", tpl, &data).expect_err("template should fail to render");
}
