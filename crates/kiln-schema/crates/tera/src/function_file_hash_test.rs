// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/spkenv/spk

use rstest::rstest;
use serde_json::json;

use crate::Template;

#[rstest]
fn test_file_hash_relative_to_recipe() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("LICENSE"), "hello").unwrap();
    let tpl = Template::new(
        "meta.yaml",
        r#"md5: {{ file_hash(path="LICENSE", algorithm="md5") }}"#,
        Some(dir.path()),
    )
    .unwrap();
    let rendered = tpl.render(&json!({})).unwrap();
    assert_eq!(rendered, "md5: 5d41402abc4b2a76b9719d911017c592");
}

#[rstest]
#[case(r#"{{ file_hash() }}"#)]
#[case(r#"{{ file_hash(path="missing.txt") }}"#)]
#[case(r#"{{ file_hash(path="LICENSE", algorithm="crc32") }}"#)]
#[case(r#"{{ file_hash(path="LICENSE", extra=1) }}"#)]
fn test_file_hash_errors(#[case] source: &str) {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("LICENSE"), "hello").unwrap();
    let tpl = Template::new("meta.yaml", source, Some(dir.path())).unwrap();
    tpl.render(&json!({})).expect_err("expected file_hash to fail");
}
