// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/spkenv/spk

use rstest::{fixture, rstest};
use serde_json::json;

use crate::{Context, FieldValue, Interpreter, Os, Platform, RecipeDocument, Resolver};

#[fixture]
fn linux64() -> Context {
    Context::new(Platform::new(Os::Linux, 64))
        .with_interpreter(Interpreter::Python, "2.7")
        .with_interpreter(Interpreter::Numpy, "1.11")
}

#[fixture]
fn tmpdir() -> tempfile::TempDir {
    tempfile::Builder::new()
        .prefix("kiln-test-")
        .tempdir()
        .expect("create a temp directory for test files")
}

fn document(yaml: &str, context: Context) -> RecipeDocument {
    let value: serde_yaml::Value = serde_yaml::from_str(yaml).unwrap();
    RecipeDocument::from_yaml_mapping(&value, context).unwrap()
}

#[rstest]
fn test_info_index(linux64: Context) {
    let doc = document(
        r#"
package:
  name: mypkg
  version: "2.1"
build:
  number: 1
  features: [nomkl]
  track_features: [nomkl, debug]
requirements:
  run:
    - zlib
    - python
    - numpy
about:
  license: BSD 3-Clause
  license_family: BSD
"#,
        linux64,
    );
    let index = doc.info_index().unwrap();
    assert_eq!(index.build, "py27_nomkl_1");
    assert_eq!(index.build_number, 1);
    assert_eq!(index.platform.as_deref(), Some("linux"));
    assert_eq!(index.arch.as_deref(), Some("x86_64"));
    assert_eq!(index.subdir, "linux-64");
    assert_eq!(index.depends, vec!["numpy", "python 2.7*", "zlib"]);
    assert_eq!(index.features.as_deref(), Some("nomkl"));
    assert_eq!(index.track_features.as_deref(), Some("nomkl debug"));
    assert!(index.app.is_none());

    let value = serde_json::to_value(&index).unwrap();
    assert_eq!(value["license"], json!("BSD 3-Clause"));
    assert_eq!(value["license_family"], json!("BSD"));
    assert!(value.get("type").is_none());
}

#[rstest]
fn test_info_index_noarch(linux64: Context) {
    let doc = document(
        "package:\n  name: purepy\n  version: '1.0'\nbuild:\n  noarch_python: true\nrequirements:\n  run: [python]\n",
        linux64,
    );
    let index = doc.info_index().unwrap();
    assert_eq!(index.platform, None);
    assert_eq!(index.arch, None);
    assert_eq!(index.subdir, "noarch");
    assert_eq!(index.depends, vec!["python"]);
    assert_eq!(index.build, "py_0");

    let value = serde_json::to_value(&index).unwrap();
    assert_eq!(value["platform"], json!(null));
    assert_eq!(value.get("license"), None);
}

#[rstest]
fn test_info_index_app(linux64: Context, tmpdir: tempfile::TempDir) {
    std::fs::write(tmpdir.path().join("icon.png"), "hello world").unwrap();
    std::fs::write(
        tmpdir.path().join("meta.yaml"),
        r#"
package:
  name: myapp
  version: "1.0"
app:
  entry: myapp --gui
  icon: icon.png
  summary: My application
  own_environment: true
"#,
    )
    .unwrap();
    let doc = Resolver::from_path(tmpdir.path(), linux64)
        .unwrap()
        .resolve()
        .unwrap();
    assert!(doc.is_app());
    let app = doc.info_index().unwrap().app.expect("app metadata");
    assert_eq!(app.kind, "app");
    assert_eq!(
        app.icon.as_deref(),
        Some("5eb63bbbe01eeed093cb22bb8f5acdc3.png")
    );
    assert_eq!(app.app_entry, Some(FieldValue::from("myapp --gui")));
    assert_eq!(app.app_own_environment, Some(FieldValue::Bool(true)));
    assert_eq!(app.app_type, None);

    let value = serde_json::to_value(doc.info_index().unwrap()).unwrap();
    assert_eq!(value["type"], json!("app"));
    assert_eq!(value["summary"], json!("My application"));
}
