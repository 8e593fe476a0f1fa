// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/spkenv/spk

//! Build facts and field tables shared by the kiln recipe crates

pub mod context;
mod error;
pub mod fields;
pub mod value;
mod yaml;

pub use context::{Context, Fact, Interpreter, Os, Platform};
pub use error::{Error, Result};
pub use fields::{FieldKind, Section};
pub use value::FieldValue;
pub use yaml::{YamlScanError, parse_yaml_value};
