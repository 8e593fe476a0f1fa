// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/spkenv/spk

use std::str::FromStr;

use kiln_schema_foundation::context::dotted_version;
use kiln_schema_foundation::{Context, Interpreter};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

#[cfg(test)]
#[path = "./dependency_test.rs"]
mod dependency_test;

/// Characters that may not appear in the name of a dependency
const BAD_NAME_CHARACTERS: &str = "=!@#$%^&*:;\"'\\|<>?/";
/// Characters that begin a version comparison
const OPERATOR_CHARACTERS: &[char] = &['<', '>', '=', '!'];
/// Version comparisons that were given as their own token
const STANDALONE_OPERATORS: &[&str] = &[">", ">=", "=", "==", "!=", "<", "<="];
/// The version placeholder that is always replaced
/// with the configured interpreter version
const CONFIGURED_VERSION: &str = "x.x";

/// The requirement lists of a recipe
#[derive(
    Clone,
    Copy,
    Debug,
    Deserialize,
    Eq,
    Hash,
    PartialEq,
    Serialize,
    strum::AsRefStr,
    strum::Display,
    strum::EnumIter,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DependencyKind {
    Build,
    Run,
    Conflicts,
}

impl DependencyKind {
    /// The recipe field that holds this kind of requirement
    pub fn field(&self) -> String {
        format!("requirements/{self}")
    }
}

/// A single requirement, as `name [version [build]]`
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct DependencySpec {
    pub name: String,
    pub version: Option<String>,
    pub build: Option<String>,
}

impl DependencySpec {
    /// A requirement on any version of the named package
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            version: None,
            build: None,
        }
    }

    pub fn with_version<S: Into<String>>(mut self, version: S) -> Self {
        self.version = Some(version.into());
        self
    }

    /// The number of parts given for this requirement, from 1 to 3
    pub fn strictness(&self) -> usize {
        1 + usize::from(self.version.is_some()) + usize::from(self.build.is_some())
    }

    /// Bind this requirement to the configured version of an interpreter.
    ///
    /// Requirements that already name a version are kept as is, unless
    /// that version is the `x.x` placeholder. A bare `numpy` at runtime
    /// is left open to match any build.
    pub fn bind_version(&self, configured: Option<&str>, kind: DependencyKind) -> Result<Self> {
        match (&self.version, &self.build) {
            (_, Some(_)) => return Ok(self.clone()),
            (Some(version), None) if version != CONFIGURED_VERSION => return Ok(self.clone()),
            (Some(_), None) if configured.is_none() => {
                return Err(Error::MissingRequiredField(format!(
                    "'{self}' requires external setting"
                )));
            }
            _ => {}
        }

        let is_open_numpy = kind == DependencyKind::Run
            && self.version.is_none()
            && Interpreter::for_package(&self.name) == Some(Interpreter::Numpy);
        match configured {
            Some(version) if !is_open_numpy => {
                Ok(Self::new(&self.name).with_version(format!("{}*", dotted_version(version))))
            }
            _ => Ok(Self::new(&self.name)),
        }
    }

    /// Reject operators written directly against the name, or
    /// written as a separate token from their version.
    fn check_syntax(&self, spec: &str) -> Result<()> {
        if let Some(c) = BAD_NAME_CHARACTERS.chars().find(|c| self.name.contains(*c)) {
            let mut msg = format!(
                "bad character '{c}' in package name dependency '{}'",
                self.name
            );
            if let Some(index) = self.name.find(OPERATOR_CHARACTERS).filter(|i| *i > 0) {
                let (name, version) = self.name.split_at(index);
                msg.push_str(&format!("\nPerhaps you meant '{name} {version}'"));
            }
            return Err(Error::invalid_field(msg));
        }

        let tokens: Vec<_> = spec.split_whitespace().collect();
        if let Some(op) = tokens.get(1).copied().filter(|t| STANDALONE_OPERATORS.contains(t)) {
            let mut msg = format!(
                "bad character '{op}' in package version dependency '{}'",
                self.name
            );
            if let Some(version) = tokens.get(2) {
                msg.push_str(&format!("\nPerhaps you meant '{} {op}{version}'", self.name));
            }
            return Err(Error::invalid_field(msg));
        }
        Ok(())
    }
}

impl std::fmt::Display for DependencySpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)?;
        for part in self.version.iter().chain(self.build.iter()) {
            write!(f, " {part}")?;
        }
        Ok(())
    }
}

impl FromStr for DependencySpec {
    type Err = Error;

    fn from_str(spec: &str) -> Result<Self> {
        let mut tokens = spec.split_whitespace();
        match (tokens.next(), tokens.next(), tokens.next(), tokens.next()) {
            (Some(name), version, build, None) => Ok(Self {
                name: name.to_string(),
                version: version.map(String::from),
                build: build.map(String::from),
            }),
            _ => Err(Error::invalid_field(format!(
                "Invalid package specification: '{spec}'"
            ))),
        }
    }
}

impl Serialize for DependencySpec {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

/// Turn the raw requirement strings of a package into dependency specs.
///
/// Requirements on a known interpreter are bound to its version in the
/// context, unless the package is `noarch_python`.
pub(crate) fn resolve_requirements<S: AsRef<str>>(
    package: &str,
    requirements: &[S],
    context: &Context,
    noarch_python: bool,
    kind: DependencyKind,
) -> Result<Vec<DependencySpec>> {
    let mut resolved = Vec::with_capacity(requirements.len());
    for spec in requirements.iter().map(AsRef::as_ref) {
        let mut dep = DependencySpec::from_str(spec)?;
        if dep.name == package {
            return Err(Error::SelfDependency(package.to_string()));
        }
        dep.check_syntax(spec)?;
        let interpreter = Interpreter::for_package(&dep.name).filter(|_| !noarch_python);
        if let Some(interpreter) = interpreter {
            dep = dep.bind_version(context.interpreter_version(interpreter), kind)?;
        }
        resolved.push(dep);
    }
    Ok(resolved)
}
