// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/spkenv/spk

//! The build facts that recipes are resolved against

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

mod platform;

pub use platform::{NON_X86_LINUX_MACHINES, Os, Platform};

#[cfg(test)]
#[path = "./context_test.rs"]
mod context_test;

/// The interpreters whose versions are part of a [`Context`].
///
/// Variants are declared in build string priority order.
#[derive(
    Clone,
    Copy,
    Debug,
    Deserialize,
    Eq,
    Hash,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
    strum::Display,
    strum::EnumIter,
    strum::EnumString,
    strum::IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Interpreter {
    Numpy,
    Python,
    Perl,
    Lua,
    R,
}

impl Interpreter {
    /// The dependency names that bind to this interpreter's version
    pub fn package_names(&self) -> &'static [&'static str] {
        match self {
            Self::Numpy => &["numpy"],
            Self::Python => &["python"],
            Self::Perl => &["perl"],
            Self::Lua => &["lua"],
            // r is kept for legacy installations, r-base deprecates it
            Self::R => &["r", "r-base"],
        }
    }

    /// Find the interpreter that a dependency name binds to, if any
    pub fn for_package(name: &str) -> Option<Self> {
        use strum::IntoEnumIterator;
        Self::iter().find(|i| i.package_names().contains(&name))
    }

    /// The short tag used for this interpreter in build strings
    pub fn build_tag(&self) -> &'static str {
        match self {
            Self::Numpy => "np",
            Self::Python => "py",
            Self::Perl => "pl",
            Self::Lua => "lua",
            Self::R => "r",
        }
    }
}

/// Reformat a version with no decimal point as `major.minor`.
///
/// ```
/// # use kiln_schema_foundation::context::dotted_version;
/// assert_eq!(dotted_version("27"), "2.7");
/// assert_eq!(dotted_version("111"), "1.11");
/// assert_eq!(dotted_version("3.6"), "3.6");
/// ```
pub fn dotted_version(version: &str) -> String {
    if version.contains('.') {
        return version.to_string();
    }
    let mut chars = version.chars();
    match chars.next() {
        Some(major) if !chars.as_str().is_empty() => format!("{major}.{}", chars.as_str()),
        _ => version.to_string(),
    }
}

/// The integer form of a version as used by selectors, eg `3.6` => `36`
pub fn version_number(version: &str) -> Option<i64> {
    version.replace('.', "").parse().ok()
}

/// A single named build fact.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Fact {
    Bool(bool),
    Int(i64),
    Str(String),
    Mapping(BTreeMap<String, String>),
}

/// The platform and interpreter facts that a recipe is resolved against.
///
/// A context is supplied by the caller and only read during
/// resolution.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Context {
    platform: Platform,
    interpreters: BTreeMap<Interpreter, String>,
    features: BTreeMap<String, bool>,
    environ: BTreeMap<String, String>,
}

impl Context {
    /// An empty context for the given platform
    pub fn new(platform: Platform) -> Self {
        Self {
            platform,
            ..Default::default()
        }
    }

    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    /// Configure the version of an interpreter, eg `python` => `3.6`
    pub fn with_interpreter<S: Into<String>>(mut self, interpreter: Interpreter, version: S) -> Self {
        self.interpreters.insert(interpreter, version.into());
        self
    }

    pub fn without_interpreter(mut self, interpreter: Interpreter) -> Self {
        self.interpreters.remove(&interpreter);
        self
    }

    pub fn with_feature<S: Into<String>>(mut self, name: S, enabled: bool) -> Self {
        self.features.insert(name.into(), enabled);
        self
    }

    /// Replace the environment variables visible to recipes
    pub fn with_environ<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.environ = vars
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self
    }

    /// Use the environment of the current process
    pub fn with_host_environ(self) -> Self {
        self.with_environ(std::env::vars())
    }

    pub fn platform(&self) -> &Platform {
        &self.platform
    }

    /// The configured version of an interpreter, if any
    pub fn interpreter_version(&self, interpreter: Interpreter) -> Option<&str> {
        self.interpreters.get(&interpreter).map(String::as_str)
    }

    pub fn features(&self) -> &BTreeMap<String, bool> {
        &self.features
    }

    pub fn environ(&self) -> &BTreeMap<String, String> {
        &self.environ
    }

    /// All of the named facts that selectors and templates can see.
    ///
    /// Platform and interpreter facts take precedence over feature
    /// flags, which take precedence over environment variables.
    pub fn facts(&self) -> BTreeMap<String, Fact> {
        let mut facts = BTreeMap::new();
        for (name, value) in self.environ.iter() {
            facts.insert(name.clone(), Fact::Str(value.clone()));
        }
        for (name, enabled) in self.features.iter() {
            facts.insert(name.clone(), Fact::Bool(*enabled));
        }

        let subdir = self.platform.subdir();
        let mut flag = |name: &str, value: bool| {
            facts.insert(name.to_string(), Fact::Bool(value));
        };
        flag("linux", subdir.starts_with("linux-"));
        flag("linux32", subdir == "linux-32");
        flag("linux64", subdir == "linux-64");
        flag("arm", subdir.starts_with("linux-arm"));
        flag("osx", subdir.starts_with("osx-"));
        flag("unix", subdir.starts_with("linux-") || subdir.starts_with("osx-"));
        flag("win", subdir.starts_with("win-"));
        flag("win32", subdir == "win-32");
        flag("win64", subdir == "win-64");
        flag("x86", subdir.ends_with("-32") || subdir.ends_with("-64"));
        flag("x86_64", subdir.ends_with("-64"));
        for machine in NON_X86_LINUX_MACHINES {
            flag(*machine, subdir == format!("linux-{machine}"));
        }

        let python = self.interpreter_version(Interpreter::Python);
        let py = python.and_then(version_number);
        let py_major = python
            .map(dotted_version)
            .and_then(|v| v.split('.').next().and_then(|m| m.parse::<i64>().ok()));
        flag("py2k", py_major == Some(2));
        flag("py3k", py_major == Some(3));
        for known in [26, 27, 33, 34, 35, 36] {
            flag(&format!("py{known}"), py == Some(known));
        }
        if let Some(lua) = self.interpreter_version(Interpreter::Lua) {
            flag("luajit", lua.starts_with('2'));
        }

        if let Some(py) = py {
            facts.insert("py".into(), Fact::Int(py));
        }
        if let Some(np) = self
            .interpreter_version(Interpreter::Numpy)
            .and_then(version_number)
        {
            facts.insert("np".into(), Fact::Int(np));
        }
        if let Some(pl) = self.interpreter_version(Interpreter::Perl) {
            facts.insert("pl".into(), Fact::Str(pl.to_string()));
        }
        if let Some(lua) = self.interpreter_version(Interpreter::Lua) {
            facts.insert("lua".into(), Fact::Str(lua.to_string()));
        }
        facts.insert("environ".into(), Fact::Mapping(self.environ.clone()));
        facts
    }
}
