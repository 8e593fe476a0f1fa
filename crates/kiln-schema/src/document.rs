// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/spkenv/spk

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use kiln_schema_foundation::fields::split_field;
use kiln_schema_foundation::{Context, FieldValue, Os, Section};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::dependency::resolve_requirements;
use crate::ident::{PACKAGE_EXTENSION, build_string, dist_string};
use crate::validation::{self, check_bad_chrs};
use crate::{DependencyKind, DependencySpec, Error, IndexRecord, Normalized, Result, normalize};

#[cfg(test)]
#[path = "./document_test.rs"]
mod document_test;

/// The fields of a single recipe section, in recipe order
pub type SectionMap = IndexMap<String, FieldValue>;

static JINJA_EXPRESSION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{.*\}\}").expect("a valid regular expression"));

/// Template helpers that read the metadata of a python setup script
const SETUP_PY_LOADERS: &[&str] = &["load_setup_py_data", "load_setuptools"];

/// A version control system that a recipe sources from
#[derive(
    Clone,
    Copy,
    Debug,
    Deserialize,
    Eq,
    Hash,
    PartialEq,
    Serialize,
    strum::Display,
    strum::EnumIter,
    strum::IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Vcs {
    Git,
    Svn,
    Mercurial,
}

impl Vcs {
    /// The prefix of this system's keys in the source
    /// section and of its build environment variables
    fn key_prefix(&self) -> &'static str {
        match self {
            Self::Git => "git",
            Self::Svn => "svn",
            Self::Mercurial => "hg",
        }
    }

    fn env_var_pattern(&self) -> Regex {
        let pattern = format!(r#"{}_[^\.\s'"]+"#, self.key_prefix().to_uppercase());
        Regex::new(&pattern).expect("a valid regular expression")
    }

    /// Matches a call to this system's command, eg: `git` or `hg.exe`
    fn command_pattern(&self) -> Regex {
        let pattern = format!(r"\b{}(?:\.exe)?\b", self.key_prefix());
        Regex::new(&pattern).expect("a valid regular expression")
    }
}

/// The value of `build/ignore_prefix_files`
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(untagged)]
pub enum IgnorePrefixFiles {
    /// Ignore all files, or none of them
    Flag(bool),
    Paths(Vec<String>),
}

/// A resolved and validated recipe.
///
/// Documents are rebuilt from scratch each time that a recipe
/// is resolved, and are never modified afterwards.
#[derive(Clone, Debug)]
pub struct RecipeDocument {
    recipe: Normalized,
    recipe_path: Option<PathBuf>,
    recipe_text: Option<String>,
    context: Context,
}

impl RecipeDocument {
    pub(crate) fn new(
        recipe: Normalized,
        context: Context,
        recipe_path: Option<PathBuf>,
        recipe_text: Option<String>,
    ) -> Self {
        Self {
            recipe,
            recipe_path,
            recipe_text,
            context,
        }
    }

    /// Build a document from an already parsed recipe.
    ///
    /// The mapping is normalized and validated exactly as
    /// resolved recipe text would be.
    pub fn from_yaml_mapping(recipe: &serde_yaml::Value, context: Context) -> Result<Self> {
        let recipe = normalize(recipe, "<mapping>")?;
        validation::validate(&recipe)?;
        Ok(Self::new(recipe, context, None, None))
    }

    /// The context that this document was resolved against
    pub fn context(&self) -> &Context {
        &self.context
    }

    /// The recipe file that this document was resolved from, if any
    pub fn recipe_path(&self) -> Option<&Path> {
        self.recipe_path.as_deref()
    }

    /// The directory containing the recipe file, if known
    pub fn recipe_dir(&self) -> Option<&Path> {
        self.recipe_path.as_deref().and_then(Path::parent)
    }

    pub fn sections(&self) -> &IndexMap<String, SectionMap> {
        &self.recipe.sections
    }

    /// The free-form `extra` section, as written
    pub fn extra(&self) -> Option<&serde_yaml::Mapping> {
        self.recipe.extra.as_ref()
    }

    pub fn get_section(&self, section: &str) -> Option<&SectionMap> {
        self.recipe.sections.get(section)
    }

    /// Get a single value by its path, eg `package/name`
    pub fn get_value(&self, field: &str) -> Option<&FieldValue> {
        let (section, key) = split_field(field)?;
        self.get_section(section)?.get(key)
    }

    /// Ensure that every section and key in this document is a known one
    pub fn check_fields(&self) -> Result<()> {
        validation::check_fields(&self.recipe)
    }

    pub fn name(&self) -> Result<String> {
        let name = match self.get_value("package/name") {
            Some(name) if name.is_truthy() => name.to_string(),
            _ => {
                return Err(Error::MissingRequiredField(format!(
                    "package/name missing in: {}",
                    self.source_description()
                )));
            }
        };
        if name != name.to_lowercase() {
            return Err(Error::invalid_field(format!(
                "package/name must be lowercase, got: '{name}'"
            )));
        }
        check_bad_chrs(&name, "package/name")?;
        Ok(name)
    }

    pub fn version(&self) -> Result<String> {
        let version = match self.get_value("package/version") {
            Some(version) if version.is_truthy() => version.to_string(),
            _ => {
                return Err(Error::MissingRequiredField(format!(
                    "package/version missing in: {}",
                    self.source_description()
                )));
            }
        };
        check_bad_chrs(&version, "package/version")?;
        Ok(version)
    }

    /// The build number, if one is set and is a valid number
    pub fn build_number(&self) -> Option<u64> {
        self.get_value("build/number")?.as_str()?.trim().parse().ok()
    }

    /// The dependency specs of one kind of requirement, in recipe order
    pub fn ms_depends(&self, kind: DependencyKind) -> Result<Vec<DependencySpec>> {
        let field = kind.field();
        let requirements = self.list(&field)?;
        resolve_requirements(
            &self.name()?,
            requirements,
            &self.context,
            self.flag("build/noarch_python", false),
            kind,
        )
    }

    /// The build string, either as set in the recipe or
    /// derived from the runtime dependencies
    pub fn build_id(&self) -> Result<String> {
        if let Some(build) = self
            .get_value("build/string")
            .and_then(FieldValue::as_str)
            .filter(|s| !s.is_empty())
        {
            check_bad_chrs(build, "build/string")?;
            return Ok(build.to_string());
        }
        let features = self.list("build/features")?;
        Ok(build_string(
            &self.ms_depends(DependencyKind::Run)?,
            features,
            self.build_number(),
        ))
    }

    /// The package identifier, `{name}-{version}-{build}`
    pub fn dist(&self) -> Result<String> {
        Ok(dist_string(&self.name()?, &self.version()?, &self.build_id()?))
    }

    /// The file name of the built package
    pub fn pkg_fn(&self) -> Result<String> {
        Ok(format!("{}{PACKAGE_EXTENSION}", self.dist()?))
    }

    /// The index metadata of the built package
    pub fn info_index(&self) -> Result<IndexRecord> {
        IndexRecord::from_document(self)
    }

    pub fn is_app(&self) -> bool {
        self.get_value("app/entry").is_some_and(FieldValue::is_truthy)
    }

    pub fn skip(&self) -> bool {
        self.flag("build/skip", false)
    }

    pub fn include_recipe(&self) -> bool {
        self.flag("build/include_recipe", true)
    }

    pub fn always_include_files(&self) -> Result<Vec<String>> {
        self.list("build/always_include_files").map(<[String]>::to_vec)
    }

    pub fn has_prefix_files(&self) -> Result<Vec<String>> {
        self.prefix_paths("build/has_prefix_files")
    }

    pub fn binary_has_prefix_files(&self) -> Result<Vec<String>> {
        self.prefix_paths("build/binary_has_prefix_files")
    }

    pub fn ignore_prefix_files(&self) -> Result<IgnorePrefixFiles> {
        const FIELD: &str = "build/ignore_prefix_files";
        match self.get_value(FIELD) {
            None => Ok(IgnorePrefixFiles::Flag(false)),
            Some(FieldValue::Bool(b)) => Ok(IgnorePrefixFiles::Flag(*b)),
            Some(FieldValue::List(paths)) => {
                self.check_path_delimiters(FIELD, paths)?;
                Ok(IgnorePrefixFiles::Paths(paths.clone()))
            }
            Some(FieldValue::String(_)) => Err(Error::invalid_field(format!(
                "{FIELD} should be boolean or a list of paths"
            ))),
        }
    }

    /// The version control system that this recipe sources from, if any.
    ///
    /// A `*_url` source key is checked first, then the recipe
    /// text for references to the build environment of each system.
    pub fn uses_vcs_in_meta(&self) -> Option<Vcs> {
        use strum::IntoEnumIterator;

        if let Some(source) = self.get_section(Section::Source.as_ref()) {
            let found = Vcs::iter().find(|vcs| source.contains_key(&format!("{}_url", vcs.key_prefix())));
            if found.is_some() {
                return found;
            }
        }
        let text = self.recipe_text.as_deref()?;
        Vcs::iter().find(|vcs| vcs.env_var_pattern().is_match(text))
    }

    /// Whether the recipe text contains any template expressions
    pub fn uses_jinja(&self) -> bool {
        self.recipe_text
            .as_deref()
            .is_some_and(|text| JINJA_EXPRESSION.is_match(text))
    }

    /// Whether the recipe reads its metadata from a python setup script
    pub fn uses_setup_py_in_meta(&self) -> bool {
        self.recipe_text
            .as_deref()
            .is_some_and(|text| SETUP_PY_LOADERS.iter().any(|loader| text.contains(loader)))
    }

    /// The version control system that the build commands call, if any.
    ///
    /// The platform's build script next to the recipe file
    /// (`bld.bat` on windows, `build.sh` elsewhere) is checked
    /// first, then the `build/script` field.
    pub fn uses_vcs_in_build(&self) -> Result<Option<Vcs>> {
        use strum::IntoEnumIterator;

        let mut scripts = Vec::new();
        if let Some(dir) = self.recipe_dir() {
            let name = match self.context.platform().os() {
                Os::Win => "bld.bat",
                _ => "build.sh",
            };
            let path = dir.join(name);
            if path.is_file() {
                let text = std::fs::read_to_string(&path)
                    .map_err(|err| Error::FileReadError(path.clone(), err))?;
                scripts.push(text);
            }
        }
        match self.get_value("build/script") {
            Some(FieldValue::String(script)) => scripts.push(script.clone()),
            Some(FieldValue::List(lines)) => scripts.push(lines.join("\n")),
            _ => {}
        }

        let found = scripts.iter().find_map(|script| {
            Vcs::iter().find(|vcs| vcs.command_pattern().is_match(script))
        });
        if let Some(vcs) = found {
            tracing::debug!(%vcs, "build commands use version control");
        }
        Ok(found)
    }

    fn flag(&self, field: &str, default: bool) -> bool {
        self.get_value(field)
            .map(FieldValue::is_truthy)
            .unwrap_or(default)
    }

    /// A field that must be a list when set
    fn list(&self, field: &str) -> Result<&[String]> {
        match self.get_value(field) {
            None => Ok(&[]),
            Some(FieldValue::List(items)) => Ok(items),
            Some(FieldValue::String(s)) if s.is_empty() => Ok(&[]),
            Some(other) => Err(Error::invalid_field(format!(
                "{field} should be a list, not a {}",
                other.kind()
            ))),
        }
    }

    fn prefix_paths(&self, field: &str) -> Result<Vec<String>> {
        let paths = self.list(field).map_err(|_| {
            Error::invalid_field(format!("{field} should be a list of paths"))
        })?;
        self.check_path_delimiters(field, paths)?;
        Ok(paths.to_vec())
    }

    /// Prefix file paths are always written with forward slashes
    fn check_path_delimiters(&self, field: &str, paths: &[String]) -> Result<()> {
        if self.context.platform().uses_backslash_paths() && paths.iter().any(|p| p.contains('\\')) {
            return Err(Error::invalid_field(format!(
                "{field} paths must use / as the path delimiter on Windows"
            )));
        }
        Ok(())
    }

    fn source_description(&self) -> String {
        match &self.recipe_path {
            Some(path) => path.display().to_string(),
            None => "<string>".into(),
        }
    }
}
