// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/spkenv/spk

use std::collections::BTreeSet;
use std::path::PathBuf;

use itertools::Itertools;
use miette::Diagnostic;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Diagnostic, Debug, Error)]
#[diagnostic(
    url(
        "https://spkenv.dev/error_codes#{}",
        self.code().unwrap_or_else(|| Box::new("kiln::generic"))
    )
)]
pub enum Error {
    #[error(transparent)]
    #[diagnostic(forward(0))]
    SelectorSyntax(#[from] kiln_schema_selectors::Error),
    #[error(transparent)]
    #[diagnostic(forward(0))]
    TemplateRender(#[from] kiln_schema_tera::Error),
    #[error(
        "Undefined template variables remain ({}), the recipe needs data that is not available yet (eg: a source checkout)",
        .0.iter().join(", ")
    )]
    #[diagnostic(code("kiln::unresolved_variables"))]
    UnresolvedVariables(BTreeSet<String>),
    #[error(
        "Recipe did not settle after {passes} rendering passes, still undefined: {}",
        .undefined.iter().join(", ")
    )]
    #[diagnostic(
        code("kiln::did_not_converge"),
        help("raise resolve.max_passes if the recipe legitimately needs more passes")
    )]
    DidNotConverge {
        passes: u32,
        undefined: BTreeSet<String>,
    },
    #[error(
        "Undefined template variables on pass {pass} repeat those of pass {first} ({}), rendering would never settle",
        .undefined.iter().join(", ")
    )]
    #[diagnostic(code("kiln::oscillating"))]
    Oscillating {
        first: u32,
        pass: u32,
        undefined: BTreeSet<String>,
    },
    #[error("The {section} field should be a mapping, not {found} in file {path}")]
    #[diagnostic(code("kiln::structural_type"))]
    StructuralType {
        section: String,
        found: &'static str,
        path: String,
    },
    #[error("{0}")]
    #[diagnostic(code("kiln::invalid_field_value"))]
    InvalidFieldValue(String),
    #[error("{0} cannot depend on itself")]
    #[diagnostic(code("kiln::self_dependency"))]
    SelfDependency(String),
    #[error("{0}")]
    #[diagnostic(code("kiln::missing_required_field"))]
    MissingRequiredField(String),
    #[error("Invalid yaml in recipe {path}")]
    #[diagnostic(code("kiln::invalid_yaml"))]
    InvalidYaml {
        path: String,
        #[source]
        source: format_serde_error::SerdeError,
    },
    #[error("No {} files found in {0:?}", crate::RECIPE_FILE_NAMES.join(" or "))]
    #[diagnostic(code("kiln::recipe_not_found"))]
    RecipeNotFound(PathBuf),
    #[error("More than one recipe file found in {dir:?}: {}", .found.iter().map(|p| p.display()).join(", "))]
    #[diagnostic(code("kiln::multiple_recipes"))]
    MultipleRecipes { dir: PathBuf, found: Vec<PathBuf> },
    #[error("Failed to read file {0:?}")]
    FileReadError(PathBuf, #[source] std::io::Error),
    #[error("Invalid recipe search pattern")]
    InvalidSearchPattern(#[from] glob::PatternError),
    #[error("Failed to search for recipes")]
    RecipeSearch(#[from] glob::GlobError),
    #[error(transparent)]
    #[diagnostic(forward(0))]
    Config(#[from] kiln_config::Error),
    #[error(transparent)]
    #[diagnostic(forward(0))]
    Foundation(#[from] kiln_schema_foundation::Error),
}

impl Error {
    pub(crate) fn invalid_field<S: Into<String>>(message: S) -> Self {
        Self::InvalidFieldValue(message.into())
    }
}
