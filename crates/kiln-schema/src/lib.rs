// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/spkenv/spk

//! Resolves package build recipes into validated documents.
//!
//! A recipe is filtered by its line selectors, rendered as a
//! template (repeatedly, until the set of undefined variables
//! settles), parsed, normalized and validated. The resulting
//! [`RecipeDocument`] derives the package identifiers.

mod config;
mod dependency;
mod document;
mod error;
mod ident;
mod index;
mod normalize;
mod recipe_path;
mod render;
mod resolve;
pub mod validation;

pub use config::{context_from_config, context_from_config_and_environ};
pub use dependency::{DependencyKind, DependencySpec};
pub use document::{IgnorePrefixFiles, RecipeDocument, SectionMap, Vcs};
pub use error::{Error, Result};
pub use ident::{PACKAGE_EXTENSION, build_string, dist_string};
pub use index::{AppMeta, IndexRecord};
pub use kiln_schema_foundation::{
    self as foundation,
    Context,
    FieldKind,
    FieldValue,
    Interpreter,
    Os,
    Platform,
    Section,
};
pub use normalize::{Normalized, git_clean, normalize};
pub use recipe_path::{RECIPE_FILE_NAMES, find_recipe};
pub use render::{Global, GlobalsProvider, NoGlobals, RenderScope};
pub use resolve::{RecipeSource, Resolver};
pub use validation::check_bad_chrs;
