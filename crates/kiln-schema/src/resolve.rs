// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/spkenv/spk

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use kiln_config::Config;
use kiln_schema_foundation::{Context, FieldValue, Section, parse_yaml_value};
use kiln_schema_selectors::{Namespace, select_lines};
use kiln_schema_tera::{Rendered, Template};

use crate::render::template_data;
use crate::{
    Error,
    GlobalsProvider,
    NoGlobals,
    Normalized,
    RecipeDocument,
    RenderScope,
    Result,
    context_from_config,
    find_recipe,
    normalize,
    validation,
};

#[cfg(test)]
#[path = "./resolve_test.rs"]
mod resolve_test;

/// Runtime requirements are read from this file, next to
/// the recipe, when the recipe does not list any
const REQUIREMENTS_FILE: &str = "requirements.txt";
/// The name that recipe text is rendered as when it has no file
const DEFAULT_RECIPE_NAME: &str = "meta.yaml";
/// Characters that begin a requirement's version in a requirements file
const REQUIREMENT_OPERATORS: &[char] = &['<', '>', '=', '!', '~'];

/// The raw text of a recipe, and where it was loaded from
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecipeSource {
    text: String,
    path: Option<PathBuf>,
}

impl RecipeSource {
    /// Load a recipe file, or find and load the recipe in a directory
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = if path.is_dir() {
            find_recipe(path)?
        } else {
            path.to_path_buf()
        };
        let text =
            std::fs::read_to_string(&file).map_err(|err| Error::FileReadError(file.clone(), err))?;
        Ok(Self {
            text,
            path: Some(file),
        })
    }

    /// A recipe that does not exist on disk
    pub fn from_text<S: Into<String>>(text: S) -> Self {
        Self {
            text: text.into(),
            path: None,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn recipe_dir(&self) -> Option<&Path> {
        self.path.as_deref().and_then(Path::parent)
    }

    fn file_name(&self) -> String {
        self.path
            .as_deref()
            .and_then(Path::file_name)
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| DEFAULT_RECIPE_NAME.to_string())
    }

    fn description(&self) -> String {
        match &self.path {
            Some(path) => path.display().to_string(),
            None => "<string>".into(),
        }
    }
}

/// Resolves a recipe into a [`RecipeDocument`] for one context.
///
/// Each pass filters the recipe by its selectors, renders it as a
/// template, then parses, normalizes and validates the result.
/// Passes repeat until the set of undefined template variables
/// stops changing.
#[derive(Clone, Debug)]
pub struct Resolver<G = NoGlobals> {
    source: RecipeSource,
    context: Context,
    globals: G,
    max_passes: u32,
}

impl Resolver<NoGlobals> {
    pub fn new(source: RecipeSource, context: Context) -> Self {
        Self {
            source,
            context,
            globals: NoGlobals,
            max_passes: kiln_config::Resolve::default().max_passes,
        }
    }

    /// Resolve the recipe file or recipe directory at `path`
    pub fn from_path<P: AsRef<Path>>(path: P, context: Context) -> Result<Self> {
        Ok(Self::new(RecipeSource::from_path(path)?, context))
    }

    pub fn from_text<S: Into<String>>(text: S, context: Context) -> Self {
        Self::new(RecipeSource::from_text(text), context)
    }

    /// Resolve the recipe at `path` with the context and
    /// limits described by the given config
    pub fn from_config<P: AsRef<Path>>(path: P, config: &Config) -> Result<Self> {
        let context = context_from_config(config)?;
        Ok(Self::from_path(path, context)?.with_max_passes(config.resolve.max_passes))
    }
}

impl<G> Resolver<G>
where
    G: GlobalsProvider,
{
    /// Offer the values of the given provider to the recipe template
    pub fn with_globals<P: GlobalsProvider>(self, globals: P) -> Resolver<P> {
        Resolver {
            source: self.source,
            context: self.context,
            globals,
            max_passes: self.max_passes,
        }
    }

    /// Limit the number of permissive passes, not
    /// counting the final one after convergence
    pub fn with_max_passes(mut self, max_passes: u32) -> Self {
        self.max_passes = max_passes;
        self
    }

    pub fn source(&self) -> &RecipeSource {
        &self.source
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    /// Resolve the recipe, rendering it until the set of undefined
    /// template variables settles.
    ///
    /// Fails if any variable is still undefined after settling, if
    /// the set returns to one seen on an earlier, non-adjacent pass,
    /// or if it does not settle within the configured number of passes.
    pub fn resolve(&self) -> Result<RecipeDocument> {
        // the set of undefined names after each pass, starting
        // with the empty set from before the first pass
        let mut history = vec![BTreeSet::new()];
        let (mut document, undefined) = self.run_pass(1, None, Mode::Permissive)?;
        history.push(undefined);

        loop {
            let pass = history.len() - 1;
            let current = &history[pass];
            if *current == history[pass - 1] {
                break;
            }
            if let Some(first) = (1..pass.saturating_sub(1)).find(|seen| history[*seen] == *current) {
                return Err(Error::Oscillating {
                    first: first as u32,
                    pass: pass as u32,
                    undefined: current.clone(),
                });
            }
            if pass as u32 >= self.max_passes {
                return Err(Error::DidNotConverge {
                    passes: pass as u32,
                    undefined: current.clone(),
                });
            }
            let (next, undefined) =
                self.run_pass(pass as u32 + 1, Some(&document), Mode::Permissive)?;
            document = next;
            history.push(undefined);
        }

        let settled = history.len() as u32 - 1;
        if let Some(undefined) = history.pop().filter(|undefined| !undefined.is_empty()) {
            return Err(Error::UnresolvedVariables(undefined));
        }
        tracing::debug!(passes = settled, "recipe settled, running final pass");
        let (document, _) = self.run_pass(settled + 1, Some(&document), Mode::Permissive)?;
        Ok(document)
    }

    /// Resolve the recipe in a single pass, failing on
    /// the first undefined template variable
    pub fn resolve_strict(&self) -> Result<RecipeDocument> {
        let (document, _) = self.run_pass(1, None, Mode::Strict)?;
        Ok(document)
    }

    fn run_pass(
        &self,
        pass: u32,
        previous: Option<&RecipeDocument>,
        mode: Mode,
    ) -> Result<(RecipeDocument, BTreeSet<String>)> {
        let recipe_dir = self.source.recipe_dir();
        let namespace = Namespace::from_context(&self.context);
        let selected = select_lines(&self.source.text, &namespace)?;
        let template = Template::new(self.source.file_name(), selected, recipe_dir)?;

        let rendered = {
            let scope = RenderScope::for_pass(&self.context, pass, previous, recipe_dir);
            let data = template_data(&scope, &self.globals);
            match mode {
                Mode::Strict => Rendered {
                    text: template.render(&data)?,
                    undefined: BTreeSet::new(),
                },
                Mode::Permissive => template.render_permissive(&data)?,
            }
        };

        let description = self.source.description();
        let yaml = parse_yaml_value(rendered.text).map_err(|source| Error::InvalidYaml {
            path: description.clone(),
            source,
        })?;
        let mut recipe = normalize(&yaml, &description)?;
        validation::validate(&recipe)?;
        self.apply_requirements_file(&mut recipe);
        tracing::debug!(pass, ?mode, undefined = ?rendered.undefined, "rendered recipe");

        let document = RecipeDocument::new(
            recipe,
            self.context.clone(),
            self.source.path.clone(),
            Some(self.source.text.clone()),
        );
        Ok((document, rendered.undefined))
    }

    /// Fill in empty runtime requirements from a requirements
    /// file next to the recipe, if there is one
    fn apply_requirements_file(&self, recipe: &mut Normalized) {
        let Some(path) = self
            .source
            .recipe_dir()
            .map(|dir| dir.join(REQUIREMENTS_FILE))
            .filter(|path| path.is_file())
        else {
            return;
        };
        let has_run = recipe
            .sections
            .get(Section::Requirements.as_ref())
            .and_then(|requirements| requirements.get("run"))
            .is_some_and(FieldValue::is_truthy);
        if has_run {
            return;
        }

        let text = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(err) => {
                tracing::warn!(?path, %err, "failed to read runtime requirements file");
                return;
            }
        };
        let run = requirements_from_text(&text);
        recipe
            .sections
            .entry(Section::Requirements.to_string())
            .or_default()
            .insert("run".into(), FieldValue::List(run));
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Mode {
    /// Undefined variables are rendered as empty
    Permissive,
    /// Undefined variables are an error
    Strict,
}

/// Read requirement specs from the lines of a requirements file.
///
/// `name==1.0` pins an exact version, `name=1.0` any build of
/// that version, and any other operator is kept as written.
fn requirements_from_text(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(|line| {
            let Some(index) = line.find(REQUIREMENT_OPERATORS) else {
                return line.to_string();
            };
            let (name, rest) = line.split_at(index);
            let op_len = rest
                .find(|c: char| !REQUIREMENT_OPERATORS.contains(&c))
                .unwrap_or(rest.len());
            let (op, version) = rest.split_at(op_len);
            let (name, version) = (name.trim(), version.trim());
            match op {
                "==" => format!("{name} {version}"),
                "=" => format!("{name} {version}*"),
                _ => format!("{name} {op}{version}"),
            }
        })
        .collect()
}
