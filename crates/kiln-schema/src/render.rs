// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/spkenv/spk

use std::path::Path;

use indexmap::IndexMap;
use kiln_schema_foundation::context::Fact;
use kiln_schema_foundation::Context;
use serde_json::Value;

use crate::RecipeDocument;

#[cfg(test)]
#[path = "./render_test.rs"]
mod render_test;

/// A value offered to recipe templates by a [`GlobalsProvider`]
#[derive(Clone, Debug, PartialEq)]
pub enum Global {
    Value(Value),
    /// The value cannot be produced yet, for the given reason.
    ///
    /// The name is left undefined in the template context.
    Unavailable(String),
}

/// Everything that a [`GlobalsProvider`] can know about
/// the render that it is providing values for
#[derive(Clone, Copy, Debug)]
pub struct RenderScope<'a> {
    context: &'a Context,
    previous: Option<&'a RecipeDocument>,
    recipe_dir: Option<&'a Path>,
    pass: u32,
    rendering: bool,
}

impl<'a> RenderScope<'a> {
    /// A scope that is not part of any recipe render
    pub fn new(context: &'a Context) -> Self {
        Self {
            context,
            previous: None,
            recipe_dir: None,
            pass: 0,
            rendering: false,
        }
    }

    /// A scope for the given rendering pass of a recipe
    pub(crate) fn for_pass(
        context: &'a Context,
        pass: u32,
        previous: Option<&'a RecipeDocument>,
        recipe_dir: Option<&'a Path>,
    ) -> Self {
        Self {
            context,
            previous,
            recipe_dir,
            pass,
            rendering: true,
        }
    }

    pub fn context(&self) -> &'a Context {
        self.context
    }

    /// The document produced by the previous pass, if there was one
    pub fn previous(&self) -> Option<&'a RecipeDocument> {
        self.previous
    }

    pub fn recipe_dir(&self) -> Option<&'a Path> {
        self.recipe_dir
    }

    /// The 1-based number of the current pass, or 0
    /// when this scope is not part of a render
    pub fn pass(&self) -> u32 {
        self.pass
    }

    /// True while a recipe is being rendered
    pub fn is_rendering(&self) -> bool {
        self.rendering
    }
}

/// Supplies additional values to recipe templates, such as
/// information about a source checkout.
///
/// Providers are asked again on every rendering pass, and may
/// return values that depend on the previous pass's document.
pub trait GlobalsProvider {
    fn globals(&self, scope: &RenderScope<'_>) -> IndexMap<String, Global>;
}

/// Provides no additional template values
#[derive(Clone, Copy, Debug, Default)]
pub struct NoGlobals;

impl GlobalsProvider for NoGlobals {
    fn globals(&self, _scope: &RenderScope<'_>) -> IndexMap<String, Global> {
        IndexMap::new()
    }
}

impl<F> GlobalsProvider for F
where
    F: Fn(&RenderScope<'_>) -> IndexMap<String, Global>,
{
    fn globals(&self, scope: &RenderScope<'_>) -> IndexMap<String, Global> {
        self(scope)
    }
}

/// The data that recipe templates are rendered with: every
/// context fact, and every available provided value
pub(crate) fn template_data<G>(scope: &RenderScope<'_>, provider: &G) -> serde_json::Map<String, Value>
where
    G: GlobalsProvider + ?Sized,
{
    let mut data: serde_json::Map<String, Value> = scope
        .context()
        .facts()
        .into_iter()
        .map(|(name, fact)| (name, fact_value(fact)))
        .collect();
    for (name, global) in provider.globals(scope) {
        match global {
            Global::Value(value) => {
                data.insert(name, value);
            }
            Global::Unavailable(reason) => {
                tracing::debug!(pass = scope.pass(), %name, %reason, "template value unavailable");
            }
        }
    }
    data
}

fn fact_value(fact: Fact) -> Value {
    match fact {
        Fact::Bool(b) => Value::Bool(b),
        Fact::Int(i) => Value::from(i),
        Fact::Str(s) => Value::String(s),
        Fact::Mapping(mapping) => Value::Object(
            mapping
                .into_iter()
                .map(|(k, v)| (k, Value::String(v)))
                .collect(),
        ),
    }
}
