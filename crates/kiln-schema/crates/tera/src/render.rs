// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/spkenv/spk

use std::collections::BTreeSet;
use std::path::Path;

use serde_json::Value;

use crate::Error;
use crate::conditions::Conditions;
use crate::error::undefined_variable;

#[cfg(test)]
#[path = "./render_test.rs"]
mod render_test;

/// The output of a permissive render
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Rendered {
    pub text: String,
    /// Every variable that was referenced but not defined. Each
    /// was rendered as an empty string, or read as false when only
    /// tested in a condition.
    pub undefined: BTreeSet<String>,
}

/// A parsed template, ready to be rendered with different data
#[derive(Debug)]
pub struct Template {
    name: String,
    source: String,
    tera: tera::Tera,
    conditions: Conditions,
}

impl Template {
    /// Parse a template with the default renderer configuration
    pub fn new<N, T>(name: N, source: T, recipe_dir: Option<&Path>) -> Result<Self, Error>
    where
        N: Into<String>,
        T: Into<String>,
    {
        let name = name.into();
        let source = source.into();
        let mut tera = crate::default_renderer(recipe_dir);
        tera.add_raw_template(&name, &source)
            .map_err(|err| Error::build(source.clone(), err))?;
        let conditions = tera
            .get_template(&name)
            .map(|template| Conditions::from_ast(&template.ast))
            .map_err(|err| Error::build(source.clone(), err))?;
        Ok(Self {
            name,
            source,
            tera,
            conditions,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Render this template, failing on any undefined variable,
    /// including one that is only tested in a condition
    pub fn render<D>(&self, data: &D) -> Result<String, Error>
    where
        D: serde::Serialize,
    {
        let map_err = |err| Error::build(self.source.clone(), err);
        let data = serde_json::to_value(data).map_err(|err| map_err(tera::Error::json(err)))?;
        if let Some(name) = self.conditions.undefined(&data).into_iter().next() {
            return Err(map_err(tera::Error::msg(format!(
                "Variable `{name}` not found in context while rendering '{}'",
                self.name
            ))));
        }
        let context = tera::Context::from_value(data).map_err(map_err)?;
        self.tera.render(&self.name, &context).map_err(map_err)
    }

    /// Render this template, treating undefined variables as empty.
    ///
    /// Each undefined variable is given an empty string value and the
    /// template is rendered again, until it renders successfully or
    /// fails for some other reason. The names of all substituted
    /// variables are returned with the rendered text, along with
    /// any undefined variable that is only tested in a condition.
    pub fn render_permissive<D>(&self, data: &D) -> Result<Rendered, Error>
    where
        D: serde::Serialize,
    {
        let map_err = |err| Error::build(self.source.clone(), err);
        let mut data = serde_json::to_value(data).map_err(|err| map_err(tera::Error::json(err)))?;
        let mut undefined = self.conditions.undefined(&data);
        loop {
            let context = tera::Context::from_value(data.clone()).map_err(map_err)?;
            let err = match self.tera.render(&self.name, &context) {
                Ok(text) => return Ok(Rendered { text, undefined }),
                Err(err) => err,
            };
            let Some(name) = undefined_variable(&err) else {
                return Err(map_err(err));
            };
            if !insert_empty(&mut data, &name) {
                return Err(map_err(err));
            }
            tracing::trace!(template = %self.name, variable = %name, "rendering undefined variable as empty");
            undefined.insert(name);
        }
    }
}

/// Render a template with the default configuration
pub fn render_template<N, T, D>(filename: N, tpl: T, data: &D) -> Result<String, Error>
where
    N: AsRef<str>,
    T: AsRef<str>,
    D: serde::Serialize,
{
    Template::new(filename.as_ref(), tpl.as_ref(), None)?.render(data)
}

/// Insert an empty string at the given dotted path, creating
/// any missing parent objects along the way.
///
/// Returns false if the path is already set, or passes
/// through a value that is not an object.
fn insert_empty(data: &mut Value, path: &str) -> bool {
    let mut current = data;
    let mut parts = path.split('.').peekable();
    while let Some(part) = parts.next() {
        let Some(object) = current.as_object_mut() else {
            return false;
        };
        if parts.peek().is_none() {
            if object.contains_key(part) {
                return false;
            }
            object.insert(part.to_string(), Value::String(String::new()));
            return true;
        }
        current = object
            .entry(part)
            .or_insert_with(|| Value::Object(Default::default()));
    }
    false
}
