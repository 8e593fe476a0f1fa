// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/spkenv/spk

use once_cell::sync::Lazy;
use regex::Regex;

#[cfg(test)]
#[path = "./error_test.rs"]
mod error_test;

#[derive(Debug)]
pub struct Error {
    message: String,
    tpl: String,
    label: Option<String>,
    location: miette::SourceOffset,
    undefined: Option<String>,
    // kept around to determine the original source
    // of this error in the case where a template position
    // and error message was not discerned
    original: Option<Box<tera::Error>>,
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Template error: ")?;
        f.write_str(&self.message)?;
        if let Some(name) = &self.undefined {
            write!(f, ": variable {name:?} is not defined")?;
        }
        Ok(())
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.original.as_ref().and_then(std::error::Error::source)
    }
}

impl miette::Diagnostic for Error {
    fn code<'a>(&'a self) -> Option<Box<dyn std::fmt::Display + 'a>> {
        Some(Box::new("kiln::template_render"))
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        Some(&self.tpl)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = miette::LabeledSpan> + '_>> {
        let label = self.label.as_ref()?;
        Some(Box::new(
            [miette::LabeledSpan::at(self.location, label)].into_iter(),
        ))
    }
}

impl Error {
    pub fn build(tpl: String, err: tera::Error) -> Self {
        static RE: Lazy<Regex> = Lazy::new(|| {
            Regex::new(r"(?ms).*--> (\d+):(\d+)\n.*^\s+= (.*)").expect("a valid regular expression")
        });

        let source = std::error::Error::source(&err);
        let source_str = source.as_ref().map(ToString::to_string).unwrap_or_default();
        let message = err.to_string();
        let undefined = undefined_variable(&err);
        let mut label = None;
        let mut line = 0;
        let mut column = 0;
        let mut original = Some(Box::new(err));
        if let Some(m) = RE.captures(&source_str) {
            line = m
                .get(1)
                .and_then(|line| line.as_str().parse().ok())
                .unwrap_or_default();
            column = m
                .get(2)
                .and_then(|column| column.as_str().parse().ok())
                .unwrap_or_default();
            label = m
                .get(3)
                .map(|msg| msg.as_str().trim())
                .map(ToOwned::to_owned);
            if label.is_some() {
                // the relevant issue is captured in miette's format
                original = None;
            }
        }
        let location = miette::SourceOffset::from_location(&tpl, line, column);
        Error {
            message,
            tpl,
            label,
            location,
            undefined,
            original,
        }
    }

    /// The name of the undefined variable that caused this error, if any
    pub fn undefined_variable(&self) -> Option<&str> {
        self.undefined.as_deref()
    }
}

/// Find the name of an undefined variable reported anywhere
/// in the chain of a template error.
///
/// Only plain names and dotted paths (eg: `git.describe`) are
/// reported, index expressions are not.
pub(crate) fn undefined_variable(err: &tera::Error) -> Option<String> {
    static RE: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"Variable `([A-Za-z_][A-Za-z0-9_]*(?:\.[A-Za-z_][A-Za-z0-9_]*)*)` not found in context")
            .expect("a valid regular expression")
    });

    let mut current: Option<&(dyn std::error::Error + 'static)> = Some(err);
    while let Some(err) = current {
        if let Some(name) = RE.captures(&err.to_string()).and_then(|c| c.get(1)) {
            return Some(name.as_str().to_string());
        }
        current = err.source();
    }
    None
}
