// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/spkenv/spk

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::parsing::parse_expression;
use crate::{Error, Namespace, Result, Value};

#[cfg(test)]
#[path = "./filter_test.rs"]
mod filter_test;

/// A line that ends directly in a selector, eg `- pywin32 [win]`
static SELECTOR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(.+?)\s*\[([^\[\]]+)\]$").expect("a valid regular expression")
});

/// A line with a selector inside of its comment, which may
/// be followed by more comment text, eg `- pywin32  # [win] needed`
static COMMENTED_SELECTOR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(.+?)\s*(#.*)\[([^\[\]]+)\].*$").expect("a valid regular expression")
});

/// The parts of a line that carries a selector
#[derive(Debug, PartialEq, Eq)]
struct SelectorLine<'a> {
    content: &'a str,
    selector: &'a str,
}

impl<'a> SelectorLine<'a> {
    /// Split a line into its content and selector, if it has one.
    ///
    /// When both forms could apply, the shortest content wins.
    fn find(line: &'a str) -> Option<Self> {
        let bare = SELECTOR_RE.captures(line).and_then(|c| Self::from_captures(&c, 2));
        let commented = COMMENTED_SELECTOR_RE
            .captures(line)
            .and_then(|c| Self::from_captures(&c, 3));
        match (bare, commented) {
            (Some(bare), Some(commented)) if bare.content.len() < commented.content.len() => {
                Some(bare)
            }
            (_, Some(commented)) => Some(commented),
            (bare, None) => bare,
        }
    }

    fn from_captures(captures: &Captures<'a>, selector_group: usize) -> Option<Self> {
        Some(Self {
            content: captures.get(1)?.as_str(),
            selector: captures.get(selector_group)?.as_str(),
        })
    }
}

/// Evaluate a single selector expression against a namespace
pub fn evaluate_selector(selector: &str, namespace: &Namespace) -> Result<Value> {
    let expr = parse_expression(selector)?;
    Ok(expr.eval(namespace)?)
}

/// Filter recipe text by evaluating the selector on each line.
///
/// Lines whose selector is false are removed, and the selector
/// is stripped from the lines that are kept. Comment-only lines
/// are always removed. Every line of the output is terminated by
/// a newline.
pub fn select_lines(text: &str, namespace: &Namespace) -> Result<String> {
    let mut lines = Vec::new();
    for (index, line) in text.lines().enumerate() {
        let line = line.trim_end();
        if line.trim_start().starts_with('#') {
            continue;
        }
        let Some(found) = SelectorLine::find(line) else {
            lines.push(line.to_string());
            continue;
        };

        let trailing_quote = match line.chars().last() {
            Some(quote @ ('\'' | '"')) => Some(quote),
            _ => None,
        };
        let selected = evaluate_selector(found.selector, namespace).map_err(|err| {
            Error::SelectorSyntax {
                line: index + 1,
                text: line.to_string(),
                reason: err.to_string(),
            }
        })?;
        if selected.is_truthy() {
            let mut kept = found.content.to_string();
            kept.extend(trailing_quote);
            lines.push(kept);
        } else {
            tracing::trace!(line = index + 1, selector = found.selector, "dropped line");
        }
    }

    let mut output = lines.join("\n");
    output.push('\n');
    Ok(output)
}
