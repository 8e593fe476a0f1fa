// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/spkenv/spk

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
    /// A selector could not be parsed or evaluated
    #[error("Invalid selector on line {line}: {reason}\n{text}")]
    #[diagnostic(code("kiln::selector_syntax"))]
    SelectorSyntax {
        line: usize,
        text: String,
        reason: String,
    },
    #[error("Invalid selector expression:\n{0}")]
    #[diagnostic(code("kiln::selector_syntax"))]
    InvalidExpression(String),
    #[error(transparent)]
    #[diagnostic(forward(0))]
    Eval(#[from] EvalError),
}

/// An error raised while evaluating an otherwise valid expression
#[derive(Diagnostic, Debug, Error, PartialEq, Eq)]
pub enum EvalError {
    #[error("name {0:?} is not defined")]
    #[diagnostic(code("kiln::selector_undefined_name"))]
    UndefinedName(String),
    #[error("unsupported operand types for {op}: '{left}' and '{right}'")]
    UnsupportedOperands {
        op: &'static str,
        left: &'static str,
        right: &'static str,
    },
    #[error("bad operand type for {op}: '{operand}'")]
    UnsupportedOperand {
        op: &'static str,
        operand: &'static str,
    },
    #[error("integer division or modulo by zero")]
    DivisionByZero,
    #[error("integer overflow")]
    Overflow,
    #[error("key {0:?} not found")]
    KeyNotFound(String),
    #[error("index {0} out of range")]
    IndexOutOfRange(i64),
    #[error("'{target}' object is not subscriptable by '{index}'")]
    NotSubscriptable {
        target: &'static str,
        index: &'static str,
    },
    #[error("'{target}' object has no method {method:?}")]
    UnknownMethod {
        target: &'static str,
        method: String,
    },
    #[error("{method}() expected {expected} argument(s), got {given}")]
    WrongArgumentCount {
        method: &'static str,
        expected: &'static str,
        given: usize,
    },
}
