// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/spkenv/spk

//! Line selectors for recipe text.
//!
//! A recipe line may end with a bracketed expression, eg:
//! `- pywin32  # [win]`. The expression is evaluated against the
//! facts of a [`Context`] and the line is kept only when it is true.
//! Expressions are parsed into a small AST and interpreted here,
//! so nothing outside of the context facts is reachable from a recipe.
//!
//! [`Context`]: kiln_schema_foundation::Context

mod error;
pub mod expr;
mod filter;
mod namespace;
pub mod parsing;

pub use error::{Error, EvalError, Result};
pub use expr::{BinaryOp, CompareOp, Expr, Value};
pub use filter::{evaluate_selector, select_lines};
pub use namespace::Namespace;
