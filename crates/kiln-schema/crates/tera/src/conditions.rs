// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/spkenv/spk

//! Variables that a template only tests for truthiness.
//!
//! Tera reads an undefined variable as false when it is the subject
//! of a condition (`{% if name %}`, `not name`, `a or b`), where any
//! other use of it is a render error. These uses are found in the
//! parsed template instead.

use std::collections::BTreeSet;

use serde_json::Value;
use tera::ast::{Expr, ExprVal, FunctionCall, LogicOperator, Node};

#[cfg(test)]
#[path = "./conditions_test.rs"]
mod conditions_test;

/// The names that a template tests for truthiness, and
/// the names that it binds for itself
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct Conditions {
    tested: BTreeSet<String>,
    locals: BTreeSet<String>,
}

impl Conditions {
    pub(crate) fn from_ast(ast: &[Node]) -> Self {
        let mut conditions = Self::default();
        conditions.locals.insert("__tera_context".into());
        conditions.visit_nodes(ast);
        conditions
    }

    /// The tested names that are not bound by the
    /// template and do not exist in `data`
    pub(crate) fn undefined(&self, data: &Value) -> BTreeSet<String> {
        self.tested
            .iter()
            .filter(|name| !self.locals.contains(root_name(name)))
            .filter(|name| lookup(data, name).is_none())
            .cloned()
            .collect()
    }

    fn visit_nodes(&mut self, nodes: &[Node]) {
        for node in nodes {
            self.visit_node(node);
        }
    }

    fn visit_node(&mut self, node: &Node) {
        match node {
            Node::VariableBlock(_, expr) => self.visit_expr(expr, false),
            Node::Set(_, set) => {
                self.locals.insert(set.key.clone());
                self.visit_expr(&set.value, false);
            }
            Node::If(branches, _) => {
                for (_, condition, body) in &branches.conditions {
                    self.visit_expr(condition, true);
                    self.visit_nodes(body);
                }
                if let Some((_, body)) = &branches.otherwise {
                    self.visit_nodes(body);
                }
            }
            Node::Forloop(_, forloop, _) => {
                self.locals.extend(forloop.key.iter().cloned());
                self.locals.insert(forloop.value.clone());
                self.locals.insert("loop".into());
                self.visit_expr(&forloop.container, false);
                self.visit_nodes(&forloop.body);
                if let Some(body) = &forloop.empty_body {
                    self.visit_nodes(body);
                }
            }
            Node::MacroDefinition(_, definition, _) => {
                self.locals.extend(definition.args.keys().cloned());
                for default in definition.args.values().flatten() {
                    self.visit_expr(default, false);
                }
                self.visit_nodes(&definition.body);
            }
            Node::FilterSection(_, section, _) => {
                self.visit_call(&section.filter);
                self.visit_nodes(&section.body);
            }
            Node::Block(_, block, _) => self.visit_nodes(&block.body),
            _ => {}
        }
    }

    /// Visit an expression, `as_bool` when it is evaluated for truthiness
    fn visit_expr(&mut self, expr: &Expr, as_bool: bool) {
        for filter in &expr.filters {
            self.visit_call(filter);
        }
        match &expr.val {
            ExprVal::Ident(name) if as_bool && !expr.has_default_filter() => {
                self.tested.insert(name.clone());
            }
            ExprVal::Logic(logic) => {
                let operands_as_bool =
                    matches!(logic.operator, LogicOperator::And | LogicOperator::Or);
                self.visit_expr(&logic.lhs, operands_as_bool);
                self.visit_expr(&logic.rhs, operands_as_bool);
            }
            ExprVal::Math(math) => {
                self.visit_expr(&math.lhs, false);
                self.visit_expr(&math.rhs, false);
            }
            ExprVal::In(contains) => {
                self.visit_expr(&contains.lhs, false);
                self.visit_expr(&contains.rhs, false);
            }
            ExprVal::Test(test) => {
                for arg in &test.args {
                    self.visit_expr(arg, false);
                }
            }
            ExprVal::FunctionCall(call) => self.visit_call(call),
            ExprVal::MacroCall(call) => {
                for arg in call.args.values() {
                    self.visit_expr(arg, false);
                }
            }
            ExprVal::Array(items) => {
                for item in items {
                    self.visit_expr(item, false);
                }
            }
            _ => {}
        }
    }

    fn visit_call(&mut self, call: &FunctionCall) {
        for arg in call.args.values() {
            self.visit_expr(arg, false);
        }
    }
}

/// The first part of a dotted or indexed name, eg: `git` for `git.rev`
fn root_name(name: &str) -> &str {
    name.split(['.', '[']).next().unwrap_or(name)
}

/// Find the value at a dotted name, eg: `git.rev` or `items.0`.
///
/// Only the root of a name with an index expression is looked up.
fn lookup<'a>(data: &'a Value, name: &str) -> Option<&'a Value> {
    if name.contains('[') {
        return data.get(root_name(name));
    }
    name.split('.').try_fold(data, |current, part| match current {
        Value::Array(items) => part.parse::<usize>().ok().and_then(|index| items.get(index)),
        other => other.get(part),
    })
}
