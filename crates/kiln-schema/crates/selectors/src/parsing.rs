// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/spkenv/spk

//! Parsers for the selector expression language.
//!
//! The grammar is the subset of python expressions used by
//! recipe selectors, from lowest to highest precedence:
//!
//! ```text
//! expression := and_expr ("or" and_expr)*
//! and_expr   := not_expr ("and" not_expr)*
//! not_expr   := "not" not_expr | comparison
//! comparison := arith (compare_op arith)*
//! arith      := term (("+" | "-") term)*
//! term       := factor (("*" | "//" | "%") factor)*
//! factor     := "-" factor | postfix
//! postfix    := atom ("[" expression "]" | "." name "(" args ")")*
//! atom       := int | string | True | False | None | name | tuple | list
//! ```

use std::num::ParseIntError;

use nom::IResult;
use nom::Parser;
use nom::branch::alt;
use nom::bytes::complete::{tag, take_while};
use nom::character::complete::{char, digit1, multispace0, multispace1, satisfy};
use nom::combinator::{all_consuming, cut, map, map_res, not, opt, recognize, value, verify};
use nom::error::{
    ContextError,
    ErrorKind,
    FromExternalError,
    ParseError,
    VerboseError,
    context,
    convert_error,
};
use nom::multi::{many0, separated_list0};
use nom::sequence::{delimited, pair, preceded, terminated};

use crate::{BinaryOp, CompareOp, Error, Expr, Result, Value};

#[cfg(test)]
#[path = "./parsing_test.rs"]
mod parsing_test;

/// Words that can never be used as a name
const KEYWORDS: &[&str] = &[
    "and", "or", "not", "in", "is", "if", "else", "for", "lambda", "True", "False", "None",
];

/// Parse a complete selector expression, eg `linux and py >= 27`
pub fn parse_expression(source: &str) -> Result<Expr> {
    all_consuming(terminated(
        expression::<VerboseError<&str>>,
        multispace0,
    ))(source)
    .map(|(_, expr)| expr)
    .map_err(|err| match err {
        nom::Err::Error(e) | nom::Err::Failure(e) => {
            Error::InvalidExpression(convert_error(source, e))
        }
        nom::Err::Incomplete(_) => unreachable!(),
    })
}

/// Parse a selector expression, leaving any trailing input.
pub fn expression<'a, E>(input: &'a str) -> IResult<&'a str, Expr, E>
where
    E: ParseError<&'a str> + ContextError<&'a str> + FromExternalError<&'a str, ParseIntError>,
{
    context("expression", or_expr)(input)
}

fn or_expr<'a, E>(input: &'a str) -> IResult<&'a str, Expr, E>
where
    E: ParseError<&'a str> + ContextError<&'a str> + FromExternalError<&'a str, ParseIntError>,
{
    let (input, first) = and_expr(input)?;
    let (input, rest) = many0(preceded(token(keyword("or")), cut(and_expr)))(input)?;
    let expr = rest
        .into_iter()
        .fold(first, |left, right| Expr::Or(Box::new(left), Box::new(right)));
    Ok((input, expr))
}

fn and_expr<'a, E>(input: &'a str) -> IResult<&'a str, Expr, E>
where
    E: ParseError<&'a str> + ContextError<&'a str> + FromExternalError<&'a str, ParseIntError>,
{
    let (input, first) = not_expr(input)?;
    let (input, rest) = many0(preceded(token(keyword("and")), cut(not_expr)))(input)?;
    let expr = rest
        .into_iter()
        .fold(first, |left, right| Expr::And(Box::new(left), Box::new(right)));
    Ok((input, expr))
}

fn not_expr<'a, E>(input: &'a str) -> IResult<&'a str, Expr, E>
where
    E: ParseError<&'a str> + ContextError<&'a str> + FromExternalError<&'a str, ParseIntError>,
{
    alt((
        map(preceded(token(keyword("not")), cut(not_expr)), |e| {
            Expr::Not(Box::new(e))
        }),
        comparison,
    ))(input)
}

fn comparison<'a, E>(input: &'a str) -> IResult<&'a str, Expr, E>
where
    E: ParseError<&'a str> + ContextError<&'a str> + FromExternalError<&'a str, ParseIntError>,
{
    let (input, first) = arith(input)?;
    let (input, chain) = many0(pair(token(compare_op), cut(arith)))(input)?;
    if chain.is_empty() {
        return Ok((input, first));
    }
    Ok((input, Expr::Compare(Box::new(first), chain)))
}

fn compare_op<'a, E>(input: &'a str) -> IResult<&'a str, CompareOp, E>
where
    E: ParseError<&'a str>,
{
    alt((
        value(CompareOp::Eq, tag("==")),
        value(CompareOp::NotEq, tag("!=")),
        value(CompareOp::LtE, tag("<=")),
        value(CompareOp::GtE, tag(">=")),
        value(CompareOp::Lt, char('<')),
        value(CompareOp::Gt, char('>')),
        value(CompareOp::In, keyword("in")),
        value(
            CompareOp::NotIn,
            pair(keyword("not"), preceded(multispace1, keyword("in"))),
        ),
    ))(input)
}

fn arith<'a, E>(input: &'a str) -> IResult<&'a str, Expr, E>
where
    E: ParseError<&'a str> + ContextError<&'a str> + FromExternalError<&'a str, ParseIntError>,
{
    let (input, first) = term(input)?;
    let (input, rest) = many0(pair(
        token(alt((
            value(BinaryOp::Add, char('+')),
            value(BinaryOp::Sub, char('-')),
        ))),
        cut(term),
    ))(input)?;
    Ok((input, fold_binary(first, rest)))
}

fn term<'a, E>(input: &'a str) -> IResult<&'a str, Expr, E>
where
    E: ParseError<&'a str> + ContextError<&'a str> + FromExternalError<&'a str, ParseIntError>,
{
    let (input, first) = factor(input)?;
    let (input, rest) = many0(pair(
        token(alt((
            value(BinaryOp::FloorDiv, tag("//")),
            value(BinaryOp::Mul, char('*')),
            value(BinaryOp::Mod, char('%')),
        ))),
        cut(factor),
    ))(input)?;
    Ok((input, fold_binary(first, rest)))
}

fn fold_binary(first: Expr, rest: Vec<(BinaryOp, Expr)>) -> Expr {
    rest.into_iter().fold(first, |left, (op, right)| {
        Expr::Binary(op, Box::new(left), Box::new(right))
    })
}

fn factor<'a, E>(input: &'a str) -> IResult<&'a str, Expr, E>
where
    E: ParseError<&'a str> + ContextError<&'a str> + FromExternalError<&'a str, ParseIntError>,
{
    alt((
        map(preceded(token(char('-')), cut(factor)), |e| {
            Expr::Neg(Box::new(e))
        }),
        postfix,
    ))(input)
}

enum Suffix {
    Index(Expr),
    Method(String, Vec<Expr>),
}

fn postfix<'a, E>(input: &'a str) -> IResult<&'a str, Expr, E>
where
    E: ParseError<&'a str> + ContextError<&'a str> + FromExternalError<&'a str, ParseIntError>,
{
    let (input, target) = atom(input)?;
    let (input, suffixes) = many0(suffix)(input)?;
    let expr = suffixes
        .into_iter()
        .fold(target, |target, suffix| match suffix {
            Suffix::Index(index) => Expr::Subscript(Box::new(target), Box::new(index)),
            Suffix::Method(name, args) => Expr::Method {
                target: Box::new(target),
                name,
                args,
            },
        });
    Ok((input, expr))
}

fn suffix<'a, E>(input: &'a str) -> IResult<&'a str, Suffix, E>
where
    E: ParseError<&'a str> + ContextError<&'a str> + FromExternalError<&'a str, ParseIntError>,
{
    alt((
        map(
            delimited(
                token(char('[')),
                cut(expression),
                cut(token(char(']'))),
            ),
            Suffix::Index,
        ),
        map(
            preceded(
                token(char('.')),
                cut(pair(
                    token(identifier),
                    delimited(
                        token(char('(')),
                        separated_list0(token(char(',')), expression),
                        token(char(')')),
                    ),
                )),
            ),
            |(name, args)| Suffix::Method(name.to_string(), args),
        ),
    ))(input)
}

fn atom<'a, E>(input: &'a str) -> IResult<&'a str, Expr, E>
where
    E: ParseError<&'a str> + ContextError<&'a str> + FromExternalError<&'a str, ParseIntError>,
{
    token(alt((
        map(map_res(digit1, str::parse::<i64>), |i| {
            Expr::Literal(Value::Int(i))
        }),
        map(context("string", string_literal), |s| {
            Expr::Literal(Value::Str(s))
        }),
        value(Expr::Literal(Value::Bool(true)), keyword("True")),
        value(Expr::Literal(Value::Bool(false)), keyword("False")),
        value(Expr::Literal(Value::None), keyword("None")),
        map(identifier, |name| Expr::Name(name.to_string())),
        parenthesized,
        list,
    )))(input)
}

/// A parenthesized expression or a tuple
fn parenthesized<'a, E>(input: &'a str) -> IResult<&'a str, Expr, E>
where
    E: ParseError<&'a str> + ContextError<&'a str> + FromExternalError<&'a str, ParseIntError>,
{
    let (input, _) = char('(')(input)?;
    let (input, mut items) = separated_list0(token(char(',')), expression)(input)?;
    let (input, trailing) = opt(token(char(',')))(input)?;
    let (input, _) = cut(token(char(')')))(input)?;
    if items.len() == 1 && trailing.is_none() {
        if let Some(inner) = items.pop() {
            return Ok((input, inner));
        }
    }
    Ok((input, Expr::Tuple(items)))
}

fn list<'a, E>(input: &'a str) -> IResult<&'a str, Expr, E>
where
    E: ParseError<&'a str> + ContextError<&'a str> + FromExternalError<&'a str, ParseIntError>,
{
    let (input, _) = char('[')(input)?;
    let (input, items) = separated_list0(token(char(',')), expression)(input)?;
    let (input, _) = opt(token(char(',')))(input)?;
    let (input, _) = cut(token(char(']')))(input)?;
    Ok((input, Expr::Tuple(items)))
}

/// A single or double quoted string, with simple backslash escapes
fn string_literal<'a, E>(input: &'a str) -> IResult<&'a str, String, E>
where
    E: ParseError<&'a str>,
{
    let mut chars = input.char_indices();
    let quote = match chars.next() {
        Some((_, quote @ ('\'' | '"'))) => quote,
        _ => return Err(nom::Err::Error(E::from_error_kind(input, ErrorKind::Char))),
    };
    let mut parsed = String::new();
    let mut escaped = false;
    for (i, c) in chars {
        if escaped {
            match c {
                'n' => parsed.push('\n'),
                't' => parsed.push('\t'),
                '\\' | '\'' | '"' => parsed.push(c),
                other => {
                    parsed.push('\\');
                    parsed.push(other);
                }
            }
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == quote {
            return Ok((&input[i + c.len_utf8()..], parsed));
        } else {
            parsed.push(c);
        }
    }
    // unterminated
    Err(nom::Err::Failure(E::from_error_kind(
        input,
        ErrorKind::Char,
    )))
}

fn identifier<'a, E>(input: &'a str) -> IResult<&'a str, &'a str, E>
where
    E: ParseError<&'a str>,
{
    verify(
        recognize(pair(
            satisfy(|c: char| c.is_ascii_alphabetic() || c == '_'),
            take_while(is_name_char),
        )),
        |name: &str| !KEYWORDS.contains(&name),
    )(input)
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Match a whole word, so that `in` does not match the start of `input`
fn keyword<'a, E>(word: &'static str) -> impl FnMut(&'a str) -> IResult<&'a str, &'a str, E>
where
    E: ParseError<&'a str>,
{
    terminated(tag(word), not(satisfy(is_name_char)))
}

/// Skip any whitespace before the given parser
fn token<'a, O, E, F>(inner: F) -> impl FnMut(&'a str) -> IResult<&'a str, O, E>
where
    E: ParseError<&'a str>,
    F: Parser<&'a str, O, E>,
{
    preceded(multispace0, inner)
}
