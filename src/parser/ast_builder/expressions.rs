/*
Copyright 2025 Connor Nolan

Licensed under the Apache License, Version 2.0 (the "License");
you may not use this file except in compliance with the License.
You may obtain a copy of the License at

    http://www.apache.org/licenses/LICENSE-2.0

Unless required by applicable law or agreed to in writing, software
distributed under the License is distributed on an "AS IS" BASIS,
WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
See the License for the specific language governing permissions and
limitations under the License.
*/

use std::rc::Rc;

use pest::iterators::Pair;

use crate::ast::{BinaryOp, Expression, Literal, UnaryOp};
use crate::errors::CompilerError;
use crate::parser::Rule;

use super::span_of;

pub(crate) fn build_expression(pair: Pair<Rule>, file: &Rc<str>) -> Result<Expression, CompilerError> {
    debug_assert_eq!(pair.as_rule(), Rule::expression);
    build_or_expr(pair.into_inner().next().unwrap(), file)
}

fn build_or_expr(pair: Pair<Rule>, file: &Rc<str>) -> Result<Expression, CompilerError> {
    fold_left(pair, file, BinaryOp::Or, build_and_expr)
}

fn build_and_expr(pair: Pair<Rule>, file: &Rc<str>) -> Result<Expression, CompilerError> {
    fold_left(pair, file, BinaryOp::And, build_equality_expr)
}

fn fold_left(
    pair: Pair<Rule>,
    file: &Rc<str>,
    op: BinaryOp,
    mut next: impl FnMut(Pair<Rule>, &Rc<str>) -> Result<Expression, CompilerError>,
) -> Result<Expression, CompilerError> {
    let span = span_of(&pair, file);
    let mut operands = pair.into_inner();
    let mut lhs = next(operands.next().unwrap(), file)?;
    for operand in operands {
        let rhs = next(operand, file)?;
        lhs = Expression::Binary { op, lhs: Box::new(lhs), rhs: Box::new(rhs), span: span.clone() };
    }
    Ok(lhs)
}

fn fold_left_tagged(
    pair: Pair<Rule>,
    file: &Rc<str>,
    op_of: impl Fn(&str) -> BinaryOp,
    mut next: impl FnMut(Pair<Rule>, &Rc<str>) -> Result<Expression, CompilerError>,
) -> Result<Expression, CompilerError> {
    let span = span_of(&pair, file);
    let mut inner = pair.into_inner();
    let mut lhs = next(inner.next().unwrap(), file)?;
    loop {
        let Some(op_pair) = inner.next() else { break };
        let op = op_of(op_pair.as_str());
        let rhs_pair = inner.next().expect("binary operator must be followed by an operand");
        let rhs = next(rhs_pair, file)?;
        lhs = Expression::Binary { op, lhs: Box::new(lhs), rhs: Box::new(rhs), span: span.clone() };
    }
    Ok(lhs)
}

fn build_equality_expr(pair: Pair<Rule>, file: &Rc<str>) -> Result<Expression, CompilerError> {
    fold_left_tagged(
        pair,
        file,
        |s| if s == "==" { BinaryOp::Equal } else { BinaryOp::NotEqual },
        build_relational_expr,
    )
}

fn build_relational_expr(pair: Pair<Rule>, file: &Rc<str>) -> Result<Expression, CompilerError> {
    fold_left_tagged(
        pair,
        file,
        |s| match s {
            "<=" => BinaryOp::SmallerEq,
            ">=" => BinaryOp::GreaterEq,
            "<" => BinaryOp::Smaller,
            ">" => BinaryOp::Greater,
            other => unreachable!("unknown relational operator {other}"),
        },
        build_additive_expr,
    )
}

fn build_additive_expr(pair: Pair<Rule>, file: &Rc<str>) -> Result<Expression, CompilerError> {
    fold_left_tagged(
        pair,
        file,
        |s| if s == "+" { BinaryOp::Add } else { BinaryOp::Sub },
        build_multiplicative_expr,
    )
}

fn build_multiplicative_expr(pair: Pair<Rule>, file: &Rc<str>) -> Result<Expression, CompilerError> {
    fold_left_tagged(
        pair,
        file,
        |s| if s == "*" { BinaryOp::Mul } else { BinaryOp::Div },
        build_unary_expr,
    )
}

fn build_unary_expr(pair: Pair<Rule>, file: &Rc<str>) -> Result<Expression, CompilerError> {
    let span = span_of(&pair, file);
    let mut inner = pair.into_inner();
    let first = inner.next().unwrap();
    match first.as_rule() {
        Rule::unary_op => {
            let op = match first.as_str() {
                "-" => UnaryOp::Negative,
                "!" => UnaryOp::Not,
                other => unreachable!("unknown unary operator {other}"),
            };
            let operand = build_unary_expr(inner.next().unwrap(), file)?;
            Ok(Expression::Unary { op, operand: Box::new(operand), span })
        }
        Rule::primary_expr => build_primary_expr(first, file),
        other => unreachable!("unary_expr must contain unary_op or primary_expr, got {other:?}"),
    }
}

fn build_primary_expr(pair: Pair<Rule>, file: &Rc<str>) -> Result<Expression, CompilerError> {
    let inner = pair.into_inner().next().unwrap();
    match inner.as_rule() {
        Rule::call_expr => build_call_expr(inner, file),
        Rule::array_element_expr => build_array_element_expr(inner, file),
        Rule::variable_expr => build_variable_expr(inner, file),
        Rule::literal => build_literal_expr(inner, file),
        Rule::expression => Ok(Expression::Parenthesized(Box::new(build_expression(inner, file)?))),
        other => unreachable!("unexpected primary_expr child {other:?}"),
    }
}

fn build_call_expr(pair: Pair<Rule>, file: &Rc<str>) -> Result<Expression, CompilerError> {
    let span = span_of(&pair, file);
    let mut inner = pair.into_inner();
    let function = inner.next().unwrap().as_str().to_string();
    let mut arguments = Vec::new();
    if let Some(arg_list) = inner.next() {
        for arg in arg_list.into_inner() {
            arguments.push(build_expression(arg, file)?);
        }
    }
    Ok(Expression::Call { function, arguments, span })
}

fn build_array_element_expr(pair: Pair<Rule>, file: &Rc<str>) -> Result<Expression, CompilerError> {
    let span = span_of(&pair, file);
    let mut inner = pair.into_inner();
    let ident = inner.next().unwrap().as_str().to_string();
    let index = build_expression(inner.next().unwrap(), file)?;
    Ok(Expression::ArrayElement { ident, index: Box::new(index), span })
}

fn build_variable_expr(pair: Pair<Rule>, file: &Rc<str>) -> Result<Expression, CompilerError> {
    let span = span_of(&pair, file);
    let ident = pair.into_inner().next().unwrap().as_str().to_string();
    Ok(Expression::Variable { ident, span })
}

fn build_literal_expr(pair: Pair<Rule>, file: &Rc<str>) -> Result<Expression, CompilerError> {
    let inner = pair.into_inner().next().unwrap();
    let span = span_of(&inner, file);
    let literal = match inner.as_rule() {
        Rule::int_literal => Literal::Int(
            inner.as_str().parse().map_err(|_| CompilerError::Internal(format!("{span}: malformed int literal")))?,
            span,
        ),
        Rule::float_literal => Literal::Float(
            inner.as_str().parse().map_err(|_| CompilerError::Internal(format!("{span}: malformed float literal")))?,
            span,
        ),
        Rule::bool_literal => Literal::Bool(inner.as_str() == "true", span),
        Rule::string_literal => {
            let raw = inner.as_str();
            let unquoted = &raw[1..raw.len() - 1];
            Literal::String(unquoted.replace("\\\"", "\"").replace("\\n", "\n").replace("\\\\", "\\"), span)
        }
        other => unreachable!("unexpected literal child {other:?}"),
    };
    Ok(Expression::Literal(literal))
}
