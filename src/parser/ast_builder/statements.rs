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

use crate::ast::Statement;
use crate::errors::CompilerError;
use crate::parser::Rule;

use super::declarations::{build_array_declaration, build_variable_declaration};
use super::expressions::build_expression;
use super::span_of;

pub(crate) fn build_statement(pair: Pair<Rule>, file: &Rc<str>) -> Result<Statement, CompilerError> {
    debug_assert_eq!(pair.as_rule(), Rule::statement);
    let inner = pair.into_inner().next().unwrap();
    match inner.as_rule() {
        Rule::if_statement => build_if(inner, file),
        Rule::if_else_statement => build_if_else(inner, file),
        Rule::while_statement => build_while(inner, file),
        Rule::compound_statement => build_compound(inner, file),
        Rule::return_statement => build_return(inner, file),
        Rule::variable_declaration => Ok(build_variable_declaration(inner, file)),
        Rule::array_declaration => build_array_declaration(inner, file),
        Rule::array_assignment => build_array_assignment(inner, file),
        Rule::variable_assignment => build_variable_assignment(inner, file),
        Rule::expression_statement => {
            let expr = build_expression(inner.into_inner().next().unwrap(), file)?;
            Ok(Statement::ExpressionStatement(expr))
        }
        other => unreachable!("unexpected statement child {other:?}"),
    }
}

pub(crate) fn build_compound(pair: Pair<Rule>, file: &Rc<str>) -> Result<Statement, CompilerError> {
    let span = span_of(&pair, file);
    let mut statements = Vec::new();
    for stmt_pair in pair.into_inner() {
        statements.push(build_statement(stmt_pair, file)?);
    }
    Ok(Statement::Compound { statements, scope_id: None, span })
}

fn build_if(pair: Pair<Rule>, file: &Rc<str>) -> Result<Statement, CompilerError> {
    let span = span_of(&pair, file);
    let mut inner = pair.into_inner();
    let condition = build_expression(inner.next().unwrap(), file)?;
    let then_branch = Box::new(build_statement(inner.next().unwrap(), file)?);
    Ok(Statement::If { condition, then_branch, span })
}

fn build_if_else(pair: Pair<Rule>, file: &Rc<str>) -> Result<Statement, CompilerError> {
    let span = span_of(&pair, file);
    let mut inner = pair.into_inner();
    let condition = build_expression(inner.next().unwrap(), file)?;
    let then_branch = Box::new(build_statement(inner.next().unwrap(), file)?);
    let else_branch = Box::new(build_statement(inner.next().unwrap(), file)?);
    Ok(Statement::IfElse { condition, then_branch, else_branch, span })
}

fn build_while(pair: Pair<Rule>, file: &Rc<str>) -> Result<Statement, CompilerError> {
    let span = span_of(&pair, file);
    let mut inner = pair.into_inner();
    let condition = build_expression(inner.next().unwrap(), file)?;
    let body = Box::new(build_statement(inner.next().unwrap(), file)?);
    Ok(Statement::While { condition, body, span })
}

fn build_return(pair: Pair<Rule>, file: &Rc<str>) -> Result<Statement, CompilerError> {
    let span = span_of(&pair, file);
    let mut inner = pair.into_inner();
    let value = match inner.next() {
        Some(expr_pair) => Some(build_expression(expr_pair, file)?),
        None => None,
    };
    Ok(Statement::Return { value, implicit: false, span })
}

fn build_variable_assignment(pair: Pair<Rule>, file: &Rc<str>) -> Result<Statement, CompilerError> {
    let span = span_of(&pair, file);
    let mut inner = pair.into_inner();
    let ident = inner.next().unwrap().as_str().to_string();
    let value = build_expression(inner.next().unwrap(), file)?;
    Ok(Statement::VariableAssignment { ident, value, span })
}

fn build_array_assignment(pair: Pair<Rule>, file: &Rc<str>) -> Result<Statement, CompilerError> {
    let span = span_of(&pair, file);
    let mut inner = pair.into_inner();
    let ident = inner.next().unwrap().as_str().to_string();
    let index = build_expression(inner.next().unwrap(), file)?;
    let value = build_expression(inner.next().unwrap(), file)?;
    Ok(Statement::ArrayAssignment { ident, index, value, span })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::SourceParser;
    use pest::Parser;

    #[test]
    fn if_else_builds_both_branches() {
        let file: Rc<str> = Rc::from("t.mc");
        let pair = SourceParser::parse(Rule::statement, "if (1) { } else { }").unwrap().next().unwrap();
        let stmt = build_statement(pair, &file).unwrap();
        assert!(matches!(stmt, Statement::IfElse { .. }));
    }

    #[test]
    fn bare_return_has_no_value() {
        let file: Rc<str> = Rc::from("t.mc");
        let pair = SourceParser::parse(Rule::statement, "return;").unwrap().next().unwrap();
        let stmt = build_statement(pair, &file).unwrap();
        match stmt {
            Statement::Return { value, implicit, .. } => {
                assert!(value.is_none());
                assert!(!implicit);
            }
            _ => panic!("expected Return"),
        }
    }
}
