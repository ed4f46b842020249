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

use crate::ast::{Expression, Program, Statement};
use crate::errors::CompilerError;
use crate::symbol_table::SymbolTable;

pub fn check(program: &Program, table: &SymbolTable) -> Result<(), CompilerError> {
    for func in &program.functions {
        check_statement(&func.body, table)?;
    }
    Ok(())
}

fn check_statement(stmt: &Statement, table: &SymbolTable) -> Result<(), CompilerError> {
    match stmt {
        Statement::Compound { statements, .. } => {
            for s in statements {
                check_statement(s, table)?;
            }
        }
        Statement::If { condition, then_branch, .. } => {
            check_expression(condition, table)?;
            check_statement(then_branch, table)?;
        }
        Statement::IfElse { condition, then_branch, else_branch, .. } => {
            check_expression(condition, table)?;
            check_statement(then_branch, table)?;
            check_statement(else_branch, table)?;
        }
        Statement::While { condition, body, .. } => {
            check_expression(condition, table)?;
            check_statement(body, table)?;
        }
        Statement::ExpressionStatement(expr) => check_expression(expr, table)?,
        Statement::VariableAssignment { value, .. } => check_expression(value, table)?,
        Statement::ArrayAssignment { index, value, .. } => {
            check_expression(index, table)?;
            check_expression(value, table)?;
        }
        Statement::Return { value: Some(expr), .. } => check_expression(expr, table)?,
        Statement::Return { value: None, .. } | Statement::VariableDeclaration { .. } | Statement::ArrayDeclaration { .. } => {}
    }
    Ok(())
}

fn check_expression(expr: &Expression, table: &SymbolTable) -> Result<(), CompilerError> {
    match expr {
        Expression::Literal(_) | Expression::Variable { .. } => {}
        Expression::Parenthesized(inner) => check_expression(inner, table)?,
        Expression::Unary { operand, .. } => check_expression(operand, table)?,
        Expression::Binary { lhs, rhs, .. } => {
            check_expression(lhs, table)?;
            check_expression(rhs, table)?;
        }
        Expression::ArrayElement { index, .. } => check_expression(index, table)?,
        Expression::Call { function, arguments, span } => {
            if table.lookup_function(function).is_none() {
                return Err(CompilerError::Semantic {
                    span: span.clone(),
                    message: format!("Unknown function '{function}'"),
                });
            }
            for arg in arguments {
                check_expression(arg, table)?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::*;
    use std::rc::Rc;

    fn span() -> SourceSpan {
        SourceSpan::new(Rc::from("t.mc"), 1, 1)
    }

    #[test]
    fn call_to_undeclared_function_is_rejected() {
        let mut program = Program {
            functions: vec![FunctionDefinition {
                name: "main".to_string(),
                return_type: TypeTag::Int,
                parameters: vec![],
                body: Statement::Compound {
                    statements: vec![Statement::ExpressionStatement(Expression::Call {
                        function: "ghost".to_string(),
                        arguments: vec![],
                        span: span(),
                    })],
                    scope_id: None,
                    span: span(),
                },
                span: span(),
                scope_id: 0,
            }],
        };
        let table = crate::symbol_table::build(&mut program);
        assert!(check(&program, &table).is_err());
    }

    #[test]
    fn call_to_builtin_passes() {
        let mut program = Program {
            functions: vec![FunctionDefinition {
                name: "main".to_string(),
                return_type: TypeTag::Int,
                parameters: vec![],
                body: Statement::Compound {
                    statements: vec![Statement::ExpressionStatement(Expression::Call {
                        function: "print_nl".to_string(),
                        arguments: vec![],
                        span: span(),
                    })],
                    scope_id: None,
                    span: span(),
                },
                span: span(),
                scope_id: 0,
            }],
        };
        let table = crate::symbol_table::build(&mut program);
        assert!(check(&program, &table).is_ok());
    }
}
