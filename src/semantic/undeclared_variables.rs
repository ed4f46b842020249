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
use crate::symbol_table::{ScopeId, SymbolTable};

pub fn check(program: &Program, table: &SymbolTable) -> Result<(), CompilerError> {
    for func in &program.functions {
        check_statement(&func.body, func.scope_id, table)?;
    }
    Ok(())
}

fn check_statement(stmt: &Statement, scope: ScopeId, table: &SymbolTable) -> Result<(), CompilerError> {
    match stmt {
        Statement::Compound { statements, scope_id, .. } => {
            let inner_scope = scope_id.unwrap_or(scope);
            for s in statements {
                check_statement(s, inner_scope, table)?;
            }
        }
        Statement::If { condition, then_branch, .. } => {
            check_expression(condition, scope, table)?;
            check_statement(then_branch, scope, table)?;
        }
        Statement::IfElse { condition, then_branch, else_branch, .. } => {
            check_expression(condition, scope, table)?;
            check_statement(then_branch, scope, table)?;
            check_statement(else_branch, scope, table)?;
        }
        Statement::While { condition, body, .. } => {
            check_expression(condition, scope, table)?;
            check_statement(body, scope, table)?;
        }
        Statement::ExpressionStatement(expr) => check_expression(expr, scope, table)?,
        Statement::VariableAssignment { ident, value, span } => {
            require_variable(ident, span, scope, table)?;
            check_expression(value, scope, table)?;
        }
        Statement::ArrayAssignment { ident, index, value, span } => {
            require_variable(ident, span, scope, table)?;
            check_expression(index, scope, table)?;
            check_expression(value, scope, table)?;
        }
        Statement::Return { value: Some(expr), .. } => check_expression(expr, scope, table)?,
        Statement::Return { value: None, .. } | Statement::VariableDeclaration { .. } | Statement::ArrayDeclaration { .. } => {}
    }
    Ok(())
}

fn check_expression(expr: &Expression, scope: ScopeId, table: &SymbolTable) -> Result<(), CompilerError> {
    match expr {
        Expression::Literal(_) => {}
        Expression::Variable { ident, span } => require_variable(ident, span, scope, table)?,
        Expression::Parenthesized(inner) => check_expression(inner, scope, table)?,
        Expression::Unary { operand, .. } => check_expression(operand, scope, table)?,
        Expression::Binary { lhs, rhs, .. } => {
            check_expression(lhs, scope, table)?;
            check_expression(rhs, scope, table)?;
        }
        Expression::ArrayElement { ident, index, span } => {
            require_variable(ident, span, scope, table)?;
            check_expression(index, scope, table)?;
        }
        Expression::Call { arguments, .. } => {
            for arg in arguments {
                check_expression(arg, scope, table)?;
            }
        }
    }
    Ok(())
}

fn require_variable(
    ident: &str,
    span: &crate::ast::SourceSpan,
    scope: ScopeId,
    table: &SymbolTable,
) -> Result<(), CompilerError> {
    if table.lookup_variable(scope, ident).is_some() {
        Ok(())
    } else {
        Err(CompilerError::Semantic {
            span: span.clone(),
            message: format!("Use of undeclared variable '{ident}'"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::*;
    use std::rc::Rc;

    fn span() -> SourceSpan {
        SourceSpan::new(Rc::from("t.mc"), 1, 1)
    }

    fn program_referencing(ident: &str) -> Program {
        Program {
            functions: vec![FunctionDefinition {
                name: "main".to_string(),
                return_type: TypeTag::Int,
                parameters: vec![],
                body: Statement::Compound {
                    statements: vec![Statement::Return {
                        value: Some(Expression::Variable { ident: ident.to_string(), span: span() }),
                        implicit: false,
                        span: span(),
                    }],
                    scope_id: None,
                    span: span(),
                },
                span: span(),
                scope_id: 0,
            }],
        }
    }

    #[test]
    fn reference_to_undeclared_name_is_rejected() {
        let mut program = program_referencing("ghost");
        let table = crate::symbol_table::build(&mut program);
        assert!(check(&program, &table).is_err());
    }

    #[test]
    fn reference_to_parameter_passes() {
        let mut program = program_referencing("n");
        program.functions[0].parameters.push(Parameter { ty: TypeTag::Int, ident: "n".to_string(), span: span() });
        let table = crate::symbol_table::build(&mut program);
        assert!(check(&program, &table).is_ok());
    }
}
