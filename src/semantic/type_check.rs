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

//! §4.2 "Type rules". Condition expressions for `if`/`while` are required
//! to be `bool` — not explicit in the source's `semantic_checks.c`, but a
//! necessary consequence of having a real boolean type at all; see
//! DESIGN.md.

use crate::ast::{BinaryOp, Expression, FunctionDefinition, Program, SourceSpan, Statement, TypeTag, UnaryOp};
use crate::builtins;
use crate::errors::CompilerError;
use crate::symbol_table::{ScopeId, SymbolKind, SymbolTable};

fn err(span: &SourceSpan, message: impl Into<String>) -> CompilerError {
    CompilerError::Semantic { span: span.clone(), message: message.into() }
}

fn function_signature(program: &Program, name: &str) -> Option<(Vec<TypeTag>, TypeTag)> {
    if let Some(sig) = builtins::lookup(name) {
        return Some((sig.params.to_vec(), sig.return_type));
    }
    program
        .functions
        .iter()
        .find(|f| f.name == name)
        .map(|f| (f.parameters.iter().map(|p| p.ty).collect(), f.return_type))
}

pub fn check(program: &Program, table: &SymbolTable) -> Result<(), CompilerError> {
    for func in &program.functions {
        check_statement(&func.body, func.scope_id, func, program, table)?;
    }
    Ok(())
}

fn check_statement(
    stmt: &Statement,
    scope: ScopeId,
    func: &FunctionDefinition,
    program: &Program,
    table: &SymbolTable,
) -> Result<(), CompilerError> {
    match stmt {
        Statement::Compound { statements, scope_id, .. } => {
            let inner = scope_id.unwrap_or(scope);
            for s in statements {
                check_statement(s, inner, func, program, table)?;
            }
        }
        Statement::If { condition, then_branch, .. } => {
            require_condition(condition, scope, program, table)?;
            check_statement(then_branch, scope, func, program, table)?;
        }
        Statement::IfElse { condition, then_branch, else_branch, .. } => {
            require_condition(condition, scope, program, table)?;
            check_statement(then_branch, scope, func, program, table)?;
            check_statement(else_branch, scope, func, program, table)?;
        }
        Statement::While { condition, body, .. } => {
            require_condition(condition, scope, program, table)?;
            check_statement(body, scope, func, program, table)?;
        }
        Statement::ExpressionStatement(expr) => {
            infer(expr, scope, program, table)?;
        }
        Statement::VariableAssignment { ident, value, span } => {
            let row = table
                .lookup_variable(scope, ident)
                .ok_or_else(|| err(span, format!("Use of undeclared variable '{ident}'")))?;
            if row.kind == SymbolKind::Array {
                return Err(err(span, format!("'{ident}' is an array; assign to an element instead")));
            }
            let rhs_ty = infer(value, scope, program, table)?;
            if rhs_ty != row.ty {
                return Err(err(span, format!("Cannot assign {rhs_ty} to '{ident}' of type {}", row.ty)));
            }
        }
        Statement::ArrayAssignment { ident, index, value, span } => {
            let row = table
                .lookup_variable(scope, ident)
                .ok_or_else(|| err(span, format!("Use of undeclared variable '{ident}'")))?;
            if row.kind != SymbolKind::Array {
                return Err(err(span, format!("'{ident}' is not an array")));
            }
            let element_ty = row.ty;
            let index_ty = infer(index, scope, program, table)?;
            if index_ty != TypeTag::Int {
                return Err(err(span, "array index must be int"));
            }
            let value_ty = infer(value, scope, program, table)?;
            if value_ty != element_ty {
                return Err(err(span, format!("Cannot assign {value_ty} to element of type {element_ty}")));
            }
        }
        Statement::Return { value, span, .. } => match value {
            Some(expr) => {
                let ty = infer(expr, scope, program, table)?;
                if ty != func.return_type {
                    return Err(err(span, format!("Returning {ty} from a function declared to return {}", func.return_type)));
                }
            }
            None => {
                if func.return_type != TypeTag::Void {
                    return Err(err(span, "Missing return value in non-void function"));
                }
            }
        },
        Statement::VariableDeclaration { .. } | Statement::ArrayDeclaration { .. } => {}
    }
    Ok(())
}

fn require_condition(expr: &Expression, scope: ScopeId, program: &Program, table: &SymbolTable) -> Result<(), CompilerError> {
    let ty = infer(expr, scope, program, table)?;
    if ty != TypeTag::Bool {
        return Err(err(expr.span(), format!("condition must be bool, found {ty}")));
    }
    Ok(())
}

fn infer(expr: &Expression, scope: ScopeId, program: &Program, table: &SymbolTable) -> Result<TypeTag, CompilerError> {
    match expr {
        Expression::Literal(lit) => Ok(lit.type_tag()),
        Expression::Parenthesized(inner) => infer(inner, scope, program, table),
        Expression::Variable { ident, span } => table
            .lookup_variable(scope, ident)
            .map(|row| row.ty)
            .ok_or_else(|| err(span, format!("Use of undeclared variable '{ident}'"))),
        Expression::ArrayElement { ident, index, span } => {
            let row = table
                .lookup_variable(scope, ident)
                .ok_or_else(|| err(span, format!("Use of undeclared variable '{ident}'")))?;
            if row.kind != SymbolKind::Array {
                return Err(err(span, format!("'{ident}' is not an array")));
            }
            let index_ty = infer(index, scope, program, table)?;
            if index_ty != TypeTag::Int {
                return Err(err(span, "array index must be int"));
            }
            Ok(row.ty)
        }
        Expression::Unary { op, operand, span } => {
            let ty = infer(operand, scope, program, table)?;
            match op {
                UnaryOp::Negative => {
                    if ty == TypeTag::Bool || ty == TypeTag::String {
                        return Err(err(span, format!("cannot negate a {ty}")));
                    }
                    Ok(ty)
                }
                UnaryOp::Not => {
                    if ty != TypeTag::Bool {
                        return Err(err(span, format!("'!' requires bool, found {ty}")));
                    }
                    Ok(TypeTag::Bool)
                }
            }
        }
        Expression::Binary { op, lhs, rhs, span } => {
            let lt = infer(lhs, scope, program, table)?;
            let rt = infer(rhs, scope, program, table)?;
            match op {
                BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div => {
                    if lt != rt || lt == TypeTag::Bool || lt == TypeTag::String {
                        return Err(err(span, format!("arithmetic requires matching numeric operands, found {lt} and {rt}")));
                    }
                    Ok(lt)
                }
                BinaryOp::Smaller | BinaryOp::Greater | BinaryOp::SmallerEq | BinaryOp::GreaterEq => {
                    if lt != rt || lt == TypeTag::Bool || lt == TypeTag::String {
                        return Err(err(span, format!("comparison requires matching numeric operands, found {lt} and {rt}")));
                    }
                    Ok(TypeTag::Bool)
                }
                BinaryOp::Equal | BinaryOp::NotEqual => {
                    if lt != rt {
                        return Err(err(span, format!("equality requires matching operand types, found {lt} and {rt}")));
                    }
                    Ok(TypeTag::Bool)
                }
                BinaryOp::And | BinaryOp::Or => {
                    if lt != TypeTag::Bool || rt != TypeTag::Bool {
                        return Err(err(span, format!("logical operator requires bool operands, found {lt} and {rt}")));
                    }
                    Ok(TypeTag::Bool)
                }
            }
        }
        Expression::Call { function, arguments, span } => {
            let (params, return_type) = function_signature(program, function)
                .ok_or_else(|| err(span, format!("Unknown function '{function}'")))?;
            if params.len() != arguments.len() {
                return Err(err(span, format!("'{function}' expects {} argument(s), found {}", params.len(), arguments.len())));
            }
            for (arg, expected) in arguments.iter().zip(params.iter()) {
                let ty = infer(arg, scope, program, table)?;
                if ty != *expected {
                    return Err(err(arg.span(), format!("expected {expected}, found {ty}")));
                }
            }
            Ok(return_type)
        }
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

    fn program_with_return(value: Expression, return_type: TypeTag) -> Program {
        Program {
            functions: vec![FunctionDefinition {
                name: "main".to_string(),
                return_type,
                parameters: vec![],
                body: Statement::Compound {
                    statements: vec![Statement::Return { value: Some(value), implicit: false, span: span() }],
                    scope_id: None,
                    span: span(),
                },
                span: span(),
                scope_id: 0,
            }],
        }
    }

    #[test]
    fn mismatched_return_type_is_rejected() {
        let mut program = program_with_return(Expression::Literal(Literal::Bool(true, span())), TypeTag::Int);
        let table = crate::symbol_table::build(&mut program);
        assert!(check(&program, &table).is_err());
    }

    #[test]
    fn if_condition_must_be_bool() {
        let mut program = Program {
            functions: vec![FunctionDefinition {
                name: "main".to_string(),
                return_type: TypeTag::Int,
                parameters: vec![],
                body: Statement::Compound {
                    statements: vec![
                        Statement::If {
                            condition: Expression::Literal(Literal::Int(1, span())),
                            then_branch: Box::new(Statement::Compound { statements: vec![], scope_id: None, span: span() }),
                            span: span(),
                        },
                        Statement::Return { value: Some(Expression::Literal(Literal::Int(0, span()))), implicit: false, span: span() },
                    ],
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
    fn arithmetic_on_matching_ints_passes() {
        let expr = Expression::Binary {
            op: BinaryOp::Add,
            lhs: Box::new(Expression::Literal(Literal::Int(1, span()))),
            rhs: Box::new(Expression::Literal(Literal::Int(2, span()))),
            span: span(),
        };
        let mut program = program_with_return(expr, TypeTag::Int);
        let table = crate::symbol_table::build(&mut program);
        assert!(check(&program, &table).is_ok());
    }
}
