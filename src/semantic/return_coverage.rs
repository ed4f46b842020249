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

use crate::ast::{Program, Statement, TypeTag};
use crate::errors::CompilerError;

pub fn check(program: &Program) -> Result<(), CompilerError> {
    for func in &program.functions {
        if func.return_type != TypeTag::Void && !covers(&func.body) {
            return Err(CompilerError::Semantic {
                span: func.span.clone(),
                message: format!("Function '{}' does not return on every path", func.name),
            });
        }
    }
    Ok(())
}

/// Whether control can never fall through `stmt` without hitting a return.
/// A `while` never covers the path past it (§4.2's conservative rule):
/// whether the body always returns is irrelevant to that decision.
fn covers(stmt: &Statement) -> bool {
    match stmt {
        Statement::Return { .. } => true,
        Statement::Compound { statements, .. } => statements.iter().any(covers),
        Statement::If { .. } => false,
        Statement::IfElse { then_branch, else_branch, .. } => covers(then_branch) && covers(else_branch),
        Statement::While { .. } => false,
        Statement::ExpressionStatement(_)
        | Statement::VariableDeclaration { .. }
        | Statement::ArrayDeclaration { .. }
        | Statement::VariableAssignment { .. }
        | Statement::ArrayAssignment { .. } => false,
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

    fn func(return_type: TypeTag, body: Vec<Statement>) -> FunctionDefinition {
        FunctionDefinition {
            name: "f".to_string(),
            return_type,
            parameters: vec![],
            body: Statement::Compound { statements: body, scope_id: None, span: span() },
            span: span(),
            scope_id: 0,
        }
    }

    fn ret() -> Statement {
        Statement::Return { value: Some(Expression::Literal(Literal::Int(0, span()))), implicit: false, span: span() }
    }

    #[test]
    fn if_without_else_does_not_cover() {
        let program = Program {
            functions: vec![func(
                TypeTag::Int,
                vec![Statement::If { condition: Expression::Literal(Literal::Bool(true, span())), then_branch: Box::new(ret()), span: span() }],
            )],
        };
        assert!(check(&program).is_err());
    }

    #[test]
    fn if_else_both_returning_covers() {
        let program = Program {
            functions: vec![func(
                TypeTag::Int,
                vec![Statement::IfElse {
                    condition: Expression::Literal(Literal::Bool(true, span())),
                    then_branch: Box::new(ret()),
                    else_branch: Box::new(ret()),
                    span: span(),
                }],
            )],
        };
        assert!(check(&program).is_ok());
    }

    #[test]
    fn while_never_covers_the_path_past_it() {
        let program = Program {
            functions: vec![func(
                TypeTag::Int,
                vec![
                    Statement::While { condition: Expression::Literal(Literal::Bool(true, span())), body: Box::new(ret()), span: span() },
                    ret(),
                ],
            )],
        };
        // covered by the trailing `ret()` after the loop, not the loop itself
        assert!(check(&program).is_ok());
    }

    #[test]
    fn void_function_is_exempt() {
        let program = Program { functions: vec![func(TypeTag::Void, vec![])] };
        assert!(check(&program).is_ok());
    }
}
