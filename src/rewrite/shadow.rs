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

//! Shadow renaming (§4.3): a post-order traversal of compound statements.
//! For each declaration whose identifier is shadowed — the upward
//! symbol-table lookup from the declaration's scope's *parent* finds
//! another declaration of the same name — allocate a fresh name `_rN` and
//! rewrite the declaration and every later use within its enclosing
//! compound statement.
//!
//! The traversal visits children before renaming its own scope's
//! declarations, so by the time an outer scope looks for remaining uses of
//! a name, any inner re-declaration of that same name has already been
//! renamed away. That makes a literal identifier substitution over the
//! whole subtree safe, rather than needing a separate "is this reference
//! still bound to the outer declaration" check.

use crate::ast::{Expression, Program, Statement};
use crate::symbol_table::{ScopeId, SymbolKind, SymbolTable};

pub fn rename_shadows(program: &mut Program, table: &mut SymbolTable) {
    let mut counter: u32 = 0;
    for func in &mut program.functions {
        rewrite_statement(&mut func.body, func.scope_id, table, &mut counter);
    }
}

fn rewrite_statement(stmt: &mut Statement, scope: ScopeId, table: &mut SymbolTable, counter: &mut u32) {
    match stmt {
        Statement::Compound { statements, scope_id, .. } => {
            let inner = scope_id.unwrap_or(scope);
            for s in statements.iter_mut() {
                rewrite_statement(s, inner, table, counter);
            }
            if let Some(this_scope) = *scope_id {
                for (old_name, new_name) in shadowed_renames(this_scope, table, counter) {
                    for s in statements.iter_mut() {
                        substitute_statement(s, &old_name, &new_name);
                    }
                }
            }
        }
        Statement::If { then_branch, .. } => rewrite_statement(then_branch, scope, table, counter),
        Statement::IfElse { then_branch, else_branch, .. } => {
            rewrite_statement(then_branch, scope, table, counter);
            rewrite_statement(else_branch, scope, table, counter);
        }
        Statement::While { body, .. } => rewrite_statement(body, scope, table, counter),
        Statement::ExpressionStatement(_)
        | Statement::VariableDeclaration { .. }
        | Statement::ArrayDeclaration { .. }
        | Statement::VariableAssignment { .. }
        | Statement::ArrayAssignment { .. }
        | Statement::Return { .. } => {}
    }
}

/// Declarations directly owned by `this_scope` that shadow a declaration
/// visible from its parent. Returns the (old, new) name pairs in
/// declaration order so the caller can apply them one at a time.
fn shadowed_renames(this_scope: ScopeId, table: &mut SymbolTable, counter: &mut u32) -> Vec<(String, String)> {
    let parent = table.scopes[this_scope].parent;
    let row_count = table.scopes[this_scope].rows.len();
    let mut renames = Vec::new();

    for index in 0..row_count {
        let row = &table.scopes[this_scope].rows[index];
        if row.kind != SymbolKind::Variable && row.kind != SymbolKind::Array {
            continue;
        }
        let name = row.name.clone();
        let shadows = match parent {
            Some(p) => table.lookup_variable(p, &name).is_some(),
            None => false,
        };
        if !shadows {
            continue;
        }
        let new_name = format!("_r{counter}");
        *counter += 1;
        table.rename(this_scope, index, new_name.clone());
        renames.push((name, new_name));
    }

    renames
}

fn substitute_statement(stmt: &mut Statement, old: &str, new: &str) {
    match stmt {
        Statement::Compound { statements, .. } => {
            for s in statements.iter_mut() {
                substitute_statement(s, old, new);
            }
        }
        Statement::If { condition, then_branch, .. } => {
            substitute_expression(condition, old, new);
            substitute_statement(then_branch, old, new);
        }
        Statement::IfElse { condition, then_branch, else_branch, .. } => {
            substitute_expression(condition, old, new);
            substitute_statement(then_branch, old, new);
            substitute_statement(else_branch, old, new);
        }
        Statement::While { condition, body, .. } => {
            substitute_expression(condition, old, new);
            substitute_statement(body, old, new);
        }
        Statement::ExpressionStatement(expr) => substitute_expression(expr, old, new),
        Statement::VariableDeclaration { ident, .. } | Statement::ArrayDeclaration { ident, .. } => {
            if ident == old {
                *ident = new.to_string();
            }
        }
        Statement::VariableAssignment { ident, value, .. } => {
            if ident == old {
                *ident = new.to_string();
            }
            substitute_expression(value, old, new);
        }
        Statement::ArrayAssignment { ident, index, value, .. } => {
            if ident == old {
                *ident = new.to_string();
            }
            substitute_expression(index, old, new);
            substitute_expression(value, old, new);
        }
        Statement::Return { value: Some(expr), .. } => substitute_expression(expr, old, new),
        Statement::Return { value: None, .. } => {}
    }
}

fn substitute_expression(expr: &mut Expression, old: &str, new: &str) {
    match expr {
        Expression::Literal(_) => {}
        Expression::Variable { ident, .. } => {
            if ident == old {
                *ident = new.to_string();
            }
        }
        Expression::ArrayElement { ident, index, .. } => {
            if ident == old {
                *ident = new.to_string();
            }
            substitute_expression(index, old, new);
        }
        Expression::Parenthesized(inner) => substitute_expression(inner, old, new),
        Expression::Unary { operand, .. } => substitute_expression(operand, old, new),
        Expression::Binary { lhs, rhs, .. } => {
            substitute_expression(lhs, old, new);
            substitute_expression(rhs, old, new);
        }
        Expression::Call { arguments, .. } => {
            for arg in arguments.iter_mut() {
                substitute_expression(arg, old, new);
            }
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

    fn decl(ident: &str) -> Statement {
        Statement::VariableDeclaration { ty: TypeTag::Int, ident: ident.to_string(), span: span() }
    }

    fn var_ref(ident: &str) -> Expression {
        Expression::Variable { ident: ident.to_string(), span: span() }
    }

    #[test]
    fn inner_declaration_shadowing_outer_is_renamed() {
        let mut program = Program {
            functions: vec![FunctionDefinition {
                name: "main".to_string(),
                return_type: TypeTag::Int,
                parameters: vec![],
                body: Statement::Compound {
                    statements: vec![
                        decl("x"),
                        Statement::Compound {
                            statements: vec![decl("x"), Statement::ExpressionStatement(var_ref("x"))],
                            scope_id: None,
                            span: span(),
                        },
                        Statement::Return { value: Some(var_ref("x")), implicit: false, span: span() },
                    ],
                    scope_id: None,
                    span: span(),
                },
                span: span(),
                scope_id: 0,
            }],
        };
        let mut table = crate::symbol_table::build(&mut program);
        rename_shadows(&mut program, &mut table);

        let Statement::Compound { statements, .. } = &program.functions[0].body else { unreachable!() };
        // outer declaration and its use (the final return) keep their name
        assert!(matches!(&statements[0], Statement::VariableDeclaration { ident, .. } if ident == "x"));
        assert!(matches!(&statements[2], Statement::Return { value: Some(Expression::Variable { ident, .. }), .. } if ident == "x"));

        // inner declaration and its use were both renamed to the same fresh name
        let Statement::Compound { statements: inner, .. } = &statements[1] else { unreachable!() };
        let Statement::VariableDeclaration { ident: inner_decl_name, .. } = &inner[0] else { unreachable!() };
        assert_ne!(inner_decl_name, "x");
        assert!(matches!(&inner[1], Statement::ExpressionStatement(Expression::Variable { ident, .. }) if ident == inner_decl_name));
    }

    #[test]
    fn non_shadowing_declaration_is_untouched() {
        let mut program = Program {
            functions: vec![FunctionDefinition {
                name: "main".to_string(),
                return_type: TypeTag::Int,
                parameters: vec![],
                body: Statement::Compound {
                    statements: vec![decl("x"), decl("y"), Statement::Return { value: Some(var_ref("x")), implicit: false, span: span() }],
                    scope_id: None,
                    span: span(),
                },
                span: span(),
                scope_id: 0,
            }],
        };
        let mut table = crate::symbol_table::build(&mut program);
        rename_shadows(&mut program, &mut table);

        let Statement::Compound { statements, .. } = &program.functions[0].body else { unreachable!() };
        assert!(matches!(&statements[0], Statement::VariableDeclaration { ident, .. } if ident == "x"));
        assert!(matches!(&statements[1], Statement::VariableDeclaration { ident, .. } if ident == "y"));
    }

    #[test]
    fn rename_is_idempotent() {
        let mut program = Program {
            functions: vec![FunctionDefinition {
                name: "main".to_string(),
                return_type: TypeTag::Int,
                parameters: vec![],
                body: Statement::Compound {
                    statements: vec![
                        decl("x"),
                        Statement::Compound { statements: vec![decl("x")], scope_id: None, span: span() },
                        Statement::Return { value: Some(var_ref("x")), implicit: false, span: span() },
                    ],
                    scope_id: None,
                    span: span(),
                },
                span: span(),
                scope_id: 0,
            }],
        };
        let mut table = crate::symbol_table::build(&mut program);
        rename_shadows(&mut program, &mut table);
        let once = format!("{:?}", program);
        rename_shadows(&mut program, &mut table);
        let twice = format!("{:?}", program);
        assert_eq!(once, twice);
    }
}
