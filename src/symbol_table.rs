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

//! Nested-scope symbol table (§4.1).
//!
//! Scopes are stored in a flat arena (`Vec<Scope>`) and referenced by index
//! (`ScopeId`) rather than by parent/child pointers — the arena-of-indices
//! idiom the design notes call for in place of the source's `parent_row`
//! links. Scope 0 is always the global scope, which only ever holds
//! `Function` rows.

use crate::ast::{self, SourceSpan};
use crate::builtins;

pub type ScopeId = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Variable,
    Array,
    Function,
    Parameter,
}

#[derive(Debug, Clone)]
pub struct Row {
    pub name: String,
    pub kind: SymbolKind,
    pub ty: ast::TypeTag,
    /// `None` for scalars; `Some(n)` for an array of `n` elements.
    pub array_size: Option<i64>,
    pub span: SourceSpan,
}

#[derive(Debug, Default)]
pub struct Scope {
    pub parent: Option<ScopeId>,
    /// True for a function's top scope: variable lookups stop here even
    /// though the arena link to `parent` (the global scope) still exists.
    pub is_function_root: bool,
    pub rows: Vec<Row>,
}

#[derive(Debug, Default)]
pub struct SymbolTable {
    pub scopes: Vec<Scope>,
}

impl SymbolTable {
    pub const GLOBAL: ScopeId = 0;

    fn new() -> Self {
        SymbolTable {
            scopes: vec![Scope::default()],
        }
    }

    pub fn open_scope(&mut self, parent: ScopeId, is_function_root: bool) -> ScopeId {
        self.scopes.push(Scope {
            parent: Some(parent),
            is_function_root,
            rows: Vec::new(),
        });
        self.scopes.len() - 1
    }

    /// "Find declaration upwards": current scope backward, then
    /// `parent_row`/`parent_scope`, stopping after the function's own scope
    /// for variable lookups.
    pub fn lookup_variable(&self, start: ScopeId, name: &str) -> Option<&Row> {
        let mut cursor = Some(start);
        while let Some(id) = cursor {
            let scope = &self.scopes[id];
            if let Some(row) = scope.rows.iter().rev().find(|r| r.name == name && r.kind != SymbolKind::Function) {
                return Some(row);
            }
            if scope.is_function_root {
                break;
            }
            cursor = scope.parent;
        }
        None
    }

    /// "Find function": always resolved directly against the global scope,
    /// never via the enclosing-scope chain.
    pub fn lookup_function(&self, name: &str) -> Option<&Row> {
        self.scopes[Self::GLOBAL].rows.iter().find(|r| r.name == name && r.kind == SymbolKind::Function)
    }

    pub fn rename(&mut self, scope: ScopeId, index: usize, new_name: String) {
        self.scopes[scope].rows[index].name = new_name;
    }
}

/// Builds the symbol table from the (not yet rewritten) AST, annotating
/// each function definition and scope-opening compound statement in place
/// with its `ScopeId`. Parameters are inserted into the function's top scope
/// in declaration order; declarations are inserted in the order they appear.
pub fn build(program: &mut ast::Program) -> SymbolTable {
    let mut table = SymbolTable::new();

    for (name, sig) in builtins::TABLE {
        table.scopes[SymbolTable::GLOBAL].rows.push(Row {
            name: (*name).to_string(),
            kind: SymbolKind::Function,
            ty: sig.return_type,
            array_size: None,
            span: SourceSpan::new(std::rc::Rc::from("<builtin>"), 0, 0),
        });
    }

    for func in &mut program.functions {
        let fn_scope = table.open_scope(SymbolTable::GLOBAL, true);
        func.scope_id = fn_scope;

        table.scopes[SymbolTable::GLOBAL].rows.push(Row {
            name: func.name.clone(),
            kind: SymbolKind::Function,
            ty: func.return_type,
            array_size: None,
            span: func.span.clone(),
        });

        for param in &func.parameters {
            table.scopes[fn_scope].rows.push(Row {
                name: param.ident.clone(),
                kind: SymbolKind::Parameter,
                ty: param.ty,
                array_size: None,
                span: param.span.clone(),
            });
        }

        build_statement(&mut func.body, fn_scope, &mut table);
    }

    table
}

fn build_statement(stmt: &mut ast::Statement, current: ScopeId, table: &mut SymbolTable) {
    match stmt {
        ast::Statement::Compound {
            statements,
            scope_id,
            ..
        } => {
            let opens_scope = statements.iter().any(ast::Statement::is_declaration);
            let scope = if opens_scope {
                let s = table.open_scope(current, false);
                *scope_id = Some(s);
                s
            } else {
                *scope_id = None;
                current
            };

            for inner in statements.iter_mut() {
                match inner {
                    ast::Statement::VariableDeclaration { ty, ident, span } => {
                        table.scopes[scope].rows.push(Row {
                            name: ident.clone(),
                            kind: SymbolKind::Variable,
                            ty: *ty,
                            array_size: None,
                            span: span.clone(),
                        });
                    }
                    ast::Statement::ArrayDeclaration { ty, ident, size, span } => {
                        table.scopes[scope].rows.push(Row {
                            name: ident.clone(),
                            kind: SymbolKind::Array,
                            ty: *ty,
                            array_size: Some(*size),
                            span: span.clone(),
                        });
                    }
                    other => build_statement(other, scope, table),
                }
            }
        }
        ast::Statement::If { then_branch, .. } => build_statement(then_branch, current, table),
        ast::Statement::IfElse {
            then_branch,
            else_branch,
            ..
        } => {
            build_statement(then_branch, current, table);
            build_statement(else_branch, current, table);
        }
        ast::Statement::While { body, .. } => build_statement(body, current, table),
        _ => {}
    }
}
