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

use crate::errors::CompilerError;
use crate::symbol_table::{SymbolKind, SymbolTable};

pub fn check(table: &SymbolTable) -> Result<(), CompilerError> {
    for scope in &table.scopes {
        for (i, row) in scope.rows.iter().enumerate() {
            if row.kind == SymbolKind::Function {
                continue;
            }
            if scope.rows[..i].iter().any(|r| r.kind != SymbolKind::Function && r.name == row.name) {
                return Err(CompilerError::Semantic {
                    span: row.span.clone(),
                    message: format!("Variable '{}' already declared in this scope", row.name),
                });
            }
        }
    }
    Ok(())
}
