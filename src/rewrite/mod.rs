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

//! AST rewrite passes (§4.3), run after semantic analysis accepts the
//! program and before IR construction.

pub mod implicit_return;
pub mod shadow;

use crate::ast::Program;
use crate::symbol_table::SymbolTable;

/// Built-in function definitions never enter the AST in the first place
/// (they are seeded straight into the symbol table by
/// `symbol_table::build`, see `builtins.rs`), so the "built-in stripping"
/// step the source needs is a no-op here — there is nothing to strip.
pub fn rewrite(program: &mut Program, table: &mut SymbolTable) {
    shadow::rename_shadows(program, table);
    implicit_return::insert_implicit_returns(program);
}
