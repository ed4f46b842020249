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

//! Semantic validation (§4.2): a fixed-order suite of independent checks
//! that short-circuits on the first failure, mirroring the source's
//! single check-record with early abort — modeled here as ordinary
//! `Result`/`?` chaining instead of a shared out-parameter.

pub mod duplicate_functions;
pub mod duplicate_variables;
pub mod main_function;
pub mod return_coverage;
pub mod type_check;
pub mod undeclared_variables;
pub mod unknown_calls;

use crate::ast::Program;
use crate::errors::CompilerError;
use crate::symbol_table::SymbolTable;

pub fn check_program(program: &Program, table: &SymbolTable) -> Result<(), CompilerError> {
    main_function::check(program)?;
    duplicate_functions::check(program)?;
    duplicate_variables::check(table)?;
    unknown_calls::check(program, table)?;
    undeclared_variables::check(program, table)?;
    return_coverage::check(program)?;
    type_check::check(program, table)?;
    Ok(())
}
