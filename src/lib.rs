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

pub mod ast;
pub mod builtins;
pub mod cfg;
pub mod codegen;
pub mod dump;
pub mod errors;
pub mod file_reader;
pub mod ir;
pub mod parser;
pub mod rewrite;
pub mod semantic;
pub mod stack;
pub mod symbol_table;

use std::time::Instant;

use errors::CompilerError;
use file_reader::FileReader;

extern crate pest;
extern crate pest_derive;

fn timed<T>(stage: &str, f: impl FnOnce() -> T) -> T {
    let start = Instant::now();
    log::debug!("{stage}: started");
    let result = f();
    log::debug!("{stage}: finished in {:?}", start.elapsed());
    result
}

/// Reads `path` through `reader`, or standard input when `path` is `None`,
/// the same zero-files-means-stdin fallback the CLI layer exposes on every
/// subcommand.
pub fn read_input<F: FileReader>(path: Option<&std::path::Path>, reader: &F) -> Result<(String, String), CompilerError> {
    match path {
        Some(p) => {
            let text = reader.read_to_string(p).map_err(|e| CompilerError::Internal(e.to_string()))?;
            Ok((p.display().to_string(), text))
        }
        None => {
            use std::io::Read;
            let mut text = String::new();
            std::io::stdin().read_to_string(&mut text).map_err(CompilerError::Io)?;
            Ok(("<stdin>".to_string(), text))
        }
    }
}

/// Parse → rewrite → semantic check, the front half shared by every
/// subcommand from `symtab` onward. Returns the rewritten AST and its
/// (post-rewrite) symbol table.
fn front_end(filename: &str, source: &str) -> Result<(ast::Program, symbol_table::SymbolTable), CompilerError> {
    let mut program = timed("parse", || parser::parse_program(filename, source))?;

    if program.functions.is_empty() {
        log::warn!("{filename}: program defines no functions");
    }

    let mut table = timed("symbol table construction", || symbol_table::build(&mut program));
    timed("semantic check", || semantic::check_program(&program, &table))?;
    timed("rewrite", || rewrite::rewrite(&mut program, &mut table));

    Ok((program, table))
}

pub fn run_ast(filename: &str, source: &str) -> Result<String, CompilerError> {
    let program = timed("parse", || parser::parse_program(filename, source))?;
    Ok(dump::dump_program(&program))
}

pub fn run_symtab(filename: &str, source: &str) -> Result<String, CompilerError> {
    let mut program = timed("parse", || parser::parse_program(filename, source))?;
    let table = timed("symbol table construction", || symbol_table::build(&mut program));
    Ok(dump::dump_symbol_table(&table))
}

pub fn run_check(filename: &str, source: &str) -> Result<String, CompilerError> {
    front_end(filename, source)?;
    Ok("OK".to_string())
}

pub fn run_ir(filename: &str, source: &str) -> Result<String, CompilerError> {
    let (program, _table) = front_end(filename, source)?;
    let ir = timed("IR build", || ir::build(&program));
    Ok(dump::dump_ir(&ir))
}

pub fn run_cfg(filename: &str, source: &str) -> Result<String, CompilerError> {
    let (program, _table) = front_end(filename, source)?;
    let ir = timed("IR build", || ir::build(&program));
    let cfg = timed("CFG build", || cfg::build(&ir));
    Ok(dump::dump_cfg(&ir, &cfg))
}

pub fn run_asm(filename: &str, source: &str) -> Result<String, CompilerError> {
    let (program, _table) = front_end(filename, source)?;
    let ir = timed("IR build", || ir::build(&program));
    let info = timed("stack annotate", || stack::annotate(&ir));
    timed("emit", || codegen::emit(&ir, &info, &program))
}
