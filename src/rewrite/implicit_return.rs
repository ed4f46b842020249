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

//! Implicit return insertion (§4.3). For each function, if its body's last
//! statement is not a `return`, a `return;` flagged `implicit: true` is
//! appended. Applies uniformly to void and non-void functions — a
//! non-void function missing a return on some path is caught earlier by
//! `semantic::return_coverage`, so by the time this pass runs the fall off
//! the end that remains is always the void case.

use crate::ast::{Program, Statement};

pub fn insert_implicit_returns(program: &mut Program) {
    for func in &mut program.functions {
        append_if_missing(&mut func.body);
    }
}

fn append_if_missing(body: &mut Statement) {
    let Statement::Compound { statements, span, .. } = body else {
        return;
    };
    if matches!(statements.last(), Some(Statement::Return { .. })) {
        return;
    }
    let tail_span = statements.last().map(Statement::span).unwrap_or(span).clone();
    statements.push(Statement::Return { value: None, implicit: true, span: tail_span });
}
