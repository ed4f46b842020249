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

use std::rc::Rc;

use pest::iterators::Pair;

use crate::ast::{Parameter, Statement, TypeTag};
use crate::errors::CompilerError;
use crate::parser::Rule;

use super::span_of;

pub(crate) fn build_type_name(pair: Pair<Rule>) -> TypeTag {
    match pair.as_str() {
        "int" => TypeTag::Int,
        "float" => TypeTag::Float,
        "bool" => TypeTag::Bool,
        "string" => TypeTag::String,
        "void" => TypeTag::Void,
        other => unreachable!("grammar only admits five type keywords, got {other}"),
    }
}

pub(crate) fn build_parameter(pair: Pair<Rule>, file: &Rc<str>) -> Parameter {
    let span = span_of(&pair, file);
    let mut inner = pair.into_inner();
    let ty = build_type_name(inner.next().unwrap());
    let ident = inner.next().unwrap().as_str().to_string();
    Parameter { ty, ident, span }
}

pub(crate) fn build_variable_declaration(pair: Pair<Rule>, file: &Rc<str>) -> Statement {
    let span = span_of(&pair, file);
    let mut inner = pair.into_inner();
    let ty = build_type_name(inner.next().unwrap());
    let ident = inner.next().unwrap().as_str().to_string();
    Statement::VariableDeclaration { ty, ident, span }
}

pub(crate) fn build_array_declaration(pair: Pair<Rule>, file: &Rc<str>) -> Result<Statement, CompilerError> {
    let span = span_of(&pair, file);
    let mut inner = pair.into_inner();
    let ty = build_type_name(inner.next().unwrap());
    let ident = inner.next().unwrap().as_str().to_string();
    let size_pair = inner.next().unwrap();
    let size: i64 = size_pair.as_str().parse().map_err(|_| CompilerError::Internal(
        format!("{span}: array size literal does not fit in i64"),
    ))?;
    Ok(Statement::ArrayDeclaration { ty, ident, size, span })
}
