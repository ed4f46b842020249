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

use crate::ast::{FunctionDefinition, Program};
use crate::errors::CompilerError;
use crate::parser::Rule;

use super::declarations::{build_parameter, build_type_name};
use super::span_of;
use super::statements::build_compound;

pub(crate) fn build_program(pair: Pair<Rule>, file: &Rc<str>) -> Result<Program, CompilerError> {
    debug_assert_eq!(pair.as_rule(), Rule::program);
    let mut functions = Vec::new();
    for item in pair.into_inner() {
        if item.as_rule() == Rule::function_definition {
            functions.push(build_function_definition(item, file)?);
        }
    }
    Ok(Program { functions })
}

fn build_function_definition(pair: Pair<Rule>, file: &Rc<str>) -> Result<FunctionDefinition, CompilerError> {
    let span = span_of(&pair, file);
    let mut inner = pair.into_inner();
    let return_type = build_type_name(inner.next().unwrap());
    let name = inner.next().unwrap().as_str().to_string();

    let parameter_list = inner.next().unwrap();
    let parameters = parameter_list.into_inner().map(|p| build_parameter(p, file)).collect();

    let body = build_compound(inner.next().unwrap(), file)?;

    Ok(FunctionDefinition {
        name,
        return_type,
        parameters,
        body,
        span,
        scope_id: 0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::SourceParser;
    use pest::Parser;

    #[test]
    fn builds_function_with_parameters() {
        let file: Rc<str> = Rc::from("t.mc");
        let pair = SourceParser::parse(Rule::program, "int add(int a, int b) { return a + b; }")
            .unwrap()
            .next()
            .unwrap();
        let program = build_program(pair, &file).unwrap();
        assert_eq!(program.functions.len(), 1);
        assert_eq!(program.functions[0].parameters.len(), 2);
        assert_eq!(program.functions[0].name, "add");
    }
}
