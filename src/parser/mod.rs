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

mod ast_builder;

use std::rc::Rc;

use pest::Parser;
use pest_derive::Parser;

use crate::ast::Program;
use crate::errors::CompilerError;

#[derive(Parser)]
#[grammar = "./grammar.pest"]
pub struct SourceParser;

/// Parses one translation unit into a `Program`. `filename` is recorded on
/// every `SourceSpan` the builder produces so diagnostics can name the file.
pub fn parse_program(filename: &str, source: &str) -> Result<Program, CompilerError> {
    let file: Rc<str> = Rc::from(filename);
    let mut pairs = SourceParser::parse(Rule::program, source)?;
    let program_pair = pairs.next().expect("the program rule always produces exactly one pair");
    ast_builder::functions::build_program(program_pair, &file)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_main() {
        let program = parse_program("t.mc", "int main() { return 0; }").unwrap();
        assert_eq!(program.functions.len(), 1);
        assert_eq!(program.functions[0].name, "main");
    }

    #[test]
    fn parses_parameters_and_array_declaration() {
        let src = "int add(int a, int b) { int arr[4]; return a + b; }";
        let program = parse_program("t.mc", src).unwrap();
        assert_eq!(program.functions[0].parameters.len(), 2);
    }

    #[test]
    fn rejects_malformed_source() {
        let result = parse_program("t.mc", "int main( { return 0; }");
        assert!(result.is_err());
    }
}
