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

use crate::ast::{Program, SourceSpan, TypeTag};
use crate::errors::CompilerError;

fn fallback_span(program: &Program) -> SourceSpan {
    program
        .functions
        .first()
        .map(|f| f.span.clone())
        .unwrap_or_else(|| SourceSpan::new(Rc::from("<input>"), 0, 0))
}

pub fn check(program: &Program) -> Result<(), CompilerError> {
    let mains: Vec<_> = program.functions.iter().filter(|f| f.name == "main").collect();

    match mains.len() {
        0 => Err(CompilerError::Semantic {
            span: fallback_span(program),
            message: "No main function defined".to_string(),
        }),
        1 => {
            let main = mains[0];
            if !main.parameters.is_empty() || main.return_type != TypeTag::Int {
                Err(CompilerError::Semantic {
                    span: main.span.clone(),
                    message: "Main has wrong signature. Must be `int main()`".to_string(),
                })
            } else {
                Ok(())
            }
        }
        _ => Err(CompilerError::Semantic {
            span: mains[1].span.clone(),
            message: "Too many main functions defined".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{FunctionDefinition, Statement};

    fn func(name: &str, return_type: TypeTag, params: usize) -> FunctionDefinition {
        let span = SourceSpan::new(Rc::from("t.mc"), 1, 1);
        FunctionDefinition {
            name: name.to_string(),
            return_type,
            parameters: (0..params)
                .map(|i| crate::ast::Parameter { ty: TypeTag::Int, ident: format!("p{i}"), span: span.clone() })
                .collect(),
            body: Statement::Compound { statements: vec![], scope_id: None, span: span.clone() },
            span,
            scope_id: 0,
        }
    }

    #[test]
    fn missing_main_is_reported() {
        let program = Program { functions: vec![func("helper", TypeTag::Void, 0)] };
        assert!(check(&program).is_err());
    }

    #[test]
    fn wrong_signature_is_reported() {
        let program = Program { functions: vec![func("main", TypeTag::Float, 0)] };
        let err = check(&program).unwrap_err();
        assert!(matches!(err, CompilerError::Semantic { message, .. } if message.contains("wrong signature")));
    }

    #[test]
    fn exactly_one_correct_main_passes() {
        let program = Program { functions: vec![func("main", TypeTag::Int, 0)] };
        assert!(check(&program).is_ok());
    }
}
