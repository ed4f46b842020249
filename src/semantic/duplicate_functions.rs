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

use crate::ast::Program;
use crate::errors::CompilerError;

pub fn check(program: &Program) -> Result<(), CompilerError> {
    for (i, func) in program.functions.iter().enumerate() {
        for earlier in &program.functions[..i] {
            if earlier.name == func.name {
                return Err(CompilerError::Semantic {
                    span: func.span.clone(),
                    message: format!("Function '{}' already defined", func.name),
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{FunctionDefinition, SourceSpan, Statement, TypeTag};
    use std::rc::Rc;

    fn func(name: &str) -> FunctionDefinition {
        let span = SourceSpan::new(Rc::from("t.mc"), 1, 1);
        FunctionDefinition {
            name: name.to_string(),
            return_type: TypeTag::Void,
            parameters: vec![],
            body: Statement::Compound { statements: vec![], scope_id: None, span: span.clone() },
            span,
            scope_id: 0,
        }
    }

    #[test]
    fn duplicate_name_is_rejected() {
        let program = Program { functions: vec![func("foo"), func("foo")] };
        assert!(check(&program).is_err());
    }

    #[test]
    fn distinct_names_pass() {
        let program = Program { functions: vec![func("foo"), func("bar")] };
        assert!(check(&program).is_ok());
    }
}
