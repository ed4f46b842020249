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

pub mod declarations;
pub mod expressions;
pub mod functions;
pub mod statements;

use std::rc::Rc;

use pest::iterators::Pair;

use crate::ast::SourceSpan;
use crate::parser::Rule;

pub(crate) fn span_of(pair: &Pair<Rule>, file: &Rc<str>) -> SourceSpan {
    let (line, column) = pair.as_span().start_pos().line_col();
    SourceSpan::new(file.clone(), line, column)
}
