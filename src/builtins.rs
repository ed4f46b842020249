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

//! The predeclared runtime function surface (§1, §4.3).
//!
//! These never appear as source text or as `FunctionDefinition` nodes; they
//! are seeded directly into the global scope before semantic analysis so
//! that calls to them resolve like any other function, then resolved to
//! external symbols at assembly emission time instead of a local
//! `FUNC_LABEL`.

use crate::ast::TypeTag;

pub struct Signature {
    pub params: &'static [TypeTag],
    pub return_type: TypeTag,
}

pub const TABLE: &[(&str, Signature)] = &[
    (
        "print",
        Signature {
            params: &[TypeTag::String],
            return_type: TypeTag::Void,
        },
    ),
    (
        "print_nl",
        Signature {
            params: &[],
            return_type: TypeTag::Void,
        },
    ),
    (
        "print_int",
        Signature {
            params: &[TypeTag::Int],
            return_type: TypeTag::Void,
        },
    ),
    (
        "print_float",
        Signature {
            params: &[TypeTag::Float],
            return_type: TypeTag::Void,
        },
    ),
    (
        "read_int",
        Signature {
            params: &[],
            return_type: TypeTag::Int,
        },
    ),
    (
        "read_float",
        Signature {
            params: &[],
            return_type: TypeTag::Float,
        },
    ),
];

pub fn lookup(name: &str) -> Option<&'static Signature> {
    TABLE.iter().find(|(n, _)| *n == name).map(|(_, sig)| sig)
}

pub fn is_builtin(name: &str) -> bool {
    TABLE.iter().any(|(n, _)| *n == name)
}
