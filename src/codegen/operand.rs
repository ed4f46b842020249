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

//! Turns an IR `Arg` into an AT&T-syntax operand string, and collects the
//! string/float constants that must be written out to `.rodata`.

use std::collections::HashMap;

use crate::ir::{Arg, Instr, Ir, RowId};
use crate::stack::{self, StackInfo};

/// Register class an operand's value belongs in: general purpose for
/// int/bool/string-pointer, SSE for float. Decided the same way the stack
/// annotator already distinguishes them — by size, since `STACK_SIZE_FLOAT`
/// is the only 8-byte class in this language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Class {
    Int,
    Float,
}

pub fn class_of(ir: &Ir, range: (RowId, RowId), arg: &Arg) -> Class {
    if stack::argument_size(ir, range, arg) == stack::STACK_SIZE_FLOAT {
        Class::Float
    } else {
        Class::Int
    }
}

pub enum RoDatum {
    Float(f64),
    Str(String),
}

/// Maps a parameter-binding POP row to its cdecl incoming offset
/// (`%ebp`-relative, starting at 8) and whether it is float-sized. Built
/// once per function before emitting its body; see `mod.rs`'s prologue
/// notes on why POP is resolved this way instead of a literal `popl`.
pub type ParamOffsets = HashMap<RowId, (i32, bool)>;

pub fn param_offsets(ir: &Ir, range: (RowId, RowId)) -> ParamOffsets {
    let mut offset = 8i32;
    let mut map = HashMap::new();
    for i in range.0..range.1 {
        if ir.rows[i].instr == Instr::Pop {
            let is_float = matches!(ir.rows[i].arg1, Some(Arg::Float(_)));
            map.insert(i, (offset, is_float));
            offset += if is_float { 8 } else { 4 };
        }
    }
    map
}

pub struct Resolver<'a> {
    pub ir: &'a Ir,
    pub info: &'a StackInfo,
    /// Return-value class of every callable name (builtin or user-defined),
    /// precomputed once for the whole program.
    pub return_class: HashMap<String, Class>,
    pub rodata: Vec<RoDatum>,
    pub prelude: Vec<String>,
}

impl<'a> Resolver<'a> {
    pub fn new(ir: &'a Ir, info: &'a StackInfo, return_class: HashMap<String, Class>) -> Self {
        Resolver { ir, info, return_class, rodata: Vec::new(), prelude: Vec::new() }
    }

    fn rodata_label(&mut self, datum: RoDatum) -> String {
        let label = format!(".LC{}", self.rodata.len());
        self.rodata.push(datum);
        label
    }

    /// Resolves `arg` to an operand string, emitting any address-computation
    /// instructions it needs into `self.prelude` first (consumed by the
    /// caller via `take_prelude`).
    pub fn operand(&mut self, range: (RowId, RowId), arg: &Arg, params: &ParamOffsets) -> String {
        match arg {
            Arg::Int(v) => format!("${v}"),
            Arg::Bool(v) => format!("${}", i32::from(*v)),
            Arg::Float(v) => self.rodata_label(RoDatum::Float(*v)),
            Arg::String(s) => {
                let label = self.rodata_label(RoDatum::Str(s.to_string()));
                format!("${label}")
            }
            Arg::Ident(name) => {
                let pos = stack::locate(self.ir, self.info, range, name).unwrap_or(0);
                format!("{pos}(%ebp)")
            }
            Arg::ArrayElem { ident, index } => self.array_operand(range, ident, index, params),
            Arg::Row(id) => self.row_operand(*id, params),
            Arg::Label(_) | Arg::FuncLabel(_) => {
                unreachable!("label/func-label args are jump/call targets, not values")
            }
        }
    }

    /// `CALL` rows never get a frame slot (the source's own `stack_size.c`
    /// leaves `MCC_IR_INSTR_CALL` at size 0, marked TODO) — their result is
    /// consumed directly out of the return-value register instead of being
    /// spilled. `POP` rows resolve to the incoming parameter's cdecl offset.
    fn row_operand(&mut self, id: RowId, params: &ParamOffsets) -> String {
        if let Some((offset, _)) = params.get(&id) {
            return format!("{offset}(%ebp)");
        }
        if self.ir.rows[id].instr == Instr::Call {
            let class = match &self.ir.rows[id].arg1 {
                Some(Arg::FuncLabel(name)) => self.return_class.get(&**name).copied().unwrap_or(Class::Int),
                _ => Class::Int,
            };
            return match class {
                Class::Int => "%eax".to_string(),
                Class::Float => "%xmm0".to_string(),
            };
        }
        format!("{}(%ebp)", self.info.stack_position[id])
    }

    fn array_operand(&mut self, range: (RowId, RowId), ident: &str, index: &Arg, params: &ParamOffsets) -> String {
        let def_row = stack::first_definition(self.ir, range, ident);
        let base = def_row.map(|r| self.info.stack_position[r]).unwrap_or(0);
        let elem_size = def_row.map(|r| stack::array_element_size(self.ir, r)).unwrap_or(4);

        if let Arg::Int(i) = index {
            let addr = base - (*i as i32) * elem_size as i32;
            return format!("{addr}(%ebp)");
        }

        let index_operand = self.operand(range, index, params);
        self.prelude.push(format!("    movl {index_operand}, %ecx"));
        self.prelude.push("    negl %ecx".to_string());
        format!("{base}(%ebp,%ecx,{elem_size})")
    }

    pub fn take_prelude(&mut self) -> Vec<String> {
        std::mem::take(&mut self.prelude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::Row;

    fn row(instr: Instr, arg1: Option<Arg>, arg2: Option<Arg>) -> Row {
        Row { instr, arg1, arg2, row_no: 0 }
    }

    #[test]
    fn int_literal_is_a_dollar_immediate() {
        let ir = Ir { rows: vec![] };
        let info = StackInfo::default();
        let mut resolver = Resolver::new(&ir, &info, HashMap::new());
        assert_eq!(resolver.operand((0, 0), &Arg::Int(7), &ParamOffsets::new()), "$7");
    }

    #[test]
    fn float_literal_becomes_a_rodata_label() {
        let ir = Ir { rows: vec![] };
        let info = StackInfo::default();
        let mut resolver = Resolver::new(&ir, &info, HashMap::new());
        let label = resolver.operand((0, 0), &Arg::Float(1.5), &ParamOffsets::new());
        assert_eq!(label, ".LC0");
        assert_eq!(resolver.rodata.len(), 1);
    }

    #[test]
    fn param_offsets_start_at_eight_and_grow_by_size() {
        let ir = Ir {
            rows: vec![
                row(Instr::FuncLabel, Some(Arg::FuncLabel("f".into())), None),
                row(Instr::Pop, Some(Arg::Int(0)), None),
                row(Instr::Assign, Some(Arg::Ident("a".into())), Some(Arg::Row(1))),
                row(Instr::Pop, Some(Arg::Float(0.0)), None),
                row(Instr::Assign, Some(Arg::Ident("b".into())), Some(Arg::Row(3))),
            ],
        };
        let map = param_offsets(&ir, (0, ir.rows.len()));
        assert_eq!(map[&1], (8, false));
        assert_eq!(map[&3], (12, true));
    }
}
