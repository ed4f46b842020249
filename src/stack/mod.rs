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

//! Stack frame size and slot position annotation (§4.6), grounded directly
//! on the source's `stack_size.c`.

use crate::ir::{Arg, Instr, Ir, RowId};

pub const STACK_SIZE_INT: u32 = 4;
pub const STACK_SIZE_BOOL: u32 = 4;
pub const STACK_SIZE_STRING: u32 = 4;
pub const STACK_SIZE_FLOAT: u32 = 8;

#[derive(Debug, Default)]
pub struct StackInfo {
    /// Bytes this row allocates; for a FUNC_LABEL row, the function's total
    /// frame size.
    pub stack_size: Vec<u32>,
    /// Byte offset from the frame pointer; meaningless (0) for rows that
    /// allocate nothing.
    pub stack_position: Vec<i32>,
}

fn is_always_bool(instr: Instr) -> bool {
    matches!(
        instr,
        Instr::Smaller
            | Instr::Greater
            | Instr::SmallerEq
            | Instr::GreaterEq
            | Instr::Equals
            | Instr::NotEquals
            | Instr::And
            | Instr::Or
            | Instr::Not
    )
}

pub(crate) fn first_definition(ir: &Ir, range: (RowId, RowId), ident: &str) -> Option<RowId> {
    (range.0..range.1).find(|&i| {
        let row = &ir.rows[i];
        match row.instr {
            Instr::Assign => matches!(&row.arg1, Some(Arg::Ident(n)) if &**n == ident),
            Instr::ArrayBool | Instr::ArrayInt | Instr::ArrayFloat | Instr::ArrayString => {
                matches!(&row.arg1, Some(Arg::Ident(n)) if &**n == ident)
            }
            _ => false,
        }
    })
}

fn array_type_size(ir: &Ir, row_idx: RowId) -> u32 {
    let row = &ir.rows[row_idx];
    let count = match row.arg2 {
        Some(Arg::Int(n)) => n as u32,
        _ => 0,
    };
    match row.instr {
        Instr::ArrayBool => STACK_SIZE_BOOL * count,
        Instr::ArrayInt => STACK_SIZE_INT * count,
        Instr::ArrayFloat => STACK_SIZE_FLOAT * count,
        Instr::ArrayString => STACK_SIZE_STRING,
        _ => 0,
    }
}

/// Per-element size of an array declaration row, as opposed to
/// `array_type_size`'s size of the whole backing allocation.
pub(crate) fn array_element_size(ir: &Ir, row_idx: RowId) -> u32 {
    match ir.rows[row_idx].instr {
        Instr::ArrayBool => STACK_SIZE_BOOL,
        Instr::ArrayInt => STACK_SIZE_INT,
        Instr::ArrayFloat => STACK_SIZE_FLOAT,
        Instr::ArrayString => STACK_SIZE_STRING,
        _ => 0,
    }
}

pub(crate) fn argument_size(ir: &Ir, range: (RowId, RowId), arg: &Arg) -> u32 {
    match arg {
        Arg::String(_) => STACK_SIZE_STRING,
        Arg::Int(_) => STACK_SIZE_INT,
        Arg::Float(_) => STACK_SIZE_FLOAT,
        Arg::Bool(_) => STACK_SIZE_BOOL,
        Arg::Ident(name) => match first_definition(ir, range, name) {
            None => 0,
            Some(def_row) => match ir.rows[def_row].instr {
                Instr::Assign => match &ir.rows[def_row].arg2 {
                    Some(a) => argument_size(ir, range, a),
                    None => 0,
                },
                _ => array_type_size(ir, def_row),
            },
        },
        Arg::ArrayElem { ident, .. } => match first_definition(ir, range, ident) {
            None => 0,
            Some(def_row) => array_type_size(ir, def_row),
        },
        Arg::Row(row_id) => temporary_size(ir, range, *row_id),
        Arg::Label(_) | Arg::FuncLabel(_) => 0,
    }
}

fn temporary_size(ir: &Ir, range: (RowId, RowId), row_id: RowId) -> u32 {
    let row = &ir.rows[row_id];
    if is_always_bool(row.instr) {
        return STACK_SIZE_BOOL;
    }
    match &row.arg1 {
        Some(a) => argument_size(ir, range, a),
        None => 0,
    }
}

fn is_first_assignment(ir: &Ir, range: (RowId, RowId), row_idx: RowId) -> bool {
    let row = &ir.rows[row_idx];
    let Some(Arg::Ident(name)) = &row.arg1 else { return false };
    !(range.0..row_idx).any(|i| {
        matches!(&ir.rows[i].arg1, Some(Arg::Ident(n)) if ir.rows[i].instr == Instr::Assign && n == name)
    })
}

fn row_stack_size(ir: &Ir, range: (RowId, RowId), row_idx: RowId) -> u32 {
    let row = &ir.rows[row_idx];
    match row.instr {
        Instr::Label | Instr::Jump | Instr::JumpFalse | Instr::FuncLabel | Instr::Push | Instr::Pop | Instr::Return | Instr::Call | Instr::Unknown => 0,
        Instr::Assign => {
            if matches!(row.arg1, Some(Arg::ArrayElem { .. })) {
                return 0;
            }
            if !is_first_assignment(ir, range, row_idx) {
                return 0;
            }
            match &row.arg2 {
                Some(a) => argument_size(ir, range, a),
                None => 0,
            }
        }
        Instr::Plus | Instr::Minus | Instr::Multiply | Instr::Divide | Instr::Negativ | Instr::Modulo => {
            match &row.arg1 {
                Some(a) => argument_size(ir, range, a),
                None => 0,
            }
        }
        Instr::Smaller | Instr::Greater | Instr::SmallerEq | Instr::GreaterEq | Instr::Equals | Instr::NotEquals | Instr::And | Instr::Or | Instr::Not => {
            STACK_SIZE_BOOL
        }
        Instr::ArrayBool | Instr::ArrayInt | Instr::ArrayFloat | Instr::ArrayString => array_type_size(ir, row_idx),
    }
}

/// Frame-pointer-relative byte offset of a scalar variable or an array's
/// base element, resolved the same way `argument_size` resolves an
/// `Arg::Ident`'s size: by walking back to its first definition in the
/// enclosing function.
pub(crate) fn locate(ir: &Ir, info: &StackInfo, range: (RowId, RowId), ident: &str) -> Option<i32> {
    first_definition(ir, range, ident).map(|def| info.stack_position[def])
}

pub fn annotate(ir: &Ir) -> StackInfo {
    let n = ir.rows.len();
    let mut stack_size = vec![0u32; n];
    let mut stack_position = vec![0i32; n];

    for (start, end) in ir.function_ranges() {
        let range = (start, end);
        let mut frame_size = 0u32;
        for i in start + 1..end {
            let size = row_stack_size(ir, range, i);
            stack_size[i] = size;
            frame_size += size;
        }
        stack_size[start] = frame_size;

        let mut current = 0i32;
        for i in start + 1..end {
            current -= stack_size[i] as i32;
            stack_position[i] = current;
        }
    }

    StackInfo { stack_size, stack_position }
}
