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

//! x86-32 (AT&T syntax) assembly emitter (§4.7). Consumes the annotated IR
//! and produces deterministic text: one fixed instruction template per IR
//! instruction tag, driven by the operand classes `codegen::operand`
//! resolves.
//!
//! Calling convention is cdecl: the caller pushes arguments right to left
//! and cleans the stack after the call; a function's own `PUSH`/`POP` rows
//! from the source stack-machine model are *not* transliterated literally
//! into hardware `push`/`pop` at the parameter-binding site (the source's
//! `mcc_annotate_ir` leaves `CALL`/`POP` frame size at a TODO'd zero), but
//! rather are read directly off their `%ebp`-relative incoming offset — see
//! `operand::param_offsets` and `operand::Resolver::row_operand`.

mod operand;

use std::collections::HashMap;

use crate::ast::{Program, TypeTag};
use crate::builtins;
use crate::errors::CompilerError;
use crate::ir::{Arg, Instr, Ir, RowId};
use crate::stack::StackInfo;

use operand::{Class, ParamOffsets, RoDatum, Resolver};

pub fn emit(ir: &Ir, info: &StackInfo, program: &Program) -> Result<String, CompilerError> {
    let return_class = collect_return_classes(program);
    let mut resolver = Resolver::new(ir, info, return_class);
    let mut text = String::new();

    text.push_str(".text\n");
    for (start, end) in ir.function_ranges() {
        emit_function(&mut resolver, ir, info, (start, end), &mut text)?;
    }

    let mut out = String::new();
    if !resolver.rodata.is_empty() {
        out.push_str(".section .rodata\n");
        for (i, datum) in resolver.rodata.iter().enumerate() {
            match datum {
                RoDatum::Float(v) => out.push_str(&format!(".LC{i}:\n    .double {v:?}\n")),
                RoDatum::Str(s) => out.push_str(&format!(".LC{i}:\n    .asciz {:?}\n", s)),
            }
        }
    }
    out.push_str(&text);
    Ok(out)
}

fn collect_return_classes(program: &Program) -> HashMap<String, Class> {
    let mut map = HashMap::new();
    for (name, sig) in builtins::TABLE {
        map.insert((*name).to_string(), class_of_type(sig.return_type));
    }
    for func in &program.functions {
        map.insert(func.name.clone(), class_of_type(func.return_type));
    }
    map
}

fn class_of_type(ty: TypeTag) -> Class {
    if ty == TypeTag::Float {
        Class::Float
    } else {
        Class::Int
    }
}

fn func_name(ir: &Ir, start: RowId) -> Result<&str, CompilerError> {
    match &ir.rows[start].arg1 {
        Some(Arg::FuncLabel(name)) => Ok(name),
        _ => Err(CompilerError::Internal("function range does not start with FUNC_LABEL".to_string())),
    }
}

fn emit_function(resolver: &mut Resolver, ir: &Ir, info: &StackInfo, range: (RowId, RowId), out: &mut String) -> Result<(), CompilerError> {
    let (start, end) = range;
    let name = func_name(ir, start)?;
    let frame_size = info.stack_size[start];
    let params = operand::param_offsets(ir, range);

    out.push_str(&format!(".globl {name}\n{name}:\n"));
    out.push_str("    pushl %ebp\n");
    out.push_str("    movl %esp, %ebp\n");
    if frame_size > 0 {
        out.push_str(&format!("    subl ${frame_size}, %esp\n"));
    }

    for i in start + 1..end {
        emit_row(resolver, ir, range, i, &params, out)?;
    }

    Ok(())
}

fn emit_row(
    resolver: &mut Resolver,
    ir: &Ir,
    range: (RowId, RowId),
    idx: RowId,
    params: &ParamOffsets,
    out: &mut String,
) -> Result<(), CompilerError> {
    let row = &ir.rows[idx];
    match row.instr {
        Instr::FuncLabel => Err(CompilerError::Internal("nested FUNC_LABEL inside a function range".to_string())),
        Instr::Pop => Ok(()), // resolved lazily at the point of use, see operand::Resolver::row_operand
        Instr::Label => {
            let Some(Arg::Label(n)) = row.arg1 else { return Err(internal("LABEL missing its target")) };
            out.push_str(&format!(".L{n}:\n"));
            Ok(())
        }
        Instr::Jump => {
            let Some(Arg::Label(n)) = row.arg1 else { return Err(internal("JUMP missing its target")) };
            out.push_str(&format!("    jmp .L{n}\n"));
            Ok(())
        }
        Instr::JumpFalse => {
            let cond = row.arg1.clone().ok_or_else(|| internal("JUMPFALSE missing its condition"))?;
            let Some(Arg::Label(n)) = row.arg2 else { return Err(internal("JUMPFALSE missing its target")) };
            let cond_op = resolver.operand(range, &cond, params);
            flush_prelude(resolver, out);
            out.push_str(&format!("    movl {cond_op}, %eax\n"));
            out.push_str("    testl %eax, %eax\n");
            out.push_str(&format!("    je .L{n}\n"));
            Ok(())
        }
        Instr::Return => {
            if let Some(value) = row.arg1.clone() {
                let class = operand::class_of(ir, range, &value);
                let op = resolver.operand(range, &value, params);
                flush_prelude(resolver, out);
                match class {
                    Class::Int => out.push_str(&format!("    movl {op}, %eax\n")),
                    Class::Float => out.push_str(&format!("    movsd {op}, %xmm0\n")),
                }
            }
            out.push_str("    leave\n    ret\n");
            Ok(())
        }
        Instr::Push => {
            let value = row.arg1.clone().ok_or_else(|| internal("PUSH missing its value"))?;
            let class = operand::class_of(ir, range, &value);
            let op = resolver.operand(range, &value, params);
            flush_prelude(resolver, out);
            match class {
                Class::Int => out.push_str(&format!("    pushl {op}\n")),
                Class::Float => {
                    out.push_str(&format!("    movsd {op}, %xmm0\n"));
                    out.push_str("    subl $8, %esp\n");
                    out.push_str("    movsd %xmm0, (%esp)\n");
                }
            }
            Ok(())
        }
        Instr::Call => emit_call(resolver, ir, range, idx, params, out),
        Instr::Assign => emit_assign(resolver, ir, range, idx, params, out),
        Instr::Plus | Instr::Minus | Instr::Multiply | Instr::Divide | Instr::Modulo => {
            emit_arithmetic(resolver, ir, range, idx, params, out)
        }
        Instr::Negativ => emit_negate(resolver, ir, range, idx, params, out),
        Instr::Smaller | Instr::Greater | Instr::SmallerEq | Instr::GreaterEq | Instr::Equals | Instr::NotEquals => {
            emit_compare(resolver, ir, range, idx, params, out)
        }
        Instr::And | Instr::Or => emit_logical(resolver, ir, range, idx, params, out),
        Instr::Not => emit_not(resolver, ir, range, idx, params, out),
        Instr::ArrayBool | Instr::ArrayInt | Instr::ArrayFloat | Instr::ArrayString => Ok(()), // space reserved by the prologue's frame size
        Instr::Unknown => Err(internal("UNKNOWN row reached the emitter")),
    }
}

fn internal(message: &str) -> CompilerError {
    CompilerError::Internal(message.to_string())
}

fn flush_prelude(resolver: &mut Resolver, out: &mut String) {
    for line in resolver.take_prelude() {
        out.push_str(&line);
        out.push('\n');
    }
}

fn store_result(row_idx: RowId, class: Class, out: &mut String, info: &StackInfo) {
    let dst = info.stack_position[row_idx];
    match class {
        Class::Int => out.push_str(&format!("    movl %eax, {dst}(%ebp)\n")),
        Class::Float => out.push_str(&format!("    movsd %xmm0, {dst}(%ebp)\n")),
    }
}

fn emit_assign(resolver: &mut Resolver, ir: &Ir, range: (RowId, RowId), idx: RowId, params: &ParamOffsets, out: &mut String) -> Result<(), CompilerError> {
    let row = &ir.rows[idx];
    let lhs = row.arg1.clone().ok_or_else(|| internal("ASSIGN missing its destination"))?;
    let rhs = row.arg2.clone().ok_or_else(|| internal("ASSIGN missing its source"))?;
    let class = operand::class_of(ir, range, &rhs);

    let rhs_op = resolver.operand(range, &rhs, params);
    flush_prelude(resolver, out);
    match class {
        Class::Int => out.push_str(&format!("    movl {rhs_op}, %eax\n")),
        Class::Float => out.push_str(&format!("    movsd {rhs_op}, %xmm0\n")),
    }

    let lhs_op = resolver.operand(range, &lhs, params);
    flush_prelude(resolver, out);
    match class {
        Class::Int => out.push_str(&format!("    movl %eax, {lhs_op}\n")),
        Class::Float => out.push_str(&format!("    movsd %xmm0, {lhs_op}\n")),
    }
    Ok(())
}

fn emit_arithmetic(resolver: &mut Resolver, ir: &Ir, range: (RowId, RowId), idx: RowId, params: &ParamOffsets, out: &mut String) -> Result<(), CompilerError> {
    let row = &ir.rows[idx];
    let lhs = row.arg1.clone().ok_or_else(|| internal("arithmetic row missing its left operand"))?;
    let rhs = row.arg2.clone().ok_or_else(|| internal("arithmetic row missing its right operand"))?;
    let class = operand::class_of(ir, range, &lhs);

    let lhs_op = resolver.operand(range, &lhs, params);
    flush_prelude(resolver, out);
    let rhs_op = resolver.operand(range, &rhs, params);
    flush_prelude(resolver, out);

    match class {
        Class::Int => {
            out.push_str(&format!("    movl {lhs_op}, %eax\n"));
            match row.instr {
                Instr::Plus => out.push_str(&format!("    addl {rhs_op}, %eax\n")),
                Instr::Minus => out.push_str(&format!("    subl {rhs_op}, %eax\n")),
                Instr::Multiply => out.push_str(&format!("    imull {rhs_op}, %eax\n")),
                Instr::Divide | Instr::Modulo => {
                    out.push_str("    cltd\n");
                    out.push_str(&format!("    movl {rhs_op}, %ecx\n"));
                    out.push_str("    idivl %ecx\n");
                    if row.instr == Instr::Modulo {
                        out.push_str("    movl %edx, %eax\n");
                    }
                }
                _ => unreachable!(),
            }
        }
        Class::Float => {
            out.push_str(&format!("    movsd {lhs_op}, %xmm0\n"));
            match row.instr {
                Instr::Plus => out.push_str(&format!("    addsd {rhs_op}, %xmm0\n")),
                Instr::Minus => out.push_str(&format!("    subsd {rhs_op}, %xmm0\n")),
                Instr::Multiply => out.push_str(&format!("    mulsd {rhs_op}, %xmm0\n")),
                Instr::Divide => out.push_str(&format!("    divsd {rhs_op}, %xmm0\n")),
                Instr::Modulo => return Err(internal("modulo has no float form")),
                _ => unreachable!(),
            }
        }
    }
    store_result(idx, class, out, resolver.info);
    Ok(())
}

fn emit_negate(resolver: &mut Resolver, ir: &Ir, range: (RowId, RowId), idx: RowId, params: &ParamOffsets, out: &mut String) -> Result<(), CompilerError> {
    let row = &ir.rows[idx];
    let operand = row.arg1.clone().ok_or_else(|| internal("NEGATIV missing its operand"))?;
    let class = operand::class_of(ir, range, &operand);
    let op = resolver.operand(range, &operand, params);
    flush_prelude(resolver, out);

    match class {
        Class::Int => {
            out.push_str(&format!("    movl {op}, %eax\n"));
            out.push_str("    negl %eax\n");
        }
        Class::Float => {
            out.push_str(&format!("    movsd {op}, %xmm0\n"));
            out.push_str("    pxor %xmm1, %xmm1\n");
            out.push_str("    subsd %xmm0, %xmm1\n");
            out.push_str("    movsd %xmm1, %xmm0\n");
        }
    }
    store_result(idx, class, out, resolver.info);
    Ok(())
}

fn emit_compare(resolver: &mut Resolver, ir: &Ir, range: (RowId, RowId), idx: RowId, params: &ParamOffsets, out: &mut String) -> Result<(), CompilerError> {
    let row = &ir.rows[idx];
    let lhs = row.arg1.clone().ok_or_else(|| internal("comparison missing its left operand"))?;
    let rhs = row.arg2.clone().ok_or_else(|| internal("comparison missing its right operand"))?;
    let class = operand::class_of(ir, range, &lhs);

    let lhs_op = resolver.operand(range, &lhs, params);
    flush_prelude(resolver, out);
    let rhs_op = resolver.operand(range, &rhs, params);
    flush_prelude(resolver, out);

    match class {
        Class::Int => {
            out.push_str(&format!("    movl {lhs_op}, %eax\n"));
            out.push_str(&format!("    cmpl {rhs_op}, %eax\n"));
            let set = match row.instr {
                Instr::Smaller => "setl",
                Instr::Greater => "setg",
                Instr::SmallerEq => "setle",
                Instr::GreaterEq => "setge",
                Instr::Equals => "sete",
                Instr::NotEquals => "setne",
                _ => unreachable!(),
            };
            out.push_str(&format!("    {set} %al\n"));
        }
        Class::Float => {
            out.push_str(&format!("    movsd {lhs_op}, %xmm0\n"));
            out.push_str(&format!("    ucomisd {rhs_op}, %xmm0\n"));
            let set = match row.instr {
                Instr::Smaller => "setb",
                Instr::Greater => "seta",
                Instr::SmallerEq => "setbe",
                Instr::GreaterEq => "setae",
                Instr::Equals => "sete",
                Instr::NotEquals => "setne",
                _ => unreachable!(),
            };
            out.push_str(&format!("    {set} %al\n"));
        }
    }
    out.push_str("    movzbl %al, %eax\n");
    store_result(idx, Class::Int, out, resolver.info);
    Ok(())
}

fn emit_logical(resolver: &mut Resolver, ir: &Ir, range: (RowId, RowId), idx: RowId, params: &ParamOffsets, out: &mut String) -> Result<(), CompilerError> {
    let row = &ir.rows[idx];
    let lhs = row.arg1.clone().ok_or_else(|| internal("logical row missing its left operand"))?;
    let rhs = row.arg2.clone().ok_or_else(|| internal("logical row missing its right operand"))?;

    let lhs_op = resolver.operand(range, &lhs, params);
    flush_prelude(resolver, out);
    let rhs_op = resolver.operand(range, &rhs, params);
    flush_prelude(resolver, out);

    out.push_str(&format!("    movl {lhs_op}, %eax\n"));
    let op = if row.instr == Instr::And { "andl" } else { "orl" };
    out.push_str(&format!("    {op} {rhs_op}, %eax\n"));
    store_result(idx, Class::Int, out, resolver.info);
    Ok(())
}

fn emit_not(resolver: &mut Resolver, ir: &Ir, range: (RowId, RowId), idx: RowId, params: &ParamOffsets, out: &mut String) -> Result<(), CompilerError> {
    let row = &ir.rows[idx];
    let operand = row.arg1.clone().ok_or_else(|| internal("NOT missing its operand"))?;
    let op = resolver.operand(range, &operand, params);
    flush_prelude(resolver, out);
    out.push_str(&format!("    movl {op}, %eax\n"));
    out.push_str("    xorl $1, %eax\n");
    store_result(idx, Class::Int, out, resolver.info);
    Ok(())
}

fn emit_call(_resolver: &mut Resolver, ir: &Ir, range: (RowId, RowId), idx: RowId, _params: &ParamOffsets, out: &mut String) -> Result<(), CompilerError> {
    let row = &ir.rows[idx];
    let Some(Arg::FuncLabel(name)) = &row.arg1 else { return Err(internal("CALL missing its target")) };

    let mut pushed_bytes = 0u32;
    let mut cursor = idx;
    while cursor > range.0 && ir.rows[cursor - 1].instr == Instr::Push {
        cursor -= 1;
        let value = ir.rows[cursor].arg1.clone().ok_or_else(|| internal("PUSH missing its value"))?;
        pushed_bytes += match operand::class_of(ir, range, &value) {
            Class::Int => 4,
            Class::Float => 8,
        };
    }

    out.push_str(&format!("    call {name}\n"));
    if pushed_bytes > 0 {
        out.push_str(&format!("    addl ${pushed_bytes}, %esp\n"));
    }
    // the call's own result is read lazily by whoever consumes Arg::Row(idx), see operand::Resolver::row_operand
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{self, FunctionDefinition, Parameter, Statement};
    use std::rc::Rc as StdRc;

    fn span() -> ast::SourceSpan {
        ast::SourceSpan::new(StdRc::from("t.mc"), 1, 1)
    }

    fn program_with(func: FunctionDefinition) -> Program {
        Program { functions: vec![func] }
    }

    #[test]
    fn empty_void_function_has_prologue_and_epilogue() {
        let program = program_with(FunctionDefinition {
            name: "f".to_string(),
            return_type: TypeTag::Void,
            parameters: vec![],
            body: Statement::Compound {
                statements: vec![Statement::Return { value: None, implicit: true, span: span() }],
                scope_id: None,
                span: span(),
            },
            span: span(),
            scope_id: 0,
        });
        let ir = crate::ir::build(&program);
        let info = crate::stack::annotate(&ir);
        let asm = emit(&ir, &info, &program).unwrap();
        assert!(asm.contains("f:"));
        assert!(asm.contains("pushl %ebp"));
        assert!(asm.contains("leave"));
        assert!(asm.contains("ret"));
    }

    #[test]
    fn returning_an_int_literal_moves_it_into_eax() {
        let program = program_with(FunctionDefinition {
            name: "f".to_string(),
            return_type: TypeTag::Int,
            parameters: vec![],
            body: Statement::Compound {
                statements: vec![Statement::Return {
                    value: Some(ast::Expression::Literal(ast::Literal::Int(7, span()))),
                    implicit: false,
                    span: span(),
                }],
                scope_id: None,
                span: span(),
            },
            span: span(),
            scope_id: 0,
        });
        let ir = crate::ir::build(&program);
        let info = crate::stack::annotate(&ir);
        let asm = emit(&ir, &info, &program).unwrap();
        assert!(asm.contains("movl $7, %eax"));
    }

    #[test]
    fn call_to_builtin_targets_its_runtime_symbol() {
        let program = program_with(FunctionDefinition {
            name: "main".to_string(),
            return_type: TypeTag::Void,
            parameters: vec![],
            body: Statement::Compound {
                statements: vec![
                    Statement::ExpressionStatement(ast::Expression::Call {
                        function: "print_nl".to_string(),
                        arguments: vec![],
                        span: span(),
                    }),
                    Statement::Return { value: None, implicit: true, span: span() },
                ],
                scope_id: None,
                span: span(),
            },
            span: span(),
            scope_id: 0,
        });
        let ir = crate::ir::build(&program);
        let info = crate::stack::annotate(&ir);
        let asm = emit(&ir, &info, &program).unwrap();
        assert!(asm.contains("call print_nl"));
    }

    #[test]
    fn parameter_is_read_from_its_cdecl_offset_not_popped() {
        let program = program_with(FunctionDefinition {
            name: "f".to_string(),
            return_type: TypeTag::Int,
            parameters: vec![Parameter { ty: TypeTag::Int, ident: "n".to_string(), span: span() }],
            body: Statement::Compound {
                statements: vec![Statement::Return {
                    value: Some(ast::Expression::Variable { ident: "n".to_string(), span: span() }),
                    implicit: false,
                    span: span(),
                }],
                scope_id: None,
                span: span(),
            },
            span: span(),
            scope_id: 0,
        });
        let ir = crate::ir::build(&program);
        let info = crate::stack::annotate(&ir);
        let asm = emit(&ir, &info, &program).unwrap();
        assert!(asm.contains("8(%ebp)"));
        assert!(!asm.contains("popl"));
    }
}
