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

//! Human-readable dumps of each front-half artifact, for the `ast`, `symtab`,
//! `ir` and `cfg` subcommands. None of this feeds back into the pipeline —
//! it exists purely so a reader can see what the earlier stages built.

use std::fmt::Write as _;

use crate::ast::{Expression, FunctionDefinition, Literal, Program, Statement};
use crate::cfg::Cfg;
use crate::ir::{Arg, Instr, Ir};
use crate::symbol_table::SymbolTable;

pub fn dump_program(program: &Program) -> String {
    let mut out = String::new();
    for func in &program.functions {
        dump_function(func, &mut out);
    }
    out
}

fn dump_function(func: &FunctionDefinition, out: &mut String) {
    let params: Vec<String> = func.parameters.iter().map(|p| format!("{}:{}", p.ident, p.ty)).collect();
    let _ = writeln!(out, "(fn {} ({}) -> {}", func.name, params.join(", "), func.return_type);
    dump_statement(&func.body, 1, out);
    let _ = writeln!(out, ")");
}

fn indent(depth: usize, out: &mut String) {
    for _ in 0..depth {
        out.push_str("  ");
    }
}

fn dump_statement(stmt: &Statement, depth: usize, out: &mut String) {
    indent(depth, out);
    match stmt {
        Statement::Compound { statements, .. } => {
            out.push_str("(block\n");
            for s in statements {
                dump_statement(s, depth + 1, out);
            }
            indent(depth, out);
            out.push_str(")\n");
        }
        Statement::If { condition, then_branch, .. } => {
            let _ = writeln!(out, "(if {}", dump_expression(condition));
            dump_statement(then_branch, depth + 1, out);
            indent(depth, out);
            out.push_str(")\n");
        }
        Statement::IfElse { condition, then_branch, else_branch, .. } => {
            let _ = writeln!(out, "(if-else {}", dump_expression(condition));
            dump_statement(then_branch, depth + 1, out);
            indent(depth, out);
            out.push_str("(else\n");
            dump_statement(else_branch, depth + 1, out);
            indent(depth, out);
            out.push_str(")\n");
            indent(depth, out);
            out.push_str(")\n");
        }
        Statement::While { condition, body, .. } => {
            let _ = writeln!(out, "(while {}", dump_expression(condition));
            dump_statement(body, depth + 1, out);
            indent(depth, out);
            out.push_str(")\n");
        }
        Statement::ExpressionStatement(expr) => {
            let _ = writeln!(out, "{}", dump_expression(expr));
        }
        Statement::VariableDeclaration { ty, ident, .. } => {
            let _ = writeln!(out, "(decl {ident}:{ty})");
        }
        Statement::ArrayDeclaration { ty, ident, size, .. } => {
            let _ = writeln!(out, "(decl-array {ident}:{ty}[{size}])");
        }
        Statement::VariableAssignment { ident, value, .. } => {
            let _ = writeln!(out, "(= {ident} {})", dump_expression(value));
        }
        Statement::ArrayAssignment { ident, index, value, .. } => {
            let _ = writeln!(out, "(= {ident}[{}] {})", dump_expression(index), dump_expression(value));
        }
        Statement::Return { value, implicit, .. } => {
            let tag = if *implicit { "return-implicit" } else { "return" };
            match value {
                Some(v) => {
                    let _ = writeln!(out, "({tag} {})", dump_expression(v));
                }
                None => {
                    let _ = writeln!(out, "({tag})");
                }
            }
        }
    }
}

fn dump_expression(expr: &Expression) -> String {
    match expr {
        Expression::Literal(lit) => dump_literal(lit),
        Expression::Binary { op, lhs, rhs, .. } => {
            format!("({} {} {})", binary_op_symbol(*op), dump_expression(lhs), dump_expression(rhs))
        }
        Expression::Parenthesized(inner) => format!("({})", dump_expression(inner)),
        Expression::Unary { op, operand, .. } => {
            let symbol = match op {
                crate::ast::UnaryOp::Negative => "neg",
                crate::ast::UnaryOp::Not => "not",
            };
            format!("({symbol} {})", dump_expression(operand))
        }
        Expression::Variable { ident, .. } => ident.clone(),
        Expression::ArrayElement { ident, index, .. } => format!("{ident}[{}]", dump_expression(index)),
        Expression::Call { function, arguments, .. } => {
            let args: Vec<String> = arguments.iter().map(dump_expression).collect();
            format!("({function} {})", args.join(" "))
        }
    }
}

fn dump_literal(lit: &Literal) -> String {
    match lit {
        Literal::Int(v, _) => v.to_string(),
        Literal::Float(v, _) => v.to_string(),
        Literal::Bool(v, _) => v.to_string(),
        Literal::String(v, _) => format!("{v:?}"),
    }
}

fn binary_op_symbol(op: crate::ast::BinaryOp) -> &'static str {
    use crate::ast::BinaryOp::*;
    match op {
        Add => "+",
        Sub => "-",
        Mul => "*",
        Div => "/",
        Smaller => "<",
        Greater => ">",
        SmallerEq => "<=",
        GreaterEq => ">=",
        Equal => "==",
        NotEqual => "!=",
        And => "&&",
        Or => "||",
    }
}

pub fn dump_symbol_table(table: &SymbolTable) -> String {
    let mut out = String::new();
    for (id, scope) in table.scopes.iter().enumerate() {
        let _ = writeln!(out, "scope {id} (parent={:?}, function_root={})", scope.parent, scope.is_function_root);
        for row in &scope.rows {
            match row.array_size {
                Some(n) => {
                    let _ = writeln!(out, "  {} : {} [{n}] ({:?})", row.name, row.ty, row.kind);
                }
                None => {
                    let _ = writeln!(out, "  {} : {} ({:?})", row.name, row.ty, row.kind);
                }
            }
        }
    }
    out
}

pub fn dump_ir(ir: &Ir) -> String {
    let mut out = String::new();
    for row in &ir.rows {
        let a1 = row.arg1.as_ref().map(|a| dump_arg(a, ir)).unwrap_or_default();
        let a2 = row.arg2.as_ref().map(|a| dump_arg(a, ir)).unwrap_or_default();
        let _ = writeln!(out, "{:>4} | {:<11} | {a1:<16} | {a2}", row.row_no, dump_instr(row.instr));
    }
    out
}

fn dump_instr(instr: Instr) -> &'static str {
    match instr {
        Instr::Plus => "PLUS",
        Instr::Minus => "MINUS",
        Instr::Multiply => "MUL",
        Instr::Divide => "DIV",
        Instr::Negativ => "NEG",
        Instr::Modulo => "MOD",
        Instr::Smaller => "LT",
        Instr::Greater => "GT",
        Instr::SmallerEq => "LE",
        Instr::GreaterEq => "GE",
        Instr::Equals => "EQ",
        Instr::NotEquals => "NE",
        Instr::And => "AND",
        Instr::Or => "OR",
        Instr::Not => "NOT",
        Instr::Label => "LABEL",
        Instr::Jump => "JUMP",
        Instr::JumpFalse => "JUMPFALSE",
        Instr::FuncLabel => "FUNC_LABEL",
        Instr::Call => "CALL",
        Instr::Return => "RETURN",
        Instr::Push => "PUSH",
        Instr::Pop => "POP",
        Instr::Assign => "ASSIGN",
        Instr::ArrayBool => "ARRAY_BOOL",
        Instr::ArrayInt => "ARRAY_INT",
        Instr::ArrayFloat => "ARRAY_FLOAT",
        Instr::ArrayString => "ARRAY_STRING",
        Instr::Unknown => "UNKNOWN",
    }
}

fn dump_arg(arg: &Arg, ir: &Ir) -> String {
    match arg {
        Arg::Int(v) => v.to_string(),
        Arg::Float(v) => v.to_string(),
        Arg::Bool(v) => v.to_string(),
        Arg::String(s) => format!("{s:?}"),
        Arg::Ident(name) => name.to_string(),
        Arg::ArrayElem { ident, index } => format!("{ident}[{}]", dump_arg(index, ir)),
        Arg::Label(n) => format!("L{n}"),
        Arg::FuncLabel(name) => name.to_string(),
        Arg::Row(id) => format!("t{}", ir.rows[*id].row_no),
    }
}

pub fn dump_cfg(ir: &Ir, cfg: &Cfg) -> String {
    let mut out = String::new();
    out.push_str("digraph cfg {\n");
    for (id, block) in cfg.blocks.iter().enumerate() {
        let leader_instr = dump_instr(ir.rows[block.leader].instr);
        let _ = writeln!(out, "  b{id} [label=\"b{id}: rows {}..{} ({leader_instr})\"];", block.leader, block.end);
    }
    for (id, block) in cfg.blocks.iter().enumerate() {
        if let Some(left) = block.successor_left {
            let _ = writeln!(out, "  b{id} -> b{left};");
        }
        if let Some(right) = block.successor_right {
            let _ = writeln!(out, "  b{id} -> b{right};");
        }
    }
    out.push_str("}\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::Row;

    fn row(instr: Instr, arg1: Option<Arg>, arg2: Option<Arg>) -> Row {
        Row { instr, arg1, arg2, row_no: 0 }
    }

    #[test]
    fn ir_dump_lists_one_line_per_row() {
        let ir = Ir {
            rows: vec![
                row(Instr::FuncLabel, Some(Arg::FuncLabel("f".into())), None),
                row(Instr::Return, Some(Arg::Int(0)), None),
            ],
        };
        let text = dump_ir(&ir);
        assert_eq!(text.lines().count(), 2);
        assert!(text.contains("FUNC_LABEL"));
    }

    // Mirrors `int f(int a){ return a+a; }`: the PLUS row sits at arena
    // index 3 but carries row_no 2, since row_no only counts
    // temporary-producing rows. The row_no column and any `tK` reference to
    // this row must print 2, not the arena index 3.
    #[test]
    fn ir_dump_renders_row_no_and_temporary_names_not_arena_index() {
        let mut rows = vec![
            row(Instr::FuncLabel, Some(Arg::FuncLabel("f".into())), None),
            row(Instr::Pop, Some(Arg::Ident("a".into())), None),
            row(Instr::Label, Some(Arg::Label(0)), None),
            row(Instr::Plus, Some(Arg::Ident("a".into())), Some(Arg::Ident("a".into()))),
            row(Instr::Return, Some(Arg::Row(3)), None),
        ];
        rows[3].row_no = 2;
        let ir = Ir { rows };

        let text = dump_ir(&ir);
        let lines: Vec<&str> = text.lines().collect();

        assert!(lines[3].trim_start().starts_with("2 |"), "expected row_no 2, got: {}", lines[3]);
        assert!(lines[4].contains("t2"), "expected temporary reference t2, got: {}", lines[4]);
        assert!(!lines[4].contains("t3"));
    }

    #[test]
    fn cfg_dump_is_valid_dot_skeleton() {
        let ir = Ir { rows: vec![row(Instr::FuncLabel, Some(Arg::FuncLabel("f".into())), None), row(Instr::Return, None, None)] };
        let cfg = crate::cfg::build(&ir);
        let text = dump_cfg(&ir, &cfg);
        assert!(text.starts_with("digraph cfg {"));
        assert!(text.trim_end().ends_with('}'));
    }

    #[test]
    fn program_dump_renders_nested_blocks() {
        use crate::ast::*;
        use std::rc::Rc;
        let span = SourceSpan::new(Rc::from("t.mc"), 1, 1);
        let program = Program {
            functions: vec![FunctionDefinition {
                name: "main".to_string(),
                return_type: TypeTag::Int,
                parameters: vec![],
                body: Statement::Compound {
                    statements: vec![Statement::Return {
                        value: Some(Expression::Literal(Literal::Int(0, span.clone()))),
                        implicit: false,
                        span: span.clone(),
                    }],
                    scope_id: None,
                    span: span.clone(),
                },
                span: span.clone(),
                scope_id: 0,
            }],
        };
        let text = dump_program(&program);
        assert!(text.contains("(fn main () -> int"));
        assert!(text.contains("(return 0)"));
    }
}
