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

//! Three-address IR (§3, §4.4). Rows live in a flat arena (`Vec<Row>`); a
//! `Row` argument refers to an earlier row by its index (`RowId`) rather than
//! a raw pointer, so the list is append-only and never cyclic.

use std::rc::Rc;

use crate::ast::{self, BinaryOp, Expression, Literal, Statement, TypeTag, UnaryOp};

pub type RowId = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instr {
    Plus,
    Minus,
    Multiply,
    Divide,
    Negativ,
    Modulo,
    Smaller,
    Greater,
    SmallerEq,
    GreaterEq,
    Equals,
    NotEquals,
    And,
    Or,
    Not,
    Label,
    Jump,
    JumpFalse,
    FuncLabel,
    Call,
    Return,
    Push,
    Pop,
    Assign,
    ArrayBool,
    ArrayInt,
    ArrayFloat,
    ArrayString,
    Unknown,
}

impl Instr {
    /// §4.4: instructions whose row gets a nonzero temporary number.
    pub fn produces_temporary(self) -> bool {
        matches!(
            self,
            Instr::Plus
                | Instr::Minus
                | Instr::Multiply
                | Instr::Divide
                | Instr::Negativ
                | Instr::Modulo
                | Instr::Smaller
                | Instr::Greater
                | Instr::SmallerEq
                | Instr::GreaterEq
                | Instr::Equals
                | Instr::NotEquals
                | Instr::And
                | Instr::Or
                | Instr::Not
                | Instr::Call
                | Instr::Pop
        )
    }
}

#[derive(Debug, Clone)]
pub enum Arg {
    Int(i64),
    Float(f64),
    Bool(bool),
    String(Rc<str>),
    Ident(Rc<str>),
    ArrayElem { ident: Rc<str>, index: Box<Arg> },
    Label(u32),
    FuncLabel(Rc<str>),
    Row(RowId),
}

#[derive(Debug, Clone)]
pub struct Row {
    pub instr: Instr,
    pub arg1: Option<Arg>,
    pub arg2: Option<Arg>,
    pub row_no: u32,
}

#[derive(Debug, Default)]
pub struct Ir {
    pub rows: Vec<Row>,
}

impl Ir {
    pub fn function_ranges(&self) -> Vec<(RowId, RowId)> {
        let mut ranges = Vec::new();
        let mut start = None;
        for (idx, row) in self.rows.iter().enumerate() {
            if row.instr == Instr::FuncLabel {
                if let Some(s) = start {
                    ranges.push((s, idx));
                }
                start = Some(idx);
            }
        }
        if let Some(s) = start {
            ranges.push((s, self.rows.len()));
        }
        ranges
    }
}

#[derive(Default)]
pub struct IrBuilder {
    rows: Vec<Row>,
    label_counter: u32,
}

impl IrBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, instr: Instr, arg1: Option<Arg>, arg2: Option<Arg>) -> RowId {
        self.rows.push(Row { instr, arg1, arg2, row_no: 0 });
        self.rows.len() - 1
    }

    fn fresh_label(&mut self) -> u32 {
        let l = self.label_counter;
        self.label_counter += 1;
        l
    }

    pub fn build_program(mut self, program: &ast::Program) -> Ir {
        for func in &program.functions {
            self.build_function(func);
        }
        self.number_rows();
        Ir { rows: self.rows }
    }

    fn build_function(&mut self, func: &ast::FunctionDefinition) {
        self.push(Instr::FuncLabel, Some(Arg::FuncLabel(Rc::from(func.name.as_str()))), None);

        for param in &func.parameters {
            let placeholder = match param.ty {
                TypeTag::Float => Arg::Float(0.0),
                _ => Arg::Int(0),
            };
            let pop_row = self.push(Instr::Pop, Some(placeholder), None);
            self.push(Instr::Assign, Some(Arg::Ident(Rc::from(param.ident.as_str()))), Some(Arg::Row(pop_row)));
        }

        self.build_statement(&func.body);
    }

    fn build_statement(&mut self, stmt: &Statement) {
        match stmt {
            Statement::Compound { statements, .. } => {
                for s in statements {
                    self.build_statement(s);
                }
            }
            Statement::ExpressionStatement(expr) => {
                self.build_expression(expr);
            }
            Statement::VariableDeclaration { .. } => {}
            Statement::ArrayDeclaration { ty, ident, size, .. } => {
                let instr = match ty {
                    TypeTag::Bool => Instr::ArrayBool,
                    TypeTag::Int => Instr::ArrayInt,
                    TypeTag::Float => Instr::ArrayFloat,
                    TypeTag::String => Instr::ArrayString,
                    TypeTag::Void => unreachable!("void arrays are rejected by the type checker"),
                };
                self.push(instr, Some(Arg::Ident(Rc::from(ident.as_str()))), Some(Arg::Int(*size)));
            }
            Statement::VariableAssignment { ident, value, .. } => {
                let rhs = self.build_expression(value);
                self.push(Instr::Assign, Some(Arg::Ident(Rc::from(ident.as_str()))), Some(rhs));
            }
            Statement::ArrayAssignment { ident, index, value, .. } => {
                let index_arg = self.build_expression(index);
                let rhs = self.build_expression(value);
                let lhs = Arg::ArrayElem { ident: Rc::from(ident.as_str()), index: Box::new(index_arg) };
                self.push(Instr::Assign, Some(lhs), Some(rhs));
            }
            Statement::If { condition, then_branch, .. } => {
                let cond = self.build_expression(condition);
                let l_end = self.fresh_label();
                self.push(Instr::JumpFalse, Some(cond), Some(Arg::Label(l_end)));
                self.build_statement(then_branch);
                self.push(Instr::Label, Some(Arg::Label(l_end)), None);
            }
            Statement::IfElse { condition, then_branch, else_branch, .. } => {
                let cond = self.build_expression(condition);
                let l_else = self.fresh_label();
                let l_end = self.fresh_label();
                self.push(Instr::JumpFalse, Some(cond), Some(Arg::Label(l_else)));
                self.build_statement(then_branch);
                self.push(Instr::Jump, Some(Arg::Label(l_end)), None);
                self.push(Instr::Label, Some(Arg::Label(l_else)), None);
                self.build_statement(else_branch);
                self.push(Instr::Label, Some(Arg::Label(l_end)), None);
            }
            Statement::While { condition, body, .. } => {
                let l_start = self.fresh_label();
                let l_end = self.fresh_label();
                self.push(Instr::Label, Some(Arg::Label(l_start)), None);
                let cond = self.build_expression(condition);
                self.push(Instr::JumpFalse, Some(cond), Some(Arg::Label(l_end)));
                self.build_statement(body);
                self.push(Instr::Jump, Some(Arg::Label(l_start)), None);
                self.push(Instr::Label, Some(Arg::Label(l_end)), None);
            }
            Statement::Return { value, .. } => {
                let arg = value.as_ref().map(|e| self.build_expression(e));
                self.push(Instr::Return, arg, None);
            }
        }
    }

    fn build_expression(&mut self, expr: &Expression) -> Arg {
        match expr {
            Expression::Literal(lit) => match lit {
                Literal::Int(v, _) => Arg::Int(*v),
                Literal::Float(v, _) => Arg::Float(*v),
                Literal::Bool(v, _) => Arg::Bool(*v),
                Literal::String(v, _) => Arg::String(Rc::from(v.as_str())),
            },
            Expression::Variable { ident, .. } => Arg::Ident(Rc::from(ident.as_str())),
            Expression::Parenthesized(inner) => self.build_expression(inner),
            Expression::ArrayElement { ident, index, .. } => {
                let index_arg = self.build_expression(index);
                Arg::ArrayElem { ident: Rc::from(ident.as_str()), index: Box::new(index_arg) }
            }
            Expression::Unary { op, operand, .. } => {
                let inner = self.build_expression(operand);
                let instr = match op {
                    UnaryOp::Negative => Instr::Negativ,
                    UnaryOp::Not => Instr::Not,
                };
                let row = self.push(instr, Some(inner), None);
                Arg::Row(row)
            }
            Expression::Binary { op, lhs, rhs, .. } => {
                let left = self.build_expression(lhs);
                let right = self.build_expression(rhs);
                let instr = match op {
                    BinaryOp::Add => Instr::Plus,
                    BinaryOp::Sub => Instr::Minus,
                    BinaryOp::Mul => Instr::Multiply,
                    BinaryOp::Div => Instr::Divide,
                    BinaryOp::Smaller => Instr::Smaller,
                    BinaryOp::Greater => Instr::Greater,
                    BinaryOp::SmallerEq => Instr::SmallerEq,
                    BinaryOp::GreaterEq => Instr::GreaterEq,
                    BinaryOp::Equal => Instr::Equals,
                    BinaryOp::NotEqual => Instr::NotEquals,
                    BinaryOp::And => Instr::And,
                    BinaryOp::Or => Instr::Or,
                };
                let row = self.push(instr, Some(left), Some(right));
                Arg::Row(row)
            }
            Expression::Call { function, arguments, .. } => {
                for arg_expr in arguments.iter().rev() {
                    let arg = self.build_expression(arg_expr);
                    self.push(Instr::Push, Some(arg), None);
                }
                let row = self.push(Instr::Call, Some(Arg::FuncLabel(Rc::from(function.as_str()))), None);
                Arg::Row(row)
            }
        }
    }

    fn number_rows(&mut self) {
        let mut next = 1u32;
        for row in &mut self.rows {
            if row.instr.produces_temporary() {
                row.row_no = next;
                next += 1;
            }
        }
    }
}

pub fn build(program: &ast::Program) -> Ir {
    IrBuilder::new().build_program(program)
}
