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

//! Control-flow graph construction (§4.5). Unlike the source's two-phase
//! linear-chain-then-patch approach (which never actually resolves jump
//! targets into edges), successor edges here are computed directly from
//! each block's last row.

use std::collections::HashMap;

use crate::ir::{Arg, Instr, Ir, RowId};

pub type BlockId = usize;

#[derive(Debug, Clone)]
pub struct BasicBlock {
    pub leader: RowId,
    /// Exclusive end of the block's row range.
    pub end: RowId,
    pub successor_left: Option<BlockId>,
    pub successor_right: Option<BlockId>,
    pub predecessors: Vec<BlockId>,
}

#[derive(Debug, Default)]
pub struct Cfg {
    pub blocks: Vec<BasicBlock>,
}

fn is_leader(ir: &Ir, idx: RowId) -> bool {
    if idx == 0 {
        return true;
    }
    let row = &ir.rows[idx];
    if matches!(row.instr, Instr::Label | Instr::FuncLabel) {
        return true;
    }
    matches!(ir.rows[idx - 1].instr, Instr::Jump | Instr::JumpFalse | Instr::Return)
}

pub fn build(ir: &Ir) -> Cfg {
    let leaders: Vec<RowId> = (0..ir.rows.len()).filter(|&i| is_leader(ir, i)).collect();

    let mut blocks: Vec<BasicBlock> = Vec::with_capacity(leaders.len());
    for (i, &leader) in leaders.iter().enumerate() {
        let end = leaders.get(i + 1).copied().unwrap_or(ir.rows.len());
        blocks.push(BasicBlock { leader, end, successor_left: None, successor_right: None, predecessors: Vec::new() });
    }

    let mut label_to_block: HashMap<u32, BlockId> = HashMap::new();
    for (block_id, block) in blocks.iter().enumerate() {
        if ir.rows[block.leader].instr == Instr::Label {
            if let Some(Arg::Label(n)) = ir.rows[block.leader].arg1 {
                label_to_block.insert(n, block_id);
            }
        }
    }

    let mut edges = Vec::new();
    for (block_id, block) in blocks.iter().enumerate() {
        let last = &ir.rows[block.end - 1];
        let fallthrough = if block_id + 1 < blocks.len() { Some(block_id + 1) } else { None };
        match last.instr {
            Instr::JumpFalse => {
                let target = match last.arg2 {
                    Some(Arg::Label(n)) => label_to_block.get(&n).copied(),
                    _ => None,
                };
                edges.push((block_id, fallthrough, target));
            }
            Instr::Jump => {
                let target = match last.arg1 {
                    Some(Arg::Label(n)) => label_to_block.get(&n).copied(),
                    _ => None,
                };
                edges.push((block_id, None, target));
            }
            Instr::Return => {
                edges.push((block_id, None, None));
            }
            _ => {
                edges.push((block_id, fallthrough, None));
            }
        }
    }

    for (block_id, left, right) in edges {
        blocks[block_id].successor_left = left;
        blocks[block_id].successor_right = right;
        if let Some(l) = left {
            blocks[l].predecessors.push(block_id);
        }
        if let Some(r) = right {
            blocks[r].predecessors.push(block_id);
        }
    }

    Cfg { blocks }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{Arg, Instr, Row};

    fn row(instr: Instr, arg1: Option<Arg>, arg2: Option<Arg>) -> Row {
        Row { instr, arg1, arg2, row_no: 0 }
    }

    #[test]
    fn while_loop_has_four_blocks_with_one_jump_successor() {
        // LABEL(0); cmp; JUMPFALSE(_,1); assign; JUMP(0); LABEL(1); RETURN
        let ir = Ir {
            rows: vec![
                row(Instr::Label, Some(Arg::Label(0)), None),
                row(Instr::Smaller, Some(Arg::Int(1)), Some(Arg::Int(2))),
                row(Instr::JumpFalse, Some(Arg::Row(1)), Some(Arg::Label(1))),
                row(Instr::Assign, Some(Arg::Ident("i".into())), Some(Arg::Int(1))),
                row(Instr::Jump, Some(Arg::Label(0)), None),
                row(Instr::Label, Some(Arg::Label(1)), None),
                row(Instr::Return, None, None),
            ],
        };
        let cfg = build(&ir);
        assert_eq!(cfg.blocks.len(), 4);
        let jump_block = cfg.blocks.iter().find(|b| ir.rows[b.end - 1].instr == Instr::Jump).unwrap();
        assert!(jump_block.successor_left.is_none());
        assert_eq!(jump_block.successor_right, Some(0));
    }

    #[test]
    fn return_block_has_no_successors() {
        let ir = Ir { rows: vec![row(Instr::FuncLabel, Some(Arg::FuncLabel("f".into())), None), row(Instr::Return, None, None)] };
        let cfg = build(&ir);
        let last = cfg.blocks.last().unwrap();
        assert!(last.successor_left.is_none() && last.successor_right.is_none());
    }

    #[test]
    fn every_row_belongs_to_exactly_one_block() {
        let ir = Ir {
            rows: vec![
                row(Instr::FuncLabel, Some(Arg::FuncLabel("f".into())), None),
                row(Instr::Assign, Some(Arg::Ident("x".into())), Some(Arg::Int(1))),
                row(Instr::Return, Some(Arg::Ident("x".into())), None),
            ],
        };
        let cfg = build(&ir);
        let mut covered = vec![false; ir.rows.len()];
        for block in &cfg.blocks {
            for i in block.leader..block.end {
                assert!(!covered[i], "row {i} covered by more than one block");
                covered[i] = true;
            }
        }
        assert!(covered.into_iter().all(|c| c));
    }
}
