//! Control-flow shape of lowered functions

use quartz::ir::{cfg, BlockId, Function, Instruction, Terminator};
use quartz::Compiler;

fn lower(source: &str) -> Function {
    let mut module = Compiler::new()
        .compile_source(source, "test")
        .expect("compilation should succeed");
    module.functions.remove(0)
}

fn block(func: &Function, label: &str) -> BlockId {
    func.block_by_label(label)
        .unwrap_or_else(|| panic!("missing block '{}'", label))
}

fn assert_all_terminated(func: &Function) {
    for b in &func.blocks {
        assert!(b.is_terminated(), "block '{}' has no terminator", b.label);
    }
}

#[test]
fn if_creates_diamond() {
    let func = lower("f(a) { if (a) { x = 1 } else { x = 2 } return x }");
    assert_all_terminated(&func);

    let labels: Vec<_> = func.blocks.iter().map(|b| b.label.as_str()).collect();
    assert_eq!(labels, vec!["entry", "then", "else", "ifcont"]);

    let then_block = block(&func, "then");
    let else_block = block(&func, "else");
    let merge = block(&func, "ifcont");

    assert_eq!(
        cfg::successors(&func, Function::ENTRY),
        vec![then_block, else_block]
    );
    assert_eq!(cfg::successors(&func, then_block), vec![merge]);
    assert_eq!(cfg::successors(&func, else_block), vec![merge]);

    let preds = cfg::predecessors(&func);
    assert_eq!(preds[merge.0], vec![then_block, else_block]);
    assert!(cfg::reachable_blocks(&func).iter().all(|r| *r));
}

#[test]
fn if_condition_is_compared_against_zero() {
    let func = lower("f(a) { if (a - 1) { } else { } return 0 }");
    let entry = func.block(Function::ENTRY);

    let cmp = entry
        .instructions
        .iter()
        .find_map(|inst| match inst {
            Instruction::CmpNe { dest, rhs, .. } => Some((*dest, *rhs)),
            _ => None,
        })
        .expect("condition compare");
    assert_eq!(cmp.1, quartz::ir::Value::Const(0));
    assert!(matches!(
        entry.terminator,
        Some(Terminator::CondBranch { cond: quartz::ir::Value::Temp(id), .. }) if id == cmp.0
    ));
}

#[test]
fn for_loop_has_back_edge_and_exit() {
    let func = lower("f(n) { s = 0 for (i = 0, i - n, i = i + 1) { s = s + i } return s }");
    assert_all_terminated(&func);

    let loop_block = block(&func, "loop");
    let after = block(&func, "afterloop");

    assert_eq!(cfg::successors(&func, Function::ENTRY), vec![loop_block]);
    assert_eq!(cfg::successors(&func, loop_block), vec![loop_block, after]);

    let preds = cfg::predecessors(&func);
    assert_eq!(preds[loop_block.0], vec![Function::ENTRY, loop_block]);
    assert!(matches!(
        func.block(after).terminator,
        Some(Terminator::Return(_))
    ));
}

#[test]
fn loop_condition_is_evaluated_after_step() {
    let func = lower("f() { for (i = 0, i, i = i + 1) { } return 0 }");
    let loop_block = func.block(block(&func, "loop"));

    let store_pos = loop_block
        .instructions
        .iter()
        .position(|inst| matches!(inst, Instruction::Store { .. }))
        .expect("step store");
    let cmp_pos = loop_block
        .instructions
        .iter()
        .position(|inst| matches!(inst, Instruction::CmpNe { .. }))
        .expect("condition compare");
    assert!(store_pos < cmp_pos);
}

#[test]
fn repeated_constructs_get_unique_labels() {
    let func = lower(
        "f(a) { if (a) { } else { } if (a) { } else { } for (i = 0, 0, i = 1) { } for (j = 0, 0, j = 1) { } return a }",
    );
    assert_all_terminated(&func);

    let labels: Vec<_> = func.blocks.iter().map(|b| b.label.as_str()).collect();
    assert_eq!(
        labels,
        vec![
            "entry", "then", "else", "ifcont", "then1", "else1", "ifcont1", "loop", "afterloop",
            "loop1", "afterloop1",
        ]
    );

    let reachable = cfg::reachable_blocks(&func);
    assert!(reachable.iter().all(|r| *r));
}

#[test]
fn statements_after_if_continue_in_merge_block() {
    let func = lower("f(a) { if (a) { x = 1 } else { x = 2 } y = x + 1 return y }");
    let merge = func.block(block(&func, "ifcont"));
    assert!(merge
        .instructions
        .iter()
        .any(|inst| matches!(inst, Instruction::Binary { .. })));
    assert!(matches!(merge.terminator, Some(Terminator::Return(_))));
}

#[test]
fn dot_export_lists_every_block_and_edge() {
    let func = lower("f(a) { if (a) { x = 1 } else { x = 2 } return x }");
    let dot = cfg::to_dot(&func);

    assert!(dot.starts_with("digraph \"f\" {"));
    for id in func.block_ids() {
        assert!(dot.contains(&format!("bb{} [label=", id.0)));
    }
    assert!(dot.contains("bb0 -> bb1"));
    assert!(dot.contains("bb0 -> bb2"));
    assert!(dot.contains("bb1 -> bb3"));
    assert!(dot.contains("bb2 -> bb3"));
    assert!(dot.trim_end().ends_with('}'));
}
