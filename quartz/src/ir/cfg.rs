//! Control-flow graph queries and Graphviz export.

use std::fmt::Write;

use super::printer::{format_instruction, format_terminator};
use super::*;

/// Blocks reachable in one step from `block`, in branch order.
pub fn successors(func: &Function, block: BlockId) -> Vec<BlockId> {
    func.block(block)
        .terminator
        .as_ref()
        .map(Terminator::successors)
        .unwrap_or_default()
}

/// Predecessor lists indexed by block. A block that branches to the same
/// target on both arms is listed once.
pub fn predecessors(func: &Function) -> Vec<Vec<BlockId>> {
    let mut preds = vec![Vec::new(); func.blocks.len()];
    for block in func.block_ids() {
        for succ in successors(func, block) {
            if let Some(list) = preds.get_mut(succ.0) {
                if !list.contains(&block) {
                    list.push(block);
                }
            }
        }
    }
    preds
}

/// Reachability from the entry block, indexed by block.
pub fn reachable_blocks(func: &Function) -> Vec<bool> {
    let mut seen = vec![false; func.blocks.len()];
    if func.blocks.is_empty() {
        return seen;
    }

    let mut stack = vec![Function::ENTRY];
    while let Some(block) = stack.pop() {
        if seen[block.0] {
            continue;
        }
        seen[block.0] = true;
        for succ in successors(func, block) {
            if succ.0 < seen.len() && !seen[succ.0] {
                stack.push(succ);
            }
        }
    }
    seen
}

/// Render the function's CFG as a Graphviz digraph.
pub fn to_dot(func: &Function) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = writeln!(out, "digraph \"{}\" {{", func.name);
    let _ = writeln!(out, "  node [shape=box, fontname=\"monospace\"];");

    for id in func.block_ids() {
        let block = func.block(id);
        let mut label = format!("{}:\\l", block.label);
        for inst in &block.instructions {
            label.push_str(&escape(&format_instruction(func, inst)));
            label.push_str("\\l");
        }
        if let Some(term) = &block.terminator {
            label.push_str(&escape(&format_terminator(func, term)));
            label.push_str("\\l");
        }
        let _ = writeln!(out, "  bb{} [label=\"{}\"];", id.0, label);
    }

    for id in func.block_ids() {
        let edges = successors(func, id);
        let conditional = edges.len() == 2;
        for (i, succ) in edges.iter().enumerate() {
            let attr = match (conditional, i) {
                (true, 0) => " [label=\"T\"]",
                (true, _) => " [label=\"F\"]",
                _ => "",
            };
            let _ = writeln!(out, "  bb{} -> bb{}{};", id.0, succ.0, attr);
        }
    }

    out.push_str("}\n");
    out
}

fn escape(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}
