//! Selection of sentence groups.
//!
//! A sentence group is a run of sibling statements the search may carve
//! extractions from: the statements of a block body, a complexity-carrying
//! branch body of a loop or conditional (extractable as a whole), or one
//! case segment of a switch.

use crate::core::{MethodModel, NodeId, SentenceGroup, StatementKind};

/// Collect every sentence group of the method, in pre-order.
pub fn collect_sentence_groups(model: &MethodModel) -> Vec<SentenceGroup> {
    let mut groups = Vec::new();
    visit(model, model.root(), &mut groups);
    log::debug!("collected {} sentence groups", groups.len());
    groups
}

fn visit(model: &MethodModel, id: NodeId, groups: &mut Vec<SentenceGroup>) {
    collect_from(model, id, groups);
    for &child in model.node(id).children() {
        visit(model, child, groups);
    }
}

fn collect_from(model: &MethodModel, id: NodeId, groups: &mut Vec<SentenceGroup>) {
    let node = model.node(id);
    match node.kind {
        // Every block body is a group of its own statements.
        StatementKind::Block => {
            groups.push(SentenceGroup::new(node.children().to_vec()));
        }
        // A branch body that contributed complexity is extractable as a
        // whole, on top of whatever group its own block yields.
        StatementKind::If | StatementKind::Loop => {
            for &body in node.children() {
                if model.annotation(body).accumulated > 0 {
                    groups.push(SentenceGroup::new(vec![body]));
                }
            }
        }
        // One group per non-empty case segment.
        StatementKind::Switch => {
            for &case in node.children() {
                let segment = model.node(case).children();
                if !segment.is_empty() {
                    groups.push(SentenceGroup::new(segment.to_vec()));
                }
            }
        }
        StatementKind::Case | StatementKind::Empty | StatementKind::Other => {}
    }
}
