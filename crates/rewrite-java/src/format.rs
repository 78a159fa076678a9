// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Indentation of moved and synthesized subtrees.

use std::sync::Arc;

use rewrite_core::text;

use crate::tree::*;
use crate::visitor::{visit, walk_block, JavaVisitor, VisitCtx};

/// Shift the indentation of every line in `tree` from `from` to `to`.
///
/// Only spaces that contain a line break change; the text before the first
/// break of each space is kept. Lines indented less than `from` are left
/// alone.
pub fn shift_indent(tree: &J, from: &str, to: &str) -> J {
    if from == to {
        return tree.clone();
    }
    visit(&mut Reindent { from, to }, tree, &mut VisitCtx::scratch())
}

/// Shift statements about to be moved into a block indented with `to`.
pub fn shift_statements(statements: &[Trailing<J>], from: &str, to: &str) -> Vec<Trailing<J>> {
    statements
        .iter()
        .map(|s| Trailing::new(shift_indent(&s.element, from, to), s.after.clone()))
        .collect()
}

struct Reindent<'a> {
    from: &'a str,
    to: &'a str,
}

impl Reindent<'_> {
    fn shift(&self, space: &Space) -> Space {
        if !space.has_newline() {
            return space.clone();
        }
        Space::format(&text::shift_indent(space.as_str(), self.from, self.to))
    }
}

impl JavaVisitor for Reindent<'_> {
    fn pre_visit(&mut self, tree: &J, _cx: &mut VisitCtx) -> J {
        tree.with_prefix(self.shift(tree.prefix()))
    }

    fn visit_block(&mut self, node: &Arc<Block>, cx: &mut VisitCtx) -> J {
        let node = walk_block(self, node, cx);
        let end = self.shift(&node.end);
        let statements: Vec<Trailing<J>> = node
            .statements
            .iter()
            .map(|s| Trailing::new(s.element.clone(), self.shift(&s.after)))
            .collect();
        let unchanged = end == node.end
            && statements
                .iter()
                .zip(&node.statements)
                .all(|(a, b)| a.after == b.after);
        if unchanged {
            return J::Block(node);
        }
        J::from(Block {
            end,
            statements,
            ..(*node).clone()
        })
    }
}
