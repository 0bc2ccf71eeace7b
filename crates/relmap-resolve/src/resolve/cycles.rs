//! Cycle detection over inclusion graphs.
//!
//! One depth-first detector, parameterized by a neighbor function, serves
//! both the store graph and the mapping graph. Standard white/gray/black
//! coloring: hitting a gray node means the cycle is the suffix of the
//! current DFS stack from that node, plus the closing edge back into it.
//!
//! Determinism: start nodes are visited in registry order and outgoing
//! edges in declaration order, so when several cycles are reachable the
//! reported one is the first found by that fixed order. Tests depend on
//! the exact path, not on "any rotation of the cycle".

use relmap_ast::foundation::Span;
use relmap_ast::QualifiedName;

/// A detected cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleReport {
    /// The nodes on the cycle, starting at the entry node; the final edge
    /// leads from the last node back to the first.
    pub nodes: Vec<usize>,
    /// Span of the include declaration that closes the cycle.
    pub closing_span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Color {
    White,
    Gray,
    Black,
}

/// Find the first cycle in a graph of `node_count` nodes.
///
/// `neighbors(node)` yields `(target, edge span)` pairs in declaration
/// order. Returns None when the graph is acyclic.
pub fn find_cycle<F>(node_count: usize, neighbors: F) -> Option<CycleReport>
where
    F: Fn(usize) -> Vec<(usize, Span)>,
{
    let mut colors = vec![Color::White; node_count];
    let mut stack = Vec::new();

    for start in 0..node_count {
        if colors[start] == Color::White {
            if let Some(report) = visit(start, &neighbors, &mut colors, &mut stack) {
                return Some(report);
            }
        }
    }
    None
}

fn visit<F>(
    node: usize,
    neighbors: &F,
    colors: &mut [Color],
    stack: &mut Vec<usize>,
) -> Option<CycleReport>
where
    F: Fn(usize) -> Vec<(usize, Span)>,
{
    colors[node] = Color::Gray;
    stack.push(node);

    for (target, span) in neighbors(node) {
        match colors[target] {
            Color::Gray => {
                // target is an ancestor on the current DFS stack; the cycle
                // is the stack suffix from its position.
                let position = stack.iter().position(|&n| n == target).unwrap_or(0);
                let report = CycleReport {
                    nodes: stack[position..].to_vec(),
                    closing_span: span,
                };
                stack.pop();
                colors[node] = Color::Black;
                return Some(report);
            }
            Color::White => {
                if let Some(report) = visit(target, neighbors, colors, stack) {
                    stack.pop();
                    colors[node] = Color::Black;
                    return Some(report);
                }
            }
            Color::Black => {}
        }
    }

    stack.pop();
    colors[node] = Color::Black;
    None
}

/// Format a cycle as `"<start>: <start> -> n1 -> ... -> <start>"`.
pub fn format_cycle(report: &CycleReport, name_of: impl Fn(usize) -> QualifiedName) -> String {
    let mut names: Vec<String> = report.nodes.iter().map(|&n| name_of(n).to_string()).collect();
    names.push(name_of(report.nodes[0]).to_string());
    format!("{}: {}", names[0], names.join(" -> "))
}
