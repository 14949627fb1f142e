//! Shared graph builders for the end-to-end tests.

use vgc_graph::{Graph, NodeId, Output, VALUE_INDEX};
use vgc_ir::{BinaryOp, DataCategory, NodeKind};

/// Adds an output terminal for `index` to the graph.
pub fn output_terminal(graph: &mut Graph, index: u32) -> NodeId {
    graph.add_node(NodeKind::Output {
        index,
        category: DataCategory::Float,
    })
}

/// A graph computing `Value = X * 2` and a custom float output
/// `Density = Y + 1`, with fully disjoint subgraphs per output.
pub fn value_and_density_graph() -> Graph {
    let mut graph = Graph::new("value_and_density");
    graph
        .custom_outputs
        .push(Output::new("Density", DataCategory::Float));
    graph.sanitize_outputs();

    let x = graph.add_node(NodeKind::X);
    let two = graph.add_node(NodeKind::Constant(2.0));
    let mul = graph.add_node(NodeKind::Binary(BinaryOp::Multiply));
    let value_out = output_terminal(&mut graph, VALUE_INDEX);
    graph.connect(x, 0, mul, 0).unwrap();
    graph.connect(two, 0, mul, 1).unwrap();
    graph.connect(mul, 0, value_out, 0).unwrap();

    let y = graph.add_node(NodeKind::Y);
    let one = graph.add_node(NodeKind::Constant(1.0));
    let add = graph.add_node(NodeKind::Binary(BinaryOp::Add));
    let density_out = output_terminal(&mut graph, 2);
    graph.connect(y, 0, add, 0).unwrap();
    graph.connect(one, 0, add, 1).unwrap();
    graph.connect(add, 0, density_out, 0).unwrap();

    graph
}
