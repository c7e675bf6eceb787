use crate::models::{EdgeOptions, Graph, NodeId, NodeOptions, Point};
use crate::utils::LayoutError;

fn triangle() -> (Graph<u32, &'static str>, NodeId, NodeId, NodeId) {
    let mut graph = Graph::new();
    let a = graph.add_node("a", 1).unwrap();
    let b = graph.add_node("b", 2).unwrap();
    let c = graph.add_node("c", 3).unwrap();
    graph.add_edge(a, b, EdgeOptions::default(), "ab").unwrap();
    graph.add_edge(b, c, EdgeOptions::default(), "bc").unwrap();
    graph.add_edge(c, a, EdgeOptions::default().directed(), "ca").unwrap();
    (graph, a, b, c)
}

#[test]
fn test_new_node_defaults() {
    let mut graph: Graph = Graph::new();
    let id = graph.add_node("solo", ()).unwrap();
    let node = graph.node(id).unwrap();
    assert_eq!(node.label(), "solo");
    assert_eq!(node.mass(), 1.0);
    assert!(!node.pinned);
    assert!(node.position.is_null());
    assert!(!node.is_placed());
    assert_eq!(node.velocity, Point::ZERO);
    assert_eq!(node.force, Point::ZERO);
}

#[test]
fn test_duplicate_label_rejected() {
    let mut graph: Graph = Graph::new();
    graph.add_node("x", ()).unwrap();
    assert_eq!(graph.add_node("x", ()), Err(LayoutError::DuplicateLabel("x".to_string())));
    assert_eq!(graph.node_count(), 1);
}

#[test]
fn test_invalid_mass_rejected() {
    let mut graph: Graph = Graph::new();
    for mass in [0.0, -2.0, f64::NAN, f64::INFINITY] {
        let result = graph.add_node_with("m", (), NodeOptions::default().with_mass(mass));
        assert_eq!(result, Err(LayoutError::InvalidMass));
    }
    let id = graph.add_node("ok", ()).unwrap();
    assert_eq!(graph.set_mass(id, 0.0), Err(LayoutError::InvalidMass));
    assert!(graph.set_mass(id, 2.5).is_ok());
    assert_eq!(graph.node(id).unwrap().mass(), 2.5);
}

#[test]
fn test_node_options_apply() {
    let mut graph: Graph = Graph::new();
    let id = graph
        .add_node_with("p", (), NodeOptions::at(Point::new(1.0, 2.0)).pinned())
        .unwrap();
    let node = graph.node(id).unwrap();
    assert!(node.pinned);
    assert_eq!(node.position, Point::new(1.0, 2.0));
    assert!(node.is_active());
}

#[test]
fn test_self_loop_rejected() {
    let (mut graph, a, _, _) = triangle();
    let result = graph.add_edge(a, a, EdgeOptions::default(), "aa");
    assert!(matches!(result, Err(LayoutError::InvalidEdge(_))));
    assert_eq!(graph.edge_count(), 3);
}

#[test]
fn test_missing_endpoint_rejected() {
    let (mut graph, a, _, _) = triangle();
    let ghost = NodeId(42);
    assert!(matches!(graph.add_edge(a, ghost, EdgeOptions::default(), "x"), Err(LayoutError::InvalidEdge(_))));
    assert!(matches!(graph.add_edge(ghost, a, EdgeOptions::default(), "x"), Err(LayoutError::InvalidEdge(_))));
    assert!(matches!(graph.connect("a", "nope", EdgeOptions::default(), "x"), Err(LayoutError::InvalidEdge(_))));
}

#[test]
fn test_bad_spring_parameters_rejected() {
    let (mut graph, a, b, _) = triangle();
    assert_eq!(graph.add_edge(a, b, EdgeOptions::new(0.0, 1.0), "x"), Err(LayoutError::InvalidLength));
    assert_eq!(graph.add_edge(a, b, EdgeOptions::new(5.0, -1.0), "x"), Err(LayoutError::InvalidStiffness));
    assert!(graph.add_edge(a, b, EdgeOptions::new(5.0, 0.0), "x").is_ok());
}

#[test]
fn test_remove_node_removes_its_edges() {
    let (mut graph, a, b, c) = triangle();
    let removed = graph.remove_node(a).unwrap();
    assert_eq!(removed.payload, 1);

    assert_eq!(graph.node_count(), 2);
    assert_eq!(graph.edge_count(), 1);
    assert!(graph.node_by_label("a").is_none());
    assert_eq!(graph.edges_of(a).count(), 0);
    assert!(graph.edges().all(|(_, edge)| !edge.touches(a)));

    // Surviving ids still resolve.
    assert_eq!(graph.node(b).unwrap().label(), "b");
    assert_eq!(graph.node(c).unwrap().payload, 3);

    // The label can be reused once freed.
    assert!(graph.add_node("a", 9).is_ok());
}

#[test]
fn test_remove_unknown_is_none() {
    let (mut graph, a, _, _) = triangle();
    graph.remove_node(a);
    assert!(graph.remove_node(a).is_none());
    assert!(graph.remove_edge(crate::models::EdgeId(77)).is_none());
}

#[test]
fn test_remove_edge_keeps_nodes() {
    let (mut graph, a, b, _) = triangle();
    let (ab, _) = graph.edges_of(a).find(|(_, e)| e.target() == b).unwrap();
    let edge = graph.remove_edge(ab).unwrap();
    assert_eq!(edge.payload, "ab");
    assert_eq!(graph.edge_count(), 2);
    assert_eq!(graph.node_count(), 3);
}

#[test]
fn test_set_spring_and_position() {
    let (mut graph, a, _, _) = triangle();
    let (ab, _) = graph.edges().next().unwrap();
    graph.set_spring(ab, 12.0, 3.0).unwrap();
    assert_eq!(graph.edge(ab).unwrap().length(), 12.0);
    assert_eq!(graph.edge(ab).unwrap().stiffness(), 3.0);
    assert_eq!(graph.set_spring(ab, -1.0, 3.0), Err(LayoutError::InvalidLength));

    graph.node_mut(a).unwrap().velocity = Point::new(5.0, 5.0);
    graph.set_position(a, Point::new(3.0, 4.0)).unwrap();
    assert_eq!(graph.node(a).unwrap().position, Point::new(3.0, 4.0));
    assert_eq!(graph.node(a).unwrap().velocity, Point::ZERO);
    assert_eq!(graph.set_position(NodeId(99), Point::ZERO), Err(LayoutError::UnknownNode(NodeId(99))));
}

#[test]
fn test_iteration_order_and_clear() {
    let (mut graph, _, _, _) = triangle();
    let labels: Vec<&str> = graph.nodes().map(|(_, n)| n.label()).collect();
    assert_eq!(labels, vec!["a", "b", "c"]);
    let directed: Vec<bool> = graph.edges().map(|(_, e)| e.directed).collect();
    assert_eq!(directed, vec![false, false, true]);

    graph.clear();
    assert!(graph.is_empty());
    assert_eq!(graph.edge_count(), 0);
    assert!(graph.id_of("a").is_none());
}
