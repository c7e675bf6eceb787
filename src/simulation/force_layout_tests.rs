use approx::{assert_abs_diff_eq, assert_relative_eq};

use crate::models::{EdgeOptions, Graph, NodeId, NodeOptions, Point};
use crate::simulation::{ForceLayout, RunState};
use crate::spatial::Bounds;
use crate::utils::{LayoutConfig, LayoutError};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Two nodes 200 apart joined by a spring of rest length 50.
fn stretched_pair(directed: bool) -> (ForceLayout, NodeId, NodeId) {
    let mut graph: Graph = Graph::new();
    let a = graph.add_node_with("A", (), NodeOptions::at(Point::new(0.0, 0.0))).unwrap();
    let b = graph.add_node_with("B", (), NodeOptions::at(Point::new(200.0, 0.0))).unwrap();
    let options = if directed {
        EdgeOptions::new(50.0, 500.0).directed()
    } else {
        EdgeOptions::new(50.0, 500.0)
    };
    graph.add_edge(a, b, options, ()).unwrap();
    let config = LayoutConfig::new(Some(2000.0), Some(0.1), None, None, None).with_seed(17);
    (ForceLayout::with_graph(graph, config).unwrap(), a, b)
}

fn distance(layout: &ForceLayout, a: NodeId, b: NodeId) -> f64 {
    let graph = layout.graph();
    graph.node(a).unwrap().position.distance_to(graph.node(b).unwrap().position)
}

#[test]
fn test_spring_pair_settles_at_rest_length() {
    init_logger();
    let (mut layout, a, b) = stretched_pair(false);
    layout.start();

    let mut energies = Vec::new();
    let mut last = None;
    for _ in 0..1_000 {
        let report = layout.advance();
        energies.push(report.mean_energy);
        last = Some(report);
        if !layout.is_running() {
            break;
        }
    }

    let last = last.unwrap();
    assert!(last.stopped, "layout never settled");
    assert_eq!(layout.state(), RunState::Stopped);
    assert!((distance(&layout, a, b) - 50.0).abs() < 1.0);

    // After a short transient the energy only goes down.
    for window in energies[5..].windows(2) {
        assert!(window[1] <= window[0] * (1.0 + 1e-9), "{} rose to {}", window[0], window[1]);
    }
    assert!(energies[energies.len() - 1] < 0.01);
}

#[test]
fn test_run_returns_tick_count() {
    let (mut layout, a, b) = stretched_pair(false);
    let ticks = layout.run(1_000);
    assert!(ticks > 1 && ticks < 1_000);
    assert_eq!(layout.tick_count(), ticks as u64);
    assert!((distance(&layout, a, b) - 50.0).abs() < 1.0);
}

#[test]
fn test_directed_flag_does_not_change_forces() {
    let (mut undirected, a, b) = stretched_pair(false);
    let (mut directed, _, _) = stretched_pair(true);
    for _ in 0..20 {
        undirected.advance();
        directed.advance();
    }
    assert_eq!(
        undirected.graph().node(a).unwrap().position,
        directed.graph().node(a).unwrap().position
    );
    assert_eq!(
        undirected.graph().node(b).unwrap().position,
        directed.graph().node(b).unwrap().position
    );
}

#[test]
fn test_spring_forces_are_equal_and_opposite() {
    let (mut layout, a, b) = stretched_pair(false);
    layout.advance();
    let graph = layout.graph();
    let fa = graph.node(a).unwrap().force;
    let fb = graph.node(b).unwrap().force;
    assert_relative_eq!(fa, -fb, max_relative = 1e-12);
    // Stretched: A is pulled towards B.
    assert!(fa.x > 0.0);
}

#[test]
fn test_pinned_node_never_moves() {
    let mut graph: Graph = Graph::new();
    let anchor = graph
        .add_node_with("anchor", (), NodeOptions::at(Point::new(3.0, -4.0)).pinned())
        .unwrap();
    let free = graph.add_node_with("free", (), NodeOptions::at(Point::new(100.0, 50.0))).unwrap();
    graph.add_edge(anchor, free, EdgeOptions::new(10.0, 800.0), ()).unwrap();
    let mut layout = ForceLayout::with_graph(graph, LayoutConfig::default().with_seed(3).with_auto_stop(false)).unwrap();

    for _ in 0..300 {
        layout.advance();
        assert_eq!(layout.graph().node(anchor).unwrap().position, Point::new(3.0, -4.0));
        assert_eq!(layout.graph().node(anchor).unwrap().velocity, Point::ZERO);
    }
    assert!(distance(&layout, anchor, free) < 20.0);
}

#[test]
fn test_pinned_force_is_left_alone() {
    let mut graph: Graph = Graph::new();
    let anchor = graph.add_node_with("anchor", (), NodeOptions::at(Point::new(0.0, 0.0))).unwrap();
    let free = graph.add_node_with("free", (), NodeOptions::at(Point::new(120.0, 0.0))).unwrap();
    graph.add_edge(anchor, free, EdgeOptions::new(10.0, 800.0), ()).unwrap();
    let mut layout = ForceLayout::with_graph(graph, LayoutConfig::default().with_seed(9).with_auto_stop(false)).unwrap();

    layout.advance();
    assert_ne!(layout.graph().node(anchor).unwrap().force, Point::ZERO);

    layout.pin(anchor).unwrap();
    assert_eq!(layout.graph().node(anchor).unwrap().force, Point::ZERO);
    for _ in 0..20 {
        layout.advance();
        assert_eq!(layout.graph().node(anchor).unwrap().force, Point::ZERO);
        assert_ne!(layout.graph().node(free).unwrap().force, Point::ZERO);
    }

    // Unpinned again, the anchor feels the spring like any other node.
    layout.unpin(anchor).unwrap();
    layout.advance();
    let anchor_force = layout.graph().node(anchor).unwrap().force;
    assert!(anchor_force.is_finite());
    assert_ne!(anchor_force, Point::ZERO);
}

#[test]
fn test_exploded_node_is_isolated() {
    init_logger();
    let mut graph: Graph = Graph::new();
    let a = graph.add_node_with("a", (), NodeOptions::at(Point::new(0.0, 0.0))).unwrap();
    let b = graph.add_node_with("b", (), NodeOptions::at(Point::new(10.0, 0.0))).unwrap();
    let bad = graph.add_node_with("bad", (), NodeOptions::at(Point::new(f64::NAN, 5.0))).unwrap();
    graph.add_edge(a, bad, EdgeOptions::default(), ()).unwrap();
    graph.add_edge(b, bad, EdgeOptions::default(), ()).unwrap();
    let mut layout = ForceLayout::with_graph(graph, LayoutConfig::default().with_seed(1)).unwrap();
    assert!(layout.bounds().contains(Point::new(10.0, 0.0)));

    let report = layout.advance();
    assert_eq!(report.exploded, 1);
    assert_eq!(report.integrated, 2);
    for id in [a, b] {
        let node = layout.graph().node(id).unwrap();
        assert!(node.position.is_finite());
        assert!(node.force.is_finite());
        assert!(node.velocity.is_finite());
    }
    assert!(report.mean_energy.is_finite());
    assert!(layout.bounds().top_left.is_finite());
    assert!(layout.positions().all(|(id, _)| id != bad));
    assert_eq!(layout.edge_segments().count(), 0);

    // Placing the node again brings it back.
    layout.set_position(bad, Point::new(5.0, 5.0)).unwrap();
    let report = layout.advance();
    assert_eq!(report.exploded, 0);
    assert_eq!(report.integrated, 3);
}

#[test]
fn test_node_exploding_mid_tick_does_not_poison_others() {
    init_logger();
    let mut graph: Graph = Graph::new();
    let a = graph.add_node_with("a", (), NodeOptions::at(Point::new(0.0, 0.0))).unwrap();
    let b = graph.add_node_with("b", (), NodeOptions::at(Point::new(20.0, 0.0))).unwrap();
    graph.add_edge(a, b, EdgeOptions::new(20.0, 1.0), ()).unwrap();
    graph.node_mut(a).unwrap().velocity = Point::new(f64::INFINITY, 0.0);
    let mut layout = ForceLayout::with_graph(graph, LayoutConfig::default().with_seed(1)).unwrap();

    let report = layout.advance();
    assert_eq!(report.exploded, 1);
    assert_eq!(report.integrated, 1);
    let blown = layout.graph().node(a).unwrap();
    assert!(!blown.position.is_finite());
    assert_eq!(blown.velocity, Point::ZERO);
    assert!(layout.graph().node(b).unwrap().position.is_finite());
    assert!(report.max_energy.is_finite());

    let report = layout.advance();
    assert_eq!(report.exploded, 1);
    assert!(layout.graph().node(b).unwrap().position.is_finite());
}

#[test]
fn test_single_isolated_node_auto_stops() {
    let mut graph: Graph = Graph::new();
    graph.add_node_with("alone", (), NodeOptions::at(Point::new(7.0, 7.0))).unwrap();
    let mut layout = ForceLayout::with_graph(graph, LayoutConfig::default()).unwrap();
    let ticks = layout.run(100);
    assert_eq!(ticks, 1);
    assert!(!layout.is_running());
    assert_eq!(layout.energy().mean, 0.0);
}

#[test]
fn test_auto_stop_disabled_spends_budget() {
    let mut graph: Graph = Graph::new();
    graph.add_node_with("alone", (), NodeOptions::at(Point::new(7.0, 7.0))).unwrap();
    let mut layout = ForceLayout::with_graph(graph, LayoutConfig::default().with_auto_stop(false)).unwrap();
    assert_eq!(layout.run(25), 25);
    assert!(layout.is_running());
}

#[test]
fn test_start_and_stop_are_idempotent() {
    let mut layout: ForceLayout = ForceLayout::new(LayoutConfig::default()).unwrap();
    assert_eq!(layout.state(), RunState::Stopped);
    layout.stop();
    assert_eq!(layout.state(), RunState::Stopped);
    layout.start();
    layout.start();
    assert!(layout.is_running());
    layout.stop();
    layout.stop();
    assert!(!layout.is_running());
}

#[test]
fn test_advance_while_stopped_does_not_report_stop() {
    let mut layout: ForceLayout = ForceLayout::new(LayoutConfig::default()).unwrap();
    let report = layout.advance();
    assert_eq!(report.tick, 1);
    assert_eq!(report.integrated, 0);
    assert_eq!(report.mean_energy, 0.0);
    assert!(!report.stopped);
}

#[test]
fn test_unplaced_nodes_are_ignored() {
    let mut graph: Graph = Graph::new();
    let placed = graph.add_node_with("placed", (), NodeOptions::at(Point::new(1.0, 1.0))).unwrap();
    let floating = graph.add_node("floating", ()).unwrap();
    graph.add_edge(placed, floating, EdgeOptions::default(), ()).unwrap();
    let mut layout = ForceLayout::with_graph(graph, LayoutConfig::default()).unwrap();

    let report = layout.advance();
    assert_eq!(report.integrated, 1);
    assert_eq!(report.exploded, 0);
    assert!(layout.graph().node(floating).unwrap().position.is_null());
    assert_eq!(layout.graph().node(placed).unwrap().position, Point::new(1.0, 1.0));
}

#[test]
fn test_coincident_endpoints_separate_deterministically() {
    let build = || {
        let mut graph: Graph = Graph::new();
        let a = graph.add_node_with("a", (), NodeOptions::at(Point::new(1.0, 1.0))).unwrap();
        let b = graph.add_node_with("b", (), NodeOptions::at(Point::new(1.0, 1.0))).unwrap();
        graph.add_edge(a, b, EdgeOptions::new(10.0, 100.0), ()).unwrap();
        ForceLayout::with_graph(graph, LayoutConfig::default().with_seed(99)).unwrap()
    };
    let mut first = build();
    let mut second = build();
    for _ in 0..3 {
        first.advance();
        second.advance();
    }

    let positions: Vec<_> = first.positions().collect();
    assert_eq!(positions.len(), 2);
    assert_ne!(positions[0].1, positions[1].1);
    assert_eq!(positions, second.positions().collect::<Vec<_>>());
}

#[test]
fn test_reseed_replays_jitter() {
    let build = || {
        let mut graph: Graph = Graph::new();
        for label in ["a", "b", "c"] {
            graph.add_node_with(label, (), NodeOptions::at(Point::new(2.0, 2.0))).unwrap();
        }
        ForceLayout::with_graph(graph, LayoutConfig::default()).unwrap()
    };
    let mut first = build();
    let mut second = build();
    first.reseed(5);
    second.reseed(5);
    first.advance();
    second.advance();
    assert_eq!(first.positions().collect::<Vec<_>>(), second.positions().collect::<Vec<_>>());
}

#[test]
fn test_default_bounds_without_placed_nodes() {
    let mut graph: Graph = Graph::new();
    graph.add_node("unplaced", ()).unwrap();
    let layout = ForceLayout::with_graph(graph, LayoutConfig::default()).unwrap();
    assert_eq!(layout.bounds(), Bounds::new(Point::new(-2.0, -2.0), Point::new(2.0, 2.0)));
    assert!(layout.nearest(Point::new(400.0, 300.0)).is_none());
}

#[test]
fn test_transform_round_trip_after_ticks() {
    let (mut layout, _, _) = stretched_pair(false);
    for _ in 0..10 {
        layout.advance();
    }
    let bounds = layout.bounds();
    for (id, position) in layout.positions().collect::<Vec<_>>() {
        assert!(bounds.contains(position), "{} escaped the box", id);
        let view = layout.to_viewport(position);
        assert_relative_eq!(layout.to_model(view), position, epsilon = 1e-9);
    }
    let corner = layout.to_viewport(bounds.bottom_right);
    assert_abs_diff_eq!(corner, Point::new(800.0, 600.0), epsilon = 1e-9);
}

#[test]
fn test_viewport_size_validation() {
    let (mut layout, _, _) = stretched_pair(false);
    let before = *layout.transform();
    assert_eq!(layout.set_viewport_size(0.0, 100.0), Err(LayoutError::InvalidViewport));
    assert_eq!(layout.set_viewport_size(100.0, f64::NAN), Err(LayoutError::InvalidViewport));
    assert_eq!(*layout.transform(), before);

    layout.set_viewport_size(400.0, 400.0).unwrap();
    assert_eq!(layout.transform().viewport_size(), (400.0, 400.0));
    assert_eq!(layout.config().viewport_width, 400.0);
    assert_abs_diff_eq!(layout.to_viewport(layout.bounds().bottom_right), Point::new(400.0, 400.0), epsilon = 1e-9);
}

#[test]
fn test_nearest_picks_closest_node() {
    let mut graph: Graph<&'static str> = Graph::new();
    let a = graph.add_node_with("a", "first", NodeOptions::at(Point::new(0.0, 0.0))).unwrap();
    let b = graph.add_node_with("b", "second", NodeOptions::at(Point::new(30.0, 40.0))).unwrap();
    graph.add_node("unplaced", "third").unwrap();
    let layout = ForceLayout::with_graph(graph, LayoutConfig::default()).unwrap();

    let hit = layout.nearest(layout.to_viewport(Point::new(1.0, 2.0))).unwrap();
    assert_eq!(hit.node, a);
    assert_relative_eq!(hit.distance, 5.0_f64.sqrt(), max_relative = 1e-9);

    let hit = layout.nearest(layout.to_viewport(Point::new(29.0, 39.0))).unwrap();
    assert_eq!(hit.node, b);
    assert_eq!(layout.graph().node(hit.node).unwrap().payload, "second");
}

#[test]
fn test_drag_pins_and_holds_position() {
    let (mut layout, a, b) = stretched_pair(false);
    layout.drag_to(a, Point::new(-30.0, 15.0)).unwrap();
    for _ in 0..5 {
        layout.advance();
    }
    let node = layout.graph().node(a).unwrap();
    assert!(node.pinned);
    assert_eq!(node.position, Point::new(-30.0, 15.0));

    layout.unpin(a).unwrap();
    layout.advance();
    assert_ne!(layout.graph().node(a).unwrap().position, Point::new(-30.0, 15.0));

    layout.pin(b).unwrap();
    assert!(layout.graph().node(b).unwrap().pinned);
    assert_eq!(layout.drag_to(NodeId(42), Point::ZERO), Err(LayoutError::UnknownNode(NodeId(42))));
    assert_eq!(layout.pin(NodeId(42)), Err(LayoutError::UnknownNode(NodeId(42))));
}

#[test]
fn test_removing_a_node_between_ticks() {
    let (mut layout, a, b) = stretched_pair(false);
    layout.advance();
    layout.graph_mut().remove_node(a);
    assert_eq!(layout.graph().edges_of(b).count(), 0);

    let report = layout.advance();
    assert_eq!(report.integrated, 1);
    assert_eq!(layout.edge_segments().count(), 0);
}

#[test]
fn test_invalid_config_rejected() {
    let config = LayoutConfig::new(None, None, Some(0.0), None, None);
    assert!(matches!(ForceLayout::<(), ()>::new(config), Err(LayoutError::InvalidConfig(_))));

    let mut layout: ForceLayout = ForceLayout::new(LayoutConfig::default()).unwrap();
    assert!(layout.set_config(LayoutConfig::default().with_viewport(-1.0, 5.0)).is_err());
    assert_eq!(*layout.config(), LayoutConfig::default());
}
