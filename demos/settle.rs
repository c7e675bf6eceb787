// demos/settle.rs
// Lays out a small ring-with-spokes graph and prints where everything ends up.
// Run with RUST_LOG=debug to watch the engine start and stop.

use log::info;
use rs_force_layout::models::{EdgeOptions, Graph, NodeOptions, Point};
use rs_force_layout::simulation::ForceLayout;
use rs_force_layout::utils::{LayoutConfig, LayoutError};

fn main() -> Result<(), LayoutError> {
    env_logger::init();

    let mut graph: Graph<u32> = Graph::new();
    let hub = graph.add_node_with("hub", 0, NodeOptions::at(Point::ZERO).with_mass(4.0))?;

    let ring = 8;
    let mut previous = None;
    let mut first = None;
    for i in 0..ring {
        // Start everyone crowded near the hub so the layout has work to do.
        let angle = i as f64 / ring as f64 * std::f64::consts::TAU;
        let start = Point::new(angle.cos(), angle.sin()) * 5.0;
        let id = graph.add_node_with(format!("n{}", i), i + 1, NodeOptions::at(start))?;
        graph.add_edge(hub, id, EdgeOptions::new(120.0, 50.0), ())?;
        if let Some(prev) = previous {
            graph.add_edge(prev, id, EdgeOptions::new(90.0, 50.0), ())?;
        }
        first.get_or_insert(id);
        previous = Some(id);
    }
    if let (Some(first), Some(last)) = (first, previous) {
        graph.add_edge(last, first, EdgeOptions::new(90.0, 50.0).directed(), ())?;
    }

    let config = LayoutConfig::new(Some(5000.0), Some(0.4), None, None, None).with_seed(2024);
    let mut layout = ForceLayout::with_graph(graph, config)?;
    let ticks = layout.run(5_000);
    let energy = layout.energy();
    info!("settled after {} ticks (mean energy {:.5})", ticks, energy.mean);

    println!("Settled after {} ticks, running: {}", ticks, layout.is_running());
    for (id, position) in layout.positions() {
        let node = layout.graph().node(id).map(|n| n.label()).unwrap_or("?");
        let view = layout.to_viewport(position);
        println!("{:>4}: model {}  viewport ({:.1}, {:.1})", node, position, view.x, view.y);
    }

    let center = layout.to_viewport(Point::ZERO);
    if let Some(hit) = layout.nearest(center) {
        println!("Closest to the origin: {} at distance {:.2}", hit.node, hit.distance);
    }
    Ok(())
}
