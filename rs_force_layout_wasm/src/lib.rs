// rs_force_layout_wasm/src/lib.rs
// Browser-facing wrapper around the layout engine. Nodes are addressed by label,
// coordinates handed in and out are in viewport space.

use js_sys::Array;
use rs_force_layout::models::{EdgeOptions, NodeOptions, Point};
use rs_force_layout::simulation::ForceLayout;
use rs_force_layout::utils::{LayoutConfig, LayoutError};
use wasm_bindgen::prelude::*;

fn to_js(error: LayoutError) -> JsValue {
    JsValue::from_str(&error.to_string())
}

#[wasm_bindgen]
pub struct WasmLayout {
    layout: ForceLayout,
}

#[wasm_bindgen]
impl WasmLayout {
    #[wasm_bindgen(constructor)]
    pub fn new(width: f64, height: f64, seed: Option<u64>) -> Result<WasmLayout, JsValue> {
        let mut config = LayoutConfig::default().with_viewport(width, height);
        // No OS entropy source on wasm32-unknown-unknown.
        config.seed = seed.or(Some(0));
        ForceLayout::new(config).map(|layout| WasmLayout { layout }).map_err(to_js)
    }

    /// Adds a node at a model-space position. Returns its index.
    #[wasm_bindgen]
    pub fn add_node(&mut self, label: &str, x: f64, y: f64, mass: f64) -> Result<usize, JsValue> {
        let options = NodeOptions::at(Point::new(x, y)).with_mass(mass);
        let id = self.layout.graph_mut().add_node_with(label, (), options).map_err(to_js)?;
        self.layout.refit();
        Ok(id.index())
    }

    #[wasm_bindgen]
    pub fn add_edge(
        &mut self,
        source: &str,
        target: &str,
        length: f64,
        stiffness: f64,
        directed: bool,
    ) -> Result<usize, JsValue> {
        let mut options = EdgeOptions::new(length, stiffness);
        options.directed = directed;
        self.layout
            .graph_mut()
            .connect(source, target, options, ())
            .map(|id| id.index())
            .map_err(to_js)
    }

    #[wasm_bindgen]
    pub fn remove_node(&mut self, label: &str) -> bool {
        let graph = self.layout.graph_mut();
        match graph.id_of(label) {
            Some(id) => graph.remove_node(id).is_some(),
            None => false,
        }
    }

    #[wasm_bindgen]
    pub fn start(&mut self) {
        self.layout.start();
    }

    #[wasm_bindgen]
    pub fn stop(&mut self) {
        self.layout.stop();
    }

    #[wasm_bindgen(getter)]
    pub fn running(&self) -> bool {
        self.layout.is_running()
    }

    /// Runs one tick and returns the mean energy.
    #[wasm_bindgen]
    pub fn advance(&mut self) -> f64 {
        let report = self.layout.advance();
        if report.exploded > 0 {
            web_sys::console::warn_1(&JsValue::from_str(&format!(
                "{} node(s) exploded at tick {}",
                report.exploded, report.tick
            )));
        }
        report.mean_energy
    }

    #[wasm_bindgen(getter)]
    pub fn max_energy(&self) -> f64 {
        self.layout.energy().max
    }

    #[wasm_bindgen(getter)]
    pub fn mean_energy(&self) -> f64 {
        self.layout.energy().mean
    }

    /// Flat `[x0, y0, x1, y1, ...]` in viewport space, in the same order as `labels`.
    #[wasm_bindgen]
    pub fn positions(&self) -> Vec<f64> {
        self.layout
            .positions()
            .flat_map(|(_, position)| {
                let view = self.layout.to_viewport(position);
                [view.x, view.y]
            })
            .collect()
    }

    #[wasm_bindgen]
    pub fn labels(&self) -> Array {
        self.layout
            .positions()
            .filter_map(|(id, _)| self.layout.graph().node(id))
            .map(|node| JsValue::from_str(node.label()))
            .collect()
    }

    /// Flat `[x1, y1, x2, y2, ...]` per drawable edge, in viewport space.
    #[wasm_bindgen]
    pub fn edge_segments(&self) -> Vec<f64> {
        self.layout
            .edge_segments()
            .flat_map(|(_, from, to)| {
                let from = self.layout.to_viewport(from);
                let to = self.layout.to_viewport(to);
                [from.x, from.y, to.x, to.y]
            })
            .collect()
    }

    /// Label of the node closest to a viewport point.
    #[wasm_bindgen]
    pub fn nearest(&self, x: f64, y: f64) -> Option<String> {
        let hit = self.layout.nearest(Point::new(x, y))?;
        self.layout.graph().node(hit.node).map(|node| node.label().to_string())
    }

    /// Pins a node under the pointer, given in viewport space.
    #[wasm_bindgen]
    pub fn drag_to(&mut self, label: &str, x: f64, y: f64) -> Result<(), JsValue> {
        let id = self
            .layout
            .graph()
            .id_of(label)
            .ok_or_else(|| JsValue::from_str(&format!("no node labelled '{}'", label)))?;
        let model = self.layout.to_model(Point::new(x, y));
        self.layout.drag_to(id, model).map_err(to_js)
    }

    /// Lets a dragged node move again.
    #[wasm_bindgen]
    pub fn release(&mut self, label: &str) -> Result<(), JsValue> {
        let id = self
            .layout
            .graph()
            .id_of(label)
            .ok_or_else(|| JsValue::from_str(&format!("no node labelled '{}'", label)))?;
        self.layout.unpin(id).map_err(to_js)
    }

    #[wasm_bindgen]
    pub fn set_viewport_size(&mut self, width: f64, height: f64) -> Result<(), JsValue> {
        self.layout.set_viewport_size(width, height).map_err(to_js)
    }
}
