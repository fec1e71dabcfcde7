use cobweb_core::branch::{self, Stability};
use cobweb_core::cobweb;
use cobweb_core::equation_engine::{Compiler, EquationMap};
use cobweb_core::flow;
use cobweb_core::orbit;
use cobweb_core::sweep::ParamSweep;
use cobweb_core::trace;
use serde_wasm_bindgen::{from_value, to_value};
use wasm_bindgen::prelude::*;

fn to_js_err(err: anyhow::Error) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn to_js_value<T: serde::Serialize>(value: &T) -> Result<JsValue, JsValue> {
    to_value(value).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// A compiled 1D map exposed to the front-end. The formula is written in
/// the state variable `x` and the sweep parameter `r`; additional named
/// constants are fixed at construction time.
#[wasm_bindgen]
pub struct WasmMap {
    map: EquationMap<f64>,
}

#[wasm_bindgen]
impl WasmMap {
    #[wasm_bindgen(constructor)]
    pub fn new(
        formula: &str,
        constant_names: Vec<String>,
        constant_values: Vec<f64>,
    ) -> Result<WasmMap, JsValue> {
        console_error_panic_hook::set_once();

        if constant_names.len() != constant_values.len() {
            return Err(JsValue::from_str(
                "Constant names and values must match in length.",
            ));
        }

        let mut compiler = Compiler::new("x", Some("r"));
        for (name, &value) in constant_names.iter().zip(constant_values.iter()) {
            compiler.define_constant(name, value);
        }

        let map = EquationMap::compile_with(&compiler, formula).map_err(to_js_err)?;
        Ok(WasmMap { map })
    }

    /// Samples an orbit diagram over `sweep_val` (`{ min, max, step }`).
    pub fn orbit_diagram(
        &self,
        x0: f64,
        skip: u32,
        iterations: u32,
        sweep_val: JsValue,
    ) -> Result<JsValue, JsValue> {
        let sweep: ParamSweep<f64> =
            from_value(sweep_val).map_err(|e| JsValue::from_str(&format!("Invalid sweep: {}", e)))?;
        let diagram = orbit::orbit_diagram(&self.map, x0, skip as usize, iterations as usize, sweep)
            .map_err(to_js_err)?;
        to_js_value(&diagram)
    }

    /// Post-transient states of a single orbit at parameter `r`.
    pub fn iteration_trace(&self, r: f64, x0: f64, skip: u32, iterations: u32) -> Vec<f64> {
        trace::iterate_map(&self.map, r, x0, skip as usize, iterations as usize).values
    }

    /// Cobweb plot data at parameter `r`, or null when `x0` is outside the
    /// open interval (the no-op signal).
    pub fn cobweb(
        &self,
        r: f64,
        x0: f64,
        x_min: f64,
        x_max: f64,
        iterations: u32,
        curve_points: u32,
    ) -> Result<JsValue, JsValue> {
        match cobweb::cobweb_diagram(
            &self.map.at(r),
            x0,
            x_min,
            x_max,
            iterations as usize,
            curve_points as usize,
        ) {
            Some(diagram) => to_js_value(&diagram),
            None => Ok(JsValue::NULL),
        }
    }

    /// Fixed-step RK4 trajectory of the flow dx/dt = f(r, x).
    pub fn flow_trace(
        &self,
        r: f64,
        x0: f64,
        t0: f64,
        dt: f64,
        steps: u32,
    ) -> Result<JsValue, JsValue> {
        let trace = flow::flow_trace(&self.map, r, x0, t0, dt, steps as usize).map_err(to_js_err)?;
        to_js_value(&trace)
    }
}

/// Samples a fixed-point branch x*(r), written as a formula in `r` alone,
/// tagged "stable" or "unstable". Any other tag yields null without
/// sampling.
#[wasm_bindgen]
pub fn branch_curve(formula: &str, stability: &str, sweep_val: JsValue) -> Result<JsValue, JsValue> {
    console_error_panic_hook::set_once();

    let tag = match stability {
        "stable" => Stability::Stable,
        "unstable" => Stability::Unstable,
        _ => return Ok(JsValue::NULL),
    };

    let sweep: ParamSweep<f64> =
        from_value(sweep_val).map_err(|e| JsValue::from_str(&format!("Invalid sweep: {}", e)))?;

    let compiler = Compiler::new("r", None);
    let map: EquationMap<f64> = EquationMap::compile_with(&compiler, formula).map_err(to_js_err)?;

    // The formula has no sweep-parameter slot, so the frozen value is
    // irrelevant; `at` only adapts the map to a one-argument view.
    let curve = branch::branch_curve(&map.at(0.0), tag, sweep).map_err(to_js_err)?;
    to_js_value(&curve)
}
