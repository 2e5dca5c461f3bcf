//! Demo: cadena `A -> f -> B -> g -> C` con el tee activo.
//!
//! `RUST_LOG=debug cargo run --bin accel-demo` muestra la sustitución y los
//! guardados diferidos. Las variables `ACCEL_*` (o un .env) ajustan la
//! configuración.

use std::error::Error;

use accelerator::prelude::*;
use serde_json::json;

fn scale(inp: &[Data]) -> Result<Vec<Data>, NodeFnError> {
    let rows = inp[0].value().as_array().ok_or("expected array")?;
    let scaled = rows.iter()
                     .map(|r| json!({"id": r["id"], "x": r["x"].as_f64().unwrap_or(0.0) * 2.0}))
                     .collect::<Vec<_>>();
    Ok(vec![Data::new(json!(scaled))])
}

fn total(inp: &[Data]) -> Result<Vec<Data>, NodeFnError> {
    let rows = inp[0].value().as_array().ok_or("expected array")?;
    let sum: f64 = rows.iter().filter_map(|r| r["x"].as_f64()).sum();
    Ok(vec![Data::new(json!({"rows": rows.len(), "sum": sum}))])
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let config = AcceleratorConfig::from_env();
    println!("config: {:?}", config);

    let pipeline = Pipeline::new(vec![Node::new("scale", ["raw_points"], ["scaled_points"], scale),
                                      Node::new("total", ["scaled_points"], ["summary"], total)])?;

    let mut catalog = catalog_for(&config);
    let raw = json!([{"id": 1, "x": 1.5}, {"id": 2, "x": 4.0}, {"id": 3, "x": -0.5}]);
    catalog.add("raw_points", DatasetHandle::new(MemoryDataset::with_data(Data::new(raw))), false)?;
    let scaled = DatasetHandle::new(MemoryDataset::new());
    catalog.add("scaled_points", scaled.clone(), false)?;
    catalog.add("summary", DatasetHandle::new(MemoryDataset::new()), false)?;

    let mut runner = accelerated_runner(&config);
    let summary = runner.run(&pipeline, &mut catalog)?;

    println!("run_id: {}", summary.run_id);
    println!("trace: {}", runner.event_variants().unwrap_or_default().join(" "));
    println!("fingerprint: {}", summary.run_fingerprint);
    println!("scaled_points (durable): {}", scaled.load()?.value());
    println!("summary: {}", catalog.load("summary")?.value());
    Ok(())
}
