use accel_core::event::RunEventKind;
use accel_core::{Data, DataCatalog, DatasetHandle, EventStore, InMemoryEventStore, MemoryDataset, Node, Pipeline,
                 SequentialRunner};
use serde_json::json;

fn double(inp: &[Data]) -> Result<Vec<Data>, accel_core::pipeline::NodeFnError> {
    let rows = inp[0].value().as_array().ok_or("expected array")?;
    let doubled: Vec<_> = rows.iter().filter_map(|v| v.as_i64()).map(|v| json!(v * 2)).collect();
    Ok(vec![Data::new(json!(doubled))])
}

#[test]
fn runner_with_custom_store_journals_every_node() {
    let pipeline = Pipeline::new(vec![Node::new("double", ["raw"], ["doubled"], double),
                                      Node::new("again", ["doubled"], ["quad"], double)]).unwrap();
    let mut catalog = DataCatalog::new();
    catalog.add("raw", DatasetHandle::new(MemoryDataset::with_data(Data::new(json!([1, 2, 3])))), false)
           .unwrap();

    let mut runner = SequentialRunner::builder_with_store(InMemoryEventStore::default()).build();
    let summary = runner.run(&pipeline, &mut catalog).unwrap();

    assert_eq!(catalog.load("quad").unwrap(), Data::new(json!([4, 8, 12])));
    let events = runner.event_store().list(summary.run_id);
    assert!(matches!(events[0].kind, RunEventKind::RunStarted { node_count: 2, .. }),
            "Debe existir RunStarted como primer evento");
    let finished: Vec<&str> = events.iter()
                                    .filter_map(|e| match &e.kind {
                                        RunEventKind::NodeFinished { node, .. } => Some(node.as_str()),
                                        _ => None,
                                    })
                                    .collect();
    assert_eq!(finished, vec!["double", "again"]);
    assert!(events.windows(2).all(|w| w[0].seq + 1 == w[1].seq));
}

#[test]
fn second_run_gets_new_journal() {
    let pipeline = Pipeline::new(vec![Node::new("double", ["raw"], ["out"], double)]).unwrap();
    let mut runner = SequentialRunner::new();
    let mut catalog = DataCatalog::new();
    catalog.add("raw", DatasetHandle::new(MemoryDataset::with_data(Data::new(json!([1])))), false)
           .unwrap();

    let first = runner.run(&pipeline, &mut catalog).unwrap();
    let second = runner.run(&pipeline, &mut catalog).unwrap();
    assert_ne!(first.run_id, second.run_id);
    assert_eq!(runner.last_run_id(), Some(second.run_id));
    assert_eq!(runner.event_store().list(first.run_id).len(), 4);
    assert_eq!(first.run_fingerprint, second.run_fingerprint);
}
