use glimmer_api_core::{DataModel, Value};
use glimmer_graph_core::{EvalContext, NodeRegistry, NodeScript, NodeScriptData};
use glimmer_test_fixtures::node_scripts;

fn load(name: &str) -> NodeScript {
    let data: NodeScriptData = node_scripts::load(name).expect("fixture parses");
    NodeScript::load(&data, &NodeRegistry::with_builtins()).expect("fixture loads")
}

fn volume(v: f32) -> DataModel {
    let mut data = DataModel::new();
    data.set_str("audio/volume", Value::Numeric(v))
        .expect("valid path");
    data
}

#[test]
fn volume_brightness_scales_and_clamps() {
    let mut script = load("volume-brightness");
    assert_eq!(script.len(), 7);

    let report = script.evaluate(&EvalContext::new(&volume(0.5)));
    assert!(report.is_clean(), "{:?}", report.faults);
    assert_eq!(script.result(), Value::Numeric(127.5));

    script.evaluate(&EvalContext::new(&volume(2.0)));
    assert_eq!(script.result(), Value::Numeric(255.0));
}

#[test]
fn is_loud_compares_against_threshold() {
    let mut script = load("is-loud");
    script.evaluate(&EvalContext::new(&volume(0.9)));
    assert_eq!(script.result(), Value::Bool(true));
    script.evaluate(&EvalContext::new(&volume(0.1)));
    assert_eq!(script.result(), Value::Bool(false));
}

#[test]
fn missing_data_is_reported_not_fatal() {
    let mut script = load("is-loud");
    let report = script.evaluate(&EvalContext::default());
    assert_eq!(report.faults.len(), 1);
    assert_eq!(report.faults[0].kind, "data-model");
    assert_eq!(report.evaluated, script.len());
    assert_eq!(script.result(), Value::Bool(false));
}

#[test]
fn saved_fixture_matches_loaded_structure() {
    let script = load("volume-brightness");
    let saved = script.save();
    let original: NodeScriptData = node_scripts::load("volume-brightness").unwrap();
    assert_eq!(saved.id, original.id);
    assert_eq!(saved.connections, original.connections);
    assert_eq!(saved.nodes.len(), original.nodes.len());
}
