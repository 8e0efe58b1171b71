use criterion::{black_box, criterion_group, criterion_main, Criterion};
use glimmer_api_core::{DataModel, Value};
use glimmer_graph_core::nodes::{MathNode, MathOp, StaticValueNode};
use glimmer_graph_core::{EvalContext, NodeRegistry, NodeScript, NodeScriptData, PinType};
use glimmer_test_fixtures::node_scripts;

fn chain(len: usize) -> NodeScript {
    let mut script = NodeScript::new("chain", PinType::Numeric);
    let mut prev = script.add(|p| StaticValueNode::numeric(p, 1.0));
    for _ in 0..len {
        let one = script.add(|p| StaticValueNode::numeric(p, 1.0));
        let sum = script.add(|p| MathNode::new(p, MathOp::Sum));
        let a = script.input(sum, "a").unwrap();
        let b = script.input(sum, "b").unwrap();
        script.connect(script.output(prev, "output").unwrap(), a).unwrap();
        script.connect(script.output(one, "output").unwrap(), b).unwrap();
        prev = sum;
    }
    script
        .connect(script.output(prev, "output").unwrap(), script.exit_pin())
        .unwrap();
    script
}

fn bench_eval(c: &mut Criterion) {
    let mut script = chain(64);
    c.bench_function("script_eval_chain_64", |b| {
        b.iter(|| {
            script.evaluate(&EvalContext::default());
            black_box(script.result());
        })
    });

    let data: NodeScriptData = node_scripts::load("volume-brightness").expect("fixture");
    let mut fixture = NodeScript::load(&data, &NodeRegistry::with_builtins()).expect("load");
    let mut model = DataModel::new();
    model.set_str("audio/volume", Value::Numeric(0.4)).unwrap();
    c.bench_function("script_eval_volume_brightness", |b| {
        b.iter(|| {
            fixture.evaluate(&EvalContext::new(&model));
            black_box(fixture.result());
        })
    });
}

criterion_group!(benches, bench_eval);
criterion_main!(benches);
