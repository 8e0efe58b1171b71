use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use glimmer_animation_core::{
    BindingContext, BindingSource, DataBinding, Easing, Keyframe, LayerProperty, Modifier,
    ModifierKind, NoScripts,
};
use glimmer_api_core::{DataModel, DataPath, Rgba, Value};

fn color_property(keyframes: usize) -> LayerProperty<Rgba> {
    let mut p = LayerProperty::new(Rgba::BLACK);
    for i in 0..keyframes {
        let c = (i * 37 % 256) as u8;
        p.add_keyframe(Keyframe::new(
            Duration::from_millis(i as u64 * 100),
            Rgba::opaque(c, 255 - c, c / 2),
            Easing::CubicInOut,
        ))
        .unwrap();
    }
    p.set_keyframes_enabled(true).unwrap();
    p
}

fn bench_update(c: &mut Criterion) {
    let mut plain = color_property(64);
    let ctx = BindingContext::default();
    c.bench_function("property_update_keyframes_64", |b| {
        let mut t = 0u64;
        b.iter(|| {
            t = (t + 16) % 6400;
            plain.update(Duration::from_millis(t), Duration::from_millis(16), &ctx);
            black_box(plain.current());
        })
    });

    let mut bound = color_property(64);
    bound
        .set_binding(DataBinding::direct(
            "alpha",
            BindingSource::Path(DataPath::parse("audio/volume").unwrap()),
            vec![
                Modifier::fixed(ModifierKind::Multiply, 255.0),
                Modifier::fixed(ModifierKind::Max, 32.0),
            ],
        ))
        .unwrap();
    let mut model = DataModel::new();
    model.set_str("audio/volume", Value::Numeric(0.6)).unwrap();
    let ctx = BindingContext::new(&model, &NoScripts);
    c.bench_function("property_update_keyframes_binding", |b| {
        let mut t = 0u64;
        b.iter(|| {
            t = (t + 16) % 6400;
            bound.update(Duration::from_millis(t), Duration::from_millis(16), &ctx);
            black_box(bound.current());
        })
    });
}

criterion_group!(benches, bench_update);
criterion_main!(benches);
