use glimmer_api_core::coercion::{to_bool, to_color, try_float};
use glimmer_api_core::{DataModel, DataPath, Rgba, Value, ValueSource, Vec2};

#[test]
fn values_use_type_and_data_tags() {
    let color: Value =
        serde_json::from_str(r#"{"type":"Color","data":{"r":0,"g":0,"b":255,"a":255}}"#)
            .expect("colour parses");
    assert_eq!(color, Value::Color(Rgba::opaque(0, 0, 255)));

    let vector: Value = serde_json::from_str(r#"{"type":"Vector","data":{"x":100.0,"y":10}}"#)
        .expect("vector parses");
    assert_eq!(vector, Value::Vector(Vec2::new(100.0, 10.0)));

    let text = serde_json::to_value(Value::text("glimmer:solid")).expect("serializes");
    assert_eq!(text, serde_json::json!({"type": "Text", "data": "glimmer:solid"}));

    let empty: Value = serde_json::from_str(r#"{"type":"Empty"}"#).expect("unit variant");
    assert!(empty.is_empty());
}

#[test]
fn data_model_feeds_coercions() {
    let mut data = DataModel::new();
    data.set_str("audio/volume", Value::text(" 0.25 "))
        .expect("valid path");
    data.set_str("game/alive", Value::Bool(true))
        .expect("valid path");

    let volume = data
        .value(&DataPath::parse("audio/volume").expect("valid path"))
        .expect("present");
    assert_eq!(try_float(&volume), Some(0.25));

    let alive = data.get_str("game/alive").expect("present");
    assert!(to_bool(alive));
    assert_eq!(to_color(alive), Rgba::WHITE);
    assert!(data.get_str("game/missing").is_none());
}
