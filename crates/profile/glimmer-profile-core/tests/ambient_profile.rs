use std::sync::{Arc, RwLock};
use std::time::Duration;

use glimmer_animation_core::PropertyData;
use glimmer_api_core::{DataModel, DataPath, Rect, Rgba, Value, Vec2};
use glimmer_graph_core::{NodeRegistry, ScriptId};
use glimmer_profile_core::{
    BrushRegistry, EffectRegistry, ElementDescriptor, EventOverlap, EventTrigger, Profile,
    ProfileDescriptor, ProfileError, ProfileRenderer,
};
use glimmer_surface_core::{
    Canvas, Device, SoftwareCanvas, SoftwareContext, SurfaceManager, SurfaceSettings,
};
use glimmer_test_fixtures::profiles;

fn descriptor() -> ProfileDescriptor {
    profiles::load("ambient").expect("ambient fixture parses")
}

fn load(data: &ProfileDescriptor) -> Result<Profile, ProfileError> {
    Profile::load(
        data,
        &NodeRegistry::with_builtins(),
        Arc::new(BrushRegistry::with_builtins()),
        &EffectRegistry::with_builtins(),
    )
}

fn volume(v: f32) -> DataModel {
    let mut data = DataModel::new();
    data.set_str("audio/volume", Value::Numeric(v))
        .expect("valid path");
    data
}

fn frame(profile: &mut Profile, delta: Duration, data: &DataModel) -> SoftwareCanvas {
    profile.update(delta, data);
    let mut canvas = SoftwareCanvas::new(100, 10);
    canvas.clear(Rgba::BLACK);
    profile.render(&mut canvas);
    canvas
}

#[test]
fn ambient_profile_loads_its_tree() {
    let profile = load(&descriptor()).expect("fixture loads");
    assert_eq!(profile.name(), "Ambient");
    assert_eq!(profile.scripts().len(), 2);
    let names: Vec<&str> = profile.elements().iter().map(|e| e.name()).collect();
    assert_eq!(names, ["Flash", "Pulse", "Background"]);
    assert!(profile.layer("Glow").is_some(), "nested layer is reachable");
}

#[test]
fn quiet_audio_shows_pulse_over_the_gradient() {
    let mut profile = load(&descriptor()).expect("fixture loads");
    let canvas = frame(&mut profile, Duration::from_millis(16), &volume(0.5));

    assert_eq!(canvas.pixel(10, 5), Some(Rgba::opaque(0, 128, 255)));
    let right = canvas.pixel(99, 5).expect("in bounds");
    assert_eq!(right.g, 0);
    assert!(right.b > right.r, "gradient runs red to blue: {right:?}");
    assert!(!profile.layer("Flash").expect("flash").display().is_displayed());
}

#[test]
fn loud_audio_restarts_the_flash() {
    let mut profile = load(&descriptor()).expect("fixture loads");
    frame(&mut profile, Duration::from_millis(16), &volume(0.1));
    let canvas = frame(&mut profile, Duration::from_millis(16), &volume(0.9));

    let flash = profile.layer("Flash").expect("flash");
    assert_eq!(flash.display().timeline().position(), Duration::from_millis(16));
    assert_eq!(canvas.pixel(10, 5), Some(Rgba::WHITE));
    assert_eq!(canvas.pixel(99, 5), Some(Rgba::WHITE));
}

#[test]
fn pulse_width_follows_its_keyframes() {
    let mut profile = load(&descriptor()).expect("fixture loads");
    let data = volume(0.0);
    profile.update(Duration::from_secs(1), &data);
    let pulse = profile.layer("Pulse").expect("pulse");
    assert_eq!(*pulse.properties().size.current(), Vec2::new(75.0, 10.0));
    assert_eq!(pulse.properties().color.current().g, 0);
}

#[test]
fn saved_profile_loads_back_identically() {
    let profile = load(&descriptor()).expect("fixture loads");
    let saved = profile.save();
    assert_eq!(saved.id, descriptor().id);

    let reloaded = load(&saved).expect("saved descriptor loads");
    assert_eq!(reloaded.save(), saved);
}

#[test]
fn unknown_script_references_reject_the_profile() {
    let mut data = descriptor();
    let missing = ScriptId::new();
    if let ElementDescriptor::Layer(flash) = &mut data.elements[0] {
        flash.display.condition = Some(missing);
    }
    let err = load(&data).err().expect("must fail");
    assert_eq!(
        err,
        ProfileError::UnknownScript {
            element: "Flash".into(),
            script: missing,
        }
    );
}

#[test]
fn capability_violations_reject_the_profile() {
    let mut data = descriptor();
    if let ElementDescriptor::Layer(pulse) = &mut data.elements[1] {
        let brush = pulse
            .properties
            .entry("brush".into())
            .or_insert_with(|| PropertyData::new(Value::text("glimmer:solid")));
        brush.keyframes_enabled = true;
    }
    let err = load(&data).err().expect("must fail");
    assert!(
        matches!(err, ProfileError::Property { ref property, .. } if property == "brush"),
        "{err}"
    );

    let mut data = descriptor();
    if let ElementDescriptor::Layer(pulse) = &mut data.elements[1] {
        pulse.properties.insert(
            "brush".into(),
            PropertyData::new(Value::text("acme:plasma")),
        );
    }
    assert!(matches!(
        load(&data).err().expect("must fail"),
        ProfileError::UnknownBrush { .. }
    ));
}

#[test]
fn resumed_effects_dim_the_layer() {
    let mut profile = load(&descriptor()).expect("fixture loads");
    let glow = profile.layer("Glow").expect("glow");
    assert_eq!(glow.effects().len(), 1);
    assert!(glow.effect("Dimmer").expect("dimmer").suspended);

    let before = frame(&mut profile, Duration::from_millis(16), &volume(0.5))
        .pixel(99, 5)
        .expect("in bounds");
    profile
        .layer_mut("Glow")
        .and_then(|glow| glow.effect_mut("Dimmer"))
        .expect("dimmer")
        .suspended = false;
    let after = frame(&mut profile, Duration::from_millis(16), &volume(0.5))
        .pixel(99, 5)
        .expect("in bounds");

    assert_eq!(after.b, (before.b as f32 * 0.4).round() as u8);
    assert_eq!(after.r, (before.r as f32 * 0.4).round() as u8);
}

#[test]
fn unknown_effects_reject_the_profile() {
    let mut data = descriptor();
    if let ElementDescriptor::Folder(background) = &mut data.elements[2] {
        if let ElementDescriptor::Layer(glow) = &mut background.children[0] {
            glow.effects[0].effect = "acme:blur".into();
        }
    }
    assert_eq!(
        load(&data).err().expect("must fail"),
        ProfileError::UnknownEffect {
            element: "Glow".into(),
            effect: "acme:blur".into(),
        }
    );
}

#[test]
fn hits_flash_once_per_event_with_copies() {
    let mut data = descriptor();
    if let ElementDescriptor::Layer(flash) = &mut data.elements[0] {
        flash.display.condition = None;
        flash.display.event = Some(EventTrigger {
            path: DataPath::parse("game/hits").expect("valid path"),
            overlap: EventOverlap::Copy,
        });
    }
    let mut profile = load(&data).expect("event profile loads");
    let hits = |n: f32| {
        let mut data = volume(0.5);
        data.set_str("game/hits", Value::Numeric(n))
            .expect("valid path");
        data
    };
    let pulse = Some(Rgba::opaque(0, 128, 255));

    let canvas = frame(&mut profile, Duration::from_millis(16), &hits(0.0));
    assert_eq!(canvas.pixel(10, 5), pulse, "hidden until the first hit");
    let canvas = frame(&mut profile, Duration::from_millis(16), &hits(1.0));
    assert_eq!(canvas.pixel(10, 5), Some(Rgba::WHITE));

    frame(&mut profile, Duration::from_millis(16), &hits(2.0));
    assert_eq!(profile.layer("Flash").expect("flash").copies().len(), 1);

    let canvas = frame(&mut profile, Duration::from_millis(980), &hits(2.0));
    let flash = profile.layer("Flash").expect("flash");
    assert!(flash.display().timeline().is_finished());
    assert_eq!(canvas.pixel(10, 5), Some(Rgba::WHITE), "the copy still plays");

    let canvas = frame(&mut profile, Duration::from_millis(16), &hits(2.0));
    assert!(profile.layer("Flash").expect("flash").copies().is_empty());
    assert_eq!(canvas.pixel(10, 5), pulse);
}

#[test]
fn render_loop_maps_profile_onto_leds() {
    let data = Arc::new(RwLock::new(volume(0.5)));
    let mut renderer = ProfileRenderer::new(Arc::clone(&data));
    renderer.add_profile(load(&descriptor()).expect("fixture loads"));

    let manager = SurfaceManager::new(
        renderer,
        Arc::new(SoftwareContext),
        SurfaceSettings {
            target_frame_rate: 30,
            render_scale: 1.0,
        },
    )
    .expect("valid settings");
    manager.add_devices([Device::new("strip", "Strip")
        .with_led("left", Rect::new(0.0, 0.0, 10.0, 10.0))
        .with_led("right", Rect::new(90.0, 0.0, 10.0, 10.0))]);

    manager.tick_now(Duration::from_millis(16));
    let left = manager.with_texture(|t| t.and_then(|t| t.pixel(5, 5)));
    assert_eq!(left, Some(Rgba::opaque(0, 128, 255)));

    data.write().unwrap().set_str("audio/volume", Value::Numeric(1.0)).unwrap();
    manager.tick_now(Duration::from_millis(16));
    let left = manager.with_texture(|t| t.and_then(|t| t.pixel(5, 5)));
    assert_eq!(left, Some(Rgba::WHITE), "flash covers everything while loud");
    assert_eq!(manager.stats().frames, 2);
}
