use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use anyhow::anyhow;
use crossbeam_channel::{bounded, Receiver, Sender};
use glimmer_api_core::{Rect, Rgba};
use glimmer_surface_core::{
    Canvas, Device, DeviceId, DeviceOutput, LedColor, Renderer, SoftwareContext, SurfaceEvent,
    SurfaceManager, SurfaceSettings,
};

fn strip(id: &str, x: f32) -> Device {
    let mut device = Device::new(id, id);
    for i in 0..10 {
        device = device.with_led(
            format!("{id}-{i}"),
            Rect::new(x + i as f32 * 10.0, 0.0, 10.0, 20.0),
        );
    }
    device
}

fn manager<R: Renderer + 'static>(renderer: R, fps: u32) -> SurfaceManager<R> {
    SurfaceManager::new(
        renderer,
        Arc::new(SoftwareContext),
        SurfaceSettings {
            target_frame_rate: fps,
            render_scale: 0.5,
        },
    )
    .expect("valid settings")
}

fn texture_size<R: Renderer + 'static>(m: &SurfaceManager<R>) -> Option<(u32, u32)> {
    m.with_texture(|t| t.map(|t| (t.width(), t.height())))
}

struct Blank;

impl Renderer for Blank {
    fn render(&mut self, _canvas: &mut dyn Canvas, _delta: Duration) -> anyhow::Result<()> {
        Ok(())
    }
}

#[derive(Clone, Default)]
struct Captured(Arc<Mutex<Vec<LedColor>>>);

impl DeviceOutput for Captured {
    fn update(&mut self, colors: &[LedColor]) -> anyhow::Result<()> {
        *self.0.lock().unwrap() = colors.to_vec();
        Ok(())
    }
}

#[test]
fn devices_size_the_texture() {
    let m = manager(Blank, 30);
    m.add_devices([strip("a", 0.0), strip("b", 100.0)]);
    m.tick_now(Duration::from_millis(33));
    assert_eq!(texture_size(&m), Some((100, 10)));

    m.remove_devices([DeviceId::new("b")]);
    m.tick_now(Duration::from_millis(33));
    assert_eq!(texture_size(&m), Some((50, 10)));
    assert_eq!(m.stats().led_count, 10);
    assert_eq!(m.stats().frames, 2);
}

#[test]
fn disabled_and_duplicate_devices_are_ignored() {
    let m = manager(Blank, 30);
    let mut off = strip("off", 200.0);
    off.enabled = false;
    m.add_devices([strip("a", 0.0), off]);
    m.add_devices([strip("a", 0.0)]);
    assert_eq!(m.devices().len(), 1);
}

/// Blocks inside the first render call until released.
struct Gate {
    entered: Sender<()>,
    release: Receiver<()>,
    first: bool,
}

impl Renderer for Gate {
    fn render(&mut self, _canvas: &mut dyn Canvas, _delta: Duration) -> anyhow::Result<()> {
        if std::mem::take(&mut self.first) {
            self.entered.send(()).ok();
            self.release.recv().ok();
        }
        Ok(())
    }
}

#[test]
fn removing_a_device_mid_tick_applies_on_the_next_tick() {
    let (entered_tx, entered_rx) = bounded(1);
    let (release_tx, release_rx) = bounded(1);
    let m = Arc::new(manager(
        Gate {
            entered: entered_tx,
            release: release_rx,
            first: true,
        },
        30,
    ));
    m.add_devices([strip("a", 0.0), strip("b", 100.0)]);

    let ticking = Arc::clone(&m);
    let handle = thread::spawn(move || ticking.tick_now(Duration::from_millis(33)));
    entered_rx
        .recv_timeout(Duration::from_secs(5))
        .expect("tick started");
    m.remove_devices([DeviceId::new("b")]);
    release_tx.send(()).unwrap();
    handle.join().expect("tick finished");

    assert_eq!(texture_size(&m), Some((100, 10)));
    m.tick_now(Duration::from_millis(33));
    assert_eq!(texture_size(&m), Some((50, 10)));
}

/// Leaves canvas state behind and then fails, every other frame by panicking.
struct Faulty {
    depths: Arc<Mutex<Vec<usize>>>,
    calls: u32,
}

impl Renderer for Faulty {
    fn render(&mut self, canvas: &mut dyn Canvas, _delta: Duration) -> anyhow::Result<()> {
        self.depths.lock().unwrap().push(canvas.save_count());
        self.calls += 1;
        canvas.save();
        canvas.scale(3.0, 3.0);
        canvas.save();
        canvas.clip_rect(Rect::new(0.0, 0.0, 1.0, 1.0));
        canvas.fill_rect(Rect::new(0.0, 0.0, 1000.0, 1000.0), Rgba::WHITE);
        if self.calls % 2 == 0 {
            panic!("renderer exploded");
        }
        Err(anyhow!("renderer failed"))
    }
}

#[test]
fn canvas_state_is_unwound_after_render_faults() {
    let depths = Arc::new(Mutex::new(Vec::new()));
    let m = manager(
        Faulty {
            depths: Arc::clone(&depths),
            calls: 0,
        },
        30,
    );
    m.add_devices([strip("a", 0.0)]);
    for _ in 0..4 {
        m.tick_now(Duration::from_millis(33));
    }
    assert_eq!(*depths.lock().unwrap(), vec![1, 1, 1, 1]);
    assert_eq!(m.stats().frames, 4);
}

/// Paints the left half of the surface red.
struct LeftRed;

impl Renderer for LeftRed {
    fn render(&mut self, canvas: &mut dyn Canvas, _delta: Duration) -> anyhow::Result<()> {
        canvas.fill_rect(Rect::new(0.0, 0.0, 50.0, 20.0), Rgba::opaque(255, 0, 0));
        Ok(())
    }
}

#[test]
fn leds_receive_sampled_colours() {
    let m = manager(LeftRed, 30);
    let captured = Captured::default();
    m.set_output(Box::new(captured.clone()));
    m.add_devices([strip("a", 0.0)]);
    m.tick_now(Duration::from_millis(33));

    let colors = captured.0.lock().unwrap().clone();
    assert_eq!(colors.len(), 10);
    assert_eq!(colors[0].color, Rgba::opaque(255, 0, 0));
    assert_eq!(colors[4].color, Rgba::opaque(255, 0, 0));
    assert_eq!(colors[9].color, Rgba::BLACK);
    assert_eq!(colors[9].device, DeviceId::new("a"));
}

#[test]
fn render_scale_changes_recreate_the_texture() {
    let m = manager(Blank, 30);
    let events = m.subscribe();
    m.add_devices([strip("a", 0.0)]);
    m.tick_now(Duration::from_millis(33));
    m.set_render_scale(1.0).unwrap();
    m.tick_now(Duration::from_millis(33));
    assert_eq!(texture_size(&m), Some((100, 20)));
    assert!(m.set_render_scale(0.0).is_err());

    let leds_changed = events
        .try_iter()
        .filter(|e| matches!(e, SurfaceEvent::LedsChanged { led_count: 10 }))
        .count();
    assert_eq!(leds_changed, 2);
}

/// Records every delta it is ticked with.
struct Deltas(Arc<Mutex<Vec<Duration>>>, Arc<AtomicBool>);

impl Renderer for Deltas {
    fn render(&mut self, _canvas: &mut dyn Canvas, delta: Duration) -> anyhow::Result<()> {
        if self.1.load(Ordering::SeqCst) {
            self.0.lock().unwrap().push(delta);
        }
        Ok(())
    }
}

fn next_frame(events: &Receiver<SurfaceEvent>) -> Duration {
    loop {
        match events.recv_timeout(Duration::from_secs(5)) {
            Ok(SurfaceEvent::FrameRendered(info)) => return info.delta,
            Ok(_) => continue,
            Err(e) => panic!("no frame rendered: {e}"),
        }
    }
}

#[test]
fn resuming_excludes_the_paused_interval() {
    let deltas = Arc::new(Mutex::new(Vec::new()));
    let recording = Arc::new(AtomicBool::new(false));
    let m = manager(Deltas(Arc::clone(&deltas), Arc::clone(&recording)), 50);
    m.add_devices([strip("a", 0.0)]);
    let events = m.subscribe();

    assert!(m.is_paused());
    assert!(!m.set_paused(true));
    assert!(m.set_paused(false));
    next_frame(&events);
    next_frame(&events);

    assert!(m.set_paused(true));
    thread::sleep(Duration::from_millis(400));
    while events.try_recv().is_ok() {}

    recording.store(true, Ordering::SeqCst);
    assert!(m.set_paused(false));
    let first = next_frame(&events);
    assert!(
        first < Duration::from_millis(300),
        "first delta after resume was {first:?}"
    );
    assert_eq!(deltas.lock().unwrap().first().copied(), Some(first));
}
