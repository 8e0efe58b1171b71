//! The surface manager: owns the texture, the device topology and the trigger thread, and runs
//! one render tick per trigger.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, TryLockError};
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, unbounded, Receiver, Sender, TrySendError};
use glimmer_api_core::Rgba;
use hashbrown::HashMap;

use crate::context::GraphicsContext;
use crate::device::{surface_bounds, Device, DeviceId, DeviceOutput, NullOutput};
use crate::error::SurfaceError;
use crate::renderer::{FrameInfo, Renderer, SurfaceEvent};
use crate::settings::{frame_interval, validate_frame_rate, validate_render_scale, SurfaceSettings};
use crate::texture::{LedGroup, Texture};
use crate::trigger::UpdateTrigger;

const FAULT_LOG_INTERVAL: Duration = Duration::from_secs(10);
const EVENT_BUFFER: usize = 16;

/// Render loop statistics as of the last completed tick.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameStats {
    pub frames: u64,
    /// Frames completed during the last full second.
    pub frame_rate: u32,
    /// Time spent rendering and mapping the last frame.
    pub frame_time: Duration,
    pub last_delta: Duration,
    pub texture_width: u32,
    pub texture_height: u32,
    pub led_count: usize,
}

enum Request {
    AddDevices(Vec<Device>),
    RemoveDevices(Vec<DeviceId>),
    RenderScale(f32),
    Context(Arc<dyn GraphicsContext>),
    Output(Box<dyn DeviceOutput>),
}

/// Render faults grouped by message and logged at most once per interval.
#[derive(Default)]
struct FaultLog {
    pending: HashMap<String, usize>,
    last_flush: Option<Instant>,
}

impl FaultLog {
    fn record(&mut self, message: String) {
        *self.pending.entry(message).or_default() += 1;
    }

    fn flush(&mut self, now: Instant) {
        if let Some(last) = self.last_flush {
            if now.duration_since(last) < FAULT_LOG_INTERVAL {
                return;
            }
        }
        self.last_flush = Some(now);
        for (message, count) in self.pending.drain() {
            log::warn!("render fault occurred {count} time(s) in the last 10 seconds: {message}");
        }
    }
}

struct RenderState<R> {
    renderer: R,
    output: Box<dyn DeviceOutput>,
    context: Arc<dyn GraphicsContext>,
    devices: Vec<Device>,
    render_scale: f32,
    texture: Option<Texture>,
    texture_valid: bool,
    leds: LedGroup,
    stats: FrameStats,
    rate_window: (Instant, u32),
    faults: FaultLog,
}

impl<R: Renderer> RenderState<R> {
    fn apply(&mut self, request: Request) {
        match request {
            Request::AddDevices(devices) => {
                for device in devices {
                    if self.devices.iter().any(|d| d.id == device.id) {
                        continue;
                    }
                    log::info!("attaching device {} ({} leds)", device.id, device.leds.len());
                    self.devices.push(device);
                    self.texture_valid = false;
                }
            }
            Request::RemoveDevices(ids) => {
                let before = self.devices.len();
                self.devices.retain(|d| !ids.contains(&d.id));
                if self.devices.len() != before {
                    log::info!("detached {} device(s)", before - self.devices.len());
                    self.texture_valid = false;
                }
            }
            Request::RenderScale(scale) => {
                self.render_scale = scale;
                self.texture_valid = false;
            }
            Request::Context(context) => {
                log::info!("switching graphics context to '{}'", context.name());
                self.context = context;
                self.texture = None;
                self.texture_valid = false;
            }
            Request::Output(output) => self.output = output,
        }
    }

    fn ensure_texture(&mut self, emit: &dyn Fn(SurfaceEvent)) -> bool {
        if self.texture_valid && self.texture.is_some() {
            return true;
        }
        let bounds = surface_bounds(&self.devices);
        match Texture::new(self.context.as_ref(), bounds, self.render_scale) {
            Ok(texture) => {
                log::debug!(
                    "created {}x{} texture at scale {}",
                    texture.width(),
                    texture.height(),
                    texture.scale()
                );
                self.stats.texture_width = texture.width();
                self.stats.texture_height = texture.height();
                self.texture = Some(texture);
                self.texture_valid = true;
                self.leds = LedGroup::new(&self.devices);
                self.stats.led_count = self.leds.len();
                emit(SurfaceEvent::LedsChanged {
                    led_count: self.leds.len(),
                });
                true
            }
            Err(e) => {
                self.texture = None;
                self.faults.record(e.to_string());
                false
            }
        }
    }

    fn tick(&mut self, delta: Duration, emit: &dyn Fn(SurfaceEvent), wants_frames: bool) {
        let started = Instant::now();
        if self.ensure_texture(emit) {
            self.render_frame(delta, emit, wants_frames);
            self.stats.frame_time = started.elapsed();
        }
        self.faults.flush(Instant::now());
    }

    fn render_frame(&mut self, delta: Duration, emit: &dyn Fn(SurfaceEvent), wants_frames: bool) {
        let Some(texture) = self.texture.as_mut() else {
            return;
        };
        let renderer = &mut self.renderer;
        let scale = texture.scale();
        let origin = texture.origin();

        let outcome = {
            let canvas = texture.canvas_mut();
            let depth = canvas.save();
            if (scale - 1.0).abs() > 0.001 {
                canvas.scale(scale, scale);
            }
            canvas.translate(-origin.x, -origin.y);
            canvas.clear(Rgba::BLACK);
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| renderer.render(canvas, delta)));
            canvas.restore_to_count(depth);
            outcome
        };
        texture.copy_pixels();
        match outcome {
            Ok(Ok(())) => {}
            Ok(Err(e)) => self.faults.record(format!("render failed: {e:#}")),
            Err(payload) => self.faults.record(format!("render {}", panic_message(payload))),
        }

        match panic::catch_unwind(AssertUnwindSafe(|| renderer.post_render(texture))) {
            Ok(Ok(())) => {}
            Ok(Err(e)) => self.faults.record(format!("post-render failed: {e:#}")),
            Err(payload) => self.faults.record(format!("post-render {}", panic_message(payload))),
        }

        let colors = self.leds.sample(texture);
        if let Err(e) = self.output.update(&colors) {
            self.faults.record(format!("device output failed: {e:#}"));
        }

        self.stats.frames += 1;
        self.stats.last_delta = delta;
        let now = Instant::now();
        self.rate_window.1 += 1;
        if now.duration_since(self.rate_window.0) >= Duration::from_secs(1) {
            self.stats.frame_rate = self.rate_window.1;
            self.rate_window = (now, 0);
        }

        if wants_frames {
            emit(SurfaceEvent::FrameRendered(FrameInfo {
                frame: self.stats.frames,
                width: texture.width(),
                height: texture.height(),
                delta,
                pixels: Arc::from(texture.pixels()),
            }));
        }
    }
}

struct Shared<R> {
    state: Mutex<RenderState<R>>,
    requests_tx: Sender<Request>,
    requests_rx: Receiver<Request>,
    subscribers: Mutex<Vec<Sender<SurfaceEvent>>>,
}

impl<R: Renderer> Shared<R> {
    fn lock(&self) -> MutexGuard<'_, RenderState<R>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn drain(&self, state: &mut RenderState<R>) {
        while let Ok(request) = self.requests_rx.try_recv() {
            state.apply(request);
        }
    }

    /// Queue `request` and apply it right away when no tick holds the render lock.
    fn request(&self, request: Request) {
        if self.requests_tx.send(request).is_err() {
            return;
        }
        let guard = match self.state.try_lock() {
            Ok(guard) => guard,
            Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
            Err(TryLockError::WouldBlock) => return,
        };
        let mut state = guard;
        self.drain(&mut state);
    }

    fn tick(&self, delta: Duration) {
        let mut state = self.lock();
        self.drain(&mut state);
        let wants_frames = !self.subscribers().is_empty();
        state.tick(delta, &|event| self.emit(event), wants_frames);
    }

    fn subscribers(&self) -> MutexGuard<'_, Vec<Sender<SurfaceEvent>>> {
        self.subscribers.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Slow subscribers miss events; disconnected ones are dropped.
    fn emit(&self, event: SurfaceEvent) {
        self.subscribers()
            .retain(|tx| !matches!(tx.try_send(event.clone()), Err(TrySendError::Disconnected(_))));
    }
}

/// Drives rendering for a set of devices through one [`Renderer`].
///
/// A single trigger thread calls the renderer at the target frame rate while the manager is
/// running. Every tick holds the render lock from start to finish; readers such as
/// [`with_texture`](Self::with_texture) and [`stats`](Self::stats) take the same lock and so
/// always see a completed frame. Topology, scale and context changes are queued and applied
/// at once when the lock is free, otherwise at the start of the next tick.
///
/// The manager starts paused.
pub struct SurfaceManager<R: Renderer + 'static> {
    shared: Arc<Shared<R>>,
    trigger: UpdateTrigger,
    paused: AtomicBool,
    target_frame_rate: AtomicU32,
}

impl<R: Renderer + 'static> SurfaceManager<R> {
    pub fn new(
        renderer: R,
        context: Arc<dyn GraphicsContext>,
        settings: SurfaceSettings,
    ) -> Result<Self, SurfaceError> {
        settings.validate()?;
        let (requests_tx, requests_rx) = unbounded();
        let shared = Arc::new(Shared {
            state: Mutex::new(RenderState {
                renderer,
                output: Box::new(NullOutput),
                context,
                devices: Vec::new(),
                render_scale: settings.render_scale,
                texture: None,
                texture_valid: false,
                leds: LedGroup::default(),
                stats: FrameStats::default(),
                rate_window: (Instant::now(), 0),
                faults: FaultLog::default(),
            }),
            requests_tx,
            requests_rx,
            subscribers: Mutex::new(Vec::new()),
        });

        let tick_shared = Arc::clone(&shared);
        let trigger = UpdateTrigger::spawn(settings.frame_interval(), move |delta| {
            tick_shared.tick(delta)
        })
        .map_err(|e| SurfaceError::Spawn(e.to_string()))?;

        Ok(Self {
            shared,
            trigger,
            paused: AtomicBool::new(true),
            target_frame_rate: AtomicU32::new(settings.target_frame_rate),
        })
    }

    pub fn add_devices(&self, devices: impl IntoIterator<Item = Device>) {
        let devices: Vec<Device> = devices.into_iter().filter(|d| d.enabled).collect();
        if !devices.is_empty() {
            self.shared.request(Request::AddDevices(devices));
        }
    }

    pub fn remove_devices(&self, ids: impl IntoIterator<Item = DeviceId>) {
        let ids: Vec<DeviceId> = ids.into_iter().collect();
        if !ids.is_empty() {
            self.shared.request(Request::RemoveDevices(ids));
        }
    }

    pub fn devices(&self) -> Vec<Device> {
        self.shared.lock().devices.clone()
    }

    /// Start or stop the trigger. Returns whether the state changed.
    pub fn set_paused(&self, paused: bool) -> bool {
        if self.paused.swap(paused, Ordering::SeqCst) == paused {
            return false;
        }
        if paused {
            self.trigger.stop();
        } else {
            self.trigger.start();
        }
        log::debug!("surface {}", if paused { "paused" } else { "resumed" });
        true
    }

    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }

    pub fn target_frame_rate(&self) -> u32 {
        self.target_frame_rate.load(Ordering::SeqCst)
    }

    pub fn set_target_frame_rate(&self, fps: u32) -> Result<(), SurfaceError> {
        validate_frame_rate(fps)?;
        self.target_frame_rate.store(fps, Ordering::SeqCst);
        self.trigger.set_interval(frame_interval(fps));
        Ok(())
    }

    pub fn set_render_scale(&self, scale: f32) -> Result<(), SurfaceError> {
        validate_render_scale(scale)?;
        self.shared.request(Request::RenderScale(scale));
        Ok(())
    }

    pub fn set_graphics_context(&self, context: Arc<dyn GraphicsContext>) {
        self.shared.request(Request::Context(context));
    }

    pub fn set_output(&self, output: Box<dyn DeviceOutput>) {
        self.shared.request(Request::Output(output));
    }

    /// Receive frame and topology events. Events are dropped for receivers that fall behind.
    pub fn subscribe(&self) -> Receiver<SurfaceEvent> {
        let (tx, rx) = bounded(EVENT_BUFFER);
        self.shared.subscribers().push(tx);
        rx
    }

    /// Run `f` against the texture of the last completed frame.
    pub fn with_texture<T>(&self, f: impl FnOnce(Option<&Texture>) -> T) -> T {
        let state = self.shared.lock();
        f(state.texture.as_ref())
    }

    /// Run `f` against the renderer between ticks.
    pub fn with_renderer<T>(&self, f: impl FnOnce(&mut R) -> T) -> T {
        let mut state = self.shared.lock();
        f(&mut state.renderer)
    }

    pub fn stats(&self) -> FrameStats {
        self.shared.lock().stats
    }

    /// Run one tick on the calling thread, for hosts that drive their own clock.
    pub fn tick_now(&self, delta: Duration) {
        self.shared.tick(delta);
    }
}

impl<R: Renderer + 'static> Drop for SurfaceManager<R> {
    fn drop(&mut self) {
        self.set_paused(true);
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("panicked: {s}")
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("panicked: {s}")
    } else {
        "panicked".to_string()
    }
}
