//! Fixed-interval trigger thread driving render ticks.

use std::io;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};

enum TriggerCommand {
    Start,
    Stop,
    Interval(Duration),
    Shutdown,
}

/// Calls `tick(delta)` every interval while started. Starting measures the first delta from
/// the moment of the start, so time spent stopped never shows up in a delta. Stopping does not
/// interrupt a tick in progress.
pub struct UpdateTrigger {
    tx: Sender<TriggerCommand>,
    handle: Option<JoinHandle<()>>,
}

impl UpdateTrigger {
    pub fn spawn<F>(interval: Duration, tick: F) -> io::Result<Self>
    where
        F: FnMut(Duration) + Send + 'static,
    {
        let (tx, rx) = unbounded();
        let handle = thread::Builder::new()
            .name("glimmer-surface".into())
            .spawn(move || run(rx, interval, tick))?;
        Ok(Self {
            tx,
            handle: Some(handle),
        })
    }

    pub fn start(&self) {
        let _ = self.tx.send(TriggerCommand::Start);
    }

    pub fn stop(&self) {
        let _ = self.tx.send(TriggerCommand::Stop);
    }

    pub fn set_interval(&self, interval: Duration) {
        let _ = self.tx.send(TriggerCommand::Interval(interval));
    }
}

impl Drop for UpdateTrigger {
    fn drop(&mut self) {
        let _ = self.tx.send(TriggerCommand::Shutdown);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!("surface trigger thread panicked");
            }
        }
    }
}

fn run<F: FnMut(Duration)>(rx: Receiver<TriggerCommand>, mut interval: Duration, mut tick: F) {
    let mut running = false;
    let mut last = Instant::now();
    loop {
        let command = if running {
            let wait = (last + interval).saturating_duration_since(Instant::now());
            match rx.recv_timeout(wait) {
                Ok(command) => Some(command),
                Err(RecvTimeoutError::Timeout) => None,
                Err(RecvTimeoutError::Disconnected) => break,
            }
        } else {
            match rx.recv() {
                Ok(command) => Some(command),
                Err(_) => break,
            }
        };

        match command {
            Some(TriggerCommand::Start) => {
                if !running {
                    running = true;
                    last = Instant::now();
                }
            }
            Some(TriggerCommand::Stop) => running = false,
            Some(TriggerCommand::Interval(d)) => interval = d,
            Some(TriggerCommand::Shutdown) => break,
            None => {
                let now = Instant::now();
                let delta = now - last;
                last = now;
                tick(delta);
            }
        }
    }
    log::debug!("surface trigger stopped");
}
