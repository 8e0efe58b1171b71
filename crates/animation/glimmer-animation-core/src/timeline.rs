//! Layer timelines: a start, main and end segment played once or with the main segment
//! repeating.

use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayMode {
    /// Loop the main segment while the layer is displayed.
    #[default]
    Repeat,
    /// Play through all segments and stop at the end.
    Once,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimelineData {
    #[serde(with = "crate::serde_ms", default)]
    pub start_ms: Duration,
    #[serde(with = "crate::serde_ms", default = "default_main")]
    pub main_ms: Duration,
    #[serde(with = "crate::serde_ms", default)]
    pub end_ms: Duration,
    #[serde(default)]
    pub play_mode: PlayMode,
}

fn default_main() -> Duration {
    Duration::from_secs(5)
}

impl Default for TimelineData {
    fn default() -> Self {
        Self {
            start_ms: Duration::ZERO,
            main_ms: default_main(),
            end_ms: Duration::ZERO,
            play_mode: PlayMode::Repeat,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Timeline {
    start: Duration,
    main: Duration,
    end: Duration,
    play_mode: PlayMode,
    position: Duration,
    last_delta: Duration,
}

impl Default for Timeline {
    fn default() -> Self {
        Self::load(&TimelineData::default())
    }
}

impl Timeline {
    pub fn new(start: Duration, main: Duration, end: Duration, play_mode: PlayMode) -> Self {
        Self {
            start,
            main,
            end,
            play_mode,
            position: Duration::ZERO,
            last_delta: Duration::ZERO,
        }
    }

    pub fn load(data: &TimelineData) -> Self {
        Self::new(data.start_ms, data.main_ms, data.end_ms, data.play_mode)
    }

    pub fn save(&self) -> TimelineData {
        TimelineData {
            start_ms: self.start,
            main_ms: self.main,
            end_ms: self.end,
            play_mode: self.play_mode,
        }
    }

    pub fn position(&self) -> Duration {
        self.position
    }

    pub fn last_delta(&self) -> Duration {
        self.last_delta
    }

    pub fn play_mode(&self) -> PlayMode {
        self.play_mode
    }

    pub fn length(&self) -> Duration {
        self.start + self.main + self.end
    }

    pub fn main_start(&self) -> Duration {
        self.start
    }

    pub fn end_start(&self) -> Duration {
        self.start + self.main
    }

    pub fn is_finished(&self) -> bool {
        self.position > self.length()
    }

    /// Advance by `delta`. With `stick_to_main` the position wraps inside the main segment
    /// once it has been reached.
    pub fn update(&mut self, delta: Duration, stick_to_main: bool) {
        self.last_delta = delta;
        self.position += delta;
        if stick_to_main {
            self.wrap_main();
        }
    }

    /// Advance using the play mode: `Repeat` loops the main segment while `displayed`.
    pub fn advance(&mut self, delta: Duration, displayed: bool) {
        let stick = self.play_mode == PlayMode::Repeat && displayed;
        self.update(delta, stick);
    }

    pub fn jump_to_start(&mut self) {
        self.position = Duration::ZERO;
    }

    pub fn jump_to_end_segment(&mut self) {
        self.position = self.position.max(self.end_start());
    }

    pub fn jump_to_end(&mut self) {
        self.position = self.position.max(self.length());
    }

    /// Stop playback: the position moves just past the end so the timeline reports finished.
    pub fn finish(&mut self) {
        self.position = self.position.max(self.length() + Duration::from_nanos(1));
    }

    /// Move to `position` directly, e.g. while scrubbing in an editor.
    pub fn seek(&mut self, position: Duration, stick_to_main: bool) {
        self.position = position;
        if stick_to_main {
            self.wrap_main();
        }
    }

    fn wrap_main(&mut self) {
        if self.position < self.start || self.main.is_zero() {
            return;
        }
        let into_main = (self.position - self.start).as_nanos() % self.main.as_nanos();
        self.position = self.start + Duration::from_nanos(into_main as u64);
    }
}
