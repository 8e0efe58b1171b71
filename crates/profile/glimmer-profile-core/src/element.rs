//! State shared by folders and layers: display condition and timeline.

use std::time::Duration;

use glimmer_animation_core::Timeline;
use glimmer_api_core::{Value, ValueSource};
use glimmer_graph_core::{PinType, ScriptId};

use crate::descriptor::{DisplayDescriptor, EventOverlap, EventTrigger};
use crate::error::ProfileError;
use crate::folder::Folder;
use crate::layer::Layer;
use crate::scripts::ScriptLibrary;

/// Watches the value behind an [`EventTrigger`] between frames.
#[derive(Clone, Debug)]
struct EventWatch {
    trigger: EventTrigger,
    last: Option<Value>,
    primed: bool,
}

impl EventWatch {
    fn new(trigger: EventTrigger) -> Self {
        Self {
            trigger,
            last: None,
            primed: false,
        }
    }

    /// Whether the value changed since the previous poll. The first poll only records it.
    fn poll(&mut self, data: &dyn ValueSource) -> bool {
        let current = data.value(&self.trigger.path);
        let fired = self.primed && current != self.last;
        self.last = current;
        self.primed = true;
        fired
    }
}

#[derive(Clone, Debug)]
pub struct DisplayState {
    pub name: String,
    pub enabled: bool,
    condition: Option<ScriptId>,
    event: Option<EventWatch>,
    always_finish: bool,
    timeline: Timeline,
    copies: Vec<Timeline>,
    condition_met: bool,
}

impl DisplayState {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            enabled: true,
            condition: None,
            event: None,
            always_finish: false,
            timeline: Timeline::default(),
            copies: Vec::new(),
            condition_met: false,
        }
    }

    pub(crate) fn load(
        data: &DisplayDescriptor,
        scripts: &ScriptLibrary,
    ) -> Result<Self, ProfileError> {
        let mut state = Self::new(data.name.clone());
        state.enabled = data.enabled;
        state.always_finish = data.always_finish;
        state.timeline = Timeline::load(&data.timeline);
        state.set_condition(data.condition, scripts)?;
        state.set_event(data.event.clone());
        Ok(state)
    }

    pub(crate) fn save(&self) -> DisplayDescriptor {
        DisplayDescriptor {
            name: self.name.clone(),
            enabled: self.enabled,
            condition: self.condition,
            event: self.event().cloned(),
            always_finish: self.always_finish,
            timeline: self.timeline.save(),
        }
    }

    pub fn condition(&self) -> Option<ScriptId> {
        self.condition
    }

    /// Gate the element on a boolean script from `scripts`, or clear the gate with `None`.
    pub fn set_condition(
        &mut self,
        condition: Option<ScriptId>,
        scripts: &ScriptLibrary,
    ) -> Result<(), ProfileError> {
        if let Some(id) = condition {
            let script = scripts.get(id).ok_or_else(|| ProfileError::UnknownScript {
                element: self.name.clone(),
                script: id,
            })?;
            if *script.result_type() != PinType::Boolean {
                return Err(ProfileError::ConditionType {
                    element: self.name.clone(),
                    script: id,
                    found: script.result_type().clone(),
                });
            }
        }
        self.condition = condition;
        Ok(())
    }

    pub fn event(&self) -> Option<&EventTrigger> {
        self.event.as_ref().map(|e| &e.trigger)
    }

    /// Switch between playing while the condition holds (`None`) and playing once per event.
    /// An event-driven element stays hidden until its first event.
    pub fn set_event(&mut self, event: Option<EventTrigger>) {
        self.copies.clear();
        if event.is_some() {
            self.timeline.finish();
        }
        self.event = event.map(EventWatch::new);
    }

    pub fn always_finish(&self) -> bool {
        self.always_finish
    }

    pub fn set_always_finish(&mut self, always_finish: bool) {
        self.always_finish = always_finish;
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn timeline_mut(&mut self) -> &mut Timeline {
        &mut self.timeline
    }

    /// Extra timelines started by copy-mode events, oldest first.
    pub fn copies(&self) -> &[Timeline] {
        &self.copies
    }

    /// Whether the condition held on the last update. Event-driven elements count as met
    /// while any of their timelines is playing.
    pub fn condition_met(&self) -> bool {
        self.condition_met
    }

    /// Drawn while enabled and a timeline has not run out.
    pub fn is_displayed(&self) -> bool {
        self.enabled && (!self.timeline.is_finished() || !self.copies.is_empty())
    }

    /// Evaluate the condition and advance the timeline by `delta`.
    ///
    /// A finished timeline restarts when the condition starts holding again. When the
    /// condition stops holding the timeline skips to its end segment, unless the element
    /// always finishes its main segment first.
    pub(crate) fn update(
        &mut self,
        delta: Duration,
        parent_met: bool,
        scripts: &ScriptLibrary,
        data: &dyn ValueSource,
    ) {
        if self.event.is_some() {
            self.update_event(delta, parent_met, scripts, data);
            return;
        }
        let met = parent_met && self.condition.map_or(true, |id| scripts.condition(id));
        let was_met = std::mem::replace(&mut self.condition_met, met);

        if met {
            if !was_met && self.timeline.is_finished() {
                self.timeline.jump_to_start();
            }
        } else if !self.always_finish {
            self.timeline.jump_to_end_segment();
        }
        self.timeline.advance(delta, met);
    }

    /// Event-driven timelines play through once per event; the condition script only filters
    /// events.
    fn update_event(
        &mut self,
        delta: Duration,
        parent_met: bool,
        scripts: &ScriptLibrary,
        data: &dyn ValueSource,
    ) {
        let Some(event) = self.event.as_mut() else {
            return;
        };
        let changed = event.poll(data);
        let overlap = event.trigger.overlap;
        let fired = changed && parent_met && self.condition.map_or(true, |id| scripts.condition(id));

        if fired {
            if self.timeline.is_finished() {
                self.timeline.jump_to_start();
            } else {
                match overlap {
                    EventOverlap::Restart => self.timeline.jump_to_start(),
                    EventOverlap::Ignore => {}
                    EventOverlap::Copy => {
                        let mut copy = self.timeline.clone();
                        copy.jump_to_start();
                        self.copies.push(copy);
                    }
                }
            }
        }
        if !parent_met && !self.always_finish {
            self.timeline.jump_to_end_segment();
            for copy in &mut self.copies {
                copy.jump_to_end_segment();
            }
        }

        self.timeline.advance(delta, false);
        for copy in &mut self.copies {
            copy.advance(delta, false);
        }
        self.copies.retain(|copy| !copy.is_finished());
        self.condition_met = !self.timeline.is_finished() || !self.copies.is_empty();
    }
}

/// Node of the profile tree.
pub enum ProfileElement {
    Folder(Folder),
    Layer(Layer),
}

impl ProfileElement {
    pub fn display(&self) -> &DisplayState {
        match self {
            ProfileElement::Folder(f) => f.display(),
            ProfileElement::Layer(l) => l.display(),
        }
    }

    pub fn display_mut(&mut self) -> &mut DisplayState {
        match self {
            ProfileElement::Folder(f) => f.display_mut(),
            ProfileElement::Layer(l) => l.display_mut(),
        }
    }

    pub fn name(&self) -> &str {
        &self.display().name
    }

    pub fn as_layer(&self) -> Option<&Layer> {
        match self {
            ProfileElement::Layer(l) => Some(l),
            ProfileElement::Folder(_) => None,
        }
    }

    pub fn as_folder(&self) -> Option<&Folder> {
        match self {
            ProfileElement::Folder(f) => Some(f),
            ProfileElement::Layer(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glimmer_animation_core::{PlayMode, TimelineData};
    use glimmer_api_core::{DataModel, DataPath, NoData};
    use glimmer_graph_core::nodes::StaticValueNode;
    use glimmer_graph_core::NodeScript;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn state(play_mode: PlayMode, always_finish: bool) -> DisplayState {
        let data = DisplayDescriptor {
            name: "layer".into(),
            enabled: true,
            condition: None,
            event: None,
            always_finish,
            timeline: TimelineData {
                start_ms: Duration::ZERO,
                main_ms: ms(1000),
                end_ms: ms(200),
                play_mode,
            },
        };
        DisplayState::load(&data, &ScriptLibrary::new()).expect("no condition to resolve")
    }

    #[test]
    fn it_should_loop_while_the_condition_holds() {
        let mut s = state(PlayMode::Repeat, false);
        let scripts = ScriptLibrary::new();
        s.update(ms(2500), true, &scripts, &NoData);
        assert_eq!(s.timeline().position(), ms(500));
        assert!(s.is_displayed());
    }

    #[test]
    fn it_should_skip_to_the_end_segment_when_the_condition_drops() {
        let mut s = state(PlayMode::Repeat, false);
        let scripts = ScriptLibrary::new();
        s.update(ms(300), true, &scripts, &NoData);
        s.update(ms(100), false, &scripts, &NoData);
        assert_eq!(s.timeline().position(), ms(1100));
        assert!(s.is_displayed());
        s.update(ms(150), false, &scripts, &NoData);
        assert!(!s.is_displayed());
    }

    #[test]
    fn it_should_finish_the_main_segment_when_asked_to() {
        let mut s = state(PlayMode::Repeat, true);
        let scripts = ScriptLibrary::new();
        s.update(ms(300), true, &scripts, &NoData);
        s.update(ms(100), false, &scripts, &NoData);
        assert_eq!(s.timeline().position(), ms(400));
    }

    #[test]
    fn it_should_restart_a_finished_timeline() {
        let mut s = state(PlayMode::Once, false);
        let scripts = ScriptLibrary::new();
        s.update(ms(1300), true, &scripts, &NoData);
        assert!(!s.is_displayed());
        s.update(ms(10), false, &scripts, &NoData);
        s.update(ms(50), true, &scripts, &NoData);
        assert_eq!(s.timeline().position(), ms(50));
        assert!(s.is_displayed());
    }

    fn evented(overlap: EventOverlap) -> DisplayState {
        let mut s = state(PlayMode::Once, false);
        s.set_event(Some(EventTrigger {
            path: DataPath::parse("game/kills").expect("valid path"),
            overlap,
        }));
        s
    }

    fn kills(n: f32) -> DataModel {
        let mut data = DataModel::new();
        data.set_str("game/kills", Value::Numeric(n))
            .expect("valid path");
        data
    }

    #[test]
    fn it_should_wait_for_the_first_event() {
        let mut s = evented(EventOverlap::Restart);
        let scripts = ScriptLibrary::new();
        assert!(!s.is_displayed());
        s.update(ms(100), true, &scripts, &kills(0.0));
        s.update(ms(100), true, &scripts, &kills(0.0));
        assert!(!s.is_displayed(), "no change, no event");

        s.update(ms(100), true, &scripts, &kills(1.0));
        assert!(s.is_displayed());
        assert!(s.condition_met());
        assert_eq!(s.timeline().position(), ms(100));
    }

    #[test]
    fn it_should_play_an_event_once_even_when_repeating() {
        let mut s = state(PlayMode::Repeat, false);
        s.set_event(Some(EventTrigger {
            path: DataPath::parse("game/kills").expect("valid path"),
            overlap: EventOverlap::Restart,
        }));
        let scripts = ScriptLibrary::new();
        s.update(ms(10), true, &scripts, &kills(0.0));
        s.update(ms(10), true, &scripts, &kills(1.0));
        s.update(ms(1200), true, &scripts, &kills(1.0));
        assert!(!s.is_displayed());
        assert!(!s.condition_met());
    }

    #[test]
    fn it_should_restart_on_overlapping_events() {
        let mut s = evented(EventOverlap::Restart);
        let scripts = ScriptLibrary::new();
        s.update(ms(10), true, &scripts, &kills(0.0));
        s.update(ms(300), true, &scripts, &kills(1.0));
        s.update(ms(50), true, &scripts, &kills(2.0));
        assert_eq!(s.timeline().position(), ms(50));
        assert!(s.copies().is_empty());
    }

    #[test]
    fn it_should_ignore_overlapping_events() {
        let mut s = evented(EventOverlap::Ignore);
        let scripts = ScriptLibrary::new();
        s.update(ms(10), true, &scripts, &kills(0.0));
        s.update(ms(300), true, &scripts, &kills(1.0));
        s.update(ms(50), true, &scripts, &kills(2.0));
        assert_eq!(s.timeline().position(), ms(350));

        s.update(ms(900), true, &scripts, &kills(2.0));
        assert!(!s.is_displayed());
        s.update(ms(20), true, &scripts, &kills(3.0));
        assert_eq!(s.timeline().position(), ms(20), "a finished timeline always restarts");
    }

    #[test]
    fn it_should_copy_on_overlapping_events() {
        let mut s = evented(EventOverlap::Copy);
        let scripts = ScriptLibrary::new();
        s.update(ms(10), true, &scripts, &kills(0.0));
        s.update(ms(300), true, &scripts, &kills(1.0));
        s.update(ms(100), true, &scripts, &kills(2.0));
        assert_eq!(s.timeline().position(), ms(400));
        assert_eq!(s.copies().len(), 1);
        assert_eq!(s.copies()[0].position(), ms(100));

        s.update(ms(900), true, &scripts, &kills(2.0));
        assert!(s.timeline().is_finished());
        assert!(s.is_displayed(), "the copy is still playing");
        s.update(ms(400), true, &scripts, &kills(2.0));
        assert!(s.copies().is_empty());
        assert!(!s.is_displayed());
    }

    #[test]
    fn it_should_reject_non_boolean_conditions() {
        let mut scripts = ScriptLibrary::new();
        let mut numeric = NodeScript::new("numeric", PinType::Numeric);
        let node = numeric.add(|p| StaticValueNode::numeric(p, 1.0));
        let out = numeric.output(node, "output").unwrap();
        numeric.connect(out, numeric.exit_pin()).unwrap();
        let id = numeric.id();
        scripts.insert(numeric);
        scripts.evaluate(&DataModel::new());

        let mut s = DisplayState::new("layer");
        let err = s.set_condition(Some(id), &scripts).unwrap_err();
        assert!(matches!(err, ProfileError::ConditionType { found: PinType::Numeric, .. }));
        let missing = s.set_condition(Some(ScriptId::new()), &scripts).unwrap_err();
        assert!(matches!(missing, ProfileError::UnknownScript { .. }));
        assert_eq!(s.condition(), None);
    }
}
