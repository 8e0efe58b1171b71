//! Serialized profile tree handed over by the profile-loading collaborator.

use glimmer_animation_core::{PropertyData, TimelineData};
use glimmer_api_core::DataPath;
use glimmer_graph_core::{NodeScriptData, ScriptId};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileDescriptor {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub name: String,
    /// Script library shared by display conditions and data bindings.
    #[serde(default)]
    pub scripts: Vec<NodeScriptData>,
    /// Top-most element first.
    #[serde(default)]
    pub elements: Vec<ElementDescriptor>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ElementDescriptor {
    Folder(FolderDescriptor),
    Layer(LayerDescriptor),
}

impl ElementDescriptor {
    pub fn name(&self) -> &str {
        match self {
            ElementDescriptor::Folder(f) => &f.display.name,
            ElementDescriptor::Layer(l) => &l.display.name,
        }
    }
}

/// Settings every element carries: identity, display condition and timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayDescriptor {
    pub name: String,
    #[serde(default = "enabled_default")]
    pub enabled: bool,
    /// Boolean script gating the element; absent means always displayed. With an `event` it
    /// filters which events start the timeline.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<ScriptId>,
    /// Play the timeline once per event instead of while the condition holds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event: Option<EventTrigger>,
    /// Play the timeline to its end after the condition stops holding instead of skipping to
    /// the end segment.
    #[serde(default)]
    pub always_finish: bool,
    #[serde(default)]
    pub timeline: TimelineData,
}

fn enabled_default() -> bool {
    true
}

/// An event fires each frame the value at `path` differs from the previous frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventTrigger {
    pub path: DataPath,
    #[serde(default)]
    pub overlap: EventOverlap,
}

/// What an event does to a timeline that is still playing.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventOverlap {
    /// Start over from the beginning.
    #[default]
    Restart,
    /// Let the running timeline finish; the event is dropped.
    Ignore,
    /// Play an extra copy of the timeline alongside the running one.
    Copy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FolderDescriptor {
    #[serde(flatten)]
    pub display: DisplayDescriptor,
    #[serde(default)]
    pub children: Vec<ElementDescriptor>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerDescriptor {
    #[serde(flatten)]
    pub display: DisplayDescriptor,
    /// Keyed by property name; properties left out keep their defaults.
    #[serde(default)]
    pub properties: IndexMap<String, PropertyData>,
    /// Applied in order around the brush.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub effects: Vec<EffectDescriptor>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectDescriptor {
    pub name: String,
    /// Registered effect, written as `provider:effect`.
    pub effect: String,
    #[serde(default)]
    pub suspended: bool,
    #[serde(default)]
    pub properties: IndexMap<String, PropertyData>,
}
