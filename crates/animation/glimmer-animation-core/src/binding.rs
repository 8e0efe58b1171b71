//! Data bindings: override one sub-property of a layer property from external data or from
//! the result of a node script.

use std::time::Duration;

use glimmer_api_core::coercion::{to_bool, try_float};
use glimmer_api_core::{DataPath, NoData, Value, ValueSource};
use glimmer_graph_core::ScriptId;
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::easing::Easing;
use crate::error::BindingError;
use crate::interp::lerp_f32;
use crate::modifier::{apply_all, Modifier};
use crate::value::PropertyValue;

/// Last results of the node scripts a binding may refer to.
pub trait ScriptResults {
    fn result(&self, id: ScriptId) -> Option<Value>;
}

pub struct NoScripts;

impl ScriptResults for NoScripts {
    fn result(&self, _id: ScriptId) -> Option<Value> {
        None
    }
}

impl ScriptResults for HashMap<ScriptId, Value> {
    fn result(&self, id: ScriptId) -> Option<Value> {
        self.get(&id).cloned()
    }
}

/// Everything a binding may read during one update.
#[derive(Clone, Copy)]
pub struct BindingContext<'a> {
    pub data: &'a dyn ValueSource,
    pub scripts: &'a dyn ScriptResults,
}

impl<'a> BindingContext<'a> {
    pub fn new(data: &'a dyn ValueSource, scripts: &'a dyn ScriptResults) -> Self {
        Self { data, scripts }
    }
}

impl Default for BindingContext<'static> {
    fn default() -> Self {
        Self {
            data: &NoData,
            scripts: &NoScripts,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BindingSource {
    Path(DataPath),
    Script(ScriptId),
}

impl BindingSource {
    fn read(&self, ctx: &BindingContext<'_>) -> Option<Value> {
        match self {
            BindingSource::Path(path) => ctx.data.value(path),
            BindingSource::Script(id) => ctx.scripts.result(*id),
        }
    }
}

/// One arm of a conditional binding: when `script` yields true, the binding writes `value`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BindingCondition {
    pub script: ScriptId,
    pub value: f32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum BindingMode {
    Direct {
        source: BindingSource,
        #[serde(default)]
        modifiers: Vec<Modifier>,
    },
    /// First condition that holds wins.
    Conditional { conditions: Vec<BindingCondition> },
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BindingSmoothing {
    #[serde(rename = "duration_ms", with = "crate::serde_ms")]
    pub duration: Duration,
    #[serde(default)]
    pub easing: Easing,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct SmoothingState {
    from: f32,
    to: f32,
    last: f32,
    elapsed: Duration,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DataBinding {
    /// Sub-property written by the binding, e.g. `alpha` on a colour.
    pub target: String,
    pub mode: BindingMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub smoothing: Option<BindingSmoothing>,
    #[serde(default = "enabled_default")]
    pub enabled: bool,
    #[serde(skip)]
    state: Option<SmoothingState>,
}

fn enabled_default() -> bool {
    true
}

impl DataBinding {
    pub fn direct(target: impl Into<String>, source: BindingSource, modifiers: Vec<Modifier>) -> Self {
        Self::with_mode(target, BindingMode::Direct { source, modifiers })
    }

    pub fn conditional(target: impl Into<String>, conditions: Vec<BindingCondition>) -> Self {
        Self::with_mode(target, BindingMode::Conditional { conditions })
    }

    fn with_mode(target: impl Into<String>, mode: BindingMode) -> Self {
        Self {
            target: target.into(),
            mode,
            smoothing: None,
            enabled: true,
            state: None,
        }
    }

    pub fn smoothed(mut self, smoothing: BindingSmoothing) -> Self {
        self.smoothing = Some(smoothing);
        self
    }

    /// Check the binding against the capabilities of `T`.
    pub fn validate<T: PropertyValue>(&self) -> Result<(), BindingError> {
        if !T::SUB_PROPERTIES.contains(&self.target.as_str()) {
            return Err(BindingError::UnknownSubProperty {
                sub: self.target.clone(),
                available: T::SUB_PROPERTIES,
            });
        }
        if let BindingMode::Conditional { conditions } = &self.mode {
            if conditions.is_empty() {
                return Err(BindingError::NoConditions);
            }
        }
        Ok(())
    }

    /// Scripts this binding reads from.
    pub fn scripts(&self) -> Vec<ScriptId> {
        match &self.mode {
            BindingMode::Direct {
                source: BindingSource::Script(id),
                ..
            } => vec![*id],
            BindingMode::Direct { .. } => Vec::new(),
            BindingMode::Conditional { conditions } => {
                conditions.iter().map(|c| c.script).collect()
            }
        }
    }

    /// Target value before smoothing, or `None` when the source cannot be read.
    pub fn resolve(&self, ctx: &BindingContext<'_>) -> Option<f32> {
        let value = match &self.mode {
            BindingMode::Direct { source, modifiers } => {
                let raw = source.read(ctx)?;
                let v = try_float(&raw)?;
                apply_all(modifiers, v, ctx.data)
            }
            BindingMode::Conditional { conditions } => conditions
                .iter()
                .find(|c| ctx.scripts.result(c.script).is_some_and(|v| to_bool(&v)))
                .map(|c| c.value)?,
        };
        Some(if value.is_finite() { value } else { 0.0 })
    }

    /// Write the bound sub-property of `value`. Returns whether anything was written.
    pub fn apply<T: PropertyValue>(
        &mut self,
        value: &mut T,
        delta: Duration,
        ctx: &BindingContext<'_>,
    ) -> bool {
        if !self.enabled {
            return false;
        }
        let Some(target) = self.resolve(ctx) else {
            log::trace!("binding on '{}' has no readable source this update", self.target);
            return false;
        };
        let smoothing = self.smoothing;
        let out = match smoothing {
            Some(smoothing) => {
                let current = value.read_sub(&self.target).unwrap_or(target);
                self.smooth(smoothing, current, target, delta)
            }
            None => target,
        };
        value.write_sub(&self.target, out)
    }

    fn smooth(&mut self, smoothing: BindingSmoothing, current: f32, target: f32, delta: Duration) -> f32 {
        let state = self.state.get_or_insert(SmoothingState {
            from: current,
            to: target,
            last: current,
            elapsed: Duration::ZERO,
        });
        if state.to != target {
            state.from = state.last;
            state.to = target;
            state.elapsed = Duration::ZERO;
        }
        state.elapsed = (state.elapsed + delta).min(smoothing.duration);
        let out = if smoothing.duration.is_zero() {
            target
        } else {
            let t = (state.elapsed.as_secs_f64() / smoothing.duration.as_secs_f64()) as f32;
            lerp_f32(state.from, state.to, smoothing.easing.ease(t))
        };
        state.last = out;
        out
    }

    /// Forget the smoothing history so the next update starts from the property's own value.
    pub fn reset(&mut self) {
        self.state = None;
    }
}
