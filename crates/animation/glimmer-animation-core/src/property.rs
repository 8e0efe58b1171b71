//! Layer properties: base value, keyframes and an optional data binding composed into the
//! current value consumed by rendering.

use std::any::Any;
use std::time::Duration;

use glimmer_api_core::{Value, ValueKind};
use serde::{Deserialize, Serialize};

use crate::binding::{BindingContext, DataBinding};
use crate::easing::Easing;
use crate::error::PropertyError;
use crate::keyframe::{self, Keyframe, KeyframeState};
use crate::value::PropertyValue;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct KeyframeData {
    #[serde(rename = "position_ms", with = "crate::serde_ms")]
    pub position: Duration,
    pub value: Value,
    #[serde(default)]
    pub easing: Easing,
}

/// Serialized form of a property, independent of its value type.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PropertyData {
    pub base: Value,
    #[serde(default)]
    pub keyframes_enabled: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keyframes: Vec<KeyframeData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub binding: Option<DataBinding>,
}

impl PropertyData {
    pub fn new(base: Value) -> Self {
        Self {
            base,
            keyframes_enabled: false,
            keyframes: Vec::new(),
            binding: None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct LayerProperty<T: PropertyValue> {
    base: T,
    current: T,
    keyframes: Vec<Keyframe<T>>,
    keyframes_enabled: bool,
    binding: Option<DataBinding>,
    state: KeyframeState,
    progress: Duration,
}

impl<T: PropertyValue> LayerProperty<T> {
    pub fn new(base: T) -> Self {
        Self {
            current: base.clone(),
            base,
            keyframes: Vec::new(),
            keyframes_enabled: false,
            binding: None,
            state: KeyframeState::Disabled,
            progress: Duration::ZERO,
        }
    }

    pub fn base(&self) -> &T {
        &self.base
    }

    pub fn set_base(&mut self, base: T) {
        if matches!(
            self.state,
            KeyframeState::Disabled | KeyframeState::NoKeyframes
        ) {
            self.current = base.clone();
        }
        self.base = base;
    }

    /// Value produced by the last update.
    pub fn current(&self) -> &T {
        &self.current
    }

    pub fn keyframes(&self) -> &[Keyframe<T>] {
        &self.keyframes
    }

    pub fn keyframes_enabled(&self) -> bool {
        self.keyframes_enabled
    }

    pub fn state(&self) -> KeyframeState {
        self.state
    }

    /// Timeline position of the last update.
    pub fn progress(&self) -> Duration {
        self.progress
    }

    /// Turn keyframing on or off.
    ///
    /// Enabling on a property without keyframes seeds one at the last update position holding
    /// the current value. Disabling keeps the keyframes but makes the keyframed value the new
    /// base.
    pub fn set_keyframes_enabled(&mut self, enabled: bool) -> Result<(), PropertyError> {
        if enabled == self.keyframes_enabled {
            return Ok(());
        }
        if enabled {
            if !T::KEYFRAMES {
                return Err(PropertyError::KeyframesUnsupported { kind: T::KIND });
            }
            if self.keyframes.is_empty() {
                log::debug!("seeding keyframe at {:?}", self.progress);
                self.keyframes
                    .push(Keyframe::linear(self.progress, self.current.clone()));
            }
            self.keyframes_enabled = true;
            self.state = keyframe::locate(&self.keyframes, self.progress);
        } else {
            self.base = self.keyframed_value();
            self.keyframes_enabled = false;
            self.state = KeyframeState::Disabled;
        }
        Ok(())
    }

    /// Insert a keyframe in position order, returning its index.
    pub fn add_keyframe(&mut self, keyframe: Keyframe<T>) -> Result<usize, PropertyError> {
        if !T::KEYFRAMES {
            return Err(PropertyError::KeyframesUnsupported { kind: T::KIND });
        }
        let index = keyframe::insert_sorted(&mut self.keyframes, keyframe);
        self.relocate();
        Ok(index)
    }

    pub fn remove_keyframe(&mut self, index: usize) -> Option<Keyframe<T>> {
        let removed = (index < self.keyframes.len()).then(|| self.keyframes.remove(index));
        self.relocate();
        removed
    }

    pub fn clear_keyframes(&mut self) {
        self.keyframes.clear();
        self.relocate();
    }

    /// Keep `state` pointing into the current keyframe list after an edit.
    fn relocate(&mut self) {
        if self.keyframes_enabled {
            self.state = keyframe::locate(&self.keyframes, self.progress);
        }
    }

    pub fn binding(&self) -> Option<&DataBinding> {
        self.binding.as_ref()
    }

    pub fn binding_mut(&mut self) -> Option<&mut DataBinding> {
        self.binding.as_mut()
    }

    pub fn set_binding(&mut self, binding: DataBinding) -> Result<(), PropertyError> {
        if T::SUB_PROPERTIES.is_empty() {
            return Err(PropertyError::BindingUnsupported { kind: T::KIND });
        }
        binding.validate::<T>()?;
        self.binding = Some(binding);
        Ok(())
    }

    pub fn clear_binding(&mut self) -> Option<DataBinding> {
        self.binding.take()
    }

    /// Recompute the current value for timeline position `progress`.
    pub fn update(&mut self, progress: Duration, delta: Duration, ctx: &BindingContext<'_>) {
        self.progress = progress;
        self.state = if self.keyframes_enabled {
            keyframe::locate(&self.keyframes, progress)
        } else {
            KeyframeState::Disabled
        };
        let mut value = self.keyframed_value();
        if let Some(binding) = self.binding.as_mut() {
            binding.apply(&mut value, delta, ctx);
        }
        self.current = value;
    }

    fn keyframed_value(&self) -> T {
        if !self.keyframes_enabled {
            return self.base.clone();
        }
        let state = keyframe::locate(&self.keyframes, self.progress);
        keyframe::sample(&self.keyframes, state, self.progress)
            .unwrap_or_else(|| self.base.clone())
    }

    pub fn load(data: &PropertyData) -> Result<Self, PropertyError> {
        let mut property = Self::new(decode::<T>(&data.base)?);
        property.apply_data(data)?;
        Ok(property)
    }

    fn apply_data(&mut self, data: &PropertyData) -> Result<(), PropertyError> {
        let base = decode::<T>(&data.base)?;
        let mut keyframes = Vec::with_capacity(data.keyframes.len());
        for k in &data.keyframes {
            keyframes.push(Keyframe::new(k.position, decode::<T>(&k.value)?, k.easing));
        }
        if !T::KEYFRAMES && (data.keyframes_enabled || !keyframes.is_empty()) {
            return Err(PropertyError::KeyframesUnsupported { kind: T::KIND });
        }
        if let Some(binding) = &data.binding {
            if T::SUB_PROPERTIES.is_empty() {
                return Err(PropertyError::BindingUnsupported { kind: T::KIND });
            }
            binding.validate::<T>()?;
        }

        keyframes.sort_by_key(|k| k.position);
        self.base = base.clone();
        self.current = base;
        self.keyframes = keyframes;
        self.keyframes_enabled = data.keyframes_enabled;
        self.binding = data.binding.clone();
        self.state = if self.keyframes_enabled {
            keyframe::locate(&self.keyframes, self.progress)
        } else {
            KeyframeState::Disabled
        };
        Ok(())
    }

    pub fn save(&self) -> PropertyData {
        PropertyData {
            base: self.base.to_value(),
            keyframes_enabled: self.keyframes_enabled,
            keyframes: self
                .keyframes
                .iter()
                .map(|k| KeyframeData {
                    position: k.position,
                    value: k.value.to_value(),
                    easing: k.easing,
                })
                .collect(),
            binding: self.binding.clone(),
        }
    }
}

impl<T: PropertyValue + Default> Default for LayerProperty<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

fn decode<T: PropertyValue>(value: &Value) -> Result<T, PropertyError> {
    T::from_value(value).ok_or(PropertyError::TypeMismatch {
        expected: T::KIND,
        found: value.kind(),
    })
}

/// Type-erased access to a [`LayerProperty`], used by layers to update, load and save
/// heterogeneous properties by name.
pub trait DynProperty: Send {
    fn kind(&self) -> ValueKind;
    fn update(&mut self, progress: Duration, delta: Duration, ctx: &BindingContext<'_>);
    fn current_value(&self) -> Value;
    fn base_value(&self) -> Value;
    fn keyframes_enabled(&self) -> bool;
    fn set_keyframes_enabled(&mut self, enabled: bool) -> Result<(), PropertyError>;
    fn binding(&self) -> Option<&DataBinding>;
    fn load(&mut self, data: &PropertyData) -> Result<(), PropertyError>;
    fn save(&self) -> PropertyData;
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: PropertyValue> DynProperty for LayerProperty<T> {
    fn kind(&self) -> ValueKind {
        T::KIND
    }

    fn update(&mut self, progress: Duration, delta: Duration, ctx: &BindingContext<'_>) {
        LayerProperty::update(self, progress, delta, ctx)
    }

    fn current_value(&self) -> Value {
        self.current.to_value()
    }

    fn base_value(&self) -> Value {
        self.base.to_value()
    }

    fn keyframes_enabled(&self) -> bool {
        self.keyframes_enabled
    }

    fn set_keyframes_enabled(&mut self, enabled: bool) -> Result<(), PropertyError> {
        LayerProperty::set_keyframes_enabled(self, enabled)
    }

    fn binding(&self) -> Option<&DataBinding> {
        self.binding.as_ref()
    }

    fn load(&mut self, data: &PropertyData) -> Result<(), PropertyError> {
        self.apply_data(data)
    }

    fn save(&self) -> PropertyData {
        LayerProperty::save(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl<'a> dyn DynProperty + 'a {
    pub fn downcast_ref<T: PropertyValue>(&self) -> Option<&LayerProperty<T>> {
        self.as_any().downcast_ref()
    }

    pub fn downcast_mut<T: PropertyValue>(&mut self) -> Option<&mut LayerProperty<T>> {
        self.as_any_mut().downcast_mut()
    }
}
