//! Pure modifiers folded over a binding's source value.

use glimmer_api_core::coercion::try_float;
use glimmer_api_core::{DataPath, ValueSource};
use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ModifierKind {
    Sum,
    Subtract,
    Multiply,
    Divide,
    /// `value / parameter * 100`
    PercentageOf,
    Modulo,
    Min,
    Max,
    Absolute,
    Round,
    Floor,
    Ceiling,
    /// Negates the value.
    Invert,
}

impl ModifierKind {
    pub fn takes_parameter(self) -> bool {
        !matches!(
            self,
            ModifierKind::Absolute
                | ModifierKind::Round
                | ModifierKind::Floor
                | ModifierKind::Ceiling
                | ModifierKind::Invert
        )
    }

    /// Apply to `value`. Zero divisors are defined and non-finite results become 0.
    pub fn apply(self, value: f32, parameter: f32) -> f32 {
        let out = match self {
            ModifierKind::Sum => value + parameter,
            ModifierKind::Subtract => value - parameter,
            ModifierKind::Multiply => value * parameter,
            ModifierKind::Divide => {
                if parameter == 0.0 {
                    0.0
                } else {
                    value / parameter
                }
            }
            ModifierKind::PercentageOf => {
                if parameter == 0.0 {
                    100.0
                } else {
                    value / parameter * 100.0
                }
            }
            ModifierKind::Modulo => {
                if parameter == 0.0 {
                    0.0
                } else {
                    value % parameter
                }
            }
            ModifierKind::Min => value.min(parameter),
            ModifierKind::Max => value.max(parameter),
            ModifierKind::Absolute => value.abs(),
            ModifierKind::Round => value.round(),
            ModifierKind::Floor => value.floor(),
            ModifierKind::Ceiling => value.ceil(),
            ModifierKind::Invert => -value,
        };
        if out.is_finite() {
            out
        } else {
            0.0
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum ModifierParam {
    Static(f32),
    /// Read from the data source every time the modifier runs.
    Dynamic(DataPath),
}

impl Default for ModifierParam {
    fn default() -> Self {
        ModifierParam::Static(0.0)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Modifier {
    pub kind: ModifierKind,
    #[serde(default)]
    pub parameter: ModifierParam,
}

impl Modifier {
    pub fn new(kind: ModifierKind, parameter: ModifierParam) -> Self {
        Self { kind, parameter }
    }

    pub fn fixed(kind: ModifierKind, parameter: f32) -> Self {
        Self::new(kind, ModifierParam::Static(parameter))
    }

    pub fn dynamic(kind: ModifierKind, path: DataPath) -> Self {
        Self::new(kind, ModifierParam::Dynamic(path))
    }

    /// Apply against `source`. A dynamic parameter that cannot be read leaves `value` as is.
    pub fn apply(&self, value: f32, source: &dyn ValueSource) -> f32 {
        if !self.kind.takes_parameter() {
            return self.kind.apply(value, 0.0);
        }
        let parameter = match &self.parameter {
            ModifierParam::Static(p) => *p,
            ModifierParam::Dynamic(path) => {
                match source.value(path).as_ref().and_then(try_float) {
                    Some(p) => p,
                    None => return value,
                }
            }
        };
        self.kind.apply(value, parameter)
    }
}

/// Fold `value` through `modifiers` in order.
pub fn apply_all(modifiers: &[Modifier], value: f32, source: &dyn ValueSource) -> f32 {
    modifiers.iter().fold(value, |v, m| m.apply(v, source))
}
