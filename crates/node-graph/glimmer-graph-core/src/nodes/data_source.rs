use glimmer_api_core::DataPath;
use serde::{Deserialize, Serialize};

use crate::node::{parse_params, EvalContext, Node, NodeError};
use crate::pin::PinSet;
use crate::types::{PinId, PinType};

pub const DATA_MODEL: &str = "data-model";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct DataModelParams {
    path: DataPath,
    #[serde(rename = "type")]
    ty: PinType,
}

/// Publishes the value found at a data model path. A missing or mistyped entry is a node
/// fault, so the output keeps its previous value.
#[derive(Debug)]
pub struct DataModelNode {
    params: DataModelParams,
    output: PinId,
}

impl DataModelNode {
    pub fn new(pins: &mut PinSet, path: DataPath, ty: PinType) -> Self {
        let output = pins.create_output("output", ty.clone());
        Self {
            params: DataModelParams { path, ty },
            output,
        }
    }

    pub(crate) fn build(pins: &mut PinSet, params: &serde_json::Value) -> Result<Self, NodeError> {
        let p: DataModelParams = parse_params(params)?;
        Ok(Self::new(pins, p.path, p.ty))
    }
}

impl Node for DataModelNode {
    fn kind(&self) -> &'static str {
        DATA_MODEL
    }

    fn evaluate(&mut self, pins: &mut PinSet, ctx: &EvalContext<'_>) -> Result<(), NodeError> {
        let path = &self.params.path;
        let value = ctx
            .data
            .value(path)
            .ok_or_else(|| NodeError::MissingData(path.to_string()))?;
        if !self.params.ty.accepts(&value) {
            return Err(NodeError::Failed(format!(
                "'{path}' holds {:?}, expected {}",
                value.kind(),
                self.params.ty
            )));
        }
        pins.set_value(self.output, value);
        Ok(())
    }

    fn params(&self) -> serde_json::Value {
        serde_json::to_value(&self.params).unwrap_or_default()
    }
}
