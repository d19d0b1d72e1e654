//! Serialized node and graph descriptions.
//!
//! An [`OperatorDef`] describes one node: its operator kind, the names of the tensors it reads
//! and writes, optional per-output types and shapes, and free-form named [`Argument`]s. A
//! [`NetDef`] is the ordered list of nodes of one graph. Both round-trip through JSON.

mod arg;

use std::{fs, io, path::Path};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::tensor::DataType;

pub use arg::{
    get_optional_arg, get_repeated_args, ArgType, ArgValue, Argument, RepeatedArgType, DTYPE_ARG,
    MODE_ARG,
};

/// Declared shape of one output. Negative extents mark dimensions unknown at build time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputShape {
    pub dims: Vec<i64>,
}

impl OutputShape {
    pub fn new(dims: impl Into<Vec<i64>>) -> Self {
        Self { dims: dims.into() }
    }
}

/// Immutable description of one graph node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OperatorDef {
    pub name: String,
    #[serde(rename = "type")]
    pub op_type: String,
    #[serde(default)]
    pub inputs: Vec<String>,
    #[serde(default)]
    pub outputs: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub output_types: Vec<DataType>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub output_shapes: Vec<OutputShape>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<Argument>,
}

impl OperatorDef {
    pub fn new(name: impl Into<String>, op_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            op_type: op_type.into(),
            ..Self::default()
        }
    }

    pub fn with_inputs<I, S>(mut self, inputs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.inputs = inputs.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_outputs<I, S>(mut self, outputs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.outputs = outputs.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_output_types(mut self, output_types: impl Into<Vec<DataType>>) -> Self {
        self.output_types = output_types.into();
        self
    }

    pub fn with_output_shapes(mut self, output_shapes: impl Into<Vec<OutputShape>>) -> Self {
        self.output_shapes = output_shapes.into();
        self
    }

    pub fn with_args(mut self, args: impl Into<Vec<Argument>>) -> Self {
        self.args = args.into();
        self
    }

    pub fn with_arg(mut self, arg: Argument) -> Self {
        self.args.push(arg);
        self
    }
}

/// Ordered collection of nodes making up one graph.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NetDef {
    #[serde(default)]
    pub name: String,
    pub ops: Vec<OperatorDef>,
}

#[derive(Debug, Error)]
pub enum NetDefIoError {
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
}

impl NetDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ops: Vec::new(),
        }
    }

    pub fn with_ops(mut self, ops: Vec<OperatorDef>) -> Self {
        self.ops = ops;
        self
    }

    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, NetDefIoError> {
        let text = fs::read_to_string(path)?;
        Ok(Self::from_json_str(&text)?)
    }

    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<(), NetDefIoError> {
        fs::write(path, self.to_json_string()?)?;
        Ok(())
    }
}
