//! Named node arguments and the typed optional-default lookup over them.

use serde::{Deserialize, Serialize};

use crate::error::{OpError, OpResult};
use crate::tensor::DataType;

use super::OperatorDef;

/// Name of the argument carrying a node's numeric type tag.
pub const DTYPE_ARG: &str = "T";
/// Name of the argument carrying a node's execution mode tag.
pub const MODE_ARG: &str = "mode";

/// One named argument of a node. Serialized as `{"name": "axis", "i": 1}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Argument {
    pub name: String,
    #[serde(flatten)]
    pub value: ArgValue,
}

impl Argument {
    pub fn new(name: impl Into<String>, value: ArgValue) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }

    pub fn int(name: impl Into<String>, value: i64) -> Self {
        Self::new(name, ArgValue::Int(value))
    }

    pub fn float(name: impl Into<String>, value: f32) -> Self {
        Self::new(name, ArgValue::Float(value))
    }

    pub fn string(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(name, ArgValue::Str(value.into()))
    }

    pub fn ints(name: impl Into<String>, values: impl Into<Vec<i64>>) -> Self {
        Self::new(name, ArgValue::Ints(values.into()))
    }

    /// The `T` argument set to `dtype`'s tag.
    pub fn dtype(dtype: DataType) -> Self {
        Self::int(DTYPE_ARG, dtype.tag())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ArgValue {
    #[serde(rename = "i")]
    Int(i64),
    #[serde(rename = "f")]
    Float(f32),
    #[serde(rename = "s")]
    Str(String),
    #[serde(rename = "ints")]
    Ints(Vec<i64>),
    #[serde(rename = "floats")]
    Floats(Vec<f32>),
    #[serde(rename = "strings")]
    Strings(Vec<String>),
}

/// Scalar types readable through [`get_optional_arg`].
pub trait ArgType: Sized {
    /// Describes the accepted argument kind in error messages.
    const EXPECTED: &'static str;

    fn from_arg(value: &ArgValue) -> Option<Self>;
}

/// Element types readable through [`get_repeated_args`].
pub trait RepeatedArgType: Sized {
    const EXPECTED: &'static str;

    fn from_repeated(value: &ArgValue) -> Option<Vec<Self>>;
}

impl ArgType for i64 {
    const EXPECTED: &'static str = "int";

    fn from_arg(value: &ArgValue) -> Option<Self> {
        match value {
            ArgValue::Int(v) => Some(*v),
            _ => None,
        }
    }
}

impl ArgType for i32 {
    const EXPECTED: &'static str = "int in i32 range";

    fn from_arg(value: &ArgValue) -> Option<Self> {
        i64::from_arg(value).and_then(|v| i32::try_from(v).ok())
    }
}

impl ArgType for bool {
    const EXPECTED: &'static str = "int used as bool";

    fn from_arg(value: &ArgValue) -> Option<Self> {
        i64::from_arg(value).map(|v| v != 0)
    }
}

impl ArgType for f32 {
    const EXPECTED: &'static str = "float";

    fn from_arg(value: &ArgValue) -> Option<Self> {
        match value {
            ArgValue::Float(v) => Some(*v),
            _ => None,
        }
    }
}

impl ArgType for String {
    const EXPECTED: &'static str = "string";

    fn from_arg(value: &ArgValue) -> Option<Self> {
        match value {
            ArgValue::Str(v) => Some(v.clone()),
            _ => None,
        }
    }
}

impl ArgType for DataType {
    const EXPECTED: &'static str = "data type tag";

    fn from_arg(value: &ArgValue) -> Option<Self> {
        i64::from_arg(value).and_then(DataType::from_tag)
    }
}

impl RepeatedArgType for i64 {
    const EXPECTED: &'static str = "ints";

    fn from_repeated(value: &ArgValue) -> Option<Vec<Self>> {
        match value {
            ArgValue::Ints(v) => Some(v.clone()),
            _ => None,
        }
    }
}

impl RepeatedArgType for i32 {
    const EXPECTED: &'static str = "ints in i32 range";

    fn from_repeated(value: &ArgValue) -> Option<Vec<Self>> {
        i64::from_repeated(value)?
            .into_iter()
            .map(|v| i32::try_from(v).ok())
            .collect()
    }
}

impl RepeatedArgType for f32 {
    const EXPECTED: &'static str = "floats";

    fn from_repeated(value: &ArgValue) -> Option<Vec<Self>> {
        match value {
            ArgValue::Floats(v) => Some(v.clone()),
            _ => None,
        }
    }
}

impl RepeatedArgType for String {
    const EXPECTED: &'static str = "strings";

    fn from_repeated(value: &ArgValue) -> Option<Vec<Self>> {
        match value {
            ArgValue::Strings(v) => Some(v.clone()),
            _ => None,
        }
    }
}

fn find_arg<'a>(def: &'a OperatorDef, name: &str) -> Option<&'a ArgValue> {
    def.args
        .iter()
        .find(|arg| arg.name == name)
        .map(|arg| &arg.value)
}

/// Returns the named argument, or `default` when the node does not carry it.
///
/// An argument that is present but holds the wrong kind of value is a descriptor error.
pub fn get_optional_arg<T: ArgType>(def: &OperatorDef, name: &str, default: T) -> OpResult<T> {
    match find_arg(def, name) {
        None => Ok(default),
        Some(value) => T::from_arg(value).ok_or_else(|| OpError::invalid_argument(name, T::EXPECTED)),
    }
}

/// Returns the named list argument, or an empty list when the node does not carry it.
pub fn get_repeated_args<T: RepeatedArgType>(def: &OperatorDef, name: &str) -> OpResult<Vec<T>> {
    match find_arg(def, name) {
        None => Ok(Vec::new()),
        Some(value) => {
            T::from_repeated(value).ok_or_else(|| OpError::invalid_argument(name, T::EXPECTED))
        }
    }
}
