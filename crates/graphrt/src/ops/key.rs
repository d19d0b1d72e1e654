//! Canonical registry keys for operator implementation variants.

use std::collections::HashMap;

use crate::device::DeviceType;
use crate::tensor::{DataType, DEFAULT_DATA_TYPE};

/// Type constraints folded into a key, in this order, whatever order they were declared in.
const TYPE_CONSTRAINT_ORDER: &[&str] = &["T"];

/// Builds the string that joins registration and lookup of one implementation variant.
///
/// The key is derived only from the operator kind, the device kind and the type constraints,
/// all of which are known at lookup time as well.
#[derive(Debug, Clone)]
pub struct OpKeyBuilder {
    op_type: String,
    device: DeviceType,
    type_constraints: HashMap<&'static str, DataType>,
}

impl OpKeyBuilder {
    pub fn new(op_type: impl Into<String>) -> Self {
        Self {
            op_type: op_type.into(),
            device: DeviceType::default(),
            type_constraints: HashMap::new(),
        }
    }

    pub fn device(mut self, device: DeviceType) -> Self {
        self.device = device;
        self
    }

    pub fn type_constraint(mut self, name: &'static str, allowed: DataType) -> Self {
        self.type_constraints.insert(name, allowed);
        self
    }

    /// Renders `<op>:<device>:T_<dtype>`. Unset constraints encode as the default type.
    pub fn build(&self) -> String {
        let mut key = format!("{}:{}", self.op_type, self.device);
        for name in TYPE_CONSTRAINT_ORDER {
            let dtype = self
                .type_constraints
                .get(name)
                .copied()
                .unwrap_or(DEFAULT_DATA_TYPE);
            key.push(':');
            key.push_str(name);
            key.push('_');
            key.push_str(dtype.as_str());
        }
        key
    }
}

/// Shorthand for the single-constraint key used by the registry.
pub fn op_key(op_type: &str, device: DeviceType, dtype: DataType) -> String {
    OpKeyBuilder::new(op_type)
        .device(device)
        .type_constraint("T", dtype)
        .build()
}
