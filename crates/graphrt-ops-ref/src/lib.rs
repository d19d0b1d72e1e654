//! Reference CPU operators for the graphrt registry.
//!
//! These operators only move bytes between tensors. They are registered for the CPU device
//! over a handful of numeric types, both through [`register_ops`] and automatically through
//! the [`OP_REGISTRARS`](graphrt::ops::OP_REGISTRARS) slice.

mod identity;
mod reshape;

use graphrt::ops::{OpRegistrar, OpRegistry};
use graphrt::{DataType, DeviceType, OpResult};

pub use identity::IdentityOp;
pub use reshape::ReshapeOp;

pub const IDENTITY: &str = "Identity";
pub const RESHAPE: &str = "Reshape";

/// Numeric types every reference operator is registered for.
pub const REGISTERED_TYPES: [DataType; 4] =
    [DataType::F32, DataType::F16, DataType::I32, DataType::U8];

/// Registers the reference operators into `registry`.
pub fn register_ops(registry: &mut OpRegistry) -> OpResult<()> {
    for dtype in REGISTERED_TYPES {
        registry.register_op(IDENTITY, DeviceType::Cpu, dtype, IdentityOp::new)?;
        registry.register_op(RESHAPE, DeviceType::Cpu, dtype, ReshapeOp::new)?;
    }
    tracing::trace!(
        "registered {IDENTITY} and {RESHAPE} for CPU over {} types",
        REGISTERED_TYPES.len()
    );
    Ok(())
}

#[graphrt::linkme::distributed_slice(graphrt::ops::OP_REGISTRARS)]
#[linkme(crate = graphrt::linkme)]
static REGISTER_REF_OPS: OpRegistrar = register_ops;
