//! Operator registration and dispatch for a computation-graph runtime.
//!
//! Operator implementations register themselves into an [`OpRegistry`] keyed by operator kind,
//! device kind and numeric type. Graph builders query the registry with a node descriptor to
//! obtain a concrete [`Operation`], then initialize it against a [`Workspace`] so its inputs are
//! resolved and its outputs are either reused or freshly allocated.

pub use linkme;

pub mod descriptor;
pub mod device;
mod env;
pub mod error;
pub mod ops;
pub mod plan;
pub mod tensor;
pub mod workspace;

pub use descriptor::{ArgValue, Argument, NetDef, OperatorDef, OutputShape};
pub use device::{AllocError, Allocator, Device, DeviceType, HostAllocator, HostDevice};
pub use error::{OpError, OpResult};
pub use ops::{
    ExecutionMode, OpConstructContext, OpContext, OpInitContext, OpRegistry, OpRegistryHandle,
    Operation, OperationBase,
};
pub use plan::{BuildOptions, OperationPlan};
pub use tensor::{ByteLengthMismatch, DataType, Shape, Tensor, TensorRef};
pub use workspace::Workspace;
