//! Operator registry, construction contexts and operator instances.

mod context;
pub mod key;
mod mode;
mod operation;
pub mod registry;

pub use context::{OpConstructContext, OpContext, OpInitContext};
pub use key::{op_key, OpKeyBuilder};
pub use mode::ExecutionMode;
pub use operation::{Operation, OperationBase};
pub use registry::{
    OpCreator, OpRegistrar, OpRegistrationInfo, OpRegistry, OpRegistryHandle, OP_REGISTRARS,
};
